//! Quiz host server.
//!
//! Opens quizzes behind a PIN and pushes their questions to subscribed
//! participants over server-sent events.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin quizcast-server
//! cargo run --bin quizcast-server -- --host 0.0.0.0 --port 3000 --quiz-file quizzes.json
//! ```
//!
//! Then, as the host:
//! ```not_rust
//! curl -X POST http://127.0.0.1:8080/api/quiz/1/open    # -> {"quizId":1,"pin":"4821"}
//! curl -X POST http://127.0.0.1:8080/api/quiz/1/start
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use quizcast_server::{
    Server, ServerConfig,
    config::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_QUESTION_INTERVAL_SECS},
};
use quizcast_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "quizcast-server")]
#[command(about = "Quiz host server pushing questions over server-sent events", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds participants get for each question
    #[arg(short = 'i', long, default_value_t = DEFAULT_QUESTION_INTERVAL_SECS)]
    question_interval: u64,

    /// JSON file with the quizzes to serve (a demo quiz is used otherwise)
    #[arg(short = 'f', long)]
    quiz_file: Option<PathBuf>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            question_interval: Duration::from_secs(args.question_interval),
            quiz_file: args.quiz_file,
        }
    }
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());

    let server = match Server::from_config(&config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run(&config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
