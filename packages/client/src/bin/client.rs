//! Live quiz participant client.
//!
//! Joins a quiz on a host server, prints each pushed question with its
//! options and submits the option number typed at the prompt. An unanswered
//! question is submitted empty when its countdown runs out. Type `q` (or
//! press Ctrl+C / Ctrl+D) to leave.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin quizcast-client -- --quiz-id 1 --pin 4821 --username alice
//! cargo run --bin quizcast-client -- -q 1 -p 4821 -u bob --ambiguous-as incorrect
//! ```

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;

use quizcast_client::{
    AmbiguousPolicy, ClientConfig, QuizSession,
    config::{DEFAULT_MAX_DURATION, DEFAULT_SERVER_URL},
    domain::JoinRequest,
    infrastructure::{HttpAnswerApi, SseConnector},
    ui::{render_snapshots, spawn_prompt},
};
use quizcast_shared::{logger::setup_logger, time::SystemClock};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AmbiguousAs {
    Correct,
    Incorrect,
}

impl From<AmbiguousAs> for AmbiguousPolicy {
    fn from(value: AmbiguousAs) -> Self {
        match value {
            AmbiguousAs::Correct => AmbiguousPolicy::TreatAsCorrect,
            AmbiguousAs::Incorrect => AmbiguousPolicy::TreatAsIncorrect,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "quizcast-client")]
#[command(about = "Join a live quiz and answer its questions", long_about = None)]
struct Args {
    /// Quiz identifier
    #[arg(short = 'q', long)]
    quiz_id: String,

    /// PIN given by the quiz host
    #[arg(short = 'p', long)]
    pin: String,

    /// Name shown in the ranking (must be unique within the quiz)
    #[arg(short = 'u', long)]
    username: String,

    /// Host server base URL
    #[arg(short = 's', long, default_value = DEFAULT_SERVER_URL)]
    server_url: String,

    /// Seconds to answer each question
    #[arg(short = 'd', long, default_value_t = DEFAULT_MAX_DURATION)]
    duration: u32,

    /// How to count a verdict that says neither correct nor incorrect
    #[arg(long, value_enum, default_value_t = AmbiguousAs::Correct)]
    ambiguous_as: AmbiguousAs,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Fail before touching the terminal or the network
    if let Err(e) = JoinRequest::new(&args.quiz_id, &args.pin, &args.username) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    let config = ClientConfig::new(args.server_url)
        .with_max_duration(args.duration)
        .with_ambiguous_policy(args.ambiguous_as.into());
    let http = reqwest::Client::new();
    let connector = Arc::new(SseConnector::new(http.clone(), config.server_url.clone()));
    let api = Arc::new(HttpAnswerApi::new(http, config.server_url.clone()));

    let (session, snapshots) = QuizSession::new(config, connector, api, Arc::new(SystemClock));
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();

    let render_task = tokio::spawn(render_snapshots(snapshots));
    let _prompt_thread = spawn_prompt(commands_tx);

    let result = session
        .run(&args.quiz_id, &args.pin, &args.username, commands_rx)
        .await;
    render_task.await.ok();

    if let Err(e) = result {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
