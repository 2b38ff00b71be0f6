//! Quiz host server for quizcast.
//!
//! Opens quizzes behind a PIN, pushes questions to subscribed participants
//! over server-sent events, judges their answers and finally sends each
//! participant their rank.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub use config::ServerConfig;
pub use ui::Server;
