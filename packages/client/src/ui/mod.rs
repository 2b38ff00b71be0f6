//! Terminal front-end of the participant client.

pub mod formatter;
pub mod prompt;

use std::io::Write;

use tokio::sync::watch;

use quizcast_shared::time::now_millis;

use crate::domain::SessionSnapshot;

pub use formatter::SnapshotFormatter;
pub use prompt::{parse_command, spawn_prompt};

/// Prompt shown while waiting for an answer
pub const PROMPT: &str = "answer> ";

/// Redisplay the prompt after printing session output
pub fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}

/// Print every published snapshot change until the session ends
pub async fn render_snapshots(mut snapshots: watch::Receiver<SessionSnapshot>) {
    let mut prev = snapshots.borrow_and_update().clone();

    while snapshots.changed().await.is_ok() {
        let next = snapshots.borrow_and_update().clone();
        let lines = SnapshotFormatter::format_transition(&prev, &next, now_millis());
        if !lines.is_empty() {
            for line in &lines {
                print!("{}", line);
            }
            if !next.closed {
                redisplay_prompt();
            }
        }
        prev = next;
    }
}
