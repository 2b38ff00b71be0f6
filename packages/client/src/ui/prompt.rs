//! Line input for answers.

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{domain::OptionToken, runner::UserCommand};

use super::PROMPT;

/// Interpret one input line
///
/// `q` or `quit` leaves; an integer picks that option.
///
/// # Errors
///
/// Returns a hint for anything else.
pub fn parse_command(line: &str) -> Result<UserCommand, String> {
    let line = line.trim();
    match line {
        "q" | "quit" => Ok(UserCommand::Leave),
        _ => line
            .parse::<i64>()
            .map(|value| UserCommand::Select(OptionToken::new(value)))
            .map_err(|_| {
                format!(
                    "'{}' is not an option; type an option number or 'q' to leave",
                    line
                )
            }),
    }
}

/// Read commands on a blocking thread until the session stops listening
///
/// Ctrl-C and Ctrl-D leave the session.
pub fn spawn_prompt(commands: mpsc::UnboundedSender<UserCommand>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                let _ = commands.send(UserCommand::Leave);
                return;
            }
        };

        loop {
            let command = match rl.readline(PROMPT) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => match parse_command(&line) {
                    Ok(command) => {
                        rl.add_history_entry(line.trim()).ok();
                        command
                    }
                    Err(hint) => {
                        println!("{}", hint);
                        continue;
                    }
                },
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    UserCommand::Leave
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    UserCommand::Leave
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    UserCommand::Leave
                }
            };

            let leaving = command == UserCommand::Leave;
            if commands.send(command).is_err() || leaving {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option_number() {
        // テスト項目: 数値の入力は選択肢の選択になる
        // given (前提条件):
        let line = " 4 ";

        // when (操作):
        let result = parse_command(line);

        // then (期待する結果):
        assert_eq!(result, Ok(UserCommand::Select(OptionToken::new(4))));
    }

    #[test]
    fn test_parse_quit() {
        // テスト項目: q と quit は退出になる
        // given (前提条件):
        let lines = ["q", "quit"];

        // when (操作):
        let results: Vec<_> = lines.iter().map(|line| parse_command(line)).collect();

        // then (期待する結果):
        assert!(results.iter().all(|r| *r == Ok(UserCommand::Leave)));
    }

    #[test]
    fn test_parse_garbage_returns_hint() {
        // テスト項目: 解釈できない入力はヒントを返す
        // given (前提条件):
        let line = "four";

        // when (操作):
        let result = parse_command(line);

        // then (期待する結果):
        assert!(result.unwrap_err().contains("not an option"));
    }
}
