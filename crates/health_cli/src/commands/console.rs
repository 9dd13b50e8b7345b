//! Console command - Interactive dashboard.
//!
//! Reads one command per line from stdin. Runs execute in the background so
//! `status` and `reset` can interleave with a run in flight.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use health_core::{HealthConfig, Orchestrator};

use crate::render;

const HELP: &str = "\
Commands:
  run              Run every check sequentially
  reset            Clear results and progress
  status           Show the overview
  show <category>  Show one category's checks
  list             List categories
  help             Show this help
  quit             Leave the console";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConsoleCommand {
    Run,
    Reset,
    Status,
    Show(String),
    List,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "run" | "start" => ConsoleCommand::Run,
        "reset" => ConsoleCommand::Reset,
        "status" => ConsoleCommand::Status,
        "show" if rest.is_empty() => return Err("usage: show <category>".to_string()),
        "show" => ConsoleCommand::Show(rest.to_string()),
        "list" => ConsoleCommand::List,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(Some(command))
}

pub async fn execute(config: &HealthConfig) -> Result<()> {
    let orchestrator = Orchestrator::new(config.suite(), config.build_executor()?);

    // Live progress printer for the lifetime of the console.
    let printer = {
        let orchestrator = orchestrator.clone();
        let mut events = orchestrator.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if let Some(line) = render::event_line(orchestrator.suite(), &event) {
                            println!("{}", line);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => debug!("Skipped {} events", skipped),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    };

    let (session, report) = (orchestrator.session(), orchestrator.report());
    println!("{}", render::overview(&config.system, &session, &report));
    println!();
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            ConsoleCommand::Run => {
                if orchestrator.spawn().is_none() {
                    println!("A run is already in progress");
                }
            }
            ConsoleCommand::Reset => orchestrator.reset(),
            ConsoleCommand::Status => {
                let session = orchestrator.session();
                let report = orchestrator.report();
                println!("{}", render::overview(&config.system, &session, &report));
            }
            ConsoleCommand::Show(name) => match orchestrator.suite().category_index(&name) {
                Ok(index) => println!(
                    "{}",
                    render::category(orchestrator.suite(), &orchestrator.store(), index)
                ),
                Err(e) => println!("{}", e),
            },
            ConsoleCommand::List => {
                for category in orchestrator.suite().categories() {
                    println!("{:<12} {} checks", category.name, category.tests.len());
                }
            }
            ConsoleCommand::Help => println!("{}", HELP),
            ConsoleCommand::Quit => break,
        }
    }

    printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("run"), Ok(Some(ConsoleCommand::Run)));
        assert_eq!(parse_command("  RESET "), Ok(Some(ConsoleCommand::Reset)));
        assert_eq!(parse_command("exit"), Ok(Some(ConsoleCommand::Quit)));
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(
            parse_command("show Excel"),
            Ok(Some(ConsoleCommand::Show("Excel".to_string())))
        );
        assert_eq!(
            parse_command("show  Power Point "),
            Ok(Some(ConsoleCommand::Show("Power Point".to_string())))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("show").is_err());
        assert!(parse_command("launch Word").is_err());
    }
}
