use super::{initial_state, save_state, snapshot_store};
use crate::ClientArgs;
use anyhow::{Context as _, Result};
use cleverbot_interaction::ClientConfig;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

const COMMANDS: &[&str] = &["/reset", "/save", "/quit"];

/// Completes and highlights the slash commands.
struct ChatHelper;

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for ChatHelper {}

pub async fn run(args: &ClientArgs, state_path: Option<PathBuf>) -> Result<()> {
    let config = ClientConfig::load(args.layer()).context("Failed to load configuration")?;
    let store = snapshot_store()?;
    let state = initial_state(args, &config, &store, state_path.as_deref())?;
    let mut client = cleverbot_interaction::connect(&config, state)?;

    let mut rl: Editor<ChatHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ChatHelper));

    println!("{}", "=== Cleverbot ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a message, '/reset' to start over, '/save' to save, or '/quit' to exit.".bright_black()
    );
    println!();

    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match trimmed {
                    "/quit" | "/exit" => break,
                    "/reset" => {
                        client.reset();
                        println!("{}", "Conversation reset.".yellow());
                    }
                    "/save" => match state_path.as_deref() {
                        Some(path) => {
                            save_state(&store, client.state(), Some(path))?;
                            println!("{}", format!("Saved to {}", path.display()).green());
                        }
                        None => println!("{}", "Start with --state FILE to save.".yellow()),
                    },
                    input => match client.say(input).await {
                        Ok(reply) => println!("{} {}", "bot>".bright_blue(), reply.bright_blue()),
                        Err(e) => eprintln!("{}", format!("Error: {e}").red()),
                    },
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    save_state(&store, client.state(), state_path.as_deref())?;
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
