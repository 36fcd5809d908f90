use super::{initial_state, save_state, snapshot_store};
use crate::ClientArgs;
use anyhow::{Context, Result, bail};
use cleverbot_core::Say;
use cleverbot_interaction::ClientConfig;
use std::path::PathBuf;

pub async fn run(
    args: &ClientArgs,
    input: Option<String>,
    history: &[String],
    state_path: Option<PathBuf>,
) -> Result<()> {
    let config = ClientConfig::load(args.layer()).context("Failed to load configuration")?;
    let store = snapshot_store()?;
    let state = initial_state(args, &config, &store, state_path.as_deref())?;

    let mut say = input.map(Say::input).unwrap_or_default();
    for entry in history {
        let (param, text) = parse_history(entry)?;
        say = say.with_history(param, text);
    }

    let mut client = cleverbot_interaction::connect(&config, state)?;
    let reply = client.say(say).await?;
    println!("{reply}");

    save_state(&store, client.state(), state_path.as_deref())
}

/// Parses `N=TEXT` into the `vtextN` request parameter.
fn parse_history(entry: &str) -> Result<(String, String)> {
    let Some((index, text)) = entry.split_once('=') else {
        bail!("Expected N=TEXT, got {entry:?}");
    };
    let index: u32 = index
        .trim()
        .parse()
        .with_context(|| format!("Invalid history index in {entry:?}"))?;
    Ok((format!("vtext{index}"), text.to_string()))
}
