pub mod chat;
pub mod migrate;
pub mod say;

use crate::ClientArgs;
use anyhow::{Context, Result, bail};
use cleverbot_core::state::RootState;
use cleverbot_infrastructure::{SnapshotStore, build_migration_manager};
use cleverbot_interaction::ClientConfig;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub fn snapshot_store() -> Result<SnapshotStore> {
    let manager = build_migration_manager().context("Failed to build migration manager")?;
    Ok(SnapshotStore::new(Arc::new(manager)))
}

/// Resumes from `path` when it exists, otherwise starts from the config.
///
/// Flags given on the command line (`--key`, `--cs`, `--timeout`,
/// `--mood1..3`) replace the matching root settings either way.
///
/// # Errors
///
/// Refuses a snapshot whose upgrade would cross a lossy step; the file is
/// left untouched and the user is pointed at `cleverbot migrate`.
pub fn initial_state(
    args: &ClientArgs,
    config: &ClientConfig,
    store: &SnapshotStore,
    path: Option<&Path>,
) -> Result<RootState> {
    let loaded = match path {
        Some(path) => load_snapshot(store, path)?,
        None => None,
    };

    let mut state = loaded.unwrap_or_else(|| config.root_state());
    apply_flags(args, &mut state)?;
    Ok(state)
}

fn load_snapshot(store: &SnapshotStore, path: &Path) -> Result<Option<RootState>> {
    match store.load_file(path) {
        Err(err) if err.is_regression() => bail!(
            "{err}\nRun `cleverbot migrate {input} -o {input}` to upgrade it explicitly",
            input = path.display()
        ),
        other => other.with_context(|| format!("Failed to load state from {}", path.display())),
    }
}

fn apply_flags(args: &ClientArgs, state: &mut RootState) -> Result<()> {
    if let Some(key) = &args.key {
        state.key = key.clone();
    }
    if let Some(cs) = &args.cs {
        state.set_continuation(Some(cs.clone()));
    }
    if let Some(secs) = args.timeout {
        let timeout = Duration::try_from_secs_f64(secs)
            .with_context(|| format!("Invalid timeout {secs}"))?;
        state.timeout = Some(timeout);
    }
    state.moods = args.layer().moods.or(&state.moods);
    Ok(())
}

pub fn save_state(store: &SnapshotStore, state: &RootState, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        store
            .save_file(state, path)
            .with_context(|| format!("Failed to save state to {}", path.display()))?;
        tracing::info!("Saved state to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleverbot_core::state::{ConversationOptions, Mood};
    use cleverbot_interaction::ConfigLayer;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn config() -> ClientConfig {
        ClientConfig::resolve([ConfigLayer {
            key: Some("CONFIG_KEY".to_string()),
            ..ConfigLayer::default()
        }])
        .unwrap()
    }

    #[test]
    fn test_lossy_snapshot_is_refused_and_left_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let legacy = json!([
            {"key": "K", "continuation": "cs", "timeout": null,
             "mood1": null, "mood2": null, "mood3": null},
            [{"name": null, "continuation": "a"}]
        ]);
        let bytes = serde_json::to_vec(&legacy).unwrap();
        fs::write(&path, &bytes).unwrap();

        let store = snapshot_store().unwrap();
        let err = initial_state(&ClientArgs::default(), &config(), &store, Some(&path))
            .unwrap_err()
            .to_string();
        assert!(err.contains("Nameless conversations will be lost."));
        assert!(err.contains("cleverbot migrate"));
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_missing_state_file_starts_from_config() {
        let dir = TempDir::new().unwrap();
        let store = snapshot_store().unwrap();
        let path = dir.path().join("none.json");

        let state = initial_state(&ClientArgs::default(), &config(), &store, Some(&path)).unwrap();
        assert_eq!(state.key, "CONFIG_KEY");
        assert!(state.conversations().is_none());
    }

    #[test]
    fn test_flags_override_resumed_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let store = snapshot_store().unwrap();

        let mut saved = RootState::new("OLD")
            .with_continuation("old-cs")
            .with_mood(Mood::Wackiness, 10.0)
            .with_mood(Mood::Attentiveness, 30.0);
        saved
            .named_conversation("alice", ConversationOptions::new())
            .unwrap();
        store.save_file(&saved, &path).unwrap();

        let args = ClientArgs {
            key: Some("NEW".to_string()),
            cs: Some("new-cs".to_string()),
            timeout: Some(5.0),
            mood1: Some(90.0),
            ..ClientArgs::default()
        };
        let state = initial_state(&args, &config(), &store, Some(&path)).unwrap();

        assert_eq!(state.key, "NEW");
        assert_eq!(state.continuation(), Some("new-cs"));
        assert_eq!(state.timeout, Some(Duration::from_secs(5)));
        assert_eq!(state.moods.get(Mood::Wackiness), Some(90.0));
        assert_eq!(state.moods.get(Mood::Attentiveness), Some(30.0));
        assert_eq!(state.conversations().unwrap().len(), 1);
    }

    #[test]
    fn test_resumed_state_keeps_its_settings_without_flags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let store = snapshot_store().unwrap();
        store
            .save_file(&RootState::new("SAVED").with_continuation("cs"), &path)
            .unwrap();

        let state = initial_state(&ClientArgs::default(), &config(), &store, Some(&path)).unwrap();
        assert_eq!(state.key, "SAVED");
        assert_eq!(state.continuation(), Some("cs"));
    }

    #[test]
    fn test_negative_timeout_flag_is_rejected() {
        let store = snapshot_store().unwrap();
        let args = ClientArgs {
            timeout: Some(-1.0),
            ..ClientArgs::default()
        };
        assert!(initial_state(&args, &config(), &store, None).is_err());
    }
}
