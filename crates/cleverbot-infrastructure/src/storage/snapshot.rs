//! Saving and loading conversation state.

use super::atomic_file::AtomicFile;
use crate::dto::CleverbotDocument;
use crate::migration::{Migrated, MigrationManager, MigrationMode};
use cleverbot_core::error::{CleverbotError, Result};
use cleverbot_core::state::RootState;
use semver::Version;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

/// Serializes root states to versioned JSON snapshots and back.
///
/// Snapshots carry no transport; attach one when wrapping the loaded state
/// in a client. The same bytes load into either client variant.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    manager: Arc<MigrationManager>,
}

impl SnapshotStore {
    pub fn new(manager: Arc<MigrationManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &MigrationManager {
        &self.manager
    }

    /// Encodes a root state, with every live conversation, at the current schema.
    pub fn encode(&self, state: &RootState) -> Result<Value> {
        Ok(serde_json::to_value(CleverbotDocument::from(state))?)
    }

    /// Decodes a document of any known version, migrating it implicitly.
    ///
    /// # Errors
    ///
    /// - `Regression` if reaching the current schema needs a lossy step
    /// - `Structural` if the document is not a recognisable snapshot
    pub fn decode(&self, document: Value) -> Result<RootState> {
        let current = self.manager.migrate_to_current(document)?;
        let document: CleverbotDocument = serde_json::from_value(current)
            .map_err(|e| CleverbotError::structural(format!("Invalid snapshot: {e}")))?;
        RootState::try_from(document)
    }

    pub fn save(&self, state: &RootState) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.encode(state)?)?)
    }

    pub fn save_to<W: Write>(&self, state: &RootState, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.encode(state)?)?;
        Ok(())
    }

    pub fn load(&self, bytes: &[u8]) -> Result<RootState> {
        self.decode(parse(bytes)?)
    }

    pub fn load_from<R: Read>(&self, reader: R) -> Result<RootState> {
        let document: Value = serde_json::from_reader(reader)
            .map_err(|e| CleverbotError::structural(format!("Snapshot is not JSON: {e}")))?;
        self.decode(document)
    }

    /// Replaces the conversations of `target` with those of a snapshot.
    ///
    /// The root's own key, timeout, moods and continuation are kept. On error
    /// `target` is left untouched.
    pub fn restore_conversations(&self, target: &mut RootState, bytes: &[u8]) -> Result<()> {
        let loaded = self.load(bytes)?;
        let conversations = loaded.conversations().cloned();
        tracing::debug!(
            "Restoring {} conversation(s)",
            conversations.as_ref().map_or(0, |c| c.len())
        );
        target.replace_conversations(conversations);
        Ok(())
    }

    /// Migrates snapshot bytes to `target` in explicit mode.
    ///
    /// Lossy steps run; each one is reported in the returned notices.
    pub fn migrate(&self, bytes: &[u8], target: &Version) -> Result<Migrated<Vec<u8>>> {
        let migrated = self
            .manager
            .migrate_document(parse(bytes)?, target, MigrationMode::Explicit)?;
        let bytes = serde_json::to_vec_pretty(&migrated.value)?;
        Ok(migrated.map(|_| bytes))
    }

    pub fn save_file(&self, state: &RootState, path: impl AsRef<Path>) -> Result<()> {
        AtomicFile::new(path.as_ref()).save(&self.save(state)?)
    }

    /// Loads a snapshot file; `None` if it does not exist.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Option<RootState>> {
        AtomicFile::new(path.as_ref())
            .load()?
            .map(|bytes| self.load(&bytes))
            .transpose()
    }
}

fn parse(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes)
        .map_err(|e| CleverbotError::structural(format!("Snapshot is not JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::build_migration_manager;
    use cleverbot_core::state::{ConversationOptions, Mood};
    use std::time::Duration;
    use tempfile::TempDir;

    fn store() -> SnapshotStore {
        SnapshotStore::new(Arc::new(build_migration_manager().unwrap()))
    }

    #[test]
    fn test_save_load_root() {
        let store = store();
        let state = RootState::new("API_KEY")
            .with_continuation("cs")
            .with_timeout(Duration::from_millis(2500))
            .with_mood(Mood::Talkativeness, 20.0);

        let bytes = store.save(&state).unwrap();
        let loaded = store.load(&bytes).unwrap();

        assert_eq!(loaded.key, "API_KEY");
        assert_eq!(loaded.continuation(), Some("cs"));
        assert_eq!(loaded.timeout, Some(Duration::from_millis(2500)));
        assert_eq!(loaded.moods.get(Mood::Talkativeness), Some(20.0));
        assert!(loaded.conversations().is_none());
    }

    #[test]
    fn test_save_to_and_load_from() {
        let store = store();
        let state = RootState::new("API_KEY");
        let mut buffer = Vec::new();
        store.save_to(&state, &mut buffer).unwrap();
        assert_eq!(store.load_from(buffer.as_slice()).unwrap(), state);
    }

    #[test]
    fn test_restore_conversations_keeps_root_settings() {
        let store = store();
        let mut saved = RootState::new("OLD_KEY");
        saved
            .named_conversation("alice", ConversationOptions::new().with_continuation("a"))
            .unwrap();
        let bytes = store.save(&saved).unwrap();

        let mut target = RootState::new("NEW_KEY").with_continuation("mine");
        store.restore_conversations(&mut target, &bytes).unwrap();

        assert_eq!(target.key, "NEW_KEY");
        assert_eq!(target.continuation(), Some("mine"));
        let alice = target
            .view(&cleverbot_core::ConversationId::Named("alice".to_string()))
            .unwrap();
        assert_eq!(alice.continuation(), Some("a"));
        assert_eq!(alice.key(), "NEW_KEY");
    }

    #[test]
    fn test_restore_conversations_failure_leaves_target() {
        let store = store();
        let mut target = RootState::new("KEY");
        target.conversation(ConversationOptions::new()).unwrap();
        let before = target.clone();

        assert!(store.restore_conversations(&mut target, b"not json").is_err());
        assert_eq!(target, before);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cleverbot.json");
        let store = store();

        assert!(store.load_file(&path).unwrap().is_none());

        let state = RootState::new("API_KEY").with_continuation("cs");
        store.save_file(&state, &path).unwrap();
        assert_eq!(store.load_file(&path).unwrap(), Some(state));
    }

    #[test]
    fn test_non_json_is_structural() {
        assert!(store().load(b"\x80\x03").unwrap_err().is_structural());
    }
}
