use async_trait::async_trait;
use cleverbot_core::state::{ConversationId, ConversationOptions, RootState};
use cleverbot_core::transport::{BlockingTransport, Transport, TransportError, TransportResponse};
use cleverbot_core::{BlockingCleverbot, Cleverbot, CleverbotError};
use cleverbot_infrastructure::{SnapshotStore, build_migration_manager};
use cleverbot_interaction::{ClientConfig, ConfigLayer};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Replies with `{"output": ..., "cs": <input>-cs}` and records every query.
#[derive(Default)]
struct EchoTransport {
    seen: Mutex<Vec<Vec<(String, String)>>>,
}

impl EchoTransport {
    fn reply(&self, query: &[(String, String)]) -> TransportResponse {
        self.seen.lock().unwrap().push(query.to_vec());
        let input = query
            .iter()
            .find(|(name, _)| name == "input")
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        let body = serde_json::json!({"output": format!("echo {input}"), "cs": format!("{input}-cs")});
        TransportResponse::new(200, body.to_string())
    }

    fn last_param(&self, name: &str) -> Option<String> {
        let seen = self.seen.lock().unwrap();
        seen.last()?
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value.clone())
    }
}

#[async_trait]
impl Transport for EchoTransport {
    async fn get(
        &self,
        _url: &str,
        query: &[(String, String)],
        _timeout: Option<Duration>,
    ) -> Result<TransportResponse, TransportError> {
        Ok(self.reply(query))
    }
}

impl BlockingTransport for EchoTransport {
    fn get(
        &self,
        _url: &str,
        query: &[(String, String)],
        _timeout: Option<Duration>,
    ) -> Result<TransportResponse, TransportError> {
        Ok(self.reply(query))
    }
}

struct TimeoutTransport;

#[async_trait]
impl Transport for TimeoutTransport {
    async fn get(
        &self,
        _url: &str,
        _query: &[(String, String)],
        _timeout: Option<Duration>,
    ) -> Result<TransportResponse, TransportError> {
        Err(TransportError::Timeout)
    }
}

#[tokio::test]
async fn test_blocking_snapshot_loads_into_async_client() {
    let store = SnapshotStore::new(Arc::new(build_migration_manager().unwrap()));

    let blocking_transport = Arc::new(EchoTransport::default());
    let mut blocking = BlockingCleverbot::new(RootState::new("API_KEY"), blocking_transport);
    let alice = blocking
        .named_conversation("alice", ConversationOptions::new().with_key("SUB"))
        .unwrap();
    blocking.say_in(&alice, "hello").unwrap();
    let bytes = store.save(blocking.state()).unwrap();

    let async_transport = Arc::new(EchoTransport::default());
    let mut client = Cleverbot::new(store.load(&bytes).unwrap(), async_transport.clone());
    assert_eq!(client.say_in(&alice, "again").await.unwrap(), "echo again");

    assert_eq!(async_transport.last_param("cs").as_deref(), Some("hello-cs"));
    assert_eq!(async_transport.last_param("key").as_deref(), Some("SUB"));
    assert_eq!(
        client.state().view(&alice).unwrap().continuation(),
        Some("again-cs")
    );
}

#[tokio::test]
async fn test_async_snapshot_loads_into_blocking_client() {
    let store = SnapshotStore::new(Arc::new(build_migration_manager().unwrap()));

    let mut client = Cleverbot::new(RootState::new("API_KEY"), Arc::new(EchoTransport::default()));
    client.say("hi").await.unwrap();
    let first = client.conversation(ConversationOptions::new()).unwrap();
    assert_eq!(first, ConversationId::Unnamed(0));
    let bytes = store.save(client.state()).unwrap();

    let transport = Arc::new(EchoTransport::default());
    let state = store.load(&bytes).unwrap();
    let mut blocking = tokio::task::spawn_blocking(move || {
        let mut blocking = BlockingCleverbot::new(state, transport);
        blocking.say("next").map(|_| blocking)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(blocking.state().continuation(), Some("next-cs"));
    assert_eq!(blocking.state().conversations().unwrap().len(), 1);
    blocking.reset();
    assert_eq!(blocking.state().continuation(), None);
}

#[tokio::test]
async fn test_timeout_carries_configured_seconds() {
    let config = ClientConfig::resolve([ConfigLayer {
        key: Some("API_KEY".to_string()),
        timeout: Some(60.0),
        ..ConfigLayer::default()
    }])
    .unwrap();

    let mut client = Cleverbot::new(config.root_state(), Arc::new(TimeoutTransport));
    let err = client.say("hello").await.unwrap_err();
    assert_eq!(err, CleverbotError::timeout(Some(Duration::from_secs(60))));
    assert!(err.to_string().contains("60"));
}

#[test]
fn test_config_file_layer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "key = \"FROM_FILE\"\ntimeout = 30\n\n[moods]\nmood1 = 80\n",
    )
    .unwrap();

    let layer = ConfigLayer::from_file(&path).unwrap().unwrap();
    let config = ClientConfig::resolve([layer]).unwrap();
    assert_eq!(config.key, "FROM_FILE");
    assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    assert_eq!(config.moods.mood1, Some(80.0));

    assert!(ConfigLayer::from_file(&dir.path().join("missing.toml")).unwrap().is_none());

    std::fs::write(&path, "api_key = \"x\"\n").unwrap();
    assert!(ConfigLayer::from_file(&path).unwrap_err().is_configuration());
}
