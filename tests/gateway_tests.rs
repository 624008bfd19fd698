use spacetraders_intent_agent::client::build_client;
use spacetraders_intent_agent::config::ApiSettings;
use spacetraders_intent_agent::models::{Intent, IntentType, TRANSPORT_FAILURE_STATUS};
use spacetraders_intent_agent::operations::{IntentExecutor, StateRefresher, StateSource, NO_CREDENTIAL_ERROR};
use spacetraders_intent_agent::storage::AgentStore;
use tempfile::TempDir;

/// Nothing listens on port 1, so every request fails at the transport.
fn unreachable_settings(token: Option<&str>) -> ApiSettings {
    ApiSettings {
        base_url: "http://127.0.0.1:1".to_string(),
        token: token.map(String::from),
        timeout_seconds: 5,
        ..ApiSettings::default()
    }
}

#[test]
fn test_build_client_requires_token() {
    let settings = ApiSettings::default();
    assert!(build_client(None, &settings).is_none());
    assert!(build_client(Some("   "), &settings).is_none());
    assert!(build_client(Some("token"), &settings).is_some());

    let with_token = unreachable_settings(Some("configured"));
    let client = build_client(None, &with_token).expect("client from settings token");
    assert_eq!(client.base_url(), "http://127.0.0.1:1");
}

#[tokio::test]
async fn test_transport_failure_is_normalised() {
    let client = build_client(Some("token"), &unreachable_settings(None)).unwrap();
    let result = client.fetch_my_agent().await;

    assert!(!result.ok);
    assert_eq!(result.status, TRANSPORT_FAILURE_STATUS);
    assert!(result.json.is_none());
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_refresh_without_credential() {
    let refresher = StateRefresher::new(ApiSettings::default());
    let snapshot = refresher.refresh_state().await;

    assert_eq!(snapshot.source, "SpaceTraders");
    assert!(snapshot.agent.is_none());
    assert!(snapshot.ships.is_none());
    assert_eq!(snapshot.errors, vec![NO_CREDENTIAL_ERROR.to_string()]);
}

#[tokio::test]
async fn test_refresh_records_both_failures() {
    let refresher = StateRefresher::new(unreachable_settings(Some("token")));
    let snapshot = refresher.refresh_state().await;

    assert_eq!(snapshot.errors.len(), 2);
    assert!(snapshot.errors[0].starts_with("agent: "));
    assert!(snapshot.errors[1].starts_with("ships: "));
    assert!(!snapshot.is_complete());
}

#[test]
fn test_executor_without_credential_is_silent() {
    let dir = TempDir::new().unwrap();
    let mut store = AgentStore::new(dir.path().join("agent.db"));
    store.connect().unwrap();

    let executor = IntentExecutor::new(ApiSettings::default());
    let intent = Intent::new(IntentType::Trade, "Sell ore", "High prices");
    executor.execute_intent(&intent, &store).unwrap();

    assert!(store.fetch_logs(10).unwrap().is_empty());
}

#[test]
fn test_executor_logs_dispatch() {
    let dir = TempDir::new().unwrap();
    let mut store = AgentStore::new(dir.path().join("agent.db"));
    store.connect().unwrap();

    let executor = IntentExecutor::new(unreachable_settings(Some("token")));
    for intent_type in [IntentType::GatherMarketData, IntentType::Explore] {
        let intent = Intent::new(intent_type, "goal", "reasoning");
        executor.execute_intent(&intent, &store).unwrap();
    }

    let messages: Vec<String> = store.fetch_logs(10).unwrap().into_iter().map(|l| l.message).collect();
    assert_eq!(messages, vec!["explore (TODO)", "gather_market_data"]);
    assert!(store.fetch_logs(10).unwrap().iter().all(|l| l.category == "execute"));
}
