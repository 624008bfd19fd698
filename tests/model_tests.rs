use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use spacetraders_intent_agent::admiral::{extract_wait_duration, MAX_SLEEP_SECONDS};
use spacetraders_intent_agent::models::{
    ApiResult, Intent, IntentType, StateSnapshot, TransportResponse, TRANSPORT_FAILURE_STATUS,
};
use spacetraders_intent_agent::operations::analyze_fleet_readiness;

fn snapshot_with_statuses(statuses: &[&str]) -> StateSnapshot {
    let mut snapshot = StateSnapshot::empty();
    snapshot.ships = Some(
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| json!({ "symbol": format!("SHIP-{}", i), "nav": { "status": status } }))
            .collect(),
    );
    snapshot
}

#[test]
fn test_intent_summary_and_type_parsing() {
    let intent = Intent::new(IntentType::Trade, "Sell iron ore", "Prices are high");
    assert_eq!(intent.summary(), "trade: Sell iron ore");
    assert!(intent.details.is_empty());
    assert!(intent.advisory_source.is_none());

    assert_eq!("GATHER_MARKET_DATA".parse::<IntentType>(), Ok(IntentType::GatherMarketData));
    assert_eq!(" explore ".parse::<IntentType>(), Ok(IntentType::Explore));
    assert!("mine".parse::<IntentType>().is_err());

    println!("✅ Intent model test passed");
}

#[test]
fn test_fleet_readiness_mixed_statuses() {
    let snapshot = snapshot_with_statuses(&["DOCKED", "IN_TRANSIT", "ANCHORED", "", "WEIRD_STATUS"]);
    let readiness = analyze_fleet_readiness(&snapshot);

    assert_eq!(readiness.total_ships, 5);
    assert_eq!(readiness.idle_ships, 3);
    assert_eq!(readiness.busy_ships, 2);
    assert!(readiness.ready_for_action);

    // Pure and repeatable
    assert_eq!(analyze_fleet_readiness(&snapshot), readiness);
}

#[test]
fn test_fleet_readiness_edge_cases() {
    let empty = analyze_fleet_readiness(&StateSnapshot::empty());
    assert_eq!(empty.total_ships, 0);
    assert!(!empty.ready_for_action);

    let all_busy = analyze_fleet_readiness(&snapshot_with_statuses(&["IN_TRANSIT", "in_transit"]));
    assert_eq!(all_busy.busy_ships, 2);
    assert!(!all_busy.ready_for_action);

    // A record without nav data counts as busy
    let mut snapshot = StateSnapshot::empty();
    snapshot.ships = Some(vec![json!({ "symbol": "NO-NAV" }), json!("not an object")]);
    let readiness = analyze_fleet_readiness(&snapshot);
    assert_eq!(readiness.busy_ships, 2);
    assert_eq!(readiness.ready_for_action, readiness.idle_ships > 0);
}

#[test]
fn test_api_result_normalisation() {
    let raw = ApiResult::from_transport(Ok(TransportResponse::Raw {
        status: 200,
        content: br#"{"data":{"symbol":"AGENT"}}"#.to_vec(),
    }));
    assert!(raw.ok);
    assert_eq!(raw.status, 200);
    assert_eq!(raw.data(), Some(&json!({ "symbol": "AGENT" })));
    assert!(raw.error.is_none());

    let empty = ApiResult::from_transport(Ok(TransportResponse::Raw { status: 204, content: Vec::new() }));
    assert!(empty.ok);
    assert!(empty.json.is_none());

    let structured = ApiResult::from_transport(Ok(TransportResponse::Structured {
        status: 429,
        body: Some(json!({ "error": { "code": 429 } })),
        content: None,
    }));
    assert!(!structured.ok);
    assert_eq!(structured.status, 429);
    assert!(structured.data().is_none());
    assert_eq!(structured.failure_reason(), "429");

    let garbage = ApiResult::from_transport(Ok(TransportResponse::Raw {
        status: 200,
        content: b"<html>".to_vec(),
    }));
    assert!(!garbage.ok);
    assert_eq!(garbage.status, TRANSPORT_FAILURE_STATUS);
    assert!(garbage.error.is_some());

    let failed = ApiResult::from_transport(Err("connection refused".to_string()));
    assert_eq!(failed.status, TRANSPORT_FAILURE_STATUS);
    assert_eq!(failed.failure_reason(), "connection refused");
}

#[test]
fn test_wait_extraction_rate_limit() {
    let now = Utc::now();
    let response = json!({ "error": { "code": 429, "data": { "retryAfter": 60 } } });
    assert_eq!(extract_wait_duration(&response, now), Some(60.0));

    let other_error = json!({ "error": { "code": 400, "data": { "retryAfter": 60 } } });
    assert_eq!(extract_wait_duration(&other_error, now), None);

    assert_eq!(extract_wait_duration(&json!({ "data": { "symbol": "SHIP-1" } }), now), None);
    assert_eq!(extract_wait_duration(&json!({}), now), None);
}

#[test]
fn test_wait_extraction_is_capped() {
    let now = Utc::now();
    let huge = json!({ "error": { "code": 429, "data": { "retryAfter": 1e30 } } });
    assert_eq!(extract_wait_duration(&huge, now), Some(MAX_SLEEP_SECONDS));

    let far = json!({ "data": { "cooldown": { "expiration": "9999-12-31T23:59:59Z" } } });
    assert_eq!(extract_wait_duration(&far, now), Some(MAX_SLEEP_SECONDS));
}

#[test]
fn test_wait_extraction_picks_soonest_deadline() {
    let now = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
    let cooldown = (now + Duration::seconds(30)).to_rfc3339();
    let arrival = (now + Duration::seconds(90)).to_rfc3339();
    let response = json!({
        "data": {
            "cooldown": { "expiration": cooldown },
            "nav": { "route": { "arrival": arrival } }
        }
    });
    assert_eq!(extract_wait_duration(&response, now), Some(30.0));

    let past = (now - Duration::seconds(10)).to_rfc3339();
    let stale = json!({ "data": { "nav": { "route": { "arrival": past } } } });
    assert_eq!(extract_wait_duration(&stale, now), None);

    let unparsable = json!({ "data": { "cooldown": { "expiration": "soon" } } });
    assert_eq!(extract_wait_duration(&unparsable, now), None);
}
