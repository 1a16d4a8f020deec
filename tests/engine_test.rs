//! End-to-end engine scenarios against a mock brokerage API.
//!
//! The engine runs on its real event loop with short configured intervals;
//! tests feed tap events, let the timers fire, and assert on the API
//! traffic and presentation events that come out.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use avanza::{
    AvanzaHttpClient, CourtageClass, COURTAGE_CLASS_PATH, COURTAGE_CLASS_UPDATE_PATH,
};
use courtage::engine::traffic::TapEvent;
use courtage::engine::{Engine, EngineConfig};
use courtage::prefs::{Mode, PreferencesStore};
use courtage::sink::{PresentationSink, Severity, UiUpdate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Short intervals so tests settle quickly.
fn test_config() -> EngineConfig {
    EngineConfig {
        base_currency: "SEK".to_string(),
        debounce_ms: 40,
        min_api_interval_ms: 300,
        reset_delay_ms: 40,
    }
}

struct Harness {
    server: MockServer,
    tap: mpsc::UnboundedSender<TapEvent>,
    ui: mpsc::UnboundedReceiver<UiUpdate>,
    prefs: PreferencesStore,
    _cancel: CancellationToken,
}

async fn start_engine(config: EngineConfig, prefs: PreferencesStore) -> Harness {
    let server = MockServer::start().await;
    let client = Arc::new(AvanzaHttpClient::new(&server.uri()));
    let (sink, ui) = PresentationSink::channel();
    let engine = Engine::new(config, client, prefs.clone(), sink);

    let (tap, tap_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    tokio::spawn(engine.run(tap_rx, cancel.clone()));

    Harness {
        server,
        tap,
        ui,
        prefs,
        _cancel: cancel,
    }
}

async fn mount_current_class(server: &MockServer, class: &str) {
    Mock::given(method("GET"))
        .and(path(COURTAGE_CLASS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "currentCourtageClass": class
        })))
        .mount(server)
        .await;
}

async fn mount_update_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(COURTAGE_CLASS_UPDATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })),
        )
        .mount(server)
        .await;
}

fn fee_preview_event(price: &str, volume: &str, currency: &str) -> TapEvent {
    fee_preview_event_with_headers(price, volume, currency, HashMap::new())
}

fn fee_preview_event_with_headers(
    price: &str,
    volume: &str,
    currency: &str,
    request_headers: HashMap<String, String>,
) -> TapEvent {
    TapEvent::Request {
        url: "https://broker.test/_api/order/preliminary-fee".to_string(),
        request_headers,
        request_body: Some(format!(r#"{{"price": {price}, "volume": {volume}}}"#)),
        response_body: Some(format!(
            r#"{{"orderbookCurrency": "{currency}", "commission": 39.0}}"#
        )),
    }
}

fn order_submit_event(status: &str) -> TapEvent {
    TapEvent::Request {
        url: "https://broker.test/_api/trading-critical/rest/order/new".to_string(),
        request_headers: HashMap::new(),
        request_body: Some("{}".to_string()),
        response_body: Some(format!(r#"{{"orderRequestStatus": "{status}"}}"#)),
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

fn drain(ui: &mut mpsc::UnboundedReceiver<UiUpdate>) -> Vec<UiUpdate> {
    let mut updates = Vec::new();
    while let Ok(update) = ui.try_recv() {
        updates.push(update);
    }
    updates
}

async fn count_requests(server: &MockServer, method_name: &str, path_name: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == method_name && r.url.path() == path_name)
        .count()
}

fn render_classes(updates: &[UiUpdate]) -> Vec<(Option<CourtageClass>, bool, Decimal)> {
    updates
        .iter()
        .filter_map(|u| match u {
            UiUpdate::Render {
                facts,
                current,
                is_foreign,
            } => Some((current.clone(), *is_foreign, facts.total)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_small_order_keeps_current_class() {
    let mut h = start_engine(test_config(), PreferencesStore::in_memory()).await;
    mount_current_class(&h.server, "MINI").await;
    mount_update_ok(&h.server).await;

    // 100 * 100 = 10 000 SEK — Mini is already optimal.
    h.tap.send(fee_preview_event("100", "100", "SEK")).unwrap();
    settle().await;

    assert_eq!(count_requests(&h.server, "GET", COURTAGE_CLASS_PATH).await, 1);
    assert_eq!(
        count_requests(&h.server, "POST", COURTAGE_CLASS_UPDATE_PATH).await,
        0
    );

    let renders = render_classes(&drain(&mut h.ui));
    assert_eq!(
        renders,
        vec![(Some(CourtageClass::Mini), false, dec!(10000))]
    );
}

#[tokio::test]
async fn test_large_order_switches_to_medium() {
    let mut h = start_engine(test_config(), PreferencesStore::in_memory()).await;
    mount_current_class(&h.server, "MINI").await;

    Mock::given(method("POST"))
        .and(path(COURTAGE_CLASS_UPDATE_PATH))
        .and(body_json(serde_json::json!({ "newClass": "MEDIUM" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    // 500 * 100 = 50 000 SEK — third tier is optimal from MINI.
    h.tap.send(fee_preview_event("500", "100", "SEK")).unwrap();
    settle().await;

    h.server.verify().await;
    let updates = drain(&mut h.ui);
    assert!(updates.iter().any(|u| matches!(
        u,
        UiUpdate::Notify {
            message,
            severity: Severity::Success
        } if message == "Courtage: Medium"
    )));
    assert_eq!(
        render_classes(&updates),
        vec![(Some(CourtageClass::Medium), false, dec!(50000))]
    );
}

#[tokio::test]
async fn test_foreign_currency_never_switches() {
    let mut h = start_engine(test_config(), PreferencesStore::in_memory()).await;
    mount_current_class(&h.server, "MINI").await;
    mount_update_ok(&h.server).await;

    h.tap
        .send(fee_preview_event("5000", "100", "USD"))
        .unwrap();
    settle().await;

    // No API traffic at all for foreign orders.
    assert_eq!(h.server.received_requests().await.unwrap().len(), 0);
    assert_eq!(
        render_classes(&drain(&mut h.ui)),
        vec![(None, true, dec!(500000))]
    );
}

#[tokio::test]
async fn test_debounce_coalesces_bursts() {
    let mut config = test_config();
    config.debounce_ms = 150;
    let mut h = start_engine(config, PreferencesStore::in_memory()).await;
    mount_current_class(&h.server, "MINI").await;

    // Three observations inside one quiet window.
    h.tap.send(fee_preview_event("100", "10", "SEK")).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    h.tap.send(fee_preview_event("100", "20", "SEK")).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    h.tap.send(fee_preview_event("100", "30", "SEK")).unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    // Exactly one evaluation, using the last update's values.
    assert_eq!(count_requests(&h.server, "GET", COURTAGE_CLASS_PATH).await, 1);
    assert_eq!(
        render_classes(&drain(&mut h.ui)),
        vec![(Some(CourtageClass::Mini), false, dec!(3000))]
    );
}

#[tokio::test]
async fn test_throttle_reuses_cached_class() {
    let mut config = test_config();
    config.min_api_interval_ms = 10_000;
    let mut h = start_engine(config, PreferencesStore::in_memory()).await;
    mount_current_class(&h.server, "MINI").await;
    mount_update_ok(&h.server).await;

    h.tap.send(fee_preview_event("100", "100", "SEK")).unwrap();
    settle().await;

    // Second evaluation inside the interval: no fresh read, but the cached
    // class still drives a switch for the larger order.
    h.tap.send(fee_preview_event("500", "100", "SEK")).unwrap();
    settle().await;

    assert_eq!(count_requests(&h.server, "GET", COURTAGE_CLASS_PATH).await, 1);
    assert_eq!(
        count_requests(&h.server, "POST", COURTAGE_CLASS_UPDATE_PATH).await,
        1
    );
    assert_eq!(
        render_classes(&drain(&mut h.ui)),
        vec![
            (Some(CourtageClass::Mini), false, dec!(10000)),
            (Some(CourtageClass::Medium), false, dec!(50000)),
        ]
    );
}

#[tokio::test]
async fn test_failed_class_read_aborts_silently() {
    let mut h = start_engine(test_config(), PreferencesStore::in_memory()).await;
    Mock::given(method("GET"))
        .and(path(COURTAGE_CLASS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;
    mount_update_ok(&h.server).await;

    h.tap.send(fee_preview_event("100", "100", "SEK")).unwrap();
    settle().await;

    // Evaluation aborted: no switch, no render, nothing cached.
    assert_eq!(
        count_requests(&h.server, "POST", COURTAGE_CLASS_UPDATE_PATH).await,
        0
    );
    assert!(drain(&mut h.ui).is_empty());
}

#[tokio::test]
async fn test_manual_mode_displays_without_switching() {
    let prefs = PreferencesStore::in_memory();
    let mut manual = prefs.current();
    manual.mode = Mode::Manual;
    prefs.update(manual).unwrap();

    let mut h = start_engine(test_config(), prefs).await;
    mount_current_class(&h.server, "MINI").await;
    mount_update_ok(&h.server).await;

    h.tap.send(fee_preview_event("500", "100", "SEK")).unwrap();
    settle().await;

    assert_eq!(count_requests(&h.server, "GET", COURTAGE_CLASS_PATH).await, 1);
    assert_eq!(
        count_requests(&h.server, "POST", COURTAGE_CLASS_UPDATE_PATH).await,
        0
    );
    assert_eq!(
        render_classes(&drain(&mut h.ui)),
        vec![(Some(CourtageClass::Mini), false, dec!(50000))]
    );
}

#[tokio::test]
async fn test_order_success_triggers_delayed_reset() {
    let mut h = start_engine(test_config(), PreferencesStore::in_memory()).await;
    Mock::given(method("POST"))
        .and(path(COURTAGE_CLASS_UPDATE_PATH))
        .and(body_json(serde_json::json!({ "newClass": "MINI" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    h.tap.send(order_submit_event("SUCCESS")).unwrap();
    settle().await;

    h.server.verify().await;
    let updates = drain(&mut h.ui);
    assert!(updates.iter().any(|u| matches!(
        u,
        UiUpdate::Notify {
            severity: Severity::Success,
            ..
        }
    )));
}

#[tokio::test]
async fn test_reset_skipped_when_disabled_or_rejected() {
    let prefs = PreferencesStore::in_memory();
    let mut no_reset = prefs.current();
    no_reset.reset_after_order = false;
    prefs.update(no_reset).unwrap();

    let mut h = start_engine(test_config(), prefs).await;
    mount_update_ok(&h.server).await;

    h.tap.send(order_submit_event("SUCCESS")).unwrap();
    // A rejected order must not trigger a reset either.
    h.tap.send(order_submit_event("ERROR")).unwrap();
    settle().await;

    assert_eq!(
        count_requests(&h.server, "POST", COURTAGE_CLASS_UPDATE_PATH).await,
        0
    );
    assert!(drain(&mut h.ui).is_empty());
}

#[tokio::test]
async fn test_captured_credentials_are_relayed() {
    let mut h = start_engine(test_config(), PreferencesStore::in_memory()).await;
    Mock::given(method("GET"))
        .and(path(COURTAGE_CLASS_PATH))
        .and(header("x-securitytoken", "tok-999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "currentCourtageClass": "MINI"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut captured = HashMap::new();
    captured.insert("x-securitytoken".to_string(), "tok-999".to_string());
    h.tap
        .send(fee_preview_event_with_headers("100", "100", "SEK", captured))
        .unwrap();
    settle().await;

    h.server.verify().await;
    assert_eq!(
        render_classes(&drain(&mut h.ui)),
        vec![(Some(CourtageClass::Mini), false, dec!(10000))]
    );
}

#[tokio::test]
async fn test_preferences_change_reevaluates() {
    let mut h = start_engine(test_config(), PreferencesStore::in_memory()).await;
    mount_current_class(&h.server, "MINI").await;

    h.tap.send(fee_preview_event("100", "100", "SEK")).unwrap();
    settle().await;
    assert_eq!(render_classes(&drain(&mut h.ui)).len(), 1);

    // Flipping the mode re-runs the decision for the facts on hand.
    let mut prefs = h.prefs.current();
    prefs.mode = Mode::Manual;
    h.prefs.update(prefs).unwrap();
    settle().await;

    assert_eq!(
        render_classes(&drain(&mut h.ui)),
        vec![(Some(CourtageClass::Mini), false, dec!(10000))]
    );
}

#[tokio::test]
async fn test_input_scan_recomputes_and_switches() {
    let mut config = test_config();
    config.min_api_interval_ms = 10_000;
    let mut h = start_engine(config, PreferencesStore::in_memory()).await;
    mount_current_class(&h.server, "MINI").await;
    mount_update_ok(&h.server).await;

    // Establish facts and a cached class first.
    h.tap.send(fee_preview_event("100", "100", "SEK")).unwrap();
    settle().await;
    drain(&mut h.ui);

    // The user edits volume: 100 → 500 shares at 100 kr.
    let scan = serde_json::from_str::<TapEvent>(
        r#"{"type": "inputScan", "fields": [
            {"value": "500", "context": "Antal st"},
            {"value": "100", "context": "Kurs"}
        ]}"#,
    )
    .unwrap();
    h.tap.send(scan).unwrap();
    settle().await;

    // No debounce wait for input scans; throttled read reuses the cache.
    assert_eq!(count_requests(&h.server, "GET", COURTAGE_CLASS_PATH).await, 1);
    assert_eq!(
        count_requests(&h.server, "POST", COURTAGE_CLASS_UPDATE_PATH).await,
        1
    );
    assert_eq!(
        render_classes(&drain(&mut h.ui)),
        vec![(Some(CourtageClass::Medium), false, dec!(50000))]
    );
}

#[tokio::test]
async fn test_unchanged_input_scan_is_a_noop() {
    let mut h = start_engine(test_config(), PreferencesStore::in_memory()).await;
    mount_current_class(&h.server, "MINI").await;

    h.tap.send(fee_preview_event("100", "100", "SEK")).unwrap();
    settle().await;
    drain(&mut h.ui);

    // Same total as before: nothing downstream runs.
    let scan = serde_json::from_str::<TapEvent>(
        r#"{"type": "inputScan", "fields": [
            {"value": "100", "context": "Antal"},
            {"value": "100", "context": "Kurs"}
        ]}"#,
    )
    .unwrap();
    h.tap.send(scan).unwrap();
    settle().await;

    assert!(drain(&mut h.ui).is_empty());
    assert_eq!(count_requests(&h.server, "GET", COURTAGE_CLASS_PATH).await, 1);
}

#[tokio::test]
async fn test_manual_switch_event() {
    let mut h = start_engine(test_config(), PreferencesStore::in_memory()).await;
    Mock::given(method("POST"))
        .and(path(COURTAGE_CLASS_UPDATE_PATH))
        .and(body_json(serde_json::json!({ "newClass": "FASTPRIS" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let event = serde_json::from_str::<TapEvent>(
        r#"{"type": "manualSwitch", "class": "FASTPRIS"}"#,
    )
    .unwrap();
    h.tap.send(event).unwrap();
    settle().await;

    h.server.verify().await;
    let updates = drain(&mut h.ui);
    assert!(updates.iter().any(|u| matches!(
        u,
        UiUpdate::Notify {
            message,
            severity: Severity::Success
        } if message == "Courtage: Fast Pris"
    )));
}

#[tokio::test]
async fn test_manual_switch_failure_notifies() {
    let mut h = start_engine(test_config(), PreferencesStore::in_memory()).await;
    Mock::given(method("POST"))
        .and(path(COURTAGE_CLASS_UPDATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": false })),
        )
        .mount(&h.server)
        .await;

    let event =
        serde_json::from_str::<TapEvent>(r#"{"type": "manualSwitch", "class": "SMALL"}"#).unwrap();
    h.tap.send(event).unwrap();
    settle().await;

    let updates = drain(&mut h.ui);
    assert!(updates.iter().any(|u| matches!(
        u,
        UiUpdate::Notify {
            severity: Severity::Error,
            ..
        }
    )));
}
