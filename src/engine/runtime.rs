//! Event loop wiring the tap, the pipeline, and the coordinator.

use std::sync::Arc;

use avanza::AvanzaHttpClient;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::prefs::PreferencesStore;
use crate::sink::PresentationSink;

use super::config::EngineConfig;
use super::coordinator::{SwitchCoordinator, SwitchOrigin};
use super::decoder::{self, OrderFacts};
use super::observer;
use super::pipeline::DecisionPipeline;
use super::session::SessionContext;
use super::traffic::{InputField, TapEvent, FEE_PREVIEW_PATH, ORDER_SUBMIT_PATH};

/// The tier decision engine.
///
/// Owns the session context and the current order facts. Everything runs
/// on the single task driving [`Engine::run`]; the awaited API calls and
/// the spawned reset task are the only interleavings.
pub struct Engine {
    config: EngineConfig,
    session: Arc<SessionContext>,
    pipeline: DecisionPipeline,
    coordinator: SwitchCoordinator,
    prefs: PreferencesStore,
    sink: PresentationSink,
    /// Engine-relative clock origin for the read throttle.
    epoch: Instant,
    /// Facts owned here until a newer observation supersedes them.
    current_facts: Option<OrderFacts>,
    /// Pending debounced evaluation, if any.
    debounce_deadline: Option<Instant>,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        client: Arc<AvanzaHttpClient>,
        prefs: PreferencesStore,
        sink: PresentationSink,
    ) -> Self {
        let session = Arc::new(SessionContext::new());
        let coordinator = SwitchCoordinator::new(
            Arc::clone(&client),
            Arc::clone(&session),
            sink.clone(),
            Duration::from_millis(config.reset_delay_ms),
        );
        let pipeline = DecisionPipeline::new(
            config.clone(),
            client,
            Arc::clone(&session),
            prefs.clone(),
            coordinator.clone(),
            sink.clone(),
        );
        Self {
            config,
            session,
            pipeline,
            coordinator,
            prefs,
            sink,
            epoch: Instant::now(),
            current_facts: None,
            debounce_deadline: None,
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Run until the tap closes or `cancel` fires.
    pub async fn run(mut self, mut tap_rx: mpsc::UnboundedReceiver<TapEvent>, cancel: CancellationToken) {
        let mut prefs_rx = self.prefs.subscribe();
        let mut prefs_alive = true;
        info!(base_currency = %self.config.base_currency, "engine started");

        loop {
            let deadline = self.debounce_deadline;
            tokio::select! {
                event = tap_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => {
                            info!("traffic tap closed");
                            break;
                        }
                    }
                }

                // Debounced evaluation of the most recent facts.
                _ = async { sleep_until(deadline.unwrap()).await }, if deadline.is_some() => {
                    self.debounce_deadline = None;
                    if let Some(facts) = self.current_facts.clone() {
                        self.pipeline.process_order(&facts, self.now_ms()).await;
                    }
                }

                // A preferences change re-evaluates the current facts.
                changed = prefs_rx.changed(), if prefs_alive => {
                    match changed {
                        Ok(()) => {
                            debug!("preferences changed");
                            if let Some(facts) = self.current_facts.clone() {
                                self.pipeline.process_order(&facts, self.now_ms()).await;
                            }
                        }
                        Err(_) => prefs_alive = false,
                    }
                }

                _ = cancel.cancelled() => {
                    info!("shutting down");
                    break;
                }
            }
        }
    }

    async fn handle_event(&mut self, event: TapEvent) {
        match event {
            TapEvent::Request {
                url,
                request_headers,
                request_body,
                response_body,
            } => {
                if url.contains(FEE_PREVIEW_PATH) {
                    observer::observe_request(&self.session, &url, &request_headers);
                    let Some(response_body) = response_body.as_deref() else {
                        return;
                    };
                    if let Some(facts) =
                        decoder::decode_fee_preview(request_body.as_deref(), response_body)
                    {
                        debug!(total = %facts.total, currency = %facts.currency, "order facts observed");
                        self.current_facts = Some(facts);
                        // Reschedule: only the newest facts in a quiet
                        // window get evaluated.
                        self.debounce_deadline =
                            Some(Instant::now() + Duration::from_millis(self.config.debounce_ms));
                    }
                } else if url.contains(ORDER_SUBMIT_PATH) {
                    let Some(body) = response_body.as_deref() else {
                        return;
                    };
                    if decoder::order_submitted_ok(body) {
                        self.on_order_success();
                    }
                }
            }
            TapEvent::InputScan { fields } => self.on_input_scan(&fields).await,
            TapEvent::ManualSwitch { class } => {
                let switched = self
                    .coordinator
                    .switch_to(class.clone(), SwitchOrigin::Manual)
                    .await;
                if switched {
                    if let Some(facts) = self.current_facts.clone() {
                        let is_foreign = facts.currency != self.config.base_currency;
                        self.sink.render(facts, Some(class), is_foreign);
                    }
                }
            }
        }
    }

    /// Live-edit recalculation: needs prior facts and a known class, and a
    /// changed total. The tap already debounced the edits, so this goes
    /// straight to the pipeline.
    async fn on_input_scan(&mut self, fields: &[InputField]) {
        if self.session.last_known().is_none() {
            return;
        }
        let Some(facts) = self.current_facts.as_mut() else {
            return;
        };
        let Some(total) = decoder::scan_order_inputs(fields) else {
            return;
        };
        if total == facts.total {
            return;
        }

        info!(total = %total, "recalculated total from form inputs");
        facts.total = total;
        let facts = facts.clone();
        self.pipeline.process_order(&facts, self.now_ms()).await;
    }

    fn on_order_success(&self) {
        let prefs = self.prefs.current();
        if !prefs.reset_after_order {
            debug!("order submitted, reset disabled");
            return;
        }
        info!(default = %prefs.default_class, "order submitted, scheduling courtage reset");
        self.coordinator.schedule_reset(prefs.default_class);
    }
}
