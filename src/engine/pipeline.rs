//! Decision pipeline: currency gate, throttled class read, optimal tier
//! computation, apply-or-display.

use std::sync::Arc;

use avanza::{tariff, AvanzaHttpClient};
use tracing::{error, info};

use crate::prefs::{Mode, PreferencesStore};
use crate::sink::PresentationSink;

use super::config::EngineConfig;
use super::coordinator::{SwitchCoordinator, SwitchOrigin};
use super::decoder::OrderFacts;
use super::session::SessionContext;

/// Whether a fresh class read is allowed at `now_ms`, given the time of the
/// last successful read.
fn read_allowed(last_checked_ms: Option<u64>, min_interval_ms: u64, now_ms: u64) -> bool {
    match last_checked_ms {
        None => true,
        Some(checked) => now_ms.saturating_sub(checked) >= min_interval_ms,
    }
}

/// Evaluates order facts against the account's current courtage class.
pub struct DecisionPipeline {
    config: EngineConfig,
    client: Arc<AvanzaHttpClient>,
    session: Arc<SessionContext>,
    prefs: PreferencesStore,
    coordinator: SwitchCoordinator,
    sink: PresentationSink,
}

impl DecisionPipeline {
    pub fn new(
        config: EngineConfig,
        client: Arc<AvanzaHttpClient>,
        session: Arc<SessionContext>,
        prefs: PreferencesStore,
        coordinator: SwitchCoordinator,
        sink: PresentationSink,
    ) -> Self {
        Self {
            config,
            client,
            session,
            prefs,
            coordinator,
            sink,
        }
    }

    /// Evaluate the given order facts end to end.
    ///
    /// `now_ms` is engine-relative time, used only to gate the class read.
    /// Aborted evaluations (failed read, throttled with nothing cached)
    /// leave all state untouched and emit nothing.
    pub async fn process_order(&self, facts: &OrderFacts, now_ms: u64) {
        let prefs = self.prefs.current();

        if facts.currency != self.config.base_currency {
            info!(currency = %facts.currency, total = %facts.total, "foreign order, skipping automatic switch");
            self.sink.render(facts.clone(), None, true);
            return;
        }

        let current = if read_allowed(
            self.session.last_checked_ms(),
            self.config.min_api_interval_ms,
            now_ms,
        ) {
            match self
                .client
                .get_courtage_class(&self.session.credential_headers())
                .await
            {
                Ok(class) => {
                    self.session.record_read(class.clone(), now_ms);
                    class
                }
                Err(e) => {
                    error!(error = %e, "failed to read current courtage class");
                    return;
                }
            }
        } else {
            match self.session.last_known() {
                Some(class) => class,
                // Nothing cached to compare against; wait for the next window.
                None => return,
            }
        };

        let optimal = tariff::solve_optimal(facts.total, &current);
        info!(total = %facts.total, current = %current, optimal = %optimal, "evaluated order");

        if prefs.mode == Mode::Automatic && optimal != current {
            self.coordinator
                .switch_to(optimal.clone(), SwitchOrigin::Automatic)
                .await;
            self.sink.render(facts.clone(), Some(optimal), false);
        } else {
            self.sink.render(facts.clone(), Some(current), false);
        }
    }
}
