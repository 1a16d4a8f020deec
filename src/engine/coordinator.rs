//! Serialized courtage-class switching.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use avanza::{tariff, AvanzaHttpClient, CourtageClass};
use tracing::{debug, error, info};

use crate::sink::{PresentationSink, Severity};

use super::session::SessionContext;

/// What triggered a switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOrigin {
    /// Decision pipeline in automatic mode.
    Automatic,
    /// A tier button in the host panel.
    Manual,
    /// Post-order reset to the default class.
    Reset,
}

/// Releases the in-flight flag on every exit path, panics included.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then_some(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Issues tier-change calls, at most one in flight at a time.
///
/// Two switch requests can interleave across the awaited API round trip
/// (the reset task and the manual relay run concurrently with the
/// pipeline), so the guard is a real atomic rather than loop state.
#[derive(Clone)]
pub struct SwitchCoordinator {
    client: Arc<AvanzaHttpClient>,
    session: Arc<SessionContext>,
    sink: PresentationSink,
    reset_delay: Duration,
}

impl SwitchCoordinator {
    pub fn new(
        client: Arc<AvanzaHttpClient>,
        session: Arc<SessionContext>,
        sink: PresentationSink,
        reset_delay: Duration,
    ) -> Self {
        Self {
            client,
            session,
            sink,
            reset_delay,
        }
    }

    /// Switch the account to `class`.
    ///
    /// A call arriving while another switch is in flight is dropped, not
    /// queued. Returns whether the switch was confirmed.
    pub async fn switch_to(&self, class: CourtageClass, origin: SwitchOrigin) -> bool {
        let Some(_guard) = InFlightGuard::acquire(&self.session.switch_in_flight) else {
            debug!(class = %class, ?origin, "switch already in flight, dropping request");
            return false;
        };

        info!(class = %class, ?origin, "switching courtage class");
        match self
            .client
            .update_courtage_class(&class, &self.session.credential_headers())
            .await
        {
            Ok(()) => {
                self.session.record_switch(class.clone());
                self.sink.notify(
                    format!("Courtage: {}", tariff::class_label(&class)),
                    Severity::Success,
                );
                true
            }
            Err(e) => {
                error!(error = %e, class = %class, "courtage class switch failed");
                if origin == SwitchOrigin::Manual {
                    self.sink.notify(
                        format!("Could not switch to {}", tariff::class_label(&class)),
                        Severity::Error,
                    );
                }
                false
            }
        }
    }

    /// Schedule the post-order reset switch after the configured delay,
    /// letting the account settle first.
    pub fn schedule_reset(&self, default_class: CourtageClass) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(coordinator.reset_delay).await;
            coordinator
                .switch_to(default_class, SwitchOrigin::Reset)
                .await;
        });
    }
}
