use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::{
    Confirmation, DraftPatch, FieldRequirements, FlowEvent, FlowState, ServiceId, Submission,
    SubmissionKind,
};
use crate::services::delivery::{deliver_with_timeout, LeadDelivery};
use crate::services::flow::{FlowError, FlowSnapshot, LeadFlow};

#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub default_service: ServiceId,
    pub requirements: FieldRequirements,
    pub submit_delay: Duration,
    pub reset_delay: Duration,
    pub delivery_timeout: Duration,
}

impl FlowSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_service: config.default_service,
            requirements: config.booking_requirements(),
            submit_delay: Duration::from_millis(config.submit_delay_ms),
            reset_delay: Duration::from_millis(config.reset_delay_ms),
            delivery_timeout: Duration::from_millis(config.delivery_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub scroll_locked: bool,
    #[serde(flatten)]
    pub flow: FlowSnapshot,
}

struct Inner {
    flow: LeadFlow,
    scroll_locked: bool,
    // Bumped by every open/close/teardown. A timer only acts if the epoch it
    // was scheduled under is still current.
    epoch: u64,
    submit_task: Option<JoinHandle<()>>,
    reset_task: Option<JoinHandle<()>>,
    last_submission: Option<Submission>,
}

impl Inner {
    fn cancel_timers(&mut self) {
        if let Some(task) = self.submit_task.take() {
            task.abort();
        }
        if let Some(task) = self.reset_task.take() {
            task.abort();
        }
    }
}

/// Opens and closes one visitor's lead capture flow.
///
/// Pages never touch the flow directly: they ask the coordinator to open it
/// (optionally for a given service), and the coordinator owns scroll locking,
/// the simulated submission delay and the deferred reset after close.
pub struct BookingCoordinator {
    id: Uuid,
    settings: FlowSettings,
    delivery: Arc<dyn LeadDelivery>,
    events: broadcast::Sender<FlowEvent>,
    inner: Mutex<Inner>,
}

impl BookingCoordinator {
    pub fn new(id: Uuid, settings: FlowSettings, delivery: Arc<dyn LeadDelivery>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        let flow = LeadFlow::new(settings.default_service, settings.requirements);
        Arc::new(Self {
            id,
            settings,
            delivery,
            events,
            inner: Mutex::new(Inner {
                flow,
                scroll_locked: false,
                epoch: 0,
                submit_task: None,
                reset_task: None,
                last_submission: None,
            }),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        SessionSnapshot {
            id: self.id,
            scroll_locked: inner.scroll_locked,
            flow: inner.flow.snapshot(),
        }
    }

    pub fn state(&self) -> FlowState {
        self.lock().flow.state()
    }

    pub fn scroll_locked(&self) -> bool {
        self.lock().scroll_locked
    }

    pub fn open(&self, service: Option<ServiceId>, details_override: Option<String>) {
        let mut inner = self.lock();
        inner.epoch += 1;
        inner.cancel_timers();
        inner.last_submission = None;
        inner.flow.open(service, details_override);
        inner.scroll_locked = true;

        let state = inner.flow.state();
        tracing::info!(session = %self.id, state = state.as_str(), ?service, "lead flow opened");
        self.emit(FlowEvent::Opened { state, service });
    }

    /// Hides the flow straight away and wipes the draft once the reset delay
    /// has passed. Closing a closed flow does nothing.
    pub fn close(self: &Arc<Self>) {
        let mut inner = self.lock();
        if !inner.flow.is_open() && !inner.scroll_locked {
            return;
        }
        self.hide_and_schedule_reset(&mut inner);
    }

    pub fn select_service(&self, service: ServiceId) -> Result<(), FlowError> {
        let mut inner = self.lock();
        inner.flow.select_service(service)?;
        tracing::debug!(session = %self.id, service = service.as_str(), "service selected");
        self.emit(FlowEvent::ServiceSelected { service });
        Ok(())
    }

    pub fn update(&self, patch: DraftPatch) -> Result<(), FlowError> {
        self.lock().flow.apply(patch)
    }

    /// Validates the draft and starts the submission. The flow reaches
    /// `Confirmed` once the submit delay has elapsed and delivery has finished
    /// or timed out, whatever delivery's outcome.
    pub fn submit(self: &Arc<Self>) -> Result<(), FlowError> {
        let mut inner = self.lock();
        let lead = inner.flow.begin_submit()?;
        let submission = Submission::new(SubmissionKind::Booking(lead));
        let epoch = inner.epoch;

        tracing::info!(session = %self.id, submission_id = %submission.id, "submitting lead");
        self.emit(FlowEvent::Submitting);

        // Delivery runs detached so a lead is not lost when the visitor closes
        // the flow mid-submission. Only the view update is cancellable.
        let delivery = Arc::clone(&self.delivery);
        let timeout = self.settings.delivery_timeout;
        let outgoing = submission.clone();
        let delivery_task = tokio::spawn(async move {
            deliver_with_timeout(delivery.as_ref(), &outgoing, timeout).await
        });

        let this: Weak<Self> = Arc::downgrade(self);
        let delay = self.settings.submit_delay;
        inner.submit_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let delivered = delivery_task.await.unwrap_or(false);
            if let Some(this) = this.upgrade() {
                this.finish_submission(epoch, submission, delivered);
            }
        }));

        Ok(())
    }

    /// Re-delivers the confirmed lead. Never changes the flow state.
    pub async fn resend(&self) -> Result<bool, FlowError> {
        let (submission, epoch) = {
            let inner = self.lock();
            let state = inner.flow.state();
            match (state, inner.last_submission.clone()) {
                (FlowState::Confirmed, Some(submission)) => (submission, inner.epoch),
                _ => {
                    return Err(FlowError::InvalidTransition {
                        action: "resend",
                        state,
                    })
                }
            }
        };

        let delivered = deliver_with_timeout(
            self.delivery.as_ref(),
            &submission,
            self.settings.delivery_timeout,
        )
        .await;

        if delivered {
            let mut inner = self.lock();
            if inner.epoch == epoch {
                inner.flow.mark_delivered();
            }
        }
        Ok(delivered)
    }

    pub fn dismiss(self: &Arc<Self>) -> Result<(), FlowError> {
        let mut inner = self.lock();
        inner.flow.dismiss()?;
        self.hide_and_schedule_reset(&mut inner);
        Ok(())
    }

    /// Drops everything at once, as when the page hosting the flow goes away.
    pub fn teardown(&self) {
        let mut inner = self.lock();
        inner.epoch += 1;
        inner.cancel_timers();
        let was_open = inner.flow.hide();
        inner.flow.reset();
        inner.last_submission = None;
        inner.scroll_locked = false;
        if was_open {
            self.emit(FlowEvent::Closed);
        }
        tracing::debug!(session = %self.id, "lead flow torn down");
    }

    fn hide_and_schedule_reset(self: &Arc<Self>, inner: &mut Inner) {
        inner.epoch += 1;
        inner.cancel_timers();
        inner.flow.hide();
        inner.scroll_locked = false;
        tracing::info!(session = %self.id, "lead flow closed");
        self.emit(FlowEvent::Closed);

        let epoch = inner.epoch;
        let delay = self.settings.reset_delay;
        if delay.is_zero() {
            self.reset_draft(inner);
            return;
        }

        let this: Weak<Self> = Arc::downgrade(self);
        inner.reset_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(this) = this.upgrade() {
                let mut inner = this.lock();
                if inner.epoch == epoch {
                    inner.reset_task = None;
                    this.reset_draft(&mut inner);
                }
            }
        }));
    }

    fn reset_draft(&self, inner: &mut Inner) {
        inner.flow.reset();
        inner.last_submission = None;
        self.emit(FlowEvent::Reset);
    }

    fn finish_submission(&self, epoch: u64, submission: Submission, delivered: bool) {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            tracing::debug!(session = %self.id, submission_id = %submission.id, "submission finished after flow moved on");
            return;
        }
        inner.submit_task = None;

        let lead = match &submission.kind {
            SubmissionKind::Booking(lead) | SubmissionKind::Contact(lead) => lead.clone(),
            SubmissionKind::Application(_) => return,
        };
        let confirmation = Confirmation {
            submission_id: submission.id,
            lead,
            delivered,
            confirmed_at: Utc::now(),
        };

        if let Err(e) = inner.flow.complete(confirmation.clone()) {
            tracing::warn!(session = %self.id, error = %e, "could not confirm submission");
            return;
        }
        inner.last_submission = Some(submission);

        tracing::info!(session = %self.id, submission_id = %confirmation.submission_id, delivered, "lead confirmed");
        self.emit(FlowEvent::Confirmed { confirmation });
    }

    fn emit(&self, event: FlowEvent) {
        // No receivers is fine
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for BookingCoordinator {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        inner.cancel_timers();
    }
}
