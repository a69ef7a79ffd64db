//! Drives one submit attempt: validate, resolve media, transform, send.

use crate::api::{ContentApi, UploadGateway};
use crate::config::UpdatePolicy;
use crate::error::{DashboardError, Result};
use crate::models::{Collection, Entity};
use crate::pipeline;
use crate::transform::{changed_fields, to_wire};
use crate::validation::{ValidationIssue, Validator};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Resolving,
    Submitting,
    Succeeded,
    Failed(String),
}

impl SubmissionState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionState::Resolving | SubmissionState::Submitting)
    }
}

/// Notifications emitted after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Cached list data of this collection is stale.
    CollectionChanged(Collection),
    /// The dashboard should move to this route.
    Navigate(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitMode {
    Create,
    Update {
        id: String,
        /// Transformed payload of the entity as it was loaded.
        baseline: Option<Value>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Succeeded(Value),
    Invalid(Vec<ValidationIssue>),
    Failed(String),
    /// Another submission of this form was still in flight.
    Ignored,
}

impl SubmitOutcome {
    pub fn into_result(self) -> Result<Value> {
        match self {
            SubmitOutcome::Succeeded(response) => Ok(response),
            SubmitOutcome::Invalid(issues) => Err(DashboardError::Validation(issues)),
            SubmitOutcome::Failed(reason) => Err(DashboardError::Submission(reason)),
            SubmitOutcome::Ignored => Err(DashboardError::Submission(
                "a submission is already in progress".to_string(),
            )),
        }
    }
}

/// Held while a claimed submission runs. If the submit future is dropped
/// before reaching a terminal state the form is marked cancelled, so later
/// submits are not ignored forever.
struct InFlight<'a>(&'a watch::Sender<SubmissionState>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.send_if_modified(|state| {
            if !state.is_in_flight() {
                return false;
            }
            tracing::warn!("Submission dropped while {:?}", state);
            *state = SubmissionState::Failed(CANCELLED.to_string());
            true
        });
    }
}

const CANCELLED: &str = "submission cancelled";

pub struct SubmissionOrchestrator {
    api: Arc<dyn ContentApi>,
    gateway: Arc<dyn UploadGateway>,
    events: broadcast::Sender<FormEvent>,
    policy: UpdatePolicy,
    state: watch::Sender<SubmissionState>,
}

impl SubmissionOrchestrator {
    pub fn new(
        api: Arc<dyn ContentApi>,
        gateway: Arc<dyn UploadGateway>,
        events: broadcast::Sender<FormEvent>,
        policy: UpdatePolicy,
    ) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        SubmissionOrchestrator {
            api,
            gateway,
            events,
            policy,
            state,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Runs one submission of `draft`.
    ///
    /// On success the resolved tree replaces `draft`, so a retry after a
    /// rejected write does not upload the same files again. On upload
    /// failure `draft` is left exactly as it was.
    pub async fn submit<T: Entity>(
        &self,
        draft: &mut T,
        mode: &SubmitMode,
        validator: &dyn Validator<T>,
    ) -> SubmitOutcome {
        if self.state.borrow().is_in_flight() {
            tracing::debug!("Ignoring submit, {} submission in flight", T::COLLECTION.singular());
            return SubmitOutcome::Ignored;
        }

        let issues = validator.validate(draft);
        if !issues.is_empty() {
            tracing::debug!("{} draft has {} validation issues", T::COLLECTION.singular(), issues.len());
            return SubmitOutcome::Invalid(issues);
        }

        let claimed = self.state.send_if_modified(|state| {
            if state.is_in_flight() {
                return false;
            }
            *state = SubmissionState::Resolving;
            true
        });
        if !claimed {
            return SubmitOutcome::Ignored;
        }
        let _in_flight = InFlight(&self.state);

        let resolved = match pipeline::resolve(draft, self.gateway.as_ref()).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::error!("Media resolution failed: {}", e);
                return self.fail("media upload failed".to_string());
            }
        };
        *draft = resolved;

        self.state.send_replace(SubmissionState::Submitting);
        let payload = match to_wire(draft) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to build {} payload: {}", T::COLLECTION.singular(), e);
                return self.fail(format!(
                    "Internal error while preparing the {}.",
                    T::COLLECTION.singular()
                ));
            }
        };

        match self.send(T::COLLECTION, mode, payload).await {
            Ok(response) => {
                self.state.send_replace(SubmissionState::Succeeded);
                self.emit(FormEvent::CollectionChanged(T::COLLECTION));
                self.emit(FormEvent::Navigate(T::COLLECTION.list_route()));
                SubmitOutcome::Succeeded(response)
            }
            Err(e) => {
                tracing::warn!("Saving {} failed: {}", T::COLLECTION.singular(), e);
                let reason = match e {
                    DashboardError::Api {
                        message: Some(message),
                        ..
                    } => message,
                    _ => format!(
                        "Failed to save {}. Please try again.",
                        T::COLLECTION.singular()
                    ),
                };
                self.fail(reason)
            }
        }
    }

    async fn send(&self, collection: Collection, mode: &SubmitMode, payload: Value) -> Result<Value> {
        match mode {
            SubmitMode::Create => {
                tracing::info!("Creating {}", collection.singular());
                self.api.create(collection, payload).await
            }
            SubmitMode::Update { id, baseline } => {
                let body = match (self.policy, baseline) {
                    (UpdatePolicy::ChangedFields, Some(baseline)) => changed_fields(&payload, baseline),
                    _ => payload,
                };
                tracing::info!("Updating {} {}", collection.singular(), id);
                self.api.update(collection, id, body).await
            }
        }
    }

    fn fail(&self, reason: String) -> SubmitOutcome {
        self.state.send_replace(SubmissionState::Failed(reason.clone()));
        SubmitOutcome::Failed(reason)
    }

    fn emit(&self, event: FormEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("No listeners for form events");
        }
    }
}
