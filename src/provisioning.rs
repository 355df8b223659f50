//! Profile Provisioning
//!
//! Registration hands profile creation off to this worker instead of
//! awaiting it. Every submission runs as its own task under a single
//! supervisor, so one slow insert does not hold up the others. Outcomes
//! are logged and broadcast to any subscriber. Failed creations are not
//! retried.

use crate::models::CreateProfileRequest;
use crate::store::ProfileStore;

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;

/// Result of one profile creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created { user_id: String },
    Failed { user_id: String, error: String },
}

impl ProvisionOutcome {
    pub fn user_id(&self) -> &str {
        match self {
            ProvisionOutcome::Created { user_id } | ProvisionOutcome::Failed { user_id, .. } => {
                user_id
            }
        }
    }
}

/// Handle to the provisioning supervisor.
///
/// Dropping every handle closes the queue; the supervisor then drains
/// in-flight creations and exits.
#[derive(Clone)]
pub struct ProfileProvisioner {
    queue: mpsc::UnboundedSender<CreateProfileRequest>,
    outcomes: broadcast::Sender<ProvisionOutcome>,
}

impl ProfileProvisioner {
    /// Start the supervisor on the current Tokio runtime
    pub fn spawn(profiles: Arc<dyn ProfileStore>) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let (outcomes, _) = broadcast::channel(64);

        tokio::spawn(supervise(profiles, rx, outcomes.clone()));

        Self { queue, outcomes }
    }

    /// Queue a profile creation without waiting for it
    pub fn submit(&self, req: CreateProfileRequest) {
        let user_id = req.user_id.clone();
        if self.queue.send(req).is_err() {
            tracing::error!(user_id = %user_id, "Profile provisioner is not running, profile dropped");
        }
    }

    /// Receive outcomes of submissions made after this call
    pub fn subscribe(&self) -> broadcast::Receiver<ProvisionOutcome> {
        self.outcomes.subscribe()
    }
}

async fn supervise(
    profiles: Arc<dyn ProfileStore>,
    mut rx: mpsc::UnboundedReceiver<CreateProfileRequest>,
    outcomes: broadcast::Sender<ProvisionOutcome>,
) {
    let mut tasks: JoinSet<ProvisionOutcome> = JoinSet::new();
    let mut open = true;

    while open || !tasks.is_empty() {
        tokio::select! {
            received = rx.recv(), if open => match received {
                Some(req) => {
                    let profiles = profiles.clone();
                    tasks.spawn(async move { create_profile(profiles.as_ref(), req).await });
                }
                None => open = false,
            },
            Some(joined) = tasks.join_next() => {
                let outcome = match joined {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!("Profile provisioning task panicked: {:?}", e);
                        continue;
                    }
                };
                // No subscribers is fine.
                let _ = outcomes.send(outcome);
            }
        }
    }

    tracing::debug!("Profile provisioner stopped");
}

async fn create_profile(profiles: &dyn ProfileStore, req: CreateProfileRequest) -> ProvisionOutcome {
    let user_id = req.user_id.clone();

    match profiles.create(&req).await {
        Ok(_) => {
            tracing::info!(user_id = %user_id, "Profile created");
            ProvisionOutcome::Created { user_id }
        }
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Profile creation failed");
            ProvisionOutcome::Failed {
                user_id,
                error: e.to_string(),
            }
        }
    }
}
