//! Resolution of classified interrupts into decisions.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::classify::InterruptFlow;
use crate::operator::{Notice, Operator};
use crate::types::{AuthorizationHandle, Decision};
use crate::{Error, Result};

const APPROVAL_QUESTION: &str = "Do you approve this tool call?";

/// External channel reporting when an out-of-band authorization completes.
#[async_trait]
pub trait AuthorizationChannel: Send + Sync {
    /// Block until the authorization identified by `authorization_id`
    /// completes. Any error means it did not.
    async fn wait_for_completion(&self, authorization_id: &str) -> Result<()>;
}

/// Turns one [`InterruptFlow`] into one [`Decision`].
///
/// Authorization and approval failures never escape as errors: they become
/// `authorized = false` so the run can resume and skip the tool call. Only
/// operator I/O failures are returned.
#[derive(Clone)]
pub struct DecisionResolver {
    channel: Arc<dyn AuthorizationChannel>,
    wait_timeout: Option<Duration>,
}

impl DecisionResolver {
    pub fn new(channel: Arc<dyn AuthorizationChannel>) -> Self {
        Self {
            channel,
            wait_timeout: None,
        }
    }

    /// Give up on an authorization after `timeout`. Without one, a wait that
    /// never completes blocks the session.
    pub fn with_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub async fn resolve<O>(&self, flow: InterruptFlow, operator: &mut O) -> Result<Decision>
    where
        O: Operator + ?Sized,
    {
        match flow {
            InterruptFlow::Authorization { tool_name, handle } => {
                self.authorize(&tool_name, handle, operator).await
            }
            InterruptFlow::HumanApproval { tool_name, input } => {
                operator
                    .notify(Notice::ApprovalRequired {
                        tool_name: tool_name.clone(),
                        input,
                    })
                    .await?;
                let approved = operator.confirm(APPROVAL_QUESTION).await?;
                info!(tool = %tool_name, approved, "Operator answered approval request");
                Ok(Decision::from(approved))
            }
            InterruptFlow::Unclassified => {
                warn!("Unrecognized interrupt payload, declining");
                Ok(Decision::deny())
            }
        }
    }

    async fn authorize<O>(
        &self,
        tool_name: &str,
        handle: AuthorizationHandle,
        operator: &mut O,
    ) -> Result<Decision>
    where
        O: Operator + ?Sized,
    {
        operator
            .notify(Notice::AuthorizationRequired {
                tool_name: tool_name.to_string(),
                url: handle.url.clone(),
            })
            .await?;
        operator.notify(Notice::AwaitingAuthorization).await?;
        debug!(tool = %tool_name, authorization_id = %handle.id, "Waiting for authorization");

        match self.wait(&handle.id).await {
            Ok(()) => {
                info!(tool = %tool_name, "Authorization completed");
                operator.notify(Notice::AuthorizationGranted).await?;
                Ok(Decision::approve())
            }
            Err(e) => {
                warn!(tool = %tool_name, error = %e, "Authorization did not complete");
                operator
                    .notify(Notice::AuthorizationFailed {
                        error: e.to_string(),
                    })
                    .await?;
                Ok(Decision::deny())
            }
        }
    }

    async fn wait(&self, authorization_id: &str) -> Result<()> {
        let wait = self.channel.wait_for_completion(authorization_id);
        match self.wait_timeout {
            Some(timeout) => tokio::time::timeout(timeout, wait)
                .await
                .map_err(|_| Error::Timeout(timeout))?,
            None => wait.await,
        }
    }
}
