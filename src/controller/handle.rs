//! Cloneable front door to the signal actor

use tokio::sync::{mpsc, oneshot};

use super::actor::{SignalCommand, Subscription};
use super::ControllerError;
use crate::types::{DetectionOutcome, DetectionReport, PhaseSnapshot, SignalStatus};

/// Handle to interact with SignalActor
#[derive(Debug, Clone)]
pub struct SignalHandle {
    tx: mpsc::Sender<SignalCommand>,
}

impl SignalHandle {
    pub(super) const fn new(tx: mpsc::Sender<SignalCommand>) -> Self {
        Self { tx }
    }

    /// Apply a detection report and return the resulting state
    pub async fn report_detection(
        &self,
        report: DetectionReport,
    ) -> Result<DetectionOutcome, ControllerError> {
        self.request(|response_tx| SignalCommand::Detection {
            report,
            response_tx,
        })
        .await
    }

    /// Reset to GO with a full countdown and a freshly armed timer
    pub async fn reset(&self) -> Result<PhaseSnapshot, ControllerError> {
        self.request(|response_tx| SignalCommand::Reset { response_tx })
            .await
    }

    /// Current phase, countdown and presence
    pub async fn status(&self) -> Result<SignalStatus, ControllerError> {
        self.request(|response_tx| SignalCommand::Status { response_tx })
            .await
    }

    /// Register an observer; see [`Subscription`]
    pub async fn subscribe(&self) -> Result<Subscription, ControllerError> {
        self.request(|response_tx| SignalCommand::Subscribe { response_tx })
            .await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SignalCommand,
    ) -> Result<T, ControllerError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.tx
            .send(command(response_tx))
            .await
            .map_err(|_| ControllerError::Stopped)?;
        response_rx.await.map_err(|_| ControllerError::NoReply)
    }
}
