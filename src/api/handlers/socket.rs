//! Observer WebSocket: live phase changes and countdowns
//!
//! Every socket opens with a `light_change` snapshot, then forwards each
//! controller emission in order. An observer that falls more than the
//! broadcast capacity behind is resubscribed and sent a fresh snapshot
//! instead of being dropped.

use anyhow::Result;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::controller::{ControllerError, SignalHandle, Subscription};
use crate::types::{ObserverCommand, SignalEvent};

use super::ApiState;

/// GET /ws - Upgrade to an observer socket
pub async fn observer_socket(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    ws.on_upgrade(move |socket| serve_observer(socket, state))
}

async fn serve_observer(mut socket: WebSocket, state: ApiState) {
    let guard = state.observers.register();
    let observer = guard.id();

    let Ok(mut subscription) = state.signal.subscribe().await else {
        warn!(%observer, "Signal controller unavailable, closing observer socket");
        return;
    };
    info!(%observer, observers = state.observers.len(), "Observer connected");

    if let Err(e) = forward_snapshot(&mut socket, &subscription).await {
        debug!(%observer, error = %e, "Observer went away before the snapshot");
        return;
    }

    loop {
        tokio::select! {
            event = subscription.events.recv() => match event {
                Ok(event) => {
                    if let Err(e) = send_event(&mut socket, &event).await {
                        debug!(%observer, error = %e, "Observer send failed");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%observer, skipped, "Observer lagged, resynchronising");
                    let Ok(snapshot) = resubscribe(&state.signal, &mut subscription).await else {
                        break;
                    };
                    if send_event(&mut socket, &snapshot).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            frame = socket.recv() => match frame {
                Some(Ok(Message::Text(text))) => handle_frame(&state, observer, &text).await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(%observer, error = %e, "Observer socket error");
                    break;
                }
            },
        }
    }

    let connected_secs = state
        .observers
        .get(&observer)
        .map(|info| (chrono::Utc::now() - info.connected_at).num_seconds());
    drop(guard);
    info!(
        %observer,
        connected_secs,
        observers = state.observers.len(),
        "Observer disconnected"
    );
}

/// Act on one inbound text frame. Anything but a reset is ignored.
async fn handle_frame(state: &ApiState, observer: Uuid, text: &str) {
    match serde_json::from_str::<ObserverCommand>(text) {
        Ok(ObserverCommand::ResetSignal) => {
            info!(%observer, source = "observer", "Signal reset requested");
            if let Err(e) = state.signal.reset().await {
                warn!(%observer, error = %e, "Reset not applied");
            }
        }
        Err(e) => warn!(%observer, error = %e, "Ignoring unrecognised observer frame"),
    }
}

/// Swap a lagged subscription for a fresh one and return the snapshot that
/// restarts the observer's stream.
async fn resubscribe(
    signal: &SignalHandle,
    subscription: &mut Subscription,
) -> Result<SignalEvent, ControllerError> {
    *subscription = signal.subscribe().await?;
    Ok(SignalEvent::LightChange(subscription.snapshot))
}

async fn forward_snapshot(socket: &mut WebSocket, subscription: &Subscription) -> Result<()> {
    send_event(socket, &SignalEvent::LightChange(subscription.snapshot)).await
}

async fn send_event(socket: &mut WebSocket, event: &SignalEvent) -> Result<()> {
    let text = serde_json::to_string(event)?;
    socket.send(Message::Text(text)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControllerOptions, SignalActor};
    use crate::types::{Phase, PhaseSnapshot};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test(start_paused = true)]
    async fn test_lagged_subscription_resyncs_to_current_state() {
        let options = ControllerOptions {
            tick_period: Duration::from_secs(1),
            channel_capacity: 1,
            ..ControllerOptions::default()
        };
        let (actor, handle) = SignalActor::new(&options, CancellationToken::new());
        tokio::spawn(actor.run());

        let mut subscription = handle.subscribe().await.unwrap();
        // Three ticks into a one-slot channel.
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(matches!(
            subscription.events.recv().await,
            Err(RecvError::Lagged(_))
        ));

        let snapshot = resubscribe(&handle, &mut subscription).await.unwrap();
        assert_eq!(
            snapshot,
            SignalEvent::LightChange(PhaseSnapshot {
                color: Phase::Go,
                time_left: 7
            })
        );

        // The fresh receiver carries on from the snapshot, nothing stale.
        assert_eq!(
            subscription.events.recv().await.unwrap(),
            SignalEvent::Countdown(6)
        );
    }

    #[tokio::test]
    async fn test_resubscribe_fails_once_controller_stopped() {
        let cancel = CancellationToken::new();
        let (actor, handle) = SignalActor::new(&ControllerOptions::default(), cancel.clone());
        let mut subscription = {
            let task = tokio::spawn(actor.run());
            let subscription = handle.subscribe().await.unwrap();
            cancel.cancel();
            task.await.unwrap();
            subscription
        };

        assert_eq!(
            resubscribe(&handle, &mut subscription).await.unwrap_err(),
            ControllerError::Stopped
        );
    }
}
