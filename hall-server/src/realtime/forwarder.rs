//! Event forwarder - GameManager broadcast → RealtimeHub
//!
//! Keeps the manager free of transport concerns: it only publishes on its own
//! broadcast channel, this task routes each event to the session topics.

use super::hub::RealtimeHub;
use shared::game::GameEvent;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// 运行转发器 (阻塞直到源通道关闭或收到关闭信号)
pub async fn run(
    hub: RealtimeHub,
    mut source: broadcast::Receiver<GameEvent>,
    shutdown: CancellationToken,
) {
    tracing::info!("Event forwarder started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Event forwarder stopping");
                break;
            }
            received = source.recv() => match received {
                Ok(event) => {
                    tracing::trace!(
                        session_id = %event.session_id,
                        sequence = event.sequence,
                        event_type = event.payload.name(),
                        "Forwarding event"
                    );
                    hub.publish(event);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // 丢失的事件无法补发, 让所有连接重发快照
                    tracing::error!(skipped = n, "Event forwarder lagged, forcing client resync");
                    hub.request_resync();
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event source closed, forwarder stopping");
                    break;
                }
            }
        }
    }
}
