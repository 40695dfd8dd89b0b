//! WebSocket endpoint - 实时游戏状态推送
//!
//! GET /ws?role=<cashier|display|admin>&session=<key>[&token=<display token>]
//!
//! - cashier: 身份来自网关头, 必须拥有该 session; 可发送命令
//! - display: 凭 display token 只读订阅
//! - admin: 不带 session 时订阅全局频道; 只读
//!
//! 协议:
//! - Server → Client: ServerMessage (Snapshot, AdminSnapshot, Event, CommandResult, ConnectionStatus, Error, Pong)
//! - Client → Server: ClientMessage (Command, Resync, Ping)

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Extension, Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::game::{GameCommand, GameCommandPayload};
use shared::models::Cashier;
use shared::realtime::{ClientMessage, ClientRole, ServerMessage};
use tokio::sync::broadcast;

use super::hub::HubMessage;
use super::snapshot;
use crate::api::display::display_cashier;
use crate::auth::{Principal, PrincipalRole};
use crate::core::ServerState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    role: ClientRole,
    #[serde(default)]
    session: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

/// 连接订阅的频道
#[derive(Debug, Clone)]
enum Channel {
    Session(Box<Cashier>),
    Admin,
}

/// 已鉴权的连接
#[derive(Debug, Clone)]
struct Connection {
    role: ClientRole,
    channel: Channel,
    /// Recorded as operator on commands
    operator: String,
}

impl Connection {
    fn session_id(&self) -> Option<&str> {
        match &self.channel {
            Channel::Session(cashier) => Some(&cashier.session_id),
            Channel::Admin => None,
        }
    }
}

/// GET /ws - 建立实时连接
pub async fn handle_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsQuery>,
    principal: Option<Extension<Principal>>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let principal = principal.map(|Extension(p)| p);
    let conn = authorize(&state, query, principal)?;
    Ok(ws.on_upgrade(move |socket| ws_session(socket, state, conn)))
}

fn authorize(
    state: &ServerState,
    query: WsQuery,
    principal: Option<Principal>,
) -> Result<Connection, AppError> {
    let session = query
        .session
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match query.role {
        ClientRole::Cashier => {
            let principal = principal.ok_or_else(AppError::unauthorized)?;
            if principal.role != PrincipalRole::Cashier {
                return Err(AppError::with_message(
                    ErrorCode::RoleRequired,
                    "Cashier role required",
                ));
            }
            let session = session.ok_or_else(|| AppError::validation("session is required"))?;
            let cashier = resolve_session(state, session)?;
            if cashier.id != principal.subject {
                tracing::warn!(
                    subject = %principal.subject,
                    owner = %cashier.id,
                    "Cashier tried to join another cashier's session"
                );
                return Err(AppError::with_message(
                    ErrorCode::PermissionDenied,
                    "Session belongs to another cashier",
                ));
            }
            Ok(Connection {
                role: ClientRole::Cashier,
                channel: Channel::Session(Box::new(cashier)),
                operator: principal.subject,
            })
        }
        ClientRole::Display => {
            let session = session.ok_or_else(|| AppError::validation("session is required"))?;
            let cashier = display_cashier(state, session, query.token.as_deref())?;
            Ok(Connection {
                role: ClientRole::Display,
                channel: Channel::Session(Box::new(cashier)),
                operator: "display".to_string(),
            })
        }
        ClientRole::Admin => {
            let principal = principal.ok_or_else(AppError::unauthorized)?;
            if !principal.is_admin() {
                return Err(AppError::new(ErrorCode::AdminRequired));
            }
            let channel = match session {
                Some(session) => Channel::Session(Box::new(resolve_session(state, session)?)),
                None => Channel::Admin,
            };
            Ok(Connection {
                role: ClientRole::Admin,
                channel,
                operator: principal.subject,
            })
        }
    }
}

fn resolve_session(state: &ServerState, session_id: &str) -> Result<Cashier, AppError> {
    state
        .manager
        .cashier_for_session(session_id)?
        .ok_or_else(|| AppError::new(ErrorCode::SessionKeyInvalid))
}

async fn ws_session(socket: WebSocket, state: ServerState, conn: Connection) {
    if let Some(session_id) = conn.session_id() {
        state
            .hub
            .connect(session_id, conn.role, state.manager.now_millis());
    }
    tracing::info!(role = %conn.role, session_id = ?conn.session_id(), "WebSocket connected");

    serve(socket, &state, &conn).await;

    if let Some(session_id) = conn.session_id() {
        state
            .hub
            .disconnect(session_id, conn.role, state.manager.now_millis());
    }
    tracing::info!(role = %conn.role, session_id = ?conn.session_id(), "WebSocket disconnected");
}

fn subscribe(state: &ServerState, conn: &Connection) -> broadcast::Receiver<HubMessage> {
    match conn.session_id() {
        Some(session_id) => state.hub.subscribe(session_id),
        None => state.hub.subscribe_admin(),
    }
}

async fn serve(socket: WebSocket, state: &ServerState, conn: &Connection) {
    let (mut sink, mut stream) = socket.split();

    // 先订阅再发快照: 快照之后的事件都在 receiver 里
    let mut hub_rx = subscribe(state, conn);
    if send_snapshot(&mut sink, state, conn).await.is_err() {
        return;
    }

    let mut ping_interval = tokio::time::interval(state.config.ws_ping_interval());
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }

            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            received = hub_rx.recv() => {
                match received {
                    Ok(HubMessage::Resync) => {
                        if send_snapshot(&mut sink, state, conn).await.is_err() {
                            break;
                        }
                    }
                    Ok(HubMessage::Revoked) => {
                        let msg = error_message(ErrorCode::SessionKeyInvalid, "Session key was regenerated");
                        let _ = send_message(&mut sink, &msg).await;
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                    Ok(hub_msg) => {
                        if let Some(msg) = to_server_message(hub_msg, conn.role)
                            && send_message(&mut sink, &msg).await.is_err()
                        {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(role = %conn.role, session_id = ?conn.session_id(), lagged = n, "WebSocket subscriber lagged, resending snapshot");
                        // 重新订阅, 从当前位置开始, 再补发全量快照
                        hub_rx = subscribe(state, conn);
                        if send_snapshot(&mut sink, state, conn).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        touch(state, conn);
                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => handle_client_message(&mut sink, state, conn, client_msg).await,
                            Err(e) => {
                                tracing::debug!(error = %e, "Malformed client message");
                                send_message(&mut sink, &error_message(ErrorCode::InvalidFormat, e.to_string())).await
                            }
                        };
                        if reply.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) | Some(Ok(Message::Ping(_))) => touch(state, conn),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }
}

fn touch(state: &ServerState, conn: &Connection) {
    if let Some(session_id) = conn.session_id() {
        state
            .hub
            .touch(session_id, conn.role, state.manager.now_millis());
    }
}

/// 按角色过滤 hub 消息
fn to_server_message(msg: HubMessage, role: ClientRole) -> Option<ServerMessage> {
    if !msg.visible_to(role) {
        return None;
    }
    match msg {
        HubMessage::Event(event) => Some(ServerMessage::Event(Box::new((*event).clone()))),
        HubMessage::Presence(presence) => Some(ServerMessage::ConnectionStatus(presence)),
        HubMessage::CatalogChanged(kind) => Some(ServerMessage::CatalogChanged { kind }),
        HubMessage::Resync | HubMessage::Revoked => None,
    }
}

async fn handle_client_message<S>(
    sink: &mut S,
    state: &ServerState,
    conn: &Connection,
    msg: ClientMessage,
) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    match msg {
        ClientMessage::Ping => {
            let pong = ServerMessage::Pong {
                server_time: state.manager.now_millis(),
            };
            send_message(sink, &pong).await
        }
        ClientMessage::Resync => send_snapshot(sink, state, conn).await,
        ClientMessage::Command {
            command_id,
            payload,
        } => {
            let msg = run_command(state, conn, command_id, payload);
            send_message(sink, &msg).await
        }
    }
}

fn run_command(
    state: &ServerState,
    conn: &Connection,
    command_id: String,
    payload: GameCommandPayload,
) -> ServerMessage {
    let cashier = match &conn.channel {
        Channel::Session(cashier) if conn.role.can_command() => cashier,
        _ => {
            tracing::debug!(role = %conn.role, command = payload.name(), "Command on read-only connection");
            return error_message(ErrorCode::ReadOnlyConnection, "Connection is read-only");
        }
    };
    if command_id.trim().is_empty() {
        return error_message(ErrorCode::ValidationFailed, "command_id is required");
    }

    let cmd = GameCommand {
        command_id,
        cashier_id: cashier.id.clone(),
        operator_name: conn.operator.clone(),
        timestamp: state.manager.now_millis(),
        payload,
    };
    let response = state.manager.execute_command(cmd);
    ServerMessage::CommandResult(Box::new(response))
}

async fn send_snapshot<S>(sink: &mut S, state: &ServerState, conn: &Connection) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let built = match &conn.channel {
        Channel::Session(cashier) => snapshot::session_snapshot(&state.manager, &state.hub, cashier)
            .map(|s| ServerMessage::Snapshot(Box::new(s))),
        Channel::Admin => snapshot::admin_snapshot(&state.manager, &state.hub)
            .map(|s| ServerMessage::AdminSnapshot(Box::new(s))),
    };
    match built {
        Ok(msg) => send_message(sink, &msg).await,
        Err(e) => {
            tracing::error!(error = %e, session_id = ?conn.session_id(), "Failed to build snapshot");
            let _ = send_message(sink, &error_message(e.code(), e.to_string())).await;
            Err(())
        }
    }
}

fn error_message(code: ErrorCode, message: impl Into<String>) -> ServerMessage {
    ServerMessage::Error {
        code: code.code(),
        message: message.into(),
    }
}

async fn send_message<S>(sink: &mut S, msg: &ServerMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
