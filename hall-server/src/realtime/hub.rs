//! RealtimeHub - 会话级实时分发
//!
//! ```text
//! GameManager (broadcast<GameEvent>)
//!       │
//!       └── forwarder ──► RealtimeHub
//!                           ├── sessions: session key → topic (broadcast + presence)
//!                           │     └── cashier / display / admin WS (按角色过滤)
//!                           └── admin: 全局 topic (所有事件 + 在线状态)
//! ```
//!
//! The hub never touches storage; snapshots are built by the WebSocket layer.

use dashmap::DashMap;
use parking_lot::Mutex;
use shared::game::GameEvent;
use shared::realtime::{CatalogKind, ClientRole, SessionPresence};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Per-session topic capacity, enough to absorb a burst of draws
const SESSION_CHANNEL_CAPACITY: usize = 256;

/// Admin topic carries every session, so it is larger
const ADMIN_CHANNEL_CAPACITY: usize = 1024;

/// Hub 内部消息
#[derive(Debug, Clone)]
pub enum HubMessage {
    Event(Arc<GameEvent>),
    Presence(SessionPresence),
    /// Events were lost upstream; subscribers must resend a snapshot
    Resync,
    /// Session key was regenerated; connections on it must close
    Revoked,
    /// Cartelas or win patterns of the session's cashier were edited
    CatalogChanged(CatalogKind),
}

impl HubMessage {
    /// Whether a connection of this role should receive the message
    pub fn visible_to(&self, role: ClientRole) -> bool {
        match self {
            HubMessage::Event(event) => {
                let audience = event.audience();
                match role {
                    ClientRole::Cashier => audience.cashier,
                    ClientRole::Display => audience.display,
                    ClientRole::Admin => audience.admin,
                }
            }
            HubMessage::Presence(_)
            | HubMessage::Resync
            | HubMessage::Revoked
            | HubMessage::CatalogChanged(_) => true,
        }
    }
}

#[derive(Debug, Default)]
struct PresenceState {
    cashier_connections: usize,
    display_connections: usize,
    presence: SessionPresence,
}

struct SessionTopic {
    tx: broadcast::Sender<HubMessage>,
    state: Mutex<PresenceState>,
}

impl SessionTopic {
    fn new(session_id: &str) -> Self {
        let (tx, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);
        Self {
            tx,
            state: Mutex::new(PresenceState {
                presence: SessionPresence {
                    session_id: session_id.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            }),
        }
    }
}

/// 实时分发中心, 按 session key 隔离
#[derive(Clone)]
pub struct RealtimeHub {
    sessions: Arc<DashMap<String, SessionTopic>>,
    admin_tx: broadcast::Sender<HubMessage>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RealtimeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeHub")
            .field("sessions", &self.sessions.len())
            .field("admin_subscribers", &self.admin_tx.receiver_count())
            .finish()
    }
}

impl RealtimeHub {
    pub fn new() -> Self {
        let (admin_tx, _) = broadcast::channel(ADMIN_CHANNEL_CAPACITY);
        Self {
            sessions: Arc::new(DashMap::new()),
            admin_tx,
        }
    }

    /// Subscribe to one session's topic
    pub fn subscribe(&self, session_id: &str) -> broadcast::Receiver<HubMessage> {
        self.topic(session_id).tx.subscribe()
    }

    /// Subscribe to the admin-wide topic
    pub fn subscribe_admin(&self) -> broadcast::Receiver<HubMessage> {
        self.admin_tx.subscribe()
    }

    /// Fan an event out to its session topic and, if admin-visible, the admin topic
    pub fn publish(&self, event: GameEvent) {
        let event = Arc::new(event);
        // 无订阅者时 send 返回 Err, 安全忽略
        if let Some(topic) = self.sessions.get(&event.session_id) {
            let _ = topic.tx.send(HubMessage::Event(Arc::clone(&event)));
        }
        if event.audience().admin {
            let _ = self.admin_tx.send(HubMessage::Event(event));
        }
    }

    /// Ask every subscriber to resend its snapshot
    pub fn request_resync(&self) {
        for topic in self.sessions.iter() {
            let _ = topic.tx.send(HubMessage::Resync);
        }
        let _ = self.admin_tx.send(HubMessage::Resync);
    }

    /// Close every connection bound to a retired session key
    pub fn revoke_session(&self, session_id: &str) {
        if let Some(topic) = self.sessions.get(session_id) {
            let _ = topic.tx.send(HubMessage::Revoked);
            tracing::info!(session_id = %session_id, "Session key revoked");
        }
    }

    /// Tell a session's screens to refetch part of the catalog
    pub fn catalog_changed(&self, session_id: &str, kind: CatalogKind) {
        if let Some(topic) = self.sessions.get(session_id) {
            let _ = topic.tx.send(HubMessage::CatalogChanged(kind));
            tracing::debug!(session_id = %session_id, kind = ?kind, "Catalog change published");
        }
    }

    // ========== Presence ==========

    /// Register a connection; returns the updated presence
    pub fn connect(&self, session_id: &str, role: ClientRole, now: i64) -> SessionPresence {
        self.update_presence(session_id, role, now, |state| match role {
            ClientRole::Cashier => state.cashier_connections += 1,
            ClientRole::Display => state.display_connections += 1,
            ClientRole::Admin => {}
        })
    }

    /// Unregister a connection; returns the updated presence
    pub fn disconnect(&self, session_id: &str, role: ClientRole, now: i64) -> SessionPresence {
        let presence = self.update_presence(session_id, role, now, |state| match role {
            ClientRole::Cashier => {
                state.cashier_connections = state.cashier_connections.saturating_sub(1)
            }
            ClientRole::Display => {
                state.display_connections = state.display_connections.saturating_sub(1)
            }
            ClientRole::Admin => {}
        });
        self.prune(session_id);
        presence
    }

    /// Record activity without changing connection counts (no broadcast)
    pub fn touch(&self, session_id: &str, role: ClientRole, now: i64) {
        if let Some(topic) = self.sessions.get(session_id) {
            let mut state = topic.state.lock();
            match role {
                ClientRole::Cashier => state.presence.cashier_last_activity = Some(now),
                ClientRole::Display => state.presence.display_last_activity = Some(now),
                ClientRole::Admin => {}
            }
        }
    }

    pub fn presence(&self, session_id: &str) -> SessionPresence {
        match self.sessions.get(session_id) {
            Some(topic) => topic.state.lock().presence.clone(),
            None => SessionPresence {
                session_id: session_id.to_string(),
                ..Default::default()
            },
        }
    }

    /// Presence of every session with at least one cashier or display connected
    pub fn all_presence(&self) -> Vec<SessionPresence> {
        let mut all: Vec<SessionPresence> = self
            .sessions
            .iter()
            .map(|topic| topic.state.lock().presence.clone())
            .filter(|p| p.cashier_connected || p.display_connected)
            .collect();
        all.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        all
    }

    /// Sessions with a cashier or display online
    pub fn connected_sessions(&self) -> usize {
        self.all_presence().len()
    }

    fn update_presence(
        &self,
        session_id: &str,
        role: ClientRole,
        now: i64,
        apply: impl FnOnce(&mut PresenceState),
    ) -> SessionPresence {
        let topic = self.topic(session_id);
        let presence = {
            let mut state = topic.state.lock();
            apply(&mut state);
            state.presence.cashier_connected = state.cashier_connections > 0;
            state.presence.display_connected = state.display_connections > 0;
            match role {
                ClientRole::Cashier => state.presence.cashier_last_activity = Some(now),
                ClientRole::Display => state.presence.display_last_activity = Some(now),
                ClientRole::Admin => {}
            }
            state.presence.clone()
        };

        if role != ClientRole::Admin {
            let _ = topic.tx.send(HubMessage::Presence(presence.clone()));
            let _ = self.admin_tx.send(HubMessage::Presence(presence.clone()));
            tracing::debug!(
                session_id = %session_id,
                role = %role,
                cashier_connected = presence.cashier_connected,
                display_connected = presence.display_connected,
                "Session presence changed"
            );
        }
        presence
    }

    /// 无连接且无订阅者时清理 topic
    fn prune(&self, session_id: &str) {
        self.sessions.remove_if(session_id, |_, topic| {
            let state = topic.state.lock();
            state.cashier_connections == 0
                && state.display_connections == 0
                && topic.tx.receiver_count() == 0
        });
    }

    fn topic(&self, session_id: &str) -> dashmap::mapref::one::Ref<'_, String, SessionTopic> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionTopic::new(session_id))
            .downgrade()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::game::{GameEventPayload, GameStatus};

    fn event(session_id: &str, payload: GameEventPayload) -> GameEvent {
        GameEvent {
            event_id: "e-1".to_string(),
            sequence: 1,
            session_id: session_id.to_string(),
            cashier_id: "cashier-1".to_string(),
            game_id: "4000".to_string(),
            instance_id: "i-1".to_string(),
            timestamp: 0,
            command_id: "c-1".to_string(),
            payload,
        }
    }

    fn paused() -> GameEventPayload {
        GameEventPayload::GameStatusChanged {
            status: GameStatus::Paused,
            previous: GameStatus::Active,
        }
    }

    #[test]
    fn test_publish_reaches_session_and_admin() {
        let hub = RealtimeHub::new();
        let mut session_rx = hub.subscribe("s1");
        let mut other_rx = hub.subscribe("s2");
        let mut admin_rx = hub.subscribe_admin();

        hub.publish(event("s1", paused()));

        assert!(matches!(session_rx.try_recv(), Ok(HubMessage::Event(_))));
        assert!(matches!(admin_rx.try_recv(), Ok(HubMessage::Event(_))));
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn test_role_filter() {
        let locked = HubMessage::Event(Arc::new(event(
            "s1",
            GameEventPayload::VerificationLocked {
                cartela_id: 3,
                locked_by: "cashier-1".to_string(),
                locked_at: 0,
            },
        )));
        assert!(locked.visible_to(ClientRole::Cashier));
        assert!(locked.visible_to(ClientRole::Admin));
        assert!(!locked.visible_to(ClientRole::Display));

        let presence = HubMessage::Presence(SessionPresence::default());
        assert!(presence.visible_to(ClientRole::Display));
    }

    #[test]
    fn test_presence_counts_connections() {
        let hub = RealtimeHub::new();
        let mut admin_rx = hub.subscribe_admin();

        let p = hub.connect("s1", ClientRole::Display, 10);
        assert!(p.display_connected);
        assert!(!p.cashier_connected);
        assert_eq!(p.display_last_activity, Some(10));

        // 两个显示屏, 断开一个仍在线
        hub.connect("s1", ClientRole::Display, 11);
        let p = hub.disconnect("s1", ClientRole::Display, 12);
        assert!(p.display_connected);
        let p = hub.disconnect("s1", ClientRole::Display, 13);
        assert!(!p.display_connected);

        let mut presence_events = 0;
        while let Ok(msg) = admin_rx.try_recv() {
            assert!(matches!(msg, HubMessage::Presence(_)));
            presence_events += 1;
        }
        assert_eq!(presence_events, 4);
        assert_eq!(hub.connected_sessions(), 0);
    }

    #[test]
    fn test_touch_and_all_presence() {
        let hub = RealtimeHub::new();
        hub.connect("s2", ClientRole::Cashier, 1);
        hub.connect("s1", ClientRole::Display, 1);
        hub.touch("s2", ClientRole::Cashier, 50);

        let all = hub.all_presence();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].session_id, "s1");
        assert_eq!(all[1].cashier_last_activity, Some(50));
        assert_eq!(hub.presence("unknown").session_id, "unknown");
    }

    #[test]
    fn test_admin_connection_does_not_change_presence() {
        let hub = RealtimeHub::new();
        let mut rx = hub.subscribe("s1");
        let p = hub.connect("s1", ClientRole::Admin, 5);
        assert!(!p.cashier_connected && !p.display_connected);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_revoke_only_hits_that_session() {
        let hub = RealtimeHub::new();
        let mut old_rx = hub.subscribe("old");
        let mut other_rx = hub.subscribe("other");
        hub.revoke_session("old");
        hub.revoke_session("never-connected");
        assert!(matches!(old_rx.try_recv(), Ok(HubMessage::Revoked)));
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn test_catalog_change_stays_in_session() {
        let hub = RealtimeHub::new();
        let mut rx = hub.subscribe("s1");
        let mut other_rx = hub.subscribe("s2");
        let mut admin_rx = hub.subscribe_admin();
        hub.catalog_changed("s1", CatalogKind::Cartelas);

        let msg = rx.try_recv().unwrap();
        assert!(matches!(msg, HubMessage::CatalogChanged(CatalogKind::Cartelas)));
        assert!(msg.visible_to(ClientRole::Display));
        assert!(msg.visible_to(ClientRole::Cashier));
        assert!(other_rx.try_recv().is_err());
        assert!(admin_rx.try_recv().is_err());
    }

    #[test]
    fn test_resync_reaches_everyone() {
        let hub = RealtimeHub::new();
        let mut rx = hub.subscribe("s1");
        let mut admin_rx = hub.subscribe_admin();
        hub.request_resync();
        assert!(matches!(rx.try_recv(), Ok(HubMessage::Resync)));
        assert!(matches!(admin_rx.try_recv(), Ok(HubMessage::Resync)));
    }
}
