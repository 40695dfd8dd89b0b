//! 快照构建 - 连接建立 / 滞后 / resync 时发送的全量状态

use shared::models::Cashier;
use shared::realtime::{AdminSnapshot, SessionSnapshot};

use super::hub::RealtimeHub;
use crate::games::{GameManager, ManagerResult};

/// Full state of one cashier session.
///
/// Game and `last_sequence` come from the same read transaction, so every
/// event with a higher sequence is newer than the snapshot.
pub fn session_snapshot(
    manager: &GameManager,
    hub: &RealtimeHub,
    cashier: &Cashier,
) -> ManagerResult<SessionSnapshot> {
    let (game, last_sequence) = manager
        .storage()
        .read_with_retry(|s| s.live_game_with_sequence(&cashier.id))?;
    Ok(SessionSnapshot {
        epoch: manager.epoch().to_string(),
        session_id: cashier.session_id.clone(),
        cashier_id: cashier.id.clone(),
        game,
        presence: hub.presence(&cashier.session_id),
        last_sequence,
        server_time: manager.now_millis(),
    })
}

/// Every live game and every connected session
pub fn admin_snapshot(manager: &GameManager, hub: &RealtimeHub) -> ManagerResult<AdminSnapshot> {
    let (live_games, last_sequence) = manager
        .storage()
        .read_with_retry(|s| s.live_games_with_sequence())?;
    Ok(AdminSnapshot {
        epoch: manager.epoch().to_string(),
        live_games,
        sessions: hub.all_presence(),
        last_sequence,
        server_time: manager.now_millis(),
    })
}
