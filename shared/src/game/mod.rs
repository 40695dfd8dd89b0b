//! Game session types
//!
//! Commands flow in, events flow out:
//! - [`GameCommand`]: request from a cashier (REST or WebSocket)
//! - [`GameEvent`]: fact published after the command commits
//! - [`GameSession`]: authoritative live state
//! - [`CompletedGame`]: immutable archive written at end

pub mod archive;
pub mod command;
pub mod event;
pub mod session;
pub mod types;
pub mod verification;

pub use archive::{CompletedGame, CompletedGameSummary};
pub use command::{GameCommand, GameCommandPayload};
pub use event::{Audience, GameEvent, GameEventPayload};
pub use session::{DrawRecord, DrawSource, GameFinancials, GameSession, GameStatus};
pub use types::{BatchVerifyEntry, CommandError, CommandOutcome, CommandResponse};
pub use verification::{MatchedPattern, VerificationResult, VerificationState, VerificationStatus};
