//! Game lifecycle transitions
//!
//! ```text
//! waiting ──activate──▶ active ◀──resume── paused
//!    │                    │ └────pause────▶  │
//!    └───────────end──────┴───────end────────┴──▶ completed
//! ```
//!
//! `reset` discards a waiting/active game without archiving it.

use super::error::{GameError, GameResult};
use shared::game::GameStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Activate,
    Draw,
    Pause,
    Resume,
    End,
    Reset,
    PlaceBet,
    CancelBet,
    SelectCartelas,
    Verify,
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Draw => "draw",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::End => "end",
            Self::Reset => "reset",
            Self::PlaceBet => "place a bet on",
            Self::CancelBet => "cancel a bet on",
            Self::SelectCartelas => "select cartelas for",
            Self::Verify => "verify",
        }
    }
}

/// Status after applying `transition`, or `InvalidTransition`.
///
/// `End` and `Reset` both leave the game terminal.
pub fn apply(current: GameStatus, transition: Transition) -> GameResult<GameStatus> {
    use GameStatus::*;
    use Transition::*;

    let next = match (current, transition) {
        (Waiting, Activate) => Active,
        (Active, Draw) => Active,
        (Active, Pause) => Paused,
        (Paused, Resume) => Active,
        (Waiting | Active | Paused, End) => Completed,
        (Waiting | Active, Reset) => Completed,
        (
            Waiting | Active | Paused,
            PlaceBet | CancelBet | SelectCartelas | Verify,
        ) => current,
        _ => {
            return Err(GameError::InvalidTransition {
                current,
                requested: transition.name(),
            });
        }
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use GameStatus::*;

    #[test]
    fn test_happy_path() {
        let s = apply(Waiting, Transition::Activate).unwrap();
        assert_eq!(s, Active);
        let s = apply(s, Transition::Pause).unwrap();
        assert_eq!(s, Paused);
        let s = apply(s, Transition::Resume).unwrap();
        assert_eq!(s, Active);
        assert_eq!(apply(s, Transition::End).unwrap(), Completed);
    }

    #[test]
    fn test_draw_only_when_active() {
        assert!(apply(Active, Transition::Draw).is_ok());
        for s in [Waiting, Paused, Completed] {
            let err = apply(s, Transition::Draw).unwrap_err();
            assert_eq!(
                err,
                GameError::InvalidTransition {
                    current: s,
                    requested: "draw"
                }
            );
        }
    }

    #[test]
    fn test_end_from_any_non_terminal() {
        for s in [Waiting, Active, Paused] {
            assert_eq!(apply(s, Transition::End).unwrap(), Completed);
        }
        assert!(apply(Completed, Transition::End).is_err());
    }

    #[test]
    fn test_reset_sources() {
        assert!(apply(Waiting, Transition::Reset).is_ok());
        assert!(apply(Active, Transition::Reset).is_ok());
        assert!(apply(Paused, Transition::Reset).is_err());
        assert!(apply(Completed, Transition::Reset).is_err());
    }

    #[test]
    fn test_completed_is_terminal() {
        for t in [
            Transition::Activate,
            Transition::Pause,
            Transition::Resume,
            Transition::PlaceBet,
            Transition::Verify,
        ] {
            assert!(apply(Completed, t).is_err(), "{t:?}");
        }
    }

    #[test]
    fn test_pause_resume_require_matching_state() {
        assert!(apply(Paused, Transition::Pause).is_err());
        assert!(apply(Active, Transition::Resume).is_err());
        assert!(apply(Waiting, Transition::Pause).is_err());
    }
}
