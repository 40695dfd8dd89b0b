//! Cartela verification
//!
//! Overlay the called numbers on the card (free space always marked) and test
//! every active win pattern. All matches are kept, not just the first.

use shared::game::{GameSession, MatchedPattern, VerificationResult, VerificationStatus};
use shared::models::{CENTER, Cartela, CartelaGrid, FREE_SPACE, GRID_SIZE, PatternMask, WinPattern};
use std::collections::BTreeSet;

/// Marked cells of a card given the called numbers
pub fn marked_grid(grid: &CartelaGrid, called: &BTreeSet<u8>) -> PatternMask {
    let mut marked = [[false; GRID_SIZE]; GRID_SIZE];
    for (row, cells) in grid.iter().enumerate() {
        for (col, &value) in cells.iter().enumerate() {
            marked[row][col] =
                (row == CENTER && col == CENTER) || (value != FREE_SPACE && called.contains(&value));
        }
    }
    marked
}

/// Every required cell of the mask is marked
pub fn pattern_matches(mask: &PatternMask, marked: &PatternMask) -> bool {
    mask.iter()
        .flatten()
        .zip(marked.iter().flatten())
        .all(|(&required, &hit)| !required || hit)
}

/// Verify a cartela against the session's called numbers and the active patterns
pub fn verify(
    cartela: &Cartela,
    patterns: &[WinPattern],
    session: &GameSession,
    ticket_number: Option<String>,
    now: i64,
) -> VerificationResult {
    let marked = marked_grid(&cartela.pattern, &session.called_numbers);

    let matched: Vec<MatchedPattern> = patterns
        .iter()
        .filter(|p| p.is_active)
        .filter(|p| pattern_matches(&p.pattern, &marked))
        .map(|p| MatchedPattern {
            id: p.id.clone(),
            name: p.name.clone(),
        })
        .collect();

    let matched_numbers: Vec<u8> = cartela
        .numbers()
        .filter(|n| session.called_numbers.contains(n))
        .collect();

    let status = if matched.is_empty() {
        VerificationStatus::Lost
    } else {
        VerificationStatus::Won
    };

    VerificationResult {
        cartela_id: cartela.cartela_id,
        ticket_number,
        status,
        patterns: matched.iter().map(|m| m.id.clone()).collect(),
        pattern_names: matched.iter().map(|m| m.name.clone()).collect(),
        all_matched_patterns: matched,
        matched_numbers,
        drawn_numbers: session.draw_history.iter().map(|d| d.number).collect(),
        draws_at_verification: session.progress(),
        verified_at: now,
    }
}

/// Lost result for a card that can no longer be evaluated (removed from the catalog)
pub fn unverifiable(
    cartela_id: u32,
    session: &GameSession,
    ticket_number: Option<String>,
    now: i64,
) -> VerificationResult {
    VerificationResult {
        cartela_id,
        ticket_number,
        status: VerificationStatus::Lost,
        patterns: vec![],
        pattern_names: vec![],
        all_matched_patterns: vec![],
        matched_numbers: vec![],
        drawn_numbers: session.draw_history.iter().map(|d| d.number).collect(),
        draws_at_verification: session.progress(),
        verified_at: now,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use shared::models::{Cartela, WinPattern};

    /// Main diagonal: 5, 20, free, 50, 65. Anti-diagonal: 61, 47, free, 18, 4.
    pub fn cartela(cashier_id: &str, cartela_id: u32) -> Cartela {
        Cartela {
            cashier_id: cashier_id.to_string(),
            cartela_id,
            pattern: [
                [5, 16, 31, 46, 61],
                [1, 20, 32, 47, 62],
                [2, 17, 0, 48, 63],
                [3, 18, 33, 50, 64],
                [4, 19, 34, 49, 65],
            ],
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn mask(cells: &[(usize, usize)]) -> [[bool; 5]; 5] {
        let mut m = [[false; 5]; 5];
        for &(r, c) in cells {
            m[r][c] = true;
        }
        m
    }

    pub fn pattern(cashier_id: &str, id: &str, name: &str, cells: &[(usize, usize)]) -> WinPattern {
        WinPattern {
            id: id.to_string(),
            cashier_id: cashier_id.to_string(),
            name: name.to_string(),
            pattern: mask(cells),
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn diagonal(cashier_id: &str) -> WinPattern {
        pattern(
            cashier_id,
            "p-diag",
            "Diagonal",
            &[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)],
        )
    }

    pub fn anti_diagonal(cashier_id: &str) -> WinPattern {
        pattern(
            cashier_id,
            "p-anti",
            "Anti-diagonal",
            &[(0, 4), (1, 3), (2, 2), (3, 1), (4, 0)],
        )
    }

    pub fn center_cross(cashier_id: &str) -> WinPattern {
        pattern(
            cashier_id,
            "p-cross",
            "Cross",
            &[(1, 2), (2, 1), (2, 2), (2, 3), (3, 2)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use shared::game::{DrawRecord, DrawSource, GameFinancials, GameStatus};
    use std::collections::BTreeMap;

    fn session_with(numbers: &[u8]) -> GameSession {
        GameSession {
            instance_id: "i1".into(),
            game_id: "4000".into(),
            cashier_id: "c1".into(),
            session_id: "s1".into(),
            display_token: "t1".into(),
            status: GameStatus::Active,
            draw_history: numbers
                .iter()
                .map(|&n| DrawRecord {
                    number: n,
                    timestamp: 0,
                    source: DrawSource::Manual,
                })
                .collect(),
            called_numbers: numbers.iter().copied().collect(),
            financials: GameFinancials::default(),
            shop_margin_percent: 20.0,
            system_fee_percent: 2.0,
            selected_cartelas: vec![],
            placed_bet_cartelas: vec![],
            winning_cartelas: vec![],
            verified_cartelas: vec![],
            verifications: BTreeMap::new(),
            created_at: 0,
            started_at: None,
            paused_at: None,
            updated_at: 0,
        }
    }

    #[test]
    fn test_free_space_always_marked() {
        let card = cartela("c1", 1);
        let marked = marked_grid(&card.pattern, &BTreeSet::new());
        assert!(marked[CENTER][CENTER]);
        assert_eq!(marked.iter().flatten().filter(|&&m| m).count(), 1);
    }

    #[test]
    fn test_diagonal_scenario() {
        let card = cartela("c1", 1);
        let session = session_with(&[5, 20, 35, 50, 65]);
        let result = verify(&card, &[diagonal("c1")], &session, Some("0000000000001".into()), 9);

        assert_eq!(result.status, VerificationStatus::Won);
        assert_eq!(result.patterns, vec!["p-diag".to_string()]);
        assert_eq!(result.pattern_names, vec!["Diagonal".to_string()]);
        assert_eq!(result.matched_numbers, vec![5, 20, 50, 65]);
        assert_eq!(result.drawn_numbers, vec![5, 20, 35, 50, 65]);
        assert_eq!(result.draws_at_verification, 5);
        assert_eq!(result.ticket_number.as_deref(), Some("0000000000001"));
    }

    #[test]
    fn test_every_match_is_reported() {
        let card = cartela("c1", 1);
        let session = session_with(&[5, 20, 50, 65, 61, 47, 18, 4]);
        let patterns = [diagonal("c1"), anti_diagonal("c1"), center_cross("c1")];
        let result = verify(&card, &patterns, &session, None, 1);

        assert_eq!(result.status, VerificationStatus::Won);
        assert_eq!(result.patterns, vec!["p-diag".to_string(), "p-anti".to_string()]);
        assert_eq!(result.all_matched_patterns.len(), 2);
    }

    #[test]
    fn test_lost_when_incomplete() {
        let card = cartela("c1", 1);
        let session = session_with(&[5, 20, 50]);
        let result = verify(&card, &[diagonal("c1")], &session, None, 1);
        assert_eq!(result.status, VerificationStatus::Lost);
        assert!(result.patterns.is_empty());
        assert_eq!(result.matched_numbers, vec![5, 20, 50]);
    }

    #[test]
    fn test_inactive_patterns_ignored() {
        let card = cartela("c1", 1);
        let mut p = diagonal("c1");
        p.is_active = false;
        let session = session_with(&[5, 20, 50, 65]);
        let result = verify(&card, &[p], &session, None, 1);
        assert_eq!(result.status, VerificationStatus::Lost);
    }
}
