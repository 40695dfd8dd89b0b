//! Money calculation using rust_decimal
//!
//! All arithmetic runs on `Decimal`; values are stored as `f64` rounded to
//! two decimal places.

use super::error::{GameError, GameResult};
use rust_decimal::prelude::*;
use shared::game::GameFinancials;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed stake per ticket
const MAX_STAKE: f64 = 1_000_000.0;

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

#[inline]
fn require_finite(value: f64, field_name: &str) -> GameResult<()> {
    if !value.is_finite() {
        return Err(GameError::Validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Stake must be finite, positive, within bounds and at least `min_stake`
pub fn validate_stake(stake: f64, min_stake: f64) -> GameResult<()> {
    require_finite(stake, "stake")?;
    if stake <= 0.0 {
        return Err(GameError::Validation(format!(
            "stake must be positive, got {}",
            stake
        )));
    }
    if stake > MAX_STAKE {
        return Err(GameError::Validation(format!(
            "stake exceeds maximum allowed ({}), got {}",
            MAX_STAKE, stake
        )));
    }
    if to_decimal(stake) < to_decimal(min_stake) {
        return Err(GameError::StakeTooLow {
            stake,
            min: min_stake,
        });
    }
    Ok(())
}

/// Derive every aggregate from the total stake
pub fn financials_for(
    total_stake: Decimal,
    shop_margin_percent: f64,
    system_fee_percent: f64,
) -> GameFinancials {
    let hundred = Decimal::ONE_HUNDRED;
    let margin = total_stake * to_decimal(shop_margin_percent) / hundred;
    let fee = total_stake * to_decimal(system_fee_percent) / hundred;

    // 先四舍五入各项, 再相减, 保证 total = margin + fee + net
    let margin = margin.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let fee = fee.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    let net = total_stake - margin - fee;

    GameFinancials {
        total_stake: to_f64(total_stake),
        total_shop_margin: to_f64(margin),
        total_system_fee: to_f64(fee),
        net_prize_pool: to_f64(net),
    }
}

/// Sum stakes and derive aggregates
pub fn financials_from_stakes(
    stakes: impl IntoIterator<Item = f64>,
    shop_margin_percent: f64,
    system_fee_percent: f64,
) -> GameFinancials {
    let total: Decimal = stakes.into_iter().map(to_decimal).sum();
    financials_for(total, shop_margin_percent, system_fee_percent)
}

/// Add (or with a negative delta, remove) a stake from running aggregates
pub fn adjust_financials(
    current: &GameFinancials,
    stake_delta: f64,
    shop_margin_percent: f64,
    system_fee_percent: f64,
) -> GameFinancials {
    let total = (to_decimal(current.total_stake) + to_decimal(stake_delta)).max(Decimal::ZERO);
    financials_for(total, shop_margin_percent, system_fee_percent)
}

/// Equal split of the net pool, rounded down to the cent
pub fn prize_per_winner(net_prize_pool: f64, winners: u32) -> f64 {
    if winners == 0 {
        return 0.0;
    }
    let share = to_decimal(net_prize_pool) / Decimal::from(winners);
    share
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::ToZero)
        .to_f64()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_financials_default_percents() {
        let f = financials_from_stakes([10.0, 20.0, 30.0], 20.0, 2.0);
        assert_eq!(f.total_stake, 60.0);
        assert_eq!(f.total_shop_margin, 12.0);
        assert_eq!(f.total_system_fee, 1.2);
        assert_eq!(f.net_prize_pool, 46.8);
    }

    #[test]
    fn test_components_sum_to_total() {
        let f = financials_from_stakes([10.01, 13.37, 19.99], 17.5, 3.3);
        let sum = to_decimal(f.total_shop_margin)
            + to_decimal(f.total_system_fee)
            + to_decimal(f.net_prize_pool);
        assert_eq!(to_f64(sum), f.total_stake);
    }

    #[test]
    fn test_adjust_back_to_zero() {
        let f = financials_from_stakes([25.0], 20.0, 2.0);
        let back = adjust_financials(&f, -25.0, 20.0, 2.0);
        assert_eq!(back, GameFinancials::default());
    }

    #[test]
    fn test_stake_validation() {
        assert!(validate_stake(10.0, 10.0).is_ok());
        assert!(matches!(
            validate_stake(9.99, 10.0),
            Err(GameError::StakeTooLow { .. })
        ));
        assert!(matches!(validate_stake(f64::NAN, 10.0), Err(GameError::Validation(_))));
        assert!(matches!(validate_stake(-5.0, 1.0), Err(GameError::Validation(_))));
    }

    #[test]
    fn test_prize_split() {
        assert_eq!(prize_per_winner(100.0, 3), 33.33);
        assert_eq!(prize_per_winner(46.8, 2), 23.4);
        assert_eq!(prize_per_winner(46.8, 0), 0.0);
    }
}
