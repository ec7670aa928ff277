//! Conversion of final chip counts into money.
//!
//! Two policies exist:
//! - exact: chips are worth their proportional share of a rebuy unit, rounded to cents;
//! - rebuy rounding: chips are worth whole rebuy units, and a partial unit counts as a
//!   full one once its remainder reaches the configured percentage of a unit.
//!
//! A missing or malformed chip count is scored as zero chips. This includes finite
//! counts too large for `Decimal` (above roughly 7.9e28), which are rejected rather
//! than clamped since no chip total of that size can be valued.

use crate::{
    model::{
        ChipsConfig, Money, Player, PlayerCalculationResult, RoundingRule, SettlementConfig,
    },
    services::InvestmentCalculator,
};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChipValuation {
    /// Proportional money value of the chips before any rounding.
    pub exact_chips_value: Money,
    pub rounded_rebuys_count: u64,
    pub final_chips_value: Money,
}

pub struct ChipValuator;

impl ChipValuator {
    pub fn value(
        &self,
        final_chips: Option<f64>,
        rebuy: &ChipsConfig,
        rounding: RoundingRule,
    ) -> ChipValuation {
        let chips = normalize_chip_count(final_chips);
        let unit_chips = Decimal::from(rebuy.chips());
        let unit_amount = rebuy.amount().as_decimal();

        let exact_value = chips
            .checked_mul(unit_amount)
            .and_then(|value| value.checked_div(unit_chips))
            .unwrap_or(Decimal::ZERO);
        let exact_chips_value = Money::from_decimal(exact_value);

        if !rounding.is_enabled() {
            let exact_rebuys = chips.checked_div(unit_chips).unwrap_or(Decimal::ZERO);
            return ChipValuation {
                exact_chips_value,
                rounded_rebuys_count: whole_units(exact_rebuys.floor()),
                final_chips_value: exact_chips_value.round_cents(),
            };
        }

        let complete_rebuys = chips
            .checked_div(unit_chips)
            .map(|units| units.floor())
            .unwrap_or(Decimal::ZERO);
        let remainder_chips = chips.checked_rem(unit_chips).unwrap_or(Decimal::ZERO);
        let threshold =
            unit_chips * Decimal::from(rounding.percentage()) / Decimal::ONE_HUNDRED;
        let entitled_rebuys = if remainder_chips >= threshold {
            complete_rebuys + Decimal::ONE
        } else {
            complete_rebuys
        };

        tracing::debug!(
            chips = %chips,
            complete_rebuys = %complete_rebuys,
            remainder_chips = %remainder_chips,
            threshold = %threshold,
            entitled_rebuys = %entitled_rebuys,
            "Chip count rounded to rebuy units"
        );

        ChipValuation {
            exact_chips_value,
            rounded_rebuys_count: whole_units(entitled_rebuys),
            final_chips_value: rebuy.amount() * entitled_rebuys,
        }
    }

    /// Builds a player's pre-bonus result from investment and chip value.
    pub fn evaluate_player(
        &self,
        player: &Player,
        config: &SettlementConfig,
    ) -> PlayerCalculationResult {
        let total_investment = InvestmentCalculator.calculate(player, &config.buy_in, &config.rebuy);
        let valuation = self.value(player.final_chips, &config.rebuy, config.rounding);
        let result_before_open_games = valuation.final_chips_value - total_investment.overall;

        PlayerCalculationResult {
            player: player.clone(),
            total_investment,
            exact_chips_value: valuation.exact_chips_value,
            rounded_rebuys_count: valuation.rounded_rebuys_count,
            final_chips_value: valuation.final_chips_value,
            result_before_open_games,
            open_games_bonus: None,
            final_result_money: result_before_open_games,
        }
    }
}

/// Coerces a recorded chip count into a usable value; anything unusable becomes zero.
///
/// Finite counts beyond the `Decimal` range are rejected, not clamped. Every
/// normalization emits a `warn!` event.
pub fn normalize_chip_count(final_chips: Option<f64>) -> Decimal {
    let Some(raw) = final_chips else {
        tracing::warn!("Missing final chip count normalized to zero");
        return Decimal::ZERO;
    };
    if !raw.is_finite() || raw < 0.0 {
        tracing::warn!(raw, "Malformed final chip count normalized to zero");
        return Decimal::ZERO;
    }
    match Decimal::from_f64(raw) {
        Some(chips) => chips,
        None => {
            tracing::warn!(raw, "Final chip count exceeds decimal range; normalized to zero");
            Decimal::ZERO
        }
    }
}

fn whole_units(units: Decimal) -> u64 {
    units.to_u64().unwrap_or(u64::MAX)
}
