use crate::model::{GameSummary, Money, PlayerCalculationResult};
use rust_decimal::prelude::ToPrimitive;

/// Totals the pre-bonus results and derives how many open games rebalance them.
pub struct SettlementReconciler;

impl SettlementReconciler {
    pub fn reconcile(
        &self,
        players_results: Vec<PlayerCalculationResult>,
        rebuy_amount: Money,
    ) -> GameSummary {
        let (total_wins, total_losses) = players_results.iter().fold(
            (Money::ZERO, Money::ZERO),
            |(wins, losses), result| {
                let amount = result.result_before_open_games;
                if amount.is_positive() {
                    (wins + amount, losses)
                } else if amount.is_negative() {
                    (wins, losses + amount.abs())
                } else {
                    (wins, losses)
                }
            },
        );
        let difference = (total_wins - total_losses).abs();
        let open_games_count = open_games_required(difference, rebuy_amount);

        tracing::debug!(
            player_count = players_results.len(),
            total_wins = %total_wins,
            total_losses = %total_losses,
            difference = %difference,
            open_games_count,
            "Initial settlement reconciled"
        );

        GameSummary {
            players_results,
            total_wins,
            total_losses,
            difference,
            open_games_count,
            payments: None,
        }
    }
}

/// `ceil(difference / rebuy_amount)`, saturating at `u32::MAX`.
fn open_games_required(difference: Money, rebuy_amount: Money) -> u32 {
    if !difference.is_positive() {
        return 0;
    }
    let games = difference
        .as_decimal()
        .checked_div(rebuy_amount.as_decimal())
        .and_then(|games| games.ceil().to_u32());
    match games {
        Some(games) => games,
        None => {
            tracing::warn!(
                difference = %difference,
                rebuy_amount = %rebuy_amount,
                "Open games requirement out of range; saturating"
            );
            u32::MAX
        }
    }
}
