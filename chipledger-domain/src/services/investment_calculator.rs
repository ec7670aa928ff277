use crate::model::{ChipsConfig, Player, PlayerInvestment};
use rust_decimal::Decimal;

/// Money a player put into the game through buy-ins and rebuys.
pub struct InvestmentCalculator;

impl InvestmentCalculator {
    pub fn calculate(
        &self,
        player: &Player,
        buy_in: &ChipsConfig,
        rebuy: &ChipsConfig,
    ) -> PlayerInvestment {
        let buy_in_total = buy_in.amount() * Decimal::from(player.buy_in_count);
        let rebuy_total = rebuy.amount() * Decimal::from(player.rebuy_count);

        PlayerInvestment {
            buy_in_count: player.buy_in_count,
            buy_in_total,
            rebuy_count: player.rebuy_count,
            rebuy_total,
            overall: buy_in_total + rebuy_total,
        }
    }
}
