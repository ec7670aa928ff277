use crate::model::{Money, OpenGame, OpenGamesBonus, PlayerCalculationResult, PlayerId};
use fxhash::{FxHashMap, FxHashSet};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenGamesError {
    #[error("open game {id} has no recorded winner")]
    UnresolvedOpenGame { id: u32 },
    #[error("open game {id} was won by {winner}, who is not in the game")]
    UnknownWinner { id: u32, winner: PlayerId },
}

/// Credits each open-game winner with one rebuy unit per game won.
pub struct OpenGamesBonusResolver;

impl OpenGamesBonusResolver {
    /// Every open game must carry a winner; an unresolved game is an error,
    /// never an implicit zero bonus.
    pub fn resolve(
        &self,
        players_results: Vec<PlayerCalculationResult>,
        open_games: &[OpenGame],
        rebuy_amount: Money,
    ) -> Result<Vec<PlayerCalculationResult>, OpenGamesError> {
        let roster: FxHashSet<&PlayerId> = players_results
            .iter()
            .map(|result| &result.player.id)
            .collect();

        let mut wins: FxHashMap<PlayerId, u32> = FxHashMap::default();
        for game in open_games {
            let Some(winner) = &game.winner else {
                return Err(OpenGamesError::UnresolvedOpenGame { id: game.id });
            };
            if !roster.contains(winner) {
                return Err(OpenGamesError::UnknownWinner {
                    id: game.id,
                    winner: winner.clone(),
                });
            }
            *wins.entry(winner.clone()).or_insert(0) += 1;
        }

        tracing::debug!(
            open_games = open_games.len(),
            winners = wins.len(),
            rebuy_amount = %rebuy_amount,
            "Resolving open-game bonuses"
        );

        Ok(players_results
            .into_iter()
            .map(|mut result| {
                let wins_count = wins.get(&result.player.id).copied().unwrap_or(0);
                let bonus_amount = rebuy_amount * Decimal::from(wins_count);
                result.open_games_bonus = Some(OpenGamesBonus {
                    wins_count,
                    bonus_amount,
                });
                result.final_result_money = result.result_before_open_games + bonus_amount;
                result
            })
            .collect())
    }

    /// Final results when the open-games phase is skipped: no bonus for anyone.
    pub fn without_open_games(
        &self,
        players_results: Vec<PlayerCalculationResult>,
    ) -> Vec<PlayerCalculationResult> {
        players_results
            .into_iter()
            .map(|mut result| {
                result.open_games_bonus = None;
                result.final_result_money = result.result_before_open_games;
                result
            })
            .collect()
    }
}
