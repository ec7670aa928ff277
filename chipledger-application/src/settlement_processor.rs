use crate::{error::SettlementProcessError, model::GameSnapshot};
use chipledger_domain::{
    ChipValuator, EntityBalance, GameSummary, OpenGame, OpenGamesBonusResolver, PaymentSolver,
    PaymentUnit, PlayerCalculationResult, SettlementReconciler,
};

/// What must happen after the initial summary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettlementPhase {
    /// Winners must be recorded for this many open games.
    OpenGames { count: u32 },
    /// Payments can be computed right away.
    Final,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InitialSettlement {
    pub summary: GameSummary,
    pub next_phase: SettlementPhase,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FinalSettlement {
    /// Summary with final per-player results and `payments` filled in.
    pub summary: GameSummary,
    /// Entities the payments could not settle; non-empty only for inconsistent input.
    pub unsettled: Vec<EntityBalance>,
}

impl FinalSettlement {
    pub fn is_balanced(&self) -> bool {
        self.unsettled.is_empty()
    }
}

/// Drives a finished game through initial summary, open games and payments.
#[derive(Clone, Copy, Debug, Default)]
pub struct GameSettlementProcessor;

impl GameSettlementProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate_players(&self, snapshot: &GameSnapshot) -> Vec<PlayerCalculationResult> {
        snapshot
            .players()
            .iter()
            .map(|player| ChipValuator.evaluate_player(player, snapshot.config()))
            .collect()
    }

    pub fn summarize(&self, snapshot: &GameSnapshot) -> InitialSettlement {
        let config = snapshot.config();
        let summary =
            SettlementReconciler.reconcile(self.evaluate_players(snapshot), config.rebuy.amount());

        let next_phase = if config.rounding.is_enabled() && summary.requires_open_games() {
            SettlementPhase::OpenGames {
                count: summary.open_games_count,
            }
        } else {
            SettlementPhase::Final
        };

        tracing::info!(
            player_count = summary.players_results.len(),
            total_wins = %summary.total_wins,
            total_losses = %summary.total_losses,
            next_phase = ?next_phase,
            "Initial settlement summarized"
        );

        InitialSettlement {
            summary,
            next_phase,
        }
    }

    /// Applies open-game bonuses (when required) and computes payments.
    ///
    /// `open_games` must hold exactly the number of games the initial summary
    /// requires, each with a winner; it must be empty when none are required.
    pub fn finalize(
        &self,
        snapshot: &GameSnapshot,
        open_games: &[OpenGame],
        payment_units: &[PaymentUnit],
    ) -> Result<FinalSettlement, SettlementProcessError> {
        let InitialSettlement {
            mut summary,
            next_phase,
        } = self.summarize(snapshot);
        let rebuy_amount = snapshot.config().rebuy.amount();

        let results = std::mem::take(&mut summary.players_results);
        summary.players_results = match next_phase {
            SettlementPhase::OpenGames { count } => {
                if open_games.len() != count as usize {
                    return Err(SettlementProcessError::OpenGamesMismatch {
                        expected: count,
                        found: open_games.len(),
                    });
                }
                OpenGamesBonusResolver.resolve(results, open_games, rebuy_amount)?
            }
            SettlementPhase::Final => {
                if !open_games.is_empty() {
                    return Err(SettlementProcessError::OpenGamesMismatch {
                        expected: 0,
                        found: open_games.len(),
                    });
                }
                OpenGamesBonusResolver.without_open_games(results)
            }
        };

        let final_total = summary.final_total();
        if !final_total.is_zero() {
            tracing::warn!(
                final_total = %final_total,
                open_games = open_games.len(),
                "Final results do not sum to zero"
            );
        }

        let plan = PaymentSolver.solve(&summary.players_results, payment_units)?;
        tracing::info!(
            payment_count = plan.payments.len(),
            unsettled_count = plan.unsettled.len(),
            "Final settlement computed"
        );
        summary.payments = Some(plan.payments);

        Ok(FinalSettlement {
            summary,
            unsettled: plan.unsettled,
        })
    }
}
