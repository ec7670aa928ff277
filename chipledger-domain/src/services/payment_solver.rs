use crate::model::{
    EntityBalance, Money, Payment, PaymentParty, PaymentUnit, PaymentUnitId,
    PlayerCalculationResult, PlayerId, SettlementPlan,
};
use fxhash::FxHashMap;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentSolverError {
    #[error("player {player} belongs to more than one active payment unit")]
    PlayerInMultipleUnits { player: PlayerId },
    #[error("payment unit {unit} lists the same player twice")]
    DuplicateUnitMember { unit: PaymentUnitId },
}

/// Greedy debt settlement between players and payment units.
///
/// The largest remaining creditor is always paired with the largest remaining
/// debtor, which yields at most `creditors + debtors - 1` payments.
pub struct PaymentSolver;

impl PaymentSolver {
    pub fn solve(
        &self,
        players_results: &[PlayerCalculationResult],
        payment_units: &[PaymentUnit],
    ) -> Result<SettlementPlan, PaymentSolverError> {
        let entities = self.aggregate_entities(players_results, payment_units)?;
        Ok(self.settle_balances(entities))
    }

    /// Folds members of active payment units into one entity per unit.
    ///
    /// Entities keep roster order; a unit takes the position of its first
    /// member in the roster. Units with no member in the roster are dropped.
    pub fn aggregate_entities(
        &self,
        players_results: &[PlayerCalculationResult],
        payment_units: &[PaymentUnit],
    ) -> Result<Vec<EntityBalance>, PaymentSolverError> {
        let mut unit_of: FxHashMap<&PlayerId, &PaymentUnitId> = FxHashMap::default();
        for unit in payment_units.iter().filter(|unit| unit.is_active) {
            let [first, second] = &unit.players;
            if first == second {
                return Err(PaymentSolverError::DuplicateUnitMember {
                    unit: unit.id.clone(),
                });
            }
            for member in &unit.players {
                if unit_of.insert(member, &unit.id).is_some() {
                    return Err(PaymentSolverError::PlayerInMultipleUnits {
                        player: member.clone(),
                    });
                }
            }
        }

        let mut entities: IndexMap<PaymentParty, Money> =
            IndexMap::with_capacity(players_results.len());
        for result in players_results {
            let party = match unit_of.get(&result.player.id) {
                Some(&unit_id) => PaymentParty::Unit {
                    unit_id: unit_id.clone(),
                },
                None => PaymentParty::Player {
                    user_id: result.player.id.clone(),
                },
            };
            *entities.entry(party).or_insert(Money::ZERO) += result.final_result_money;
        }

        Ok(entities
            .into_iter()
            .map(|(party, amount)| EntityBalance { party, amount })
            .collect())
    }

    /// Matches debtors to creditors. Payment amounts are rounded to cents; the
    /// remainders are tracked unrounded.
    pub fn settle_balances(&self, entities: Vec<EntityBalance>) -> SettlementPlan {
        let entity_count = entities.len();
        let (mut winners, mut losers): (Vec<EntityBalance>, Vec<EntityBalance>) = entities
            .into_iter()
            .filter(|entity| !entity.amount.is_zero())
            .partition(|entity| entity.amount.is_positive());
        winners.sort_by(|a, b| b.amount.cmp(&a.amount));
        losers.sort_by(|a, b| a.amount.cmp(&b.amount));

        let mut payments = Vec::with_capacity(winners.len() + losers.len());
        let mut loser_idx = 0;

        for winner in winners.iter_mut() {
            while !winner.amount.is_zero() && loser_idx < losers.len() {
                let loser = &mut losers[loser_idx];
                let transfer = winner.amount.min(loser.amount.abs());
                winner.amount -= transfer;
                loser.amount += transfer;

                let amount = transfer.round_cents();
                if amount.is_positive() {
                    payments.push(Payment {
                        from: loser.party.clone(),
                        to: winner.party.clone(),
                        amount,
                    });
                }
                if loser.amount.is_zero() {
                    loser_idx += 1;
                }
            }
        }

        let unsettled: Vec<EntityBalance> = winners
            .into_iter()
            .chain(losers.into_iter().skip(loser_idx))
            .filter(|entity| !entity.amount.is_zero())
            .collect();

        if unsettled.is_empty() {
            tracing::debug!(
                entity_count,
                payment_count = payments.len(),
                "Settlement payments computed"
            );
        } else {
            let residual: Money = unsettled.iter().map(|entity| entity.amount).sum();
            tracing::warn!(
                entity_count,
                payment_count = payments.len(),
                unsettled_count = unsettled.len(),
                residual = %residual,
                "Settlement left unbalanced entities; results do not sum to zero"
            );
        }

        SettlementPlan {
            payments,
            unsettled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Player, PlayerInvestment, apply_payments};
    use rstest::{fixture, rstest};

    #[fixture]
    fn solver() -> PaymentSolver {
        PaymentSolver
    }

    fn result(id: &str, amount: Money) -> PlayerCalculationResult {
        PlayerCalculationResult {
            player: Player {
                id: PlayerId::from(id),
                name: id.into(),
                buy_in_count: 1,
                rebuy_count: 0,
                final_chips: Some(0.0),
            },
            total_investment: PlayerInvestment::default(),
            exact_chips_value: Money::ZERO,
            rounded_rebuys_count: 0,
            final_chips_value: Money::ZERO,
            result_before_open_games: amount,
            open_games_bonus: None,
            final_result_money: amount,
        }
    }

    fn unit(id: &str, first: &str, second: &str, is_active: bool) -> PaymentUnit {
        PaymentUnit {
            id: PaymentUnitId::from(id),
            name: id.into(),
            players: [PlayerId::from(first), PlayerId::from(second)],
            is_active,
        }
    }

    fn entity(party: PaymentParty, amount: i64) -> EntityBalance {
        EntityBalance {
            party,
            amount: Money::from_i64(amount),
        }
    }

    fn pay(from: PaymentParty, to: PaymentParty, amount: Money) -> Payment {
        Payment { from, to, amount }
    }

    #[rstest]
    fn single_debtor_pays_single_creditor(solver: PaymentSolver) {
        let plan = solver.settle_balances(vec![
            entity(PaymentParty::player("a"), 100),
            entity(PaymentParty::player("b"), -100),
        ]);

        assert_eq!(
            plan.payments,
            vec![pay(
                PaymentParty::player("b"),
                PaymentParty::player("a"),
                Money::from_i64(100)
            )]
        );
        assert!(plan.is_fully_settled());
    }

    #[rstest]
    fn largest_creditor_is_paid_by_largest_debtor_first(solver: PaymentSolver) {
        let plan = solver.settle_balances(vec![
            entity(PaymentParty::player("a"), 30),
            entity(PaymentParty::player("b"), 70),
            entity(PaymentParty::player("c"), -60),
            entity(PaymentParty::player("d"), -40),
        ]);

        assert_eq!(
            plan.payments,
            vec![
                pay(
                    PaymentParty::player("c"),
                    PaymentParty::player("b"),
                    Money::from_i64(60)
                ),
                pay(
                    PaymentParty::player("d"),
                    PaymentParty::player("b"),
                    Money::from_i64(10)
                ),
                pay(
                    PaymentParty::player("d"),
                    PaymentParty::player("a"),
                    Money::from_i64(30)
                ),
            ]
        );
        assert!(plan.is_fully_settled());
    }

    #[rstest]
    #[case::all_zero(vec![0, 0, 0])]
    #[case::empty(vec![])]
    fn nothing_to_settle_produces_no_payments(solver: PaymentSolver, #[case] amounts: Vec<i64>) {
        let entities = amounts
            .into_iter()
            .enumerate()
            .map(|(idx, amount)| entity(PaymentParty::player(format!("p{idx}").as_str()), amount))
            .collect();

        let plan = solver.settle_balances(entities);

        assert!(plan.payments.is_empty());
        assert!(plan.is_fully_settled());
    }

    #[rstest]
    fn payments_zero_out_every_balance(solver: PaymentSolver) {
        let entities = vec![
            entity(PaymentParty::player("a"), 55),
            entity(PaymentParty::player("b"), 45),
            entity(PaymentParty::player("c"), -20),
            entity(PaymentParty::player("d"), -30),
            entity(PaymentParty::player("e"), -50),
        ];

        let plan = solver.settle_balances(entities.clone());
        let mut balances = entities;
        apply_payments(&mut balances, &plan.payments);

        assert!(balances.iter().all(|balance| balance.amount.is_zero()));
        assert!(plan.payments.len() <= 4);
        assert!(plan.payments.iter().all(|payment| payment.amount.is_positive()));
    }

    #[rstest]
    fn imbalance_is_reported_as_unsettled(solver: PaymentSolver) {
        let plan = solver.settle_balances(vec![
            entity(PaymentParty::player("a"), 100),
            entity(PaymentParty::player("b"), -60),
        ]);

        assert_eq!(
            plan.payments,
            vec![pay(
                PaymentParty::player("b"),
                PaymentParty::player("a"),
                Money::from_i64(60)
            )]
        );
        assert_eq!(plan.unsettled, vec![entity(PaymentParty::player("a"), 40)]);
    }

    #[rstest]
    fn payment_amounts_are_rounded_to_cents(solver: PaymentSolver) {
        let plan = solver.settle_balances(vec![
            EntityBalance {
                party: PaymentParty::player("a"),
                amount: Money::new(10_005, 3),
            },
            EntityBalance {
                party: PaymentParty::player("b"),
                amount: Money::new(-10_005, 3),
            },
        ]);

        assert_eq!(plan.payments[0].amount, Money::new(1_001, 2));
        assert!(plan.is_fully_settled());
    }

    #[rstest]
    fn unit_members_settle_as_one_entity(solver: PaymentSolver) {
        let results = [
            result("a", Money::from_i64(30)),
            result("b", Money::from_i64(-10)),
            result("c", Money::from_i64(-20)),
        ];
        let units = [unit("u1", "a", "b", true)];

        let plan = solver.solve(&results, &units).expect("valid units");

        assert_eq!(
            plan.payments,
            vec![pay(
                PaymentParty::player("c"),
                PaymentParty::unit("u1"),
                Money::from_i64(20)
            )]
        );
    }

    #[rstest]
    fn aggregation_places_unit_at_first_member(solver: PaymentSolver) {
        let results = [
            result("a", Money::from_i64(10)),
            result("b", Money::from_i64(-25)),
            result("c", Money::from_i64(15)),
        ];
        let units = [unit("u1", "c", "b", true)];

        let entities = solver
            .aggregate_entities(&results, &units)
            .expect("valid units");

        assert_eq!(
            entities,
            vec![
                entity(PaymentParty::player("a"), 10),
                entity(PaymentParty::unit("u1"), -10),
            ]
        );
    }

    #[rstest]
    fn inactive_units_are_ignored(solver: PaymentSolver) {
        let results = [
            result("a", Money::from_i64(30)),
            result("b", Money::from_i64(-30)),
        ];
        let units = [unit("u1", "a", "b", false)];

        let plan = solver.solve(&results, &units).expect("valid units");

        assert_eq!(
            plan.payments,
            vec![pay(
                PaymentParty::player("b"),
                PaymentParty::player("a"),
                Money::from_i64(30)
            )]
        );
    }

    #[rstest]
    fn unit_with_balanced_members_drops_out(solver: PaymentSolver) {
        let results = [
            result("a", Money::from_i64(40)),
            result("b", Money::from_i64(-40)),
        ];
        let units = [unit("u1", "a", "b", true)];

        let plan = solver.solve(&results, &units).expect("valid units");

        assert!(plan.payments.is_empty());
        assert!(plan.is_fully_settled());
    }

    #[rstest]
    fn rejects_player_in_two_active_units(solver: PaymentSolver) {
        let results = [result("a", Money::ZERO)];
        let units = [unit("u1", "a", "b", true), unit("u2", "c", "a", true)];

        let err = solver
            .aggregate_entities(&results, &units)
            .expect_err("overlapping units");

        assert_eq!(
            err,
            PaymentSolverError::PlayerInMultipleUnits {
                player: PlayerId::from("a"),
            }
        );
    }

    #[rstest]
    fn overlap_with_inactive_unit_is_allowed(solver: PaymentSolver) {
        let results = [result("a", Money::ZERO)];
        let units = [unit("u1", "a", "b", false), unit("u2", "c", "a", true)];

        assert!(solver.aggregate_entities(&results, &units).is_ok());
    }

    #[rstest]
    fn rejects_unit_with_duplicate_member(solver: PaymentSolver) {
        let units = [unit("u1", "a", "a", true)];

        let err = solver
            .aggregate_entities(&[], &units)
            .expect_err("duplicate member");

        assert_eq!(
            err,
            PaymentSolverError::DuplicateUnitMember {
                unit: PaymentUnitId::from("u1"),
            }
        );
    }
}
