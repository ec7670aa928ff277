pub mod chip_valuation;
pub mod investment_calculator;
pub mod open_games_resolver;
pub mod payment_solver;
pub mod settlement_reconciler;

pub use chip_valuation::{ChipValuation, ChipValuator, normalize_chip_count};
pub use investment_calculator::InvestmentCalculator;
pub use open_games_resolver::{OpenGamesBonusResolver, OpenGamesError};
pub use payment_solver::{PaymentSolver, PaymentSolverError};
pub use settlement_reconciler::SettlementReconciler;
