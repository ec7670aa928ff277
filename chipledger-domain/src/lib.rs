#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    ChipsConfig, ConfigError, EntityBalance, GameSummary, Money, OpenGame, OpenGamesBonus,
    Payment, PaymentParty, PaymentUnit, PaymentUnitId, Player, PlayerCalculationResult, PlayerId,
    PlayerInvestment, RoundingRule, SettlementConfig, SettlementPlan, apply_payments,
    pending_open_games,
};
pub use services::{
    ChipValuation, ChipValuator, InvestmentCalculator, OpenGamesBonusResolver, OpenGamesError,
    PaymentSolver, PaymentSolverError, SettlementReconciler,
};
