use chipledger_domain::{ConfigError, OpenGamesError, PaymentSolverError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementProcessError {
    #[error("invalid group configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("expected {expected} open games, received {found}")]
    OpenGamesMismatch { expected: u32, found: usize },
    #[error(transparent)]
    OpenGames(#[from] OpenGamesError),
    #[error(transparent)]
    PaymentSolver(#[from] PaymentSolverError),
}
