#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod settlement_processor;

pub use error::SettlementProcessError;
pub use model::{GameRecord, GameSnapshot, GroupSettings};
pub use settlement_processor::{
    FinalSettlement, GameSettlementProcessor, InitialSettlement, SettlementPhase,
};
