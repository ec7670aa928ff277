use chipledger_domain::{
    ChipsConfig, ConfigError, OpenGame, PaymentUnit, Player, PlayerId, RoundingRule,
    SettlementConfig,
};
use serde::{Deserialize, Serialize};

/// Group-level chip and rounding configuration as stored by the persistence layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSettings {
    pub buy_in: ChipsConfig,
    pub rebuy: ChipsConfig,
    #[serde(default)]
    pub use_rounding_rule: bool,
    #[serde(default = "default_rounding_percentage")]
    pub rounding_rule_percentage: u8,
}

fn default_rounding_percentage() -> u8 {
    RoundingRule::DEFAULT_PERCENTAGE
}

impl GroupSettings {
    pub fn validate(&self) -> Result<SettlementConfig, ConfigError> {
        let rounding = RoundingRule::try_new(self.use_rounding_rule, self.rounding_rule_percentage)?;
        Ok(SettlementConfig {
            buy_in: self.buy_in,
            rebuy: self.rebuy,
            rounding,
        })
    }
}

/// A game's roster together with the configuration frozen at game start.
///
/// Editing the group afterwards never changes an existing snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSnapshot {
    config: SettlementConfig,
    players: Vec<Player>,
}

impl GameSnapshot {
    pub fn from_group(group: &GroupSettings, players: Vec<Player>) -> Result<Self, ConfigError> {
        Ok(Self {
            config: group.validate()?,
            players,
        })
    }

    pub fn new(config: SettlementConfig, players: Vec<Player>) -> Self {
        Self { config, players }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }
}

/// Everything needed to settle one game, in the shape the CLI reads from disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub group: GroupSettings,
    pub players: Vec<Player>,
    #[serde(default)]
    pub payment_units: Vec<PaymentUnit>,
    /// Winner of each open game, in game order.
    #[serde(default)]
    pub open_game_winners: Vec<PlayerId>,
}

impl GameRecord {
    pub fn snapshot(&self) -> Result<GameSnapshot, ConfigError> {
        GameSnapshot::from_group(&self.group, self.players.clone())
    }

    /// Schedules `count` open games and fills in the recorded winners.
    pub fn open_games(&self, count: u32) -> Vec<OpenGame> {
        let mut games = OpenGame::schedule(count);
        for (game, winner) in games.iter_mut().zip(&self.open_game_winners) {
            game.winner = Some(winner.clone());
        }
        games
    }
}
