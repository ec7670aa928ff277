use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};
use thiserror::Error;

/// Money amount in the group's currency.
///
/// Serialized as a plain JSON number, the same shape the game records use.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Number of decimal places payments and chip values are rounded to.
    pub const CENT_SCALE: u32 = 2;

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn signum(self) -> Decimal {
        if self.is_positive() {
            Decimal::ONE
        } else if self.is_negative() {
            Decimal::NEGATIVE_ONE
        } else {
            Decimal::ZERO
        }
    }

    /// Rounds to cents, halves away from zero.
    pub fn round_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(Self::CENT_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub SmolStr);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentUnitId(pub SmolStr);

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(SmolStr::new(value))
    }
}

impl From<&str> for PaymentUnitId {
    fn from(value: &str) -> Self {
        Self(SmolStr::new(value))
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PaymentUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("chips per unit must be greater than zero")]
    NonPositiveChips,
    #[error("amount per unit must be greater than zero (found {0})")]
    NonPositiveAmount(Money),
    #[error("rounding rule percentage must be within 1..=100 (found {0})")]
    PercentageOutOfRange(u8),
}

/// Money value of one buy-in or rebuy unit of chips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChipsConfig", into = "RawChipsConfig")]
pub struct ChipsConfig {
    chips: u32,
    amount: Money,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct RawChipsConfig {
    chips: u32,
    amount: Money,
}

impl ChipsConfig {
    pub fn try_new(chips: u32, amount: Money) -> Result<Self, ConfigError> {
        if chips == 0 {
            return Err(ConfigError::NonPositiveChips);
        }
        if !amount.is_positive() {
            return Err(ConfigError::NonPositiveAmount(amount));
        }
        Ok(Self { chips, amount })
    }

    pub fn chips(&self) -> u32 {
        self.chips
    }

    pub fn amount(&self) -> Money {
        self.amount
    }
}

impl TryFrom<RawChipsConfig> for ChipsConfig {
    type Error = ConfigError;

    fn try_from(raw: RawChipsConfig) -> Result<Self, Self::Error> {
        Self::try_new(raw.chips, raw.amount)
    }
}

impl From<ChipsConfig> for RawChipsConfig {
    fn from(config: ChipsConfig) -> Self {
        Self {
            chips: config.chips,
            amount: config.amount,
        }
    }
}

/// Rebuy-unit rounding applied to final chip counts.
///
/// A disabled rule keeps its percentage so toggling it back restores the
/// previous threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundingRule {
    enabled: bool,
    percentage: u8,
}

impl RoundingRule {
    pub const DEFAULT_PERCENTAGE: u8 = 50;

    pub fn try_new(enabled: bool, percentage: u8) -> Result<Self, ConfigError> {
        if percentage == 0 || percentage > 100 {
            return Err(ConfigError::PercentageOutOfRange(percentage));
        }
        Ok(Self {
            enabled,
            percentage,
        })
    }

    pub fn exact() -> Self {
        Self {
            enabled: false,
            percentage: Self::DEFAULT_PERCENTAGE,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn percentage(&self) -> u8 {
        self.percentage
    }
}

impl Default for RoundingRule {
    fn default() -> Self {
        Self::exact()
    }
}

/// Configuration frozen onto a game when it starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementConfig {
    pub buy_in: ChipsConfig,
    pub rebuy: ChipsConfig,
    pub rounding: RoundingRule,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: SmolStr,
    #[serde(default)]
    pub buy_in_count: u32,
    #[serde(default)]
    pub rebuy_count: u32,
    /// Unset while the game is still active.
    #[serde(default)]
    pub final_chips: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInvestment {
    pub buy_in_count: u32,
    pub buy_in_total: Money,
    pub rebuy_count: u32,
    pub rebuy_total: Money,
    pub overall: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGamesBonus {
    pub wins_count: u32,
    pub bonus_amount: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCalculationResult {
    #[serde(flatten)]
    pub player: Player,
    pub total_investment: PlayerInvestment,
    pub exact_chips_value: Money,
    pub rounded_rebuys_count: u64,
    pub final_chips_value: Money,
    pub result_before_open_games: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_games_bonus: Option<OpenGamesBonus>,
    /// Equals `result_before_open_games` until open-game bonuses are resolved.
    pub final_result_money: Money,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub players_results: Vec<PlayerCalculationResult>,
    pub total_wins: Money,
    pub total_losses: Money,
    pub difference: Money,
    pub open_games_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<Payment>>,
}

impl GameSummary {
    pub fn requires_open_games(&self) -> bool {
        self.open_games_count > 0
    }

    /// Sum of every player's final result; zero once the ledger balances.
    pub fn final_total(&self) -> Money {
        self.players_results
            .iter()
            .map(|result| result.final_result_money)
            .sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGame {
    pub id: u32,
    #[serde(default)]
    pub winner: Option<PlayerId>,
}

impl OpenGame {
    /// Creates `count` open games numbered from 1, none with a winner yet.
    pub fn schedule(count: u32) -> Vec<Self> {
        (1..=count).map(|id| Self { id, winner: None }).collect()
    }

    pub fn is_resolved(&self) -> bool {
        self.winner.is_some()
    }
}

pub fn pending_open_games(open_games: &[OpenGame]) -> impl Iterator<Item = &OpenGame> + '_ {
    open_games.iter().filter(|game| !game.is_resolved())
}

/// Two players settling as one financial entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUnit {
    pub id: PaymentUnitId,
    pub name: SmolStr,
    pub players: [PlayerId; 2],
    pub is_active: bool,
}

impl PaymentUnit {
    pub fn contains(&self, player: &PlayerId) -> bool {
        self.players.iter().any(|member| member == player)
    }
}

/// One side of a payment: a lone player or a payment unit.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentParty {
    Player {
        #[serde(rename = "userId")]
        user_id: PlayerId,
    },
    Unit {
        #[serde(rename = "unitId")]
        unit_id: PaymentUnitId,
    },
}

impl PaymentParty {
    pub fn player(id: impl Into<PlayerId>) -> Self {
        Self::Player { user_id: id.into() }
    }

    pub fn unit(id: impl Into<PaymentUnitId>) -> Self {
        Self::Unit { unit_id: id.into() }
    }
}

impl fmt::Display for PaymentParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player { user_id } => write!(f, "{user_id}"),
            Self::Unit { unit_id } => write!(f, "unit:{unit_id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub from: PaymentParty,
    pub to: PaymentParty,
    pub amount: Money,
}

/// Net result of one settlement entity (positive: is owed money).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBalance {
    pub party: PaymentParty,
    pub amount: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    pub payments: Vec<Payment>,
    /// Entities still holding a balance after matching; empty for a balanced input.
    pub unsettled: Vec<EntityBalance>,
}

impl SettlementPlan {
    pub fn is_fully_settled(&self) -> bool {
        self.unsettled.is_empty()
    }
}

/// Applies payments to entity balances: the payer moves up, the payee down.
pub fn apply_payments(balances: &mut [EntityBalance], payments: &[Payment]) {
    for payment in payments {
        for balance in balances.iter_mut() {
            if balance.party == payment.from {
                balance.amount += payment.amount;
            } else if balance.party == payment.to {
                balance.amount -= payment.amount;
            }
        }
    }
}
