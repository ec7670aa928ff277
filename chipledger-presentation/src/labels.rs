pub const PLAYER: &str = "Player";
pub const INVESTED: &str = "Invested";
pub const CHIPS: &str = "Chips";
pub const CHIPS_VALUE: &str = "Chips value";
pub const BEFORE_OPEN_GAMES: &str = "Before open games";
pub const OPEN_GAME_WINS: &str = "Open game wins";
pub const FINAL: &str = "Final";
pub const FROM: &str = "From";
pub const TO: &str = "To";
pub const AMOUNT: &str = "Amount";
pub const TOTAL_WINS: &str = "Total wins";
pub const TOTAL_LOSSES: &str = "Total losses";
pub const DIFFERENCE: &str = "Difference";
pub const OPEN_GAMES_REQUIRED: &str = "Open games required";
pub const NO_PAYMENTS: &str = "Everyone is settled; no payments needed.";
pub const UNSETTLED_WARNING: &str = "Warning: results do not balance; some amounts remain unsettled.";

pub fn open_games_pending(count: u32) -> String {
    format!("{count} open game(s) must be played before payments can be computed.")
}
