use crate::{
    labels,
    text_table::{Alignment, TextTableBuilder},
};
use chipledger_application::FinalSettlement;
use chipledger_domain::{GameSummary, Money, Payment, PaymentParty, PaymentUnit};
use smol_str::SmolStr;
use std::{borrow::Cow, collections::HashMap};

pub struct SettlementPresenter;

pub struct SettlementView {
    pub totals_table: String,
    pub players_table: String,
    /// `None` while open games are still pending.
    pub payments_table: Option<String>,
    pub notice: Option<Cow<'static, str>>,
}

impl SettlementPresenter {
    /// Renders a summary that still waits for open-game winners.
    pub fn render_pending(summary: &GameSummary, open_games: u32) -> SettlementView {
        SettlementView {
            totals_table: Self::build_totals_table(summary),
            players_table: Self::build_players_table(summary),
            payments_table: None,
            notice: Some(Cow::Owned(labels::open_games_pending(open_games))),
        }
    }

    pub fn render_final(
        settlement: &FinalSettlement,
        payment_units: &[PaymentUnit],
    ) -> SettlementView {
        let summary = &settlement.summary;
        let directory = NameDirectory::new(summary, payment_units);
        let payments = summary.payments.as_deref().unwrap_or_default();

        let notice = if !settlement.is_balanced() {
            Some(Cow::Borrowed(labels::UNSETTLED_WARNING))
        } else if payments.is_empty() {
            Some(Cow::Borrowed(labels::NO_PAYMENTS))
        } else {
            None
        };

        SettlementView {
            totals_table: Self::build_totals_table(summary),
            players_table: Self::build_players_table(summary),
            payments_table: (!payments.is_empty())
                .then(|| Self::build_payments_table(payments, &directory)),
            notice,
        }
    }

    pub fn build_totals_table(summary: &GameSummary) -> String {
        TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(&[Cow::Borrowed(""), Cow::Borrowed(labels::AMOUNT)])
            .row([
                Cow::Borrowed(labels::TOTAL_WINS),
                Cow::Owned(summary.total_wins.to_string()),
            ])
            .row([
                Cow::Borrowed(labels::TOTAL_LOSSES),
                Cow::Owned(summary.total_losses.to_string()),
            ])
            .row([
                Cow::Borrowed(labels::DIFFERENCE),
                Cow::Owned(summary.difference.to_string()),
            ])
            .row([
                Cow::Borrowed(labels::OPEN_GAMES_REQUIRED),
                Cow::Owned(summary.open_games_count.to_string()),
            ])
            .build()
    }

    pub fn build_players_table(summary: &GameSummary) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&[
                Cow::Borrowed(labels::PLAYER),
                Cow::Borrowed(labels::INVESTED),
                Cow::Borrowed(labels::CHIPS),
                Cow::Borrowed(labels::CHIPS_VALUE),
                Cow::Borrowed(labels::BEFORE_OPEN_GAMES),
                Cow::Borrowed(labels::OPEN_GAME_WINS),
                Cow::Borrowed(labels::FINAL),
            ]);

        for result in &summary.players_results {
            let chips = match result.player.final_chips {
                Some(chips) if chips.is_finite() => Cow::Owned(chips.to_string()),
                _ => Cow::Borrowed("-"),
            };
            let wins = match result.open_games_bonus {
                Some(bonus) => Cow::Owned(bonus.wins_count.to_string()),
                None => Cow::Borrowed("-"),
            };
            builder = builder.row([
                Cow::Owned(result.player.name.to_string()),
                Cow::Owned(result.total_investment.overall.to_string()),
                chips,
                Cow::Owned(result.final_chips_value.to_string()),
                Cow::Owned(signed(result.result_before_open_games)),
                wins,
                Cow::Owned(signed(result.final_result_money)),
            ]);
        }

        builder.build()
    }

    fn build_payments_table(payments: &[Payment], directory: &NameDirectory) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&[
                Cow::Borrowed(labels::FROM),
                Cow::Borrowed(labels::TO),
                Cow::Borrowed(labels::AMOUNT),
            ]);

        for payment in payments {
            builder = builder.row([
                directory.label(&payment.from),
                directory.label(&payment.to),
                Cow::Owned(payment.amount.to_string()),
            ]);
        }

        builder.build()
    }
}

struct NameDirectory {
    names: HashMap<PaymentParty, SmolStr>,
}

impl NameDirectory {
    fn new(summary: &GameSummary, payment_units: &[PaymentUnit]) -> Self {
        let players = summary.players_results.iter().map(|result| {
            (
                PaymentParty::Player {
                    user_id: result.player.id.clone(),
                },
                result.player.name.clone(),
            )
        });
        let units = payment_units.iter().map(|unit| {
            (
                PaymentParty::Unit {
                    unit_id: unit.id.clone(),
                },
                unit.name.clone(),
            )
        });

        Self {
            names: players.chain(units).collect(),
        }
    }

    fn label(&self, party: &PaymentParty) -> Cow<'_, str> {
        match self.names.get(party) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(party.to_string()),
        }
    }
}

fn signed(amount: Money) -> String {
    if amount.is_positive() {
        format!("+{amount}")
    } else {
        amount.to_string()
    }
}
