use std::{borrow::Cow, env, fs, process};

use chipledger_application::{GameRecord, GameSettlementProcessor, SettlementPhase};
use chipledger_domain::{EntityBalance, GameSummary, pending_open_games};
use chipledger_presentation::{SettlementPresenter, SettlementView};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Cow<'static, str>>;

const USAGE: &str = "Usage: chipledger_interpreter [--json] <game.json>";
const EXIT_OPEN_GAMES_PENDING: i32 = 2;

enum OutputFormat {
    Text,
    Json,
}

enum Outcome {
    Settled,
    OpenGamesPending,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    summary: &'a GameSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pending_open_games: Option<u32>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    unsettled: &'a [EntityBalance],
}

fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(Outcome::Settled) => {}
        Ok(Outcome::OpenGamesPending) => process::exit(EXIT_OPEN_GAMES_PENDING),
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    }
}

fn run() -> CliResult<Outcome> {
    let (format, path) = parse_args(env::args().skip(1))?;

    let source =
        fs::read_to_string(&path).map_err(|err| format!("Failed to read '{path}': {err}"))?;
    let record: GameRecord = serde_json::from_str(&source)
        .map_err(|err| format!("Failed to parse '{path}': {err}"))?;
    let snapshot = record
        .snapshot()
        .map_err(|err| format!("Invalid group configuration: {err}"))?;

    let processor = GameSettlementProcessor::new();
    let initial = processor.summarize(&snapshot);

    let open_games = match initial.next_phase {
        SettlementPhase::OpenGames { count } => record.open_games(count),
        SettlementPhase::Final => Vec::new(),
    };

    let pending = pending_open_games(&open_games).count();
    if pending > 0 {
        tracing::info!(
            required = open_games.len(),
            pending,
            "Open games still pending"
        );
        let required = initial.summary.open_games_count;
        match format {
            OutputFormat::Text => {
                print_view(&SettlementPresenter::render_pending(&initial.summary, required))
            }
            OutputFormat::Json => print_json(&JsonReport {
                summary: &initial.summary,
                pending_open_games: Some(required),
                unsettled: &[],
            })?,
        }
        return Ok(Outcome::OpenGamesPending);
    }

    let settlement = processor
        .finalize(&snapshot, &open_games, &record.payment_units)
        .map_err(|err| format!("Settlement failed: {err}"))?;

    match format {
        OutputFormat::Text => print_view(&SettlementPresenter::render_final(
            &settlement,
            &record.payment_units,
        )),
        OutputFormat::Json => print_json(&JsonReport {
            summary: &settlement.summary,
            pending_open_games: None,
            unsettled: &settlement.unsettled,
        })?,
    }

    Ok(Outcome::Settled)
}

fn parse_args(args: impl Iterator<Item = String>) -> CliResult<(OutputFormat, String)> {
    let mut format = OutputFormat::Text;
    let mut path = None;

    for arg in args {
        match arg.as_str() {
            "--json" => format = OutputFormat::Json,
            "-h" | "--help" => return Err(USAGE.into()),
            flag if flag.starts_with('-') => {
                return Err(format!("Unknown option '{flag}'\n{USAGE}").into());
            }
            _ if path.is_some() => return Err(USAGE.into()),
            _ => path = Some(arg),
        }
    }

    let Some(path) = path else {
        return Err(USAGE.into());
    };
    Ok((format, path))
}

fn print_view(view: &SettlementView) {
    println!("{}", view.totals_table);
    println!("{}", view.players_table);
    if let Some(payments) = &view.payments_table {
        println!("{payments}");
    }
    if let Some(notice) = &view.notice {
        println!("{notice}");
    }
}

fn print_json(report: &JsonReport<'_>) -> CliResult<()> {
    let output = serde_json::to_string_pretty(report)
        .map_err(|err| format!("Failed to serialize result: {err}"))?;
    println!("{output}");
    Ok(())
}
