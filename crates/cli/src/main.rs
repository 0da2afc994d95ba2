// badgeport CLI - hash badge/card identifiers and upload them to the
// badge-management service

mod exit_codes;
mod hash;
mod input;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgGroup, Parser};

use badgeport_client::{build_http, BadgeClient, BadgePayload, ServiceError};
use badgeport_config::{Config, ConfigError};

use exit_codes::{
    EXIT_AUTH, EXIT_CONFIG, EXIT_ERROR, EXIT_INPUT_FORMAT, EXIT_INPUT_IO, EXIT_NETWORK,
    EXIT_SUCCESS, EXIT_UPLOAD, EXIT_USAGE,
};

#[derive(Parser, Debug)]
#[command(name = "badgeport")]
#[command(about = "Hash badge/card identifiers and upload them to the badge service")]
#[command(version)]
#[command(after_help = "\
Examples:
  badgeport --config prod.properties --badgesCsv badges.csv
  badgeport --config prod.properties --badgesCsv badges.csv --namespace campus-7
  badgeport --config prod.properties --badgesCsv changes.csv --incremental
  badgeport --config prod.properties --badgesCsv badges.csv --dumpFile hashed.csv
  badgeport --config prod.properties --badges card-ids.txt
  badgeport --config prod.properties --cardsCsv cards.csv")]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["badges_csv", "badges", "cards_csv"]),
))]
struct Cli {
    /// Properties file with baseUrl, appId, secret and badgingKey
    #[arg(long)]
    config: PathBuf,

    /// Badge CSV input (header row: badge,riderId[,delete])
    #[arg(long = "badgesCsv")]
    badges_csv: Option<PathBuf>,

    /// Line-list input, one raw badge id per line
    #[arg(long)]
    badges: Option<PathBuf>,

    /// Card CSV input (header row: riderId,prox,uhf)
    #[arg(long = "cardsCsv")]
    cards_csv: Option<PathBuf>,

    /// Tenant namespace, sent as a query parameter on the upload
    #[arg(long, requires = "badges_csv")]
    namespace: Option<String>,

    /// Write the hashed CSV here instead of uploading (no network at all)
    #[arg(long = "dumpFile", requires = "badges_csv")]
    dump_file: Option<PathBuf>,

    /// Incremental upload: read and emit the delete column
    #[arg(long, requires = "badges_csv")]
    incremental: bool,

    /// Suppress stderr progress lines
    #[arg(long, short = 'q')]
    quiet: bool,
}

fn main() -> ExitCode {
    // clap renders its own output; help and version are success,
    // anything else is a usage error per the exit-code registry
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(match err.kind() {
                clap::error::ErrorKind::DisplayHelp
                | clap::error::ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_USAGE,
            });
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let progress = !cli.quiet && atty::is(atty::Stream::Stderr);

    // Config problems abort before any input or network work
    let config = Config::load(&cli.config).map_err(CliError::config)?;

    if let Some(path) = cli.badges_csv.as_deref() {
        run_badge_csv(&cli, path, &config, progress)
    } else if let Some(path) = cli.badges.as_deref() {
        run_badge_lines(path, &config, progress)
    } else if let Some(path) = cli.cards_csv.as_deref() {
        run_card_csv(path, &config, progress)
    } else {
        // The clap input group guarantees exactly one mode
        unreachable!()
    }
}

/// Badge CSV mode: hash the badge column, upload as v2 CSV text (or
/// write to --dumpFile without touching the network).
fn run_badge_csv(
    cli: &Cli,
    path: &Path,
    config: &Config,
    progress: bool,
) -> Result<(), CliError> {
    let rows = input::read_badge_csv(path, cli.incremental)?;
    let hashed = hash::hash_badge_rows(&config.badging_key, rows);
    let row_count = hashed.len();
    let csv_text = output::badge_csv(&hashed, cli.incremental)?;

    if let Some(dump) = cli.dump_file.as_deref() {
        std::fs::write(dump, csv_text).map_err(|e| {
            CliError::input_io(format!("cannot write {}: {}", dump.display(), e))
        })?;
        if progress {
            eprintln!("Done: {} hashed rows written to {}", row_count, dump.display());
        }
        return Ok(());
    }

    let payload = BadgePayload::BadgeCsv {
        csv: csv_text,
        namespace: cli.namespace.clone(),
        incremental: cli.incremental,
    };
    upload_payload(config, payload, row_count, progress)
}

/// Line-list mode: hash every line, upload as the v1 hashed-id list.
fn run_badge_lines(path: &Path, config: &Config, progress: bool) -> Result<(), CliError> {
    let lines = input::read_badge_lines(path)?;
    let hashed = hash::hash_lines(&config.badging_key, lines);
    let row_count = hashed.len();
    upload_payload(config, BadgePayload::HashedCardIds(hashed), row_count, progress)
}

/// Card CSV mode: hash prox and uhf, upload as the v3 card list.
fn run_card_csv(path: &Path, config: &Config, progress: bool) -> Result<(), CliError> {
    let rows = input::read_card_csv(path)?;
    let hashed = hash::hash_card_rows(&config.badging_key, rows);
    let row_count = hashed.len();
    upload_payload(config, output::card_payload(hashed), row_count, progress)
}

/// Token exchange followed by the single upload call. Strictly
/// sequential; one in-flight request at a time.
fn upload_payload(
    config: &Config,
    payload: BadgePayload,
    row_count: usize,
    progress: bool,
) -> Result<(), CliError> {
    let client = BadgeClient::new(build_http(), config.base_url.as_str());

    if progress {
        eprintln!("Requesting access token from {}", config.base_url);
    }
    let token = client
        .access_token(&config.app_id, &config.secret)
        .map_err(CliError::service)?;

    if progress {
        eprintln!("Uploading {} hashed rows", row_count);
    }
    client.upload(&token, payload).map_err(CliError::service)?;

    if progress {
        eprintln!("Done: {} rows uploaded", row_count);
    }
    Ok(())
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    fn input_format(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT_FORMAT, message: msg.into(), hint: None }
    }

    fn input_io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT_IO, message: msg.into(), hint: None }
    }

    fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::MissingKey(_) => {
                Some("required properties: baseUrl, appId, secret, badgingKey".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_CONFIG, message: err.to_string(), hint }
    }

    fn service(err: ServiceError) -> Self {
        let code = match &err {
            ServiceError::AuthFailed { .. } | ServiceError::AuthParse(_) => EXIT_AUTH,
            ServiceError::Upload { .. } => EXIT_UPLOAD,
            ServiceError::Network(_) => EXIT_NETWORK,
        };
        let hint = match &err {
            ServiceError::AuthFailed { .. } => {
                Some("check appId and secret in the config file".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}
