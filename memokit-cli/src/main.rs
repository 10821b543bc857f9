//! Command-line memo decoder.
//!
//! # Usage
//!
//! ```bash
//! # Decode one or more memos
//! memokit decode '=:BTC.BTC:bc1qdest:100/10/20' 'RAGNAROK:1024'
//!
//! # Decode at an older protocol version
//! memokit decode --protocol-version 1.0.0 'SWAP:BTC.BTC:bc1qdest:1e3'
//!
//! # Inspect the sub-parsers
//! memokit affiliates fx15b20im10
//! memokit amount 12345e8
//!
//! # Configure logging level
//! RUST_LOG=debug memokit decode 'LEAVE:thor1node'
//! ```
//!
//! # Environment Variables
//!
//! - `MEMOKIT_CONFIG` - Path to TOML configuration file (default: `memokit.toml`)
//! - `MEMOKIT_PROTOCOL_VERSION` - Override the configured protocol version
//! - `RUST_LOG` - Log level filter (default: `info`)

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use memokit::affiliate::parse_affiliates_with;
use memokit::{DecodeContext, Memo, ProtocolVersion, parse_min_amount};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use memokit_cli::config::{DEFAULT_CONFIG_PATH, MemokitConfig};
use memokit_cli::error::CliError;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "MEMOKIT_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decodes memos, printing one JSON object per memo.
    Decode {
        /// Memos to decode.
        #[arg(required = true)]
        memos: Vec<String>,

        /// Protocol version to decode at, overriding the configuration.
        #[arg(long)]
        protocol_version: Option<ProtocolVersion>,
    },
    /// Parses an affiliate list in the compact or verbose grammar.
    Affiliates {
        /// The affiliate field.
        field: String,
    },
    /// Parses an amount with the permissive amount grammar.
    Amount {
        /// The amount text.
        text: String,
    },
}

/// One line of `decode` output.
#[derive(Debug, Serialize)]
struct DecodeOutput<'a> {
    memo: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ok: Option<Memo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("memokit failed: {e}");
            ExitCode::from(2)
        }
    }
}

/// Runs a command. Returns `false` if any memo failed to decode.
fn run(cli: Cli) -> Result<bool, CliError> {
    let config = MemokitConfig::load_from(&cli.config)?;
    tracing::debug!(
        path = %cli.config.display(),
        protocol_version = %config.protocol_version,
        names = config.names.len(),
        "Loaded configuration"
    );

    let keeper = config.keeper();
    let ctx = DecodeContext::from_keeper(&keeper).with_limits(config.limits());

    let mut out = io::stdout().lock();
    match cli.command {
        Command::Decode {
            memos,
            protocol_version,
        } => {
            let ctx = protocol_version.map_or(ctx, |version| ctx.with_version(version));

            let mut all_ok = true;
            for memo in &memos {
                let output = match memokit::decode(memo, &ctx) {
                    Ok(decoded) => DecodeOutput {
                        memo,
                        ok: Some(decoded),
                        error: None,
                        reason: None,
                    },
                    Err(e) => {
                        all_ok = false;
                        DecodeOutput {
                            memo,
                            ok: None,
                            error: Some(e.to_string()),
                            reason: Some(e.reason()),
                        }
                    }
                };
                writeln!(out, "{}", serde_json::to_string(&output)?)?;
            }
            Ok(all_ok)
        }
        Command::Affiliates { field } => {
            let affiliates = parse_affiliates_with(&field, ctx.limits().max_compact_name_len);
            writeln!(out, "{}", serde_json::to_string(&affiliates)?)?;
            Ok(true)
        }
        Command::Amount { text } => {
            writeln!(out, "{}", parse_min_amount(&text))?;
            Ok(true)
        }
    }
}
