//! CLI argument definitions using clap
//!
//! This module contains the clap struct for parsing CLI arguments.
//! The actual command implementation is in the `commands` module.

use std::path::PathBuf;

use clap::Parser;

/// csv2zaim - Import card statements into Zaim
///
/// Credentials and default names are read from the environment:
/// ZAIM_CONSUMER_ID, ZAIM_CONSUMER_SECRET, ZAIM_ACCESS_TOKEN,
/// ZAIM_ACCESS_TOKEN_SECRET, ZAIM_ACCOUNT_NAME, ZAIM_CATEGORY, ZAIM_GENRE.
#[derive(Parser, Debug)]
#[command(name = "csv2zaim")]
#[command(about = "Import card statement CSV exports into Zaim", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Statement CSV file to import
    pub file: PathBuf,

    /// Zaim account name (overrides ZAIM_ACCOUNT_NAME)
    #[arg(long)]
    pub account: Option<String>,

    /// Category name (overrides ZAIM_CATEGORY)
    #[arg(long)]
    pub category: Option<String>,

    /// Genre name (overrides ZAIM_GENRE)
    #[arg(long)]
    pub genre: Option<String>,

    /// Input file encoding (any WHATWG label: shift_jis, utf-8, ...)
    #[arg(long, default_value = "shift_jis")]
    pub encoding: String,

    /// How comments are compared when checking for duplicates: exact, contains
    #[arg(long, default_value = "contains")]
    pub comment_match: String,

    /// Compare against payments from every account, not just the target one
    #[arg(long)]
    pub no_account_filter: bool,

    /// Copy category/genre from related payments in the lookback window
    #[arg(long)]
    pub infer_category: bool,

    /// Lookback window for --infer-category, in months
    #[arg(long, default_value = "3")]
    pub lookback_months: u32,

    /// Abort on amounts that do not parse instead of submitting 0
    #[arg(long)]
    pub strict_amounts: bool,

    /// Check every row but submit nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Timeout for each Zaim API request, in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
