//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use clap::Parser;
use csv2zaim_core::{AmountPolicy, CommentMatch, MockZaim, SourceEncoding, Targets};
use tempfile::NamedTempFile;

use crate::cli::Cli;
use crate::commands;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["csv2zaim"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

fn targets() -> Targets {
    Targets {
        account: "Amex".into(),
        category: "食費".into(),
        genre: "食料品".into(),
    }
}

fn seeded_zaim() -> MockZaim {
    MockZaim::new()
        .with_account(3, "Amex")
        .with_category(101, "食費")
        .with_genre(10101, 101, "食料品")
}

/// Write a statement file (UTF-8) and keep it alive for the test
fn statement_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const STATEMENT: &str = "利用日,利用者,利用店名,支払方法,支払回数,利用金額
2021/04/01,,Coffee Shop,,,500
2021/04/02,,Coffee Shop,,,500
";

// ========== Argument Parsing Tests ==========

#[test]
fn test_file_is_required() {
    assert!(Cli::try_parse_from(["csv2zaim"]).is_err());
}

#[test]
fn test_defaults() {
    let cli = parse(&["statement.csv"]);
    assert_eq!(cli.file.to_str(), Some("statement.csv"));
    assert_eq!(cli.encoding, "shift_jis");
    assert_eq!(cli.lookback_months, 3);
    assert_eq!(cli.timeout_secs, 30);
    assert!(!cli.dry_run);

    let options = commands::import_options(&cli).unwrap();
    assert_eq!(options.dedup.comment_match, CommentMatch::Contains);
    assert!(options.dedup.filter_by_account);
    assert!(!options.infer_category);
    assert_eq!(options.amount_policy, AmountPolicy::CoerceToZero);
}

#[test]
fn test_import_options_from_flags() {
    let cli = parse(&[
        "statement.csv",
        "--comment-match",
        "exact",
        "--no-account-filter",
        "--infer-category",
        "--lookback-months",
        "6",
        "--strict-amounts",
        "--dry-run",
    ]);
    let options = commands::import_options(&cli).unwrap();

    assert_eq!(options.dedup.comment_match, CommentMatch::Exact);
    assert!(!options.dedup.filter_by_account);
    assert!(options.infer_category);
    assert_eq!(options.lookback_months, 6);
    assert_eq!(options.amount_policy, AmountPolicy::Strict);
    assert!(options.dry_run);
}

#[test]
fn test_unknown_comment_match() {
    let cli = parse(&["statement.csv", "--comment-match", "fuzzy"]);
    let err = commands::import_options(&cli).unwrap_err();
    assert!(err.to_string().contains("fuzzy"));
}

#[test]
fn test_apply_overrides() {
    let cli = parse(&["statement.csv", "--account", "Visa", "--genre", "外食"]);
    let mut targets = targets();
    commands::apply_overrides(&mut targets, &cli);

    assert_eq!(targets.account, "Visa");
    assert_eq!(targets.category, "食費");
    assert_eq!(targets.genre, "外食");
}

// ========== Import Command Tests ==========

#[tokio::test]
async fn test_run_import_twice() {
    let zaim = seeded_zaim();
    let file = statement_file(STATEMENT);
    let cli = parse(&["statement.csv"]);

    let first = commands::run_import(
        &zaim,
        &targets(),
        file.path(),
        SourceEncoding::utf8(),
        commands::import_options(&cli).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(first.submitted, 2);

    let second = commands::run_import(
        &zaim,
        &targets(),
        file.path(),
        SourceEncoding::utf8(),
        commands::import_options(&cli).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(second.submitted, 0);
    assert_eq!(second.skipped_duplicates, 2);
    assert_eq!(zaim.created().len(), 2);
}

#[tokio::test]
async fn test_run_import_dry_run() {
    let zaim = seeded_zaim();
    let file = statement_file(STATEMENT);
    let cli = parse(&["statement.csv", "--dry-run"]);

    let stats = commands::run_import(
        &zaim,
        &targets(),
        file.path(),
        SourceEncoding::utf8(),
        commands::import_options(&cli).unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(stats.submitted, 2);
    assert!(zaim.created().is_empty());
}

#[tokio::test]
async fn test_run_import_unresolved_account() {
    let zaim = seeded_zaim();
    let file = statement_file(STATEMENT);
    let mut targets = targets();
    targets.account = "Visa".into();

    let err = commands::run_import(
        &zaim,
        &targets,
        file.path(),
        SourceEncoding::utf8(),
        Default::default(),
    )
    .await
    .unwrap_err();

    assert!(format!("{:#}", err).contains("Could not resolve account: Visa"));
    assert!(zaim.created().is_empty());
}

#[tokio::test]
async fn test_run_import_missing_file() {
    let zaim = seeded_zaim();
    let err = commands::run_import(
        &zaim,
        &targets(),
        std::path::Path::new("/nonexistent/statement.csv"),
        SourceEncoding::shift_jis(),
        Default::default(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("Failed to read statement"));
}

#[tokio::test]
async fn test_run_import_strict_amount_aborts() {
    let zaim = seeded_zaim();
    let file = statement_file("a,b,c,d,e,f\n2021/04/01,,Coffee,,,500\n2021/04/02,,Tea,,,-\n");
    let cli = parse(&["statement.csv", "--strict-amounts"]);

    let err = commands::run_import(
        &zaim,
        &targets(),
        file.path(),
        SourceEncoding::utf8(),
        commands::import_options(&cli).unwrap(),
    )
    .await
    .unwrap_err();

    assert!(format!("{:#}", err).contains("Invalid amount on line 3"));
    assert_eq!(zaim.created().len(), 1);
}
