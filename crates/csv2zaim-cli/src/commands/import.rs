//! Import command implementation

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use csv2zaim_core::{
    AmountPolicy, CommentMatch, Config, DedupPolicy, ImportOptions, ImportStats, Importer,
    SourceEncoding, StatementReader, Targets, ZaimApi, ZaimClient,
};

use crate::cli::Cli;

/// Translate CLI flags into importer options
pub fn import_options(cli: &Cli) -> Result<ImportOptions> {
    let comment_match: CommentMatch = cli
        .comment_match
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    Ok(ImportOptions {
        dedup: DedupPolicy {
            comment_match,
            filter_by_account: !cli.no_account_filter,
        },
        infer_category: cli.infer_category,
        lookback_months: cli.lookback_months,
        amount_policy: if cli.strict_amounts {
            AmountPolicy::Strict
        } else {
            AmountPolicy::CoerceToZero
        },
        dry_run: cli.dry_run,
    })
}

/// Apply `--account`, `--category` and `--genre` on top of the environment
pub fn apply_overrides(targets: &mut Targets, cli: &Cli) {
    if let Some(ref account) = cli.account {
        targets.account = account.clone();
    }
    if let Some(ref category) = cli.category {
        targets.category = category.clone();
    }
    if let Some(ref genre) = cli.genre {
        targets.genre = genre.clone();
    }
}

/// Resolve names, then import every row of `file`
pub async fn run_import(
    api: &dyn ZaimApi,
    targets: &Targets,
    file: &Path,
    encoding: SourceEncoding,
    options: ImportOptions,
) -> Result<ImportStats> {
    let importer = Importer::prepare(api, targets, options)
        .await
        .context("Failed to resolve account, category and genre")?;

    let rows = StatementReader::open(file, encoding)
        .with_context(|| format!("Failed to read statement: {}", file.display()))?;

    let stats = importer
        .run(rows)
        .await
        .with_context(|| format!("Import of {} aborted", file.display()))?;

    Ok(stats)
}

pub async fn cmd_import(cli: &Cli) -> Result<()> {
    let mut config = Config::from_env().context("Failed to load Zaim configuration")?;
    apply_overrides(&mut config.targets, cli);

    let options = import_options(cli)?;
    let encoding = SourceEncoding::from_label(&cli.encoding)?;
    let client = ZaimClient::from_config(&config, Duration::from_secs(cli.timeout_secs))?;

    println!(
        "📥 Importing {} ({}) into '{}'...",
        cli.file.display(),
        encoding.name(),
        config.targets.account
    );

    let stats = run_import(&client, &config.targets, &cli.file, encoding, options.clone()).await?;
    print_summary(&stats, &options);

    Ok(())
}

fn print_summary(stats: &ImportStats, options: &ImportOptions) {
    println!("✅ Import complete!");
    println!("   Rows: {}", stats.rows);
    if options.dry_run {
        println!("   Would submit: {}", stats.submitted);
    } else {
        println!("   Submitted: {}", stats.submitted);
    }
    println!("   Skipped (duplicates): {}", stats.skipped_duplicates);
    if options.infer_category {
        println!("   Category inferred: {}", stats.inferred);
    }
    if stats.zero_amounts > 0 {
        println!();
        println!(
            "⚠️  {} rows had an unreadable amount and were recorded as 0. \
             Re-run with --strict-amounts to abort instead.",
            stats.zero_amounts
        );
    }
    if options.dry_run {
        println!();
        println!("💡 Dry run: nothing was submitted to Zaim");
    }
}
