//! Row-by-row import of a statement into Zaim
//!
//! Each row goes through build → duplicate check → (inference) → submit
//! before the next row is read. The first error aborts the run.

use tracing::{debug, info};

use crate::config::Targets;
use crate::dedup::{DedupPolicy, DuplicateDetector};
use crate::error::{Error, Result};
use crate::infer::{CategoryInferrer, DEFAULT_LOOKBACK_MONTHS};
use crate::models::{ImportStats, ResolvedRefs, StatementRow};
use crate::payment::{AmountPolicy, PaymentBuilder};
use crate::resolve::resolve_refs;
use crate::zaim::ZaimApi;

/// Knobs for one import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub dedup: DedupPolicy,
    /// Copy category/genre from related earlier payments
    pub infer_category: bool,
    pub lookback_months: u32,
    pub amount_policy: AmountPolicy,
    /// Run every check but never call `create_payment`
    pub dry_run: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            dedup: DedupPolicy::default(),
            infer_category: false,
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
            amount_policy: AmountPolicy::default(),
            dry_run: false,
        }
    }
}

/// What happened to a single row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    DuplicateSkipped { existing_id: i64 },
    Submitted { id: i64, inferred: bool },
    /// Would have been submitted
    DryRun { inferred: bool },
}

pub struct Importer<'a> {
    api: &'a dyn ZaimApi,
    options: ImportOptions,
    builder: PaymentBuilder,
}

impl<'a> Importer<'a> {
    /// Create an importer for already-resolved IDs
    pub fn new(api: &'a dyn ZaimApi, refs: ResolvedRefs, options: ImportOptions) -> Result<Self> {
        if refs.account_id == 0 || refs.category_id == 0 || refs.genre_id == 0 {
            return Err(Error::Config(format!(
                "Resolved IDs must be non-zero: {:?}",
                refs
            )));
        }

        let builder = PaymentBuilder::new(refs).with_amount_policy(options.amount_policy);
        Ok(Self {
            api,
            options,
            builder,
        })
    }

    /// Resolve `targets` against Zaim, then create the importer
    pub async fn prepare(
        api: &'a dyn ZaimApi,
        targets: &Targets,
        options: ImportOptions,
    ) -> Result<Self> {
        let refs = resolve_refs(api, targets).await?;
        Self::new(api, refs, options)
    }

    /// Import every row, stopping at the first error
    pub async fn run<I>(&self, rows: I) -> Result<ImportStats>
    where
        I: IntoIterator<Item = Result<StatementRow>>,
    {
        let mut stats = ImportStats::default();

        for row in rows {
            let row = row?;
            stats.rows += 1;

            match self.process_row(&row, &mut stats).await? {
                RowOutcome::DuplicateSkipped { .. } => stats.skipped_duplicates += 1,
                RowOutcome::Submitted { inferred, .. } | RowOutcome::DryRun { inferred } => {
                    stats.submitted += 1;
                    if inferred {
                        stats.inferred += 1;
                    }
                }
            }
        }

        info!(
            "Import finished: {} rows, {} submitted, {} duplicates skipped",
            stats.rows, stats.submitted, stats.skipped_duplicates
        );
        Ok(stats)
    }

    /// Run one row through the pipeline
    pub async fn process_row(
        &self,
        row: &StatementRow,
        stats: &mut ImportStats,
    ) -> Result<RowOutcome> {
        let built = self.builder.build(row)?;
        if built.coerced_amount {
            stats.zero_amounts += 1;
        }
        let mut record = built.record;
        debug!(line = row.line, "Built payment {:?}", record);

        let detector = DuplicateDetector::new(self.api, self.options.dedup);
        if let Some(existing) = detector.find_duplicate(&record).await? {
            info!(
                "Skipping duplicate: {} {} {}",
                record.date_string(),
                record.amount,
                record.comment
            );
            return Ok(RowOutcome::DuplicateSkipped {
                existing_id: existing.id,
            });
        }

        let inferred = if self.options.infer_category {
            CategoryInferrer::new(self.api)
                .with_lookback_months(self.options.lookback_months)
                .infer(&mut record)
                .await?
                .is_some()
        } else {
            false
        };

        if self.options.dry_run {
            info!(
                "Would submit: {} {} {} (category {}, genre {})",
                record.date_string(),
                record.amount,
                record.comment,
                record.category_id,
                record.genre_id
            );
            return Ok(RowOutcome::DryRun { inferred });
        }

        let id = self.api.create_payment(&record).await?;
        info!(
            "Submitted: {} {} {} (category {}, genre {}) -> {}",
            record.date_string(),
            record.amount,
            record.comment,
            record.category_id,
            record.genre_id,
            id
        );
        Ok(RowOutcome::Submitted { id, inferred })
    }
}
