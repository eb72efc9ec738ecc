//! Category inference from earlier payments
//!
//! Recurring merchants keep the category and genre they were filed under
//! last time. The importer looks back a few months on the same account for
//! a payment whose comment overlaps the new one and copies its category and
//! genre.

use chrono::{Months, NaiveDate};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ExpenseRecord, MoneyQuery, RemoteExpense};
use crate::zaim::{fetch_all_money, ZaimApi};

pub const DEFAULT_LOOKBACK_MONTHS: u32 = 3;

/// First day of the lookback window ending on `date`
///
/// Month arithmetic clamps to the end of shorter months
/// (2021-05-31 minus 3 months is 2021-02-28).
pub fn lookback_start(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_sub_months(Months::new(months))
        .ok_or_else(|| Error::Import(format!("Lookback window before {} is out of range", date)))
}

/// Whether two comments describe the same merchant
///
/// Either comment may contain the other: statements often append store
/// numbers ("Foo Market #1234") to a name filed earlier as "Foo Market".
pub fn comments_related(prior: &str, current: &str) -> bool {
    if prior.is_empty() || current.is_empty() {
        return false;
    }
    prior.contains(current) || current.contains(prior)
}

pub struct CategoryInferrer<'a> {
    api: &'a dyn ZaimApi,
    lookback_months: u32,
}

impl<'a> CategoryInferrer<'a> {
    pub fn new(api: &'a dyn ZaimApi) -> Self {
        Self {
            api,
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
        }
    }

    pub fn with_lookback_months(mut self, months: u32) -> Self {
        self.lookback_months = months;
        self
    }

    /// Copy category and genre from the most recent related payment
    ///
    /// Returns the payment used, or `None` when `record` keeps its defaults.
    pub async fn infer(&self, record: &mut ExpenseRecord) -> Result<Option<RemoteExpense>> {
        let start = lookback_start(record.date, self.lookback_months)?;
        let query = MoneyQuery::payments(start, record.date)
            .with_account(Some(record.from_account_id));
        let history = fetch_all_money(self.api, query).await?;

        let prior = history.into_iter().find(|p| {
            p.from_account_id == record.from_account_id
                && p.category_id != 0
                && p.genre_id != 0
                && comments_related(&p.comment, &record.comment)
        });

        if let Some(ref prior) = prior {
            debug!(
                "'{}' inherits category {} / genre {} from payment {}",
                record.comment, prior.category_id, prior.genre_id, prior.id
            );
            record.category_id = prior.category_id;
            record.genre_id = prior.genre_id;
        }
        Ok(prior)
    }
}
