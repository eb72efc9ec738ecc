//! Turn statement rows into Zaim payments

use chrono::NaiveDate;
use tracing::warn;

use crate::encoding::normalize_comment;
use crate::error::{Error, Result};
use crate::models::{ExpenseRecord, ResolvedRefs, StatementRow};

/// What to do with an amount column that is not a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmountPolicy {
    /// Submit the row with amount 0 and log a warning
    #[default]
    CoerceToZero,
    /// Abort the import
    Strict,
}

/// Result of building one payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPayment {
    pub record: ExpenseRecord,
    /// The amount column did not parse and was replaced by 0
    pub coerced_amount: bool,
}

/// Builds `ExpenseRecord`s with the IDs resolved at startup
#[derive(Debug, Clone)]
pub struct PaymentBuilder {
    refs: ResolvedRefs,
    amount_policy: AmountPolicy,
}

impl PaymentBuilder {
    pub fn new(refs: ResolvedRefs) -> Self {
        Self {
            refs,
            amount_policy: AmountPolicy::default(),
        }
    }

    pub fn with_amount_policy(mut self, policy: AmountPolicy) -> Self {
        self.amount_policy = policy;
        self
    }

    pub fn build(&self, row: &StatementRow) -> Result<BuiltPayment> {
        let date = parse_statement_date(row.date()).ok_or_else(|| Error::InvalidDate {
            line: row.line,
            value: row.date().to_string(),
        })?;

        let (amount, coerced_amount) = match parse_amount(row.amount()) {
            Some(amount) => (amount, false),
            None => match self.amount_policy {
                AmountPolicy::CoerceToZero => {
                    warn!(
                        line = row.line,
                        value = row.amount(),
                        "Unparseable amount, submitting as 0"
                    );
                    (0, true)
                }
                AmountPolicy::Strict => {
                    return Err(Error::InvalidAmount {
                        line: row.line,
                        value: row.amount().to_string(),
                    })
                }
            },
        };

        Ok(BuiltPayment {
            record: ExpenseRecord {
                category_id: self.refs.category_id,
                genre_id: self.refs.genre_id,
                amount,
                date,
                from_account_id: self.refs.account_id,
                comment: normalize_comment(row.description()),
            },
            coerced_amount,
        })
    }
}

/// Parse an amount string, handling yen symbols and comma grouping
///
/// Returns `None` when nothing numeric is left.
pub fn parse_amount(s: &str) -> Option<i64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '¥' | '￥' | '円') && !c.is_whitespace())
        .collect();

    cleaned.parse::<i64>().ok()
}

/// `2021/03/05` -> `2021-03-05`
pub fn canonical_date(s: &str) -> String {
    s.trim().replace('/', "-")
}

/// Canonicalize and validate a statement date
fn parse_statement_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&canonical_date(s), "%Y-%m-%d").ok()
}
