//! Duplicate detection against payments already on Zaim
//!
//! Zaim stores no import identifier, so a row counts as already imported when
//! a payment on the same day (and account) has the same amount and a matching
//! comment. Both false positives and false negatives are possible.

use tracing::debug;

use crate::error::Result;
use crate::models::{ExpenseRecord, MoneyQuery, RemoteExpense};
use crate::zaim::{fetch_all_money, ZaimApi};

/// How the comment of an existing payment is compared to the new one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentMatch {
    /// Comments must be equal
    Exact,
    /// Existing comment must contain the new one
    #[default]
    Contains,
}

impl CommentMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Contains => "contains",
        }
    }

    pub fn matches(&self, existing: &str, new: &str) -> bool {
        match self {
            Self::Exact => existing == new,
            Self::Contains => existing.contains(new),
        }
    }
}

impl std::str::FromStr for CommentMatch {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "contains" | "substring" => Ok(Self::Contains),
            _ => Err(format!("Unknown comment match: {}", s)),
        }
    }
}

impl std::fmt::Display for CommentMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupPolicy {
    pub comment_match: CommentMatch,
    /// Only compare against payments from the same account
    pub filter_by_account: bool,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            comment_match: CommentMatch::default(),
            filter_by_account: true,
        }
    }
}

impl DedupPolicy {
    /// Whether `existing` is the same payment as `record`
    pub fn is_duplicate(&self, existing: &RemoteExpense, record: &ExpenseRecord) -> bool {
        if self.filter_by_account && existing.from_account_id != record.from_account_id {
            return false;
        }
        existing.date == record.date
            && existing.amount == record.amount
            && self.comment_match.matches(&existing.comment, &record.comment)
    }
}

pub struct DuplicateDetector<'a> {
    api: &'a dyn ZaimApi,
    policy: DedupPolicy,
}

impl<'a> DuplicateDetector<'a> {
    pub fn new(api: &'a dyn ZaimApi, policy: DedupPolicy) -> Self {
        Self { api, policy }
    }

    /// The first existing payment that duplicates `record`, if any
    pub async fn find_duplicate(&self, record: &ExpenseRecord) -> Result<Option<RemoteExpense>> {
        let account = self.policy.filter_by_account.then_some(record.from_account_id);
        let query = MoneyQuery::payments(record.date, record.date).with_account(account);
        let existing = fetch_all_money(self.api, query).await?;

        let found = existing
            .into_iter()
            .find(|e| self.policy.is_duplicate(e, record));

        if let Some(ref dup) = found {
            debug!(
                "Row {} {} '{}' matches existing payment {}",
                record.date, record.amount, record.comment, dup.id
            );
        }
        Ok(found)
    }
}
