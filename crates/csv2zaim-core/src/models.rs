//! Domain models for csv2zaim

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Zaim reports deleted entries with `active = -1`
fn default_active() -> i32 {
    1
}

/// Treat JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A Zaim account (wallet, bank, card)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: i32,
}

/// A Zaim top-level category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub mode: MoneyMode,
    #[serde(default = "default_active")]
    pub active: i32,
}

/// A Zaim genre (sub-category)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
    /// Parent category
    #[serde(default)]
    pub category_id: i64,
    #[serde(default = "default_active")]
    pub active: i32,
}

/// Something that can be looked up by its display name
pub trait Named {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn is_active(&self) -> bool;
}

macro_rules! impl_named {
    ($($ty:ty),*) => {
        $(
            impl Named for $ty {
                fn id(&self) -> i64 {
                    self.id
                }

                fn name(&self) -> &str {
                    &self.name
                }

                fn is_active(&self) -> bool {
                    self.active > 0
                }
            }
        )*
    };
}

impl_named!(Account, Category, Genre);

/// Which reference list a lookup ran against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Account,
    Category,
    Genre,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Category => "category",
            Self::Genre => "genre",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of money record on Zaim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MoneyMode {
    #[default]
    Payment,
    Income,
    Transfer,
}

impl MoneyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Income => "income",
            Self::Transfer => "transfer",
        }
    }
}

impl std::str::FromStr for MoneyMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "payment" => Ok(Self::Payment),
            "income" => Ok(Self::Income),
            "transfer" => Ok(Self::Transfer),
            _ => Err(format!("Unknown money mode: {}", s)),
        }
    }
}

impl std::fmt::Display for MoneyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One data line of the statement export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRow {
    /// 1-based line number in the source file
    pub line: u64,
    pub fields: Vec<String>,
}

impl StatementRow {
    pub const DATE: usize = 0;
    pub const DESCRIPTION: usize = 2;
    pub const AMOUNT: usize = 5;

    /// Minimum number of columns the export must carry
    pub const MIN_COLUMNS: usize = 6;

    pub fn date(&self) -> &str {
        self.field(Self::DATE)
    }

    pub fn description(&self) -> &str {
        self.field(Self::DESCRIPTION)
    }

    pub fn amount(&self) -> &str {
        self.field(Self::AMOUNT)
    }

    fn field(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// IDs resolved from the configured account, category and genre names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRefs {
    pub account_id: i64,
    pub category_id: i64,
    pub genre_id: i64,
}

/// A payment ready to be submitted to Zaim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseRecord {
    pub category_id: i64,
    pub genre_id: i64,
    /// Whole yen
    pub amount: i64,
    pub date: NaiveDate,
    pub from_account_id: i64,
    pub comment: String,
}

impl ExpenseRecord {
    /// Date in the `YYYY-MM-DD` form Zaim expects
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Filter for listing existing money records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub mode: MoneyMode,
    pub from_account_id: Option<i64>,
    pub limit: u32,
    pub page: u32,
}

impl MoneyQuery {
    /// Zaim caps page size at 100
    pub const MAX_LIMIT: u32 = 100;

    /// Payments dated between `start_date` and `end_date`, first page
    pub fn payments(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            mode: MoneyMode::Payment,
            from_account_id: None,
            limit: Self::MAX_LIMIT,
            page: 1,
        }
    }

    pub fn with_account(mut self, account_id: Option<i64>) -> Self {
        self.from_account_id = account_id;
        self
    }

    pub fn next_page(&self) -> Self {
        Self {
            page: self.page + 1,
            ..self.clone()
        }
    }
}

/// A money record already stored on Zaim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteExpense {
    pub id: i64,
    #[serde(default)]
    pub mode: MoneyMode,
    pub date: NaiveDate,
    #[serde(default)]
    pub amount: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(default)]
    pub category_id: i64,
    #[serde(default)]
    pub genre_id: i64,
    #[serde(default)]
    pub from_account_id: i64,
}

/// Summary of one import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub rows: usize,
    pub submitted: usize,
    pub skipped_duplicates: usize,
    pub inferred: usize,
    /// Rows whose amount could not be parsed and became zero
    pub zero_amounts: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_expense_from_zaim_json() {
        let json = r#"{
            "id": 382,
            "mode": "payment",
            "user_id": 1,
            "date": "2021-04-01",
            "category_id": 101,
            "genre_id": 10101,
            "to_account_id": 0,
            "from_account_id": 3,
            "amount": 500,
            "comment": null,
            "active": 1,
            "currency_code": "JPY"
        }"#;

        let expense: RemoteExpense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.date, NaiveDate::from_ymd_opt(2021, 4, 1).unwrap());
        assert_eq!(expense.amount, 500);
        assert_eq!(expense.comment, "");
        assert_eq!(expense.from_account_id, 3);
    }

    #[test]
    fn test_inactive_entries() {
        let account: Account =
            serde_json::from_str(r#"{"id": 1, "name": "Old Card", "active": -1}"#).unwrap();
        assert!(!account.is_active());

        let genre: Genre = serde_json::from_str(r#"{"id": 2, "name": "Cafe"}"#).unwrap();
        assert!(genre.is_active());
    }

    #[test]
    fn test_statement_row_accessors() {
        let row = StatementRow {
            line: 2,
            fields: vec!["2021/04/01".into(), "".into(), "Coffee".into()],
        };
        assert_eq!(row.date(), "2021/04/01");
        assert_eq!(row.description(), "Coffee");
        assert_eq!(row.amount(), "");
    }

    #[test]
    fn test_money_mode_round_trips_through_str() {
        for mode in [MoneyMode::Payment, MoneyMode::Income, MoneyMode::Transfer] {
            assert_eq!(mode.as_str().parse::<MoneyMode>(), Ok(mode));
        }
        assert!("refund".parse::<MoneyMode>().is_err());
    }

    #[test]
    fn test_money_query_paging() {
        let day = NaiveDate::from_ymd_opt(2021, 4, 1).unwrap();
        let query = MoneyQuery::payments(day, day).with_account(Some(7));
        let next = query.next_page();
        assert_eq!(next.page, 2);
        assert_eq!(next.from_account_id, Some(7));
        assert_eq!(next.mode, MoneyMode::Payment);
    }
}
