//! In-memory Zaim for testing
//!
//! Behaves like the remote service for the operations the importer uses:
//! reference lists are fixed at construction, created payments are stored and
//! show up in later `money` queries.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::{
    Account, Category, ExpenseRecord, Genre, MoneyMode, MoneyQuery, RemoteExpense,
};

use super::ZaimApi;

#[derive(Default)]
struct MockState {
    money: Vec<RemoteExpense>,
    next_id: i64,
    money_calls: usize,
    created: Vec<ExpenseRecord>,
}

/// Mock Zaim backend
#[derive(Default)]
pub struct MockZaim {
    accounts: Vec<Account>,
    categories: Vec<Category>,
    genres: Vec<Genre>,
    /// When set, `create_payment` fails with a 500
    fail_create: bool,
    /// When set, `money` ignores `from_account_id`
    ignore_account_filter: bool,
    state: Mutex<MockState>,
}

impl MockZaim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, id: i64, name: &str) -> Self {
        self.accounts.push(Account {
            id,
            name: name.to_string(),
            active: 1,
        });
        self
    }

    pub fn with_category(self, id: i64, name: &str) -> Self {
        self.with_category_mode(id, name, MoneyMode::Payment)
    }

    pub fn with_income_category(self, id: i64, name: &str) -> Self {
        self.with_category_mode(id, name, MoneyMode::Income)
    }

    fn with_category_mode(mut self, id: i64, name: &str, mode: MoneyMode) -> Self {
        self.categories.push(Category {
            id,
            name: name.to_string(),
            mode,
            active: 1,
        });
        self
    }

    pub fn with_genre(mut self, id: i64, category_id: i64, name: &str) -> Self {
        self.genres.push(Genre {
            id,
            name: name.to_string(),
            category_id,
            active: 1,
        });
        self
    }

    /// Make every `create_payment` call fail
    pub fn failing_creates(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Return payments from every account, whatever `from_account_id` says
    pub fn ignoring_account_filter(mut self) -> Self {
        self.ignore_account_filter = true;
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed an existing payment, returning its ID
    pub fn insert_payment(
        &self,
        date: NaiveDate,
        amount: i64,
        comment: &str,
        from_account_id: i64,
        category_id: i64,
        genre_id: i64,
    ) -> i64 {
        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.money.push(RemoteExpense {
            id,
            mode: MoneyMode::Payment,
            date,
            amount,
            comment: comment.to_string(),
            category_id,
            genre_id,
            from_account_id,
        });
        id
    }

    /// Every stored money record
    pub fn payments(&self) -> Vec<RemoteExpense> {
        self.state().money.clone()
    }

    /// Records received through `create_payment`, in order
    pub fn created(&self) -> Vec<ExpenseRecord> {
        self.state().created.clone()
    }

    /// Number of `money` calls served
    pub fn money_calls(&self) -> usize {
        self.state().money_calls
    }
}

#[async_trait]
impl ZaimApi for MockZaim {
    async fn accounts(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.clone())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.clone())
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        Ok(self.genres.clone())
    }

    async fn money(&self, query: &MoneyQuery) -> Result<Vec<RemoteExpense>> {
        let mut state = self.state();
        state.money_calls += 1;

        let mut matching: Vec<RemoteExpense> = state
            .money
            .iter()
            .filter(|m| m.mode == query.mode)
            .filter(|m| m.date >= query.start_date && m.date <= query.end_date)
            .filter(|m| {
                self.ignore_account_filter
                    || query
                        .from_account_id
                        .map_or(true, |id| m.from_account_id == id)
            })
            .cloned()
            .collect();

        // Newest first, like the real API
        matching.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

        let limit = query.limit.max(1) as usize;
        let skip = (query.page.max(1) as usize - 1) * limit;
        Ok(matching.into_iter().skip(skip).take(limit).collect())
    }

    async fn create_payment(&self, record: &ExpenseRecord) -> Result<i64> {
        if self.fail_create {
            return Err(Error::Api {
                status: 500,
                body: "mock failure".into(),
            });
        }

        let id = self.insert_payment(
            record.date,
            record.amount,
            &record.comment,
            record.from_account_id,
            record.category_id,
            record.genre_id,
        );
        self.state().created.push(record.clone());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 4, d).unwrap()
    }

    #[tokio::test]
    async fn test_money_filters_by_date_and_account() {
        let mock = MockZaim::new();
        mock.insert_payment(day(1), 500, "Coffee", 3, 101, 10101);
        mock.insert_payment(day(1), 700, "Lunch", 4, 101, 10101);
        mock.insert_payment(day(2), 500, "Coffee", 3, 101, 10101);

        let query = MoneyQuery::payments(day(1), day(1));
        assert_eq!(mock.money(&query).await.unwrap().len(), 2);

        let query = query.with_account(Some(3));
        let found = mock.money(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].comment, "Coffee");
    }

    #[tokio::test]
    async fn test_ignoring_account_filter() {
        let mock = MockZaim::new().ignoring_account_filter();
        mock.insert_payment(day(1), 500, "Coffee", 3, 101, 10101);
        mock.insert_payment(day(1), 700, "Lunch", 4, 101, 10101);

        let query = MoneyQuery::payments(day(1), day(1)).with_account(Some(3));
        assert_eq!(mock.money(&query).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_money_newest_first() {
        let mock = MockZaim::new();
        mock.insert_payment(day(1), 100, "old", 3, 101, 10101);
        mock.insert_payment(day(3), 300, "new", 3, 101, 10101);

        let found = mock
            .money(&MoneyQuery::payments(day(1), day(3)))
            .await
            .unwrap();
        assert_eq!(found[0].comment, "new");
        assert_eq!(found[1].comment, "old");
    }

    #[tokio::test]
    async fn test_created_payments_are_queryable() {
        let mock = MockZaim::new();
        let record = ExpenseRecord {
            category_id: 101,
            genre_id: 10101,
            amount: 500,
            date: day(1),
            from_account_id: 3,
            comment: "Coffee Shop".into(),
        };

        let id = mock.create_payment(&record).await.unwrap();
        assert!(id > 0);
        assert_eq!(mock.created(), vec![record]);

        let found = mock
            .money(&MoneyQuery::payments(day(1), day(1)))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
    }

    #[tokio::test]
    async fn test_failing_creates() {
        let mock = MockZaim::new().failing_creates();
        let record = ExpenseRecord {
            category_id: 1,
            genre_id: 1,
            amount: 1,
            date: day(1),
            from_account_id: 1,
            comment: String::new(),
        };

        let result = mock.create_payment(&record).await;
        assert!(matches!(result, Err(Error::Api { status: 500, .. })));
        assert!(mock.payments().is_empty());
    }
}
