//! Zaim API abstraction
//!
//! # Architecture
//!
//! - `ZaimApi` trait: the five remote operations the importer needs
//! - `ZaimClient`: OAuth1-signed HTTP client for api.zaim.net
//! - `MockZaim`: in-memory implementation for tests
//!
//! Components take `&dyn ZaimApi`, so the HTTP client and the mock are
//! interchangeable.

mod http;
mod mock;
pub mod oauth;

pub use http::ZaimClient;
pub use mock::MockZaim;
pub use oauth::{Credentials, OAuthSigner};

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::models::{Account, Category, ExpenseRecord, Genre, MoneyQuery, RemoteExpense};

/// Remote operations consumed by the importer
#[async_trait]
pub trait ZaimApi: Send + Sync {
    /// List all accounts, including inactive ones
    async fn accounts(&self) -> Result<Vec<Account>>;

    /// List all categories
    async fn categories(&self) -> Result<Vec<Category>>;

    /// List all genres
    async fn genres(&self) -> Result<Vec<Genre>>;

    /// One page of money records matching `query`
    async fn money(&self, query: &MoneyQuery) -> Result<Vec<RemoteExpense>>;

    /// Create a payment, returning its new ID
    async fn create_payment(&self, record: &ExpenseRecord) -> Result<i64>;
}

/// Fetch every page of money records matching `query`
pub async fn fetch_all_money(api: &dyn ZaimApi, query: MoneyQuery) -> Result<Vec<RemoteExpense>> {
    let mut query = query;
    // A zero page size would never produce a short page
    query.limit = query.limit.clamp(1, MoneyQuery::MAX_LIMIT);
    let mut all = Vec::new();

    loop {
        let page = api.money(&query).await?;
        let short_page = page.len() < query.limit as usize;
        all.extend(page);

        if short_page {
            break;
        }
        query = query.next_page();
    }

    debug!(
        "Fetched {} money records for {}..{}",
        all.len(),
        query.start_date,
        query.end_date
    );
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_fetch_all_money_pages_until_short_page() {
        let day = NaiveDate::from_ymd_opt(2021, 4, 1).unwrap();
        let mock = MockZaim::new();
        for i in 0..5 {
            mock.insert_payment(day, 100 + i, "Coffee", 3, 101, 10101);
        }

        let mut query = MoneyQuery::payments(day, day);
        query.limit = 2;

        let all = fetch_all_money(&mock, query).await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(mock.money_calls(), 3);
    }

    #[tokio::test]
    async fn test_fetch_all_money_exact_multiple_needs_extra_page() {
        let day = NaiveDate::from_ymd_opt(2021, 4, 1).unwrap();
        let mock = MockZaim::new();
        for i in 0..4 {
            mock.insert_payment(day, 100 + i, "Coffee", 3, 101, 10101);
        }

        let mut query = MoneyQuery::payments(day, day);
        query.limit = 2;

        let all = fetch_all_money(&mock, query).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(mock.money_calls(), 3);
    }

    #[tokio::test]
    async fn test_fetch_all_money_zero_limit_terminates() {
        let day = NaiveDate::from_ymd_opt(2021, 4, 1).unwrap();
        let mock = MockZaim::new();
        for i in 0..3 {
            mock.insert_payment(day, 100 + i, "Coffee", 3, 101, 10101);
        }

        let mut query = MoneyQuery::payments(day, day);
        query.limit = 0;

        let all = fetch_all_money(&mock, query).await.unwrap();
        assert_eq!(all.len(), 3);
        // One record per page, then an empty page
        assert_eq!(mock.money_calls(), 4);
    }
}
