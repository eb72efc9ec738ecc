//! HTTP client for the Zaim v2 API
//!
//! Every request is OAuth1-signed. Query strings and form bodies are encoded
//! with the same RFC 3986 rules used for the signature, so the server sees
//! exactly what was signed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{Account, Category, ExpenseRecord, Genre, MoneyQuery, RemoteExpense};

use super::oauth::{encode_pairs, Credentials, OAuthSigner};
use super::ZaimApi;

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    accounts: Vec<Account>,
}

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct GenresResponse {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct MoneyResponse {
    money: Vec<RemoteExpense>,
}

#[derive(Debug, Deserialize)]
struct CreatedMoney {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    money: CreatedMoney,
}

/// Zaim API client
#[derive(Debug, Clone)]
pub struct ZaimClient {
    http_client: Client,
    base_url: String,
    signer: OAuthSigner,
}

impl ZaimClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.zaim.net/v2";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client against `base_url` (e.g. `https://api.zaim.net/v2`)
    pub fn new(base_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            signer: OAuthSigner::new(credentials),
        })
    }

    pub fn from_config(config: &Config, timeout: Duration) -> Result<Self> {
        Self::new(&config.api_base, config.credentials.clone(), timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: Vec<(String, String)>) -> Result<T> {
        let url = self.url(path);
        let auth = self.signer.authorization("GET", &url, &params)?;
        let full_url = if params.is_empty() {
            url
        } else {
            format!("{}?{}", url, encode_pairs(&params))
        };

        debug!("GET {}", full_url);
        let response = self
            .http_client
            .get(&full_url)
            .header(AUTHORIZATION, auth)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<T> {
        let url = self.url(path);
        let auth = self.signer.authorization("POST", &url, &params)?;

        debug!("POST {}", url);
        let response = self
            .http_client
            .post(&url)
            .header(AUTHORIZATION, auth)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(encode_pairs(&params))
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn param(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

fn money_params(query: &MoneyQuery) -> Vec<(String, String)> {
    let mut params = vec![
        param("mapping", 1),
        param("mode", query.mode),
        param("start_date", query.start_date.format("%Y-%m-%d")),
        param("end_date", query.end_date.format("%Y-%m-%d")),
        param("limit", query.limit),
        param("page", query.page),
    ];
    if let Some(account_id) = query.from_account_id {
        params.push(param("from_account_id", account_id));
    }
    params
}

fn payment_params(record: &ExpenseRecord) -> Vec<(String, String)> {
    vec![
        param("mapping", 1),
        param("category_id", record.category_id),
        param("genre_id", record.genre_id),
        param("amount", record.amount),
        param("date", record.date_string()),
        param("from_account_id", record.from_account_id),
        param("comment", &record.comment),
    ]
}

#[async_trait]
impl ZaimApi for ZaimClient {
    async fn accounts(&self) -> Result<Vec<Account>> {
        let response: AccountsResponse = self.get("home/account", vec![param("mapping", 1)]).await?;
        Ok(response.accounts)
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        let response: CategoriesResponse =
            self.get("home/category", vec![param("mapping", 1)]).await?;
        Ok(response.categories)
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        let response: GenresResponse = self.get("home/genre", vec![param("mapping", 1)]).await?;
        Ok(response.genres)
    }

    async fn money(&self, query: &MoneyQuery) -> Result<Vec<RemoteExpense>> {
        let response: MoneyResponse = self.get("home/money", money_params(query)).await?;
        Ok(response.money)
    }

    async fn create_payment(&self, record: &ExpenseRecord) -> Result<i64> {
        let response: CreatedResponse = self
            .post_form("home/money/payment", payment_params(record))
            .await?;
        Ok(response.money.id)
    }
}
