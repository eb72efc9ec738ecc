//! Test utilities for csv2zaim-core
//!
//! This module provides a mock Zaim HTTP server backed by `MockZaim`, so the
//! real `ZaimClient` can be exercised end to end without network access.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::json;
use tokio::sync::oneshot;

use crate::models::{ExpenseRecord, MoneyMode, MoneyQuery};
use crate::zaim::{MockZaim, ZaimApi};

type Params = HashMap<String, String>;

/// Mock Zaim server for testing
pub struct MockZaimServer {
    addr: SocketAddr,
    backend: Arc<MockZaim>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockZaimServer {
    /// Start the mock server on an available port
    pub async fn start(backend: MockZaim) -> Self {
        let backend = Arc::new(backend);
        let app = Router::new()
            .route("/v2/home/account", get(handle_accounts))
            .route("/v2/home/category", get(handle_categories))
            .route("/v2/home/genre", get(handle_genres))
            .route("/v2/home/money", get(handle_money))
            .route("/v2/home/money/payment", post(handle_create_payment))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            backend,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// API root for this server (pass to `ZaimClient::new`)
    pub fn url(&self) -> String {
        format!("http://{}/v2", self.addr)
    }

    /// The in-memory store behind the server
    pub fn backend(&self) -> &MockZaim {
        &self.backend
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockZaimServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": true, "message": message }))).into_response()
}

fn backend_error(e: crate::Error) -> Response {
    match e {
        crate::Error::Api { status, body } => error(
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            &body,
        ),
        other => error(StatusCode::INTERNAL_SERVER_ERROR, &other.to_string()),
    }
}

/// Reject requests that are not OAuth-signed
fn check_auth(headers: &HeaderMap) -> Result<(), Response> {
    let signed = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("OAuth ") && v.contains("oauth_signature="))
        .unwrap_or(false);

    if signed {
        Ok(())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "missing OAuth signature"))
    }
}

fn date_param(params: &Params, key: &str) -> Result<NaiveDate, Response> {
    params
        .get(key)
        .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, &format!("invalid {}", key)))
}

fn id_param(params: &Params, key: &str) -> Result<i64, Response> {
    params
        .get(key)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, &format!("invalid {}", key)))
}

async fn handle_accounts(State(backend): State<Arc<MockZaim>>, headers: HeaderMap) -> Response {
    if let Err(resp) = check_auth(&headers) {
        return resp;
    }
    match backend.accounts().await {
        Ok(accounts) => Json(json!({ "accounts": accounts })).into_response(),
        Err(e) => backend_error(e),
    }
}

async fn handle_categories(State(backend): State<Arc<MockZaim>>, headers: HeaderMap) -> Response {
    if let Err(resp) = check_auth(&headers) {
        return resp;
    }
    match backend.categories().await {
        Ok(categories) => Json(json!({ "categories": categories })).into_response(),
        Err(e) => backend_error(e),
    }
}

async fn handle_genres(State(backend): State<Arc<MockZaim>>, headers: HeaderMap) -> Response {
    if let Err(resp) = check_auth(&headers) {
        return resp;
    }
    match backend.genres().await {
        Ok(genres) => Json(json!({ "genres": genres })).into_response(),
        Err(e) => backend_error(e),
    }
}

async fn handle_money(
    State(backend): State<Arc<MockZaim>>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> Response {
    if let Err(resp) = check_auth(&headers) {
        return resp;
    }

    let mode = match params.get("mode").map(|v| v.parse::<MoneyMode>()) {
        Some(Ok(mode)) => mode,
        _ => return error(StatusCode::BAD_REQUEST, "invalid mode"),
    };

    let query = match (date_param(&params, "start_date"), date_param(&params, "end_date")) {
        (Ok(start), Ok(end)) => MoneyQuery {
            start_date: start,
            end_date: end,
            mode,
            from_account_id: params.get("from_account_id").and_then(|v| v.parse().ok()),
            limit: params
                .get("limit")
                .and_then(|v| v.parse().ok())
                .unwrap_or(MoneyQuery::MAX_LIMIT),
            page: params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1),
        },
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };

    match backend.money(&query).await {
        Ok(money) => Json(json!({ "money": money })).into_response(),
        Err(e) => backend_error(e),
    }
}

async fn handle_create_payment(
    State(backend): State<Arc<MockZaim>>,
    headers: HeaderMap,
    Form(params): Form<Params>,
) -> Response {
    if let Err(resp) = check_auth(&headers) {
        return resp;
    }

    let record = (|| {
        Ok::<_, Response>(ExpenseRecord {
            category_id: id_param(&params, "category_id")?,
            genre_id: id_param(&params, "genre_id")?,
            amount: id_param(&params, "amount")?,
            date: date_param(&params, "date")?,
            from_account_id: id_param(&params, "from_account_id")?,
            comment: params.get("comment").cloned().unwrap_or_default(),
        })
    })();
    let record = match record {
        Ok(record) => record,
        Err(resp) => return resp,
    };

    match backend.create_payment(&record).await {
        Ok(id) => Json(json!({
            "money": { "id": id, "place_uid": null },
            "requested": 1
        }))
        .into_response(),
        Err(e) => backend_error(e),
    }
}
