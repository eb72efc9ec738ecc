//! csv2zaim Core Library
//!
//! Imports card statement exports into Zaim:
//! - Shift_JIS decoding and comment normalization
//! - CSV parsing of the statement export
//! - Name → ID resolution for account, category and genre
//! - Payment construction
//! - Duplicate detection against existing Zaim payments
//! - Category inference from earlier payments
//! - OAuth1-signed Zaim API client with an in-memory mock

pub mod config;
pub mod dedup;
pub mod encoding;
pub mod error;
pub mod import;
pub mod infer;
pub mod models;
pub mod payment;
pub mod pipeline;
pub mod resolve;
pub mod zaim;

/// Test utilities including mock Zaim server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{Config, Targets};
pub use dedup::{CommentMatch, DedupPolicy, DuplicateDetector};
pub use encoding::{normalize_comment, SourceEncoding};
pub use error::{Error, Result};
pub use import::StatementReader;
pub use infer::CategoryInferrer;
pub use models::{ExpenseRecord, ImportStats, ResolvedRefs, StatementRow};
pub use payment::{AmountPolicy, PaymentBuilder};
pub use pipeline::{ImportOptions, Importer, RowOutcome};
pub use resolve::resolve_refs;
pub use zaim::{Credentials, MockZaim, ZaimApi, ZaimClient};
