//! Synchronous client core for the Smaregi retail POS API.
//!
//! # Overview
//! The platform transmits every scalar as a JSON string. This crate turns
//! those string rows into typed records (`Product`, `Store`, `Stock`,
//! `StockChange`) and builds the string-valued payloads it expects back.
//!
//! # Design
//! - `codec` owns every string conversion; Tokyo time is fixed in `codec::JST`.
//! - Each procedure is split into `build_*` (produces request) and
//!   `parse_*` (consumes response); `SmaregiClient` can also drive a
//!   `Transport` end to end.
//! - `webhook` parses inbound notifications with the same codec and no I/O.
//! - Errors carry the failing operation and are never retried or logged.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;
pub mod webhook;

pub use client::{Procedure, SmaregiClient};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, DecodeError, ParseError, ParseErrorKind, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use params::{ProcDivision, RefParams, Row, TableData, UpdParams};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{Product, Stock, StockDivision, Store};
pub use webhook::{parse_stock_webhook, StockChange, StockWebhook, StockWebhookData};
