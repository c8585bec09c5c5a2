//! Request builder, response parser and blocking client for the Smaregi API.
//!
//! # Design
//! Every procedure is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`, so
//! a host can run the round-trip itself. `SmaregiClient` also drives a
//! `Transport` directly through the convenience methods (`product_ref`,
//! `stock_ref`, `update_stock`, ...), which are just build, send, parse.
//!
//! All procedures share one endpoint. The body is the literal
//! `proc_name=<op>&params=<json>`; the JSON is not percent-encoded.
//!
//! Failures abort the whole call: a single bad record fails the list, and
//! nothing is retried.

use serde::Serialize;
use tracing::debug;

use crate::codec;
use crate::config::ClientConfig;
use crate::error::{ApiError, DecodeError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::params::{ProcDivision, RefParams, Row, TableData, UpdParams};
use crate::types::{FromWire, Product, RefResponse, Stock, StockDivision, Store};

const CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Remote procedures this client knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    ProductRef,
    StoreRef,
    StockRef,
    StockUpd,
}

impl Procedure {
    /// Value of the `proc_name` form field.
    pub fn name(self) -> &'static str {
        match self {
            Procedure::ProductRef => "product_ref",
            Procedure::StoreRef => "store_ref",
            Procedure::StockRef => "stock_ref",
            Procedure::StockUpd => "stock_upd",
        }
    }
}

/// Client bound to one contract and one transport.
///
/// Holds no mutable state. It is as thread-safe as `T`.
#[derive(Debug, Clone)]
pub struct SmaregiClient<T> {
    config: ClientConfig,
    transport: T,
}

impl<T> SmaregiClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the form-encoded POST for `procedure` carrying `params` as JSON.
    pub fn build_request<P: Serialize>(
        &self,
        procedure: Procedure,
        params: &P,
    ) -> Result<HttpRequest, ApiError> {
        let json = serde_json::to_string(params).map_err(|source| ApiError::Encode {
            operation: procedure.name(),
            source,
        })?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.config.endpoint.clone(),
            headers: vec![
                ("X-contract-id".to_string(), self.config.contract_id.clone()),
                ("X-access-token".to_string(), self.config.access_token.clone()),
                ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
            ],
            body: format!("proc_name={}&params={json}", procedure.name()),
        })
    }

    pub fn build_product_ref(&self, params: &RefParams) -> Result<HttpRequest, ApiError> {
        self.build_request(Procedure::ProductRef, params)
    }

    pub fn build_store_ref(&self, params: &RefParams) -> Result<HttpRequest, ApiError> {
        self.build_request(Procedure::StoreRef, params)
    }

    pub fn build_stock_ref(&self, params: &RefParams) -> Result<HttpRequest, ApiError> {
        self.build_request(Procedure::StockRef, params)
    }

    pub fn build_stock_upd(&self, params: &UpdParams) -> Result<HttpRequest, ApiError> {
        self.build_request(Procedure::StockUpd, params)
    }

    /// Build a `stock_upd` that sets one product's stock in one store.
    ///
    /// `stock_amount` is written to the `stockAmount` column, which holds the
    /// absolute quantity on hand. It is not a delta.
    pub fn build_update_stock(
        &self,
        store_id: u64,
        product_id: u64,
        stock_amount: i64,
        division: StockDivision,
    ) -> Result<HttpRequest, ApiError> {
        self.build_stock_upd(&update_stock_params(store_id, product_id, stock_amount, division))
    }

    pub fn parse_product_ref(&self, response: HttpResponse) -> Result<Vec<Product>, ApiError> {
        parse_ref(Procedure::ProductRef, response)
    }

    pub fn parse_store_ref(&self, response: HttpResponse) -> Result<Vec<Store>, ApiError> {
        parse_ref(Procedure::StoreRef, response)
    }

    pub fn parse_stock_ref(&self, response: HttpResponse) -> Result<Vec<Stock>, ApiError> {
        parse_ref(Procedure::StockRef, response)
    }

    /// A `stock_upd` succeeds on any 2xx; the body is not inspected.
    pub fn parse_stock_upd(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(Procedure::StockUpd, &response)
    }
}

impl<T: Transport> SmaregiClient<T> {
    /// Fetch one page of products.
    pub fn product_ref(&self, params: &RefParams) -> Result<Vec<Product>, ApiError> {
        let request = self.build_product_ref(params)?;
        let response = self.send(Procedure::ProductRef, &request)?;
        self.parse_product_ref(response)
    }

    /// Fetch one page of stores.
    pub fn store_ref(&self, params: &RefParams) -> Result<Vec<Store>, ApiError> {
        let request = self.build_store_ref(params)?;
        let response = self.send(Procedure::StoreRef, &request)?;
        self.parse_store_ref(response)
    }

    /// Fetch one page of stock levels.
    pub fn stock_ref(&self, params: &RefParams) -> Result<Vec<Stock>, ApiError> {
        let request = self.build_stock_ref(params)?;
        let response = self.send(Procedure::StockRef, &request)?;
        self.parse_stock_ref(response)
    }

    /// Send an arbitrary stock mutation.
    pub fn stock_upd(&self, params: &UpdParams) -> Result<(), ApiError> {
        let request = self.build_stock_upd(params)?;
        let response = self.send(Procedure::StockUpd, &request)?;
        self.parse_stock_upd(response)
    }

    /// Set the absolute stock of `product_id` in `store_id`.
    ///
    /// See [`SmaregiClient::build_update_stock`] for the meaning of
    /// `stock_amount`.
    pub fn update_stock(
        &self,
        store_id: u64,
        product_id: u64,
        stock_amount: i64,
        division: StockDivision,
    ) -> Result<(), ApiError> {
        self.stock_upd(&update_stock_params(store_id, product_id, stock_amount, division))
    }

    fn send(&self, procedure: Procedure, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(procedure = procedure.name(), url = %request.url, "sending request");
        let response = self.transport.send(request).map_err(|source| {
            if source.is_body_read() {
                ApiError::Decode {
                    operation: procedure.name(),
                    source: DecodeError::Body(source),
                }
            } else {
                ApiError::Transport {
                    operation: procedure.name(),
                    source,
                }
            }
        })?;
        debug!(
            procedure = procedure.name(),
            status = response.status,
            bytes = response.body.len(),
            "received response"
        );
        Ok(response)
    }
}

fn update_stock_params(
    store_id: u64,
    product_id: u64,
    stock_amount: i64,
    division: StockDivision,
) -> UpdParams {
    let row: Row = [
        ("storeId", codec::format_id(store_id)),
        ("productId", codec::format_id(product_id)),
        ("stockAmount", codec::format_quantity(stock_amount)),
        ("stockDivision", division.code().to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    UpdParams::new(ProcDivision::Update, Some("1")).table(TableData::new("Stock").row(row))
}

/// Map non-2xx status codes to `ApiError::HttpStatus`.
fn check_status(procedure: Procedure, response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpStatus {
        operation: procedure.name(),
        status: response.status,
        body: response.body_text(),
    })
}

fn parse_ref<R: FromWire>(procedure: Procedure, response: HttpResponse) -> Result<Vec<R>, ApiError> {
    check_status(procedure, &response)?;
    let envelope: RefResponse<R::Wire> =
        serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode {
            operation: procedure.name(),
            source: DecodeError::Json(e),
        })?;

    envelope
        .result
        .into_iter()
        .enumerate()
        .map(|(index, wire)| {
            R::from_wire(wire).map_err(|source| ApiError::Parse {
                operation: procedure.name(),
                index,
                source,
            })
        })
        .collect()
}
