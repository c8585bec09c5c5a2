//! Parser for stock-change webhook notifications.
//!
//! # Design
//! A notification is a list of table blocks, each holding rows of string
//! fields, the same convention as list responses. Here the quantities and
//! the timestamp are required: an event without them is meaningless. Only
//! `fromStoreId` / `toStoreId` may be empty, since they are set for
//! transfer events alone.
//!
//! A `null` field reads like an absent one.
//!
//! `stockDivision` is kept as the raw string the platform sent; it is not
//! checked against `StockDivision`.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{ApiError, DecodeError, ParseError};

const OPERATION: &str = "stock webhook";

/// A parsed notification, blocks and rows in payload order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockWebhook {
    pub data: Vec<StockWebhookData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockWebhookData {
    pub table_name: String,
    pub proc_detail_name: String,
    pub rows: Vec<StockChange>,
}

/// One stock change.
///
/// `amount` is the signed delta; `stock_amount` and `layaway_stock_amount`
/// are the resulting levels. Transfer store ids are `0` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    pub store_id: u64,
    pub product_id: u64,
    pub amount: i64,
    pub stock_amount: i64,
    pub layaway_stock_amount: i64,
    pub stock_division: String,
    pub from_store_id: u64,
    pub to_store_id: u64,
    pub upd_date_time: DateTime<FixedOffset>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WebhookWire {
    #[serde(deserialize_with = "codec::null_as_default")]
    data: Vec<DataWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DataWire {
    #[serde(deserialize_with = "codec::null_as_default")]
    table_name: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    proc_detail_name: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    rows: Vec<RowWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RowWire {
    #[serde(deserialize_with = "codec::null_as_default")]
    store_id: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    product_id: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    amount: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    stock_amount: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    layaway_stock_amount: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    stock_division: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    from_store_id: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    to_store_id: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    upd_date_time: String,
}

impl RowWire {
    fn into_change(self) -> Result<StockChange, ParseError> {
        Ok(StockChange {
            store_id: codec::parse_id("storeId", &self.store_id)?,
            product_id: codec::parse_id("productId", &self.product_id)?,
            amount: codec::parse_quantity("amount", &self.amount)?,
            stock_amount: codec::parse_quantity("stockAmount", &self.stock_amount)?,
            layaway_stock_amount: codec::parse_quantity(
                "layawayStockAmount",
                &self.layaway_stock_amount,
            )?,
            stock_division: self.stock_division,
            from_store_id: codec::parse_optional_id("fromStoreId", &self.from_store_id)?,
            to_store_id: codec::parse_optional_id("toStoreId", &self.to_store_id)?,
            upd_date_time: codec::parse_date_time("updDateTime", &self.upd_date_time)?,
        })
    }
}

/// Parse a raw stock webhook body.
///
/// Fails on the first bad row; `ApiError::Parse::index` counts rows across
/// all blocks from zero.
pub fn parse_stock_webhook(payload: &[u8]) -> Result<StockWebhook, ApiError> {
    let wire: WebhookWire = serde_json::from_slice(payload).map_err(|e| ApiError::Decode {
        operation: OPERATION,
        source: DecodeError::Json(e),
    })?;

    let mut index = 0;
    let mut data = Vec::with_capacity(wire.data.len());
    for block in wire.data {
        let mut rows = Vec::with_capacity(block.rows.len());
        for row in block.rows {
            let change = row.into_change().map_err(|source| ApiError::Parse {
                operation: OPERATION,
                index,
                source,
            })?;
            rows.push(change);
            index += 1;
        }
        data.push(StockWebhookData {
            table_name: block.table_name,
            proc_detail_name: block.proc_detail_name,
            rows,
        });
    }

    Ok(StockWebhook { data })
}
