//! Domain records for the Smaregi API and their wire counterparts.
//!
//! # Design
//! Each record has a `*Wire` twin that mirrors the response JSON
//! exactly: every field is a string and a missing key or `null` reads as `""`. The
//! `FromWire` impls run those strings through `codec`, which is the only
//! place empty/invalid values are judged.
//!
//! Product and store ids are required. Stock columns are all optional
//! because list queries may project any subset of them.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};

use crate::codec;
use crate::error::ParseError;

/// Conversion from a string-typed wire row into a typed record.
pub trait FromWire: Sized {
    type Wire: DeserializeOwned;

    fn from_wire(wire: Self::Wire) -> Result<Self, ParseError>;
}

/// Envelope of every `*_ref` response. `total_count` is not needed to
/// decode the page and is ignored.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>"))]
pub(crate) struct RefResponse<R> {
    #[serde(default = "Vec::new", deserialize_with = "codec::null_as_default")]
    pub result: Vec<R>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: u64,
    pub product_code: String,
    pub product_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductWire {
    #[serde(deserialize_with = "codec::null_as_default")]
    product_id: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    product_code: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    product_name: String,
}

impl FromWire for Product {
    type Wire = ProductWire;

    fn from_wire(wire: ProductWire) -> Result<Self, ParseError> {
        Ok(Product {
            product_id: codec::parse_id("productId", &wire.product_id)?,
            product_code: wire.product_code,
            product_name: wire.product_name,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub store_id: u64,
    pub store_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreWire {
    #[serde(deserialize_with = "codec::null_as_default")]
    store_id: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    store_name: String,
}

impl FromWire for Store {
    type Wire = StoreWire;

    fn from_wire(wire: StoreWire) -> Result<Self, ParseError> {
        Ok(Store {
            store_id: codec::parse_id("storeId", &wire.store_id)?,
            store_name: wire.store_name,
        })
    }
}

/// Stock level of one product in one store.
///
/// `upd_date_time` is `None` when the server sent an empty string or the
/// column was not projected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub store_id: u64,
    pub product_id: u64,
    pub stock_amount: i64,
    pub layaway_stock_amount: i64,
    pub upd_date_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StockWire {
    #[serde(deserialize_with = "codec::null_as_default")]
    store_id: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    product_id: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    stock_amount: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    layaway_stock_amount: String,
    #[serde(deserialize_with = "codec::null_as_default")]
    upd_date_time: String,
}

impl FromWire for Stock {
    type Wire = StockWire;

    fn from_wire(wire: StockWire) -> Result<Self, ParseError> {
        Ok(Stock {
            store_id: codec::parse_optional_id("storeId", &wire.store_id)?,
            product_id: codec::parse_optional_id("productId", &wire.product_id)?,
            stock_amount: codec::parse_optional_quantity("stockAmount", &wire.stock_amount)?,
            layaway_stock_amount: codec::parse_optional_quantity(
                "layawayStockAmount",
                &wire.layaway_stock_amount,
            )?,
            upd_date_time: codec::parse_optional_date_time("updDateTime", &wire.upd_date_time)?,
        })
    }
}

/// Reason code attached to a stock update (`stockDivision`).
///
/// Only used to constrain what callers send. Codes arriving in webhooks are
/// kept as raw strings; use [`StockDivision::from_code`] to classify them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockDivision {
    /// 01: manual correction.
    Modified,
    /// 02: sale.
    Sold,
    /// 03: purchase.
    Purchased,
    /// 04: shipped out to another store.
    ComeOut,
    /// 05: received from another store.
    ComeIn,
    /// 06: rental.
    Lent,
    /// 07: put on hold.
    Reserved,
    /// 08: stocktaking.
    StockTaking,
    /// 09: adjustment.
    Adjusted,
    /// 10: shipment.
    Shipped,
    /// 11: e-commerce integration.
    Ec,
    /// 12: return.
    Returned,
    /// 13: promotional goods.
    Promotion,
    /// 14: loss.
    Loss,
    /// 15: API integration.
    Api,
    /// 16: allocated to a sale.
    ReservedForSale,
    /// 17: inbound shortfall.
    IncomingLoss,
}

impl StockDivision {
    pub const ALL: [StockDivision; 17] = [
        StockDivision::Modified,
        StockDivision::Sold,
        StockDivision::Purchased,
        StockDivision::ComeOut,
        StockDivision::ComeIn,
        StockDivision::Lent,
        StockDivision::Reserved,
        StockDivision::StockTaking,
        StockDivision::Adjusted,
        StockDivision::Shipped,
        StockDivision::Ec,
        StockDivision::Returned,
        StockDivision::Promotion,
        StockDivision::Loss,
        StockDivision::Api,
        StockDivision::ReservedForSale,
        StockDivision::IncomingLoss,
    ];

    /// Two-character wire code.
    pub fn code(self) -> &'static str {
        match self {
            StockDivision::Modified => "01",
            StockDivision::Sold => "02",
            StockDivision::Purchased => "03",
            StockDivision::ComeOut => "04",
            StockDivision::ComeIn => "05",
            StockDivision::Lent => "06",
            StockDivision::Reserved => "07",
            StockDivision::StockTaking => "08",
            StockDivision::Adjusted => "09",
            StockDivision::Shipped => "10",
            StockDivision::Ec => "11",
            StockDivision::Returned => "12",
            StockDivision::Promotion => "13",
            StockDivision::Loss => "14",
            StockDivision::Api => "15",
            StockDivision::ReservedForSale => "16",
            StockDivision::IncomingLoss => "17",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }
}

impl fmt::Display for StockDivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for StockDivision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ParseErrorKind;

    use super::*;

    fn decode<T: FromWire>(json: &str) -> Result<T, ParseError> {
        let wire: T::Wire = serde_json::from_str(json).unwrap();
        T::from_wire(wire)
    }

    #[test]
    fn product_from_wire() {
        let product: Product =
            decode(r#"{"productId":"10","productCode":"C1","productName":"Widget"}"#).unwrap();
        assert_eq!(
            product,
            Product {
                product_id: 10,
                product_code: "C1".to_string(),
                product_name: "Widget".to_string(),
            }
        );
    }

    #[test]
    fn product_requires_id() {
        let err = decode::<Product>(r#"{"productCode":"C1"}"#).unwrap_err();
        assert_eq!(err.field, "productId");
        assert_eq!(err.kind, ParseErrorKind::Empty);
    }

    #[test]
    fn store_rejects_malformed_id() {
        let err = decode::<Store>(r#"{"storeId":"abc","storeName":"Shibuya"}"#).unwrap_err();
        assert_eq!(err.field, "storeId");
        assert_eq!(err.value, "abc");
    }

    #[test]
    fn stock_tolerates_projected_columns() {
        let stock: Stock = decode(r#"{"productId":"2","stockAmount":"-4"}"#).unwrap();
        assert_eq!(stock.store_id, 0);
        assert_eq!(stock.product_id, 2);
        assert_eq!(stock.stock_amount, -4);
        assert_eq!(stock.layaway_stock_amount, 0);
        assert_eq!(stock.upd_date_time, None);
    }

    #[test]
    fn stock_reads_null_columns_as_unset() {
        let stock: Stock = decode(
            r#"{"storeId":null,"productId":"2","stockAmount":null,
                "layawayStockAmount":null,"updDateTime":null}"#,
        )
        .unwrap();
        assert_eq!(stock.store_id, 0);
        assert_eq!(stock.product_id, 2);
        assert_eq!(stock.stock_amount, 0);
        assert_eq!(stock.layaway_stock_amount, 0);
        assert_eq!(stock.upd_date_time, None);
    }

    #[test]
    fn null_product_id_is_still_required() {
        let err = decode::<Product>(r#"{"productId":null,"productName":"Widget"}"#).unwrap_err();
        assert_eq!(err.field, "productId");
        assert_eq!(err.kind, ParseErrorKind::Empty);
    }

    #[test]
    fn stock_rejects_bad_timestamp() {
        let err = decode::<Stock>(r#"{"updDateTime":"yesterday"}"#).unwrap_err();
        assert_eq!(err.field, "updDateTime");
    }

    #[test]
    fn stock_division_codes_are_sequential() {
        for (i, division) in StockDivision::ALL.iter().enumerate() {
            assert_eq!(division.code(), format!("{:02}", i + 1));
            assert_eq!(StockDivision::from_code(division.code()), Some(*division));
        }
        assert_eq!(StockDivision::from_code("18"), None);
        assert_eq!(StockDivision::from_code("1"), None);
    }

    #[test]
    fn stock_division_serializes_as_code() {
        assert_eq!(serde_json::to_value(StockDivision::Api).unwrap(), "15");
        assert_eq!(StockDivision::IncomingLoss.to_string(), "17");
    }
}
