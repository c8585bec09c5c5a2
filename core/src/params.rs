//! Request payloads serialized into the `params=` part of the form body.
//!
//! # Design
//! `RefParams` is the list-query model shared by every `*_ref` procedure.
//! Optional members are skipped entirely when empty or zero: the API reads
//! their presence as an override, so `"limit": 0` is not the same as
//! leaving the limit out.
//!
//! `UpdParams` is the mutation model. Row values are always strings on the
//! wire, whatever their logical type, so `Row` is a string-to-string map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One row of an update: field name to wire string.
pub type Row = BTreeMap<String, String>;

/// One equality condition: field name to the value it must equal.
pub type Condition = BTreeMap<String, String>;

fn is_zero(n: &u32) -> bool {
    *n == 0
}

/// Filtered, paginated list query.
///
/// Multiple conditions are ANDed by the server. `page` is 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefParams {
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub page: u32,
}

impl RefParams {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Self::default()
        }
    }

    /// Restrict the returned columns.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Add one condition map; every pair in it must match.
    pub fn condition<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let condition = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.conditions.push(condition);
        self
    }

    pub fn order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order.extend(order.into_iter().map(Into::into));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// Kind of mutation carried by `proc_info.proc_division`.
///
/// Stock tables accept upserts only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcDivision {
    /// Insert or update.
    #[serde(rename = "U")]
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcInfo {
    pub proc_division: ProcDivision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proc_detail_division: Option<String>,
}

/// Rows destined for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub table_name: String,
    pub rows: Vec<Row>,
}

impl TableData {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }
}

/// Mutation request: one header, one or more table blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdParams {
    pub proc_info: ProcInfo,
    pub data: Vec<TableData>,
}

impl UpdParams {
    pub fn new(proc_division: ProcDivision, proc_detail_division: Option<&str>) -> Self {
        Self {
            proc_info: ProcInfo {
                proc_division,
                proc_detail_division: proc_detail_division.map(str::to_string),
            },
            data: Vec::new(),
        }
    }

    pub fn table(mut self, table: TableData) -> Self {
        self.data.push(table);
        self
    }
}
