//! In-memory stand-in for the Smaregi `access` endpoint.
//!
//! Accepts the same form body as the real service
//! (`proc_name=<op>&params=<json>`), keeps tables as string-valued rows and
//! answers in the platform's all-strings JSON shape.

use std::{cmp::Ordering, collections::BTreeMap, collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub type Row = BTreeMap<String, String>;

/// Rows keyed by table name (`Product`, `Store`, `Stock`).
pub type Tables = HashMap<String, Vec<Row>>;

pub type Db = Arc<RwLock<Tables>>;

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

type Reply = (StatusCode, Json<Value>);

fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Fixture data every fresh `app()` starts with.
pub fn seed() -> Tables {
    let mut tables = Tables::new();
    tables.insert(
        "Product".to_string(),
        vec![
            row(&[("productId", "8000001"), ("productCode", "4900000000011"), ("productName", "Green Tea")]),
            row(&[("productId", "8000002"), ("productCode", "4900000000028"), ("productName", "Rice Ball")]),
            row(&[("productId", "8000003"), ("productCode", "4900000000035"), ("productName", "Miso Soup")]),
        ],
    );
    tables.insert(
        "Store".to_string(),
        vec![
            row(&[("storeId", "1"), ("storeName", "Shibuya")]),
            row(&[("storeId", "2"), ("storeName", "Umeda")]),
        ],
    );
    tables.insert(
        "Stock".to_string(),
        vec![
            row(&[
                ("storeId", "1"),
                ("productId", "8000001"),
                ("stockAmount", "20"),
                ("layawayStockAmount", "0"),
                ("updDateTime", "2022-02-01 01:23:21"),
            ]),
            row(&[
                ("storeId", "1"),
                ("productId", "8000002"),
                ("stockAmount", "5"),
                ("layawayStockAmount", "1"),
                ("updDateTime", "2022-02-01 09:00:00"),
            ]),
            row(&[
                ("storeId", "2"),
                ("productId", "8000001"),
                ("stockAmount", "7"),
                ("layawayStockAmount", "0"),
                ("updDateTime", ""),
            ]),
        ],
    );
    tables
}

pub fn app() -> Router {
    app_with(seed())
}

pub fn app_with(tables: Tables) -> Router {
    let db: Db = Arc::new(RwLock::new(tables));
    Router::new().route("/access/", post(access)).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, code: u32, message: impl Into<String>) -> Reply {
    let message = message.into();
    (status, Json(json!({ "error_code": code, "error": message })))
}

async fn access(State(db): State<Db>, headers: HeaderMap, body: String) -> Reply {
    if let Err(reply) = authorize(&headers) {
        return reply;
    }
    let Some((proc_name, params)) = split_body(&body) else {
        return error(StatusCode::BAD_REQUEST, 2, "body must be proc_name=<op>&params=<json>");
    };

    info!(proc_name, "dispatching");
    match proc_name {
        "product_ref" => reference(&db, "Product", params).await,
        "store_ref" => reference(&db, "Store", params).await,
        "stock_ref" => reference(&db, "Stock", params).await,
        "stock_upd" => update_stock(&db, params).await,
        other => error(StatusCode::BAD_REQUEST, 3, format!("unknown proc_name {other}")),
    }
}

fn authorize(headers: &HeaderMap) -> Result<(), Reply> {
    let present = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| !v.is_empty())
    };
    if !present("x-contract-id") || !present("x-access-token") {
        return Err(error(StatusCode::UNAUTHORIZED, 5, "missing contract id or access token"));
    }
    let form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));
    if !form {
        return Err(error(StatusCode::UNSUPPORTED_MEDIA_TYPE, 6, "expected form-encoded body"));
    }
    Ok(())
}

/// `proc_name=<op>&params=<json>`, read literally.
pub fn split_body(body: &str) -> Option<(&str, &str)> {
    body.strip_prefix("proc_name=")?.split_once("&params=")
}

#[derive(Debug, Deserialize)]
struct RefParams {
    table_name: String,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    conditions: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    order: Vec<String>,
    limit: Option<usize>,
    page: Option<usize>,
}

/// Compare numerically when both sides are integers, lexically otherwise.
fn compare(a: Option<&String>, b: Option<&String>) -> Ordering {
    let a = a.map(String::as_str).unwrap_or_default();
    let b = b.map(String::as_str).unwrap_or_default();
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

async fn reference(db: &Db, table: &str, params: &str) -> Reply {
    let params: RefParams = match serde_json::from_str(params) {
        Ok(params) => params,
        Err(e) => return error(StatusCode::BAD_REQUEST, 10, format!("invalid params: {e}")),
    };
    if params.table_name != table {
        return error(StatusCode::BAD_REQUEST, 11, format!("table_name must be {table}"));
    }
    // Zero is never sent by a well-behaved client; absent means default.
    if params.limit == Some(0) || params.page == Some(0) {
        return error(StatusCode::BAD_REQUEST, 12, "limit and page must be positive");
    }
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let page = params.page.unwrap_or(1);

    let tables = db.read().await;
    let mut rows: Vec<&Row> = tables
        .get(table)
        .map(|rows| rows.iter().collect())
        .unwrap_or_default();

    rows.retain(|row| {
        params
            .conditions
            .iter()
            .all(|cond| cond.iter().all(|(k, v)| row.get(k) == Some(v)))
    });

    for key in params.order.iter().rev() {
        let (field, desc) = match key.strip_suffix(" desc") {
            Some(field) => (field, true),
            None => (key.strip_suffix(" asc").unwrap_or(key), false),
        };
        rows.sort_by(|a, b| {
            let ord = compare(a.get(field), b.get(field));
            if desc {
                ord.reverse()
            } else {
                ord
            }
        });
    }

    let total = rows.len();
    let result: Vec<Row> = rows
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .map(|row| {
            if params.fields.is_empty() {
                row.clone()
            } else {
                row.iter()
                    .filter(|(k, _)| params.fields.contains(*k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            }
        })
        .collect();

    (
        StatusCode::OK,
        Json(json!({ "total_count": total.to_string(), "result": result })),
    )
}

#[derive(Debug, Deserialize)]
struct UpdParams {
    proc_info: ProcInfo,
    data: Vec<UpdData>,
}

#[derive(Debug, Deserialize)]
struct ProcInfo {
    proc_division: String,
}

#[derive(Debug, Deserialize)]
struct UpdData {
    table_name: String,
    rows: Vec<BTreeMap<String, Value>>,
}

fn valid_division(code: &str) -> bool {
    code.len() == 2 && code.parse::<u8>().is_ok_and(|n| (1..=17).contains(&n))
}

async fn update_stock(db: &Db, params: &str) -> Reply {
    let params: UpdParams = match serde_json::from_str(params) {
        Ok(params) => params,
        Err(e) => return error(StatusCode::BAD_REQUEST, 10, format!("invalid params: {e}")),
    };
    if params.proc_info.proc_division != "U" {
        return error(StatusCode::BAD_REQUEST, 20, "only proc_division U is supported");
    }

    let mut updates = Vec::new();
    for block in params.data {
        if block.table_name != "Stock" {
            return error(StatusCode::BAD_REQUEST, 11, "table_name must be Stock");
        }
        for raw in block.rows {
            let mut row = Row::new();
            for (k, v) in raw {
                match v {
                    Value::String(s) => {
                        row.insert(k, s);
                    }
                    _ => return error(StatusCode::BAD_REQUEST, 21, format!("{k} must be a string")),
                }
            }
            for field in ["storeId", "productId", "stockAmount", "stockDivision"] {
                if !matches!(row.get(field), Some(v) if !v.is_empty()) {
                    return error(StatusCode::BAD_REQUEST, 22, format!("{field} is required"));
                }
            }
            if !valid_division(&row["stockDivision"]) {
                return error(StatusCode::BAD_REQUEST, 23, "unknown stockDivision");
            }
            if row["stockAmount"].parse::<i64>().is_err() {
                return error(StatusCode::BAD_REQUEST, 24, "stockAmount must be an integer");
            }
            updates.push(row);
        }
    }

    let mut tables = db.write().await;
    let stocks = tables.entry("Stock".to_string()).or_default();
    for update in updates {
        let existing = stocks.iter_mut().find(|s| {
            s.get("storeId") == update.get("storeId") && s.get("productId") == update.get("productId")
        });
        match existing {
            Some(stock) => {
                stock.insert("stockAmount".to_string(), update["stockAmount"].clone());
            }
            None => stocks.push(row(&[
                ("storeId", update["storeId"].as_str()),
                ("productId", update["productId"].as_str()),
                ("stockAmount", update["stockAmount"].as_str()),
                ("layawayStockAmount", "0"),
                ("updDateTime", ""),
            ])),
        }
    }

    (StatusCode::OK, Json(json!({})))
}
