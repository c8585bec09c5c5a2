//! End-to-end test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every client
//! operation over real HTTP through `UreqTransport`. Checks that the literal
//! form body, the headers and the all-strings decoding agree with the
//! server's view of the protocol.

#![cfg(feature = "ureq")]

use chrono::TimeZone;
use smaregi_core::codec::JST;
use smaregi_core::{ApiError, ClientConfig, RefParams, SmaregiClient, StockDivision, UreqTransport};

fn start_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client(addr: std::net::SocketAddr, token: &str) -> SmaregiClient<UreqTransport> {
    let config = ClientConfig::new("skx123", token).with_endpoint(format!("http://{addr}/access/"));
    SmaregiClient::new(config, UreqTransport::new())
}

#[test]
fn ref_and_upd_lifecycle() {
    let addr = start_server();
    let client = client(addr, "token");

    // Step 1: products, newest id first.
    let products = client
        .product_ref(&RefParams::new("Product").order(["productId desc"]))
        .unwrap();
    assert_eq!(products.len(), 3);
    assert_eq!(products[0].product_id, 8000003);
    assert_eq!(products[0].product_name, "Miso Soup");

    // Step 2: stores.
    let stores = client.store_ref(&RefParams::new("Store")).unwrap();
    assert_eq!(stores.len(), 2);
    assert_eq!(stores[1].store_name, "Umeda");

    // Step 3: stock in store 1, with Tokyo timestamps.
    let params = RefParams::new("Stock")
        .condition([("storeId", "1"), ("productId", "8000001")]);
    let stocks = client.stock_ref(&params).unwrap();
    assert_eq!(stocks.len(), 1);
    assert_eq!(stocks[0].stock_amount, 20);
    assert_eq!(
        stocks[0].upd_date_time,
        Some(JST.with_ymd_and_hms(2022, 2, 1, 1, 23, 21).unwrap())
    );

    // Step 4: a stock row with an empty timestamp decodes to None.
    let params = RefParams::new("Stock").condition([("storeId", "2")]);
    let stocks = client.stock_ref(&params).unwrap();
    assert_eq!(stocks.len(), 1);
    assert_eq!(stocks[0].upd_date_time, None);

    // Step 5: projection leaves unrequested columns at zero.
    let params = RefParams::new("Stock").fields(["productId"]).limit(1);
    let stocks = client.stock_ref(&params).unwrap();
    assert_eq!(stocks.len(), 1);
    assert_eq!(stocks[0].store_id, 0);
    assert_ne!(stocks[0].product_id, 0);

    // Step 6: set the absolute stock amount.
    client
        .update_stock(1, 8000001, 42, StockDivision::StockTaking)
        .unwrap();

    // Step 7: the new amount is visible.
    let params = RefParams::new("Stock")
        .condition([("storeId", "1"), ("productId", "8000001")]);
    let stocks = client.stock_ref(&params).unwrap();
    assert_eq!(stocks[0].stock_amount, 42);

    // Step 8: pages beyond the end are empty.
    let params = RefParams::new("Product").limit(2).page(3);
    assert!(client.product_ref(&params).unwrap().is_empty());
}

#[test]
fn rejected_credentials_surface_status_and_body() {
    let addr = start_server();
    let client = client(addr, "");

    let err = client.store_ref(&RefParams::new("Store")).unwrap_err();
    match err {
        ApiError::HttpStatus { operation, status, body } => {
            assert_eq!(operation, "store_ref");
            assert_eq!(status, 401);
            assert!(body.contains("access token"), "body: {body}");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }

    let err = client
        .update_stock(1, 8000001, 1, StockDivision::Modified)
        .unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus { status: 401, .. }));
}

#[test]
fn unreachable_server_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = client(addr, "token");

    let err = client.product_ref(&RefParams::new("Product")).unwrap_err();
    assert!(matches!(err, ApiError::Transport { operation: "product_ref", .. }));
}
