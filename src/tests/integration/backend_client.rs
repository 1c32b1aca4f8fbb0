//! BackendClient Integration Tests

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::ApiConfig;
use crate::core::api::{BackendClient, DateRange, InventoryApi};
use crate::core::error::DashboardError;
use crate::tests::common::api_config;

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&api_config(&server.uri())).unwrap()
}

// =============================================================================
// Inventory Report
// =============================================================================

#[tokio::test]
async fn test_inventory_report_sends_date_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory-reports"))
        .and(query_param("startDate", "2026-01-01"))
        .and(query_param("endDate", "2026-01-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "stock_levels": { "products": ["Rice", "Dal"], "quantities": [40, "12"] },
            "supplier_stock_distribution": { "suppliers": ["Acme"], "total_products": [7] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let range = DateRange::parse("2026-01-01", "2026-01-31").unwrap();
    let report = client(&server).inventory_report(range).await.unwrap();

    let stock = report.stock_levels.unwrap();
    assert_eq!(stock.products, vec!["Rice", "Dal"]);
    assert_eq!(stock.quantities, vec![40.0, 12.0]);
    let suppliers = report.supplier_stock_distribution.unwrap();
    assert_eq!(suppliers.suppliers, vec!["Acme"]);
    assert_eq!(suppliers.total_products, vec![7.0]);
}

#[tokio::test]
async fn test_inventory_report_missing_datasets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory-reports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let range = DateRange::parse("2026-01-01", "2026-01-02").unwrap();
    let report = client(&server).inventory_report(range).await.unwrap();
    assert!(report.stock_levels.is_none());
    assert!(report.supplier_stock_distribution.is_none());
}

#[tokio::test]
async fn test_server_error_maps_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory-reports"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let range = DateRange::parse("2026-01-01", "2026-01-02").unwrap();
    let err = client(&server).inventory_report(range).await.unwrap_err();
    assert!(matches!(err, DashboardError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_malformed_body_maps_to_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stocks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client(&server).products().await.unwrap_err();
    assert!(matches!(err, DashboardError::Decode { .. }));
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_products_decode_backend_field_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stocks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "stock_id": 1, "stock_name": "Rice", "price": "12.50", "weight": 1, "quantity": 5 },
            { "stock_id": 2, "stock_name": "Dal", "price": 8, "weight": "0.5", "quantity": 0 }
        ])))
        .mount(&server)
        .await;

    let products = client(&server).products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, 1);
    assert_eq!(products[0].name, "Rice");
    assert_eq!(products[0].price, 12.5);
    assert_eq!(products[0].available_quantity, 5);
    assert_eq!(products[1].weight, 0.5);
}

#[tokio::test]
async fn test_courier_services() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/couriers-services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "name": "BlueDart" },
            { "id": 9, "name": "Delhivery" }
        ])))
        .mount(&server)
        .await;

    let couriers = client(&server).courier_services().await.unwrap();
    let names: Vec<&str> = couriers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["BlueDart", "Delhivery"]);
}

// =============================================================================
// Credentials
// =============================================================================

#[tokio::test]
async fn test_session_cookie_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/couriers-services"))
        .and(header("cookie", "sid=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = ApiConfig {
        session_cookie: Some("sid=abc123".to_string()),
        ..api_config(&server.uri())
    };
    let couriers = BackendClient::new(&config)
        .unwrap()
        .courier_services()
        .await
        .unwrap();
    assert!(couriers.is_empty());
}
