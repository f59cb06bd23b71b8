use assert_matches::assert_matches;
use ev_parts_trace::{
    client::{HttpMovementApi, MovementApi},
    common::{LedgerFilter, VinQuery},
    config::AppConfig,
    errors::ServiceError,
    services::{CenterDirectory, LedgerService, TraceabilityService},
};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer, token: Option<&str>) -> HttpMovementApi {
    let config = AppConfig {
        api_base_url: format!("{}/api", server.uri()),
        api_token: token.map(str::to_string),
        ..AppConfig::default()
    };
    HttpMovementApi::new(&config).expect("client should build")
}

#[tokio::test]
async fn search_passes_filter_as_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory-movements/search"))
        .and(query_param("centerId", "HN01"))
        .and(query_param("direction", "OUT"))
        .and(query_param("page", "1"))
        .and(query_param("size", "50"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"id": "m-1", "direction": "out", "centerId": "HN01"}],
            "totalPages": 3,
            "totalElements": 101,
            "number": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = LedgerFilter {
        center_id: Some("HN01".into()),
        direction: Some("out".into()),
        page: 1,
        size: 50,
        ..LedgerFilter::default()
    };
    let api = api_for(&server, Some("secret-token"));
    let body = api.search_movements(&filter).await.unwrap();
    let page = LedgerService::default().load_page(&body, &filter).unwrap();

    assert_eq!(page.movements.len(), 1);
    assert_eq!(page.page.number, 1);
    assert_eq!(page.summary.total, 101);
}

#[tokio::test]
async fn vin_trace_uses_canonical_vin_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory-movements/vin/RLNV5JSF1PM000123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"partId": "P1", "direction": "IN"},
            {"partId": "P1", "direction": "OUT"}
        ])))
        .mount(&server)
        .await;

    let api = api_for(&server, None);
    let body = api.trace_vin(" rlnv5jsf1pm000123 ").await.unwrap();
    let report = TraceabilityService::default()
        .trace(&VinQuery::new("rlnv5jsf1pm000123"), &body)
        .unwrap();

    assert_eq!(report.parts.len(), 1);
    assert_eq!(report.parts[0].movements.len(), 2);
}

#[tokio::test]
async fn invalid_vin_never_reaches_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = api_for(&server, None).trace_vin("not-a-vin").await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn upstream_failure_is_an_external_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/service-centers"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let result = api_for(&server, None).list_centers().await;
    assert_matches!(result, Err(ServiceError::ExternalApiError(message)) => {
        assert!(message.contains("503"));
    });
}

#[tokio::test]
async fn empty_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/service-centers"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let body = api_for(&server, None).list_centers().await.unwrap();
    assert_eq!(body, Value::Null);
    assert!(CenterDirectory::from_body(&body).is_empty());
}

#[tokio::test]
async fn center_list_feeds_directory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/service-centers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"id": 1, "name": "EVS Hà Nội"},
                {"serviceCenterId": "2", "serviceCenterName": "EVS Huế"}
            ],
            "totalElements": 2
        })))
        .mount(&server)
        .await;

    let body = api_for(&server, None).list_centers().await.unwrap();
    let directory = CenterDirectory::from_body(&body);
    assert_eq!(directory.len(), 2);
    assert_eq!(directory.name_for("1"), Some("EVS Hà Nội"));
    assert_eq!(directory.name_for("2"), Some("EVS Huế"));
}
