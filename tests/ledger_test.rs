use std::sync::Arc;

use ev_parts_trace::{
    common::LedgerFilter,
    display::{direction_label, format_quantity, reason_label},
    models::{CenterTally, Direction, Reason, UNKNOWN_CENTER_LABEL},
    services::{Aggregator, CenterDirectory, LedgerService},
};
use rstest::{fixture, rstest};
use serde_json::{json, Value};

#[fixture]
fn search_body() -> Value {
    json!({
        "content": [
            {"id": "m-1", "direction": "in", "reason": "shipment_in", "centerId": "HN01",
             "movedAt": "2024-04-02T03:00:00Z", "partNo": "BAT-75", "quantity": 4},
            {"id": "m-2", "direction": "out", "reason": "service_use", "centerId": "HN01",
             "movedAt": "2024-04-05T03:00:00Z", "partNo": "BAT-75",
             "partLots": [{"serialNo": "SN-1", "quantity": 1}, {"serialNo": "SN-2", "quantity": 1}]},
            {"id": "m-3", "direction": "OUT", "reason": "RETURN", "centerName": "EVS Đà Nẵng",
             "movedAt": [2024, 4, 3, 10, 15, 0], "partNo": "MOT-02", "totalQuantity": 1},
            {"id": "m-4", "direction": "transfer", "reason": "adjustment",
             "movedAt": 1712300000000i64}
        ],
        "totalPages": 5,
        "totalElements": 97,
        "number": 0
    })
}

fn centers() -> Arc<CenterDirectory> {
    let body = json!([
        {"id": "HN01", "name": "EVS Hà Nội"},
        {"centerId": "DN02", "centerName": "EVS Đà Nẵng"}
    ]);
    Arc::new(CenterDirectory::from_body(&body))
}

#[rstest]
fn ledger_page_is_sorted_newest_first(search_body: Value) {
    let page = LedgerService::default()
        .load_page(&search_body, &LedgerFilter::default())
        .unwrap();

    let ids: Vec<&str> = page.movements.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m-4", "m-2", "m-3", "m-1"]);
}

#[rstest]
fn summary_separates_server_and_page_totals(search_body: Value) {
    let service = LedgerService::new(Aggregator::new(centers(), UNKNOWN_CENTER_LABEL));
    let page = service
        .load_page(&search_body, &LedgerFilter::default())
        .unwrap();
    let summary = &page.summary;

    assert_eq!(summary.total, 97);
    assert_eq!(summary.page_total, 4);
    assert_eq!(summary.direction_count(&Direction::In), 1);
    assert_eq!(summary.direction_count(&Direction::Out), 2);
    assert_eq!(summary.reason_count(&Reason::Adjustment), 1);
    assert_eq!(
        summary.by_center.get("EVS Hà Nội"),
        Some(&CenterTally {
            total: 2,
            inbound: 1,
            outbound: 1
        })
    );
    assert_eq!(summary.by_center.get("EVS Đà Nẵng").map(|t| t.outbound), Some(1));
    assert_eq!(summary.by_center.get(UNKNOWN_CENTER_LABEL).map(|t| t.total), Some(1));
}

#[rstest]
#[case::by_direction(LedgerFilter { direction: Some("out".into()), ..LedgerFilter::default() }, vec!["m-2", "m-3"])]
#[case::by_reason(LedgerFilter { reason: Some("shipment_in".into()), ..LedgerFilter::default() }, vec!["m-1"])]
#[case::by_center(LedgerFilter { center_id: Some("HN01".into()), ..LedgerFilter::default() }, vec!["m-2", "m-1"])]
#[case::by_dates(
    LedgerFilter { from_date: Some("2024-04-03".into()), to_date: Some("2024-04-04".into()), ..LedgerFilter::default() },
    vec!["m-3"]
)]
fn filters_narrow_the_loaded_page(
    search_body: Value,
    #[case] filter: LedgerFilter,
    #[case] expected: Vec<&str>,
) {
    let page = LedgerService::default().load_page(&search_body, &filter).unwrap();
    let ids: Vec<&str> = page.movements.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, expected);
    assert_eq!(page.summary.page_total, expected.len());
}

#[rstest]
fn derived_quantities_render_for_display(search_body: Value) {
    let page = LedgerService::default()
        .load_page(&search_body, &LedgerFilter::default())
        .unwrap();
    let by_id = |id: &str| page.movements.iter().find(|m| m.id == id).unwrap();

    assert_eq!(format_quantity(by_id("m-1").total_quantity), "4");
    assert_eq!(format_quantity(by_id("m-2").total_quantity), "2");
    assert_eq!(format_quantity(by_id("m-4").total_quantity), "—");
    assert_eq!(direction_label(by_id("m-4").direction.as_ref()), "TRANSFER");
    assert_eq!(reason_label(by_id("m-2").reason.as_ref()), "Sử dụng cho dịch vụ");
}

#[test]
fn null_body_is_an_empty_page() {
    let page = LedgerService::default()
        .load_page(&Value::Null, &LedgerFilter::default())
        .unwrap();
    assert!(page.movements.is_empty());
    assert_eq!(page.page.total_pages, 0);
    assert_eq!(page.summary.total, 0);
}

#[test]
fn filter_round_trips_through_json() {
    let filter: LedgerFilter = serde_json::from_value(json!({
        "centerId": "HN01",
        "fromDate": "2024-04-01",
        "page": 2
    }))
    .unwrap();
    assert_eq!(filter.center_id.as_deref(), Some("HN01"));
    assert_eq!(filter.size, 20);
    assert!(filter.active().is_ok());
}
