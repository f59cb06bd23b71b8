use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ev_parts_trace::services::{aggregate, group_by_vin, normalize_all, unwrap_envelope};
use serde_json::{json, Value};

fn raw_movements(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": format!("mv-{}", i),
                "direction": if i % 2 == 0 { "in" } else { "out" },
                "reason": if i % 3 == 0 { "service_use" } else { "shipment_in" },
                "centerId": (i % 7).to_string(),
                "movedAt": "2024-05-01T08:30:00Z",
                "partId": format!("P{}", i % 25),
                "partNo": format!("BAT-{:04}", i % 25),
                "partLots": [
                    {"serialNo": format!("S-{}", i), "batchNo": "B-1", "quantity": 1},
                    {"serialNo": format!("S-{}b", i), "batchNo": "B-2", "quantity": "2"}
                ]
            })
        })
        .collect()
}

// Normalization of a full page body, envelope included
fn normalization_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_page");

    for size in [20, 100, 500].iter() {
        let body = json!({
            "content": raw_movements(*size),
            "totalPages": 3,
            "totalElements": size * 3,
            "number": 0
        });
        group.bench_with_input(BenchmarkId::from_parameter(size), &body, |b, body| {
            b.iter(|| {
                let page = unwrap_envelope(black_box(body), 0);
                normalize_all(&page.items)
            });
        });
    }

    group.finish();
}

fn grouping_benchmark(c: &mut Criterion) {
    let movements = normalize_all(&raw_movements(500));
    c.bench_function("group_by_vin_500", |b| {
        b.iter(|| group_by_vin(black_box(&movements)));
    });
}

fn aggregation_benchmark(c: &mut Criterion) {
    let movements = normalize_all(&raw_movements(500));
    c.bench_function("aggregate_500", |b| {
        b.iter(|| aggregate(black_box(&movements)));
    });
}

criterion_group!(
    benches,
    normalization_benchmark,
    grouping_benchmark,
    aggregation_benchmark
);
criterion_main!(benches);
