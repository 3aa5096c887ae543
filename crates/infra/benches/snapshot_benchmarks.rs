use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::NaiveDate;
use stockroom_core::Money;
use stockroom_infra::snapshot::{
    LocationDto, MovementDto, ProductDto, RecordDto, Snapshot, StateDto, StockDto, SupplierDto,
    from_json, to_json,
};

/// One supplier, `records` products, `per_record` inbound movements each
/// (mirrored into the ledger and each record's history, as an export does).
fn synthetic_snapshot(records: usize, per_record: usize) -> Snapshot {
    let supplier_id = "0190a5c4-1f2e-7a3b-8c4d-5e6f7a8b9c0d".to_string();
    let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
    let mut snapshot = Snapshot {
        suppliers: vec![SupplierDto {
            name: "Acme".to_string(),
            contact_number: "555".to_string(),
            id: supplier_id.clone(),
        }],
        ..Snapshot::default()
    };

    for r in 0..records {
        let code = format!("P{r:05}");
        let history: Vec<MovementDto> = (0..per_record)
            .map(|i| MovementDto {
                product: format!("Product {r}"),
                code: code.clone(),
                quantity: 1 + i as i64,
                direction: "in".to_string(),
                date,
                actor: "Acme".to_string(),
                actor_id: supplier_id.clone(),
                reason: "restock".to_string(),
                timestamp: None,
                price: None,
            })
            .collect();
        snapshot.movements.extend(history.iter().cloned());
        snapshot.records.push(RecordDto {
            product: ProductDto {
                name: format!("Product {r}"),
                category: format!("Category {}", r % 10),
                code,
                price: Money::from_cents(199),
                state: StateDto::Condition {
                    condition: "new".to_string(),
                },
            },
            stock: StockDto {
                actual_stock: 10,
                minimum_stock: 20,
                maximum_stock: 200,
                record: history,
            },
            location: LocationDto {
                aisle: 1 + (r % 10) as u32,
                shelf: 1 + (r / 10) as u32,
            },
        });
    }
    snapshot
}

fn bench_snapshot_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_json");

    for records in [10usize, 500] {
        let snapshot = synthetic_snapshot(records, 20);
        let text = to_json(&snapshot).unwrap();
        group.throughput(Throughput::Bytes(text.len() as u64));

        group.bench_with_input(BenchmarkId::new("serialize", records), &snapshot, |b, s| {
            b.iter(|| black_box(to_json(s).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("parse", records), &text, |b, t| {
            b.iter(|| black_box(from_json(t).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_snapshot_json);
criterion_main!(benches);
