use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, Utc};
use stockroom_core::Money;
use stockroom_inventory::{Inventory, Movement, Stock};
use stockroom_parties::Actor;
use stockroom_products::{Product, ProductCode, ProductState};

fn seeded_inventory(products: usize) -> (Inventory, Vec<Product>) {
    let mut inventory = Inventory::new();
    let mut catalogue = Vec::with_capacity(products);
    for i in 0..products {
        let product = Product::new(
            ProductCode::new(format!("P{i:05}")).unwrap(),
            format!("Product {i}"),
            format!("Category {}", i % 10),
            Money::from_cents(100 + i as u64),
            ProductState::condition("new"),
        )
        .unwrap();
        inventory
            .create_record(product.clone(), Stock::new(0, i64::MAX / 2).unwrap())
            .unwrap();
        catalogue.push(product);
    }
    (inventory, catalogue)
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_append");
    let supplier = Actor::supplier("Acme", "555").unwrap();

    for products in [10usize, 1_000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("apply_to_stock", products), &products, |b, &n| {
            let (mut inventory, catalogue) = seeded_inventory(n);
            let mut i = 0usize;
            b.iter(|| {
                let product = &catalogue[i % catalogue.len()];
                let movement =
                    Movement::record(product, 1, &supplier, "bench", Utc::now(), 8).unwrap();
                black_box(inventory.append(movement, true).unwrap());
                i += 1;
            });
        });
    }

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_merge");
    group.sample_size(20);
    let supplier = Actor::supplier("Acme", "555").unwrap();

    for count in [100usize, 2_000] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("replay_snapshot", count), &count, |b, &n| {
            let (base, catalogue) = seeded_inventory(50);
            let start = Utc::now();
            let snapshot: Vec<Movement> = (0..n)
                .map(|i| {
                    Movement::record(
                        &catalogue[i % catalogue.len()],
                        1,
                        &supplier,
                        "bench",
                        start + Duration::milliseconds(i as i64),
                        8,
                    )
                    .unwrap()
                })
                .collect();

            b.iter(|| {
                let mut inventory = base.clone();
                black_box(inventory.merge_movements(snapshot.clone()).unwrap());
                // second pass is all duplicates
                black_box(inventory.merge_movements(snapshot.clone()).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_append, bench_merge);
criterion_main!(benches);
