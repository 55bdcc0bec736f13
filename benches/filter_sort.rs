use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};
use std::sync::Arc;
use table_view::data::schema::RowSchema;
use table_view::prefs::MemoryStore;
use table_view::view::{ColumnDescriptor, TableOptions, TableViewController};

const SITES: [&str; 4] = ["North Tower", "Depot", "HQ", "Annex"];

fn rows(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let site = SITES[i % SITES.len()];
            let cost = if i % 9 == 0 {
                Value::Null
            } else {
                json!((i * 37 % 1000) as f64 / 3.0)
            };
            json!({
                "id": i,
                "name": format!("Asset {}", i),
                "site": site,
                "cost": cost,
            })
        })
        .collect()
}

fn controller(count: usize) -> TableViewController {
    let data = rows(count);
    let table = RowSchema::infer("assets", &data)
        .from_json_rows(&data)
        .expect("valid rows");
    let columns = ["id", "name", "site", "cost"]
        .iter()
        .map(|k| ColumnDescriptor::new(*k, *k))
        .collect();
    let mut controller = TableViewController::new(
        columns,
        Arc::new(MemoryStore::new()),
        "assets",
        TableOptions::default(),
    );
    controller.set_data(table);
    controller
}

fn bench_filter_sort(c: &mut Criterion) {
    let mut controller = controller(50_000);

    c.bench_function("search 50k rows", |b| {
        b.iter(|| {
            controller.set_search_term(black_box("tower"));
            black_box(controller.filtered_count())
        })
    });

    controller.clear_search();
    c.bench_function("sort 50k rows by cost", |b| {
        b.iter(|| {
            controller.toggle_sort(black_box("cost"));
            black_box(controller.page_rows().len())
        })
    });
}

criterion_group!(benches, bench_filter_sort);
criterion_main!(benches);
