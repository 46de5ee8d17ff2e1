use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use stockbook_core::{ActorId, BranchId, DocumentId, ItemId, LocationId, OrgId};
use stockbook_ledger::{
    EntryDetail, EntrySource, InMemoryLedgerStore, LedgerStore, NewEntry, ReasonCode, SourceKind,
};

fn seed_entry(
    org_id: OrgId,
    branch_id: BranchId,
    item_id: ItemId,
    location_id: LocationId,
    qty: i64,
    day: u32,
) -> NewEntry {
    NewEntry {
        org_id,
        branch_id,
        item_id,
        location_id,
        qty: Decimal::from(qty),
        reason: ReasonCode::Adjustment,
        source: EntrySource::new(SourceKind::Manual, DocumentId::new()),
        effective_at: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
        created_by: ActorId::new(),
        detail: EntryDetail::None,
    }
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_append");
    group.throughput(Throughput::Elements(1));

    group.bench_function("append_with_balance_check", |b| {
        let store = InMemoryLedgerStore::new();
        let org_id = OrgId::new();
        let branch_id = BranchId::new();
        let item_id = ItemId::new();
        let location_id = LocationId::new();
        // Keep the balance comfortably positive so the check never rejects.
        store
            .append(
                seed_entry(org_id, branch_id, item_id, location_id, 1_000_000, 1),
                false,
            )
            .unwrap();

        b.iter(|| {
            store
                .append(
                    black_box(seed_entry(org_id, branch_id, item_id, location_id, -1, 2)),
                    false,
                )
                .unwrap()
        });
    });

    group.finish();
}

fn bench_on_hand(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_on_hand");

    for n in [100usize, 1_000, 10_000] {
        let store = InMemoryLedgerStore::new();
        let org_id = OrgId::new();
        let branch_id = BranchId::new();
        let item_id = ItemId::new();
        let location_id = LocationId::new();
        for i in 0..n {
            let day = (i % 28) as u32 + 1;
            store
                .append(
                    seed_entry(org_id, branch_id, item_id, location_id, 1, day),
                    false,
                )
                .unwrap();
        }

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("sum_over_entries", n), &n, |b, _| {
            b.iter(|| {
                black_box(store.on_hand(
                    black_box(branch_id),
                    black_box(item_id),
                    black_box(location_id),
                    None,
                ))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_append, bench_on_hand);
criterion_main!(benches);
