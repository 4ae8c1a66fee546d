//! Benchmarks for card rendering
//!
//! Run with: cargo bench -p cardsmith-core
//!
//! These benchmarks establish performance baselines for:
//! - Static markup generation
//! - Live tree reconciliation (first render and incremental)
//! - QR code generation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cardsmith_core::qr::qr_data_uri;
use cardsmith_core::{
    CardState, Direction, ElementKey, ItemKey, LiveTree, PhoneItem, PositionStore, RenderEngine,
    SocialItem, Target,
};

fn card_with_items(items: usize) -> CardState {
    let mut state = CardState::default();
    state.set_input("name", "Ali Hassan");
    state.set_input("tagline", "Product Designer");
    state.set_input("logo", "https://cdn.example/logo.png");
    for i in 0..items {
        state.dynamic_phones.push(PhoneItem::new(format!("055{:07}", i)));
        state
            .dynamic_social_links
            .push(SocialItem::new("instagram", format!("handle{}", i)));
    }
    state
}

// ============================================================================
// Static Markup Benchmarks
// ============================================================================

fn bench_static_markup(c: &mut Criterion) {
    let mut group = c.benchmark_group("static_markup");
    let engine = RenderEngine::default();

    for items in [0usize, 10, 50] {
        let state = card_with_items(items);
        group.bench_with_input(BenchmarkId::from_parameter(items), &state, |b, state| {
            b.iter(|| black_box(engine.static_markup(state)))
        });
    }
    group.finish();
}

// ============================================================================
// Live Tree Benchmarks
// ============================================================================

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let engine = RenderEngine::default();
    let state = card_with_items(20);

    group.bench_function("first_render", |b| {
        b.iter_batched(
            LiveTree::new,
            |mut live| black_box(live.reconcile(&engine.build(&state, Target::Interactive))),
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("single_offset_change", |b| {
        let mut live = LiveTree::new();
        live.reconcile(&engine.build(&state, Target::Interactive));
        let mut moved = state.clone();
        let key = ItemKey::Element(ElementKey::Name);
        b.iter(|| {
            moved.move_item(&key, Direction::Right, 1).unwrap();
            black_box(live.reconcile(&engine.build(&moved, Target::Interactive)))
        })
    });
    group.finish();
}

// ============================================================================
// QR Benchmarks
// ============================================================================

fn bench_qr_generation(c: &mut Criterion) {
    c.bench_function("qr_contact_card", |b| {
        let state = card_with_items(3);
        let payload = cardsmith_core::vcard::contact_card(&state);
        b.iter(|| black_box(qr_data_uri(&payload, 256).unwrap()))
    });
}

criterion_group!(markup_benches, bench_static_markup,);

criterion_group!(live_benches, bench_reconcile,);

criterion_group!(qr_benches, bench_qr_generation,);

criterion_main!(markup_benches, live_benches, qr_benches);
