// SPDX-License-Identifier: MPL-2.0
use std::hint::black_box;
use std::sync::Arc;

use agrisaathi::i18n::{LocaleStore, LocaleTag, TranslationTable};
use criterion::{criterion_group, criterion_main, Criterion};

fn translation_lookup_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("translation_lookup");

    group.bench_function("load_embedded_catalogs", |b| {
        b.iter(|| black_box(TranslationTable::embedded().unwrap()));
    });

    let table = Arc::new(TranslationTable::embedded().unwrap());
    let mut store = LocaleStore::new(table);
    store.set_locale(LocaleTag::Hi);

    group.bench_function("translate_hit", |b| {
        b.iter(|| black_box(store.translate(black_box("feature1Desc")).len()));
    });

    group.bench_function("translate_miss", |b| {
        b.iter(|| black_box(store.translate(black_box("doesNotExist")).len()));
    });

    group.finish();
}

criterion_group!(benches, translation_lookup_benchmark);
criterion_main!(benches);
