use chrono::{Duration, SecondsFormat, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use lastseen_cache::{AccessRecencyCache, ActivityEvent};
use serde_json::json;
use std::hint::black_box;

fn bench_events(count: usize, distinct: usize) -> Vec<ActivityEvent> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let at = (base + Duration::seconds(i as i64 * 7 % 86_400))
                .to_rfc3339_opts(SecondsFormat::Secs, true);
            ActivityEvent::new("video_viewed", at).with_context(json!({
                "video_id": format!("video-{}", i % distinct),
                "title": "Benchmark video",
                "position": i as f64,
            }))
        })
        .collect()
}

fn bench_ingest(c: &mut Criterion) {
    let cache = AccessRecencyCache::with_defaults();
    let events = bench_events(10_000, 500);

    c.bench_function("recency/ingest_10k", |b| {
        b.iter(|| {
            cache.ingest(black_box(&events));
            black_box(cache.size());
        });
    });
}

fn bench_lookup(c: &mut Criterion) {
    let cache = AccessRecencyCache::with_defaults();
    cache.ingest(&bench_events(10_000, 500));
    let ids: Vec<String> = (0..50).map(|i| format!("video-{}", i * 10)).collect();

    c.bench_function("recency/get_many_50", |b| {
        b.iter(|| {
            let times = cache.get_last_access_times(black_box(&ids));
            black_box(times.len());
        });
    });
}

criterion_group!(benches, bench_ingest, bench_lookup);
criterion_main!(benches);
