use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use skyfare::cache::{keys, CacheConfig, ResponseCache, TtlCache};

// Mixed read/write load on the response cache with keys shaped like real
// airport and flight lookups
pub fn cache_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_cache");

    for payload_kb in [1, 16, 64].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(payload_kb),
            payload_kb,
            |b, &payload_kb| {
                b.iter(|| {
                    let cache = Arc::new(TtlCache::new(CacheConfig {
                        default_ttl: Duration::from_secs(300),
                    }));

                    let mut rng = thread_rng();
                    let payload = Bytes::from(
                        (0..payload_kb * 1024)
                            .map(|_| rng.gen::<u8>())
                            .collect::<Vec<_>>(),
                    );

                    let codes = ["JFK", "LHR", "CDG", "DXB", "GRU", "LAX", "SIN", "HND"];
                    let dates = (1..29)
                        .map(|d| chrono::NaiveDate::from_ymd_opt(2025, 6, d))
                        .collect::<Option<Vec<_>>>()
                        .unwrap_or_default();

                    let mut handles = vec![];
                    for _ in 0..4 {
                        let cache = Arc::clone(&cache);
                        let payload = payload.clone();
                        let dates = dates.clone();

                        let handle = thread::spawn(move || {
                            let mut rng = thread_rng();

                            for _ in 0..250 {
                                let origin = codes.choose(&mut rng).unwrap();
                                let destination = codes.choose(&mut rng).unwrap();
                                let date = *dates.choose(&mut rng).unwrap();
                                let key = if rng.gen_bool(0.5) {
                                    keys::flights(origin, destination, date, None)
                                } else {
                                    keys::airports(origin)
                                };

                                if rng.gen_bool(0.3) {
                                    cache.set(&key, payload.clone(), None);
                                } else {
                                    let _ = cache.get(&key);
                                }
                            }
                        });

                        handles.push(handle);
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }

                    black_box(cache.stats())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, cache_benchmark);
criterion_main!(benches);
