//! Pipeline benchmark: event stream → daily rollover → classification.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fingerprint_detector::config::DetectionConfig;
use fingerprint_detector::detector::Detector;
use fingerprint_detector::risk::WeightingMode;
use fingerprint_detector::source::{Event, EventReader};
use std::io::Cursor;

const ACTIONS: [&str; 6] = ["login", "mail", "print", "upload", "download", "logout"];

fn make_events(users: usize, days: i64, per_day: usize) -> Vec<Event> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut out = Vec::with_capacity(users * days as usize * per_day);
    for day in 0..days {
        for n in 0..per_day {
            for u in 0..users {
                let ts = start + Duration::days(day) + Duration::minutes(n as i64);
                let action = ACTIONS[(u + n + day as usize) % ACTIONS.len()];
                out.push(Event::new(format!("user_{}", u), action, ts));
            }
        }
    }
    out
}

fn bench_observe(c: &mut Criterion) {
    let events = make_events(50, 30, 20);
    for mode in [WeightingMode::None, WeightingMode::Idf, WeightingMode::Normalized] {
        c.bench_function(&format!("observe_50_users_30_days_{}", mode), |b| {
            b.iter(|| {
                let mut detector = Detector::new(DetectionConfig {
                    weighting: mode,
                    ..Default::default()
                });
                for ev in &events {
                    black_box(detector.observe(ev).unwrap());
                }
                black_box(detector.finish().unwrap())
            })
        });
    }
}

fn bench_read_ndjson(c: &mut Criterion) {
    let mut input = String::new();
    for ev in make_events(10, 5, 20) {
        input.push_str(&format!(
            "{{\"uid\": \"{}\", \"type\": \"{}\", \"time\": \"{}\"}}\n",
            ev.user_id,
            ev.action,
            ev.ts.to_rfc3339()
        ));
    }

    c.bench_function("read_1000_ndjson_events", |b| {
        b.iter(|| {
            let reader = EventReader::new(Cursor::new(black_box(input.as_bytes())));
            black_box(reader.filter(|e| e.is_ok()).count())
        })
    });
}

criterion_group!(benches, bench_observe, bench_read_ndjson);
criterion_main!(benches);
