use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use serena_care::models::{SeniorReport, Symptom};
use serena_care::report_html;
use serena_care::schedule::dosage_times;
use serde_json::json;
use std::hint::black_box;

/// Report with a realistic spread of prescriptions and a long symptom history.
fn sample_report(prescriptions: usize, symptoms: usize) -> SeniorReport {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 7, 30, 0).unwrap();

    let prescriptions = (0..prescriptions)
        .map(|i| {
            serde_json::from_value(json!({
                "id": i,
                "senior_id": 1,
                "medication_id": 100 + i,
                "medication_name": format!("Medication <{}>", i),
                "dosage": "1 comprimido",
                "frequency": format!("a cada {}h", [4, 6, 8, 12, 24][i % 5]),
                "start_date": "2025-01-01T07:30:00Z",
            }))
            .expect("valid prescription")
        })
        .collect();

    let symptoms = (0..symptoms)
        .map(|i| Symptom {
            id: i.to_string(),
            senior_id: "1".to_string(),
            description: format!("Dor & desconforto #{}", i),
            pain_level: (i % 11) as u8,
            created_at: start + Duration::hours(i as i64 * 7),
        })
        .collect();

    SeniorReport {
        senior_id: Some("1".to_string()),
        senior_name: Some("Maria Silva".to_string()),
        generated_at: None,
        prescriptions,
        symptoms,
        summary: Some("Stable".to_string()),
    }
}

fn benchmark_report_rendering(c: &mut Criterion) {
    let small = sample_report(3, 20);
    let large = sample_report(40, 2_000);
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    let mut group = c.benchmark_group("report_html");

    group.bench_function("small_report", |b| {
        b.iter(|| report_html::render(black_box(&small), now))
    });

    group.bench_function("large_report", |b| {
        b.iter(|| report_html::render(black_box(&large), now))
    });

    group.finish();
}

fn benchmark_dosage_times(c: &mut Criterion) {
    let start = chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    c.bench_function("dosage_times_hourly", |b| {
        b.iter(|| dosage_times(black_box(1), start))
    });
}

criterion_group!(benches, benchmark_report_rendering, benchmark_dosage_times);
criterion_main!(benches);
