use airquality::{additive_decompose, preprocess, AirQualityFrame, DECOMPOSITION_PERIOD};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polars::df;
use polars::prelude::DataFrame;

/// Four years of hourly readings for both stations.
fn synthetic_table() -> DataFrame {
    let hours = 4 * 365 * 24;
    let mut station = Vec::with_capacity(2 * hours);
    let (mut year, mut month, mut day, mut hour) = (vec![], vec![], vec![], vec![]);
    let mut pm10 = Vec::with_capacity(2 * hours);
    for name in ["Dongsi", "Wanliu"] {
        for i in 0..hours {
            let day_index = i / 24;
            station.push(name);
            year.push(2013 + (day_index / 365) as i32);
            month.push(1 + ((day_index % 365) / 31).min(11) as i32);
            day.push(1 + ((day_index % 365) % 28) as i32);
            hour.push((i % 24) as i32);
            pm10.push(Some(80.0 + 40.0 * ((i % 24) as f64 / 24.0)));
        }
    }
    let temp: Vec<Option<f64>> = pm10.iter().map(|v| v.map(|v| v / 10.0)).collect();
    df!(
        "station" => station,
        "year" => year,
        "month" => month,
        "day" => day,
        "hour" => hour,
        "PM10" => pm10,
        "TEMP" => temp.clone(),
        "DEWP" => temp.clone(),
        "PRES" => temp
    )
    .unwrap()
}

fn bench_pipeline(c: &mut Criterion) {
    let table = AirQualityFrame::from_dataframe(synthetic_table(), "bench").unwrap();
    c.bench_function("preprocess", |b| {
        b.iter(|| preprocess(black_box(&table)).unwrap())
    });

    let daily: Vec<f64> = (0..4 * 365)
        .map(|t| 100.0 + 0.01 * t as f64 + 30.0 * (t as f64 / 58.1).sin())
        .collect();
    c.bench_function("additive_decompose", |b| {
        b.iter(|| additive_decompose(black_box(&daily), DECOMPOSITION_PERIOD).unwrap())
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
