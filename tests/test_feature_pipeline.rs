//! Integration test: Feature pipeline (raw transactions → table → online features)

use chrono::{Duration, NaiveDate};
use sales_forecast::aggregation::{AggregatorConfig, DailyAggregate, HistoricalAggregator, TransactionRecord};
use sales_forecast::features::{FeatureVector, HistoricalFeatureTable, OnlineFeatureAssembler, SENTINEL};
use sales_forecast::inference::PredictionRequest;

const ENTITY: i64 = 85123;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2011, 1, 3).unwrap()
}

fn quantities(n: usize) -> Vec<f64> {
    let base = [10.0, 12.0, 9.0, 11.0, 8.0, 10.0, 13.0, 9.0];
    (0..n).map(|i| base[i % base.len()] + (i / base.len()) as f64).collect()
}

fn daily(entity: i64, values: &[f64]) -> Vec<DailyAggregate> {
    values
        .iter()
        .enumerate()
        .map(|(i, &q)| DailyAggregate::new(start() + Duration::days(i as i64), entity, q, q * 2.5))
        .collect()
}

fn aggregator() -> HistoricalAggregator {
    HistoricalAggregator::new(AggregatorConfig::default().without_trim())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn record(invoice: &str, code: &str, quantity: i64, price: f64, day: i64) -> TransactionRecord {
    TransactionRecord {
        invoice_id: invoice.to_string(),
        entity_id: code.to_string(),
        customer_id: Some("17850".to_string()),
        description: Some("WHITE HANGING HEART T-LIGHT HOLDER".to_string()),
        quantity,
        unit_price: price,
        timestamp: (start() + Duration::days(day)).and_hms_opt(8, 26, 0).unwrap(),
    }
}

#[test]
fn test_next_date_features_for_entity_85123() {
    let values = quantities(60);
    let table = aggregator().featurize(daily(ENTITY, &values));
    let next = start() + Duration::days(60);

    let features = OnlineFeatureAssembler::new(&table).assemble_at(ENTITY, next);

    // 28th most recent recorded quantity
    assert_eq!(features.lag_28, values[60 - 28]);
    assert!((features.rmean_28_7 - mean(&values[26..=32])).abs() < 1e-9);
    assert!((features.rmean_28_28 - mean(&values[5..=32])).abs() < 1e-9);
    assert_eq!(features.entity_id, ENTITY);
    assert_eq!(features.calendar.year, 2011);
}

#[test]
fn test_online_matches_batch_on_appended_row() {
    let values = quantities(70);
    let table = aggregator().featurize(daily(ENTITY, &values));

    for n in [1usize, 27, 28, 29, 34, 35, 55, 56, 70] {
        let next = start() + Duration::days(n as i64);
        let prefix = aggregator().featurize(daily(ENTITY, &values[..n]));
        let online = OnlineFeatureAssembler::new(&prefix).assemble_at(ENTITY, next);

        let mut extended = daily(ENTITY, &values[..n]);
        extended.push(DailyAggregate::new(next, ENTITY, 999.0, 0.0));
        let batch = aggregator().featurize(extended);
        let last = batch.entity_history(ENTITY).last().unwrap().feature_vector();

        assert_eq!(online, last, "mismatch with {} history rows", n);
    }

    // the full table is untouched by any of the above
    assert_eq!(table.len(), 70);
}

#[test]
fn test_cold_start_entity() {
    let table = aggregator().featurize(daily(ENTITY, &quantities(40)));
    let request = PredictionRequest::new(start() + Duration::days(40), 99999);

    let features: FeatureVector = OnlineFeatureAssembler::new(&table).assemble(&request);

    assert_eq!(features.lag_28, SENTINEL);
    assert_eq!(features.rmean_28_7, SENTINEL);
    assert_eq!(features.rmean_28_28, SENTINEL);
    assert_eq!(features.entity_id, 99999);
}

#[test]
fn test_short_history_yields_sentinels() {
    let table = aggregator().featurize(daily(ENTITY, &quantities(20)));
    let features = OnlineFeatureAssembler::new(&table).assemble_at(ENTITY, start() + Duration::days(20));

    assert_eq!(features.lag_28, SENTINEL);
    assert_eq!(features.rmean_28_7, SENTINEL);
    assert_eq!(features.rmean_28_28, SENTINEL);
}

#[test]
fn test_repeated_requests_are_idempotent() {
    let table = aggregator().featurize(daily(ENTITY, &quantities(60)));
    let snapshot: HistoricalFeatureTable = table.clone();
    let assembler = OnlineFeatureAssembler::new(&table);
    let date = start() + Duration::days(60);

    let first = assembler.assemble_at(ENTITY, date);
    let second = assembler.assemble_at(ENTITY, date);

    assert_eq!(first, second);
    assert_eq!(table, snapshot);
}

#[test]
fn test_entities_do_not_leak_into_each_other() {
    let mut rows = daily(ENTITY, &quantities(40));
    rows.extend(daily(22423, &vec![100.0; 40]));
    let table = aggregator().featurize(rows);

    assert_eq!(table.n_entities(), 2);
    for row in table.entity_history(22423) {
        assert!(row.lag_28 == SENTINEL || row.lag_28 == 100.0);
    }
    let solo = aggregator().featurize(daily(ENTITY, &quantities(40)));
    assert_eq!(table.entity_history(ENTITY), solo.entity_history(ENTITY));
}

#[test]
fn test_build_from_raw_transactions() {
    let mut records = Vec::new();
    for day in 0..40 {
        records.push(record(&format!("5363{:02}", day), "85123A", 6, 2.55, day));
        records.push(record(&format!("5364{:02}", day), "85123B", 2, 2.55, day));
    }
    // cancellation, sentinel quantity, non-numeric code, price out of range
    records.push(record("C536379", "85123A", 6, 2.55, 3));
    records.push(record("536380", "85123A", 80995, 2.55, 4));
    records.push(record("536381", "POST", 1, 2.55, 5));
    records.push(record("536382", "85123A", 1, 25.0, 6));

    let table = aggregator().build(&records).unwrap();

    assert_eq!(table.n_entities(), 1);
    let history = table.entity_history(ENTITY);
    assert_eq!(history.len(), 40);
    assert!(history.iter().all(|row| row.quantity == 8.0));
    assert!((history[0].revenue - 8.0 * 2.55).abs() < 1e-9);
    assert_eq!(history[28].lag_28, 8.0);
    assert_eq!(history[27].lag_28, SENTINEL);
}
