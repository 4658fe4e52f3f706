//! Integration test: CSV loading and persistence

use sales_forecast::aggregation::{AggregatorConfig, HistoricalAggregator};
use sales_forecast::features::SENTINEL;
use sales_forecast::storage::{load_transactions, CsvHistoryStore, HistoryStore};
use sales_forecast::timeseries::TrainValSplit;
use sales_forecast::ForecastError;
use std::io::Write;
use std::path::PathBuf;

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sales-forecast-storage-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_raw(dir: &PathBuf, days: u32) -> PathBuf {
    let path = dir.join("data.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country").unwrap();
    for day in 0..days {
        let month = 1 + day / 28;
        let dom = 1 + day % 28;
        writeln!(
            file,
            "5363{:02},85123A,WHITE HANGING HEART T-LIGHT HOLDER,{},{}/{}/2011 8:26,2.55,17850,United Kingdom",
            day,
            4 + day % 3,
            month,
            dom
        )
        .unwrap();
    }
    // unparseable quantity, missing customer
    writeln!(file, "536999,85123A,WHITE HANGING HEART T-LIGHT HOLDER,lots,1/5/2011 8:26,2.55,17850,United Kingdom").unwrap();
    writeln!(file, "536998,85123A,WHITE HANGING HEART T-LIGHT HOLDER,3,1/6/2011 8:26,2.55,,United Kingdom").unwrap();
    path
}

#[test]
fn test_prepare_save_load_split() {
    let dir = temp_dir();
    let raw = write_raw(&dir, 56);

    let records = load_transactions(&raw).unwrap();
    assert_eq!(records.len(), 57);
    assert!(records.iter().any(|r| r.customer_id.is_none()));

    let table = HistoricalAggregator::new(AggregatorConfig::default().without_trim())
        .build(&records)
        .unwrap();
    assert_eq!(table.len(), 56);

    let store = CsvHistoryStore::new(dir.join("out").join("historical_data.csv"));
    store.save(&table).unwrap();
    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), table.len());
    for (a, b) in loaded.rows().iter().zip(table.rows()) {
        assert_eq!(a.date, b.date);
        assert_eq!(a.entity_id, b.entity_id);
        assert_eq!(a.quantity, b.quantity);
        assert!((a.revenue - b.revenue).abs() < 1e-9);
        assert_eq!(a.lag_28 == SENTINEL, b.lag_28 == SENTINEL);
    }

    let split = TrainValSplit::from_table(&loaded, 28).unwrap();
    assert_eq!(split.train.n_rows() + split.validation.n_rows(), 56);
    assert_eq!(split.validation.n_rows(), 28);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_load_missing_history_is_unavailable() {
    let dir = temp_dir();
    let err = CsvHistoryStore::new(dir.join("absent.csv")).load().unwrap_err();
    assert!(matches!(err, ForecastError::DataUnavailable(_)));
    std::fs::remove_dir_all(&dir).ok();
}
