//! Raw transaction CSV loading

use super::{read_text_csv, text_column};
use crate::aggregation::TransactionRecord;
use crate::error::Result;
use crate::timeseries::CalendarFeaturizer;
use std::path::Path;
use tracing::{info, warn};

/// Load raw sales lines.
///
/// Expects the shop export columns `InvoiceNo, StockCode, Description,
/// Quantity, InvoiceDate, UnitPrice, CustomerID`; other columns are ignored.
/// Files are decoded as lossy UTF-8. Lines whose quantity, price or timestamp
/// cannot be parsed are skipped.
pub fn load_transactions(path: impl AsRef<Path>) -> Result<Vec<TransactionRecord>> {
    let path = path.as_ref();
    let df = read_text_csv(path, true)?;

    let invoices = text_column(&df, "InvoiceNo")?;
    let codes = text_column(&df, "StockCode")?;
    let descriptions = text_column(&df, "Description")?;
    let quantities = text_column(&df, "Quantity")?;
    let timestamps = text_column(&df, "InvoiceDate")?;
    let prices = text_column(&df, "UnitPrice")?;
    let customers = text_column(&df, "CustomerID")?;

    let mut records = Vec::with_capacity(df.height());
    let mut malformed = 0usize;

    for i in 0..df.height() {
        let quantity = quantities[i].as_deref().and_then(|q| q.trim().parse::<i64>().ok());
        let unit_price = prices[i].as_deref().and_then(|p| p.trim().parse::<f64>().ok());
        let timestamp = timestamps[i]
            .as_deref()
            .and_then(|t| CalendarFeaturizer::parse_timestamp(t).ok());

        let (Some(quantity), Some(unit_price), Some(timestamp)) = (quantity, unit_price, timestamp) else {
            malformed += 1;
            continue;
        };

        records.push(TransactionRecord {
            invoice_id: invoices[i].clone().unwrap_or_default(),
            entity_id: codes[i].clone().unwrap_or_default(),
            customer_id: customers[i].clone().filter(|c| !c.trim().is_empty()),
            description: descriptions[i].clone().filter(|d| !d.trim().is_empty()),
            quantity,
            unit_price,
            timestamp,
        });
    }

    if malformed > 0 {
        warn!(path = %path.display(), malformed, "Skipped unparseable transaction lines");
    }
    info!(path = %path.display(), records = records.len(), "Loaded raw transactions");
    Ok(records)
}
