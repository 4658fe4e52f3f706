//! Raw transaction cleaning

use super::config::CleaningRules;
use crate::timeseries::EntityId;
use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A raw sales line as exported by the shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub invoice_id: String,
    pub entity_id: String,
    pub customer_id: Option<String>,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub timestamp: NaiveDateTime,
}

/// A transaction that passed every cleaning predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedTransaction {
    pub invoice_id: String,
    pub entity_id: EntityId,
    pub customer_id: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub timestamp: NaiveDateTime,
}

impl CleanedTransaction {
    pub fn revenue(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// Applies [`CleaningRules`] to raw transactions; failing rows are dropped
#[derive(Debug, Clone, Default)]
pub struct TransactionCleaner {
    rules: CleaningRules,
}

impl TransactionCleaner {
    pub fn new(rules: CleaningRules) -> Self {
        Self { rules }
    }

    /// Clean a batch, keeping input order
    pub fn clean(&self, records: &[TransactionRecord]) -> Vec<CleanedTransaction> {
        let cleaned: Vec<CleanedTransaction> = records
            .par_iter()
            .filter_map(|record| self.clean_record(record))
            .collect();

        info!(
            input = records.len(),
            kept = cleaned.len(),
            dropped = records.len() - cleaned.len(),
            "Cleaned raw transactions"
        );
        cleaned
    }

    /// Returns `None` when any predicate fails
    pub fn clean_record(&self, record: &TransactionRecord) -> Option<CleanedTransaction> {
        let rules = &self.rules;

        let customer_id = non_empty(record.customer_id.as_deref())?;
        let description = non_empty(record.description.as_deref())?;

        if record.invoice_id.starts_with(rules.cancellation_prefix) {
            return None;
        }
        if record.quantity == rules.sentinel_quantity {
            return None;
        }

        let entity_id = self.reduce_stock_code(&record.entity_id)?;

        if count_uppercase(description) <= rules.min_description_uppercase {
            return None;
        }
        if !(record.unit_price > rules.min_unit_price && record.unit_price < rules.max_unit_price) {
            return None;
        }
        if record.quantity >= rules.max_quantity {
            return None;
        }

        Some(CleanedTransaction {
            invoice_id: record.invoice_id.clone(),
            entity_id,
            customer_id: customer_id.to_string(),
            description: description.to_string(),
            quantity: record.quantity,
            unit_price: record.unit_price,
            timestamp: record.timestamp,
        })
    }

    /// Numeric entity id of a stock code.
    ///
    /// The code must hold exactly `stock_code_digits` digits; its prefix of
    /// that length is the id (so `85123A` becomes `85123`).
    pub fn reduce_stock_code(&self, code: &str) -> Option<EntityId> {
        let digits = self.rules.stock_code_digits;
        let code = code.trim();
        if code.chars().filter(char::is_ascii_digit).count() != digits {
            return None;
        }
        let prefix: String = code.chars().take(digits).collect();
        if !prefix.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        prefix.parse().ok()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn count_uppercase(text: &str) -> usize {
    text.chars().filter(|c| c.is_uppercase()).count()
}
