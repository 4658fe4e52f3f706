//! Prediction input and output contracts

use crate::error::{ForecastError, Result};
use crate::timeseries::{CalendarFeaturizer, EntityId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DATE_FIELD: &str = "Date";
const STOCK_CODE_FIELD: &str = "StockCode";

/// A single forecast request
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub date: NaiveDate,
    pub stock_code: EntityId,
    /// Remaining input fields, passed through untouched
    pub extra: Map<String, Value>,
}

impl PredictionRequest {
    pub fn new(date: NaiveDate, stock_code: EntityId) -> Self {
        Self {
            date,
            stock_code,
            extra: Map::new(),
        }
    }

    /// Validate a JSON record carrying at least `Date` and `StockCode`
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(mut fields) = value else {
            return Err(ForecastError::InvalidInput(
                "request body must be a JSON object".to_string(),
            ));
        };

        let date = match fields.remove(DATE_FIELD) {
            Some(Value::String(raw)) => CalendarFeaturizer::parse_date(&raw)?,
            Some(other) => {
                return Err(ForecastError::InvalidInput(format!(
                    "{} must be an ISO-8601 date string, got {}",
                    DATE_FIELD, other
                )))
            }
            None => return Err(ForecastError::InvalidInput(format!("missing {}", DATE_FIELD))),
        };

        let stock_code = match fields.remove(STOCK_CODE_FIELD) {
            Some(value) => parse_stock_code(&value)?,
            None => {
                return Err(ForecastError::InvalidInput(format!(
                    "missing {}",
                    STOCK_CODE_FIELD
                )))
            }
        };

        Ok(Self {
            date,
            stock_code,
            extra: fields,
        })
    }
}

fn parse_stock_code(value: &Value) -> Result<EntityId> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        ForecastError::InvalidInput(format!(
            "{} must be an integer, got {}",
            STOCK_CODE_FIELD, value
        ))
    })
}

/// Forecast returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(rename = "Quantity")]
    pub quantity: f64,
    pub model_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_request() {
        let request = PredictionRequest::from_json(json!({
            "Date": "2011-12-10",
            "StockCode": 85123,
            "Country": "United Kingdom"
        }))
        .unwrap();

        assert_eq!(request.date, NaiveDate::from_ymd_opt(2011, 12, 10).unwrap());
        assert_eq!(request.stock_code, 85123);
        assert_eq!(request.extra["Country"], json!("United Kingdom"));
        assert!(!request.extra.contains_key("Date"));
    }

    #[test]
    fn test_numeric_string_stock_code() {
        let request = PredictionRequest::from_json(json!({"Date": "2011-12-10", "StockCode": "22423"})).unwrap();
        assert_eq!(request.stock_code, 22423);
    }

    #[test]
    fn test_invalid_requests() {
        for body in [
            json!({"StockCode": 85123}),
            json!({"Date": "2011-12-10"}),
            json!({"Date": "yesterday", "StockCode": 85123}),
            json!({"Date": 20111210, "StockCode": 85123}),
            json!({"Date": "2011-12-10", "StockCode": "85123A"}),
            json!({"Date": "2011-12-10", "StockCode": 1.5}),
            json!([1, 2]),
        ] {
            let err = PredictionRequest::from_json(body.clone()).unwrap_err();
            assert!(matches!(err, ForecastError::InvalidInput(_)), "{}", body);
        }
    }

    #[test]
    fn test_response_field_names() {
        let response = PredictionResponse {
            quantity: 4.5,
            model_version: "v1".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"Quantity": 4.5, "model_version": "v1"}));
    }
}
