//! Entity-day aggregation

use super::cleaning::CleanedTransaction;
use crate::timeseries::{CalendarFeatures, EntityId, TimeSeriesTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summed sales of one entity on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub calendar: CalendarFeatures,
    pub entity_id: EntityId,
    pub quantity_sum: f64,
    pub revenue_sum: f64,
}

impl DailyAggregate {
    pub fn new(date: NaiveDate, entity_id: EntityId, quantity_sum: f64, revenue_sum: f64) -> Self {
        Self {
            date,
            calendar: CalendarFeatures::from_date(date),
            entity_id,
            quantity_sum,
            revenue_sum,
        }
    }
}

/// Sum quantity and revenue per `(date, entity)`, ordered by date then entity
pub fn aggregate_daily(transactions: &[CleanedTransaction]) -> Vec<DailyAggregate> {
    let mut sums: BTreeMap<(NaiveDate, EntityId), (f64, f64)> = BTreeMap::new();
    for tx in transactions {
        let entry = sums
            .entry((tx.timestamp.date(), tx.entity_id))
            .or_insert((0.0, 0.0));
        entry.0 += tx.quantity as f64;
        entry.1 += tx.revenue();
    }

    sums.into_iter()
        .map(|((date, entity), (quantity, revenue))| DailyAggregate::new(date, entity, quantity, revenue))
        .collect()
}

/// Partition aggregates by entity, date-sorted within each group
pub fn group_by_entity(daily: Vec<DailyAggregate>) -> TimeSeriesTable<DailyAggregate> {
    let mut table = TimeSeriesTable::from_rows(
        daily
            .into_iter()
            .map(|row| (row.entity_id, row.date, row)),
    );
    table.sort_by_date();
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(entity: EntityId, day: u32, hour: u32, quantity: i64, price: f64) -> CleanedTransaction {
        CleanedTransaction {
            invoice_id: format!("{}{}", day, hour),
            entity_id: entity,
            customer_id: "12345".to_string(),
            description: "JUMBO BAG RED RETROSPOT".to_string(),
            quantity,
            unit_price: price,
            timestamp: NaiveDate::from_ymd_opt(2011, 4, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_sums_per_entity_day() {
        let daily = aggregate_daily(&[
            tx(85099, 5, 9, 10, 2.0),
            tx(85099, 5, 15, 4, 2.5),
            tx(22423, 5, 10, 1, 12.75),
            tx(85099, 6, 9, 3, 2.0),
        ]);

        assert_eq!(daily.len(), 3);
        assert_eq!(daily[0].entity_id, 22423);
        assert_eq!(daily[1].entity_id, 85099);
        assert_eq!(daily[1].quantity_sum, 14.0);
        assert_eq!(daily[1].revenue_sum, 30.0);
        assert_eq!(daily[2].date, NaiveDate::from_ymd_opt(2011, 4, 6).unwrap());
        assert_eq!(daily[2].calendar.weekday, 2);
    }

    #[test]
    fn test_group_by_entity_sorts() {
        let d = |day| NaiveDate::from_ymd_opt(2011, 4, day).unwrap();
        let table = group_by_entity(vec![
            DailyAggregate::new(d(9), 1, 1.0, 1.0),
            DailyAggregate::new(d(2), 1, 2.0, 2.0),
        ]);

        assert!(table.is_date_sorted());
        assert_eq!(table.group(1).unwrap()[0].value.quantity_sum, 2.0);
    }
}
