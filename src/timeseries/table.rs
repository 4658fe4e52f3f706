//! Per-entity ordered series container

use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Entity (stock code) identifier
pub type EntityId = i64;

/// A single dated value inside an entity's series
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<V> {
    pub date: NaiveDate,
    pub value: V,
}

/// Mapping from entity to its ordered sequence of observations.
///
/// Construction keeps the insertion order inside each entity and never mixes
/// rows across entities. Windowed operations assume every group is sorted by
/// date; call [`TimeSeriesTable::sort_by_date`] after building the table from
/// unordered input.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable<V> {
    groups: BTreeMap<EntityId, Vec<Observation<V>>>,
}

impl<V> Default for TimeSeriesTable<V> {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }
}

impl<V> TimeSeriesTable<V> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(entity, date, value)` triples
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (EntityId, NaiveDate, V)>,
    {
        let mut table = Self::new();
        for (entity, date, value) in rows {
            table.push(entity, date, value);
        }
        table
    }

    /// Append an observation to the end of an entity's series
    pub fn push(&mut self, entity: EntityId, date: NaiveDate, value: V) {
        self.groups
            .entry(entity)
            .or_default()
            .push(Observation { date, value });
    }

    /// Stable sort of every group by date
    pub fn sort_by_date(&mut self) {
        for series in self.groups.values_mut() {
            series.sort_by_key(|obs| obs.date);
        }
    }

    /// Whether every group is in non-decreasing date order
    pub fn is_date_sorted(&self) -> bool {
        self.groups
            .values()
            .all(|series| series.windows(2).all(|pair| pair[0].date <= pair[1].date))
    }

    /// Observations recorded for one entity
    pub fn group(&self, entity: EntityId) -> Option<&[Observation<V>]> {
        self.groups.get(&entity).map(|s| s.as_slice())
    }

    /// Entities in ascending order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.groups.keys().copied()
    }

    /// Iterate `(entity, series)` pairs in ascending entity order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &[Observation<V>])> {
        self.groups.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Number of entities
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Total number of observations across all entities
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    /// Flatten into `(entity, observation)` pairs, entity-major
    pub fn into_rows(self) -> impl Iterator<Item = (EntityId, Observation<V>)> {
        self.groups
            .into_iter()
            .flat_map(|(entity, series)| series.into_iter().map(move |obs| (entity, obs)))
    }
}

impl<V: Sync> TimeSeriesTable<V> {
    /// Run a per-group scan and rebuild a table with the same dates.
    ///
    /// Groups are processed independently on the rayon pool and merged back in
    /// entity order. `f` must return one output per input observation.
    pub fn transform<U, F>(&self, f: F) -> TimeSeriesTable<U>
    where
        U: Send,
        F: Fn(EntityId, &[Observation<V>]) -> Vec<U> + Sync,
    {
        debug_assert!(self.is_date_sorted(), "windowed scan over unsorted groups");

        let groups: Vec<(EntityId, Vec<Observation<U>>)> = self
            .groups
            .par_iter()
            .map(|(&entity, series)| {
                let out = f(entity, series);
                debug_assert_eq!(out.len(), series.len());
                let mapped = series
                    .iter()
                    .zip(out)
                    .map(|(obs, value)| Observation { date: obs.date, value })
                    .collect();
                (entity, mapped)
            })
            .collect();

        TimeSeriesTable {
            groups: groups.into_iter().collect(),
        }
    }
}
