//! Metric sinks: a summarising histogram registry and an append-only recorder.

use crate::modules::traits::MetricSink;
use serde::Serialize;
use std::collections::BTreeMap;

/// Running moments of one named metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricAccumulator {
    pub dimension: usize,
    pub entries: u64,
    pub sum_weights: f64,
    pub sum_weights_squared: f64,
    /// Per-axis sums of `weight * value`.
    pub weighted_sums: Vec<f64>,
}

impl MetricAccumulator {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: 0,
            sum_weights: 0.0,
            sum_weights_squared: 0.0,
            weighted_sums: vec![0.0; dimension],
        }
    }

    fn fill(&mut self, values: &[f64], weight: f64) {
        self.entries += 1;
        self.sum_weights += weight;
        self.sum_weights_squared += weight * weight;
        for (sum, value) in self.weighted_sums.iter_mut().zip(values) {
            *sum += weight * value;
        }
    }

    /// Weighted mean along `axis`, if any weight was accumulated.
    pub fn mean(&self, axis: usize) -> Option<f64> {
        if self.sum_weights == 0.0 {
            return None;
        }
        self.weighted_sums
            .get(axis)
            .map(|sum| sum / self.sum_weights)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramRegistry {
    metrics: BTreeMap<&'static str, MetricAccumulator>,
    shape_mismatches: u64,
    unregistered_emissions: u64,
}

impl HistogramRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&MetricAccumulator> {
        self.metrics.get(name)
    }

    pub fn entries(&self, name: &str) -> u64 {
        self.get(name).map_or(0, |metric| metric.entries)
    }

    pub fn sum_weights(&self, name: &str) -> f64 {
        self.get(name).map_or(0.0, |metric| metric.sum_weights)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.metrics.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub const fn shape_mismatches(&self) -> u64 {
        self.shape_mismatches
    }

    pub const fn unregistered_emissions(&self) -> u64 {
        self.unregistered_emissions
    }
}

impl MetricSink for HistogramRegistry {
    fn register(&mut self, name: &'static str, dimension: usize) {
        self.metrics
            .entry(name)
            .or_insert_with(|| MetricAccumulator::new(dimension));
    }

    fn emit(&mut self, name: &'static str, values: &[f64], weight: f64) {
        let metric = self.metrics.entry(name).or_insert_with(|| {
            self.unregistered_emissions += 1;
            MetricAccumulator::new(values.len())
        });
        if metric.dimension != values.len() {
            self.shape_mismatches += 1;
            return;
        }
        metric.fill(values, weight);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Emission {
    pub name: &'static str,
    pub values: Vec<f64>,
    pub weight: f64,
}

/// Keeps every emission in order; used by fixtures and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSink {
    registered: BTreeMap<&'static str, usize>,
    emissions: Vec<Emission>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emissions(&self) -> &[Emission] {
        &self.emissions
    }

    pub fn registered(&self) -> &BTreeMap<&'static str, usize> {
        &self.registered
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Emission> + 'a {
        self.emissions
            .iter()
            .filter(move |emission| emission.name == name)
    }

    pub fn count(&self, name: &str) -> usize {
        self.named(name).count()
    }

    pub fn values_of(&self, name: &str) -> Vec<Vec<f64>> {
        self.named(name)
            .map(|emission| emission.values.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.emissions.clear();
    }
}

impl MetricSink for RecordingSink {
    fn register(&mut self, name: &'static str, dimension: usize) {
        self.registered.insert(name, dimension);
    }

    fn emit(&mut self, name: &'static str, values: &[f64], weight: f64) {
        self.emissions.push(Emission {
            name,
            values: values.to_vec(),
            weight,
        });
    }
}
