//! Event-class binning for the mixing pools.

use crate::common::{AnalysisConfig, MixingAxis};
use crate::domain::{AnalysisError, AnalysisResult, CentralityEstimator, EventLike};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Variable-width axis with half-open bins `[edge_i, edge_{i+1})`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableWidthAxis {
    edges: Vec<f64>,
}

impl VariableWidthAxis {
    pub fn new(edges: Vec<f64>) -> AnalysisResult<Self> {
        if edges.len() < 2 {
            return Err(AnalysisError::input_validation(
                "INPUT.CONFIG_BIN_EDGES",
                format!("an axis needs at least two edges, got {}", edges.len()),
            ));
        }
        let increasing = edges
            .windows(2)
            .all(|window| window[0].is_finite() && window[1].is_finite() && window[0] < window[1]);
        if !increasing {
            return Err(AnalysisError::input_validation(
                "INPUT.CONFIG_BIN_EDGES",
                format!("axis edges must be finite and strictly increasing: {:?}", edges),
            ));
        }
        Ok(Self { edges })
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    /// Index of the bin containing `value`; `None` outside the axis or for NaN.
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        let first = *self.edges.first()?;
        let last = *self.edges.last()?;
        if !(value >= first && value < last) {
            return None;
        }
        let upper = self.edges.partition_point(|edge| *edge <= value);
        Some(upper - 1)
    }
}

/// Mixing-pool identifier: `z_index + n_z * secondary_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolBin(pub usize);

impl PoolBin {
    pub const fn index(self) -> usize {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

impl Display for PoolBin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventBinner {
    z_axis: VariableWidthAxis,
    secondary_axis: VariableWidthAxis,
    mixing_axis: MixingAxis,
    estimator: CentralityEstimator,
}

impl EventBinner {
    pub fn new(
        z_edges: Vec<f64>,
        secondary_edges: Vec<f64>,
        mixing_axis: MixingAxis,
        estimator: CentralityEstimator,
    ) -> AnalysisResult<Self> {
        Ok(Self {
            z_axis: VariableWidthAxis::new(z_edges)?,
            secondary_axis: VariableWidthAxis::new(secondary_edges)?,
            mixing_axis,
            estimator,
        })
    }

    pub fn from_config(config: &AnalysisConfig) -> AnalysisResult<Self> {
        Self::new(
            config.bins_z_vtx.clone(),
            config.secondary_bin_edges().to_vec(),
            config.mixing_axis,
            config.centrality_estimator(),
        )
    }

    pub fn pool_count(&self) -> usize {
        self.z_axis.bin_count() * self.secondary_axis.bin_count()
    }

    pub const fn mixing_axis(&self) -> MixingAxis {
        self.mixing_axis
    }

    pub fn bin_for_values(&self, pos_z: f64, secondary: f64) -> Option<PoolBin> {
        let z_index = self.z_axis.find_bin(pos_z)?;
        let secondary_index = self.secondary_axis.find_bin(secondary)?;
        Some(PoolBin(z_index + self.z_axis.bin_count() * secondary_index))
    }

    /// Pool of an event, or `None` when the event falls outside the axes or
    /// lacks the quantity the secondary axis needs.
    pub fn bin_for<E: EventLike>(&self, event: &E) -> Option<PoolBin> {
        let secondary = match self.mixing_axis {
            MixingAxis::Multiplicity => event.multiplicity(),
            MixingAxis::Centrality => event.centrality(self.estimator)?,
        };
        self.bin_for_values(event.pos_z(), secondary)
    }
}
