//! Analysis configuration surface.
//!
//! JSON keys follow the configurable names used by the jet-hadron correlation
//! task (`vertexZCut`, `leadingjetptMin`, ...). A configuration is validated
//! once at start-up and treated as immutable afterwards.

use crate::domain::{AnalysisError, AnalysisResult, CentralityEstimator};
use crate::modules::selection::{EventSelectionMask, TrackSelection};
use serde::{Deserialize, Serialize};

/// Secondary axis of the event-mixing pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MixingAxis {
    #[default]
    Multiplicity,
    Centrality,
}

/// How generator-level collisions with several reconstructed collisions are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitCollisionPolicy {
    RejectSplit,
    AcceptSplit,
    FirstRecoCollisionOnly,
}

impl SplitCollisionPolicy {
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::RejectSplit),
            1 => Some(Self::AcceptSplit),
            2 => Some(Self::FirstRecoCollisionOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessSwitches {
    pub collisions: bool,
    pub collisions_weighted: bool,
    pub qc: bool,
    pub qc_weighted: bool,
    pub spectra_data: bool,
    pub spectra_mcd: bool,
    pub spectra_mcd_weighted: bool,
    pub spectra_area_sub_data: bool,
    pub spectra_area_sub_mcd: bool,
    pub jet_hadron: bool,
    pub mix_jet_hadron: bool,
    pub leading_jet_hadron: bool,
    pub mix_leading_jet_hadron: bool,
    pub hf_jet: bool,
    pub spectra_mcp: bool,
    pub spectra_mcp_weighted: bool,
    pub spectra_area_sub_mcp: bool,
    pub mix_leading_jet_hadron_mcp: bool,
}

impl Default for ProcessSwitches {
    fn default() -> Self {
        Self {
            collisions: true,
            collisions_weighted: false,
            qc: false,
            qc_weighted: false,
            spectra_data: false,
            spectra_mcd: false,
            spectra_mcd_weighted: false,
            spectra_area_sub_data: false,
            spectra_area_sub_mcd: false,
            jet_hadron: false,
            mix_jet_hadron: false,
            leading_jet_hadron: false,
            mix_leading_jet_hadron: false,
            hf_jet: false,
            spectra_mcp: false,
            spectra_mcp_weighted: false,
            spectra_area_sub_mcp: false,
            mix_leading_jet_hadron_mcp: false,
        }
    }
}

impl ProcessSwitches {
    /// Same-event leading-jet correlations also run as part of the MCD area-subtracted spectra.
    pub fn runs_leading_jet_hadron(&self) -> bool {
        self.leading_jet_hadron || self.spectra_area_sub_mcd
    }

    pub fn runs_mixed_leading_jet_hadron(&self) -> bool {
        self.mix_leading_jet_hadron || self.spectra_area_sub_mcd
    }

    pub fn uses_detector_mixing(&self) -> bool {
        self.mix_jet_hadron || self.runs_mixed_leading_jet_hadron()
    }

    pub fn uses_particle_mixing(&self) -> bool {
        self.mix_leading_jet_hadron_mcp
    }

    pub fn uses_particle_events(&self) -> bool {
        self.spectra_mcp
            || self.spectra_mcp_weighted
            || self.spectra_area_sub_mcp
            || self.mix_leading_jet_hadron_mcp
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    #[serde(rename = "selectedJetsRadius")]
    pub selected_jets_radius: f64,
    #[serde(rename = "eventSelections")]
    pub event_selections: String,
    #[serde(rename = "vertexZCut")]
    pub vertex_z_cut: f64,
    #[serde(rename = "centralityMin")]
    pub centrality_min: f64,
    #[serde(rename = "centralityMax")]
    pub centrality_max: f64,
    #[serde(rename = "leadingjetptMin")]
    pub leading_jet_pt_min: f64,
    #[serde(rename = "subleadingjetptMin")]
    pub subleading_jet_pt_min: f64,
    #[serde(rename = "trackEtaMin")]
    pub track_eta_min: f64,
    #[serde(rename = "trackEtaMax")]
    pub track_eta_max: f64,
    #[serde(rename = "trackPtMin")]
    pub track_pt_min: f64,
    #[serde(rename = "trackPtMax")]
    pub track_pt_max: f64,
    #[serde(rename = "trackSelections")]
    pub track_selections: String,
    #[serde(rename = "pTHatMaxMCD")]
    pub pt_hat_max_mcd: f64,
    #[serde(rename = "pTHatMaxMCP")]
    pub pt_hat_max_mcp: f64,
    #[serde(rename = "pTHatExponent")]
    pub pt_hat_exponent: f64,
    #[serde(rename = "pTHatAbsoluteMin")]
    pub pt_hat_absolute_min: f64,
    #[serde(rename = "jetEtaMin")]
    pub jet_eta_min: f64,
    #[serde(rename = "jetEtaMax")]
    pub jet_eta_max: f64,
    #[serde(rename = "jetAreaFractionMin")]
    pub jet_area_fraction_min: f64,
    #[serde(rename = "leadingConstituentPtMin")]
    pub leading_constituent_pt_min: f64,
    #[serde(rename = "leadingConstituentPtMax")]
    pub leading_constituent_pt_max: f64,
    #[serde(rename = "trackOccupancyInTimeRangeMin")]
    pub track_occupancy_min: i32,
    #[serde(rename = "trackOccupancyInTimeRangeMax")]
    pub track_occupancy_max: i32,
    #[serde(rename = "acceptSplitCollisions")]
    pub accept_split_collisions: i32,
    #[serde(rename = "skipMBGapEvents")]
    pub skip_mb_gap_events: bool,
    #[serde(rename = "checkLeadConstituentPtForMcpJets")]
    pub check_lead_constituent_pt_for_mcp_jets: bool,
    #[serde(rename = "numberEventsMixed")]
    pub number_events_mixed: usize,
    #[serde(rename = "binsZVtx")]
    pub bins_z_vtx: Vec<f64>,
    #[serde(rename = "binsMultiplicity")]
    pub bins_multiplicity: Vec<f64>,
    #[serde(rename = "binsCentrality")]
    pub bins_centrality: Vec<f64>,
    #[serde(rename = "cfgCentEstimator")]
    pub cent_estimator: i32,
    #[serde(rename = "mixingAxis")]
    pub mixing_axis: MixingAxis,
    pub process: ProcessSwitches,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            selected_jets_radius: 0.4,
            event_selections: "sel8".to_string(),
            vertex_z_cut: 10.0,
            centrality_min: -999.0,
            centrality_max: 999.0,
            leading_jet_pt_min: 20.0,
            subleading_jet_pt_min: 10.0,
            track_eta_min: -0.9,
            track_eta_max: 0.9,
            track_pt_min: 0.15,
            track_pt_max: 100.0,
            track_selections: "globalTracks".to_string(),
            pt_hat_max_mcd: 999.0,
            pt_hat_max_mcp: 999.0,
            pt_hat_exponent: 6.0,
            pt_hat_absolute_min: -99.0,
            jet_eta_min: -0.7,
            jet_eta_max: 0.7,
            jet_area_fraction_min: -99.0,
            leading_constituent_pt_min: -99.0,
            leading_constituent_pt_max: 9999.0,
            track_occupancy_min: -999_999,
            track_occupancy_max: 999_999,
            accept_split_collisions: 0,
            skip_mb_gap_events: false,
            check_lead_constituent_pt_for_mcp_jets: false,
            number_events_mixed: 5,
            bins_z_vtx: vec![-10.0, -2.5, 2.5, 10.0],
            bins_multiplicity: vec![0.0, 15.0, 25.0, 35.0, 50.0],
            bins_centrality: vec![0.0, 10.0, 50.0, 100.0],
            cent_estimator: 0,
            mixing_axis: MixingAxis::Multiplicity,
            process: ProcessSwitches::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> AnalysisResult<()> {
        validate_bin_edges("binsZVtx", &self.bins_z_vtx)?;
        validate_bin_edges("binsMultiplicity", &self.bins_multiplicity)?;
        validate_bin_edges("binsCentrality", &self.bins_centrality)?;

        if self.number_events_mixed < 1 {
            return Err(AnalysisError::input_validation(
                "INPUT.CONFIG_MIXING_DEPTH",
                "numberEventsMixed must be at least 1",
            ));
        }

        if CentralityEstimator::from_code(self.cent_estimator).is_none() {
            return Err(AnalysisError::input_validation(
                "INPUT.CONFIG_CENT_ESTIMATOR",
                format!(
                    "cfgCentEstimator must be 0 (FT0C), 1 (FT0A) or 2 (FT0M), got {}",
                    self.cent_estimator
                ),
            ));
        }

        if SplitCollisionPolicy::from_code(self.accept_split_collisions).is_none() {
            return Err(AnalysisError::input_validation(
                "INPUT.CONFIG_SPLIT_COLLISIONS",
                format!(
                    "acceptSplitCollisions must be 0, 1 or 2, got {}",
                    self.accept_split_collisions
                ),
            ));
        }

        if self.pt_hat_exponent == 0.0 || !self.pt_hat_exponent.is_finite() {
            return Err(AnalysisError::input_validation(
                "INPUT.CONFIG_PTHAT_EXPONENT",
                format!(
                    "pTHatExponent must be finite and non-zero, got {}",
                    self.pt_hat_exponent
                ),
            ));
        }

        EventSelectionMask::parse(&self.event_selections)?;
        TrackSelection::parse(&self.track_selections)?;
        Ok(())
    }

    pub fn centrality_estimator(&self) -> CentralityEstimator {
        CentralityEstimator::from_code(self.cent_estimator).unwrap_or_default()
    }

    pub fn split_collision_policy(&self) -> SplitCollisionPolicy {
        SplitCollisionPolicy::from_code(self.accept_split_collisions)
            .unwrap_or(SplitCollisionPolicy::RejectSplit)
    }

    /// Edges of the secondary mixing axis selected by `mixingAxis`.
    pub fn secondary_bin_edges(&self) -> &[f64] {
        match self.mixing_axis {
            MixingAxis::Multiplicity => &self.bins_multiplicity,
            MixingAxis::Centrality => &self.bins_centrality,
        }
    }

    /// Radius code (R x 100) of jets that enter the single-radius spectra.
    pub fn selected_radius_code(&self) -> i32 {
        (self.selected_jets_radius * 100.0).round() as i32
    }
}

fn validate_bin_edges(name: &str, edges: &[f64]) -> AnalysisResult<()> {
    if edges.len() < 2 {
        return Err(AnalysisError::input_validation(
            "INPUT.CONFIG_BIN_EDGES",
            format!("{} needs at least two edges, got {}", name, edges.len()),
        ));
    }
    if let Some(edge) = edges.iter().find(|edge| !edge.is_finite()) {
        return Err(AnalysisError::input_validation(
            "INPUT.CONFIG_BIN_EDGES",
            format!("{} contains a non-finite edge {}", name, edge),
        ));
    }
    if let Some(window) = edges.windows(2).find(|window| window[0] >= window[1]) {
        return Err(AnalysisError::input_validation(
            "INPUT.CONFIG_BIN_EDGES",
            format!(
                "{} must be strictly increasing ({} is followed by {})",
                name, window[0], window[1]
            ),
        ));
    }
    Ok(())
}
