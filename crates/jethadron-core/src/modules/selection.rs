//! Configured event, track and jet predicates.

use crate::common::AnalysisConfig;
use crate::domain::{
    AnalysisError, AnalysisLevel, AnalysisResult, CentralityEstimator, Collision, EventLike,
    HadronLike, JetLike,
};
use crate::modules::traits::SelectionPredicates;
use std::f64::consts::PI;

pub const SEL_7: u32 = 1 << 0;
pub const SEL_8: u32 = 1 << 1;
pub const SEL_NO_SAME_BUNCH_PILEUP: u32 = 1 << 2;
pub const SEL_IS_GOOD_ZVTX_FT0_VS_PV: u32 = 1 << 3;
pub const SEL_NO_COLL_IN_TIME_RANGE_STANDARD: u32 = 1 << 4;
pub const SEL_NO_COLL_IN_ROF_STANDARD: u32 = 1 << 5;
pub const SEL_TVX: u32 = 1 << 6;
pub const SEL_NO_TIME_FRAME_BORDER: u32 = 1 << 7;
pub const SEL_NO_ITS_ROF_FRAME_BORDER: u32 = 1 << 8;

pub const TRACK_GLOBAL: u32 = 1 << 0;
pub const TRACK_QUALITY: u32 = 1 << 1;
pub const TRACK_QUALITY_WDCA: u32 = 1 << 2;
pub const TRACK_HYBRID: u32 = 1 << 3;
pub const TRACK_UNIFORM: u32 = 1 << 4;

const AREA_CUT_DISABLED_BELOW: f64 = -98.0;
const CONSTITUENT_MIN_DISABLED_BELOW: f64 = -98.0;
const CONSTITUENT_MAX_DISABLED_ABOVE: f64 = 9998.0;
const JET_ETA_FROM_TRACKS_BELOW: f64 = -98.0;

/// Event-selection bits every accepted collision must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventSelectionMask(u32);

impl EventSelectionMask {
    /// Parses a `+`-joined list of named selections, e.g. `sel8+selMC`.
    pub fn parse(selections: &str) -> AnalysisResult<Self> {
        let mut mask = 0_u32;
        for name in selections.split('+').map(str::trim) {
            mask |= named_event_selection(name).ok_or_else(|| {
                AnalysisError::input_validation(
                    "INPUT.CONFIG_EVENT_SELECTION",
                    format!("unknown event selection '{}' in '{}'", name, selections),
                )
            })?;
        }
        Ok(Self(mask))
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn matches(self, bits: u32) -> bool {
        bits & self.0 == self.0
    }
}

fn named_event_selection(name: &str) -> Option<u32> {
    let bits = match name {
        "sel7" => SEL_7,
        "sel8" => SEL_8,
        "sel8Full" => SEL_8 | SEL_NO_SAME_BUNCH_PILEUP | SEL_IS_GOOD_ZVTX_FT0_VS_PV,
        "sel8FullPbPb" => {
            SEL_8 | SEL_NO_COLL_IN_TIME_RANGE_STANDARD | SEL_NO_COLL_IN_ROF_STANDARD
        }
        "selMC" => SEL_TVX | SEL_NO_TIME_FRAME_BORDER,
        "selMCFull" => SEL_TVX | SEL_NO_TIME_FRAME_BORDER | SEL_NO_ITS_ROF_FRAME_BORDER,
        "selUnanchoredMC" => SEL_TVX,
        _ => return None,
    };
    Some(bits)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackSelection {
    GlobalTracks,
    QualityTracks,
    QualityTracksWdca,
    HybridTracks,
    UniformTracks,
    None,
}

impl TrackSelection {
    pub fn parse(name: &str) -> AnalysisResult<Self> {
        match name.trim() {
            "globalTracks" => Ok(Self::GlobalTracks),
            "QualityTracks" => Ok(Self::QualityTracks),
            "QualityTracksWDCA" => Ok(Self::QualityTracksWdca),
            "hybridTracks" => Ok(Self::HybridTracks),
            "uniformTracks" => Ok(Self::UniformTracks),
            "none" => Ok(Self::None),
            other => Err(AnalysisError::input_validation(
                "INPUT.CONFIG_TRACK_SELECTION",
                format!("unknown track selection '{}'", other),
            )),
        }
    }

    pub const fn required_bit(self) -> Option<u32> {
        match self {
            Self::GlobalTracks => Some(TRACK_GLOBAL),
            Self::QualityTracks => Some(TRACK_QUALITY),
            Self::QualityTracksWdca => Some(TRACK_QUALITY_WDCA),
            Self::HybridTracks => Some(TRACK_HYBRID),
            Self::UniformTracks => Some(TRACK_UNIFORM),
            Self::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfiguredSelection {
    event_mask: EventSelectionMask,
    track_selection: TrackSelection,
    skip_mb_gap_events: bool,
    vertex_z_cut: f64,
    centrality_min: f64,
    centrality_max: f64,
    estimator: CentralityEstimator,
    occupancy_min: i32,
    occupancy_max: i32,
    track_pt_min: f64,
    track_pt_max: f64,
    track_eta_min: f64,
    track_eta_max: f64,
    jet_eta_min: f64,
    jet_eta_max: f64,
    jet_area_fraction_min: f64,
    leading_constituent_pt_min: f64,
    leading_constituent_pt_max: f64,
    check_lead_constituent_pt_for_mcp_jets: bool,
}

impl ConfiguredSelection {
    pub fn from_config(config: &AnalysisConfig) -> AnalysisResult<Self> {
        Ok(Self {
            event_mask: EventSelectionMask::parse(&config.event_selections)?,
            track_selection: TrackSelection::parse(&config.track_selections)?,
            skip_mb_gap_events: config.skip_mb_gap_events,
            vertex_z_cut: config.vertex_z_cut,
            centrality_min: config.centrality_min,
            centrality_max: config.centrality_max,
            estimator: config.centrality_estimator(),
            occupancy_min: config.track_occupancy_min,
            occupancy_max: config.track_occupancy_max,
            track_pt_min: config.track_pt_min,
            track_pt_max: config.track_pt_max,
            track_eta_min: config.track_eta_min,
            track_eta_max: config.track_eta_max,
            jet_eta_min: config.jet_eta_min,
            jet_eta_max: config.jet_eta_max,
            jet_area_fraction_min: config.jet_area_fraction_min,
            leading_constituent_pt_min: config.leading_constituent_pt_min,
            leading_constituent_pt_max: config.leading_constituent_pt_max,
            check_lead_constituent_pt_for_mcp_jets: config
                .check_lead_constituent_pt_for_mcp_jets,
        })
    }

    pub const fn event_mask(&self) -> EventSelectionMask {
        self.event_mask
    }

    pub const fn track_selection(&self) -> TrackSelection {
        self.track_selection
    }

    pub const fn estimator(&self) -> CentralityEstimator {
        self.estimator
    }

    pub const fn vertex_z_cut(&self) -> f64 {
        self.vertex_z_cut
    }

    /// Strict centrality window used by the particle-level acceptance stages.
    pub fn in_open_centrality_window(&self, centrality: f64) -> bool {
        self.centrality_min < centrality && centrality < self.centrality_max
    }

    /// Strict occupancy window used by the particle-level acceptance stages.
    pub fn in_open_occupancy_window(&self, occupancy: i32) -> bool {
        self.occupancy_min < occupancy && occupancy < self.occupancy_max
    }

    /// Jet-level acceptance shared by every jet loop: η window, area and
    /// leading-constituent cuts.
    pub fn accepts_jet<J: JetLike, H: HadronLike>(
        &self,
        jet: &J,
        hadrons: &[H],
        level: AnalysisLevel,
    ) -> bool {
        self.is_in_eta_acceptance(jet) && self.is_accepted_jet(jet, hadrons, level)
    }
}

impl SelectionPredicates for ConfiguredSelection {
    fn is_good_collision(&self, collision: &Collision) -> bool {
        if self.skip_mb_gap_events && collision.mb_gap {
            return false;
        }
        self.event_mask.matches(collision.selection_bits)
    }

    fn passes_event_cuts<E: EventLike>(&self, event: &E) -> bool {
        if !(event.pos_z().abs() < self.vertex_z_cut) {
            return false;
        }
        match event.centrality(self.estimator) {
            Some(centrality) => {
                centrality >= self.centrality_min && centrality < self.centrality_max
            }
            None => true,
        }
    }

    fn passes_occupancy(&self, collision: &Collision) -> bool {
        collision.occupancy >= self.occupancy_min && collision.occupancy <= self.occupancy_max
    }

    fn select_hadron<H: HadronLike>(&self, hadron: &H) -> bool {
        let Some(bits) = hadron.selection_bits() else {
            return true;
        };
        let pt = hadron.pt();
        let eta = hadron.eta();
        if !(pt >= self.track_pt_min && pt < self.track_pt_max) {
            return false;
        }
        if !(eta > self.track_eta_min && eta < self.track_eta_max) {
            return false;
        }
        match self.track_selection.required_bit() {
            Some(bit) => bits & bit != 0,
            None => true,
        }
    }

    fn is_in_eta_acceptance<J: JetLike>(&self, jet: &J) -> bool {
        let eta = jet.eta();
        if self.jet_eta_min < JET_ETA_FROM_TRACKS_BELOW {
            let radius = jet.radius();
            eta >= self.track_eta_min + radius && eta <= self.track_eta_max - radius
        } else {
            eta >= self.jet_eta_min && eta <= self.jet_eta_max
        }
    }

    fn is_accepted_jet<J: JetLike, H: HadronLike>(
        &self,
        jet: &J,
        hadrons: &[H],
        level: AnalysisLevel,
    ) -> bool {
        if self.jet_area_fraction_min > AREA_CUT_DISABLED_BELOW {
            let radius = jet.radius();
            if jet.area() < self.jet_area_fraction_min * PI * radius * radius {
                return false;
            }
        }

        let check_min = self.leading_constituent_pt_min > CONSTITUENT_MIN_DISABLED_BELOW;
        let check_max = self.leading_constituent_pt_max < CONSTITUENT_MAX_DISABLED_ABOVE;
        if !check_min && !check_max {
            return true;
        }
        if level == AnalysisLevel::Particle && !self.check_lead_constituent_pt_for_mcp_jets {
            return true;
        }

        let mut has_min_constituent = !check_min;
        let mut below_max = true;
        for constituent in jet
            .constituent_indices()
            .iter()
            .filter_map(|&index| hadrons.get(index))
        {
            let pt = constituent.pt();
            if check_min && pt >= self.leading_constituent_pt_min {
                has_min_constituent = true;
            }
            if check_max && pt > self.leading_constituent_pt_max {
                below_max = false;
            }
        }
        has_min_constituent && below_max
    }
}
