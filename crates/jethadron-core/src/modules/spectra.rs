//! Collision, track and jet spectra that accompany the correlations.

use crate::common::{AnalysisConfig, SplitCollisionPolicy};
use crate::domain::{
    AnalysisLevel, CentralityEstimator, Collision, D0Candidate, HadronLike, JetLike, Kinematics,
    McCollision,
};
use crate::modules::selection::ConfiguredSelection;
use crate::modules::traits::{MetricSink, SelectionPredicates};
use crate::numerics::{pt_hat, wrap_delta_phi};

const PT_CUT_SCAN_STEPS: u32 = 20;
const PT_CUT_SCAN_STEP: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JetSpectrumNames {
    pub pt: &'static str,
    pub eta: &'static str,
    pub phi: &'static str,
    pub area: &'static str,
    pub ntracks: &'static str,
    pub pt_vs_constituent_pt: &'static str,
}

impl JetSpectrumNames {
    pub fn shapes(&self) -> [(&'static str, usize); 6] {
        [
            (self.pt, 1),
            (self.eta, 1),
            (self.phi, 1),
            (self.area, 1),
            (self.ntracks, 1),
            (self.pt_vs_constituent_pt, 2),
        ]
    }
}

pub const DETECTOR_JET_SPECTRA: JetSpectrumNames = JetSpectrumNames {
    pt: "h_jet_pt",
    eta: "h_jet_eta",
    phi: "h_jet_phi",
    area: "h_jet_area",
    ntracks: "h_jet_ntracks",
    pt_vs_constituent_pt: "h2_jet_pt_track_pt",
};

pub const PARTICLE_JET_SPECTRA: JetSpectrumNames = JetSpectrumNames {
    pt: "h_jet_pt_part",
    eta: "h_jet_eta_part",
    phi: "h_jet_phi_part",
    area: "h_jet_area_part",
    ntracks: "h_jet_ntracks_part",
    pt_vs_constituent_pt: "h2_jet_pt_part_track_pt_part",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaSubtractedNames {
    pub pt: &'static str,
    pub eta: &'static str,
    pub phi: &'static str,
    pub area: &'static str,
    pub ntracks: &'static str,
}

impl AreaSubtractedNames {
    pub fn shapes(&self) -> [(&'static str, usize); 5] {
        [
            (self.pt, 1),
            (self.eta, 1),
            (self.phi, 1),
            (self.area, 1),
            (self.ntracks, 1),
        ]
    }
}

pub const DETECTOR_AREA_SUBTRACTED: AreaSubtractedNames = AreaSubtractedNames {
    pt: "h_jet_pt_rhoareasubtracted",
    eta: "h_jet_eta_rhoareasubtracted",
    phi: "h_jet_phi_rhoareasubtracted",
    area: "h_jet_area_rhoareasubtracted",
    ntracks: "h_jet_ntracks_rhoareasubtracted",
};

pub const PARTICLE_AREA_SUBTRACTED: AreaSubtractedNames = AreaSubtractedNames {
    pt: "h_jet_pt_part_rhoareasubtracted",
    eta: "h_jet_eta_part_rhoareasubtracted",
    phi: "h_jet_phi_part_rhoareasubtracted",
    area: "h_jet_area_part_rhoareasubtracted",
    ntracks: "h_jet_ntracks_part_rhoareasubtracted",
};

pub const COLLISION_SHAPES: [(&str, usize); 4] = [
    ("h_collisions", 1),
    ("h2_centrality_occupancy", 2),
    ("h_collisions_Zvertex", 1),
    ("h_collisions_multFT0M", 1),
];

pub const WEIGHTED_COLLISION_SHAPES: [(&str, usize); 5] = [
    ("h_collisions", 1),
    ("h_fakecollisions", 1),
    ("h_collisions_weighted", 1),
    ("h2_centrality_occupancy", 2),
    ("h_collisions_Zvertex", 1),
];

pub const TRACK_QC_SHAPES: [(&str, usize); 2] = [("h_track_pt", 1), ("h2_track_eta_track_phi", 2)];

pub const WEIGHTED_MCD_SHAPES: [(&str, usize); 2] = [("h_jet_phat", 1), ("h_jet_phat_weighted", 1)];

pub const WEIGHTED_MCP_SHAPES: [(&str, usize); 3] = [
    ("h_mcColl_counts_weight", 1),
    ("h2_jet_ptcut_part", 2),
    ("h_jet_phat_part_weighted", 1),
];

pub const MCP_COLLISION_SHAPES: [(&str, usize); 3] =
    [("h_mcColl_counts", 1), ("h_mc_zvertex", 1), ("h_mc_mult", 1)];

pub const AREA_SUB_MCP_COLLISION_SHAPES: [(&str, usize); 3] = [
    ("h_mcColl_counts_areasub", 1),
    ("h_mcColl_rho", 1),
    ("h_mcColl_centrality", 1),
];

pub const D0_JET_SHAPES: [(&str, usize); 9] = [
    ("h_d0jet_pt", 1),
    ("h_d0jet_corrpt", 1),
    ("h_d0jet_eta", 1),
    ("h_d0jet_phi", 1),
    ("h_d0_mass", 1),
    ("h_d0_pt", 1),
    ("h_d0_eta", 1),
    ("h_d0_phi", 1),
    ("h2_d0jet_detadphi", 2),
];

/// Furthest stage a reconstructed collision reached in the collision counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CollisionStage {
    Seen,
    Selected,
    OccupancyAccepted,
}

/// Stage sequence applied to a generator-level collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McAcceptanceMode {
    /// Vertex, associated collision, selection, centrality and occupancy.
    Spectra,
    /// Vertex, associated collision and selection, with weighted counters.
    Weighted,
    /// Full sequence including the split-collision policy.
    AreaSubtracted,
}

impl McAcceptanceMode {
    const fn counter_name(self) -> &'static str {
        match self {
            Self::Spectra | Self::Weighted => "h_mcColl_counts",
            Self::AreaSubtracted => "h_mcColl_counts_areasub",
        }
    }
}

/// Generator-level collision that passed every acceptance stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McAcceptance {
    /// Centrality of the last associated collision inspected.
    pub centrality: Option<f64>,
}

/// Weighted-MC hard-scale settings and the radius of the single-radius spectra.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectraFiller<'s> {
    selection: &'s ConfiguredSelection,
    selected_radius_code: i32,
    pt_hat_max_mcd: f64,
    pt_hat_max_mcp: f64,
    pt_hat_exponent: f64,
    pt_hat_absolute_min: f64,
    split_policy: SplitCollisionPolicy,
    estimator: CentralityEstimator,
}

impl<'s> SpectraFiller<'s> {
    pub fn new(selection: &'s ConfiguredSelection, config: &AnalysisConfig) -> Self {
        Self {
            selection,
            selected_radius_code: config.selected_radius_code(),
            pt_hat_max_mcd: config.pt_hat_max_mcd,
            pt_hat_max_mcp: config.pt_hat_max_mcp,
            pt_hat_exponent: config.pt_hat_exponent,
            pt_hat_absolute_min: config.pt_hat_absolute_min,
            split_policy: config.split_collision_policy(),
            estimator: config.centrality_estimator(),
        }
    }

    pub fn pt_hat(&self, weight: f64) -> f64 {
        pt_hat(weight, self.pt_hat_exponent)
    }

    /// `true` when a jet is an outlier relative to the event's hard scale.
    pub fn is_pt_hat_outlier<J: JetLike>(
        &self,
        jet: &J,
        weight: f64,
        level: AnalysisLevel,
    ) -> bool {
        let scale = self.pt_hat(weight);
        let max_fraction = match level {
            AnalysisLevel::Detector => self.pt_hat_max_mcd,
            AnalysisLevel::Particle => self.pt_hat_max_mcp,
        };
        jet.pt() > max_fraction * scale || scale < self.pt_hat_absolute_min
    }

    fn has_selected_radius<J: JetLike>(&self, jet: &J) -> bool {
        jet.radius_code() == self.selected_radius_code
    }

    /// Collision counters of the unweighted and weighted collision QC.
    pub fn fill_collision<M: MetricSink>(
        &self,
        collision: &Collision,
        weighted: bool,
        sink: &mut M,
    ) -> CollisionStage {
        let weight = if weighted { collision.weight } else { 1.0 };
        let count = |sink: &mut M, bin: f64| {
            sink.emit("h_collisions", &[bin], 1.0);
            if weighted {
                sink.emit("h_collisions_weighted", &[bin], weight);
            }
        };

        if weighted && !collision.has_mc_collision {
            sink.emit("h_fakecollisions", &[0.5], 1.0);
        }
        count(&mut *sink, 0.5);
        if !self.selection.is_good_collision(collision) {
            return CollisionStage::Seen;
        }
        count(&mut *sink, 1.5);
        if !self.selection.passes_occupancy(collision) {
            return CollisionStage::Selected;
        }
        count(&mut *sink, 2.5);

        sink.emit(
            "h2_centrality_occupancy",
            &[
                collision.centrality_for(self.estimator),
                f64::from(collision.occupancy),
            ],
            1.0,
        );
        sink.emit("h_collisions_Zvertex", &[collision.pos_z], weight);
        if !weighted {
            sink.emit("h_collisions_multFT0M", &[collision.mult_ft0m], 1.0);
        }
        CollisionStage::OccupancyAccepted
    }

    pub fn fill_track<H: HadronLike, M: MetricSink>(&self, track: &H, weight: f64, sink: &mut M) {
        sink.emit("h_track_pt", &[track.pt()], weight);
        sink.emit("h2_track_eta_track_phi", &[track.eta(), track.phi()], weight);
    }

    /// Raw jet spectra; returns `false` when the jet is rejected as a hard-scale outlier.
    pub fn fill_jet<J, H, M>(
        &self,
        names: &JetSpectrumNames,
        jet: &J,
        constituents: &[H],
        weight: f64,
        level: AnalysisLevel,
        sink: &mut M,
    ) -> bool
    where
        J: JetLike,
        H: HadronLike,
        M: MetricSink,
    {
        if self.is_pt_hat_outlier(jet, weight, level) {
            return false;
        }
        if self.has_selected_radius(jet) {
            sink.emit(names.pt, &[jet.pt()], weight);
            sink.emit(names.eta, &[jet.eta()], weight);
            sink.emit(names.phi, &[jet.phi()], weight);
            sink.emit(names.area, &[jet.area()], weight);
            sink.emit(
                names.ntracks,
                &[jet.constituent_indices().len() as f64],
                weight,
            );
        }
        for constituent in jet
            .constituent_indices()
            .iter()
            .filter_map(|&index| constituents.get(index))
        {
            sink.emit(
                names.pt_vs_constituent_pt,
                &[jet.pt(), constituent.pt()],
                weight,
            );
        }
        true
    }

    /// Spectra after `rho * area` subtraction; η, φ, area and multiplicity
    /// only for jets left with positive momentum.
    pub fn fill_area_subtracted<J, M>(
        &self,
        names: &AreaSubtractedNames,
        jet: &J,
        rho: f64,
        weight: f64,
        level: AnalysisLevel,
        sink: &mut M,
    ) -> bool
    where
        J: JetLike,
        M: MetricSink,
    {
        if self.is_pt_hat_outlier(jet, weight, level) {
            return false;
        }
        if !self.has_selected_radius(jet) {
            return true;
        }
        let pt_corr = jet.corrected_pt(rho);
        sink.emit(names.pt, &[pt_corr], weight);
        if pt_corr > 0.0 {
            sink.emit(names.eta, &[jet.eta()], weight);
            sink.emit(names.phi, &[jet.phi()], weight);
            sink.emit(names.area, &[jet.area()], weight);
            sink.emit(
                names.ntracks,
                &[jet.constituent_indices().len() as f64],
                weight,
            );
        }
        true
    }

    /// Weighted detector-level spectra. The first outlier jet ends the event;
    /// returns the number of jets filled.
    pub fn fill_weighted_detector_jets<J, H, M>(
        &self,
        collision: &Collision,
        jets: &[J],
        tracks: &[H],
        sink: &mut M,
    ) -> usize
    where
        J: JetLike,
        H: HadronLike,
        M: MetricSink,
    {
        let mut filled = 0;
        for jet in jets {
            if !self
                .selection
                .accepts_jet(jet, tracks, AnalysisLevel::Detector)
            {
                continue;
            }
            let jet_weight = jet.event_weight().unwrap_or(collision.weight);
            let scale = self.pt_hat(jet_weight);
            if jet.pt() > self.pt_hat_max_mcd * scale {
                break;
            }
            sink.emit("h_jet_phat", &[scale], 1.0);
            sink.emit("h_jet_phat_weighted", &[scale], jet_weight);
            if self.fill_jet(
                &DETECTOR_JET_SPECTRA,
                jet,
                tracks,
                jet_weight,
                AnalysisLevel::Detector,
                sink,
            ) {
                filled += 1;
            }
        }
        filled
    }

    /// Weighted particle-level spectra with the `N * 0.25` hard-scale fraction scan.
    pub fn fill_weighted_particle_jets<J, H, M>(
        &self,
        mc_collision: &McCollision,
        jets: &[J],
        particles: &[H],
        sink: &mut M,
    ) -> usize
    where
        J: JetLike,
        H: HadronLike,
        M: MetricSink,
    {
        let mut filled = 0;
        for jet in jets {
            if !self
                .selection
                .accepts_jet(jet, particles, AnalysisLevel::Particle)
            {
                continue;
            }
            let jet_weight = jet.event_weight().unwrap_or(mc_collision.weight);
            let scale = self.pt_hat(jet_weight);
            if self.has_selected_radius(jet) {
                for step in 1..=PT_CUT_SCAN_STEPS {
                    let fraction = f64::from(step) * PT_CUT_SCAN_STEP;
                    if jet.pt() < fraction * scale {
                        sink.emit("h2_jet_ptcut_part", &[jet.pt(), fraction], jet_weight);
                    }
                }
            }
            sink.emit("h_jet_phat_part_weighted", &[scale], jet_weight);
            if self.fill_jet(
                &PARTICLE_JET_SPECTRA,
                jet,
                particles,
                jet_weight,
                AnalysisLevel::Particle,
                sink,
            ) {
                filled += 1;
            }
        }
        filled
    }

    /// Staged acceptance of a generator-level collision through its
    /// associated reconstructed collisions.
    pub fn accept_mc_collision<M: MetricSink>(
        &self,
        mc_collision: &McCollision,
        mode: McAcceptanceMode,
        sink: &mut M,
    ) -> Option<McAcceptance> {
        let counter = mode.counter_name();
        let weighted = mode == McAcceptanceMode::Weighted;
        let weight = mc_collision.weight;
        let mut stage = 0.5;
        let mut pass = |sink: &mut M| {
            sink.emit(counter, &[stage], 1.0);
            if weighted {
                sink.emit("h_mcColl_counts_weight", &[stage], weight);
            }
            stage += 1.0;
        };

        pass(&mut *sink);
        if mc_collision.pos_z.abs() > self.selection.vertex_z_cut() {
            return None;
        }
        pass(&mut *sink);
        let collisions = &mc_collision.collisions;
        if collisions.is_empty() {
            return None;
        }
        pass(&mut *sink);

        let inspected: &[Collision] = if mode == McAcceptanceMode::AreaSubtracted {
            match self.split_policy {
                SplitCollisionPolicy::RejectSplit if collisions.len() > 1 => return None,
                SplitCollisionPolicy::FirstRecoCollisionOnly => &collisions[..1],
                _ => collisions,
            }
        } else {
            collisions
        };
        if mode == McAcceptanceMode::AreaSubtracted {
            pass(&mut *sink);
        }

        if !inspected
            .iter()
            .any(|collision| self.selection.is_good_collision(collision))
        {
            return None;
        }
        pass(&mut *sink);

        let centrality = inspected
            .last()
            .map(|collision| collision.centrality_for(self.estimator));
        if mode == McAcceptanceMode::Weighted {
            return Some(McAcceptance { centrality });
        }

        if !inspected.iter().any(|collision| {
            self.selection
                .in_open_centrality_window(collision.centrality_for(self.estimator))
        }) {
            return None;
        }
        pass(&mut *sink);
        if !inspected
            .iter()
            .any(|collision| self.selection.in_open_occupancy_window(collision.occupancy))
        {
            return None;
        }
        pass(&mut *sink);

        match mode {
            McAcceptanceMode::AreaSubtracted => {
                sink.emit("h_mcColl_rho", &[mc_collision.rho], 1.0);
                if let Some(centrality) = centrality {
                    sink.emit("h_mcColl_centrality", &[centrality], 1.0);
                }
            }
            _ => {
                sink.emit("h_mc_zvertex", &[mc_collision.pos_z], 1.0);
                sink.emit("h_mc_mult", &[mc_collision.mult_ft0a], 1.0);
            }
        }
        Some(McAcceptance { centrality })
    }

    /// D0-candidate and jet kinematics plus every (candidate, jet) angular difference.
    pub fn fill_d0_jets<J, M>(
        &self,
        collision: &Collision,
        jets: &[J],
        candidates: &[D0Candidate],
        sink: &mut M,
    ) where
        J: JetLike,
        M: MetricSink,
    {
        for jet in jets {
            if !self.selection.is_in_eta_acceptance(jet) {
                continue;
            }
            sink.emit("h_d0jet_pt", &[jet.pt()], 1.0);
            sink.emit("h_d0jet_corrpt", &[jet.corrected_pt(collision.rho)], 1.0);
            sink.emit("h_d0jet_eta", &[jet.eta()], 1.0);
            sink.emit("h_d0jet_phi", &[jet.phi()], 1.0);
        }
        for candidate in candidates {
            sink.emit("h_d0_mass", &[candidate.mass], 1.0);
            sink.emit("h_d0_pt", &[candidate.pt()], 1.0);
            sink.emit("h_d0_eta", &[candidate.eta()], 1.0);
            sink.emit("h_d0_phi", &[candidate.phi()], 1.0);
            for jet in jets {
                let deta = candidate.eta() - jet.eta();
                let dphi = wrap_delta_phi(candidate.phi() - jet.phi());
                sink.emit("h2_d0jet_detadphi", &[deta, dphi], 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CollisionStage, DETECTOR_AREA_SUBTRACTED, DETECTOR_JET_SPECTRA, McAcceptanceMode,
        SpectraFiller,
    };
    use crate::common::AnalysisConfig;
    use crate::domain::{AnalysisLevel, Collision, D0Candidate, Jet, McCollision, Track};
    use crate::modules::registry::RecordingSink;
    use crate::modules::selection::{ConfiguredSelection, SEL_8, TRACK_GLOBAL};
    use std::f64::consts::PI;

    fn selection(config: &AnalysisConfig) -> ConfiguredSelection {
        ConfiguredSelection::from_config(config).expect("valid selection")
    }

    fn good_collision(id: u64) -> Collision {
        let mut collision = Collision::new(id, 0.0);
        collision.selection_bits = SEL_8;
        collision
    }

    #[test]
    fn collision_counters_follow_stages() {
        let config = AnalysisConfig {
            track_occupancy_max: 10,
            ..AnalysisConfig::default()
        };
        let select = selection(&config);
        let filler = SpectraFiller::new(&select, &config);
        let mut sink = RecordingSink::new();

        let mut bad = Collision::new(1, 0.0);
        bad.has_mc_collision = false;
        assert_eq!(filler.fill_collision(&bad, true, &mut sink), CollisionStage::Seen);
        assert_eq!(sink.count("h_fakecollisions"), 1);

        let mut busy = good_collision(2);
        busy.occupancy = 11;
        assert_eq!(
            filler.fill_collision(&busy, false, &mut sink),
            CollisionStage::Selected
        );

        let quiet = good_collision(3);
        assert_eq!(
            filler.fill_collision(&quiet, false, &mut sink),
            CollisionStage::OccupancyAccepted
        );
        assert_eq!(
            sink.values_of("h_collisions"),
            vec![vec![0.5], vec![0.5], vec![1.5], vec![0.5], vec![1.5], vec![2.5]]
        );
        assert_eq!(sink.count("h_collisions_weighted"), 1);
        assert_eq!(sink.count("h_collisions_multFT0M"), 1);
    }

    #[test]
    fn jet_spectra_only_fill_selected_radius_but_always_constituents() {
        let config = AnalysisConfig::default();
        let select = selection(&config);
        let filler = SpectraFiller::new(&select, &config);
        let tracks = vec![Track::new(3.0, 0.0, 0.0, TRACK_GLOBAL)];
        let mut sink = RecordingSink::new();

        let r02 = Jet::new(30.0, 0.1, 1.0, 0.1)
            .with_radius_code(20)
            .with_constituents(vec![0, 5]);
        assert!(filler.fill_jet(
            &DETECTOR_JET_SPECTRA,
            &r02,
            &tracks,
            1.0,
            AnalysisLevel::Detector,
            &mut sink
        ));
        assert_eq!(sink.count("h_jet_pt"), 0);
        assert_eq!(sink.values_of("h2_jet_pt_track_pt"), vec![vec![30.0, 3.0]]);

        let r04 = Jet::new(30.0, 0.1, 1.0, 0.5).with_constituents(vec![0]);
        filler.fill_jet(
            &DETECTOR_JET_SPECTRA,
            &r04,
            &tracks,
            1.0,
            AnalysisLevel::Detector,
            &mut sink,
        );
        assert_eq!(sink.values_of("h_jet_ntracks"), vec![vec![1.0]]);
    }

    #[test]
    fn area_subtracted_spectra_need_positive_corrected_pt() {
        let config = AnalysisConfig::default();
        let select = selection(&config);
        let filler = SpectraFiller::new(&select, &config);
        let mut sink = RecordingSink::new();

        let jet = Jet::new(10.0, 0.1, 1.0, 0.5);
        filler.fill_area_subtracted(
            &DETECTOR_AREA_SUBTRACTED,
            &jet,
            30.0,
            1.0,
            AnalysisLevel::Detector,
            &mut sink,
        );
        assert_eq!(sink.values_of("h_jet_pt_rhoareasubtracted"), vec![vec![-5.0]]);
        assert_eq!(sink.count("h_jet_eta_rhoareasubtracted"), 0);

        filler.fill_area_subtracted(
            &DETECTOR_AREA_SUBTRACTED,
            &jet,
            10.0,
            1.0,
            AnalysisLevel::Detector,
            &mut sink,
        );
        assert_eq!(sink.count("h_jet_eta_rhoareasubtracted"), 1);
    }

    #[test]
    fn weighted_detector_spectra_stop_at_first_outlier() {
        let config = AnalysisConfig {
            pt_hat_max_mcd: 2.0,
            ..AnalysisConfig::default()
        };
        let select = selection(&config);
        let filler = SpectraFiller::new(&select, &config);
        let collision = good_collision(1);
        let jets = vec![
            Jet::new(15.0, 0.0, 0.0, 0.5).with_event_weight(1.0),
            Jet::new(25.0, 0.0, 0.0, 0.5).with_event_weight(1.0),
            Jet::new(5.0, 0.0, 0.0, 0.5).with_event_weight(1.0),
        ];
        let tracks: Vec<Track> = Vec::new();
        let mut sink = RecordingSink::new();
        let filled = filler.fill_weighted_detector_jets(&collision, &jets, &tracks, &mut sink);
        assert_eq!(filled, 1);
        assert_eq!(sink.values_of("h_jet_phat"), vec![vec![10.0]]);
    }

    #[test]
    fn weighted_particle_spectra_scan_hard_scale_fractions() {
        let config = AnalysisConfig::default();
        let select = selection(&config);
        let filler = SpectraFiller::new(&select, &config);
        let mc = McCollision::new(1, 0.0);
        let jets = vec![Jet::new(12.0, 0.0, 0.0, 0.5)];
        let particles = Vec::<crate::domain::Particle>::new();
        let mut sink = RecordingSink::new();
        filler.fill_weighted_particle_jets(&mc, &jets, &particles, &mut sink);

        let fractions: Vec<f64> = sink
            .values_of("h2_jet_ptcut_part")
            .into_iter()
            .map(|values| values[1])
            .collect();
        assert_eq!(fractions.len(), 16);
        assert_eq!(fractions[0], 1.25);
        assert_eq!(sink.count("h_jet_pt_part"), 1);
    }

    #[test]
    fn mc_collision_acceptance_applies_split_policy() {
        let mut config = AnalysisConfig::default();
        let select = selection(&config);
        let filler = SpectraFiller::new(&select, &config);
        let mut mc = McCollision::new(1, 1.0);
        mc.collisions = vec![Collision::new(10, 1.0), good_collision(11)];

        let mut sink = RecordingSink::new();
        assert!(
            filler
                .accept_mc_collision(&mc, McAcceptanceMode::AreaSubtracted, &mut sink)
                .is_none()
        );
        assert_eq!(
            sink.values_of("h_mcColl_counts_areasub"),
            vec![vec![0.5], vec![1.5], vec![2.5]]
        );

        config.accept_split_collisions = 1;
        let filler = SpectraFiller::new(&select, &config);
        sink.clear();
        let accepted = filler
            .accept_mc_collision(&mc, McAcceptanceMode::AreaSubtracted, &mut sink)
            .expect("split collisions accepted");
        assert_eq!(accepted.centrality, Some(0.0));
        assert_eq!(sink.count("h_mcColl_counts_areasub"), 7);
        assert_eq!(sink.count("h_mcColl_rho"), 1);

        config.accept_split_collisions = 2;
        let filler = SpectraFiller::new(&select, &config);
        sink.clear();
        assert!(
            filler
                .accept_mc_collision(&mc, McAcceptanceMode::AreaSubtracted, &mut sink)
                .is_none()
        );
        assert_eq!(sink.count("h_mcColl_counts_areasub"), 4);
    }

    #[test]
    fn weighted_mc_acceptance_stops_after_selection() {
        let config = AnalysisConfig::default();
        let select = selection(&config);
        let filler = SpectraFiller::new(&select, &config);
        let mut mc = McCollision::new(1, 1.0);
        mc.weight = 0.25;
        mc.collisions = vec![good_collision(5)];
        let mut sink = RecordingSink::new();
        filler
            .accept_mc_collision(&mc, McAcceptanceMode::Weighted, &mut sink)
            .expect("accepted");
        assert_eq!(sink.count("h_mcColl_counts"), 4);
        let weights: Vec<f64> = sink
            .named("h_mcColl_counts_weight")
            .map(|emission| emission.weight)
            .collect();
        assert_eq!(weights, vec![0.25; 4]);
        assert_eq!(sink.count("h_mc_zvertex"), 0);
    }

    #[test]
    fn d0_candidates_pair_with_every_jet() {
        let config = AnalysisConfig::default();
        let select = selection(&config);
        let filler = SpectraFiller::new(&select, &config);
        let collision = good_collision(1);
        let jets = vec![Jet::new(20.0, 0.1, 0.0, 0.4), Jet::new(20.0, 0.95, PI, 0.4)];
        let candidates = vec![D0Candidate {
            pt: 5.0,
            eta: 0.2,
            phi: 0.3,
            mass: 1.86,
        }];
        let mut sink = RecordingSink::new();
        filler.fill_d0_jets(&collision, &jets, &candidates, &mut sink);
        assert_eq!(sink.count("h_d0jet_pt"), 1);
        assert_eq!(sink.count("h_d0_mass"), 1);
        assert_eq!(sink.count("h2_d0jet_detadphi"), 2);
    }
}
