//! Jet-hadron correlation filling.
//!
//! The leading-pair path walks a fixed sequence of gates: leading-pair
//! selection, the raw back-to-back requirement, the same requirement on the
//! dijet azimuth wrapped into `[0, 2π)`, and the corrected-pT thresholds.
//! Every stage that is passed leaves its summary metrics in the sink, and
//! only pairs surviving all gates are correlated with hadrons.

pub mod names;

pub use names::{
    JET_HADRON_MIXED, JET_HADRON_SAME, JetHadronMetricNames, LeadingMetricNames,
    MIXED_EVENT_DETECTOR, MIXED_EVENT_PARTICLE, PhysicalCutNames, SAME_EVENT_DETECTOR,
    SAME_EVENT_PARTICLE,
};

use crate::domain::{AnalysisLevel, HadronLike, JetLike};
use crate::modules::binning::PoolBin;
use crate::modules::leading::{LeadingJetSelector, LeadingPair};
use crate::modules::traits::{MetricSink, SelectionPredicates};
use crate::numerics::{PI_HALF, delta_r, sign_flip, wrap_delta_phi, wrap_dijet_delta_phi};

/// Hadrons below this pT also enter the angular-gap buckets.
pub const SOFT_HADRON_PT_MAX: f64 = 2.001;
pub const ETA_GAP_LOW: f64 = 0.5;
pub const ETA_GAP_HIGH: f64 = 1.0;

const STAT_PAIRING: f64 = 1.0;
const STAT_JET_OR_DIJET: f64 = 2.0;
const STAT_ABOVE_THRESHOLD: f64 = 3.0;
const STAT_HADRON: f64 = 4.0;
const STAT_HADRON_ACCEPTED: f64 = 5.0;

/// Where the correlated hadrons come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    SameEvent,
    Mixed(PoolBin),
}

impl Pairing {
    pub const fn pool_bin(self) -> Option<PoolBin> {
        match self {
            Self::SameEvent => None,
            Self::Mixed(bin) => Some(bin),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationOutcome {
    NoLeadingPair,
    NotBackToBack,
    NotBackToBackAfterWrap,
    BelowPtThreshold,
    Correlated {
        hadrons_seen: usize,
        hadrons_accepted: usize,
    },
}

impl CorrelationOutcome {
    pub const fn is_correlated(self) -> bool {
        matches!(self, Self::Correlated { .. })
    }

    /// Whether the pair survived both back-to-back gates.
    pub const fn has_dijet(self) -> bool {
        matches!(self, Self::BelowPtThreshold | Self::Correlated { .. })
    }
}

/// Jets and hadrons entering one leading-pair correlation.
#[derive(Debug, Clone, Copy)]
pub struct LeadingInput<'a, J, H> {
    pub jets: &'a [J],
    /// Hadron table the jets' constituent indices resolve against.
    pub constituents: &'a [H],
    pub rho: f64,
    /// Hadrons correlated with the leading jet.
    pub hadrons: &'a [H],
    pub pairing: Pairing,
    pub weight: f64,
}

/// Per-event geometry of an accepted back-to-back pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DijetGeometry {
    pub raw_delta_phi: f64,
    /// Dijet azimuth in `[0, 2π)`.
    pub delta_phi: f64,
    pub flip: f64,
    pub eta_leading_raw: f64,
    pub eta_subleading_raw: f64,
    pub delta_eta_no_flip: f64,
    /// `flip * eta1 - flip * eta2`, never negative.
    pub delta_eta: f64,
}

impl DijetGeometry {
    fn new<J: JetLike>(pair: &LeadingPair<'_, J>, delta_phi: f64) -> Self {
        let eta_leading_raw = pair.leading.jet.eta();
        let eta_subleading_raw = pair.subleading.jet.eta();
        let flip = sign_flip(eta_leading_raw, eta_subleading_raw);
        Self {
            raw_delta_phi: pair.raw_delta_phi(),
            delta_phi,
            flip,
            eta_leading_raw,
            eta_subleading_raw,
            delta_eta_no_flip: eta_leading_raw - eta_subleading_raw,
            delta_eta: flip * eta_leading_raw - flip * eta_subleading_raw,
        }
    }

    /// Both jets in the forward hemisphere, ordered in η.
    fn same_forward_hemisphere(&self) -> bool {
        self.eta_leading_raw > self.eta_subleading_raw && self.eta_subleading_raw >= 0.0
    }
}

/// Stage counts of a plain jet-hadron correlation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JetHadronTally {
    pub jets_accepted: usize,
    pub jets_above_threshold: usize,
    pub pairs: usize,
    pub pairs_accepted: usize,
}

/// Per-invocation totals of a mixed leading-pair correlation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MixingTally {
    pub mixed_events: u64,
    pub dijets: u64,
    pub dijets_cut: u64,
    pub pairs: u64,
    pub pairs_accepted: u64,
}

impl MixingTally {
    pub fn record(&mut self, outcome: CorrelationOutcome) {
        self.mixed_events += 1;
        if outcome.has_dijet() {
            self.dijets += 1;
        }
        if let CorrelationOutcome::Correlated {
            hadrons_seen,
            hadrons_accepted,
        } = outcome
        {
            self.dijets_cut += 1;
            self.pairs += hadrons_seen as u64;
            self.pairs_accepted += hadrons_accepted as u64;
        }
    }

    /// Fills the totals into bins 6-10 of `name`, weighted by the counts.
    pub fn emit_totals<M: MetricSink>(&self, name: &'static str, sink: &mut M) {
        let totals = [
            self.mixed_events,
            self.dijets,
            self.dijets_cut,
            self.pairs,
            self.pairs_accepted,
        ];
        for (offset, total) in totals.into_iter().enumerate() {
            sink.emit(name, &[6.0 + offset as f64], total as f64);
        }
    }
}

pub struct CorrelationFiller<'s, S> {
    selection: &'s S,
    level: AnalysisLevel,
    leading_jet_pt_min: f64,
    subleading_jet_pt_min: f64,
}

impl<'s, S> CorrelationFiller<'s, S>
where
    S: SelectionPredicates,
{
    pub fn new(
        selection: &'s S,
        level: AnalysisLevel,
        leading_jet_pt_min: f64,
        subleading_jet_pt_min: f64,
    ) -> Self {
        Self {
            selection,
            level,
            leading_jet_pt_min,
            subleading_jet_pt_min,
        }
    }

    pub const fn level(&self) -> AnalysisLevel {
        self.level
    }

    /// Runs the leading-pair state machine for one event or one mixed pairing.
    pub fn correlate_leading<J, H, M>(
        &self,
        names: &LeadingMetricNames,
        input: LeadingInput<'_, J, H>,
        sink: &mut M,
    ) -> CorrelationOutcome
    where
        J: JetLike,
        H: HadronLike,
        M: MetricSink,
    {
        let weight = input.weight;
        let stats = names.event_stats;
        emit_stage(sink, stats, STAT_PAIRING);

        let selector = LeadingJetSelector::new(self.selection, self.level);
        let Some(pair) = selector.select(input.jets, input.constituents, input.rho) else {
            return CorrelationOutcome::NoLeadingPair;
        };

        let raw_delta_phi = pair.raw_delta_phi();
        if raw_delta_phi.abs() < PI_HALF {
            return CorrelationOutcome::NotBackToBack;
        }
        if let Some(name) = names.dijet_dphi {
            sink.emit(name, &[raw_delta_phi], weight);
        }
        let delta_phi = wrap_dijet_delta_phi(raw_delta_phi);
        if delta_phi.abs() < PI_HALF {
            return CorrelationOutcome::NotBackToBackAfterWrap;
        }
        emit_stage(sink, stats, STAT_JET_OR_DIJET);

        let geometry = DijetGeometry::new(&pair, delta_phi);
        let pt_leading = pair.leading.pt_corr;
        let pt_subleading = pair.subleading.pt_corr;

        if let Some(name) = names.pair_counts {
            sink.emit(name, &[1.0], 1.0);
        }
        if let Some(name) = names.lead_pt {
            sink.emit(name, &[pair.leading.jet.pt()], weight);
        }
        if let Some(name) = names.sublead_pt {
            sink.emit(name, &[pair.subleading.jet.pt()], weight);
        }
        sink.emit(names.lead_corrpt, &[pt_leading], weight);
        sink.emit(names.sublead_corrpt, &[pt_subleading], weight);

        if !(pt_leading > self.leading_jet_pt_min && pt_subleading > self.subleading_jet_pt_min) {
            return CorrelationOutcome::BelowPtThreshold;
        }
        emit_stage(sink, stats, STAT_ABOVE_THRESHOLD);

        sink.emit(names.pair_counts_cut, &[names.pair_counts_cut_value], 1.0);
        sink.emit(names.lead_eta, &[geometry.eta_leading_raw], weight);
        sink.emit(names.sublead_eta, &[geometry.eta_subleading_raw], weight);
        if let Some(name) = names.lead_phi {
            sink.emit(name, &[pair.leading.jet.phi()], weight);
        }
        if let Some(name) = names.sublead_phi {
            sink.emit(name, &[pair.subleading.jet.phi()], weight);
        }
        sink.emit(
            names.dijet_detanoflip_dphi,
            &[geometry.delta_eta_no_flip, geometry.delta_phi],
            weight,
        );
        sink.emit(
            names.dijet_deta_dphi,
            &[geometry.delta_eta, geometry.delta_phi],
            weight,
        );
        sink.emit(
            names.dijet_asymmetry,
            &[pt_subleading, pair.momentum_balance()],
            weight,
        );

        let leading_phi = pair.leading.jet.phi();
        let mut hadrons_seen = 0;
        let mut hadrons_accepted = 0;
        for hadron in input.hadrons {
            hadrons_seen += 1;
            emit_stage(sink, stats, STAT_HADRON);
            if !self.selection.select_hadron(hadron) {
                continue;
            }
            hadrons_accepted += 1;
            emit_stage(sink, stats, STAT_HADRON_ACCEPTED);

            let detatot = hadron.eta() - geometry.eta_leading_raw;
            let deta = geometry.flip * detatot;
            let dphi = wrap_delta_phi(hadron.phi() - leading_phi);

            sink.emit(names.jeth_detatot, &[detatot], weight);
            sink.emit(names.jeth_deta, &[deta], weight);
            sink.emit(names.jeth_dphi, &[dphi], weight);
            sink.emit(names.jeth_detatot_dphi, &[detatot, dphi], weight);
            sink.emit(names.jeth_deta_dphi, &[deta, dphi], weight);

            let mut tuple = [
                pt_leading,
                pt_subleading,
                hadron.pt(),
                detatot,
                geometry.delta_eta,
                deta,
                dphi,
                0.0,
            ];
            let dimension = match input.pairing.pool_bin() {
                Some(bin) => {
                    tuple[7] = bin.as_f64();
                    8
                }
                None => 7,
            };
            sink.emit(names.correlations, &tuple[..dimension], weight);

            if let Some(cuts) = names.physical_cuts {
                if hadron.pt() < SOFT_HADRON_PT_MAX {
                    fill_physical_cuts(&cuts, &geometry, deta, dphi, weight, sink);
                }
            }
        }

        CorrelationOutcome::Correlated {
            hadrons_seen,
            hadrons_accepted,
        }
    }

    /// Correlates every accepted jet above `subleadingjetptMin` with the hadrons.
    ///
    /// Mixed pairings additionally count the pairing itself in bin 1 of the
    /// stage counter.
    #[allow(clippy::too_many_arguments)]
    pub fn correlate_jets<J, H, M>(
        &self,
        names: &JetHadronMetricNames,
        jets: &[J],
        constituents: &[H],
        rho: f64,
        hadrons: &[H],
        pairing: Pairing,
        sink: &mut M,
    ) -> JetHadronTally
    where
        J: JetLike,
        H: HadronLike,
        M: MetricSink,
    {
        let mut tally = JetHadronTally::default();
        if matches!(pairing, Pairing::Mixed(_)) {
            sink.emit(names.event_stats, &[STAT_PAIRING], 1.0);
        }

        for jet in jets {
            if !self.selection.is_in_eta_acceptance(jet)
                || !self.selection.is_accepted_jet(jet, constituents, self.level)
            {
                continue;
            }
            tally.jets_accepted += 1;
            sink.emit(names.event_stats, &[STAT_JET_OR_DIJET], 1.0);

            let pt_corr = jet.corrected_pt(rho);
            if !(pt_corr >= self.subleading_jet_pt_min) {
                continue;
            }
            tally.jets_above_threshold += 1;
            sink.emit(names.event_stats, &[STAT_ABOVE_THRESHOLD], 1.0);

            for hadron in hadrons {
                tally.pairs += 1;
                sink.emit(names.event_stats, &[STAT_HADRON], 1.0);
                if !self.selection.select_hadron(hadron) {
                    continue;
                }
                tally.pairs_accepted += 1;
                sink.emit(names.event_stats, &[STAT_HADRON_ACCEPTED], 1.0);

                let deta = hadron.eta() - jet.eta();
                let dphi = wrap_delta_phi(hadron.phi() - jet.phi());
                sink.emit(
                    names.correlations,
                    &[pt_corr, hadron.pt(), deta, dphi, delta_r(deta, dphi)],
                    1.0,
                );
            }
        }
        tally
    }
}

fn emit_stage<M: MetricSink>(sink: &mut M, name: Option<&'static str>, bin: f64) {
    if let Some(name) = name {
        sink.emit(name, &[bin], 1.0);
    }
}

fn fill_physical_cuts<M: MetricSink>(
    cuts: &PhysicalCutNames,
    geometry: &DijetGeometry,
    deta: f64,
    dphi: f64,
    weight: f64,
    sink: &mut M,
) {
    let gap = geometry.delta_eta.abs();
    let bucket = if gap >= ETA_GAP_HIGH {
        cuts.up
    } else if gap >= ETA_GAP_LOW {
        cuts.md
    } else {
        cuts.dw
    };
    sink.emit(bucket, &[deta, dphi], weight);

    if let Some((up, dw)) = cuts.hemisphere {
        if geometry.same_forward_hemisphere() {
            let name = if gap >= ETA_GAP_LOW { up } else { dw };
            sink.emit(name, &[deta, dphi], weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CorrelationFiller, CorrelationOutcome, JET_HADRON_MIXED, JET_HADRON_SAME, LeadingInput,
        MIXED_EVENT_DETECTOR, MixingTally, Pairing, SAME_EVENT_DETECTOR, SAME_EVENT_PARTICLE,
    };
    use crate::common::AnalysisConfig;
    use crate::domain::{AnalysisLevel, Jet, Particle, Track};
    use crate::modules::binning::PoolBin;
    use crate::modules::registry::RecordingSink;
    use crate::modules::selection::{ConfiguredSelection, TRACK_GLOBAL};
    use crate::numerics::wrap_delta_phi;
    use std::f64::consts::PI;

    fn selection() -> ConfiguredSelection {
        ConfiguredSelection::from_config(&AnalysisConfig::default()).expect("defaults")
    }

    fn detector_input<'a>(
        jets: &'a [Jet],
        tracks: &'a [Track],
        pairing: Pairing,
    ) -> LeadingInput<'a, Jet, Track> {
        LeadingInput {
            jets,
            constituents: tracks,
            rho: 0.0,
            hadrons: tracks,
            pairing,
            weight: 1.0,
        }
    }

    #[test]
    fn back_to_back_pair_correlates_selected_hadrons() {
        let select = selection();
        let filler = CorrelationFiller::new(&select, AnalysisLevel::Detector, 20.0, 10.0);
        let jets = vec![
            Jet::new(50.0, 0.0, 0.5, 0.4),
            Jet::new(30.0, 0.3, 0.5 + PI, 0.4),
        ];
        let tracks = vec![
            Track::new(5.0, 0.1, 1.0, TRACK_GLOBAL),
            Track::new(1.0, -0.2, 5.0, TRACK_GLOBAL),
            Track::new(1.0, 0.2, 5.0, 0),
        ];
        let mut sink = RecordingSink::new();
        let outcome = filler.correlate_leading(
            &SAME_EVENT_DETECTOR,
            detector_input(&jets, &tracks, Pairing::SameEvent),
            &mut sink,
        );

        assert_eq!(
            outcome,
            CorrelationOutcome::Correlated {
                hadrons_seen: 3,
                hadrons_accepted: 2
            }
        );
        assert_eq!(sink.count("h_dijet_pair_counts"), 1);
        assert_eq!(sink.values_of("h_dijet_pair_counts_cut"), vec![vec![2.0]]);

        let tuples = sink.values_of("thn_jethadron_correlations");
        assert_eq!(tuples.len(), 2);
        let first = &tuples[0];
        assert_eq!(first.len(), 7);
        assert_eq!(&first[..3], &[50.0, 30.0, 5.0]);
        assert!((first[3] - 0.1).abs() < 1e-12);
        assert!((first[4] - 0.3).abs() < 1e-12);
        assert!((first[5] + 0.1).abs() < 1e-12);
        assert!((first[6] - wrap_delta_phi(0.5)).abs() < 1e-12);

        assert_eq!(sink.count("h2_jeth_physicalcutsdw_deta_dphi"), 1);
        assert_eq!(sink.count("h2_jeth_physicalcutsmd_deta_dphi"), 0);
    }

    #[test]
    fn near_side_pair_stops_before_pair_metrics() {
        let select = selection();
        let filler = CorrelationFiller::new(&select, AnalysisLevel::Detector, 20.0, 10.0);
        let jets = vec![Jet::new(50.0, 0.0, 1.0, 0.4), Jet::new(30.0, 0.1, 1.3, 0.4)];
        let tracks = vec![Track::new(5.0, 0.1, 1.0, TRACK_GLOBAL)];
        let mut sink = RecordingSink::new();
        let outcome = filler.correlate_leading(
            &SAME_EVENT_DETECTOR,
            detector_input(&jets, &tracks, Pairing::SameEvent),
            &mut sink,
        );
        assert_eq!(outcome, CorrelationOutcome::NotBackToBack);
        assert_eq!(sink.count("h_dijet_dphi"), 0);
        assert_eq!(sink.count("h_dijet_pair_counts"), 0);
        assert_eq!(sink.count("thn_jethadron_correlations"), 0);
    }

    #[test]
    fn wrapped_gate_rejects_large_negative_separation() {
        let select = selection();
        let filler = CorrelationFiller::new(&select, AnalysisLevel::Detector, 20.0, 10.0);
        let jets = vec![Jet::new(50.0, 0.0, 0.2, 0.4), Jet::new(30.0, 0.1, 6.0, 0.4)];
        let mut sink = RecordingSink::new();
        let outcome = filler.correlate_leading(
            &SAME_EVENT_DETECTOR,
            detector_input(&jets, &[], Pairing::SameEvent),
            &mut sink,
        );
        assert_eq!(outcome, CorrelationOutcome::NotBackToBackAfterWrap);
        assert_eq!(sink.count("h_dijet_dphi"), 1);
        assert_eq!(sink.count("h_dijet_pair_counts"), 0);
    }

    #[test]
    fn pt_thresholds_are_strict() {
        let select = selection();
        let filler = CorrelationFiller::new(&select, AnalysisLevel::Detector, 20.0, 10.0);
        let jets = vec![Jet::new(20.0, 0.0, 0.0, 0.4), Jet::new(15.0, 0.1, PI, 0.4)];
        let mut sink = RecordingSink::new();
        let outcome = filler.correlate_leading(
            &SAME_EVENT_DETECTOR,
            detector_input(&jets, &[], Pairing::SameEvent),
            &mut sink,
        );
        assert_eq!(outcome, CorrelationOutcome::BelowPtThreshold);
        assert_eq!(sink.count("h_leadjet_corrpt"), 1);
        assert_eq!(sink.count("h_dijet_pair_counts_cut"), 0);
    }

    #[test]
    fn particle_level_fills_hemisphere_buckets() {
        let select = selection();
        let filler = CorrelationFiller::new(&select, AnalysisLevel::Particle, 20.0, 10.0);
        let jets = vec![Jet::new(50.0, 0.6, 0.0, 0.4), Jet::new(30.0, 0.05, PI, 0.4)];
        let particles = vec![Particle::new(1.0, 0.0, 0.1), Particle::new(3.0, 0.0, 0.1)];
        let mut sink = RecordingSink::new();
        let outcome = filler.correlate_leading(
            &SAME_EVENT_PARTICLE,
            LeadingInput {
                jets: &jets,
                constituents: &particles,
                rho: 0.0,
                hadrons: &particles,
                pairing: Pairing::SameEvent,
                weight: 1.0,
            },
            &mut sink,
        );
        assert!(outcome.is_correlated());
        assert_eq!(sink.count("thn_jethadron_correlations_part"), 2);
        assert_eq!(sink.count("h2_jeth_physicalcutsmd_deta_dphi_part"), 1);
        assert_eq!(sink.count("h2_jeth_physicalcutsHup_deta_dphi_part"), 1);
        assert_eq!(sink.count("h2_jeth_physicalcutsHdw_deta_dphi_part"), 0);
    }

    #[test]
    fn mixed_pairings_tag_pool_and_count_stages() {
        let select = selection();
        let filler = CorrelationFiller::new(&select, AnalysisLevel::Detector, 20.0, 10.0);
        let jets = vec![Jet::new(50.0, 0.2, 0.0, 0.4), Jet::new(30.0, 0.5, PI, 0.4)];
        let tracks = vec![Track::new(3.0, 0.4, 0.3, TRACK_GLOBAL)];
        let mut sink = RecordingSink::new();
        let outcome = filler.correlate_leading(
            &MIXED_EVENT_DETECTOR,
            detector_input(&jets, &tracks, Pairing::Mixed(PoolBin(4))),
            &mut sink,
        );

        let tuples = sink.values_of("thn_mixjethadron");
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0][7], 4.0);
        assert!((tuples[0][5] - (-1.0 * (0.4 - 0.2))).abs() < 1e-12);
        assert_eq!(
            sink.values_of("h_mix_event_stats"),
            vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0], vec![5.0]]
        );

        let mut tally = MixingTally::default();
        tally.record(outcome);
        tally.record(CorrelationOutcome::NotBackToBack);
        tally.record(CorrelationOutcome::BelowPtThreshold);
        sink.clear();
        tally.emit_totals("h_mix_event_stats", &mut sink);
        let weights: Vec<f64> = sink.emissions().iter().map(|emission| emission.weight).collect();
        assert_eq!(weights, vec![3.0, 2.0, 1.0, 1.0, 1.0]);
        assert_eq!(sink.values_of("h_mix_event_stats")[0], vec![6.0]);
    }

    #[test]
    fn plain_jet_hadron_uses_corrected_pt_threshold() {
        let select = selection();
        let filler = CorrelationFiller::new(&select, AnalysisLevel::Detector, 20.0, 10.0);
        let jets = vec![Jet::new(12.0, 0.0, 1.0, 0.5), Jet::new(40.0, 0.0, 1.0, 0.5)];
        let tracks = vec![
            Track::new(2.0, 0.3, 1.4, TRACK_GLOBAL),
            Track::new(2.0, 0.3, 1.4, 0),
        ];
        let mut sink = RecordingSink::new();
        let tally = filler.correlate_jets(
            &JET_HADRON_SAME,
            &jets,
            &tracks,
            6.0,
            &tracks,
            Pairing::SameEvent,
            &mut sink,
        );
        assert_eq!(tally.jets_accepted, 2);
        assert_eq!(tally.jets_above_threshold, 1);
        assert_eq!(tally.pairs, 2);
        assert_eq!(tally.pairs_accepted, 1);

        let tuples = sink.values_of("thn_jeth_correlations");
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0][0], 37.0);
        assert!((tuples[0][4] - 0.5).abs() < 1e-12);

        sink.clear();
        filler.correlate_jets(
            &JET_HADRON_MIXED,
            &jets,
            &tracks,
            6.0,
            &tracks,
            Pairing::Mixed(PoolBin(0)),
            &mut sink,
        );
        assert_eq!(sink.values_of("h_mixjeth_event_stats")[0], vec![1.0]);
    }
}
