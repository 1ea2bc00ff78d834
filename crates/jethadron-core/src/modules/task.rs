//! Event-stream driver of the charged jet-hadron analysis.
//!
//! Each record is routed through the fills its process switches enable.
//! Detector-level collisions must pass the vertex and centrality window
//! before any fill other than the weighted collision and track QC; the
//! event selection and occupancy window gate everything after the
//! unweighted collision counters. Mixed pairings are generated from the
//! pool an event falls in *before* that event is added to it.

use crate::common::{AnalysisConfig, ProcessSwitches};
use crate::domain::{
    AnalysisLevel, AnalysisResult, Collision, DetectorEvent, EventRecord, Jet, JetLike, McCollision,
    Particle, ParticleEvent, Track,
};
use crate::modules::binning::EventBinner;
use crate::modules::correlation::{
    CorrelationFiller, JET_HADRON_MIXED, JET_HADRON_SAME, LeadingInput, MIXED_EVENT_DETECTOR,
    MIXED_EVENT_PARTICLE, MixingTally, Pairing, SAME_EVENT_DETECTOR, SAME_EVENT_PARTICLE,
};
use crate::modules::mixing::{MixingCache, PairGenerator};
use crate::modules::selection::ConfiguredSelection;
use crate::modules::spectra::{
    AREA_SUB_MCP_COLLISION_SHAPES, COLLISION_SHAPES, D0_JET_SHAPES, DETECTOR_AREA_SUBTRACTED,
    DETECTOR_JET_SPECTRA, MCP_COLLISION_SHAPES, McAcceptanceMode, PARTICLE_AREA_SUBTRACTED,
    PARTICLE_JET_SPECTRA, SpectraFiller, TRACK_QC_SHAPES, WEIGHTED_COLLISION_SHAPES,
    WEIGHTED_MCD_SHAPES, WEIGHTED_MCP_SHAPES,
};
use crate::modules::traits::{MetricSink, SelectionPredicates};
use serde::Serialize;
use tracing::{debug, info, warn};

const DETECTOR_MIX_STATS: &str = "h_mix_event_stats";
const PARTICLE_MIX_STATS: &str = "h_mixmc_event_stats";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCounters {
    pub records: u64,
    pub detector_events: u64,
    pub detector_events_selected: u64,
    pub particle_events: u64,
    pub particle_events_accepted: u64,
    /// Events that passed selection but fall outside every mixing pool.
    pub unbinned_events: u64,
    pub leading_correlations: u64,
    pub mixed_pairings: u64,
    pub mixed_leading_correlations: u64,
    pub jet_hadron_pairs: u64,
    pub pt_hat_rejected_jets: u64,
    pub unresolved_constituents: u64,
}

/// Registration table for the metrics filled under `process`.
pub fn metric_shapes(process: &ProcessSwitches) -> Vec<(&'static str, usize)> {
    let mut shapes = Vec::new();
    if process.collisions {
        shapes.extend(COLLISION_SHAPES);
    }
    if process.collisions_weighted {
        shapes.extend(WEIGHTED_COLLISION_SHAPES);
    }
    if process.qc || process.qc_weighted {
        shapes.extend(TRACK_QC_SHAPES);
    }
    if process.spectra_data || process.spectra_mcd || process.spectra_mcd_weighted {
        shapes.extend(DETECTOR_JET_SPECTRA.shapes());
    }
    if process.spectra_mcd_weighted {
        shapes.extend(WEIGHTED_MCD_SHAPES);
    }
    if process.spectra_area_sub_data || process.spectra_area_sub_mcd {
        shapes.extend(DETECTOR_AREA_SUBTRACTED.shapes());
    }
    if process.jet_hadron {
        shapes.extend(JET_HADRON_SAME.shapes());
    }
    if process.mix_jet_hadron {
        shapes.extend(JET_HADRON_MIXED.shapes());
    }
    if process.runs_leading_jet_hadron() {
        shapes.push(("h_centrality", 1));
        shapes.push(("h_inclusivejet_corrpt", 1));
        shapes.extend(SAME_EVENT_DETECTOR.shapes());
    }
    if process.runs_mixed_leading_jet_hadron() {
        shapes.push(("h_collisions_mult", 1));
        shapes.extend(MIXED_EVENT_DETECTOR.shapes());
    }
    if process.hf_jet {
        shapes.extend(D0_JET_SHAPES);
    }
    if process.spectra_mcp || process.spectra_mcp_weighted {
        shapes.extend(PARTICLE_JET_SPECTRA.shapes());
    }
    if process.spectra_mcp {
        shapes.extend(MCP_COLLISION_SHAPES);
    }
    if process.spectra_mcp_weighted {
        shapes.push(("h_mcColl_counts", 1));
        shapes.extend(WEIGHTED_MCP_SHAPES);
    }
    if process.spectra_area_sub_mcp {
        shapes.extend(PARTICLE_AREA_SUBTRACTED.shapes());
        shapes.extend(AREA_SUB_MCP_COLLISION_SHAPES);
        shapes.extend(SAME_EVENT_PARTICLE.shapes());
    }
    if process.mix_leading_jet_hadron_mcp {
        shapes.extend(MIXED_EVENT_PARTICLE.shapes());
    }
    shapes.sort_unstable();
    shapes.dedup();
    shapes
}

fn unresolved_constituents<J: JetLike>(jets: &[J], hadron_count: usize) -> u64 {
    jets.iter()
        .flat_map(|jet| jet.constituent_indices())
        .filter(|&&index| index >= hadron_count)
        .count() as u64
}

/// Sink and counters left once the stream is exhausted.
#[derive(Debug)]
pub struct TaskOutput<M> {
    pub sink: M,
    pub counters: RunCounters,
}

pub struct ChargedJetHadronTask<M> {
    config: AnalysisConfig,
    selection: ConfiguredSelection,
    binner: EventBinner,
    detector_pool: MixingCache<Collision, Track>,
    particle_pool: MixingCache<McCollision, Particle>,
    counters: RunCounters,
    sink: M,
}

impl<M> ChargedJetHadronTask<M>
where
    M: MetricSink,
{
    /// Validates `config` and registers every metric its switches fill.
    pub fn new(config: AnalysisConfig, mut sink: M) -> AnalysisResult<Self> {
        config.validate()?;
        let selection = ConfiguredSelection::from_config(&config)?;
        let binner = EventBinner::from_config(&config)?;

        let shapes = metric_shapes(&config.process);
        for &(name, dimension) in &shapes {
            sink.register(name, dimension);
        }
        let depth = config.number_events_mixed;
        info!(
            metrics = shapes.len(),
            pools = binner.pool_count(),
            depth,
            axis = ?config.mixing_axis,
            "analysis task configured"
        );

        Ok(Self {
            config,
            selection,
            binner,
            detector_pool: MixingCache::new(depth),
            particle_pool: MixingCache::new(depth),
            counters: RunCounters::default(),
            sink,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn selection(&self) -> &ConfiguredSelection {
        &self.selection
    }

    pub const fn counters(&self) -> RunCounters {
        self.counters
    }

    pub fn sink(&self) -> &M {
        &self.sink
    }

    pub fn detector_pool(&self) -> &MixingCache<Collision, Track> {
        &self.detector_pool
    }

    pub fn particle_pool(&self) -> &MixingCache<McCollision, Particle> {
        &self.particle_pool
    }

    /// Processes every record, stopping at the first decoding error.
    pub fn run<I>(&mut self, records: I) -> AnalysisResult<()>
    where
        I: IntoIterator<Item = AnalysisResult<EventRecord>>,
    {
        for record in records {
            self.process_record(&record?);
        }
        Ok(())
    }

    pub fn process_record(&mut self, record: &EventRecord) {
        self.counters.records += 1;
        match record {
            EventRecord::Detector(event) => self.process_detector_event(event),
            EventRecord::Particle(event) => self.process_particle_event(event),
        }
    }

    pub fn process_detector_event(&mut self, event: &DetectorEvent) {
        let Self {
            ref config,
            ref selection,
            ref binner,
            ref mut detector_pool,
            ref mut counters,
            ref mut sink,
            ..
        } = *self;
        let process = &config.process;
        let collision = &event.collision;
        let jets: &[Jet] = &event.jets;
        let tracks: &[Track] = &event.tracks;
        counters.detector_events += 1;

        let unresolved = unresolved_constituents(jets, tracks.len());
        if unresolved > 0 {
            counters.unresolved_constituents += unresolved;
            warn!(
                event = collision.id,
                unresolved, "jet constituents reference missing tracks"
            );
        }

        let spectra = SpectraFiller::new(selection, config);
        if process.collisions_weighted {
            spectra.fill_collision(collision, true, sink);
        }
        if process.qc_weighted
            && selection.is_good_collision(collision)
            && collision.pos_z.abs() <= selection.vertex_z_cut()
        {
            for track in tracks.iter().filter(|track| selection.select_hadron(*track)) {
                spectra.fill_track(track, collision.weight, sink);
            }
        }

        if !selection.passes_event_cuts(collision) {
            debug!(
                event = collision.id,
                pos_z = collision.pos_z,
                "collision outside vertex or centrality window"
            );
            return;
        }
        if process.collisions {
            spectra.fill_collision(collision, false, sink);
        }
        if !selection.is_good_collision(collision) || !selection.passes_occupancy(collision) {
            debug!(
                event = collision.id,
                occupancy = collision.occupancy,
                "collision rejected by event selection or occupancy"
            );
            return;
        }
        counters.detector_events_selected += 1;
        let rho = collision.rho;

        if process.qc {
            for track in tracks.iter().filter(|track| selection.select_hadron(*track)) {
                spectra.fill_track(track, 1.0, sink);
            }
        }

        let accepted_jets = move || {
            jets.iter().filter(move |jet| {
                selection.accepts_jet(*jet, tracks, AnalysisLevel::Detector)
            })
        };
        if process.spectra_data || process.spectra_mcd {
            for jet in accepted_jets() {
                if !spectra.fill_jet(
                    &DETECTOR_JET_SPECTRA,
                    jet,
                    tracks,
                    1.0,
                    AnalysisLevel::Detector,
                    sink,
                ) {
                    counters.pt_hat_rejected_jets += 1;
                }
            }
        }
        if process.spectra_mcd_weighted {
            spectra.fill_weighted_detector_jets(collision, jets, tracks, sink);
        }
        if process.spectra_area_sub_data || process.spectra_area_sub_mcd {
            for jet in accepted_jets() {
                if !spectra.fill_area_subtracted(
                    &DETECTOR_AREA_SUBTRACTED,
                    jet,
                    rho,
                    1.0,
                    AnalysisLevel::Detector,
                    sink,
                ) {
                    counters.pt_hat_rejected_jets += 1;
                }
            }
        }

        let filler = CorrelationFiller::new(
            selection,
            AnalysisLevel::Detector,
            config.leading_jet_pt_min,
            config.subleading_jet_pt_min,
        );
        if process.jet_hadron {
            let tally = filler.correlate_jets(
                &JET_HADRON_SAME,
                jets,
                tracks,
                rho,
                tracks,
                Pairing::SameEvent,
                sink,
            );
            counters.jet_hadron_pairs += tally.pairs_accepted as u64;
        }
        if process.runs_leading_jet_hadron() {
            sink.emit(
                "h_centrality",
                &[collision.centrality_for(selection.estimator())],
                1.0,
            );
            for jet in accepted_jets() {
                let pt_corr = jet.corrected_pt(rho);
                if pt_corr.is_finite() {
                    sink.emit("h_inclusivejet_corrpt", &[pt_corr], 1.0);
                }
            }
            let outcome = filler.correlate_leading(
                &SAME_EVENT_DETECTOR,
                LeadingInput {
                    jets,
                    constituents: tracks,
                    rho,
                    hadrons: tracks,
                    pairing: Pairing::SameEvent,
                    weight: 1.0,
                },
                sink,
            );
            if outcome.is_correlated() {
                counters.leading_correlations += 1;
            } else {
                debug!(event = collision.id, ?outcome, "no same-event leading correlation");
            }
        }
        if process.hf_jet {
            spectra.fill_d0_jets(collision, jets, &event.d0_candidates, sink);
        }

        if !process.uses_detector_mixing() {
            return;
        }
        let Some(bin) = binner.bin_for(collision) else {
            counters.unbinned_events += 1;
            debug!(event = collision.id, "collision outside every mixing pool");
            return;
        };

        if process.runs_mixed_leading_jet_hadron() {
            sink.emit("h_collisions_mult", &[collision.mult_ntracks_global], 1.0);
            let mut tally = MixingTally::default();
            for pair in PairGenerator::new(&*detector_pool, collision, jets, bin) {
                let outcome = filler.correlate_leading(
                    &MIXED_EVENT_DETECTOR,
                    LeadingInput {
                        jets: pair.current_jets,
                        constituents: tracks,
                        rho,
                        hadrons: pair.cached_hadrons,
                        pairing: Pairing::Mixed(pair.pool_bin),
                        weight: 1.0,
                    },
                    sink,
                );
                tally.record(outcome);
            }
            if tally.mixed_events > 0 {
                tally.emit_totals(DETECTOR_MIX_STATS, sink);
            }
            counters.mixed_pairings += tally.mixed_events;
            counters.mixed_leading_correlations += tally.dijets_cut;
            debug!(
                event = collision.id,
                %bin,
                pairings = tally.mixed_events,
                correlated = tally.dijets_cut,
                "mixed leading-jet pairings"
            );
        }
        if process.mix_jet_hadron {
            for pair in PairGenerator::new(&*detector_pool, collision, jets, bin) {
                let tally = filler.correlate_jets(
                    &JET_HADRON_MIXED,
                    pair.current_jets,
                    tracks,
                    rho,
                    pair.cached_hadrons,
                    Pairing::Mixed(pair.pool_bin),
                    sink,
                );
                counters.jet_hadron_pairs += tally.pairs_accepted as u64;
            }
        }

        detector_pool.put(bin, collision.clone(), event.tracks.clone());
    }

    pub fn process_particle_event(&mut self, event: &ParticleEvent) {
        let Self {
            ref config,
            ref selection,
            ref binner,
            ref mut particle_pool,
            ref mut counters,
            ref mut sink,
            ..
        } = *self;
        let process = &config.process;
        let mc_collision = &event.mc_collision;
        let jets: &[Jet] = &event.jets;
        let particles: &[Particle] = &event.particles;
        counters.particle_events += 1;

        let unresolved = unresolved_constituents(jets, particles.len());
        if unresolved > 0 {
            counters.unresolved_constituents += unresolved;
            warn!(
                event = mc_collision.id,
                unresolved, "jet constituents reference missing particles"
            );
        }

        let spectra = SpectraFiller::new(selection, config);
        let filler = CorrelationFiller::new(
            selection,
            AnalysisLevel::Particle,
            config.leading_jet_pt_min,
            config.subleading_jet_pt_min,
        );
        let accepted_jets = move || {
            jets.iter().filter(move |jet| {
                selection.accepts_jet(*jet, particles, AnalysisLevel::Particle)
            })
        };
        let mut accepted = false;

        if process.spectra_mcp
            && spectra
                .accept_mc_collision(mc_collision, McAcceptanceMode::Spectra, sink)
                .is_some()
        {
            accepted = true;
            for jet in accepted_jets() {
                if !spectra.fill_jet(
                    &PARTICLE_JET_SPECTRA,
                    jet,
                    particles,
                    1.0,
                    AnalysisLevel::Particle,
                    sink,
                ) {
                    counters.pt_hat_rejected_jets += 1;
                }
            }
        }
        if process.spectra_mcp_weighted
            && spectra
                .accept_mc_collision(mc_collision, McAcceptanceMode::Weighted, sink)
                .is_some()
        {
            accepted = true;
            spectra.fill_weighted_particle_jets(mc_collision, jets, particles, sink);
        }
        if process.spectra_area_sub_mcp
            && spectra
                .accept_mc_collision(mc_collision, McAcceptanceMode::AreaSubtracted, sink)
                .is_some()
        {
            accepted = true;
            let rho = mc_collision.rho;
            for jet in accepted_jets() {
                if !spectra.fill_area_subtracted(
                    &PARTICLE_AREA_SUBTRACTED,
                    jet,
                    rho,
                    1.0,
                    AnalysisLevel::Particle,
                    sink,
                ) {
                    counters.pt_hat_rejected_jets += 1;
                }
            }
            let outcome = filler.correlate_leading(
                &SAME_EVENT_PARTICLE,
                LeadingInput {
                    jets,
                    constituents: particles,
                    rho,
                    hadrons: particles,
                    pairing: Pairing::SameEvent,
                    weight: 1.0,
                },
                sink,
            );
            if outcome.is_correlated() {
                counters.leading_correlations += 1;
            }
        }
        if accepted {
            counters.particle_events_accepted += 1;
        }

        if !process.uses_particle_mixing() {
            return;
        }
        if !selection.passes_event_cuts(mc_collision) {
            debug!(
                event = mc_collision.id,
                pos_z = mc_collision.pos_z,
                "generator-level collision outside vertex window"
            );
            return;
        }
        let Some(bin) = binner.bin_for(mc_collision) else {
            counters.unbinned_events += 1;
            debug!(
                event = mc_collision.id,
                "generator-level collision outside every mixing pool"
            );
            return;
        };

        let mut tally = MixingTally::default();
        for pair in PairGenerator::new(&*particle_pool, mc_collision, jets, bin) {
            let outcome = filler.correlate_leading(
                &MIXED_EVENT_PARTICLE,
                LeadingInput {
                    jets: pair.current_jets,
                    constituents: particles,
                    rho: mc_collision.rho,
                    hadrons: pair.cached_hadrons,
                    pairing: Pairing::Mixed(pair.pool_bin),
                    weight: 1.0,
                },
                sink,
            );
            tally.record(outcome);
        }
        if tally.mixed_events > 0 {
            tally.emit_totals(PARTICLE_MIX_STATS, sink);
        }
        counters.mixed_pairings += tally.mixed_events;
        counters.mixed_leading_correlations += tally.dijets_cut;

        particle_pool.put(bin, mc_collision.clone(), event.particles.clone());
    }

    pub fn finish(self) -> TaskOutput<M> {
        let counters = self.counters;
        info!(
            records = counters.records,
            detector_selected = counters.detector_events_selected,
            particle_accepted = counters.particle_events_accepted,
            leading = counters.leading_correlations,
            mixed = counters.mixed_pairings,
            "analysis finished"
        );
        TaskOutput {
            sink: self.sink,
            counters,
        }
    }
}
