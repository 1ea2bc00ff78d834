use jethadron_core::common::AnalysisConfig;
use jethadron_core::domain::{AnalysisLevel, Collision, EventLike, Jet, Track};
use jethadron_core::modules::correlation::SAME_EVENT_DETECTOR;
use jethadron_core::modules::selection::TRACK_GLOBAL;
use jethadron_core::modules::{
    ConfiguredSelection, CorrelationFiller, CorrelationOutcome, LeadingInput, MixingCache,
    PairGenerator, Pairing, PoolBin, RecordingSink,
};
use jethadron_core::numerics::wrap_delta_phi;
use std::f64::consts::PI;

const TOLERANCE: f64 = 1e-12;

fn selection() -> ConfiguredSelection {
    ConfiguredSelection::from_config(&AnalysisConfig::default()).expect("default selection")
}

fn same_event<'a>(jets: &'a [Jet], tracks: &'a [Track]) -> LeadingInput<'a, Jet, Track> {
    LeadingInput {
        jets,
        constituents: tracks,
        rho: 0.0,
        hadrons: tracks,
        pairing: Pairing::SameEvent,
        weight: 1.0,
    }
}

fn correlate(jets: &[Jet], tracks: &[Track]) -> (CorrelationOutcome, RecordingSink) {
    let select = selection();
    let filler = CorrelationFiller::new(&select, AnalysisLevel::Detector, 20.0, 10.0);
    let mut sink = RecordingSink::new();
    let outcome =
        filler.correlate_leading(&SAME_EVENT_DETECTOR, same_event(jets, tracks), &mut sink);
    (outcome, sink)
}

#[test]
fn back_to_back_dijet_correlates_hadron_relative_to_leading_jet() {
    let jets = vec![
        Jet::new(30.0, -0.2, 1.0 + PI, 0.4),
        Jet::new(50.0, 0.0, 1.0, 0.4),
    ];
    let tracks = vec![Track::new(5.0, 0.1, 1.5, TRACK_GLOBAL)];
    let (outcome, sink) = correlate(&jets, &tracks);

    assert!(outcome.is_correlated());
    assert_eq!(sink.values_of("h_leadjet_corrpt"), vec![vec![50.0]]);
    assert_eq!(sink.values_of("h_subleadjet_corrpt"), vec![vec![30.0]]);

    let tuples = sink.values_of("thn_jethadron_correlations");
    assert_eq!(tuples.len(), 1);
    let tuple = &tuples[0];
    assert_eq!(tuple[2], 5.0);
    assert!((tuple[3] - 0.1).abs() < TOLERANCE);
    assert!((tuple[4] - 0.2).abs() < TOLERANCE);
    assert!((tuple[5] - 0.1).abs() < TOLERANCE);
    assert!((tuple[6] - wrap_delta_phi(0.5)).abs() < TOLERANCE);
}

#[test]
fn backward_leading_jet_flips_hadron_eta_difference() {
    let jets = vec![
        Jet::new(50.0, -0.3, 0.2, 0.4),
        Jet::new(30.0, 0.2, 0.2 + PI, 0.4),
    ];
    let tracks = vec![Track::new(5.0, 0.1, 0.2, TRACK_GLOBAL)];
    let (_, sink) = correlate(&jets, &tracks);

    let tuple = &sink.values_of("thn_jethadron_correlations")[0];
    assert!((tuple[3] - 0.4).abs() < TOLERANCE);
    assert!((tuple[4] - 0.5).abs() < TOLERANCE);
    assert!((tuple[5] + 0.4).abs() < TOLERANCE);
    assert!(tuple[6].abs() < TOLERANCE);
}

#[test]
fn single_accepted_jet_emits_nothing() {
    let jets = vec![Jet::new(80.0, 0.0, 1.0, 0.4), Jet::new(60.0, 0.95, 4.0, 0.4)];
    let tracks = vec![
        Track::new(5.0, 0.1, 1.5, TRACK_GLOBAL),
        Track::new(2.0, -0.4, 4.0, TRACK_GLOBAL),
    ];
    let (outcome, sink) = correlate(&jets, &tracks);

    assert_eq!(outcome, CorrelationOutcome::NoLeadingPair);
    assert!(sink.emissions().is_empty());
}

#[test]
fn near_side_pair_is_rejected_before_hadron_loop() {
    let jets = vec![Jet::new(50.0, 0.0, 1.0, 0.4), Jet::new(30.0, 0.1, 1.3, 0.4)];
    let tracks = vec![Track::new(5.0, 0.1, 1.5, TRACK_GLOBAL)];
    let (outcome, sink) = correlate(&jets, &tracks);

    assert_eq!(outcome, CorrelationOutcome::NotBackToBack);
    assert_eq!(sink.count("thn_jethadron_correlations"), 0);
    assert_eq!(sink.count("h_jeth_dphi"), 0);
    assert!(sink.emissions().is_empty());
}

#[test]
fn fifth_event_mixes_with_the_three_most_recent() {
    let bin = PoolBin(2);
    let mut cache: MixingCache<Collision, Track> = MixingCache::new(3);
    for id in 1..=4 {
        let hadrons = vec![Track::new(id as f64, 0.0, 0.0, TRACK_GLOBAL)];
        cache.put(bin, Collision::new(id, 0.0), hadrons);
    }

    let current = Collision::new(5, 0.0);
    let jets = vec![Jet::new(40.0, 0.0, 0.0, 0.4)];
    let paired: Vec<u64> = PairGenerator::new(&cache, &current, &jets, bin)
        .map(|pair| pair.cached.id())
        .collect();
    assert_eq!(paired, vec![2, 3, 4]);

    cache.put(bin, current, Vec::new());
    assert_eq!(cache.len(bin), 3);
    let remaining: Vec<u64> = cache
        .pairs_for(99, bin)
        .map(|cached| cached.event.id())
        .collect();
    assert_eq!(remaining, vec![3, 4, 5]);
}
