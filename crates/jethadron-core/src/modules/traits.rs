use crate::domain::{AnalysisLevel, Collision, EventLike, HadronLike, JetLike};

/// Boolean oracles consulted by the correlation kernel.
pub trait SelectionPredicates {
    /// Event-selection bits and minimum-bias gap rejection.
    fn is_good_collision(&self, collision: &Collision) -> bool;

    /// Vertex and centrality window of an event.
    fn passes_event_cuts<E: EventLike>(&self, event: &E) -> bool;

    fn passes_occupancy(&self, collision: &Collision) -> bool;

    fn select_hadron<H: HadronLike>(&self, hadron: &H) -> bool;

    fn is_in_eta_acceptance<J: JetLike>(&self, jet: &J) -> bool;

    /// `hadrons` is the table the jet's constituent indices point into.
    fn is_accepted_jet<J: JetLike, H: HadronLike>(
        &self,
        jet: &J,
        hadrons: &[H],
        level: AnalysisLevel,
    ) -> bool;
}

/// Accumulation service receiving every fill produced by the analysis.
pub trait MetricSink {
    fn register(&mut self, _name: &'static str, _dimension: usize) {}

    fn emit(&mut self, name: &'static str, values: &[f64], weight: f64);
}

impl<M> MetricSink for &mut M
where
    M: MetricSink + ?Sized,
{
    fn register(&mut self, name: &'static str, dimension: usize) {
        (**self).register(name, dimension);
    }

    fn emit(&mut self, name: &'static str, values: &[f64], weight: f64) {
        (**self).emit(name, values, weight);
    }
}
