pub mod binning;
pub mod correlation;
pub mod input;
pub mod leading;
pub mod mixing;
pub mod registry;
pub mod selection;
pub mod serialization;
pub mod spectra;
pub mod task;

mod traits;

pub use binning::{EventBinner, PoolBin, VariableWidthAxis};
pub use correlation::{CorrelationFiller, CorrelationOutcome, LeadingInput, Pairing};
pub use input::{EventStreamReader, load_config, parse_config};
pub use leading::{LeadingJetSelector, LeadingPair, RankedJet};
pub use mixing::{CachedEvent, MixedPair, MixingCache, PairGenerator};
pub use registry::{Emission, HistogramRegistry, MetricAccumulator, RecordingSink};
pub use selection::ConfiguredSelection;
pub use spectra::SpectraFiller;
pub use task::{ChargedJetHadronTask, RunCounters, TaskOutput};
pub use traits::{MetricSink, SelectionPredicates};
