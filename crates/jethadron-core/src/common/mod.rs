pub mod config;

pub use config::{AnalysisConfig, MixingAxis, ProcessSwitches, SplitCollisionPolicy};
