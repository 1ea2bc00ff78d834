pub mod errors;

pub use errors::{AnalysisError, AnalysisErrorCategory, AnalysisResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type EventId = u64;

/// Shared kinematic contract of jets, tracks, particles and D0 candidates.
pub trait Kinematics {
    fn pt(&self) -> f64;
    fn eta(&self) -> f64;
    fn phi(&self) -> f64;
}

pub trait JetLike: Kinematics {
    fn area(&self) -> f64;

    /// Resolution parameter times 100.
    fn radius_code(&self) -> i32;

    /// Indices into the hadron table of the event the jet belongs to.
    fn constituent_indices(&self) -> &[usize];

    fn event_weight(&self) -> Option<f64>;

    fn radius(&self) -> f64 {
        f64::from(self.radius_code()) / 100.0
    }

    fn corrected_pt(&self, rho: f64) -> f64 {
        self.pt() - rho * self.area()
    }
}

pub trait HadronLike: Kinematics + Clone {
    /// Detector-level selection bits; particle-level hadrons have none.
    fn selection_bits(&self) -> Option<u32>;
}

pub trait EventLike: Clone {
    fn id(&self) -> EventId;
    fn pos_z(&self) -> f64;
    fn rho(&self) -> f64;
    fn weight(&self) -> f64;
    fn multiplicity(&self) -> f64;
    fn centrality(&self, estimator: CentralityEstimator) -> Option<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CentralityEstimator {
    #[default]
    Ft0c,
    Ft0a,
    Ft0m,
}

impl CentralityEstimator {
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ft0c),
            1 => Some(Self::Ft0a),
            2 => Some(Self::Ft0m),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ft0c => "FT0C",
            Self::Ft0a => "FT0A",
            Self::Ft0m => "FT0M",
        }
    }
}

impl Display for CentralityEstimator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisLevel {
    Detector,
    Particle,
}

impl AnalysisLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detector => "detector",
            Self::Particle => "particle",
        }
    }
}

impl Display for AnalysisLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

fn unit_weight() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Reconstructed (data or detector-level MC) collision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collision {
    pub id: EventId,
    pub pos_z: f64,
    #[serde(default)]
    pub cent_ft0c: f64,
    #[serde(default)]
    pub cent_ft0a: f64,
    #[serde(default)]
    pub cent_ft0m: f64,
    #[serde(default)]
    pub mult_ntracks_global: f64,
    #[serde(default)]
    pub mult_ft0m: f64,
    #[serde(default)]
    pub occupancy: i32,
    #[serde(default)]
    pub rho: f64,
    #[serde(default)]
    pub selection_bits: u32,
    #[serde(default)]
    pub mb_gap: bool,
    #[serde(default = "unit_weight")]
    pub weight: f64,
    #[serde(default = "default_true")]
    pub has_mc_collision: bool,
}

impl Collision {
    pub fn new(id: EventId, pos_z: f64) -> Self {
        Self {
            id,
            pos_z,
            cent_ft0c: 0.0,
            cent_ft0a: 0.0,
            cent_ft0m: 0.0,
            mult_ntracks_global: 0.0,
            mult_ft0m: 0.0,
            occupancy: 0,
            rho: 0.0,
            selection_bits: 0,
            mb_gap: false,
            weight: 1.0,
            has_mc_collision: true,
        }
    }

    pub fn centrality_for(&self, estimator: CentralityEstimator) -> f64 {
        match estimator {
            CentralityEstimator::Ft0c => self.cent_ft0c,
            CentralityEstimator::Ft0a => self.cent_ft0a,
            CentralityEstimator::Ft0m => self.cent_ft0m,
        }
    }
}

impl EventLike for Collision {
    fn id(&self) -> EventId {
        self.id
    }

    fn pos_z(&self) -> f64 {
        self.pos_z
    }

    fn rho(&self) -> f64 {
        self.rho
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn multiplicity(&self) -> f64 {
        self.mult_ntracks_global
    }

    fn centrality(&self, estimator: CentralityEstimator) -> Option<f64> {
        Some(self.centrality_for(estimator))
    }
}

/// Generator-level collision; carries no centrality estimator of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McCollision {
    pub id: EventId,
    pub pos_z: f64,
    #[serde(default)]
    pub rho: f64,
    #[serde(default = "unit_weight")]
    pub weight: f64,
    #[serde(default)]
    pub mult_ft0a: f64,
    /// Reconstructed collisions associated with this generated collision.
    #[serde(default)]
    pub collisions: Vec<Collision>,
}

impl McCollision {
    pub fn new(id: EventId, pos_z: f64) -> Self {
        Self {
            id,
            pos_z,
            rho: 0.0,
            weight: 1.0,
            mult_ft0a: 0.0,
            collisions: Vec::new(),
        }
    }
}

impl EventLike for McCollision {
    fn id(&self) -> EventId {
        self.id
    }

    fn pos_z(&self) -> f64 {
        self.pos_z
    }

    fn rho(&self) -> f64 {
        self.rho
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn multiplicity(&self) -> f64 {
        self.mult_ft0a
    }

    fn centrality(&self, _estimator: CentralityEstimator) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jet {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    #[serde(default)]
    pub area: f64,
    #[serde(rename = "r", default = "default_radius_code")]
    pub radius_code: i32,
    #[serde(default)]
    pub constituents: Vec<usize>,
    #[serde(default)]
    pub event_weight: Option<f64>,
}

fn default_radius_code() -> i32 {
    40
}

impl Jet {
    pub fn new(pt: f64, eta: f64, phi: f64, area: f64) -> Self {
        Self {
            pt,
            eta,
            phi,
            area,
            radius_code: default_radius_code(),
            constituents: Vec::new(),
            event_weight: None,
        }
    }

    pub fn with_constituents(mut self, constituents: Vec<usize>) -> Self {
        self.constituents = constituents;
        self
    }

    pub fn with_radius_code(mut self, radius_code: i32) -> Self {
        self.radius_code = radius_code;
        self
    }

    pub fn with_event_weight(mut self, event_weight: f64) -> Self {
        self.event_weight = Some(event_weight);
        self
    }
}

impl Kinematics for Jet {
    fn pt(&self) -> f64 {
        self.pt
    }

    fn eta(&self) -> f64 {
        self.eta
    }

    fn phi(&self) -> f64 {
        self.phi
    }
}

impl JetLike for Jet {
    fn area(&self) -> f64 {
        self.area
    }

    fn radius_code(&self) -> i32 {
        self.radius_code
    }

    fn constituent_indices(&self) -> &[usize] {
        &self.constituents
    }

    fn event_weight(&self) -> Option<f64> {
        self.event_weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    #[serde(default)]
    pub selection_bits: u32,
}

impl Track {
    pub fn new(pt: f64, eta: f64, phi: f64, selection_bits: u32) -> Self {
        Self {
            pt,
            eta,
            phi,
            selection_bits,
        }
    }
}

impl Kinematics for Track {
    fn pt(&self) -> f64 {
        self.pt
    }

    fn eta(&self) -> f64 {
        self.eta
    }

    fn phi(&self) -> f64 {
        self.phi
    }
}

impl HadronLike for Track {
    fn selection_bits(&self) -> Option<u32> {
        Some(self.selection_bits)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
}

impl Particle {
    pub fn new(pt: f64, eta: f64, phi: f64) -> Self {
        Self { pt, eta, phi }
    }
}

impl Kinematics for Particle {
    fn pt(&self) -> f64 {
        self.pt
    }

    fn eta(&self) -> f64 {
        self.eta
    }

    fn phi(&self) -> f64 {
        self.phi
    }
}

impl HadronLike for Particle {
    fn selection_bits(&self) -> Option<u32> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct D0Candidate {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
}

impl Kinematics for D0Candidate {
    fn pt(&self) -> f64 {
        self.pt
    }

    fn eta(&self) -> f64 {
        self.eta
    }

    fn phi(&self) -> f64 {
        self.phi
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorEvent {
    pub collision: Collision,
    #[serde(default)]
    pub jets: Vec<Jet>,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub d0_candidates: Vec<D0Candidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleEvent {
    pub mc_collision: McCollision,
    #[serde(default)]
    pub jets: Vec<Jet>,
    #[serde(default)]
    pub particles: Vec<Particle>,
}

/// One row of the input stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum EventRecord {
    Detector(DetectorEvent),
    Particle(ParticleEvent),
}

impl EventRecord {
    pub const fn level(&self) -> AnalysisLevel {
        match self {
            Self::Detector(_) => AnalysisLevel::Detector,
            Self::Particle(_) => AnalysisLevel::Particle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AnalysisLevel, CentralityEstimator, Collision, EventLike, EventRecord, Jet, JetLike,
        McCollision,
    };

    #[test]
    fn corrected_pt_subtracts_rho_times_area() {
        let jet = Jet::new(50.0, 0.1, 1.0, 0.4);
        assert!((jet.corrected_pt(10.0) - 46.0).abs() < 1e-12);
        assert!((jet.radius() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn particle_level_collisions_expose_no_centrality() {
        let mc = McCollision::new(7, 1.5);
        assert_eq!(mc.centrality(CentralityEstimator::Ft0m), None);

        let mut collision = Collision::new(8, 1.5);
        collision.cent_ft0a = 42.0;
        assert_eq!(collision.centrality(CentralityEstimator::Ft0a), Some(42.0));
    }

    #[test]
    fn estimator_codes_follow_configuration_convention() {
        assert_eq!(CentralityEstimator::from_code(0), Some(CentralityEstimator::Ft0c));
        assert_eq!(CentralityEstimator::from_code(1), Some(CentralityEstimator::Ft0a));
        assert_eq!(CentralityEstimator::from_code(2), Some(CentralityEstimator::Ft0m));
        assert_eq!(CentralityEstimator::from_code(3), None);
    }

    #[test]
    fn event_records_decode_from_tagged_json() {
        let detector: EventRecord = serde_json::from_str(
            r#"{
                "level": "detector",
                "collision": { "id": 3, "posZ": -1.0, "multNtracksGlobal": 12.0 },
                "jets": [ { "pt": 30.0, "eta": 0.1, "phi": 2.0, "area": 0.5, "constituents": [0] } ],
                "tracks": [ { "pt": 2.0, "eta": 0.2, "phi": 1.0, "selectionBits": 1 } ]
            }"#,
        )
        .expect("detector record should decode");
        assert_eq!(detector.level(), AnalysisLevel::Detector);
        let EventRecord::Detector(event) = detector else {
            panic!("expected detector record");
        };
        assert_eq!(event.collision.weight, 1.0);
        assert_eq!(event.jets[0].radius_code, 40);
        assert_eq!(event.tracks[0].selection_bits, 1);

        let particle: EventRecord = serde_json::from_str(
            r#"{ "level": "particle", "mcCollision": { "id": 4, "posZ": 2.0 } }"#,
        )
        .expect("particle record should decode");
        assert_eq!(particle.level(), AnalysisLevel::Particle);
    }
}
