pub mod arm;
pub mod bone_pairs;
pub mod engine;
pub mod settings;

pub use arm::ArmChain;
pub use bone_pairs::{chest_reference, BonePair, BonePairs};
pub use engine::{DeformationEngine, SpineTargets};
pub use settings::{DeformationSettings, DeformationWeights, ShoulderBlendSpace, SpineCorrectionPolicy};
