//! Error types for rig binding and configuration.
//!
//! Everything here is raised at setup time. Per-frame numerical edge cases
//! are handled with epsilon fallbacks inside the solvers and never surface
//! as errors.

use crate::joint::{JointId, Side};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeformationError {
    #[error("required joint {0:?} is missing from the skeleton")]
    MissingJoint(JointId),

    #[error("joint {joint:?} has parent {parent:?}, which is not defined before it")]
    InvalidParent { joint: JointId, parent: JointId },

    #[error("joint {0:?} appears more than once")]
    DuplicateJoint(JointId),

    #[error("rest hips-to-head distance is zero")]
    DegenerateSpine,

    #[error("{0:?} arm chain is not initialized")]
    ArmNotInitialized(Side),

    #[error("twist segment start and end coincide at rest")]
    TwistSegmentDegenerate,

    #[error("{name} must be within [0, 1], got {value}")]
    WeightOutOfRange { name: &'static str, value: f32 },

    #[error("{name} must not be negative, got {value}")]
    NegativeExtent { name: &'static str, value: f32 },

    #[error("unknown joint name: {0}")]
    UnknownJointName(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeformationError>;
