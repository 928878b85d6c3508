//! Default humanoid rest pose.
//!
//! A T-pose in meters, Y up, character facing +Z, left side on -X. All rest
//! rotations are identity. Right-side joints mirror the left across X = 0.

use crate::joint::JointId;
use glam::Vec3;

pub const DEFAULT_HIPS: Vec3 = Vec3::new(0.0, 1.0, 0.0);
pub const DEFAULT_SPINE_LOWER: Vec3 = Vec3::new(0.0, 1.1, 0.0);
pub const DEFAULT_SPINE_UPPER: Vec3 = Vec3::new(0.0, 1.2, 0.0);
pub const DEFAULT_CHEST: Vec3 = Vec3::new(0.0, 1.3, 0.0);
pub const DEFAULT_NECK: Vec3 = Vec3::new(0.0, 1.45, 0.0);
pub const DEFAULT_HEAD: Vec3 = Vec3::new(0.0, 1.6, 0.0);

pub const DEFAULT_LEFT_SHOULDER: Vec3 = Vec3::new(-0.05, 1.4, 0.0);
pub const DEFAULT_LEFT_UPPER_ARM: Vec3 = Vec3::new(-0.18, 1.4, 0.0);
pub const DEFAULT_LEFT_LOWER_ARM: Vec3 = Vec3::new(-0.46, 1.4, 0.0);
pub const DEFAULT_LEFT_HAND: Vec3 = Vec3::new(-0.72, 1.4, 0.0);

pub const DEFAULT_LEFT_UPPER_LEG: Vec3 = Vec3::new(-0.1, 0.95, 0.0);
pub const DEFAULT_LEFT_LOWER_LEG: Vec3 = Vec3::new(-0.1, 0.52, 0.0);
pub const DEFAULT_LEFT_FOOT: Vec3 = Vec3::new(-0.1, 0.08, 0.0);

/// Left finger joints in `JointId` order, thumb first
pub const DEFAULT_LEFT_FINGERS: [Vec3; 15] = [
    // Thumb
    Vec3::new(-0.75, 1.39, 0.03),
    Vec3::new(-0.78, 1.385, 0.05),
    Vec3::new(-0.81, 1.38, 0.06),
    // Index
    Vec3::new(-0.81, 1.4, 0.025),
    Vec3::new(-0.85, 1.4, 0.025),
    Vec3::new(-0.875, 1.4, 0.025),
    // Middle
    Vec3::new(-0.815, 1.4, 0.005),
    Vec3::new(-0.86, 1.4, 0.005),
    Vec3::new(-0.89, 1.4, 0.005),
    // Ring
    Vec3::new(-0.81, 1.4, -0.015),
    Vec3::new(-0.85, 1.4, -0.015),
    Vec3::new(-0.875, 1.4, -0.015),
    // Little
    Vec3::new(-0.8, 1.4, -0.035),
    Vec3::new(-0.83, 1.4, -0.035),
    Vec3::new(-0.85, 1.4, -0.035),
];

const fn mirrored(v: Vec3) -> Vec3 {
    Vec3::new(-v.x, v.y, v.z)
}

/// World-space rest position of every joint, indexed by `JointId`.
pub const DEFAULT_REST_POSITIONS: [Vec3; JointId::COUNT] = {
    let mut positions = [Vec3::ZERO; JointId::COUNT];
    positions[JointId::Hips as usize] = DEFAULT_HIPS;
    positions[JointId::SpineLower as usize] = DEFAULT_SPINE_LOWER;
    positions[JointId::SpineUpper as usize] = DEFAULT_SPINE_UPPER;
    positions[JointId::Chest as usize] = DEFAULT_CHEST;
    positions[JointId::Neck as usize] = DEFAULT_NECK;
    positions[JointId::Head as usize] = DEFAULT_HEAD;

    positions[JointId::LeftShoulder as usize] = DEFAULT_LEFT_SHOULDER;
    positions[JointId::LeftUpperArm as usize] = DEFAULT_LEFT_UPPER_ARM;
    positions[JointId::LeftLowerArm as usize] = DEFAULT_LEFT_LOWER_ARM;
    positions[JointId::LeftHand as usize] = DEFAULT_LEFT_HAND;
    positions[JointId::RightShoulder as usize] = mirrored(DEFAULT_LEFT_SHOULDER);
    positions[JointId::RightUpperArm as usize] = mirrored(DEFAULT_LEFT_UPPER_ARM);
    positions[JointId::RightLowerArm as usize] = mirrored(DEFAULT_LEFT_LOWER_ARM);
    positions[JointId::RightHand as usize] = mirrored(DEFAULT_LEFT_HAND);

    positions[JointId::LeftUpperLeg as usize] = DEFAULT_LEFT_UPPER_LEG;
    positions[JointId::LeftLowerLeg as usize] = DEFAULT_LEFT_LOWER_LEG;
    positions[JointId::LeftFoot as usize] = DEFAULT_LEFT_FOOT;
    positions[JointId::RightUpperLeg as usize] = mirrored(DEFAULT_LEFT_UPPER_LEG);
    positions[JointId::RightLowerLeg as usize] = mirrored(DEFAULT_LEFT_LOWER_LEG);
    positions[JointId::RightFoot as usize] = mirrored(DEFAULT_LEFT_FOOT);

    let left_start = JointId::LeftThumbMetacarpal as usize;
    let right_start = JointId::RightThumbMetacarpal as usize;
    let mut i = 0;
    while i < DEFAULT_LEFT_FINGERS.len() {
        positions[left_start + i] = DEFAULT_LEFT_FINGERS[i];
        positions[right_start + i] = mirrored(DEFAULT_LEFT_FINGERS[i]);
        i += 1;
    }
    positions
};
