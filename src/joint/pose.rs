use super::id::JointId;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;
use std::ops::{Index, IndexMut};

/// Position and rotation of a single joint.
///
/// Depending on context this is either a world-space pose or a pose local to
/// the joint's parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for JointPose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl JointPose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Transform a point from this joint's frame into the parent frame
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    /// Express `world` in this joint's frame
    pub fn to_local(&self, world: &JointPose) -> JointPose {
        let inverse = self.rotation.inverse();
        JointPose {
            position: inverse * (world.position - self.position),
            rotation: (inverse * world.rotation).normalize(),
        }
    }

    /// Compose a child's local pose onto this (parent) pose
    pub fn to_world(&self, local: &JointPose) -> JointPose {
        JointPose {
            position: self.transform_point(local.position),
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }
}

/// Flat buffer layout of a joint pose: xyz position then xyzw rotation.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RawJointPose {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
}

const_assert_eq!(std::mem::size_of::<RawJointPose>(), 7 * 4);

/// Number of `f32` values per joint in a flat pose buffer
pub const FLOATS_PER_JOINT: usize = 7;

impl From<JointPose> for RawJointPose {
    fn from(pose: JointPose) -> Self {
        Self {
            position: pose.position.to_array(),
            rotation: pose.rotation.to_array(),
        }
    }
}

impl From<RawJointPose> for JointPose {
    fn from(raw: RawJointPose) -> Self {
        Self {
            position: Vec3::from_array(raw.position),
            rotation: Quat::from_array(raw.rotation),
        }
    }
}

/// World-space pose of every joint, indexed by `JointId`.
///
/// Joints absent from a skeleton keep whatever value they were given and are
/// never read by the solvers.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    joints: [JointPose; JointId::COUNT],
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            joints: [JointPose::IDENTITY; JointId::COUNT],
        }
    }
}

impl Index<JointId> for Pose {
    type Output = JointPose;

    #[inline]
    fn index(&self, joint: JointId) -> &JointPose {
        &self.joints[joint.index()]
    }
}

impl IndexMut<JointId> for Pose {
    #[inline]
    fn index_mut(&mut self, joint: JointId) -> &mut JointPose {
        &mut self.joints[joint.index()]
    }
}

impl Pose {
    pub fn new(joints: [JointPose; JointId::COUNT]) -> Self {
        Self { joints }
    }

    #[inline]
    pub fn position(&self, joint: JointId) -> Vec3 {
        self.joints[joint.index()].position
    }

    #[inline]
    pub fn rotation(&self, joint: JointId) -> Quat {
        self.joints[joint.index()].rotation
    }

    #[inline]
    pub fn set_position(&mut self, joint: JointId, position: Vec3) {
        self.joints[joint.index()].position = position;
    }

    #[inline]
    pub fn set_rotation(&mut self, joint: JointId, rotation: Quat) {
        self.joints[joint.index()].rotation = rotation;
    }

    /// Return a new pose with the specified joint position (Functional Set)
    pub fn with_position(mut self, joint: JointId, position: Vec3) -> Self {
        self.set_position(joint, position);
        self
    }

    /// Return a new pose with the specified joint rotation (Functional Set)
    pub fn with_rotation(mut self, joint: JointId, rotation: Quat) -> Self {
        self.set_rotation(joint, rotation);
        self
    }

    pub fn joints(&self) -> &[JointPose; JointId::COUNT] {
        &self.joints
    }

    /// Translate every joint by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        for joint in &mut self.joints {
            joint.position += offset;
        }
    }

    /// Read a pose from a flat buffer of `FLOATS_PER_JOINT * JointId::COUNT` floats.
    /// Returns `None` if the buffer has the wrong length.
    pub fn from_raw(buffer: &[f32]) -> Option<Self> {
        if buffer.len() != FLOATS_PER_JOINT * JointId::COUNT {
            return None;
        }
        let raw: &[RawJointPose] = bytemuck::try_cast_slice(buffer).ok()?;
        let mut pose = Self::default();
        for (joint, raw) in pose.joints.iter_mut().zip(raw) {
            *joint = JointPose::from(*raw);
        }
        Some(pose)
    }

    /// Write this pose into a flat buffer. Returns `false` on a length mismatch.
    pub fn write_raw(&self, buffer: &mut [f32]) -> bool {
        if buffer.len() != FLOATS_PER_JOINT * JointId::COUNT {
            return false;
        }
        let Ok(raw) = bytemuck::try_cast_slice_mut::<f32, RawJointPose>(buffer) else {
            return false;
        };
        for (raw, joint) in raw.iter_mut().zip(&self.joints) {
            *raw = RawJointPose::from(*joint);
        }
        true
    }
}
