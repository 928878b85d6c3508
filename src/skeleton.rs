//! Skeleton model: a strict tree of joints with rest-pose local transforms.
//!
//! Joints are identified by `JointId` and may be absent (a rig without an
//! upper chest, or without finger bones). Parents always precede children in
//! `JointId` order, so a single forward pass over `JointId::ALL` evaluates
//! forward kinematics.

use crate::error::{DeformationError, Result};
use crate::joint::{descendant_masks, JointId, JointMask, JointPose, Pose};
use crate::mapping::{joint_from_name, NamingConvention};
use crate::skeleton_constants::DEFAULT_REST_POSITIONS;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Static joint definition: parent relationship and rest-pose local transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointDef {
    /// Parent joint (None for a root)
    pub parent: Option<JointId>,
    /// Rest transform relative to the parent (world transform for a root)
    pub rest_local: JointPose,
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    joints: [Option<JointDef>; JointId::COUNT],
    present: JointMask,
    descendants: [JointMask; JointId::COUNT],
}

impl Skeleton {
    /// Build a skeleton from world-space rest transforms and explicit parents.
    ///
    /// Every parent must itself be listed and must come before its child in
    /// `JointId` order.
    pub fn from_rest_pose(rest: &Pose, joints: &[(JointId, Option<JointId>)]) -> Result<Self> {
        let mut present = JointMask::empty();
        let mut parents = [None; JointId::COUNT];
        for &(joint, parent) in joints {
            if present.contains(joint) {
                return Err(DeformationError::DuplicateJoint(joint));
            }
            present = present.with(joint);
            parents[joint.index()] = parent;
        }

        let mut defs = [None; JointId::COUNT];
        for joint in present.iter() {
            let parent = parents[joint.index()];
            let rest_local = match parent {
                Some(parent) => {
                    if !present.contains(parent) || parent.index() >= joint.index() {
                        return Err(DeformationError::InvalidParent { joint, parent });
                    }
                    rest[parent].to_local(&rest[joint])
                }
                None => rest[joint],
            };
            defs[joint.index()] = Some(JointDef { parent, rest_local });
        }

        Ok(Self {
            joints: defs,
            present,
            descendants: descendant_masks(&parents),
        })
    }

    /// Build a skeleton over `present` joints using the default humanoid
    /// hierarchy. A joint whose default parent is absent attaches to the
    /// nearest present ancestor instead.
    pub fn with_default_hierarchy(rest: &Pose, present: JointMask) -> Result<Self> {
        let joints: Vec<(JointId, Option<JointId>)> = present
            .iter()
            .map(|joint| (joint, nearest_default_ancestor(joint, present)))
            .collect();
        Self::from_rest_pose(rest, &joints)
    }

    /// The complete default humanoid in its T-pose
    pub fn humanoid() -> Self {
        Self::humanoid_subset(JointMask::all())
    }

    /// The default humanoid restricted to `present` joints
    pub fn humanoid_subset(present: JointMask) -> Self {
        let joints: Vec<(JointId, Option<JointId>)> = present
            .iter()
            .map(|joint| (joint, nearest_default_ancestor(joint, present)))
            .collect();
        let mut defs = [None; JointId::COUNT];
        let mut parents = [None; JointId::COUNT];
        for (joint, parent) in joints {
            let world = JointPose::from_position(DEFAULT_REST_POSITIONS[joint.index()]);
            let rest_local = match parent {
                Some(parent) => {
                    JointPose::from_position(DEFAULT_REST_POSITIONS[parent.index()]).to_local(&world)
                }
                None => world,
            };
            parents[joint.index()] = parent;
            defs[joint.index()] = Some(JointDef { parent, rest_local });
        }
        Self {
            joints: defs,
            present,
            descendants: descendant_masks(&parents),
        }
    }

    #[inline]
    pub fn contains(&self, joint: JointId) -> bool {
        self.present.contains(joint)
    }

    /// Mask of joints defined in this skeleton
    #[inline]
    pub fn present(&self) -> JointMask {
        self.present
    }

    pub fn joint(&self, joint: JointId) -> Option<&JointDef> {
        self.joints[joint.index()].as_ref()
    }

    pub fn parent(&self, joint: JointId) -> Option<JointId> {
        self.joint(joint).and_then(|def| def.parent)
    }

    pub fn rest_local(&self, joint: JointId) -> Option<JointPose> {
        self.joint(joint).map(|def| def.rest_local)
    }

    /// The joint itself and everything below it
    pub fn descendants(&self, joint: JointId) -> JointMask {
        self.descendants[joint.index()].intersection(self.present)
    }

    /// First present joint among `candidates`
    pub fn first_present(&self, candidates: &[JointId]) -> Option<JointId> {
        candidates.iter().copied().find(|joint| self.contains(*joint))
    }

    /// World-space rest pose
    pub fn rest_pose(&self) -> Pose {
        let mut locals = Pose::default();
        for joint in self.present.iter() {
            if let Some(def) = self.joint(joint) {
                locals[joint] = def.rest_local;
            }
        }
        self.to_world(&locals)
    }

    /// Convert world transforms into parent-relative transforms.
    /// Absent joints are left at identity.
    pub fn to_local(&self, world: &Pose) -> Pose {
        let mut locals = Pose::default();
        for joint in self.present.iter() {
            locals[joint] = self.local_of(world, joint);
        }
        locals
    }

    /// Parent-relative transform of a single joint
    pub fn local_of(&self, world: &Pose, joint: JointId) -> JointPose {
        match self.parent(joint) {
            Some(parent) => world[parent].to_local(&world[joint]),
            None => world[joint],
        }
    }

    /// Forward kinematics: compose parent-relative transforms into world ones
    pub fn to_world(&self, locals: &Pose) -> Pose {
        let mut world = Pose::default();
        for joint in self.present.iter() {
            world[joint] = match self.parent(joint) {
                Some(parent) => world[parent].to_world(&locals[joint]),
                None => locals[joint],
            };
        }
        world
    }

    /// Parse a skeleton description, returning the skeleton and its rest pose.
    pub fn from_json(json: &str) -> Result<(Self, Pose)> {
        let description: SkeletonJson = serde_json::from_str(json)?;
        description.to_skeleton()
    }
}

/// Nearest ancestor of `joint` in the default hierarchy that is in `present`
fn nearest_default_ancestor(joint: JointId, present: JointMask) -> Option<JointId> {
    let mut current = joint.default_parent();
    while let Some(candidate) = current {
        if present.contains(candidate) {
            return Some(candidate);
        }
        current = candidate.default_parent();
    }
    None
}

/// JSON description of a single joint's world rest transform
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JointJson {
    pub name: String,
    /// Parent name. Omitted means "nearest present default ancestor".
    #[serde(default)]
    pub parent: Option<String>,
    pub position: [f32; 3],
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

/// JSON description of a skeleton in world-space rest pose
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SkeletonJson {
    #[serde(default)]
    pub naming: NamingConvention,
    pub joints: Vec<JointJson>,
}

impl SkeletonJson {
    pub fn to_skeleton(&self) -> Result<(Skeleton, Pose)> {
        let lookup = |name: &str| {
            joint_from_name(name, self.naming)
                .ok_or_else(|| DeformationError::UnknownJointName(name.to_string()))
        };

        let mut rest = Pose::default();
        let mut present = JointMask::empty();
        let mut resolved = Vec::with_capacity(self.joints.len());
        for joint in &self.joints {
            let id = lookup(&joint.name)?;
            let parent = joint.parent.as_deref().map(lookup).transpose()?;
            rest[id] = JointPose::new(
                Vec3::from_array(joint.position),
                Quat::from_array(joint.rotation).normalize(),
            );
            present = present.with(id);
            resolved.push((id, parent));
        }

        let joints: Vec<(JointId, Option<JointId>)> = resolved
            .into_iter()
            .map(|(id, parent)| (id, parent.or_else(|| nearest_default_ancestor(id, present))))
            .collect();

        let skeleton = Skeleton::from_rest_pose(&rest, &joints)?;
        Ok((skeleton, rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanoid_rest_pose_matches_constants() {
        let skeleton = Skeleton::humanoid();
        let rest = skeleton.rest_pose();
        for joint in JointId::ALL {
            assert!(
                rest.position(joint).distance(DEFAULT_REST_POSITIONS[joint.index()]) < 1e-5,
                "{:?} rest position drifted",
                joint
            );
        }
    }

    #[test]
    fn test_subset_reparents_to_nearest_ancestor() {
        let present = JointMask::all()
            .without(JointId::SpineUpper)
            .without(JointId::Chest);
        let skeleton = Skeleton::humanoid_subset(present);

        assert!(!skeleton.contains(JointId::Chest));
        assert_eq!(skeleton.parent(JointId::Neck), Some(JointId::SpineLower));
        assert_eq!(skeleton.parent(JointId::LeftShoulder), Some(JointId::SpineLower));

        let rest = skeleton.rest_pose();
        assert!(rest.position(JointId::Neck).distance(DEFAULT_REST_POSITIONS[JointId::Neck.index()]) < 1e-5);
    }

    #[test]
    fn test_parent_must_precede_child() {
        let rest = Skeleton::humanoid().rest_pose();
        let result = Skeleton::from_rest_pose(
            &rest,
            &[(JointId::Hips, Some(JointId::Head)), (JointId::Head, None)],
        );
        assert!(matches!(
            result,
            Err(DeformationError::InvalidParent {
                joint: JointId::Hips,
                parent: JointId::Head
            })
        ));
    }

    #[test]
    fn test_parent_must_be_present() {
        let rest = Skeleton::humanoid().rest_pose();
        let result = Skeleton::from_rest_pose(&rest, &[(JointId::Head, Some(JointId::Neck))]);
        assert!(matches!(result, Err(DeformationError::InvalidParent { .. })));
    }

    #[test]
    fn test_duplicate_joint_rejected() {
        let rest = Skeleton::humanoid().rest_pose();
        let result =
            Skeleton::from_rest_pose(&rest, &[(JointId::Hips, None), (JointId::Hips, None)]);
        assert!(matches!(result, Err(DeformationError::DuplicateJoint(JointId::Hips))));
    }

    #[test]
    fn test_local_world_round_trip() {
        let skeleton = Skeleton::humanoid();
        let mut pose = skeleton.rest_pose();
        pose[JointId::Chest].rotation = Quat::from_rotation_x(0.4);
        pose[JointId::LeftLowerArm].position += Vec3::new(0.0, 0.05, 0.02);

        let locals = skeleton.to_local(&pose);
        let world = skeleton.to_world(&locals);
        for joint in JointId::ALL {
            assert!(world.position(joint).distance(pose.position(joint)) < 1e-5);
            assert!(world.rotation(joint).angle_between(pose.rotation(joint)) < 1e-4);
        }
    }

    #[test]
    fn test_descendants_respect_presence() {
        let skeleton = Skeleton::humanoid_subset(JointMask::from_joints(&JointId::SPINE_CHAIN));
        let below_chest = skeleton.descendants(JointId::Chest);
        assert_eq!(
            below_chest,
            JointMask::from_joints(&[JointId::Chest, JointId::Neck, JointId::Head])
        );
    }

    #[test]
    fn test_skeleton_json() {
        let json = r#"{
            "naming": "unity_humanoid",
            "joints": [
                { "name": "Hips", "position": [0, 1, 0] },
                { "name": "Spine", "position": [0, 1.1, 0] },
                { "name": "Neck", "position": [0, 1.4, 0] },
                { "name": "Head", "parent": "Neck", "position": [0, 1.55, 0] }
            ]
        }"#;

        let (skeleton, rest) = Skeleton::from_json(json).unwrap();
        assert!(skeleton.contains(JointId::SpineLower));
        assert!(!skeleton.contains(JointId::Chest));
        assert_eq!(skeleton.parent(JointId::Neck), Some(JointId::SpineLower));
        assert_eq!(rest.position(JointId::Head), Vec3::new(0.0, 1.55, 0.0));

        let local = skeleton.rest_local(JointId::Head).unwrap();
        assert!(local.position.distance(Vec3::new(0.0, 0.15, 0.0)) < 1e-5);
    }

    #[test]
    fn test_skeleton_json_unknown_name() {
        let json = r#"{ "joints": [ { "name": "Tail", "position": [0, 0, 0] } ] }"#;
        assert!(matches!(
            Skeleton::from_json(json),
            Err(DeformationError::UnknownJointName(name)) if name == "Tail"
        ));
    }
}
