use super::arm::ArmChain;
use super::bone_pairs::{chest_reference, BonePairs};
use super::settings::{DeformationSettings, ShoulderBlendSpace, SpineCorrectionPolicy};
use crate::error::{DeformationError, Result};
use crate::joint::{JointId, JointMask, Pose, Side};
use crate::math::{horizontal, EPSILON};
use crate::skeleton::Skeleton;
use glam::Vec3;

/// Tracked spine endpoints that spine correction pins to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpineTargets {
    pub hips: Vec3,
    pub head: Vec3,
}

impl SpineTargets {
    /// Targets taken from the incoming (not yet deformed) pose
    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            hips: pose.position(JointId::Hips),
            head: pose.position(JointId::Head),
        }
    }
}

/// Proportion-preserving deformation of a tracked humanoid pose.
///
/// Bound once against a skeleton and its rest pose; `evaluate` then runs on
/// every frame without allocating beyond one scratch copy of the pose.
#[derive(Debug, Clone)]
pub struct DeformationEngine {
    skeleton: Skeleton,
    rest: Pose,
    pairs: BonePairs,
    arms: [Option<ArmChain>; 2],
    chest: JointId,
    /// Joints whose positions the engine writes; everything else follows its parent
    driven: JointMask,
    settings: DeformationSettings,
    rest_scale: Vec3,
    scale_factor: Vec3,
}

impl DeformationEngine {
    /// Capture bone pairs and arm data from the rest pose.
    ///
    /// Missing hips or head, or a zero-length spine, fail the bind. An arm
    /// that cannot be captured is logged and left uncorrected.
    pub fn bind(skeleton: Skeleton, rest: Pose, settings: DeformationSettings) -> Result<Self> {
        settings.validate()?;
        let chest = chest_reference(&skeleton).ok_or(DeformationError::MissingJoint(JointId::Hips))?;

        let arms = Side::BOTH.map(|side| match ArmChain::capture(&skeleton, &rest, side, chest) {
            Ok(arm) => Some(arm),
            Err(e) => {
                log::warn!("{}, passing the arm through", e);
                None
            }
        });
        let pairs = BonePairs::build(&skeleton, &rest, &arms)?;

        let mut driven = JointMask::from_joints(&JointId::SPINE_CHAIN).intersection(skeleton.present());
        for arm in arms.iter().flatten() {
            driven = driven.union(JointMask::from_joints(&arm.limb()));
            if let Some(shoulder) = arm.shoulder {
                driven = driven.with(shoulder);
            }
        }

        log::info!(
            "Bound deformation rig: {} bone pairs, spine height {:.3}m",
            pairs.len(),
            pairs.total_height()
        );

        Ok(Self {
            skeleton,
            rest,
            pairs,
            arms,
            chest,
            driven,
            settings,
            rest_scale: Vec3::ONE,
            scale_factor: Vec3::ONE,
        })
    }

    /// Character scale the rest pose was captured at
    pub fn with_rest_scale(mut self, rest_scale: Vec3) -> Self {
        self.rest_scale = rest_scale;
        self.scale_factor = Vec3::ONE;
        self
    }

    /// Current character scale; bone lengths are multiplied by
    /// `scale / rest_scale` componentwise.
    pub fn set_character_scale(&mut self, scale: Vec3) {
        if self.rest_scale.cmple(Vec3::splat(EPSILON)).any() {
            log::warn!("Rest scale {:?} has a zero component, ignoring character scale", self.rest_scale);
            return;
        }
        self.scale_factor = scale / self.rest_scale;
    }

    pub fn scale_factor(&self) -> Vec3 {
        self.scale_factor
    }

    pub fn settings(&self) -> &DeformationSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: DeformationSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn bone_pairs(&self) -> &BonePairs {
        &self.pairs
    }

    /// Captured arm, `None` if that arm passes through
    pub fn arm(&self, side: Side) -> Option<&ArmChain> {
        self.arms[side.index()].as_ref()
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn rest_pose(&self) -> &Pose {
        &self.rest
    }

    /// Evaluate at the configured overall weight
    pub fn apply(&self, pose: &mut Pose) {
        self.evaluate(pose, self.settings.overall_weight);
    }

    /// Functional form of `evaluate`
    pub fn evaluated(&self, mut pose: Pose, weight: f32) -> Pose {
        self.evaluate(&mut pose, weight);
        pose
    }

    /// Deform `pose` in place, pinning spine correction to the pose's own
    /// hips and head.
    pub fn evaluate(&self, pose: &mut Pose, weight: f32) {
        let targets = SpineTargets::from_pose(pose);
        self.evaluate_with_targets(pose, targets, weight);
    }

    /// Deform `pose` in place. `weight` 0 leaves the pose untouched.
    ///
    /// Steps run in a fixed order: spine alignment, shoulder interpolation,
    /// proportion enforcement, spine correction, arm then hand interpolation.
    /// Joints the engine does not drive (legs, fingers) follow the
    /// displacement of their nearest parent.
    pub fn evaluate_with_targets(&self, pose: &mut Pose, targets: SpineTargets, weight: f32) {
        if weight == 0.0 {
            return;
        }
        let original = pose.clone();

        if self.settings.weights.aligns_spine() {
            self.align_spine(pose, weight);
        }
        self.interpolate_shoulders(pose, weight);

        let directions = self.bone_directions(pose);
        self.enforce_original_skeletal_proportions(pose, &directions, weight);

        if self.settings.spine_correction != SpineCorrectionPolicy::None {
            self.correct_spine(pose, targets, weight);
        }

        self.interpolate_arms(pose, &original, weight);
        self.interpolate_hands(pose, &original, weight);
        self.carry_undriven(pose, &original);
    }

    /// Pull spine joints horizontally toward the hips -> head line.
    /// Heights are kept.
    fn align_spine(&self, pose: &mut Pose, weight: f32) {
        let hips = pose.position(JointId::Hips);
        let head = pose.position(JointId::Head);
        let weights = &self.settings.weights;
        let channels = [
            (JointId::SpineLower, weights.spine_lower_alignment_weight, 1.0),
            (JointId::SpineUpper, weights.spine_upper_alignment_weight, 0.5),
            (JointId::Chest, weights.chest_alignment_weight, 0.25),
        ];

        for (joint, channel_weight, hips_share) in channels {
            if channel_weight == 0.0 || !self.skeleton.contains(joint) {
                continue;
            }
            let original = pose.position(joint);
            let offset = horizontal(hips - original) * hips_share
                + horizontal(head - original) * (1.0 - hips_share);
            let target = original + offset * channel_weight;
            let mut aligned = original.lerp(target, weight);
            aligned.y = original.y;
            pose.set_position(joint, aligned);
        }
    }

    /// Blend each shoulder toward its rest offset from the chest.
    fn interpolate_shoulders(&self, pose: &mut Pose, weight: f32) {
        for arm in self.arms.iter().flatten() {
            let Some(shoulder) = arm.shoulder else {
                continue;
            };
            let t = weight * self.settings.weights.shoulder(arm.side);
            if t == 0.0 {
                continue;
            }

            let current = pose.position(shoulder);
            let blended = match (self.settings.shoulder_blend_space, self.skeleton.parent(shoulder)) {
                (ShoulderBlendSpace::Local, Some(parent)) => {
                    let frame = pose[parent];
                    let local = frame.to_local(&pose[shoulder]).position;
                    frame.transform_point(local.lerp(arm.rest_shoulder_local * self.scale_factor, t))
                }
                _ => {
                    let chest = pose[self.chest];
                    let target = chest.transform_point(arm.rest_shoulder_offset * self.scale_factor);
                    current.lerp(target, t)
                }
            };
            pose.set_position(shoulder, blended);
        }
    }

    /// Unit direction of every bone pair in the current pose. Coincident
    /// joints fall back to the rest direction carried by the start joint.
    fn bone_directions(&self, pose: &Pose) -> Vec<Vec3> {
        self.pairs
            .pairs()
            .iter()
            .map(|pair| {
                (pose.position(pair.end) - pose.position(pair.start))
                    .try_normalize()
                    .unwrap_or_else(|| pose.rotation(pair.start) * pair.rest_direction)
            })
            .collect()
    }

    /// Place each pair's end at its rest distance from the start, along the
    /// tracked direction. Pairs run root outwards so every start is final.
    fn enforce_original_skeletal_proportions(&self, pose: &mut Pose, directions: &[Vec3], weight: f32) {
        for (pair, direction) in self.pairs.pairs().iter().zip(directions) {
            let start = pose.position(pair.start);
            let target = start + (*direction * pair.distance) * self.scale_factor;
            let end = pose.position(pair.end).lerp(target, weight);
            pose.set_position(pair.end, end);
        }
    }

    fn correct_spine(&self, pose: &mut Pose, targets: SpineTargets, weight: f32) {
        let anchors_before = self.arm_anchor_positions(pose);

        match self.settings.spine_correction {
            SpineCorrectionPolicy::None => return,
            SpineCorrectionPolicy::AccurateHead => self.pin_head(pose, targets.head, weight),
            SpineCorrectionPolicy::AccurateHips => self.pin_hips(pose, targets.hips, weight),
            SpineCorrectionPolicy::AccurateHipsAndHead => {
                self.pin_hips(pose, targets.hips, weight);
                self.pin_head(pose, targets.head, weight);
            }
        }

        self.interpolate_shoulders(pose, weight);
        for (arm, before) in self.arms.iter().zip(anchors_before) {
            let (Some(arm), Some(before)) = (arm, before) else {
                continue;
            };
            let shift = pose.position(arm.anchor(self.chest)) - before;
            for joint in arm.limb() {
                pose[joint].position += shift;
            }
        }
    }

    /// Move the torso rigidly so the hips land on the tracked hips
    fn pin_hips(&self, pose: &mut Pose, target: Vec3, weight: f32) {
        let offset = (target - pose.position(JointId::Hips)) * weight;
        let torso = self
            .arms
            .iter()
            .flatten()
            .filter_map(|arm| arm.shoulder)
            .chain(JointId::SPINE_CHAIN);
        for joint in torso.filter(|joint| self.skeleton.contains(*joint)) {
            pose[joint].position += offset;
        }
    }

    /// Spread the head error along the spine by cumulative proportion, then
    /// snap the head.
    fn pin_head(&self, pose: &mut Pose, target: Vec3, weight: f32) {
        let head = pose.position(JointId::Head);
        let error = target - head;
        let mut cumulative = 0.0;
        for pair in self.pairs.spine() {
            cumulative += pair.limb_proportion;
            pose[pair.end].position += error * cumulative * weight;
        }
        pose.set_position(JointId::Head, head.lerp(target, weight));
    }

    fn arm_anchor_positions(&self, pose: &Pose) -> [Option<Vec3>; 2] {
        self.arms
            .map(|arm| arm.map(|arm| pose.position(arm.anchor(self.chest))))
    }

    /// Blend elbows and upper arms back toward their incoming positions
    fn interpolate_arms(&self, pose: &mut Pose, original: &Pose, weight: f32) {
        for arm in self.arms.iter().flatten() {
            let t = weight * self.settings.weights.arm(arm.side);
            for joint in [arm.upper_arm, arm.lower_arm] {
                let blended = original.position(joint).lerp(pose.position(joint), t);
                pose.set_position(joint, blended);
            }
        }
    }

    /// Re-seat each hand along the lower arm's rest axis at its current
    /// distance, blended against the incoming hand position.
    fn interpolate_hands(&self, pose: &mut Pose, original: &Pose, weight: f32) {
        for arm in self.arms.iter().flatten() {
            let t = weight * self.settings.weights.hand(arm.side);
            let elbow = pose[arm.lower_arm];
            let reach = pose.position(arm.hand).distance(elbow.position);
            let target = elbow.position + (elbow.rotation * arm.lower_arm_to_hand_axis) * reach;
            pose.set_position(arm.hand, original.position(arm.hand).lerp(target, t));
        }
    }

    /// Translate undriven joints by their parent's displacement so legs and
    /// fingers stay attached.
    fn carry_undriven(&self, pose: &mut Pose, original: &Pose) {
        let mut shifts = [Vec3::ZERO; JointId::COUNT];
        for joint in self.skeleton.present().iter() {
            let shift = if self.driven.contains(joint) {
                pose.position(joint) - original.position(joint)
            } else {
                let inherited = self
                    .skeleton
                    .parent(joint)
                    .map(|parent| shifts[parent.index()])
                    .unwrap_or(Vec3::ZERO);
                pose[joint].position += inherited;
                inherited
            };
            shifts[joint.index()] = shift;
        }
    }
}
