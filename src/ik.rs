use crate::joint::{JointId, JointPose, Pose};
use crate::math::{from_to_rotation, triangle_angle, weighted_rotation};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Bend axes shorter than this are treated as undefined
const MIN_AXIS_LENGTH: f32 = 0.001;

/// Blend weights of the two-bone solver, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TwoBoneIkSettings {
    /// How far the end joint moves from its current position toward the target
    pub position_weight: f32,
    /// How far the end joint turns toward the target rotation
    pub rotation_weight: f32,
    /// How strongly the bend plane turns toward the pole
    pub pole_weight: f32,
}

impl Default for TwoBoneIkSettings {
    fn default() -> Self {
        Self {
            position_weight: 1.0,
            rotation_weight: 1.0,
            pole_weight: 1.0,
        }
    }
}

/// World poses of a solved upper -> middle -> lower chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoBoneIkSolution {
    pub upper: JointPose,
    pub middle: JointPose,
    pub lower: JointPose,
}

/// Solve a two-bone chain analytically.
///
/// # Arguments
/// * `chain` - World poses of the upper, middle and lower (end) joints
/// * `target` - World pose the lower joint should reach
/// * `pole` - Optional world point the middle joint should bend toward
///
/// Bone lengths are preserved. Unreachable targets leave the chain fully
/// extended toward them.
pub fn solve_two_bone_ik(
    chain: [JointPose; 3],
    target: JointPose,
    pole: Option<Vec3>,
    settings: &TwoBoneIkSettings,
) -> TwoBoneIkSolution {
    let [upper, middle, lower] = chain;
    let a = upper.position;
    let b = middle.position;
    let c = lower.position;
    let t = c.lerp(target.position, settings.position_weight);
    let target_rotation = lower.rotation.slerp(target.rotation, settings.rotation_weight);

    let ab = b - a;
    let bc = c - b;
    let ac = c - a;
    let at = t - a;
    let ab_len = ab.length();
    let bc_len = bc.length();

    let old_angle = triangle_angle(ac.length(), ab_len, bc_len);
    let new_angle = triangle_angle(at.length(), ab_len, bc_len);

    // Bend axis, falling back through the pole and the target when the chain is straight
    let axis = [
        Some(ab.cross(bc)),
        pole.map(|pole| (pole - a).cross(bc)),
        Some(at.cross(bc)),
    ]
    .into_iter()
    .flatten()
    .find(|axis| axis.length() >= MIN_AXIS_LENGTH)
    .map(Vec3::normalize)
    .unwrap_or(Vec3::Y);

    let bend = Quat::from_axis_angle(axis, old_angle - new_angle);
    let bent_c = b + bend * bc;
    let mut root = from_to_rotation(bent_c - a, at);

    if let Some(pole) = pole {
        let b_solved = a + root * ab;
        let c_solved = a + root * (bent_c - a);
        let ac_solved = c_solved - a;
        let ac_sq = ac_solved.length_squared();
        if ac_sq > 0.0 {
            let project = |p: Vec3| p - a - ac_solved * ((p - a).dot(ac_solved) / ac_sq);
            let ab_proj = project(b_solved);
            let ah_proj = project(pole);
            let max_reach = ab_len + bc_len;
            if ab_proj.length_squared() > max_reach * max_reach * 0.001 && ah_proj.length_squared() > 0.0 {
                let twist = from_to_rotation(ab_proj, ah_proj);
                root = weighted_rotation(twist, settings.pole_weight) * root;
            }
        }
    }

    TwoBoneIkSolution {
        upper: JointPose::new(a, (root * upper.rotation).normalize()),
        middle: JointPose::new(a + root * ab, (root * bend * middle.rotation).normalize()),
        lower: JointPose::new(a + root * (bent_c - a), target_rotation.normalize()),
    }
}

/// Solve a chain stored in `pose` and write the result back.
pub fn solve_in_pose(
    pose: &mut Pose,
    chain: [JointId; 3],
    target: JointPose,
    pole: Option<Vec3>,
    settings: &TwoBoneIkSettings,
) -> TwoBoneIkSolution {
    let solution = solve_two_bone_ik(chain.map(|joint| pose[joint]), target, pole, settings);
    pose[chain[0]] = solution.upper;
    pose[chain[1]] = solution.middle;
    pose[chain[2]] = solution.lower;
    solution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::Side;
    use crate::skeleton::Skeleton;
    use std::f32::consts::FRAC_PI_2;

    fn bent_chain() -> [JointPose; 3] {
        [
            JointPose::from_position(Vec3::ZERO),
            JointPose::from_position(Vec3::new(1.0, 0.0, 0.0)),
            JointPose::from_position(Vec3::new(1.0, 1.0, 0.0)),
        ]
    }

    fn assert_lengths_kept(solution: &TwoBoneIkSolution) {
        let upper = solution.upper.position.distance(solution.middle.position);
        let lower = solution.middle.position.distance(solution.lower.position);
        assert!((upper - 1.0).abs() < 1e-4, "upper bone {}", upper);
        assert!((lower - 1.0).abs() < 1e-4, "lower bone {}", lower);
    }

    #[test]
    fn test_straight_reach() {
        let target = JointPose::from_position(Vec3::new(0.0, 2.0, 0.0));
        let solution = solve_two_bone_ik(bent_chain(), target, None, &TwoBoneIkSettings::default());

        assert!(solution.lower.position.distance(target.position) < 1e-4);
        // Fully extended: the middle joint lies on the root -> target line
        assert!(solution.middle.position.distance(Vec3::new(0.0, 1.0, 0.0)) < 1e-4);
        assert_lengths_kept(&solution);
    }

    #[test]
    fn test_bent_reach() {
        let target = JointPose::from_position(Vec3::new(0.5, 1.2, 0.3));
        let solution = solve_two_bone_ik(bent_chain(), target, None, &TwoBoneIkSettings::default());

        assert!(solution.lower.position.distance(target.position) < 1e-4);
        assert_eq!(solution.upper.position, Vec3::ZERO);
        assert_lengths_kept(&solution);
    }

    #[test]
    fn test_unreachable_target_extends_toward_it() {
        let target = JointPose::from_position(Vec3::new(0.0, 3.0, 0.0));
        let solution = solve_two_bone_ik(bent_chain(), target, None, &TwoBoneIkSettings::default());

        assert!(solution.lower.position.distance(Vec3::new(0.0, 2.0, 0.0)) < 1e-4);
        assert_lengths_kept(&solution);
    }

    #[test]
    fn test_straight_chain_bends_toward_pole() {
        let chain = [
            JointPose::from_position(Vec3::ZERO),
            JointPose::from_position(Vec3::new(1.0, 0.0, 0.0)),
            JointPose::from_position(Vec3::new(2.0, 0.0, 0.0)),
        ];
        let target = JointPose::from_position(Vec3::new(1.5, 0.0, 0.0));

        let up = solve_two_bone_ik(chain, target, Some(Vec3::new(1.0, 1.0, 0.0)), &TwoBoneIkSettings::default());
        assert!(up.lower.position.distance(target.position) < 1e-4);
        assert!(up.middle.position.y > 0.5);
        assert_lengths_kept(&up);

        let back = solve_two_bone_ik(chain, target, Some(Vec3::new(1.0, 0.0, -1.0)), &TwoBoneIkSettings::default());
        assert!(back.middle.position.z < -0.5);
        assert!(back.middle.position.y.abs() < 1e-4);
    }

    #[test]
    fn test_pole_twists_bent_chain() {
        let target = JointPose::from_position(Vec3::new(0.0, 1.5, 0.0));
        let pole = Vec3::new(0.0, 0.75, 1.0);
        let solution = solve_two_bone_ik(bent_chain(), target, Some(pole), &TwoBoneIkSettings::default());

        assert!(solution.lower.position.distance(target.position) < 1e-4);
        assert!(solution.middle.position.z > 0.5);
        assert_lengths_kept(&solution);

        let settings = TwoBoneIkSettings {
            pole_weight: 0.0,
            ..Default::default()
        };
        let unpoled = solve_two_bone_ik(bent_chain(), target, Some(pole), &settings);
        assert!(unpoled.middle.position.z.abs() < 1e-4);
    }

    #[test]
    fn test_rotation_weight_blends_end_rotation() {
        let target_rotation = Quat::from_rotation_y(FRAC_PI_2);
        let target = JointPose::new(Vec3::new(0.5, 1.2, 0.0), target_rotation);

        let full = solve_two_bone_ik(bent_chain(), target, None, &TwoBoneIkSettings::default());
        assert!(full.lower.rotation.angle_between(target_rotation) < 1e-4);

        let settings = TwoBoneIkSettings {
            rotation_weight: 0.5,
            ..Default::default()
        };
        let half = solve_two_bone_ik(bent_chain(), target, None, &settings);
        let expected = Quat::from_rotation_y(FRAC_PI_2 * 0.5);
        assert!(half.lower.rotation.angle_between(expected) < 1e-4);
    }

    #[test]
    fn test_zero_position_weight_keeps_chain() {
        let settings = TwoBoneIkSettings {
            position_weight: 0.0,
            ..Default::default()
        };
        let target = JointPose::from_position(Vec3::new(0.0, 2.0, 0.0));
        let solution = solve_two_bone_ik(bent_chain(), target, None, &settings);

        for (solved, original) in [solution.upper, solution.middle, solution.lower]
            .iter()
            .zip(bent_chain())
        {
            assert!(solved.position.distance(original.position) < 1e-5);
        }
    }

    #[test]
    fn test_solve_in_pose_moves_hand() {
        let skeleton = Skeleton::humanoid();
        let mut pose = skeleton.rest_pose();
        let chain = JointId::arm(Side::Left);
        let root = pose.position(chain[0]);
        let target = JointPose::from_position(root + Vec3::new(-0.3, -0.3, 0.1));
        let pole = root + Vec3::new(0.0, 0.0, -1.0);

        solve_in_pose(&mut pose, chain, target, Some(pole), &TwoBoneIkSettings::default());
        assert!(pose.position(chain[2]).distance(target.position) < 1e-4);
        assert_eq!(pose.position(chain[0]), root);
    }
}
