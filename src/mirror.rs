//! Local-space pose copies and left/right mirroring.

use crate::joint::{JointId, JointMask, JointPose, Pose};
use crate::skeleton::Skeleton;
use glam::{Quat, Vec3};

/// Copy the parent-relative transforms of `joints` from `src` into `dst`,
/// then rebuild `dst`'s world transforms root first. Joints outside the mask
/// keep their own local transforms, so they follow any copied ancestor.
pub fn copy_local(skeleton: &Skeleton, src: &Pose, dst: &mut Pose, joints: JointMask) {
    let mut locals = skeleton.to_local(dst);
    for joint in joints.intersection(skeleton.present()).iter() {
        locals[joint] = skeleton.local_of(src, joint);
    }
    let world = skeleton.to_world(&locals);
    for joint in skeleton.present().iter() {
        dst[joint] = world[joint];
    }
}

/// Reflect a world pose across the YZ plane
#[inline]
pub fn mirror_joint_pose(pose: &JointPose) -> JointPose {
    let p = pose.position;
    let q = pose.rotation;
    JointPose::new(Vec3::new(-p.x, p.y, p.z), Quat::from_xyzw(q.x, -q.y, -q.z, q.w))
}

/// Reflect a whole pose across the YZ plane, swapping left and right joints
pub fn mirror_pose(src: &Pose) -> Pose {
    let mut mirrored = Pose::default();
    for joint in JointId::ALL {
        mirrored[joint.mirrored()] = mirror_joint_pose(&src[joint]);
    }
    mirrored
}

/// Copy the mirror image of `src` into the `joints` of `dst` in local space.
/// Selecting the right hand's fingers gives them the left hand's mirrored shape.
pub fn copy_mirrored(skeleton: &Skeleton, src: &Pose, dst: &mut Pose, joints: JointMask) {
    let mirrored = mirror_pose(src);
    copy_local(skeleton, &mirrored, dst, joints);
}
