use crate::joint::JointPose;
use glam::{Quat, Vec3};

/// Seat point the hips are pinned to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HipPinningTarget {
    /// Calibrated hips position
    pub rest_position: Vec3,
    /// Calibrated hips rotation; yaw limits are measured from it
    pub rest_rotation: Quat,
    /// Where the hips are pinned this frame
    pub position: Vec3,
}

impl Default for HipPinningTarget {
    fn default() -> Self {
        Self::new(JointPose::IDENTITY)
    }
}

impl HipPinningTarget {
    pub fn new(rest: JointPose) -> Self {
        Self {
            rest_position: rest.position,
            rest_rotation: rest.rotation,
            position: rest.position,
        }
    }

    /// Re-center on the current hips pose
    pub fn calibrate(&mut self, hips: &JointPose) {
        *self = Self::new(*hips);
    }

    /// Follow `tracked` inside the box of half extents `bounds` around the
    /// calibrated position.
    pub fn follow_within(&mut self, tracked: Vec3, bounds: Vec3) {
        self.position = tracked.clamp(self.rest_position - bounds, self.rest_position + bounds);
    }

    /// Stay on the calibrated position
    pub fn reset(&mut self) {
        self.position = self.rest_position;
    }

    pub fn distance_from_rest(&self, point: Vec3) -> f32 {
        point.distance(self.rest_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_clamps_to_box_boundary() {
        let mut target = HipPinningTarget::new(JointPose::from_position(Vec3::new(0.0, 0.5, 0.0)));
        let bounds = Vec3::new(0.1, 0.05, 0.2);

        target.follow_within(Vec3::new(0.3, 0.5, -0.05), bounds);
        assert_eq!(target.position, Vec3::new(0.1, 0.5, -0.05));

        target.follow_within(Vec3::new(-1.0, -1.0, 1.0), bounds);
        assert!(target.position.distance(Vec3::new(-0.1, 0.45, 0.2)) < 1e-6);

        target.follow_within(Vec3::new(0.02, 0.51, 0.0), bounds);
        assert_eq!(target.position, Vec3::new(0.02, 0.51, 0.0));

        target.reset();
        assert_eq!(target.position, target.rest_position);
    }

    #[test]
    fn test_calibrate() {
        let mut target = HipPinningTarget::default();
        let hips = JointPose::new(Vec3::new(1.0, 0.4, 2.0), Quat::from_rotation_y(0.5));
        target.calibrate(&hips);
        assert_eq!(target.rest_position, hips.position);
        assert_eq!(target.position, hips.position);
        assert_eq!(target.rest_rotation, hips.rotation);
    }
}
