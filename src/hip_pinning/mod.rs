//! Pins the hips to a calibrated seat point for seated avatars.

pub mod settings;
pub mod target;

pub use settings::{
    BodyJointProperties, HipPinningProperties, HipPinningSettings, HipPropagation, RotationLimits,
};
pub use target::HipPinningTarget;

use crate::error::Result;
use crate::joint::{JointId, JointPose, Pose};
use crate::math::yaw_degrees;
use crate::mirror::copy_local;
use crate::skeleton::Skeleton;
use glam::Quat;

/// Notifications sent to registered listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HipPinningEvent {
    Entered,
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LimitSide {
    Min,
    Max,
}

/// Yaw clamp with hysteresis at the +-180 seam.
///
/// A jump of more than 180 degrees between frames means the heading wrapped
/// around; the limiter then holds the side it last clamped to instead of
/// snapping to the opposite limit, until the heading is back in range or
/// wraps back.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct YawLimiter {
    should_flip: bool,
    previous_yaw: Option<f32>,
    last_side: Option<LimitSide>,
}

impl YawLimiter {
    fn clamp(&mut self, yaw: f32, min: f32, max: f32) -> f32 {
        if let Some(previous) = self.previous_yaw {
            if (yaw - previous).abs() > 180.0 {
                self.should_flip = !self.should_flip;
            }
        }
        self.previous_yaw = Some(yaw);

        let in_range = (min..=max).contains(&yaw);
        if self.should_flip && in_range {
            self.should_flip = false;
        }
        if self.should_flip {
            return match self.last_side {
                Some(LimitSide::Min) => min,
                Some(LimitSide::Max) => max,
                None => yaw.clamp(min, max),
            };
        }

        if yaw < min {
            self.last_side = Some(LimitSide::Min);
            min
        } else if yaw > max {
            self.last_side = Some(LimitSide::Max);
            max
        } else {
            yaw
        }
    }
}

/// Hip pinning solver. Inactive until `activate` is called.
pub struct HipPinning {
    settings: HipPinningSettings,
    properties: HipPinningProperties,
    target: HipPinningTarget,
    active: bool,
    yaw: YawLimiter,
    constraint_weights: Vec<f32>,
    listeners: Vec<Box<dyn FnMut(HipPinningEvent)>>,
}

impl HipPinning {
    pub fn new(
        settings: HipPinningSettings,
        properties: HipPinningProperties,
        target: HipPinningTarget,
    ) -> Result<Self> {
        settings.validate()?;
        let constraint_weights = properties.joints.iter().map(|p| p.constraint_weight).collect();
        Ok(Self {
            settings,
            properties,
            target,
            active: false,
            yaw: YawLimiter::default(),
            constraint_weights,
            listeners: Vec::new(),
        })
    }

    /// Default properties for `skeleton`, calibrated on the rest hips
    pub fn from_rest(skeleton: &Skeleton, rest: &Pose, settings: HipPinningSettings) -> Result<Self> {
        Self::new(
            settings,
            HipPinningProperties::from_rest(skeleton, rest),
            HipPinningTarget::new(rest[JointId::Hips]),
        )
    }

    pub fn settings(&self) -> &HipPinningSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: HipPinningSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn properties(&self) -> &HipPinningProperties {
        &self.properties
    }

    pub fn set_properties(&mut self, properties: HipPinningProperties) {
        self.constraint_weights = properties.joints.iter().map(|p| p.constraint_weight).collect();
        self.properties = properties;
    }

    pub fn target(&self) -> &HipPinningTarget {
        &self.target
    }

    /// External constraint weight per property joint, from the last update
    pub fn constraint_weights(&self) -> &[f32] {
        &self.constraint_weights
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn on_event(&mut self, listener: impl FnMut(HipPinningEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn activate(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.yaw = YawLimiter::default();
        self.emit(HipPinningEvent::Entered);
    }

    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.emit(HipPinningEvent::Exited);
    }

    /// Re-center the seat point on `hips`
    pub fn calibrate(&mut self, hips: &JointPose) {
        self.target.calibrate(hips);
        self.yaw = YawLimiter::default();
        log::info!("Hip pinning calibrated at {:?}", hips.position);
    }

    /// Write `tracked` into `output`, pinned if active.
    pub fn update(&mut self, skeleton: &Skeleton, tracked: &Pose, output: &mut Pose) {
        copy_local(skeleton, tracked, output, skeleton.present());
        if !self.active {
            return;
        }

        let tracked_hips = tracked.position(JointId::Hips);
        if let Some(range) = self.settings.leave_range {
            if self.target.distance_from_rest(tracked_hips) > range {
                log::info!("Tracked hips left the pinning range, releasing");
                self.deactivate();
                return;
            }
        }

        if self.settings.constrained_movement {
            self.target.follow_within(tracked_hips, self.settings.movement_bounds);
        } else {
            self.target.reset();
        }
        let delta = self.target.position - tracked_hips;
        output.set_position(JointId::Hips, self.target.position);

        match self.settings.propagation {
            HipPropagation::Rigid => {
                for joint in skeleton.present().without(JointId::Hips).iter() {
                    output[joint].position += delta;
                }
            }
            HipPropagation::Decreasing { affected_joints } => {
                for properties in self.properties.joints.iter().take(affected_joints) {
                    if skeleton.contains(properties.joint) {
                        output[properties.joint].position += delta * properties.offset_weight;
                    }
                }
                self.raise_constraint_weights(output);
            }
        }

        if self.settings.limit_yaw {
            self.limit_yaw(skeleton, output);
        }
    }

    /// Grow each joint's constraint weight by how far it sits past its
    /// threshold from the pinned hips. Not capped.
    fn raise_constraint_weights(&mut self, output: &Pose) {
        let hips = output.position(JointId::Hips);
        self.constraint_weights.clear();
        self.constraint_weights
            .extend(self.properties.joints.iter().map(|properties| {
                let excess = output.position(properties.joint).distance(hips) - properties.distance_threshold;
                if excess > 0.0 {
                    properties.constraint_weight + excess * properties.weight_scale
                } else {
                    properties.constraint_weight
                }
            }));
    }

    /// Clamp the hips yaw. The correction turns the whole body about the
    /// pinned hips so local rotations below them are kept.
    fn limit_yaw(&mut self, skeleton: &Skeleton, output: &mut Pose) {
        let rest_rotation = self.target.rest_rotation;
        let yaw = yaw_degrees(rest_rotation.inverse() * output.rotation(JointId::Hips));
        let limits = &self.properties.limits;
        let clamped = self.yaw.clamp(yaw, limits.min.y, limits.max.y);
        if clamped == yaw {
            return;
        }

        let correction = Quat::from_rotation_y((clamped - yaw).to_radians());
        let world_correction = (rest_rotation * correction * rest_rotation.inverse()).normalize();
        let pivot = output.position(JointId::Hips);
        for joint in skeleton.descendants(JointId::Hips).iter() {
            let pose = &mut output[joint];
            pose.position = pivot + world_correction * (pose.position - pivot);
            pose.rotation = (world_correction * pose.rotation).normalize();
        }
    }

    fn emit(&mut self, event: HipPinningEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}
