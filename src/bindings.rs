//! Handle-based wasm API over the deformation engine.
//!
//! Each session owns a bound engine. Poses cross the boundary as flat `f32`
//! buffers of `FLOATS_PER_JOINT` floats per joint, in `JointId` order.

use crate::deformation::{DeformationEngine, DeformationSettings};
use crate::joint::{JointId, Pose, Side, FLOATS_PER_JOINT};
use crate::skeleton::Skeleton;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

pub type SessionHandle = u32;

struct Sessions {
    next_handle: SessionHandle,
    engines: HashMap<SessionHandle, DeformationEngine>,
}

thread_local! {
    static SESSIONS: RefCell<Sessions> = RefCell::new(Sessions {
        next_handle: 1,
        engines: HashMap::new(),
    });
}

fn with_engine<F, R>(handle: SessionHandle, f: F) -> Option<R>
where
    F: FnOnce(&mut DeformationEngine) -> R,
{
    SESSIONS.with(|sessions| sessions.borrow_mut().engines.get_mut(&handle).map(f))
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Bind a new engine from a JSON skeleton description and JSON settings.
/// Returns the session handle.
#[wasm_bindgen]
pub fn create_deformation_session(skeleton_json: &str, settings_json: &str) -> Result<u32, JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();

    let (skeleton, rest) = Skeleton::from_json(skeleton_json).map_err(to_js_error)?;
    let settings = DeformationSettings::from_json(settings_json).map_err(to_js_error)?;
    let engine = DeformationEngine::bind(skeleton, rest, settings).map_err(to_js_error)?;

    let handle = SESSIONS.with(|sessions| {
        let mut sessions = sessions.borrow_mut();
        let handle = sessions.next_handle;
        sessions.next_handle = sessions.next_handle.wrapping_add(1).max(1);
        sessions.engines.insert(handle, engine);
        handle
    });
    log::info!("Created deformation session {}", handle);
    Ok(handle)
}

/// Deform a flat pose buffer in place. Returns false for an unknown handle
/// or a buffer of the wrong length, leaving the buffer untouched.
#[wasm_bindgen]
pub fn evaluate_deformation(handle: u32, pose: &mut [f32], weight: f32) -> bool {
    let Some(mut parsed) = Pose::from_raw(pose) else {
        let expected = JointId::COUNT * FLOATS_PER_JOINT;
        log::warn!("Pose buffer has {} floats, expected {}", pose.len(), expected);
        return false;
    };
    with_engine(handle, |engine| {
        engine.evaluate(&mut parsed, weight);
        parsed.write_raw(pose)
    })
    .unwrap_or(false)
}

/// Replace a session's settings from JSON
#[wasm_bindgen]
pub fn set_deformation_settings(handle: u32, settings_json: &str) -> Result<(), JsValue> {
    let settings = DeformationSettings::from_json(settings_json).map_err(to_js_error)?;
    with_engine(handle, |engine| engine.set_settings(settings))
        .ok_or_else(|| JsValue::from_str("unknown session"))?
        .map_err(to_js_error)
}

/// Set the character's current scale
#[wasm_bindgen]
pub fn set_deformation_scale(handle: u32, x: f32, y: f32, z: f32) -> bool {
    with_engine(handle, |engine| engine.set_character_scale(glam::Vec3::new(x, y, z))).is_some()
}

#[wasm_bindgen]
pub fn destroy_deformation_session(handle: u32) -> bool {
    SESSIONS.with(|sessions| sessions.borrow_mut().engines.remove(&handle).is_some())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BonePairInfo {
    start: &'static str,
    end: &'static str,
    distance: f32,
    height_proportion: f32,
    limb_proportion: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionInfo {
    total_height: f32,
    left_arm: bool,
    right_arm: bool,
    pairs: Vec<BonePairInfo>,
}

/// Bone pairs captured at bind time, for inspection in the host UI
#[wasm_bindgen]
pub fn bone_pair_info(handle: u32) -> Result<JsValue, JsValue> {
    let info = with_engine(handle, |engine| SessionInfo {
        total_height: engine.bone_pairs().total_height(),
        left_arm: engine.arm(Side::Left).is_some(),
        right_arm: engine.arm(Side::Right).is_some(),
        pairs: engine
            .bone_pairs()
            .pairs()
            .iter()
            .map(|pair| BonePairInfo {
                start: pair.start.name(),
                end: pair.end.name(),
                distance: pair.distance,
                height_proportion: pair.height_proportion,
                limb_proportion: pair.limb_proportion,
            })
            .collect(),
    })
    .ok_or_else(|| JsValue::from_str("unknown session"))?;
    serde_wasm_bindgen::to_value(&info).map_err(to_js_error)
}

/// Number of joints a pose buffer holds
#[wasm_bindgen]
pub fn joint_count() -> usize {
    JointId::COUNT
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn skeleton_json() -> String {
        let rest = Skeleton::humanoid().rest_pose();
        let joints: Vec<String> = JointId::ALL
            .iter()
            .map(|joint| {
                let p = rest.position(*joint);
                format!(r#"{{ "name": "{}", "position": [{}, {}, {}] }}"#, joint.name(), p.x, p.y, p.z)
            })
            .collect();
        format!(r#"{{ "joints": [{}] }}"#, joints.join(","))
    }

    #[wasm_bindgen_test]
    fn test_session_round_trip() {
        let handle = create_deformation_session(&skeleton_json(), "{}").unwrap();

        let mut buffer = vec![0.0; JointId::COUNT * FLOATS_PER_JOINT];
        Skeleton::humanoid().rest_pose().write_raw(&mut buffer);
        let head_y = JointId::Head.index() * FLOATS_PER_JOINT + 1;
        buffer[head_y] += 0.3;

        assert!(evaluate_deformation(handle, &mut buffer, 1.0));
        assert!((buffer[head_y] - 1.6).abs() < 1e-4);

        assert!(set_deformation_settings(handle, r#"{ "overallWeight": 2.0 }"#).is_err());
        assert!(destroy_deformation_session(handle));
        assert!(!evaluate_deformation(handle, &mut buffer, 1.0));
    }

    #[wasm_bindgen_test]
    fn test_wrong_length_buffer_rejected() {
        let handle = create_deformation_session(&skeleton_json(), "{}").unwrap();
        let mut buffer = vec![0.0; 10];
        assert!(!evaluate_deformation(handle, &mut buffer, 1.0));
        destroy_deformation_session(handle);
    }
}
