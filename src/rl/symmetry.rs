//! Symmetry canonicalization of observations
//!
//! The grid world looks the same under rotation and mirroring, so two
//! observations that are rotations/reflections of each other should share
//! one Q-table entry. Canonicalization picks, out of up to 8 symmetry
//! variants of an observation, the one with the smallest packed key, and
//! remembers which transform produced it so the action chosen in that
//! canonical frame can be mapped back to the environment frame.
//!
//! A transform applies the mirror first (swapping the Right and Left ray
//! slots), then rotates by relabelling slots: slot `i` of the output
//! takes slot `(i + rotation) % 4` of the mirrored observation.

use super::observation::Observation;

/// The symmetry operation that produced a canonical observation
///
/// Ephemeral: held for the duration of one decision, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    /// Number of quarter-turns (0..4)
    pub rotation: u8,
    /// Whether Right and Left were swapped before rotating
    pub mirror: bool,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        rotation: 0,
        mirror: false,
    };
}

/// Apply a symmetry transform to an observation
pub fn apply(obs: &Observation, transform: Transform) -> Observation {
    let mut rays = obs.rays;
    if transform.mirror {
        rays.swap(1, 3);
    }

    let k = transform.rotation as usize;
    let mut out = obs.rays;
    for (i, ray) in out.iter_mut().enumerate() {
        *ray = rays[(i + k) % 4];
    }
    Observation { rays: out }
}

/// Pack an observation into a base-5 integer key
///
/// 16 digits, ray-major in slot order with wall/green/red/body within
/// each ray, most significant digit first. Each bin is in [0,4], so the
/// packing is lossless.
pub fn pack_key(obs: &Observation) -> u64 {
    let mut key = 0u64;
    for ray in &obs.rays {
        for feature in [ray.wall, ray.green, ray.red, ray.body] {
            key = key * 5 + feature as u64;
        }
    }
    key
}

/// Find the canonical key of an observation
///
/// Scans the 4 rotations without mirroring, then (if enabled) the 4
/// mirrored rotations. Only a strictly smaller key replaces the current
/// best, so ties keep the earliest candidate in scan order.
pub fn canonicalize(obs: &Observation, use_mirror: bool) -> (u64, Transform) {
    let mut best_key = u64::MAX;
    let mut best_transform = Transform::IDENTITY;

    let mirrors: &[bool] = if use_mirror { &[false, true] } else { &[false] };
    for &mirror in mirrors {
        for rotation in 0..4 {
            let transform = Transform { rotation, mirror };
            let key = pack_key(&apply(obs, transform));
            if key < best_key {
                best_key = key;
                best_transform = transform;
            }
        }
    }

    (best_key, best_transform)
}

/// Map an action chosen in the canonical frame back to the env frame
///
/// Undoes the slot relabelling of [`apply`]: the rotation first, then the
/// Right/Left swap if the transform mirrored.
pub fn action_to_env(action: usize, transform: Transform) -> usize {
    let rotated = (action + transform.rotation as usize) % 4;
    if transform.mirror {
        match rotated {
            1 => 3,
            3 => 1,
            other => other,
        }
    } else {
        rotated
    }
}
