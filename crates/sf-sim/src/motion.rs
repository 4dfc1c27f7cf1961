//! Exponential approach movement.
//!
//! Each round a moving workpiece covers a fixed fraction of its remaining
//! distance:
//!
//!   pos += (target - pos) * min(1, move_rate * dt)
//!
//! The fraction is clamped to 1, so a large `move_rate * dt` lands exactly on
//! the target; otherwise the distance shrinks geometrically by
//! `1 - move_rate * dt` per round and the per-axis arrival tolerance is always
//! reached.

use sf_core::Vec3;

/// Fraction of the remaining distance covered in one round.
#[inline]
pub fn approach_factor(move_rate: f64, dt: f64) -> f64 {
    (move_rate * dt).clamp(0.0, 1.0)
}

/// One movement step from `position` towards `target`.
#[inline]
pub fn approach(position: Vec3, target: Vec3, factor: f64) -> Vec3 {
    if factor >= 1.0 {
        return target;
    }
    position + (target - position) * factor
}

/// Rounds needed to get within `tolerance` of `target`, or `None` if that
/// takes more than `limit` rounds (or never happens).
pub fn rounds_to_arrive(
    start:     Vec3,
    target:    Vec3,
    move_rate: f64,
    dt:        f64,
    tolerance: f64,
    limit:     u64,
) -> Option<u64> {
    let factor = approach_factor(move_rate, dt);
    let mut position = start;
    for n in 1..=limit {
        position = approach(position, target, factor);
        if position.within(target, tolerance) {
            return Some(n);
        }
    }
    None
}
