//! Critically damped smoothing (the "smooth damp" family), used to ease material colors.

/// Distance below which a value snaps onto its target.
pub const DAMP_EPSILON: f32 = 0.001;

#[inline]
fn decay(x: f32) -> f32 {
    1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x)
}

/// Moves `current` toward `target`, carrying `velocity` between calls.
/// Never overshoots; snaps (and zeroes the velocity) within [`DAMP_EPSILON`].
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, delta: f32) -> f32 {
    if (current - target).abs() <= DAMP_EPSILON {
        *velocity = 0.0;
        return target;
    }
    if delta <= 0.0 {
        return current;
    }
    let omega = 2.0 / smooth_time.max(0.0001);
    let t = decay(omega * delta);
    let change = current - target;
    let temp = (*velocity + omega * change) * delta;
    *velocity = (*velocity - omega * temp) * t;
    let mut output = target + (change + temp) * t;
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_without_overshoot() {
        let mut v = 0.0;
        let mut x = 1.0;
        for _ in 0..240 {
            let next = smooth_damp(x, 0.0, &mut v, 0.2, 1.0 / 60.0);
            assert!(next <= x && next >= 0.0);
            x = next;
        }
        assert_eq!(x, 0.0);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn steady_state_is_fixed_point() {
        let mut v = 0.0;
        for _ in 0..10 {
            assert_eq!(smooth_damp(0.25, 0.25, &mut v, 0.2, 0.016), 0.25);
        }
        assert_eq!(v, 0.0);
    }

    #[test]
    fn zero_delta_holds_position() {
        let mut v = 0.3;
        assert_eq!(smooth_damp(0.5, 0.0, &mut v, 0.2, 0.0), 0.5);
    }
}
