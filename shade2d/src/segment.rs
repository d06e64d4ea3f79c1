//! Parametric line-segment intersection.

use glam::{DMat2, DVec2};

use crate::math::Vec2;

/// Intersection point of segments `p0→p1` and `p2→p3`, if they touch.
///
/// Solves `p0 + t·(p1 - p0) = p2 + s·(p3 - p2)` for `(t, s)` with Cramer's rule.
/// Both parameters must lie in `[0, 1]`. Parallel, collinear and degenerate
/// pairs have a zero determinant and never intersect; non-finite parameters
/// are rejected the same way.
pub fn intersect(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Option<Vec2> {
    let [p0, p1, p2, p3] = [p0, p1, p2, p3].map(|p| p.to_glam().as_dvec2());
    intersect_f64(p0, p1, p2, p3, 0.0).map(|hit| Vec2::from(hit.as_vec2()))
}

/// Double-precision core of [`intersect`].
///
/// The parameter `s` along `p2→p3` may overshoot `[0, 1]` by up to `slack`;
/// such a hit is snapped onto the nearer endpoint. A ray aimed at a corner
/// shared by two edges then stops on the corner even when rounding puts it a
/// hair outside both of them.
pub(crate) fn intersect_f64(p0: DVec2, p1: DVec2, p2: DVec2, p3: DVec2, slack: f64) -> Option<DVec2> {
    let a = p1 - p0;
    let b = p2 - p3;
    let rhs = p2 - p0;

    let det = DMat2::from_cols(a, b).determinant();
    if det == 0.0 {
        return None;
    }

    let t = DMat2::from_cols(rhs, b).determinant() / det;
    let s = DMat2::from_cols(a, rhs).determinant() / det;
    if !t.is_finite() || !s.is_finite() {
        return None;
    }

    if !(0.0..=1.0).contains(&t) || !(-slack..=1.0 + slack).contains(&s) {
        return None;
    }
    Some(if s < 0.0 {
        p2
    } else if s > 1.0 {
        p3
    } else {
        p0.lerp(p1, t)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn crossing_segments_meet_at_point() {
        let hit = intersect(v(0.0, 0.0), v(10.0, 0.0), v(5.0, -5.0), v(5.0, 5.0));
        assert_eq!(hit, Some(v(5.0, 0.0)));
    }

    #[test]
    fn out_of_range_parameter_misses() {
        assert_eq!(intersect(v(0.0, 0.0), v(1.0, 0.0), v(5.0, -5.0), v(5.0, 5.0)), None);
        assert_eq!(intersect(v(0.0, 0.0), v(10.0, 0.0), v(5.0, 1.0), v(5.0, 5.0)), None);
    }

    #[test]
    fn parallel_and_collinear_segments_miss() {
        assert_eq!(intersect(v(0.0, 0.0), v(10.0, 0.0), v(0.0, 1.0), v(10.0, 1.0)), None);
        assert_eq!(intersect(v(0.0, 0.0), v(10.0, 0.0), v(5.0, 0.0), v(15.0, 0.0)), None);
    }

    #[test]
    fn degenerate_segment_misses() {
        assert_eq!(intersect(v(3.0, 3.0), v(3.0, 3.0), v(0.0, 0.0), v(6.0, 6.0)), None);
    }

    #[test]
    fn endpoints_are_inclusive() {
        let hit = intersect(v(0.0, 0.0), v(4.0, 0.0), v(4.0, 0.0), v(4.0, 4.0));
        assert_eq!(hit, Some(v(4.0, 0.0)));

        let touch = intersect(v(0.0, 0.0), v(4.0, 4.0), v(0.0, 4.0), v(2.0, 2.0));
        assert_eq!(touch, Some(v(2.0, 2.0)));
    }

    #[test]
    fn non_finite_input_misses() {
        let hit = intersect(v(f32::NAN, 0.0), v(10.0, 0.0), v(5.0, -5.0), v(5.0, 5.0));
        assert_eq!(hit, None);
    }

    #[test]
    fn slack_snaps_a_near_miss_onto_the_corner() {
        // Ray toward (4, 4) that crosses y = 4 a hair past the end of the edge (0,4)→(4,4).
        let (origin, far) = (DVec2::new(0.0, 0.0), DVec2::new(8.0 + 1e-12, 8.0));
        let (a, b) = (DVec2::new(0.0, 4.0), DVec2::new(4.0, 4.0));
        assert_eq!(intersect_f64(origin, far, a, b, 0.0), None);
        assert_eq!(intersect_f64(origin, far, a, b, 1e-9), Some(b));

        // Slack never widens the ray's own range.
        let short = DVec2::new(3.0, 3.0);
        assert_eq!(intersect_f64(origin, short, a, b, 1e-9), None);
    }
}
