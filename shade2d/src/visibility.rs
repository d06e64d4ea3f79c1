//! Ray-cast visibility polygon from a single point light.
//!
//! Three rays are cast toward every distinct edge endpoint: one straight at it
//! and one on each side, offset by the configured corner epsilon. Each ray is
//! clipped to its nearest occluder and the rays are sorted by their original
//! angle, so reading the clipped endpoints in order traces a star-shaped
//! polygon around the light.

use std::collections::HashSet;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::VisibilityConfig;
use crate::edges::Edge;
use crate::math::Vec2;
use crate::segment::intersect_f64;

/// How far past an edge's endpoint, as a fraction of its length, a ray still
/// counts as hitting it. Keeps rays aimed at a closed corner from slipping
/// between the two edges that meet there.
const CORNER_SLACK: f64 = 1e-9;

/// A cast from the light toward a far-field point, clipped to the nearest edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec2,
    pub end: Vec2,
    /// Angle of the unclipped direction. Sort key; not recomputed after clipping.
    pub angle: f32,
}

impl Ray {
    pub fn length_squared(&self) -> f32 {
        self.origin.distance_squared(self.end)
    }
}

/// Ray geometry while casting. Kept in double precision until the rays are
/// handed out.
struct Cast {
    angle: f64,
    end: DVec2,
}

impl Cast {
    fn new(origin: DVec2, angle: f64, reach: DVec2) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            angle,
            end: origin + DVec2::new(cos, sin) * reach,
        }
    }

    /// Shorten the cast to segment `a→b` if it crosses it closer than the
    /// current end. Returns true if it was clipped.
    fn clip_to(&mut self, origin: DVec2, a: DVec2, b: DVec2) -> bool {
        match intersect_f64(origin, self.end, a, b, CORNER_SLACK) {
            Some(hit) if hit.distance_squared(origin) < self.end.distance_squared(origin) => {
                self.end = hit;
                true
            }
            _ => false,
        }
    }
}

fn lattice_point(x: i32, y: i32, tile: f64) -> DVec2 {
    DVec2::new(f64::from(x) * tile, f64::from(y) * tile)
}

/// Cast rays from `light` against `edges` (grid units) and return them in angle order.
///
/// With no light there is nothing to cast and the result is empty. Every ray is
/// tested against every edge.
pub fn compute_visibility(light: Option<Vec2>, edges: &[Edge], config: &VisibilityConfig) -> Vec<Ray> {
    let Some(light) = light else {
        return Vec::new();
    };

    let origin = light.to_glam().as_dvec2();
    let tile = f64::from(config.tile_size);
    let reach = config.world_size().to_glam().as_dvec2() * 1.5;
    let epsilon = f64::from(config.corner_epsilon);

    let mut visited: HashSet<(i32, i32)> = HashSet::new();
    let mut casts = Vec::with_capacity(edges.len() * 6);
    for edge in edges {
        for (gx, gy) in [edge.start(), edge.end()] {
            if !visited.insert((gx, gy)) {
                continue;
            }
            let toward = lattice_point(gx, gy, tile) - origin;
            let base = toward.y.atan2(toward.x);
            for angle in [base - epsilon, base, base + epsilon] {
                casts.push(Cast::new(origin, angle, reach));
            }
        }
    }

    let segments: Vec<(DVec2, DVec2)> = edges
        .iter()
        .map(|edge| (lattice_point(edge.sx, edge.sy, tile), lattice_point(edge.ex, edge.ey, tile)))
        .collect();

    let mut clipped = 0usize;
    for cast in &mut casts {
        let mut hit = false;
        for &(a, b) in &segments {
            hit |= cast.clip_to(origin, a, b);
        }
        if hit {
            clipped += 1;
        }
    }

    casts.sort_by(|a, b| a.angle.total_cmp(&b.angle));

    log::trace!(
        "Cast {} rays from ({:.1}, {:.1}) against {} edges, {} clipped",
        casts.len(),
        light.x,
        light.y,
        edges.len(),
        clipped
    );

    casts
        .into_iter()
        .map(|cast| Ray {
            origin: light,
            end: Vec2::from(cast.end.as_vec2()),
            angle: cast.angle as f32,
        })
        .collect()
}

/// Clipped ray endpoints in order: the visibility polygon outline.
pub fn polygon(rays: &[Ray]) -> Vec<Vec2> {
    rays.iter().map(|ray| ray.end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_config(width: i32, height: i32) -> VisibilityConfig {
        VisibilityConfig::new().with_tile_size(1.0).with_extent(width, height)
    }

    fn far_point(origin: Vec2, angle: f32, reach: Vec2) -> Vec2 {
        origin + Vec2::new(angle.cos() * reach.x, angle.sin() * reach.y)
    }

    fn nearest_angle(rays: &[Ray], angle: f32) -> &Ray {
        rays.iter()
            .min_by(|a, b| (a.angle - angle).abs().total_cmp(&(b.angle - angle).abs()))
            .unwrap()
    }

    #[test]
    fn no_light_casts_nothing() {
        let edges = [Edge::new(0, 0, 5, 0), Edge::new(5, 0, 5, 5)];
        assert!(compute_visibility(None, &edges, &unit_config(10, 10)).is_empty());
    }

    #[test]
    fn no_edges_casts_nothing() {
        let rays = compute_visibility(Some(Vec2::new(5.0, 5.0)), &[], &unit_config(10, 10));
        assert!(rays.is_empty());
    }

    #[test]
    fn shared_endpoints_are_cast_once() {
        // Three corners: (0,0), (5,0) shared, (5,5).
        let edges = [Edge::new(0, 0, 5, 0), Edge::new(5, 0, 5, 5)];
        let rays = compute_visibility(Some(Vec2::new(2.0, 3.0)), &edges, &unit_config(10, 10));
        assert_eq!(rays.len(), 9);
    }

    #[test]
    fn rays_are_sorted_by_original_angle() {
        let edges = [Edge::new(1, 1, 4, 1), Edge::new(6, 2, 6, 8), Edge::new(2, 7, 3, 7)];
        let rays = compute_visibility(Some(Vec2::new(3.5, 4.5)), &edges, &unit_config(10, 10));
        assert!(rays.windows(2).all(|w| w[0].angle <= w[1].angle));
    }

    #[test]
    fn ray_through_blocking_edge_stops_on_it() {
        // Vertical wall at x = 2 spanning y in [0, 10]; light to its left.
        let config = unit_config(10, 10);
        let origin = Vec2::new(1.0, 5.0);
        let edges = [Edge::new(2, 0, 2, 10)];
        let rays = compute_visibility(Some(origin), &edges, &config);
        assert_eq!(rays.len(), 6);

        let reach = config.world_size() * 1.5;
        let mut clipped = 0;
        for ray in &rays {
            let far = far_point(origin, ray.angle, reach);
            if ray.end.distance(far) > 1e-3 {
                clipped += 1;
                assert!((ray.end.x - 2.0).abs() < 1e-4, "clipped ray ended at {:?}", ray.end);
                assert!(ray.length_squared() < origin.distance_squared(far));
            }
        }
        assert!(clipped >= 2);

        // The ray just inside the top corner crosses the wall a hair below y = 0.
        let inward = (Vec2::new(2.0, 0.0) - origin).angle() + config.corner_epsilon;
        let ray = nearest_angle(&rays, inward);
        assert!((ray.end.x - 2.0).abs() < 1e-4);
        assert!(ray.end.y > 0.0 && ray.end.y < 0.01, "ray ended at {:?}", ray.end);

        // The ray just outside it slips past to the far field.
        let outward = (Vec2::new(2.0, 0.0) - origin).angle() - config.corner_epsilon;
        let ray = nearest_angle(&rays, outward);
        assert!(ray.end.distance(far_point(origin, outward, reach)) < 1e-3, "ray ended at {:?}", ray.end);
    }

    #[test]
    fn ray_aimed_at_closed_corner_stops_on_it() {
        // Inner corner (19, 19) of a 20x20 ring, with the outer walls behind it.
        let config = unit_config(20, 20);
        let edges = [
            Edge::new(1, 19, 19, 19),
            Edge::new(19, 1, 19, 19),
            Edge::new(0, 20, 20, 20),
            Edge::new(20, 0, 20, 20),
        ];
        let corner = Vec2::new(19.0, 19.0);
        let mut lights = vec![Vec2::new(5.53, 12.28)];
        for i in 0..40 {
            for j in 0..40 {
                lights.push(Vec2::new(1.2 + i as f32 * 0.44, 1.3 + j as f32 * 0.43));
            }
        }
        for light in lights {
            let rays = compute_visibility(Some(light), &edges, &config);
            let ray = nearest_angle(&rays, (corner - light).angle());
            assert!(ray.end.distance(corner) < 1e-3, "light {light:?} ray ended at {:?}", ray.end);
        }
    }

    #[test]
    fn nearest_of_several_edges_wins() {
        let origin = Vec2::new(5.0, 9.0);
        let edges = [Edge::new(0, 2, 10, 2), Edge::new(0, 5, 10, 5)];
        let rays = compute_visibility(Some(origin), &edges, &unit_config(10, 10));
        for ray in &rays {
            let dir = Vec2::from_angle(ray.angle);
            if dir.y >= 0.0 {
                continue;
            }
            let x_at_wall = origin.x + dir.x * (5.0 - origin.y) / dir.y;
            if x_at_wall > 0.01 && x_at_wall < 9.99 {
                assert!((ray.end.y - 5.0).abs() < 1e-4, "ray ended at {:?}", ray.end);
            }
        }
    }

    #[test]
    fn tile_size_scales_edges_to_world_units() {
        let config = VisibilityConfig::new().with_tile_size(10.0).with_extent(10, 10);
        let origin = Vec2::new(15.0, 50.0);
        let rays = compute_visibility(Some(origin), &[Edge::new(2, 0, 2, 10)], &config);
        let inward = (Vec2::new(20.0, 0.0) - origin).angle() + config.corner_epsilon;
        let ray = nearest_angle(&rays, inward);
        assert!((ray.end.x - 20.0).abs() < 1e-3, "ray ended at {:?}", ray.end);
        assert!(ray.end.y > 0.0 && ray.end.y < 0.1);
    }

    #[test]
    fn polygon_reads_clipped_endpoints_in_order() {
        let rays = compute_visibility(
            Some(Vec2::new(5.0, 5.0)),
            &[Edge::new(0, 0, 10, 0)],
            &unit_config(10, 10),
        );
        let outline = polygon(&rays);
        assert_eq!(outline.len(), rays.len());
        assert_eq!(outline[0], rays[0].end);
    }
}
