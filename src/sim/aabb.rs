//! Axis-aligned box geometry for platforms and the ceiling
//!
//! A box is defined by its `min` and `max` corners. All collision and
//! spawn-overlap queries reduce to a ray against a list of these.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A half-line `origin + t * dir` for `t` in `[0, max_dist]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    /// Unit direction
    pub dir: DVec3,
    /// Hits further than this are ignored
    pub max_dist: f64,
}

impl Ray {
    pub fn new(origin: DVec3, dir: DVec3, max_dist: f64) -> Self {
        Self {
            origin,
            dir,
            max_dist,
        }
    }

    /// Ray with no length limit
    pub fn unbounded(origin: DVec3, dir: DVec3) -> Self {
        Self::new(origin, dir, f64::INFINITY)
    }

    pub fn down(origin: DVec3, max_dist: f64) -> Self {
        Self::new(origin, DVec3::NEG_Y, max_dist)
    }

    pub fn up(origin: DVec3, max_dist: f64) -> Self {
        Self::new(origin, DVec3::Y, max_dist)
    }

    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.dir * t
    }
}

/// An axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box centered on `center` extending `half` along each axis
    pub fn from_center(center: DVec3, half: DVec3) -> Self {
        Self::new(center - half, center + half)
    }

    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> DVec3 {
        (self.max - self.min) * 0.5
    }

    /// Grow by `xz` horizontally and `y` vertically on every side
    pub fn inflated(&self, xz: f64, y: f64) -> Self {
        let pad = DVec3::new(xz, y, xz);
        Self::new(self.min - pad, self.max + pad)
    }

    /// Closed containment test (faces count as inside)
    pub fn contains_point(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Whether two boxes share any volume (touching faces don't count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmplt(other.max).all() && other.min.cmplt(self.max).all()
    }

    /// Slab test: parameter interval `(enter, exit)` along the ray's
    /// infinite line where it is inside the box, or `None` if the line misses
    /// or the box lies entirely behind the origin.
    ///
    /// `enter` is negative when the origin is inside the box.
    pub fn ray_span(&self, ray: &Ray) -> Option<(f64, f64)> {
        let mut enter = f64::NEG_INFINITY;
        let mut exit = f64::INFINITY;

        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = ray.dir[axis];
            let lo = self.min[axis];
            let hi = self.max[axis];

            if d.abs() < 1e-12 {
                // Parallel to this slab: must already be within it
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            enter = enter.max(t0);
            exit = exit.min(t1);
            if enter > exit {
                return None;
            }
        }

        if exit < 0.0 {
            return None;
        }
        Some((enter, exit))
    }

    /// Distance along the ray to the first surface point, clamped to 0
    /// when the origin starts inside. `None` past `max_dist`.
    pub fn ray_hit(&self, ray: &Ray) -> Option<f64> {
        let (enter, _) = self.ray_span(ray)?;
        let t = enter.max(0.0);
        (t <= ray.max_dist).then_some(t)
    }
}
