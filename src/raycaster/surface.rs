//! Geometry store: textured planar surfaces
//!
//! A surface is a triangle or a planar quad in world space. Every surface is
//! double-sided. Texture coordinates:
//! - Triangle `A, B, C`: barycentric, `A -> (0,0)`, `B -> (1,0)`, `C -> (0,1)`
//! - Quad `A, B, C, D` (listed around the perimeter): inverse bilinear,
//!   `A -> (0,0)`, `B -> (1,0)`, `C -> (1,1)`, `D -> (0,1)`
//!
//! `u` runs along the texture width and `v` down its height, so `A` is the
//! top-left texel.

use std::sync::Arc;

use super::math::{Vec2, Vec3};
use super::ray::{ray_plane_intersection, Ray};
use super::types::Texture;

/// Hits closer than this to the ray origin are ignored (camera on the plane)
pub const HIT_EPSILON: f32 = 1e-3;

/// Slack on polygon bounds in parameter space, closes seams between neighbours
pub const EDGE_EPSILON: f32 = 1e-4;

/// Twice the smallest accepted polygon area, in world units squared
pub const MIN_AREA: f32 = 1e-8;

/// Error type for surface registration
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    #[error("surface corners are colinear or coincident (zero area)")]
    Degenerate,
    #[error("surface corner has a non-finite coordinate")]
    NonFinite,
    #[error("surface texture is empty")]
    EmptyTexture,
}

/// Stable identity of a registered surface, increasing in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Corner layout of a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceShape {
    Triangle { a: Vec3, b: Vec3, c: Vec3 },
    Quad { a: Vec3, b: Vec3, c: Vec3, d: Vec3 },
}

impl SurfaceShape {
    /// Rectangle from two opposite corners.
    ///
    /// The corner below `top_left` is taken as `(top_left.x, bottom_right.y,
    /// top_left.z)`, which is right for vertical walls. Floors, ceilings and
    /// slanted pieces should use [`SurfaceShape::rect_with_corner`].
    pub fn rect(top_left: Vec3, bottom_right: Vec3) -> Self {
        let corner = Vec3::new(top_left.x, bottom_right.y, top_left.z);
        Self::rect_with_corner(top_left, bottom_right, corner)
    }

    /// Parallelogram from two opposite corners and the corner adjacent to
    /// both that sits under `top_left` in texture space
    pub fn rect_with_corner(top_left: Vec3, bottom_right: Vec3, corner: Vec3) -> Self {
        SurfaceShape::Quad {
            a: top_left,
            b: top_left + (bottom_right - corner),
            c: bottom_right,
            d: corner,
        }
    }

    pub fn corners(&self) -> Vec<Vec3> {
        match *self {
            SurfaceShape::Triangle { a, b, c } => vec![a, b, c],
            SurfaceShape::Quad { a, b, c, d } => vec![a, b, c, d],
        }
    }

    /// World point at texture coordinates (u, v)
    pub fn point_at(&self, u: f32, v: f32) -> Vec3 {
        match *self {
            SurfaceShape::Triangle { a, b, c } => a + (b - a) * u + (c - a) * v,
            SurfaceShape::Quad { a, b, c, d } => {
                a + (b - a) * u + (d - a) * v + (a - b + c - d) * (u * v)
            }
        }
    }

    /// Unnormalized plane normal, length is twice the polygon area
    fn area_normal(&self) -> Vec3 {
        match *self {
            SurfaceShape::Triangle { a, b, c } => (b - a).cross(c - a),
            // Diagonal cross product works for any planar quad, convex or not
            SurfaceShape::Quad { a, b, c, d } => (c - a).cross(d - b),
        }
    }
}

/// Parameters for [`GeometryStore::add`]
#[derive(Debug, Clone)]
pub struct SurfaceDesc {
    pub texture: Arc<Texture>,
    pub shape: SurfaceShape,
    /// Drop the surface at the next `clear_transient_surfaces` (default: persistent)
    pub remove_after_frame: bool,
}

impl SurfaceDesc {
    pub fn new(texture: Arc<Texture>, shape: SurfaceShape) -> Self {
        Self { texture, shape, remove_after_frame: false }
    }

    pub fn triangle(texture: Arc<Texture>, a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self::new(texture, SurfaceShape::Triangle { a, b, c })
    }

    pub fn quad(texture: Arc<Texture>, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Self::new(texture, SurfaceShape::Quad { a, b, c, d })
    }

    pub fn rect(texture: Arc<Texture>, top_left: Vec3, bottom_right: Vec3) -> Self {
        Self::new(texture, SurfaceShape::rect(top_left, bottom_right))
    }

    pub fn rect_with_corner(texture: Arc<Texture>, top_left: Vec3, bottom_right: Vec3, corner: Vec3) -> Self {
        Self::new(texture, SurfaceShape::rect_with_corner(top_left, bottom_right, corner))
    }

    /// Mark as transient (builder pattern)
    pub fn transient(mut self) -> Self {
        self.remove_after_frame = true;
        self
    }
}

/// Where a ray met a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Distance along the (normalized) ray
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

/// In-plane parameterization, precomputed at registration
#[derive(Debug, Clone, Copy)]
enum Param {
    /// q = u * e1 + v * e2
    Triangle { e1: Vec2, e2: Vec2, inv_det: f32 },
    /// q = u * e + v * f + u * v * g
    Quad { e: Vec2, f: Vec2, g: Vec2, ef: f32 },
}

/// A registered surface
#[derive(Debug, Clone)]
pub struct Surface {
    pub id: SurfaceId,
    pub texture: Arc<Texture>,
    pub shape: SurfaceShape,
    pub remove_after_frame: bool,
    /// First corner, origin of the plane frame
    origin: Vec3,
    /// Unit plane normal
    normal: Vec3,
    /// Orthonormal in-plane axes
    axis_x: Vec3,
    axis_y: Vec3,
    param: Param,
}

impl Surface {
    fn new(id: SurfaceId, desc: SurfaceDesc) -> Result<Self, GeometryError> {
        let SurfaceDesc { texture, shape, remove_after_frame } = desc;

        if shape.corners().iter().any(|c| !c.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        if texture.width == 0 || texture.height == 0 {
            return Err(GeometryError::EmptyTexture);
        }

        let area_normal = shape.area_normal();
        if area_normal.len() <= MIN_AREA {
            return Err(GeometryError::Degenerate);
        }
        let normal = area_normal.normalize();

        let origin = match shape {
            SurfaceShape::Triangle { a, .. } | SurfaceShape::Quad { a, .. } => a,
        };
        let first_edge = match shape {
            SurfaceShape::Triangle { b, .. } | SurfaceShape::Quad { b, .. } => b - origin,
        };
        // A zero first edge still has a valid plane; pick any in-plane axis
        let axis_x = if first_edge.len() > MIN_AREA {
            (first_edge - normal * first_edge.dot(normal)).normalize()
        } else {
            any_perpendicular(normal)
        };
        let axis_y = normal.cross(axis_x);

        let project = |p: Vec3| {
            let local = p - origin;
            Vec2::new(local.dot(axis_x), local.dot(axis_y))
        };

        let param = match shape {
            SurfaceShape::Triangle { b, c, .. } => {
                let e1 = project(b);
                let e2 = project(c);
                let det = e1.cross(e2);
                if det.abs() <= MIN_AREA {
                    return Err(GeometryError::Degenerate);
                }
                Param::Triangle { e1, e2, inv_det: 1.0 / det }
            }
            SurfaceShape::Quad { b, c, d, .. } => {
                // Corners off the plane are projected onto it
                let e = project(b);
                let f = project(d);
                let g = project(c) - e - f;
                Param::Quad { e, f, g, ef: e.cross(f) }
            }
        };

        Ok(Self { id, texture, shape, remove_after_frame, origin, normal, axis_x, axis_y, param })
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Intersect a ray with this surface.
    ///
    /// Hits at or below `HIT_EPSILON`, beyond `max_t`, or outside the polygon
    /// are misses. Transparency is not considered here.
    pub fn intersect(&self, ray: &Ray, max_t: f32) -> Option<SurfaceHit> {
        let t = ray_plane_intersection(ray, self.origin, self.normal)?;
        if t <= HIT_EPSILON || t > max_t {
            return None;
        }

        let local = ray.at(t) - self.origin;
        let q = Vec2::new(local.dot(self.axis_x), local.dot(self.axis_y));
        let (u, v) = self.local_to_uv(q)?;
        Some(SurfaceHit { t, u, v })
    }

    /// In-plane coordinates to (u, v), `None` outside the polygon
    fn local_to_uv(&self, q: Vec2) -> Option<(f32, f32)> {
        match self.param {
            Param::Triangle { e1, e2, inv_det } => {
                let u = q.cross(e2) * inv_det;
                let v = e1.cross(q) * inv_det;
                let inside = u >= -EDGE_EPSILON && v >= -EDGE_EPSILON && u + v <= 1.0 + EDGE_EPSILON;
                inside.then_some((u, v))
            }
            Param::Quad { e, f, g, ef } => {
                let (u, v) = inverse_bilinear(q, e, f, g, ef)?;
                let range = -EDGE_EPSILON..=1.0 + EDGE_EPSILON;
                (range.contains(&u) && range.contains(&v)).then_some((u, v))
            }
        }
    }
}

/// Solve `q = u*e + v*f + u*v*g` for (u, v).
///
/// Returns the root inside the unit square when there is one, otherwise any
/// real root (the caller range-checks it).
fn inverse_bilinear(q: Vec2, e: Vec2, f: Vec2, g: Vec2, ef: f32) -> Option<(f32, f32)> {
    let k2 = g.cross(f);
    let k1 = ef + q.cross(g);
    let k0 = q.cross(e);

    let solve_u = |v: f32| {
        let dx = e.x + g.x * v;
        let dy = e.y + g.y * v;
        if dx.abs() >= dy.abs() {
            if dx == 0.0 { None } else { Some((q.x - f.x * v) / dx) }
        } else {
            Some((q.y - f.y * v) / dy)
        }
    };

    // Parallelograms make the quadratic term vanish
    if k2.abs() <= 1e-6 * ef.abs() {
        if k1 == 0.0 {
            return None;
        }
        let v = -k0 / k1;
        return solve_u(v).map(|u| (u, v));
    }

    let disc = k1 * k1 - 4.0 * k0 * k2;
    if disc < 0.0 {
        return None;
    }
    let w = disc.sqrt();

    // Roots as q / k2 and k0 / q: no cancellation when k2 is tiny
    let q = -0.5 * (k1 + k1.signum() * w);
    let big = q / k2;
    let small = if q != 0.0 { k0 / q } else { big };

    let in_unit = |x: f32| (-EDGE_EPSILON..=1.0 + EDGE_EPSILON).contains(&x);
    let first = solve_u(small).map(|u| (u, small));
    match first {
        Some((u, v)) if in_unit(u) && in_unit(v) => Some((u, v)),
        _ => solve_u(big).map(|u| (u, big)).or(first),
    }
}

fn any_perpendicular(n: Vec3) -> Vec3 {
    let helper = if n.x.abs() < 0.9 { Vec3::new(1.0, 0.0, 0.0) } else { Vec3::new(0.0, 1.0, 0.0) };
    n.cross(helper).normalize()
}

/// All surfaces known to the renderer, in insertion order
#[derive(Debug, Default)]
pub struct GeometryStore {
    surfaces: Vec<Surface>,
    next_id: u64,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface. Degenerate geometry is rejected and not stored.
    pub fn add(&mut self, desc: SurfaceDesc) -> Result<SurfaceId, GeometryError> {
        let id = SurfaceId(self.next_id);
        let surface = Surface::new(id, desc).map_err(|e| {
            log::debug!("rejected surface: {}", e);
            e
        })?;
        self.next_id += 1;
        self.surfaces.push(surface);
        Ok(id)
    }

    /// Drop every surface flagged `remove_after_frame`, returning how many went
    pub fn clear_transient(&mut self) -> usize {
        let before = self.surfaces.len();
        self.surfaces.retain(|s| !s.remove_after_frame);
        before - self.surfaces.len()
    }

    /// Drop every surface, static and transient
    pub fn reset(&mut self) {
        self.surfaces.clear();
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn transient_count(&self) -> usize {
        self.surfaces.iter().filter(|s| s.remove_after_frame).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.surfaces.iter().map(|s| s.id)
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        // Ids increase with insertion order and removal keeps order
        self.surfaces
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|idx| &self.surfaces[idx])
    }

    pub(crate) fn as_slice(&self) -> &[Surface] {
        &self.surfaces
    }
}
