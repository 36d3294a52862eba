//! Object-space intersection and normal math for the primitive shapes.
//!
//! Every function here assumes the ray (or point) has already been moved into
//! the shape's object space. Degenerate cases (parallel rays, zero-area
//! triangles) produce no intersections rather than errors.

use crate::consts::FEQ_EPSILON;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::bounds::Bounds;
use crate::intersect::{ Intersection, Intersections };
use crate::shape::ShapeId;

/// Precomputed data for a flat triangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleInfo {
    pub p1: Tuple4D,
    pub p2: Tuple4D,
    pub p3: Tuple4D,

    /// Edge from `p1` to `p2`.
    pub e1: Tuple4D,

    /// Edge from `p1` to `p3`.
    pub e2: Tuple4D,

    pub normal: Tuple4D,
}

impl TriangleInfo {
    pub fn new(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D) -> TriangleInfo {
        let e1 = p2 - p1;
        let e2 = p3 - p1;
        let normal = e2.cross(&e1).normalize();

        TriangleInfo { p1, p2, p3, e1, e2, normal }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::empty()
            .add_point(self.p1)
            .add_point(self.p2)
            .add_point(self.p3)
    }

    /// Barycentric ray/triangle test.
    ///
    /// Returns `(t, u, v)` where `u` and `v` weight `p2` and `p3`. Rays
    /// parallel to the plane of the triangle (including every ray against a
    /// degenerate triangle) miss.
    fn barycentric_hit(&self, ray: &Ray4D) -> Option<(f64, f64, f64)> {
        let dir_cross_e2 = ray.direction.cross(&self.e2);
        let determinant = self.e1.dot(&dir_cross_e2);

        if !(determinant.abs() >= FEQ_EPSILON) {
            return None;
        }

        let f = 1.0 / determinant;
        let p1_to_origin = ray.origin - self.p1;
        let u = f * p1_to_origin.dot(&dir_cross_e2);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let origin_cross_e1 = p1_to_origin.cross(&self.e1);
        let v = f * ray.direction.dot(&origin_cross_e1);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * self.e2.dot(&origin_cross_e1);
        Some((t, u, v))
    }
}

/// A triangle with per-vertex normals, interpolated across its face.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SmoothTriangleInfo {
    pub triangle_info: TriangleInfo,
    pub n1: Tuple4D,
    pub n2: Tuple4D,
    pub n3: Tuple4D,
}

impl SmoothTriangleInfo {
    pub fn new(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D,
        n1: Tuple4D, n2: Tuple4D, n3: Tuple4D) -> SmoothTriangleInfo {
        SmoothTriangleInfo {
            triangle_info: TriangleInfo::new(p1, p2, p3),
            n1: n1.as_vector(),
            n2: n2.as_vector(),
            n3: n3.as_vector(),
        }
    }
}

/// Intersects the unit sphere at the origin.
///
/// A tangent ray yields two equal intersections.
pub fn intersect_sphere(id: ShapeId, ray: &Ray4D) -> Intersections {
    let sphere_to_ray = ray.origin - Tuple4D::origin();

    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * ray.direction.dot(&sphere_to_ray);
    let c = sphere_to_ray.dot(&sphere_to_ray) - 1.0;

    let discriminant = b.powi(2) - (4.0 * a * c);
    if discriminant < 0.0 {
        return Intersections::new();
    }

    let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
    let t2 = (-b + discriminant.sqrt()) / (2.0 * a);

    Intersections::from(vec![
        Intersection::new(t1, id),
        Intersection::new(t2, id),
    ])
}

pub fn normal_at_sphere(at: &Tuple4D) -> Tuple4D {
    at.as_vector()
}

/// Intersects the infinite `y = 0` plane.
pub fn intersect_plane(id: ShapeId, ray: &Ray4D) -> Intersections {
    if ray.direction.y.abs() < FEQ_EPSILON {
        return Intersections::new();
    }

    let t = -ray.origin.y / ray.direction.y;
    Intersections::from(vec![Intersection::new(t, id)])
}

pub fn normal_at_plane(_at: &Tuple4D) -> Tuple4D {
    Tuple4D::vector(0.0, 1.0, 0.0)
}

/// Intersects the axis-aligned cube spanning `-1..=1` on every axis.
pub fn intersect_cube(id: ShapeId, ray: &Ray4D) -> Intersections {
    let (tmin, tmax) = unit_cube_bounds().slab_distances(ray);

    if tmin > tmax {
        return Intersections::new();
    }

    Intersections::from(vec![
        Intersection::new(tmin, id),
        Intersection::new(tmax, id),
    ])
}

/// The normal of the face whose axis dominates the point.
pub fn normal_at_cube(p: &Tuple4D) -> Tuple4D {
    let xa = p.x.abs();
    let ya = p.y.abs();
    let za = p.z.abs();
    let max_component = xa.max(ya).max(za);

    if max_component == xa {
        Tuple4D::vector(p.x, 0.0, 0.0)
    } else if max_component == ya {
        Tuple4D::vector(0.0, p.y, 0.0)
    } else {
        Tuple4D::vector(0.0, 0.0, p.z)
    }
}

pub fn unit_cube_bounds() -> Bounds {
    Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0)
}

/// Intersects a unit-radius cylinder around the Y axis, truncated to
/// `minimum < y < maximum` and optionally capped.
pub fn intersect_cylinder(id: ShapeId, ray: &Ray4D,
    minimum: f64, maximum: f64, closed: bool) -> Intersections {
    let mut is = Intersections::new();
    let a = ray.direction.x.powi(2) + ray.direction.z.powi(2);

    // Parallel to the Y axis: only the caps can be hit.
    if a >= FEQ_EPSILON {
        let b = 2.0 * ray.origin.x * ray.direction.x
              + 2.0 * ray.origin.z * ray.direction.z;
        let c = ray.origin.x.powi(2) + ray.origin.z.powi(2) - 1.0;

        let disc = b.powi(2) - 4.0 * a * c;
        if disc < 0.0 {
            return is;
        }

        let t0 = (-b - disc.sqrt()) / (2.0 * a);
        let t1 = (-b + disc.sqrt()) / (2.0 * a);
        push_within_bounds(&mut is, id, ray, t0.min(t1), minimum, maximum);
        push_within_bounds(&mut is, id, ray, t0.max(t1), minimum, maximum);
    }

    if closed {
        intersect_caps(&mut is, id, ray, minimum, maximum, |_| 1.0);
    }

    is
}

pub fn normal_at_cylinder(at: &Tuple4D, minimum: f64, maximum: f64) -> Tuple4D {
    let dist = at.x.powi(2) + at.z.powi(2);

    if dist < 1.0 && at.y >= maximum - FEQ_EPSILON {
        Tuple4D::vector(0.0, 1.0, 0.0)
    } else if dist < 1.0 && at.y <= minimum + FEQ_EPSILON {
        Tuple4D::vector(0.0, -1.0, 0.0)
    } else {
        Tuple4D::vector(at.x, 0.0, at.z)
    }
}

pub fn cylinder_bounds(minimum: f64, maximum: f64) -> Bounds {
    Bounds::new(-1.0, minimum, -1.0, 1.0, maximum, 1.0)
}

/// Intersects a double-napped cone `x² + z² = y²`, truncated to
/// `minimum < y < maximum` and optionally capped.
///
/// When the ray is parallel to one of the cone's halves the quadratic
/// degenerates to a linear equation with a single root.
pub fn intersect_cone(id: ShapeId, ray: &Ray4D,
    minimum: f64, maximum: f64, closed: bool) -> Intersections {
    let mut is = Intersections::new();

    let a = ray.direction.x.powi(2)
          - ray.direction.y.powi(2)
          + ray.direction.z.powi(2);
    let b = 2.0 * ray.origin.x * ray.direction.x
          - 2.0 * ray.origin.y * ray.direction.y
          + 2.0 * ray.origin.z * ray.direction.z;
    let c = ray.origin.x.powi(2)
          - ray.origin.y.powi(2)
          + ray.origin.z.powi(2);

    if a.abs() < FEQ_EPSILON {
        if b.abs() >= FEQ_EPSILON {
            let t = -c / (2.0 * b);
            push_within_bounds(&mut is, id, ray, t, minimum, maximum);
        }
    } else {
        let disc = b.powi(2) - 4.0 * a * c;
        if disc >= 0.0 {
            let t0 = (-b - disc.sqrt()) / (2.0 * a);
            let t1 = (-b + disc.sqrt()) / (2.0 * a);
            push_within_bounds(&mut is, id, ray, t0.min(t1), minimum, maximum);
            push_within_bounds(&mut is, id, ray, t0.max(t1), minimum, maximum);
        }
    }

    if closed {
        intersect_caps(&mut is, id, ray, minimum, maximum, f64::abs);
    }

    is
}

pub fn normal_at_cone(at: &Tuple4D, minimum: f64, maximum: f64) -> Tuple4D {
    let dist = at.x.powi(2) + at.z.powi(2);

    if dist < maximum.powi(2) && at.y >= maximum - FEQ_EPSILON {
        Tuple4D::vector(0.0, 1.0, 0.0)
    } else if dist < minimum.powi(2) && at.y <= minimum + FEQ_EPSILON {
        Tuple4D::vector(0.0, -1.0, 0.0)
    } else {
        let mut y = dist.sqrt();
        if at.y > 0.0 {
            y = -y;
        }

        Tuple4D::vector(at.x, y, at.z)
    }
}

pub fn cone_bounds(minimum: f64, maximum: f64) -> Bounds {
    let limit = minimum.abs().max(maximum.abs());
    Bounds::new(-limit, minimum, -limit, limit, maximum, limit)
}

pub fn intersect_triangle(id: ShapeId, ray: &Ray4D, info: &TriangleInfo)
    -> Intersections {
    match info.barycentric_hit(ray) {
        Some((t, _, _)) => Intersections::from(vec![Intersection::new(t, id)]),
        None => Intersections::new(),
    }
}

/// Like `intersect_triangle`, but records the barycentric `(u, v)` of the
/// hit so that the normal can be interpolated later.
pub fn intersect_smooth_triangle(id: ShapeId, ray: &Ray4D,
    info: &SmoothTriangleInfo) -> Intersections {
    match info.triangle_info.barycentric_hit(ray) {
        Some((t, u, v)) => Intersections::from(
            vec![Intersection::new_uv(t, id, u, v)]
        ),
        None => Intersections::new(),
    }
}

/// Phong normal interpolation; falls back to the face normal when the hit
/// carries no barycentric coordinates.
pub fn normal_at_smooth_triangle(info: &SmoothTriangleInfo, hit: Option<&Intersection>)
    -> Tuple4D {
    match hit.and_then(|h| h.uv) {
        Some((u, v)) => info.n2 * u + info.n3 * v + info.n1 * (1.0 - u - v),
        None => info.triangle_info.normal,
    }
}

fn push_within_bounds(is: &mut Intersections, id: ShapeId, ray: &Ray4D,
    t: f64, minimum: f64, maximum: f64) {
    let y = ray.origin.y + t * ray.direction.y;
    if minimum < y && y < maximum {
        is.push(Intersection::new(t, id));
    }
}

/// Checks the end caps at `minimum` and `maximum`. `radius_at` gives the cap
/// radius for a given `y` (constant for cylinders, `|y|` for cones).
fn intersect_caps(is: &mut Intersections, id: ShapeId, ray: &Ray4D,
    minimum: f64, maximum: f64, radius_at: fn(f64) -> f64) {
    if ray.direction.y.abs() < FEQ_EPSILON {
        return;
    }

    for cap in [minimum, maximum] {
        let t = (cap - ray.origin.y) / ray.direction.y;
        let x = ray.origin.x + t * ray.direction.x;
        let z = ray.origin.z + t * ray.direction.z;

        if x.powi(2) + z.powi(2) <= radius_at(cap).powi(2) {
            is.push(Intersection::new(t, id));
        }
    }
}

#[cfg(test)]
fn ts(is: &Intersections) -> Vec<f64> {
    is.iter().map(|i| i.t).collect()
}

#[test]
fn ray_through_sphere_center_is_symmetric() {
    use crate::consts::feq;

    let id = ShapeId::detached();
    for z in [-5.0, -2.5, 7.0] {
        let direction = if z < 0.0 { 1.0 } else { -1.0 };
        let r = Ray4D::new(Tuple4D::point(0.0, 0.0, z),
            Tuple4D::vector(0.0, 0.0, direction));
        let t = ts(&intersect_sphere(id, &r));

        assert_eq!(t.len(), 2);
        let center = z.abs();
        assert!(feq(center - t[0], t[1] - center));
        assert!(feq(t[1] - t[0], 2.0));
    }
}

#[test]
fn ray_tangent_to_sphere_has_equal_roots() {
    let r = Ray4D::new(Tuple4D::point(0.0, 1.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(ts(&intersect_sphere(ShapeId::detached(), &r)), vec![5.0, 5.0]);
}

#[test]
fn ray_misses_sphere() {
    let r = Ray4D::new(Tuple4D::point(0.0, 2.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(intersect_sphere(ShapeId::detached(), &r).is_empty());
}

#[test]
fn ray_inside_and_ahead_of_sphere() {
    let inside = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));
    let behind = Ray4D::new(Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(ts(&intersect_sphere(ShapeId::detached(), &inside)), vec![-1.0, 1.0]);
    assert_eq!(ts(&intersect_sphere(ShapeId::detached(), &behind)), vec![-6.0, -4.0]);
}

#[test]
fn plane_ignores_parallel_and_coplanar_rays() {
    let parallel = Ray4D::new(Tuple4D::point(0.0, 10.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let coplanar = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(intersect_plane(ShapeId::detached(), &parallel).is_empty());
    assert!(intersect_plane(ShapeId::detached(), &coplanar).is_empty());
}

#[test]
fn plane_hit_from_above_and_below() {
    let above = Ray4D::new(Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::vector(0.0, -1.0, 0.0));
    let below = Ray4D::new(Tuple4D::point(0.0, -1.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0));

    assert_eq!(ts(&intersect_plane(ShapeId::detached(), &above)), vec![1.0]);
    assert_eq!(ts(&intersect_plane(ShapeId::detached(), &below)), vec![1.0]);
    assert_eq!(normal_at_plane(&Tuple4D::point(10.0, 0.0, -10.0)),
        Tuple4D::vector(0.0, 1.0, 0.0));
}

#[test]
fn ray_intersects_cube_faces() {
    let cases = [
        (Tuple4D::point(5.0, 0.5, 0.0), Tuple4D::vector(-1.0, 0.0, 0.0), 4.0, 6.0),
        (Tuple4D::point(-5.0, 0.5, 0.0), Tuple4D::vector(1.0, 0.0, 0.0), 4.0, 6.0),
        (Tuple4D::point(0.5, 5.0, 0.0), Tuple4D::vector(0.0, -1.0, 0.0), 4.0, 6.0),
        (Tuple4D::point(0.5, -5.0, 0.0), Tuple4D::vector(0.0, 1.0, 0.0), 4.0, 6.0),
        (Tuple4D::point(0.5, 0.0, 5.0), Tuple4D::vector(0.0, 0.0, -1.0), 4.0, 6.0),
        (Tuple4D::point(0.5, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), 4.0, 6.0),
        (Tuple4D::point(0.0, 0.5, 0.0), Tuple4D::vector(0.0, 0.0, 1.0), -1.0, 1.0),
    ];

    for (origin, direction, t1, t2) in cases {
        let r = Ray4D::new(origin, direction);
        assert_eq!(ts(&intersect_cube(ShapeId::detached(), &r)), vec![t1, t2]);
    }
}

#[test]
fn ray_misses_cube() {
    let cases = [
        (Tuple4D::point(-2.0, 0.0, 0.0), Tuple4D::vector(0.2673, 0.5345, 0.8018)),
        (Tuple4D::point(0.0, -2.0, 0.0), Tuple4D::vector(0.8018, 0.2673, 0.5345)),
        (Tuple4D::point(2.0, 0.0, 2.0), Tuple4D::vector(0.0, 0.0, -1.0)),
        (Tuple4D::point(0.0, 2.0, 2.0), Tuple4D::vector(0.0, -1.0, 0.0)),
        (Tuple4D::point(2.0, 2.0, 0.0), Tuple4D::vector(-1.0, 0.0, 0.0)),
    ];

    for (origin, direction) in cases {
        let r = Ray4D::new(origin, direction);
        assert!(intersect_cube(ShapeId::detached(), &r).is_empty());
    }
}

#[test]
fn cube_normals_follow_dominant_axis() {
    assert_eq!(normal_at_cube(&Tuple4D::point(1.0, 0.5, -0.8)),
        Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(normal_at_cube(&Tuple4D::point(-0.4, 0.3, -1.0)),
        Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(normal_at_cube(&Tuple4D::point(1.0, 1.0, 1.0)),
        Tuple4D::vector(1.0, 0.0, 0.0));
}

#[test]
fn ray_misses_infinite_cylinder() {
    let inf = f64::INFINITY;
    let cases = [
        (Tuple4D::point(1.0, 0.0, 0.0), Tuple4D::vector(0.0, 1.0, 0.0)),
        (Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 1.0, 0.0)),
        (Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(1.0, 1.0, 1.0)),
    ];

    for (origin, direction) in cases {
        let r = Ray4D::new(origin, direction.normalize());
        assert!(intersect_cylinder(ShapeId::detached(), &r, -inf, inf, false)
            .is_empty());
    }
}

#[test]
fn ray_strikes_infinite_cylinder() {
    use crate::consts::feq;

    let inf = f64::INFINITY;
    let cases = [
        (Tuple4D::point(1.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), 5.0, 5.0),
        (Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), 4.0, 6.0),
        (Tuple4D::point(0.5, 0.0, -5.0), Tuple4D::vector(0.1, 1.0, 1.0),
            6.80798, 7.08872),
    ];

    for (origin, direction, t0, t1) in cases {
        let r = Ray4D::new(origin, direction.normalize());
        let t = ts(&intersect_cylinder(ShapeId::detached(), &r, -inf, inf, false));

        assert_eq!(t.len(), 2);
        assert!(feq(t[0], t0) && feq(t[1], t1));
    }
}

#[test]
fn truncated_cylinder_hits() {
    let cases = [
        (Tuple4D::point(0.0, 1.5, 0.0), Tuple4D::vector(0.1, 1.0, 0.0), 0),
        (Tuple4D::point(0.0, 3.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), 0),
        (Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), 0),
        (Tuple4D::point(0.0, 2.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), 0),
        (Tuple4D::point(0.0, 1.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), 0),
        (Tuple4D::point(0.0, 1.5, -2.0), Tuple4D::vector(0.0, 0.0, 1.0), 2),
    ];

    for (origin, direction, count) in cases {
        let r = Ray4D::new(origin, direction.normalize());
        assert_eq!(intersect_cylinder(ShapeId::detached(), &r, 1.0, 2.0, false).len(),
            count);
    }
}

#[test]
fn capped_cylinder_hits() {
    let cases = [
        (Tuple4D::point(0.0, 3.0, 0.0), Tuple4D::vector(0.0, -1.0, 0.0)),
        (Tuple4D::point(0.0, 3.0, -2.0), Tuple4D::vector(0.0, -1.0, 2.0)),
        (Tuple4D::point(0.0, 4.0, -2.0), Tuple4D::vector(0.0, -1.0, 1.0)),
        (Tuple4D::point(0.0, 0.0, -2.0), Tuple4D::vector(0.0, 1.0, 2.0)),
        (Tuple4D::point(0.0, -1.0, -2.0), Tuple4D::vector(0.0, 1.0, 1.0)),
    ];

    for (origin, direction) in cases {
        let r = Ray4D::new(origin, direction.normalize());
        assert_eq!(intersect_cylinder(ShapeId::detached(), &r, 1.0, 2.0, true).len(), 2);
    }
}

#[test]
fn cylinder_normals_on_wall_and_caps() {
    assert_eq!(normal_at_cylinder(&Tuple4D::point(1.0, 0.0, 0.0), -1.0, 1.0),
        Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(normal_at_cylinder(&Tuple4D::point(0.0, 5.0, -1.0),
        f64::NEG_INFINITY, f64::INFINITY), Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(normal_at_cylinder(&Tuple4D::point(0.5, 1.0, 0.0), 1.0, 2.0),
        Tuple4D::vector(0.0, -1.0, 0.0));
    assert_eq!(normal_at_cylinder(&Tuple4D::point(0.0, 2.0, 0.5), 1.0, 2.0),
        Tuple4D::vector(0.0, 1.0, 0.0));
}

#[test]
fn ray_strikes_cone() {
    use crate::consts::feq;

    let inf = f64::INFINITY;
    let cases = [
        (Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), 5.0, 5.0),
        (Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(1.0, 1.0, 1.0),
            8.66025, 8.66025),
        (Tuple4D::point(1.0, 1.0, -5.0), Tuple4D::vector(-0.5, -1.0, 1.0),
            4.55006, 49.44994),
    ];

    for (origin, direction, t0, t1) in cases {
        let r = Ray4D::new(origin, direction.normalize());
        let t = ts(&intersect_cone(ShapeId::detached(), &r, -inf, inf, false));

        assert_eq!(t.len(), 2);
        assert!(feq(t[0], t0) && feq(t[1], t1));
    }
}

#[test]
fn ray_parallel_to_cone_half_has_one_hit() {
    use crate::consts::feq;

    let inf = f64::INFINITY;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -1.0),
        Tuple4D::vector(0.0, 1.0, 1.0).normalize());
    let t = ts(&intersect_cone(ShapeId::detached(), &r, -inf, inf, false));

    assert_eq!(t.len(), 1);
    assert!(feq(t[0], 0.35355));
}

#[test]
fn capped_cone_hits() {
    let cases = [
        (Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 1.0, 0.0), 0),
        (Tuple4D::point(0.0, 0.0, -0.25), Tuple4D::vector(0.0, 1.0, 1.0), 2),
        (Tuple4D::point(0.0, 0.0, -0.25), Tuple4D::vector(0.0, 1.0, 0.0), 4),
    ];

    for (origin, direction, count) in cases {
        let r = Ray4D::new(origin, direction.normalize());
        assert_eq!(intersect_cone(ShapeId::detached(), &r, -0.5, 0.5, true).len(),
            count);
    }
}

#[test]
fn cone_normals() {
    let inf = f64::INFINITY;

    assert_eq!(normal_at_cone(&Tuple4D::origin(), -inf, inf),
        Tuple4D::vector(0.0, 0.0, 0.0));
    assert_eq!(normal_at_cone(&Tuple4D::point(1.0, 1.0, 1.0), -inf, inf),
        Tuple4D::vector(1.0, -(2f64.sqrt()), 1.0));
    assert_eq!(normal_at_cone(&Tuple4D::point(-1.0, -1.0, 0.0), -inf, inf),
        Tuple4D::vector(-1.0, 1.0, 0.0));
}

#[test]
fn constructing_a_triangle() {
    let t = TriangleInfo::new(
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point(1.0, 0.0, 0.0),
    );

    assert_eq!(t.e1, Tuple4D::vector(-1.0, -1.0, 0.0));
    assert_eq!(t.e2, Tuple4D::vector(1.0, -1.0, 0.0));
    assert_eq!(t.normal, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn ray_against_triangle_edges() {
    let t = TriangleInfo::new(
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point(1.0, 0.0, 0.0),
    );
    let id = ShapeId::detached();
    let forward = Tuple4D::vector(0.0, 0.0, 1.0);

    let parallel = Ray4D::new(Tuple4D::point(0.0, -1.0, -2.0),
        Tuple4D::vector(0.0, 1.0, 0.0));
    assert!(intersect_triangle(id, &parallel, &t).is_empty());

    for origin in [Tuple4D::point(1.0, 1.0, -2.0), Tuple4D::point(-1.0, 1.0, -2.0),
        Tuple4D::point(0.0, -1.0, -2.0)] {
        assert!(intersect_triangle(id, &Ray4D::new(origin, forward), &t).is_empty());
    }

    let strike = Ray4D::new(Tuple4D::point(0.0, 0.5, -2.0), forward);
    assert_eq!(ts(&intersect_triangle(id, &strike, &t)), vec![2.0]);
}

#[test]
fn degenerate_triangle_never_intersects() {
    let p = Tuple4D::point(1.0, 1.0, 1.0);
    let t = TriangleInfo::new(p, p, p);
    let r = Ray4D::new(Tuple4D::point(1.0, 1.0, -2.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(intersect_triangle(ShapeId::detached(), &r, &t).is_empty());
    assert!(t.normal.x.is_nan());
}

#[test]
fn smooth_triangle_interpolates_normal() {
    use crate::consts::feq;

    let info = SmoothTriangleInfo::new(
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point(1.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
        Tuple4D::vector(-1.0, 0.0, 0.0),
        Tuple4D::vector(1.0, 0.0, 0.0),
    );
    let r = Ray4D::new(Tuple4D::point(-0.2, 0.3, -2.0),
        Tuple4D::vector(0.0, 0.0, 1.0));
    let is = intersect_smooth_triangle(ShapeId::detached(), &r, &info);
    let (u, v) = is.iter().next().and_then(|i| i.uv).unwrap();

    assert!(feq(u, 0.45) && feq(v, 0.25));

    let hit = Intersection::new_uv(1.0, ShapeId::detached(), 0.45, 0.25);
    let n = normal_at_smooth_triangle(&info, Some(&hit)).normalize();
    assert_eq!(n, Tuple4D::vector(-0.5547, 0.83205, 0.0));
}
