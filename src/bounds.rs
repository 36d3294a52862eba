use crate::matrix::Matrix4D;
use crate::ray::Ray4D;
use crate::tuple::Tuple4D;

/// An axis-aligned bounding box.
///
/// Used to prune groups and CSG nodes: if a ray misses a container's box, none
/// of its children need to be tested. Boxes may be infinite (planes, open
/// cylinders) or empty (a group without children).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub minimum: Tuple4D,
    pub maximum: Tuple4D,
}

impl Default for Bounds {
    fn default() -> Bounds {
        Bounds::empty()
    }
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, min_z: f64,
        max_x: f64, max_y: f64, max_z: f64) -> Bounds {
        Bounds {
            minimum: Tuple4D::point(min_x, min_y, min_z),
            maximum: Tuple4D::point(max_x, max_y, max_z),
        }
    }

    /// A box containing nothing. Merging anything into it yields that thing.
    pub fn empty() -> Bounds {
        let inf = f64::INFINITY;
        Bounds::new(inf, inf, inf, -inf, -inf, -inf)
    }

    /// A box containing everything.
    pub fn infinite() -> Bounds {
        let inf = f64::INFINITY;
        Bounds::new(-inf, -inf, -inf, inf, inf, inf)
    }

    pub fn is_empty(&self) -> bool {
        self.minimum.x > self.maximum.x
            || self.minimum.y > self.maximum.y
            || self.minimum.z > self.maximum.z
    }

    pub fn is_finite(&self) -> bool {
        [self.minimum, self.maximum].iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
    }

    /// The smallest box containing both `self` and `other`.
    pub fn merge(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.minimum.x.min(other.minimum.x),
            self.minimum.y.min(other.minimum.y),
            self.minimum.z.min(other.minimum.z),
            self.maximum.x.max(other.maximum.x),
            self.maximum.y.max(other.maximum.y),
            self.maximum.z.max(other.maximum.z),
        )
    }

    /// Grows the box to include `p`.
    pub fn add_point(&self, p: Tuple4D) -> Bounds {
        self.merge(&Bounds { minimum: p.as_point(), maximum: p.as_point() })
    }

    pub fn contains_point(&self, p: Tuple4D) -> bool {
        (self.minimum.x..=self.maximum.x).contains(&p.x)
            && (self.minimum.y..=self.maximum.y).contains(&p.y)
            && (self.minimum.z..=self.maximum.z).contains(&p.z)
    }

    /// Transforms all eight corners and re-fits an axis-aligned box.
    ///
    /// Infinite boxes stay infinite: multiplying an infinite corner through a
    /// rotation would produce NaNs.
    pub fn transform(&self, m: &Matrix4D) -> Bounds {
        if self.is_empty() {
            return *self;
        }

        if !self.is_finite() {
            return Bounds::infinite();
        }

        let (lo, hi) = (self.minimum, self.maximum);
        let corners = [
            Tuple4D::point(lo.x, lo.y, lo.z),
            Tuple4D::point(lo.x, lo.y, hi.z),
            Tuple4D::point(lo.x, hi.y, lo.z),
            Tuple4D::point(lo.x, hi.y, hi.z),
            Tuple4D::point(hi.x, lo.y, lo.z),
            Tuple4D::point(hi.x, lo.y, hi.z),
            Tuple4D::point(hi.x, hi.y, lo.z),
            Tuple4D::point(hi.x, hi.y, hi.z),
        ];

        corners.iter()
            .fold(Bounds::empty(), |b, c| b.add_point(*m * *c))
    }

    /// Slab test for a ray against the box.
    ///
    /// Returns the entry and exit distances; the ray misses when entry is
    /// greater than exit.
    pub fn slab_distances(&self, ray: &Ray4D) -> (f64, f64) {
        let (xtmin, xtmax) = Self::check_axis(
            self.minimum.x, self.maximum.x, ray.origin.x, ray.direction.x
        );
        let (ytmin, ytmax) = Self::check_axis(
            self.minimum.y, self.maximum.y, ray.origin.y, ray.direction.y
        );
        let (ztmin, ztmax) = Self::check_axis(
            self.minimum.z, self.maximum.z, ray.origin.z, ray.direction.z
        );

        (xtmin.max(ytmin).max(ztmin), xtmax.min(ytmax).min(ztmax))
    }

    pub fn intersects(&self, ray: &Ray4D) -> bool {
        if self.is_empty() {
            return false;
        }

        let (tmin, tmax) = self.slab_distances(ray);
        tmin <= tmax
    }

    /// Where a ray crosses the two planes bounding one axis, smaller `t`
    /// first.
    ///
    /// A ray parallel to the slab either lies between the planes (unbounded
    /// on this axis) or never enters it. Tiny direction components are
    /// divided through as-is; they give huge but correct distances.
    pub fn check_axis(min: f64, max: f64, origin: f64, direction: f64)
        -> (f64, f64) {
        if direction == 0.0 {
            return if min <= origin && origin <= max {
                (f64::NEG_INFINITY, f64::INFINITY)
            } else {
                (f64::INFINITY, f64::NEG_INFINITY)
            };
        }

        let t0 = (min - origin) / direction;
        let t1 = (max - origin) / direction;

        if t0 > t1 { (t1, t0) } else { (t0, t1) }
    }
}

#[test]
fn empty_bounds_merge_to_other() {
    let b = Bounds::new(-1.0, -2.0, -3.0, 3.0, 2.0, 1.0);

    assert!(Bounds::empty().is_empty());
    assert_eq!(Bounds::empty().merge(&b), b);
}

#[test]
fn add_points_to_bounds() {
    let b = Bounds::empty()
        .add_point(Tuple4D::point(-5.0, 2.0, 0.0))
        .add_point(Tuple4D::point(7.0, 0.0, -3.0));

    assert_eq!(b, Bounds::new(-5.0, 0.0, -3.0, 7.0, 2.0, 0.0));
    assert!(b.contains_point(Tuple4D::point(0.0, 1.0, -1.0)));
    assert!(!b.contains_point(Tuple4D::point(8.0, 1.0, -1.0)));
}

#[test]
fn transform_bounds_refits_box() {
    use std::f64::consts::PI;

    let b = Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0);
    let m = Matrix4D::rotation_x(PI / 4.0) * Matrix4D::rotation_y(PI / 4.0);
    let t = b.transform(&m);

    assert_eq!(t.minimum, Tuple4D::point(-1.41421, -1.70711, -1.70711));
    assert_eq!(t.maximum, Tuple4D::point(1.41421, 1.70711, 1.70711));
}

#[test]
fn infinite_bounds_stay_infinite() {
    let b = Bounds::new(f64::NEG_INFINITY, 0.0, f64::NEG_INFINITY,
        f64::INFINITY, 0.0, f64::INFINITY);

    assert!(!b.transform(&Matrix4D::rotation_z(1.0)).is_finite());
}

#[test]
fn ray_against_bounds() {
    let b = Bounds::new(5.0, -2.0, 0.0, 11.0, 4.0, 7.0);
    let hit = Ray4D::new(Tuple4D::point(15.0, 1.0, 2.0),
        Tuple4D::vector(-1.0, 0.0, 0.0));
    let parallel_inside = Ray4D::new(Tuple4D::point(8.0, 2.0, 12.0),
        Tuple4D::vector(0.0, 0.0, -1.0));
    let miss = Ray4D::new(Tuple4D::point(9.0, -1.0, -8.0),
        Tuple4D::vector(2.0, 4.0, 6.0));
    let parallel_outside = Ray4D::new(Tuple4D::point(12.0, 5.0, 4.0),
        Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(hit.direction.is_vector() && b.intersects(&hit));
    assert!(b.intersects(&parallel_inside));
    assert!(!b.intersects(&miss));
    assert!(!b.intersects(&parallel_outside));
    assert!(!Bounds::empty().intersects(&hit));
}

#[test]
fn nearly_parallel_ray_still_enters_box() {
    let b = Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0);
    let shallow = Ray4D::new(Tuple4D::point(0.0, -1.0005, -5.0),
        Tuple4D::vector(0.0, 0.000008, 0.001));
    let (tmin, tmax) = b.slab_distances(&shallow);

    assert!(b.intersects(&shallow));
    assert!((tmin - 4000.0).abs() < 1e-6);
    assert!((tmax - 6000.0).abs() < 1e-6);
}
