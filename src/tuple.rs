use std::ops::{ Add, Sub, Neg, Mul, Div };

use crate::consts::feq;

/// A homogeneous 4D tuple.
///
/// Points carry `w == 1.0` and vectors carry `w == 0.0`; the arithmetic below
/// keeps that distinction intact, so a point minus a point is a vector and a
/// point plus a vector is a point.
///
/// # Examples
///
/// ```
/// # use tiled_ray_tracer::tuple::Tuple4D;
/// let p = Tuple4D::point(3.0, 2.0, 1.0);
/// let q = Tuple4D::point(5.0, 6.0, 7.0);
/// let v = p - q;
///
/// assert!(v.is_vector());
/// assert!((q + v).is_point());
/// assert_eq!(q + v, p);
/// ```
#[derive(Debug, Default, Copy, Clone)]
pub struct Tuple4D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64
}

impl PartialEq for Tuple4D {
    fn eq(&self, other: &Tuple4D) -> bool {
        feq(self.x, other.x) &&
            feq(self.y, other.y) &&
            feq(self.z, other.z) &&
            feq(self.w, other.w)
    }
}

impl Tuple4D {
    pub fn tuple(x: f64, y: f64, z: f64, w: f64) -> Tuple4D {
        Tuple4D { x, y, z, w }
    }

    pub fn point(x: f64, y: f64, z: f64) -> Tuple4D {
        Tuple4D { x, y, z, w: 1.0 }
    }

    pub fn vector(x: f64, y: f64, z: f64) -> Tuple4D {
        Tuple4D { x, y, z, w: 0.0 }
    }

    /// The origin point, `(0, 0, 0)`.
    pub fn origin() -> Tuple4D {
        Tuple4D::point(0.0, 0.0, 0.0)
    }

    pub fn is_point(&self) -> bool {
        self.w == 1.0
    }

    pub fn is_vector(&self) -> bool {
        self.w == 0.0
    }

    /// Returns this tuple with `w` forced to `0.0`.
    pub fn as_vector(&self) -> Tuple4D {
        Tuple4D { w: 0.0, ..*self }
    }

    /// Returns this tuple with `w` forced to `1.0`.
    pub fn as_point(&self) -> Tuple4D {
        Tuple4D { w: 1.0, ..*self }
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Scales the tuple to unit length.
    ///
    /// A zero-length tuple normalizes to NaN components; callers working with
    /// degenerate geometry are expected to reject it before this point.
    pub fn normalize(&self) -> Tuple4D {
        *self / self.magnitude()
    }

    pub fn dot(&self, other: &Tuple4D) -> f64 {
        self.x * other.x
            + self.y * other.y
            + self.z * other.z
            + self.w * other.w
    }

    /// The cross product of two vectors. Always yields a vector.
    pub fn cross(&self, other: &Tuple4D) -> Tuple4D {
        Tuple4D::vector(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Reflects a vector across a normal.
    pub fn reflect(&self, normal: &Tuple4D) -> Tuple4D {
        *self - (*normal * 2.0 * self.dot(normal))
    }
}

impl Add for Tuple4D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Tuple4D::tuple(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        )
    }
}

impl Sub for Tuple4D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Tuple4D::tuple(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.w - other.w,
        )
    }
}

impl Neg for Tuple4D {
    type Output = Self;

    fn neg(self) -> Self {
        Tuple4D::tuple(-self.x, -self.y, -self.z, -self.w)
    }
}

/// Scalar right-multiplication.
impl Mul<f64> for Tuple4D {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        Tuple4D::tuple(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

/// Scalar left-multiplication, so that both `t * s` and `s * t` read naturally.
impl Mul<Tuple4D> for f64 {
    type Output = Tuple4D;

    fn mul(self, t: Tuple4D) -> Tuple4D {
        t * self
    }
}

impl Div<f64> for Tuple4D {
    type Output = Self;

    fn div(self, s: f64) -> Self {
        Tuple4D::tuple(self.x / s, self.y / s, self.z / s, self.w / s)
    }
}

#[test]
fn point_and_vector_are_tagged_by_w() {
    let p = Tuple4D::point(4.3, -4.2, 3.1);
    let v = Tuple4D::vector(4.3, -4.2, 3.1);

    assert!(p.is_point() && !p.is_vector());
    assert!(v.is_vector() && !v.is_point());
}

#[test]
fn point_plus_vector_is_point() {
    let p = Tuple4D::point(3.0, -2.0, 5.0);
    let v = Tuple4D::vector(-2.0, 3.0, 1.0);

    assert_eq!(p + v, Tuple4D::point(1.0, 1.0, 6.0));
}

#[test]
fn point_minus_point_is_vector() {
    let p1 = Tuple4D::point(3.0, 2.0, 1.0);
    let p2 = Tuple4D::point(5.0, 6.0, 7.0);

    assert_eq!(p1 - p2, Tuple4D::vector(-2.0, -4.0, -6.0));
}

#[test]
fn point_minus_vector_is_point() {
    let p = Tuple4D::point(3.0, 2.0, 1.0);
    let v = Tuple4D::vector(5.0, 6.0, 7.0);

    assert_eq!(p - v, Tuple4D::point(-2.0, -4.0, -6.0));
}

#[test]
fn vector_minus_vector_is_vector() {
    let v1 = Tuple4D::vector(3.0, 2.0, 1.0);
    let v2 = Tuple4D::vector(5.0, 6.0, 7.0);

    assert_eq!(v1 - v2, Tuple4D::vector(-2.0, -4.0, -6.0));
}

#[test]
fn negate_tuple() {
    let a = Tuple4D::tuple(1.0, -2.0, 3.0, -4.0);

    assert_eq!(-a, Tuple4D::tuple(-1.0, 2.0, -3.0, 4.0));
}

#[test]
fn scale_tuple_from_either_side() {
    let a = Tuple4D::tuple(1.0, -2.0, 3.0, -4.0);

    assert_eq!(a * 3.5, Tuple4D::tuple(3.5, -7.0, 10.5, -14.0));
    assert_eq!(0.5 * a, Tuple4D::tuple(0.5, -1.0, 1.5, -2.0));
    assert_eq!(a / 2.0, Tuple4D::tuple(0.5, -1.0, 1.5, -2.0));
}

#[test]
fn magnitude_ignores_sign() {
    assert_eq!(Tuple4D::vector(1.0, 2.0, 3.0).magnitude(), 14f64.sqrt());
    assert_eq!(Tuple4D::vector(-1.0, -2.0, -3.0).magnitude(), 14f64.sqrt());
}

#[test]
fn normalize_vectors() {
    let v = Tuple4D::vector(1.0, 2.0, 3.0);
    let root = 14f64.sqrt();

    assert_eq!(Tuple4D::vector(4.0, 0.0, 0.0).normalize(),
        Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(v.normalize(),
        Tuple4D::vector(1.0 / root, 2.0 / root, 3.0 / root));
    assert!(crate::consts::feq(v.normalize().magnitude(), 1.0));
}

#[test]
fn dot_and_cross() {
    let a = Tuple4D::vector(1.0, 2.0, 3.0);
    let b = Tuple4D::vector(2.0, 3.0, 4.0);

    assert_eq!(a.dot(&b), 20.0);
    assert_eq!(a.cross(&b), Tuple4D::vector(-1.0, 2.0, -1.0));
    assert_eq!(b.cross(&a), Tuple4D::vector(1.0, -2.0, 1.0));
}

#[test]
fn reflect_at_45_degrees() {
    let v = Tuple4D::vector(1.0, -1.0, 0.0);
    let n = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(v.reflect(&n), Tuple4D::vector(1.0, 1.0, 0.0));
}

#[test]
fn reflect_off_slanted_surface() {
    let v = Tuple4D::vector(0.0, -1.0, 0.0);
    let half = 2f64.sqrt() / 2.0;
    let n = Tuple4D::vector(half, half, 0.0);

    assert_eq!(v.reflect(&n), Tuple4D::vector(1.0, 0.0, 0.0));
}
