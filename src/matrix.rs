use std::fmt;
use std::ops::{ Index, IndexMut, Mul };
use std::convert::From;

use crate::consts::{ feq, FEQ_EPSILON };
use crate::error::{ RenderError, Result };
use crate::tuple::Tuple4D;

/// A 4x4 matrix of doubles, stored row-major.
///
/// These matrices encode affine transformations in 3D space, transforming both
/// vectors and points (`w` components of `0.0` and `1.0`, respectively).
///
/// Matrices are plain values: every operation returns a new matrix. Products
/// compose right-to-left, so in `a * b * p` the transform `b` is applied to
/// the point `p` first.
///
/// # Examples
///
/// Calculating a view transformation (for cameras, etc.):
///
/// ```
/// # use tiled_ray_tracer::tuple::Tuple4D;
/// # use tiled_ray_tracer::matrix::Matrix4D;
/// let from = Tuple4D::point(0.0, 0.0, 8.0);
/// let to = Tuple4D::point(0.0, 0.0, 0.0);
/// let up = Tuple4D::vector(0.0, 1.0, 0.0);
/// let view = Matrix4D::view_transform(from, to, up);
///
/// assert_eq!(view, Matrix4D::translation(0.0, 0.0, -8.0));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct Matrix4D {
    data: [f64; 16],
}

/// Matrices are compared element-wise, within floating point tolerance.
impl PartialEq for Matrix4D {
    fn eq(&self, other: &Matrix4D) -> bool {
        self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
    }
}

impl Default for Matrix4D {
    fn default() -> Matrix4D {
        Matrix4D::identity()
    }
}

impl Matrix4D {
    /// Creates a matrix with every element set to `0.0`.
    pub fn zero() -> Matrix4D {
        Matrix4D { data: [0.0; 16] }
    }

    pub fn identity() -> Matrix4D {
        let mut m = Self::zero();
        for i in 0..4 {
            m[(i, i)] = 1.0;
        }

        m
    }

    /// Offsets a point by `x`, `y` and `z`. Vectors are unaffected.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 3)] = x;
        m[(1, 3)] = y;
        m[(2, 3)] = z;

        m
    }

    /// Scales along the X, Y and Z axes. Negative factors reflect.
    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 0)] = x;
        m[(1, 1)] = y;
        m[(2, 2)] = z;

        m
    }

    /// Rotates `r` radians about the X axis.
    ///
    /// ```
    /// # use tiled_ray_tracer::tuple::Tuple4D;
    /// # use tiled_ray_tracer::matrix::Matrix4D;
    /// let m = Matrix4D::rotation_x(std::f64::consts::PI / 2.0);
    /// assert_eq!(m * Tuple4D::point(0.0, 1.0, 0.0),
    ///     Tuple4D::point(0.0, 0.0, 1.0));
    /// ```
    pub fn rotation_x(r: f64) -> Matrix4D {
        let (sin, cos) = r.sin_cos();
        Matrix4D::from([
            1.0, 0.0,  0.0, 0.0,
            0.0, cos, -sin, 0.0,
            0.0, sin,  cos, 0.0,
            0.0, 0.0,  0.0, 1.0,
        ])
    }

    /// Rotates `r` radians about the Y axis.
    pub fn rotation_y(r: f64) -> Matrix4D {
        let (sin, cos) = r.sin_cos();
        Matrix4D::from([
             cos, 0.0, sin, 0.0,
             0.0, 1.0, 0.0, 0.0,
            -sin, 0.0, cos, 0.0,
             0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotates `r` radians about the Z axis.
    pub fn rotation_z(r: f64) -> Matrix4D {
        let (sin, cos) = r.sin_cos();
        Matrix4D::from([
            cos, -sin, 0.0, 0.0,
            sin,  cos, 0.0, 0.0,
            0.0,  0.0, 1.0, 0.0,
            0.0,  0.0, 0.0, 1.0,
        ])
    }

    /// A shearing transform. Each parameter moves one component in proportion
    /// to another; `xy` moves `x` in proportion to `y`, and so on.
    pub fn shearing(xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64)
        -> Matrix4D {
        Matrix4D::from([
            1.0,  xy,  xz, 0.0,
             yx, 1.0,  yz, 0.0,
             zx,  zy, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Generates a view transformation.
    ///
    /// `from` is where the eye is, `to` is where it looks, and `up` roughly
    /// indicates which way is up. The result moves the *world* relative to
    /// the eye, not the other way around.
    pub fn view_transform(from: Tuple4D, to: Tuple4D, up: Tuple4D) -> Matrix4D {
        let forward = (to - from).normalize();
        let left = forward.cross(&up.normalize());
        let true_up = left.cross(&forward);

        let orientation = Matrix4D::from([
              left.x,     left.y,     left.z,    0.0,
             true_up.x,  true_up.y,  true_up.z,  0.0,
            -forward.x, -forward.y, -forward.z,  0.0,
                 0.0,        0.0,        0.0,    1.0,
        ]);

        orientation * Matrix4D::translation(-from.x, -from.y, -from.z)
    }

    /// Applies `next` after `self`, i.e. returns `next * self`.
    ///
    /// Allows transforms to be written in the order they take effect:
    ///
    /// ```
    /// # use tiled_ray_tracer::tuple::Tuple4D;
    /// # use tiled_ray_tracer::matrix::Matrix4D;
    /// let t = Matrix4D::rotation_x(std::f64::consts::PI / 2.0)
    ///     .then(Matrix4D::scaling(5.0, 5.0, 5.0))
    ///     .then(Matrix4D::translation(10.0, 5.0, 7.0));
    ///
    /// assert_eq!(t * Tuple4D::point(1.0, 0.0, 1.0),
    ///     Tuple4D::point(15.0, 0.0, 7.0));
    /// ```
    pub fn then(self, next: Matrix4D) -> Matrix4D {
        next * self
    }

    pub fn transpose(&self) -> Matrix4D {
        let mut t = Matrix4D::zero();
        for r in 0..4 {
            for c in 0..4 {
                t[(c, r)] = self[(r, c)];
            }
        }

        t
    }

    /// The determinant of the 3x3 submatrix left after removing `row` and
    /// `col`.
    pub fn minor(&self, row: usize, col: usize) -> f64 {
        let mut sub = [0.0; 9];
        let mut i = 0;

        for r in (0..4).filter(|&r| r != row) {
            for c in (0..4).filter(|&c| c != col) {
                sub[i] = self[(r, c)];
                i += 1;
            }
        }

        sub[0] * (sub[4] * sub[8] - sub[5] * sub[7])
            - sub[1] * (sub[3] * sub[8] - sub[5] * sub[6])
            + sub[2] * (sub[3] * sub[7] - sub[4] * sub[6])
    }

    /// The minor at `row`, `col`, negated when `row + col` is odd.
    pub fn cofactor(&self, row: usize, col: usize) -> f64 {
        let m = self.minor(row, col);
        if (row + col) % 2 == 0 { m } else { -m }
    }

    pub fn determinant(&self) -> f64 {
        (0..4).map(|c| self[(0, c)] * self.cofactor(0, c)).sum()
    }

    /// Calculates the inverse through the cofactor matrix.
    ///
    /// Fails with `RenderError::NonInvertible` when the determinant is within
    /// `FEQ_EPSILON` of zero. Inversion is comparatively expensive; shapes,
    /// patterns and cameras cache the result in a `Transform`.
    pub fn inverse(&self) -> Result<Matrix4D> {
        let determinant = self.determinant();
        if determinant.abs() < FEQ_EPSILON || !determinant.is_finite() {
            return Err(RenderError::NonInvertible { determinant });
        }

        let mut inv = Matrix4D::zero();
        for r in 0..4 {
            for c in 0..4 {
                inv[(c, r)] = self.cofactor(r, c) / determinant;
            }
        }

        Ok(inv)
    }
}

impl From<[f64; 16]> for Matrix4D {
    fn from(data: [f64; 16]) -> Matrix4D {
        Matrix4D { data }
    }
}

impl Index<(usize, usize)> for Matrix4D {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * 4 + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix4D {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row * 4 + col]
    }
}

/// Matrix product. Not commutative.
impl Mul<Matrix4D> for Matrix4D {
    type Output = Matrix4D;

    fn mul(self, other: Matrix4D) -> Matrix4D {
        let mut res = Matrix4D::zero();

        for r in 0..4 {
            for c in 0..4 {
                res[(r, c)] = (0..4).map(|k| self[(r, k)] * other[(k, c)]).sum();
            }
        }

        res
    }
}

/// Transforms a tuple, treated as a column vector on the right.
impl Mul<Tuple4D> for Matrix4D {
    type Output = Tuple4D;

    fn mul(self, t: Tuple4D) -> Tuple4D {
        let row = |r: usize| {
            self[(r, 0)] * t.x
                + self[(r, 1)] * t.y
                + self[(r, 2)] * t.z
                + self[(r, 3)] * t.w
        };

        Tuple4D::tuple(row(0), row(1), row(2), row(3))
    }
}

impl fmt::Display for Matrix4D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            write!(f, "|")?;
            for c in 0..4 {
                write!(f, " {} |", self[(r, c)])?;
            }

            if r != 3 {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[test]
fn multiply_by_identity() {
    let a: Matrix4D = [ 0.0, 1.0,  2.0,  4.0,
                        1.0, 2.0,  4.0,  8.0,
                        2.0, 4.0,  8.0, 16.0,
                        4.0, 8.0, 16.0, 32.0, ].into();

    assert_eq!(Matrix4D::identity() * a, a);
    assert_eq!(a * Matrix4D::identity(), a);
}

#[test]
fn multiply_matrices() {
    let a: Matrix4D = [ 1.0, 2.0, 3.0, 4.0,
                        5.0, 6.0, 7.0, 8.0,
                        9.0, 8.0, 7.0, 6.0,
                        5.0, 4.0, 3.0, 2.0, ].into();
    let b: Matrix4D = [ -2.0, 1.0, 2.0,  3.0,
                         3.0, 2.0, 1.0, -1.0,
                         4.0, 3.0, 6.0,  5.0,
                         1.0, 2.0, 7.0,  8.0, ].into();
    let ab: Matrix4D = [ 20.0, 22.0,  50.0,  48.0,
                         44.0, 54.0, 114.0, 108.0,
                         40.0, 58.0, 110.0, 102.0,
                         16.0, 26.0,  46.0,  42.0, ].into();

    assert_eq!(a * b, ab);
    assert!(b * a != ab);
}

#[test]
fn transpose_matrix() {
    let a: Matrix4D = [ 0.0, 9.0, 3.0, 0.0,
                        9.0, 8.0, 0.0, 8.0,
                        1.0, 8.0, 5.0, 3.0,
                        0.0, 0.0, 5.0, 8.0, ].into();
    let t: Matrix4D = [ 0.0, 9.0, 1.0, 0.0,
                        9.0, 8.0, 8.0, 0.0,
                        3.0, 0.0, 5.0, 5.0,
                        0.0, 8.0, 3.0, 8.0, ].into();

    assert_eq!(a.transpose(), t);
    assert_eq!(t.transpose(), a);
    assert_eq!(Matrix4D::identity().transpose(), Matrix4D::identity());
}

#[test]
fn determinant_through_cofactors() {
    let a: Matrix4D = [ -2.0, -8.0,  3.0,  5.0,
                        -3.0,  1.0,  7.0,  3.0,
                         1.0,  2.0, -9.0,  6.0,
                        -6.0,  7.0,  7.0, -9.0, ].into();

    assert_eq!(a.cofactor(0, 0), 690.0);
    assert_eq!(a.cofactor(0, 1), 447.0);
    assert_eq!(a.cofactor(0, 2), 210.0);
    assert_eq!(a.cofactor(0, 3), 51.0);
    assert_eq!(a.determinant(), -4071.0);
}

#[test]
fn singular_matrix_is_not_invertible() {
    let a: Matrix4D = [ -4.0,  2.0, -2.0, -3.0,
                         9.0,  6.0,  2.0,  6.0,
                         0.0, -5.0,  1.0, -5.0,
                         0.0,  0.0,  0.0,  0.0, ].into();

    assert_eq!(a.determinant(), 0.0);
    assert!(matches!(a.inverse(), Err(RenderError::NonInvertible { .. })));
    assert!(Matrix4D::scaling(0.0, 1.0, 1.0).inverse().is_err());
}

#[test]
fn inverse_matches_cofactor_formula() {
    let a: Matrix4D = [ -5.0,  2.0,  6.0, -8.0,
                         1.0, -5.0,  1.0,  8.0,
                         7.0,  7.0, -6.0, -7.0,
                         1.0, -3.0,  7.0,  4.0, ].into();
    let b = a.inverse().unwrap();

    assert_eq!(a.determinant(), 532.0);
    assert_eq!(a.cofactor(2, 3), -160.0);
    assert!(feq(b[(3, 2)], -160.0 / 532.0));
    assert_eq!(a.cofactor(3, 2), 105.0);
    assert!(feq(b[(2, 3)], 105.0 / 532.0));
}

#[test]
fn product_with_inverse_is_identity() {
    let matrices: Vec<Matrix4D> = vec![
        [ 8.0, -5.0,  9.0,  2.0,
          7.0,  5.0,  6.0,  1.0,
         -6.0,  0.0,  9.0,  6.0,
         -3.0,  0.0, -9.0, -4.0, ].into(),
        [ 9.0,  3.0,  0.0,  9.0,
         -5.0, -2.0, -6.0, -3.0,
         -4.0,  9.0,  6.0,  4.0,
         -7.0,  6.0,  6.0,  2.0, ].into(),
        Matrix4D::translation(5.0, -3.0, 2.0)
            * Matrix4D::rotation_y(0.7)
            * Matrix4D::scaling(2.0, 0.5, 3.0)
            * Matrix4D::shearing(1.0, 0.0, 0.5, 0.0, 0.0, 0.25),
    ];

    for m in matrices {
        let inv = m.inverse().unwrap();
        assert_eq!(m * inv, Matrix4D::identity());
        assert_eq!(inv * m, Matrix4D::identity());
    }
}

#[test]
fn product_times_inverse_restores_operand() {
    let a: Matrix4D = [ 3.0, -9.0,  7.0,  3.0,
                        3.0, -8.0,  2.0, -9.0,
                       -4.0,  4.0,  4.0,  1.0,
                       -6.0,  5.0, -1.0,  1.0, ].into();
    let b: Matrix4D = [ 8.0,  2.0,  2.0,  2.0,
                        3.0, -1.0,  7.0,  0.0,
                        7.0,  0.0,  5.0,  4.0,
                        6.0, -2.0,  0.0,  5.0, ].into();
    let c = a * b;

    assert_eq!(c * b.inverse().unwrap(), a);
}

#[test]
fn translate_points_not_vectors() {
    let t = Matrix4D::translation(5.0, -3.0, 2.0);
    let inv = t.inverse().unwrap();

    assert_eq!(t * Tuple4D::point(-3.0, 4.0, 5.0), Tuple4D::point(2.0, 1.0, 7.0));
    assert_eq!(inv * Tuple4D::point(-3.0, 4.0, 5.0),
        Tuple4D::point(-8.0, 7.0, 3.0));
    assert_eq!(t * Tuple4D::vector(-3.0, 4.0, 5.0),
        Tuple4D::vector(-3.0, 4.0, 5.0));
}

#[test]
fn scale_and_reflect() {
    let s = Matrix4D::scaling(2.0, 3.0, 4.0);

    assert_eq!(s * Tuple4D::point(-4.0, 6.0, 8.0), Tuple4D::point(-8.0, 18.0, 32.0));
    assert_eq!(s.inverse().unwrap() * Tuple4D::vector(-4.0, 6.0, 8.0),
        Tuple4D::vector(-2.0, 2.0, 2.0));
    assert_eq!(Matrix4D::scaling(-1.0, 1.0, 1.0) * Tuple4D::point(2.0, 3.0, 4.0),
        Tuple4D::point(-2.0, 3.0, 4.0));
}

#[test]
fn rotate_about_each_axis() {
    use std::f64::consts::PI;
    let half = 2f64.sqrt() / 2.0;

    assert_eq!(Matrix4D::rotation_x(PI / 4.0) * Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(0.0, half, half));
    assert_eq!(Matrix4D::rotation_y(PI / 4.0) * Tuple4D::point(0.0, 0.0, 1.0),
        Tuple4D::point(half, 0.0, half));
    assert_eq!(Matrix4D::rotation_z(PI / 4.0) * Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-half, half, 0.0));
    assert_eq!(Matrix4D::rotation_x(PI / 4.0).inverse().unwrap()
        * Tuple4D::point(0.0, 1.0, 0.0), Tuple4D::point(0.0, half, -half));
}

#[test]
fn shear_each_component() {
    let p = Tuple4D::point(2.0, 3.0, 4.0);

    assert_eq!(Matrix4D::shearing(1.0, 0.0, 0.0, 0.0, 0.0, 0.0) * p,
        Tuple4D::point(5.0, 3.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 1.0, 0.0, 0.0, 0.0, 0.0) * p,
        Tuple4D::point(6.0, 3.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 1.0, 0.0, 0.0, 0.0) * p,
        Tuple4D::point(2.0, 5.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 1.0, 0.0, 0.0) * p,
        Tuple4D::point(2.0, 7.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 0.0, 1.0, 0.0) * p,
        Tuple4D::point(2.0, 3.0, 6.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 0.0, 0.0, 1.0) * p,
        Tuple4D::point(2.0, 3.0, 7.0));
}

#[test]
fn chained_transforms_apply_right_to_left() {
    use std::f64::consts::PI;

    let a = Matrix4D::rotation_x(PI / 2.0);
    let b = Matrix4D::scaling(5.0, 5.0, 5.0);
    let c = Matrix4D::translation(10.0, 5.0, 7.0);
    let p = Tuple4D::point(1.0, 0.0, 1.0);

    assert_eq!(c * b * a * p, Tuple4D::point(15.0, 0.0, 7.0));
    assert_eq!(a.then(b).then(c), c * b * a);
}

#[test]
fn default_view_is_identity() {
    let view = Matrix4D::view_transform(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::point(0.0, 0.0, -1.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    );

    assert_eq!(view, Matrix4D::identity());
}

#[test]
fn view_looking_down_positive_z_mirrors() {
    let view = Matrix4D::view_transform(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::point(0.0, 0.0, 1.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    );

    assert_eq!(view, Matrix4D::scaling(-1.0, 1.0, -1.0));
}

#[test]
fn arbitrary_view() {
    let view = Matrix4D::view_transform(
        Tuple4D::point(1.0, 3.0, 2.0),
        Tuple4D::point(4.0, -2.0, 8.0),
        Tuple4D::vector(1.0, 1.0, 0.0),
    );
    let expected: Matrix4D = [
        -0.50709, 0.50709,  0.67612, -2.36643,
         0.76772, 0.60609,  0.12122, -2.82843,
        -0.35857, 0.59761, -0.71714,  0.00000,
         0.00000, 0.00000,  0.00000,  1.00000,
    ].into();

    assert_eq!(view, expected);
}
