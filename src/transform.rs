use crate::error::Result;
use crate::matrix::Matrix4D;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;

/// A transformation matrix together with its cached inverse.
///
/// Shapes, patterns and cameras need the inverse of their transform for every
/// ray they see, so it is computed once here. The fields are private and the
/// only constructor inverts eagerly; the matrix and its inverse therefore can
/// never disagree, and a degenerate matrix is rejected when it is assigned.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    matrix: Matrix4D,
    inverse: Matrix4D,
    inverse_transpose: Matrix4D,
}

impl Default for Transform {
    fn default() -> Transform {
        Transform::identity()
    }
}

impl Transform {
    /// Wraps `matrix`, failing with `NonInvertible` if it has no inverse.
    pub fn new(matrix: Matrix4D) -> Result<Transform> {
        let inverse = matrix.inverse()?;

        Ok(Transform {
            matrix,
            inverse,
            inverse_transpose: inverse.transpose(),
        })
    }

    pub fn identity() -> Transform {
        Transform {
            matrix: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
            inverse_transpose: Matrix4D::identity(),
        }
    }

    pub fn matrix(&self) -> &Matrix4D {
        &self.matrix
    }

    pub fn inverse(&self) -> &Matrix4D {
        &self.inverse
    }

    /// Maps a point or vector from the parent frame into this local frame.
    pub fn to_local(&self, t: Tuple4D) -> Tuple4D {
        self.inverse * t
    }

    /// Maps a ray from the parent frame into this local frame.
    pub fn ray_to_local(&self, ray: &Ray4D) -> Ray4D {
        ray.transform(&self.inverse)
    }

    /// Maps a local normal back into the parent frame.
    ///
    /// The result is re-normalized with `w` cleared; the translation part of
    /// the inverse transpose would otherwise leak into `w`.
    pub fn normal_to_parent(&self, normal: Tuple4D) -> Tuple4D {
        (self.inverse_transpose * normal).as_vector().normalize()
    }
}

#[test]
fn identity_transform_round_trips() {
    let t = Transform::identity();
    let p = Tuple4D::point(1.0, -2.0, 3.0);

    assert_eq!(t.to_local(p), p);
    assert_eq!(Transform::default(), t);
}

#[test]
fn cached_inverse_matches_matrix() {
    let m = Matrix4D::translation(1.0, 2.0, 3.0) * Matrix4D::scaling(2.0, 2.0, 2.0);
    let t = Transform::new(m).unwrap();

    assert_eq!(*t.matrix() * *t.inverse(), Matrix4D::identity());
    assert_eq!(t.to_local(Tuple4D::point(3.0, 4.0, 5.0)),
        Tuple4D::point(1.0, 1.0, 1.0));
}

#[test]
fn degenerate_transform_is_rejected() {
    assert!(Transform::new(Matrix4D::scaling(1.0, 0.0, 1.0)).is_err());
}

#[test]
fn normals_use_inverse_transpose() {
    let t = Transform::new(Matrix4D::scaling(1.0, 0.5, 1.0)).unwrap();
    let n = t.normal_to_parent(Tuple4D::vector(0.0, 1.0, 0.0));

    assert_eq!(n, Tuple4D::vector(0.0, 1.0, 0.0));
    assert!(n.is_vector());
}
