use std::ops::Index;

use crate::consts::SURFACE_OFFSET;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::shape::{ SceneGraph, ShapeId };

/// An intersection.
///
/// This structure assumes that some ray produced an intersection. Parameter `t`
/// is analogous to `t` for a ray (the offset from the ray origin), and `what`
/// names the primitive that was struck. Containers (groups and CSG nodes)
/// never appear here; they forward the hits of their children.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub t: f64,
    pub what: ShapeId,

    /// Barycentric coordinates of the hit, recorded by smooth triangles.
    pub uv: Option<(f64, f64)>,
}

impl Intersection {
    pub fn new(t: f64, what: ShapeId) -> Intersection {
        Intersection { t, what, uv: None }
    }

    pub fn new_uv(t: f64, what: ShapeId, u: f64, v: f64) -> Intersection {
        Intersection { t, what, uv: Some((u, v)) }
    }
}

/// A collection of intersections, kept sorted by `t` once `sort` or
/// `aggregate` has run.
#[derive(Clone, Debug, Default)]
pub struct Intersections {
    intersections: Vec<Intersection>,
}

impl From<Vec<Intersection>> for Intersections {
    fn from(intersections: Vec<Intersection>) -> Intersections {
        let mut is = Intersections { intersections };
        is.sort();
        is
    }
}

impl Index<usize> for Intersections {
    type Output = Intersection;

    fn index(&self, i: usize) -> &Intersection {
        &self.intersections[i]
    }
}

impl IntoIterator for Intersections {
    type Item = Intersection;
    type IntoIter = std::vec::IntoIter<Intersection>;

    fn into_iter(self) -> Self::IntoIter {
        self.intersections.into_iter()
    }
}

impl Intersections {
    pub fn new() -> Intersections {
        Intersections { intersections: Vec::new() }
    }

    /// Merges several intersection lists into one sorted list.
    pub fn aggregate<I>(lists: I) -> Intersections
        where I: IntoIterator<Item = Intersections> {
        let intersections = lists.into_iter()
            .flat_map(|is| is.intersections)
            .collect::<Vec<_>>();

        Intersections::from(intersections)
    }

    pub fn push(&mut self, i: Intersection) {
        self.intersections.push(i);
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Intersection> {
        self.intersections.iter()
    }

    /// The visible intersection: the one with the smallest non-negative `t`.
    ///
    /// Non-finite values of `t` are never hits, so a NaN produced by
    /// degenerate math cannot masquerade as a real intersection.
    pub fn hit(&self) -> Option<Intersection> {
        self.intersections.iter()
            .filter(|i| i.t.is_finite() && i.t >= 0.0)
            .min_by(|a, b| a.t.total_cmp(&b.t))
            .copied()
    }

    /// Sorts the intersections by `t`. Positive NaNs sort after every
    /// number.
    pub fn sort(&mut self) {
        self.intersections.sort_by(|a, b| a.t.total_cmp(&b.t));
    }
}

/// A record for computations associated with an `Intersection`.
///
/// Mostly a superset of an `Intersection`.
#[derive(Clone, Debug)]
pub struct IntersectionComputation {
    /// The "time" of the ray intersection.
    pub t: f64,

    /// The object being intersected.
    pub obj: ShapeId,

    /// The point where the intersection occurs.
    pub point: Tuple4D,

    /// A point slightly above the intersected surface. Used to prevent an
    /// object from shadowing itself (this causes "acne").
    pub over_point: Tuple4D,

    /// A point slightly below the intersected surface. Used to prevent an
    /// object from refracting itself on its surface.
    pub under_point: Tuple4D,

    /// The eye vector for the intersection.
    pub eyev: Tuple4D,

    /// The normal vector of the object being intersected.
    pub normalv: Tuple4D,

    /// The intersection ray, reflected across the normal.
    pub reflectv: Tuple4D,

    /// Whether the intersection occurs within the object or not.
    pub inside: bool,

    /// The refractive index of the material being exited.
    pub n1: f64,

    /// The refractive index of the material being entered.
    pub n2: f64,
}

impl IntersectionComputation {
    /// Creates a new intersection computation, given a ray and intersection.
    ///
    /// The `xs` parameter is the full list of intersections along the ray.
    /// If provided, refraction indices will be calculated; otherwise both are
    /// those of a vacuum.
    pub fn new(graph: &SceneGraph, r: &Ray4D, hit: &Intersection,
        xs: Option<&Intersections>) -> IntersectionComputation {
        let t = hit.t;
        let obj = hit.what;
        let point = r.position(t);
        let eyev = -r.direction;
        let mut normalv = graph.normal_at(hit, point);

        let inside = if normalv.dot(&eyev) < 0.0 {
            normalv = -normalv;
            true
        } else {
            false
        };

        let over_point = point + normalv * SURFACE_OFFSET;
        let under_point = point - normalv * SURFACE_OFFSET;

        let reflectv = r.direction.reflect(&normalv);
        let (n1, n2) = match xs {
            Some(xs) => Self::refraction_indices(graph, hit, xs),
            None => (1.0, 1.0),
        };

        IntersectionComputation {
            t, obj,
            point, over_point, under_point,
            eyev, normalv, reflectv,
            inside,
            n1, n2,
        }
    }

    /// Walks the intersections up to `hit`, tracking which objects the ray
    /// is currently inside of. The innermost container on either side of the
    /// hit gives the exiting and entering refractive indices.
    fn refraction_indices(graph: &SceneGraph, hit: &Intersection,
        xs: &Intersections) -> (f64, f64) {
        let index_of = |containers: &[ShapeId]| containers.last()
            .map_or(1.0, |&id| graph.material(id).refractive_index);

        let mut n1 = 1.0;
        let mut n2 = 1.0;
        let mut containers: Vec<ShapeId> = Vec::new();

        for i in xs.iter() {
            let is_hit = i == hit;
            if is_hit {
                n1 = index_of(&containers);
            }

            match containers.iter().position(|&x| x == i.what) {
                Some(j) => { containers.remove(j); },
                None => containers.push(i.what),
            }

            if is_hit {
                n2 = index_of(&containers);
                break;
            }
        }

        (n1, n2)
    }

    /// Calculates the reflectance of a hit (Schlick's approximation of the
    /// Fresnel term).
    ///
    /// The reflectance is a number between 0 and 1, representing what fraction
    /// of the light is reflected for the hit.
    pub fn schlick(&self) -> f64 {
        let mut cos = self.eyev.dot(&self.normalv);

        // Total internal reflection can only occur if n1 > n2.
        if self.n1 > self.n2 {
            let n = self.n1 / self.n2;
            let sin2_t = n.powi(2) * (1.0 - cos.powi(2));
            if sin2_t > 1.0 {
                return 1.0;
            }

            cos = (1.0 - sin2_t).sqrt();
        }

        let r0 = ((self.n1 - self.n2) / (self.n1 + self.n2)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos).powi(5)
    }
}

#[cfg(test)]
use crate::shape::Shape;
#[cfg(test)]
use crate::matrix::Matrix4D;
#[cfg(test)]
use crate::material::Material;

#[cfg(test)]
fn glass_sphere(graph: &mut SceneGraph, transform: Matrix4D, ri: f64) -> ShapeId {
    let material = Material { refractive_index: ri, ..Material::glass() };
    graph.insert(Shape::sphere()
        .with_transform(transform).unwrap()
        .with_material(material))
}

#[test]
fn hit_with_all_positive() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere());
    let i1 = Intersection::new(1.0, s);
    let i2 = Intersection::new(2.0, s);

    assert_eq!(Intersections::from(vec![i2, i1]).hit(), Some(i1));
}

#[test]
fn hit_with_some_negative() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere());
    let i1 = Intersection::new(-1.0, s);
    let i2 = Intersection::new(1.0, s);

    assert_eq!(Intersections::from(vec![i2, i1]).hit(), Some(i2));
}

#[test]
fn hit_with_all_negative() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere());
    let xs = Intersections::from(vec![
        Intersection::new(-2.0, s),
        Intersection::new(-1.0, s),
    ]);

    assert_eq!(xs.hit(), None);
}

#[test]
fn hit_is_lowest_nonnegative() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere());
    let i4 = Intersection::new(2.0, s);
    let xs = Intersections::from(vec![
        Intersection::new(5.0, s),
        Intersection::new(7.0, s),
        Intersection::new(-3.0, s),
        i4,
    ]);

    assert_eq!(xs.hit(), Some(i4));
    assert_eq!(xs[0].t, -3.0);
}

#[test]
fn nan_is_never_a_hit() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere());
    let xs = Intersections::from(vec![
        Intersection::new(f64::NAN, s),
        Intersection::new(f64::INFINITY, s),
    ]);

    assert_eq!(xs.hit(), None);
}

#[test]
fn long_lists_with_nans_sort_numbers_in_order() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere());
    let xs = Intersections::from((0..40)
        .map(|i| if i % 3 == 0 {
            Intersection::new(f64::NAN, s)
        } else {
            Intersection::new((40 - i) as f64, s)
        })
        .collect::<Vec<_>>());

    let finite: Vec<f64> = xs.iter().map(|i| i.t).filter(|t| !t.is_nan()).collect();
    assert_eq!(xs.len(), 40);
    assert!(finite.windows(2).all(|w| w[0] <= w[1]));
    assert!(xs.iter().skip(finite.len()).all(|i| i.t.is_nan()));
    assert_eq!(xs.hit().map(|i| i.t), Some(2.0));
}

#[test]
fn aggregate_sorts_merged_lists() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere());
    let a = Intersections::from(vec![Intersection::new(3.0, s), Intersection::new(1.0, s)]);
    let b = Intersections::from(vec![Intersection::new(2.0, s)]);
    let xs = Intersections::aggregate(vec![a, b]);

    assert_eq!(xs.iter().map(|i| i.t).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn precompute_outside_intersection() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere());
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(4.0, s);
    let comps = IntersectionComputation::new(&graph, &r, &i, None);

    assert_eq!(comps.obj, s);
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(!comps.inside);
}

#[test]
fn precompute_inside_intersection() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere());
    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(1.0, s);
    let comps = IntersectionComputation::new(&graph, &r, &i, None);

    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, 1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(comps.inside);
}

#[test]
fn hit_should_offset_point() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 1.0)).unwrap());
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(5.0, s);
    let comps = IntersectionComputation::new(&graph, &r, &i, None);

    assert!(comps.over_point.z < -SURFACE_OFFSET / 2.0);
    assert!(comps.point.z > comps.over_point.z);
    assert!(comps.under_point.z > SURFACE_OFFSET / 2.0);
    assert!(comps.point.z < comps.under_point.z);
}

#[test]
fn precompute_reflection_vector() {
    let mut graph = SceneGraph::new();
    let p = graph.insert(Shape::plane());
    let half = 2f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 1.0, -1.0), Tuple4D::vector(0.0, -half, half));
    let i = Intersection::new(2f64.sqrt(), p);
    let comps = IntersectionComputation::new(&graph, &r, &i, None);

    assert_eq!(comps.reflectv, Tuple4D::vector(0.0, half, half));
}

#[test]
fn refractive_indices_at_each_boundary() {
    let mut graph = SceneGraph::new();
    let a = glass_sphere(&mut graph, Matrix4D::scaling(2.0, 2.0, 2.0), 1.5);
    let b = glass_sphere(&mut graph, Matrix4D::translation(0.0, 0.0, -0.25), 2.0);
    let c = glass_sphere(&mut graph, Matrix4D::translation(0.0, 0.0, 0.25), 2.5);

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -4.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = Intersections::from(vec![
        Intersection::new(2.0, a),
        Intersection::new(2.75, b),
        Intersection::new(3.25, c),
        Intersection::new(4.75, b),
        Intersection::new(5.25, c),
        Intersection::new(6.0, a),
    ]);
    let expected = [(1.0, 1.5), (1.5, 2.0), (2.0, 2.5), (2.5, 2.5), (2.5, 1.5), (1.5, 1.0)];

    for (i, (n1, n2)) in expected.iter().enumerate() {
        let comps = IntersectionComputation::new(&graph, &r, &xs[i], Some(&xs));
        assert_eq!((comps.n1, comps.n2), (*n1, *n2));
    }
}

#[test]
fn schlick_under_total_internal_reflection() {
    let mut graph = SceneGraph::new();
    let s = glass_sphere(&mut graph, Matrix4D::identity(), 1.5);
    let half = 2f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, half), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs = Intersections::from(vec![
        Intersection::new(-half, s),
        Intersection::new(half, s),
    ]);
    let comps = IntersectionComputation::new(&graph, &r, &xs[1], Some(&xs));

    assert_eq!(comps.schlick(), 1.0);
}

#[test]
fn schlick_with_perpendicular_ray() {
    let mut graph = SceneGraph::new();
    let s = glass_sphere(&mut graph, Matrix4D::identity(), 1.5);
    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs = Intersections::from(vec![
        Intersection::new(-1.0, s),
        Intersection::new(1.0, s),
    ]);
    let comps = IntersectionComputation::new(&graph, &r, &xs[1], Some(&xs));

    assert!(crate::consts::feq(comps.schlick(), 0.04));
}

#[test]
fn schlick_with_small_angle() {
    let mut graph = SceneGraph::new();
    let s = glass_sphere(&mut graph, Matrix4D::identity(), 1.5);
    let r = Ray4D::new(Tuple4D::point(0.0, 0.99, -2.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = graph.intersect(s, &r);
    let comps = IntersectionComputation::new(&graph, &r, &xs[0], Some(&xs));

    assert!(crate::consts::feq(xs[0].t, 1.85893));
    assert!(crate::consts::feq(comps.schlick(), 0.48881));
}
