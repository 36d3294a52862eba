use serde::{ Serialize, Deserialize };

use crate::intersect::Intersections;
use crate::shape::{ SceneGraph, ShapeId };

/// A boolean operation combining two shapes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsgOp {
    /// Everything inside either operand.
    Union,

    /// Only what is inside both operands.
    Intersection,

    /// What is inside the left operand but outside the right one.
    Difference,
}

/// Decides whether a hit on one operand of a CSG node lies on the surface of
/// the combined shape.
///
/// `lhit` is true when the hit belongs to the left operand; `inl` and `inr`
/// say whether the ray is currently inside the left and right operands.
pub fn intersection_allowed(op: CsgOp, lhit: bool, inl: bool, inr: bool) -> bool {
    match op {
        CsgOp::Union => (lhit && !inr) || (!lhit && !inl),
        CsgOp::Intersection => (lhit && inr) || (!lhit && inl),
        CsgOp::Difference => (lhit && !inr) || (!lhit && inl),
    }
}

/// Keeps only the intersections that lie on the surface of the combined
/// shape.
///
/// `xs` must be sorted and must include hits behind the ray origin: the walk
/// starts outside both operands at `t = -inf`, and each hit on an operand
/// toggles whether the ray is inside it.
pub fn filter_intersections(graph: &SceneGraph, op: CsgOp, left: ShapeId,
    xs: Intersections) -> Intersections {
    let mut inl = false;
    let mut inr = false;
    let mut result = Intersections::new();

    for i in xs {
        let lhit = graph.includes(left, i.what);

        if intersection_allowed(op, lhit, inl, inr) {
            result.push(i);
        }

        if lhit {
            inl = !inl;
        } else {
            inr = !inr;
        }
    }

    result
}

#[cfg(test)]
use crate::shape::Shape;
#[cfg(test)]
use crate::intersect::Intersection;
#[cfg(test)]
use crate::tuple::Tuple4D;
#[cfg(test)]
use crate::ray::Ray4D;
#[cfg(test)]
use crate::matrix::Matrix4D;

#[test]
fn inclusion_truth_table() {
    use CsgOp::*;

    // (op, lhit, inl, inr, allowed)
    let table = [
        (Union, true, true, true, false),
        (Union, true, true, false, true),
        (Union, true, false, true, false),
        (Union, true, false, false, true),
        (Union, false, true, true, false),
        (Union, false, true, false, false),
        (Union, false, false, true, true),
        (Union, false, false, false, true),
        (Intersection, true, true, true, true),
        (Intersection, true, true, false, false),
        (Intersection, true, false, true, true),
        (Intersection, true, false, false, false),
        (Intersection, false, true, true, true),
        (Intersection, false, true, false, true),
        (Intersection, false, false, true, false),
        (Intersection, false, false, false, false),
        (Difference, true, true, true, false),
        (Difference, true, true, false, true),
        (Difference, true, false, true, false),
        (Difference, true, false, false, true),
        (Difference, false, true, true, true),
        (Difference, false, true, false, true),
        (Difference, false, false, true, false),
        (Difference, false, false, false, false),
    ];

    for (op, lhit, inl, inr, allowed) in table {
        assert_eq!(intersection_allowed(op, lhit, inl, inr), allowed,
            "{:?} lhit={} inl={} inr={}", op, lhit, inl, inr);
    }
}

#[test]
fn filtering_a_list_of_intersections() {
    let cases = [
        (CsgOp::Union, [0, 3]),
        (CsgOp::Intersection, [1, 2]),
        (CsgOp::Difference, [0, 1]),
    ];

    for (op, expected) in cases {
        let mut graph = SceneGraph::new();
        let s1 = graph.insert(Shape::sphere());
        let s2 = graph.insert(Shape::cube());
        graph.csg(op, s1, s2).unwrap();

        let xs = Intersections::from(vec![
            Intersection::new(1.0, s1),
            Intersection::new(2.0, s2),
            Intersection::new(3.0, s1),
            Intersection::new(4.0, s2),
        ]);
        let result = filter_intersections(&graph, op, s1, xs.clone());

        assert_eq!(result.len(), 2);
        assert_eq!(result[0], xs[expected[0]]);
        assert_eq!(result[1], xs[expected[1]]);
    }
}

#[test]
fn ray_misses_csg_object() {
    let mut graph = SceneGraph::new();
    let s1 = graph.insert(Shape::sphere());
    let s2 = graph.insert(Shape::cube());
    let c = graph.csg(CsgOp::Union, s1, s2).unwrap();
    let r = Ray4D::new(Tuple4D::point(0.0, 2.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(graph.intersect(c, &r).is_empty());
}

#[test]
fn ray_hits_csg_object() {
    let mut graph = SceneGraph::new();
    let s1 = graph.insert(Shape::sphere());
    let s2 = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 0.5)).unwrap());
    let c = graph.csg(CsgOp::Union, s1, s2).unwrap();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = graph.intersect(c, &r);

    assert_eq!(xs.len(), 2);
    assert_eq!(xs[0], Intersection::new(4.0, s1));
    assert_eq!(xs[1], Intersection::new(6.5, s2));
}

#[test]
fn difference_carves_nested_operands() {
    // A cube with a sphere bitten out of its +z face, where the left operand
    // is itself a group.
    let mut graph = SceneGraph::new();
    let g = graph.insert(Shape::group());
    let cube = graph.insert(Shape::cube());
    graph.add_child(g, cube).unwrap();
    let bite = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 1.0)).unwrap());
    let c = graph.csg(CsgOp::Difference, g, bite).unwrap();

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, 5.0), Tuple4D::vector(0.0, 0.0, -1.0));
    let xs = graph.intersect(c, &r);

    assert_eq!(xs.len(), 2);
    assert_eq!(xs[0], Intersection::new(5.0, bite));
    assert_eq!(xs[1], Intersection::new(6.0, cube));
}

#[test]
fn intersection_ignores_disjoint_operands() {
    let mut graph = SceneGraph::new();
    let s1 = graph.insert(Shape::sphere());
    let s2 = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 3.0)).unwrap());
    let c = graph.csg(CsgOp::Intersection, s1, s2).unwrap();
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(graph.intersect(c, &r).is_empty());
}
