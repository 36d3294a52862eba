use std::ops::Index;
use std::sync::OnceLock;

use crate::error::{ RenderError, Result };
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::bounds::Bounds;
use crate::material::{ Material, DEFAULT_MATERIAL };
use crate::intersect::{ Intersection, Intersections };
use crate::csg::{ CsgOp, filter_intersections };
use crate::geometry::{ self, TriangleInfo, SmoothTriangleInfo };

/// A handle to a shape stored in a `SceneGraph`.
///
/// Ids are only meaningful for the graph that issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(usize);

impl ShapeId {
    pub fn index(&self) -> usize {
        self.0
    }

    /// An id that belongs to no graph, for exercising the per-primitive math
    /// in isolation.
    #[cfg(test)]
    pub(crate) fn detached() -> ShapeId {
        ShapeId(usize::MAX)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeType {
    /// A unit sphere with its center at the object-space origin.
    Sphere,

    /// The `y = 0` plane, stretching indefinitely along X and Z.
    Plane,

    /// A 2-by-2-by-2 cube with its center at the object-space origin.
    Cube,

    /// A unit-radius cylinder around the Y axis, truncated to
    /// `minimum < y < maximum`.
    Cylinder { minimum: f64, maximum: f64, closed: bool },

    /// A double-napped cone around the Y axis, truncated to
    /// `minimum < y < maximum`.
    Cone { minimum: f64, maximum: f64, closed: bool },

    /// A triangle. See TriangleInfo for further explanation.
    Triangle(TriangleInfo),

    /// A triangle with interpolated vertex normals.
    SmoothTriangle(SmoothTriangleInfo),

    /// A group of shapes. Can include other groups of shapes.
    Group(Vec<ShapeId>),

    /// A boolean combination of a left and a right operand.
    Csg(CsgOp, ShapeId, ShapeId),
}

/// A node of the scene graph.
///
/// Shapes are built standalone and then moved into a `SceneGraph`, which
/// hands back a `ShapeId`. The graph owns every shape; containers refer to
/// their children by id and each child records its parent by id.
#[derive(Clone, Debug)]
pub struct Shape {
    /// The shape's own material. `None` inherits from the nearest ancestor
    /// that has one.
    pub material: Option<Material>,

    /// Whether this shape blocks shadow rays.
    pub casts_shadow: bool,

    ty: ShapeType,
    transform: Transform,
    parent: Option<ShapeId>,

    /// Object-space bounds, computed on first use.
    saved_bounds: OnceLock<Bounds>,
}

impl Shape {
    fn new(ty: ShapeType) -> Shape {
        Shape {
            material: None,
            casts_shadow: true,
            ty,
            transform: Transform::identity(),
            parent: None,
            saved_bounds: OnceLock::new(),
        }
    }

    pub fn sphere() -> Shape {
        Shape::new(ShapeType::Sphere)
    }

    pub fn plane() -> Shape {
        Shape::new(ShapeType::Plane)
    }

    pub fn cube() -> Shape {
        Shape::new(ShapeType::Cube)
    }

    /// An infinitely long, open cylinder.
    pub fn cylinder() -> Shape {
        Shape::bounded_cylinder(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn bounded_cylinder(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeType::Cylinder { minimum, maximum, closed: false })
    }

    pub fn capped_cylinder(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeType::Cylinder { minimum, maximum, closed: true })
    }

    /// An infinite, open double-napped cone.
    pub fn cone() -> Shape {
        Shape::bounded_cone(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn bounded_cone(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeType::Cone { minimum, maximum, closed: false })
    }

    pub fn capped_cone(minimum: f64, maximum: f64) -> Shape {
        Shape::new(ShapeType::Cone { minimum, maximum, closed: true })
    }

    pub fn triangle(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D) -> Shape {
        Shape::new(ShapeType::Triangle(TriangleInfo::new(p1, p2, p3)))
    }

    pub fn smooth_triangle(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D,
        n1: Tuple4D, n2: Tuple4D, n3: Tuple4D) -> Shape {
        Shape::new(ShapeType::SmoothTriangle(
            SmoothTriangleInfo::new(p1, p2, p3, n1, n2, n3)
        ))
    }

    /// An empty group. Children are attached with `SceneGraph::add_child`.
    pub fn group() -> Shape {
        Shape::new(ShapeType::Group(Vec::new()))
    }

    pub fn ty(&self) -> &ShapeType {
        &self.ty
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replaces the transform, failing if `m` cannot be inverted. On failure
    /// the previous transform is kept.
    pub fn set_transform(&mut self, m: Matrix4D) -> Result<()> {
        self.transform = Transform::new(m)?;
        Ok(())
    }

    pub fn with_transform(mut self, m: Matrix4D) -> Result<Shape> {
        self.set_transform(m)?;
        Ok(self)
    }

    pub fn with_material(self, material: Material) -> Shape {
        Shape { material: Some(material), ..self }
    }

    pub fn with_shadow(self, casts_shadow: bool) -> Shape {
        Shape { casts_shadow, ..self }
    }

    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }
}

/// An arena owning every shape of a scene.
///
/// The graph is a forest: groups and CSG nodes own their children
/// exclusively and the parent links can never form a cycle. The top-level
/// shapes rendered by a world are its roots.
///
/// Once built, a graph is only read during rendering, so it can be shared
/// freely between worker threads.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    shapes: Vec<Shape>,
    roots: Vec<ShapeId>,
}

impl Index<ShapeId> for SceneGraph {
    type Output = Shape;

    /// Panics if `id` was not issued by this graph.
    fn index(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.0]
    }
}

impl SceneGraph {
    pub fn new() -> SceneGraph {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Moves a shape into the graph as a detached node.
    ///
    /// A copied container is inserted empty: children are never shared
    /// between two owners.
    pub fn insert(&mut self, mut shape: Shape) -> ShapeId {
        if matches!(shape.ty, ShapeType::Group(_) | ShapeType::Csg(..)) {
            shape.ty = ShapeType::Group(Vec::new());
        }
        shape.parent = None;
        shape.saved_bounds = OnceLock::new();

        self.shapes.push(shape);
        ShapeId(self.shapes.len() - 1)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.0)
    }

    /// Mutable access to a shape. Cached bounds of the shape and all of its
    /// ancestors are discarded, since the caller may move it.
    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        if id.0 >= self.shapes.len() {
            return None;
        }

        self.invalidate_bounds(id);
        self.shapes.get_mut(id.0)
    }

    pub fn set_transform(&mut self, id: ShapeId, m: Matrix4D) -> Result<()> {
        self.get_mut(id)
            .ok_or(RenderError::UnknownShape(id))?
            .set_transform(m)
    }

    /// Marks a detached shape as a top-level object of the scene.
    pub fn add_root(&mut self, id: ShapeId) -> Result<()> {
        self.check(id)?;

        if self[id].parent.is_some() || self.roots.contains(&id) {
            return Err(RenderError::AlreadyParented(id));
        }

        self.roots.push(id);
        Ok(())
    }

    /// Inserts a shape and marks it as a top-level object in one step.
    pub fn insert_root(&mut self, shape: Shape) -> ShapeId {
        let id = self.insert(shape);
        self.roots.push(id);
        id
    }

    pub fn roots(&self) -> &[ShapeId] {
        &self.roots
    }

    /// Moves `child` into `group`.
    ///
    /// Fails if `group` is not a group, if the child already has an owner
    /// (another container, or the scene roots), or if `child` is `group`
    /// itself or one of its ancestors.
    pub fn add_child(&mut self, group: ShapeId, child: ShapeId) -> Result<()> {
        self.check(group)?;
        self.check(child)?;

        if !matches!(self[group].ty, ShapeType::Group(_)) {
            return Err(RenderError::NotAGroup(group));
        }

        if self.includes(child, group) {
            return Err(RenderError::Cycle(child));
        }

        if self[child].parent.is_some() || self.roots.contains(&child) {
            return Err(RenderError::AlreadyParented(child));
        }

        self.invalidate_bounds(group);
        self.shapes[child.0].parent = Some(group);
        if let ShapeType::Group(ref mut children) = self.shapes[group.0].ty {
            children.push(child);
        }

        Ok(())
    }

    /// Combines two detached shapes into a new CSG node, which is returned
    /// detached as well.
    pub fn csg(&mut self, op: CsgOp, left: ShapeId, right: ShapeId)
        -> Result<ShapeId> {
        self.check(left)?;
        self.check(right)?;

        for id in [left, right] {
            if self[id].parent.is_some() || self.roots.contains(&id) {
                return Err(RenderError::AlreadyParented(id));
            }
        }

        if left == right {
            return Err(RenderError::AlreadyParented(right));
        }

        self.shapes.push(Shape::new(ShapeType::Csg(op, left, right)));
        let node = ShapeId(self.shapes.len() - 1);
        self.shapes[left.0].parent = Some(node);
        self.shapes[right.0].parent = Some(node);

        Ok(node)
    }

    /// The direct children of a container, in order. Empty for primitives.
    pub fn children(&self, id: ShapeId) -> Vec<ShapeId> {
        match self[id].ty {
            ShapeType::Group(ref children) => children.clone(),
            ShapeType::Csg(_, left, right) => vec![left, right],
            _ => Vec::new(),
        }
    }

    pub fn parent(&self, id: ShapeId) -> Option<ShapeId> {
        self[id].parent
    }

    /// The material a shape is rendered with: its own, or the nearest
    /// ancestor's, or the default material.
    pub fn material(&self, id: ShapeId) -> &Material {
        let mut current = Some(id);

        while let Some(c) = current {
            if let Some(ref m) = self[c].material {
                return m;
            }
            current = self[c].parent;
        }

        &DEFAULT_MATERIAL
    }

    /// A shape casts shadows unless it, or any container above it, opts out.
    pub fn casts_shadow(&self, id: ShapeId) -> bool {
        let mut current = Some(id);

        while let Some(c) = current {
            if !self[c].casts_shadow {
                return false;
            }
            current = self[c].parent;
        }

        true
    }

    /// Whether `target` is `node` or lies anywhere beneath it.
    pub fn includes(&self, node: ShapeId, target: ShapeId) -> bool {
        let mut current = Some(target);

        while let Some(c) = current {
            if c == node {
                return true;
            }
            current = self[c].parent;
        }

        false
    }

    /// Converts a point from world to object space, applying every
    /// ancestor's inverse transform from the root down.
    pub fn world_to_object(&self, id: ShapeId, point: Tuple4D) -> Tuple4D {
        let point = match self[id].parent {
            Some(parent) => self.world_to_object(parent, point),
            None => point,
        };

        self[id].transform.to_local(point)
    }

    /// Converts a normal from object to world space, re-normalizing at every
    /// level of the hierarchy.
    pub fn normal_to_world(&self, id: ShapeId, normal: Tuple4D) -> Tuple4D {
        let normal = self[id].transform.normal_to_parent(normal);

        match self[id].parent {
            Some(parent) => self.normal_to_world(parent, normal),
            None => normal,
        }
    }

    /// The world-space surface normal at `world_point` on the primitive
    /// struck by `hit`.
    pub fn normal_at(&self, hit: &Intersection, world_point: Tuple4D) -> Tuple4D {
        let id = hit.what;
        let at = self.world_to_object(id, world_point);

        let local_normal = match self[id].ty {
            ShapeType::Sphere => geometry::normal_at_sphere(&at),
            ShapeType::Plane => geometry::normal_at_plane(&at),
            ShapeType::Cube => geometry::normal_at_cube(&at),
            ShapeType::Cylinder { minimum, maximum, .. }
                => geometry::normal_at_cylinder(&at, minimum, maximum),
            ShapeType::Cone { minimum, maximum, .. }
                => geometry::normal_at_cone(&at, minimum, maximum),
            ShapeType::Triangle(ref info) => info.normal,
            ShapeType::SmoothTriangle(ref info)
                => geometry::normal_at_smooth_triangle(info, Some(hit)),

            // Containers forward their children's intersections, so a hit
            // never names one.
            ShapeType::Group(_) | ShapeType::Csg(..) => at.as_vector(),
        };

        self.normal_to_world(id, local_normal)
    }

    /// Intersects a ray, given in the frame of the shape's parent, with a
    /// shape and everything beneath it.
    pub fn intersect(&self, id: ShapeId, ray: &Ray4D) -> Intersections {
        let shape = &self[id];
        let local = shape.transform.ray_to_local(ray);

        match shape.ty {
            ShapeType::Sphere => geometry::intersect_sphere(id, &local),
            ShapeType::Plane => geometry::intersect_plane(id, &local),
            ShapeType::Cube => geometry::intersect_cube(id, &local),
            ShapeType::Cylinder { minimum, maximum, closed }
                => geometry::intersect_cylinder(id, &local, minimum, maximum, closed),
            ShapeType::Cone { minimum, maximum, closed }
                => geometry::intersect_cone(id, &local, minimum, maximum, closed),
            ShapeType::Triangle(ref info)
                => geometry::intersect_triangle(id, &local, info),
            ShapeType::SmoothTriangle(ref info)
                => geometry::intersect_smooth_triangle(id, &local, info),

            ShapeType::Group(ref children) => {
                if !self.local_bounds(id).intersects(&local) {
                    return Intersections::new();
                }

                Intersections::aggregate(
                    children.iter().map(|&c| self.intersect(c, &local))
                )
            },

            ShapeType::Csg(op, left, right) => {
                if !self.local_bounds(id).intersects(&local) {
                    return Intersections::new();
                }

                let xs = Intersections::aggregate([
                    self.intersect(left, &local),
                    self.intersect(right, &local),
                ]);
                filter_intersections(self, op, left, xs)
            },
        }
    }

    /// The bounds of a shape in its parent's frame.
    pub fn bounds(&self, id: ShapeId) -> Bounds {
        self.local_bounds(id).transform(self[id].transform.matrix())
    }

    /// The bounds of a shape in its own object space, cached after the first
    /// call.
    fn local_bounds(&self, id: ShapeId) -> Bounds {
        let shape = &self[id];

        *shape.saved_bounds.get_or_init(|| match shape.ty {
            ShapeType::Sphere | ShapeType::Cube => geometry::unit_cube_bounds(),
            ShapeType::Plane => {
                let inf = f64::INFINITY;
                Bounds::new(-inf, 0.0, -inf, inf, 0.0, inf)
            },
            ShapeType::Cylinder { minimum, maximum, .. }
                => geometry::cylinder_bounds(minimum, maximum),
            ShapeType::Cone { minimum, maximum, .. }
                => geometry::cone_bounds(minimum, maximum),
            ShapeType::Triangle(ref info) => info.bounds(),
            ShapeType::SmoothTriangle(ref info) => info.triangle_info.bounds(),
            ShapeType::Group(ref children) => children.iter()
                .fold(Bounds::empty(), |b, &c| b.merge(&self.bounds(c))),
            ShapeType::Csg(_, left, right)
                => self.bounds(left).merge(&self.bounds(right)),
        })
    }

    fn invalidate_bounds(&mut self, id: ShapeId) {
        let mut current = Some(id);

        while let Some(c) = current {
            self.shapes[c.0].saved_bounds = OnceLock::new();
            current = self.shapes[c.0].parent;
        }
    }

    fn check(&self, id: ShapeId) -> Result<()> {
        if id.0 < self.shapes.len() {
            Ok(())
        } else {
            Err(RenderError::UnknownShape(id))
        }
    }
}

#[cfg(test)]
use std::f64::consts::PI;

#[test]
fn adding_a_child_to_a_group() {
    let mut graph = SceneGraph::new();
    let g = graph.insert(Shape::group());
    let s = graph.insert(Shape::sphere());
    graph.add_child(g, s).unwrap();

    assert_eq!(graph.children(g), vec![s]);
    assert_eq!(graph.parent(s), Some(g));
    assert!(graph.includes(g, s));
    assert!(!graph.includes(s, g));
}

#[test]
fn intersecting_ray_with_empty_group() {
    let mut graph = SceneGraph::new();
    let g = graph.insert(Shape::group());
    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(graph.intersect(g, &r).is_empty());
}

#[test]
fn intersecting_ray_with_nonempty_group() {
    let mut graph = SceneGraph::new();
    let g = graph.insert(Shape::group());
    let s1 = graph.insert(Shape::sphere());
    let s2 = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, -3.0)).unwrap());
    let s3 = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap());
    for s in [s1, s2, s3] {
        graph.add_child(g, s).unwrap();
    }

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = graph.intersect(g, &r);
    let owners: Vec<ShapeId> = xs.iter().map(|i| i.what).collect();

    assert_eq!(owners, vec![s2, s2, s1, s1]);
}

#[test]
fn intersecting_a_transformed_group() {
    let mut graph = SceneGraph::new();
    let g = graph.insert(Shape::group()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap());
    let s = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap());
    graph.add_child(g, s).unwrap();

    let r = Ray4D::new(Tuple4D::point(10.0, 0.0, -10.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert_eq!(graph.intersect(g, &r).len(), 2);
}

#[cfg(test)]
fn nested_sphere(g2_scale: Matrix4D) -> (SceneGraph, ShapeId) {
    let mut graph = SceneGraph::new();
    let g1 = graph.insert(Shape::group()
        .with_transform(Matrix4D::rotation_y(PI / 2.0)).unwrap());
    let g2 = graph.insert(Shape::group().with_transform(g2_scale).unwrap());
    let s = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap());

    graph.add_child(g2, s).unwrap();
    graph.add_child(g1, g2).unwrap();
    (graph, s)
}

#[test]
fn converting_a_point_from_world_to_object_space() {
    let (graph, s) = nested_sphere(Matrix4D::scaling(2.0, 2.0, 2.0));
    let p = graph.world_to_object(s, Tuple4D::point(-2.0, 0.0, -10.0));

    assert_eq!(p, Tuple4D::point(0.0, 0.0, -1.0));
}

#[test]
fn converting_a_normal_from_object_to_world_space() {
    let (graph, s) = nested_sphere(Matrix4D::scaling(1.0, 2.0, 3.0));
    let third = 3f64.sqrt() / 3.0;
    let n = graph.normal_to_world(s, Tuple4D::vector(third, third, third));

    assert_eq!(n, Tuple4D::vector(2.0 / 7.0, 3.0 / 7.0, -6.0 / 7.0));
}

#[test]
fn finding_the_normal_on_a_child_object() {
    let (graph, s) = nested_sphere(Matrix4D::scaling(1.0, 2.0, 3.0));
    let hit = Intersection::new(0.0, s);
    let n = graph.normal_at(&hit, Tuple4D::point(1.7321, 1.1547, -5.5774));

    assert_eq!(n, Tuple4D::vector(0.28570, 0.42854, -0.85716));
}

#[test]
fn normal_on_translated_sphere() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0)).unwrap());
    let n = graph.normal_at(&Intersection::new(0.0, s),
        Tuple4D::point(0.0, 1.70711, -0.70711));

    assert_eq!(n, Tuple4D::vector(0.0, 0.70711, -0.70711));
}

#[test]
fn normal_on_transformed_sphere() {
    let mut graph = SceneGraph::new();
    let m = Matrix4D::scaling(1.0, 0.5, 1.0) * Matrix4D::rotation_z(PI / 5.0);
    let s = graph.insert(Shape::sphere().with_transform(m).unwrap());
    let half = 2f64.sqrt() / 2.0;
    let n = graph.normal_at(&Intersection::new(0.0, s),
        Tuple4D::point(0.0, half, -half));

    assert_eq!(n, Tuple4D::vector(0.0, 0.97014, -0.24254));
    assert!(n.is_vector());
}

#[test]
fn triangle_normal_is_constant() {
    let mut graph = SceneGraph::new();
    let t = graph.insert(Shape::triangle(
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point(1.0, 0.0, 0.0),
    ));
    let hit = Intersection::new(0.0, t);

    for p in [Tuple4D::point(0.0, 0.5, 0.0), Tuple4D::point(-0.5, 0.75, 0.0)] {
        assert_eq!(graph.normal_at(&hit, p), Tuple4D::vector(0.0, 0.0, -1.0));
    }
}

#[test]
fn children_inherit_material_and_shadow_flag() {
    let mut graph = SceneGraph::new();
    let red = Material::default().with_color(crate::color::Color::red());
    let g = graph.insert(Shape::group().with_material(red.clone()).with_shadow(false));
    let s = graph.insert(Shape::sphere());
    let own = graph.insert(Shape::cube().with_material(Material::glass()));
    let loose = graph.insert(Shape::sphere());
    graph.add_child(g, s).unwrap();
    graph.add_child(g, own).unwrap();

    assert_eq!(*graph.material(s), red);
    assert_eq!(*graph.material(own), Material::glass());
    assert_eq!(*graph.material(loose), Material::default());
    assert!(!graph.casts_shadow(s));
    assert!(graph.casts_shadow(loose));
}

#[test]
fn add_child_rejects_bad_ownership() {
    let mut graph = SceneGraph::new();
    let g1 = graph.insert(Shape::group());
    let g2 = graph.insert(Shape::group());
    let s = graph.insert(Shape::sphere());
    let root = graph.insert(Shape::cube());
    graph.add_root(root).unwrap();

    assert!(matches!(graph.add_child(s, g1), Err(RenderError::NotAGroup(_))));

    graph.add_child(g1, g2).unwrap();
    graph.add_child(g2, s).unwrap();
    assert!(matches!(graph.add_child(g2, g1), Err(RenderError::Cycle(_))));
    assert!(matches!(graph.add_child(g1, g1), Err(RenderError::Cycle(_))));
    assert!(matches!(graph.add_child(g1, s), Err(RenderError::AlreadyParented(_))));
    assert!(matches!(graph.add_child(g1, root), Err(RenderError::AlreadyParented(_))));
    assert!(matches!(graph.add_root(s), Err(RenderError::AlreadyParented(_))));

    let bogus = ShapeId::detached();
    assert!(matches!(graph.add_child(g1, bogus), Err(RenderError::UnknownShape(_))));
}

#[test]
fn csg_takes_ownership_of_operands() {
    let mut graph = SceneGraph::new();
    let s1 = graph.insert(Shape::sphere());
    let s2 = graph.insert(Shape::cube());
    let c = graph.csg(CsgOp::Union, s1, s2).unwrap();

    assert_eq!(graph.children(c), vec![s1, s2]);
    assert_eq!(graph.parent(s1), Some(c));
    assert_eq!(graph.parent(s2), Some(c));
    assert!(matches!(graph.csg(CsgOp::Union, s1, c), Err(RenderError::AlreadyParented(_))));
}

#[test]
fn degenerate_transform_is_rejected_and_previous_kept() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(1.0, 0.0, 0.0)).unwrap());

    assert!(matches!(graph.set_transform(s, Matrix4D::scaling(0.0, 1.0, 1.0)),
        Err(RenderError::NonInvertible { .. })));
    assert_eq!(*graph[s].transform().matrix(), Matrix4D::translation(1.0, 0.0, 0.0));
}

#[test]
fn group_bounds_track_children() {
    let mut graph = SceneGraph::new();
    let g = graph.insert(Shape::group());
    let s = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::translation(2.0, 5.0, -3.0)).unwrap());
    let c = graph.insert(Shape::bounded_cylinder(-2.0, 2.0)
        .with_transform(Matrix4D::translation(-4.0, -1.0, 4.0)).unwrap());
    graph.add_child(g, s).unwrap();
    graph.add_child(g, c).unwrap();

    assert_eq!(graph.bounds(g), Bounds::new(-5.0, -3.0, -4.0, 3.0, 6.0, 5.0));

    // Moving a child must refresh the cached box of its group.
    graph.set_transform(s, Matrix4D::translation(10.0, 0.0, 0.0)).unwrap();
    assert_eq!(graph.bounds(g), Bounds::new(-5.0, -3.0, -1.0, 11.0, 1.0, 5.0));
}

#[test]
fn group_prunes_rays_missing_its_bounds() {
    let mut graph = SceneGraph::new();
    let g = graph.insert(Shape::group());
    let s = graph.insert(Shape::sphere());
    graph.add_child(g, s).unwrap();

    let miss = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 1.0, 0.0));
    let hit = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(!graph.bounds(g).intersects(&miss));
    assert!(graph.intersect(g, &miss).is_empty());
    assert_eq!(graph.intersect(g, &hit).len(), 2);
}

#[test]
fn plane_bounds_are_infinite() {
    let mut graph = SceneGraph::new();
    let p = graph.insert(Shape::plane());
    let along = Ray4D::new(Tuple4D::point(0.0, 3.0, 0.0), Tuple4D::vector(1.0, 0.0, 0.0));

    assert!(!graph.bounds(p).is_finite());
    assert!(graph.bounds(p).intersects(&along));
}

#[test]
fn inserting_a_copied_container_leaves_it_empty() {
    let mut graph = SceneGraph::new();
    let g = graph.insert(Shape::group());
    let s = graph.insert(Shape::sphere());
    graph.add_child(g, s).unwrap();

    let copied = graph[g].clone();
    let copy = graph.insert(copied);
    assert!(graph.children(copy).is_empty());
}

#[test]
fn scaled_group_keeps_shallow_hits() {
    let mut graph = SceneGraph::new();
    let direct = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::scaling(1000.0, 1000.0, 1000.0)).unwrap());
    let g = graph.insert(Shape::group()
        .with_transform(Matrix4D::scaling(1000.0, 1000.0, 1000.0)).unwrap());
    let s = graph.insert(Shape::sphere());
    graph.add_child(g, s).unwrap();

    let r = Ray4D::new(Tuple4D::point(0.0, -1000.5, -5000.0),
        Tuple4D::vector(0.0, 0.008, 1.0).normalize());

    let xs_direct = graph.intersect(direct, &r);
    let xs_group = graph.intersect(g, &r);
    assert_eq!(xs_direct.len(), 2);
    assert_eq!(xs_group.len(), 2);
    assert!((xs_direct[0].t - 4729.45771).abs() < 1e-3);
    assert!((xs_direct[1].t - 5286.22980).abs() < 1e-3);
    assert!((xs_group[0].t - xs_direct[0].t).abs() < 1e-6);
    assert!((xs_group[1].t - xs_direct[1].t).abs() < 1e-6);
}

#[test]
fn grazing_ray_reaches_grouped_sphere() {
    let mut graph = SceneGraph::new();
    let g = graph.insert(Shape::group());
    let s = graph.insert(Shape::sphere());
    graph.add_child(g, s).unwrap();

    let r = Ray4D::new(Tuple4D::point(0.0, -1.00001, -5.0),
        Tuple4D::vector(0.0, 0.000005, 1.0));

    assert_eq!(graph.intersect(s, &r).len(), 2);
    assert_eq!(graph.intersect(g, &r).len(), 2);
}
