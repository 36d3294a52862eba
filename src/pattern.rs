use crate::error::Result;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::shape::{ SceneGraph, ShapeId };
use crate::uv::{ UvMapping, UvPattern, CubeFace };

#[derive(Clone, Debug, PartialEq)]
pub enum PatternKind {
    /// A single color everywhere.
    Solid(Color),

    /// Alternating stripes across the X axis.
    ///
    /// Effectively, for a point `(x, y, z)`, if `floor(x) % 2 == 0`, the
    /// first color is applied to that point; otherwise, the second is used.
    Stripe(Color, Color),

    /// Blends linearly from the first color to the second across each unit
    /// of X, then starts over.
    Gradient(Color, Color),

    /// Concentric rings around the Y axis, alternating every unit of radius.
    Ring(Color, Color),

    /// Alternating unit cubes.
    Checkers(Color, Color),

    /// A gradient keyed off the distance from the Y axis instead of X.
    RadialGradient(Color, Color),

    /// The sum of two patterns evaluated at the same point. Each keeps its
    /// own transform, applied on top of this one.
    Blended(Box<Pattern>, Box<Pattern>),

    /// Flattens the point with a mapping and looks it up in a 2D pattern.
    TextureMap(UvMapping, UvPattern),

    /// One 2D pattern per cube face, in `CubeFace` order: left, front,
    /// right, back, up, down.
    CubeMap(Box<[UvPattern; 6]>),
}

/// A color function over 3D space, with its own transform.
///
/// Colors are evaluated in pattern space: the world point is taken to the
/// shape's object space first, and from there through the pattern's inverse
/// transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    transform: Transform,
}

impl From<PatternKind> for Pattern {
    fn from(kind: PatternKind) -> Pattern {
        Pattern { kind, transform: Transform::identity() }
    }
}

impl Pattern {
    pub fn solid(c: Color) -> Pattern {
        PatternKind::Solid(c).into()
    }

    pub fn stripe(a: Color, b: Color) -> Pattern {
        PatternKind::Stripe(a, b).into()
    }

    pub fn gradient(a: Color, b: Color) -> Pattern {
        PatternKind::Gradient(a, b).into()
    }

    pub fn ring(a: Color, b: Color) -> Pattern {
        PatternKind::Ring(a, b).into()
    }

    pub fn checkers(a: Color, b: Color) -> Pattern {
        PatternKind::Checkers(a, b).into()
    }

    pub fn radial_gradient(a: Color, b: Color) -> Pattern {
        PatternKind::RadialGradient(a, b).into()
    }

    pub fn blended(a: Pattern, b: Pattern) -> Pattern {
        PatternKind::Blended(Box::new(a), Box::new(b)).into()
    }

    pub fn texture_map(mapping: UvMapping, uv: UvPattern) -> Pattern {
        PatternKind::TextureMap(mapping, uv).into()
    }

    /// A cube map from faces given as left, front, right, back, up, down.
    pub fn cube_map(faces: [UvPattern; 6]) -> Pattern {
        PatternKind::CubeMap(Box::new(faces)).into()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, m: Matrix4D) -> Result<()> {
        self.transform = Transform::new(m)?;
        Ok(())
    }

    pub fn with_transform(mut self, m: Matrix4D) -> Result<Pattern> {
        self.set_transform(m)?;
        Ok(self)
    }

    /// The color at a world-space point on shape `id`.
    pub fn color_at(&self, graph: &SceneGraph, id: ShapeId, world_point: Tuple4D)
        -> Color {
        self.color_at_object(graph.world_to_object(id, world_point))
    }

    /// The color at a point already in the shape's object space.
    pub fn color_at_object(&self, object_point: Tuple4D) -> Color {
        self.pattern_at(self.transform.to_local(object_point))
    }

    /// The color at a point in this pattern's own space.
    pub fn pattern_at(&self, p: Tuple4D) -> Color {
        match self.kind {
            PatternKind::Solid(c) => c,

            PatternKind::Stripe(a, b) => if is_even(p.x) { a } else { b },

            PatternKind::Gradient(a, b) => a + (b - a) * (p.x - p.x.floor()),

            PatternKind::Ring(a, b) => {
                let r = (p.x.powi(2) + p.z.powi(2)).sqrt();
                if is_even(r) { a } else { b }
            },

            PatternKind::Checkers(a, b) => {
                let sum = p.x.floor() + p.y.floor() + p.z.floor();
                if is_even(sum) { a } else { b }
            },

            PatternKind::RadialGradient(a, b) => {
                let r = (p.x.powi(2) + p.z.powi(2)).sqrt();
                a + (b - a) * (r - r.floor())
            },

            PatternKind::Blended(ref first, ref second) => {
                first.color_at_object(p) + second.color_at_object(p)
            },

            PatternKind::TextureMap(mapping, ref uv) => {
                let (u, v) = mapping.map(p);
                uv.color_at(u, v)
            },

            PatternKind::CubeMap(ref faces) => {
                let face = CubeFace::of(p);
                let (u, v) = face.uv(p);
                faces[face as usize].color_at(u, v)
            },
        }
    }
}

/// Whether `floor(v)` is even.
fn is_even(v: f64) -> bool {
    (v.floor() as i64).rem_euclid(2) == 0
}

#[cfg(test)]
use crate::shape::Shape;

#[test]
fn stripe_pattern_is_constant_along_y_and_z() {
    let pattern = Pattern::stripe(Color::white(), Color::black());

    for p in [Tuple4D::point(0.0, 1.0, 0.0), Tuple4D::point(0.0, 2.0, 0.0),
        Tuple4D::point(0.0, 0.0, 1.0), Tuple4D::point(0.0, 0.0, 2.0)] {
        assert_eq!(pattern.pattern_at(p), Color::white());
    }
}

#[test]
fn stripe_pattern_alternates_along_x() {
    let pattern = Pattern::stripe(Color::white(), Color::black());
    let cases = [
        (0.0, Color::white()),
        (0.9, Color::white()),
        (1.0, Color::black()),
        (-0.1, Color::black()),
        (-1.0, Color::black()),
        (-1.1, Color::white()),
    ];

    for (x, c) in cases {
        assert_eq!(pattern.pattern_at(Tuple4D::point(x, 0.0, 0.0)), c);
    }
}

#[test]
fn gradient_interpolates_between_colors() {
    let pattern = Pattern::gradient(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)), Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.25, 0.0, 0.0)),
        Color::rgb(0.75, 0.75, 0.75));
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.5, 0.0, 0.0)),
        Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.75, 0.0, 0.0)),
        Color::rgb(0.25, 0.25, 0.25));
}

#[test]
fn ring_extends_in_x_and_z() {
    let pattern = Pattern::ring(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)), Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.0, 0.0, 0.0)), Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 1.0)), Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.708, 0.0, 0.708)), Color::black());
}

#[test]
fn checkers_repeat_in_each_dimension() {
    let pattern = Pattern::checkers(Color::white(), Color::black());

    for axis in 0..3 {
        let at = |v: f64| match axis {
            0 => Tuple4D::point(v, 0.0, 0.0),
            1 => Tuple4D::point(0.0, v, 0.0),
            _ => Tuple4D::point(0.0, 0.0, v),
        };

        assert_eq!(pattern.pattern_at(at(0.0)), Color::white());
        assert_eq!(pattern.pattern_at(at(0.99)), Color::white());
        assert_eq!(pattern.pattern_at(at(1.01)), Color::black());
    }
}

#[test]
fn radial_gradient_follows_radius() {
    let pattern = Pattern::radial_gradient(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.5)),
        Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 5.0, 1.0)), Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.25, 0.0, 0.0)),
        Color::rgb(0.75, 0.75, 0.75));
}

#[test]
fn blended_patterns_sum() {
    let red = Pattern::solid(Color::red());
    let stripes = Pattern::stripe(Color::blue(), Color::black())
        .with_transform(Matrix4D::scaling(0.5, 1.0, 1.0)).unwrap();
    let pattern = Pattern::blended(red, stripes);

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.25, 0.0, 0.0)),
        Color::rgb(1.0, 0.0, 1.0));
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.75, 0.0, 0.0)), Color::red());
}

#[test]
fn pattern_with_object_transformation() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap());
    let pattern = Pattern::stripe(Color::white(), Color::black());

    assert_eq!(pattern.color_at(&graph, s, Tuple4D::point(1.5, 0.0, 0.0)), Color::white());
}

#[test]
fn pattern_with_pattern_transformation() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere());
    let pattern = Pattern::stripe(Color::white(), Color::black())
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();

    assert_eq!(pattern.color_at(&graph, s, Tuple4D::point(1.5, 0.0, 0.0)), Color::white());
}

#[test]
fn pattern_with_both_transformations() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap());
    let pattern = Pattern::stripe(Color::white(), Color::black())
        .with_transform(Matrix4D::translation(0.5, 0.0, 0.0)).unwrap();

    assert_eq!(pattern.color_at(&graph, s, Tuple4D::point(2.5, 0.0, 0.0)), Color::white());
}

#[test]
fn identity_transforms_match_local_function() {
    let mut graph = SceneGraph::new();
    let s = graph.insert(Shape::cube());
    let patterns = [
        Pattern::gradient(Color::red(), Color::blue()),
        Pattern::ring(Color::white(), Color::green()),
        Pattern::checkers(Color::black(), Color::white()),
    ];
    let points = [
        Tuple4D::point(0.3, -1.2, 4.5),
        Tuple4D::point(-2.7, 0.4, 0.9),
        Tuple4D::point(1.1, 1.1, -0.1),
    ];

    for pattern in patterns.iter() {
        for p in points {
            assert_eq!(pattern.color_at(&graph, s, p), pattern.pattern_at(p));
        }
    }
}

#[test]
fn texture_map_with_spherical_mapping() {
    let checkers = UvPattern::checkers(16.0, 8.0, Color::black(), Color::white());
    let pattern = Pattern::texture_map(UvMapping::Spherical, checkers);
    let cases = [
        (Tuple4D::point(0.4315, 0.4670, 0.7719), Color::white()),
        (Tuple4D::point(-0.9654, 0.2552, -0.0534), Color::black()),
        (Tuple4D::point(0.1039, 0.7090, 0.6975), Color::white()),
        (Tuple4D::point(-0.4986, -0.7856, -0.3663), Color::black()),
        (Tuple4D::point(-0.0317, -0.9395, 0.3411), Color::black()),
        (Tuple4D::point(0.4809, -0.7721, 0.4154), Color::black()),
        (Tuple4D::point(0.0285, -0.9612, -0.2745), Color::black()),
        (Tuple4D::point(-0.5734, -0.2162, -0.7903), Color::white()),
        (Tuple4D::point(0.7688, -0.1470, 0.6223), Color::black()),
        (Tuple4D::point(-0.7652, 0.2175, 0.6060), Color::black()),
    ];

    for (p, c) in cases {
        assert_eq!(pattern.pattern_at(p), c, "{:?}", p);
    }
}

#[test]
fn cube_map_selects_face_pattern() {
    let c = |r: f64, g: f64, b: f64| Color::rgb(r, g, b);
    let red = c(1.0, 0.0, 0.0);
    let yellow = c(1.0, 1.0, 0.0);
    let brown = c(1.0, 0.5, 0.0);
    let green = c(0.0, 1.0, 0.0);
    let cyan = c(0.0, 1.0, 1.0);
    let blue = c(0.0, 0.0, 1.0);
    let purple = c(1.0, 0.0, 1.0);
    let white = c(1.0, 1.0, 1.0);
    let align = |main, ul, ur, bl, br| UvPattern::AlignCheck { main, ul, ur, bl, br };

    let pattern = Pattern::cube_map([
        align(yellow, cyan, red, blue, brown),
        align(cyan, red, yellow, brown, green),
        align(red, yellow, purple, green, white),
        align(green, purple, cyan, white, blue),
        align(brown, cyan, purple, red, yellow),
        align(purple, brown, green, blue, white),
    ]);

    let cases = [
        (Tuple4D::point(-1.0, 0.0, 0.0), yellow),
        (Tuple4D::point(-1.0, 0.9, -0.9), cyan),
        (Tuple4D::point(-1.0, 0.9, 0.9), red),
        (Tuple4D::point(-1.0, -0.9, -0.9), blue),
        (Tuple4D::point(-1.0, -0.9, 0.9), brown),
        (Tuple4D::point(0.0, 0.0, 1.0), cyan),
        (Tuple4D::point(-0.9, 0.9, 1.0), red),
        (Tuple4D::point(0.9, -0.9, 1.0), green),
        (Tuple4D::point(1.0, 0.0, 0.0), red),
        (Tuple4D::point(1.0, 0.9, 0.9), yellow),
        (Tuple4D::point(0.0, 0.0, -1.0), green),
        (Tuple4D::point(0.9, 0.9, -1.0), purple),
        (Tuple4D::point(0.0, 1.0, 0.0), brown),
        (Tuple4D::point(-0.9, 1.0, -0.9), cyan),
        (Tuple4D::point(0.9, 1.0, 0.9), yellow),
        (Tuple4D::point(0.0, -1.0, 0.0), purple),
        (Tuple4D::point(-0.9, -1.0, 0.9), brown),
        (Tuple4D::point(0.9, -1.0, -0.9), white),
    ];

    for (p, expected) in cases {
        assert_eq!(pattern.pattern_at(p), expected, "{:?}", p);
    }
}
