//! Two-dimensional texture coordinates.
//!
//! A `UvMapping` flattens a point on a shape's surface to `(u, v)` in
//! `[0, 1)²`, and a `UvPattern` turns `(u, v)` into a color.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::tuple::Tuple4D;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UvMapping {
    /// Tiles the XZ plane with unit squares.
    Planar,

    /// Wraps a unit sphere, longitude to `u` and latitude to `v`.
    Spherical,

    /// Wraps a unit cylinder around Y; `v` repeats every unit of height.
    Cylindrical,

    /// Maps each face of the unit cube onto the same square.
    Cube,
}

impl UvMapping {
    pub fn map(&self, p: Tuple4D) -> (f64, f64) {
        match self {
            UvMapping::Planar => planar_map(p),
            UvMapping::Spherical => spherical_map(p),
            UvMapping::Cylindrical => cylindrical_map(p),
            UvMapping::Cube => CubeFace::of(p).uv(p),
        }
    }
}

pub fn planar_map(p: Tuple4D) -> (f64, f64) {
    (p.x.rem_euclid(1.0), p.z.rem_euclid(1.0))
}

pub fn spherical_map(p: Tuple4D) -> (f64, f64) {
    let theta = p.x.atan2(p.z);
    let radius = p.as_vector().magnitude();
    let phi = (p.y / radius).acos();

    // atan2 runs from -pi to pi; flip so `u` increases counterclockwise
    // when viewed from above.
    let raw_u = theta / (2.0 * PI);
    let u = 1.0 - (raw_u + 0.5);
    let v = 1.0 - phi / PI;

    (u, v)
}

pub fn cylindrical_map(p: Tuple4D) -> (f64, f64) {
    let theta = p.x.atan2(p.z);
    let raw_u = theta / (2.0 * PI);
    let u = 1.0 - (raw_u + 0.5);

    (u, p.y.rem_euclid(1.0))
}

/// A face of the axis-aligned unit cube, in the order cube maps store them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CubeFace {
    Left = 0,
    Front = 1,
    Right = 2,
    Back = 3,
    Up = 4,
    Down = 5,
}

impl CubeFace {
    /// The face a point lies on, chosen by its largest coordinate.
    pub fn of(p: Tuple4D) -> CubeFace {
        let coord = p.x.abs().max(p.y.abs()).max(p.z.abs());

        if coord == p.x {
            CubeFace::Right
        } else if coord == -p.x {
            CubeFace::Left
        } else if coord == p.y {
            CubeFace::Up
        } else if coord == -p.y {
            CubeFace::Down
        } else if coord == p.z {
            CubeFace::Front
        } else {
            CubeFace::Back
        }
    }

    /// Texture coordinates of `p` within this face, seen from outside the
    /// cube.
    pub fn uv(&self, p: Tuple4D) -> (f64, f64) {
        let wrap = |a: f64| a.rem_euclid(2.0) / 2.0;

        match self {
            CubeFace::Front => (wrap(p.x + 1.0), wrap(p.y + 1.0)),
            CubeFace::Back => (wrap(1.0 - p.x), wrap(p.y + 1.0)),
            CubeFace::Left => (wrap(p.z + 1.0), wrap(p.y + 1.0)),
            CubeFace::Right => (wrap(1.0 - p.z), wrap(p.y + 1.0)),
            CubeFace::Up => (wrap(p.x + 1.0), wrap(1.0 - p.z)),
            CubeFace::Down => (wrap(p.x + 1.0), wrap(p.z + 1.0)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UvPattern {
    /// A `width` by `height` checkerboard; `a` covers the square at the
    /// origin.
    Checkers { width: f64, height: f64, a: Color, b: Color },

    /// A decoded image, with `v = 0` at the bottom row.
    Image(Arc<Canvas>),

    /// Marks the four corners of the square with distinct colors, for
    /// checking the orientation of a mapping.
    AlignCheck { main: Color, ul: Color, ur: Color, bl: Color, br: Color },
}

impl UvPattern {
    pub fn checkers(width: f64, height: f64, a: Color, b: Color) -> UvPattern {
        UvPattern::Checkers { width, height, a, b }
    }

    pub fn color_at(&self, u: f64, v: f64) -> Color {
        match self {
            UvPattern::Checkers { width, height, a, b } => {
                let u2 = (u * width).floor() as i64;
                let v2 = (v * height).floor() as i64;

                if (u2 + v2).rem_euclid(2) == 0 { *a } else { *b }
            },

            UvPattern::Image(canvas) => {
                if canvas.width == 0 || canvas.height == 0 {
                    return Color::black();
                }

                let v = 1.0 - v;
                let x = u * (canvas.width - 1) as f64;
                let y = v * (canvas.height - 1) as f64;

                canvas.pixel_at(x.round().max(0.0) as usize, y.round().max(0.0) as usize)
            },

            UvPattern::AlignCheck { main, ul, ur, bl, br } => {
                if v > 0.8 {
                    if u < 0.2 { return *ul; }
                    if u > 0.8 { return *ur; }
                } else if v < 0.2 {
                    if u < 0.2 { return *bl; }
                    if u > 0.8 { return *br; }
                }

                *main
            },
        }
    }
}

#[test]
fn checkers_in_uv_space() {
    let checkers = UvPattern::checkers(2.0, 2.0, Color::black(), Color::white());

    assert_eq!(checkers.color_at(0.0, 0.0), Color::black());
    assert_eq!(checkers.color_at(0.5, 0.0), Color::white());
    assert_eq!(checkers.color_at(0.0, 0.5), Color::white());
    assert_eq!(checkers.color_at(0.5, 0.5), Color::black());
    assert_eq!(checkers.color_at(1.0, 1.0), Color::black());
}

#[test]
fn spherical_mapping_on_3d_point() {
    let half = 2f64.sqrt() / 2.0;
    let cases = [
        (Tuple4D::point(0.0, 0.0, -1.0), (0.0, 0.5)),
        (Tuple4D::point(1.0, 0.0, 0.0), (0.25, 0.5)),
        (Tuple4D::point(0.0, 0.0, 1.0), (0.5, 0.5)),
        (Tuple4D::point(-1.0, 0.0, 0.0), (0.75, 0.5)),
        (Tuple4D::point(0.0, 1.0, 0.0), (0.5, 1.0)),
        (Tuple4D::point(0.0, -1.0, 0.0), (0.5, 0.0)),
        (Tuple4D::point(half, half, 0.0), (0.25, 0.75)),
    ];

    for (p, (u, v)) in cases {
        let (mu, mv) = spherical_map(p);
        assert!(crate::consts::feq(mu, u) && crate::consts::feq(mv, v), "{:?}", p);
    }
}

#[test]
fn planar_mapping_on_3d_point() {
    let cases = [
        (Tuple4D::point(0.25, 0.0, 0.5), (0.25, 0.5)),
        (Tuple4D::point(0.25, 0.0, -0.25), (0.25, 0.75)),
        (Tuple4D::point(0.25, 0.5, -0.25), (0.25, 0.75)),
        (Tuple4D::point(1.25, 0.0, 0.5), (0.25, 0.5)),
        (Tuple4D::point(0.25, 0.0, -1.75), (0.25, 0.25)),
        (Tuple4D::point(1.0, 0.0, -1.0), (0.0, 0.0)),
        (Tuple4D::point(0.0, 0.0, 0.0), (0.0, 0.0)),
    ];

    for (p, uv) in cases {
        assert_eq!(planar_map(p), uv);
    }
}

#[test]
fn cylindrical_mapping_on_3d_point() {
    let h = 2f64.sqrt() / 2.0;
    let cases = [
        (Tuple4D::point(0.0, 0.0, -1.0), (0.0, 0.0)),
        (Tuple4D::point(0.0, 0.5, -1.0), (0.0, 0.5)),
        (Tuple4D::point(0.0, 1.0, -1.0), (0.0, 0.0)),
        (Tuple4D::point(h, 0.5, -h), (0.125, 0.5)),
        (Tuple4D::point(1.0, 0.5, 0.0), (0.25, 0.5)),
        (Tuple4D::point(h, 0.1, h), (0.375, 0.1)),
        (Tuple4D::point(0.0, 0.2, 1.0), (0.5, 0.2)),
        (Tuple4D::point(-h, 0.5, h), (0.625, 0.5)),
        (Tuple4D::point(-1.0, 1.25, 0.0), (0.75, 0.25)),
        (Tuple4D::point(-h, 0.5, -h), (0.875, 0.5)),
    ];

    for (p, (u, v)) in cases {
        let (mu, mv) = cylindrical_map(p);
        assert!(crate::consts::feq(mu, u) && crate::consts::feq(mv, v), "{:?}", p);
    }
}

#[test]
fn align_check_marks_corners() {
    let pattern = UvPattern::AlignCheck {
        main: Color::white(),
        ul: Color::red(),
        ur: Color::rgb(1.0, 1.0, 0.0),
        bl: Color::green(),
        br: Color::rgb(0.0, 1.0, 1.0),
    };

    assert_eq!(pattern.color_at(0.5, 0.5), Color::white());
    assert_eq!(pattern.color_at(0.1, 0.9), Color::red());
    assert_eq!(pattern.color_at(0.9, 0.9), Color::rgb(1.0, 1.0, 0.0));
    assert_eq!(pattern.color_at(0.1, 0.1), Color::green());
    assert_eq!(pattern.color_at(0.9, 0.1), Color::rgb(0.0, 1.0, 1.0));
}

#[test]
fn cube_face_from_point() {
    let cases = [
        (Tuple4D::point(-1.0, 0.5, -0.25), CubeFace::Left),
        (Tuple4D::point(1.1, -0.75, 0.8), CubeFace::Right),
        (Tuple4D::point(0.1, 0.6, 0.9), CubeFace::Front),
        (Tuple4D::point(-0.7, 0.0, -2.0), CubeFace::Back),
        (Tuple4D::point(0.5, 1.0, 0.9), CubeFace::Up),
        (Tuple4D::point(-0.2, -1.3, 1.1), CubeFace::Down),
    ];

    for (p, face) in cases {
        assert_eq!(CubeFace::of(p), face);
    }
}

#[test]
fn uv_mapping_on_each_cube_face() {
    let cases = [
        (CubeFace::Front, Tuple4D::point(-0.5, 0.5, 1.0), Tuple4D::point(0.5, -0.5, 1.0)),
        (CubeFace::Back, Tuple4D::point(0.5, 0.5, -1.0), Tuple4D::point(-0.5, -0.5, -1.0)),
        (CubeFace::Left, Tuple4D::point(-1.0, 0.5, -0.5), Tuple4D::point(-1.0, -0.5, 0.5)),
        (CubeFace::Right, Tuple4D::point(1.0, 0.5, 0.5), Tuple4D::point(1.0, -0.5, -0.5)),
        (CubeFace::Up, Tuple4D::point(-0.5, 1.0, -0.5), Tuple4D::point(0.5, 1.0, 0.5)),
        (CubeFace::Down, Tuple4D::point(-0.5, -1.0, 0.5), Tuple4D::point(0.5, -1.0, -0.5)),
    ];

    for (face, upper_left, lower_right) in cases {
        assert_eq!(face.uv(upper_left), (0.25, 0.75), "{:?}", face);
        assert_eq!(face.uv(lower_right), (0.75, 0.25), "{:?}", face);
    }
}

#[test]
fn image_pattern_reads_canvas() {
    let mut canvas = Canvas::new(10, 10);
    for y in 0..10 {
        for x in 0..10 {
            let g = (x + y) as f64 / 10.0;
            canvas.write_pixel(x, y, &Color::rgb(g, g, g));
        }
    }
    let pattern = UvPattern::Image(Arc::new(canvas));

    let cases = [
        ((0.0, 0.0), 0.9),
        ((0.3, 0.0), 1.2),
        ((0.6, 0.3), 1.1),
        ((1.0, 1.0), 0.9),
    ];

    for ((u, v), g) in cases {
        assert_eq!(pattern.color_at(u, v), Color::rgb(g, g, g));
    }
}
