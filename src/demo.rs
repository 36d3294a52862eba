//! Built-in scenes for the command line renderer.

use std::f64::consts::PI;
use std::sync::Arc;

use tiled_ray_tracer::Result;
use tiled_ray_tracer::tuple::Tuple4D;
use tiled_ray_tracer::matrix::Matrix4D;
use tiled_ray_tracer::color::Color;
use tiled_ray_tracer::canvas::Canvas;
use tiled_ray_tracer::consts::{ AIR_RI, GLASS_RI };
use tiled_ray_tracer::csg::CsgOp;
use tiled_ray_tracer::material::Material;
use tiled_ray_tracer::pattern::Pattern;
use tiled_ray_tracer::uv::{ UvMapping, UvPattern };
use tiled_ray_tracer::shape::{ SceneGraph, Shape, ShapeId };
use tiled_ray_tracer::light::{ Light, PointLight, AreaLight };
use tiled_ray_tracer::world::World;
use tiled_ray_tracer::camera::Camera;

fn camera(width: usize, height: usize, fov: f64, from: Tuple4D, to: Tuple4D)
    -> Result<Camera> {
    Camera::new(width, height, fov,
        Matrix4D::view_transform(from, to, Tuple4D::vector(0.0, 1.0, 0.0)))
}

fn checkered_floor(reflective: f64) -> Material {
    Material {
        specular: 0.0,
        reflective,
        ..Default::default()
    }.with_pattern(Pattern::checkers(Color::rgb(0.9, 0.9, 0.9), Color::rgb(0.1, 0.1, 0.1)))
}

/// Three solids and a glassy sphere over a mirrored checkerboard.
pub fn spheres(width: usize, height: usize) -> Result<(World, Camera)> {
    let mut world = World::empty();
    world.add_light(Light::Point(PointLight::new(
        Color::rgb(1.0, 1.0, 1.0),
        Tuple4D::point(-10.0, 10.0, -10.0),
    )))?;

    world.add_object(Shape::plane().with_material(checkered_floor(0.5)));

    world.add_object(Shape::sphere()
        .with_transform(Matrix4D::translation(-0.5, 1.0, 2.0))?
        .with_material(Material {
            color: Color::rgb(1.0, 0.4666, 0.2666),
            diffuse: 0.7,
            specular: 0.3,
            transparency: 0.5,
            reflective: 0.5,
            refractive_index: 1.5,
            ..Default::default()
        }));

    world.add_object(Shape::capped_cone(0.0, 3.0)
        .with_transform(Matrix4D::translation(1.5, 2.5, -0.5)
            * Matrix4D::scaling(0.25, 0.25, 0.25)
            * Matrix4D::rotation_z(PI / 4.0)
            * Matrix4D::rotation_y(PI / 8.0))?
        .with_material(Material {
            color: Color::rgb(1.0, 0.6666, 0.2666),
            diffuse: 0.7,
            specular: 0.3,
            reflective: 0.3,
            ..Default::default()
        }));

    let gradient = Pattern::radial_gradient(Color::rgb(0.8666, 0.2, 0.2),
        Color::rgb(0.2, 0.2, 0.8666))
        .with_transform(Matrix4D::scaling(0.5, 0.5, 0.5))?;
    world.add_object(Shape::cube()
        .with_transform(Matrix4D::translation(-1.5, 1.0, -0.75)
            * Matrix4D::scaling(0.33, 0.33, 0.33)
            * Matrix4D::rotation_x(PI / 4.0)
            * Matrix4D::rotation_y(PI / 4.0)
            * Matrix4D::rotation_z(PI / 4.0))?
        .with_material(Material {
            diffuse: 0.7,
            specular: 0.3,
            transparency: 0.5,
            refractive_index: 1.1,
            ..Default::default()
        }.with_pattern(gradient)));

    let camera = camera(width, height, PI / 3.0,
        Tuple4D::point(0.0, 1.5, -5.0), Tuple4D::point(0.0, 1.0, 0.0))?;
    Ok((world, camera))
}

/// A die carved from a rounded cube, lit by a visible soft light.
pub fn csg(width: usize, height: usize) -> Result<(World, Camera)> {
    let mut world = World::empty();
    world.add_light(Light::Area(AreaLight::from_transform(
        &(Matrix4D::translation(-3.0, 6.0, -4.0) * Matrix4D::scaling(0.75, 1.0, 0.75)),
        4, 4, Color::white(),
    ).with_visibility(true)))?;

    let rings = Pattern::ring(Color::rgb(0.85, 0.8, 0.7), Color::rgb(0.6, 0.55, 0.5))
        .with_transform(Matrix4D::scaling(0.5, 0.5, 0.5))?;
    world.add_object(Shape::plane()
        .with_material(Material { specular: 0.0, ..Default::default() }
            .with_pattern(rings)));

    let g = &mut world.graph;
    let cube = g.insert(Shape::cube());
    let ball = g.insert(Shape::sphere()
        .with_transform(Matrix4D::scaling(1.4, 1.4, 1.4))?);
    let rounded = g.csg(CsgOp::Intersection, cube, ball)?;

    let drills = g.insert(Shape::group());
    for axis in [
        Matrix4D::rotation_z(PI / 2.0),
        Matrix4D::identity(),
        Matrix4D::rotation_x(PI / 2.0),
    ] {
        let drill = g.insert(Shape::capped_cylinder(-2.0, 2.0)
            .with_transform(axis * Matrix4D::scaling(0.5, 1.0, 0.5))?);
        g.add_child(drills, drill)?;
    }

    let die = g.csg(CsgOp::Difference, rounded, drills)?;
    g.set_transform(die, Matrix4D::translation(0.0, 1.0, 0.0)
        * Matrix4D::rotation_y(PI / 6.0))?;
    if let Some(shape) = g.get_mut(die) {
        shape.material = Some(Material {
            color: Color::rgb(0.8, 0.1, 0.1),
            specular: 0.4,
            shininess: 50.0,
            reflective: 0.1,
            ..Default::default()
        });
    }
    world.add_root(die)?;

    let camera = camera(width, height, PI / 3.0,
        Tuple4D::point(0.0, 3.0, -6.0), Tuple4D::point(0.0, 1.0, 0.0))?;
    Ok((world, camera))
}

/// A hollow glass ball in front of a striped wall, with depth of field.
pub fn glass(width: usize, height: usize) -> Result<(World, Camera)> {
    let mut world = World::empty();
    world.add_light(Light::Point(PointLight::new(
        Color::white(),
        Tuple4D::point(-5.0, 8.0, -8.0),
    )))?;

    world.add_object(Shape::plane().with_material(checkered_floor(0.1)));

    let stripes = Pattern::stripe(Color::rgb(0.9, 0.85, 0.6), Color::rgb(0.3, 0.5, 0.7))
        .with_transform(Matrix4D::rotation_y(PI / 4.0))?;
    world.add_object(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, 0.0, 8.0)
            * Matrix4D::rotation_x(PI / 2.0))?
        .with_material(Material { specular: 0.0, ..Default::default() }
            .with_pattern(stripes)));

    let glass = Material {
        color: Color::rgb(0.1, 0.1, 0.1),
        ambient: 0.05,
        diffuse: 0.1,
        specular: 1.0,
        shininess: 300.0,
        reflective: 0.9,
        ..Material::glass()
    };
    world.add_object(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0))?
        .with_material(Material { transparency: 0.9, ..glass.clone() })
        .with_shadow(false));
    world.add_object(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0)
            * Matrix4D::scaling(0.5, 0.5, 0.5))?
        .with_material(Material { transparency: 0.9, refractive_index: AIR_RI, ..glass })
        .with_shadow(false));

    world.add_object(Shape::sphere()
        .with_transform(Matrix4D::translation(1.5, 0.5, 3.0)
            * Matrix4D::scaling(0.5, 0.5, 0.5))?
        .with_material(Material {
            color: Color::rgb(0.2, 0.7, 0.3),
            refractive_index: GLASS_RI,
            ..Default::default()
        }));

    let from = Tuple4D::point(0.0, 1.5, -4.0);
    let to = Tuple4D::point(0.0, 1.0, 0.0);
    let camera = camera(width, height, PI / 3.0, from, to)?
        .with_aperture(0.04, (to - from).magnitude());
    Ok((world, camera))
}

fn hexagon_corner() -> Result<Shape> {
    Shape::sphere().with_transform(Matrix4D::translation(0.0, 0.0, -1.0)
        * Matrix4D::scaling(0.25, 0.25, 0.25))
}

fn hexagon_edge() -> Result<Shape> {
    Shape::bounded_cylinder(0.0, 1.0).with_transform(
        Matrix4D::translation(0.0, 0.0, -1.0)
            * Matrix4D::rotation_y(-PI / 6.0)
            * Matrix4D::rotation_z(-PI / 2.0)
            * Matrix4D::scaling(0.25, 1.0, 0.25))
}

fn hexagon_side(graph: &mut SceneGraph) -> Result<ShapeId> {
    let side = graph.insert(Shape::group());
    let corner = graph.insert(hexagon_corner()?);
    let edge = graph.insert(hexagon_edge()?);

    graph.add_child(side, corner)?;
    graph.add_child(side, edge)?;
    Ok(side)
}

fn hexagon_group(graph: &mut SceneGraph) -> Result<ShapeId> {
    let hex = graph.insert(Shape::group());

    for n in 0..6 {
        let side = hexagon_side(graph)?;
        graph.set_transform(side, Matrix4D::rotation_y(n as f64 * PI / 3.0))?;
        graph.add_child(hex, side)?;
    }

    Ok(hex)
}

/// Six spheres and six rods, nested two groups deep.
pub fn hexagon(width: usize, height: usize) -> Result<(World, Camera)> {
    let mut world = World::empty();
    world.add_light(Light::Point(PointLight::new(
        Color::white(),
        Tuple4D::point(-4.0, 6.0, -6.0),
    )))?;

    world.add_object(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -0.5, 0.0))?
        .with_material(checkered_floor(0.2)));

    let hex = hexagon_group(&mut world.graph)?;
    world.graph.set_transform(hex, Matrix4D::translation(0.0, 0.25, 0.0)
        * Matrix4D::rotation_x(-PI / 8.0))?;
    if let Some(shape) = world.graph.get_mut(hex) {
        shape.material = Some(Material {
            color: Color::rgb(0.3, 0.5, 0.9),
            reflective: 0.2,
            ..Default::default()
        });
    }
    world.add_root(hex)?;

    let camera = camera(width, height, PI / 3.0,
        Tuple4D::point(0.0, 2.5, -3.5), Tuple4D::point(0.0, 0.0, 0.0))?;
    Ok((world, camera))
}

fn align_check(main: Color, ul: Color, ur: Color, bl: Color, br: Color)
    -> UvPattern {
    UvPattern::AlignCheck { main, ul, ur, bl, br }
}

/// A gradient image standing in for a decoded texture file.
fn gradient_image(width: usize, height: usize) -> Option<Canvas> {
    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |x| Color::rgb(
            x as f64 / width as f64,
            y as f64 / height as f64,
            0.5,
        )))
        .collect();

    Canvas::from_pixels(width, height, pixels)
}

/// Every texture mapping side by side.
pub fn textures(width: usize, height: usize) -> Result<(World, Camera)> {
    let mut world = World::empty();
    world.add_light(Light::Point(PointLight::new(
        Color::white(),
        Tuple4D::point(-10.0, 10.0, -10.0),
    )))?;

    let white = Color::white();
    let red = Color::rgb(1.0, 0.0, 0.0);
    let yellow = Color::rgb(1.0, 1.0, 0.0);
    let brown = Color::rgb(1.0, 0.5, 0.0);
    let green = Color::rgb(0.0, 1.0, 0.0);
    let cyan = Color::rgb(0.0, 1.0, 1.0);
    let blue = Color::rgb(0.0, 0.0, 1.0);
    let purple = Color::rgb(1.0, 0.0, 1.0);
    let dark = Color::rgb(0.2, 0.2, 0.2);

    let plain = Material { ambient: 0.2, specular: 0.3, ..Default::default() };

    world.add_object(Shape::plane().with_material(plain.clone().with_pattern(
        Pattern::texture_map(UvMapping::Planar,
            UvPattern::checkers(2.0, 2.0, white, dark)))));

    let weave = Pattern::blended(
        Pattern::stripe(Color::rgb(0.4, 0.1, 0.1), Color::black()),
        Pattern::stripe(Color::rgb(0.1, 0.1, 0.4), Color::black())
            .with_transform(Matrix4D::rotation_y(PI / 2.0))?,
    ).with_transform(Matrix4D::scaling(0.25, 0.25, 0.25))?;
    world.add_object(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, 0.0, 6.0)
            * Matrix4D::rotation_x(PI / 2.0))?
        .with_material(plain.clone().with_pattern(weave)));

    world.add_object(Shape::sphere()
        .with_transform(Matrix4D::translation(-2.5, 1.0, 0.0))?
        .with_material(plain.clone().with_pattern(
            Pattern::texture_map(UvMapping::Spherical,
                UvPattern::checkers(16.0, 8.0, green, dark)))));

    world.add_object(Shape::capped_cylinder(0.0, 1.0)
        .with_transform(Matrix4D::translation(0.0, 0.0, 2.0)
            * Matrix4D::scaling(0.75, 2.0, 0.75))?
        .with_material(plain.clone().with_pattern(
            Pattern::texture_map(UvMapping::Cylindrical,
                UvPattern::checkers(16.0, 8.0, yellow, dark)))));

    let faces = [
        align_check(yellow, cyan, red, blue, brown),
        align_check(cyan, red, yellow, brown, green),
        align_check(red, yellow, purple, green, white),
        align_check(green, purple, cyan, white, blue),
        align_check(brown, cyan, purple, red, yellow),
        align_check(purple, brown, green, blue, white),
    ];
    world.add_object(Shape::cube()
        .with_transform(Matrix4D::translation(0.0, 1.0, -1.0)
            * Matrix4D::rotation_y(PI / 5.0)
            * Matrix4D::rotation_x(-PI / 6.0)
            * Matrix4D::scaling(0.75, 0.75, 0.75))?
        .with_material(plain.clone().with_pattern(Pattern::cube_map(faces))));

    if let Some(image) = gradient_image(64, 32) {
        world.add_object(Shape::sphere()
            .with_transform(Matrix4D::translation(2.5, 1.0, 0.0))?
            .with_material(plain.with_pattern(
                Pattern::texture_map(UvMapping::Spherical,
                    UvPattern::Image(Arc::new(image))))));
    }

    let camera = camera(width, height, PI / 2.5,
        Tuple4D::point(0.0, 3.0, -6.0), Tuple4D::point(0.0, 1.0, 0.0))?;
    Ok((world, camera))
}
