use std::f64::consts::PI;

use rand::SeedableRng;
use rand::rngs::StdRng;

use tiled_ray_tracer::RenderError;
use tiled_ray_tracer::tuple::Tuple4D;
use tiled_ray_tracer::matrix::Matrix4D;
use tiled_ray_tracer::color::Color;
use tiled_ray_tracer::csg::CsgOp;
use tiled_ray_tracer::shape::Shape;
use tiled_ray_tracer::light::{ Light, AreaLight };
use tiled_ray_tracer::world::World;
use tiled_ray_tracer::camera::Camera;
use tiled_ray_tracer::config::RenderConfig;
use tiled_ray_tracer::render::{ render_parallel, render_tile, CancelToken, TileRequest };

fn looking_at_origin(width: usize, height: usize) -> Camera {
    Camera::new(width, height, PI / 2.0, Matrix4D::view_transform(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    )).unwrap()
}

fn config(threads: usize, tile_size: usize) -> RenderConfig {
    RenderConfig { threads, tile_size, ..Default::default() }
}

#[test]
fn parallel_render_of_default_world() {
    let canvas = render_parallel(World::default(), looking_at_origin(11, 11),
        &config(3, 4), &CancelToken::new()).unwrap();

    assert_eq!(canvas.width, 11);
    assert_eq!(canvas.height, 11);
    assert_eq!(canvas.read_pixel(5, 5), Some(Color::rgb(0.38066, 0.47583, 0.2855)));
}

#[test]
fn parallel_render_matches_serial_render() {
    let mut world = World::default();
    let floor = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap();
    world.add_object(floor);

    let camera = looking_at_origin(23, 17);
    let serial = camera.render(&world, &mut StdRng::seed_from_u64(0));
    let parallel = render_parallel(world, camera, &config(4, 5),
        &CancelToken::new()).unwrap();

    assert_eq!(serial, parallel);
}

#[test]
fn tile_size_does_not_change_the_image() {
    let small = render_parallel(World::default(), looking_at_origin(20, 12),
        &config(2, 3), &CancelToken::new()).unwrap();
    let large = render_parallel(World::default(), looking_at_origin(20, 12),
        &config(2, 64), &CancelToken::new()).unwrap();

    assert_eq!(small, large);
}

#[test]
fn soft_shadow_render_is_repeatable() {
    let mut world = World::default();
    world.lights = vec![Light::Area(AreaLight::new(
        Tuple4D::point(-11.0, 10.0, -10.0),
        Tuple4D::vector(2.0, 0.0, 0.0), 3,
        Tuple4D::vector(0.0, 2.0, 0.0), 3,
        Color::white(),
    ))];
    world.add_object(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap());

    let first = render_parallel(world.clone(), looking_at_origin(16, 16),
        &config(3, 4), &CancelToken::new()).unwrap();
    let second = render_parallel(world.clone(), looking_at_origin(16, 16),
        &config(2, 4), &CancelToken::new()).unwrap();
    assert_eq!(first, second);

    // A tile rendered on its own matches the same region of the full image.
    let tile = render_tile(&world, &looking_at_origin(16, 16),
        TileRequest::new(8, 4, 4, 4));
    for row in 0..4 {
        for col in 0..4 {
            assert_eq!(Some(tile.pixels[row * 4 + col]),
                first.read_pixel(8 + col, 4 + row));
        }
    }
}

#[test]
fn csg_scene_renders_through_the_pool() {
    let mut world = World::default();
    world.graph = Default::default();

    let g = &mut world.graph;
    let cube = g.insert(Shape::cube());
    let sphere = g.insert(Shape::sphere()
        .with_transform(Matrix4D::scaling(1.3, 1.3, 1.3)).unwrap());
    let body = g.csg(CsgOp::Intersection, cube, sphere).unwrap();
    world.add_root(body).unwrap();

    let canvas = render_parallel(world, looking_at_origin(9, 9),
        &config(2, 4), &CancelToken::new()).unwrap();

    // The body fills the middle of the frame and misses the corners.
    assert_ne!(canvas.read_pixel(4, 4), Some(Color::black()));
    assert_eq!(canvas.read_pixel(0, 0), Some(Color::black()));
}

#[test]
fn cancelled_render_returns_an_error() {
    let cancel = CancelToken::new();
    cancel.cancel();

    let res = render_parallel(World::default(), looking_at_origin(32, 32),
        &config(2, 8), &cancel);

    assert!(matches!(res, Err(RenderError::Cancelled)));
}

#[test]
fn config_file_drives_the_render() {
    let path = std::env::temp_dir()
        .join(format!("tiled-ray-tracer-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "threads": 2, "tile_size": 3, "max_depth": 0 }"#)
        .unwrap();

    let config = RenderConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.tile_size, 3);

    let mut world = World::default();
    world.configure(&config);
    assert_eq!(world.max_depth, 0);

    let canvas = render_parallel(world, looking_at_origin(11, 11), &config,
        &CancelToken::new()).unwrap();
    assert_eq!(canvas.read_pixel(5, 5), Some(Color::rgb(0.38066, 0.47583, 0.2855)));
}

#[test]
fn invalid_config_fails_fast() {
    let res = render_parallel(World::default(), looking_at_origin(4, 4),
        &config(0, 4), &CancelToken::new());

    assert!(matches!(res, Err(RenderError::InvalidConfig(_))));
}
