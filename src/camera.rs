use std::f64::consts::PI;

use rand::{ Rng, RngCore };

use crate::config::RenderConfig;
use crate::consts::{ DEFAULT_FOCAL_SAMPLES, DEFAULT_MAX_FOCAL_SAMPLES };
use crate::error::Result;
use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::world::World;
use crate::canvas::Canvas;

/// A camera record for generating a canvas.
///
/// This record gives a "frame" of the world. Based on camera parameters,
/// different perspectives can be produced. A nonzero `aperture` turns on
/// depth of field: several rays are traced per pixel from a lens disk, all
/// converging on the pixel's point at `focal_distance`.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas.
    pub hsize: usize,

    /// The vertical size of the resultant canvas.
    pub vsize: usize,

    pub half_width: f64,
    pub half_height: f64,
    pub pixel_size: f64,

    /// The angle describing "how much" the camera can see.
    pub field_of_view: f64,

    /// How the world is oriented relative to the camera (typically a view
    /// transformation), with its inverse.
    transform: Transform,

    /// Radius of the lens disk. Zero is a pinhole camera.
    pub aperture: f64,

    /// Distance along each primary ray to the plane in perfect focus.
    pub focal_distance: f64,

    /// Rays traced per pixel with depth of field on.
    pub focal_samples: usize,

    /// Upper bound on `focal_samples`.
    pub max_focal_samples: usize,
}

impl Camera {
    /// Creates a pinhole camera, failing if `transform` cannot be inverted.
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64,
        transform: Matrix4D) -> Result<Camera> {
        let half_view = (field_of_view / 2.0).tan();
        let aspect = (hsize as f64) / (vsize as f64);

        let (half_width, half_height) = if aspect >= 1.0 {
            (half_view, half_view / aspect)
        } else {
            (half_view * aspect, half_view)
        };

        let pixel_size = half_width * 2.0 / (hsize as f64);
        Ok(Camera {
            hsize,
            vsize,
            half_width,
            half_height,
            pixel_size,
            field_of_view,
            transform: Transform::new(transform)?,
            aperture: 0.0,
            focal_distance: 1.0,
            focal_samples: DEFAULT_FOCAL_SAMPLES,
            max_focal_samples: DEFAULT_MAX_FOCAL_SAMPLES,
        })
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replaces the view transform. On failure the previous one is kept.
    pub fn set_transform(&mut self, m: Matrix4D) -> Result<()> {
        self.transform = Transform::new(m)?;
        Ok(())
    }

    pub fn with_aperture(self, aperture: f64, focal_distance: f64) -> Camera {
        Camera { aperture, focal_distance, ..self }
    }

    /// Applies the depth of field settings of a render job.
    pub fn configure(&mut self, config: &RenderConfig) {
        if config.force_zero_aperture {
            self.aperture = 0.0;
        }

        self.focal_samples = config.focal_samples;
    }

    /// The number of rays traced for every pixel.
    pub fn samples_per_pixel(&self) -> usize {
        if self.aperture > 0.0 {
            self.focal_samples.min(self.max_focal_samples).max(1)
        } else {
            1
        }
    }

    /// The ray from the eye through the center of pixel `(px, py)`.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray4D {
        // Offsets from the edge of the canvas to the pixel's center
        let xoffset = (px as f64 + 0.5) * self.pixel_size;
        let yoffset = (py as f64 + 0.5) * self.pixel_size;

        // The untransformed coordinates of the pixel in world space
        let world_x = self.half_width - xoffset;
        let world_y = self.half_height - yoffset;

        // Using the camera matrix, transform the canvas point and origin,
        // computing the ray's direction vector
        let tr_inv = *self.transform.inverse();
        let pixel = tr_inv * Tuple4D::point(world_x, world_y, -1.0);
        let origin = tr_inv * Tuple4D::origin();
        let direction = (pixel - origin).normalize();

        Ray4D::new(origin, direction)
    }

    /// Every ray traced for pixel `(px, py)`.
    ///
    /// A pinhole camera yields the single primary ray. Otherwise each ray
    /// starts at a random point of the lens disk and aims at the point of
    /// the primary ray at the focal distance.
    pub fn rays_for_pixel(&self, px: usize, py: usize, rng: &mut dyn RngCore)
        -> Vec<Ray4D> {
        let primary = self.ray_for_pixel(px, py);
        if !(self.aperture > 0.0) {
            return vec![primary];
        }

        let focal_point = primary.position(self.focal_distance);
        let tr_inv = *self.transform.inverse();

        (0..self.samples_per_pixel())
            .map(|_| {
                // Uniform over the disk, not clustered at its center.
                let r = self.aperture * rng.gen::<f64>().sqrt();
                let theta = 2.0 * PI * rng.gen::<f64>();

                let origin = tr_inv
                    * Tuple4D::point(r * theta.cos(), r * theta.sin(), 0.0);
                Ray4D::new(origin, (focal_point - origin).normalize())
            })
            .collect()
    }

    /// The averaged color of every ray through pixel `(px, py)`.
    pub fn render_pixel(&self, w: &World, px: usize, py: usize,
        rng: &mut dyn RngCore) -> Color {
        let rays = self.rays_for_pixel(px, py, rng);
        let colors: Vec<Color> = rays.iter()
            .map(|r| w.color_at(r, w.max_depth, rng))
            .collect();

        Color::mean(&colors)
    }

    /// Renders the whole image on the calling thread.
    pub fn render(&self, w: &World, rng: &mut dyn RngCore) -> Canvas {
        let mut image = Canvas::new(self.hsize, self.vsize);

        for y in 0..self.vsize {
            for x in 0..self.hsize {
                let color = self.render_pixel(w, x, y, rng);
                image.write_pixel(x, y, &color);
            }
        }

        image
    }
}

#[cfg(test)]
use rand::{ SeedableRng, rngs::StdRng };

#[cfg(test)]
fn default_view() -> Matrix4D {
    Matrix4D::view_transform(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    )
}

#[test]
fn pixel_size_horizontal_canvas() {
    let c = Camera::new(200, 125, PI / 2.0, Matrix4D::identity()).unwrap();
    assert!(crate::consts::feq(c.pixel_size, 0.01));
}

#[test]
fn pixel_size_vertical_canvas() {
    let c = Camera::new(125, 200, PI / 2.0, Matrix4D::identity()).unwrap();
    assert!(crate::consts::feq(c.pixel_size, 0.01));
}

#[test]
fn ray_through_center() {
    let c = Camera::new(201, 101, PI / 2.0, Matrix4D::identity()).unwrap();
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(201, 101, PI / 2.0, Matrix4D::identity()).unwrap();
    let r = c.ray_for_pixel(0, 0);

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.66519, 0.33259, -0.66851));
}

#[test]
fn ray_when_camera_transformed() {
    let c = Camera::new(201, 101, PI / 2.0,
        Matrix4D::rotation_y(PI / 4.0)
            * Matrix4D::translation(0.0, -2.0, 5.0)).unwrap();
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin, Tuple4D::point(0.0, 2.0, -5.0));
    assert_eq!(r.direction,
        Tuple4D::vector(2.0f64.sqrt() / 2.0, 0.0, -(2.0f64.sqrt() / 2.0)));
}

#[test]
fn degenerate_view_is_rejected() {
    let res = Camera::new(10, 10, PI / 2.0, Matrix4D::scaling(0.0, 1.0, 1.0));
    assert!(res.is_err());

    let mut c = Camera::new(10, 10, PI / 2.0, default_view()).unwrap();
    assert!(c.set_transform(Matrix4D::zero()).is_err());
    assert_eq!(*c.transform().matrix(), default_view());
}

#[test]
fn render_world_with_camera() {
    let w: World = Default::default();
    let c = Camera::new(11, 11, PI / 2.0, default_view()).unwrap();

    let image = c.render(&w, &mut StdRng::seed_from_u64(0));
    assert_eq!(image.read_pixel(5, 5).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn pinhole_camera_traces_one_ray() {
    let c = Camera::new(11, 11, PI / 2.0, default_view()).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let rays = c.rays_for_pixel(3, 7, &mut rng);
    assert_eq!(rays, vec![c.ray_for_pixel(3, 7)]);
}

#[test]
fn aperture_samples_are_capped() {
    let mut c = Camera::new(11, 11, PI / 2.0, default_view()).unwrap()
        .with_aperture(0.2, 5.0);
    let mut rng = StdRng::seed_from_u64(1);

    assert_eq!(c.rays_for_pixel(5, 5, &mut rng).len(), DEFAULT_FOCAL_SAMPLES);

    c.focal_samples = 100;
    assert_eq!(c.rays_for_pixel(5, 5, &mut rng).len(), c.max_focal_samples);
}

#[test]
fn lens_rays_converge_on_focal_point() {
    let c = Camera::new(11, 11, PI / 2.0, default_view()).unwrap()
        .with_aperture(0.25, 5.0);
    let mut rng = StdRng::seed_from_u64(2);

    let primary = c.ray_for_pixel(2, 8);
    let focal_point = primary.position(5.0);

    for r in c.rays_for_pixel(2, 8, &mut rng) {
        // Origins stay on the lens, which sits at the eye.
        assert!((r.origin - primary.origin).magnitude() <= 0.25 + 1e-9);

        let t = (focal_point - r.origin).magnitude();
        assert_eq!(r.position(t), focal_point);
    }
}

#[test]
fn tiny_aperture_converges_to_pinhole_color() {
    let w: World = Default::default();
    let pinhole = Camera::new(11, 11, PI / 2.0, default_view()).unwrap();
    let lens = pinhole.clone().with_aperture(1e-9, 5.0);
    let mut rng = StdRng::seed_from_u64(3);

    assert_eq!(lens.render_pixel(&w, 5, 5, &mut rng),
        pinhole.render_pixel(&w, 5, 5, &mut rng));
}

#[test]
fn configure_can_force_pinhole() {
    let mut c = Camera::new(11, 11, PI / 2.0, default_view()).unwrap()
        .with_aperture(0.5, 4.0);

    c.configure(&RenderConfig { focal_samples: 12, ..Default::default() });
    assert_eq!(c.samples_per_pixel(), 12);

    c.configure(&RenderConfig { force_zero_aperture: true, ..Default::default() });
    assert_eq!(c.samples_per_pixel(), 1);
    assert_eq!(c.aperture, 0.0);
}
