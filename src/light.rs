use rand::{ Rng, RngCore };

use crate::color::Color;
use crate::material::Material;
use crate::matrix::Matrix4D;
use crate::tuple::Tuple4D;

/// A point light.
///
/// A very simple light source. Provides a color and a position where light is
/// produced from.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Tuple4D,
}

impl PointLight {
    /// Creates a point light.
    ///
    /// If `position` isn't a point, it is converted to a point automatically.
    pub fn new(intensity: Color, position: Tuple4D) -> PointLight {
        PointLight { intensity, position: position.as_point() }
    }
}

/// A rectangular light, sampled on a `usteps` by `vsteps` grid.
///
/// Each sample sits somewhere inside its grid cell: at a random offset when
/// `jitter` is set, otherwise at the cell's center.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AreaLight {
    pub corner: Tuple4D,

    /// One cell's edge along the first side of the rectangle.
    pub uvec: Tuple4D,
    pub usteps: usize,

    /// One cell's edge along the second side of the rectangle.
    pub vvec: Tuple4D,
    pub vsteps: usize,

    pub intensity: Color,

    /// The center of the rectangle.
    pub position: Tuple4D,

    pub jitter: bool,

    /// Whether the light shows up in renders as a glowing panel.
    pub visible: bool,
}

impl AreaLight {
    /// Creates a light spanning `corner + a * full_uvec + b * full_vvec`
    /// for `a, b` in `0..=1`.
    pub fn new(corner: Tuple4D, full_uvec: Tuple4D, usteps: usize,
        full_vvec: Tuple4D, vsteps: usize, intensity: Color) -> AreaLight {
        let usteps = usteps.max(1);
        let vsteps = vsteps.max(1);
        let corner = corner.as_point();
        let full_uvec = full_uvec.as_vector();
        let full_vvec = full_vvec.as_vector();

        AreaLight {
            corner,
            uvec: full_uvec / usteps as f64,
            usteps,
            vvec: full_vvec / vsteps as f64,
            vsteps,
            intensity,
            position: corner + full_uvec / 2.0 + full_vvec / 2.0,
            jitter: true,
            visible: false,
        }
    }

    /// A light covering the square `-1..=1` in the XZ plane, moved into
    /// place by `m`.
    pub fn from_transform(m: &Matrix4D, usteps: usize, vsteps: usize,
        intensity: Color) -> AreaLight {
        AreaLight::new(
            *m * Tuple4D::point(-1.0, 0.0, -1.0),
            *m * Tuple4D::vector(2.0, 0.0, 0.0), usteps,
            *m * Tuple4D::vector(0.0, 0.0, 2.0), vsteps,
            intensity,
        )
    }

    pub fn full_uvec(&self) -> Tuple4D {
        self.uvec * self.usteps as f64
    }

    pub fn full_vvec(&self) -> Tuple4D {
        self.vvec * self.vsteps as f64
    }

    /// The same rectangle, resampled on a different grid.
    pub fn with_resolution(&self, usteps: usize, vsteps: usize) -> AreaLight {
        AreaLight {
            jitter: self.jitter,
            visible: self.visible,
            ..AreaLight::new(self.corner, self.full_uvec(), usteps,
                self.full_vvec(), vsteps, self.intensity)
        }
    }

    pub fn with_jitter(self, jitter: bool) -> AreaLight {
        AreaLight { jitter, ..self }
    }

    pub fn with_visibility(self, visible: bool) -> AreaLight {
        AreaLight { visible, ..self }
    }

    /// A sample position inside cell `(u, v)`.
    pub fn point_on_light(&self, u: usize, v: usize, rng: &mut dyn RngCore)
        -> Tuple4D {
        let (ju, jv) = if self.jitter {
            (rng.gen::<f64>(), rng.gen::<f64>())
        } else {
            (0.5, 0.5)
        };

        self.corner
            + self.uvec * (u as f64 + ju)
            + self.vvec * (v as f64 + jv)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Point(PointLight),
    Area(AreaLight),
}

impl From<PointLight> for Light {
    fn from(l: PointLight) -> Light {
        Light::Point(l)
    }
}

impl From<AreaLight> for Light {
    fn from(l: AreaLight) -> Light {
        Light::Area(l)
    }
}

impl Light {
    pub fn intensity(&self) -> Color {
        match self {
            Light::Point(l) => l.intensity,
            Light::Area(l) => l.intensity,
        }
    }

    /// The position of a point light, or the center of an area light.
    pub fn position(&self) -> Tuple4D {
        match self {
            Light::Point(l) => l.position,
            Light::Area(l) => l.position,
        }
    }

    pub fn samples(&self) -> usize {
        match self {
            Light::Point(_) => 1,
            Light::Area(l) => l.usteps * l.vsteps,
        }
    }

    /// Every sample position of the light, row by row along `u`.
    pub fn sample_positions(&self, rng: &mut dyn RngCore) -> Vec<Tuple4D> {
        match self {
            Light::Point(l) => vec![l.position],
            Light::Area(l) => {
                let mut positions = Vec::with_capacity(l.usteps * l.vsteps);
                for v in 0..l.vsteps {
                    for u in 0..l.usteps {
                        positions.push(l.point_on_light(u, v, rng));
                    }
                }
                positions
            },
        }
    }

    /// How many samples make up one row of `sample_positions`.
    pub fn row_len(&self) -> usize {
        match self {
            Light::Point(_) => 1,
            Light::Area(l) => l.usteps,
        }
    }
}

/// The diffuse and specular terms of the Phong model for one light sample.
///
/// `effective_color` is the surface color already multiplied by the light's
/// intensity. The side of the surface facing away from the light gets
/// nothing.
pub fn diffuse_specular(m: &Material, effective_color: Color, intensity: Color,
    light_position: Tuple4D, point: Tuple4D, eyev: Tuple4D, normalv: Tuple4D)
    -> Color {
    let lightv = (light_position - point).normalize();

    let light_dot_normal = lightv.dot(&normalv);
    if light_dot_normal < 0.0 {
        return Color::black();
    }

    let diffuse = effective_color * m.diffuse * light_dot_normal;

    let reflectv = (-lightv).reflect(&normalv);
    let reflect_dot_eye = reflectv.dot(&eyev);
    if reflect_dot_eye <= 0.0 {
        return diffuse;
    }

    let factor = reflect_dot_eye.powf(m.shininess);
    diffuse + intensity * m.specular * factor
}

/// Calculate the lighting of a pixel from a single point light.
///
/// Effectively, this function takes a material and its resolved surface
/// color, a single light, a point, the eye vector and the normal vector, and
/// calculates how the light looks from the eye. If this point is in a shadow
/// (parameter `in_shadow`), only ambient light is used.
pub fn lighting(m: &Material, color: Color, light: &PointLight,
    point: Tuple4D, eyev: Tuple4D, normalv: Tuple4D, in_shadow: bool) -> Color {
    let effective_color = color * light.intensity;
    let ambient = effective_color * m.ambient;

    if in_shadow {
        return ambient;
    }

    ambient + diffuse_specular(m, effective_color, light.intensity,
        light.position, point, eyev, normalv)
}

/// Averages `sample` over `positions`, stopping early once the running mean
/// settles.
///
/// The mean is only compared at the end of each row of `row_len` samples,
/// against the mean at the end of the previous row. Sampling stops when a
/// whole row moves the mean by less than `sensitivity` on every channel, so
/// at least two rows are always taken. A sensitivity of zero takes every
/// sample. Returns the mean and the number of samples taken.
pub fn adaptive_mean<F>(positions: &[Tuple4D], row_len: usize,
    sensitivity: f64, mut sample: F) -> (Color, usize)
    where F: FnMut(Tuple4D) -> Color {
    if positions.is_empty() {
        return (Color::black(), 0);
    }

    let row_len = row_len.max(1);
    let mut sum = Color::black();
    let mut previous: Option<Color> = None;

    for (i, p) in positions.iter().enumerate() {
        sum += sample(*p);

        let taken = i + 1;
        if sensitivity <= 0.0 || taken % row_len != 0 {
            continue;
        }

        let mean = sum / taken as f64;
        if let Some(prev) = previous {
            if mean.max_difference(&prev) < sensitivity {
                return (mean, taken);
            }
        }
        previous = Some(mean);
    }

    (sum / positions.len() as f64, positions.len())
}

#[cfg(test)]
fn unit_light_at(position: Tuple4D) -> PointLight {
    PointLight::new(Color::white(), position)
}

#[test]
fn eye_between_light_and_surface() {
    let m = Material::default();
    let light = unit_light_at(Tuple4D::point(0.0, 0.0, -10.0));
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);

    let res = lighting(&m, m.color, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(1.9, 1.9, 1.9));
}

#[test]
fn eye_between_light_and_surface_offset_45() {
    let m = Material::default();
    let light = unit_light_at(Tuple4D::point(0.0, 0.0, -10.0));
    let half = 2f64.sqrt() / 2.0;
    let eyev = Tuple4D::vector(0.0, half, half);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);

    let res = lighting(&m, m.color, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(1.0, 1.0, 1.0));
}

#[test]
fn eye_opposite_from_surface_offset_45() {
    let m = Material::default();
    let light = unit_light_at(Tuple4D::point(0.0, 10.0, -10.0));
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);

    let res = lighting(&m, m.color, &light, Tuple4D::origin(), eyev, normalv, false);
    let expected = 0.1 + 0.9 * 2f64.sqrt() / 2.0;
    assert_eq!(res, Color::rgb(expected, expected, expected));
}

#[test]
fn eye_in_path_of_reflection() {
    let m = Material::default();
    let light = unit_light_at(Tuple4D::point(0.0, 10.0, -10.0));
    let half = 2f64.sqrt() / 2.0;
    let eyev = Tuple4D::vector(0.0, -half, -half);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);

    let res = lighting(&m, m.color, &light, Tuple4D::origin(), eyev, normalv, false);
    let expected = 0.1 + 0.9 * half + 0.9;
    assert_eq!(res, Color::rgb(expected, expected, expected));
}

#[test]
fn light_behind_surface() {
    let m = Material::default();
    let light = unit_light_at(Tuple4D::point(0.0, 0.0, 10.0));
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);

    let res = lighting(&m, m.color, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn surface_in_shadow_gets_ambient_only() {
    let m = Material::default();
    let light = unit_light_at(Tuple4D::point(0.0, 0.0, -10.0));
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);

    let res = lighting(&m, m.color, &light, Tuple4D::origin(), eyev, normalv, true);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn area_light_is_divided_into_cells() {
    let light = AreaLight::new(
        Tuple4D::origin(),
        Tuple4D::vector(2.0, 0.0, 0.0), 4,
        Tuple4D::vector(0.0, 0.0, 1.0), 2,
        Color::white(),
    );

    assert_eq!(light.uvec, Tuple4D::vector(0.5, 0.0, 0.0));
    assert_eq!(light.vvec, Tuple4D::vector(0.0, 0.0, 0.5));
    assert_eq!(Light::from(light).samples(), 8);
    assert_eq!(light.position, Tuple4D::point(1.0, 0.0, 0.5));
}

#[test]
fn point_on_area_light_without_jitter() {
    use rand::SeedableRng;

    let light = AreaLight::new(
        Tuple4D::origin(),
        Tuple4D::vector(2.0, 0.0, 0.0), 4,
        Tuple4D::vector(0.0, 0.0, 1.0), 2,
        Color::white(),
    ).with_jitter(false);
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let cases = [
        (0, 0, Tuple4D::point(0.25, 0.0, 0.25)),
        (1, 0, Tuple4D::point(0.75, 0.0, 0.25)),
        (0, 1, Tuple4D::point(0.25, 0.0, 0.75)),
        (2, 0, Tuple4D::point(1.25, 0.0, 0.25)),
        (3, 1, Tuple4D::point(1.75, 0.0, 0.75)),
    ];

    for (u, v, p) in cases {
        assert_eq!(light.point_on_light(u, v, &mut rng), p);
    }
}

#[test]
fn jittered_samples_stay_in_their_cells() {
    use rand::SeedableRng;

    let light = AreaLight::new(
        Tuple4D::origin(),
        Tuple4D::vector(2.0, 0.0, 0.0), 4,
        Tuple4D::vector(0.0, 0.0, 1.0), 2,
        Color::white(),
    );
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let positions = Light::from(light).sample_positions(&mut rng);

    assert_eq!(positions.len(), 8);
    for (i, p) in positions.iter().enumerate() {
        let (u, v) = ((i % 4) as f64, (i / 4) as f64);
        assert!(p.x >= u * 0.5 && p.x < (u + 1.0) * 0.5);
        assert!(p.z >= v * 0.5 && p.z < (v + 1.0) * 0.5);
    }
}

#[test]
fn resampling_keeps_extent() {
    let light = AreaLight::new(
        Tuple4D::point(-1.0, 2.0, -1.0),
        Tuple4D::vector(2.0, 0.0, 0.0), 2,
        Tuple4D::vector(0.0, 0.0, 2.0), 2,
        Color::white(),
    ).with_visibility(true);
    let fine = light.with_resolution(8, 4);

    assert_eq!(fine.full_uvec(), light.full_uvec());
    assert_eq!(fine.full_vvec(), light.full_vvec());
    assert_eq!(fine.position, light.position);
    assert!(fine.visible);
    assert_eq!(Light::from(fine).samples(), 32);
}

#[test]
fn area_light_from_transform() {
    let m = Matrix4D::translation(0.0, 5.0, 0.0) * Matrix4D::scaling(2.0, 1.0, 3.0);
    let light = AreaLight::from_transform(&m, 2, 3, Color::white());

    assert_eq!(light.corner, Tuple4D::point(-2.0, 5.0, -3.0));
    assert_eq!(light.full_uvec(), Tuple4D::vector(4.0, 0.0, 0.0));
    assert_eq!(light.full_vvec(), Tuple4D::vector(0.0, 0.0, 6.0));
    assert_eq!(light.position, Tuple4D::point(0.0, 5.0, 0.0));
}

#[test]
fn adaptive_mean_stops_once_settled() {
    let positions = vec![Tuple4D::origin(); 16];

    let (full, taken) = adaptive_mean(&positions, 4, 0.0, |_| Color::white());
    assert_eq!((full, taken), (Color::white(), 16));

    // Two identical rows settle the mean.
    let (early, taken) = adaptive_mean(&positions, 4, 0.01, |_| Color::white());
    assert_eq!(early, Color::white());
    assert_eq!(taken, 8);
}

#[test]
fn adaptive_mean_looks_past_a_uniform_first_row() {
    let positions: Vec<Tuple4D> = (0..16)
        .map(|i| Tuple4D::point((i % 4) as f64, 0.0, (i / 4) as f64))
        .collect();
    let first_row_dark = |p: Tuple4D| {
        if p.z == 0.0 { Color::black() } else { Color::white() }
    };

    let (full, taken) = adaptive_mean(&positions, 4, 0.0, first_row_dark);
    assert_eq!((full, taken), (Color::rgb(0.75, 0.75, 0.75), 16));

    let (mean, taken) = adaptive_mean(&positions, 4, 1e-12, first_row_dark);
    assert_eq!(taken, 16);
    assert_eq!(mean, Color::rgb(0.75, 0.75, 0.75));
}

#[test]
fn adaptive_mean_stops_when_a_row_barely_moves_the_mean() {
    let positions: Vec<Tuple4D> = (0..16)
        .map(|i| Tuple4D::point((i % 4) as f64, 0.0, (i / 4) as f64))
        .collect();

    // Row means are 0, 1, 1, 1: running means 0, 0.5, 0.6667, 0.75.
    let (mean, taken) = adaptive_mean(&positions, 4, 0.2, |p| {
        if p.z == 0.0 { Color::black() } else { Color::white() }
    });

    assert_eq!(taken, 12);
    assert_eq!(mean, Color::rgb(0.66667, 0.66667, 0.66667));
}
