use rand::RngCore;

use crate::config::RenderConfig;
use crate::consts::MAX_RECURSION_DEPTH;
use crate::error::Result;
use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::material::Material;
use crate::shape::{ SceneGraph, Shape, ShapeId };
use crate::intersect::{ Intersections, IntersectionComputation };
use crate::light::{ Light, PointLight, AreaLight, diffuse_specular, adaptive_mean };

// Half thickness of the panel drawn for a visible area light
const LIGHT_PANEL_THICKNESS: f64 = 0.01;

/// A world with objects and lights.
///
/// Objects live in a `SceneGraph`; only its roots are intersected directly,
/// groups and CSG nodes take care of their own children.
///
/// Worlds collect all objects as well as lights for rendering. Most logic is
/// performed within worlds for the ray tracer. Once a render starts the world
/// is only read, and every method that needs randomness takes the generator
/// as an argument.
#[derive(Clone, Debug)]
pub struct World {
    pub graph: SceneGraph,
    pub lights: Vec<Light>,

    /// Scales the ambient term of every light.
    pub ambient: f64,

    /// Recursion depth given to primary rays.
    pub max_depth: usize,

    /// Early-exit tolerance for area light sampling.
    pub adaptive_sensitivity: f64,
}

impl Default for World {
    /// The two-sphere test world: a unit sphere with a greenish material and
    /// a half-size default sphere inside it, lit from the upper left.
    fn default() -> World {
        let mut w = World::empty();
        w.lights.push(Light::Point(PointLight::new(
            Color::rgb(1.0, 1.0, 1.0),
            Tuple4D::point(-10.0, 10.0, -10.0),
        )));

        let m1 = Material {
            color: Color::rgb(0.8, 1.0, 0.6),
            diffuse: 0.7,
            specular: 0.2,
            ..Default::default()
        };
        w.add_object(Shape::sphere().with_material(m1));

        let mut s2 = Shape::sphere();
        s2.set_transform(Matrix4D::scaling(0.5, 0.5, 0.5))
            .expect("Scaling by one half is invertible.");
        w.add_object(s2);

        w
    }
}

impl World {
    /// Creates a default world with two spheres.
    pub fn new() -> World {
        Default::default()
    }

    /// Creates a world with no objects and no lights.
    pub fn empty() -> World {
        World {
            graph: SceneGraph::new(),
            lights: Vec::new(),
            ambient: 1.0,
            max_depth: MAX_RECURSION_DEPTH,
            adaptive_sensitivity: 0.0,
        }
    }

    /// Adds a shape as a top-level object.
    pub fn add_object(&mut self, shape: Shape) -> ShapeId {
        self.graph.insert_root(shape)
    }

    /// Marks a shape already in the graph (typically a group or CSG node) as
    /// a top-level object.
    pub fn add_root(&mut self, id: ShapeId) -> Result<()> {
        self.graph.add_root(id)
    }

    /// Adds a light. A visible area light also adds a thin glowing panel
    /// that casts no shadow, which fails if the light is degenerate.
    pub fn add_light(&mut self, light: Light) -> Result<()> {
        if let Light::Area(ref area) = light {
            if area.visible {
                let panel = light_panel(area)?;
                self.add_object(panel);
            }
        }

        self.lights.push(light);
        Ok(())
    }

    /// Applies the quality settings of a render job.
    pub fn configure(&mut self, config: &RenderConfig) {
        self.max_depth = config.max_depth;
        self.adaptive_sensitivity = config.adaptive_sensitivity;

        for light in self.lights.iter_mut() {
            if let Light::Area(area) = *light {
                if !config.area_lights {
                    *light = Light::Point(
                        PointLight::new(area.intensity, area.position));
                } else if config.area_light_resolution > 0 {
                    let n = config.area_light_resolution;
                    *light = Light::Area(area.with_resolution(n, n));
                }
            }
        }
    }

    /// Intersects a ray against all objects in a world.
    pub fn intersect(&self, r: &Ray4D) -> Intersections {
        Intersections::aggregate(
            self.graph.roots().iter().map(|&id| self.graph.intersect(id, r))
        )
    }

    /// Determines whether something between `p` and `light_position` blocks
    /// the light. Shapes that opt out of casting shadows are ignored.
    pub fn is_shadowed(&self, p: Tuple4D, light_position: Tuple4D) -> bool {
        let v = light_position - p;
        let distance = v.magnitude();
        let direction = v.normalize();

        let r = Ray4D::new(p, direction);
        self.intersect(&r).iter().any(|i|
            i.t > 0.0 && i.t < distance && self.graph.casts_shadow(i.what)
        )
    }

    /// The fraction of a light's samples visible from `p`, between 0 and 1.
    pub fn intensity_at(&self, light: &Light, p: Tuple4D,
        rng: &mut dyn RngCore) -> f64 {
        let positions = light.sample_positions(rng);
        let lit = positions.iter()
            .filter(|&&pos| !self.is_shadowed(p, pos))
            .count();

        lit as f64 / positions.len() as f64
    }

    /// The Phong contribution of one light at a surface point.
    ///
    /// The ambient term is always present. Diffuse and specular terms are
    /// averaged over the light's samples, a shadowed sample contributing
    /// nothing. With a nonzero adaptive sensitivity, area lights may stop
    /// sampling early.
    pub fn light_contribution(&self, light: &Light, m: &Material, color: Color,
        point: Tuple4D, eyev: Tuple4D, normalv: Tuple4D,
        rng: &mut dyn RngCore) -> Color {
        let intensity = light.intensity();
        let effective_color = color * intensity;
        let ambient = effective_color * m.ambient * self.ambient;

        let positions = light.sample_positions(rng);
        let (lit, _) = adaptive_mean(&positions, light.row_len(),
            self.adaptive_sensitivity, |position| {
                if self.is_shadowed(point, position) {
                    Color::black()
                } else {
                    diffuse_specular(m, effective_color, intensity, position,
                        point, eyev, normalv)
                }
            });

        ambient + lit
    }

    /// Calculates the color for a hit, based on shadows, lights, reflection
    /// and refraction.
    pub fn shade_hit(&self, comps: &IntersectionComputation, remaining: usize,
        rng: &mut dyn RngCore) -> Color {
        let m = self.graph.material(comps.obj);
        let color = match m.pattern {
            Some(ref p) => p.color_at(&self.graph, comps.obj, comps.over_point),
            None => m.color,
        };

        let mut surface = Color::black();
        for light in self.lights.iter() {
            surface += self.light_contribution(light, m, color,
                comps.over_point, comps.eyev, comps.normalv, rng);
        }

        let reflected = self.reflected_color(comps, remaining, rng);
        let refracted = self.refracted_color(comps, remaining, rng);

        if m.reflective > 0.0 && m.transparency > 0.0 {
            let reflectance = comps.schlick();
            surface + reflected * reflectance + refracted * (1.0 - reflectance)
        } else {
            surface + reflected + refracted
        }
    }

    /// Determines a color based on the intersection of a ray and the objects.
    /// Rays that hit nothing are black.
    pub fn color_at(&self, r: &Ray4D, remaining: usize,
        rng: &mut dyn RngCore) -> Color {
        let xs = self.intersect(r);

        match xs.hit() {
            None => Color::black(),
            Some(hit) => {
                let comps = IntersectionComputation::new(
                    &self.graph, r, &hit, Some(&xs));
                self.shade_hit(&comps, remaining, rng)
            },
        }
    }

    /// The color seen in a reflective surface, scaled by its reflectivity.
    pub fn reflected_color(&self, comps: &IntersectionComputation,
        remaining: usize, rng: &mut dyn RngCore) -> Color {
        let reflective = self.graph.material(comps.obj).reflective;
        if remaining == 0 || reflective == 0.0 {
            return Color::black();
        }

        let r = Ray4D::new(comps.over_point, comps.reflectv);
        self.color_at(&r, remaining - 1, rng) * reflective
    }

    /// The color seen through a transparent surface, scaled by its
    /// transparency. Total internal reflection lets nothing through.
    pub fn refracted_color(&self, comps: &IntersectionComputation,
        remaining: usize, rng: &mut dyn RngCore) -> Color {
        let transparency = self.graph.material(comps.obj).transparency;
        if remaining == 0 || transparency == 0.0 {
            return Color::black();
        }

        // Snell's law
        let n_ratio = comps.n1 / comps.n2;
        let cos_i = comps.eyev.dot(&comps.normalv);
        let sin2_t = n_ratio.powi(2) * (1.0 - cos_i.powi(2));
        if sin2_t > 1.0 {
            return Color::black();
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        let direction = comps.normalv * (n_ratio * cos_i - cos_t)
            - comps.eyev * n_ratio;

        let r = Ray4D::new(comps.under_point, direction);
        self.color_at(&r, remaining - 1, rng) * transparency
    }
}

/// A flat box covering an area light, glowing with the light's intensity.
fn light_panel(light: &AreaLight) -> Result<Shape> {
    let u = light.full_uvec() / 2.0;
    let v = light.full_vvec() / 2.0;
    let n = u.cross(&v).normalize() * LIGHT_PANEL_THICKNESS;
    let c = light.position;

    // Maps the unit cube's x and z onto the light's sides.
    let m = Matrix4D::from([
        u.x, n.x, v.x, c.x,
        u.y, n.y, v.y, c.y,
        u.z, n.z, v.z, c.z,
        0.0, 0.0, 0.0, 1.0,
    ]);

    let material = Material {
        color: light.intensity,
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,
        ..Default::default()
    };

    Ok(Shape::cube()
        .with_transform(m)?
        .with_material(material)
        .with_shadow(false))
}

#[cfg(test)]
use rand::{ SeedableRng, rngs::StdRng };
#[cfg(test)]
use crate::intersect::Intersection;

#[cfg(test)]
fn test_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

#[cfg(test)]
fn default_world_ids(w: &World) -> (ShapeId, ShapeId) {
    (w.graph.roots()[0], w.graph.roots()[1])
}

#[cfg(test)]
fn shade_single_hit(w: &World, r: &Ray4D, i: Intersection) -> Color {
    let xs = Intersections::from(vec![i]);
    let comps = IntersectionComputation::new(&w.graph, r, &i, Some(&xs));
    w.shade_hit(&comps, MAX_RECURSION_DEPTH, &mut test_rng())
}

#[test]
fn intersect_default_world_with_ray() {
    let w: World = Default::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let is = w.intersect(&r);

    assert_eq!(is.len(), 4);
    assert_eq!(is[0].t, 4.0);
    assert_eq!(is[1].t, 4.5);
    assert_eq!(is[2].t, 5.5);
    assert_eq!(is[3].t, 6.0);
}

#[test]
fn shade_intersection_from_outside() {
    let w: World = Default::default();
    let (outer, _) = default_world_ids(&w);
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    let c = shade_single_hit(&w, &r, Intersection::new(4.0, outer));
    assert_eq!(c, Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn shade_intersection_from_inside() {
    let mut w: World = Default::default();
    let (_, inner) = default_world_ids(&w);
    w.lights = vec![Light::Point(PointLight::new(
        Color::rgb(1.0, 1.0, 1.0),
        Tuple4D::point(0.0, 0.25, 0.0),
    ))];

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let c = shade_single_hit(&w, &r, Intersection::new(0.5, inner));
    assert_eq!(c, Color::rgb(0.90495, 0.90495, 0.90495));
}

#[test]
fn shade_intersection_in_shadow() {
    let mut w: World = World::empty();
    w.lights.push(Light::Point(PointLight::new(
        Color::rgb(1.0, 1.0, 1.0),
        Tuple4D::point(0.0, 0.0, -10.0),
    )));

    w.add_object(Shape::sphere());
    let s2 = w.add_object(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 10.0)).unwrap());

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let c = shade_single_hit(&w, &r, Intersection::new(4.0, s2));
    assert_eq!(c, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn world_ambient_scales_ambient_term() {
    let mut w: World = World::empty();
    w.ambient = 0.5;
    w.lights.push(Light::Point(PointLight::new(
        Color::rgb(1.0, 1.0, 1.0),
        Tuple4D::point(0.0, 0.0, -10.0),
    )));

    w.add_object(Shape::sphere());
    let s2 = w.add_object(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 10.0)).unwrap());

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let c = shade_single_hit(&w, &r, Intersection::new(4.0, s2));
    assert_eq!(c, Color::rgb(0.05, 0.05, 0.05));
}

#[test]
fn non_shadow_casting_shape_lets_light_through() {
    let mut w: World = World::empty();
    w.lights.push(Light::Point(PointLight::new(
        Color::rgb(1.0, 1.0, 1.0),
        Tuple4D::point(0.0, 0.0, -10.0),
    )));

    w.add_object(Shape::sphere().with_shadow(false));
    assert!(!w.is_shadowed(Tuple4D::point(0.0, 0.0, 10.0),
        Tuple4D::point(0.0, 0.0, -10.0)));
}

#[test]
fn color_ray_miss() {
    let w: World = Default::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    );

    assert_eq!(w.color_at(&r, MAX_RECURSION_DEPTH, &mut test_rng()),
        Color::black());
}

#[test]
fn color_ray_hit() {
    let w: World = Default::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    assert_eq!(w.color_at(&r, MAX_RECURSION_DEPTH, &mut test_rng()),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn color_behind_ray() {
    let mut w: World = Default::default();
    let (outer, inner) = default_world_ids(&w);
    for id in [outer, inner] {
        let m = w.graph.material(id).clone();
        w.graph.get_mut(id).unwrap().material = Some(Material { ambient: 1.0, ..m });
    }

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.75),
        Tuple4D::vector(0.0, 0.0, -1.0)
    );

    let inner_color = w.graph.material(inner).color;
    assert_eq!(w.color_at(&r, MAX_RECURSION_DEPTH, &mut test_rng()), inner_color);
}

#[cfg(test)]
fn default_light_position() -> Tuple4D {
    Tuple4D::point(-10.0, 10.0, -10.0)
}

#[test]
fn shadow_collinear_point_and_light() {
    let w: World = Default::default();
    let p = Tuple4D::point(0.0, 10.0, 0.0);

    assert!(!w.is_shadowed(p, default_light_position()));
}

#[test]
fn shadow_light_between_point_and_spheres() {
    let w: World = Default::default();
    let p = Tuple4D::point(10.0, -10.0, 10.0);

    assert!(w.is_shadowed(p, default_light_position()));
}

#[test]
fn shadow_object_behind_light() {
    let w: World = Default::default();
    let p = Tuple4D::point(-20.0, 20.0, -20.0);

    assert!(!w.is_shadowed(p, default_light_position()));
}

#[test]
fn shadow_object_behind_point() {
    let w: World = Default::default();
    let p = Tuple4D::point(-2.0, 2.0, -2.0);

    assert!(!w.is_shadowed(p, default_light_position()));
}

#[cfg(test)]
fn world_with_floor(floor: Material) -> (World, ShapeId) {
    let mut w: World = Default::default();
    let floor = w.add_object(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap()
        .with_material(floor));

    (w, floor)
}

#[cfg(test)]
fn ray_towards_floor() -> Ray4D {
    let half = 2f64.sqrt() / 2.0;
    Ray4D::new(
        Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -half, half),
    )
}

#[test]
fn reflected_color_of_nonreflective_material() {
    let mut w: World = Default::default();
    let (_, inner) = default_world_ids(&w);
    w.graph.get_mut(inner).unwrap().material =
        Some(Material { ambient: 1.0, ..Default::default() });

    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(1.0, inner);
    let comps = IntersectionComputation::new(&w.graph, &r, &i, None);

    assert_eq!(w.reflected_color(&comps, MAX_RECURSION_DEPTH, &mut test_rng()),
        Color::black());
}

#[test]
fn reflected_color_of_reflective_material() {
    let (w, floor) = world_with_floor(
        Material { reflective: 0.5, ..Default::default() });
    let r = ray_towards_floor();
    let i = Intersection::new(2f64.sqrt(), floor);
    let comps = IntersectionComputation::new(&w.graph, &r, &i, None);

    assert_eq!(w.reflected_color(&comps, MAX_RECURSION_DEPTH, &mut test_rng()),
        Color::rgb(0.19035, 0.23793, 0.14276));
}

#[test]
fn shade_hit_with_reflective_material() {
    let (w, floor) = world_with_floor(
        Material { reflective: 0.5, ..Default::default() });
    let r = ray_towards_floor();

    let c = shade_single_hit(&w, &r, Intersection::new(2f64.sqrt(), floor));
    assert_eq!(c, Color::rgb(0.87677, 0.92436, 0.82918));
}

#[test]
fn reflected_color_at_maximum_depth() {
    let (w, floor) = world_with_floor(
        Material { reflective: 0.5, ..Default::default() });
    let r = ray_towards_floor();
    let i = Intersection::new(2f64.sqrt(), floor);
    let comps = IntersectionComputation::new(&w.graph, &r, &i, None);

    assert_eq!(w.reflected_color(&comps, 0, &mut test_rng()), Color::black());
}

#[test]
fn mutually_reflective_surfaces_terminate() {
    let mut w = World::empty();
    w.lights.push(Light::Point(PointLight::new(Color::white(), Tuple4D::origin())));

    let mirror = Material { reflective: 1.0, ..Default::default() };
    w.add_object(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap()
        .with_material(mirror.clone()));
    w.add_object(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0)).unwrap()
        .with_material(mirror));

    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 1.0, 0.0));
    let c = w.color_at(&r, MAX_RECURSION_DEPTH, &mut test_rng());

    assert!(c.r.is_finite() && c.r > 0.0);
}

#[test]
fn refracted_color_of_opaque_surface() {
    let w: World = Default::default();
    let (outer, _) = default_world_ids(&w);
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = Intersections::from(vec![
        Intersection::new(4.0, outer),
        Intersection::new(6.0, outer),
    ]);
    let comps = IntersectionComputation::new(&w.graph, &r, &xs[0], Some(&xs));

    assert_eq!(w.refracted_color(&comps, 5, &mut test_rng()), Color::black());
}

#[test]
fn refracted_color_at_maximum_depth() {
    let mut w: World = Default::default();
    let (outer, _) = default_world_ids(&w);
    let m = w.graph.material(outer).clone();
    w.graph.get_mut(outer).unwrap().material =
        Some(Material { transparency: 1.0, refractive_index: 1.5, ..m });

    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = Intersections::from(vec![
        Intersection::new(4.0, outer),
        Intersection::new(6.0, outer),
    ]);
    let comps = IntersectionComputation::new(&w.graph, &r, &xs[0], Some(&xs));

    assert_eq!(w.refracted_color(&comps, 0, &mut test_rng()), Color::black());
}

#[test]
fn refracted_color_under_total_internal_reflection() {
    let mut w: World = Default::default();
    let (outer, _) = default_world_ids(&w);
    let m = w.graph.material(outer).clone();
    w.graph.get_mut(outer).unwrap().material =
        Some(Material { transparency: 1.0, refractive_index: 1.5, ..m });

    let half = 2f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, half), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs = Intersections::from(vec![
        Intersection::new(-half, outer),
        Intersection::new(half, outer),
    ]);

    // Inside the sphere, so the second intersection is the one to look at.
    let comps = IntersectionComputation::new(&w.graph, &r, &xs[1], Some(&xs));
    assert_eq!(w.refracted_color(&comps, 5, &mut test_rng()), Color::black());
}

#[cfg(test)]
fn world_with_glass_floor(floor: Material) -> (World, ShapeId) {
    let (mut w, floor) = world_with_floor(floor);
    w.add_object(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, -3.5, -0.5)).unwrap()
        .with_material(Material {
            color: Color::rgb(1.0, 0.0, 0.0),
            ambient: 0.5,
            ..Default::default()
        }));

    (w, floor)
}

#[test]
fn shade_hit_with_transparent_material() {
    let (w, floor) = world_with_glass_floor(Material {
        transparency: 0.5,
        refractive_index: 1.5,
        ..Default::default()
    });
    let r = ray_towards_floor();

    let c = shade_single_hit(&w, &r, Intersection::new(2f64.sqrt(), floor));
    assert_eq!(c, Color::rgb(0.93642, 0.68642, 0.68642));
}

#[test]
fn shade_hit_with_reflective_transparent_material() {
    let (w, floor) = world_with_glass_floor(Material {
        reflective: 0.5,
        transparency: 0.5,
        refractive_index: 1.5,
        ..Default::default()
    });
    let r = ray_towards_floor();

    let c = shade_single_hit(&w, &r, Intersection::new(2f64.sqrt(), floor));
    assert_eq!(c, Color::rgb(0.93391, 0.69643, 0.69243));
}

#[cfg(test)]
fn square_area_light() -> Light {
    Light::Area(AreaLight::new(
        Tuple4D::point(-0.5, -0.5, -5.0),
        Tuple4D::vector(1.0, 0.0, 0.0), 2,
        Tuple4D::vector(0.0, 1.0, 0.0), 2,
        Color::white(),
    ).with_jitter(false))
}

#[test]
fn point_light_intensity_is_all_or_nothing() {
    let w: World = Default::default();
    let light = w.lights[0];

    let cases = [
        (Tuple4D::point(0.0, 1.0001, 0.0), 1.0),
        (Tuple4D::point(-1.0001, 0.0, 0.0), 1.0),
        (Tuple4D::point(0.0, 0.0, -1.0001), 1.0),
        (Tuple4D::point(0.0, 0.0, 1.0001), 0.0),
        (Tuple4D::point(1.0001, 0.0, 0.0), 0.0),
        (Tuple4D::point(0.0, -1.0001, 0.0), 0.0),
        (Tuple4D::point(0.0, 0.0, 0.0), 0.0),
    ];

    for (p, expected) in cases {
        assert_eq!(w.intensity_at(&light, p, &mut test_rng()), expected);
    }
}

#[test]
fn area_light_intensity_is_partial() {
    let w: World = Default::default();
    let light = square_area_light();

    let cases = [
        (Tuple4D::point(0.0, 0.0, 2.0), 0.0),
        (Tuple4D::point(1.0, -1.0, 2.0), 0.25),
        (Tuple4D::point(1.5, 0.0, 2.0), 0.5),
        (Tuple4D::point(1.25, 1.25, 3.0), 0.75),
        (Tuple4D::point(0.0, 0.0, -2.0), 1.0),
    ];

    for (p, expected) in cases {
        assert_eq!(w.intensity_at(&light, p, &mut test_rng()), expected);
    }
}

#[test]
fn lighting_samples_the_area_light() {
    let w = World::empty();
    let light = square_area_light();
    let m = Material { ambient: 0.1, diffuse: 0.9, specular: 0.0, ..Default::default() };
    let eye = Tuple4D::point(0.0, 0.0, -5.0);

    let cases = [
        (Tuple4D::point(0.0, 0.0, -1.0), 0.99650),
        (Tuple4D::point(0.0, 0.7071, -0.7071), 0.62319),
    ];

    for (p, expected) in cases {
        let eyev = (eye - p).normalize();
        let normalv = p.as_vector();
        let c = w.light_contribution(&light, &m, Color::white(), p, eyev, normalv,
            &mut test_rng());

        assert_eq!(c, Color::rgb(expected, expected, expected));
    }
}

#[test]
fn visible_area_light_adds_glowing_panel() {
    let mut w = World::empty();
    let light = AreaLight::from_transform(&Matrix4D::translation(0.0, 3.0, 0.0),
        2, 2, Color::white()).with_visibility(true);
    w.add_light(Light::Area(light)).unwrap();

    assert_eq!(w.graph.roots().len(), 1);
    let panel = w.graph.roots()[0];
    assert!(!w.graph.casts_shadow(panel));

    // Looking straight up at the panel from below.
    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs = w.intersect(&r);
    assert_eq!(xs.hit().map(|i| i.what), Some(panel));
    assert_eq!(w.color_at(&r, 1, &mut test_rng()), Color::white());

    // The panel does not darken what is under it.
    assert!(!w.is_shadowed(Tuple4D::origin(), light.position));
}

#[test]
fn degenerate_visible_light_is_rejected() {
    let mut w = World::empty();
    let light = AreaLight::new(Tuple4D::origin(),
        Tuple4D::vector(1.0, 0.0, 0.0), 2,
        Tuple4D::vector(2.0, 0.0, 0.0), 2,
        Color::white()).with_visibility(true);

    assert!(w.add_light(Light::Area(light)).is_err());
    assert!(w.lights.is_empty());
}

#[test]
fn configure_collapses_area_lights() {
    let mut w: World = Default::default();
    w.add_light(square_area_light()).unwrap();

    let config = RenderConfig {
        area_lights: false,
        max_depth: 2,
        adaptive_sensitivity: 0.1,
        ..Default::default()
    };
    w.configure(&config);

    assert_eq!(w.max_depth, 2);
    assert_eq!(w.adaptive_sensitivity, 0.1);
    assert_eq!(w.lights[1], Light::Point(PointLight::new(Color::white(),
        Tuple4D::point(0.0, 0.0, -5.0))));
}

#[test]
fn configure_overrides_area_light_resolution() {
    let mut w: World = Default::default();
    w.add_light(square_area_light()).unwrap();

    w.configure(&RenderConfig { area_light_resolution: 4, ..Default::default() });

    assert_eq!(w.lights[0].samples(), 1);
    assert_eq!(w.lights[1].samples(), 16);
}
