use crate::color::Color;
use crate::consts::GLASS_RI;
use crate::pattern::Pattern;

/// The material used by shapes that neither set one nor inherit one.
pub static DEFAULT_MATERIAL: Material = Material {
    color: Color { r: 1.0, g: 1.0, b: 1.0 },
    pattern: None,

    ambient: 0.1,
    diffuse: 0.9,
    specular: 0.9,
    shininess: 200.0,

    reflective: 0.0,
    refractive_index: 1.0,
    transparency: 0.0,
};

/// A material record.
///
/// Materials use attributes from the Phong reflection model; ambient, diffuse,
/// specular and shininess. A pattern, when present, overrides `color`.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub pattern: Option<Pattern>,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,

    pub reflective: f64,
    pub refractive_index: f64,
    pub transparency: f64,
}

impl Default for Material {
    fn default() -> Material {
        DEFAULT_MATERIAL.clone()
    }
}

impl Material {
    /// A fully transparent material with the refractive index of glass.
    pub fn glass() -> Material {
        Material {
            transparency: 1.0,
            refractive_index: GLASS_RI,
            ..Default::default()
        }
    }

    pub fn with_color(self, color: Color) -> Material {
        Material { color, ..self }
    }

    pub fn with_pattern(self, pattern: Pattern) -> Material {
        Material { pattern: Some(pattern), ..self }
    }
}

#[test]
fn default_material() {
    let m = Material::default();

    assert_eq!(m.color, Color::white());
    assert_eq!(m.ambient, 0.1);
    assert_eq!(m.diffuse, 0.9);
    assert_eq!(m.specular, 0.9);
    assert_eq!(m.shininess, 200.0);
    assert_eq!(m.reflective, 0.0);
    assert_eq!(m.transparency, 0.0);
    assert_eq!(m.refractive_index, 1.0);
    assert!(m.pattern.is_none());
}

#[test]
fn glass_material() {
    let m = Material::glass();

    assert_eq!(m.transparency, 1.0);
    assert_eq!(m.refractive_index, GLASS_RI);
}
