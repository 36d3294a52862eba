use std::iter::Sum;
use std::ops::{ Add, AddAssign, Sub, Mul, Div };

use crate::consts::feq;

/// A linear RGB color.
///
/// Components nominally range from 0.0 to 1.0, but intermediate shading
/// results routinely exceed 1.0; clamping happens only when pixels are
/// written out.
///
/// # Examples
///
/// ```
/// # use tiled_ray_tracer::color::Color;
/// let yellow = Color::rgb(1.0, 1.0, 0.0);
/// let purple = Color::rgb(1.0, 0.0, 1.0);
///
/// assert_eq!(yellow * purple, Color::red());
/// assert_eq!(yellow + purple, Color::rgb(2.0, 1.0, 1.0));
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Colors are compared component-wise within floating point tolerance.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    pub fn black() -> Color {
        Color::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Color {
        Color::rgb(1.0, 1.0, 1.0)
    }

    pub fn red() -> Color {
        Color::rgb(1.0, 0.0, 0.0)
    }

    pub fn green() -> Color {
        Color::rgb(0.0, 1.0, 0.0)
    }

    pub fn blue() -> Color {
        Color::rgb(0.0, 0.0, 1.0)
    }

    /// The Hadamard (component-wise) product of two colors.
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        Color::rgb(c1.r * c2.r, c1.g * c2.g, c1.b * c2.b)
    }

    /// The largest absolute per-channel difference between two colors.
    pub fn max_difference(&self, other: &Color) -> f64 {
        (self.r - other.r).abs()
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
    }

    /// Scales each channel to `0..=255`, clamping out-of-range values.
    pub fn to_rgb8(&self) -> [u8; 3] {
        let scale = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        [scale(self.r), scale(self.g), scale(self.b)]
    }

    /// The arithmetic mean of a set of colors; black for an empty set.
    pub fn mean(colors: &[Color]) -> Color {
        if colors.is_empty() {
            return Color::black();
        }

        colors.iter().copied().sum::<Color>() / colors.len() as f64
    }
}

impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Color {
        Color::rgb(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl AddAssign<Color> for Color {
    fn add_assign(&mut self, other: Color) {
        *self = *self + other;
    }
}

impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Color {
        Color::rgb(self.r - other.r, self.g - other.g, self.b - other.b)
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, s: f64) -> Color {
        Color::rgb(self.r * s, self.g * s, self.b * s)
    }
}

impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, c: Color) -> Color {
        c * self
    }
}

/// Shorthand for `Color::hadamard`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Color {
        Color::hadamard(&self, &other)
    }
}

impl Div<f64> for Color {
    type Output = Color;

    fn div(self, s: f64) -> Color {
        Color::rgb(self.r / s, self.g / s, self.b / s)
    }
}

impl Sum for Color {
    fn sum<I: Iterator<Item = Color>>(iter: I) -> Color {
        iter.fold(Color::black(), |acc, c| acc + c)
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 + c2, Color::rgb(1.6, 0.7, 1.0));
}

#[test]
fn subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);

    assert_eq!(c1 - c2, Color::rgb(0.2, 0.5, 0.5));
}

#[test]
fn scale_colors() {
    let c = Color::rgb(0.2, 0.3, 0.4);

    assert_eq!(c * 2.0, Color::rgb(0.4, 0.6, 0.8));
    assert_eq!(2.0 * c, Color::rgb(0.4, 0.6, 0.8));
    assert_eq!(c / 2.0, Color::rgb(0.1, 0.15, 0.2));
}

#[test]
fn multiply_colors() {
    let c1 = Color::rgb(1.0, 0.2, 0.4);
    let c2 = Color::rgb(0.9, 1.0, 0.1);

    assert_eq!(c1 * c2, Color::rgb(0.9, 0.2, 0.04));
}

#[test]
fn mean_of_colors() {
    let colors = [Color::red(), Color::blue(), Color::white(), Color::black()];

    assert_eq!(Color::mean(&colors), Color::rgb(0.5, 0.25, 0.5));
    assert_eq!(Color::mean(&[]), Color::black());
}

#[test]
fn rgb8_clamps() {
    assert_eq!(Color::rgb(1.5, 0.5, -0.5).to_rgb8(), [255, 128, 0]);
}
