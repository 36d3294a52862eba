use std::io::{ self, Write, BufWriter };
use std::fs::File;
use std::path::Path;

use crate::color::Color;
use crate::render::TileResult;

/// Longest line allowed in a PPM file.
const PPM_LINE_WIDTH: usize = 70;

/// A 2D grid of colors, stored row-major.
///
/// The canvas is the destination of a render, and doubles as the decoded
/// pixel grid fed to image textures.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a black canvas.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Wraps an already decoded, row-major pixel buffer.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color>)
        -> Option<Canvas> {
        if pixels.len() != width * height {
            return None;
        }

        Some(Canvas { width, height, pixels })
    }

    /// Writes a color at column `x`, row `y`. Out-of-bounds writes are
    /// ignored.
    ///
    /// ```
    /// # use tiled_ray_tracer::color::Color;
    /// # use tiled_ray_tracer::canvas::Canvas;
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &Color::red());
    /// assert_eq!(canvas.read_pixel(4, 2), Some(Color::red()));
    /// assert_eq!(canvas.read_pixel(8, 2), None);
    /// ```
    pub fn write_pixel(&mut self, x: usize, y: usize, pixel: &Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *pixel;
    }

    /// Reads the color at column `x`, row `y`, or `None` when out of bounds.
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Reads a pixel with coordinates clamped to the canvas edges. Used for
    /// texture lookups, where rounding may land one past the last column.
    pub fn pixel_at(&self, x: usize, y: usize) -> Color {
        if self.pixels.is_empty() {
            return Color::black();
        }

        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels[(y * self.width) + x]
    }

    /// Copies a rendered tile into place at its recorded origin.
    ///
    /// Tiles never overlap, so the order in which they arrive does not
    /// matter.
    pub fn write_tile(&mut self, tile: &TileResult) {
        for row in 0..tile.height {
            for col in 0..tile.width {
                let color = tile.pixels[row * tile.width + col];
                self.write_pixel(tile.origin_x + col, tile.origin_y + row, &color);
            }
        }
    }

    /// Writes the canvas as a plain (P3) PPM image.
    ///
    /// Each row of pixels starts a new line, and lines are wrapped so that
    /// none exceeds 70 columns.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        for row in self.pixels.chunks(self.width.max(1)) {
            let mut line = String::new();

            for value in row.iter().flat_map(|c| c.to_rgb8()) {
                let token = value.to_string();

                if !line.is_empty() && line.len() + 1 + token.len() > PPM_LINE_WIDTH {
                    writeln!(out, "{}", line)?;
                    line.clear();
                }

                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(&token);
            }

            writeln!(out, "{}", line)?;
        }

        Ok(())
    }

    /// Saves the canvas to a PPM file.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.width, 10);
    assert_eq!(c.height, 20);
    assert!(c.pixels.iter().all(|p| *p == Color::black()));
}

#[test]
fn from_pixels_checks_length() {
    assert!(Canvas::from_pixels(2, 2, vec![Color::white(); 3]).is_none());

    let c = Canvas::from_pixels(2, 1, vec![Color::red(), Color::blue()]).unwrap();
    assert_eq!(c.read_pixel(1, 0), Some(Color::blue()));
}

#[test]
fn pixel_at_clamps_to_edges() {
    let c = Canvas::from_pixels(2, 1, vec![Color::red(), Color::blue()]).unwrap();

    assert_eq!(c.pixel_at(5, 3), Color::blue());
}

#[test]
fn ppm_header_and_pixels() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0));

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "P3");
    assert_eq!(lines[1], "5 3");
    assert_eq!(lines[2], "255");
    assert_eq!(lines[3], "255 0 0 0 0 0 0 0 0 0 0 0 0 0 0");
    assert_eq!(lines[4], "0 0 0 0 0 0 0 128 0 0 0 0 0 0 0");
    assert_eq!(lines[5], "0 0 0 0 0 0 0 0 0 0 0 0 0 0 255");
    assert!(text.ends_with('\n'));
}

#[test]
fn ppm_lines_wrap_at_70_columns() {
    let c = Canvas::from_pixels(10, 2, vec![Color::rgb(1.0, 0.8, 0.6); 20]).unwrap();

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[3],
        "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204");
    assert_eq!(lines[4], "153 255 204 153 255 204 153 255 204 153 255 204 153");
    assert!(lines.iter().all(|l| l.len() <= 70));
}
