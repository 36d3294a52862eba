pub mod consts;
pub mod error;

pub mod tuple;
pub mod matrix;
pub mod transform;
pub mod ray;

pub mod bounds;
pub mod geometry;
pub mod intersect;
pub mod csg;
pub mod shape;

pub mod color;
pub mod canvas;
pub mod material;
pub mod pattern;
pub mod uv;

pub mod light;
pub mod world;
pub mod camera;

pub mod config;
pub mod render;

pub use error::{ RenderError, Result };
