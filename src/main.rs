use std::path::PathBuf;
use std::process;

use clap::{ Parser, ValueEnum };
use log::{ error, info };

use tiled_ray_tracer::Result;
use tiled_ray_tracer::config::RenderConfig;
use tiled_ray_tracer::render::{ render_parallel, CancelToken };

mod demo;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SceneName {
    Spheres,
    Csg,
    Glass,
    Hexagon,
    Textures,
}

/// Renders one of the built-in scenes to a PPM image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Scene to render
    #[clap(long, value_enum, default_value = "spheres")]
    scene: SceneName,

    /// Image width in pixels
    #[clap(long, default_value_t = 640)]
    width: usize,

    /// Image height in pixels
    #[clap(long, default_value_t = 360)]
    height: usize,

    /// JSON render configuration
    #[clap(long)]
    config: Option<PathBuf>,

    /// Worker threads, overriding the configuration
    #[clap(long)]
    threads: Option<usize>,

    /// Tile edge length in pixels, overriding the configuration
    #[clap(long)]
    tile_size: Option<usize>,

    /// Where to write the image
    #[clap(short, long, default_value = "out.ppm")]
    output: PathBuf,
}

fn run(args: Args) -> Result<()> {
    let mut config = match args.config {
        Some(ref path) => RenderConfig::from_json_file(path)?,
        None => RenderConfig::default(),
    };
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(tile_size) = args.tile_size {
        config.tile_size = tile_size;
    }
    config.validate()?;

    let build = match args.scene {
        SceneName::Spheres => demo::spheres,
        SceneName::Csg => demo::csg,
        SceneName::Glass => demo::glass,
        SceneName::Hexagon => demo::hexagon,
        SceneName::Textures => demo::textures,
    };
    let (mut world, mut camera) = build(args.width, args.height)?;
    world.configure(&config);
    camera.configure(&config);

    info!("Scene {:?}: {} shapes, {} lights",
        args.scene, world.graph.len(), world.lights.len());

    let canvas = render_parallel(world, camera, &config, &CancelToken::new())?;
    canvas.save(&args.output)?;
    info!("Saved render to {}", args.output.display());

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    if let Err(e) = run(Args::parse()) {
        error!("{}", e);
        process::exit(1);
    }
}
