use std::collections::{ HashMap, VecDeque };
use std::panic::{ self, AssertUnwindSafe };
use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::mpsc::{ self, RecvTimeoutError };
use std::sync::{ Arc, Mutex };
use std::thread;
use std::time::{ Duration, Instant };

use log::{ debug, info, warn };
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::RenderConfig;
use crate::error::{ RenderError, Result };
use crate::world::World;

// How often the dispatcher checks for cancellation while waiting on workers
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A rectangular region of the image to render.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileRequest {
    pub origin_x: usize,
    pub origin_y: usize,
    pub width: usize,
    pub height: usize,
}

/// The rendered pixels of one tile, row-major, tagged with where they go.
#[derive(Clone, Debug, PartialEq)]
pub struct TileResult {
    pub origin_x: usize,
    pub origin_y: usize,
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
}

impl TileRequest {
    pub fn new(origin_x: usize, origin_y: usize, width: usize, height: usize)
        -> TileRequest {
        TileRequest { origin_x, origin_y, width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Seed for the tile's random generator. Every render of the same tile
    /// draws the same jitter.
    fn seed(&self) -> u64 {
        ((self.origin_y as u64) << 32) ^ self.origin_x as u64
    }
}

/// Cuts a `width` by `height` image into tiles of at most `tile_size`
/// pixels on a side, row by row. Tiles on the right and bottom edges are
/// clipped to the image.
pub fn generate_tiles(width: usize, height: usize, tile_size: usize)
    -> Vec<TileRequest> {
    let tile_size = tile_size.max(1);
    let mut tiles = Vec::new();

    for y in (0..height).step_by(tile_size) {
        for x in (0..width).step_by(tile_size) {
            tiles.push(TileRequest::new(x, y,
                tile_size.min(width - x), tile_size.min(height - y)));
        }
    }

    tiles
}

/// Renders every pixel of one tile.
///
/// The result depends only on the tile and the (read-only) world and
/// camera, so a failed tile can always be rendered again.
pub fn render_tile(world: &World, camera: &Camera, tile: TileRequest)
    -> TileResult {
    let mut rng = StdRng::seed_from_u64(tile.seed());
    let mut pixels = Vec::with_capacity(tile.pixel_count());

    for y in tile.origin_y..tile.origin_y + tile.height {
        for x in tile.origin_x..tile.origin_x + tile.width {
            pixels.push(camera.render_pixel(world, x, y, &mut rng));
        }
    }

    TileResult {
        origin_x: tile.origin_x,
        origin_y: tile.origin_y,
        width: tile.width,
        height: tile.height,
        pixels,
    }
}

/// A shared flag for aborting a render from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        Default::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Work performed by the pool for one tile.
pub type TileJob = dyn Fn(TileRequest) -> TileResult + Send + Sync;

enum Message {
    Tile(TileRequest),
    Terminate,
}

/// What a worker reports back for a tile.
enum TileOutcome {
    Done(TileResult),
    Failed(TileRequest),
}

struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, job: Arc<TileJob>,
        receiver: Arc<Mutex<mpsc::Receiver<Message>>>,
        results: mpsc::Sender<TileOutcome>, cancel: CancelToken) -> Worker {

        let thread = thread::spawn(move || loop {
            // Obtain the next message. The lock is only held while waiting.
            let message = match receiver.lock() {
                Ok(rx) => rx.recv(),
                Err(_) => break,
            };

            match message {
                // Tiles still queued after a cancel are dropped unrendered.
                Ok(Message::Tile(_)) if cancel.is_cancelled() => continue,

                Ok(Message::Tile(tile)) => {
                    // A panicking tile must not take the worker down with it.
                    let outcome = match panic::catch_unwind(
                        AssertUnwindSafe(|| job(tile))) {
                        Ok(result) => TileOutcome::Done(result),
                        Err(_) => TileOutcome::Failed(tile),
                    };

                    if results.send(outcome).is_err() {
                        break;
                    }
                },

                // Exit the worker thread loop, terminating the thread.
                Ok(Message::Terminate) | Err(_) => break,
            }
        });

        Worker { id, thread: Some(thread) }
    }
}

/// A fixed set of worker threads pulling tiles off a shared queue.
///
/// Finished tiles are sent to the channel given at construction. Once
/// `cancel` is set, workers skip any tile they have not started. Dropping
/// the pool lets each worker finish its current tile, then joins them all.
struct ThreadPool {
    workers: Vec<Worker>,
    sender: mpsc::Sender<Message>,
}

impl ThreadPool {
    fn new(size: usize, job: Arc<TileJob>, results: mpsc::Sender<TileOutcome>,
        cancel: &CancelToken) -> ThreadPool {
        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size.max(1))
            .map(|id| Worker::new(id, Arc::clone(&job),
                Arc::clone(&receiver), results.clone(), cancel.clone()))
            .collect();

        ThreadPool { workers, sender }
    }

    fn execute(&self, tile: TileRequest) -> Result<()> {
        self.sender.send(Message::Tile(tile))
            .map_err(|_| RenderError::TileFailed {
                x: tile.origin_x,
                y: tile.origin_y,
            })
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        for _ in &self.workers {
            // A worker that already exited has nothing to terminate.
            let _ = self.sender.send(Message::Terminate);
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    warn!("Worker {} exited abnormally", worker.id);
                }
            }
        }
    }
}

/// Renders `camera`'s view of `world` on `config.threads` worker threads.
///
/// The world and camera are shared read-only between the workers. A tile
/// that panics is dispatched again, up to `config.tile_retries` times,
/// before the render fails with `TileFailed`. Once `cancel` is set no new
/// tiles are handed out and the render returns `Cancelled`.
pub fn render_parallel(world: World, camera: Camera, config: &RenderConfig,
    cancel: &CancelToken) -> Result<Canvas> {
    let (width, height) = (camera.hsize, camera.vsize);
    let world = Arc::new(world);
    let camera = Arc::new(camera);

    let job: Arc<TileJob> = Arc::new(move |tile: TileRequest|
        render_tile(&world, &camera, tile));
    dispatch(width, height, config, cancel, job)
}

/// Drives a thread pool over every tile of a `width` by `height` image and
/// assembles the results.
///
/// At most two tiles per worker are queued at any time, so cancellation
/// takes effect without waiting for the whole image.
pub fn dispatch(width: usize, height: usize, config: &RenderConfig,
    cancel: &CancelToken, job: Arc<TileJob>) -> Result<Canvas> {
    config.validate()?;

    let tiles = generate_tiles(width, height, config.tile_size);
    let threads = config.threads.min(tiles.len()).max(1);
    info!("Rendering {}x{} image in {} tiles on {} threads",
        width, height, tiles.len(), threads);

    let start = Instant::now();
    let mut canvas = Canvas::new(width, height);
    let mut queue: VecDeque<TileRequest> = tiles.into();
    let mut failures: HashMap<TileRequest, usize> = HashMap::new();
    let mut in_flight = 0;

    let (results_tx, results_rx) = mpsc::channel();
    let pool = ThreadPool::new(threads, job, results_tx, cancel);

    while in_flight < threads * 2 && !cancel.is_cancelled() {
        match queue.pop_front() {
            Some(tile) => {
                pool.execute(tile)?;
                in_flight += 1;
            },
            None => break,
        }
    }

    while in_flight > 0 {
        if cancel.is_cancelled() {
            warn!("Render cancelled with {} tiles in flight and {} queued",
                in_flight, queue.len());
            return Err(RenderError::Cancelled);
        }

        let outcome = match results_rx.recv_timeout(POLL_INTERVAL) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("All render workers exited early");
                return Err(RenderError::Cancelled);
            },
        };
        in_flight -= 1;

        match outcome {
            TileOutcome::Done(tile) => {
                debug!("Tile at ({}, {}) finished", tile.origin_x, tile.origin_y);
                canvas.write_tile(&tile);

                if cancel.is_cancelled() {
                    continue;
                }
                if let Some(next) = queue.pop_front() {
                    pool.execute(next)?;
                    in_flight += 1;
                }
            },

            TileOutcome::Failed(tile) => {
                let attempts = failures.entry(tile).or_insert(0);
                *attempts += 1;

                if *attempts > config.tile_retries {
                    warn!("Tile at ({}, {}) failed {} times, giving up",
                        tile.origin_x, tile.origin_y, attempts);
                    return Err(RenderError::TileFailed {
                        x: tile.origin_x,
                        y: tile.origin_y,
                    });
                }

                warn!("Tile at ({}, {}) failed, retrying", tile.origin_x, tile.origin_y);
                pool.execute(tile)?;
                in_flight += 1;
            },
        }
    }

    if cancel.is_cancelled() {
        warn!("Render cancelled before any tile was dispatched");
        return Err(RenderError::Cancelled);
    }

    info!("Rendered {}x{} image in {:.2?}", width, height, start.elapsed());
    Ok(canvas)
}

#[cfg(test)]
use std::sync::atomic::AtomicUsize;

#[cfg(test)]
fn solid_tile(tile: TileRequest, color: Color) -> TileResult {
    TileResult {
        origin_x: tile.origin_x,
        origin_y: tile.origin_y,
        width: tile.width,
        height: tile.height,
        pixels: vec![color; tile.pixel_count()],
    }
}

#[cfg(test)]
fn test_config(threads: usize, tile_size: usize) -> RenderConfig {
    RenderConfig { threads, tile_size, ..Default::default() }
}

#[test]
fn tiles_cover_image_exactly() {
    let tiles = generate_tiles(10, 7, 4);

    assert_eq!(tiles, vec![
        TileRequest::new(0, 0, 4, 4),
        TileRequest::new(4, 0, 4, 4),
        TileRequest::new(8, 0, 2, 4),
        TileRequest::new(0, 4, 4, 3),
        TileRequest::new(4, 4, 4, 3),
        TileRequest::new(8, 4, 2, 3),
    ]);
    assert_eq!(tiles.iter().map(|t| t.pixel_count()).sum::<usize>(), 70);
}

#[test]
fn tiles_for_exact_fit_and_single_tile() {
    assert_eq!(generate_tiles(8, 8, 4).len(), 4);
    assert_eq!(generate_tiles(5, 3, 32), vec![TileRequest::new(0, 0, 5, 3)]);
    assert!(generate_tiles(0, 0, 4).is_empty());
}

#[test]
fn rendering_a_tile_is_repeatable() {
    use crate::light::{ Light, AreaLight };
    use crate::tuple::Tuple4D;
    use crate::matrix::Matrix4D;

    let mut world: World = Default::default();
    world.lights = vec![Light::Area(AreaLight::new(
        Tuple4D::point(-11.0, 10.0, -10.0),
        Tuple4D::vector(2.0, 0.0, 0.0), 4,
        Tuple4D::vector(0.0, 2.0, 0.0), 4,
        Color::white(),
    ))];
    let camera = Camera::new(16, 16, std::f64::consts::PI / 3.0,
        Matrix4D::view_transform(
            Tuple4D::point(0.0, 0.0, -5.0),
            Tuple4D::origin(),
            Tuple4D::vector(0.0, 1.0, 0.0),
        )).unwrap()
        .with_aperture(0.05, 4.0);

    let tile = TileRequest::new(4, 8, 8, 4);
    let first = render_tile(&world, &camera, tile);
    let second = render_tile(&world, &camera, tile);

    assert_eq!(first.pixels.len(), 32);
    assert_eq!(first, second);
}

#[test]
fn dispatch_assembles_tiles() {
    let job: Arc<TileJob> = Arc::new(|tile: TileRequest| {
        let shade = (tile.origin_x + tile.origin_y) as f64 / 10.0;
        solid_tile(tile, Color::rgb(shade, 0.0, 0.0))
    });

    let canvas = dispatch(6, 5, &test_config(3, 3), &CancelToken::new(), job)
        .unwrap();

    assert_eq!(canvas.read_pixel(0, 0), Some(Color::rgb(0.0, 0.0, 0.0)));
    assert_eq!(canvas.read_pixel(4, 1), Some(Color::rgb(0.3, 0.0, 0.0)));
    assert_eq!(canvas.read_pixel(1, 4), Some(Color::rgb(0.3, 0.0, 0.0)));
    assert_eq!(canvas.read_pixel(5, 4), Some(Color::rgb(0.6, 0.0, 0.0)));
}

#[test]
fn failed_tile_is_retried() {
    let failed_once = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&failed_once);

    let job: Arc<TileJob> = Arc::new(move |tile: TileRequest| {
        if tile.origin_x == 2 && tile.origin_y == 2 && !flag.swap(true, Ordering::SeqCst) {
            panic!("transient tile failure");
        }
        solid_tile(tile, Color::white())
    });

    let canvas = dispatch(4, 4, &test_config(2, 2), &CancelToken::new(), job)
        .unwrap();

    assert!(failed_once.load(Ordering::SeqCst));
    assert_eq!(canvas.read_pixel(3, 3), Some(Color::white()));
}

#[test]
fn tile_failing_past_retries_aborts_render() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);

    let job: Arc<TileJob> = Arc::new(move |tile: TileRequest| {
        if tile.origin_x == 0 && tile.origin_y == 0 {
            counter.fetch_add(1, Ordering::SeqCst);
            panic!("persistent tile failure");
        }
        solid_tile(tile, Color::white())
    });

    let config = RenderConfig { tile_retries: 2, ..test_config(2, 2) };
    let res = dispatch(4, 4, &config, &CancelToken::new(), job);

    assert!(matches!(res, Err(RenderError::TileFailed { x: 0, y: 0 })));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[test]
fn cancelled_render_dispatches_nothing() {
    let rendered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&rendered);

    let job: Arc<TileJob> = Arc::new(move |tile: TileRequest| {
        counter.fetch_add(1, Ordering::SeqCst);
        solid_tile(tile, Color::white())
    });

    let cancel = CancelToken::new();
    cancel.cancel();

    let res = dispatch(8, 8, &test_config(2, 2), &cancel, job);
    assert!(matches!(res, Err(RenderError::Cancelled)));
    assert_eq!(rendered.load(Ordering::SeqCst), 0);
}

#[test]
fn cancelling_mid_render_stops_dispatch() {
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let rendered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&rendered);

    // The first finished tile cancels the render.
    let job: Arc<TileJob> = Arc::new(move |tile: TileRequest| {
        counter.fetch_add(1, Ordering::SeqCst);
        token.cancel();
        solid_tile(tile, Color::white())
    });

    let res = dispatch(64, 64, &test_config(2, 4), &cancel, job);

    assert!(matches!(res, Err(RenderError::Cancelled)));
    assert!(rendered.load(Ordering::SeqCst) < generate_tiles(64, 64, 4).len());
}

#[test]
fn queued_tiles_are_skipped_after_cancel() {
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let rendered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&rendered);

    // One worker with a second tile already queued behind the first.
    let job: Arc<TileJob> = Arc::new(move |tile: TileRequest| {
        counter.fetch_add(1, Ordering::SeqCst);
        token.cancel();
        solid_tile(tile, Color::white())
    });

    let res = dispatch(8, 8, &test_config(1, 2), &cancel, job);

    assert!(matches!(res, Err(RenderError::Cancelled)));
    assert_eq!(rendered.load(Ordering::SeqCst), 1);
}

#[test]
fn invalid_config_is_rejected_before_rendering() {
    let job: Arc<TileJob> = Arc::new(|tile: TileRequest| solid_tile(tile, Color::white()));
    let res = dispatch(4, 4, &test_config(0, 2), &CancelToken::new(), job);

    assert!(matches!(res, Err(RenderError::InvalidConfig(_))));
}
