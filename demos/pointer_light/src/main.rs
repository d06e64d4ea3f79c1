use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use clap::Parser;
use crossbeam_channel::{Receiver, Sender};
use shade2d::{FrameSnapshot, PointerEvent, PointerTool, Scene, Vec2, VisibilityConfig};

#[derive(Parser, Debug)]
#[command(name = "pointer_light")]
#[command(about = "Headless shadow-casting driver: replays a pointer path and times each frame")]
struct Args {
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u32,
    /// Seed for the interior wall layout and scripted strokes.
    #[arg(long, default_value_t = 0xC0FF_EE_u64)]
    seed: u64,
    /// Log timing every this many frames.
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u32).range(1..))]
    report_every: u32,
    /// Optional JSON config (tile size, extent, corner epsilon).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the final frame snapshot as JSON.
    #[arg(long)]
    dump: Option<PathBuf>,
}

/// Messages from the input thread to the owner of the scene.
enum Input {
    Pointer(PointerEvent),
    EndFrame,
}

/// Rolling frame-cost bookkeeping.
struct FrameTimer {
    report_every: u32,
    frames: u32,
    window_frames: u32,
    window_total: Duration,
    worst: Duration,
}

impl FrameTimer {
    fn new(report_every: u32) -> Self {
        Self {
            report_every,
            frames: 0,
            window_frames: 0,
            window_total: Duration::ZERO,
            worst: Duration::ZERO,
        }
    }

    fn record(&mut self, elapsed: Duration, rays: usize) {
        self.frames += 1;
        self.window_frames += 1;
        self.window_total += elapsed;
        self.worst = self.worst.max(elapsed);

        if self.window_frames >= self.report_every {
            let avg = self.window_total / self.window_frames;
            let fps = if avg.is_zero() { f64::INFINITY } else { 1.0 / avg.as_secs_f64() };
            log::info!(
                "frame {}: avg {:.3} ms, worst {:.3} ms, ~{:.0} fps, {} rays",
                self.frames,
                avg.as_secs_f64() * 1000.0,
                self.worst.as_secs_f64() * 1000.0,
                fps,
                rays
            );
            self.window_frames = 0;
            self.window_total = Duration::ZERO;
            self.worst = Duration::ZERO;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => VisibilityConfig::load_from_file(path)?,
        None => VisibilityConfig::default(),
    };
    let mut scene = Scene::new(config)?;
    build_layout(&mut scene, args.seed);
    log::info!(
        "Scene ready: {} walls, {} edges",
        scene.grid().len(),
        scene.edges().len()
    );

    let (tx, rx) = crossbeam_channel::unbounded();
    let world = scene.config().world_size();
    let tile = scene.config().tile_size;
    let (frames, seed) = (args.frames, args.seed);
    let producer = thread::spawn(move || script_pointer(tx, frames, seed, world, tile));

    let snapshot = run(&mut scene, &rx, args.report_every)?;

    producer
        .join()
        .map_err(|_| anyhow!("pointer script thread panicked"))?;

    if let Some(path) = &args.dump {
        snapshot.save_to_file(path)?;
        log::info!("Wrote final frame to {}", path.display());
    }
    Ok(())
}

/// Border ring plus a few random interior walls, set up under one recompute.
fn build_layout(scene: &mut Scene, seed: u64) {
    let mut rng = fastrand::Rng::with_seed(seed);
    let (width, height) = (scene.config().grid_width, scene.config().grid_height);

    let mut batch = scene.batch();
    batch.outline();
    if width > 4 && height > 4 {
        for _ in 0..(width * height / 16) {
            let x = rng.i32(2..width - 2);
            let y = rng.i32(2..height - 2);
            batch.set_occupancy(x, y, true);
        }
    }
}

/// Owner-thread loop: drain pointer input, then recompute, cast and snapshot once per frame.
fn run(scene: &mut Scene, rx: &Receiver<Input>, report_every: u32) -> Result<FrameSnapshot> {
    let mut tool = PointerTool::new();
    let mut timer = FrameTimer::new(report_every);
    let mut snapshot = scene.snapshot();

    for input in rx.iter() {
        match input {
            Input::Pointer(event) => {
                if tool.handle(scene, event) {
                    log::trace!("Grid changed by {:?}", event);
                }
            }
            Input::EndFrame => {
                let started = Instant::now();
                if scene.edges_dirty() {
                    scene.recompute_edges();
                }
                let rays = scene.compute_visibility().len();
                snapshot = scene.snapshot();
                timer.record(started.elapsed(), rays);
            }
        }
    }

    if timer.frames == 0 {
        return Err(anyhow!("pointer script produced no frames"));
    }
    Ok(snapshot)
}

/// Scripted pointer path: the light orbits the centre, and now and then a short
/// stroke toggles a few tiles. The pointer leaves the surface on the last frame.
fn script_pointer(tx: Sender<Input>, frames: u32, seed: u64, world: Vec2, tile: f32) {
    let mut rng = fastrand::Rng::with_seed(seed ^ 0x5EED);
    let centre = world * 0.5;
    let radius = world.x.min(world.y) * 0.3;
    let mut stroke_left = 0u32;

    for frame in 0..frames {
        let angle = frame as f32 * 0.02;
        let pos = centre + Vec2::from_angle(angle) * radius;

        let mut events = Vec::with_capacity(2);
        if frame + 1 == frames {
            events.push(PointerEvent::Left);
        } else if stroke_left == 0 && frame % 120 == 60 {
            let jitter = Vec2::new(rng.f32() - 0.5, rng.f32() - 0.5) * (tile * 4.0);
            events.push(PointerEvent::Pressed(pos + jitter));
            stroke_left = 5;
        } else if stroke_left > 0 {
            stroke_left -= 1;
            events.push(PointerEvent::Moved(pos));
            if stroke_left == 0 {
                events.push(PointerEvent::Released);
            }
        } else {
            events.push(PointerEvent::Moved(pos));
        }

        for event in events {
            if tx.send(Input::Pointer(event)).is_err() {
                return;
            }
        }
        if tx.send(Input::EndFrame).is_err() {
            return;
        }
    }
}
