use std::sync::Arc;

use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use crate::assets::{DirAssets, EmbeddedAssets, SpriteSet};
use crate::cli::Cli;
use crate::config::MascotConfig;
use crate::error::AppError;
use crate::feed::{self, LogTail};
use crate::motion::{MotionSimulator, MotionState};
use crate::perimeter::{PerimeterBounds, PerimeterState};
use crate::platform::{self, WindowHost};
use crate::present::message::MessageSlot;
use crate::present::{AnimationState, Presenter};
use crate::render::text::TextOverlay;
use crate::render::GpuState;

/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    frame_count: u64,
    last_log_time: Instant,
    frame_time_sum: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frames_since_log: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            last_log_time: Instant::now(),
            frame_time_sum: 0.0,
            frame_time_min: f64::MAX,
            frame_time_max: 0.0,
            frames_since_log: 0,
        }
    }

    fn record_frame(&mut self, dt: f64, tick_count: u64) {
        self.frame_count += 1;
        self.frames_since_log += 1;
        self.frame_time_sum += dt;
        self.frame_time_min = self.frame_time_min.min(dt);
        self.frame_time_max = self.frame_time_max.max(dt);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= FPS_LOG_INTERVAL {
            let avg_ms = (self.frame_time_sum / self.frames_since_log as f64) * 1000.0;
            let fps = self.frames_since_log as f64 / elapsed;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | frames: {} | ticks: {}",
                fps,
                avg_ms,
                self.frame_time_min * 1000.0,
                self.frame_time_max * 1000.0,
                self.frame_count,
                tick_count,
            );
            self.last_log_time = Instant::now();
            self.frame_time_sum = 0.0;
            self.frame_time_min = f64::MAX;
            self.frame_time_max = 0.0;
            self.frames_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Mascot
// ---------------------------------------------------------------------------

/// The per-tick pipeline: motion, then mapping, then animation.
struct Mascot {
    motion: MotionSimulator,
    bounds: PerimeterBounds,
    animation: AnimationState,
    placement: PerimeterState,
}

impl Mascot {
    fn new(
        config: &MascotConfig,
        bounds: PerimeterBounds,
        message: MessageSlot,
        rng: fastrand::Rng,
    ) -> Self {
        let motion = MotionSimulator::new(config.motion_params(), rng);
        let state = motion.state();
        let placement = bounds.map(state.virtual_x, state.virtual_y, state.velocity_x);
        Self {
            motion,
            bounds,
            animation: AnimationState::new(message),
            placement,
        }
    }

    /// One tick with a randomly rolled event.
    fn tick(&mut self) -> PerimeterState {
        let state = self.motion.advance();
        self.place(state)
    }

    #[cfg(test)]
    fn step(&mut self, event: Option<crate::motion::MotionEvent>) -> PerimeterState {
        let state = self.motion.step(event);
        self.place(state)
    }

    fn place(&mut self, state: MotionState) -> PerimeterState {
        let placement = self
            .bounds
            .map(state.virtual_x, state.virtual_y, state.velocity_x);
        if placement.edge != self.placement.edge {
            log::debug!(
                "edge {} -> {} ({:?}) at x={}",
                self.placement.edge_index(),
                placement.edge_index(),
                placement.edge,
                state.virtual_x
            );
        }
        self.placement = placement;
        self.animation.tick();
        placement
    }

    /// Remap the current position onto new bounds.
    fn set_bounds(&mut self, bounds: PerimeterBounds) {
        self.bounds = bounds;
        let state = self.motion.state();
        self.placement = bounds.map(state.virtual_x, state.virtual_y, state.velocity_x);
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    config: MascotConfig,
    sprites: SpriteSet,
    presenter: Presenter,
    message: MessageSlot,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    text: Option<TextOverlay>,
    mascot: Option<Mascot>,

    // Fixed timestep
    last_frame_time: Option<Instant>,
    accumulator: f64,
    tick_count: u64,

    // Frame timing
    frame_stats: FrameStats,

    // Screen dimensions
    screen_w: u32,
    screen_h: u32,

    // Error that stopped the event loop, returned from `run`
    fatal: Option<AppError>,
}

impl App {
    fn new(config: MascotConfig, sprites: SpriteSet, message: MessageSlot) -> Self {
        let presenter = Presenter::new(&config, sprites.sizes());
        Self {
            config,
            sprites,
            presenter,
            message,
            window: None,
            gpu: None,
            text: None,
            mascot: None,
            last_frame_time: None,
            accumulator: 0.0,
            tick_count: 0,
            frame_stats: FrameStats::new(),
            screen_w: 0,
            screen_h: 0,
            fatal: None,
        }
    }

    /// Create the window and GPU state, validate against the screen, and
    /// place the mascot at its start position.
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or(AppError::NoMonitor)?;
        let screen_size = monitor.size();

        let bounds = self.config.validate(screen_size.width, screen_size.height)?;
        self.screen_w = screen_size.width;
        self.screen_h = screen_size.height;
        log::info!(
            "Screen {}x{} on {:?}, config: {:?}",
            screen_size.width,
            screen_size.height,
            monitor.name().unwrap_or_default(),
            self.config
        );

        let mascot = Mascot::new(&self.config, bounds, self.message.clone(), fastrand::Rng::new());
        let (x, y) = mascot
            .placement
            .window_position(self.screen_h, self.config.window_height);

        // Start hidden so DWM doesn't cache stale frame state before our
        // overlay style changes take effect.
        let attrs = WindowAttributes::default()
            .with_title("edgepet")
            .with_decorations(false)
            .with_resizable(false)
            .with_visible(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(PhysicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ))
            .with_position(PhysicalPosition::new(x, y));

        // No with_transparent(true) on Windows: that sets WS_EX_LAYERED, which
        // conflicts with DirectComposition.
        #[cfg(not(windows))]
        let attrs = attrs.with_transparent(true);

        let window = Arc::new(event_loop.create_window(attrs)?);
        platform::setup_overlay(&window);

        log::info!(
            "Mascot window created: {}x{} at ({x}, {y})",
            self.config.window_width,
            self.config.window_height
        );

        let gpu = GpuState::new(window.clone(), &self.sprites)?;
        log::info!("wgpu + sprite pipeline initialized");
        let text = TextOverlay::new(&window, &gpu, self.sprites.font.as_deref());

        // Continuous game loop
        event_loop.set_control_flow(ControlFlow::Poll);

        // Show window now that all styles and GPU resources are ready.
        window.set_visible(true);

        self.gpu = Some(gpu);
        self.text = Some(text);
        self.mascot = Some(mascot);
        self.window = Some(window);
        Ok(())
    }

    /// Park a fatal error and stop the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("Stopping: {error}");
        self.fatal = Some(error);
        event_loop.exit();
    }

    /// Run fixed-timestep simulation ticks.
    fn run_fixed_update(&mut self, dt: f64) {
        let Some(mascot) = &mut self.mascot else {
            return;
        };
        let tick_rate = self.config.tick_rate();

        self.accumulator += dt;
        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        while self.accumulator >= tick_rate {
            mascot.tick();
            self.accumulator -= tick_rate;
            self.tick_count += 1;
        }
    }

    /// Pick up a changed screen size once per second of ticks.
    fn check_screen(&mut self) {
        let (Some(window), Some(mascot)) = (&self.window, &mut self.mascot) else {
            return;
        };
        let Some(size) = window.primary_monitor().map(|m| m.size()) else {
            return;
        };
        if (size.width, size.height) == (self.screen_w, self.screen_h) {
            return;
        }

        match self.config.validate(size.width, size.height) {
            Ok(bounds) => {
                log::info!(
                    "Screen resized {}x{} -> {}x{}",
                    self.screen_w,
                    self.screen_h,
                    size.width,
                    size.height
                );
                mascot.set_bounds(bounds);
                self.screen_w = size.width;
                self.screen_h = size.height;
            }
            Err(e) => {
                log::warn!("Ignoring screen resize to {}x{}: {e}", size.width, size.height);
            }
        }
    }

    /// Place the window and draw the current frame.
    fn draw(&mut self) {
        let (Some(window), Some(gpu), Some(text), Some(mascot)) =
            (&self.window, &mut self.gpu, &mut self.text, &self.mascot)
        else {
            return;
        };

        let frame = self
            .presenter
            .render(&mascot.placement, &mascot.animation, self.screen_h);
        window.move_window(frame.window_position.0, frame.window_position.1);

        gpu.update_sprites(&frame);
        let text_frame = text.run_frame(window, &frame.commands);

        let Some(mut ctx) = gpu.begin_frame() else {
            return;
        };
        gpu.draw_sprites(&mut ctx.encoder, &ctx.view);

        let cmd_bufs = text.prepare(gpu, &mut ctx.encoder, &text_frame);
        {
            let mut pass = GpuState::begin_text_pass(&mut ctx.encoder, &ctx.view);
            text.render(&mut pass, &text_frame);
        }

        gpu.finish_frame(ctx.encoder, ctx.output, cmd_bufs);
        text.free_textures(&text_frame);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.fatal.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                // --- Timing ---
                let now = Instant::now();
                if let Some(last) = self.last_frame_time {
                    let dt = now.duration_since(last).as_secs_f64();
                    self.frame_stats.record_frame(dt, self.tick_count);

                    let before = self.tick_count;
                    self.run_fixed_update(dt);
                    let per_second = self.config.ticks_per_second as u64;
                    if before / per_second != self.tick_count / per_second {
                        self.check_screen();
                    }
                }
                self.last_frame_time = Some(now);

                // --- Render ---
                self.draw();
            }
            _ => {}
        }
    }
}

/// Entry point: load assets, start the feed, create the event loop and run.
pub fn run(cli: Cli) -> Result<(), AppError> {
    let config = MascotConfig::default();

    let sprites = match &config.asset_dir {
        Some(dir) => SpriteSet::load(&DirAssets::new(dir))?,
        None => SpriteSet::load(&EmbeddedAssets)?,
    };

    let message = MessageSlot::new();
    let source = LogTail::new(cli.target, config.max_message_chars);
    feed::spawn_poller(Box::new(source), message.clone(), config.poll_interval)
        .map_err(AppError::Poller)?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, sprites, message);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MotionEvent;
    use crate::perimeter::{Edge, SUBUNITS_PER_PIXEL};

    const STEP: i64 = 64;

    fn mascot(seed: u64) -> Mascot {
        let config = MascotConfig::default();
        let bounds = PerimeterBounds::new(1920, 1080, 200, 200).unwrap();
        Mascot::new(&config, bounds, MessageSlot::new(), fastrand::Rng::with_seed(seed))
    }

    fn walk(m: &mut Mascot, ticks: usize) -> Vec<Edge> {
        (0..ticks).map(|_| m.step(None).edge).collect()
    }

    #[test]
    fn starts_on_the_bottom_edge() {
        let m = mascot(1);
        assert_eq!(m.placement.edge, Edge::Bottom);
        assert_eq!(m.placement.window_position(1080, 200), (0, 880));
    }

    #[test]
    fn reaches_the_right_edge_after_430_ticks() {
        let mut m = mascot(1);
        walk(&mut m, 429);
        assert_eq!(m.placement.edge, Edge::Bottom);
        assert_eq!(m.placement.screen_x, 429 * STEP);

        let p = m.step(None);
        assert_eq!(p.edge, Edge::Right);
        assert_eq!(p.screen_x, 1720 * SUBUNITS_PER_PIXEL);
        assert_eq!(p.window_position(1080, 200), (1720, 880));
        assert_eq!(m.animation.frame_counter, 430);
    }

    #[test]
    fn constant_direction_visits_every_edge_in_order() {
        let mut m = mascot(2);
        let lap = (m.bounds.perimeter() / STEP) as usize;
        assert_eq!(lap, 1300);
        // One tick short of two full laps.
        let edges = walk(&mut m, 2 * lap - 1);
        let mut changes = vec![Edge::Bottom];
        for e in edges {
            if Some(&e) != changes.last() {
                changes.push(e);
            }
        }
        use Edge::*;
        assert_eq!(changes, [Bottom, Right, Top, Left, Bottom, Right, Top, Left]);
    }

    #[test]
    fn turning_on_the_top_edge_walks_back_the_way_it_came() {
        let mut m = mascot(3);
        walk(&mut m, 700);
        assert_eq!(m.placement.edge, Edge::Top);

        m.step(Some(MotionEvent::Turn));
        assert!(m.placement.facing_reversed);
        let edges = walk(&mut m, 700);
        let right = edges.iter().position(|&e| e == Edge::Right).unwrap();
        let bottom = edges.iter().position(|&e| e == Edge::Bottom).unwrap();
        assert!(right < bottom);
    }

    #[test]
    fn turning_twice_retraces_the_path() {
        let mut m = mascot(4);
        // Ten ticks up the right edge.
        walk(&mut m, 440);
        let start = m.placement;
        assert_eq!(start.edge, Edge::Right);

        m.step(Some(MotionEvent::Turn));
        let back = walk(&mut m, 39);
        assert!(back.contains(&Edge::Bottom));
        m.step(Some(MotionEvent::Turn));
        let forward = walk(&mut m, 39);
        assert!(forward.contains(&Edge::Right));

        let end = m.placement;
        assert_eq!(end, start);
        assert_eq!(end.screen_y, start.screen_y);
        assert_eq!(m.motion.state().virtual_x, 440 * STEP);
    }

    #[test]
    fn jumping_into_a_corner_moves_smoothly() {
        let mut m = mascot(7);
        let lap = (m.bounds.perimeter() / STEP) as usize;
        let mut tick = 0;
        for corner in [430, 650, 1080, lap] {
            walk(&mut m, corner - 20 - tick);
            m.step(Some(MotionEvent::Jump));
            tick = corner - 19;

            let mut prev = m.placement;
            let mut prev_motion = *m.motion.state();
            for _ in 0..60 {
                let p = m.step(None);
                tick += 1;
                let motion = *m.motion.state();
                let bound = (motion.virtual_x - prev_motion.virtual_x).abs()
                    + (motion.virtual_y - prev_motion.virtual_y).abs();
                let dx = (p.screen_x - prev.screen_x).abs();
                let dy = (p.screen_y - prev.screen_y).abs();
                assert!(dx <= bound && dy <= bound, "{:?} -> {:?}: dx={dx} dy={dy}", prev.edge, p.edge);
                if tick == corner {
                    assert!(motion.virtual_y > 0, "landed before the corner");
                }
                prev = p;
                prev_motion = motion;
            }
        }
    }

    #[test]
    fn random_walk_never_skips_an_edge() {
        let mut m = mascot(5);
        let mut prev = m.motion.state().virtual_x;
        let mut edge = m.placement.edge;
        for _ in 0..20_000 {
            let p = m.tick();
            let x = m.motion.state().virtual_x;
            assert!((x - prev).abs() <= STEP);
            let diff = (p.edge.index() as i64 - edge.index() as i64).rem_euclid(4);
            assert!(diff != 2, "{edge:?} -> {:?}", p.edge);
            prev = x;
            edge = p.edge;
        }
    }

    #[test]
    fn new_bounds_remap_the_current_position() {
        let mut m = mascot(6);
        walk(&mut m, 300);
        assert_eq!(m.placement.edge, Edge::Bottom);

        // 300 * 4 px lies past the bottom span of a 1280 px screen.
        m.set_bounds(PerimeterBounds::new(1280, 720, 200, 200).unwrap());
        assert_eq!(m.placement.edge, Edge::Right);
    }
}
