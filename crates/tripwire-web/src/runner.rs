use tripwire_engine::{
    Game, GameConfig, EngineContext, RenderContext,
    InputEvent, InputQueue, RenderBuffer, LineBuffer,
    FixedTimestep,
};
#[cfg(feature = "physics")]
use tripwire_engine::build_render_buffer;

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game (e.g., `security-room`) creates a `thread_local!` GameRunner
/// and exports free functions via `#[wasm_bindgen]`, because wasm-bindgen
/// cannot export generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    render_buffer: RenderBuffer,
    line_buffer: LineBuffer,
    timestep: FixedTimestep,
    config: GameConfig,
    initialized: bool,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();

        Self {
            ctx: EngineContext::from_config(&config),
            input: InputQueue::new(),
            render_buffer: RenderBuffer::with_capacity(config.max_instances),
            line_buffer: LineBuffer::with_capacity(config.max_lines),
            timestep: FixedTimestep::new(config.fixed_dt),
            game,
            config,
            initialized: false,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.game.init(&mut self.ctx);
        self.initialized = true;
    }

    /// Throw away the current game and world, then start `game` from scratch.
    pub fn replace_game(&mut self, game: G) {
        *self = Self::new(game);
        self.init();
    }

    /// Put a started runner for `game` into `slot`, replacing whatever ran there.
    /// An empty slot gets a fresh runner, so a level can be loaded before `game_init`.
    pub fn start_or_replace(slot: &mut Option<Self>, game: G) {
        match slot {
            Some(runner) => runner.replace_game(game),
            None => {
                let mut runner = Self::new(game);
                runner.init();
                *slot = Some(runner);
            }
        }
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Forget held keys, e.g. when the page loses focus.
    pub fn release_keys(&mut self) {
        self.ctx.actions.release_all();
    }

    /// Run one frame: zero or more fixed updates, each followed by a physics step,
    /// then rebuild the render buffers.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        self.ctx.clear_frame_data();

        let steps = self.timestep.accumulate(dt);
        if steps > 0 {
            self.ctx.actions.ingest(self.input.iter());
        }
        for step in 0..steps {
            self.game.update(&mut self.ctx, &self.input);
            self.ctx.actions.end_tick();
            #[cfg(feature = "physics")]
            self.ctx.step_physics();

            // Raw events are seen by the first update only.
            if step == 0 {
                self.input.drain();
            }
        }
        self.ctx.events.truncate(self.config.max_events);

        #[cfg(feature = "physics")]
        build_render_buffer(self.ctx.scene.iter(), &self.ctx.physics, &mut self.render_buffer);

        self.line_buffer.clear();
        {
            let mut render_ctx = RenderContext {
                scene: &self.ctx.scene,
                lines: &mut self.line_buffer,
            };
            self.game.render(&mut render_ctx);
        }
        self.line_buffer.truncate(self.config.max_lines);
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    // ---- Pointer accessors for SharedArrayBuffer reads ----

    pub fn instances_ptr(&self) -> *const f32 {
        self.render_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count().min(self.config.max_instances as u32)
    }

    pub fn lines_ptr(&self) -> *const f32 {
        self.line_buffer.lines_ptr()
    }

    pub fn line_count(&self) -> u32 {
        self.line_buffer.line_count()
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    pub fn world_width(&self) -> f32 {
        self.config.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.config.world_height
    }

    // ---- Capacity accessors (read by TypeScript via wasm_bindgen exports) ----

    pub fn max_instances(&self) -> u32 {
        self.config.max_instances as u32
    }

    pub fn max_lines(&self) -> u32 {
        self.config.max_lines as u32
    }

    pub fn max_events(&self) -> u32 {
        self.config.max_events as u32
    }
}
