use tracing::{debug, info};

use blocks::scene::Scene;
use blocks::{Block, BlockId, BlockKind, IdAllocator, Opcode, Program, Sprite, SpriteId};

use crate::bubbles;
use crate::clock::Clock;
use crate::collision::CollisionDetector;
use crate::config::EngineConfig;
use crate::interpreter;
use crate::scheduler::{Activation, RunState, Scheduler};

/// Counters for the current (or most recent) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub swaps: u64,
}

/// The engine facade: sprites, selection, scheduling and collisions behind
/// one intent API.
///
/// Sprite state is only ever replaced as a whole collection. Every tick and
/// every frame derives the next collection from the current one and commits
/// it with a single assignment, so readers never observe a half-applied step.
pub struct Stage<C: Clock> {
    clock: C,
    config: EngineConfig,
    sprites: Vec<Sprite>,
    selected: SpriteId,
    ids: IdAllocator,
    scheduler: Scheduler,
    collisions: CollisionDetector,
    stats: RunStats,
}

impl<C: Clock> Stage<C> {
    /// A stage holding the single default sprite.
    pub fn new(clock: C, config: EngineConfig) -> Self {
        let mut ids = IdAllocator::new();
        let sprite = Sprite::numbered(ids.sprite(), 0);
        Self::assemble(clock, config, vec![sprite], ids)
    }

    /// A stage populated from a loaded scene. An empty scene still gets the
    /// default sprite.
    pub fn from_scene(clock: C, config: EngineConfig, scene: Scene) -> Self {
        let Scene {
            mut sprites,
            mut ids,
            ..
        } = scene;
        if sprites.is_empty() {
            sprites.push(Sprite::numbered(ids.sprite(), 0));
        }
        Self::assemble(clock, config, sprites, ids)
    }

    fn assemble(clock: C, config: EngineConfig, sprites: Vec<Sprite>, ids: IdAllocator) -> Self {
        let selected = sprites[0].id;
        Stage {
            scheduler: Scheduler::new(config.tick_interval_ms, config.frame_interval_ms),
            collisions: CollisionDetector::new(&config),
            clock,
            config,
            sprites,
            selected,
            ids,
            stats: RunStats::default(),
        }
    }

    // --- Outbound state ---

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.id == id)
    }

    pub fn sprite_named(&self, name: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.name == name)
    }

    pub fn selected_sprite_id(&self) -> SpriteId {
        self.selected
    }

    pub fn selected_sprite(&self) -> Option<&Sprite> {
        self.sprite(self.selected)
    }

    pub fn run_state(&self) -> RunState {
        self.scheduler.state()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // --- Sprite intents ---

    /// Add a sprite with the next default name and costume and select it.
    pub fn create_sprite(&mut self) -> SpriteId {
        let sprite = Sprite::numbered(self.ids.sprite(), self.sprites.len());
        let id = sprite.id;
        debug!(sprite = %id, name = %sprite.name, "sprite created");
        let mut next = self.sprites.clone();
        next.push(sprite);
        self.sprites = next;
        self.selected = id;
        id
    }

    pub fn select_sprite(&mut self, id: SpriteId) {
        if self.sprite(id).is_some() {
            self.selected = id;
        } else {
            debug!(sprite = %id, "select: no such sprite");
        }
    }

    /// Direct placement, as from a drag on the stage.
    pub fn move_sprite_position(&mut self, id: SpriteId, x: f64, y: f64) {
        if self.sprite(id).is_none() {
            debug!(sprite = %id, "move: no such sprite");
            return;
        }
        self.sprites = self
            .sprites
            .iter()
            .map(|s| {
                if s.id == id {
                    let mut moved = s.clone();
                    moved.state.x = x;
                    moved.state.y = y;
                    moved
                } else {
                    s.clone()
                }
            })
            .collect();
    }

    // --- Block intents (all target the selected sprite) ---

    /// Wrap `kind` in a block with a fresh id.
    pub fn new_block(&mut self, kind: BlockKind) -> Block {
        Block::new(self.ids.block(), kind)
    }

    /// A palette-default block with a fresh id.
    pub fn palette_block(&mut self, opcode: Opcode) -> Block {
        opcode.instantiate(&mut self.ids)
    }

    pub fn append_block(&mut self, block: Block) {
        self.edit_selected(|p| p.append(block));
    }

    pub fn replace_block(&mut self, id: BlockId, block: Block) {
        self.edit_selected(|p| p.replace(id, block));
    }

    pub fn delete_block(&mut self, id: BlockId) {
        self.edit_selected(|p| p.delete(id));
    }

    pub fn add_to_repeat(&mut self, repeat_id: BlockId, block: Block) {
        self.edit_selected(|p| p.add_to_repeat(repeat_id, block));
    }

    pub fn update_in_repeat(&mut self, repeat_id: BlockId, block: Block) {
        self.edit_selected(|p| p.update_in_repeat(repeat_id, block));
    }

    pub fn delete_from_repeat(&mut self, repeat_id: BlockId, block_id: BlockId) {
        self.edit_selected(|p| p.delete_from_repeat(repeat_id, block_id));
    }

    pub fn reorder_blocks(&mut self, from: usize, to: usize) {
        self.edit_selected(|p| p.reorder(from, to));
    }

    /// Replace the selected sprite's program with an edited copy and rewind it.
    fn edit_selected(&mut self, edit: impl FnOnce(&Program) -> Program) {
        let selected = self.selected;
        let Some(index) = self.sprites.iter().position(|s| s.id == selected) else {
            debug!(sprite = %selected, "edit: selected sprite is gone");
            return;
        };
        let mut next = self.sprites.clone();
        next[index] = self.sprites[index].edited(edit(&self.sprites[index].program));
        self.sprites = next;
    }

    // --- Run control ---

    /// Rewind every sprite and begin ticking. No-op while running.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("start: already running");
            return;
        }
        let now = self.clock.now();
        self.sprites = self.sprites.iter().map(Sprite::rewound).collect();
        self.stats = RunStats::default();
        self.scheduler.start(now);
        info!(at = now, sprites = self.sprites.len(), "run started");
    }

    /// Cancel the tick and the redraw loop. No-op while idle.
    pub fn stop(&mut self) {
        if self.scheduler.stop() {
            info!(ticks = self.stats.ticks, swaps = self.stats.swaps, "run stopped");
        }
    }

    /// Stop, then rewind every sprite and clear all bubbles. Programs and
    /// positions are kept.
    pub fn reset(&mut self) {
        self.stop();
        self.sprites = self
            .sprites
            .iter()
            .map(|s| {
                let mut rewound = s.rewound();
                rewound.state = rewound.state.without_bubbles();
                rewound
            })
            .collect();
        info!("stage reset");
    }

    /// Fire every activation due up to the clock's current time, in order.
    pub fn pump(&mut self) {
        let now = self.clock.now();
        while let Some(activation) = self.scheduler.next_activation(now) {
            match activation {
                Activation::Tick(at) => self.tick(at),
                Activation::Frame(at) => self.frame(at),
            }
        }
    }

    /// Clear bubbles that have expired by the clock's current time. The redraw
    /// loop does this while running; this lets an idle stage catch up.
    pub fn expire_bubbles(&mut self) {
        let now = self.clock.now();
        self.commit_expired(now);
    }

    fn tick(&mut self, at: blocks::Millis) {
        let finished = self.sprites.iter().all(Sprite::is_idle);

        let mut next: Vec<Sprite> = self
            .sprites
            .iter()
            .map(|s| interpreter::step(s, at))
            .collect();
        if let Some(pair) = self.collisions.check(&next, at) {
            self.collisions.swap(&mut next, pair, at);
            self.stats.swaps += 1;
        }
        self.sprites = next;
        self.stats.ticks += 1;
        debug!(at, tick = self.stats.ticks, "tick");

        if finished {
            self.stop();
        }
    }

    fn frame(&mut self, at: blocks::Millis) {
        self.commit_expired(at);
        if self.sprites.iter().all(Sprite::is_idle) {
            debug!(at, "all sprites finished");
            self.stop();
        }
    }

    fn commit_expired(&mut self, now: blocks::Millis) {
        if !self.sprites.iter().any(|s| bubbles::has_expired(&s.state, now)) {
            return;
        }
        self.sprites = self
            .sprites
            .iter()
            .map(|s| Sprite {
                state: bubbles::expire(&s.state, now),
                ..s.clone()
            })
            .collect();
    }
}
