/// WorldState: the complete state of a running level.
///
/// ## Ownership
///
///   - `level`  : the static layout as loaded. **Never mutated** after `new`.
///   - `blocks`, `coins`: runtime copies of the level's spawn lists,
///     mutated by the step driver.
///   - `player`, `progress`, `phase`: per-run state.
///
/// `restart()` rebuilds everything from `level`, which is the only way
/// lives go back up.
///
/// ## Camera
///
/// Horizontal only: `camera_x = player.x - camera_lead`. The renderer maps
/// `screen_x = world_x - camera_x`; y is not scrolled.

use crate::config::PhysicsConfig;
use crate::domain::blocks::Terrain;
use crate::domain::entity::{Coin, Npc, Platform, Player, PushBlock};
use crate::domain::geom::Rect;
use super::level::LevelDef;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    LevelComplete,
    GameOver,
}

/// Timer, one-shot triggers and score. Every flag here is set at most once
/// per run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelProgress {
    /// Seconds of play; only advances in `Phase::Playing`.
    pub elapsed: f32,
    pub checkpoint_reached: bool,
    pub checkpoint_time: f32,
    pub completed: bool,
    pub completion_time: f32,
    /// 0 until completion, then 1-3.
    pub stars: u8,
    pub coins_collected: u32,
}

pub struct WorldState {
    pub level: LevelDef,
    pub physics: PhysicsConfig,

    // ── Entities ──
    pub player: Player,
    pub blocks: Vec<PushBlock>,
    pub coins: Vec<Coin>,

    // ── Progress ──
    pub progress: LevelProgress,
    pub phase: Phase,
    /// Visual flag state: raised on checkpoint, lowered again on respawn.
    pub flag_raised: bool,
    pub tick: u64,
}

// ── Construction ──

impl WorldState {
    pub fn new(level: LevelDef, physics: PhysicsConfig) -> Self {
        let player = Player::new(level.start_x, level.start_y, physics.player_size, physics.lives);
        let blocks = level.blocks.iter().map(PushBlock::from).collect();
        let coins = level.coins.clone();
        WorldState {
            level,
            physics,
            player,
            blocks,
            coins,
            progress: LevelProgress::default(),
            phase: Phase::Playing,
            flag_raised: false,
            tick: 0,
        }
    }

    /// Start the level over: full lives, fresh blocks and coins, timer at 0.
    pub fn restart(&mut self) {
        let level = self.level.clone();
        let physics = self.physics.clone();
        *self = WorldState::new(level, physics);
    }
}

/// Terrain view for block dynamics. The hole floor sits one player height
/// below `ground_y`. Borrows only the level, so the caller
/// can hold `&mut` to the blocks and player at the same time.
pub fn terrain<'a>(level: &'a LevelDef, physics: &PhysicsConfig) -> Terrain<'a> {
    Terrain {
        platforms: &level.platforms,
        hole: level.primary_hole,
        ground_y: level.ground_y,
        hole_floor_y: level.ground_y + physics.player_size,
    }
}

// ── Snapshot accessors (read-only, for the host) ──

impl WorldState {
    pub fn player_rect(&self) -> Rect {
        self.player.rect()
    }

    pub fn camera_x(&self) -> f32 {
        self.player.x - self.physics.camera_lead
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.level.platforms
    }

    pub fn blocks(&self) -> &[PushBlock] {
        &self.blocks
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn npc(&self) -> &Npc {
        &self.level.npc
    }

    pub fn flag_zone(&self) -> Rect {
        self.level.flag
    }

    pub fn end_zone(&self) -> Rect {
        self.level.end_zone
    }

    pub fn flag_raised(&self) -> bool {
        self.flag_raised
    }

    pub fn lives(&self) -> u32 {
        self.player.lives
    }

    pub fn coins_collected(&self) -> u32 {
        self.progress.coins_collected
    }

    pub fn elapsed(&self) -> f32 {
        self.progress.elapsed
    }

    pub fn checkpoint_time(&self) -> Option<f32> {
        self.progress.checkpoint_reached.then_some(self.progress.checkpoint_time)
    }

    pub fn stars(&self) -> Option<u8> {
        self.progress.completed.then_some(self.progress.stars)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}
