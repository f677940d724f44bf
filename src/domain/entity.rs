/// Entities: Platform, PushBlock, Coin, Npc, Hole, Player.
/// Static pieces (platforms, NPC, holes) are plain data; the mutable ones
/// (player, blocks, coins) carry the flags the step driver maintains.

use serde::{Deserialize, Serialize};

use super::geom::Rect;

/// Frame input: abstract intents sampled once at tick start.
/// Movement and push are continuous (held), jump is edge-triggered (fresh press).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intents {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub push: bool,
}

/// Static level rectangle. Thick ones (height > 50) are ground segments,
/// thin ones are floating platforms; physics treats both the same.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Platform {
    pub const GROUND_MIN_HEIGHT: f32 = 50.0;

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Platform { x, y, width, height }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_ground(&self) -> bool {
        self.height > Self::GROUND_MIN_HEIGHT
    }
}

/// A gap in ground coverage, described by its horizontal span only.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    pub x: f32,
    pub width: f32,
}

impl Hole {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn center(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Strictly inside the span (edges excluded).
    pub fn contains_x(&self, x: f32) -> bool {
        x > self.x && x < self.right()
    }
}

/// Static blocker standing in front of the secondary hole. No AI.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Npc {
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Coin pickup. `collected` only ever goes false → true.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_coin_size")]
    pub size: f32,
    #[serde(skip)]
    pub collected: bool,
}

fn default_coin_size() -> f32 { 50.0 }

impl Coin {
    pub fn new(x: f32, y: f32) -> Self {
        Coin { x, y, size: default_coin_size(), collected: false }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}

/// Where a push block starts, as written in the level definition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockSpawn {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub settled: bool,
}

/// Push-able block.
///
/// Flags:
///   - `settled` : resting; implies `velocity_y == 0`.
///   - `in_hole` : dropped into the primary hole. Never cleared once set.
#[derive(Clone, Debug, PartialEq)]
pub struct PushBlock {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub velocity_y: f32,
    pub in_hole: bool,
    pub settled: bool,
}

impl PushBlock {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        PushBlock { x, y, width, height, velocity_y: 0.0, in_hole: false, settled: false }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Come to rest at `y`.
    #[inline]
    pub fn rest_at(&mut self, y: f32) {
        self.y = y;
        self.velocity_y = 0.0;
        self.settled = true;
    }
}

impl From<&BlockSpawn> for PushBlock {
    fn from(spawn: &BlockSpawn) -> Self {
        let mut block = PushBlock::new(spawn.x, spawn.y, spawn.width, spawn.height);
        block.settled = spawn.settled;
        block
    }
}

/// The player character: a square of side `size`.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub velocity_y: f32,
    pub moving_left: bool,
    pub moving_right: bool,
    pub pushing: bool,
    pub lives: u32,
}

impl Player {
    pub fn new(x: f32, y: f32, size: f32, lives: u32) -> Self {
        Player {
            x, y, size,
            velocity_y: 0.0,
            moving_left: false,
            moving_right: false,
            pushing: false,
            lives,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.size
    }

    /// Take the held intents for this tick.
    pub fn apply_intents(&mut self, intents: Intents) {
        self.moving_left = intents.left;
        self.moving_right = intents.right;
        self.pushing = intents.push;
    }

    /// Drop all held intents and freeze vertical motion (terminal phases).
    pub fn halt(&mut self) {
        self.moving_left = false;
        self.moving_right = false;
        self.pushing = false;
        self.velocity_y = 0.0;
    }

    pub fn respawn(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.velocity_y = 0.0;
    }
}
