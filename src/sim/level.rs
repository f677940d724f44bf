/// Level definitions: the static, immutable layout of a level.
///
/// ## Sources
///   1. `[general] level_file` from config (TOML, same shape as below)
///   2. The built-in level
///
/// ## Level file format
///   ```toml
///   name = "level-1"
///   ground_y = 700.0
///   start_x = 100.0
///   start_y = 700.0
///
///   [primary_hole]
///   x = 800.0
///   width = 200.0
///
///   [secondary_hole]
///   x = 2600.0
///   width = 320.0
///
///   [npc]
///   x = 2400.0
///   y = 500.0
///   width = 150.0
///   height = 200.0
///
///   [flag]            # checkpoint zone
///   x = 1150.0
///   y = 580.0
///   width = 80.0
///   height = 200.0
///
///   [end_zone]
///   x = 4000.0
///   y = 700.0
///   width = 100.0
///   height = 100.0
///
///   [[platforms]]
///   x = 0.0
///   y = 780.0
///   width = 800.0
///   height = 100.0
///
///   [[coins]]
///   x = 600.0
///   y = 350.0
///
///   [[blocks]]
///   x = 500.0
///   y = 700.0
///   width = 170.0
///   height = 80.0
///   settled = false
///   ```
///
/// `ground_y` is the top y of anything one player tall standing on the
/// ground; the ground platforms' top surface is `ground_y + player_size`.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::entity::{BlockSpawn, Coin, Hole, Npc, Platform};
use crate::domain::geom::Rect;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    pub ground_y: f32,
    pub start_x: f32,
    pub start_y: f32,
    pub primary_hole: Hole,
    pub secondary_hole: Hole,
    pub npc: Npc,
    pub flag: Rect,
    pub end_zone: Rect,
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub coins: Vec<Coin>,
    #[serde(default)]
    pub blocks: Vec<BlockSpawn>,
}

#[derive(Debug)]
pub enum LevelError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io(e) => write!(f, "cannot read level file: {e}"),
            LevelError::Parse(e) => write!(f, "level file parse error: {e}"),
            LevelError::Invalid(msg) => write!(f, "invalid level: {msg}"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io(e) => Some(e),
            LevelError::Parse(e) => Some(e),
            LevelError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::Io(e)
    }
}

impl From<toml::de::Error> for LevelError {
    fn from(e: toml::de::Error) -> Self {
        LevelError::Parse(e)
    }
}

// ══════════════════════════════════════════════════════════════
// Built-in level
// ══════════════════════════════════════════════════════════════

impl LevelDef {
    /// "level-1": ground with a fillable hole, a checkpoint flag past it,
    /// floating platforms with coins, and a broken bridge guarded by the NPC.
    pub fn builtin() -> Self {
        const GROUND_Y: f32 = 700.0;
        const SIZE: f32 = 80.0; // player height the level is laid out for
        const HOLE_X: f32 = 800.0;
        const HOLE_W: f32 = 200.0;
        const HOLE2_X: f32 = 2600.0;
        const HOLE2_W: f32 = 320.0;
        const FLAG_H: f32 = 200.0;

        let floor_top = GROUND_Y + SIZE;
        let ground = |x: f32, w: f32| Platform::new(x, floor_top, w, 100.0);
        let ledge = |x: f32, above: f32, w: f32| Platform::new(x, GROUND_Y - above, w, 30.0);

        LevelDef {
            name: "level-1".to_string(),
            ground_y: GROUND_Y,
            start_x: 100.0,
            start_y: GROUND_Y,
            primary_hole: Hole { x: HOLE_X, width: HOLE_W },
            secondary_hole: Hole { x: HOLE2_X, width: HOLE2_W },
            npc: Npc { x: HOLE2_X - 200.0, y: GROUND_Y - 200.0, width: 150.0, height: 200.0 },
            flag: Rect::new(HOLE_X + HOLE_W + 150.0, floor_top - FLAG_H, SIZE, FLAG_H),
            end_zone: Rect::new(4000.0, 700.0, 100.0, 100.0),
            platforms: vec![
                ground(0.0, HOLE_X),
                ground(HOLE_X + HOLE_W, HOLE2_X - (HOLE_X + HOLE_W)),
                ground(HOLE2_X + HOLE2_W, 3000.0),
                ledge(300.0, 180.0, 200.0),
                ledge(500.0, 300.0, 200.0),
                ledge(900.0, 450.0, 200.0),
                ledge(1300.0, 300.0, 200.0),
                ledge(1700.0, 450.0, 200.0),
                ledge(2100.0, 300.0, 200.0),
                ledge(2500.0, 180.0, 200.0),
                ledge(2800.0, 400.0, 300.0),
                ledge(3200.0, 300.0, 300.0),
            ],
            coins: vec![
                Coin::new(600.0, GROUND_Y - 350.0),
                Coin::new(1000.0, GROUND_Y - 500.0),
                Coin::new(1400.0, GROUND_Y - 350.0),
                Coin::new(1800.0, GROUND_Y - 500.0),
                Coin::new(2200.0, GROUND_Y - 350.0),
            ],
            blocks: vec![
                BlockSpawn { x: 500.0, y: GROUND_Y, width: 170.0, height: SIZE, settled: false },
                BlockSpawn {
                    x: 920.0,
                    y: GROUND_Y - 450.0 - SIZE,
                    width: SIZE,
                    height: SIZE,
                    settled: true,
                },
            ],
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Loading / validation
// ══════════════════════════════════════════════════════════════

impl LevelDef {
    pub fn from_toml_str(text: &str) -> Result<Self, LevelError> {
        let def: LevelDef = toml::from_str(text)?;
        def.validate()?;
        Ok(def)
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path)?;
        let def = Self::from_toml_str(&text)?;
        log::info!(
            "level '{}' from {}: {} ground segments, {} platforms, {} coins, {} blocks",
            def.name,
            path.display(),
            def.platforms.iter().filter(|p| p.is_ground()).count(),
            def.platforms.len(),
            def.coins.len(),
            def.blocks.len(),
        );
        Ok(def)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Reject layouts the physics can't make sense of.
    pub fn validate(&self) -> Result<(), LevelError> {
        let invalid = |msg: String| Err(LevelError::Invalid(msg));

        if !(self.ground_y.is_finite() && self.start_x.is_finite() && self.start_y.is_finite()) {
            return invalid("ground_y and start position must be finite".into());
        }
        for (name, hole) in [("primary_hole", &self.primary_hole), ("secondary_hole", &self.secondary_hole)] {
            if !(hole.width > 0.0) {
                return invalid(format!("{name} width must be positive"));
            }
        }
        let (a, b) = (&self.primary_hole, &self.secondary_hole);
        if a.x < b.right() && b.x < a.right() {
            return invalid("holes overlap".into());
        }
        if !has_size(self.npc.width, self.npc.height) {
            return invalid("npc must have positive size".into());
        }
        if !has_size(self.flag.w, self.flag.h) {
            return invalid("flag zone must have positive size".into());
        }
        if !has_size(self.end_zone.w, self.end_zone.h) {
            return invalid("end zone must have positive size".into());
        }
        if let Some(i) = self.platforms.iter().position(|p| !has_size(p.width, p.height)) {
            return invalid(format!("platform {i} must have positive size"));
        }
        if let Some(i) = self.blocks.iter().position(|b| !has_size(b.width, b.height)) {
            return invalid(format!("block {i} must have positive size"));
        }
        if let Some(i) = self.coins.iter().position(|c| !(c.size > 0.0)) {
            return invalid(format!("coin {i} must have positive size"));
        }
        Ok(())
    }
}

fn has_size(w: f32, h: f32) -> bool {
    w > 0.0 && h > 0.0
}
