/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub timing: TimingConfig,
    pub player: PlayerIdentity,
    /// Level definition file. `None` = built-in level.
    pub level_file: Option<PathBuf>,
}

/// Tunables for kinematics, block dynamics and triggers.
/// Distances are world units, times are seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub player_size: f32,
    pub move_speed: f32,
    pub push_force: f32,
    pub gravity: f32,
    pub jump_force: f32,      // negative = upward
    pub fall_limit: f32,      // player y past this costs a life
    pub camera_lead: f32,     // camera_x = player_x - camera_lead
    pub touch_tolerance: f32, // player/block side contact for pushing
    pub rest_tolerance: f32,  // block/platform top contact band
    pub lives: u32,
    pub star_three_below: f32,
    pub star_two_below: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    /// Sub-step length in ms; 0 = one step per frame with the raw delta.
    pub fixed_step_ms: u64,
}

/// Identity attached to the completion report.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerIdentity {
    pub student_name: String,
    pub class_name: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_player_size")]
    player_size: f32,
    #[serde(default = "default_move_speed")]
    move_speed: f32,
    #[serde(default = "default_push_force")]
    push_force: f32,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_jump_force")]
    jump_force: f32,
    #[serde(default = "default_fall_limit")]
    fall_limit: f32,
    #[serde(default = "default_camera_lead")]
    camera_lead: f32,
    #[serde(default = "default_touch_tolerance")]
    touch_tolerance: f32,
    #[serde(default = "default_rest_tolerance")]
    rest_tolerance: f32,
    #[serde(default = "default_lives")]
    lives: u32,
    #[serde(default = "default_star_three")]
    star_three_below: f32,
    #[serde(default = "default_star_two")]
    star_two_below: f32,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default)]
    fixed_step_ms: u64,
}

#[derive(Deserialize, Debug, Default)]
struct TomlPlayer {
    #[serde(default)]
    student_name: String,
    #[serde(default)]
    class_name: String,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    level_file: String,
}

// ── Defaults ──

fn default_player_size() -> f32 { 80.0 }
fn default_move_speed() -> f32 { 400.0 }
fn default_push_force() -> f32 { 260.0 }
fn default_gravity() -> f32 { 2500.0 }
fn default_jump_force() -> f32 { -1100.0 }  // apex ≈ 242 units above take-off
fn default_fall_limit() -> f32 { 1500.0 }
fn default_camera_lead() -> f32 { 200.0 }
fn default_touch_tolerance() -> f32 { 10.0 }
fn default_rest_tolerance() -> f32 { 10.0 }
fn default_lives() -> u32 { 3 }
fn default_star_three() -> f32 { 15.0 }
fn default_star_two() -> f32 { 30.0 }
fn default_tick_rate() -> u64 { 16 }      // ~60 fps

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            player_size: default_player_size(),
            move_speed: default_move_speed(),
            push_force: default_push_force(),
            gravity: default_gravity(),
            jump_force: default_jump_force(),
            fall_limit: default_fall_limit(),
            camera_lead: default_camera_lead(),
            touch_tolerance: default_touch_tolerance(),
            rest_tolerance: default_rest_tolerance(),
            lives: default_lives(),
            star_three_below: default_star_three(),
            star_two_below: default_star_two(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            fixed_step_ms: 0,
        }
    }
}

impl From<TomlPhysics> for PhysicsConfig {
    fn from(t: TomlPhysics) -> Self {
        PhysicsConfig {
            player_size: t.player_size,
            move_speed: t.move_speed,
            push_force: t.push_force,
            gravity: t.gravity,
            jump_force: t.jump_force,
            fall_limit: t.fall_limit,
            camera_lead: t.camera_lead,
            touch_tolerance: t.touch_tolerance,
            rest_tolerance: t.rest_tolerance,
            lives: t.lives,
            star_three_below: t.star_three_below,
            star_two_below: t.star_two_below,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        TomlPhysics::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut cfg = load_toml(&search_dirs);

        // Relative level paths resolve against the first dir that has them.
        if let Some(rel) = cfg.level_file.clone().filter(|p| p.is_relative()) {
            if let Some(found) = search_dirs.iter().map(|d| d.join(&rel)).find(|p| p.is_file()) {
                cfg.level_file = Some(found);
            }
        }
        cfg
    }

    /// Parse a config document. Missing sections and keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::from_schema(toml_cfg))
    }

    fn from_schema(t: TomlConfig) -> Self {
        let level_file = if t.general.level_file.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(t.general.level_file.trim()))
        };
        GameConfig {
            physics: t.physics.into(),
            timing: TimingConfig {
                tick_rate_ms: t.timing.tick_rate_ms,
                fixed_step_ms: t.timing.fixed_step_ms,
            },
            player: PlayerIdentity {
                student_name: t.player.student_name,
                class_name: t.player.class_name,
            },
            level_file,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_schema(TomlConfig::default())
    }
}

/// Candidate directories to search: exe dir + CWD + XDG config (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG config home (~/.config/aventura)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".config/aventura");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> GameConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match GameConfig::from_toml_str(&text) {
                    Ok(cfg) => {
                        log::info!("loaded {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        log::warn!("config.toml parse error: {e}; using default settings");
                        return GameConfig::default();
                    }
                },
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    GameConfig::default()
}
