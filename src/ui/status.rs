/// Terminal status readout: a few text lines describing the running level.
///
/// Layout:
///   row 0  level name, lives, coins, timer, checkpoint
///   row 1  player position, camera, vertical speed
///   row 2  course strip (whole level squeezed into the terminal width)
///   row 3  block states
///   row 4  phase banner, or the latest event message while playing
///   row 5  key help
///
/// Course strip legend: `=` ground, ` ` hole, `B` block, `o` coin,
/// `N` NPC, `F`/`f` flag raised/lowered, `E` end zone, `@` player.
///
/// Everything is queued and flushed once per frame.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};

use crate::sim::world::{Phase, WorldState};

const HELP: &str = "[<-/A ->/D] move  [Up/W/Space] jump  [E/P] push  [R] restart  [Q/Esc] quit";

pub struct StatusLine {
    writer: BufWriter<io::Stdout>,
    enhanced: bool,
    message: String,
}

impl StatusLine {
    pub fn new() -> Self {
        StatusLine {
            writer: BufWriter::with_capacity(4096, io::stdout()),
            enhanced: false,
            message: String::new(),
        }
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
    }

    /// Raw mode, alternate screen, hidden cursor. Returns whether the
    /// terminal will report key releases.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced = true;
        }
        Ok(self.enhanced)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn draw(&mut self, world: &WorldState) -> io::Result<()> {
        let (cols, _) = terminal::size().unwrap_or((80, 24));
        let cols = cols.max(20) as usize;

        let lines = [
            summary_line(world),
            motion_line(world),
            course_strip(world, cols),
            blocks_line(world),
            banner(world, &self.message),
            HELP.to_string(),
        ];

        for (row, line) in lines.iter().enumerate() {
            let clipped: String = line.chars().take(cols).collect();
            queue!(
                self.writer,
                MoveTo(0, row as u16),
                Clear(ClearType::CurrentLine),
                Print(clipped)
            )?;
        }
        self.writer.flush()
    }
}

// ── Line builders ──

fn summary_line(world: &WorldState) -> String {
    let checkpoint = match world.checkpoint_time() {
        Some(t) => format!("{t:.1}s"),
        None => "--".to_string(),
    };
    format!(
        "{}  lives {}  coins {}/{}  time {:.1}s  checkpoint {}",
        world.level.name,
        world.lives(),
        world.coins_collected(),
        world.coins().len(),
        world.elapsed(),
        checkpoint,
    )
}

fn motion_line(world: &WorldState) -> String {
    let p = world.player_rect();
    format!(
        "x {:.0}  y {:.0}  vy {:.0}  camera {:.0}  tick {}",
        p.x, p.y, world.player.velocity_y, world.camera_x(), world.tick,
    )
}

fn blocks_line(world: &WorldState) -> String {
    let parts: Vec<String> = world
        .blocks()
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let state = if b.in_hole && b.settled {
                "filling hole"
            } else if b.in_hole {
                "dropping"
            } else if b.settled {
                "resting"
            } else {
                "falling"
            };
            format!("#{i} x={:.0} {state}", b.x)
        })
        .collect();
    format!("blocks: {}", parts.join("  "))
}

fn banner(world: &WorldState, message: &str) -> String {
    match world.phase() {
        Phase::Playing => message.to_string(),
        Phase::LevelComplete => {
            let stars = world.stars().unwrap_or(0) as usize;
            format!(
                "LEVEL COMPLETE  {}{}  in {:.1}s  [R] play again  [Q] quit",
                "*".repeat(stars),
                ".".repeat(3 - stars.min(3)),
                world.progress.completion_time,
            )
        }
        Phase::GameOver => format!(
            "GAME OVER  coins {}  [R] try again  [Q] quit",
            world.coins_collected(),
        ),
    }
}

/// One character per column over `[0, end_zone.right)`.
fn course_strip(world: &WorldState, cols: usize) -> String {
    let span = world.end_zone().right().max(1.0);
    let scale = span / cols as f32;
    let col_of = |x: f32| -> Option<usize> {
        let c = (x / scale).floor();
        (c >= 0.0 && (c as usize) < cols).then_some(c as usize)
    };

    let mut strip = vec![' '; cols];
    for platform in world.platforms().iter().filter(|p| p.is_ground()) {
        let r = platform.rect();
        for (c, cell) in strip.iter_mut().enumerate() {
            let mid = (c as f32 + 0.5) * scale;
            if mid >= r.x && mid < r.right() {
                *cell = '=';
            }
        }
    }

    let mut mark = |x: f32, ch: char| {
        if let Some(c) = col_of(x) {
            strip[c] = ch;
        }
    };
    for coin in world.coins().iter().filter(|c| !c.collected) {
        mark(coin.rect().center_x(), 'o');
    }
    for block in world.blocks() {
        mark(block.rect().center_x(), 'B');
    }
    mark(world.npc().rect().center_x(), 'N');
    mark(world.flag_zone().center_x(), if world.flag_raised() { 'F' } else { 'f' });
    mark(world.end_zone().center_x(), 'E');
    mark(world.player_rect().center_x(), '@');

    strip.into_iter().collect()
}
