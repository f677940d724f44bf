/// Keyboard state tracker and intent mapping.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement and push while a key is held
///   - Edge-triggered jump (only fires on initial press)
///   - Move + push + jump in the same tick
///
/// Release events are honored when the terminal reports them (keyboard
/// enhancement). Otherwise a key counts as released once it has been quiet
/// for `HOLD_TIMEOUT`.
///
/// ## Bindings
/// ┌──────────┬──────────────────┬─────────┐
/// │ Action    │ Keys              │ Trigger │
/// ├──────────┼──────────────────┼─────────┤
/// │ Left      │ ← A               │ held    │
/// │ Right     │ → D               │ held    │
/// │ Jump      │ ↑ W Space         │ press   │
/// │ Push      │ E P               │ held    │
/// │ Restart   │ R                 │ press   │
/// │ Quit      │ Esc Q Ctrl-C      │ press   │
/// └──────────┴──────────────────┴─────────┘

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Intents;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char(' ')];
const KEYS_PUSH: &[KeyCode] = &[KeyCode::Char('e'), KeyCode::Char('E'), KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// `drain_events()` call.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl-C detection.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.begin_frame();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key);
            }
        }

        self.expire(Instant::now());
    }

    fn begin_frame(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
    }

    /// Fold one key event into the held/fresh sets.
    fn record(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Unconfirmed release reports are ignored; the timeout handles it.
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Drop keys that have gone quiet (fallback for terminals without Release).
    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Convenience: is any of these keys held?
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Convenience: was any of these keys freshly pressed this frame?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Intent mapping ──

    /// Intents for the next tick. Jump only on a fresh press, so holding the
    /// key does not bunny-hop.
    pub fn intents(&self) -> Intents {
        Intents {
            left: self.any_held(KEYS_LEFT),
            right: self.any_held(KEYS_RIGHT),
            jump: self.any_pressed(KEYS_JUMP),
            push: self.any_held(KEYS_PUSH),
        }
    }

    pub fn restart_requested(&self) -> bool {
        self.any_pressed(KEYS_RESTART)
    }

    pub fn quit_requested(&self) -> bool {
        self.ctrl_c_pressed() || self.any_pressed(KEYS_QUIT)
    }
}
