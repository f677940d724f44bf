/// The step function: advances the world by one tick of `dt` seconds.
///
/// Processing order:
///   1. Timer
///   2. Player kinematics (jump, move, gravity, platform landing)
///   3. Block dynamics (per block, then separation sweep)
///   4. Player landing on blocks
///   5. Broken-bridge blocking, then the NPC (last, so nothing can leave
///      the player inside it)
///   6. Fall / respawn / game over
///   7. Coin pickup
///   8. Checkpoint trigger
///   9. Completion trigger
///
/// Outside `Phase::Playing` nothing moves and no events fire, so the timer
/// and all positions freeze after game over or completion.
///
/// `dt` is used as given. Large deltas after a stall are not clamped and can
/// carry a fast-falling body through a thin platform in one tick; hosts that
/// care can split the delta with `fixed_steps`.

use crate::domain::blocks;
use crate::domain::entity::Intents;
use crate::domain::physics;
use crate::domain::rules;
use super::event::GameEvent;
use super::world::{terrain, Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, dt: f32, intents: Intents) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;
    world.progress.elapsed += dt;

    resolve_player(world, dt, intents, &mut events);
    resolve_blocks(world, dt, &mut events);
    resolve_obstacles(world);
    if resolve_fall(world, &mut events) {
        return events;
    }
    resolve_coins(world, &mut events);
    resolve_checkpoint(world, &mut events);
    resolve_completion(world, &mut events);

    events
}

/// Split a frame delta into `step_ms` sub-steps (the remainder goes into the
/// last one). `step_ms == 0` returns the frame delta unchanged.
pub fn fixed_steps(frame_dt: f32, step_ms: u64) -> Vec<f32> {
    if step_ms == 0 || frame_dt <= 0.0 {
        return vec![frame_dt];
    }
    let step = step_ms as f32 / 1000.0;
    let mut steps = Vec::new();
    let mut left = frame_dt;
    while left > step {
        steps.push(step);
        left -= step;
    }
    steps.push(left);
    steps
}

// ══════════════════════════════════════════════════════════════
// Kinematics and blocks
// ══════════════════════════════════════════════════════════════

fn resolve_player(world: &mut WorldState, dt: f32, intents: Intents, events: &mut Vec<GameEvent>) {
    let jumped = physics::advance_player(
        &mut world.player, intents, dt, &world.physics, &world.level.platforms,
    );
    if jumped {
        events.push(GameEvent::Jumped);
    }
}

fn resolve_blocks(world: &mut WorldState, dt: f32, events: &mut Vec<GameEvent>) {
    let terrain = terrain(&world.level, &world.physics);
    let filled = blocks::update_blocks(
        &mut world.blocks, &mut world.player, &terrain, &world.physics, dt,
    );
    for index in filled {
        log::info!("block {index} filled the hole");
        events.push(GameEvent::BlockSettledInHole { index });
    }
}

// ══════════════════════════════════════════════════════════════
// Interaction
// ══════════════════════════════════════════════════════════════

fn resolve_obstacles(world: &mut WorldState) {
    rules::land_on_blocks(&mut world.player, &world.blocks);
    rules::push_out_of_hole(&mut world.player, &world.level.secondary_hole, world.level.ground_y);
    rules::push_out_of_npc(&mut world.player, &world.level.npc.rect());
}

/// Returns true if the run just ended.
fn resolve_fall(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if !rules::fell_out(&world.player, world.physics.fall_limit) {
        return false;
    }

    world.player.lives = world.player.lives.saturating_sub(1);
    let remaining = world.player.lives;
    events.push(GameEvent::LifeLost { remaining });

    if remaining == 0 {
        log::info!("game over at {:.2}s with {} coins", world.progress.elapsed, world.progress.coins_collected);
        world.player.halt();
        world.phase = Phase::GameOver;
        events.push(GameEvent::GameOver { coins: world.progress.coins_collected });
        return true;
    }

    log::info!("life lost, {remaining} left");
    let (x, y) = (world.level.start_x, world.level.start_y);
    world.player.respawn(x, y);
    world.flag_raised = false;
    false
}

fn resolve_coins(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let picked = rules::collect_coins(&world.player.rect(), &mut world.coins);
    for index in picked {
        world.progress.coins_collected += 1;
        events.push(GameEvent::CoinCollected {
            index,
            total: world.progress.coins_collected,
        });
    }
}

fn resolve_checkpoint(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.progress.checkpoint_reached {
        return;
    }
    if rules::touches_zone(&world.player.rect(), &world.level.flag) {
        let time = world.progress.elapsed;
        world.progress.checkpoint_reached = true;
        world.progress.checkpoint_time = time;
        world.flag_raised = true;
        log::info!("checkpoint reached at {time:.2}s");
        events.push(GameEvent::CheckpointReached { time });
    }
}

fn resolve_completion(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.progress.completed {
        return;
    }
    if !rules::touches_zone(&world.player.rect(), &world.level.end_zone) {
        return;
    }

    let elapsed = world.progress.elapsed;
    let stars = rules::star_rating(
        elapsed, world.physics.star_three_below, world.physics.star_two_below,
    );
    let progress = &mut world.progress;
    progress.completed = true;
    progress.completion_time = elapsed;
    progress.stars = stars;
    world.player.halt();
    world.phase = Phase::LevelComplete;

    log::info!("level complete in {elapsed:.2}s, {stars} stars");
    events.push(GameEvent::LevelCompleted {
        elapsed,
        checkpoint_time: world.checkpoint_time(),
        coins: world.progress.coins_collected,
        stars,
    });
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::domain::geom::{overlaps, penetration};
    use crate::sim::level::LevelDef;

    const DT: f32 = 0.016;

    fn world() -> WorldState {
        WorldState::new(LevelDef::builtin(), PhysicsConfig::default())
    }

    fn idle() -> Intents {
        Intents::default()
    }

    fn right() -> Intents {
        Intents { right: true, ..Intents::default() }
    }

    fn run(world: &mut WorldState, ticks: usize, intents: Intents) -> Vec<GameEvent> {
        let mut all = Vec::new();
        for _ in 0..ticks {
            all.extend(step(world, DT, intents));
        }
        all
    }

    fn drop_player_in_pit(world: &mut WorldState) {
        // Deep inside the open primary hole.
        world.player.x = 850.0;
        world.player.y = 1499.0;
        world.player.velocity_y = 500.0;
    }

    // ── Timer / basic motion ──

    #[test]
    fn idle_player_rests_and_timer_runs() {
        let mut w = world();
        let events = run(&mut w, 60, idle());
        assert!(events.is_empty());
        assert_eq!(w.player.y, 700.0);
        assert_eq!(w.player.velocity_y, 0.0);
        assert!((w.elapsed() - 60.0 * DT).abs() < 1e-3);
        assert_eq!(w.tick, 60);
    }

    #[test]
    fn jump_emits_event_once() {
        let mut w = world();
        let jump = Intents { jump: true, ..Intents::default() };
        let events = step(&mut w, DT, jump);
        assert_eq!(events, vec![GameEvent::Jumped]);
        // Still held on the next tick, but airborne.
        assert!(step(&mut w, DT, jump).is_empty());
    }

    #[test]
    fn walking_into_first_block_is_blocked() {
        let mut w = world();
        run(&mut w, 120, right());
        let block = w.blocks[0].rect();
        assert_eq!(block.x, 500.0);
        assert!(w.player_rect().right() <= block.x + 1e-3);
        assert_eq!(w.player.y, 700.0);
    }

    #[test]
    fn pushing_first_block_fills_hole() {
        let mut w = world();
        let push_right = Intents { right: true, push: true, ..Intents::default() };
        let mut events = Vec::new();
        for _ in 0..600 {
            events.extend(step(&mut w, DT, push_right));
            if w.blocks[0].x >= 800.0 {
                break;
            }
        }
        assert!(w.blocks[0].in_hole, "block hung on the edge at {:?}", w.blocks[0]);

        // Let go once it clears the left ground segment; it drops and pins.
        events.extend(run(&mut w, 60, idle()));
        let block = &w.blocks[0];
        assert!(block.settled);
        assert_eq!(block.x, 800.0);
        assert_eq!(block.y, 780.0);
        let settled: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::BlockSettledInHole { .. }))
            .collect();
        assert_eq!(settled, vec![&GameEvent::BlockSettledInHole { index: 0 }]);

        for _ in 0..120 {
            step(&mut w, DT, idle());
            assert!(w.blocks[0].in_hole);
            assert!(w.blocks[0].settled);
            assert_eq!(w.blocks[0].x, 800.0);
            assert_eq!(w.blocks[0].y, 780.0);
        }
    }

    // ── NPC / bridge ──

    #[test]
    fn npc_pushes_airborne_player_back() {
        let mut w = world();
        // Mid-jump, level with the NPC's body.
        w.player.x = 2330.0;
        w.player.y = 560.0;
        w.player.velocity_y = -200.0;
        step(&mut w, DT, right());
        assert_eq!(w.player.x, 2320.0);
        assert!(!overlaps(&w.player_rect(), &w.npc().rect()));
    }

    #[test]
    fn bridge_push_never_leaves_player_in_npc() {
        let mut w = world();
        // Dropping into the pit just past the NPC, still above ground level.
        w.player.x = 2560.0;
        w.player.y = 640.0;
        w.player.velocity_y = 100.0;
        step(&mut w, DT, idle());
        assert!(!overlaps(&w.player_rect(), &w.npc().rect()));
        assert_eq!(w.player.x, 2550.0);
    }

    #[test]
    fn broken_bridge_blocks_from_far_side() {
        let mut w = world();
        w.player.x = 2930.0;
        let left = Intents { left: true, ..Intents::default() };
        run(&mut w, 30, left);
        assert_eq!(w.player.x, 2920.0);
        assert_eq!(w.player.y, 700.0);
    }

    // ── Lives ──

    #[test]
    fn fall_with_three_lives_respawns() {
        let mut w = world();
        drop_player_in_pit(&mut w);
        let events = step(&mut w, DT, idle());
        assert_eq!(events, vec![GameEvent::LifeLost { remaining: 2 }]);
        assert_eq!(w.lives(), 2);
        assert_eq!(w.player.x, 100.0);
        assert_eq!(w.player.y, 700.0);
        assert_eq!(w.player.velocity_y, 0.0);
        assert_eq!(w.phase(), Phase::Playing);
    }

    #[test]
    fn fall_with_last_life_is_game_over_and_freezes() {
        let mut w = world();
        w.player.lives = 1;
        w.progress.coins_collected = 2;
        drop_player_in_pit(&mut w);
        let events = step(&mut w, DT, right());
        assert_eq!(
            events,
            vec![GameEvent::LifeLost { remaining: 0 }, GameEvent::GameOver { coins: 2 }],
        );
        assert_eq!(w.phase(), Phase::GameOver);
        assert!(!w.player.moving_right);
        assert_eq!(w.player.velocity_y, 0.0);

        let elapsed = w.elapsed();
        let pos = w.player_rect();
        assert!(run(&mut w, 30, right()).is_empty());
        assert_eq!(w.elapsed(), elapsed);
        assert_eq!(w.player_rect(), pos);
        assert_eq!(w.lives(), 0);
    }

    #[test]
    fn respawn_lowers_flag_but_keeps_checkpoint() {
        let mut w = world();
        w.player.x = 1150.0;
        let events = step(&mut w, DT, idle());
        assert!(matches!(events[..], [GameEvent::CheckpointReached { .. }]));
        assert!(w.flag_raised());
        let time = w.checkpoint_time();

        drop_player_in_pit(&mut w);
        step(&mut w, DT, idle());
        assert!(!w.flag_raised());
        assert_eq!(w.checkpoint_time(), time);
    }

    // ── Coins ──

    #[test]
    fn coin_counter_matches_collected_flags() {
        let mut w = world();
        // Stand the player on the coin at (600, 350).
        w.player.x = 590.0;
        w.player.y = 340.0;
        let events = step(&mut w, DT, idle());
        assert!(events.contains(&GameEvent::CoinCollected { index: 0, total: 1 }));
        run(&mut w, 120, idle());
        let flagged = w.coins().iter().filter(|c| c.collected).count() as u32;
        assert_eq!(flagged, w.coins_collected());
        assert_eq!(w.coins_collected(), 1);
        assert!(w.coins()[0].collected);
    }

    // ── Checkpoint ──

    #[test]
    fn checkpoint_fires_once_and_time_is_fixed() {
        let mut w = world();
        run(&mut w, 10, idle());
        w.player.x = 1150.0;
        let events = step(&mut w, DT, idle());
        let time = match events[..] {
            [GameEvent::CheckpointReached { time }] => time,
            _ => panic!("expected checkpoint, got {events:?}"),
        };
        assert!((time - 11.0 * DT).abs() < 1e-4);

        let later = run(&mut w, 60, idle());
        assert!(later.iter().all(|e| !matches!(e, GameEvent::CheckpointReached { .. })));
        assert!(w.progress.checkpoint_reached);
        assert_eq!(w.checkpoint_time(), Some(time));
    }

    // ── Completion ──

    fn complete_at(elapsed: f32) -> (WorldState, Vec<GameEvent>) {
        let mut w = world();
        w.progress.elapsed = elapsed - DT;
        w.player.x = 3990.0;
        let events = step(&mut w, DT, idle());
        (w, events)
    }

    #[test]
    fn completion_stars_follow_elapsed_time() {
        for (elapsed, stars) in [(5.0, 3), (14.5, 3), (15.5, 2), (29.5, 2), (30.5, 1), (90.0, 1)] {
            let (w, events) = complete_at(elapsed);
            assert_eq!(w.phase(), Phase::LevelComplete);
            assert_eq!(w.stars(), Some(stars), "elapsed {elapsed}");
            assert!(matches!(
                events[..],
                [GameEvent::LevelCompleted { stars: s, .. }] if s == stars
            ));
        }
    }

    #[test]
    fn completion_event_carries_results() {
        let mut w = world();
        w.progress.checkpoint_reached = true;
        w.progress.checkpoint_time = 4.5;
        w.progress.coins_collected = 3;
        w.progress.elapsed = 10.0;
        w.player.x = 3990.0;
        let events = step(&mut w, DT, right());
        assert_eq!(events.len(), 1);
        match &events[0] {
            GameEvent::LevelCompleted { elapsed, checkpoint_time, coins, stars } => {
                assert!((elapsed - (10.0 + DT)).abs() < 1e-4);
                assert_eq!(*checkpoint_time, Some(4.5));
                assert_eq!(*coins, 3);
                assert_eq!(*stars, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!w.player.moving_right);

        let elapsed = w.elapsed();
        assert!(run(&mut w, 30, right()).is_empty());
        assert_eq!(w.elapsed(), elapsed);
    }

    // ── Fixed steps ──

    #[test]
    fn fixed_steps_split_delta() {
        assert_eq!(fixed_steps(0.05, 0), vec![0.05]);
        let steps = fixed_steps(0.05, 16);
        assert_eq!(steps.len(), 4);
        assert!((steps.iter().sum::<f32>() - 0.05).abs() < 1e-6);
        assert!(steps.iter().all(|s| *s <= 0.016 + 1e-6));
    }

    // ── Invariants over a long run ──

    #[test]
    fn invariants_hold_over_scripted_run() {
        let mut w = world();
        let script = [
            (right(), 80),
            (Intents { right: true, push: true, ..Intents::default() }, 200),
            (Intents { right: true, jump: true, ..Intents::default() }, 1),
            (right(), 300),
            (Intents { left: true, jump: true, ..Intents::default() }, 1),
            (Intents { left: true, ..Intents::default() }, 120),
        ];
        let mut in_hole: Vec<bool> = w.blocks.iter().map(|b| b.in_hole).collect();
        let mut collected: Vec<bool> = w.coins.iter().map(|c| c.collected).collect();
        let mut checkpoint: Option<f32> = None;

        for (intents, ticks) in script {
            for _ in 0..ticks {
                step(&mut w, DT, intents);
                assert!(w.player.x.is_finite() && w.player.y.is_finite());
                for (i, b) in w.blocks.iter().enumerate() {
                    if b.settled { assert_eq!(b.velocity_y, 0.0); }
                    assert!(b.in_hole || !in_hole[i]);
                    in_hole[i] = b.in_hole;
                }
                for (i, c) in w.coins.iter().enumerate() {
                    assert!(c.collected || !collected[i]);
                    collected[i] = c.collected;
                }
                let flagged = w.coins.iter().filter(|c| c.collected).count() as u32;
                assert_eq!(flagged, w.coins_collected());
                if let Some(t) = checkpoint {
                    assert_eq!(w.checkpoint_time(), Some(t));
                }
                checkpoint = w.checkpoint_time();
                assert!(!overlaps(&w.player_rect(), &w.npc().rect()));
                for (i, b) in w.blocks.iter().enumerate() {
                    for other in &w.blocks[i + 1..] {
                        if b.in_hole || other.in_hole { continue; }
                        let (ox, oy) = penetration(&b.rect(), &other.rect());
                        assert!(ox <= 1e-3 || oy <= 1e-3);
                    }
                }
            }
        }
    }
}
