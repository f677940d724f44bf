/// Player kinematics: horizontal movement, jump impulse, gravity, landing.
///
/// ## Per-tick order
///
///   1. Jump (edge-triggered, only while `velocity_y == 0.0`)
///   2. Horizontal move (`left` and `right` are additive)
///   3. Gravity: always integrated, grounded or not
///   4. Landing against every platform, in list order
///
/// ## Grounded test
///
/// There is no contact tracking. The player counts as grounded exactly when
/// its vertical velocity reads zero, which is what a landing snap leaves
/// behind. At the apex of a jump the velocity can also pass through zero;
/// that quirk is part of the game's feel and is kept.
///
/// ## Landing tie-break
///
/// Platforms are checked independently in list order. A landing zeroes the
/// velocity, which fails the `velocity_y > 0` guard of every later check in
/// the same pass, so the first matching platform in list order wins.

use super::entity::{Intents, Platform, Player};
use super::geom::Rect;
use crate::config::PhysicsConfig;

/// Apply the jump impulse if requested and grounded. Returns true if it fired.
pub fn try_jump(player: &mut Player, jump: bool, jump_force: f32) -> bool {
    if jump && player.velocity_y == 0.0 {
        player.velocity_y = jump_force;
        true
    } else {
        false
    }
}

/// `x += dt * speed` per held direction.
pub fn move_horizontal(player: &mut Player, dt: f32, speed: f32) {
    if player.moving_left { player.x -= speed * dt; }
    if player.moving_right { player.x += speed * dt; }
}

/// Semi-implicit Euler: velocity first, then position.
pub fn integrate_gravity(player: &mut Player, dt: f32, gravity: f32) {
    player.velocity_y += gravity * dt;
    player.y += player.velocity_y * dt;
}

/// Land on top of `surface` if falling into its vertical band while
/// horizontally overlapping it. Returns true on landing.
pub fn land_on(player: &mut Player, surface: &Rect) -> bool {
    let bottom = player.bottom();
    if player.velocity_y > 0.0
        && player.rect().overlaps_x(surface)
        && bottom > surface.y
        && bottom < surface.bottom()
    {
        player.y = surface.y - player.size;
        player.velocity_y = 0.0;
        true
    } else {
        false
    }
}

/// Landing pass over all platforms. Returns true if any platform caught the player.
pub fn land_on_platforms(player: &mut Player, platforms: &[Platform]) -> bool {
    let mut landed = false;
    for platform in platforms {
        landed |= land_on(player, &platform.rect());
    }
    landed
}

/// Full kinematics for one tick. Returns true if a jump fired.
pub fn advance_player(
    player: &mut Player,
    intents: Intents,
    dt: f32,
    cfg: &PhysicsConfig,
    platforms: &[Platform],
) -> bool {
    player.apply_intents(intents);
    let jumped = try_jump(player, intents.jump, cfg.jump_force);
    move_horizontal(player, dt, cfg.move_speed);
    integrate_gravity(player, dt, cfg.gravity);
    land_on_platforms(player, platforms);
    jumped
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.016;

    fn cfg() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn ground() -> Vec<Platform> {
        vec![Platform::new(0.0, 780.0, 800.0, 100.0)]
    }

    fn standing_player() -> Player {
        Player::new(100.0, 700.0, 80.0, 3)
    }

    // ── Horizontal ──

    #[test]
    fn moves_right_by_speed_times_dt() {
        let mut p = standing_player();
        let intents = Intents { right: true, ..Intents::default() };
        advance_player(&mut p, intents, DT, &cfg(), &ground());
        assert!((p.x - (100.0 + 400.0 * DT)).abs() < 1e-3);
    }

    #[test]
    fn left_and_right_cancel() {
        let mut p = standing_player();
        let intents = Intents { left: true, right: true, ..Intents::default() };
        advance_player(&mut p, intents, DT, &cfg(), &ground());
        assert!((p.x - 100.0).abs() < 1e-3);
    }

    // ── Gravity / landing ──

    #[test]
    fn standing_player_stays_on_ground() {
        let mut p = standing_player();
        for _ in 0..100 {
            advance_player(&mut p, Intents::default(), DT, &cfg(), &ground());
            assert_eq!(p.y, 700.0);
            assert_eq!(p.velocity_y, 0.0);
        }
    }

    #[test]
    fn falls_without_platform() {
        let mut p = standing_player();
        advance_player(&mut p, Intents::default(), DT, &cfg(), &[]);
        assert!(p.y > 700.0);
        assert!(p.velocity_y > 0.0);
    }

    #[test]
    fn rising_player_passes_through_platform() {
        let mut p = standing_player();
        p.velocity_y = -500.0;
        p.y = 750.0; // bottom inside the band, but moving up
        let landed = land_on_platforms(&mut p, &ground());
        assert!(!landed);
        assert_eq!(p.velocity_y, -500.0);
    }

    #[test]
    fn landing_needs_horizontal_overlap() {
        let mut p = Player::new(800.0, 701.0, 80.0, 3);
        p.velocity_y = 100.0;
        assert!(!land_on_platforms(&mut p, &ground()));
    }

    #[test]
    fn first_listed_platform_wins_on_overlap() {
        // Two platforms whose bands both contain the player's bottom edge.
        let platforms = vec![
            Platform::new(0.0, 500.0, 200.0, 30.0),
            Platform::new(0.0, 490.0, 200.0, 30.0),
        ];
        let mut p = Player::new(50.0, 425.0, 80.0, 3);
        p.velocity_y = 200.0;
        assert!(land_on_platforms(&mut p, &platforms));
        assert_eq!(p.y, 420.0);
        assert_eq!(p.velocity_y, 0.0);
    }

    // ── Jump ──

    #[test]
    fn jump_from_ground() {
        let mut p = standing_player();
        let jumped = advance_player(
            &mut p, Intents { jump: true, ..Intents::default() }, DT, &cfg(), &ground(),
        );
        assert!(jumped);
        assert!(p.y < 700.0);
        assert!((p.velocity_y - (-1100.0 + 2500.0 * DT)).abs() < 1e-2);
    }

    #[test]
    fn no_jump_while_airborne() {
        let mut p = standing_player();
        p.velocity_y = 120.0;
        assert!(!try_jump(&mut p, true, -1100.0));
        assert_eq!(p.velocity_y, 120.0);
    }

    #[test]
    fn jump_full_arc_returns_to_ground() {
        let mut p = standing_player();
        advance_player(&mut p, Intents { jump: true, ..Intents::default() }, DT, &cfg(), &ground());
        let mut apex = p.y;
        for _ in 0..200 {
            advance_player(&mut p, Intents::default(), DT, &cfg(), &ground());
            apex = apex.min(p.y);
        }
        assert_eq!(p.y, 700.0);
        assert_eq!(p.velocity_y, 0.0);
        // v²/2g = 242: apex lands near 458 given discrete steps
        assert!(apex < 480.0 && apex > 440.0, "apex {apex}");
    }
}
