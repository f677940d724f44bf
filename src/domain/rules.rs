/// Interaction and trigger rules: what the player bumps into, what it
/// picks up, and which one-shot triggers it fires.
///
/// These functions only look at (and push) the rectangles they are given;
/// the step driver owns the flags, counters and events.
///
/// ## Blocking obstacles
/// ┌──────────────────┬───────────────────────────────┬───────────────────────────┐
/// │ Obstacle          │ Blocks when                    │ Player pushed to          │
/// ├──────────────────┼───────────────────────────────┼───────────────────────────┤
/// │ NPC               │ rects overlap                  │ nearer side of the NPC    │
/// │ Secondary hole    │ x-overlap and bottom ≥ ground  │ side of the hole center   │
/// │ Block (side)      │ overlap narrower than tall     │ away from block, by dx    │
/// └──────────────────┴───────────────────────────────┴───────────────────────────┘
///
/// ## Star rating
/// ┌──────────────────────┬───────┐
/// │ Elapsed (s)           │ Stars │
/// ├──────────────────────┼───────┤
/// │ < three_below (15)    │ 3     │
/// │ < two_below (30)      │ 2     │
/// │ otherwise             │ 1     │
/// └──────────────────────┴───────┘

use super::entity::{Coin, Hole, Player, PushBlock};
use super::geom::{overlaps, Rect};
use super::physics;

/// Player-vs-block landing, same rule as platform landing, checked against
/// every block's current rectangle.
pub fn land_on_blocks(player: &mut Player, blocks: &[PushBlock]) -> bool {
    let mut landed = false;
    for block in blocks {
        landed |= physics::land_on(player, &block.rect());
    }
    landed
}

/// Keep the player fully outside the NPC. Returns true if it pushed.
pub fn push_out_of_npc(player: &mut Player, npc: &Rect) -> bool {
    if !overlaps(&player.rect(), npc) {
        return false;
    }
    if player.x < npc.x {
        player.x = npc.x - player.size;
    } else {
        player.x = npc.right();
    }
    true
}

/// The secondary hole can't be walked into at ground level.
/// Returns true if it pushed.
pub fn push_out_of_hole(player: &mut Player, hole: &Hole, ground_y: f32) -> bool {
    let inside = player.x + player.size > hole.x
        && player.x < hole.right()
        && player.bottom() >= ground_y;
    if !inside {
        return false;
    }
    if player.x < hole.center() {
        player.x = hole.x - player.size;
    } else {
        player.x = hole.right();
    }
    true
}

/// Player dropped past the bottom of the world.
pub fn fell_out(player: &Player, fall_limit: f32) -> bool {
    player.y > fall_limit
}

/// Mark every uncollected coin the player touches. Returns their indices.
pub fn collect_coins(player: &Rect, coins: &mut [Coin]) -> Vec<usize> {
    let mut picked = Vec::new();
    for (i, coin) in coins.iter_mut().enumerate() {
        if !coin.collected && overlaps(player, &coin.rect()) {
            coin.collected = true;
            picked.push(i);
        }
    }
    picked
}

/// Player intersects a trigger zone (flag, end zone).
#[inline]
pub fn touches_zone(player: &Rect, zone: &Rect) -> bool {
    overlaps(player, zone)
}

/// Derive the 1-3 star rating from completion time.
pub fn star_rating(elapsed: f32, three_below: f32, two_below: f32) -> u8 {
    if elapsed < three_below {
        3
    } else if elapsed < two_below {
        2
    } else {
        1
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
