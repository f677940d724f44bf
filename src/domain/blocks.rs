/// Push-block dynamics.
///
/// ## Per-block order (each tick, blocks in spawn order)
///
///   1. Gravity (skipped while settled)
///   2. Hole entry: center over the primary hole at ground level → `in_hole`
///   3. Ground rest (not in a hole)
///   4. Hole rest: snap to the hole floor, pin `x` to the hole's left edge
///   5. Platform rest, or lose support when airborne off every platform
///   6. Player push
///   7. Block-vs-block resolution against every other block
///   8. Player-vs-block horizontal push-out
///
/// After the per-block loop, `separate_blocks` clears any overlap that
/// step 7 left behind (one block resolved against B can be pushed into C).
///
/// ## Levels
///
/// `ground_y` is the top y of a block (or player) standing on the ground.
/// The hole floor sits one player height lower. A block that reached the
/// hole floor fills the hole at a fixed position; `in_hole` never reverts.

use super::entity::{Hole, Platform, Player, PushBlock};
use super::geom::{penetration, Rect};
use crate::config::PhysicsConfig;

/// Overlaps at or below this are treated as touching by the separation sweep.
pub const SEPARATION_EPSILON: f32 = 1e-3;

/// Static terrain the blocks interact with.
pub struct Terrain<'a> {
    pub platforms: &'a [Platform],
    pub hole: Hole,
    pub ground_y: f32,
    pub hole_floor_y: f32,
}

// ── Steps 1-5: vertical motion and resting ──

pub fn fall(block: &mut PushBlock, dt: f32, gravity: f32) {
    if !block.settled {
        block.velocity_y += gravity * dt;
        block.y += block.velocity_y * dt;
    }
}

/// Start dropping into the primary hole. Returns true on entry.
pub fn enter_hole(block: &mut PushBlock, terrain: &Terrain) -> bool {
    let center = block.rect().center_x();
    if !block.in_hole && block.y >= terrain.ground_y && terrain.hole.contains_x(center) {
        block.in_hole = true;
        block.settled = false;
        true
    } else {
        false
    }
}

pub fn rest_on_ground(block: &mut PushBlock, terrain: &Terrain) {
    if !block.in_hole && block.y >= terrain.ground_y {
        block.rest_at(terrain.ground_y);
    }
}

/// Snap to the hole floor. Returns true if the block came to rest there
/// this tick (it was not already settled).
pub fn rest_in_hole(block: &mut PushBlock, terrain: &Terrain) -> bool {
    if block.in_hole && block.y >= terrain.hole_floor_y {
        let was_settled = block.settled;
        block.rest_at(terrain.hole_floor_y);
        block.x = terrain.hole.x;
        !was_settled
    } else {
        false
    }
}

/// Rest on any platform whose top is within `tolerance` below the block's
/// bottom edge. Later matches re-snap, so the last listed platform wins.
/// With no support and above ground, the block is released to fall.
pub fn rest_on_platforms(block: &mut PushBlock, terrain: &Terrain, tolerance: f32) {
    let mut supported = false;
    for platform in terrain.platforms {
        let top = platform.rect();
        let bottom = block.bottom();
        if block.velocity_y >= 0.0
            && block.rect().overlaps_x(&top)
            && bottom >= top.y
            && bottom <= top.bottom() + tolerance
        {
            block.rest_at(top.y - block.height);
            supported = true;
        }
    }
    if !supported && block.y < terrain.ground_y && !block.in_hole {
        block.settled = false;
    }
}

// ── Step 6: player push ──

/// Player stands flush against either side of the block (within `tolerance`)
/// and overlaps it vertically.
pub fn side_touch(player: &Player, block: &PushBlock, tolerance: f32) -> bool {
    let p = player.rect();
    let b = block.rect();
    p.overlaps_y(&b)
        && ((p.right() - b.x).abs() < tolerance || (p.x - b.right()).abs() < tolerance)
}

/// Returns true if the block was pushed.
pub fn push(block: &mut PushBlock, player: &Player, cfg: &PhysicsConfig, dt: f32) -> bool {
    let directed = player.moving_left || player.moving_right;
    if !player.pushing || !directed || !side_touch(player, block, cfg.touch_tolerance) {
        return false;
    }
    if player.moving_right { block.x += cfg.push_force * dt; }
    if player.moving_left { block.x -= cfg.push_force * dt; }
    block.settled = false;
    true
}

// ── Step 7: block vs block ──

/// Resolve `block` against one other block. Only `block` moves.
pub fn resolve_pair(block: &mut PushBlock, other: &PushBlock) {
    if block.in_hole || other.in_hole {
        return;
    }
    let (ox, oy) = penetration(&block.rect(), &other.rect());
    if ox <= 0.0 || oy <= 0.0 {
        return;
    }
    if block.velocity_y >= 0.0 && oy < ox && block.y < other.y {
        block.y -= oy;
        block.velocity_y = 0.0;
        block.settled = true;
    } else if block.x < other.x {
        block.x -= ox;
    } else {
        block.x += ox;
    }
}

// ── Step 8: player vs block ──

/// Push the player out sideways when the overlap is narrower than it is tall.
pub fn push_player_out(player: &mut Player, block: &Rect) {
    let (ox, oy) = penetration(&player.rect(), block);
    if ox > 0.0 && oy > 0.0 && ox < oy {
        if player.x < block.x {
            player.x -= ox;
        } else {
            player.x += ox;
        }
    }
}

// ── Separation sweep ──

fn still_overlapping(a: &Rect, b: &Rect) -> bool {
    let (ox, oy) = penetration(a, b);
    ox > SEPARATION_EPSILON && oy > SEPARATION_EPSILON
}

/// Clear every remaining overlap between blocks that are not in a hole.
///
/// Blocks are placed in ascending `(x, index)` order. Each block is moved
/// clear of every block placed before it: onto its top when the overlap is
/// shallower vertically and the block sits higher, otherwise flush against
/// its right edge. A placed block never moves again, and a moving block
/// only goes right or up, so the sweep terminates.
pub fn separate_blocks(blocks: &mut [PushBlock]) {
    let mut order: Vec<usize> = (0..blocks.len()).filter(|&i| !blocks[i].in_hole).collect();
    order.sort_by(|&a, &b| {
        blocks[a].x.total_cmp(&blocks[b].x).then(a.cmp(&b))
    });

    let max_moves = 4 * blocks.len() * blocks.len() + 4;
    let mut placed: Vec<usize> = Vec::with_capacity(order.len());

    for &i in &order {
        let mut moves = 0;
        loop {
            let rect = blocks[i].rect();
            let hit = placed.iter().copied().find(|&j| still_overlapping(&rect, &blocks[j].rect()));
            let Some(j) = hit else { break };
            if moves >= max_moves {
                log::warn!("block {i} could not be separated after {moves} moves");
                break;
            }
            moves += 1;

            let other = blocks[j].rect();
            let (ox, oy) = penetration(&rect, &other);
            let block = &mut blocks[i];
            if oy < ox && block.y < other.y {
                block.y = other.y - block.height;
                block.velocity_y = 0.0;
                block.settled = true;
            } else {
                block.x = other.right();
            }
        }
        placed.push(i);
    }
}

// ── Driver ──

/// Run all block steps for one tick. Returns the indices of blocks that
/// came to rest on the hole floor this tick.
pub fn update_blocks(
    blocks: &mut [PushBlock],
    player: &mut Player,
    terrain: &Terrain,
    cfg: &PhysicsConfig,
    dt: f32,
) -> Vec<usize> {
    let mut filled = Vec::new();

    for i in 0..blocks.len() {
        let mut block = blocks[i].clone();

        fall(&mut block, dt, cfg.gravity);
        if enter_hole(&mut block, terrain) {
            log::debug!("block {i} dropping into hole at x={}", terrain.hole.x);
        }
        rest_on_ground(&mut block, terrain);
        if rest_in_hole(&mut block, terrain) {
            filled.push(i);
        }
        rest_on_platforms(&mut block, terrain, cfg.rest_tolerance);
        push(&mut block, player, cfg, dt);

        for (j, other) in blocks.iter().enumerate() {
            if j != i {
                resolve_pair(&mut block, other);
            }
        }

        push_player_out(player, &block.rect());
        blocks[i] = block;
    }

    separate_blocks(blocks);
    filled
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
