//! The simulation step
//!
//! One tick of ball motion, collision, and scoring. Stages run in a fixed
//! order, each operating on the result of the previous one, so ties between
//! rules are resolved by ordering rather than simultaneously: integrate,
//! wall reflection, paddle reflection, brick collision, miss handling.

use rand::Rng;

use crate::game::state::{GameMode, GamePhase, PlayerSlot, WorldState};

/// Advance the world by one tick. A world that has not been started is
/// frozen; the caller broadcasts the snapshot either way.
pub fn step(world: &mut WorldState, rng: &mut impl Rng) {
    if world.phase != GamePhase::Running {
        return;
    }
    integrate(world);
    reflect_walls(world);
    reflect_paddles(world);
    collide_bricks(world);
    if world.mode == GameMode::Volley {
        resolve_miss(world, rng);
    }
}

fn integrate(world: &mut WorldState) {
    world.ball.x += world.ball.velocity_x;
    world.ball.y += world.ball.velocity_y;
}

fn reflect_walls(world: &mut WorldState) {
    let ball = &mut world.ball;
    if ball.x + ball.radius > world.canvas.width || ball.x - ball.radius < 0.0 {
        ball.velocity_x = -ball.velocity_x;
    }
    // In volley mode the bottom boundary is open water, handled by the miss
    // rule; in breakout it is a fourth wall. One combined test per axis so a
    // tick flips the vertical sign at most once.
    let crossed_top = ball.y - ball.radius < 0.0;
    let crossed_bottom = world.mode == GameMode::Breakout
        && ball.y + ball.radius > world.canvas.height;
    if crossed_top || crossed_bottom {
        ball.velocity_y = -ball.velocity_y;
    }
}

fn reflect_paddles(world: &mut WorldState) {
    let ball = &mut world.ball;
    // A paddle only returns a ball approaching from above
    if ball.velocity_y <= 0.0 {
        return;
    }
    for (slot, paddle) in &world.paddles {
        let straddles_line =
            ball.y + ball.radius >= paddle.y && ball.y - ball.radius <= paddle.y;
        let in_span = ball.x >= paddle.x && ball.x <= paddle.x + paddle.width;
        if straddles_line && in_span {
            ball.velocity_y = -ball.velocity_y;
            ball.last_touched_by = Some(*slot);
            break;
        }
    }
}

fn collide_bricks(world: &mut WorldState) {
    let ball = &world.ball;
    // First visible brick in grid order wins; the flip invalidates the
    // ball's trajectory for the rest of the tick
    let hit = world.bricks.iter().position(|b| {
        b.visible
            && ball.x + ball.radius > b.x
            && ball.x - ball.radius < b.x + b.width
            && ball.y + ball.radius > b.y
            && ball.y - ball.radius < b.y + b.height
    });
    let Some(index) = hit else {
        return;
    };
    world.bricks[index].visible = false;
    world.ball.velocity_y = -world.ball.velocity_y;
    let credited = match world.mode {
        // The solo board score is not gated on paddle contact
        GameMode::Breakout => Some(PlayerSlot::Slot1),
        GameMode::Volley => world.ball.last_touched_by,
    };
    if let Some(slot) = credited {
        *world.scores.entry(slot).or_insert(0) += 1;
    }
}

fn resolve_miss(world: &mut WorldState, rng: &mut impl Rng) {
    if world.ball.y + world.ball.radius <= world.canvas.height {
        return;
    }
    // Failing to defend your half costs you the point; nobody gains one
    let loser = PlayerSlot::defending(world.ball.x, world.canvas.width);
    *world.scores.entry(loser).or_insert(0) -= 1;
    respawn(world, rng);
}

/// Put the ball back in play after a miss: random x, upper half, fixed
/// downward speed, random horizontal direction. The match never pauses.
fn respawn(world: &mut WorldState, rng: &mut impl Rng) {
    use crate::game::constants::ball::RESPAWN_SPEED;

    let ball = &mut world.ball;
    ball.x = rng.gen_range(ball.radius..world.canvas.width - ball.radius);
    ball.y = rng.gen_range(ball.radius..world.canvas.height / 2.0);
    ball.velocity_x = if rng.gen_bool(0.5) {
        RESPAWN_SPEED
    } else {
        -RESPAWN_SPEED
    };
    ball.velocity_y = RESPAWN_SPEED;
    ball.last_touched_by = None;
}
