//! World state definitions
//!
//! The single authoritative record of everything clients render: canvas,
//! phase, bricks, ball, paddles, scores. Pure data plus constructors;
//! per-tick behavior lives in [`crate::game::step`].

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::constants::{ball, brick, canvas, paddle};

/// One of the two paddle-controlling roles
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PlayerSlot {
    #[serde(rename = "slot1")]
    Slot1,
    #[serde(rename = "slot2")]
    Slot2,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::Slot1, PlayerSlot::Slot2];

    /// Horizontal travel bounds for this slot's paddle. Each paddle is
    /// confined to its own half of the canvas.
    pub fn travel_bounds(self, canvas_width: f32, paddle_width: f32) -> (f32, f32) {
        match self {
            PlayerSlot::Slot1 => (0.0, canvas_width / 2.0 - paddle_width),
            PlayerSlot::Slot2 => (canvas_width / 2.0, canvas_width - paddle_width),
        }
    }

    /// The slot responsible for defending the half of the canvas containing `x`
    pub fn defending(x: f32, canvas_width: f32) -> PlayerSlot {
        if x < canvas_width / 2.0 {
            PlayerSlot::Slot1
        } else {
            PlayerSlot::Slot2
        }
    }
}

/// Game lifecycle phase. `NotStarted` is only ever observed before the first
/// start command; a restart re-enters `Running` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    NotStarted,
    Running,
}

/// Engine parametrization: one simulation, two boundary/scoring policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameMode {
    /// Single-player brick breaking: the bottom boundary is a fourth wall
    /// and brick hits credit the board score with no touch attribution
    Breakout,
    /// Two-player paddle volley: the bottom boundary is open, misses cost
    /// the defending slot a point, brick credit goes to the last toucher
    Volley,
}

/// Fixed drawing surface dimensions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: canvas::WIDTH,
            height: canvas::HEIGHT,
        }
    }
}

/// One brick in the grid. `visible` flips to false permanently once struck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    pub visible: bool,
}

impl Brick {
    /// Generate the fixed 5x8 grid with deterministic geometry and
    /// randomized display colors
    pub fn grid(rng: &mut impl Rng) -> Vec<Brick> {
        let mut bricks = Vec::with_capacity(brick::ROWS * brick::COLS);
        for row in 0..brick::ROWS {
            for col in 0..brick::COLS {
                bricks.push(Brick {
                    x: col as f32 * (brick::WIDTH + brick::PADDING) + brick::OFFSET_LEFT,
                    y: row as f32 * (brick::HEIGHT + brick::PADDING) + brick::OFFSET_TOP,
                    width: brick::WIDTH,
                    height: brick::HEIGHT,
                    color: random_color(rng),
                    visible: true,
                });
            }
        }
        bricks
    }
}

fn random_color(rng: &mut impl Rng) -> String {
    format!(
        "rgb({}, {}, {})",
        rng.gen::<u8>(),
        rng.gen::<u8>(),
        rng.gen::<u8>()
    )
}

/// The ball. Mutated every tick while the game is running.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: String,
    pub velocity_x: f32,
    pub velocity_y: f32,
    /// Slot whose paddle touched the ball most recently; cleared on respawn
    pub last_touched_by: Option<PlayerSlot>,
}

impl Ball {
    /// The serve ball used at startup and on every game start
    pub fn serve() -> Self {
        Self {
            x: ball::SERVE_X,
            y: ball::SERVE_Y,
            radius: ball::RADIUS,
            color: ball::COLOR.to_string(),
            velocity_x: ball::SERVE_VX,
            velocity_y: ball::SERVE_VY,
            last_touched_by: None,
        }
    }
}

/// A paddle. `y` is fixed; `x` moves only via the owning slot's commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
}

impl Paddle {
    /// Starting paddle for a slot, centered within its travel bounds
    pub fn for_slot(slot: PlayerSlot) -> Self {
        let (lo, hi) = slot.travel_bounds(canvas::WIDTH, paddle::WIDTH);
        let color = match slot {
            PlayerSlot::Slot1 => paddle::SLOT_ONE_COLOR,
            PlayerSlot::Slot2 => paddle::SLOT_TWO_COLOR,
        };
        Self {
            x: (lo + hi) / 2.0,
            y: paddle::Y,
            width: paddle::WIDTH,
            height: paddle::HEIGHT,
            color: color.to_string(),
        }
    }
}

/// The authoritative world: one instance per server process, owned by the
/// room task, reset in place and never reallocated wholesale after startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub canvas: Canvas,
    pub mode: GameMode,
    pub phase: GamePhase,
    pub bricks: Vec<Brick>,
    pub ball: Ball,
    pub paddles: BTreeMap<PlayerSlot, Paddle>,
    pub scores: BTreeMap<PlayerSlot, i32>,
}

impl WorldState {
    /// The idle, not-yet-started world shown to early connectors
    pub fn new(mode: GameMode, rng: &mut impl Rng) -> Self {
        let mut paddles = BTreeMap::new();
        let mut scores = BTreeMap::new();
        match mode {
            GameMode::Volley => {
                for slot in PlayerSlot::ALL {
                    paddles.insert(slot, Paddle::for_slot(slot));
                    scores.insert(slot, 0);
                }
            }
            GameMode::Breakout => {
                // Solo mode keeps its single board score under the first slot
                scores.insert(PlayerSlot::Slot1, 0);
            }
        }
        Self {
            canvas: Canvas::default(),
            mode,
            phase: GamePhase::NotStarted,
            bricks: Brick::grid(rng),
            ball: Ball::serve(),
            paddles,
            scores,
        }
    }

    /// Begin (or restart) a game: fresh bricks, serve ball, zeroed scores.
    /// Paddle positions and slot assignments are deliberately left alone.
    pub fn reset_for_start(&mut self, rng: &mut impl Rng) {
        self.bricks = Brick::grid(rng);
        self.ball = Ball::serve();
        for score in self.scores.values_mut() {
            *score = 0;
        }
        self.phase = GamePhase::Running;
    }

    /// Apply a paddle movement delta, clamped to the slot's half of the
    /// canvas. Returns whether the paddle actually moved. Missing paddles
    /// and non-finite deltas are no-ops.
    pub fn move_paddle(&mut self, slot: PlayerSlot, delta_x: f32) -> bool {
        if !delta_x.is_finite() {
            return false;
        }
        let (lo, hi) = slot.travel_bounds(self.canvas.width, paddle::WIDTH);
        let Some(paddle) = self.paddles.get_mut(&slot) else {
            return false;
        };
        let clamped = (paddle.x + delta_x).clamp(lo, hi);
        if clamped == paddle.x {
            return false;
        }
        paddle.x = clamped;
        true
    }

    /// Number of bricks still standing
    pub fn visible_bricks(&self) -> usize {
        self.bricks.iter().filter(|b| b.visible).count()
    }

    /// Score for a slot (0 for a slot with no scoreboard entry)
    pub fn score(&self, slot: PlayerSlot) -> i32 {
        self.scores.get(&slot).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_brick_grid_geometry() {
        let bricks = Brick::grid(&mut rng());
        assert_eq!(bricks.len(), 40);
        assert_eq!(bricks[0].x, 50.0);
        assert_eq!(bricks[0].y, 50.0);
        // Last column still inside the canvas
        let last = &bricks[7];
        assert_eq!(last.x, 680.0);
        assert!(last.x + last.width <= canvas::WIDTH);
        assert!(bricks.iter().all(|b| b.visible));
    }

    #[test]
    fn test_brick_colors_randomized() {
        let bricks = Brick::grid(&mut rng());
        assert!(bricks[0].color.starts_with("rgb("));
        // 40 identical colors would mean the rng is not being consulted
        assert!(bricks.iter().any(|b| b.color != bricks[0].color));
    }

    #[test]
    fn test_new_volley_world() {
        let world = WorldState::new(GameMode::Volley, &mut rng());
        assert_eq!(world.phase, GamePhase::NotStarted);
        assert_eq!(world.paddles.len(), 2);
        assert_eq!(world.score(PlayerSlot::Slot1), 0);
        assert_eq!(world.score(PlayerSlot::Slot2), 0);
        assert_eq!(world.ball.x, 400.0);
        assert_eq!(world.ball.y, 500.0);
        assert_eq!(world.ball.velocity_x, 4.0);
        assert_eq!(world.ball.velocity_y, -4.0);
        assert!(world.ball.last_touched_by.is_none());
    }

    #[test]
    fn test_new_breakout_world_has_no_paddles() {
        let world = WorldState::new(GameMode::Breakout, &mut rng());
        assert!(world.paddles.is_empty());
        assert_eq!(world.scores.len(), 1);
    }

    #[test]
    fn test_paddles_start_centered_in_their_halves() {
        let world = WorldState::new(GameMode::Volley, &mut rng());
        assert_eq!(world.paddles[&PlayerSlot::Slot1].x, 150.0);
        assert_eq!(world.paddles[&PlayerSlot::Slot2].x, 550.0);
        assert_eq!(world.paddles[&PlayerSlot::Slot1].y, 560.0);
    }

    #[test]
    fn test_reset_for_start() {
        let mut world = WorldState::new(GameMode::Volley, &mut rng());
        world.phase = GamePhase::Running;
        world.bricks[3].visible = false;
        world.scores.insert(PlayerSlot::Slot1, 5);
        world.scores.insert(PlayerSlot::Slot2, -2);
        world.ball.x = 13.0;
        world.paddles.get_mut(&PlayerSlot::Slot1).unwrap().x = 99.0;

        world.reset_for_start(&mut rng());

        assert_eq!(world.phase, GamePhase::Running);
        assert_eq!(world.visible_bricks(), 40);
        assert_eq!(world.score(PlayerSlot::Slot1), 0);
        assert_eq!(world.score(PlayerSlot::Slot2), 0);
        assert_eq!(world.ball.x, 400.0);
        // Paddles survive the reset
        assert_eq!(world.paddles[&PlayerSlot::Slot1].x, 99.0);
    }

    #[test]
    fn test_move_paddle_clamps_every_intermediate_state() {
        let mut world = WorldState::new(GameMode::Volley, &mut rng());
        let deltas = [
            -10_000.0, 37.0, -5.0, 10_000.0, -1.5, 400.0, -400.0, 0.25, 1e9, -1e9,
        ];
        for slot in PlayerSlot::ALL {
            let (lo, hi) = slot.travel_bounds(canvas::WIDTH, paddle::WIDTH);
            for delta in deltas {
                world.move_paddle(slot, delta);
                let x = world.paddles[&slot].x;
                assert!(x >= lo && x <= hi, "{slot:?} escaped to {x}");
            }
        }
    }

    #[test]
    fn test_move_paddle_travel_bounds() {
        assert_eq!(
            PlayerSlot::Slot1.travel_bounds(canvas::WIDTH, 100.0),
            (0.0, 300.0)
        );
        assert_eq!(
            PlayerSlot::Slot2.travel_bounds(canvas::WIDTH, 100.0),
            (400.0, 700.0)
        );
    }

    #[test]
    fn test_move_paddle_zero_net_change_is_noop() {
        let mut world = WorldState::new(GameMode::Volley, &mut rng());
        world.paddles.get_mut(&PlayerSlot::Slot1).unwrap().x = 0.0;
        assert!(!world.move_paddle(PlayerSlot::Slot1, -50.0));
        assert_eq!(world.paddles[&PlayerSlot::Slot1].x, 0.0);
    }

    #[test]
    fn test_move_paddle_rejects_non_finite() {
        let mut world = WorldState::new(GameMode::Volley, &mut rng());
        let before = world.paddles[&PlayerSlot::Slot1].x;
        assert!(!world.move_paddle(PlayerSlot::Slot1, f32::NAN));
        assert!(!world.move_paddle(PlayerSlot::Slot1, f32::INFINITY));
        assert_eq!(world.paddles[&PlayerSlot::Slot1].x, before);
    }

    #[test]
    fn test_move_paddle_without_paddle_is_noop() {
        let mut world = WorldState::new(GameMode::Breakout, &mut rng());
        assert!(!world.move_paddle(PlayerSlot::Slot1, 10.0));
    }

    #[test]
    fn test_defending_halves() {
        assert_eq!(
            PlayerSlot::defending(0.0, canvas::WIDTH),
            PlayerSlot::Slot1
        );
        assert_eq!(
            PlayerSlot::defending(399.9, canvas::WIDTH),
            PlayerSlot::Slot1
        );
        assert_eq!(
            PlayerSlot::defending(400.0, canvas::WIDTH),
            PlayerSlot::Slot2
        );
        assert_eq!(
            PlayerSlot::defending(799.0, canvas::WIDTH),
            PlayerSlot::Slot2
        );
    }

    #[test]
    fn test_scores_wire_keys() {
        let world = WorldState::new(GameMode::Volley, &mut rng());
        let json = serde_json::to_value(&world.scores).unwrap();
        assert_eq!(json["slot1"], 0);
        assert_eq!(json["slot2"], 0);
    }
}
