/// Canvas dimensions - fixed at startup, the client renders 1:1
pub mod canvas {
    pub const WIDTH: f32 = 800.0;
    pub const HEIGHT: f32 = 600.0;
}

/// Tick cadence
pub mod tick {
    /// Simulation rate in Hz
    pub const RATE: u32 = 60;
    /// Tick duration in milliseconds (~16ms / 60Hz)
    pub const DURATION_MS: u64 = 1000 / RATE as u64;
}

/// Ball geometry and serve state
pub mod ball {
    pub const RADIUS: f32 = 10.0;
    pub const COLOR: &str = "white";
    /// Serve position (horizontal center, just above the paddle line)
    pub const SERVE_X: f32 = 400.0;
    pub const SERVE_Y: f32 = 500.0;
    /// Serve velocity per tick
    pub const SERVE_VX: f32 = 4.0;
    pub const SERVE_VY: f32 = -4.0;
    /// Per-axis speed after an out-of-bounds respawn
    pub const RESPAWN_SPEED: f32 = 4.0;
}

/// Paddle geometry
pub mod paddle {
    pub const WIDTH: f32 = 100.0;
    pub const HEIGHT: f32 = 20.0;
    /// Fixed vertical position of both paddles
    pub const Y: f32 = 560.0;
    pub const SLOT_ONE_COLOR: &str = "cyan";
    pub const SLOT_TWO_COLOR: &str = "orange";
}

/// Brick grid layout (5 rows x 8 columns)
pub mod brick {
    pub const ROWS: usize = 5;
    pub const COLS: usize = 8;
    pub const WIDTH: f32 = 80.0;
    pub const HEIGHT: f32 = 20.0;
    /// Gap between neighboring bricks
    pub const PADDING: f32 = 10.0;
    pub const OFFSET_TOP: f32 = 50.0;
    pub const OFFSET_LEFT: f32 = 50.0;
}
