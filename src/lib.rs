//! Brick Volley Server Library
//!
//! A real-time, server-authoritative arcade game server: one shared world
//! (ball, paddles, bricks, scores) advanced on a fixed 60 Hz tick by a
//! single owning task, with full snapshots pushed to every connected
//! WebSocket session. Clients render the last snapshot and send input
//! intents; all rules live here.
//!
//! Two engine variants share one simulation: `volley` (two paddles, open
//! bottom boundary, per-player scores) and `breakout` (solo, four walls,
//! one board score), selected via `GAME_MODE`.

pub mod config;
pub mod game;
pub mod net;
