//! Terminal Snake
//!
//! - `engine`: the simulation (movement, food, bonus food, score, difficulty)
//! - `session`: owner thread, bonus spawner thread and the command channel
//! - `game`: input polling and frame pacing on the main thread
//! - `term`: crossterm screen management

pub mod config;
pub mod engine;
pub mod food;
pub mod game;
pub mod layout;
pub mod session;
pub mod snake;
pub mod term;

pub use config::Config;
pub use engine::{Engine, Snapshot, StepOutcome};

/// Terminal coordinate component.
pub type TermInt = u16;

/// A position in world units. Entities snap to the grid step.
pub type Coords = (i32, i32);

/// Movement quantum; one grid cell is one terminal character.
pub const GRID_STEP: i32 = 10;

/// Bonus food is aligned to a coarser grid and covers 2x2 cells.
pub const BONUS_GRID_STEP: i32 = 20;
