use std::time::Duration;

use rand::Rng;

use crate::{Coords, BONUS_GRID_STEP, GRID_STEP};

/// Regular food: one cell, eaten for one point and one segment.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Food {
    pub pos: Coords,
    pub present: bool,
}

impl Food {
    pub fn at(pos: Coords) -> Self {
        Food { pos, present: true }
    }

    pub fn is_at(&self, pos: Coords) -> bool {
        self.present && self.pos == pos
    }
}

/// Big food: a 2x2 block of grid cells with a countdown.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BonusFood {
    pub pos: Coords,
    pub remaining: Duration,
    pub lifetime: Duration,
}

impl BonusFood {
    pub fn new(pos: Coords, lifetime: Duration) -> Self {
        BonusFood { pos, remaining: lifetime, lifetime }
    }

    pub fn is_active(&self) -> bool {
        !self.remaining.is_zero()
    }

    pub fn cells(&self) -> [Coords; 4] {
        let (x, y) = self.pos;
        [(x, y), (x + GRID_STEP, y), (x, y + GRID_STEP), (x + GRID_STEP, y + GRID_STEP)]
    }

    pub fn covers(&self, pos: Coords) -> bool {
        self.is_active() && self.cells().contains(&pos)
    }

    /// Runs the countdown. Returns true when this call made it expire.
    pub fn elapse(&mut self, elapsed: Duration) -> bool {
        if !self.is_active() {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        !self.is_active()
    }

    /// Remaining lifetime in `[0, 1]`, for the timer bar.
    pub fn fraction_left(&self) -> f64 {
        if self.lifetime.is_zero() {
            return 0.0;
        }
        self.remaining.as_secs_f64() / self.lifetime.as_secs_f64()
    }
}

/// Random grid-aligned cell with `x` in `[min_col, width)` and `y` in
/// `[min_row, height)`, both given in cells of `step` units.
/// `min_row` is clamped so a cell always exists.
pub fn random_cell<R: Rng>(rng: &mut R, step: i32, width: i32, height: i32, min_col: i32, min_row: i32) -> Coords {
    let cols = (width / step).max(1);
    let rows = (height / step).max(1);
    let min_col = min_col.clamp(0, cols - 1);
    let min_row = min_row.clamp(0, rows - 1);

    (rng.gen_range(min_col..cols) * step, rng.gen_range(min_row..rows) * step)
}

/// Regular food spawn below `floor_row` (in grid cells), never in column 0.
pub fn spawn_food<R: Rng>(rng: &mut R, width: i32, height: i32, floor_row: i32) -> Food {
    Food::at(random_cell(rng, GRID_STEP, width, height, 1, floor_row))
}

/// Bonus food spawn on the coarse grid, with no cell above `floor_row`.
pub fn spawn_bonus<R: Rng>(rng: &mut R, width: i32, height: i32, floor_row: i32, lifetime: Duration) -> BonusFood {
    let floor_y = floor_row * GRID_STEP;
    let min_row = (floor_y + BONUS_GRID_STEP - 1) / BONUS_GRID_STEP;
    BonusFood::new(random_cell(rng, BONUS_GRID_STEP, width, height, 0, min_row), lifetime)
}
