//! Screen regions the simulation has to know about.
//!
//! The score box is part of the playfield: the snake can crawl into it and
//! gets punished for it. Food never spawns on rows covered by the score box
//! or, while a bonus is out, by the bonus timer bar below it.

use crate::{Coords, GRID_STEP};

const SCORE_BOX_TOP: i32 = 10;
const SCORE_BOX_HEIGHT: i32 = 20;
const SCORE_BOX_WIDTH: i32 = 100;
const TIMER_BAR_HEIGHT: i32 = 10;

/// Axis-aligned rectangle in world units, half-open on both axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn contains(&self, pos: Coords) -> bool {
        (self.x..self.x + self.w).contains(&pos.0) && (self.y..self.y + self.h).contains(&pos.1)
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Hud {
    pub score_box: Rect,
    pub timer_bar: Rect,
}

impl Hud {
    pub fn new(width: i32) -> Self {
        let w = SCORE_BOX_WIDTH.min(width);
        let x = (width / 10 - w / 2).clamp(0, width - w);
        let score_box = Rect::new(x, SCORE_BOX_TOP, w, SCORE_BOX_HEIGHT);
        let timer_bar = Rect::new(0, score_box.bottom(), width, TIMER_BAR_HEIGHT);
        Hud { score_box, timer_bar }
    }

    /// First grid row (in cells) food may occupy.
    pub fn food_floor_row(&self, bonus_active: bool) -> i32 {
        let covered = if bonus_active { self.timer_bar.bottom() } else { self.score_box.bottom() };
        covered / GRID_STEP + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_is_half_open() {
        let r = Rect::new(10, 10, 20, 20);
        assert!(r.contains((10, 10)));
        assert!(r.contains((29, 29)));
        assert!(!r.contains((30, 10)));
        assert!(!r.contains((10, 30)));
    }

    #[test]
    fn score_box_sits_near_left_edge() {
        let hud = Hud::new(600);
        assert_eq!(hud.score_box, Rect::new(10, 10, 100, 20));
        assert_eq!(hud.timer_bar, Rect::new(0, 30, 600, 10));

        // Narrow fields clamp the box inside the screen.
        let hud = Hud::new(80);
        assert_eq!(hud.score_box.x, 0);
        assert_eq!(hud.score_box.w, 80);
    }

    #[test]
    fn food_floor_moves_down_with_timer_bar() {
        let hud = Hud::new(600);
        assert_eq!(hud.food_floor_row(false), 4);
        assert_eq!(hud.food_floor_row(true), 5);
    }
}
