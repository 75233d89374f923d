use std::collections::VecDeque;

use crate::{Coords, GRID_STEP};
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    /// World-unit offset of one step in this direction. Y grows downwards.
    pub fn delta(self) -> Coords {
        match self {
            Up => (0, -GRID_STEP),
            Down => (0, GRID_STEP),
            Left => (-GRID_STEP, 0),
            Right => (GRID_STEP, 0),
        }
    }
}

/// Snake body, head first.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Coords>,
    direction: Direction,
}

impl Snake {
    /// Builds a straight snake of `size` cells whose head is at `head`,
    /// trailing behind it opposite to `direction`.
    pub fn new(head: Coords, size: usize, direction: Direction) -> Self {
        let diff = direction.delta();

        let body = (0..size.max(1) as i32)
            .map(|i| (head.0 - diff.0 * i, head.1 - diff.1 * i))
            .collect();
        Snake { body, direction }
    }

    /// Builds a snake from explicit cells, head first.
    #[cfg(test)]
    pub(crate) fn from_cells(cells: &[Coords], direction: Direction) -> Self {
        assert!(!cells.is_empty(), "a snake needs at least one cell");
        Snake { body: cells.iter().copied().collect(), direction }
    }

    pub fn body(&self) -> &VecDeque<Coords> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    /// Where the head lands after one step, before wrapping.
    pub fn next_head(&self) -> Coords {
        let head = self.head();
        let diff = self.direction.delta();
        (head.0 + diff.0, head.1 + diff.1)
    }

    pub fn push_head(&mut self, cell: Coords) {
        self.body.push_front(cell);
    }

    /// Drops the last segment. The head is never removed.
    pub fn pop_tail(&mut self) -> Option<Coords> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }

    pub fn bites_itself(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|cell| *cell == head)
    }

    /// Turns unless `new_direction` would reverse the snake onto itself.
    /// Returns whether the direction changed.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        if new_direction == self.direction.opposite() {
            return false;
        }
        self.direction = new_direction;
        true
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snake_trails_behind_head() {
        let snake = Snake::new((100, 50), 3, Right);
        let cells: Vec<Coords> = snake.body().iter().copied().collect();
        assert_eq!(cells, vec![(100, 50), (90, 50), (80, 50)]);
        assert_eq!(snake.next_head(), (110, 50));
    }

    #[test]
    fn reversal_is_ignored() {
        let mut snake = Snake::new((100, 50), 3, Right);
        assert!(!snake.set_direction(Left));
        assert_eq!(snake.get_direction(), Right);
        assert!(snake.set_direction(Up));
        assert_eq!(snake.get_direction(), Up);
        assert_eq!(snake.head_char(), '^');
    }

    #[test]
    fn opposite_is_an_involution() {
        for dir in [Up, Down, Left, Right] {
            assert_ne!(dir.opposite(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn tail_pop_keeps_head() {
        let mut snake = Snake::new((0, 0), 1, Down);
        assert_eq!(snake.pop_tail(), None);
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn self_bite_ignores_head() {
        let snake = Snake::from_cells(&[(10, 10), (20, 10), (20, 20), (10, 20), (10, 10)], Up);
        assert!(snake.bites_itself());

        let short = Snake::from_cells(&[(10, 10), (20, 10)], Left);
        assert!(!short.bites_itself());
    }
}
