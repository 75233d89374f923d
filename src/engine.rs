//! Simulation engine
//!
//! Owns every piece of mutable game state. Nothing here knows about the
//! terminal or about threads: callers feed it intents and ticks, and read
//! it back through [`Snapshot`].

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::Config;
use crate::food::{self, BonusFood, Food};
use crate::layout::Hud;
use crate::snake::{Direction, Snake};
use crate::{Coords, GRID_STEP};

const START_HEAD: Coords = (100, 50);
const START_LENGTH: usize = 3;

/// Tick rate used right after the snake bit into the score box.
const SCORE_BOX_TICK_RATE: f64 = 10.0;

/// Longest wait between steps, whatever the difficulty says.
const MAX_TICK_INTERVAL: Duration = Duration::from_secs(10);

/// What a single step did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    ScoreChanged(u32),
    GameOver(u32),
}

/// What a bonus spawner tick did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BonusEvent {
    None,
    Spawned(Coords),
    Expired,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BonusView {
    pub pos: Coords,
    /// Remaining lifetime in `[0, 1]`
    pub fraction_left: f64,
}

/// Read-only copy of everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub width: i32,
    pub height: i32,
    /// Head first
    pub snake: Vec<Coords>,
    pub head_char: char,
    pub food: Option<Coords>,
    pub bonus: Option<BonusView>,
    pub score: u32,
    pub difficulty: f64,
    pub difficulty_label: &'static str,
    pub hud: Hud,
    pub paused: bool,
    pub running: bool,
    pub game_over: bool,
    /// The last step took a bite out of the score box
    pub eating_score: bool,
}

pub fn difficulty_label(difficulty: f64) -> &'static str {
    if difficulty < 25.0 {
        "Easy"
    } else if difficulty < 40.0 {
        "Medium"
    } else if difficulty < 60.0 {
        "Hard"
    } else if difficulty < 120.0 {
        "Harder"
    } else {
        "Impossible"
    }
}

pub struct Engine {
    width: i32,
    height: i32,
    base_difficulty: f64,
    difficulty_modifier: f64,
    bonus_spawn_chance: f64,
    bonus_amount: u32,
    bonus_lifetime: Duration,
    hud: Hud,

    snake: Snake,
    pending_direction: Direction,
    food: Food,
    bonus: Option<BonusFood>,
    score: u32,
    /// Bonus points still to be paid out, one per step
    bonus_payout: u32,
    difficulty: f64,
    eating_score: bool,
    paused: bool,
    running: bool,
    game_over: bool,
    rng: Pcg32,
}

impl Engine {
    /// Expects a validated config.
    pub fn new(config: &Config) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = Pcg32::seed_from_u64(seed);
        log::debug!("Engine seed {}", seed);

        let snake = Snake::new(START_HEAD, START_LENGTH, Direction::Right);
        // The very first food may land anywhere except the top row and left column.
        let food = Food::at(food::random_cell(&mut rng, GRID_STEP, config.width, config.height, 1, 1));

        Engine {
            width: config.width,
            height: config.height,
            base_difficulty: config.base_difficulty,
            difficulty_modifier: config.difficulty_modifier,
            bonus_spawn_chance: config.bonus_spawn_chance,
            bonus_amount: config.bonus_amount,
            bonus_lifetime: config.bonus_lifetime(),
            hud: Hud::new(config.width),
            pending_direction: snake.get_direction(),
            snake,
            food,
            bonus: None,
            score: 0,
            bonus_payout: 0,
            difficulty: config.base_difficulty,
            eating_score: false,
            paused: false,
            running: true,
            game_over: false,
            rng,
        }
    }

    /// Buffers a turn for the next step. A turn back onto the body is
    /// dropped when the step commits it.
    pub fn set_intended_direction(&mut self, direction: Direction) {
        self.pending_direction = direction;
    }

    /// Advances the snake by one grid step.
    pub fn step(&mut self) -> StepOutcome {
        if self.game_over {
            return StepOutcome::GameOver(self.score);
        }
        if self.paused || !self.running {
            return StepOutcome::Continue;
        }

        let start_score = self.score;
        self.eating_score = false;

        self.snake.set_direction(self.pending_direction);
        // Food and bonus are matched against the head before it wraps, so
        // crossing an edge never eats what sits on the far side that tick.
        let moved = self.snake.next_head();
        let head = self.wrap(moved);
        self.snake.push_head(head);

        let food_eaten = self.food.is_at(moved);
        if food_eaten {
            self.score += 1;
            self.food.present = false;
        } else if self.bonus_payout > 0 {
            self.bonus_payout -= 1;
            self.score += 1;
        } else {
            self.snake.pop_tail();
        }

        if self.bonus.map_or(false, |bonus| bonus.covers(moved)) {
            log::debug!("Bonus eaten at {:?}, {} points queued", moved, self.bonus_amount);
            self.bonus_payout = self.bonus_amount;
            self.bonus = None;
        }

        if self.snake.bites_itself() {
            log::info!("Snake bit itself at {:?}, final score {}", head, self.score);
            self.game_over = true;
            self.running = false;
            return StepOutcome::GameOver(self.score);
        }

        if self.score > 0 && self.hud.score_box.contains(head) {
            self.score -= 1;
            self.snake.pop_tail();
            self.eating_score = true;
        }

        if food_eaten {
            let floor = self.hud.food_floor_row(self.bonus.is_some());
            self.food = food::spawn_food(&mut self.rng, self.width, self.height, floor);
            log::debug!("Food respawned at {:?}", self.food.pos);
        }

        self.difficulty = self.difficulty_for(self.score);

        if self.score != start_score {
            StepOutcome::ScoreChanged(self.score)
        } else {
            StepOutcome::Continue
        }
    }

    /// Runs the bonus food countdown, or rolls for a new bonus when none is out.
    pub fn tick_bonus(&mut self, elapsed: Duration) -> BonusEvent {
        if self.paused || !self.running {
            return BonusEvent::None;
        }

        if let Some(bonus) = self.bonus.as_mut() {
            if bonus.elapse(elapsed) {
                self.bonus = None;
                log::debug!("Bonus food expired");
                return BonusEvent::Expired;
            }
            return BonusEvent::None;
        }

        let sample: f64 = self.rng.gen();
        if sample < self.bonus_spawn_chance && !self.bonus_lifetime.is_zero() {
            let floor = self.hud.food_floor_row(true);
            let bonus = food::spawn_bonus(&mut self.rng, self.width, self.height, floor, self.bonus_lifetime);
            self.bonus = Some(bonus);
            log::debug!("Bonus food spawned at {:?}", bonus.pos);
            return BonusEvent::Spawned(bonus.pos);
        }

        BonusEvent::None
    }

    /// Returns whether the game is now paused.
    pub fn toggle_pause(&mut self) -> bool {
        if !self.game_over {
            self.paused = !self.paused;
        }
        self.paused
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Delay before the next step.
    pub fn tick_interval(&self) -> Duration {
        let rate = if self.eating_score { SCORE_BOX_TICK_RATE } else { self.difficulty };
        Duration::try_from_secs_f64(1.0 / rate)
            .map_or(MAX_TICK_INTERVAL, |interval| interval.min(MAX_TICK_INTERVAL))
    }

    pub fn difficulty_for(&self, score: u32) -> f64 {
        self.base_difficulty + score as f64 * self.difficulty_modifier
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<Coords> {
        self.food.present.then(|| self.food.pos)
    }

    pub fn bonus(&self) -> Option<&BonusFood> {
        self.bonus.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            snake: self.snake.body().iter().copied().collect(),
            head_char: self.snake.head_char(),
            food: self.food(),
            bonus: self.bonus.map(|b| BonusView { pos: b.pos, fraction_left: b.fraction_left() }),
            score: self.score,
            difficulty: self.difficulty,
            difficulty_label: difficulty_label(self.difficulty),
            hud: self.hud,
            paused: self.paused,
            running: self.running,
            game_over: self.game_over,
            eating_score: self.eating_score,
        }
    }

    /// Toroidal playfield: leaving one edge enters from the opposite one.
    fn wrap(&self, (mut x, mut y): Coords) -> Coords {
        if x < 0 {
            x = self.width - GRID_STEP;
        } else if x > self.width - GRID_STEP {
            x = 0;
        }
        if y < 0 {
            y = self.height - GRID_STEP;
        } else if y > self.height - GRID_STEP {
            y = 0;
        }
        (x, y)
    }

    #[cfg(test)]
    pub(crate) fn set_snake(&mut self, snake: Snake) {
        self.pending_direction = snake.get_direction();
        self.snake = snake;
    }

    #[cfg(test)]
    pub(crate) fn set_food(&mut self, pos: Coords) {
        self.food = Food::at(pos);
    }

    #[cfg(test)]
    pub(crate) fn clear_food(&mut self) {
        self.food.present = false;
    }

    #[cfg(test)]
    pub(crate) fn set_bonus(&mut self, bonus: Option<BonusFood>) {
        self.bonus = bonus;
    }

    #[cfg(test)]
    pub(crate) fn set_score(&mut self, score: u32) {
        self.score = score;
        self.difficulty = self.difficulty_for(score);
    }
}
