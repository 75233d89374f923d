use std::{thread::sleep, time::{Duration, Instant}};

use crate::{Coords, TermInt, GRID_STEP};
use crate::config::Config;
use crate::engine::{Engine, Snapshot};
use crate::session::{Command, Session};
use crate::snake::Direction::*;
use crate::term::{Canvas, TermManager};

use anyhow::Result;
use crossterm::event::{KeyEvent, KeyModifiers, KeyCode};

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const BONUS_CHAR: char = '@';
const DEAD_SNAKE_CHAR: char = 'X';
const TIMER_BAR_CHAR: char = '=';

/// How long the death card stays up before the game exits.
const GAME_OVER_DELAY: Duration = Duration::from_secs(3);

/// What a key press asks for.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    Quit,
}

pub struct SnakeGame {
    config: Config,
    term: TermManager,
}

impl SnakeGame {
    /// Expects a validated config.
    pub fn new(config: Config) -> Result<Self> {
        Ok(SnakeGame { config, term: TermManager::new()? })
    }

    pub fn initialize(&mut self) -> Result<()> {
        let (cols, rows) = frame_size(&self.config);
        self.term.ensure_fits(cols, rows)?;
        self.term.setup()
    }

    /// Returns false if the player quit from the intro.
    pub fn show_intro(&mut self) -> Result<bool> {
        let lines = &[
            "Arrow keys or WASD to move",
            "P to pause",
            "Esc or CTRL+C to quit",
            "",
            "Don't eat your score!",
            "",
            "Press any key to begin",
        ];

        let (cols, rows) = frame_size(&self.config);
        let mut canvas = Canvas::new(cols, rows);
        canvas.draw_borders();
        canvas.message(lines);
        self.term.draw(&canvas)?;

        let key = self.term.read_key_blocking()?;
        Ok(!matches!(map_key(&key), Some(Input::Quit)))
    }

    /// Runs one game to the end and returns the final score.
    pub fn play(&mut self) -> Result<u32> {
        let engine = Engine::new(&self.config);
        let session = Session::start(engine, self.config.bonus_period())?;
        let frame_interval = self.config.frame_interval();

        let mut quit = false;
        let last = loop {
            let frame_start = Instant::now();

            for key_ev in self.term.read_key_events_queue()? {
                match map_key(&key_ev) {
                    Some(Input::Command(command)) => session.send(command),
                    Some(Input::Quit) => quit = true,
                    None => {}
                }
            }

            let snap = session.snapshot();
            if quit || !snap.running {
                break snap;
            }

            self.term.draw(&render(&snap))?;
            sleep(frame_interval.saturating_sub(frame_start.elapsed()));
        };

        session.shutdown();

        if last.game_over && !quit {
            self.term.draw(&render(&last))?;
            sleep(GAME_OVER_DELAY);
        }

        log::info!("Final score {}", last.score);
        Ok(last.score)
    }
}

/// Terminal size needed: the field plus a one character border.
pub fn frame_size(config: &Config) -> (TermInt, TermInt) {
    let (cols, rows) = config.grid_size();
    (cols.saturating_add(2), rows.saturating_add(2))
}

pub fn map_key(ev: &KeyEvent) -> Option<Input> {
    if is_ctrl_c(ev) {
        return Some(Input::Quit);
    }

    let command = match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Command::Turn(Up),
        KeyCode::Char('a') | KeyCode::Left => Command::Turn(Left),
        KeyCode::Char('s') | KeyCode::Down => Command::Turn(Down),
        KeyCode::Char('d') | KeyCode::Right => Command::Turn(Right),
        KeyCode::Char('p') | KeyCode::Pause => Command::TogglePause,
        KeyCode::Esc => return Some(Input::Quit),
        _ => return None,
    };
    Some(Input::Command(command))
}

/// Draws one frame of the game. World cell (x, y) lands on terminal
/// cell (x / 10 + 1, y / 10 + 1), inside the border.
pub fn render(snap: &Snapshot) -> Canvas {
    let cols = (snap.width / GRID_STEP) as TermInt;
    let rows = (snap.height / GRID_STEP) as TermInt;
    let mut canvas = Canvas::new(cols + 2, rows + 2);
    canvas.draw_borders();

    let status = format!(" Difficulty : {} ", snap.difficulty_label);
    canvas.text(2, rows + 1, &status);

    let score_box = snap.hud.score_box;
    let (box_x, box_y) = to_cell((score_box.x, score_box.y));
    let box_cols = (score_box.w / GRID_STEP) as TermInt;
    let box_center = box_x + box_cols / 2;
    canvas.text_centered(box_center, box_y, &format!("Score : {}", snap.score));
    for x in box_x..box_x + box_cols {
        canvas.put(x, box_y + 1, '-');
    }

    if let Some(bonus) = snap.bonus {
        let (_, bar_y) = to_cell((snap.hud.timer_bar.x, snap.hud.timer_bar.y));
        let filled = (bonus.fraction_left * cols as f64).ceil() as TermInt;
        for x in 1..=filled.min(cols) {
            canvas.put(x, bar_y, TIMER_BAR_CHAR);
        }

        for dy in 0..2 {
            for dx in 0..2 {
                let (x, y) = to_cell((bonus.pos.0 + dx * GRID_STEP, bonus.pos.1 + dy * GRID_STEP));
                canvas.put(x, y, BONUS_CHAR);
            }
        }
    }

    if let Some(food) = snap.food {
        let (x, y) = to_cell(food);
        canvas.put(x, y, FOOD_CHAR);
    }

    let body_char = if snap.game_over { DEAD_SNAKE_CHAR } else { SNAKE_BODY_CHAR };
    for pos in snap.snake.iter().skip(1).rev() {
        let (x, y) = to_cell(*pos);
        canvas.put(x, y, body_char);
    }
    if let Some(head) = snap.snake.first() {
        let (x, y) = to_cell(*head);
        canvas.put(x, y, if snap.game_over { DEAD_SNAKE_CHAR } else { snap.head_char });
    }

    if snap.eating_score {
        canvas.text_centered((cols + 2) / 2, rows, "Stop EATING Score!!");
    }

    if snap.game_over {
        canvas.message(&["YOU DIED", "", &format!("Score : {}", snap.score)]);
    } else if snap.paused {
        canvas.message(&["Paused", "Press P to resume"]);
    }

    canvas
}

fn to_cell((x, y): Coords) -> (TermInt, TermInt) {
    ((x / GRID_STEP + 1) as TermInt, (y / GRID_STEP + 1) as TermInt)
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BonusView;
    use crate::snake::Direction;

    fn snapshot() -> Snapshot {
        let engine = Engine::new(&Config { seed: Some(1), ..Config::default() });
        let mut snap = engine.snapshot();
        snap.food = Some((300, 100));
        snap
    }

    #[test]
    fn keys_map_to_commands() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(map_key(&key(KeyCode::Up)), Some(Input::Command(Command::Turn(Direction::Up))));
        assert_eq!(map_key(&key(KeyCode::Char('a'))), Some(Input::Command(Command::Turn(Direction::Left))));
        assert_eq!(map_key(&key(KeyCode::Char('p'))), Some(Input::Command(Command::TogglePause)));
        assert_eq!(map_key(&key(KeyCode::Esc)), Some(Input::Quit));
        assert_eq!(map_key(&key(KeyCode::Char('x'))), None);
        assert_eq!(map_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(Input::Quit));
        assert_eq!(map_key(&key(KeyCode::Char('c'))), None);
    }

    #[test]
    fn frame_fits_default_terminal() {
        assert_eq!(frame_size(&Config::default()), (62, 24));
        // Unvalidated huge fields saturate instead of wrapping to a small size.
        let huge = Config { width: 2_000_000, ..Config::default() };
        assert_eq!(frame_size(&huge).0, u16::MAX);
    }

    #[test]
    fn render_places_entities_inside_border() {
        let snap = snapshot();
        let canvas = render(&snap);
        assert_eq!((canvas.width(), canvas.height()), (62, 24));
        // Head (100, 50) -> (11, 6), body follows to the left.
        assert_eq!(canvas.get(11, 6), Some('>'));
        assert_eq!(canvas.get(10, 6), Some(SNAKE_BODY_CHAR));
        assert_eq!(canvas.get(9, 6), Some(SNAKE_BODY_CHAR));
        assert_eq!(canvas.get(31, 11), Some(FOOD_CHAR));
        assert_eq!(canvas.get(0, 0), Some('+'));
    }

    #[test]
    fn render_shows_score_and_bonus_timer() {
        let mut snap = snapshot();
        snap.score = 7;
        snap.bonus = Some(BonusView { pos: (200, 100), fraction_left: 0.5 });
        let canvas = render(&snap);

        let score_row: String = (1..61).filter_map(|x| canvas.get(x, 2)).collect();
        assert!(score_row.contains("Score : 7"));

        // Timer bar on row 4, half of 60 columns filled.
        assert_eq!(canvas.get(30, 4), Some(TIMER_BAR_CHAR));
        assert_eq!(canvas.get(31, 4), Some(' '));

        for (x, y) in [(21, 11), (22, 11), (21, 12), (22, 12)] {
            assert_eq!(canvas.get(x, y), Some(BONUS_CHAR));
        }
    }

    #[test]
    fn render_marks_dead_snake() {
        let mut snap = snapshot();
        snap.game_over = true;
        snap.running = false;
        let canvas = render(&snap);
        assert_eq!(canvas.get(9, 6), Some(DEAD_SNAKE_CHAR));
        let all: String = (0..24)
            .flat_map(|y| (0..62).map(move |x| (x, y)))
            .filter_map(|(x, y)| canvas.get(x, y))
            .collect();
        assert!(all.contains("YOU DIED"));
    }
}
