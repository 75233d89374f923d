//! Threads around the engine.
//!
//! One owner thread holds the only `Engine` and is the single place state
//! changes. The input loop and the bonus spawner send it `Command`s; the
//! renderer reads the `Snapshot` the owner publishes after every change.
//! Clearing the shared running flag stops every loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::engine::{BonusEvent, Engine, Snapshot, StepOutcome};
use crate::snake::Direction;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Command {
    Turn(Direction),
    TogglePause,
    /// The spawner's cadence elapsed
    BonusTick(Duration),
    Quit,
}

pub type SharedSnapshot = Arc<RwLock<Snapshot>>;

pub struct Session {
    commands: Sender<Command>,
    snapshot: SharedSnapshot,
    running: Arc<AtomicBool>,
    owner: Option<JoinHandle<Engine>>,
    spawner: Option<JoinHandle<()>>,
}

impl Session {
    /// Moves the engine onto its owner thread and starts the bonus spawner.
    pub fn start(engine: Engine, bonus_period: Duration) -> Result<Self> {
        let (commands, rx) = mpsc::channel();
        let snapshot = Arc::new(RwLock::new(engine.snapshot()));
        let running = Arc::new(AtomicBool::new(true));

        let owner = {
            let snapshot = snapshot.clone();
            let running = running.clone();
            thread::Builder::new()
                .name("simulation".into())
                .spawn(move || run_owner(engine, rx, snapshot, running))
                .context("failed to spawn simulation thread")?
        };

        let spawner = {
            let tx = commands.clone();
            let running = running.clone();
            thread::Builder::new()
                .name("bonus-spawner".into())
                .spawn(move || run_spawner(tx, bonus_period, running))
        };
        let spawner = match spawner {
            Ok(handle) => handle,
            Err(err) => {
                running.store(false, Ordering::Release);
                let _ = commands.send(Command::Quit);
                let _ = owner.join();
                return Err(err).context("failed to spawn bonus spawner thread");
            }
        };

        log::info!("Session started");
        Ok(Session { commands, snapshot, running, owner: Some(owner), spawner: Some(spawner) })
    }

    /// Queues a command for the owner. Dropped silently once the session ended.
    pub fn send(&self, command: Command) {
        let _ = self.commands.send(command);
    }

    /// Latest published state.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stops both loops and waits for them. Returns the engine when the
    /// owner thread exited normally.
    pub fn shutdown(mut self) -> Option<Engine> {
        self.stop()
    }

    fn stop(&mut self) -> Option<Engine> {
        self.running.store(false, Ordering::Release);
        let _ = self.commands.send(Command::Quit);

        if let Some(spawner) = self.spawner.take() {
            if spawner.join().is_err() {
                log::error!("Bonus spawner thread panicked");
            }
        }

        let engine = self.owner.take().and_then(|owner| match owner.join() {
            Ok(engine) => Some(engine),
            Err(_) => {
                log::error!("Simulation thread panicked");
                None
            }
        });
        if engine.is_some() {
            log::info!("Session stopped");
        }
        engine
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.owner.is_some() || self.spawner.is_some() {
            self.stop();
        }
    }
}

/// Applies one command. Returns false when the owner should stop.
pub fn apply_command(engine: &mut Engine, command: Command) -> bool {
    match command {
        Command::Turn(direction) => engine.set_intended_direction(direction),
        Command::TogglePause => {
            let paused = engine.toggle_pause();
            log::debug!("Paused: {}", paused);
        }
        Command::BonusTick(elapsed) => {
            if let BonusEvent::Spawned(pos) = engine.tick_bonus(elapsed) {
                log::debug!("Bonus out at {:?}", pos);
            }
        }
        Command::Quit => {
            engine.quit();
            return false;
        }
    }
    true
}

fn publish(engine: &Engine, snapshot: &SharedSnapshot) {
    *snapshot.write().unwrap_or_else(PoisonError::into_inner) = engine.snapshot();
}

fn run_owner(
    mut engine: Engine,
    rx: Receiver<Command>,
    snapshot: SharedSnapshot,
    running: Arc<AtomicBool>,
) -> Engine {
    let mut next_step = Instant::now() + engine.tick_interval();

    while running.load(Ordering::Acquire) {
        let timeout = next_step.saturating_duration_since(Instant::now());
        match rx.recv_timeout(timeout) {
            Ok(command) => {
                let keep_going = apply_command(&mut engine, command);
                publish(&engine, &snapshot);
                if !keep_going {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                let outcome = engine.step();
                publish(&engine, &snapshot);
                match outcome {
                    StepOutcome::GameOver(score) => {
                        log::info!("Game over with score {}", score);
                        break;
                    }
                    StepOutcome::ScoreChanged(score) => {
                        log::trace!("Score {}, difficulty {:.1}", score, engine.difficulty());
                    }
                    StepOutcome::Continue => {}
                }
                next_step = Instant::now() + engine.tick_interval();
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    running.store(false, Ordering::Release);
    engine.quit();
    publish(&engine, &snapshot);
    engine
}

fn run_spawner(tx: Sender<Command>, period: Duration, running: Arc<AtomicBool>) {
    while running.load(Ordering::Acquire) {
        thread::sleep(period);
        if !running.load(Ordering::Acquire) || tx.send(Command::BonusTick(period)).is_err() {
            break;
        }
    }
}
