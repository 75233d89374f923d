use std::path::PathBuf;
use std::process::exit;

use anyhow::Result;
use clap::Parser;

use snake::config::{Config, ConfigOverrides};
use snake::game::SnakeGame;

#[derive(Parser, Debug)]
#[command(name = "snake", version, about = "Snake in the terminal. Don't eat your score.")]
struct Cli {
    /// JSON file with config values; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    print_config: bool,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run(Cli::parse()) {
        log::error!("{:#}", err);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let config = config.apply(&cli.overrides).validate()?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let mut game = SnakeGame::new(config)?;
    game.initialize()?;
    if !game.show_intro()? {
        return Ok(());
    }

    let score = game.play()?;
    // Leave the alternate screen before printing.
    drop(game);
    println!("Score: {}", score);
    Ok(())
}
