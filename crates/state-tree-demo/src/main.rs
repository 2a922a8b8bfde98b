//! Scripted demo driving two state trees from one fixed-step loop.
mod config;
mod player;
mod wander;

use anyhow::Result;
use config::DemoConfig;
use state_tree::{Inspector, Tree};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::player::{Avatar, Player};
use crate::wander::{Goblin, Mind};

/// Where the goblin lives on the track.
const GOBLIN_HOME: f32 = 9.0;

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    setup_logging();

    let config = DemoConfig::from_env();
    tracing::info!(
        "running {} ticks at {} Hz (inspect: {})",
        config.ticks,
        config.tick_rate,
        config.inspect
    );

    run(&config)
}

/// Setup logging to stderr, filtered by `RUST_LOG`.
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn run(config: &DemoConfig) -> Result<()> {
    let delta = config.delta();

    let mut hero = Tree::new();
    hero.set_root::<Player>(Avatar::default());
    let mut goblin = Tree::new();
    goblin.set_root::<Mind>(Goblin::new(GOBLIN_HOME, config.seed));

    let mut inspector = Inspector::new();
    if config.inspect {
        inspector.toggle(&hero);
        inspector.toggle(&goblin);
    }

    let mut last = (String::new(), String::new());
    for tick in 0..config.ticks {
        let (axis, jump) = player::scripted_input(tick, config.tick_rate);
        if let Some(avatar) = hero.data_mut() {
            avatar.move_axis = axis;
            avatar.jump_pressed = jump;
        }
        player::step(&mut hero, delta)?;

        let player_x = hero.data().map_or(0.0, |avatar| avatar.position[0]);
        if let Some(npc) = goblin.data_mut() {
            npc.player = player_x;
        }
        goblin.update(delta)?;

        inspector.refresh(&hero);
        inspector.refresh(&goblin);

        let current = (hero.to_string(), goblin.to_string());
        if current != last {
            tracing::info!("tick {:>4}: {:<28} {}", tick, current.0, current.1);
            last = current;
        }
    }

    for view in inspector.views() {
        tracing::info!("\n{}", view);
    }

    hero.exit();
    goblin.exit();
    Ok(())
}
