//! Server configuration (C9): the tunables the broker and bot are built
//! from. There is no listening socket here -- transport is out of scope --
//! but the knobs a deployment needs to pick are gathered in one place, the
//! way the teacher's own CLI config does.

use clap::Parser;
use std::time::Duration;

/// Relaxes origin enforcement in development; the engine itself is
/// transport-agnostic, but this flag is part of the configuration surface
/// section 6 names for whatever binds the engine to a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OperatingMode {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Listening port for whatever transport binds to this engine.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Origins allowed to open a session; ignored in development mode.
    #[arg(long)]
    pub allowed_origins: Vec<String>,

    #[arg(long, value_enum, default_value_t = OperatingMode::Development)]
    pub mode: OperatingMode,

    /// How long a player has to act before their turn auto-passes.
    #[clap(value_parser = humantime::parse_duration, default_value = "30s")]
    #[arg(long)]
    pub move_clock: Duration,

    /// Delay between a match going Terminal and the rotation that follows.
    #[clap(value_parser = humantime::parse_duration, default_value = "5s")]
    #[arg(long)]
    pub rotation_delay: Duration,

    /// The bot's default thinking budget per turn.
    #[clap(value_parser = humantime::parse_duration, default_value = "2s")]
    #[arg(long)]
    pub bot_pondering_time: Duration,

    /// The bot's hard ceiling when the default budget runs out empty-handed.
    #[clap(value_parser = humantime::parse_duration, default_value = "6s")]
    #[arg(long)]
    pub bot_max_pondering_time: Duration,

    /// Fixed search depth for the bot's minimax strategy.
    #[arg(long, default_value_t = 3)]
    pub bot_search_depth: u8,

    /// Maximum number of sessions allowed to queue behind an active match.
    #[arg(long, default_value_t = 64)]
    pub max_queue_len: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            port: 8080,
            allowed_origins: Vec::new(),
            mode: OperatingMode::Development,
            move_clock: Duration::from_secs(30),
            rotation_delay: Duration::from_secs(5),
            bot_pondering_time: Duration::from_secs(2),
            bot_max_pondering_time: Duration::from_secs(6),
            bot_search_depth: 3,
            max_queue_len: 64,
        }
    }
}
