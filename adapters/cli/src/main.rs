#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host that runs a Card Defence room with scripted players.
//!
//! Outbound notifications are written to stdout as JSON lines when requested;
//! logs go to stderr and are filtered through `RUST_LOG`.

mod bot;
mod config;

use std::{
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use card_defence_core::{millis, Outbound, Phase, PlayerId, RoomId};
use card_defence_world::{query, Match, Rooms};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use bot::Bot;

/// Simulated time allowed per requested wave before the run is abandoned.
const WAVE_TIME_LIMIT: Duration = Duration::from_secs(600);

/// Runs a headless Card Defence match driven by scripted players.
#[derive(Debug, Parser)]
#[command(name = "card-defence", version, about)]
struct Args {
    /// TOML file with match configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for every random stream of the match.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of scripted players.
    #[arg(long, default_value_t = 2)]
    players: u64,
    /// Stop once this many waves were completed.
    #[arg(long, default_value_t = 3)]
    waves: u32,
    /// Completing this wave wins the match.
    #[arg(long)]
    victory_wave: Option<u32>,
    /// Name of the hosted room.
    #[arg(long, default_value = "headless")]
    room: String,
    /// Simulated milliseconds per host step.
    #[arg(long, default_value_t = 100)]
    step_ms: u64,
    /// Preparation phase length in milliseconds.
    #[arg(long)]
    preparation_ms: Option<u64>,
    /// Use the narrower placement window of 30 to 80 pixels.
    #[arg(long)]
    legacy_placement: bool,
    /// Print every outbound notification as a JSON line.
    #[arg(long)]
    events: bool,
}

#[derive(Serialize)]
struct Line<'a> {
    room: &'a RoomId,
    #[serde(flatten)]
    outbound: &'a Outbound,
}

#[derive(Debug, Serialize)]
struct Summary {
    room: RoomId,
    phase: Phase,
    wave: u32,
    base_health: i32,
    towers: usize,
    kills: u32,
    time_ms: u64,
}

impl Summary {
    fn of(game: &Match) -> Self {
        Self {
            room: query::room(game).clone(),
            phase: query::phase(game),
            wave: query::wave(game),
            base_health: query::base_health(game),
            towers: query::towers(game).count(),
            kills: query::towers(game)
                .map(|tower| tower.statistics().kills)
                .sum(),
            time_ms: millis(query::clock(game)),
        }
    }
}

struct Printer {
    events: bool,
    stdout: io::Stdout,
}

impl Printer {
    fn new(events: bool) -> Self {
        Self {
            events,
            stdout: io::stdout(),
        }
    }

    fn emit(&mut self, room: &RoomId, outbound: impl IntoIterator<Item = Outbound>) -> Result<()> {
        for outbound in outbound {
            self.line(room, &outbound)?;
        }
        Ok(())
    }

    fn line(&mut self, room: &RoomId, outbound: &Outbound) -> Result<()> {
        if !self.events {
            return Ok(());
        }
        self.write(&Line { room, outbound })
    }

    fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let mut handle = self.stdout.lock();
        serde_json::to_writer(&mut handle, value).context("failed to encode notification")?;
        writeln!(handle)?;
        Ok(())
    }
}

/// Reports whether the run reached its goal.
fn finished(game: &Match, waves: u32) -> bool {
    match query::phase(game) {
        Phase::GameOver => true,
        Phase::Lobby => query::wave(game) >= waves,
        Phase::Preparation | Phase::WaveActive => false,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn run(args: Args) -> Result<()> {
    if args.players == 0 {
        bail!("at least one scripted player is required");
    }
    if args.step_ms == 0 {
        bail!("step_ms must be positive");
    }

    let config = config::load(
        args.config.as_deref(),
        config::Overrides {
            seed: args.seed,
            preparation_ms: args.preparation_ms,
            victory_wave: args.victory_wave,
            legacy_placement: args.legacy_placement,
        },
    )?;
    let mut rooms = Rooms::new(config).context("configuration rejected")?;
    let room = RoomId::new(args.room);
    let mut printer = Printer::new(args.events);
    let mut outbound = Vec::new();

    let bots: Vec<Bot> = (1..=args.players).map(|id| Bot::new(PlayerId::new(id))).collect();
    for bot in &bots {
        rooms
            .join(
                room.clone(),
                bot.player(),
                format!("bot-{}", bot.player()),
                &mut outbound,
            )
            .with_context(|| format!("player {} could not join {room}", bot.player()))?;
    }
    printer.emit(&room, outbound.drain(..))?;
    tracing::info!(%room, players = bots.len(), waves = args.waves, "match hosted");

    let step = Duration::from_millis(args.step_ms);
    let limit = WAVE_TIME_LIMIT * args.waves.max(1);
    let mut tagged = Vec::new();
    loop {
        let game = rooms.get(&room).context("room closed unexpectedly")?;
        if finished(game, args.waves) {
            break;
        }
        if query::clock(game) >= limit {
            tracing::warn!(%room, wave = query::wave(game), "time limit reached");
            break;
        }
        let _ = rooms.with_room(&room, |game| {
            for bot in &bots {
                bot.act(game, &mut outbound);
            }
        });
        printer.emit(&room, outbound.drain(..))?;

        rooms.advance(step, &mut tagged);
        for (room, outbound) in tagged.drain(..) {
            printer.line(&room, &outbound)?;
        }
    }

    let game = rooms.get(&room).context("room closed unexpectedly")?;
    let summary = Summary::of(game);
    tracing::info!(
        wave = summary.wave,
        base_health = summary.base_health,
        kills = summary.kills,
        phase = ?summary.phase,
        "run finished"
    );
    printer.write(&summary)?;

    for bot in &bots {
        let _ = rooms.leave(bot.player(), &mut outbound);
    }
    printer.emit(&room, outbound.drain(..))?;
    Ok(())
}

/// Entry point for the Card Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    run(Args::parse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_defence_core::MatchConfig;

    #[test]
    fn flags_parse_into_arguments() {
        let args = Args::try_parse_from([
            "card-defence",
            "--seed",
            "7",
            "--players",
            "3",
            "--legacy-placement",
            "--events",
        ])
        .expect("valid flags");
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.players, 3);
        assert_eq!(args.waves, 3);
        assert!(args.legacy_placement);
        assert!(args.events);
        assert!(args.config.is_none());
    }

    #[test]
    fn runs_stop_after_the_requested_waves() {
        let mut game = Match::new(RoomId::new("t"), MatchConfig::default()).expect("config");
        assert!(finished(&game, 0));
        assert!(!finished(&game, 1));

        let mut out = Vec::new();
        game.add_player(PlayerId::new(1), "bot-1", &mut out)
            .expect("join");
        Bot::new(PlayerId::new(1)).act(&mut game, &mut out);
        assert_eq!(query::phase(&game), Phase::Preparation);
        assert!(!finished(&game, 0));
    }

    #[test]
    fn notifications_serialize_with_their_room() {
        let room = RoomId::new("lobby");
        let outbound = Outbound::player(
            PlayerId::new(4),
            card_defence_core::Event::WaveEnded { wave: 2 },
        );
        let value = serde_json::to_value(Line {
            room: &room,
            outbound: &outbound,
        })
        .expect("serialize");
        assert_eq!(value["room"], "lobby");
        assert_eq!(value["audience"]["to"], "player");
        assert_eq!(value["audience"]["player"], 4);
        assert_eq!(value["event"]["type"], "wave_ended");
        assert_eq!(value["event"]["wave"], 2);
    }
}
