//! Shape Arena demo binary.
//!
//! `local` plays an AI-vs-AI battle through the single-player runner and
//! prints the narration. `session` runs a host and a guest in one process,
//! connected by an in-memory channel, and reports whether their states agree.

use clap::{Parser, Subcommand};
use shape_arena::battle::ai::{Behavior, ScoringAI};
use shape_arena::battle::runner::LocalBattle;
use shape_arena::battle::state::{Action, BattleEvent, BattleSide, BattleState, Side, TurnRng};
use shape_arena::errors::BattleResult;
use shape_arena::session::{generate_room_id, memory_pair, SessionCoordinator, SessionDriver};
use shape_arena::teams::{default_opponent_roster, load_roster_or_default, DEFAULT_LEVEL};
use std::path::PathBuf;
use tracing::info;

const MAX_ROUNDS: usize = 300;

#[derive(Parser)]
#[command(name = "shape-arena")]
#[command(about = "Turn-based shape battles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play the player roster against the built-in opponent
    Local {
        /// Seed for reproducible rounds; random when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// RON or JSON roster file
        #[arg(long)]
        roster: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_LEVEL)]
        level: u8,
    },
    /// Host and guest over an in-process channel
    Session {
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn rng_for(seed: Option<u64>) -> TurnRng {
    match seed {
        Some(seed) => TurnRng::from_seed(seed),
        None => TurnRng::new_random(),
    }
}

fn narrate(events: &[BattleEvent]) {
    for event in events {
        if let BattleEvent::Log { message } = event {
            println!("  {}", message);
        }
    }
}

fn run_local(seed: Option<u64>, roster: Option<PathBuf>, level: u8) -> BattleResult<()> {
    let player = load_roster_or_default(roster.as_deref()).build(level, "p1")?;
    let opponent = default_opponent_roster().build(level, "p2")?;
    let state = BattleState::new(
        "local",
        BattleSide::new("p1", "Player", player),
        BattleSide::new("p2", "Opponent", opponent),
    );
    let policy = ScoringAI;
    let mut battle = LocalBattle::new(state, ScoringAI, rng_for(seed));

    for _ in 0..MAX_ROUNDS {
        if battle.is_finished() {
            break;
        }
        let state = battle.state();
        let legal = battle.valid_actions();
        let wanted = if state.game_state.is_replacement_phase() {
            policy.choose_replacement(state.side(Side::A), state.active(Side::B))
        } else {
            match (state.active(Side::A), state.active(Side::B)) {
                (Some(own), Some(foe)) => Some(policy.choose_action(own, foe)),
                _ => None,
            }
        };
        let action: Action = match wanted {
            Some(action) if legal.contains(&action) => action,
            _ => match legal.first() {
                Some(&action) => action,
                None => break,
            },
        };

        println!("Turn {}", battle.state().turn_number);
        let result = battle.submit_action(action)?;
        narrate(&result.events);
    }

    match battle.winner() {
        Some(side) => println!("Side {} wins.", side),
        None if battle.is_finished() => println!("Draw."),
        None => println!("No winner after {} rounds.", MAX_ROUNDS),
    }
    Ok(())
}

async fn run_session(seed: Option<u64>) -> BattleResult<()> {
    let room = generate_room_id();
    info!(%room, "room created");

    let host_roster = load_roster_or_default(None).build(DEFAULT_LEVEL, "host")?;
    let guest_roster = default_opponent_roster().build(DEFAULT_LEVEL, "guest")?;
    let (host_end, guest_end) = memory_pair();
    let mut host = SessionDriver::new(SessionCoordinator::host(room.clone(), host_roster, rng_for(seed)), host_end);
    let mut guest = SessionDriver::new(SessionCoordinator::guest(room, guest_roster), guest_end);

    let guest_task = tokio::spawn(async move {
        guest.connect().await?;
        guest.play_out(&ScoringAI, MAX_ROUNDS).await?;
        Ok::<_, shape_arena::errors::SessionError>(guest.into_coordinator())
    });

    host.connect().await?;
    let outcome = host.play_out(&ScoringAI, MAX_ROUNDS).await?;
    let guest = match guest_task.await {
        Ok(result) => result?,
        Err(join_error) => {
            eprintln!("guest task failed: {}", join_error);
            return Ok(());
        }
    };

    let host_digest = host.coordinator().battle().map(BattleState::digest);
    let guest_digest = guest.battle().map(BattleState::digest);
    println!("Outcome: {:?}", outcome);
    if host_digest == guest_digest {
        println!("Host and guest agree on the final state.");
    } else {
        println!("Host and guest DIVERGED: {:?} vs {:?}", host_digest, guest_digest);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> BattleResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Local { seed, roster, level } => run_local(seed, roster, level),
        Command::Session { seed } => run_session(seed).await,
    }
}
