//! Match Lifecycle
//!
//! This demo runs a handful of matches through a lobby, a countdown, play and
//! results, all sharing one machine definition and one driver.
//!
//! Key concepts:
//! - One immutable machine, many entities
//! - Per-entity message batches
//! - Lobby timeout recovered by a forced transition
//! - Checkpointing an entity mid-match
//!
//! Run with: RUST_LOG=info cargo run --example match_lifecycle

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tickstate::checkpoint::Checkpoint;
use tickstate::driver::{Driver, EntityId, EntityOutcome, TimeoutPolicy};
use tickstate::{Action, InboundMessage, StateDef, StateMachine, TransitionDef};
use tracing_subscriber::EnvFilter;

/// Read-only settings shared by every match.
struct Settings {
    min_players: usize,
    countdown_ticks: u32,
    winning_score: u32,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct Match {
    players: Vec<String>,
    countdown: u32,
    scores: HashMap<String, u32>,
    winner: Option<String>,
}

type Def = StateDef<Match, Settings>;
type Edge = TransitionDef<Match, Settings>;

fn build_machine() -> StateMachine<Match, Settings> {
    StateMachine::builder()
        .named("match")
        .state(Def::new("init", |_, _| Action::transition_to("lobby")))
        .state(
            Def::new("lobby", |ctx, game| {
                for message in ctx.messages {
                    if !game.players.contains(&message.sender) {
                        game.players.push(message.sender.clone());
                    }
                }
                if game.players.len() >= ctx.env.min_players {
                    Action::transition_to("countdown")
                } else {
                    Action::Stay
                }
            })
            .timeout(Duration::from_millis(200)),
        )
        .state(
            Def::new("countdown", |_, game| {
                game.countdown = game.countdown.saturating_sub(1);
                if game.countdown == 0 {
                    Action::transition_to("playing")
                } else {
                    Action::Stay
                }
            })
            .on_enter(|ctx, game| game.countdown = ctx.env.countdown_ticks),
        )
        .state(Def::new("playing", |ctx, game| {
            for message in ctx.messages {
                let score = game.scores.entry(message.sender.clone()).or_insert(0);
                *score += message.payload.len() as u32;
                if *score >= ctx.env.winning_score {
                    game.winner = Some(message.sender.clone());
                }
            }
            if game.winner.is_some() {
                Action::transition_to("results")
            } else {
                Action::Stay
            }
        }))
        .state(Def::new("results", |_, _| Action::Terminate))
        .state(
            Def::new("abandoned", |_, _| Action::Terminate)
                .on_enter(|_, game| game.players.clear()),
        )
        .transition(Edge::new("lobby", "countdown", |_, game| {
            game.scores = game.players.iter().map(|p| (p.clone(), 0)).collect();
        }))
        .transition(Edge::new("lobby", "abandoned", |_, game| {
            println!("  lobby with {} player(s) abandoned", game.players.len());
        }))
        .build()
        .unwrap_or_else(|error| panic!("invalid match machine: {error}"))
}

fn inbox_for(entries: &[(EntityId, &str, &str)]) -> HashMap<EntityId, Vec<InboundMessage>> {
    let mut inbox: HashMap<EntityId, Vec<InboundMessage>> = HashMap::new();
    for (id, sender, payload) in entries {
        inbox
            .entry(*id)
            .or_default()
            .push(InboundMessage::new(*sender, payload.as_bytes()));
    }
    inbox
}

fn report(tick: u64, outcomes: &[(EntityId, EntityOutcome)]) {
    for (id, outcome) in outcomes {
        if *outcome != EntityOutcome::Running {
            println!("  tick {tick}: {id} -> {outcome:?}");
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Match Lifecycle Example ===\n");

    let machine = Arc::new(build_machine());
    println!("Machine: {machine:?}\n");

    let settings = Settings {
        min_players: 2,
        countdown_ticks: 2,
        winning_score: 6,
    };

    let mut driver = Driver::new(Arc::clone(&machine))
        .with_timeout_policy(TimeoutPolicy::ForceTransition("abandoned".to_string()));

    let full = driver.spawn(Match::default());
    let lonely = driver.spawn(Match::default());
    println!("Spawned matches {full} and {lonely}\n");

    // init -> lobby
    let mut tick = 1;
    report(tick, &driver.tick_all(&settings, tick, &HashMap::new()));

    // Two players join the first lobby, one joins the second
    tick += 1;
    let joins = inbox_for(&[(full, "alice", ""), (full, "bob", ""), (lonely, "carol", "")]);
    report(tick, &driver.tick_all(&settings, tick, &joins));

    for (id, label) in [(full, "full"), (lonely, "lonely")] {
        if let Some(entity) = driver.get(id) {
            println!(
                "  {label}: {} with players {:?}",
                entity.position.current(),
                entity.state.players
            );
        }
    }

    // Countdown
    for _ in 0..2 {
        tick += 1;
        report(tick, &driver.tick_all(&settings, tick, &HashMap::new()));
    }

    println!("\nCheckpointing the running match...");
    match driver.checkpoint(full).and_then(|cp| cp.to_json().map_err(Into::into)) {
        Ok(json) => {
            println!("  {} bytes of JSON", json.len());
            if let Ok(restored) = Checkpoint::<Match>::from_json(&json) {
                println!("  restored position: {}", restored.position.current());
            }
        }
        Err(error) => println!("  checkpoint failed: {error}"),
    }

    // Let the lonely lobby expire
    std::thread::sleep(Duration::from_millis(250));

    println!("\nPlaying...");
    let moves = [
        inbox_for(&[(full, "alice", "hit"), (full, "bob", "hi")]),
        inbox_for(&[(full, "alice", "hit"), (full, "bob", "hi")]),
        HashMap::new(),
    ];
    for batch in &moves {
        tick += 1;
        report(tick, &driver.tick_all(&settings, tick, batch));
    }

    while !driver.is_empty() {
        tick += 1;
        report(tick, &driver.tick_all(&settings, tick, &HashMap::new()));
    }

    println!("\nAll matches finished after {tick} ticks");
}
