//! One machine definition shared across concurrently ticked entities.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tickstate::{Action, StateDef, StateMachine, TickOutcome, TransitionDef};

/// Shared, read-only configuration handed to every callback.
struct Rules {
    rounds: u32,
    finished: AtomicUsize,
}

#[derive(Debug, Default)]
struct Match {
    id: usize,
    round: u32,
    history: Vec<String>,
}

type Def = StateDef<Match, Rules>;

fn machine() -> StateMachine<Match, Rules> {
    StateMachine::builder()
        .named("match")
        .state(Def::new("init", |_, _| Action::transition_to("playing")))
        .state(Def::new("playing", |ctx, game| {
            game.round += 1;
            if game.round >= ctx.env.rounds {
                Action::transition_to("finished")
            } else {
                Action::Stay
            }
        }))
        .state(
            Def::new("finished", |_, _| Action::Terminate)
                .on_enter(|ctx, _| {
                    ctx.env.finished.fetch_add(1, Ordering::SeqCst);
                }),
        )
        .transition(TransitionDef::new("init", "playing", |_, game: &mut Match| {
            game.history.push(format!("match {} started", game.id))
        }))
        .build()
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn entities_tick_independently_on_many_tasks() {
    let machine = Arc::new(machine());
    let rules = Arc::new(Rules {
        rounds: 5,
        finished: AtomicUsize::new(0),
    });

    let handles: Vec<_> = (0..32)
        .map(|id| {
            let machine = Arc::clone(&machine);
            let rules = Arc::clone(&rules);
            tokio::spawn(async move {
                let mut position = machine.start();
                let mut game = Match {
                    id,
                    ..Match::default()
                };
                let mut tick = 0;
                loop {
                    tick += 1;
                    let outcome = machine
                        .tick(&rules, &mut position, &mut game, tick, &[])
                        .unwrap();
                    if outcome == TickOutcome::Terminated {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
                (game, tick)
            })
        })
        .collect();

    for (id, handle) in handles.into_iter().enumerate() {
        let (game, ticks) = handle.await.unwrap();
        assert_eq!(game.id, id);
        assert_eq!(game.round, 5);
        assert_eq!(game.history, vec![format!("match {id} started")]);
        // init, five rounds of playing, then finished
        assert_eq!(ticks, 7);
    }

    assert_eq!(rules.finished.load(Ordering::SeqCst), 32);
}

#[tokio::test]
async fn machine_is_shareable_across_tasks() {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    let machine = Arc::new(machine());
    assert_send_sync(&machine);

    let worker = {
        let machine = Arc::clone(&machine);
        tokio::spawn(async move { machine.state_names().len() })
    };

    assert_eq!(worker.await.unwrap(), 3);
}
