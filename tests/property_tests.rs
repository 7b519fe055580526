//! Property-based tests for the tick engine.
//!
//! These tests use proptest to drive machines with random action scripts
//! and compare every tick against a simple reference model.

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use std::collections::VecDeque;
use tickstate::{Action, StateDef, StateMachine, TickError, TickOutcome, TransitionDef};

const STATES: [&str; 4] = ["init", "alpha", "beta", "gamma"];
const HOOKED: [(&str, &str); 3] = [("init", "alpha"), ("alpha", "beta"), ("beta", "beta")];

#[derive(Default)]
struct Journal {
    events: Vec<String>,
    plan: VecDeque<Action>,
}

type Def = StateDef<Journal, ()>;
type Edge = TransitionDef<Journal, ()>;

fn timeout_ms(state: &str) -> Option<i64> {
    match state {
        "beta" => Some(200),
        "gamma" => Some(50),
        _ => None,
    }
}

fn scripted(name: &'static str) -> Def {
    let def = Def::new(name, move |_, journal| {
        journal.events.push(format!("loop:{name}"));
        journal.plan.pop_front().unwrap_or(Action::Stay)
    })
    .on_enter(move |_, journal| journal.events.push(format!("enter:{name}")))
    .on_exit(move |_, journal| journal.events.push(format!("exit:{name}")));

    match timeout_ms(name) {
        Some(ms) => def.timeout(std::time::Duration::from_millis(ms as u64)),
        None => def,
    }
}

fn machine() -> StateMachine<Journal, ()> {
    let transitions = HOOKED
        .iter()
        .map(|&(from, to)| {
            Edge::new(from, to, move |_, journal| {
                journal.events.push(format!("hook:{from}->{to}"))
            })
        })
        .collect();
    StateMachine::new(STATES.into_iter().map(scripted).collect(), transitions).unwrap()
}

prop_compose! {
    fn arbitrary_action()(kind in 0..10u8, target in 0..STATES.len()) -> Action {
        match kind {
            0 => Action::Terminate,
            1..=4 => Action::Stay,
            _ => Action::transition_to(STATES[target]),
        }
    }
}

prop_compose! {
    fn arbitrary_step()(action in arbitrary_action(), advance_ms in 0..120i64) -> (Action, i64) {
        (action, advance_ms)
    }
}

proptest! {
    #[test]
    fn engine_matches_reference_model(
        steps in prop::collection::vec(arbitrary_step(), 1..40)
    ) {
        let machine = machine();
        let mut position = machine.start();
        let mut journal = Journal::default();

        let mut now: DateTime<Utc> = Utc::now();
        let mut current = "init".to_string();
        let mut expires_at: Option<DateTime<Utc>> = None;

        for (tick, (action, advance_ms)) in steps.into_iter().enumerate() {
            let tick = tick as u64;
            now += Duration::milliseconds(advance_ms);
            journal.events.clear();
            journal.plan.clear();
            journal.plan.push_back(action.clone());

            let result = machine.tick_at(now, &(), &mut position, &mut journal, tick, &[]);

            if expires_at.is_some_and(|deadline| now >= deadline) {
                let is_expiry = matches!(
                    &result,
                    Err(TickError::TimeoutExpired { state, .. }) if *state == current
                );
                prop_assert!(is_expiry);
                prop_assert!(journal.events.is_empty());

                machine
                    .force_transition_at(now, &(), &mut position, &mut journal, tick, "init")
                    .unwrap();
                current = "init".to_string();
                expires_at = None;
                prop_assert_eq!(position.current(), "init");
                prop_assert!(position.expires_at().is_none());
                continue;
            }

            let outcome = result.unwrap();
            let mut expected = vec![format!("loop:{current}")];

            match action {
                Action::Stay => {
                    prop_assert_eq!(outcome, TickOutcome::Continue);
                }
                Action::Terminate => {
                    prop_assert_eq!(outcome, TickOutcome::Terminated);
                    prop_assert_eq!(&journal.events, &expected);
                    break;
                }
                Action::TransitionTo(target) => {
                    prop_assert_eq!(outcome, TickOutcome::Continue);
                    expected.push(format!("exit:{current}"));
                    if HOOKED.contains(&(current.as_str(), target.as_str())) {
                        expected.push(format!("hook:{current}->{target}"));
                    }
                    expected.push(format!("enter:{target}"));
                    expires_at = timeout_ms(&target).map(|ms| now + Duration::milliseconds(ms));
                    current = target;
                }
            }

            prop_assert_eq!(&journal.events, &expected);
            prop_assert_eq!(position.current(), current.as_str());
            prop_assert_eq!(position.expires_at(), expires_at);
        }
    }

    #[test]
    fn construction_requires_init(included in prop::collection::vec(any::<bool>(), STATES.len())) {
        let states: Vec<Def> = STATES
            .iter()
            .zip(&included)
            .filter(|(_, keep)| **keep)
            .map(|(name, _)| scripted(*name))
            .collect();

        let result = StateMachine::new(states, vec![]);
        prop_assert_eq!(result.is_ok(), included[0]);
    }

    #[test]
    fn stay_never_moves_the_position(ticks in 1..50u64) {
        let machine = machine();
        let mut position = machine.start();
        let mut journal = Journal::default();

        for tick in 0..ticks {
            let outcome = machine.tick(&(), &mut position, &mut journal, tick, &[]).unwrap();
            prop_assert_eq!(outcome, TickOutcome::Continue);
        }

        prop_assert_eq!(position.current(), "init");
        prop_assert!(journal.events.iter().all(|e| e == "loop:init"));
        prop_assert_eq!(journal.events.len() as u64, ticks);
    }
}
