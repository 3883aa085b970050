//! End-to-end scenarios driven through the public operations with a manual
//! clock, the way the front end drives them.

use crate::bubble::{self, NeedAlert};
use crate::clock::ManualClock;
use crate::model::{BubbleKind, SleepPhase, TaskStatus};
use crate::pet::{Outcome, Pet};
use crate::room::Location;
use crate::routine::routine_index;
use proptest::prelude::*;

const TICK: u64 = 50;

fn new_pet(seed: u64) -> (ManualClock, Pet<ManualClock>) {
    let clock = ManualClock::new(1_000_000);
    let pet = Pet::new(clock.clone(), seed);
    (clock, pet)
}

/// Runs motion ticks until `done` holds; returns the ticks spent.
fn tick_until(
    clock: &ManualClock,
    pet: &mut Pet<ManualClock>,
    max_ticks: usize,
    done: impl Fn(&Pet<ManualClock>) -> bool,
) -> Option<usize> {
    for i in 0..max_ticks {
        if done(pet) {
            return Some(i);
        }
        clock.advance(TICK);
        pet.motion_tick();
    }
    done(pet).then_some(max_ticks)
}

#[test]
fn feeding_is_rate_limited_per_window() {
    let (clock, mut pet) = new_pet(1);
    pet.state.needs.hunger = 60.0;
    let before = pet.state.needs;

    assert_eq!(pet.feed(), Outcome::Accepted);
    assert_eq!(pet.feed(), Outcome::Accepted);
    assert_eq!(pet.feed(), Outcome::RateLimited);
    assert_eq!(pet.state.bubble.text, bubble::FEED_LIMIT);
    assert_eq!(pet.state.needs.hunger, before.hunger - 44.0);
    assert_eq!(pet.state.needs.affection, before.affection + 4.0);

    clock.advance(10 * 60_000);
    assert_eq!(pet.feed(), Outcome::Accepted);
}

#[test]
fn coding_task_walks_to_laptop_then_settles_after_done() {
    let (clock, mut pet) = new_pet(2);
    pet.on_task_event(TaskStatus::Working, Some("fixing the build"), "coding");
    assert_eq!(pet.state.bubble.text, "fixing the build");

    let laptop = Location::Laptop.point();
    let ticks = tick_until(&clock, &mut pet, 400, |p| p.state.position.dist(laptop) < 1.0);
    assert!(ticks.is_some(), "pet never reached the laptop");
    assert_eq!(pet.state.bubble.text, "fixing the build");

    pet.on_task_event(TaskStatus::Done, None, "coding");
    let spot = pet.state.position;
    assert_eq!(pet.state.target, spot);
    assert_eq!(pet.state.bubble.text, bubble::TASK_DONE);

    // grace period: no idle wandering for 30 s
    tick_until(&clock, &mut pet, 599, |_| false);
    assert!(pet.state.idle.current.is_none());
    assert_eq!(pet.state.position, spot);
    assert!(pet.state.bubble.text.is_empty());

    clock.advance(TICK);
    pet.motion_tick();
    assert!(pet.state.idle.current.is_some());
}

#[test]
fn nap_runs_through_every_phase_and_refuses_food() {
    let (clock, mut pet) = new_pet(3);
    let nap = routine_index("nap").unwrap();
    assert_eq!(pet.request_routine(nap), Outcome::Accepted);

    let mut seen = vec![pet.state.sleep_phase];
    let mut fed_while_asleep = None;
    for _ in 0..10_000 {
        clock.advance(TICK);
        pet.motion_tick();
        let phase = pet.state.sleep_phase;
        if seen.last() != Some(&phase) {
            seen.push(phase);
        }
        if phase == SleepPhase::Sleeping && fed_while_asleep.is_none() {
            let hunger = pet.state.needs.hunger;
            fed_while_asleep = Some(pet.feed());
            assert_eq!(pet.state.needs.hunger, hunger);
            assert_eq!(pet.state.bubble.text, bubble::ASLEEP);
        }
        if phase == SleepPhase::None && seen.len() > 1 {
            break;
        }
    }
    assert_eq!(fed_while_asleep, Some(Outcome::Asleep));
    assert_eq!(
        seen,
        vec![
            SleepPhase::None,
            SleepPhase::MovingToBed,
            SleepPhase::Settling,
            SleepPhase::Blanketed,
            SleepPhase::Sleeping,
            SleepPhase::Waking,
            SleepPhase::None,
        ]
    );
}

#[test]
fn task_bubble_outranks_need_warnings() {
    let (clock, mut pet) = new_pet(4);
    pet.on_task_event(TaskStatus::Working, None, "shopping");
    let task_text = pet.state.bubble.text.clone();

    pet.state.needs.hunger = 90.0;
    clock.advance(60_000);
    pet.decay_tick();
    assert_eq!(pet.state.bubble.text, task_text);

    pet.on_task_event(TaskStatus::Done, None, "shopping");
    clock.advance(1_000);
    pet.decay_tick();
    assert_eq!(pet.state.bubble.text, bubble::TASK_DONE);

    clock.advance(4_000);
    pet.decay_tick();
    assert_eq!(pet.state.bubble.kind, BubbleKind::State);
    assert_eq!(NeedAlert::of(&pet.state.needs), Some(NeedAlert::VeryHungry));
    assert!(!pet.state.bubble.text.is_empty());
}

#[test]
fn interaction_interrupts_an_idle_routine() {
    let (clock, mut pet) = new_pet(5);
    pet.request_routine(routine_index("watering").unwrap());
    assert!(pet.state.idle.current.is_some());
    clock.advance(1_000);
    pet.pet();
    assert!(pet.state.idle.current.is_none());
    assert_eq!(pet.state.idle.cursor, 0);

    // nothing resumes before the idle threshold
    tick_until(&clock, &mut pet, 17_000 / TICK as usize, |_| false);
    assert!(pet.state.idle.current.is_none());
}

#[test]
fn same_seed_same_day() {
    let script = |seed| {
        let (clock, mut pet) = new_pet(seed);
        for i in 0..3_000u32 {
            clock.advance(TICK);
            pet.motion_tick();
            if i % 1_200 == 0 {
                pet.decay_tick();
            }
            if i == 1_500 {
                pet.on_task_event(TaskStatus::Thinking, None, "research");
            }
        }
        pet.state
    };
    assert_eq!(script(42), script(42));
}

#[derive(Clone, Debug)]
enum Op {
    Feed,
    Pet,
    Poke,
    Light,
    Decay,
    Motion(u8),
    Task(u8),
    Wait(u32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Feed),
        Just(Op::Pet),
        Just(Op::Poke),
        Just(Op::Light),
        Just(Op::Decay),
        (1u8..40).prop_map(Op::Motion),
        (0u8..5).prop_map(Op::Task),
        (0u32..900_000).prop_map(Op::Wait),
    ]
}

proptest! {
    #[test]
    fn needs_stay_in_range(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..60)) {
        let (clock, mut pet) = new_pet(seed);
        for op in ops {
            match op {
                Op::Feed => { pet.feed(); }
                Op::Pet => { pet.pet(); }
                Op::Poke => { pet.react_to_click(); }
                Op::Light => { pet.toggle_light(); }
                Op::Decay => pet.decay_tick(),
                Op::Motion(n) => {
                    for _ in 0..n {
                        clock.advance(TICK);
                        pet.motion_tick();
                    }
                }
                Op::Task(s) => {
                    let status = [
                        TaskStatus::Started,
                        TaskStatus::Thinking,
                        TaskStatus::Working,
                        TaskStatus::Done,
                        TaskStatus::Error,
                    ][s as usize];
                    pet.on_task_event(status, None, "coding");
                }
                Op::Wait(ms) => clock.advance(ms as u64),
            }
            let n = pet.state.needs;
            for v in [n.hunger, n.affection, n.energy] {
                prop_assert!((0.0..=100.0).contains(&v));
            }
            prop_assert!(pet.state.position.is_finite());
            prop_assert!(pet.state.bubble.text.chars().count() <= 100);
        }
    }
}
