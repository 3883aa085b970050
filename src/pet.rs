//! The pet controller: one `PetState` plus the clock, random source, room and
//! rules every operation needs. Operations live in `needs`, `idle`,
//! `reactor`, `interact` and `motion`, all as methods on [`Pet`].

use crate::clock::Clock;
use crate::model::{
    one_line, truncate_chars, Bubble, BubbleKind, Effect, HeldItem, PetState, Rules, SleepPhase,
    BUBBLE_MAX_CHARS,
};
use crate::rng::RngState;
use crate::room::{Point, Room};
use crate::routine::shuffled_sequence;

/// Result of a user-facing operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Accepted,
    RateLimited,
    Asleep,
    Ignored,
}

pub(crate) struct Pet<C: Clock> {
    pub(crate) state: PetState,
    pub(crate) rules: Rules,
    pub(crate) room: Room,
    pub(crate) rng: RngState,
    pub(crate) clock: C,
}

impl<C: Clock> Pet<C> {
    pub(crate) fn new(clock: C, seed: u64) -> Self {
        Self::with_room(clock, seed, Room::default(), Rules::default())
    }

    pub(crate) fn with_room(clock: C, seed: u64, room: Room, rules: Rules) -> Self {
        let mut rng = RngState::new(seed);
        let now = clock.now_ms();
        let start = room.nearest_walkable(Point::new(256.0, 300.0));
        let sequence = shuffled_sequence(&mut rng);
        Self {
            state: PetState::new(now, start, sequence),
            rules,
            room,
            rng,
            clock,
        }
    }

    pub(crate) fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Offers a bubble; it only lands if the live one is not more important.
    /// The text is flattened to one line first.
    pub(crate) fn show(&mut self, text: &str, kind: BubbleKind, duration_ms: u64) -> bool {
        let now = self.now();
        let current = &self.state.bubble;
        if current.is_live(now) && current.kind > kind {
            return false;
        }
        self.state.bubble = Bubble {
            text: truncate_chars(&one_line(text), BUBBLE_MAX_CHARS),
            kind,
            expires_at: if duration_ms == 0 {
                0
            } else {
                now.saturating_add(duration_ms)
            },
        };
        true
    }

    pub(crate) fn clear_bubble(&mut self) {
        self.state.bubble = Bubble::default();
    }

    pub(crate) fn clear_props(&mut self) {
        self.state.held_item = HeldItem::None;
        self.state.effect = Effect::None;
        self.state.effect_expires_at = 0;
    }

    /// Drops the current idle plan and starts over from a fresh shuffle.
    /// Also wakes the pet.
    pub(crate) fn reset_idle(&mut self) {
        let now = self.now();
        self.state.idle.sequence = shuffled_sequence(&mut self.rng);
        self.state.idle.cursor = 0;
        self.state.idle.current = None;
        self.state.idle.entered_at = now;
        self.state.idle.pending_advance_at = None;
        self.state.idle.mood_pending = false;
        self.state.idle_reset_at = now;
        self.set_sleep_phase(SleepPhase::None);
        self.clear_props();
    }

    pub(crate) fn set_sleep_phase(&mut self, phase: SleepPhase) {
        if self.state.sleep_phase != phase {
            tracing::debug!(from = ?self.state.sleep_phase, to = ?phase, "sleep phase");
        }
        self.state.sleep_phase = phase;
        self.state.sleep_phase_at = self.now();
    }

    pub(crate) fn mark_interaction(&mut self) {
        let now = self.now();
        self.state.last_interaction_at = now;
        self.state.idle_reset_at = now;
    }

    pub(crate) fn task_locked(&self) -> bool {
        self.now() < self.state.task_locked_until
    }
}
