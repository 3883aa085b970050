use crate::bubble;
use crate::clock::Clock;
use crate::model::{BubbleKind, Effect, SleepPhase};
use crate::pet::{Outcome, Pet};
use crate::routine::{shuffled_sequence, StepMarker, StepRef, REST, ROUTINES};

impl<C: Clock> Pet<C> {
    /// Idle scheduling is allowed once no task lock is live and the last
    /// idle-resetting event is old enough.
    pub(crate) fn idle_eligible(&self) -> bool {
        let now = self.now();
        now >= self.state.task_locked_until
            && now.saturating_sub(self.state.idle_reset_at) >= self.rules.idle_after_ms
    }

    fn arrived(&self) -> bool {
        self.state.position.dist(self.state.target) < self.rules.at_target_px
    }

    /// Sleep-phase and idle-step transitions for one motion tick.
    pub(crate) fn update_idle(&mut self) {
        self.update_sleep_phase();

        let now = self.now();
        if let Some(at) = self.state.idle.pending_advance_at {
            if now >= at {
                self.state.idle.pending_advance_at = None;
                self.enter_next_step();
            }
            return;
        }

        if !matches!(self.state.sleep_phase, SleepPhase::None | SleepPhase::Waking) {
            return;
        }
        if !self.idle_eligible() {
            return;
        }

        if self.state.idle.mood_pending && self.arrived() {
            self.roll_idle_mood();
        }

        let current = self.state.idle.current.map(StepRef::step);
        let hold = current.map_or(0, |s| s.hold_ms);
        let elapsed = now.saturating_sub(self.state.idle.entered_at);
        let dwelled = self.arrived() && elapsed >= hold;
        let stalled = elapsed >= hold.saturating_add(self.rules.idle_stall_ms);
        if !dwelled && !stalled {
            return;
        }
        if stalled && !dwelled {
            tracing::debug!(?current, "idle step stalled, moving on");
        }

        if let Some(done) = current.and_then(|s| s.done_message) {
            let ms = self.rules.done_message_ms;
            self.show(done, BubbleKind::Ambient, ms);
            self.state.idle.pending_advance_at = Some(now.saturating_add(ms));
            return;
        }
        self.enter_next_step();
    }

    fn update_sleep_phase(&mut self) {
        let elapsed = self.now().saturating_sub(self.state.sleep_phase_at);
        let phase_ms = self.rules.sleep_phase_ms;
        match self.state.sleep_phase {
            SleepPhase::None => {}
            SleepPhase::MovingToBed => {
                if self.arrived() {
                    self.set_sleep_phase(SleepPhase::Settling);
                    self.show(bubble::SLEEP_SETTLING, BubbleKind::Ambient, 0);
                }
            }
            SleepPhase::Settling => {
                if elapsed >= phase_ms {
                    self.set_sleep_phase(SleepPhase::Blanketed);
                    self.show(bubble::SLEEP_BLANKETED, BubbleKind::Ambient, 0);
                }
            }
            SleepPhase::Blanketed => {
                if elapsed >= phase_ms {
                    self.set_sleep_phase(SleepPhase::Sleeping);
                    self.show(bubble::SLEEP_SLEEPING, BubbleKind::Ambient, 0);
                }
            }
            SleepPhase::Sleeping => {
                let nap = self.state.idle.current.map_or(REST.hold_ms, |s| s.step().hold_ms);
                if elapsed >= nap {
                    self.enter_next_step();
                }
            }
            SleepPhase::Waking => {
                if elapsed >= phase_ms {
                    self.set_sleep_phase(SleepPhase::None);
                }
            }
        }
    }

    /// Moves the cursor to the next step and applies it.
    pub(crate) fn enter_next_step(&mut self) {
        let now = self.now();
        if self.state.idle.cursor >= self.state.idle.sequence.len() {
            self.state.idle.sequence = shuffled_sequence(&mut self.rng);
            self.state.idle.cursor = 0;
        }
        let Some(&next) = self.state.idle.sequence.get(self.state.idle.cursor) else {
            return;
        };
        self.state.idle.cursor += 1;
        if self.state.idle.cursor >= self.state.idle.sequence.len() {
            self.state.idle.sequence = shuffled_sequence(&mut self.rng);
            self.state.idle.cursor = 0;
        }
        self.state.idle.current = Some(next);
        self.state.idle.entered_at = now;
        self.state.idle.mood_pending = false;

        let step = next.step();
        let goal = step.location.point();
        self.state.target = if step.location.enter_directly() {
            goal
        } else {
            self.room.nearest_walkable(goal)
        };
        self.state.escape_waypoint = None;
        self.state.stuck_ticks = 0;
        self.state.held_item = step.held;
        self.state.effect = step.effect;
        self.state.effect_expires_at = match step.effect {
            Effect::None => 0,
            _ => now.saturating_add(self.rules.effect_ms),
        };

        match step.marker {
            Some(StepMarker::SleepStart) => self.set_sleep_phase(SleepPhase::MovingToBed),
            Some(StepMarker::SleepEnd) if self.state.sleep_phase == SleepPhase::Sleeping => {
                self.set_sleep_phase(SleepPhase::Waking);
            }
            _ => {
                if !matches!(self.state.sleep_phase, SleepPhase::None | SleepPhase::Waking) {
                    self.set_sleep_phase(SleepPhase::None);
                }
            }
        }

        if self.state.sleep_phase == SleepPhase::Waking {
            self.show(bubble::SLEEP_WAKING, BubbleKind::Ambient, 0);
        } else if !step.message.is_empty() {
            self.show(step.message, BubbleKind::Ambient, 0);
        } else {
            if self.state.bubble.kind == BubbleKind::Ambient {
                self.clear_bubble();
            }
            self.state.idle.mood_pending = true;
        }
    }

    /// Maybe mutters a mood line; called once on reaching a quiet step.
    fn roll_idle_mood(&mut self) {
        self.state.idle.mood_pending = false;
        if !self.rng.roll(self.rules.idle_mood_chance) {
            return;
        }
        let needs = self.state.needs;
        let line = bubble::idle_mood_line(&needs, &mut self.rng);
        if !line.is_empty() {
            let ms = self.rules.idle_mood_ms;
            self.show(line, BubbleKind::Ambient, ms);
        }
    }

    /// Puts a routine at the head of the idle plan; the rest of the plan is
    /// reshuffled behind it.
    pub(crate) fn queue_routine(&mut self, routine: usize) {
        let Some(r) = ROUTINES.get(routine) else {
            return;
        };
        let mut sequence: Vec<StepRef> = (0..r.steps.len())
            .map(|step| StepRef::Routine { routine, step })
            .collect();
        sequence.push(StepRef::Rest);
        sequence.extend(shuffled_sequence(&mut self.rng));
        self.state.idle.sequence = sequence;
        self.state.idle.cursor = 0;
        self.state.idle.current = None;
        self.state.idle.pending_advance_at = None;
        self.state.idle.mood_pending = false;
        tracing::info!(routine = r.name, "routine queued");
    }

    /// Starts a routine right away, as if the pet had been idle long enough.
    pub(crate) fn request_routine(&mut self, routine: usize) -> Outcome {
        if self.state.sleep_phase.is_asleep() {
            return Outcome::Asleep;
        }
        if routine >= ROUTINES.len() || self.task_locked() {
            return Outcome::Ignored;
        }
        self.reset_idle();
        self.queue_routine(routine);
        let now = self.now();
        self.state.idle_reset_at = now.saturating_sub(self.rules.idle_after_ms);
        self.enter_next_step();
        Outcome::Accepted
    }
}
