use crate::bubble;
use crate::clock::Clock;
use crate::model::{BubbleKind, SleepPhase};
use crate::pet::Pet;

impl<C: Clock> Pet<C> {
    /// Slow periodic tick: needs drift, stale task locks are released and a
    /// need warning may be shown while nothing else is being said.
    pub(crate) fn decay_tick(&mut self) {
        let now = self.now();
        let r = &self.rules;
        let lonely = now.saturating_sub(self.state.last_interaction_at) >= r.lonely_after_ms;

        let needs = &mut self.state.needs;
        needs.hunger += r.hunger_per_tick;
        if self.state.sleep_phase == SleepPhase::Sleeping {
            needs.energy += r.sleep_energy_per_tick;
        } else {
            needs.energy -= r.energy_per_tick;
        }
        if lonely {
            needs.affection -= r.affection_per_tick;
        }
        needs.clamp();

        if self.state.task_locked_until != 0 && now >= self.state.task_locked_until {
            self.release_task_lock();
        }

        if self.state.current_category.is_some() {
            return;
        }
        if self.state.bubble.is_live(now) {
            return;
        }
        let needs = self.state.needs;
        if let Some(line) = bubble::state_line(&needs, &mut self.rng) {
            let ms = self.rules.state_bubble_ms;
            self.show(line, BubbleKind::State, ms);
        }
    }

    fn release_task_lock(&mut self) {
        tracing::debug!(category = ?self.state.current_category, "task lock expired");
        self.state.task_locked_until = 0;
        self.state.last_terminal = None;
        if self.state.current_category.take().is_some()
            && self.state.bubble.kind == BubbleKind::Explicit
        {
            self.clear_bubble();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bubble;
    use crate::clock::ManualClock;
    use crate::model::{BubbleKind, SleepPhase, TaskStatus};
    use crate::pet::Pet;
    use crate::routine::{routine_index, StepRef};

    fn pet() -> (ManualClock, Pet<ManualClock>) {
        let clock = ManualClock::new(0);
        let pet = Pet::new(clock.clone(), 5);
        (clock, pet)
    }

    #[test]
    fn n_ticks_match_closed_form() {
        let (clock, mut pet) = pet();
        let start = pet.state.needs;
        let n = 40;
        for _ in 0..n {
            clock.advance(60_000);
            pet.decay_tick();
        }
        let expected_hunger = (start.hunger + n as f32 * 1.0).min(100.0);
        let expected_energy = (start.energy - n as f32 * 0.55).max(0.0);
        assert!((pet.state.needs.hunger - expected_hunger).abs() < 1e-3);
        assert!((pet.state.needs.energy - expected_energy).abs() < 1e-3);
    }

    #[test]
    fn affection_holds_while_recently_touched() {
        let (clock, mut pet) = pet();
        let before = pet.state.needs.affection;
        clock.advance(60_000);
        pet.decay_tick();
        assert_eq!(pet.state.needs.affection, before);

        clock.advance(5 * 60_000);
        pet.decay_tick();
        assert!(pet.state.needs.affection < before);
    }

    #[test]
    fn hunger_saturates() {
        let (clock, mut pet) = pet();
        for _ in 0..200 {
            clock.advance(60_000);
            pet.decay_tick();
        }
        assert_eq!(pet.state.needs.hunger, 100.0);
        assert_eq!(pet.state.needs.energy, 0.0);
    }

    #[test]
    fn state_bubble_appears_when_nothing_else_talks() {
        let (clock, mut pet) = pet();
        pet.state.needs.hunger = 80.0;
        clock.advance(60_000);
        pet.decay_tick();
        assert_eq!(pet.state.bubble.kind, BubbleKind::State);
        assert!(!pet.state.bubble.text.is_empty());
        assert_eq!(pet.state.bubble.expires_at, clock_now(&clock) + 5_000);
    }

    fn clock_now(clock: &ManualClock) -> u64 {
        use crate::clock::Clock;
        clock.now_ms()
    }

    #[test]
    fn active_category_suppresses_state_bubble() {
        let (clock, mut pet) = pet();
        pet.on_task_event(TaskStatus::Working, None, "coding");
        let task_text = pet.state.bubble.text.clone();
        pet.state.needs.hunger = 90.0;
        clock.advance(60_000);
        pet.decay_tick();
        assert_eq!(pet.state.bubble.text, task_text);
    }

    #[test]
    fn need_warning_waits_for_the_current_bubble() {
        let (clock, mut pet) = pet();
        let nap = routine_index("nap").unwrap();
        pet.state.idle.current = Some(StepRef::Routine { routine: nap, step: 1 });
        pet.set_sleep_phase(SleepPhase::Sleeping);
        pet.show(bubble::SLEEP_SLEEPING, BubbleKind::Ambient, 0);
        pet.state.needs.hunger = 80.0;
        clock.advance(60_000);
        pet.decay_tick();
        assert_eq!(pet.state.bubble.text, bubble::SLEEP_SLEEPING);

        for _ in 0..200 {
            clock.advance(50);
            pet.motion_tick();
        }
        assert_eq!(pet.state.sleep_phase, SleepPhase::Sleeping);
        assert_eq!(pet.state.bubble.text, bubble::SLEEP_SLEEPING);

        pet.show("잠깐만", BubbleKind::Ambient, 1_000);
        clock.advance(1_000);
        pet.decay_tick();
        assert_eq!(pet.state.bubble.kind, BubbleKind::State);
    }

    #[test]
    fn stale_task_lock_is_force_cleared() {
        let (clock, mut pet) = pet();
        pet.on_task_event(TaskStatus::Working, None, "coding");
        assert!(pet.task_locked());
        clock.advance(5 * 60_000);
        pet.decay_tick();
        assert_eq!(pet.state.task_locked_until, 0);
        assert!(pet.state.current_category.is_none());
    }
}
