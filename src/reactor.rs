use crate::bubble;
use crate::clock::Clock;
use crate::model::{one_line, truncate_chars, BubbleKind, TaskStatus};
use crate::pet::Pet;
use crate::room::{Location, Point};

impl<C: Clock> Pet<C> {
    /// Applies one upstream task event, sending the pet to the furniture of
    /// a well-known category.
    #[cfg(test)]
    pub(crate) fn on_task_event(
        &mut self,
        status: TaskStatus,
        summary: Option<&str>,
        category: &str,
    ) {
        self.on_task_event_at(status, summary, category, None);
    }

    /// Applies one upstream task event. `spot` is the category's place in the
    /// room when the registry knows one. Later events always supersede
    /// earlier ones.
    pub(crate) fn on_task_event_at(
        &mut self,
        status: TaskStatus,
        summary: Option<&str>,
        category: &str,
        spot: Option<Point>,
    ) {
        let now = self.now();

        if status.is_terminal() && self.task_locked() {
            if let Some((last_status, last_category)) = &self.state.last_terminal {
                if *last_status == status && last_category == category {
                    tracing::debug!(?status, category, "duplicate terminal event ignored");
                    return;
                }
            }
        }

        let text = match status {
            TaskStatus::Done => bubble::TASK_DONE.to_string(),
            TaskStatus::Error => bubble::TASK_ERROR.to_string(),
            _ => match summary.map(one_line).filter(|s| !s.is_empty()) {
                Some(s) => truncate_chars(&s, self.rules.summary_chars),
                None => {
                    let needs = self.state.needs;
                    bubble::task_line(category, &needs, &mut self.rng).to_string()
                }
            },
        };

        self.reset_idle();
        self.state.escape_waypoint = None;
        self.state.stuck_ticks = 0;

        if status.is_terminal() {
            self.state.target = self.state.position;
            self.state.current_category = None;
            self.state.task_locked_until = now.saturating_add(self.rules.grace_ms);
            self.state.last_terminal = Some((status, category.to_string()));
            let ms = self.rules.terminal_bubble_ms;
            self.show(&text, BubbleKind::Explicit, ms);
        } else {
            let goal = spot.unwrap_or_else(|| Location::for_category(category).point());
            self.state.target = self.room.nearest_walkable(goal);
            self.state.current_category = Some(category.to_string());
            self.state.task_locked_until = now.saturating_add(self.rules.task_lock_ms);
            self.state.last_terminal = None;
            let ms = self.rules.task_lock_ms;
            self.show(&text, BubbleKind::Explicit, ms);
        }
        tracing::info!(?status, category, "task event applied");
    }

    /// The task feed dropped. The pet apologises without leaving its task.
    pub(crate) fn feed_lost(&mut self) {
        let ms = self.rules.terminal_bubble_ms;
        self.show(bubble::FEED_LOST, BubbleKind::Explicit, ms);
        tracing::info!("task feed lost");
    }
}

#[cfg(test)]
mod tests {
    use crate::clock::ManualClock;
    use crate::model::{BubbleKind, HeldItem, SleepPhase, TaskStatus};
    use crate::pet::Pet;
    use crate::room::{Location, Point};

    fn pet() -> (ManualClock, Pet<ManualClock>) {
        let clock = ManualClock::new(1_000);
        let pet = Pet::new(clock.clone(), 21);
        (clock, pet)
    }

    #[test]
    fn working_heads_for_the_category_furniture() {
        let (_clock, mut pet) = pet();
        pet.on_task_event(TaskStatus::Working, None, "coding");
        assert_eq!(pet.state.target, Location::Laptop.point());
        assert_eq!(pet.state.current_category.as_deref(), Some("coding"));
        assert_eq!(pet.state.task_locked_until, 1_000 + 5 * 60_000);
        assert_eq!(pet.state.bubble.kind, BubbleKind::Explicit);
        assert!(!pet.state.bubble.text.is_empty());
    }

    #[test]
    fn summary_wins_over_templates_and_is_truncated() {
        let (_clock, mut pet) = pet();
        let long = "a".repeat(90);
        pet.on_task_event(TaskStatus::Thinking, Some(&long), "research");
        assert_eq!(pet.state.bubble.text.len(), 40);
        pet.on_task_event(TaskStatus::Thinking, Some("   "), "research");
        assert_ne!(pet.state.bubble.text.trim(), "");
        assert_ne!(pet.state.bubble.text, "a".repeat(40));
    }

    #[test]
    fn done_stays_put_and_holds_grace() {
        let (clock, mut pet) = pet();
        pet.on_task_event(TaskStatus::Working, None, "coding");
        pet.state.position = Point::new(230.0, 330.0);
        clock.advance(10_000);
        pet.on_task_event(TaskStatus::Done, None, "coding");
        assert_eq!(pet.state.target, Point::new(230.0, 330.0));
        assert!(pet.state.current_category.is_none());
        assert_eq!(pet.state.task_locked_until, 11_000 + 30_000);
        assert_eq!(pet.state.bubble.text, "완료!");
        assert_eq!(pet.state.bubble.expires_at, 11_000 + 4_000);
        assert!(!pet.idle_eligible());
    }

    #[test]
    fn duplicate_done_is_a_no_op() {
        let (clock, mut pet) = pet();
        pet.on_task_event(TaskStatus::Done, None, "other");
        let snapshot = pet.state.clone();
        clock.advance(1_000);
        pet.on_task_event(TaskStatus::Done, None, "other");
        assert_eq!(pet.state, snapshot);

        pet.on_task_event(TaskStatus::Error, None, "other");
        assert_eq!(pet.state.bubble.text, "에러 확인 중...");
    }

    #[test]
    fn multi_line_summary_becomes_one_line() {
        let (_clock, mut pet) = pet();
        pet.on_task_event(TaskStatus::Working, Some("step one\n\tstep two\r\n"), "coding");
        assert_eq!(pet.state.bubble.text, "step one step two");
    }

    #[test]
    fn registry_spot_overrides_the_default_location() {
        let (_clock, mut pet) = pet();
        pet.on_task_event_at(TaskStatus::Working, None, "gaming", Some(Point::new(235.0, 290.0)));
        assert_eq!(pet.state.target, Point::new(235.0, 290.0));

        // inside the shelf footprint: routed to a free spot nearby
        pet.on_task_event_at(TaskStatus::Working, None, "music", Some(Point::new(320.0, 200.0)));
        assert_ne!(pet.state.target, Point::new(320.0, 200.0));
        assert!(!pet.room.is_blocked(pet.state.target));
        assert!(pet.state.target.dist(Point::new(320.0, 200.0)) <= 90.0);
    }

    #[test]
    fn lost_feed_apologises_but_keeps_the_task() {
        let (clock, mut pet) = pet();
        pet.on_task_event(TaskStatus::Working, None, "coding");
        let target = pet.state.target;
        clock.advance(2_000);
        pet.feed_lost();
        assert_eq!(pet.state.bubble.text, "연결 상태를 확인하는 중...");
        assert_eq!(pet.state.bubble.expires_at, 3_000 + 4_000);
        assert_eq!(pet.state.target, target);
        assert_eq!(pet.state.current_category.as_deref(), Some("coding"));
    }

    #[test]
    fn unknown_category_walks_to_center() {
        let (_clock, mut pet) = pet();
        pet.on_task_event(TaskStatus::Started, None, "gaming");
        assert_eq!(pet.state.target, Location::Center.point());
    }

    #[test]
    fn task_event_clears_props_and_wakes() {
        let (_clock, mut pet) = pet();
        pet.state.held_item = HeldItem::Duster;
        pet.state.sleep_phase = SleepPhase::Sleeping;
        pet.state.idle.cursor = 5;
        pet.on_task_event(TaskStatus::Working, None, "writing");
        assert_eq!(pet.state.held_item, HeldItem::None);
        assert_eq!(pet.state.sleep_phase, SleepPhase::None);
        assert_eq!(pet.state.idle.cursor, 0);
    }
}
