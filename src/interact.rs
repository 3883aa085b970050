use crate::bubble;
use crate::clock::Clock;
use crate::model::{one_line, truncate_chars, BubbleKind, BUBBLE_MAX_CHARS};
use crate::pet::{Outcome, Pet};

impl<C: Clock> Pet<C> {
    fn refuse_while_asleep(&mut self) -> bool {
        if !self.state.sleep_phase.is_asleep() {
            return false;
        }
        let ms = self.rules.refusal_bubble_ms;
        self.show(bubble::ASLEEP, BubbleKind::Explicit, ms);
        true
    }

    pub(crate) fn feed(&mut self) -> Outcome {
        if self.refuse_while_asleep() {
            return Outcome::Asleep;
        }
        let now = self.now();
        let r = &self.rules;
        let (window, cap) = (r.rate_window_ms, r.feed_cap);
        if !self.state.feed_window.try_take(now, window, cap) {
            self.mark_interaction();
            let ms = self.rules.refusal_bubble_ms;
            self.show(bubble::FEED_LIMIT, BubbleKind::Explicit, ms);
            return Outcome::RateLimited;
        }

        self.state.needs.hunger -= self.rules.feed_hunger;
        self.state.needs.affection += self.rules.feed_affection;
        self.state.needs.clamp();
        self.reset_idle();
        self.mark_interaction();
        let ms = self.rules.care_bubble_ms;
        self.show(bubble::FEED_OK, BubbleKind::Explicit, ms);
        Outcome::Accepted
    }

    pub(crate) fn pet(&mut self) -> Outcome {
        if self.refuse_while_asleep() {
            return Outcome::Asleep;
        }
        let now = self.now();
        let r = &self.rules;
        let (window, cap) = (r.rate_window_ms, r.pet_cap);
        if !self.state.pet_window.try_take(now, window, cap) {
            self.mark_interaction();
            let ms = self.rules.refusal_bubble_ms;
            self.show(bubble::PET_LIMIT, BubbleKind::Explicit, ms);
            return Outcome::RateLimited;
        }

        self.state.needs.affection += self.rules.pet_affection;
        self.state.needs.clamp();
        self.reset_idle();
        self.mark_interaction();
        let line = self.rng.pick(bubble::PET_LINES);
        let ms = self.rules.care_bubble_ms;
        self.show(line, BubbleKind::Explicit, ms);
        Outcome::Accepted
    }

    pub(crate) fn react_to_click(&mut self) -> Outcome {
        if self.state.sleep_phase.is_asleep() {
            return Outcome::Ignored;
        }
        let now = self.now();
        let ms = self.rules.click_ms;
        self.state.jump_until = now.saturating_add(ms);
        self.mark_interaction();
        let line = self.rng.pick(bubble::CLICK_LINES);
        self.show(line, BubbleKind::Explicit, ms);
        Outcome::Accepted
    }

    pub(crate) fn toggle_light(&mut self) -> Outcome {
        if self.state.sleep_phase.is_asleep() {
            return Outcome::Ignored;
        }
        self.state.room_dark = !self.state.room_dark;
        let text = if self.state.room_dark {
            bubble::LIGHT_OFF
        } else {
            bubble::LIGHT_ON
        };
        let ms = self.rules.light_bubble_ms;
        self.show(text, BubbleKind::Explicit, ms);
        Outcome::Accepted
    }

    /// Shows `text` as an explicit bubble. A sleeping pet only gets the
    /// bubble; otherwise this counts as a full interaction.
    pub(crate) fn say(&mut self, text: &str, duration_ms: u64) -> Outcome {
        let text = truncate_chars(text, BUBBLE_MAX_CHARS);
        if self.state.sleep_phase.is_asleep() {
            self.show(&text, BubbleKind::Explicit, duration_ms);
            return Outcome::Asleep;
        }
        self.reset_idle();
        self.mark_interaction();
        self.show(&text, BubbleKind::Explicit, duration_ms);
        Outcome::Accepted
    }

    /// Starts a chat turn. Returns the message to relay, or `None` when there
    /// is nothing to send.
    pub(crate) fn begin_chat(&mut self, input: &str) -> Option<String> {
        let message = truncate_chars(input.trim(), BUBBLE_MAX_CHARS);
        if message.is_empty() {
            return None;
        }
        let ms = self.rules.chat_wait_ms;
        self.say(bubble::CHAT_WAIT, ms);
        Some(message)
    }

    pub(crate) fn finish_chat<E: std::fmt::Display>(
        &mut self,
        reply: Result<String, E>,
    ) -> Outcome {
        match reply {
            Ok(text) => {
                let text = one_line(&text);
                let text = if text.is_empty() {
                    bubble::CHAT_EMPTY_REPLY
                } else {
                    text.as_str()
                };
                let ms = self.rules.chat_reply_ms;
                self.say(text, ms)
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat relay failed");
                let ms = self.rules.chat_error_ms;
                self.say(bubble::CHAT_UNAVAILABLE, ms)
            }
        }
    }
}
