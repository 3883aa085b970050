use crate::room::Point;
use crate::routine::StepRef;
use serde::{Deserialize, Serialize};

pub(crate) const BUBBLE_MAX_CHARS: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Needs {
    /// 0 = full, 100 = starving.
    pub(crate) hunger: f32,
    pub(crate) affection: f32,
    pub(crate) energy: f32,
}

impl Default for Needs {
    fn default() -> Self {
        Self {
            hunger: 22.0,
            affection: 62.0,
            energy: 78.0,
        }
    }
}

impl Needs {
    pub(crate) fn clamp(&mut self) {
        self.hunger = clamp_need(self.hunger);
        self.affection = clamp_need(self.affection);
        self.energy = clamp_need(self.energy);
    }

    pub(crate) fn mood(&self) -> MoodTier {
        if self.affection >= 60.0 {
            MoodTier::Happy
        } else if self.affection >= 30.0 {
            MoodTier::Neutral
        } else {
            MoodTier::Sad
        }
    }
}

fn clamp_need(v: f32) -> f32 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 100.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum MoodTier {
    Happy,
    Neutral,
    Sad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum HeldItem {
    None,
    Book,
    WateringCan,
    Duster,
    Roller,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Effect {
    None,
    Water,
    Dust,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum SleepPhase {
    None,
    MovingToBed,
    Settling,
    Blanketed,
    Sleeping,
    Waking,
}

impl SleepPhase {
    /// Phases in which the pet is lying in bed and ignores care actions.
    pub(crate) fn is_asleep(self) -> bool {
        matches!(
            self,
            SleepPhase::Settling | SleepPhase::Blanketed | SleepPhase::Sleeping
        )
    }
}

/// Priority of a speech bubble. A bubble can only displace a live bubble of
/// the same or lower kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub(crate) enum BubbleKind {
    /// Idle step chatter and idle mood lines.
    Ambient,
    /// Hunger / energy / affection warnings.
    State,
    /// Reactions to the user and task bubbles.
    Explicit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Bubble {
    pub(crate) text: String,
    pub(crate) kind: BubbleKind,
    /// 0 = until replaced.
    pub(crate) expires_at: u64,
}

impl Default for Bubble {
    fn default() -> Self {
        Self {
            text: String::new(),
            kind: BubbleKind::Ambient,
            expires_at: 0,
        }
    }
}

impl Bubble {
    pub(crate) fn is_live(&self, now: u64) -> bool {
        !self.text.is_empty() && (self.expires_at == 0 || now < self.expires_at)
    }
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Collapses every run of whitespace and control characters into one space
/// and trims the ends, so bubble text is always a single printable line.
pub(crate) fn one_line(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fixed-duration rate window. It opens on the first use after the previous
/// window ran out and resets entirely when it closes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RateWindow {
    pub(crate) count: u32,
    pub(crate) started_at: Option<u64>,
}

impl RateWindow {
    /// Records one use. Returns false once `cap` uses were taken in the
    /// current window; a refused use is not counted.
    pub(crate) fn try_take(&mut self, now: u64, window_ms: u64, cap: u32) -> bool {
        let expired = match self.started_at {
            Some(start) => now.saturating_sub(start) >= window_ms,
            None => true,
        };
        if expired {
            self.started_at = Some(now);
            self.count = 0;
        }
        if self.count >= cap {
            return false;
        }
        self.count += 1;
        true
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct IdlePlan {
    pub(crate) sequence: Vec<StepRef>,
    /// Index of the next step to enter.
    pub(crate) cursor: usize,
    pub(crate) current: Option<StepRef>,
    pub(crate) entered_at: u64,
    /// Set while a step's done message is on screen; the advance waits for it.
    pub(crate) pending_advance_at: Option<u64>,
    /// A quiet step whose mood line is rolled once the pet gets there.
    #[serde(default)]
    pub(crate) mood_pending: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TaskStatus {
    Started,
    Thinking,
    Working,
    Done,
    Error,
}

impl TaskStatus {
    pub(crate) fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Error)
    }
}

/// Tuning constants of the pet core.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Rules {
    pub(crate) motion_tick_ms: u64,
    pub(crate) needs_tick_ms: u64,
    pub(crate) speed: f32,
    pub(crate) arrive_px: f32,
    pub(crate) at_target_px: f32,
    pub(crate) stuck_ticks: u32,
    pub(crate) stuck_move_px: f32,
    pub(crate) detour_margin: f32,

    pub(crate) hunger_per_tick: f32,
    pub(crate) energy_per_tick: f32,
    pub(crate) affection_per_tick: f32,
    pub(crate) sleep_energy_per_tick: f32,
    pub(crate) lonely_after_ms: u64,
    pub(crate) state_bubble_ms: u64,

    pub(crate) idle_after_ms: u64,
    pub(crate) idle_stall_ms: u64,
    pub(crate) done_message_ms: u64,
    pub(crate) effect_ms: u64,
    pub(crate) sleep_phase_ms: u64,
    pub(crate) idle_mood_chance: f32,
    pub(crate) idle_mood_ms: u64,

    pub(crate) task_lock_ms: u64,
    pub(crate) terminal_bubble_ms: u64,
    pub(crate) grace_ms: u64,
    pub(crate) summary_chars: usize,

    pub(crate) rate_window_ms: u64,
    pub(crate) feed_cap: u32,
    pub(crate) pet_cap: u32,
    pub(crate) feed_hunger: f32,
    pub(crate) feed_affection: f32,
    pub(crate) pet_affection: f32,
    pub(crate) care_bubble_ms: u64,
    pub(crate) refusal_bubble_ms: u64,
    pub(crate) click_ms: u64,
    pub(crate) light_bubble_ms: u64,

    pub(crate) chat_wait_ms: u64,
    pub(crate) chat_reply_ms: u64,
    pub(crate) chat_error_ms: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            motion_tick_ms: 50,
            needs_tick_ms: 60_000,
            speed: 2.8,
            arrive_px: 1.0,
            at_target_px: 5.0,
            stuck_ticks: 6,
            stuck_move_px: 0.1,
            detour_margin: 6.0,

            hunger_per_tick: 1.0,
            energy_per_tick: 0.55,
            affection_per_tick: 0.12,
            sleep_energy_per_tick: 2.0,
            lonely_after_ms: 5 * 60_000,
            state_bubble_ms: 5_000,

            idle_after_ms: 18_000,
            idle_stall_ms: 20_000,
            done_message_ms: 2_000,
            effect_ms: 4_000,
            sleep_phase_ms: 1_500,
            idle_mood_chance: 0.3,
            idle_mood_ms: 3_000,

            task_lock_ms: 5 * 60_000,
            terminal_bubble_ms: 4_000,
            grace_ms: 30_000,
            summary_chars: 40,

            rate_window_ms: 10 * 60_000,
            feed_cap: 2,
            pet_cap: 3,
            feed_hunger: 22.0,
            feed_affection: 2.0,
            pet_affection: 12.0,
            care_bubble_ms: 2_500,
            refusal_bubble_ms: 2_000,
            click_ms: 2_000,
            light_bubble_ms: 2_000,

            chat_wait_ms: 65_000,
            chat_reply_ms: 4_000,
            chat_error_ms: 3_000,
        }
    }
}

/// The whole mutable state of one pet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct PetState {
    pub(crate) position: Point,
    pub(crate) target: Point,
    pub(crate) needs: Needs,
    pub(crate) held_item: HeldItem,
    pub(crate) effect: Effect,
    pub(crate) effect_expires_at: u64,
    pub(crate) bubble: Bubble,
    pub(crate) current_category: Option<String>,
    pub(crate) task_locked_until: u64,
    pub(crate) last_terminal: Option<(TaskStatus, String)>,
    pub(crate) sleep_phase: SleepPhase,
    pub(crate) sleep_phase_at: u64,
    pub(crate) idle: IdlePlan,
    pub(crate) feed_window: RateWindow,
    pub(crate) pet_window: RateWindow,
    pub(crate) escape_waypoint: Option<Point>,
    pub(crate) stuck_ticks: u32,
    pub(crate) last_interaction_at: u64,
    pub(crate) idle_reset_at: u64,
    pub(crate) jump_until: u64,
    pub(crate) room_dark: bool,
}

impl PetState {
    pub(crate) fn new(now: u64, start: Point, sequence: Vec<StepRef>) -> Self {
        Self {
            position: start,
            target: start,
            needs: Needs::default(),
            held_item: HeldItem::None,
            effect: Effect::None,
            effect_expires_at: 0,
            bubble: Bubble::default(),
            current_category: None,
            task_locked_until: 0,
            last_terminal: None,
            sleep_phase: SleepPhase::None,
            sleep_phase_at: now,
            idle: IdlePlan {
                sequence,
                cursor: 0,
                current: None,
                entered_at: now,
                pending_advance_at: None,
                mood_pending: false,
            },
            feed_window: RateWindow::default(),
            pet_window: RateWindow::default(),
            escape_waypoint: None,
            stuck_ticks: 0,
            last_interaction_at: now,
            idle_reset_at: now,
            jump_until: 0,
            room_dark: false,
        }
    }

    pub(crate) fn is_jumping(&self, now: u64) -> bool {
        now < self.jump_until
    }
}
