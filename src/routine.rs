//! Idle routine catalog. Steps name a [`Location`]; coordinates live in the
//! room's location table.

use crate::model::{Effect, HeldItem};
use crate::rng::RngState;
use crate::room::Location;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum StepMarker {
    SleepStart,
    SleepEnd,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct IdleStep {
    pub(crate) location: Location,
    pub(crate) message: &'static str,
    pub(crate) hold_ms: u64,
    pub(crate) held: HeldItem,
    pub(crate) effect: Effect,
    pub(crate) done_message: Option<&'static str>,
    pub(crate) marker: Option<StepMarker>,
}

impl IdleStep {
    const fn walk(location: Location, message: &'static str, hold_ms: u64) -> Self {
        Self {
            location,
            message,
            hold_ms,
            held: HeldItem::None,
            effect: Effect::None,
            done_message: None,
            marker: None,
        }
    }

    const fn holding(mut self, held: HeldItem) -> Self {
        self.held = held;
        self
    }

    const fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    const fn done(mut self, message: &'static str) -> Self {
        self.done_message = Some(message);
        self
    }

    const fn marked(mut self, marker: StepMarker) -> Self {
        self.marker = Some(marker);
        self
    }
}

pub(crate) struct Routine {
    pub(crate) name: &'static str,
    pub(crate) steps: &'static [IdleStep],
}

pub(crate) const REST: IdleStep = IdleStep::walk(Location::Center, "", 5_000);

pub(crate) const ROUTINES: &[Routine] = &[
    Routine {
        name: "reading",
        steps: &[
            IdleStep::walk(Location::Shelf, "책장으로 이동 중...", 3_000),
            IdleStep::walk(Location::Cushion, "만화책 보러 가는 중...", 3_000).holding(HeldItem::Book),
            IdleStep::walk(Location::Cushion, "만화책 보는 중...", 30_000)
                .holding(HeldItem::Book)
                .done("다 읽었다!"),
        ],
    },
    Routine {
        name: "nap",
        steps: &[
            IdleStep::walk(Location::Bed, "낮잠 자러 침대로 이동...", 3_000),
            IdleStep::walk(Location::BedSleep, "침대로 올라가는 중...", 180_000)
                .marked(StepMarker::SleepStart),
            IdleStep::walk(Location::Bed, "기지개 쭉~", 3_000).marked(StepMarker::SleepEnd),
        ],
    },
    Routine {
        name: "watering",
        steps: &[
            IdleStep::walk(Location::Plant, "물 주러 가야겠다", 3_000),
            IdleStep::walk(Location::Plant, "칙칙~", 5_000)
                .holding(HeldItem::WateringCan)
                .with_effect(Effect::Water)
                .done("물 다 줬다!"),
        ],
    },
    Routine {
        name: "tidying",
        steps: &[
            IdleStep::walk(Location::Desk, "청소 상태 확인 중...", 3_000),
            IdleStep::walk(Location::Shelf, "책장 앞까지 이동 중...", 3_000),
            IdleStep::walk(Location::Shelf, "책장 먼지 털어주는 중...", 30_000)
                .holding(HeldItem::Duster)
                .with_effect(Effect::Dust)
                .done("먼지 털기 끝!"),
            IdleStep::walk(Location::Bed, "이불 돌돌이 하는 중...", 5_000)
                .holding(HeldItem::Roller)
                .done("이불 정리 완료!"),
        ],
    },
    Routine {
        name: "calendar",
        steps: &[
            IdleStep::walk(Location::Calendar, "달력 보러 가는 중...", 3_000),
            IdleStep::walk(Location::Calendar, "달력 확인 중...", 8_000),
        ],
    },
    Routine {
        name: "cart",
        steps: &[
            IdleStep::walk(Location::Cart, "장바구니 정리하러 가야지", 3_000),
            IdleStep::walk(Location::Cart, "장바구니 정리 중...", 30_000).done("정리 끝!"),
        ],
    },
];

/// Position of a step in the flattened sequence: a routine step, or the
/// rest stop between routines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum StepRef {
    Routine { routine: usize, step: usize },
    Rest,
}

impl StepRef {
    pub(crate) fn step(self) -> &'static IdleStep {
        match self {
            StepRef::Routine { routine, step } => ROUTINES
                .get(routine)
                .and_then(|r| r.steps.get(step))
                .unwrap_or(&REST),
            StepRef::Rest => &REST,
        }
    }
}

/// Routines in shuffled order, each followed by a rest stop.
pub(crate) fn shuffled_sequence(rng: &mut RngState) -> Vec<StepRef> {
    let mut order: Vec<usize> = (0..ROUTINES.len()).collect();
    rng.shuffle(&mut order);

    let mut seq = Vec::new();
    for routine in order {
        for step in 0..ROUTINES[routine].steps.len() {
            seq.push(StepRef::Routine { routine, step });
        }
        seq.push(StepRef::Rest);
    }
    seq
}

pub(crate) fn routine_index(name: &str) -> Option<usize> {
    ROUTINES.iter().position(|r| r.name == name)
}
