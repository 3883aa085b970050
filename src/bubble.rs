//! Speech lines keyed by task category, need state and mood tier.

use crate::model::{MoodTier, Needs};
use crate::rng::RngState;

type Tiered = [&'static [&'static str]; 3];

const TASK_LINES: &[(&str, Tiered)] = &[
    (
        "coding",
        [
            &["코딩하는 거 좋아 😚", "오늘 코드 짜는 기분 최고!", "버그 잡는 중~ 🎯"],
            &["코딩 중...", "집중 중이에요", "코드 리뷰 하는 중"],
            &["응… 또 코딩이네…", "혼자 코딩은 좀 외로워", "버그가 너무 많아..."],
        ],
    ),
    (
        "shopping",
        [
            &["장바구니 정리 재밌어! 🛒", "좋은 거 발견했다!", "쇼핑 도우미 출동~ ✨"],
            &["장바구니 정리 중...", "가격 비교 중이에요", "배송 확인하는 중"],
            &["또 주문이야…", "장바구니가 끝이 없어", "배송 언제 오려나..."],
        ],
    ),
    (
        "calendar",
        [
            &["일정 확인 완료! 📅", "오늘 할 일 정리 끝~", "스케줄 관리는 재밌어!"],
            &["일정 확인 중...", "달력 보는 중이에요", "다음 일정 체크 중"],
            &["일정이 너무 많아…", "쉴 틈이 없네...", "오늘도 바쁘구나…"],
        ],
    ),
    (
        "writing",
        [
            &["글쓰기 즐거워! ✍️", "영감이 막 떠올라!", "좋은 글 써보자~"],
            &["글 쓰는 중...", "문서 정리 중이에요", "작성 중입니다"],
            &["글이 안 써져…", "뭘 써야할지 모르겠어", "영감이 안 와..."],
        ],
    ),
    (
        "research",
        [
            &["조사하는 거 흥미로워! 🔍", "자료 찾기 재밌다~", "새로운 발견!"],
            &["자료 조사 중...", "검색하는 중이에요", "분석 진행 중"],
            &["찾아도 안 나와…", "자료가 부족해...", "조사 끝이 안 보여"],
        ],
    ),
    (
        "music",
        [
            &["신나는 노래~ 🎵", "리듬 타는 중!", "음악 들으면 기분 좋아!"],
            &["음악 재생 중...", "플레이리스트 확인 중", "다음 곡은 뭘까"],
            &["조용한 노래 듣고 싶어…", "음악이라도 들어야지…", "귀가 심심해..."],
        ],
    ),
    (
        "communication",
        [
            &["답장 완료! 📨", "메시지 보내는 중~", "소통은 즐거워!"],
            &["메시지 확인 중...", "답장 쓰는 중이에요", "알림 체크 중"],
            &["답장할 게 많아…", "메시지가 밀렸어...", "연락이 안 와…"],
        ],
    ),
    (
        "gaming",
        [
            &["게임 타임! 🎮", "이기고 있어!", "한 판 더!"],
            &["게임 중...", "퀘스트 진행 중", "레벨업 하는 중"],
            &["계속 지고 있어…", "어려워...", "한 판만 더 하고 싶은데…"],
        ],
    ),
    (
        "art",
        [
            &["영감 폭발! 🎨", "그리는 거 즐거워~", "색 조합 예쁘다!"],
            &["디자인 작업 중...", "스케치 중이에요", "이미지 작업 중"],
            &["그림이 안 그려져…", "디자인 막혔어...", "영감이 안 와…"],
        ],
    ),
    (
        "cooking",
        [
            &["맛있는 거 만들자! 🍳", "레시피 발견!", "요리는 재밌어~"],
            &["레시피 확인 중...", "재료 체크 중이에요", "요리 준비 중"],
            &["뭘 만들지 모르겠어…", "재료가 없어...", "요리하기 귀찮아…"],
        ],
    ),
    (
        "finance",
        [
            &["가계부 정리 완료! 💰", "절약 성공!", "재무 관리 잘하고 있어~"],
            &["예산 확인 중...", "가격 비교 중이에요", "계산하는 중"],
            &["돈이 부족해…", "예산 초과했어...", "지출이 많아…"],
        ],
    ),
    (
        "learning",
        [
            &["새로운 걸 배웠어! 📖", "공부 재밌다!", "이해됐어!"],
            &["공부하는 중...", "자료 읽는 중이에요", "학습 진행 중"],
            &["어려워서 모르겠어…", "공부 안 돼...", "집중이 안 돼…"],
        ],
    ),
    (
        "other",
        [
            &["오늘도 열심히! 💪", "할 일 처리 중~", "도와줄 수 있어서 좋아!"],
            &["작업 중이에요...", "처리하는 중입니다", "진행 중..."],
            &["일이 많아…", "조금 힘들어...", "쉬고 싶어…"],
        ],
    ),
];

const VERY_HUNGRY: &[&str] = &["너무 배고파!!! 🍙💢", "밥! 밥 줘!!!", "쓰러지겠어…", "간식이라도...!!"];
const EXHAUSTED: &[&str] = &["진짜 지쳤어… 😩", "더 이상 못 갈 것 같아", "에너지 0%...", "충전 필요..."];
const HUNGRY: &[&str] = &["배고파… 🍙", "간식 없을까…", "밥 줘요…", "꼬르륵...", "먹을 것 좀..."];
const TIRED: &[&str] = &["졸려… 💤", "눈이 감겨…", "에너지 부족...", "좀 쉬고 싶어...", "잠이 온다..."];
const LONELY: &[&str] = &[
    "나 오늘 좀 심심해…",
    "아무도 관심이 없나…",
    "쓰다듬어 줘요… 🥺",
    "외로워…",
    "놀아줘요...",
];

const IDLE_MOOD: Tiered = [
    &["콧노래~ 🎵", "기분 좋다~", "오늘 좋은 날이야!", "❤️", "놀고 싶다!"],
    &["", "", "", "음…", "뭐 할까"],
    &["…", "하아…", "심심해…", "쓸쓸…", ""],
];

pub(crate) const PET_LINES: &[&str] = &["기분 좋아~", "간지러워요!", "더 해줘~", "헤헤 ❤️"];
pub(crate) const CLICK_LINES: &[&str] = &["왜요?", "깜짝이야!", "헤헤, 안녕!", "놀아줄 거예요?"];

pub(crate) const FEED_OK: &str = "냠냠! 맛있어요";
pub(crate) const FEED_LIMIT: &str = "한번에 다 못먹어요!";
pub(crate) const PET_LIMIT: &str = "너무 많이 쓰다듬는 거아니에요?";
pub(crate) const ASLEEP: &str = "쿨쿨... 자고 있어요";
pub(crate) const LIGHT_OFF: &str = "어두워...";
pub(crate) const LIGHT_ON: &str = "밝아졌어!";
pub(crate) const TASK_DONE: &str = "완료!";
pub(crate) const TASK_ERROR: &str = "에러 확인 중...";
pub(crate) const FEED_LOST: &str = "연결 상태를 확인하는 중...";
pub(crate) const CHAT_WAIT: &str = "생각중이에요...";
pub(crate) const CHAT_EMPTY_REPLY: &str = "네!";
pub(crate) const CHAT_UNAVAILABLE: &str = "미안해요, 지금은 대답할 수 없어요…";

pub(crate) const SLEEP_SETTLING: &str = "침대에 눕는 중...";
pub(crate) const SLEEP_BLANKETED: &str = "이불 덮는 중...";
pub(crate) const SLEEP_SLEEPING: &str = "쿨쿨... zzZ";
pub(crate) const SLEEP_WAKING: &str = "잘 잤다!";

/// Which need warning applies, most urgent first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NeedAlert {
    VeryHungry,
    Exhausted,
    Hungry,
    Tired,
    Lonely,
}

impl NeedAlert {
    pub(crate) fn of(needs: &Needs) -> Option<NeedAlert> {
        if needs.hunger > 85.0 {
            Some(NeedAlert::VeryHungry)
        } else if needs.energy < 15.0 {
            Some(NeedAlert::Exhausted)
        } else if needs.hunger > 70.0 {
            Some(NeedAlert::Hungry)
        } else if needs.energy < 25.0 {
            Some(NeedAlert::Tired)
        } else if needs.affection < 25.0 {
            Some(NeedAlert::Lonely)
        } else {
            None
        }
    }

    fn lines(self) -> &'static [&'static str] {
        match self {
            NeedAlert::VeryHungry => VERY_HUNGRY,
            NeedAlert::Exhausted => EXHAUSTED,
            NeedAlert::Hungry => HUNGRY,
            NeedAlert::Tired => TIRED,
            NeedAlert::Lonely => LONELY,
        }
    }
}

fn tier_index(mood: MoodTier) -> usize {
    match mood {
        MoodTier::Happy => 0,
        MoodTier::Neutral => 1,
        MoodTier::Sad => 2,
    }
}

pub(crate) fn task_line(category: &str, needs: &Needs, rng: &mut RngState) -> &'static str {
    let tiers = TASK_LINES
        .iter()
        .find(|(id, _)| *id == category)
        .or_else(|| TASK_LINES.iter().find(|(id, _)| *id == "other"))
        .map(|(_, t)| t);
    match tiers {
        Some(t) => rng.pick(t[tier_index(needs.mood())]),
        None => "",
    }
}

pub(crate) fn state_line(needs: &Needs, rng: &mut RngState) -> Option<&'static str> {
    NeedAlert::of(needs).map(|alert| rng.pick(alert.lines()))
}

/// May be empty: a quiet pet says nothing.
pub(crate) fn idle_mood_line(needs: &Needs, rng: &mut RngState) -> &'static str {
    rng.pick(IDLE_MOOD[tier_index(needs.mood())])
}
