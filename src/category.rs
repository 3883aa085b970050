//! Task category registry. Maps free task text to a category id by keyword
//! scoring, keeps per-category hit counts on disk and knows where in the room
//! each category's work happens.

use crate::room::Point;
use crate::storage::{load_json, save_json_atomic};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub(crate) const OTHER: &str = "other";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct CategoryDef {
    pub(crate) id: String,
    pub(crate) label: String,
    pub(crate) keywords: Vec<String>,
    #[serde(default)]
    pub(crate) count: u64,
    #[serde(default)]
    pub(crate) built_in: bool,
    /// Room spot the pet walks to for this category's tasks.
    #[serde(default)]
    pub(crate) target: Option<Point>,
}

struct BuiltIn {
    id: &'static str,
    label: &'static str,
    target: Point,
    keywords: &'static [&'static str],
}

/// Spots handed to registered categories in turn.
const DYNAMIC_SLOTS: [Point; 6] = [
    Point::new(310.0, 310.0),
    Point::new(450.0, 350.0),
    Point::new(260.0, 440.0),
    Point::new(150.0, 430.0),
    Point::new(340.0, 240.0),
    Point::new(280.0, 200.0),
];

const BUILT_IN: &[BuiltIn] = &[
    BuiltIn {
        id: "coding",
        label: "코딩 작업",
        target: Point::new(190.0, 344.0),
        keywords: &[
            "코드", "코딩", "개발", "버그", "파일", "함수", "변수", "클래스", "모듈", "라이브러리",
            "프레임워크", "컴파일", "빌드", "배포", "테스트", "깃", "커밋", "브랜치", "풀리퀘", "api",
            "sdk", "서버", "프론트", "백엔드", "데이터베이스", "db", "code", "coding", "dev",
            "debug", "fix", "implement", "refactor", "function", "class", "module", "compile",
            "build", "deploy", "test", "git", "commit", "branch", "merge", "pull request", "npm",
            "typescript", "javascript", "python", "rust", "cargo", "node",
        ],
    },
    BuiltIn {
        id: "shopping",
        label: "장바구니 정리",
        target: Point::new(368.0, 420.0),
        keywords: &[
            "쇼핑", "주문", "구매", "배송", "장바구니", "택배", "할인", "쿠폰", "상품", "결제", "환불",
            "교환", "가격비교", "shop", "order", "buy", "cart", "delivery", "discount", "coupon",
            "product", "purchase", "amazon", "coupang",
        ],
    },
    BuiltIn {
        id: "calendar",
        label: "일정 확인",
        target: Point::new(412.0, 268.0),
        keywords: &[
            "일정", "달력", "스케줄", "날짜", "예약", "약속", "미팅", "회의", "마감", "기한", "기념일",
            "생일", "calendar", "schedule", "date", "event", "meeting", "appointment", "deadline",
            "reminder",
        ],
    },
    BuiltIn {
        id: "writing",
        label: "글쓰기 작업",
        target: Point::new(400.0, 142.0),
        keywords: &[
            "글", "작성", "문서", "블로그", "편집", "원고", "에세이", "리포트", "보고서", "초안", "요약",
            "정리", "메모", "노트", "write", "document", "blog", "edit", "readme", "essay", "report",
            "draft", "summary", "article", "post", "memo", "note",
        ],
    },
    BuiltIn {
        id: "research",
        label: "자료 조사",
        target: Point::new(162.0, 342.0),
        keywords: &[
            "조사", "검색", "리서치", "찾아", "분석", "비교", "통계", "데이터", "자료", "논문", "참고",
            "출처", "팩트체크", "research", "search", "analyze", "investigate", "compare",
            "statistics", "data", "reference", "source", "survey",
        ],
    },
    BuiltIn {
        id: "music",
        label: "음악",
        target: Point::new(320.0, 200.0),
        keywords: &[
            "음악", "노래", "재생", "플레이리스트", "멜로디", "악기", "기타", "피아노", "드럼", "작곡",
            "가사", "bgm", "music", "song", "playlist", "melody", "guitar", "piano", "spotify",
        ],
    },
    BuiltIn {
        id: "communication",
        label: "소통",
        target: Point::new(190.0, 344.0),
        keywords: &[
            "메시지", "이메일", "전송", "답장", "연락", "알림", "편지", "공지", "안내", "문의", "응답",
            "dm", "message", "email", "send", "reply", "slack", "telegram", "chat", "discord",
            "notification",
        ],
    },
    BuiltIn {
        id: "gaming",
        label: "게임",
        target: Point::new(235.0, 290.0),
        keywords: &[
            "게임", "플레이", "스코어", "퀘스트", "레벨", "캐릭터", "아이템", "던전", "보스", "랭킹",
            "game", "play", "score", "quest", "level", "steam", "nintendo", "playstation", "xbox",
        ],
    },
    BuiltIn {
        id: "art",
        label: "미술/디자인",
        target: Point::new(440.0, 210.0),
        keywords: &[
            "그림", "디자인", "이미지", "로고", "일러스트", "스케치", "색상", "폰트", "레이아웃",
            "와이어프레임", "목업", "픽셀", "draw", "design", "image", "logo", "illustration",
            "sketch", "figma", "ui", "ux", "color", "font", "layout", "mockup",
        ],
    },
    BuiltIn {
        id: "cooking",
        label: "요리",
        target: Point::new(380.0, 290.0),
        keywords: &[
            "요리", "레시피", "음식", "식단", "재료", "맛", "식사", "간식", "반찬", "찌개", "볶음",
            "구이", "cook", "recipe", "food", "meal", "ingredient", "dish", "kitchen",
            "restaurant", "cafe",
        ],
    },
    BuiltIn {
        id: "finance",
        label: "재무",
        target: Point::new(190.0, 344.0),
        keywords: &[
            "돈", "예산", "가격", "환율", "계좌", "투자", "주식", "경제", "금융", "세금", "연금", "보험",
            "대출", "이자", "수익", "손실", "펀드", "채권", "부동산", "인플레이션", "gdp", "money",
            "pay", "budget", "price", "finance", "invest", "stock", "crypto", "economy", "tax",
            "interest", "profit", "bitcoin",
        ],
    },
    BuiltIn {
        id: "learning",
        label: "학습",
        target: Point::new(145.0, 420.0),
        keywords: &[
            "공부", "학습", "강의", "시험", "번역", "언어", "수학", "과학", "설명", "알려", "가르쳐",
            "이해", "개념", "원리", "이론", "역사", "물리", "화학", "생물", "영어", "교과서", "문제",
            "풀이", "정의", "study", "learn", "lecture", "exam", "translate", "language", "math",
            "science", "explain", "teach", "understand", "concept", "theory", "history",
            "physics", "chemistry", "biology", "tutorial", "course", "lesson",
        ],
    },
];

impl BuiltIn {
    fn to_def(&self) -> CategoryDef {
        CategoryDef {
            id: self.id.to_string(),
            label: self.label.to_string(),
            keywords: self.keywords.iter().map(|k| k.to_string()).collect(),
            count: 0,
            built_in: true,
            target: Some(self.target),
        }
    }
}

pub(crate) struct CategoryRegistry {
    path: Option<PathBuf>,
    defs: Vec<CategoryDef>,
}

impl CategoryRegistry {
    /// Built-in categories only, never written to disk.
    pub(crate) fn in_memory() -> Self {
        Self {
            path: None,
            defs: BUILT_IN.iter().map(BuiltIn::to_def).collect(),
        }
    }

    /// Loads the registry file, adding any missing built-in and refreshing the
    /// labels, keywords and spots of the ones present. Registered categories
    /// stored without a spot get the next free slot.
    pub(crate) fn load(path: PathBuf) -> Self {
        let Some(mut defs) = load_json::<Vec<CategoryDef>>(&path) else {
            let reg = Self {
                path: Some(path),
                ..Self::in_memory()
            };
            reg.save();
            return reg;
        };
        for b in BUILT_IN {
            match defs.iter_mut().find(|d| d.id == b.id) {
                Some(existing) => {
                    let fresh = b.to_def();
                    existing.label = fresh.label;
                    existing.keywords = fresh.keywords;
                    existing.built_in = true;
                    existing.target = fresh.target;
                }
                None => defs.push(b.to_def()),
            }
        }
        let mut slot = 0;
        for def in defs.iter_mut().filter(|d| !d.built_in) {
            if def.target.is_none() {
                def.target = Some(DYNAMIC_SLOTS[slot % DYNAMIC_SLOTS.len()]);
            }
            slot += 1;
        }
        Self {
            path: Some(path),
            defs,
        }
    }

    #[cfg(test)]
    pub(crate) fn defs(&self) -> &[CategoryDef] {
        &self.defs
    }

    /// Best-scoring category for `text`, one point per keyword found. Ties
    /// keep the earlier category. A hit bumps its count.
    pub(crate) fn classify(&mut self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        let mut best: Option<(usize, usize)> = None;
        for (i, def) in self.defs.iter().enumerate() {
            let score = def
                .keywords
                .iter()
                .filter(|kw| lower.contains(&kw.to_lowercase()))
                .count();
            if score > 0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }
        let (idx, score) = best?;
        let def = &mut self.defs[idx];
        def.count += 1;
        let id = def.id.clone();
        tracing::debug!(category = %id, score, "classified task text");
        self.save();
        Some(id)
    }

    /// Where the pet goes for tasks of category `id`, if the registry knows it.
    pub(crate) fn target_of(&self, id: &str) -> Option<Point> {
        self.defs.iter().find(|d| d.id == id).and_then(|d| d.target)
    }

    /// Adds a category unless one with the same id exists; either way the
    /// stored definition is returned. New categories take the dynamic slots
    /// in order, wrapping around once all are used.
    pub(crate) fn register(&mut self, id: &str, label: &str, keywords: &[&str]) -> &CategoryDef {
        if let Some(i) = self.defs.iter().position(|d| d.id == id) {
            return &self.defs[i];
        }
        let registered = self.defs.iter().filter(|d| !d.built_in).count();
        let target = DYNAMIC_SLOTS[registered % DYNAMIC_SLOTS.len()];
        self.defs.push(CategoryDef {
            id: id.to_string(),
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            count: 1,
            built_in: false,
            target: Some(target),
        });
        tracing::info!(category = id, label, x = target.x, y = target.y, "registered new category");
        self.save();
        let last = self.defs.len() - 1;
        &self.defs[last]
    }

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(err) = save_json_atomic(path, &self.defs) {
            tracing::warn!(error = %err, "could not save categories");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_scoring_picks_the_best_match() {
        let mut reg = CategoryRegistry::in_memory();
        assert_eq!(reg.classify("Fix the failing build and commit").as_deref(), Some("coding"));
        assert_eq!(reg.classify("장바구니 주문 확인").as_deref(), Some("shopping"));
        assert_eq!(reg.classify("zzz qqq"), None);
    }

    #[test]
    fn hits_are_counted() {
        let mut reg = CategoryRegistry::in_memory();
        reg.classify("schedule a meeting");
        reg.classify("move the meeting");
        let cal = reg.defs().iter().find(|d| d.id == "calendar").unwrap();
        assert_eq!(cal.count, 2);
    }

    #[test]
    fn register_is_idempotent() {
        let mut reg = CategoryRegistry::in_memory();
        let n = reg.defs().len();
        assert_eq!(reg.register("garden", "정원", &["plant", "seed"]).count, 1);
        reg.register("garden", "다른 라벨", &[]);
        assert_eq!(reg.defs().len(), n + 1);
        let garden = reg.defs().iter().find(|d| d.id == "garden").unwrap();
        assert_eq!(garden.label, "정원");
        assert!(!garden.built_in);
        assert_eq!(reg.classify("water the plant").as_deref(), Some("garden"));
    }

    #[test]
    fn registry_survives_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.json");
        {
            let mut reg = CategoryRegistry::load(path.clone());
            reg.register("garden", "정원", &["plant"]);
            reg.classify("git commit");
        }
        let reg = CategoryRegistry::load(path);
        assert!(reg.defs().iter().any(|d| d.id == "garden"));
        let coding = reg.defs().iter().find(|d| d.id == "coding").unwrap();
        assert_eq!(coding.count, 1);
    }

    #[test]
    fn stale_built_ins_are_refreshed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.json");
        let stale = vec![CategoryDef {
            id: "coding".into(),
            label: "old".into(),
            keywords: vec!["zzz".into()],
            count: 7,
            built_in: true,
            target: None,
        }];
        save_json_atomic(&path, &stale).unwrap();
        let reg = CategoryRegistry::load(path);
        let coding = reg.defs().iter().find(|d| d.id == "coding").unwrap();
        assert_eq!(coding.label, "코딩 작업");
        assert_eq!(coding.count, 7);
        assert_eq!(coding.target, Some(Point::new(190.0, 344.0)));
        assert_eq!(reg.defs().len(), BUILT_IN.len());
    }

    #[test]
    fn built_ins_carry_their_room_spot() {
        let reg = CategoryRegistry::in_memory();
        assert_eq!(reg.target_of("music"), Some(Point::new(320.0, 200.0)));
        assert_eq!(reg.target_of("gaming"), Some(Point::new(235.0, 290.0)));
        assert_eq!(reg.target_of("nope"), None);
    }

    #[test]
    fn registered_categories_take_slots_in_order() {
        let mut reg = CategoryRegistry::in_memory();
        let spots: Vec<_> = (0..7)
            .map(|i| reg.register(&format!("c{i}"), "x", &[]).target)
            .collect();
        assert_eq!(spots[0], Some(DYNAMIC_SLOTS[0]));
        assert_eq!(spots[1], Some(DYNAMIC_SLOTS[1]));
        assert_eq!(spots[5], Some(DYNAMIC_SLOTS[5]));
        assert_eq!(spots[6], Some(DYNAMIC_SLOTS[0]));
        assert_eq!(reg.register("c1", "x", &[]).target, Some(DYNAMIC_SLOTS[1]));
    }

    #[test]
    fn stored_categories_without_a_spot_get_one_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.json");
        let stored = vec![CategoryDef {
            id: "garden".into(),
            label: "정원".into(),
            keywords: vec![],
            count: 2,
            built_in: false,
            target: None,
        }];
        save_json_atomic(&path, &stored).unwrap();
        let reg = CategoryRegistry::load(path);
        assert_eq!(reg.target_of("garden"), Some(DYNAMIC_SLOTS[0]));
    }
}
