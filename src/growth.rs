use crate::storage::{load_json, save_json_atomic};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;
const HISTORY_DAYS: u64 = 30;
const RATIO_DAYS: u64 = 7;

struct UpgradeRule {
    category: &'static str,
    thresholds: [f32; 2],
    labels: [&'static str; 2],
}

const UPGRADE_RULES: &[UpgradeRule] = &[
    UpgradeRule {
        category: "coding",
        thresholds: [0.4, 0.8],
        labels: ["듀얼모니터", "3스크린 셋업"],
    },
    UpgradeRule {
        category: "shopping",
        thresholds: [0.25, 0.5],
        labels: ["장바구니 확장", "배송박스 더미"],
    },
    UpgradeRule {
        category: "writing",
        thresholds: [0.3, 0.6],
        labels: ["타자기", "책장 확장"],
    },
    UpgradeRule {
        category: "research",
        thresholds: [0.3, 0.6],
        labels: ["돋보기", "연구 보드"],
    },
    UpgradeRule {
        category: "calendar",
        thresholds: [0.3, 0.6],
        labels: ["디지털 달력", "플래너 데스크"],
    },
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TaskRecord {
    pub(crate) category: String,
    pub(crate) ts: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct RoomUpgrade {
    pub(crate) category: String,
    pub(crate) level: u8,
    pub(crate) label: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct GrowthFile {
    #[serde(default)]
    history: Vec<TaskRecord>,
    #[serde(default)]
    upgrades: Vec<RoomUpgrade>,
}

/// Room furniture that levels up with the share of recent tasks per category.
pub(crate) struct RoomGrowth {
    path: Option<PathBuf>,
    data: GrowthFile,
}

impl RoomGrowth {
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        Self {
            path: None,
            data: GrowthFile::default(),
        }
    }

    pub(crate) fn load(path: PathBuf) -> Self {
        let data = load_json(&path).unwrap_or_default();
        Self {
            path: Some(path),
            data,
        }
    }

    pub(crate) fn upgrades(&self) -> &[RoomUpgrade] {
        &self.data.upgrades
    }

    pub(crate) fn record(&mut self, category: &str, now_ms: u64) {
        self.data.history.push(TaskRecord {
            category: category.to_string(),
            ts: now_ms,
        });
        let cutoff = now_ms.saturating_sub(HISTORY_DAYS * DAY_MS);
        self.data.history.retain(|t| t.ts > cutoff);
        self.save();
    }

    fn ratios(&self, now_ms: u64, days: u64) -> BTreeMap<&str, f32> {
        let cutoff = now_ms.saturating_sub(days * DAY_MS);
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        let mut total = 0u32;
        for t in self.data.history.iter().filter(|t| t.ts > cutoff) {
            *counts.entry(t.category.as_str()).or_default() += 1;
            total += 1;
        }
        counts
            .into_iter()
            .map(|(cat, n)| (cat, n as f32 / total as f32))
            .collect()
    }

    /// Raises upgrade levels from the last week's category shares and
    /// returns the upgrades that changed. Levels only go up.
    pub(crate) fn check_upgrades(&mut self, now_ms: u64) -> Vec<RoomUpgrade> {
        let ratios: BTreeMap<String, f32> = self
            .ratios(now_ms, RATIO_DAYS)
            .into_iter()
            .map(|(cat, r)| (cat.to_string(), r))
            .collect();
        let mut changed = Vec::new();

        for rule in UPGRADE_RULES {
            let ratio = ratios.get(rule.category).copied().unwrap_or(0.0);
            let level = rule.thresholds.iter().filter(|&&t| ratio >= t).count() as u8;
            if level == 0 {
                continue;
            }
            let current = self
                .data
                .upgrades
                .iter()
                .find(|u| u.category == rule.category)
                .map_or(0, |u| u.level);
            if level <= current {
                continue;
            }
            let upgrade = RoomUpgrade {
                category: rule.category.to_string(),
                level,
                label: rule.labels[level as usize - 1].to_string(),
            };
            match self.data.upgrades.iter_mut().find(|u| u.category == rule.category) {
                Some(existing) => *existing = upgrade.clone(),
                None => self.data.upgrades.push(upgrade.clone()),
            }
            tracing::info!(
                category = rule.category,
                level,
                label = %upgrade.label,
                ratio = ratio * 100.0,
                "room upgraded"
            );
            changed.push(upgrade);
        }

        if !changed.is_empty() {
            self.save();
        }
        changed
    }

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(err) = save_json_atomic(path, &self.data) {
            tracing::warn!(error = %err, "could not save room growth");
        }
    }
}
