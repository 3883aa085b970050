use serde::{Deserialize, Serialize};

/// Seedable random source for phrase picks and routine shuffles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct RngState {
    pub(crate) seed: u64,
    pub(crate) draws: u64,
}

impl RngState {
    pub(crate) fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        // Counter-based SplitMix64: draw n depends only on (seed, n).
        let mut z = self
            .seed
            .wrapping_add(self.draws.wrapping_mul(0x9E3779B97F4A7C15));
        self.draws = self.draws.wrapping_add(1);

        z = z.wrapping_add(0x9E3779B97F4A7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    pub(crate) fn next_f32(&mut self) -> f32 {
        // [0,1)
        let v = self.next_u64() >> 40; // 24 bits
        (v as f32) / ((1u64 << 24) as f32)
    }

    pub(crate) fn roll(&mut self, p: f32) -> bool {
        self.next_f32() < p.clamp(0.0, 1.0)
    }

    /// Uniform index in `0..n`; `n == 0` yields 0.
    pub(crate) fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        (self.next_u64() % n as u64) as usize
    }

    pub(crate) fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        if items.is_empty() {
            return "";
        }
        items[self.below(items.len())]
    }

    /// Fisher-Yates.
    pub(crate) fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}
