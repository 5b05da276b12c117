use crate::coverage::{self, chars_for_milestone, CoverageStat, CumulativePoint};
use crate::freq::FreqTable;
use crate::rarity::{self, RarityAnalysis};
use crate::reference::{common_baseline, RankMap, ReferenceSets, COMMON_BASELINE_CEILING};
use crate::scoring::{self, DifficultyResult, ScoreInputs, ScoringConfig};
use std::collections::HashSet;

/// Coverage thresholds reported for every document.
pub const COVERAGE_THRESHOLDS: [u32; 9] = [10, 50, 100, 500, 1000, 1500, 2000, 3000, 5000];

/// Everything computed for one document.
#[derive(Debug, Clone)]
pub struct BookAnalysis {
    pub total_chars: u64,
    pub distinct_chars: usize,
    /// (threshold, stat) in ascending threshold order.
    pub coverage: Vec<(u32, CoverageStat)>,
    pub cumulative: Vec<CumulativePoint>,
    pub rarity: RarityAnalysis,
    pub chars_95: usize,
    pub chars_99: usize,
    pub chars_95_in_head: usize,
    pub chars_95_out_head: usize,
    pub chars_99_in_head: usize,
    pub chars_99_out_head: usize,
    pub avg_order_95: Option<f64>,
    pub avg_order_99: Option<f64>,
    /// Distinct characters beyond the head list (or beyond the configured
    /// baseline count when no head list is loaded).
    pub extra_char_types: usize,
    pub difficulty: DifficultyResult,
}

impl BookAnalysis {
    pub fn coverage_at(&self, threshold: u32) -> Option<&CoverageStat> {
        self.coverage
            .iter()
            .find(|(n, _)| *n == threshold)
            .map(|(_, stat)| stat)
    }
}

/// Shared read-only state for a batch of documents: reference data,
/// precomputed threshold sets, the rarity baseline, and the scoring
/// configuration. Build once, then call [`Analyzer::analyze`] per document;
/// nothing here mutates, so the analyzer can be shared freely.
#[derive(Debug, Clone)]
pub struct Analyzer {
    head: Vec<char>,
    head_set: HashSet<char>,
    rank: RankMap,
    sets: ReferenceSets,
    baseline: HashSet<char>,
    config: ScoringConfig,
}

impl Analyzer {
    pub fn new(head: Vec<char>, rank: RankMap, config: ScoringConfig) -> Self {
        let sets = ReferenceSets::precompute(&head, &rank, &COVERAGE_THRESHOLDS);
        let baseline = common_baseline(&head, &rank, COMMON_BASELINE_CEILING);
        let head_set = head.iter().copied().collect();
        Analyzer {
            head,
            head_set,
            rank,
            sets,
            baseline,
            config,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn head_len(&self) -> usize {
        self.head.len()
    }

    pub fn reference_sets(&self) -> &ReferenceSets {
        &self.sets
    }

    /// Runs the full pipeline over one frequency table. Deterministic and
    /// total: degenerate inputs (empty document, missing reference data)
    /// produce defined degenerate results.
    pub fn analyze(&self, freq: &FreqTable) -> BookAnalysis {
        let coverage: Vec<(u32, CoverageStat)> = COVERAGE_THRESHOLDS
            .iter()
            .map(|&n| (n, coverage::coverage_stat(n, &self.sets, freq)))
            .collect();

        let cumulative = coverage::cumulative_points(freq);
        let rarity = rarity::analyze(freq, &self.baseline);

        let by_freq = freq.by_count_desc();
        let chars_95 = chars_for_milestone(&cumulative, 95);
        let chars_99 = chars_for_milestone(&cumulative, 99);
        let list_95 = &by_freq[..chars_95.min(by_freq.len())];
        let list_99 = &by_freq[..chars_99.min(by_freq.len())];

        let avg_order_95 = rarity::average_rank(list_95, &self.rank);
        let avg_order_99 = rarity::average_rank(list_99, &self.rank);

        let (extra_char_types, chars_95_in_head, chars_99_in_head) = if !self.head.is_empty() {
            let extra = freq
                .iter()
                .filter(|(c, _)| !self.head_set.contains(c))
                .count();
            let in_95 = list_95
                .iter()
                .filter(|(c, _)| self.head_set.contains(c))
                .count();
            let in_99 = list_99
                .iter()
                .filter(|(c, _)| self.head_set.contains(c))
                .count();
            (extra, in_95, in_99)
        } else {
            let extra = freq.distinct().saturating_sub(self.config.char_types_baseline);
            (extra, 0, 0)
        };

        let inputs = ScoreInputs {
            coverage_500: self.coverage_value(&coverage, 500),
            coverage_1000: self.coverage_value(&coverage, 1000),
            coverage_1500: self.coverage_value(&coverage, 1500),
            chars_for_95: chars_95,
            chars_for_99: chars_99,
            avg_order_95,
            avg_order_99,
            extra_char_types,
        };
        let difficulty = scoring::score(&self.config, &inputs);

        BookAnalysis {
            total_chars: freq.total(),
            distinct_chars: freq.distinct(),
            coverage,
            cumulative,
            rarity,
            chars_95,
            chars_99,
            chars_95_in_head,
            chars_95_out_head: list_95.len() - chars_95_in_head,
            chars_99_in_head,
            chars_99_out_head: list_99.len() - chars_99_in_head,
            avg_order_95,
            avg_order_99,
            extra_char_types,
            difficulty,
        }
    }

    fn coverage_value(&self, coverage: &[(u32, CoverageStat)], threshold: u32) -> f64 {
        coverage
            .iter()
            .find(|(n, _)| *n == threshold)
            .map(|(_, stat)| stat.coverage)
            .unwrap_or(0.0)
    }
}
