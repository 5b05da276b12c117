use crate::freq::FreqTable;
use crate::reference::RankMap;
use std::collections::HashSet;

/// Breakdown of a document into baseline ("common") and rare characters.
/// A character is rare iff it is absent from the baseline set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RarityAnalysis {
    /// Rare characters with counts, sorted by count descending (ties by
    /// first occurrence in the document).
    pub rare_chars: Vec<(char, u64)>,
    /// Total occurrences of rare characters.
    pub rare_char_count: u64,
    /// rare_char_count / total document characters, 0 for empty documents.
    pub rare_char_ratio: f64,
    /// Number of distinct rare characters.
    pub rare_type_count: usize,
    /// rare_type_count / distinct characters, 0 for empty documents.
    pub rare_type_ratio: f64,
}

/// Partitions every character of the document against the baseline set.
pub fn analyze(freq: &FreqTable, baseline: &HashSet<char>) -> RarityAnalysis {
    let mut rare_chars = Vec::new();
    let mut common_count = 0u64;
    let mut rare_count = 0u64;

    // by_count_desc already carries the deterministic order we want for
    // the rare list.
    for (c, n) in freq.by_count_desc() {
        if baseline.contains(&c) {
            common_count += n;
        } else {
            rare_count += n;
            rare_chars.push((c, n));
        }
    }

    let total = common_count + rare_count;
    let rare_char_ratio = if total > 0 {
        rare_count as f64 / total as f64
    } else {
        0.0
    };
    let rare_type_ratio = if freq.distinct() > 0 {
        rare_chars.len() as f64 / freq.distinct() as f64
    } else {
        0.0
    };

    RarityAnalysis {
        rare_type_count: rare_chars.len(),
        rare_chars,
        rare_char_count: rare_count,
        rare_char_ratio,
        rare_type_ratio,
    }
}

/// Arithmetic mean dictionary rank over the character types in `pairs`.
/// Counts are ignored — the average is over types, not occurrences — and
/// unranked characters are skipped. `None` when no character is ranked.
pub fn average_rank(pairs: &[(char, u64)], rank: &RankMap) -> Option<f64> {
    let ranks: Vec<u32> = pairs
        .iter()
        .filter_map(|&(c, _)| rank.get(&c).copied())
        .collect();

    if ranks.is_empty() {
        None
    } else {
        Some(ranks.iter().map(|&r| r as f64).sum::<f64>() / ranks.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rarity_scenario() {
        // 的×100 一×50 你×1 with baseline {的, 一} → 你 is rare.
        let mut text = String::new();
        text.push_str(&"的".repeat(100));
        text.push_str(&"一".repeat(50));
        text.push('你');
        let freq = FreqTable::from_text(&text);
        let baseline: HashSet<char> = ['的', '一'].into_iter().collect();

        let analysis = analyze(&freq, &baseline);
        assert_eq!(analysis.rare_chars, vec![('你', 1)]);
        assert_eq!(analysis.rare_type_count, 1);
        assert_eq!(analysis.rare_char_count, 1);
        assert!((analysis.rare_char_ratio - 1.0 / 151.0).abs() < 1e-9);
        assert!((analysis.rare_type_ratio - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rarity_all_common() {
        let freq = FreqTable::from_text("的的一");
        let baseline: HashSet<char> = ['的', '一'].into_iter().collect();
        let analysis = analyze(&freq, &baseline);
        assert!(analysis.rare_chars.is_empty());
        assert_eq!(analysis.rare_char_ratio, 0.0);
        assert_eq!(analysis.rare_type_ratio, 0.0);
    }

    #[test]
    fn test_rarity_empty_document() {
        let analysis = analyze(&FreqTable::from_text(""), &HashSet::new());
        assert_eq!(analysis, RarityAnalysis::default());
    }

    #[test]
    fn test_rare_chars_sorted_by_count_desc() {
        let freq = FreqTable::from_text("鑫鑫鑫垚垚犇");
        let analysis = analyze(&freq, &HashSet::new());
        assert_eq!(analysis.rare_chars, vec![('鑫', 3), ('垚', 2), ('犇', 1)]);
    }

    #[test]
    fn test_average_rank_scenario() {
        let rank: RankMap = [('的', 1)].into_iter().collect();
        // Mapped character present → average is 1.0, not "no data".
        assert_eq!(average_rank(&[('的', 100)], &rank), Some(1.0));
    }

    #[test]
    fn test_average_rank_ignores_counts_and_unmapped() {
        let rank: RankMap = [('的', 1), ('一', 3)].into_iter().collect();
        // 你 unranked → skipped; counts do not weight the mean.
        let avg = average_rank(&[('的', 1000), ('一', 1), ('你', 500)], &rank);
        assert_eq!(avg, Some(2.0));
    }

    #[test]
    fn test_average_rank_no_data() {
        let rank: RankMap = [('的', 1)].into_iter().collect();
        assert_eq!(average_rank(&[('你', 5)], &rank), None);
        assert_eq!(average_rank(&[], &rank), None);
    }
}
