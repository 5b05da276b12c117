use crate::freq::FreqTable;
use crate::reference::ReferenceSets;

/// Coverage milestones for the cumulative walk, in ascending order. The
/// 100% point is synthesized separately.
pub const MILESTONES: [u8; 5] = [50, 80, 90, 95, 99];

/// Coverage of a document by one reference set.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageStat {
    /// Characters actually in the reference set (may be below the nominal
    /// threshold when source data ran out).
    pub actual_n: usize,
    /// Percentage of the document covered by the set, 0–100.
    pub coverage: f64,
    /// Absolute occurrence count covered by the set.
    pub total_count: u64,
    /// total_count / actual_n, 0 when the set is empty.
    pub avg_count: f64,
}

/// Computes coverage of `freq` by the precomputed set for threshold `n`.
/// Pure; an unknown threshold or empty document yields zeroed stats.
pub fn coverage_stat(n: u32, sets: &ReferenceSets, freq: &FreqTable) -> CoverageStat {
    let Some(set) = sets.get(n) else {
        return CoverageStat {
            actual_n: 0,
            coverage: 0.0,
            total_count: 0,
            avg_count: 0.0,
        };
    };

    let total_count: u64 = set.iter().map(|&c| freq.count(c)).sum();
    let total = freq.total();
    let coverage = if total > 0 {
        total_count as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let avg_count = if !set.is_empty() {
        total_count as f64 / set.len() as f64
    } else {
        0.0
    };

    CoverageStat {
        actual_n: set.len(),
        coverage,
        total_count,
        avg_count,
    }
}

/// One cumulative-coverage milestone: the minimum number of distinct
/// characters (taken in descending frequency order) whose combined count
/// first reaches `target_pct` of the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CumulativePoint {
    pub target_pct: u8,
    pub char_count: usize,
    pub actual_pct: f64,
}

/// Walks the frequency table once in descending-count order, emitting each
/// milestone on its first crossing. Milestones come out in ascending order
/// because the cumulative sum is monotonic. The walk stops early once every
/// milestone is found, and a final (100, distinct, 100.0) point is always
/// appended. An empty document yields just that final point.
pub fn cumulative_points(freq: &FreqTable) -> Vec<CumulativePoint> {
    let total = freq.total();
    let mut points = Vec::with_capacity(MILESTONES.len() + 1);

    if total > 0 {
        let mut reached = [false; MILESTONES.len()];
        let mut cumulative = 0u64;

        for (idx, (_, count)) in freq.by_count_desc().into_iter().enumerate() {
            cumulative += count;
            let pct = cumulative as f64 / total as f64 * 100.0;

            for (i, &milestone) in MILESTONES.iter().enumerate() {
                if !reached[i] && pct >= milestone as f64 {
                    points.push(CumulativePoint {
                        target_pct: milestone,
                        char_count: idx + 1,
                        actual_pct: pct,
                    });
                    reached[i] = true;
                }
            }

            if reached.iter().all(|&r| r) {
                break;
            }
        }
    }

    points.push(CumulativePoint {
        target_pct: 100,
        char_count: freq.distinct(),
        actual_pct: 100.0,
    });
    points
}

/// The character count recorded for one milestone, 0 if absent (empty
/// document).
pub fn chars_for_milestone(points: &[CumulativePoint], target: u8) -> usize {
    points
        .iter()
        .find(|p| p.target_pct == target)
        .map(|p| p.char_count)
        .unwrap_or(0)
}
