use crate::freq::is_cjk;
use std::collections::{HashMap, HashSet};

/// Rank dictionary: character → 1-based position in an extended frequency
/// dictionary (1 = most common). Read-only once loaded.
pub type RankMap = HashMap<char, u32>;

/// How far past the head list the common-character baseline extends.
pub const COMMON_BASELINE_CEILING: usize = 3500;

/// Parses an ordered head list (the N most common characters) from file
/// contents. Any CJK character counts, in file order, first win on
/// duplicates. Non-CJK characters (numbering, whitespace) are skipped.
pub fn head_list_from_text(text: &str) -> Vec<char> {
    let mut seen = HashSet::new();
    text.chars()
        .filter(|&c| is_cjk(c))
        .filter(|&c| seen.insert(c))
        .collect()
}

/// Parses a rank dictionary from one-character-per-line file contents.
/// Line number (1-based, counting non-empty lines) is the rank; the first
/// occurrence of a character wins.
pub fn rank_map_from_text(text: &str) -> RankMap {
    let mut map = RankMap::new();
    let mut rank = 0u32;
    for line in text.lines() {
        let line = line.trim();
        if let Some(c) = line.chars().next() {
            rank += 1;
            map.entry(c).or_insert(rank);
        }
    }
    map
}

/// Precomputed reference character sets, one per coverage threshold.
/// Built once per batch from the head list and rank dictionary, then
/// shared read-only by every document.
#[derive(Debug, Clone)]
pub struct ReferenceSets {
    sets: HashMap<u32, HashSet<char>>,
}

impl ReferenceSets {
    /// Builds the set for every requested threshold N.
    ///
    /// With a head list available, the first N characters come from it
    /// directly (the head list is curated and outranks the dictionary);
    /// thresholds beyond its length are filled from the rank dictionary in
    /// rank order, skipping characters the head list already covers. The
    /// rank dictionary is sorted exactly once and reused for every
    /// threshold. Without a head list, each set is simply every character
    /// with rank ≤ N.
    ///
    /// Sets degrade to fewer than N characters when the source data runs
    /// out; that is not an error.
    pub fn precompute(head: &[char], rank: &RankMap, thresholds: &[u32]) -> Self {
        let mut sets = HashMap::with_capacity(thresholds.len());

        if head.is_empty() {
            for &n in thresholds {
                let set: HashSet<char> = rank
                    .iter()
                    .filter(|&(_, &r)| r <= n)
                    .map(|(&c, _)| c)
                    .collect();
                sets.insert(n, set);
            }
            return ReferenceSets { sets };
        }

        // Sort once; ties on rank break by code point for determinism.
        let mut by_rank: Vec<(char, u32)> = rank.iter().map(|(&c, &r)| (c, r)).collect();
        by_rank.sort_by_key(|&(c, r)| (r, c));

        let head_set: HashSet<char> = head.iter().copied().collect();
        let mut ordered: Vec<u32> = thresholds.to_vec();
        ordered.sort_unstable();

        for n in ordered {
            let set = if n as usize <= head.len() {
                head[..n as usize].iter().copied().collect()
            } else {
                let mut set = head_set.clone();
                let needed = n as usize - head.len();
                let mut added = 0usize;
                for &(c, _) in &by_rank {
                    if !head_set.contains(&c) {
                        set.insert(c);
                        added += 1;
                        if added >= needed {
                            break;
                        }
                    }
                }
                set
            };
            sets.insert(n, set);
        }

        ReferenceSets { sets }
    }

    /// The precomputed set for a threshold, if that threshold was requested.
    pub fn get(&self, n: u32) -> Option<&HashSet<char>> {
        self.sets.get(&n)
    }

    /// Requested thresholds in ascending order.
    pub fn thresholds(&self) -> Vec<u32> {
        let mut ns: Vec<u32> = self.sets.keys().copied().collect();
        ns.sort_unstable();
        ns
    }
}

/// The common-character baseline used for rarity classification: the head
/// list plus a rank-ordered extension up to `ceiling` characters. Falls
/// back to rank ≤ ceiling when the head list is unavailable.
pub fn common_baseline(head: &[char], rank: &RankMap, ceiling: usize) -> HashSet<char> {
    if head.is_empty() {
        return rank
            .iter()
            .filter(|&(_, &r)| r as usize <= ceiling)
            .map(|(&c, _)| c)
            .collect();
    }

    let mut baseline: HashSet<char> = head.iter().copied().collect();
    let needed = ceiling.saturating_sub(head.len());
    if needed > 0 {
        let mut by_rank: Vec<(char, u32)> = rank.iter().map(|(&c, &r)| (c, r)).collect();
        by_rank.sort_by_key(|&(c, r)| (r, c));
        let mut added = 0usize;
        for (c, _) in by_rank {
            if !baseline.contains(&c) {
                baseline.insert(c);
                added += 1;
                if added >= needed {
                    break;
                }
            }
        }
    }
    baseline
}
