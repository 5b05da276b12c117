use std::collections::HashMap;

/// Returns true for characters in the CJK Unified Ideograph ranges
/// (base block, Extension A, Extensions B through F). Everything else —
/// punctuation, kana, Latin — is ignored by the frequency counter.
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4e00}'..='\u{9fff}'
        | '\u{3400}'..='\u{4dbf}'
        | '\u{20000}'..='\u{2ebef}')
}

/// Per-document character frequency table. Built once from the decoded
/// text, immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct FreqTable {
    counts: HashMap<char, u64>,
    // First-occurrence index per character, used as the deterministic
    // tie-break when sorting by count.
    first_seen: HashMap<char, usize>,
    total: u64,
}

impl FreqTable {
    pub fn from_text(text: &str) -> Self {
        let mut table = FreqTable::default();
        for c in text.chars().filter(|&c| is_cjk(c)) {
            let next_index = table.first_seen.len();
            table.first_seen.entry(c).or_insert(next_index);
            *table.counts.entry(c).or_insert(0) += 1;
            table.total += 1;
        }
        table
    }

    /// Occurrence count for a character; 0 when absent.
    pub fn count(&self, c: char) -> u64 {
        self.counts.get(&c).copied().unwrap_or(0)
    }

    /// Total number of counted characters (sum of all counts).
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct characters.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn contains(&self, c: char) -> bool {
        self.counts.contains_key(&c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.counts.iter().map(|(&c, &n)| (c, n))
    }

    /// All (char, count) pairs sorted by count descending. Ties break by
    /// first occurrence in the document, so the order is deterministic for
    /// a given input text.
    pub fn by_count_desc(&self) -> Vec<(char, u64)> {
        let mut pairs: Vec<(char, u64)> = self.iter().collect();
        pairs.sort_by_key(|&(c, n)| (std::cmp::Reverse(n), self.first_seen[&c]));
        pairs
    }
}
