//! Fuzzy name matching over a candidate set.
//!
//! Scores with the normalized indel ratio: `100 * 2*LCS(a,b) / (|a|+|b|)`,
//! equivalently `100 * (1 - indel_distance / (|a|+|b|))`. A single missing
//! character in a six-letter name ("sydny" vs "sydney") scores ~90.9, so it
//! clears the default threshold.

use anyhow::{Result, ensure};

/// Minimum score for a fuzzy match to be accepted by the pipeline.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 90.0;

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut prev = vec![0usize; short.len() + 1];
    let mut cur = vec![0usize; short.len() + 1];
    for &lc in long {
        for (j, &sc) in short.iter().enumerate() {
            cur[j + 1] = if lc == sc { prev[j] + 1 } else { cur[j].max(prev[j + 1]) };
        }
        std::mem::swap(&mut prev, &mut cur);
        cur[0] = 0;
    }
    prev[short.len()]
}

/// Normalized indel similarity in [0, 100].
pub fn indel_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    let ac: Vec<char> = a.chars().collect();
    let bc: Vec<char> = b.chars().collect();
    100.0 * (2 * lcs_len(&ac, &bc)) as f64 / (ac.len() + bc.len()) as f64
}

/// Best candidate for `query` with its score. Deterministic: ties keep the
/// first-encountered candidate, so callers pass candidates in a canonical
/// (sorted) order. An empty candidate set is a caller error, never a
/// spurious match.
pub fn best_match<'a, S: AsRef<str>>(query: &str, candidates: &'a [S]) -> Result<(&'a str, f64)> {
    ensure!(!candidates.is_empty(), "fuzzy match requires a non-empty candidate set");
    let mut best = candidates[0].as_ref();
    let mut best_score = indel_ratio(query, best);
    for cand in &candidates[1..] {
        let cand = cand.as_ref();
        let score = indel_ratio(query, cand);
        if score > best_score {
            best = cand;
            best_score = score;
        }
    }
    Ok((best, best_score))
}
