//! Resolving typed answers to one of the displayed options

use strsim::{jaro_winkler, normalized_levenshtein};

/// Minimum similarity for a typed answer to count as a given option.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Similarity of two strings in `0.0..=1.0`, case and surrounding whitespace ignored.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return 1.0;
    }
    // Weighted average (Jaro-Winkler is better for typos)
    normalized_levenshtein(&a, &b) * 0.4 + jaro_winkler(&a, &b) * 0.6
}

/// Map user input to an option index.
///
/// Accepts a 1-based option number, the option text itself, or a close
/// spelling of exactly one option. Returns `None` when the input is
/// ambiguous or too far from every option.
pub fn resolve_choice(input: &str, options: &[String], threshold: f64) -> Option<usize> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(n) = input.parse::<usize>() {
        return (1..=options.len()).contains(&n).then(|| n - 1);
    }
    if let Some(i) = options.iter().position(|o| o == input) {
        return Some(i);
    }

    let mut scored: Vec<(usize, f64)> = options
        .iter()
        .enumerate()
        .map(|(i, o)| (i, similarity(input, o)))
        .filter(|(_, score)| *score >= threshold)
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    match scored.as_slice() {
        [] => None,
        [(best, _)] => Some(*best),
        [(best, top), (_, second), ..] if top > second => Some(*best),
        _ => None,
    }
}
