//! Approximate word matching under a bounded edit distance

/// Default threshold used by [`is_fuzzy_match`].
pub const DEFAULT_MAX_DISTANCE: usize = 3;

/// Levenshtein distance between two strings, compared case-insensitively.
///
/// Insertions, deletions and substitutions each cost one.
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let (long, short) = if a.len() < b.len() { (&b, &a) } else { (&a, &b) };

    if short.is_empty() {
        return long.len();
    }

    let mut previous: Vec<usize> = (0..=short.len()).collect();
    let mut current = Vec::with_capacity(short.len() + 1);

    for (i, c1) in long.iter().enumerate() {
        current.clear();
        current.push(i + 1);
        for (j, c2) in short.iter().enumerate() {
            let insertion = previous[j + 1] + 1;
            let deletion = current[j] + 1;
            let substitution = previous[j] + usize::from(c1 != c2);
            current.push(insertion.min(deletion).min(substitution));
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[short.len()]
}

/// Whether `input` is within `max_distance` edits of `target`.
pub fn is_fuzzy_match(input: &str, target: &str, max_distance: usize) -> bool {
    let input = input.to_lowercase();
    let target = target.to_lowercase();
    if input == target {
        return true;
    }
    distance(&input, &target) <= max_distance
}

/// Closest candidate within `max_distance`, with its distance.
///
/// Ties keep the candidate that appears first in `candidates`.
pub fn best_match<'a>(
    input: &str,
    candidates: &[&'a str],
    max_distance: usize,
) -> Option<(&'a str, usize)> {
    let mut best: Option<(&'a str, usize)> = None;
    for &candidate in candidates {
        let d = distance(input, candidate);
        if d > max_distance {
            continue;
        }
        match best {
            Some((_, best_d)) if best_d <= d => {}
            _ => best = Some((candidate, d)),
        }
    }
    best
}
