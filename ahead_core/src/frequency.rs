//! Frequency code resolution
//!
//! Maps calendar frequency aliases to the number of periods per seasonal
//! cycle expected by the forecast engine (see
//! <https://otexts.com/fpp2/ts-objects.html#frequency-of-a-time-series>):
//!
//! | Data      | cycle |
//! |-----------|-------|
//! | Annual    | 1     |
//! | Quarterly | 4     |
//! | Monthly   | 12    |
//! | Weekly    | 52    |
//! | Daily     | 365   |
//!
//! Unknown codes never fail in [`resolve`]: the closest known alias wins.
//! Use [`resolve_strict`] to reject them instead.

use crate::error::{ForecastError, Result};
use tracing::debug;

/// Base aliases in lookup order. Ties in fuzzy matching go to the earlier entry.
///
/// Anchored forms (`AS-JAN`, `Q-DEC`, `W-SUN`, ...) resolve through their base
/// and take no part in fuzzy matching.
const FREQUENCY_TABLE: &[(&str, usize)] = &[
    ("A", 1),
    ("Y", 1),
    ("BA", 1),
    ("BY", 1),
    ("AS", 1),
    ("YS", 1),
    ("BAS", 1),
    ("BYS", 1),
    ("Q", 4),
    ("BQ", 4),
    ("QS", 4),
    ("BQS", 4),
    ("M", 12),
    ("BM", 12),
    ("CBM", 12),
    ("MS", 12),
    ("BMS", 12),
    ("CBMS", 12),
    ("W", 52),
    ("B", 365),
    ("C", 365),
    ("D", 365),
];

/// Outcome of a frequency lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Alias that was matched
    pub code: &'static str,
    /// Periods per cycle
    pub cycle_length: usize,
    /// `false` when the alias was approximated
    pub exact: bool,
    /// Similarity between the input and the matched alias (1.0 when exact)
    pub score: f64,
}

/// Resolve a frequency code to its cycle length, approximating unknown codes.
pub fn resolve(code: &str) -> usize {
    resolve_detailed(code).cycle_length
}

/// Resolve a frequency code, rejecting anything that is not a known alias.
pub fn resolve_strict(code: &str) -> Result<usize> {
    let key = normalize_code(code);
    exact_match(&key)
        .map(|(_, cycle)| cycle)
        .ok_or_else(|| ForecastError::UnknownFrequency(code.to_string()))
}

/// Resolve a frequency code and report how it was matched.
pub fn resolve_detailed(code: &str) -> Resolution {
    let key = normalize_code(code);

    if let Some((alias, cycle_length)) = exact_match(&key) {
        return Resolution {
            code: alias,
            cycle_length,
            exact: true,
            score: 1.0,
        };
    }

    let mut best = (FREQUENCY_TABLE[0], f64::NEG_INFINITY);
    for entry in FREQUENCY_TABLE {
        let score = similarity(&key, entry.0);
        // strict comparison keeps the first entry on ties
        if score > best.1 {
            best = (*entry, score);
        }
    }

    let ((alias, cycle_length), score) = best;
    debug!(
        input = code,
        matched = alias,
        score = score,
        cycle_length = cycle_length,
        "frequency code approximated"
    );

    Resolution {
        code: alias,
        cycle_length,
        exact: false,
        score,
    }
}

/// Normalized edit-distance similarity in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

const ANCHOR_SUFFIXES: [&str; 19] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC", "MON",
    "TUE", "WED", "THU", "FRI", "SAT", "SUN",
];

fn lookup(key: &str) -> Option<(&'static str, usize)> {
    FREQUENCY_TABLE
        .iter()
        .find(|(alias, _)| *alias == key)
        .copied()
}

/// Exact alias, or an anchored alias such as `A-JUN` through its base `A`
fn exact_match(key: &str) -> Option<(&'static str, usize)> {
    lookup(key).or_else(|| {
        let (base, suffix) = key.rsplit_once('-')?;
        if ANCHOR_SUFFIXES.contains(&suffix) {
            lookup(base)
        } else {
            None
        }
    })
}
