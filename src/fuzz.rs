//! Weighted-ratio fuzzy string similarity, scored 0-100.
//!
//! The scoring shape follows the classic WRatio composition: a plain
//! normalized-edit-distance ratio, a token-sorted variant for word-order
//! tolerance, and sliding-window partial ratios when the two strings differ
//! substantially in length.

/// Scale applied to token-based sub-scores.
const TOKEN_SCALE: f64 = 0.95;

/// Scale applied to partial (substring) sub-scores.
const PARTIAL_SCALE: f64 = 0.90;

/// Length ratio above which partial matching kicks in.
const PARTIAL_LENGTH_RATIO: f64 = 1.5;

/// Lowercase, strip non-alphanumeric characters, and collapse whitespace.
fn full_process(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            for lower in c.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_space = true;
        }
    }
    out
}

fn levenshtein_ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Simple ratio between two strings after normalization.
pub fn ratio(a: &str, b: &str) -> u32 {
    levenshtein_ratio(&full_process(a), &full_process(b)).round() as u32
}

/// Best ratio between the shorter string and any equally long substring of
/// the longer one.
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    partial_ratio_processed(&full_process(a), &full_process(b)).round() as u32
}

fn partial_ratio_processed(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_len = short.chars().count();
    let long_chars: Vec<char> = long.chars().collect();
    if short_len == 0 {
        return 0.0;
    }
    if short_len == long_chars.len() {
        return levenshtein_ratio(short, long);
    }

    let mut best: f64 = 0.0;
    for start in 0..=(long_chars.len() - short_len) {
        let window: String = long_chars[start..start + short_len].iter().collect();
        best = best.max(levenshtein_ratio(short, &window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Ratio after sorting the words of both strings, making the score
/// insensitive to word order.
pub fn token_sort_ratio(a: &str, b: &str) -> u32 {
    let a = sort_tokens(&full_process(a));
    let b = sort_tokens(&full_process(b));
    levenshtein_ratio(&a, &b).round() as u32
}

/// Weighted ratio: the maximum of the plain, token-sorted, and (for
/// length-mismatched inputs) partial sub-scores, each with its
/// conventional scale factor.
pub fn wratio(a: &str, b: &str) -> u32 {
    let p1 = full_process(a);
    let p2 = full_process(b);
    if p1.is_empty() || p2.is_empty() {
        return 0;
    }

    let len1 = p1.chars().count() as f64;
    let len2 = p2.chars().count() as f64;
    let length_ratio = len1.max(len2) / len1.min(len2);

    let mut best = levenshtein_ratio(&p1, &p2);

    if length_ratio > PARTIAL_LENGTH_RATIO {
        best = best.max(PARTIAL_SCALE * partial_ratio_processed(&p1, &p2));
        let s1 = sort_tokens(&p1);
        let s2 = sort_tokens(&p2);
        best = best.max(TOKEN_SCALE * PARTIAL_SCALE * partial_ratio_processed(&s1, &s2));
    } else {
        let s1 = sort_tokens(&p1);
        let s2 = sort_tokens(&p2);
        best = best.max(TOKEN_SCALE * levenshtein_ratio(&s1, &s2));
    }

    best.round().min(100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_100() {
        assert_eq!(wratio("Power Bill", "power bill"), 100);
        assert_eq!(ratio("hello", "hello"), 100);
    }

    #[test]
    fn processing_strips_punctuation() {
        assert_eq!(full_process("  Hello, World!  "), "hello world");
    }

    #[test]
    fn token_order_is_tolerated() {
        assert!(token_sort_ratio("bill power", "power bill") == 100);
        assert!(wratio("bill power", "power bill") >= 95);
    }

    #[test]
    fn typo_against_longer_text_stays_above_floor() {
        // A misspelled query against a full OCR text should still match well.
        let score = wratio("electricty", "Electricity usage 120kWh");
        assert!(score > 50, "got {score}");
    }

    #[test]
    fn unrelated_text_scores_low() {
        let score = wratio("electricty", "GST return");
        assert!(score <= 50, "got {score}");
    }

    #[test]
    fn partial_finds_embedded_match() {
        assert_eq!(partial_ratio("pasta", "how to cook pasta quickly"), 100);
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(wratio("", "anything"), 0);
        assert_eq!(wratio("anything", ""), 0);
    }

    #[test]
    fn wratio_is_symmetric_enough() {
        let a = wratio("power bill", "monthly power bill statement");
        let b = wratio("monthly power bill statement", "power bill");
        assert_eq!(a, b);
    }
}
