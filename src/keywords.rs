//! Keyword extraction: RAKE phrase ranking followed by dictionary and
//! length filtering, keeping the terms that recur across phrases.
//!
//! Phrase ranking alone yields noisy multi-word fragments, especially on
//! OCR output; the dictionary check throws away recognition artifacts and
//! the frequency accumulation favors terms the document actually dwells on.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::OnceLock,
};

use crate::error::{Error, Result};

/// Default number of keywords returned.
pub const DEFAULT_KEYWORD_LIMIT: usize = 5;

/// Words shorter than this are discarded regardless of dictionary status.
pub const MIN_KEYWORD_LEN: usize = 4;

/// Validates candidate words against a language's lexicon.
pub trait Dictionary: Send + Sync {
    fn check(&self, word: &str) -> bool;
}

/// A dictionary backed by a plain word list, one word per line.
#[derive(Debug, Clone)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    /// Load a word list such as `/usr/share/dict/words`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|_| Error::Dictionary(path.to_path_buf()))?;
        Ok(Self::from_words(contents.lines()))
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn check(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }
}

/// Extract up to `limit` representative keywords from `text`.
///
/// Candidate phrases come from RAKE ranking; each phrase is split into
/// words, words failing the dictionary check or shorter than
/// [`MIN_KEYWORD_LEN`] are dropped, and the survivors are counted across
/// all phrases. The most frequent words win, first-seen order breaking
/// ties.
pub fn keywords(text: &str, dictionary: &dyn Dictionary, limit: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();

    for phrase in ranked_phrases(text) {
        for word in phrase.split_whitespace() {
            if word.chars().count() < MIN_KEYWORD_LEN || !dictionary.check(word) {
                continue;
            }
            match counts.iter_mut().find(|(w, _)| w == word) {
                Some((_, count)) => *count += 1,
                None => counts.push((word.to_string(), 1)),
            }
        }
    }

    // Stable sort keeps first-seen order among equally frequent words.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts.into_iter().map(|(word, _)| word).collect()
}

/// Candidate phrases ordered by RAKE relevance (highest first).
///
/// Phrases are maximal runs of non-stopword words; each word scores
/// degree/frequency over the whole text and a phrase scores the sum of its
/// word scores.
pub fn ranked_phrases(text: &str) -> Vec<String> {
    let phrases = candidate_phrases(text);

    let mut frequency: HashMap<&str, f64> = HashMap::new();
    let mut degree: HashMap<&str, f64> = HashMap::new();
    for phrase in &phrases {
        for word in phrase {
            *frequency.entry(word.as_str()).or_default() += 1.0;
            *degree.entry(word.as_str()).or_default() += phrase.len() as f64;
        }
    }

    let mut scored: Vec<(f64, String)> = phrases
        .iter()
        .map(|phrase| {
            let score = phrase
                .iter()
                .map(|word| degree[word.as_str()] / frequency[word.as_str()])
                .sum();
            (score, phrase.join(" "))
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, phrase)| phrase).collect()
}

fn candidate_phrases(text: &str) -> Vec<Vec<String>> {
    let mut phrases = Vec::new();

    for sentence in text.split(is_sentence_break) {
        let mut current: Vec<String> = Vec::new();
        for raw in sentence.split_whitespace() {
            let word: String = raw
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect();

            let breaks = word.is_empty()
                || is_stopword(&word)
                || word.chars().all(|c| c.is_numeric());
            if breaks {
                if !current.is_empty() {
                    phrases.push(std::mem::take(&mut current));
                }
            } else {
                current.push(word);
            }
        }
        if !current.is_empty() {
            phrases.push(current);
        }
    }

    phrases
}

fn is_sentence_break(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | ';' | ':' | '!' | '?' | '\n' | '\r' | '(' | ')' | '[' | ']' | '"'
    )
}

fn is_stopword(word: &str) -> bool {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
        .contains(word)
}

/// English stopwords delimiting candidate phrases.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it",
    "its", "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out",
    "over", "own", "per", "same", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "you", "your", "yours", "yourself", "yourselves",
];
