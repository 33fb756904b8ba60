//! Ranked fuzzy search over a caller-supplied snapshot of stored documents.
//!
//! The snapshot is read-only per query; ranking happens against title and
//! recognized text, a relevance floor discards weak matches, a bounded
//! top-k heap avoids sorting the whole collection, and notebook/location
//! filters are applied to the surviving slice.

use std::{cmp::Reverse, collections::BinaryHeap};

use serde::{Deserialize, Serialize};

use crate::fuzz;

/// Maximum number of ranked results per query.
pub const RESULT_LIMIT: usize = 10;

/// Scores at or below this floor are considered irrelevant.
pub const SCORE_FLOOR: u32 = 50;

/// A stored document as seen by the search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Categorical post-filters, AND-composed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchFilter<'a> {
    /// Case-insensitive exact notebook name; documents without a notebook
    /// never match when this is set.
    pub notebook: Option<&'a str>,
    /// Exact location string.
    pub location: Option<&'a str>,
}

/// A document's similarity to a query: the better of its title and text
/// matches.
pub fn rank(query: &str, record: &DocumentRecord) -> u32 {
    fuzz::wratio(query, &record.title).max(fuzz::wratio(query, &record.text))
}

/// Search `records` for `query`.
///
/// An empty query is browse mode: every record passing the filters is
/// returned, unranked and uncapped. Otherwise records are scored, those at
/// or below [`SCORE_FLOOR`] are dropped, the best [`RESULT_LIMIT`] are
/// selected, and the filters trim that slice.
pub fn search<'a>(
    query: &str,
    records: &'a [DocumentRecord],
    filter: &SearchFilter,
) -> Vec<&'a DocumentRecord> {
    if query.is_empty() {
        return records.iter().filter(|r| passes(r, filter)).collect();
    }

    let mut top = TopK::new(RESULT_LIMIT);
    for (index, record) in records.iter().enumerate() {
        let score = rank(query, record);
        if score > SCORE_FLOOR {
            top.push(score, index);
        }
    }

    top.into_descending()
        .into_iter()
        .map(|(_, index)| &records[index])
        .filter(|r| passes(r, filter))
        .collect()
}

fn passes(record: &DocumentRecord, filter: &SearchFilter) -> bool {
    if let Some(name) = filter.notebook {
        match record.notebook.as_deref() {
            Some(notebook) if notebook.eq_ignore_ascii_case(name) => {}
            _ => return false,
        }
    }
    if let Some(at) = filter.location {
        if record.location.as_deref() != Some(at) {
            return false;
        }
    }
    true
}

/// Truncate a string for display, appending an ellipsis when it was cut.
pub fn ellipsize(s: &str, limit: usize) -> String {
    if s.chars().count() > limit {
        let mut out: String = s.chars().take(limit).collect();
        out.push_str("...");
        out
    } else {
        s.to_string()
    }
}

/// Fixed-capacity selection of the highest-scoring entries, backed by a
/// min-heap so a large collection is never fully sorted.
struct TopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<(u32, usize)>>,
}

impl TopK {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity + 1),
        }
    }

    fn push(&mut self, score: u32, index: usize) {
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse((score, index)));
        } else if let Some(&Reverse(smallest)) = self.heap.peek() {
            if (score, index) > smallest {
                self.heap.pop();
                self.heap.push(Reverse((score, index)));
            }
        }
    }

    /// Drain into (score, index) pairs, best first.
    fn into_descending(self) -> Vec<(u32, usize)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(entry)| entry)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, text: &str, notebook: Option<&str>, location: Option<&str>) -> DocumentRecord {
        DocumentRecord {
            title: title.to_string(),
            text: text.to_string(),
            notebook: notebook.map(String::from),
            location: location.map(String::from),
        }
    }

    fn sample() -> Vec<DocumentRecord> {
        vec![
            record(
                "Power Bill",
                "Electricity usage 120kWh",
                Some("Home"),
                None,
            ),
            record("Tax Invoice", "GST return", Some("Work"), None),
            record(
                "Workshop Receipt",
                "brake pads and labour",
                None,
                Some("garage"),
            ),
        ]
    }

    #[test]
    fn misspelled_query_finds_the_right_document() {
        let records = sample();
        let hits = search("electricty", &records, &SearchFilter::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Power Bill");
    }

    #[test]
    fn notebook_filter_excludes_other_notebooks() {
        let records = sample();
        let filter = SearchFilter {
            notebook: Some("Work"),
            location: None,
        };
        let hits = search("electricty", &records, &filter);
        assert!(hits.is_empty());
    }

    #[test]
    fn notebook_filter_is_case_insensitive() {
        let records = sample();
        let filter = SearchFilter {
            notebook: Some("home"),
            location: None,
        };
        let hits = search("electricty", &records, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Power Bill");
    }

    #[test]
    fn documents_without_a_notebook_never_match_a_notebook_filter() {
        let records = sample();
        let filter = SearchFilter {
            notebook: Some("Home"),
            location: None,
        };
        let hits = search("", &records, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Power Bill");
    }

    #[test]
    fn location_filter_is_exact() {
        let records = sample();
        let garage = SearchFilter {
            notebook: None,
            location: Some("garage"),
        };
        let hits = search("", &records, &garage);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Workshop Receipt");

        let elsewhere = SearchFilter {
            notebook: None,
            location: Some("Garage"),
        };
        assert!(search("", &records, &elsewhere).is_empty());
    }

    #[test]
    fn empty_query_browses_everything() {
        let records = sample();
        let hits = search("", &records, &SearchFilter::default());
        assert_eq!(hits.len(), records.len());
    }

    #[test]
    fn empty_query_ignores_the_result_cap() {
        let records: Vec<DocumentRecord> = (0..25)
            .map(|i| record(&format!("note {i}"), "", None, None))
            .collect();
        let hits = search("", &records, &SearchFilter::default());
        assert_eq!(hits.len(), 25);
    }

    #[test]
    fn ranked_results_are_capped() {
        let records: Vec<DocumentRecord> = (0..30)
            .map(|_| record("quarterly report", "quarterly report text", None, None))
            .collect();
        let hits = search("quarterly report", &records, &SearchFilter::default());
        assert_eq!(hits.len(), RESULT_LIMIT);
    }

    #[test]
    fn every_ranked_result_beats_the_floor() {
        let records = sample();
        let hits = search("electricty", &records, &SearchFilter::default());
        for hit in hits {
            assert!(rank("electricty", hit) > SCORE_FLOOR);
        }
    }

    #[test]
    fn gibberish_query_matches_nothing() {
        let records = sample();
        let hits = search("zzqqxxyy", &records, &SearchFilter::default());
        assert!(hits.is_empty());
    }

    #[test]
    fn results_come_back_best_first() {
        let records = vec![
            record("power bil", "", None, None),
            record("power bill", "", None, None),
        ];
        let hits = search("power bill", &records, &SearchFilter::default());
        assert_eq!(hits.first().map(|r| r.title.as_str()), Some("power bill"));
    }

    #[test]
    fn topk_keeps_the_largest_scores() {
        let mut top = TopK::new(3);
        for (score, index) in [(10, 0), (90, 1), (40, 2), (70, 3), (85, 4)] {
            top.push(score, index);
        }
        let kept = top.into_descending();
        assert_eq!(
            kept.iter().map(|&(s, _)| s).collect::<Vec<_>>(),
            vec![90, 85, 70]
        );
    }

    #[test]
    fn record_round_trips_through_json() {
        let original = record("Power Bill", "Electricity", Some("Home"), Some("desk"));
        let json = serde_json::to_string(&original).unwrap();
        let parsed: DocumentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn ellipsize_truncates_long_strings() {
        assert_eq!(ellipsize("long string", 5), "long ...");
        assert_eq!(ellipsize("short", 10), "short");
    }
}
