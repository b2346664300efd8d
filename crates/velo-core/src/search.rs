//! Search strategies over the note collection.
//!
//! The notebook delegates matching to a pluggable [`SearchStrategy`]. The
//! default, [`BruteForce`], splits the query on whitespace and requires
//! every word to appear in either the title or the contents of a note
//! (AND across words, OR within a word across title/contents).
//!
//! ## Per-word case sensitivity
//!
//! An all-lowercase word is treated as a case-insensitivity hint, while a
//! word with any uppercase letter signals that the user wants an
//! exact-case match. This is a deliberate usability trade-off, not a
//! general-purpose query language.

use crate::note::Note;

/// A pluggable matching function over the notebook's note collection.
///
/// Strategies receive a point-in-time snapshot of the collection, so they
/// never observe a concurrent add or remove mid-search. Matches must be
/// returned in the snapshot's order; any secondary ordering (e.g. by
/// modification time) is a caller concern.
pub trait SearchStrategy: Send + Sync {
    /// Return every note in `notes` that matches `query`.
    fn search(&self, notes: &[Note], query: &str) -> Vec<Note>;
}

/// The default brute-force substring strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForce;

impl SearchStrategy for BruteForce {
    fn search(&self, notes: &[Note], query: &str) -> Vec<Note> {
        let words: Vec<&str> = query.split_whitespace().collect();
        if words.is_empty() {
            // Zero words match everything
            return notes.to_vec();
        }

        let mut matches = Vec::new();
        for note in notes {
            let title = note.title();
            let contents = note.contents();
            let title_lower = title.to_lowercase();
            let contents_lower = contents.to_lowercase();

            let all_match = words.iter().all(|word| {
                if is_lowercase_word(word) {
                    title_lower.contains(word) || contents_lower.contains(word)
                } else {
                    title.contains(word) || contents.contains(word)
                }
            });
            if all_match {
                matches.push(note.clone());
            }
        }
        matches
    }
}

/// True when the word contains at least one cased character and none of
/// them is uppercase. A word with no cased characters at all (e.g. "2025")
/// compares case-sensitively, which is equivalent either way.
fn is_lowercase_word(word: &str) -> bool {
    word.chars().any(char::is_lowercase) && !word.chars().any(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_note(dir: &TempDir, title: &str, contents: &str) -> Note {
        let path = dir.path().join(format!("{title}.txt"));
        fs::write(&path, contents).unwrap();
        Note::new(title.to_string(), ".txt".to_string(), path)
    }

    fn corpus(dir: &TempDir) -> Vec<Note> {
        vec![
            make_note(dir, "first_note", "This is the first note"),
            make_note(dir, "second_note", "Second note with More content"),
            make_note(dir, "meeting_2025", "meeting notes from 2025 planning"),
        ]
    }

    #[test]
    fn test_empty_query_matches_all() {
        let dir = TempDir::new().unwrap();
        let notes = corpus(&dir);
        let results = BruteForce.search(&notes, "");
        assert_eq!(results.len(), 3);

        let results = BruteForce.search(&notes, "   ");
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_match_by_title() {
        let dir = TempDir::new().unwrap();
        let notes = corpus(&dir);
        let results = BruteForce.search(&notes, "first");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "first_note");
    }

    #[test]
    fn test_match_by_contents() {
        let dir = TempDir::new().unwrap();
        let notes = corpus(&dir);
        let results = BruteForce.search(&notes, "planning");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "meeting_2025");
    }

    #[test]
    fn test_lowercase_word_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let notes = corpus(&dir);
        // "more" only appears as "More" in the contents
        let results = BruteForce.search(&notes, "more");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "second_note");
    }

    #[test]
    fn test_uppercase_word_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        let notes = corpus(&dir);
        // "Second" exists, "SECOND" does not
        assert!(BruteForce.search(&notes, "SECOND").is_empty());
        assert_eq!(BruteForce.search(&notes, "Second").len(), 1);
    }

    #[test]
    fn test_multi_word_query_requires_all_words() {
        let dir = TempDir::new().unwrap();
        let notes = corpus(&dir);
        let results = BruteForce.search(&notes, "meeting 2025");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "meeting_2025");

        assert!(BruteForce.search(&notes, "meeting first").is_empty());
    }

    #[test]
    fn test_word_matches_title_or_contents() {
        let dir = TempDir::new().unwrap();
        let notes = corpus(&dir);
        // "note" appears in every title and most contents
        let results = BruteForce.search(&notes, "note");
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_no_results() {
        let dir = TempDir::new().unwrap();
        let notes = corpus(&dir);
        assert!(BruteForce.search(&notes, "nonexistent").is_empty());
    }

    #[test]
    fn test_results_preserve_collection_order() {
        let dir = TempDir::new().unwrap();
        let notes = corpus(&dir);
        let results = BruteForce.search(&notes, "note");
        let titles: Vec<&str> = results.iter().map(Note::title).collect();
        assert_eq!(titles, ["first_note", "second_note", "meeting_2025"]);
    }

    #[test]
    fn test_uncased_word() {
        let dir = TempDir::new().unwrap();
        let notes = corpus(&dir);
        let results = BruteForce.search(&notes, "2025");
        assert_eq!(results.len(), 1);
        assert!(!is_lowercase_word("2025"));
    }
}
