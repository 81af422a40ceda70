// obscene.rs — Obscene Filter (C6). spec.md §4.6.
//
// Converted from: myq2-common's hand-rolled multi-pattern scan in
// `q_shared.rs` (`COM_` string-table lookups over a small fixed word
// list) combined with zone-common's file/crc helpers for the
// hot-reload-on-change policy spec.md §4.6 and §7 call for by name.

use std::path::Path;

use zone_common::crc32::crc32_block;
use zone_common::files::load_file_with_retry;
use zone_common::log::zlog_warn;

/// Scramble table the filter cycles through as it blots out matched
/// characters (spec.md §4.6 "overwrite each matched character with the
/// next byte from a fixed scramble table").
const SCRAMBLE_TABLE: &[u8] = b"#$%&@!*";

/// Parses `obscene.txt`: one lowercase word per line, `#`-prefixed lines
/// ignored (spec.md §4.6).
pub fn parse_word_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_lowercase())
        .collect()
}

pub struct ObsceneFilter {
    words: Vec<String>,
    cached_crc: u32,
    scramble_counter: usize,
}

impl ObsceneFilter {
    pub fn new() -> Self {
        Self { words: Vec::new(), cached_crc: 0, scramble_counter: 0 }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// spec.md §4.6 "reload when the file's CRC32 differs from the
    /// cached value"; §7 "retry with backoff up to 10 times then log and
    /// continue with the last-known list".
    pub fn reload_if_changed(&mut self, path: &Path) {
        let Some(bytes) = load_file_with_retry(path) else {
            zlog_warn(&format!("obscene list unavailable, keeping last-known ({} words)", self.words.len()));
            return;
        };
        let crc = crc32_block(&bytes);
        if crc == self.cached_crc && !self.words.is_empty() {
            return;
        }
        let content = String::from_utf8_lossy(&bytes);
        self.words = parse_word_list(&content);
        self.cached_crc = crc;
    }

    /// spec.md §4.6 `filter(line)`: scans for the earliest pattern match
    /// at each position and scrambles matched characters in place.
    /// Returns whether anything changed.
    pub fn filter(&mut self, line: &mut String) -> bool {
        if self.words.is_empty() {
            return false;
        }
        let mut chars: Vec<char> = line.chars().collect();
        let lower: Vec<char> = chars.iter().map(|c| c.to_ascii_lowercase()).collect();
        let mut changed = false;
        let mut i = 0;
        while i < chars.len() {
            if let Some(word_len) = self.earliest_match_len(&lower[i..]) {
                for offset in 0..word_len {
                    chars[i + offset] = self.next_scramble_char() as char;
                }
                changed = true;
                i += word_len;
            } else {
                i += 1;
            }
        }
        if changed {
            *line = chars.into_iter().collect();
        }
        changed
    }

    fn earliest_match_len(&self, remaining_lower: &[char]) -> Option<usize> {
        self.words
            .iter()
            .filter(|w| remaining_lower.len() >= w.chars().count())
            .find(|w| remaining_lower.iter().zip(w.chars()).all(|(a, b)| *a == b))
            .map(|w| w.chars().count())
    }

    fn next_scramble_char(&mut self) -> u8 {
        let c = SCRAMBLE_TABLE[self.scramble_counter % SCRAMBLE_TABLE.len()];
        self.scramble_counter += 1;
        c
    }
}

impl Default for ObsceneFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_words_and_skips_comments() {
        let words = parse_word_list("# comment\nidiot\n\nLAMER\n");
        assert_eq!(words, vec!["idiot".to_string(), "lamer".to_string()]);
    }

    #[test]
    fn filter_scrambles_matched_word_case_insensitively() {
        let mut filter = ObsceneFilter::new();
        filter.words = vec!["idiot".to_string()];
        let mut line = "you IDIOT really".to_string();
        let changed = filter.filter(&mut line);
        assert!(changed);
        assert!(!line.to_lowercase().contains("idiot"));
        assert_eq!(line.len(), "you IDIOT really".len());
    }

    #[test]
    fn filter_returns_false_when_nothing_matches() {
        let mut filter = ObsceneFilter::new();
        filter.words = vec!["idiot".to_string()];
        let mut line = "hello world".to_string();
        assert!(!filter.filter(&mut line));
        assert_eq!(line, "hello world");
    }

    #[test]
    fn reload_skips_when_crc_unchanged() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("zone_core_obscene_test_{}.txt", std::process::id()));
        std::fs::write(&path, b"idiot\n").unwrap();

        let mut filter = ObsceneFilter::new();
        filter.reload_if_changed(&path);
        assert_eq!(filter.words(), &["idiot".to_string()]);

        std::fs::write(&path, b"idiot\n").unwrap();
        filter.reload_if_changed(&path);
        assert_eq!(filter.words(), &["idiot".to_string()]);

        std::fs::write(&path, b"idiot\nlamer\n").unwrap();
        filter.reload_if_changed(&path);
        assert_eq!(filter.words(), &["idiot".to_string(), "lamer".to_string()]);

        let _ = std::fs::remove_file(&path);
    }
}
