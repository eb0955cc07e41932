//! Word-window chunking of long text
//!
//! Text is tokenized on whitespace and split into overlapping windows of at
//! most `max_words` words. Text that already fits is passed through as-is so
//! short inputs embed exactly like a direct model call.

use serde::{Deserialize, Serialize};

use crate::data::ConfigError;

pub const DEFAULT_MAX_WORDS: usize = 200;
pub const DEFAULT_OVERLAP_WORDS: usize = 50;

/// Chunk window sizes, in words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    max_words: usize,
    overlap_words: usize,
}

impl ChunkerConfig {
    /// Validates and builds a chunker configuration.
    ///
    /// `overlap_words >= max_words` would stop the window from advancing, so
    /// it is rejected here rather than at chunking time.
    pub fn new(max_words: usize, overlap_words: usize) -> Result<Self, ConfigError> {
        if max_words == 0 || overlap_words >= max_words {
            return Err(ConfigError::InvalidChunking { max_words, overlap_words });
        }
        Ok(Self { max_words, overlap_words })
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    pub fn overlap_words(&self) -> usize {
        self.overlap_words
    }

    /// How far each window start advances past the previous one.
    pub fn stride(&self) -> usize {
        self.max_words - self.overlap_words
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_words: DEFAULT_MAX_WORDS,
            overlap_words: DEFAULT_OVERLAP_WORDS,
        }
    }
}

/// Splits `text` into overlapping word windows.
///
/// Returns the input unchanged as the only chunk when it has at most
/// `max_words` words. Otherwise every chunk is the space-joined slice
/// `words[start..start + max_words]`, clipped at the end, with consecutive
/// starts `max_words - overlap_words` apart.
pub fn chunk_text(text: &str, config: &ChunkerConfig) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();

    if words.len() <= config.max_words {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::with_capacity(words.len() / config.stride() + 1);
    let mut start = 0;
    loop {
        let end = (start + config.max_words).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start = end - config.overlap_words;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbered_words(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("w{}", i)).collect()
    }

    /// Rebuilds the word sequence by dropping each later chunk's overlap prefix.
    fn reconstruct(chunks: &[String], overlap: usize) -> Vec<String> {
        let mut words: Vec<String> = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let skip = if i == 0 { 0 } else { overlap };
            words.extend(chunk.split_whitespace().skip(skip).map(str::to_string));
        }
        words
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_window() {
        assert!(ChunkerConfig::new(50, 50).is_err());
        assert!(ChunkerConfig::new(50, 80).is_err());
        assert!(ChunkerConfig::new(0, 0).is_err());
        assert!(ChunkerConfig::new(50, 49).is_ok());
        assert!(ChunkerConfig::new(1, 0).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = ChunkerConfig::default();
        assert_eq!(config.max_words(), 200);
        assert_eq!(config.overlap_words(), 50);
        assert_eq!(config.stride(), 150);
    }

    #[test]
    fn test_short_text_is_returned_unchanged() {
        let config = ChunkerConfig::default();
        let text = "  Buy milk.\n\tand   eggs  ";
        assert_eq!(chunk_text(text, &config), vec![text.to_string()]);
    }

    #[test]
    fn test_exactly_max_words_is_single_chunk() {
        let config = ChunkerConfig::new(10, 3).unwrap();
        let text = numbered_words(10).join(" ");
        assert_eq!(chunk_text(&text, &config), vec![text.clone()]);
    }

    #[test]
    fn test_empty_text_is_single_chunk() {
        let config = ChunkerConfig::default();
        assert_eq!(chunk_text("", &config), vec![String::new()]);
    }

    #[test]
    fn test_window_layout() {
        let config = ChunkerConfig::new(4, 1).unwrap();
        let text = numbered_words(10).join(" ");
        let chunks = chunk_text(&text, &config);
        assert_eq!(
            chunks,
            vec![
                "w0 w1 w2 w3".to_string(),
                "w3 w4 w5 w6".to_string(),
                "w6 w7 w8 w9".to_string(),
            ]
        );
    }

    #[test]
    fn test_final_window_is_clipped() {
        let config = ChunkerConfig::new(4, 2).unwrap();
        let text = numbered_words(7).join(" ");
        let chunks = chunk_text(&text, &config);
        assert_eq!(
            chunks,
            vec![
                "w0 w1 w2 w3".to_string(),
                "w2 w3 w4 w5".to_string(),
                "w4 w5 w6".to_string(),
            ]
        );
    }

    #[test]
    fn test_long_text_reconstructs_and_respects_bounds() {
        for (max_words, overlap) in [(200, 50), (7, 3), (5, 0), (3, 2)] {
            let config = ChunkerConfig::new(max_words, overlap).unwrap();
            for count in [max_words + 1, max_words * 3, max_words * 5 + 2, 1013] {
                let words = numbered_words(count);
                let chunks = chunk_text(&words.join(" "), &config);
                assert!(chunks.len() > 1);
                for chunk in &chunks {
                    assert!(chunk.split_whitespace().count() <= max_words);
                }
                assert_eq!(reconstruct(&chunks, overlap), words, "max={} overlap={} count={}", max_words, overlap, count);
            }
        }
    }

    #[test]
    fn test_whitespace_is_normalized_for_long_text() {
        let config = ChunkerConfig::new(3, 1).unwrap();
        let a = chunk_text("one two three four five", &config);
        let b = chunk_text("one\ttwo\n\nthree   four five ", &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_deterministic() {
        let config = ChunkerConfig::new(6, 2).unwrap();
        let text = numbered_words(40).join(" ");
        assert_eq!(chunk_text(&text, &config), chunk_text(&text, &config));
    }
}
