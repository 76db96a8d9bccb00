use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Default Penn Treebank tag: singular common noun
pub const COMMON_NOUN: &str = "NN";

/// Part-of-speech tagging capability
///
/// Tags are Penn Treebank tags (`NN`, `NNS`, `VB`, ...). Implementations must
/// return one tag per input word, in order.
pub trait PosTagger: Send + Sync {
    fn tag(&self, words: &[&str]) -> Vec<String>;
}

/// Dictionary tagger backed by a word-to-tag lexicon.
///
/// Words missing from the lexicon receive the default tag.
#[derive(Debug, Clone)]
pub struct LexiconTagger {
    lexicon: HashMap<String, String>,
    default_tag: String,
}

impl Default for LexiconTagger {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

impl LexiconTagger {
    pub fn new(lexicon: HashMap<String, String>) -> Self {
        Self {
            lexicon,
            default_tag: COMMON_NOUN.to_string(),
        }
    }

    pub fn with_default_tag(mut self, tag: &str) -> Self {
        self.default_tag = tag.to_string();
        self
    }

    /// Reads `word<TAB>TAG` lines. Blank lines and `#` comments are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> AppResult<Self> {
        let mut lexicon = HashMap::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(word), Some(tag)) => {
                    lexicon.insert(word.to_lowercase(), tag.to_string());
                }
                _ => {
                    return Err(AppError::InvalidInput(format!(
                        "lexicon line {} must be `word<TAB>TAG`",
                        line_no + 1
                    )))
                }
            }
        }

        tracing::debug!(entries = lexicon.len(), "Loaded part-of-speech lexicon");
        Ok(Self::new(lexicon))
    }

    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.lexicon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }
}

impl PosTagger for LexiconTagger {
    fn tag(&self, words: &[&str]) -> Vec<String> {
        words
            .iter()
            .map(|w| {
                self.lexicon
                    .get(*w)
                    .cloned()
                    .unwrap_or_else(|| self.default_tag.clone())
            })
            .collect()
    }
}

/// Keeps only words whose tag is listed in the space-separated `whitelist`
pub fn filter_pos(text: &str, tagger: &dyn PosTagger, whitelist: &str) -> String {
    let allowed: Vec<&str> = whitelist.split_whitespace().collect();
    let words: Vec<&str> = text.split_whitespace().collect();
    let tags = tagger.tag(&words);

    words
        .iter()
        .zip(&tags)
        .filter(|(_, tag)| allowed.contains(&tag.as_str()))
        .map(|(word, _)| *word)
        .collect::<Vec<_>>()
        .join(" ")
}
