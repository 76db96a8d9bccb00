//! TF-IDF document vectors and README similarity.
//!
//! The vectorizer mirrors the defaults the scoring was tuned against:
//! ```text
//! tokens   = runs of 2+ word characters, lowercased, stop words removed
//! tf(t, d) = raw count of t in d
//! idf(t)   = ln((1 + n) / (1 + df(t))) + 1
//! row      = tf * idf, L2-normalized
//! ```
//! Terms are pruned by document frequency (`min_df <= df <= max_df * n`)
//! and the vocabulary is capped at `max_features` terms by corpus frequency.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use super::combiner::normalize;
use super::similarity::{cosine, l2_norm};
use super::stopwords::StopWords;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

pub const DEFAULT_MIN_DF: usize = 2;
pub const DEFAULT_MAX_DF: f64 = 0.95;

/// Dense document vector over the fitted vocabulary
pub type DocumentVector = Vec<f64>;

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
    min_df: usize,
    max_df: f64,
    stop_words: StopWords,
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            min_df: DEFAULT_MIN_DF,
            max_df: DEFAULT_MAX_DF,
            stop_words: StopWords::english(),
            vocabulary: Vec::new(),
            index: HashMap::new(),
            idf: Vec::new(),
        }
    }

    /// Fraction of documents above which a term is ignored
    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.max_df = max_df.clamp(0.0, 1.0);
        self
    }

    /// Sorted vocabulary; position is the vector dimension
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    fn analyze(&self, document: &str) -> Vec<String> {
        let lowered = document.to_lowercase();
        TOKEN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(t))
            .map(str::to_string)
            .collect()
    }

    /// Learns the vocabulary and idf weights, then vectorizes the same
    /// documents. When pruning leaves no terms every vector is empty.
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Vec<DocumentVector> {
        let analyzed: Vec<Vec<String>> = documents.iter().map(|d| self.analyze(d.as_ref())).collect();
        self.fit_analyzed(&analyzed);
        analyzed.iter().map(|tokens| self.vectorize(tokens)).collect()
    }

    fn fit_analyzed(&mut self, analyzed: &[Vec<String>]) {
        let n_docs = analyzed.len();
        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();

        for tokens in analyzed {
            let mut seen: HashSet<&str> = HashSet::new();
            for token in tokens {
                *term_freq.entry(token.as_str()).or_insert(0) += 1;
                if seen.insert(token.as_str()) {
                    *doc_freq.entry(token.as_str()).or_insert(0) += 1;
                }
            }
        }

        let max_doc_count = self.max_df * n_docs as f64;
        let mut kept: Vec<(&str, usize)> = term_freq
            .into_iter()
            .filter(|(term, _)| {
                let df = doc_freq[term];
                df >= self.min_df && (df as f64) <= max_doc_count
            })
            .collect();

        kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        kept.truncate(self.max_features);

        let mut vocabulary: Vec<String> = kept.into_iter().map(|(t, _)| t.to_string()).collect();
        vocabulary.sort();

        self.idf = vocabulary
            .iter()
            .map(|term| {
                let df = doc_freq[term.as_str()] as f64;
                ((1.0 + n_docs as f64) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.index = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        self.vocabulary = vocabulary;

        tracing::debug!(
            documents = n_docs,
            vocabulary = self.vocabulary.len(),
            "Fitted TF-IDF vocabulary"
        );
    }

    fn vectorize(&self, tokens: &[String]) -> DocumentVector {
        let mut vector = vec![0.0; self.vocabulary.len()];
        for token in tokens {
            if let Some(&idx) = self.index.get(token) {
                vector[idx] += 1.0;
            }
        }
        for (value, idf) in vector.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = l2_norm(&vector);
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

/// Fits one vectorizer over user and repository READMEs together and splits
/// the rows back, preserving each side's order
pub fn tfidf<S: AsRef<str>>(
    user_texts: &[S],
    repo_texts: &[S],
    max_features: usize,
) -> (Vec<DocumentVector>, Vec<DocumentVector>) {
    let documents: Vec<&str> = user_texts
        .iter()
        .chain(repo_texts)
        .map(|s| s.as_ref())
        .collect();

    let mut rows = TfidfVectorizer::new(max_features).fit_transform(&documents);
    let repo_rows = rows.split_off(user_texts.len());
    (rows, repo_rows)
}

/// Cosine similarity of each repository vector against the user's mean
/// README vector, min-max normalized first. Users without READMEs and empty
/// repository vectors score 0.
pub fn readme_similarity(user_vectors: &[DocumentVector], repo_vectors: &[DocumentVector]) -> Vec<f64> {
    let Some(first) = user_vectors.first() else {
        return vec![0.0; repo_vectors.len()];
    };

    let mut mean = vec![0.0; first.len()];
    for vector in user_vectors {
        for (m, v) in mean.iter_mut().zip(vector) {
            *m += v;
        }
    }
    let count = user_vectors.len() as f64;
    for m in &mut mean {
        *m /= count;
    }
    let mean = normalize(&mean);

    repo_vectors.iter().map(|r| cosine(r, &mean)).collect()
}
