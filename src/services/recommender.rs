use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::models::{FeatureTable, FeatureVector, RepositoryRecord};

use super::combiner::{combine, RankedRepository, SignalScores, SignalWeights};
use super::pos::{filter_pos, PosTagger, COMMON_NOUN};
use super::similarity::{language_similarity, topic_similarity};
use super::tfidf::{readme_similarity, tfidf};
use super::tokenizer::tokenize;
use super::vectorizer::{aggregate_user, build_vector};

/// Tunable parameters of the scoring pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderSettings {
    /// TF-IDF vocabulary cap
    pub max_features: usize,
    pub min_token_length: usize,
    /// Space-separated part-of-speech tags kept in READMEs
    pub pos_whitelist: String,
    pub weights: SignalWeights,
    /// Default number of recommendations to present
    pub top_n: usize,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            max_features: 3000,
            min_token_length: 3,
            pos_whitelist: COMMON_NOUN.to_string(),
            weights: SignalWeights::default(),
            top_n: 10,
        }
    }
}

/// Tokenizes a README and keeps the whitelisted parts of speech
pub fn prepare_readme(
    text: Option<&str>,
    settings: &RecommenderSettings,
    tagger: &dyn PosTagger,
) -> String {
    let tokens = tokenize(text, settings.min_token_length);
    filter_pos(&tokens, tagger, &settings.pos_whitelist)
}

/// Candidate repositories prepared once and shared by every request
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    table: FeatureTable,
    /// Prepared README token strings, one per table column
    readmes: Vec<String>,
}

impl Corpus {
    pub fn build(
        records: &[RepositoryRecord],
        settings: &RecommenderSettings,
        tagger: &dyn PosTagger,
    ) -> Self {
        let vectors: Vec<FeatureVector> = records.iter().map(build_vector).collect();
        let readmes = vectors
            .iter()
            .map(|v| prepare_readme(v.readme.as_deref(), settings, tagger))
            .collect();

        Self {
            table: FeatureTable::from_vectors(&vectors),
            readmes,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Result of one recommendation request
#[derive(Debug, Clone)]
pub struct Recommendations {
    /// Number of candidates that were scored
    pub total: usize,
    /// All candidates, best first
    pub ranked: Vec<RankedRepository>,
}

impl Recommendations {
    pub fn top(&self, n: usize) -> &[RankedRepository] {
        &self.ranked[..n.min(self.ranked.len())]
    }
}

/// Scores candidate repositories against one user's repositories.
///
/// Holds only read-only state, so one instance serves concurrent requests.
pub struct Recommender {
    settings: RecommenderSettings,
    tagger: Arc<dyn PosTagger>,
    corpus: Corpus,
}

impl Recommender {
    pub fn new(
        settings: RecommenderSettings,
        tagger: Arc<dyn PosTagger>,
        repositories: &[RepositoryRecord],
    ) -> Self {
        let start = Instant::now();
        let corpus = Corpus::build(repositories, &settings, tagger.as_ref());

        tracing::info!(
            repositories = corpus.len(),
            features = corpus.table.keys().len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Repository corpus prepared"
        );

        Self {
            settings,
            tagger,
            corpus,
        }
    }

    pub fn settings(&self) -> &RecommenderSettings {
        &self.settings
    }

    pub fn corpus_size(&self) -> usize {
        self.corpus.len()
    }

    /// Ranks every candidate the user does not already own, star or watch
    pub fn recommend(&self, username: &str, user_records: &[RepositoryRecord]) -> Recommendations {
        let start = Instant::now();

        let user_vectors: Vec<FeatureVector> = user_records.iter().map(build_vector).collect();
        let user = aggregate_user(username, &user_vectors);
        let owned: HashSet<String> = user_vectors.iter().map(|v| v.label.clone()).collect();

        let candidates = self.corpus.table.excluding(&owned);
        let language = language_similarity(&user, &candidates);
        let topic = topic_similarity(&user, &candidates);
        let readme = self.readme_scores(&user_vectors, &owned);

        let scores: Vec<SignalScores> = candidates
            .labels()
            .iter()
            .zip(language)
            .zip(topic)
            .zip(readme)
            .map(|(((repository, language), topic), readme)| SignalScores {
                repository: repository.clone(),
                language,
                topic,
                readme,
            })
            .collect();

        let ranked = combine(scores, &self.settings.weights);

        tracing::info!(
            username = %username,
            user_repositories = user_records.len(),
            excluded = self.corpus.len() - candidates.len(),
            candidates = ranked.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Recommendations computed"
        );

        Recommendations {
            total: ranked.len(),
            ranked,
        }
    }

    /// README similarity of the non-owned corpus rows, in table order. The
    /// vectorizer is fitted on every README, owned ones included.
    fn readme_scores(&self, user_vectors: &[FeatureVector], owned: &HashSet<String>) -> Vec<f64> {
        let user_texts: Vec<String> = user_vectors
            .iter()
            .map(|v| prepare_readme(v.readme.as_deref(), &self.settings, self.tagger.as_ref()))
            .collect();

        let (user_docs, repo_docs) = tfidf(&user_texts, &self.corpus.readmes, self.settings.max_features);

        let candidate_docs: Vec<Vec<f64>> = self
            .corpus
            .table
            .labels()
            .iter()
            .zip(repo_docs)
            .filter(|(label, _)| !owned.contains(*label))
            .map(|(_, doc)| doc)
            .collect();

        readme_similarity(&user_docs, &candidate_docs)
    }
}
