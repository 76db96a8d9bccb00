pub mod combiner;
pub mod extraction;
pub mod github;
pub mod pos;
pub mod recommender;
pub mod similarity;
pub mod stopwords;
pub mod tfidf;
pub mod tokenizer;
pub mod vectorizer;

pub use combiner::{RankedRepository, SignalScores, SignalWeights};
pub use extraction::{extract_repositories, extract_user};
pub use github::{GithubSource, RepositorySource, SourceListing};
pub use pos::{LexiconTagger, PosTagger};
pub use recommender::{Recommendations, Recommender, RecommenderSettings};
