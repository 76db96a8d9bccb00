use crate::models::feature::binarize;
use crate::models::{FeatureKey, FeatureTable, FeatureVector, RepositoryRecord};

/// Builds the sparse attribute vector of one repository.
///
/// Languages carry their byte counts (a repository reporting none gets a
/// single `l_unknown = 0`), topics are presence flags, and the decoded README
/// is kept outside the feature space.
pub fn build_vector(record: &RepositoryRecord) -> FeatureVector {
    let mut vector = FeatureVector::new(record.full_name());

    if record.languages.is_empty() {
        vector.features.insert(FeatureKey::unknown_language(), 0.0);
    } else {
        for (language, bytes) in &record.languages {
            *vector
                .features
                .entry(FeatureKey::language(language))
                .or_insert(0.0) += *bytes as f64;
        }
    }

    for topic in &record.topics {
        vector.features.insert(FeatureKey::topic(topic), 1.0);
    }

    vector.readme = record.readme_text();
    vector
}

/// One column per record over the union of all feature keys
pub fn build_table(records: &[RepositoryRecord]) -> FeatureTable {
    let vectors: Vec<FeatureVector> = records.iter().map(build_vector).collect();
    FeatureTable::from_vectors(&vectors)
}

/// Collapses a user's repository vectors into one representative vector.
///
/// Vectors are summed feature-wise and then binarized: what matters is
/// whether the user has used a language or topic at all, not how often.
pub fn aggregate_user(username: &str, vectors: &[FeatureVector]) -> FeatureVector {
    let mut user = FeatureVector::new(username);

    for vector in vectors {
        for (key, value) in &vector.features {
            *user.features.entry(key.clone()).or_insert(0.0) += value;
        }
    }

    binarize(user.features.values_mut());

    user
}
