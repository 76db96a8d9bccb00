use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt::Display;

/// Which part of the attribute space a feature belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureKind {
    Language,
    Topic,
}

impl FeatureKind {
    pub fn prefix(self) -> &'static str {
        match self {
            FeatureKind::Language => "l_",
            FeatureKind::Topic => "t_",
        }
    }
}

/// One dimension of the sparse attribute space, rendered as `l_<language>`
/// or `t_<topic>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureKey {
    kind: FeatureKind,
    name: String,
}

impl FeatureKey {
    pub fn language(name: &str) -> Self {
        Self {
            kind: FeatureKind::Language,
            name: name.to_lowercase(),
        }
    }

    pub fn topic(name: &str) -> Self {
        Self {
            kind: FeatureKind::Topic,
            name: name.to_lowercase(),
        }
    }

    /// Placeholder for repositories that report no languages
    pub fn unknown_language() -> Self {
        Self::language("unknown")
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for FeatureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.name)
    }
}

/// Sparse attribute vector for one repository or one user, plus the raw
/// README text kept outside the feature space
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    pub label: String,
    pub features: BTreeMap<FeatureKey, f64>,
    pub readme: Option<String>,
}

impl FeatureVector {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn get(&self, key: &FeatureKey) -> f64 {
        self.features.get(key).copied().unwrap_or(0.0)
    }
}

/// Column-oriented table of feature vectors over a shared, sorted key index.
/// Missing entries are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    keys: Vec<FeatureKey>,
    labels: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn from_vectors(vectors: &[FeatureVector]) -> Self {
        let keys: Vec<FeatureKey> = vectors
            .iter()
            .flat_map(|v| v.features.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = vectors
            .iter()
            .map(|v| keys.iter().map(|k| v.get(k)).collect())
            .collect();

        Self {
            keys,
            labels: vectors.iter().map(|v| v.label.clone()).collect(),
            columns,
        }
    }

    pub fn keys(&self) -> &[FeatureKey] {
        &self.keys
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn column(&self, idx: usize) -> &[f64] {
        &self.columns[idx]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Drops the named columns. The key index is kept as is, so features
    /// seen only in dropped columns stay as zero rows.
    pub fn excluding(&self, excluded: &HashSet<String>) -> Self {
        let (labels, columns) = self
            .labels
            .iter()
            .zip(&self.columns)
            .filter(|(label, _)| !excluded.contains(*label))
            .map(|(label, column)| (label.clone(), column.clone()))
            .unzip();

        Self {
            keys: self.keys.clone(),
            labels,
            columns,
        }
    }

    /// Re-indexes the table and the user vector onto the union of their keys,
    /// filling absent features with zero. Every vector operation between a
    /// user and the table goes through this.
    pub fn align(&self, user: &FeatureVector) -> AlignedFeatures {
        let keys: Vec<FeatureKey> = self
            .keys
            .iter()
            .chain(user.features.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let position: HashMap<&FeatureKey, usize> =
            keys.iter().enumerate().map(|(i, k)| (k, i)).collect();

        let columns = self
            .columns
            .iter()
            .map(|column| {
                let mut aligned = vec![0.0; keys.len()];
                for (key, value) in self.keys.iter().zip(column) {
                    aligned[position[key]] = *value;
                }
                aligned
            })
            .collect();

        let user_values = keys.iter().map(|k| user.get(k)).collect();

        AlignedFeatures {
            keys,
            user: user_values,
            labels: self.labels.clone(),
            columns,
        }
    }
}

/// A user vector and repository columns sharing one key index
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFeatures {
    pub keys: Vec<FeatureKey>,
    pub user: Vec<f64>,
    pub labels: Vec<String>,
    pub columns: Vec<Vec<f64>>,
}

impl AlignedFeatures {
    /// Keeps only the rows of one feature kind
    pub fn restrict(&self, kind: FeatureKind) -> Self {
        let rows: Vec<usize> = self
            .keys
            .iter()
            .enumerate()
            .filter(|(_, k)| k.kind() == kind)
            .map(|(i, _)| i)
            .collect();
        let pick = |values: &[f64]| rows.iter().map(|&i| values[i]).collect::<Vec<f64>>();

        Self {
            keys: rows.iter().map(|&i| self.keys[i].clone()).collect(),
            user: pick(&self.user),
            labels: self.labels.clone(),
            columns: self.columns.iter().map(|c| pick(c)).collect(),
        }
    }

    /// Presence flags: every nonzero entry becomes 1
    pub fn binarized(mut self) -> Self {
        binarize(&mut self.user);
        for column in &mut self.columns {
            binarize(column);
        }
        self
    }
}

pub fn binarize<'a>(values: impl IntoIterator<Item = &'a mut f64>) {
    for value in values {
        if *value != 0.0 {
            *value = 1.0;
        }
    }
}
