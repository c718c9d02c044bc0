use std::collections::HashMap;

use nl_core::similarity::normalized;

/// Ephemeral nearest-neighbor structure over one batch's embeddings.
///
/// Built once per pipeline run and discarded after ranking. Vectors are
/// L2-normalized at insert so similarity queries reduce to dot products.
/// Batches are small, so queries are brute force.
pub struct SimilarityIndex {
    ids: Vec<String>,
    vectors: Vec<Vec<f32>>,
    by_id: HashMap<String, usize>,
}

impl SimilarityIndex {
    /// Build the index from `(identifier, vector)` pairs. A repeated
    /// identifier keeps its first vector; records are immutable once
    /// fetched, so a repeat is the same record seen twice.
    pub fn build<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut ids = Vec::new();
        let mut vectors = Vec::new();
        let mut by_id = HashMap::new();

        for (id, vector) in items {
            if by_id.contains_key(&id) {
                continue;
            }
            by_id.insert(id.clone(), ids.len());
            ids.push(id);
            vectors.push(normalized(vector));
        }

        Self {
            ids,
            vectors,
            by_id,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Similarity between two indexed records, `None` if either is absent.
    pub fn similarity(&self, a: &str, b: &str) -> Option<f32> {
        let va = &self.vectors[*self.by_id.get(a)?];
        let vb = &self.vectors[*self.by_id.get(b)?];
        Some(dot(va, vb))
    }

    /// The `k` nearest neighbors of an indexed record, most similar first.
    /// The record itself is excluded.
    pub fn nearest(&self, id: &str, k: usize) -> Vec<(&str, f32)> {
        let Some(&pos) = self.by_id.get(id) else {
            return Vec::new();
        };
        let query = &self.vectors[pos];

        let mut neighbors: Vec<(&str, f32)> = self
            .ids
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != pos)
            .map(|(i, other)| (other.as_str(), dot(query, &self.vectors[i])))
            .collect();

        neighbors.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        neighbors.truncate(k);
        neighbors
    }

    /// Highest similarity between `id` and any record in `others`. `None`
    /// when `others` is empty or nothing matches the index.
    pub fn max_similarity<'a, I>(&self, id: &str, others: I) -> Option<f32>
    where
        I: IntoIterator<Item = &'a str>,
    {
        others
            .into_iter()
            .filter_map(|other| self.similarity(id, other))
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
