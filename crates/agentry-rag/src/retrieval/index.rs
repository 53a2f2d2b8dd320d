//! Exact L2 index over raw vectors

use crate::error::{RagError, RagResult};

/// Brute-force nearest-neighbour index using squared L2 distance
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatL2Index {
    /// Empty index for `dimension`-sized vectors
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Vector size
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append vectors; ids are assigned in insertion order
    ///
    /// Nothing is added if any vector has the wrong size.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> RagResult<()> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(RagError::validation(
                "vector_dimension",
                format!("must be {}", self.dimension),
                bad.len().to_string(),
            ));
        }
        self.vectors.extend(vectors.iter().cloned());
        Ok(())
    }

    /// The `k` nearest vectors as `(distance, id)`, closest first
    pub fn search(&self, query: &[f32], k: usize) -> RagResult<Vec<(f32, usize)>> {
        if query.len() != self.dimension {
            return Err(RagError::validation(
                "query_dimension",
                format!("must be {}", self.dimension),
                query.len().to_string(),
            ));
        }

        let mut hits: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, v)| {
                let distance = v.iter().zip(query).map(|(a, b)| (a - b).powi(2)).sum();
                (distance, id)
            })
            .collect();

        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.truncate(k);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_orders_by_distance() {
        let mut index = FlatL2Index::new(2);
        index
            .add(&[vec![0.0, 0.0], vec![5.0, 5.0], vec![1.0, 0.0]])
            .unwrap();

        let hits = index.search(&[0.9, 0.0], 2).unwrap();
        assert_eq!(hits.iter().map(|h| h.1).collect::<Vec<_>>(), vec![2, 0]);
        assert!((hits[0].0 - 0.01).abs() < 1e-5);

        assert_eq!(index.search(&[0.0, 0.0], 10).unwrap().len(), 3);
    }

    #[test]
    fn test_rejects_wrong_dimensions() {
        let mut index = FlatL2Index::new(3);
        assert!(index.add(&[vec![1.0, 2.0, 3.0], vec![1.0]]).is_err());
        assert!(index.is_empty());
        assert!(index.search(&[1.0], 1).is_err());
    }
}
