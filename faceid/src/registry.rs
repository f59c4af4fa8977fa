use std::fmt;

use crate::error::{FaceIdError, Result};
use crate::label::role_label;
use crate::math::{dot, normalize, normalize_in_place};

/// One embedding that contributed to an identity, with its image clarity.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub embedding: Vec<f32>,
    pub clarity: f32,
}

/// A cluster of faces believed to belong to one person.
#[derive(Clone)]
pub struct Identity {
    /// Stable label assigned in creation order ("A", "B", ..., "AA").
    pub label: String,

    /// Unit-length clarity²-weighted mean of all samples.
    pub centroid: Vec<f32>,

    samples: Vec<Sample>,
}

impl Identity {
    /// Samples in the order they were added.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of faces merged into this identity.
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    fn recompute_centroid(&mut self) {
        let dim = self.centroid.len();
        let mut acc = vec![0.0f64; dim];
        let mut total = 0.0f64;
        for s in &self.samples {
            let w2 = (s.clarity as f64) * (s.clarity as f64);
            total += w2;
            for (a, &x) in acc.iter_mut().zip(&s.embedding) {
                *a += w2 * x as f64;
            }
        }
        if total > 0.0 {
            for a in acc.iter_mut() {
                *a /= total;
            }
        }
        let mut centroid: Vec<f32> = acc.into_iter().map(|x| x as f32).collect();
        normalize_in_place(&mut centroid);
        self.centroid = centroid;
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("label", &self.label)
            .field("count", &self.samples.len())
            .field("centroid_len", &self.centroid.len())
            .finish()
    }
}

/// Closest identity to a query embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMatch {
    pub label: String,
    pub similarity: f32,
}

/// Known identities of one grouping run, in creation order.
///
/// Identities are never removed or merged once created.
#[derive(Debug, Default, Clone)]
pub struct IdentityRegistry {
    identities: Vec<Identity>,
    next_id: usize,
    dim: Option<usize>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identity whose centroid has the highest dot product with
    /// `emb`, or `None` when the registry is empty.
    ///
    /// `emb` is expected to be unit length. On exact ties the
    /// earliest-created identity wins.
    pub fn best_match(&self, emb: &[f32]) -> Option<BestMatch> {
        let mut best: Option<(usize, f32)> = None;
        for (i, id) in self.identities.iter().enumerate() {
            let sim = dot(emb, &id.centroid);
            match best {
                Some((_, best_sim)) if sim <= best_sim => {}
                _ => best = Some((i, sim)),
            }
        }
        best.map(|(i, similarity)| BestMatch {
            label: self.identities[i].label.clone(),
            similarity,
        })
    }

    /// Mints a new identity seeded with one sample and returns its label.
    pub fn create(&mut self, emb: &[f32], clarity: f32) -> Result<String> {
        self.check_dim(emb)?;
        let label = role_label(self.next_id);
        self.next_id += 1;
        self.dim.get_or_insert(emb.len());
        self.identities.push(Identity {
            label: label.clone(),
            centroid: normalize(emb),
            samples: vec![Sample {
                embedding: emb.to_vec(),
                clarity,
            }],
        });
        Ok(label)
    }

    /// Adds a sample to `label` and recomputes its centroid.
    pub fn update(&mut self, label: &str, emb: &[f32], clarity: f32) -> Result<()> {
        self.check_dim(emb)?;
        let id = self
            .identities
            .iter_mut()
            .find(|id| id.label == label)
            .ok_or_else(|| FaceIdError::UnknownRole(label.to_string()))?;
        id.samples.push(Sample {
            embedding: emb.to_vec(),
            clarity,
        });
        id.recompute_centroid();
        Ok(())
    }

    /// Fails if `emb` is empty or its length differs from earlier embeddings.
    pub fn check_dim(&self, emb: &[f32]) -> Result<()> {
        if emb.is_empty() {
            return Err(FaceIdError::EmptyEmbedding);
        }
        match self.dim {
            Some(expected) if expected != emb.len() => Err(FaceIdError::DimensionMismatch {
                expected,
                got: emb.len(),
            }),
            _ => Ok(()),
        }
    }

    pub fn get(&self, label: &str) -> Option<&Identity> {
        self.identities.iter().find(|id| id.label == label)
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    /// Embedding dimension fixed by the first identity, if any.
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::l2_norm;

    #[test]
    fn empty_registry_has_no_match() {
        let reg = IdentityRegistry::new();
        assert!(reg.best_match(&[1.0, 0.0]).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn create_mints_sequential_labels() {
        let mut reg = IdentityRegistry::new();
        let a = reg.create(&[1.0, 0.0, 0.0], 1.0).unwrap();
        let b = reg.create(&[0.0, 1.0, 0.0], 1.0).unwrap();
        assert_eq!(a, "A");
        assert_eq!(b, "B");
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.dim(), Some(3));
        assert_eq!(reg.get("A").unwrap().count(), 1);
    }

    #[test]
    fn best_match_picks_highest_similarity() {
        let mut reg = IdentityRegistry::new();
        reg.create(&[1.0, 0.0], 1.0).unwrap();
        reg.create(&[0.0, 1.0], 1.0).unwrap();
        let m = reg.best_match(&normalize(&[0.2, 0.9])).unwrap();
        assert_eq!(m.label, "B");
        assert!(m.similarity > 0.9);
    }

    #[test]
    fn ties_keep_earliest_identity() {
        let mut reg = IdentityRegistry::new();
        reg.create(&[1.0, 0.0], 1.0).unwrap();
        reg.create(&[0.0, 1.0], 1.0).unwrap();
        let m = reg.best_match(&normalize(&[1.0, 1.0])).unwrap();
        assert_eq!(m.label, "A", "exact tie should resolve to the first identity");
    }

    #[test]
    fn update_weights_by_clarity_squared() {
        let mut reg = IdentityRegistry::new();
        reg.create(&[1.0, 0.0], 1.0).unwrap();
        reg.update("A", &[0.0, 1.0], 0.5).unwrap();

        // weights 1.0 and 0.25: mean = (0.8, 0.2), normalized.
        let c = &reg.get("A").unwrap().centroid;
        let expected = normalize(&[0.8, 0.2]);
        assert!((c[0] - expected[0]).abs() < 1e-5, "got {c:?}");
        assert!((c[1] - expected[1]).abs() < 1e-5, "got {c:?}");
        assert!((l2_norm(c) - 1.0).abs() < 1e-5);
        assert_eq!(reg.get("A").unwrap().samples().len(), 2);
    }

    #[test]
    fn equal_clarity_gives_plain_mean() {
        let mut reg = IdentityRegistry::new();
        reg.create(&[1.0, 0.0], 0.3).unwrap();
        reg.update("A", &[0.0, 1.0], 0.3).unwrap();
        let c = &reg.get("A").unwrap().centroid;
        assert!((c[0] - c[1]).abs() < 1e-6);
    }

    #[test]
    fn update_unknown_label_fails() {
        let mut reg = IdentityRegistry::new();
        reg.create(&[1.0, 0.0], 1.0).unwrap();
        let err = reg.update("Q", &[1.0, 0.0], 1.0).unwrap_err();
        assert!(matches!(err, FaceIdError::UnknownRole(ref l) if l == "Q"));
    }

    #[test]
    fn dimension_is_enforced() {
        let mut reg = IdentityRegistry::new();
        reg.create(&[1.0, 0.0, 0.0], 1.0).unwrap();
        let err = reg.create(&[1.0, 0.0], 1.0).unwrap_err();
        assert!(matches!(
            err,
            FaceIdError::DimensionMismatch { expected: 3, got: 2 }
        ));
        assert!(matches!(
            reg.update("A", &[], 1.0).unwrap_err(),
            FaceIdError::EmptyEmbedding
        ));
        assert_eq!(reg.len(), 1);
    }
}
