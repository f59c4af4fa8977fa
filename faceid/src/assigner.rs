use tracing::debug;

use crate::error::{FaceIdError, Result};
use crate::math::normalize;
use crate::registry::IdentityRegistry;

/// Clarity-scaled similarity threshold.
///
/// The effective threshold is `base * (floor + clarity * range)`, so with
/// the defaults a clarity of 0.05 loosens the threshold to 81% of `base`
/// and a clarity of 1.0 leaves it unchanged.
///
/// Every field is used as given. `range = 0` disables the clarity adjustment
/// and `floor = 0` makes the threshold proportional to clarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPolicy {
    /// Minimum cosine similarity before the clarity adjustment. Default: 0.55.
    pub base: f32,

    /// Multiplier at zero clarity. Default: 0.8.
    pub floor: f32,

    /// Multiplier added per unit of clarity. Default: 0.2.
    pub range: f32,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            base: 0.55,
            floor: 0.8,
            range: 0.2,
        }
    }
}

impl ThresholdPolicy {
    pub fn new(base: f32) -> Self {
        Self {
            base,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.base) {
            return Err(FaceIdError::InvalidConfig(format!(
                "base threshold must be in [0, 1], got {}",
                self.base
            )));
        }
        if !(self.floor >= 0.0 && self.range >= 0.0) {
            return Err(FaceIdError::InvalidConfig(format!(
                "threshold floor and range must be non-negative, got {} and {}",
                self.floor, self.range
            )));
        }
        Ok(())
    }

    /// Effective threshold for a face from an image with the given clarity.
    pub fn adaptive(&self, clarity: f32) -> f32 {
        self.base * (self.floor + clarity * self.range)
    }
}

/// Outcome of placing one face.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// Joined an existing identity.
    Matched { label: String, similarity: f32 },
    /// Started a new identity.
    Created { label: String },
    /// Cleared no identity and creation was not allowed.
    Other,
}

impl Assignment {
    /// The identity label, or `None` for [`Assignment::Other`].
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Matched { label, .. } | Self::Created { label } => Some(label),
            Self::Other => None,
        }
    }
}

/// Online nearest-centroid matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterAssigner {
    policy: ThresholdPolicy,
}

impl ClusterAssigner {
    pub fn new(policy: ThresholdPolicy) -> Self {
        Self {
            policy,
        }
    }

    pub fn policy(&self) -> &ThresholdPolicy {
        &self.policy
    }

    /// Places `emb` into `registry`, creating an identity when nothing clears
    /// the adaptive threshold and updating the winner otherwise.
    ///
    /// Never returns [`Assignment::Other`].
    pub fn assign(
        &self,
        emb: &[f32],
        clarity: f32,
        registry: &mut IdentityRegistry,
    ) -> Result<Assignment> {
        registry.check_dim(emb)?;
        let emb = normalize(emb);
        let threshold = self.policy.adaptive(clarity);

        match registry.best_match(&emb) {
            Some(m) if m.similarity >= threshold => {
                registry.update(&m.label, &emb, clarity)?;
                debug!(label = %m.label, similarity = m.similarity, threshold, "face matched");
                Ok(Assignment::Matched {
                    label: m.label,
                    similarity: m.similarity,
                })
            }
            best => {
                let label = registry.create(&emb, clarity)?;
                debug!(
                    label = %label,
                    best = best.map(|m| m.similarity).unwrap_or(-1.0),
                    threshold,
                    "identity created"
                );
                Ok(Assignment::Created { label })
            }
        }
    }

    /// Looks `emb` up against a registry that must not change.
    ///
    /// Returns [`Assignment::Matched`] or [`Assignment::Other`].
    pub fn classify(
        &self,
        emb: &[f32],
        clarity: f32,
        registry: &IdentityRegistry,
    ) -> Result<Assignment> {
        registry.check_dim(emb)?;
        let emb = normalize(emb);
        let threshold = self.policy.adaptive(clarity);

        Ok(match registry.best_match(&emb) {
            Some(m) if m.similarity >= threshold => Assignment::Matched {
                label: m.label,
                similarity: m.similarity,
            },
            _ => Assignment::Other,
        })
    }
}
