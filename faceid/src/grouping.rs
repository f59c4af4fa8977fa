//! Two-pass grouping of face images into identities.
//!
//! Pass 1 walks the images in order and grows the [`IdentityRegistry`]
//! online, so early images shape the centroids that later faces join.
//! Pass 2 freezes that registry and re-places every cached face against the
//! converged centroids, which makes membership independent of where an image
//! sat in the sequence. Identity creation itself stays order-dependent.
//!
//! A run moves through [`Phase`]s strictly forward:
//!
//! ```text
//! Init -> Pass1Running -> Pass1Done -> Pass2Running -> Done
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assigner::{Assignment, ClusterAssigner, ThresholdPolicy};
use crate::clarity::ClarityScorer;
use crate::error::{FaceIdError, Result};
use crate::extractor::{Embedding, FaceExtractor};
use crate::label::OTHER_LABEL;
use crate::listing::list_images;
use crate::registry::IdentityRegistry;

/// Final mapping from role label (including "other") to image names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RoleImages(BTreeMap<String, BTreeSet<String>>);

impl RoleImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `image` under `label`. Returns false if it was already there.
    pub fn insert(&mut self, label: &str, image: &str) -> bool {
        self.0
            .entry(label.to_string())
            .or_default()
            .insert(image.to_string())
    }

    pub fn get(&self, label: &str) -> Option<&BTreeSet<String>> {
        self.0.get(label)
    }

    /// Images that matched no identity or had no face.
    pub fn other(&self) -> Option<&BTreeSet<String>> {
        self.get(OTHER_LABEL)
    }

    /// Drops a role from the result, returning its images.
    pub fn remove(&mut self, label: &str) -> Option<BTreeSet<String>> {
        self.0.remove(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parameters of a grouping run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupingConfig {
    pub threshold: ThresholdPolicy,

    /// Passed unchanged to the [`FaceExtractor`]. Default: 0.65.
    pub detection_threshold: f32,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdPolicy::default(),
            detection_threshold: 0.65,
        }
    }
}

impl GroupingConfig {
    pub fn validate(&self) -> Result<()> {
        self.threshold.validate()?;
        if !(0.0..=1.0).contains(&self.detection_threshold) {
            return Err(FaceIdError::InvalidConfig(format!(
                "detection threshold must be in [0, 1], got {}",
                self.detection_threshold
            )));
        }
        Ok(())
    }
}

/// Where a [`GroupingRun`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Pass1Running,
    Pass1Done,
    Pass2Running,
    Done,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Pass1Running => "pass1-running",
            Self::Pass1Done => "pass1-done",
            Self::Pass2Running => "pass2-running",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final placement of one detected face.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceAssignment {
    pub image: String,
    /// Index of the face within its image, in extractor order.
    pub face: usize,
    /// Identity label, or `None` when the face went to "other".
    pub label: Option<String>,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct GroupingOutcome {
    pub roles: RoleImages,
    /// One entry per accepted face, in input order.
    pub faces: Vec<FaceAssignment>,
    /// Identities created in pass 1.
    pub registry: IdentityRegistry,
    /// Images with no usable face.
    pub faceless: usize,
}

struct CachedImage {
    name: String,
    clarity: f32,
    embeddings: Vec<Embedding>,
}

/// One grouping run over a fixed image sequence.
///
/// Owns the registry and the per-image embedding cache for its lifetime;
/// nothing carries over to the next run.
pub struct GroupingRun<'a> {
    cfg: GroupingConfig,
    assigner: ClusterAssigner,
    extractor: &'a dyn FaceExtractor,
    scorer: &'a dyn ClarityScorer,
    input_dir: PathBuf,
    phase: Phase,
    registry: IdentityRegistry,
    cache: Vec<CachedImage>,
    roles: RoleImages,
    faces: Vec<FaceAssignment>,
}

impl<'a> GroupingRun<'a> {
    /// Fails if `cfg` is out of range.
    pub fn new(
        cfg: GroupingConfig,
        extractor: &'a dyn FaceExtractor,
        scorer: &'a dyn ClarityScorer,
        input_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            assigner: ClusterAssigner::new(cfg.threshold),
            extractor,
            scorer,
            input_dir: input_dir.into(),
            phase: Phase::Init,
            registry: IdentityRegistry::new(),
            cache: Vec::new(),
            roles: RoleImages::new(),
            faces: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The registry as built so far. Frozen once pass 1 is done.
    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.phase != expected {
            return Err(FaceIdError::Phase {
                expected: expected.as_str(),
                actual: self.phase.as_str(),
            });
        }
        Ok(())
    }

    /// Builds identities from `images` (file names inside the input dir),
    /// in the given order.
    pub fn pass1(&mut self, images: &[String]) -> Result<()> {
        self.expect_phase(Phase::Init)?;
        self.phase = Phase::Pass1Running;
        info!(images = images.len(), "pass 1 started");

        for name in images {
            let path = self.input_dir.join(name);
            let detected = self.detect(&path);
            if detected.is_empty() {
                debug!(image = %name, "no face detected");
                self.cache.push(CachedImage {
                    name: name.clone(),
                    clarity: 0.0,
                    embeddings: Vec::new(),
                });
                continue;
            }

            let clarity = self.scorer.clarity(&path);
            let mut accepted = Vec::with_capacity(detected.len());
            for (i, emb) in detected.into_iter().enumerate() {
                match self.assigner.assign(&emb, clarity, &mut self.registry) {
                    Ok(_) => accepted.push(emb),
                    Err(e) => warn!(image = %name, face = i, error = %e, "face skipped"),
                }
            }
            self.cache.push(CachedImage {
                name: name.clone(),
                clarity,
                embeddings: accepted,
            });
        }

        self.phase = Phase::Pass1Done;
        info!(identities = self.registry.len(), "pass 1 done");
        Ok(())
    }

    /// Re-places every cached face against the frozen pass-1 centroids.
    /// Does not call the extractor again.
    pub fn pass2(&mut self) -> Result<()> {
        self.expect_phase(Phase::Pass1Done)?;
        self.phase = Phase::Pass2Running;
        info!(images = self.cache.len(), "pass 2 started");

        for img in &self.cache {
            if img.embeddings.is_empty() {
                self.roles.insert(OTHER_LABEL, &img.name);
                continue;
            }
            for (i, emb) in img.embeddings.iter().enumerate() {
                let label = match self.assigner.classify(emb, img.clarity, &self.registry) {
                    Ok(Assignment::Matched { label, .. } | Assignment::Created { label }) => {
                        Some(label)
                    }
                    Ok(Assignment::Other) => None,
                    Err(e) => {
                        warn!(image = %img.name, face = i, error = %e, "face unplaced");
                        None
                    }
                };
                self.roles
                    .insert(label.as_deref().unwrap_or(OTHER_LABEL), &img.name);
                self.faces.push(FaceAssignment {
                    image: img.name.clone(),
                    face: i,
                    label,
                });
            }
        }

        self.phase = Phase::Done;
        info!(roles = self.roles.len(), faces = self.faces.len(), "pass 2 done");
        Ok(())
    }

    /// Consumes a finished run.
    pub fn finish(self) -> Result<GroupingOutcome> {
        self.expect_phase(Phase::Done)?;
        let faceless = self
            .cache
            .iter()
            .filter(|img| img.embeddings.is_empty())
            .count();
        Ok(GroupingOutcome {
            roles: self.roles,
            faces: self.faces,
            registry: self.registry,
            faceless,
        })
    }

    fn detect(&self, path: &Path) -> Vec<Embedding> {
        match self.extractor.extract(path, self.cfg.detection_threshold) {
            Ok(faces) => faces,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "face extraction failed");
                Vec::new()
            }
        }
    }
}

/// Runs complete two-pass groupings with fixed collaborators.
pub struct Grouper {
    cfg: GroupingConfig,
    extractor: Box<dyn FaceExtractor>,
    scorer: Box<dyn ClarityScorer>,
}

impl Grouper {
    /// Fails if `cfg` is out of range.
    pub fn new(
        cfg: GroupingConfig,
        extractor: Box<dyn FaceExtractor>,
        scorer: Box<dyn ClarityScorer>,
    ) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            extractor,
            scorer,
        })
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.cfg
    }

    /// Groups every image in `input_dir`, visited in sorted name order.
    pub fn group_dir(&self, input_dir: impl AsRef<Path>) -> Result<GroupingOutcome> {
        let input_dir = input_dir.as_ref();
        let images = list_images(input_dir)?;
        self.group(input_dir, &images)
    }

    /// Groups the named images from `input_dir` in the given order.
    pub fn group(&self, input_dir: impl AsRef<Path>, images: &[String]) -> Result<GroupingOutcome> {
        let mut run = GroupingRun::new(
            self.cfg,
            self.extractor.as_ref(),
            self.scorer.as_ref(),
            input_dir.as_ref(),
        )?;
        run.pass1(images)?;
        run.pass2()?;
        run.finish()
    }
}
