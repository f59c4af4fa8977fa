//! Face identity grouping via online nearest-centroid matching with
//! clarity-weighted adaptive thresholds.
//!
//! Works on any face embedding model: detection and embedding are behind
//! the [`FaceExtractor`] trait, sharpness behind [`ClarityScorer`].
//!
//! # Usage
//!
//! ```no_run
//! use rolecut_faceid::{
//!     export_roles, GroupingConfig, Grouper, LaplacianClarity, ManifestExtractor,
//!     ThresholdPolicy,
//! };
//!
//! let grouper = Grouper::new(
//!     GroupingConfig { threshold: ThresholdPolicy::new(0.55), detection_threshold: 0.65 },
//!     Box::new(ManifestExtractor::open("faces.json")?),
//!     Box::new(LaplacianClarity::default()),
//! )?;
//!
//! let outcome = grouper.group_dir("frames/selected")?;
//! export_roles("frames/selected", "frames/roles", &outcome.roles)?;
//! # Ok::<(), rolecut_faceid::FaceIdError>(())
//! ```
//!
//! # Design
//!
//! Matching is online: each face joins the closest identity whose centroid
//! clears `base * (0.8 + 0.2 * clarity)`, or starts a new one. Centroids are
//! clarity²-weighted means, so sharp frames dominate blurry ones.
//!
//! Online matching is order-dependent, so [`Grouper`] runs two passes. The
//! first builds identities; the second freezes them and re-places every face.
//! Identity creation still depends on input order; [`list_images`] sorts by
//! name to keep runs reproducible.

mod assigner;
mod clarity;
mod error;
mod export;
mod extractor;
mod grouping;
mod label;
mod listing;
pub mod math;
mod registry;

pub use assigner::{Assignment, ClusterAssigner, ThresholdPolicy};
pub use clarity::{laplacian_variance, ClarityConfig, ClarityScorer, LaplacianClarity};
pub use error::{FaceIdError, Result};
pub use export::{delete_role, export_roles, ExportSummary};
pub use extractor::{Detection, Embedding, FaceExtractor, ManifestExtractor};
pub use grouping::{
    FaceAssignment, Grouper, GroupingConfig, GroupingOutcome, GroupingRun, Phase, RoleImages,
};
pub use label::{role_dir_name, role_label, OTHER_LABEL, ROLE_DIR_PREFIX};
pub use listing::{is_image_name, list_images, IMAGE_EXTENSIONS};
pub use registry::{BestMatch, Identity, IdentityRegistry, Sample};
