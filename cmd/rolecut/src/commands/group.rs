//! The group command: two-pass grouping plus export to role folders.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Args;
use rolecut_cli::Profile;
use rolecut_faceid::{
    export_roles, list_images, role_dir_name, ClarityConfig, Grouper, GroupingConfig,
    LaplacianClarity, ManifestExtractor, ThresholdPolicy,
};
use rolecut_kv::PageCache;
use serde::Serialize;
use tracing::warn;

use super::{
    get_profile, open_defaults, output, print_info, print_success, KEY_BASE_THRESHOLD,
    KEY_DETECTION_THRESHOLD, KEY_EMBEDDINGS, KEY_INPUT_DIR, KEY_OUTPUT_DIR,
};
use crate::Cli;

/// Manifest looked up in the input folder when --embeddings is not given.
const DEFAULT_MANIFEST: &str = "faces.json";

/// Group a folder of images by face identity.
///
/// Flags left out fall back to the selected profile, then to the values
/// remembered from the last successful run, then to built-in defaults.
#[derive(Args)]
pub struct GroupCommand {
    /// Folder of images to group (default: last used)
    input_dir: Option<PathBuf>,

    /// Folder that receives the role_<label> folders (default: last used)
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,

    /// Face detection manifest (default: last used for the same input folder,
    /// else <input_dir>/faces.json)
    #[arg(short = 'e', long)]
    embeddings: Option<PathBuf>,

    /// Base similarity threshold in [0, 1]
    #[arg(short = 't', long)]
    threshold: Option<f32>,

    /// Minimum face detection score in [0, 1]
    #[arg(long)]
    detection_threshold: Option<f32>,

    /// Only print the grouping, do not copy any file
    #[arg(long)]
    no_export: bool,
}

/// Settings of one run after merging flags, profile and remembered values.
#[derive(Debug, Clone, PartialEq)]
struct Resolved {
    input_dir: PathBuf,
    output_dir: Option<PathBuf>,
    embeddings: PathBuf,
    grouping: GroupingConfig,
    clarity: ClarityConfig,
}

#[derive(Debug, Serialize)]
struct GroupReport {
    input_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<String>,
    base_threshold: f32,
    detection_threshold: f32,
    images: usize,
    faces: usize,
    faceless: usize,
    identities: usize,
    roles: Vec<RoleReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<ExportReport>,
}

#[derive(Debug, Serialize)]
struct RoleReport {
    label: String,
    folder: String,
    count: usize,
    images: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    copied: usize,
    skipped: usize,
}

impl GroupCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let profile = get_profile(cli)?;
        let defaults = open_defaults()?;

        let resolved = self.resolve(profile.as_ref(), &defaults)?;
        if let Some(p) = &profile {
            print_info(&format!("Using profile \"{}\"", p.name));
        }

        let report = execute(&resolved, !self.no_export)?;
        remember(&defaults, &resolved);

        match &report.export {
            Some(e) => print_success(&format!(
                "Grouped {} images into {} roles ({} copied, {} already present)",
                report.images,
                report.roles.len(),
                e.copied,
                e.skipped
            )),
            None => print_success(&format!(
                "Grouped {} images into {} roles",
                report.images,
                report.roles.len()
            )),
        }

        output(cli).write(&report)
    }

    fn resolve(&self, profile: Option<&Profile>, defaults: &PageCache) -> anyhow::Result<Resolved> {
        let input_dir = match self.input_dir.clone().or_else(|| remembered(defaults, KEY_INPUT_DIR)) {
            Some(dir) => dir,
            None => anyhow::bail!("no input directory given and none remembered"),
        };

        let output_dir = self
            .output_dir
            .clone()
            .or_else(|| remembered(defaults, KEY_OUTPUT_DIR));
        if output_dir.is_none() && !self.no_export {
            anyhow::bail!("no output directory given and none remembered, use -d or --no-export");
        }

        // A remembered manifest belongs to the remembered input folder only.
        let last_input: Option<PathBuf> = remembered(defaults, KEY_INPUT_DIR);
        let embeddings = self
            .embeddings
            .clone()
            .or_else(|| {
                (last_input.as_ref() == Some(&input_dir))
                    .then(|| remembered(defaults, KEY_EMBEDDINGS))
                    .flatten()
            })
            .unwrap_or_else(|| input_dir.join(DEFAULT_MANIFEST));

        let profile = profile.cloned().unwrap_or_default();
        let base = profile.grouping_config();

        let threshold = self
            .threshold
            .or(profile.base_threshold)
            .or_else(|| remembered(defaults, KEY_BASE_THRESHOLD))
            .unwrap_or(base.threshold.base);
        let detection_threshold = self
            .detection_threshold
            .or(profile.detection_threshold)
            .or_else(|| remembered(defaults, KEY_DETECTION_THRESHOLD))
            .unwrap_or(base.detection_threshold);

        let grouping = GroupingConfig {
            threshold: ThresholdPolicy {
                base: threshold,
                ..base.threshold
            },
            detection_threshold,
        };
        grouping.validate()?;

        Ok(Resolved {
            input_dir,
            output_dir,
            embeddings,
            grouping,
            clarity: profile.clarity_config(),
        })
    }
}

fn remembered<T: serde::de::DeserializeOwned>(defaults: &PageCache, key: &str) -> Option<T> {
    defaults.get_or(key, None)
}

/// Stores the settings of a successful run. Failures only warn.
fn remember(defaults: &PageCache, r: &Resolved) {
    let mut results = vec![
        (KEY_INPUT_DIR, defaults.set(KEY_INPUT_DIR, &r.input_dir)),
        (KEY_EMBEDDINGS, defaults.set(KEY_EMBEDDINGS, &r.embeddings)),
        (
            KEY_BASE_THRESHOLD,
            defaults.set(KEY_BASE_THRESHOLD, &r.grouping.threshold.base),
        ),
        (
            KEY_DETECTION_THRESHOLD,
            defaults.set(KEY_DETECTION_THRESHOLD, &r.grouping.detection_threshold),
        ),
    ];
    if let Some(dir) = &r.output_dir {
        results.push((KEY_OUTPUT_DIR, defaults.set(KEY_OUTPUT_DIR, dir)));
    }
    for (key, result) in results {
        if let Err(e) = result {
            warn!(key, error = %e, "could not remember setting");
        }
    }
}

fn execute(r: &Resolved, export: bool) -> anyhow::Result<GroupReport> {
    let extractor = ManifestExtractor::open(&r.embeddings)
        .with_context(|| format!("load face manifest {}", r.embeddings.display()))?;
    let grouper = Grouper::new(
        r.grouping,
        Box::new(extractor),
        Box::new(LaplacianClarity::new(r.clarity)),
    )?;

    let images = list_images(&r.input_dir)
        .with_context(|| format!("list images in {}", r.input_dir.display()))?;
    let outcome = grouper.group(&r.input_dir, &images)?;

    let export = match (&r.output_dir, export) {
        (Some(dir), true) => {
            let summary = export_roles(&r.input_dir, dir, &outcome.roles)?;
            Some(ExportReport {
                copied: summary.copied,
                skipped: summary.skipped,
            })
        }
        _ => None,
    };

    let roles = outcome
        .roles
        .iter()
        .map(|(label, images)| RoleReport {
            label: label.to_string(),
            folder: role_dir_name(label),
            count: images.len(),
            images: images.iter().cloned().collect(),
        })
        .collect();

    Ok(GroupReport {
        input_dir: display(&r.input_dir),
        output_dir: r.output_dir.as_deref().map(display),
        base_threshold: r.grouping.threshold.base,
        detection_threshold: r.grouping.detection_threshold,
        images: images.len(),
        faces: outcome.faces.len(),
        faceless: outcome.faceless,
        identities: outcome.registry.len(),
        roles,
        export,
    })
}

fn display(p: &Path) -> String {
    p.display().to_string()
}
