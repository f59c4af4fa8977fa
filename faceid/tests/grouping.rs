//! End-to-end grouping behaviour through the public API.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use rolecut_faceid::{
    export_roles, list_images, Assignment, ClarityScorer, ClusterAssigner, Detection,
    Embedding, FaceExtractor, Grouper, GroupingConfig, IdentityRegistry, LaplacianClarity,
    ManifestExtractor, Result, ThresholdPolicy, OTHER_LABEL,
};

/// Returns faces from a fixed table keyed by file name.
struct TableExtractor(HashMap<String, Vec<Embedding>>);

impl TableExtractor {
    fn new(entries: &[(&str, Vec<Embedding>)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }
}

impl FaceExtractor for TableExtractor {
    fn extract(&self, path: &Path, _detection_threshold: f32) -> Result<Vec<Embedding>> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        Ok(self.0.get(name).cloned().unwrap_or_default())
    }
}

struct FixedClarity(f32);

impl ClarityScorer for FixedClarity {
    fn clarity(&self, _path: &Path) -> f32 {
        self.0
    }
}

fn unit_at(deg: f32) -> Embedding {
    let r = deg.to_radians();
    vec![r.cos(), r.sin()]
}

fn grouper(base: f32, entries: &[(&str, Vec<Embedding>)]) -> Grouper {
    Grouper::new(
        GroupingConfig {
            threshold: ThresholdPolicy::new(base),
            detection_threshold: 0.65,
        },
        Box::new(TableExtractor::new(entries)),
        Box::new(FixedClarity(1.0)),
    )
    .unwrap()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn two_people_three_images() {
    // image1 and image2 share a face (similarity 0.95), image3 is ~0.2 from both.
    let e1 = vec![1.0, 0.0, 0.0];
    let e2 = vec![0.95, 0.312_25, 0.0];
    let e3 = vec![0.2, 0.032, 0.979_3];
    let g = grouper(
        0.55,
        &[("image1.jpg", vec![e1]), ("image2.jpg", vec![e2]), ("image3.jpg", vec![e3])],
    );

    let out = g
        .group("/frames", &names(&["image1.jpg", "image2.jpg", "image3.jpg"]))
        .unwrap();

    assert_eq!(out.registry.len(), 2);
    assert_eq!(out.roles.len(), 2);
    assert_eq!(out.roles.get("A").unwrap(), &set(&["image1.jpg", "image2.jpg"]));
    assert_eq!(out.roles.get("B").unwrap(), &set(&["image3.jpg"]));
    assert!(out.roles.other().is_none());
}

#[test]
fn faceless_image_only_in_other() {
    let g = grouper(0.55, &[("face.jpg", vec![vec![1.0, 0.0]])]);
    let out = g.group("/frames", &names(&["face.jpg", "wall.jpg"])).unwrap();

    assert_eq!(out.roles.other().unwrap(), &set(&["wall.jpg"]));
    for (label, images) in out.roles.iter() {
        if label != OTHER_LABEL {
            assert!(!images.contains("wall.jpg"), "faceless image under {label}");
        }
    }
    assert_eq!(out.faceless, 1);
}

#[test]
fn same_input_same_output() {
    let entries = [
        ("1.jpg", vec![unit_at(0.0)]),
        ("2.jpg", vec![unit_at(20.0), unit_at(170.0)]),
        ("3.jpg", vec![unit_at(90.0)]),
        ("4.jpg", vec![]),
        ("5.jpg", vec![unit_at(160.0)]),
    ];
    let order = names(&["1.jpg", "2.jpg", "3.jpg", "4.jpg", "5.jpg"]);

    let first = grouper(0.6, &entries).group("/frames", &order).unwrap();
    let second = grouper(0.6, &entries).group("/frames", &order).unwrap();
    assert_eq!(first.roles, second.roles);
    assert_eq!(first.faces, second.faces);
}

#[test]
fn identity_count_never_decreases() {
    let assigner = ClusterAssigner::new(ThresholdPolicy::new(0.6));
    let mut reg = IdentityRegistry::new();
    let mut prev = 0;
    for deg in [0.0, 10.0, 120.0, 15.0, 240.0, 125.0, 60.0, 300.0, 5.0] {
        let result = assigner.assign(&unit_at(deg), 0.7, &mut reg).unwrap();
        let now = reg.len();
        assert!(now >= prev);
        match result {
            Assignment::Created { .. } => assert_eq!(now, prev + 1, "create adds exactly one"),
            Assignment::Matched { .. } => assert_eq!(now, prev, "match adds none"),
            Assignment::Other => panic!("pass 1 never yields other"),
        }
        prev = now;
    }
}

#[test]
fn every_face_accounted_for() {
    let entries = [
        ("a.jpg", vec![unit_at(0.0), unit_at(90.0)]),
        ("b.jpg", vec![unit_at(5.0)]),
        ("c.jpg", vec![]),
        ("d.jpg", vec![unit_at(92.0), unit_at(3.0), unit_at(200.0)]),
        ("e.jpg", vec![]),
    ];
    let order = names(&["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg"]);
    let out = grouper(0.6, &entries).group("/frames", &order).unwrap();

    let detected: usize = entries.iter().map(|(_, faces)| faces.len()).sum();
    assert_eq!(out.faces.len(), detected, "one decision per detected face");
    for (name, faces) in &entries {
        let placed = out.faces.iter().filter(|f| f.image == *name).count();
        assert_eq!(placed, faces.len(), "faces of {name}");
    }

    let other = out.roles.other().unwrap();
    assert!(other.contains("c.jpg") && other.contains("e.jpg"));
    assert_eq!(out.faceless, 2);

    // d.jpg holds two different people and lands under both.
    let with_d: Vec<&str> = out
        .roles
        .iter()
        .filter(|(_, imgs)| imgs.contains("d.jpg"))
        .map(|(l, _)| l)
        .collect();
    assert_eq!(with_d.len(), 3, "got {with_d:?}");
}

#[test]
fn second_pass_reevaluates_early_faces() {
    // Each face joins A in pass 1, but the centroid drifts to ~60 degrees,
    // leaving the first face below the threshold.
    let g = grouper(
        0.5,
        &[
            ("1.jpg", vec![unit_at(0.0)]),
            ("2.jpg", vec![unit_at(55.0)]),
            ("3.jpg", vec![unit_at(80.0)]),
            ("4.jpg", vec![unit_at(100.0)]),
        ],
    );
    let out = g
        .group("/frames", &names(&["1.jpg", "2.jpg", "3.jpg", "4.jpg"]))
        .unwrap();

    assert_eq!(out.registry.len(), 1);
    assert_eq!(out.registry.get("A").unwrap().count(), 4);
    assert_eq!(out.roles.get("A").unwrap(), &set(&["2.jpg", "3.jpg", "4.jpg"]));
    assert_eq!(out.roles.other().unwrap(), &set(&["1.jpg"]));
}

#[test]
fn directory_run_with_manifest_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("selected");
    let output = dir.path().join("roles");
    std::fs::create_dir(&input).unwrap();

    let sharp = image::GrayImage::from_fn(24, 24, |x, y| image::Luma([((x + y) % 2 * 255) as u8]));
    for name in ["cut(1).png", "cut(2).png", "cut(3).png", "cut(4).png"] {
        sharp.save(input.join(name)).unwrap();
    }
    std::fs::write(input.join("notes.txt"), b"ignored").unwrap();

    let det = |score: f32, emb: Embedding| Detection { score, embedding: emb };
    let manifest: HashMap<String, Vec<Detection>> = [
        ("cut(1).png", vec![det(0.9, unit_at(0.0))]),
        ("cut(2).png", vec![det(0.95, unit_at(4.0)), det(0.3, unit_at(180.0))]),
        ("cut(3).png", vec![det(0.8, unit_at(120.0))]),
        ("cut(4).png", vec![det(0.2, unit_at(0.0))]),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    let manifest_path = dir.path().join("faces.json");
    std::fs::write(&manifest_path, serde_json::to_string(&manifest).unwrap()).unwrap();

    let g = Grouper::new(
        GroupingConfig::default(),
        Box::new(ManifestExtractor::open(&manifest_path).unwrap()),
        Box::new(LaplacianClarity::default()),
    )
    .unwrap();

    assert_eq!(list_images(&input).unwrap().len(), 4);
    let out = g.group_dir(&input).unwrap();
    assert_eq!(out.roles.get("A").unwrap(), &set(&["cut(1).png", "cut(2).png"]));
    assert_eq!(out.roles.get("B").unwrap(), &set(&["cut(3).png"]));
    assert_eq!(out.roles.other().unwrap(), &set(&["cut(4).png"]));

    let first = export_roles(&input, &output, &out.roles).unwrap();
    assert_eq!(first.copied, 4);

    let snapshot = |root: &Path| -> BTreeSet<String> {
        let mut files = BTreeSet::new();
        for role in std::fs::read_dir(root).unwrap() {
            let role = role.unwrap().path();
            for f in std::fs::read_dir(&role).unwrap() {
                let f = f.unwrap().path();
                files.insert(f.strip_prefix(root).unwrap().display().to_string());
            }
        }
        files
    };
    let before = snapshot(&output);
    assert!(before.contains(&Path::new("role_A").join("cut(2).png").display().to_string()));

    let again = g.group_dir(&input).unwrap();
    let second = export_roles(&input, &output, &again.roles).unwrap();
    assert_eq!(second.copied, 0);
    assert_eq!(second.skipped, 4);
    assert_eq!(snapshot(&output), before, "re-run must not change the output tree");
}
