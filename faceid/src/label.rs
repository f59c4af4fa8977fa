/// Catch-all bucket for images with no face or no matching identity.
pub const OTHER_LABEL: &str = "other";

/// Prefix of per-identity output folders (`role_A`, `role_other`, ...).
pub const ROLE_DIR_PREFIX: &str = "role_";

/// Returns the bijective base-26 label for `idx`.
///
/// ```text
/// 0 -> A, 25 -> Z, 26 -> AA, 51 -> AZ, 52 -> BA, 701 -> ZZ, 702 -> AAA
/// ```
pub fn role_label(idx: usize) -> String {
    let mut letters = Vec::new();
    let mut n = idx;
    loop {
        letters.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.reverse();
    // Only ASCII uppercase bytes were pushed.
    letters.into_iter().map(char::from).collect()
}

/// Folder name for a role under the output root.
pub fn role_dir_name(label: &str) -> String {
    format!("{ROLE_DIR_PREFIX}{label}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_boundaries() {
        assert_eq!(role_label(0), "A");
        assert_eq!(role_label(1), "B");
        assert_eq!(role_label(25), "Z");
        assert_eq!(role_label(26), "AA");
        assert_eq!(role_label(27), "AB");
        assert_eq!(role_label(51), "AZ");
        assert_eq!(role_label(52), "BA");
        assert_eq!(role_label(701), "ZZ");
        assert_eq!(role_label(702), "AAA");
    }

    #[test]
    fn labels_are_unique() {
        let labels: std::collections::HashSet<String> = (0..2000).map(role_label).collect();
        assert_eq!(labels.len(), 2000, "bijective scheme must not collide");
        assert!(!labels.contains(OTHER_LABEL));
    }

    #[test]
    fn dir_name_format() {
        assert_eq!(role_dir_name("A"), "role_A");
        assert_eq!(role_dir_name(OTHER_LABEL), "role_other");
    }
}
