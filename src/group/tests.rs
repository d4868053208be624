use proptest::prelude::*;

use super::*;
use crate::classify::Classifier;

fn classify_all(names: &[&str]) -> Vec<ArtifactDescriptor> {
    let classifier = Classifier::new("LibreELEC");
    names
        .iter()
        .map(|name| classifier.classify(name).unwrap())
        .collect()
}

fn names<'a>(members: impl Iterator<Item = &'a ArtifactDescriptor>) -> Vec<&'a str> {
    members.map(|d| d.file_name.as_str()).collect()
}

#[test]
fn test_tarball_and_image_share_entry() {
    let artifacts = classify_all(&[
        "LibreELEC-RPi2.arm-11.0.1.img.gz",
        "LibreELEC-RPi2.arm-11.0.1.tar",
    ]);
    let grouping = group_artifacts(&artifacts);

    assert_eq!(grouping.groups.len(), 1);
    let group = &grouping.groups[0];
    assert_eq!(group.key, "LibreELEC-RPi2.arm-11.0.1");
    assert_eq!(
        group.file.unwrap().file_name,
        "LibreELEC-RPi2.arm-11.0.1.tar"
    );
    assert_eq!(
        group.image.unwrap().file_name,
        "LibreELEC-RPi2.arm-11.0.1.img.gz"
    );
    assert!(group.uboot.is_empty());
    assert!(grouping.duplicates.is_empty());
}

#[test]
fn test_lone_artifacts_leave_other_slot_empty() {
    let artifacts = classify_all(&[
        "LibreELEC-RPi2.arm-11.0.1.img.gz",
        "LibreELEC-RPi2.arm-11.0.2.tar",
    ]);
    let grouping = group_artifacts(&artifacts);

    assert_eq!(grouping.groups.len(), 2);
    assert!(grouping.groups[0].file.is_none());
    assert!(grouping.groups[0].image.is_some());
    assert!(grouping.groups[1].file.is_some());
    assert!(grouping.groups[1].image.is_none());
}

#[test]
fn test_bootloader_variants_collected() {
    let artifacts = classify_all(&[
        "LibreELEC-AMLGX.arm-11.0.1-box.img.gz",
        "LibreELEC-AMLGX.arm-11.0.1-lepotato.img.gz",
        "LibreELEC-AMLGX.arm-11.0.1.tar",
        "LibreELEC-AMLGX.arm-11.0.1-odroid-n2.img.gz",
    ]);
    let grouping = group_artifacts(&artifacts);

    assert_eq!(grouping.groups.len(), 1);
    let group = &grouping.groups[0];
    assert_eq!(group.key, "LibreELEC-AMLGX.arm-11.0.1");
    assert!(group.file.is_some());
    assert!(group.image.is_none());
    assert_eq!(
        names(group.uboot.iter().copied()),
        vec![
            "LibreELEC-AMLGX.arm-11.0.1-box.img.gz",
            "LibreELEC-AMLGX.arm-11.0.1-lepotato.img.gz",
            "LibreELEC-AMLGX.arm-11.0.1-odroid-n2.img.gz",
        ]
    );
}

#[test]
fn test_groups_follow_first_appearance() {
    let artifacts = classify_all(&[
        "LibreELEC-RPi4.arm-11.0-nightly-20240302-abc1234.tar",
        "LibreELEC-RPi4.arm-11.0-nightly-20240301-def5678.tar",
        "LibreELEC-RPi4.arm-11.0-nightly-20240302-abc1234.img.gz",
    ]);
    let grouping = group_artifacts(&artifacts);

    let keys: Vec<&str> = grouping.groups.iter().map(|g| g.key).collect();
    assert_eq!(
        keys,
        vec![
            "LibreELEC-RPi4.arm-11.0-nightly-20240302-abc1234",
            "LibreELEC-RPi4.arm-11.0-nightly-20240301-def5678",
        ]
    );
    assert!(grouping.groups[0].image.is_some());
}

#[test]
fn test_first_artifact_wins_slot() {
    let first = classify_all(&["LibreELEC-RPi2.arm-11.0.1.img.gz"]).remove(0);
    let second = first.clone();
    let variant = classify_all(&["LibreELEC-RPi2.arm-11.0.1-box.img.gz"]).remove(0);
    let artifacts = vec![first, second, variant.clone(), variant];

    let grouping = group_artifacts(&artifacts);

    assert_eq!(grouping.groups.len(), 1);
    assert!(std::ptr::eq(grouping.groups[0].image.unwrap(), &artifacts[0]));
    assert!(std::ptr::eq(grouping.groups[0].uboot[0], &artifacts[2]));
    assert_eq!(grouping.duplicates.len(), 2);
    assert!(std::ptr::eq(grouping.duplicates[0], &artifacts[1]));
    assert!(std::ptr::eq(grouping.duplicates[1], &artifacts[3]));
}

#[test]
fn test_empty_input() {
    let artifacts: Vec<ArtifactDescriptor> = Vec::new();
    let grouping = group_artifacts(&artifacts);
    assert!(grouping.groups.is_empty());
    assert!(grouping.duplicates.is_empty());
}

fn artifact_name() -> impl Strategy<Value = String> {
    (
        0u32..3,
        prop_oneof![Just(""), Just("-box"), Just("-odroid-n2")],
        prop_oneof![Just(".tar"), Just(".img.gz")],
    )
        .prop_map(|(patch, variant, ext)| format!("LibreELEC-AMLGX.arm-11.0.{patch}{variant}{ext}"))
}

proptest! {
    #[test]
    fn prop_every_artifact_accounted_for_once(
        names in proptest::collection::vec(artifact_name(), 0..16)
    ) {
        let classifier = Classifier::new("LibreELEC");
        let artifacts: Vec<ArtifactDescriptor> = names
            .iter()
            .map(|name| classifier.classify(name).unwrap())
            .collect();
        let grouping = group_artifacts(&artifacts);

        let placed: usize = grouping.groups.iter().map(|g| g.members().count()).sum();
        prop_assert_eq!(placed + grouping.duplicates.len(), artifacts.len());

        let mut keys: Vec<&str> = grouping.groups.iter().map(|g| g.key).collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        prop_assert_eq!(keys.len(), total);

        for group in &grouping.groups {
            for member in group.members() {
                prop_assert_eq!(member.group_key(), group.key);
            }
        }
    }
}
