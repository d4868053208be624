mod common;

use assert_fs::prelude::*;
use chrono::{Datelike, Duration, Local, NaiveDate};
use common::{Archive, prune_command, run};
use predicates::prelude::*;

/// A Monday and the Wednesday after it, both well past any retention window.
fn same_week_dates() -> (NaiveDate, NaiveDate) {
    let reference = Local::now().date_naive() - Duration::days(120);
    let monday =
        reference - Duration::days(i64::from(reference.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(2))
}

fn nightly(device: &str, date: NaiveDate) -> String {
    format!(
        "LibreELEC-{device}-12.0-nightly-{}-abc1234.img.gz",
        date.format("%Y%m%d")
    )
}

#[test]
fn test_same_week_later_image_is_purged() {
    let archive = Archive::new();
    let (monday, wednesday) = same_week_dates();
    let kept = archive.add(&nightly("Generic.x86_64", monday), "monday");
    let purged = archive.add(&nightly("Generic.x86_64", wednesday), "wednesday");

    let output = run(prune_command(archive.path(), 30, false, false)).unwrap();
    assert_eq!(output.trim_end(), purged.display().to_string());

    let output = run(prune_command(archive.path(), 30, false, true)).unwrap();
    assert_eq!(output.trim_end(), kept.display().to_string());

    // Dry run leaves everything in place.
    assert!(predicate::path::exists().eval(&kept));
    assert!(predicate::path::exists().eval(&purged));
}

#[test]
fn test_delete_removes_purged_images() {
    let archive = Archive::new();
    let (monday, wednesday) = same_week_dates();
    let kept = nightly("RPi4.arm", monday);
    let purged = nightly("RPi4.arm", wednesday);
    archive.add(&format!("RPi4/{kept}"), "monday");
    archive.add(&format!("RPi4/{purged}"), "wednesday");
    let recent = nightly("RPi4.arm", Local::now().date_naive());
    archive.add(&format!("RPi4/{recent}"), "today");

    run(prune_command(archive.path(), 30, true, false)).unwrap();

    let dir = assert_fs::fixture::ChildPath::new(archive.path().join("RPi4"));
    dir.child(&kept).assert(predicate::path::exists());
    dir.child(&purged).assert(predicate::path::missing());
    dir.child(&recent).assert(predicate::path::exists());
}

#[test]
fn test_other_devices_and_tarballs_untouched() {
    let archive = Archive::new();
    let (monday, wednesday) = same_week_dates();
    archive.add(&nightly("RPi4.arm", monday), "a");
    archive.add(&nightly("RPi2.arm", wednesday), "b");
    archive.add(
        &format!(
            "LibreELEC-RPi4.arm-12.0-nightly-{}-abc1234.tar",
            wednesday.format("%Y%m%d")
        ),
        "c",
    );

    let output = run(prune_command(archive.path(), 30, true, false)).unwrap();
    assert_eq!(output, "Nothing found to delete.\n");
}
