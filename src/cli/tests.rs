use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{Cli, Commands, normalize_path};

#[test]
fn test_manifest_parsing() {
    let cli = Cli::parse_from([
        "release-index",
        "manifest",
        "-i",
        "/srv/releases",
        "-u",
        "https://releases.example.org",
    ]);

    let Commands::Manifest {
        input,
        url,
        output,
        prettyname,
        retention_days,
        include_all,
    } = cli.command()
    else {
        panic!("expected manifest command");
    };
    assert_eq!(input, Path::new("/srv/releases"));
    assert_eq!(url, "https://releases.example.org");
    assert!(output.is_none());
    assert!(prettyname.is_none());
    assert!(retention_days.is_none());
    assert!(!*include_all);
    assert_eq!(cli.global_opts().distro(), "LibreELEC");
    assert_eq!(cli.global_opts().verbose(), 0);
    assert!(!cli.global_opts().quiet());
}

#[test]
fn test_manifest_options() {
    let cli = Cli::parse_from([
        "release-index",
        "manifest",
        "--input",
        "in",
        "--url",
        "https://x",
        "--output",
        "out",
        "--prettyname",
        "^X-(.*)",
        "--retention-days",
        "14",
        "--include-all",
    ]);

    let Commands::Manifest {
        output,
        prettyname,
        retention_days,
        include_all,
        ..
    } = cli.command()
    else {
        panic!("expected manifest command");
    };
    assert_eq!(output.as_deref(), Some(Path::new("out")));
    assert_eq!(prettyname.as_deref(), Some("^X-(.*)"));
    assert_eq!(*retention_days, Some(14));
    assert!(*include_all);
}

#[test]
fn test_prune_parsing() {
    let cli = Cli::parse_from(["release-index", "prune", "-i", "12.0", "-k", "30", "-d"]);

    let Commands::Prune {
        input,
        keep,
        delete,
        retained,
    } = cli.command()
    else {
        panic!("expected prune command");
    };
    assert_eq!(input, Path::new("12.0"));
    assert_eq!(*keep, 30);
    assert!(*delete);
    assert!(!*retained);
}

#[test]
fn test_prune_requires_keep() {
    let result = Cli::try_parse_from(["release-index", "prune", "-i", "12.0"]);
    assert!(result.is_err());
}

#[test]
fn test_global_flag_positioning() {
    let cli = Cli::parse_from([
        "release-index",
        "prune",
        "-i",
        "12.0",
        "-k",
        "7",
        "-vv",
        "--distro",
        "CoreELEC",
    ]);
    assert_eq!(cli.global_opts().verbose(), 2);
    assert_eq!(cli.global_opts().distro(), "CoreELEC");
}

#[test]
fn test_quiet_conflicts_with_verbose() {
    let result = Cli::try_parse_from([
        "release-index",
        "-q",
        "-v",
        "prune",
        "-i",
        "12.0",
        "-k",
        "7",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_builder() {
    let cli = Cli::builder()
        .verbose(2)
        .distro("CoreELEC")
        .command(Commands::Prune {
            input: PathBuf::from("12.0"),
            keep: 7,
            delete: false,
            retained: true,
        })
        .build()
        .expect("Failed to build CLI");

    assert_eq!(cli.global_opts().verbose(), 2);
    assert_eq!(cli.global_opts().distro(), "CoreELEC");
    assert!(matches!(
        cli.command(),
        Commands::Prune { retained: true, .. }
    ));

    assert!(Cli::builder().build().is_err());
}

#[test]
fn test_normalize_path() {
    let normalized = normalize_path("./releases/./12.0");
    assert!(normalized.is_absolute());
    assert!(!normalized.to_string_lossy().contains("/./"));

    let normalized = normalize_path("releases/../archive/12.0");
    assert!(normalized.is_absolute());
    assert!(normalized.ends_with("archive/12.0"));
    assert!(!normalized.to_string_lossy().contains(".."));

    let abs_path = PathBuf::from("/srv/releases");
    assert_eq!(normalize_path(&abs_path), abs_path);
}
