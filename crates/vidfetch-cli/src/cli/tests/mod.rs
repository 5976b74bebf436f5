//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_fetch_defaults() {
    match parse(&["vidfetch", "fetch", "https://youtu.be/dQw4w9WgXcQ"]) {
        CliCommand::Fetch { url, dir, timeout } => {
            assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
            assert!(dir.is_none());
            assert!(timeout.is_none());
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_with_overrides() {
    match parse(&[
        "vidfetch",
        "fetch",
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "--dir",
        "/tmp/videos",
        "--timeout",
        "60",
    ]) {
        CliCommand::Fetch { dir, timeout, .. } => {
            assert_eq!(dir, Some(PathBuf::from("/tmp/videos")));
            assert_eq!(timeout, Some(60));
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_rejects_non_numeric_timeout() {
    let res = Cli::try_parse_from(["vidfetch", "fetch", "u", "--timeout", "soon"]);
    assert!(res.is_err());
}

#[test]
fn cli_parse_info() {
    match parse(&["vidfetch", "info", "https://youtu.be/dQw4w9WgXcQ"]) {
        CliCommand::Info { url } => assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ"),
        _ => panic!("expected Info"),
    }
}

#[test]
fn cli_parse_check() {
    match parse(&["vidfetch", "check", "hello"]) {
        CliCommand::Check { url } => assert_eq!(url, "hello"),
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_cleanup() {
    match parse(&["vidfetch", "cleanup", "downloads/Intro.mp4"]) {
        CliCommand::Cleanup { path } => assert_eq!(path, PathBuf::from("downloads/Intro.mp4")),
        _ => panic!("expected Cleanup"),
    }
}

#[test]
fn cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["vidfetch"]).is_err());
}

#[test]
fn check_command_reports_validity() {
    assert!(super::commands::run_check("https://youtu.be/dQw4w9WgXcQ"));
    assert!(!super::commands::run_check("https://example.com/watch?v=dQw4w9WgXcQ"));
}

#[tokio::test]
async fn cleanup_command_tolerates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone.mp4");
    std::fs::write(&path, b"x").unwrap();
    super::commands::run_cleanup(&path).await;
    assert!(!path.exists());
    super::commands::run_cleanup(&path).await;
}
