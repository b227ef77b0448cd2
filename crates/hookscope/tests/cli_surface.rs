use std::path::Path;

use clap::Parser;
use hookscope::cli::app::{Cli, Command};

#[test]
fn parses_global_runtime_flags_for_decode() {
    let cli = Cli::parse_from([
        "hookscope",
        "--home-dir",
        "/home/tester",
        "--cwd",
        "/work/repo",
        "--config",
        "~/conf/hookscope.json",
        "decode",
        "events.jsonl",
    ]);

    assert_eq!(
        cli.runtime.home_dir.as_deref(),
        Some(Path::new("/home/tester"))
    );
    assert_eq!(cli.runtime.cwd.as_deref(), Some(Path::new("/work/repo")));
    assert_eq!(
        cli.runtime.config.as_deref(),
        Some(Path::new("~/conf/hookscope.json"))
    );

    assert_eq!(cli.command.name(), "decode");
    match cli.command {
        Command::Decode(args) => {
            assert_eq!(args.input, Path::new("events.jsonl"));
            assert!(!args.fail_fast);
            assert!(!args.strict);
            assert!(!args.json);
            assert!(!args.redact);
        }
        other => panic!("expected decode command, got {other:?}"),
    }
}

#[test]
fn parses_decode_switches() {
    let cli = Cli::parse_from([
        "hookscope",
        "decode",
        "payload.json",
        "--fail-fast",
        "--strict",
        "--json",
        "--redact",
    ]);

    match cli.command {
        Command::Decode(args) => {
            assert!(args.fail_fast);
            assert!(args.strict);
            assert!(args.json);
            assert!(args.redact);
        }
        other => panic!("expected decode command, got {other:?}"),
    }
}

#[test]
fn global_flags_are_accepted_after_the_subcommand() {
    let cli = Cli::parse_from(["hookscope", "decode", "in.json", "--cwd", "/tmp/work"]);
    assert_eq!(cli.runtime.cwd.as_deref(), Some(Path::new("/tmp/work")));
}

#[test]
fn parses_schema_command() {
    let cli = Cli::parse_from(["hookscope", "schema"]);
    assert!(matches!(cli.command, Command::Schema(_)));
}

#[test]
fn decode_requires_an_input() {
    let error = Cli::try_parse_from(["hookscope", "decode"]).expect_err("input is required");
    assert_eq!(
        error.kind(),
        clap::error::ErrorKind::MissingRequiredArgument
    );
}
