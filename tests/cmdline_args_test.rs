//! Tests for command-line argument parsing
//!
//! Note: These tests verify the argument parser configuration by creating
//! a test parser with the same structure as the main application.

use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};
use face_filter::app::Demo;
use std::str::FromStr;

/// Create a command with the same argument structure as the main binary
fn create_test_command() -> ClapCommand {
    ClapCommand::new("face-filter")
        .version("0.1.0")
        .about("Hand-driven 3D face filters and gesture trivia")
        .arg(
            Arg::new("demo")
                .long("demo")
                .value_name("DEMO")
                .default_value("buttons")
                .value_parser(Demo::from_str)
                .help("Demo to run"),
        )
        .arg(
            Arg::new("cam")
                .long("cam")
                .value_name("INDEX")
                .value_parser(value_parser!(i32))
                .help("Webcam index"),
        )
        .arg(
            Arg::new("video")
                .short('v')
                .long("video")
                .value_name("PATH")
                .help("Video file path"),
        )
        .arg(
            Arg::new("config")
                .short('C')
                .long("config")
                .value_name("PATH")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("questions")
                .short('q')
                .long("questions")
                .value_name("PATH")
                .help("Question bank"),
        )
        .arg(
            Arg::new("switch-seconds")
                .long("switch-seconds")
                .value_name("SECONDS")
                .value_parser(value_parser!(u64))
                .help("Auto-switch interval"),
        )
        .arg(
            Arg::new("filter")
                .short('f')
                .long("filter")
                .value_name("TYPE")
                .help("Fingertip smoothing"),
        )
        .arg(
            Arg::new("no-mirror")
                .long("no-mirror")
                .action(ArgAction::SetTrue)
                .help("Do not mirror the camera image"),
        )
        .arg(
            Arg::new("headless")
                .long("headless")
                .action(ArgAction::SetTrue)
                .help("Run without a window"),
        )
        .arg(
            Arg::new("print-config")
                .long("print-config")
                .action(ArgAction::SetTrue)
                .help("Print the example configuration"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Enable debug output"),
        )
}

#[test]
fn test_help_argument() {
    let cmd = create_test_command();
    let result = cmd.try_get_matches_from(vec!["face-filter", "--help"]);

    assert!(result.is_err());
    let err = result.unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
}

#[test]
fn test_no_arguments() {
    let cmd = create_test_command();
    let matches = cmd.try_get_matches_from(vec!["face-filter"]).unwrap();

    assert_eq!(matches.get_one::<Demo>("demo"), Some(&Demo::Buttons));
    assert_eq!(matches.get_one::<i32>("cam"), None);
    assert!(!matches.get_flag("headless"));
}

#[test]
fn test_demo_argument() {
    for (name, demo) in [
        ("buttons", Demo::Buttons),
        ("autoswitch", Demo::AutoSwitch),
        ("quiz", Demo::Quiz),
    ] {
        let cmd = create_test_command();
        let matches = cmd.try_get_matches_from(vec!["face-filter", "--demo", name]).unwrap();
        assert_eq!(matches.get_one::<Demo>("demo"), Some(&demo), "demo {name}");
    }
}

#[test]
fn test_unknown_demo_rejected() {
    let cmd = create_test_command();
    let result = cmd.try_get_matches_from(vec!["face-filter", "--demo", "helmet"]);
    assert!(result.is_err());
}

#[test]
fn test_numeric_arguments() {
    let cmd = create_test_command();
    let matches = cmd
        .try_get_matches_from(vec!["face-filter", "--cam", "2", "--switch-seconds", "90"])
        .unwrap();
    assert_eq!(matches.get_one::<i32>("cam"), Some(&2));
    assert_eq!(matches.get_one::<u64>("switch-seconds"), Some(&90));

    let cmd = create_test_command();
    assert!(cmd
        .try_get_matches_from(vec!["face-filter", "--switch-seconds", "-5"])
        .is_err());
}

#[test]
fn test_boolean_flags() {
    for flag in ["--no-mirror", "--headless", "--print-config", "--debug"] {
        let cmd = create_test_command();
        let matches = cmd.try_get_matches_from(vec!["face-filter", flag]).unwrap();
        assert!(matches.get_flag(flag.trim_start_matches("--")), "Flag {flag} should be set");
    }
}

#[test]
fn test_multiple_arguments() {
    let cmd = create_test_command();
    let matches = cmd
        .try_get_matches_from(vec![
            "face-filter",
            "--demo",
            "quiz",
            "--video",
            "test.mp4",
            "--questions",
            "questions.json",
            "--filter",
            "exponential:0.4",
            "--headless",
        ])
        .unwrap();

    assert_eq!(matches.get_one::<Demo>("demo"), Some(&Demo::Quiz));
    assert_eq!(matches.get_one::<String>("video").map(String::as_str), Some("test.mp4"));
    assert_eq!(
        matches.get_one::<String>("questions").map(String::as_str),
        Some("questions.json")
    );
    assert_eq!(
        matches.get_one::<String>("filter").map(String::as_str),
        Some("exponential:0.4")
    );
    assert!(matches.get_flag("headless"));
}
