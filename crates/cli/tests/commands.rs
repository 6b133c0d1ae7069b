#![forbid(unsafe_code)]

use battery_info::cli::Cli;
use battery_info::commands::App;
use clap::Parser;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

const REGISTRY: &str = r#"{
    "Serial": "F8Y1234ABCD",
    "CycleCount": 120,
    "DesignCapacity": 4500,
    "NominalChargeCapacity": 4200,
    "Temperature": 3087,
    "IsCharging": 0
}"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("registry.json"), REGISTRY).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    async fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        let conffile = self.path("settings.toml");
        let database = self.path("history.db");
        let raw = self.path("registry.json");
        let mut argv = vec![
            "battery-info",
            "--conffile",
            &conffile,
            "--database",
            &database,
            "--raw",
            &raw,
        ];
        argv.extend_from_slice(args);

        let cli = Cli::try_parse_from(argv).unwrap();
        let mut app = App::open(&cli).await?;
        let mut out = Vec::new();
        app.run(cli.command, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }
}

#[tokio::test]
async fn show_decodes_the_registry_dump() {
    let fixture = Fixture::new();
    let text = fixture.run(&["show"]).await.unwrap();
    assert!(text.contains("94%"));
    assert!(text.contains("F8Y*****BCD"));
    assert!(Path::new(&fixture.path("settings.toml")).exists());

    let json = fixture.run(&["show", "--json"]).await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["maximum_capacity"], "94");
}

#[tokio::test]
async fn record_then_list_and_export() {
    let fixture = Fixture::new();
    let first = fixture.run(&["record"]).await.unwrap();
    assert!(first.starts_with("Recorded #1"));
    let second = fixture.run(&["record"]).await.unwrap();
    assert_eq!(second.trim(), "Nothing new to record.");
    fixture
        .run(&["add", "--cycle-count", "10", "--health", "99", "--date", "1000"])
        .await
        .unwrap();

    let history = fixture.run(&["history", "--json"]).await.unwrap();
    let records: serde_json::Value = serde_json::from_str(&history).unwrap();
    assert_eq!(records.as_array().map(Vec::len), Some(2));
    assert_eq!(records[1]["maximum_capacity"], "99");

    let exports = fixture.path("exports");
    let path = fixture.run(&["export", "--dir", &exports]).await.unwrap();
    let csv = fs::read_to_string(path.trim()).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn settings_persist_between_runs() {
    let fixture = Fixture::new();
    fixture.run(&["settings", "frequency", "manual"]).await.unwrap();
    fixture.run(&["settings", "toggle-recording"]).await.unwrap();
    let text = fixture.run(&["settings"]).await.unwrap();
    assert!(text.contains("disabled"));
    assert!(text.contains("manual"));

    let saved = fs::read_to_string(fixture.path("settings.toml")).unwrap();
    assert!(saved.contains("record_frequency = -4"));

    let outcome = fixture.run(&["record"]).await.unwrap();
    assert_eq!(outcome.trim(), "Recording is disabled.");
    let outcome = fixture.run(&["record", "--manual"]).await.unwrap();
    assert!(outcome.contains("manual-add"));
}

#[tokio::test]
async fn destructive_commands_need_confirmation() {
    let fixture = Fixture::new();
    fixture.run(&["record"]).await.unwrap();

    let refused = fixture.run(&["clear"]).await.unwrap();
    assert!(refused.contains("--yes"));
    assert!(fixture.run(&["delete", "42"]).await.is_err());

    fixture.run(&["clear", "--yes"]).await.unwrap();
    let history = fixture.run(&["history"]).await.unwrap();
    assert_eq!(history, "No history recorded.\n");
}

#[tokio::test]
async fn watch_survives_zero_refresh_interval() {
    let fixture = Fixture::new();
    fs::write(
        fixture.path("settings.toml"),
        "[display]\nrefresh_interval = 0\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "battery-info",
        "--conffile",
        fixture.path("settings.toml").as_str(),
        "--raw",
        fixture.path("registry.json").as_str(),
        "watch",
    ])
    .unwrap();
    let mut app = App::open(&cli).await.unwrap();
    let mut out = Vec::new();

    let watched = tokio::time::timeout(
        Duration::from_millis(500),
        app.run(cli.command, &mut out),
    )
    .await;
    assert!(watched.is_err(), "watch should still be running");

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("94%"));
}
