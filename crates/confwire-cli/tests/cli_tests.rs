//! CLI integration tests
//!
//! These drive the built `confwire` binary against temporary input files.

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const BOOTSTRAP_ENV: [&str; 5] = [
    "APP_ID",
    "APOLLO_META",
    "APOLLO_CLUSTER",
    "APOLLO_BOOTSTRAP_NAMESPACES",
    "APOLLO_ACCESS_KEY_SECRET",
];

fn confwire(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_confwire"));
    cmd.current_dir(dir).args(args).env("RUST_LOG", "off");
    for var in BOOTSTRAP_ENV {
        cmd.env_remove(var);
    }
    cmd
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_bootstrap_prints_fallbacks() {
    let temp_dir = TempDir::new().unwrap();

    let output = confwire(temp_dir.path(), &["bootstrap"])
        .output()
        .expect("Failed to execute CLI");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout_lines(&output),
        vec![
            "apollo.bootstrap.namespaces=application",
            "apollo.cluster=default",
            "app.id=default",
        ]
    );
}

#[test]
fn test_bootstrap_literal_beats_env_and_redacts_secret() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("confwire.toml");
    fs::write(
        &config_path,
        r#"
[logging]
profile = "test"

[bootstrap]
app_id = "orders"
access_key_secret = "s3cr3t"
"#,
    )
    .unwrap();

    let output = confwire(
        temp_dir.path(),
        &["bootstrap", "--config", config_path.to_str().unwrap()],
    )
    .env("APP_ID", "from-env")
    .env("APOLLO_CLUSTER", "shanghai")
    .output()
    .expect("Failed to execute CLI");

    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert!(lines.contains(&"app.id=orders".to_string()));
    assert!(lines.contains(&"apollo.cluster=shanghai".to_string()));
    assert!(lines.contains(&"apollo.access-key.secret=***REDACTED***".to_string()));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("s3cr3t"));
}

#[test]
fn test_bootstrap_reads_dotenv() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(".env"),
        "APOLLO_META=http://meta:8080\n",
    )
    .unwrap();

    let output = confwire(temp_dir.path(), &["bootstrap", "--dotenv"])
        .output()
        .expect("Failed to execute CLI");

    assert!(output.status.success());
    assert!(stdout_lines(&output).contains(&"apollo.meta=http://meta:8080".to_string()));
}

#[test]
fn test_bootstrap_keeps_meta_without_scheme() {
    let temp_dir = TempDir::new().unwrap();

    let output = confwire(temp_dir.path(), &["bootstrap"])
        .env("APOLLO_META", "meta-host:8080")
        .output()
        .expect("Failed to execute CLI");

    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert!(lines.contains(&"apollo.meta=meta-host:8080".to_string()));
    assert!(lines.contains(&"app.id=default".to_string()));
}

#[test]
fn test_replay_prints_one_event_per_batch() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("replay.json");
    fs::write(
        &input,
        json!({
            "sources": { "app": { "a": 1, "b": 2 } },
            "steps": [
                {
                    "source": "app",
                    "set": { "b": 3, "c": 4 },
                    "batch": [
                        { "key": "b", "kind": "MODIFIED", "new_value": 3, "old_value": 2 },
                        { "key": "c", "kind": "ADDED", "new_value": 4 }
                    ]
                },
                {
                    "source": "app",
                    "remove": ["b"],
                    "batch": [ { "key": "b", "kind": "DELETED", "old_value": 3 } ]
                },
                { "source": "app" }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let output = confwire(
        temp_dir.path(),
        &["replay", "--input", input.to_str().unwrap()],
    )
    .output()
    .expect("Failed to execute CLI");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let events: Vec<Value> = stdout_lines(&output)
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 3);

    assert_eq!(events[0]["added"]["name"], "app#added");
    assert_eq!(events[0]["added"]["properties"], json!({ "c": 4 }));
    assert_eq!(events[0]["modified"]["properties"], json!({ "b": 3 }));
    assert_eq!(events[0]["previous"]["properties"], json!({ "a": 1, "b": 2 }));

    assert_eq!(events[1]["deleted"]["properties"], json!({ "b": null }));
    assert_eq!(
        events[1]["previous"]["properties"],
        json!({ "a": 1, "b": 3, "c": 4 })
    );

    // The empty step still publishes, against the post-delete snapshot
    assert_eq!(events[2]["added"]["properties"], json!({}));
    assert_eq!(events[2]["previous"]["properties"], json!({ "a": 1, "c": 4 }));
}

#[test]
fn test_replay_last_known_policy_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("confwire.toml");
    fs::write(&config_path, "[publisher]\ndeleted_values = \"last_known\"\n").unwrap();
    let input = temp_dir.path().join("replay.json");
    fs::write(
        &input,
        json!({
            "sources": { "app": { "b": 2 } },
            "steps": [
                { "source": "app", "remove": ["b"], "batch": [ { "key": "b", "kind": "DELETED" } ] }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let output = confwire(
        temp_dir.path(),
        &[
            "replay",
            "--config",
            config_path.to_str().unwrap(),
            "--input",
            input.to_str().unwrap(),
        ],
    )
    .output()
    .expect("Failed to execute CLI");

    assert!(output.status.success());
    let event: Value = serde_json::from_str(&stdout_lines(&output)[0]).unwrap();
    assert_eq!(event["deleted"]["properties"], json!({ "b": 2 }));
}

#[test]
fn test_replay_unknown_source_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("replay.json");
    fs::write(
        &input,
        json!({ "sources": {}, "steps": [ { "source": "ghost" } ] }).to_string(),
    )
    .unwrap();

    let output = confwire(
        temp_dir.path(),
        &["replay", "--input", input.to_str().unwrap()],
    )
    .output()
    .expect("Failed to execute CLI");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_NOT_FOUND"));
    assert!(stderr.contains("ghost"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_replay_missing_input_is_io_error() {
    let temp_dir = TempDir::new().unwrap();

    let output = confwire(temp_dir.path(), &["replay", "--input", "nope.json"])
        .output()
        .expect("Failed to execute CLI");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_IO"));
}
