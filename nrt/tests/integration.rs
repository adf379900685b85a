use std::path::{Path, PathBuf};
use std::process::{Command, Output};

struct Batch {
    _dir: tempfile::TempDir,
    path: PathBuf,
}

impl Batch {
    fn new(name: &str, body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        Self { _dir: dir, path }
    }
}

fn nrt(args: &[&str], path: &Path) -> Output {
    // Use the compiled binary directly
    let bin_path = env!("CARGO_BIN_EXE_nrt");
    Command::new(bin_path)
        .args(args)
        .arg(path)
        .output()
        .expect("Failed to run nrt")
}

const VALID_BATCH: &str = r#"[
    {"signature": "app1:0.0.0.0:80:example.com:/",
     "parameters": {"allow": ["10.0.0.0/8"], "deny": ["all"]}},
    {"signature": "app2:0.0.0.0:80:example.com:/api/",
     "parameters": {"allow": ["all"], "language": "python"}}
]"#;

const CONFLICT_BATCH: &str = r#"[
    {"signature": "app1:0.0.0.0:80:example.com:/"},
    {"signature": "app2:0.0.0.0:80:example.com:/"}
]"#;

#[test]
fn test_resolve_prints_tree() {
    let batch = Batch::new("batch.json", VALID_BATCH);
    let output = nrt(&["resolve"], &batch.path);
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["valid"], true);
    assert_eq!(tree["directives"].as_array().unwrap().len(), 2);

    let server = &tree["listens"]["0.0.0.0:80"]["server_names"]["example.com"];
    assert_eq!(server["locations"]["/"]["alias"][0], "app1");
    assert_eq!(server["locations"]["/api/"]["language"], "python");
}

#[test]
fn test_resolve_invalid_tree_still_succeeds() {
    let batch = Batch::new("batch.json", CONFLICT_BATCH);
    let output = nrt(&["resolve"], &batch.path);
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["valid"], false);
}

#[test]
fn test_resolve_rejects_malformed_batch() {
    let batch = Batch::new(
        "batch.json",
        r#"[{"signature": "app1:0.0.0.0:80:example.com:/wrong"}]"#,
    );
    let output = nrt(&["resolve"], &batch.path);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Directive #0"));
}

#[test]
fn test_duplicate_warning_shown_by_default() {
    let batch = Batch::new(
        "batch.json",
        r#"[
            {"signature": "app1:0.0.0.0:80:example.com:/", "parameters": {"allow": ["10.0.0.1"]}},
            {"signature": "app1:0.0.0.0:80:example.com:/", "parameters": {"allow": ["10.0.0.2"]}}
        ]"#,
    );
    let output = Command::new(env!("CARGO_BIN_EXE_nrt"))
        .env_remove("RUST_LOG")
        .arg("resolve")
        .arg(&batch.path)
        .output()
        .expect("Failed to run nrt");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("duplicate directive"));

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["directives"].as_array().unwrap().len(), 1);
}

#[test]
fn test_validate_valid_batch() {
    let batch = Batch::new(
        "batch.toml",
        r#"
            [[directive]]
            signature = "app1:0.0.0.0:80:example.com:/"

            [directive.parameters]
            allow = ["all"]
        "#,
    );
    let output = nrt(&["validate"], &batch.path);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("is valid"));
}

#[test]
fn test_validate_lists_invalid_locations() {
    let batch = Batch::new("batch.json", CONFLICT_BATCH);
    let output = nrt(&["validate"], &batch.path);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("0.0.0.0:80 example.com/"));
}

#[test]
fn test_validate_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.json"), VALID_BATCH).unwrap();
    std::fs::write(
        dir.path().join("b.toml"),
        r#"
            [[directive]]
            signature = "app3:10.0.0.1:8080:other.org:/"

            [directive.parameters]
            deny = ["192.168.0.0/16"]
        "#,
    )
    .unwrap();

    let output = nrt(&["validate"], dir.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("3 directive(s)"));
}

#[test]
fn test_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_nrt"))
        .arg("version")
        .output()
        .expect("Failed to run nrt");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("NRT v"));
}
