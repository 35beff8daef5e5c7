// CLI integration tests against a temporary profile directory.
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

const MANIFEST: &str = r#"{
  "aiida.workflows": [
    {
      "name": "common_workflows.relax.quantum",
      "engines": [
        { "name": "relax", "code_plugin": "quantum.pw", "description": "Main relaxation" }
      ],
      "protocols": ["fast", "moderate"]
    },
    {
      "name": "common_workflows.relax.classical",
      "engines": [
        { "name": "relax", "code_plugin": "classical.md" }
      ]
    },
    { "name": "foo.bar" }
  ]
}"#;

fn cwf(profile: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cwf"))
        .env_remove("CWF_PROFILE_DIR")
        .env_remove("CWF_REGISTRY_FILE")
        .env("NO_COLOR", "1")
        .arg("--profile-dir")
        .arg(profile)
        .args(args)
        .output()
        .expect("run cwf")
}

fn setup() -> tempfile::TempDir {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("entry_points.json"), MANIFEST).expect("manifest");
    temp
}

fn store(profile: &Path) -> Value {
    let text = fs::read_to_string(profile.join("store.json")).expect("store.json");
    serde_json::from_str(&text).expect("valid json")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn launch_reuses_default_structure() {
    let temp = setup();
    let profile = temp.path();

    let add = cwf(
        profile,
        &["code", "add", "--label", "pw@localhost", "--plugin", "quantum.pw"],
    );
    assert!(add.status.success(), "{}", stderr(&add));

    let first = cwf(profile, &["launch", "relax", "quantum", "-d"]);
    assert!(first.status.success(), "{}", stderr(&first));
    let second = cwf(profile, &["launch", "relax", "quantum", "-r", "cell"]);
    assert!(second.status.success(), "{}", stderr(&second));

    let data = store(profile);
    let structures = data["structures"].as_array().expect("structures");
    assert_eq!(structures.len(), 1);
    let uuid = structures[0]["uuid"].as_str().expect("uuid");

    let processes = data["processes"].as_array().expect("processes");
    assert_eq!(processes.len(), 2);
    assert_eq!(processes[0]["state"], "waiting");
    assert_eq!(processes[1]["state"], "created");
    assert_eq!(processes[1]["inputs"]["relaxation_type"], "cell");
    for process in processes {
        assert_eq!(process["inputs"]["structure"], uuid);
    }
}

#[test]
fn invalid_relaxation_type_fails() {
    let temp = setup();
    let out = cwf(temp.path(), &["launch", "relax", "quantum", "-r", "everything"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("everything"));
}

#[test]
fn unknown_plugin_lists_choices() {
    let temp = setup();
    let out = cwf(temp.path(), &["launch", "eos", "bar"]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("classical, quantum"), "{}", err);
}

#[test]
fn missing_code_is_reported() {
    let temp = setup();
    let out = cwf(temp.path(), &["launch", "relax", "classical"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("could not find a configured code for the plugin `classical.md`."));
}

#[test]
fn show_engines_does_not_launch() {
    let temp = setup();
    let out = cwf(temp.path(), &["launch", "relax", "quantum", "--show-engines"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("quantum.pw"));
    assert!(store(temp.path())["processes"]
        .as_array()
        .map_or(true, |p| p.is_empty()));
}

#[test]
fn plugins_lists_implementations() {
    let temp = setup();
    let out = cwf(temp.path(), &["plugins"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("quantum"));
    assert!(stdout.contains("classical"));
    assert!(!stdout.contains("foo.bar"));
}

#[test]
fn help_does_not_touch_store() {
    let temp = setup();
    let out = cwf(temp.path(), &["launch", "relax", "--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--relaxation-type"));
    assert!(!temp.path().join("store.json").exists());
}

#[test]
fn default_structure_command_is_idempotent() {
    let temp = setup();
    let first = cwf(temp.path(), &["structure", "default"]);
    let second = cwf(temp.path(), &["structure", "default"]);
    assert!(first.status.success(), "{}", stderr(&first));
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(store(temp.path())["structures"].as_array().map(Vec::len), Some(1));
}

#[test]
fn relax_types_does_not_create_profile() {
    let temp = tempfile::tempdir().expect("tempdir");
    let profile = temp.path().join("fresh");
    let out = cwf(&profile, &["relax-types"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(String::from_utf8_lossy(&out.stdout).contains("atoms_cell"));
    assert!(!profile.exists());
}
