use std::process::Command;
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_bindelta").to_string()
}

#[test]
fn cli_diff_patch_roundtrip() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.bin");
    let target = dir.path().join("target.bin");
    let delta = dir.path().join("delta.json");
    let output = dir.path().join("output.bin");

    std::fs::write(&base, b"abcde12345abcde12345abcde12345").unwrap();
    std::fs::write(&target, b"abcdeXXXXXabcde12345abcde12345!").unwrap();

    let st = Command::new(bin())
        .args(["diff", "--base"])
        .arg(&base)
        .arg(&target)
        .arg(&delta)
        .status()
        .unwrap();
    assert!(st.success());

    let st = Command::new(bin())
        .args(["patch", "--base"])
        .arg(&base)
        .arg(&delta)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(
        std::fs::read(&output).unwrap(),
        std::fs::read(&target).unwrap()
    );
}

#[test]
fn cli_stdout_pipeline() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.bin");
    let target = dir.path().join("target.bin");
    let delta = dir.path().join("delta.json");

    std::fs::write(&base, b"the quick brown fox jumps over the lazy dog").unwrap();
    std::fs::write(&target, b"the quick red fox jumps over the lazy dog!").unwrap();

    let out = Command::new(bin())
        .args(["diff", "--backend", "suffix-automaton", "-b"])
        .arg(&base)
        .arg(&target)
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.contains("\"version\": 1"));
    std::fs::write(&delta, text).unwrap();

    let out = Command::new(bin())
        .args(["patch", "-b"])
        .arg(&base)
        .arg(&delta)
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(out.stdout, std::fs::read(&target).unwrap());
}

#[test]
fn cli_refuses_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.bin");
    let target = dir.path().join("target.bin");
    let delta = dir.path().join("delta.json");

    std::fs::write(&base, b"base").unwrap();
    std::fs::write(&target, b"target").unwrap();
    std::fs::write(&delta, b"keep me").unwrap();

    let out = Command::new(bin())
        .args(["diff", "--base"])
        .arg(&base)
        .arg(&target)
        .arg(&delta)
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("use -f to overwrite"));
    assert_eq!(std::fs::read(&delta).unwrap(), b"keep me");

    let st = Command::new(bin())
        .arg("-f")
        .args(["diff", "--base"])
        .arg(&base)
        .arg(&target)
        .arg(&delta)
        .status()
        .unwrap();
    assert!(st.success());
    assert_ne!(std::fs::read(&delta).unwrap(), b"keep me");
}

#[test]
fn cli_patch_rejects_corrupt_delta() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.bin");
    let delta = dir.path().join("delta.json");
    let output = dir.path().join("out.bin");

    std::fs::write(&base, b"short").unwrap();
    std::fs::write(
        &delta,
        r#"{"version":1,"base_len":5,"target_len":1,"commands":[{"type":"COPY","offset":6,"length":1}]}"#,
    )
    .unwrap();

    let out = Command::new(bin())
        .args(["patch", "--base"])
        .arg(&base)
        .arg(&delta)
        .arg(&output)
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid command #0"));
    assert!(!output.exists());
}

#[test]
fn cli_json_stats_and_inspect() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.bin");
    let target = dir.path().join("target.bin");
    let delta = dir.path().join("delta.json");

    std::fs::write(&base, b"ABCDEFGHIJKLMNOP").unwrap();
    std::fs::write(&target, b"ABCXEFGHIJKLMNOP").unwrap();

    let out = Command::new(bin())
        .arg("--json")
        .args(["diff", "--base"])
        .arg(&base)
        .arg(&target)
        .arg(&delta)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
    assert_eq!(stats["command"], "diff");
    assert_eq!(stats["target_size"], 16);

    let out = Command::new(bin())
        .arg("inspect")
        .arg(&delta)
        .output()
        .unwrap();
    assert!(out.status.success());
    let listing = String::from_utf8(out.stdout).unwrap();
    assert!(listing.contains("TARGET LENGTH: 16"));
    assert!(listing.contains("LITERAL"));
    assert!(listing.contains("COPY"));
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("MIN_MATCH=4"));
}
