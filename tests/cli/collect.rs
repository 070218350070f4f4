use anyhow::Result;
use serde_json::Value;

use crate::CliTest;

fn fixture() -> Result<CliTest> {
    let test = CliTest::new()?;
    test.write_file(
        ".locsyncrc.json",
        r#"{
            "scanRoots": ["src"],
            "storeRoot": "locales",
            "defaultLanguage": "en"
        }"#,
    )?;
    test.write_file(
        "src/app.py",
        "title = __(\"this is a title\")\nmsg = __(\"user.login.success\")\nbad = __(\"ghost.key.gone\")\n",
    )?;
    test.write_file(
        "locales/en.json",
        r#"{"user.login.success": "Login successful"}"#,
    )?;
    Ok(test)
}

#[test]
fn test_collect_json_records() -> Result<()> {
    let test = fixture()?;
    let output = test.run(&["collect", "--json"])?;
    assert!(output.status.success());

    let records: Vec<Value> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(records.len(), 2, "unresolved candidate must be dropped");

    let literal = records
        .iter()
        .find(|r| r["key"] == "this is a title")
        .expect("literal record present");
    assert_eq!(literal["value"], "this is a title");
    assert_eq!(literal["is_direct_text"], true);
    assert_eq!(literal["line_number"], 1);

    let lookup = records
        .iter()
        .find(|r| r["key"] == "user.login.success")
        .expect("lookup record present");
    assert_eq!(lookup["value"], "Login successful");
    assert_eq!(lookup["is_direct_text"], false);
    assert_eq!(lookup["file_type"], "flat");
    assert_eq!(lookup["source_type"], "code_scan");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ghost.key.gone"), "dropped key is diagnosed");
    Ok(())
}

#[test]
fn test_collect_missing_root_is_non_fatal() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".locsyncrc.json", r#"{"scanRoots": ["nowhere"]}"#)?;
    let output = test.run(&["collect"])?;
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Scan root does not exist"));
    Ok(())
}

#[test]
fn test_diff_reports_new_keys() -> Result<()> {
    let test = fixture()?;
    let output = test.run(&["diff"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // The literal is new; the resolved lookup key already exists in the
    // store, at a different (absent) location, so it counts as updated.
    assert!(stdout.contains("1 new"));
    assert!(stdout.contains("1 updated"));
    Ok(())
}

#[test]
fn test_push_without_token_fails() -> Result<()> {
    let test = fixture()?;
    let output = test.run(&["push", "--api-url", "https://api.example.com"])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("API token required"));
    Ok(())
}

#[test]
fn test_health_without_remote_config_fails() -> Result<()> {
    let test = fixture()?;
    let output = test.run(&["health"])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Remote API URL is not configured"));
    Ok(())
}
