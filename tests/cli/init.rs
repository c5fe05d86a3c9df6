use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["includes"], serde_json::json!(["src"]));
    assert_eq!(parsed["outDir"], "dist");
    assert!(parsed["safelist"].is_object(), "Config should have 'safelist'");
    assert!(
        content.contains("\n  \""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "\u{2713} Created .csssweeprc.json\n");
    assert!(test.root().join(".csssweeprc.json").exists());

    let content = test.read_file(".csssweeprc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".csssweeprc.json", "{}")?;

    let output = test.command().arg("init").output()?;

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stderr(&output), "Error: .csssweeprc.json already exists\n");
    assert_eq!(test.read_file(".csssweeprc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::with_build()?;

    test.command().arg("init").output()?;

    let output = test.purge_command().arg("--apply").output()?;
    assert!(
        output.status.success(),
        "Purge should work with initialized config. stderr: {}",
        stderr(&output)
    );

    Ok(())
}
