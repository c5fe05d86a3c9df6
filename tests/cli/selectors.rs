use anyhow::Result;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_selectors_prints_discovered_set() -> Result<()> {
    let test = CliTest::with_build()?;

    let output = test.selectors_command().output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines.contains(&"btn"));
    assert!(lines.contains(&"btn-primary"));
    assert!(lines.contains(&"app"));

    let mut sorted = lines.clone();
    sorted.sort();
    assert_eq!(lines, sorted, "selectors should be sorted");

    Ok(())
}

#[test]
fn test_selectors_does_not_touch_output() -> Result<()> {
    let test = CliTest::with_build()?;

    test.selectors_command().output()?;

    assert_eq!(
        test.read_file("dist/assets/index.css")?,
        ".btn{color:red}.btn-primary{color:blue}.unused{color:green}"
    );

    Ok(())
}

#[test]
fn test_selectors_verbose_summary_on_stderr() -> Result<()> {
    let test = CliTest::with_build()?;

    let output = test.selectors_command().arg("--verbose").output()?;

    assert!(stderr(&output).contains("Scanned 1 module(s)"));
    assert!(!stdout(&output).contains("Scanned"));

    Ok(())
}

#[test]
fn test_selectors_respects_ignores() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".csssweeprc.json",
        r#"{ "ignores": ["**/*.test.js"] }"#,
    )?;
    test.write_file("src/app.js", "'kept'")?;
    test.write_file("src/app.test.js", "'ignored'")?;

    let output = test.selectors_command().output()?;

    let out = stdout(&output);
    assert!(out.lines().any(|l| l == "kept"), "{}", out);
    assert!(!out.lines().any(|l| l == "ignored"), "{}", out);

    Ok(())
}
