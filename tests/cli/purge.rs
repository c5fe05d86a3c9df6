use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr, stdout};

const ORIGINAL_CSS: &str = ".btn{color:red}.btn-primary{color:blue}.unused{color:green}";

#[test]
fn test_dry_run_reports_without_writing() -> Result<()> {
    let test = CliTest::with_build()?;

    let output = test.purge_command().output()?;

    assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "Would purge 1 stylesheet(s), 1 selector(s) rejected:\n\
         \x20 assets/index.css  59 B -> 39 B  (1 rejected)\n\
         Run with --apply to write the purged CSS.\n"
    );
    assert_eq!(test.read_file("dist/assets/index.css")?, ORIGINAL_CSS);

    Ok(())
}

#[test]
fn test_apply_rewrites_stylesheet() -> Result<()> {
    let test = CliTest::with_build()?;

    let output = test.purge_command().arg("--apply").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).starts_with("Purged 1 stylesheet(s), 1 selector(s) rejected:"));
    assert_eq!(
        test.read_file("dist/assets/index.css")?,
        ".btn{color:red}.btn-primary{color:blue}"
    );
    // Chunks are never touched
    assert_eq!(test.read_file("dist/assets/index.js")?, "console.log(1)");

    Ok(())
}

#[test]
fn test_second_apply_has_nothing_to_purge() -> Result<()> {
    let test = CliTest::with_build()?;
    test.purge_command().arg("--apply").output()?;

    let output = test.purge_command().output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("nothing to purge"));

    Ok(())
}

#[test]
fn test_verbose_lists_rejected_selectors() -> Result<()> {
    let test = CliTest::with_build()?;

    let output = test.purge_command().arg("-v").output()?;

    let out = stdout(&output);
    assert!(out.starts_with("Scanned 1 module(s) (0 skipped)"), "{}", out);
    assert!(out.contains("      - .unused\n"), "{}", out);

    Ok(())
}

#[test]
fn test_safelist_flag_keeps_selector() -> Result<()> {
    let test = CliTest::with_build()?;

    let output = test
        .purge_command()
        .args(["--safelist", "/^unu/", "--apply"])
        .output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("nothing to purge"));
    assert_eq!(test.read_file("dist/assets/index.css")?, ORIGINAL_CSS);

    Ok(())
}

#[test]
fn test_content_flag_scans_extra_files() -> Result<()> {
    let test = CliTest::with_build()?;
    test.write_file("templates/page.hbs", r#"<p class="unused">hi</p>"#)?;

    let output = test
        .purge_command()
        .args(["--content", "templates/*.hbs"])
        .output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("nothing to purge"));

    Ok(())
}

#[test]
fn test_config_file_out_dir() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".csssweeprc.json", r#"{ "outDir": "build" }"#)?;
    test.write_file("src/app.ts", r#"export const cls = "card";"#)?;
    test.write_file("build/app.css", ".card{}.gone{}")?;

    let output = test.purge_command().arg("--apply").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(test.read_file("build/app.css")?, ".card{}");

    Ok(())
}

#[test]
fn test_root_flag() -> Result<()> {
    let test = CliTest::with_build()?;

    let mut cmd = test.purge_command();
    cmd.arg("--root").arg(test.root()).arg("--apply");
    cmd.current_dir(std::env::temp_dir());
    let output = cmd.output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        test.read_file("dist/assets/index.css")?,
        ".btn{color:red}.btn-primary{color:blue}"
    );

    Ok(())
}

#[test]
fn test_missing_out_dir_is_an_error() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/main.js", "'btn'")?;

    let output = test.purge_command().output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).starts_with("Error:"), "{}", stderr(&output));

    Ok(())
}

#[test]
fn test_invalid_safelist_regex_is_an_error() -> Result<()> {
    let test = CliTest::with_build()?;

    let output = test.purge_command().args(["--safelist", "/[/"]).output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("safelist"), "{}", stderr(&output));

    Ok(())
}

#[test]
fn test_source_parse_error_aborts() -> Result<()> {
    let test = CliTest::with_build()?;
    test.write_file("src/broken.js", "const = ;")?;

    let output = test.purge_command().arg("--apply").output()?;

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(test.read_file("dist/assets/index.css")?, ORIGINAL_CSS);

    Ok(())
}
