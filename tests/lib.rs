mod helpers;

use std::fs;
use std::io;
use std::path::Path;

use crate::helpers::{TestCommand, TestDirs};

////////////////////////////////////////////////////////////////////////////////
// Utilities
////////////////////////////////////////////////////////////////////////////////

const GROUPING_UNIT: &str = r#"
description = "Groups files by matching rules"
kind = "grouping"

[[variables]]
name = "manual_grouping"
description = "Ordered list of matched group names"
[[variables]]
name = "primary_group"
description = "First matched group, or Others"
[[variables]]
name = "groups"
description = "All matched groups"

[[config.groups]]
name = "Docs"
[[config.groups.strategies]]
type = "regex"
pattern = '\.(pdf|docx?)$'
"#;

fn write_grouping_unit(dirs: &TestDirs) -> io::Result<()> {
    fs::write(dirs.plugins.join("manual_grouping.toml"), GROUPING_UNIT)
}

#[track_caller]
fn assert_no_chunk_files(target: &Path) {
    for index in 0..10 {
        let mut part = target.as_os_str().to_os_string();
        part.push(format!(".part{index}"));
        assert!(
            !Path::new(&part).exists(),
            "leftover chunk file {}",
            Path::new(&part).display()
        );
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////

#[test]
fn init_creates_default_config() -> io::Result<()> {
    let dirs = TestDirs::default()?;

    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .arg("init")
        .run()?;
    let path = dirs.config.join("curator.toml");
    assert!(path.is_file());
    assert!(fs::read_to_string(&path)?.contains("{primary_group}/{filename}"));

    // A second init leaves the existing file alone.
    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .arg("init")
        .run()?;
    Ok(())
}

#[test]
fn init_with_output_directory() -> io::Result<()> {
    let dirs = TestDirs::default()?;
    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .arg("init")
        .arg("--output")
        .arg(&dirs.output)
        .run()?;
    let contents = fs::read_to_string(dirs.config.join("curator.toml"))?;
    assert!(contents.contains(&format!("output = \"{}\"", dirs.output.display())));
    Ok(())
}

#[test]
fn template_set_and_get() -> io::Result<()> {
    let dirs = TestDirs::default()?;
    dirs.write_config("")?;

    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .arg("template")
        .arg("{ext}/{filename}")
        .run()?;
    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .expect_stdout("{ext}/{filename}\n".to_string())
        .arg("template")
        .run()?;
    Ok(())
}

#[test]
fn status_runs_with_plugins() -> io::Result<()> {
    let dirs = TestDirs::default()?;
    write_grouping_unit(&dirs)?;
    dirs.write_config("template = \"{primary_group}/{filename}\"\n")?;

    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .arg("status")
        .run()?;
    Ok(())
}

#[test]
fn preview_renders_group_destination() -> io::Result<()> {
    let dirs = TestDirs::default()?;
    write_grouping_unit(&dirs)?;
    dirs.write_config("template = \"{primary_group}/{basename}.{ext}\"\n")?;
    let file = dirs.src.join("Report.pdf");
    fs::write(&file, b"report contents")?;

    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .expect_stdout(format!(
            "{} -> {}\n",
            file.display(),
            dirs.output.join("Docs/Report.pdf").display()
        ))
        .arg("preview")
        .arg(&file)
        .run()?;
    Ok(())
}

#[test]
fn preview_unmatched_file_goes_to_others() -> io::Result<()> {
    let dirs = TestDirs::default()?;
    write_grouping_unit(&dirs)?;
    dirs.write_config("template = \"{primary_group}/{filename}\"\n")?;
    let file = dirs.src.join("song.mp3");
    fs::write(&file, b"audio")?;

    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .expect_stdout(format!(
            "{} -> {}\n",
            file.display(),
            dirs.output.join("Others/song.mp3").display()
        ))
        .arg("preview")
        .arg(&file)
        .run()?;
    Ok(())
}

#[test]
fn preview_preserves_unresolved_variables() -> io::Result<()> {
    let dirs = TestDirs::default()?;
    dirs.write_config("template = \"{year}/{filename}\"\n")?;
    let file = dirs.src.join("notes.txt");
    fs::write(&file, b"x")?;

    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .expect_stdout(format!(
            "{} -> {}\n",
            file.display(),
            dirs.output.join("{year}/notes.txt").display()
        ))
        .arg("preview")
        .arg(&file)
        .run()?;
    Ok(())
}

#[test]
fn preview_template_override() -> io::Result<()> {
    let dirs = TestDirs::default()?;
    dirs.write_config("template = \"{filename}\"\n")?;
    let file = dirs.src.join("notes.txt");
    fs::write(&file, b"x")?;

    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .expect_stdout(format!(
            "{} -> {}\n",
            file.display(),
            dirs.output.join("txt/notes.txt").display()
        ))
        .arg("preview")
        .arg("--template")
        .arg("{ext}/{filename}")
        .arg(&file)
        .run()?;
    Ok(())
}

#[test]
fn sort_copies_and_verifies() -> io::Result<()> {
    let dirs = TestDirs::default()?;
    write_grouping_unit(&dirs)?;
    dirs.write_config(
        "template = \"{primary_group}/{filename}\"\nhash = \"sha256\"\nworkers = 4\n",
    )?;
    let file = dirs.src.join("Thesis.pdf");
    // 5 MiB of non-uniform data so the chunked path is taken and a merge
    // ordering mistake would be caught by the hash check.
    let data: Vec<u8> = (0..5 * 1024 * 1024u32).map(|i| (i % 251) as u8).collect();
    fs::write(&file, &data)?;

    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .arg("sort")
        .arg(&file)
        .run()?;

    let target = dirs.output.join("Docs/Thesis.pdf");
    assert!(target.is_file());
    assert_eq!(fs::metadata(&target)?.len(), data.len() as u64);
    assert_eq!(fs::read(&target)?, data);
    assert_no_chunk_files(&target);
    Ok(())
}

#[test]
fn sort_dry_run_copies_nothing() -> io::Result<()> {
    let dirs = TestDirs::default()?;
    dirs.write_config("template = \"{filename}\"\n")?;
    let file = dirs.src.join("notes.txt");
    fs::write(&file, b"x")?;

    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .expect_stdout(format!(
            "{} -> {}\n",
            file.display(),
            dirs.output.join("notes.txt").display()
        ))
        .arg("sort")
        .arg("--dry-run")
        .arg(&file)
        .run()?;
    assert!(!dirs.output.exists());
    Ok(())
}

#[test]
fn sort_missing_file_does_not_abort_batch() -> io::Result<()> {
    let dirs = TestDirs::default()?;
    dirs.write_config("template = \"{filename}\"\n")?;
    let missing = dirs.src.join("missing.txt");
    let good = dirs.src.join("good.txt");
    fs::write(&good, b"data")?;

    TestCommand::new(&dirs)
        .expect_exit_code(2)
        .arg("sort")
        .arg(&missing)
        .arg(&good)
        .run()?;
    // The good file was still copied.
    assert_eq!(fs::read(dirs.output.join("good.txt"))?, b"data");
    Ok(())
}

#[test]
fn reload_requires_a_loaded_plugin() -> io::Result<()> {
    let dirs = TestDirs::default()?;
    write_grouping_unit(&dirs)?;
    dirs.write_config("template = \"{primary_group}/{filename}\"\n")?;

    TestCommand::new(&dirs)
        .expect_exit_code(0)
        .arg("reload")
        .arg("manual_grouping")
        .run()?;
    // The template does not use the plugin, so it is not loaded.
    TestCommand::new(&dirs)
        .expect_exit_code(2)
        .arg("reload")
        .arg("nonexistent")
        .run()?;
    Ok(())
}
