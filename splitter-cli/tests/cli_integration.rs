use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn splitter_cmd(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("splitter").expect("Failed to find splitter binary");
    cmd.current_dir(workdir)
        .arg("--no-color")
        .arg("--cache-dir")
        .arg(workdir.join("cache"));
    cmd
}

#[test]
fn test_split_non_existent_source() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    splitter_cmd(dir.path())
        .arg("split")
        .arg(dir.path().join("surely/this/does/not/exist.mp4"))
        .assert()
        .failure()
        .code(1)
        .stdout(contains("✗ Error: Source video not found"));

    Ok(())
}

#[test]
fn test_split_non_existent_source_json() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    let output = splitter_cmd(dir.path())
        .arg("split")
        .arg(dir.path().join("missing.mp4"))
        .arg("--json")
        .output()?;

    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["success"], false);
    assert_eq!(report["kind"], "MissingInput");

    Ok(())
}

#[test]
fn test_split_invalid_minutes() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let source = dir.path().join("clip.mp4");
    fs::write(&source, "dummy content")?;

    splitter_cmd(dir.path())
        .arg("split")
        .arg(&source)
        .args(["-m", "abc"])
        .assert()
        .failure()
        .stdout(contains("Invalid segment duration 'abc'"));

    Ok(())
}

#[test]
fn test_provision_without_binary_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let empty = dir.path().join("empty");
    fs::create_dir_all(&empty)?;

    splitter_cmd(dir.path())
        .arg("--ffmpeg-dir")
        .arg(&empty)
        .arg("provision")
        .assert()
        .failure()
        .stderr(contains("Could not provision ffmpeg"))
        .stderr(contains("not found"));

    Ok(())
}

#[test]
fn test_split_requires_source_argument() {
    let dir = tempdir().unwrap();

    splitter_cmd(dir.path())
        .arg("split")
        .assert()
        .failure()
        .stderr(contains("SOURCE"));
}

#[cfg(unix)]
mod with_fake_ffmpeg {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const FAKE_FFMPEG: &str = r#"#!/bin/sh
if [ "$1" = "-version" ]; then
    echo "ffmpeg version 7.1-fake Copyright (c) 2000-2024 the FFmpeg developers"
    exit 0
fi
for last; do :; done
printf 'frame=  250 fps=0.0 q=-1.0 size=N/A time=00:20:00.00 bitrate=N/A speed=1x\r' >&2
printf 'Warning: non-monotonous DTS\n' >&2
i=0
while [ $i -lt 5 ]; do
    printf 'segment' > "$(printf "$last" $i)"
    i=$((i+1))
done
exit 0
"#;

    fn install_fake(dir: &Path) -> Result<std::path::PathBuf, Box<dyn Error>> {
        let bin_dir = dir.join("bin");
        fs::create_dir_all(&bin_dir)?;
        let binary = bin_dir.join("ffmpeg");
        fs::write(&binary, FAKE_FFMPEG)?;
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755))?;
        Ok(bin_dir)
    }

    #[test]
    fn test_split_end_to_end() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let bin_dir = install_fake(dir.path())?;
        let source = dir.path().join("sample.mp4");
        fs::write(&source, "dummy content")?;

        splitter_cmd(dir.path())
            .arg("--ffmpeg-dir")
            .arg(&bin_dir)
            .arg("split")
            .arg(&source)
            .assert()
            .success()
            .stdout(contains("Processing... 00:20:00.00"))
            .stdout(contains("Warning: non-monotonous DTS"))
            .stdout(contains("✓ Video successfully split!"))
            .stdout(contains("  ✓ sample_splitted_004.mp4 (0.00 MB)"))
            .stdout(contains("Total 5 files created."));

        for i in 0..5 {
            assert!(dir.path().join("output").join(format!("sample_splitted_{i:03}.mp4")).is_file());
        }
        let cached: Vec<_> = fs::read_dir(dir.path().join("cache"))?.collect::<Result<_, _>>()?;
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].file_name(), "ffmpeg");

        Ok(())
    }

    #[test]
    fn test_split_json_report() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let bin_dir = install_fake(dir.path())?;
        let source = dir.path().join("sample.mkv");
        fs::write(&source, "dummy content")?;
        let out = dir.path().join("segments");

        let output = splitter_cmd(dir.path())
            .arg("--ffmpeg-dir")
            .arg(&bin_dir)
            .arg("split")
            .arg(&source)
            .arg("-o")
            .arg(&out)
            .args(["-m", "10", "--json"])
            .output()?;

        assert!(output.status.success());
        let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(report["success"], true);
        assert_eq!(report["artifacts"].as_array().map(Vec::len), Some(5));
        assert_eq!(report["total_bytes"], 5 * "segment".len());
        assert!(out.join("sample_splitted_000.mkv").is_file());

        Ok(())
    }

    #[test]
    fn test_provision_reports_source_and_version() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let bin_dir = install_fake(dir.path())?;

        splitter_cmd(dir.path())
            .arg("--ffmpeg-dir")
            .arg(&bin_dir)
            .arg("provision")
            .assert()
            .success()
            .stdout(contains("ffmpeg is ready"))
            .stdout(contains(bin_dir.join("ffmpeg").display().to_string()));

        // The second run finds the cached copy.
        splitter_cmd(dir.path())
            .arg("--ffmpeg-dir")
            .arg(&bin_dir)
            .arg("provision")
            .assert()
            .success()
            .stdout(contains("already cached"));

        Ok(())
    }

    #[test]
    fn test_interactive_session() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let bin_dir = install_fake(dir.path())?;
        let source = dir.path().join("sample.mp4");
        fs::write(&source, "dummy content")?;

        splitter_cmd(dir.path())
            .arg("--ffmpeg-dir")
            .arg(&bin_dir)
            .arg("interactive")
            .write_stdin(format!("{}\n\n\n\n\n", source.display()))
            .assert()
            .success()
            .stdout(contains("ffmpeg loaded successfully"))
            .stdout(contains("Video successfully split!"))
            .stdout(contains("Press Enter to continue"));

        assert!(dir.path().join("output").join("sample_splitted_002.mp4").is_file());

        Ok(())
    }
}
