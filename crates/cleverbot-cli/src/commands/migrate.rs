use super::snapshot_store;
use anyhow::{Context, Result};
use cleverbot_infrastructure::AtomicFile;
use colored::Colorize;
use semver::Version;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Migrates a snapshot file in explicit mode, reporting every lossy step.
pub fn run(input: &Path, target: Option<Version>, output: &Path) -> Result<()> {
    let store = snapshot_store()?;
    let target = target.unwrap_or_else(|| store.manager().current_version().clone());

    let bytes = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let migrated = store
        .migrate(&bytes, &target)
        .with_context(|| format!("Failed to migrate {} to {}", input.display(), target))?;

    for notice in &migrated.notices {
        eprintln!("{}", format!("Regression Notice: {}", notice.description).yellow());
    }

    if output == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&migrated.value)?;
        writeln!(stdout)?;
    } else {
        AtomicFile::new(output)
            .save(&migrated.value)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }

    tracing::info!(
        "Migrated {} to {} ({} regression notice(s))",
        input.display(),
        target,
        migrated.notices.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    #[test]
    fn test_migrates_legacy_file_to_current() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("old.json");
        let output = dir.path().join("new.json");
        let legacy = json!([
            {"key": "API_KEY", "continuation": "cs", "timeout": null},
            [{"name": "alice"}]
        ]);
        fs::write(&input, serde_json::to_vec(&legacy).unwrap()).unwrap();

        run(&input, None, &output).unwrap();

        let migrated: Value = serde_json::from_slice(&fs::read(&output).unwrap()).unwrap();
        assert_eq!(migrated["kind"], "cleverbot");
        assert_eq!(migrated["version"], "3.0.0");
        assert_eq!(migrated["state"]["continuation"], "cs");
        assert_eq!(
            migrated["state"]["conversations"]["named"]["alice"]["kind"],
            "conversation"
        );
    }

    #[test]
    fn test_downgrades_to_target() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("current.json");
        let output = dir.path().join("old.json");
        let current = json!({
            "kind": "cleverbot",
            "version": "3.0.0",
            "state": {"key": "API_KEY", "moods": {"mood1": 50.0}}
        });
        fs::write(&input, serde_json::to_vec(&current).unwrap()).unwrap();

        run(&input, Some(Version::new(2, 1, 1)), &output).unwrap();

        let migrated: Value = serde_json::from_slice(&fs::read(&output).unwrap()).unwrap();
        assert_eq!(
            migrated,
            json!([{"key": "API_KEY", "continuation": null, "timeout": null}, []])
        );
    }

    #[test]
    fn test_unrecognised_input_fails() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("bad.json");
        fs::write(&input, b"{\"hello\": 1}").unwrap();

        let err = run(&input, None, &dir.path().join("out.json")).unwrap_err();
        assert!(format!("{err:#}").contains("matches no known schema"));
    }
}
