//! Integration tests for artifact-cache

mod cli_tests {
    use artifact_cache::cache::metadata::{last_accessed, set_accessed};
    use artifact_cache::Digest;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    /// Command isolated from the user's config and cache
    fn artifact_cache(home: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("artifact-cache");
        cmd.arg("--config")
            .arg(home.path().join("config.toml"))
            .arg("--cache-dir")
            .arg(home.path().join("cache"))
            .env_remove("ARTIFACT_CACHE_CONFIG")
            .env_remove("ARTIFACT_CACHE_DIR");
        cmd
    }

    fn write_file(home: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = home.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("artifact-cache")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Content-addressed build artifact cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("artifact-cache")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("artifact-cache"));
    }

    #[test]
    fn add_then_cat() {
        let home = TempDir::new().unwrap();
        let file = write_file(&home, "libfoo.so", "shared object bytes");
        let digest = Digest::of_bytes(b"shared object bytes");

        artifact_cache(&home)
            .arg("add")
            .arg(&file)
            .assert()
            .success()
            .stdout(predicate::str::contains(digest.as_str()));

        artifact_cache(&home)
            .args(["cat", digest.as_str()])
            .assert()
            .success()
            .stdout("shared object bytes");
    }

    #[test]
    fn add_twice_is_idempotent() {
        let home = TempDir::new().unwrap();
        let file = write_file(&home, "a.jar", "jar");

        artifact_cache(&home).arg("add").arg(&file).assert().success();
        artifact_cache(&home).arg("add").arg(&file).assert().success();

        artifact_cache(&home)
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(format!("{}\n", Digest::of_bytes(b"jar")));
    }

    #[test]
    fn path_points_into_cache_dir() {
        let home = TempDir::new().unwrap();
        let file = write_file(&home, "out.o", "object");
        let digest = Digest::of_bytes(b"object");

        artifact_cache(&home).arg("add").arg(&file).assert().success();

        let expected = home.path().join("cache").join(digest.as_str());
        artifact_cache(&home)
            .args(["path", digest.as_str()])
            .assert()
            .success()
            .stdout(predicate::str::contains(expected.display().to_string()));
    }

    #[test]
    fn reading_records_access_before_exit() {
        let home = TempDir::new().unwrap();
        let file = write_file(&home, "lib.a", "archive");
        let digest = Digest::of_bytes(b"archive");
        artifact_cache(&home).arg("add").arg(&file).assert().success();

        let entry = home.path().join("cache").join(digest.as_str());
        for command in ["cat", "path"] {
            set_accessed(&entry, UNIX_EPOCH + Duration::from_secs(1_000)).unwrap();

            artifact_cache(&home)
                .args([command, digest.as_str()])
                .assert()
                .success();

            assert!(
                last_accessed(&entry).unwrap().timestamp() > 1_000,
                "{command} left the access time untouched"
            );
        }
    }

    #[test]
    fn cat_missing_digest() {
        let home = TempDir::new().unwrap();
        artifact_cache(&home)
            .args(["cat", "doesnotexist"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Artifact not found"));
    }

    #[test]
    fn cat_invalid_digest() {
        let home = TempDir::new().unwrap();
        artifact_cache(&home)
            .args(["cat", "../escape"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid digest"));
    }

    #[test]
    fn list_json_empty() {
        let home = TempDir::new().unwrap();
        artifact_cache(&home)
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn list_json_after_add() {
        let home = TempDir::new().unwrap();
        let file = write_file(&home, "b.bin", "twelve bytes");

        artifact_cache(&home).arg("add").arg(&file).assert().success();

        artifact_cache(&home)
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"size_bytes\": 12"));
    }

    #[test]
    fn cache_dir_that_is_a_file() {
        let home = TempDir::new().unwrap();
        write_file(&home, "cache", "not a directory");

        artifact_cache(&home)
            .arg("list")
            .assert()
            .failure()
            .stderr(predicate::str::contains("is unusable"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn config_set_and_show() {
        let home = TempDir::new().unwrap();

        artifact_cache(&home)
            .args(["config", "set", "fetch.concurrency", "3"])
            .assert()
            .success();

        artifact_cache(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("concurrency = 3"));
    }

    #[test]
    fn config_path() {
        let home = TempDir::new().unwrap();
        artifact_cache(&home)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }
}
