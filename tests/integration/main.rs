//! Integration tests for xbps-prune

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn xbps_prune() -> Command {
        cargo_bin_cmd!("xbps-prune")
    }

    #[test]
    fn help_displays() {
        xbps_prune()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("trim old package versions"));
    }

    #[test]
    fn version_displays() {
        xbps_prune()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("xbps-prune"));
    }

    #[test]
    fn missing_keep_is_usage_error() {
        xbps_prune()
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("--keep"));
    }

    #[test]
    fn non_numeric_keep_is_usage_error() {
        xbps_prune().args(["-n", "three"]).assert().failure().code(2);
    }

    #[test]
    fn keep_below_two_is_refused_without_touching_cache() {
        for keep in ["1", "0", "-1"] {
            xbps_prune()
                .args(["-n", keep, "-d", "true", "-c", "/nonexistent/cache"])
                .assert()
                .success()
                .stdout(predicate::str::contains("refusing to prune that much"));
        }
    }

    #[test]
    fn missing_cache_dir_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("cache");

        xbps_prune()
            .arg("--config")
            .arg(temp.path().join("none.toml"))
            .args(["-n", "3", "-c"])
            .arg(&missing)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cache directory not found"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        xbps_prune()
            .arg("--config")
            .arg(temp.path().join("custom.toml"))
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        xbps_prune()
            .arg("--config")
            .arg(temp.path().join("none.toml"))
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("/var/cache/xbps"));
    }
}

#[cfg(unix)]
mod prune_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use serial_test::serial;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A cache directory plus a config pointing at a fake `xbps-query`
    struct Fixture {
        _temp: TempDir,
        cache: PathBuf,
        config: PathBuf,
    }

    impl Fixture {
        /// `bar` is held and depends on `baz`
        fn new() -> Self {
            Self::with_query(
                r#"case "$2" in
  -H) echo bar-9.0_1 ;;
  --fulldeptree) if [ "$4" = "bar" ]; then echo baz-1.0_1; fi ;;
  *) exit 9 ;;
esac"#,
            )
        }

        fn with_query(body: &str) -> Self {
            let temp = TempDir::new().unwrap();
            let cache = temp.path().join("cache");
            fs::create_dir(&cache).unwrap();

            let script = temp.path().join("xbps-query");
            fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

            let config = temp.path().join("config.toml");
            fs::write(
                &config,
                format!(
                    "[cache]\ndir = \"{}\"\n\n[query]\ncommand = \"{}\"\n",
                    cache.display(),
                    script.display()
                ),
            )
            .unwrap();

            Self {
                _temp: temp,
                cache,
                config,
            }
        }

        /// Add `count` versions of `name`, oldest first
        fn package(&self, name: &str, count: usize) -> &Self {
            for i in 0..count {
                let archive = format!("{name}-1.{i}_1.x86_64.xbps");
                fs::write(self.cache.join(&archive), [0u8; 1000]).unwrap();
                fs::write(self.cache.join(format!("{archive}.sig")), [0u8; 24]).unwrap();
            }
            self
        }

        fn exists(&self, name: &str) -> bool {
            self.cache.join(name).exists()
        }

        fn file_count(&self) -> usize {
            fs::read_dir(&self.cache).unwrap().count()
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("xbps-prune");
            cmd.arg("--config").arg(&self.config);
            cmd
        }
    }

    fn write(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"sig").unwrap();
    }

    #[test]
    #[serial]
    fn dry_run_lists_candidates_and_deletes_nothing() {
        let fx = Fixture::new();
        fx.package("foo", 5).package("bar", 6).package("baz", 4);
        let before = fx.file_count();

        fx.cmd()
            .args(["-n", "3"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Deletion candidates"))
            .stdout(predicate::str::contains("foo-1.0_1.x86_64.xbps"))
            .stdout(predicate::str::contains("foo-1.1_1.x86_64.xbps"))
            .stdout(predicate::str::contains("foo-1.2_1.x86_64.xbps").not())
            .stdout(predicate::str::contains("bar-1.0_1").not())
            .stdout(predicate::str::contains("baz-1.0_1").not())
            .stdout(predicate::str::contains("No files were deleted (dry run)"))
            .stdout(predicate::str::contains("2.00 KiB"));

        assert_eq!(fx.file_count(), before);
    }

    #[test]
    #[serial]
    fn apply_deletes_oldest_and_sweeps_orphans() {
        let fx = Fixture::new();
        fx.package("foo", 5).package("bar", 6);
        write(&fx.cache, "gone-1.0_1.x86_64.xbps.sig");

        fx.cmd()
            .args(["-n", "3", "-d", "TRUE"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Deletion list"))
            .stdout(predicate::str::contains("1 orphan signature(s) removed"));

        assert!(!fx.exists("foo-1.0_1.x86_64.xbps"));
        assert!(!fx.exists("foo-1.1_1.x86_64.xbps.sig"));
        assert!(fx.exists("foo-1.2_1.x86_64.xbps"));
        assert!(fx.exists("bar-1.0_1.x86_64.xbps"));
        assert!(!fx.exists("gone-1.0_1.x86_64.xbps.sig"));
        // foo: 3 kept, bar: 6 held, each with a signature
        assert_eq!(fx.file_count(), 2 * (3 + 6));
    }

    #[test]
    #[serial]
    fn second_apply_is_a_no_op() {
        let fx = Fixture::new();
        fx.package("foo", 4);

        fx.cmd().args(["-n", "2", "-d", "true"]).assert().success();
        let after_first = fx.file_count();

        fx.cmd()
            .args(["-n", "2", "-d", "true", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"files\": []"))
            .stdout(predicate::str::contains("\"orphan_signatures_removed\": 0"));

        assert_eq!(fx.file_count(), after_first);
    }

    #[test]
    #[serial]
    fn json_report_for_dry_run() {
        let fx = Fixture::new();
        fx.package("foo", 3);

        let output = fx
            .cmd()
            .args(["-n", "2", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["mode"], "dry_run");
        assert_eq!(report["files"][0], "foo-1.0_1.x86_64.xbps");
        assert_eq!(report["bytes"], 1024);
        assert_eq!(report["orphan_signatures_removed"], 0);
    }

    #[test]
    #[serial]
    fn cache_dir_flag_overrides_config() {
        let fx = Fixture::new();
        let other = TempDir::new().unwrap();
        fs::write(other.path().join("foo-1.0_1.x86_64.xbps"), b"x").unwrap();
        write(other.path(), "foo-1.0_1.x86_64.xbps.sig");
        fs::write(other.path().join("foo-1.1_1.x86_64.xbps"), b"x").unwrap();
        write(other.path(), "foo-1.1_1.x86_64.xbps.sig");
        fs::write(other.path().join("foo-1.2_1.x86_64.xbps"), b"x").unwrap();
        write(other.path(), "foo-1.2_1.x86_64.xbps.sig");

        fx.cmd()
            .args(["-n", "2", "-d", "true", "-c"])
            .arg(other.path())
            .assert()
            .success();

        assert!(!other.path().join("foo-1.0_1.x86_64.xbps").exists());
        assert!(other.path().join("foo-1.2_1.x86_64.xbps").exists());
    }

    #[test]
    #[serial]
    fn query_failure_aborts_without_deleting() {
        let fx = Fixture::with_query("echo 'cannot open pkgdb' >&2; exit 1");
        fx.package("foo", 5);

        fx.cmd()
            .args(["-n", "2", "-d", "true"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Package query failed"))
            .stderr(predicate::str::contains("cannot open pkgdb"));

        assert_eq!(fx.file_count(), 10);
    }

    #[test]
    #[serial]
    fn missing_signature_aborts_without_deleting() {
        let fx = Fixture::new();
        fx.package("aaa", 3).package("foo", 3);
        fs::remove_file(fx.cache.join("foo-1.0_1.x86_64.xbps.sig")).unwrap();

        fx.cmd()
            .args(["-n", "2", "-d", "true"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("has no signature file"));

        // aaa-1.0 is listed before foo-1.0 but measuring happens first
        assert!(fx.exists("aaa-1.0_1.x86_64.xbps"));
        assert!(fx.exists("foo-1.0_1.x86_64.xbps"));
        assert_eq!(fx.file_count(), 11);
    }
}
