//! `xbps-query` backed oracle
//!
//! Runs the query tool directly (no shell) and checks its exit status.

use super::PackageOracle;
use crate::cache::PackageKey;
use crate::config::schema::QueryConfig;
use crate::error::{PruneError, PruneResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Oracle that shells out to `xbps-query`
#[derive(Debug, Clone)]
pub struct XbpsQuery {
    program: PathBuf,
    cache_dir: PathBuf,
    rootdir: Option<PathBuf>,
}

impl XbpsQuery {
    /// Create a query client for the given cache directory
    pub fn new(config: &QueryConfig, cache_dir: &Path) -> Self {
        Self {
            program: config.command.clone(),
            cache_dir: cache_dir.to_path_buf(),
            rootdir: config.rootdir.clone(),
        }
    }

    /// Arguments shared by every query
    fn base_args(&self) -> Vec<String> {
        let mut args = vec![format!("--cachedir={}", self.cache_dir.display())];
        if let Some(ref root) = self.rootdir {
            args.push("-r".to_string());
            args.push(root.display().to_string());
        }
        args
    }

    fn command_line(&self, args: &[String]) -> String {
        format!("{} {}", self.program.display(), args.join(" "))
    }

    /// Run the query tool and return its non-empty stdout lines
    async fn exec(&self, extra: &[&str]) -> PruneResult<Vec<String>> {
        let mut args = self.base_args();
        args.extend(extra.iter().map(|s| s.to_string()));
        let command = self.command_line(&args);
        debug!("Executing: {}", command);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| PruneError::QueryUnavailable {
                command: command.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(PruneError::QueryFailed {
                command,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_lines(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[async_trait]
impl PackageOracle for XbpsQuery {
    async fn held_packages(&self) -> PruneResult<Vec<String>> {
        self.exec(&["-H"]).await
    }

    async fn dependency_tree(&self, package: &PackageKey) -> PruneResult<Vec<String>> {
        self.exec(&["--fulldeptree", "-x", package.as_str()]).await
    }

    fn describe(&self, query: &str) -> String {
        format!("{} ({})", self.program.display(), query)
    }
}

fn parse_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
