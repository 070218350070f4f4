//! End-to-end CLI tests running the locsync binary against tempdir fixtures.

use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

use anyhow::{Context, Result};
use tempfile::TempDir;

mod collect;
mod init;

pub struct CliTest {
    dir: TempDir,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new().context("Failed to create temp dir")?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_locsync"));
        command.current_dir(self.dir.path());
        command.env_remove("LOCSYNC_API_TOKEN");
        command.env_remove("LOCSYNC_API_URL");
        command
    }

    pub fn run(&self, args: &[&str]) -> Result<Output> {
        self.command()
            .args(args)
            .output()
            .context("Failed to run locsync")
    }

    pub fn write_file(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn read_file(&self, rel: &str) -> Result<String> {
        fs::read_to_string(self.dir.path().join(rel)).context("Failed to read file")
    }
}
