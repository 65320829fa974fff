//! Debug artifact routing
//!
//! Decoded artifacts never travel inline with the logical result; they
//! are handed to a sink, keeping the protocol decoder free of I/O.

use std::fs;
use std::path::PathBuf;

use crate::protocol::DebugArtifacts;
use crate::Result;

/// Destination for decoded debug artifacts
pub trait DebugSink: Send + Sync {
    /// Store the artifacts stripped from one response
    fn store(&self, session: &str, artifacts: &DebugArtifacts) -> Result<()>;
}

/// Sink writing artifacts to a directory.
///
/// Per session: `<session>.log` for the step log, `<session>.png` for
/// the page screenshot, and `<session>-action-<index>.png` for
/// per-action screenshots.
#[derive(Debug, Clone)]
pub struct FsDebugSink {
    dir: PathBuf,
}

impl FsDebugSink {
    /// Create a sink, creating the directory if needed
    pub fn new<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory artifacts are written to
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl DebugSink for FsDebugSink {
    fn store(&self, session: &str, artifacts: &DebugArtifacts) -> Result<()> {
        if !artifacts.log.is_empty() {
            let mut log = artifacts.log.join("\n");
            log.push('\n');
            fs::write(self.dir.join(format!("{}.log", session)), log)?;
        }

        if let Some(screenshot) = &artifacts.screenshot {
            fs::write(self.dir.join(format!("{}.png", session)), screenshot)?;
        }

        for (index, bytes) in &artifacts.action_screenshots {
            fs::write(
                self.dir.join(format!("{}-action-{}.png", session, index)),
                bytes,
            )?;
        }

        Ok(())
    }
}
