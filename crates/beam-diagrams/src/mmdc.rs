//! Rendering via the mermaid CLI (`mmdc`).
//!
//! Each invocation hands the source to `mmdc` through a pair of named temp
//! files. The files are owned by [`tempfile::NamedTempFile`] guards, so they
//! are removed when the call returns, on success and failure alike.

use std::path::PathBuf;
use std::process::Command;

use crate::renderer::{DiagramRenderer, RenderError, RenderedSvg};

/// Renderer that shells out to the mermaid CLI.
#[derive(Debug, Clone)]
pub struct MmdcRenderer {
    mmdc_path: PathBuf,
}

impl MmdcRenderer {
    /// Create a renderer invoking the given `mmdc` binary.
    #[must_use]
    pub fn new(mmdc_path: impl Into<PathBuf>) -> Self {
        Self {
            mmdc_path: mmdc_path.into(),
        }
    }

    fn command_name(&self) -> String {
        self.mmdc_path.display().to_string()
    }
}

impl DiagramRenderer for MmdcRenderer {
    fn render(&self, source: &str) -> Result<RenderedSvg, RenderError> {
        let input = tempfile::Builder::new()
            .prefix("beam-input-")
            .suffix(".mmd")
            .tempfile()?;
        let output = tempfile::Builder::new()
            .prefix("beam-output-")
            .suffix(".svg")
            .tempfile()?;

        std::fs::write(input.path(), source)?;

        let result = Command::new(&self.mmdc_path)
            .arg("-i")
            .arg(input.path())
            .arg("-o")
            .arg(output.path())
            .arg("-b")
            .arg("transparent")
            .output()
            .map_err(|source| RenderError::Spawn {
                command: self.command_name(),
                source,
            })?;

        if !result.status.success() {
            return Err(RenderError::Command {
                command: self.command_name(),
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_owned(),
            });
        }

        let svg = std::fs::read_to_string(output.path())?;
        Ok(RenderedSvg { svg })
    }
}
