//! PNG rendering through the Graphviz `dot` executable.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Pipes DOT source through `dot -Tpng`.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    program: String,
}

impl GraphvizRenderer {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Render DOT source to PNG bytes.
    ///
    /// # Errors
    ///
    /// [`Error::Render`] when `dot` is missing, exits non-zero, closes its
    /// input early or produces no output.
    pub async fn render_png(&self, dot: &str) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .arg("-Tpng")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Render(format!("cannot run `{}`: {e}", self.program)))?;

        // a renderer that exits early closes the pipe; its status says more
        let fed = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(dot.as_bytes()).await,
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::Render(format!("`{}` did not finish: {e}", self.program)))?;
        if !output.status.success() {
            return Err(Error::Render(format!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if let Err(e) = fed {
            return Err(Error::Render(format!(
                "`{}` stopped reading its input: {e}",
                self.program
            )));
        }
        if output.stdout.is_empty() {
            return Err(Error::Render(format!("`{}` produced no output", self.program)));
        }
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_a_render_error() {
        let renderer = GraphvizRenderer::new("/nonexistent/dot-binary");
        let err = renderer.render_png("digraph {}").await.unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }

    #[tokio::test]
    async fn renderer_that_ignores_its_input_is_a_render_error() {
        let renderer = GraphvizRenderer::new("true");
        let mut dot = String::from("digraph {\n");
        for i in 0..50_000 {
            dot.push_str(&format!("  n{i} -> n{};\n", i + 1));
        }
        dot.push('}');

        let err = renderer.render_png(&dot).await.unwrap_err();
        assert!(matches!(err, Error::Render(_)), "{err:?}");
    }
}
