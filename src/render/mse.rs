//! Magic Set Editor command-line renderer
//!
//! The editor is started as `<program> --cli --raw <set archive>` and reads
//! script commands on stdin. Two commands are sent: export the first card to
//! the per-render path, then to the fixed "latest" path. Its combined output
//! is logged, never parsed.

use crate::config::{OutputLayout, RendererSettings};
use crate::{CardGenError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// A rendered card image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Turns a set archive into a card image
#[allow(async_fn_in_trait)]
pub trait CardImageRenderer {
    async fn render(&self, set_archive: &Path) -> Result<RenderedImage>;
}

/// Renderer backed by the editor's command-line mode
pub struct MseRenderer {
    settings: RendererSettings,
    layout: OutputLayout,
}

impl MseRenderer {
    /// Renders land at the layout's render path for the archive's timestamp
    /// and are also written to its "latest" path
    pub fn new(settings: RendererSettings, layout: OutputLayout) -> Self {
        MseRenderer { settings, layout }
    }

    fn output_path(&self, set_archive: &Path) -> PathBuf {
        let stamp = set_archive
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "card".to_string());
        self.layout.render_path(&stamp)
    }
}

impl CardImageRenderer for MseRenderer {
    async fn render(&self, set_archive: &Path) -> Result<RenderedImage> {
        let set_archive = tokio::fs::canonicalize(set_archive).await?;
        let output = self.output_path(&set_archive);
        let script = render_script(&output, self.layout.latest_path());

        let mut child = Command::new(self.settings.executable())
            .arg("--cli")
            .arg("--raw")
            .arg(&set_archive)
            .current_dir(&self.settings.dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                CardGenError::RendererFailed(format!(
                    "could not start {}: {e}",
                    self.settings.program.display()
                ))
            })?;

        // Dropping stdin closes it, which ends the editor's script loop.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(script.as_bytes()).await {
                warn!(error = %e, "renderer closed its input early");
            }
        }

        let finished =
            tokio::time::timeout(self.settings.timeout, child.wait_with_output()).await;
        let result = match finished {
            Ok(result) => result?,
            Err(_) => {
                return Err(CardGenError::RendererTimeout {
                    secs: self.settings.timeout.as_secs(),
                })
            }
        };

        let stdout = String::from_utf8_lossy(&result.stdout);
        let stderr = String::from_utf8_lossy(&result.stderr);
        debug!(status = %result.status, "renderer exited");
        info!(output = %stdout.trim(), errors = %stderr.trim(), "renderer output");
        if !result.status.success() {
            warn!(status = %result.status, "renderer exited unsuccessfully");
        }

        let bytes = tokio::fs::read(&output).await.map_err(|e| {
            CardGenError::RendererFailed(format!("no image at {}: {e}", output.display()))
        })?;

        Ok(RenderedImage {
            path: output,
            bytes,
        })
    }
}

/// Script sent on the renderer's stdin, one newline-terminated command each
pub fn render_script(output: &Path, latest: &Path) -> String {
    format!(
        "write_image_file(set.cards.0, file: \"{}\")\nwrite_image_file(set.cards.0, file: \"{}\")\n",
        script_path(output),
        script_path(latest)
    )
}

/// Path as a script string literal: forward slashes, quotes escaped
fn script_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_render_script() {
        let script = render_script(
            Path::new("/out/20240101120000.png"),
            Path::new("/work/newest-card.png"),
        );
        assert_eq!(
            script,
            "write_image_file(set.cards.0, file: \"/out/20240101120000.png\")\n\
             write_image_file(set.cards.0, file: \"/work/newest-card.png\")\n"
        );
        assert_eq!(script.lines().count(), 2);
    }

    #[test]
    fn test_script_path_uses_forward_slashes() {
        assert_eq!(
            script_path(Path::new(r"C:\cards\output\1.png")),
            "C:/cards/output/1.png"
        );
    }

    #[test]
    fn test_output_named_after_archive() -> Result<()> {
        let renderer = MseRenderer::new(
            RendererSettings {
                dir: PathBuf::from("mse"),
                program: PathBuf::from("mse.exe"),
                timeout: Duration::from_secs(15),
            },
            OutputLayout::new("/out", "/newest-card.png")?,
        );
        assert_eq!(
            renderer.output_path(Path::new("/out/sets/20240101120000.mse-set")),
            PathBuf::from("/out/20240101120000.png")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_program_is_a_render_failure() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let archive = dir.path().join("1.mse-set");
        std::fs::write(&archive, b"zip")?;

        let renderer = MseRenderer::new(
            RendererSettings {
                dir: dir.path().to_path_buf(),
                program: PathBuf::from("definitely-not-a-renderer-binary"),
                timeout: Duration::from_secs(1),
            },
            OutputLayout::new(dir.path(), dir.path().join("newest-card.png"))?,
        );

        assert!(matches!(
            renderer.render(&archive).await,
            Err(CardGenError::RendererFailed(_))
        ));
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_renderer_times_out() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        use std::time::Instant;

        let dir = tempfile::tempdir()?;
        let archive = dir.path().join("1.mse-set");
        std::fs::write(&archive, b"zip")?;

        let program = dir.path().join("fake-mse");
        std::fs::write(&program, "#!/bin/sh\nexec sleep 10\n")?;
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755))?;

        let renderer = MseRenderer::new(
            RendererSettings {
                dir: dir.path().to_path_buf(),
                program: PathBuf::from("fake-mse"),
                timeout: Duration::from_secs(1),
            },
            OutputLayout::new(dir.path(), dir.path().join("newest-card.png"))?,
        );

        let started = Instant::now();
        let result = renderer.render(&archive).await;

        assert!(matches!(
            result,
            Err(CardGenError::RendererTimeout { secs: 1 })
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!dir.path().join("1.png").exists());
        Ok(())
    }
}
