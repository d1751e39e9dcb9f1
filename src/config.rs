//! Resolved run settings and output layout
//!
//! Command-line flags and environment variables (optionally from `.env`) are
//! parsed in `main`; this module holds the result and derives every path the
//! pipeline writes.

use crate::{CardGenError, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Card back shown for every card in the exported deck
pub const DEFAULT_BACK_URL: &str =
    "https://backs.scryfall.io/large/2/2/222b7a3b-2321-4d4c-af19-19338b134971.jpg";

/// Side length of the generated card art
pub const ART_SIZE: u32 = 512;

pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(15);

/// Where generated files go
///
/// ```text
/// output/
///   art/{ts}-art.png        generated art
///   sets/{ts}.mse-set       set archive fed to the renderer
///   {ts}.png                rendered card
///   decks/{ts}.json         tabletop deck export
/// newest-card.png           copy of the most recent render
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    latest: PathBuf,
}

impl OutputLayout {
    /// Layout under `root`; relative paths are resolved against the current
    /// directory because the renderer runs from its own working directory
    pub fn new(root: impl AsRef<Path>, latest: impl AsRef<Path>) -> Result<Self> {
        Ok(OutputLayout {
            root: absolute(root.as_ref())?,
            latest: absolute(latest.as_ref())?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn art_dir(&self) -> PathBuf {
        self.root.join("art")
    }

    pub fn sets_dir(&self) -> PathBuf {
        self.root.join("sets")
    }

    pub fn decks_dir(&self) -> PathBuf {
        self.root.join("decks")
    }

    pub fn art_path(&self, stamp: &str) -> PathBuf {
        self.art_dir().join(format!("{stamp}-art.png"))
    }

    pub fn set_path(&self, stamp: &str) -> PathBuf {
        self.sets_dir().join(format!("{stamp}.mse-set"))
    }

    pub fn render_path(&self, stamp: &str) -> PathBuf {
        self.root.join(format!("{stamp}.png"))
    }

    pub fn deck_path(&self, stamp: &str) -> PathBuf {
        self.decks_dir().join(format!("{stamp}.json"))
    }

    /// Fixed path overwritten by every render
    pub fn latest_path(&self) -> &Path {
        &self.latest
    }

    /// Create every output directory
    pub async fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.art_dir(), self.sets_dir(), self.decks_dir()] {
            tokio::fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }
}

/// Second-resolution local timestamp used to name output files
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// External renderer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererSettings {
    /// Working directory of the renderer
    pub dir: PathBuf,
    /// Renderer executable, looked up in `dir` first
    pub program: PathBuf,
    pub timeout: Duration,
}

impl RendererSettings {
    /// Executable to spawn
    pub fn executable(&self) -> PathBuf {
        let local = self.dir.join(&self.program);
        if local.is_file() {
            local
        } else {
            self.program.clone()
        }
    }
}

/// Everything a generation run needs to know
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub stable_diffusion_url: String,
    pub stable_diffusion_steps: u32,
    pub imgur_client_id: Option<String>,
    pub back_url: String,
    pub output: OutputLayout,
    pub renderer: RendererSettings,
}

impl Settings {
    /// Client id for the image host, required only when a deck is exported
    pub fn require_imgur_client_id(&self) -> Result<&str> {
        self.imgur_client_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| CardGenError::Config("IMGUR_CLIENT_ID is not set".to_string()))
    }
}
