use crate::storage::{load_json, save_json_atomic};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) pet_name: String,
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) seed: u64,
    pub(crate) chat_url: Option<String>,
    pub(crate) events_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pet_name: "Mochi".to_string(),
            fps_cap: 30,
            enable_color: true,
            seed: 0xC0FFEE_u64,
            chat_url: None,
            events_path: None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "deskpet")]
#[command(about = "A small desk pet that lives in your terminal and reacts to your tasks")]
pub(crate) struct Cli {
    /// Seed for the pet's random choices
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Chat endpoint; POST {"message"} and expect {"reply"}
    #[arg(long)]
    pub(crate) chat_url: Option<String>,

    /// File or FIFO with one JSON task event per line
    #[arg(long)]
    pub(crate) events: Option<PathBuf>,

    /// Force monochrome (no colors)
    #[arg(long, default_value_t = false)]
    pub(crate) no_color: bool,

    /// Frame rate cap
    #[arg(long)]
    pub(crate) fps: Option<u32>,
}

impl Cli {
    /// Overrides for this run only; they are not written back.
    pub(crate) fn apply(&self, mut s: Settings) -> Settings {
        if let Some(seed) = self.seed {
            s.seed = seed;
        }
        if let Some(url) = &self.chat_url {
            s.chat_url = Some(url.clone());
        }
        if let Some(path) = &self.events {
            s.events_path = Some(path.clone());
        }
        if self.no_color {
            s.enable_color = false;
        }
        if let Some(fps) = self.fps {
            s.fps_cap = fps;
        }
        s
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) categories_path: PathBuf,
    pub(crate) growth_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

impl Paths {
    pub(crate) fn in_dir(dir: &Path) -> Self {
        Self {
            settings_path: dir.join("settings.json"),
            categories_path: dir.join("categories.json"),
            growth_path: dir.join("growth.json"),
            log_path: dir.join("deskpet.log"),
        }
    }
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "deskpet", "Deskpet")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(Paths::in_dir(&dir))
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    load_json(path).unwrap_or_default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    save_json_atomic(path, s)
}

/// Logs go to a file; the terminal belongs to the renderer.
pub(crate) fn init_logging(log_path: &Path) -> Result<()> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening {}", log_path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))?;
    Ok(())
}
