use chrono::Utc;
use log::{info, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The best recorded hold for one equipment name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestHold {
    pub score: u32,
    pub accuracy: u32,
    /// RFC 3339 timestamp of when the best was set.
    pub date: String,
}

/// Best-by-equipment-name record store. Keys are equipment NAMES, so two
/// items of the same kind in one round compete for the same record. Every
/// storage fault degrades instead of surfacing: unreadable data loads as an
/// empty map and a failed write is dropped with a warning.
#[derive(Debug)]
pub struct HighScoreStore {
    path: Option<PathBuf>,
    entries: FxHashMap<String, BestHold>,
}

impl HighScoreStore {
    /// Opens the store at `path`, reading whatever valid map is there.
    pub fn open(path: PathBuf) -> Self {
        let entries = load_entries(&path);
        if !entries.is_empty() {
            info!(
                "Loaded {} equipment record(s) from {}",
                entries.len(),
                path.display()
            );
        }
        Self {
            path: Some(path),
            entries,
        }
    }

    /// A store that never touches disk. Backs tests and the
    /// no-data-directory degradation.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: FxHashMap::default(),
        }
    }

    /// Default on-disk location under the platform data directory.
    pub fn default_path() -> Option<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "gymgrip")?;
        Some(dirs.data_dir().join("highscores.json"))
    }

    #[inline(always)]
    pub fn best_for(&self, name: &str) -> Option<&BestHold> {
        self.entries.get(name)
    }

    #[inline(always)]
    pub fn all(&self) -> &FxHashMap<String, BestHold> {
        &self.entries
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a result. The stored best is replaced only when `score` is
    /// strictly greater; ties keep the old record. Returns whether a new
    /// best was set; the file is written only in that case.
    pub fn update(&mut self, name: &str, score: u32, accuracy: u32) -> bool {
        let beats_best = self
            .entries
            .get(name)
            .is_none_or(|best| score > best.score);
        if !beats_best {
            return false;
        }
        self.entries.insert(
            name.to_string(),
            BestHold {
                score,
                accuracy,
                date: Utc::now().to_rfc3339(),
            },
        );
        self.save();
        true
    }

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warn!(
                "Could not create record directory {}: {e}",
                parent.display()
            );
            return;
        }
        let serialized = match serde_json::to_string_pretty(&self.entries) {
            Ok(s) => s,
            Err(e) => {
                warn!("Could not serialize equipment records: {e}");
                return;
            }
        };
        if let Err(e) = fs::write(path, serialized) {
            warn!("Could not write {}: {e}", path.display());
        }
    }
}

fn load_entries(path: &Path) -> FxHashMap<String, BestHold> {
    if !path.is_file() {
        return FxHashMap::default();
    }
    let Ok(raw) = fs::read_to_string(path) else {
        warn!("Could not read {}; starting fresh", path.display());
        return FxHashMap::default();
    };
    match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                "Ignoring unreadable record file {}: {e}",
                path.display()
            );
            FxHashMap::default()
        }
    }
}
