use crate::game::equipment;
use crate::game::layout;
use crate::game::scoring;
use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

pub const CONFIG_PATH: &str = "gymgrip.ini";

// --- Minimal INI reader ---
#[derive(Debug, Default)]
pub struct SimpleIni {
    sections: HashMap<String, HashMap<String, String>>,
}

impl SimpleIni {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        self.sections.clear();

        let mut current_section: Option<String> = None;

        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            // Section header: [SectionName]
            if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
                let name = line[1..line.len() - 1].trim().to_string();
                current_section = Some(name.clone());
                self.sections.entry(name).or_default();
                continue;
            }

            // Key/value pair: key=value
            if let Some(eq_idx) = line.find('=') {
                let (key_raw, value_raw) = line.split_at(eq_idx);
                let key = key_raw.trim();
                if key.is_empty() {
                    continue;
                }
                let value = value_raw[1..].trim().to_string();
                let section = current_section.clone().unwrap_or_default();
                self.sections
                    .entry(section)
                    .or_default()
                    .insert(key.to_string(), value);
            }
        }

        Ok(())
    }

    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections.get(section).and_then(|s| s.get(key)).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevelSetting {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelSetting {
    pub const fn as_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Off => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }
}

impl FromStr for LogLevelSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("'{other}' is not a valid LogLevel setting")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub log_level: LogLevelSetting,
    // Hold-target bounds in whole seconds.
    pub min_target_seconds: f64,
    pub max_target_seconds: f64,
    // How many equipment items a round may ask for.
    pub min_items: usize,
    pub max_items: usize,
    // Release-delta divisors; see game::scoring.
    pub points_leniency_seconds: f64,
    pub accuracy_leniency_seconds: f64,
    // Item footprint for placement.
    pub item_size_px: f64,
    pub item_padding_px: f64,
    pub overlap_factor: f64,
    pub tick_rate_hz: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevelSetting::Warn,
            min_target_seconds: equipment::MIN_TARGET_SECONDS,
            max_target_seconds: equipment::MAX_TARGET_SECONDS,
            min_items: 6,
            max_items: 9,
            points_leniency_seconds: scoring::DEFAULT_POINTS_LENIENCY_S,
            accuracy_leniency_seconds: scoring::DEFAULT_ACCURACY_LENIENCY_S,
            item_size_px: 120.0,
            item_padding_px: 30.0,
            overlap_factor: layout::DEFAULT_OVERLAP_FACTOR,
            tick_rate_hz: 60,
        }
    }
}

impl Config {
    /// Repairs nonsense combinations instead of refusing to run: inverted
    /// bounds collapse, non-positive divisors and rates fall back to
    /// defaults.
    fn sanitized(mut self) -> Self {
        let default = Self::default();
        if self.min_target_seconds < 1.0 {
            warn!("MinTargetSeconds below 1; using 1");
            self.min_target_seconds = 1.0;
        }
        if self.max_target_seconds < self.min_target_seconds {
            warn!("MaxTargetSeconds below MinTargetSeconds; collapsing the range");
            self.max_target_seconds = self.min_target_seconds;
        }
        if self.min_items == 0 {
            warn!("MinItems of 0; using 1");
            self.min_items = 1;
        }
        if self.max_items < self.min_items {
            warn!("MaxItems below MinItems; collapsing the range");
            self.max_items = self.min_items;
        }
        if self.points_leniency_seconds <= 0.0 {
            warn!("PointsLeniencySeconds must be positive; using the default");
            self.points_leniency_seconds = default.points_leniency_seconds;
        }
        if self.accuracy_leniency_seconds <= 0.0 {
            warn!("AccuracyLeniencySeconds must be positive; using the default");
            self.accuracy_leniency_seconds = default.accuracy_leniency_seconds;
        }
        if self.item_size_px <= 0.0 {
            self.item_size_px = default.item_size_px;
        }
        if self.item_padding_px < 0.0 {
            self.item_padding_px = default.item_padding_px;
        }
        if self.overlap_factor <= 0.0 {
            self.overlap_factor = default.overlap_factor;
        }
        self.tick_rate_hz = self.tick_rate_hz.clamp(1, 1000);
        self
    }
}

fn create_default_config_file(path: &Path) -> Result<(), std::io::Error> {
    info!(
        "'{}' not found, creating with default values.",
        path.display()
    );
    let default = Config::default();

    let mut content = String::new();

    // [Options] section - keys in alphabetical order
    content.push_str("[Options]\n");
    content.push_str(&format!(
        "AccuracyLeniencySeconds={}\n",
        default.accuracy_leniency_seconds
    ));
    content.push_str(&format!("ItemPaddingPx={}\n", default.item_padding_px));
    content.push_str(&format!("ItemSizePx={}\n", default.item_size_px));
    content.push_str(&format!("LogLevel={}\n", default.log_level.as_str()));
    content.push_str(&format!("MaxItems={}\n", default.max_items));
    content.push_str(&format!(
        "MaxTargetSeconds={}\n",
        default.max_target_seconds
    ));
    content.push_str(&format!("MinItems={}\n", default.min_items));
    content.push_str(&format!(
        "MinTargetSeconds={}\n",
        default.min_target_seconds
    ));
    content.push_str(&format!("OverlapFactor={}\n", default.overlap_factor));
    content.push_str(&format!(
        "PointsLeniencySeconds={}\n",
        default.points_leniency_seconds
    ));
    content.push_str(&format!("TickRateHz={}\n", default.tick_rate_hz));

    std::fs::write(path, content)
}

/// Reads `path`, creating it with defaults when missing. Every key falls
/// back to its default on a parse failure; an unreadable file means a fully
/// default config. Never an error to the caller.
pub fn load_or_create(path: &Path) -> Config {
    if !path.exists()
        && let Err(e) = create_default_config_file(path)
    {
        warn!("Failed to create default config file: {e}");
    }

    let mut conf = SimpleIni::new();
    if let Err(e) = conf.load(path) {
        warn!("Could not read {}: {e}; using defaults", path.display());
        return Config::default();
    }

    let default = Config::default();
    let cfg = Config {
        log_level: conf
            .get("Options", "LogLevel")
            .and_then(|v| LogLevelSetting::from_str(&v).ok())
            .unwrap_or(default.log_level),
        min_target_seconds: conf
            .get("Options", "MinTargetSeconds")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(default.min_target_seconds),
        max_target_seconds: conf
            .get("Options", "MaxTargetSeconds")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(default.max_target_seconds),
        min_items: conf
            .get("Options", "MinItems")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(default.min_items),
        max_items: conf
            .get("Options", "MaxItems")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(default.max_items),
        points_leniency_seconds: conf
            .get("Options", "PointsLeniencySeconds")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(default.points_leniency_seconds),
        accuracy_leniency_seconds: conf
            .get("Options", "AccuracyLeniencySeconds")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(default.accuracy_leniency_seconds),
        item_size_px: conf
            .get("Options", "ItemSizePx")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(default.item_size_px),
        item_padding_px: conf
            .get("Options", "ItemPaddingPx")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(default.item_padding_px),
        overlap_factor: conf
            .get("Options", "OverlapFactor")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(default.overlap_factor),
        tick_rate_hz: conf
            .get("Options", "TickRateHz")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(default.tick_rate_hz),
    };
    cfg.sanitized()
}
