use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bubble::{ClusterConfig, FilterConfig};
use crate::layout::LayoutConfig;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub min_confidence: i32,
    pub text_pattern: Option<String>,
    pub eps: f64,
    pub vertical_weight: f64,
    pub horizontal_penalty: f64,
    pub max_bubbles: usize,
    pub max_font_size: u32,
    pub min_font_size: u32,
    pub fill_width: f32,
    pub fill_height: f32,
    pub estimate_fraction: f32,
    pub line_spacing: f32,
    pub font_path: Option<String>,
    pub font_family: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let filter = FilterConfig::default();
        let cluster = ClusterConfig::default();
        let layout = LayoutConfig::default();
        Self {
            min_confidence: filter.min_confidence,
            text_pattern: None,
            eps: cluster.eps,
            vertical_weight: cluster.vertical_weight,
            horizontal_penalty: cluster.horizontal_penalty,
            max_bubbles: 2,
            max_font_size: layout.max_font_size,
            min_font_size: layout.min_font_size,
            fill_width: layout.fill_width,
            fill_height: layout.fill_height,
            estimate_fraction: layout.estimate_fraction,
            line_spacing: layout.line_spacing,
            font_path: None,
            font_family: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    filter: Option<FilterSettings>,
    cluster: Option<ClusterSettings>,
    layout: Option<LayoutSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct FilterSettings {
    min_confidence: Option<i32>,
    text_pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ClusterSettings {
    eps: Option<f64>,
    vertical_weight: Option<f64>,
    horizontal_penalty: Option<f64>,
    max_bubbles: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LayoutSettings {
    max_font_size: Option<u32>,
    min_font_size: Option<u32>,
    fill_width: Option<f32>,
    fill_height: Option<f32>,
    estimate_fraction: Option<f32>,
    line_spacing: Option<f32>,
    font_path: Option<String>,
    font_family: Option<String>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(filter) = incoming.filter {
            if let Some(confidence) = filter.min_confidence {
                self.min_confidence = confidence;
            }
            // an empty pattern switches the pattern check off
            if let Some(pattern) = filter.text_pattern {
                self.text_pattern = if pattern.trim().is_empty() {
                    None
                } else {
                    Some(pattern)
                };
            }
        }
        if let Some(cluster) = incoming.cluster {
            if let Some(eps) = cluster.eps.filter(|value| *value > 0.0) {
                self.eps = eps;
            }
            if let Some(weight) = cluster.vertical_weight.filter(|value| *value > 0.0) {
                self.vertical_weight = weight;
            }
            if let Some(penalty) = cluster.horizontal_penalty.filter(|value| *value > 0.0) {
                self.horizontal_penalty = penalty;
            }
            if let Some(limit) = cluster.max_bubbles.filter(|value| *value > 0) {
                self.max_bubbles = limit;
            }
        }
        if let Some(layout) = incoming.layout {
            if let Some(size) = layout.max_font_size.filter(|value| *value > 0) {
                self.max_font_size = size;
            }
            if let Some(size) = layout.min_font_size.filter(|value| *value > 0) {
                self.min_font_size = size;
            }
            if let Some(fill) = layout.fill_width.filter(|value| *value > 0.0) {
                self.fill_width = fill;
            }
            if let Some(fill) = layout.fill_height.filter(|value| *value > 0.0) {
                self.fill_height = fill;
            }
            if let Some(fraction) = layout.estimate_fraction.filter(|value| *value > 0.0) {
                self.estimate_fraction = fraction;
            }
            if let Some(spacing) = layout.line_spacing.filter(|value| *value >= 0.0) {
                self.line_spacing = spacing;
            }
            if let Some(path) = layout.font_path {
                if !path.trim().is_empty() {
                    self.font_path = Some(path);
                }
            }
            if let Some(family) = layout.font_family {
                if !family.trim().is_empty() {
                    self.font_family = Some(family);
                }
            }
        }
    }

    pub fn filter_config(&self) -> crate::Result<FilterConfig> {
        FilterConfig::new(self.min_confidence, self.text_pattern.as_deref())
    }

    pub fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig {
            eps: self.eps,
            vertical_weight: self.vertical_weight,
            horizontal_penalty: self.horizontal_penalty,
        }
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            max_font_size: self.max_font_size,
            min_font_size: self.min_font_size,
            fill_width: self.fill_width,
            fill_height: self.fill_height,
            estimate_fraction: self.estimate_fraction,
            line_spacing: self.line_spacing,
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".speech-bubble-rust"))
        }
    })
}
