//! Configuration management for LazyPDF
//!
//! Read once by `init()` from the process environment, falling back to a
//! `.env` file when present. The `.env` file is only read; the host's
//! environment is never modified. Invalid values fall back to their defaults.

use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::io::Read;
use std::str::FromStr;

use crate::encode::PngCompression;
use crate::geometry::RenderLimits;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub render: RenderConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Maximum raster side in pixels
    pub max_dimension: u32,
    /// Maximum raster area in pixels
    pub max_pixels: u64,
    pub png_compression: PngCompression,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `None` leaves the host's logging untouched
    pub filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let limits = RenderLimits::default();
        Config {
            render: RenderConfig {
                max_dimension: limits.max_dimension,
                max_pixels: limits.max_pixels,
                png_compression: PngCompression::default(),
            },
            logging: LoggingConfig { filter: None },
        }
    }
}

impl Config {
    /// Process environment first, then `.env` from the working directory
    /// or its ancestors
    pub fn from_env() -> Self {
        let dotenv = dotenvy::dotenv_iter()
            .map(dotenv_values)
            .unwrap_or_default();
        Self::from_lookup(|key| env::var(key).ok().or_else(|| dotenv.get(key).cloned()))
    }

    /// Build a config from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        Config {
            render: RenderConfig {
                max_dimension: parse_or(
                    &lookup,
                    "LAZYPDF_MAX_DIMENSION",
                    defaults.render.max_dimension,
                ),
                max_pixels: parse_or(&lookup, "LAZYPDF_MAX_PIXELS", defaults.render.max_pixels),
                png_compression: parse_or(
                    &lookup,
                    "LAZYPDF_PNG_COMPRESSION",
                    defaults.render.png_compression,
                ),
            },
            logging: LoggingConfig {
                filter: lookup("LAZYPDF_LOG").filter(|v| !v.trim().is_empty()),
            },
        }
    }

    pub fn limits(&self) -> RenderLimits {
        RenderLimits {
            max_dimension: self.render.max_dimension,
            max_pixels: self.render.max_pixels,
        }
    }
}

/// Collect `.env` entries without exporting them; malformed lines are skipped
fn dotenv_values<R: Read>(iter: dotenvy::Iter<R>) -> HashMap<String, String> {
    iter.filter_map(|item| match item {
        Ok(pair) => Some(pair),
        Err(e) => {
            tracing::warn!("Skipping malformed .env entry: {}", e);
            None
        }
    })
    .collect()
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Invalid value {:?} for {}, using {:?}", raw, key, default);
                default
            }
        },
    }
}
