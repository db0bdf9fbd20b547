//! Configuration system for the prefetch decision engines.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the detectors. It provides:
//! 1. **Defaults:** Table capacities, degrees, and issue thresholds of the reference prefetchers.
//! 2. **Structures:** Per-detector config for AMPM, IP-stride, and stream detection.
//! 3. **Enums:** Detector selection and the fill-level comparison rule.
//!
//! Configuration is supplied as JSON (`Config::from_json` / `Config::from_file`)
//! or use `Config::default()`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::constants::LINES_PER_PAGE;
use crate::common::error::ConfigError;

/// Default configuration constants for the detectors.
mod defaults {
    /// AMPM page table entries.
    pub const AMPM_PAGE_COUNT: usize = 64;

    /// AMPM prefetches per direction per access.
    pub const AMPM_DEGREE: usize = 2;

    /// Largest stride (in lines) the AMPM matcher searches.
    pub const AMPM_MAX_STRIDE: u8 = 16;

    /// MSHR threshold for forward AMPM prefetches.
    pub const AMPM_FORWARD_THRESHOLD: u32 = 8;

    /// MSHR threshold for backward AMPM prefetches.
    pub const AMPM_BACKWARD_THRESHOLD: u32 = 12;

    /// IP tracker entries.
    pub const STRIDE_TRACKER_COUNT: usize = 1024;

    /// Stride prefetches per access.
    pub const STRIDE_DEGREE: usize = 3;

    /// MSHR threshold for stride prefetches.
    pub const STRIDE_THRESHOLD: u32 = 8;

    /// Stream detector entries.
    pub const STREAM_DETECTOR_COUNT: usize = 64;

    /// Training window (in lines) around the stream cursor.
    pub const STREAM_WINDOW: u8 = 16;

    /// Stream prefetches per access.
    pub const STREAM_DEGREE: usize = 2;

    /// Confidence a stream needs before it issues prefetches.
    pub const STREAM_ACTIVATION: u32 = 2;

    /// MSHR threshold for stream prefetches.
    pub const STREAM_THRESHOLD: u32 = 8;
}

/// Largest accepted AMPM stride search bound; `2 * max_stride` must fit in a page.
pub const AMPM_STRIDE_LIMIT: u8 = (LINES_PER_PAGE / 2 - 1) as u8;

/// Largest accepted stream training window.
pub const STREAM_WINDOW_LIMIT: u8 = LINES_PER_PAGE as u8;

/// Detector implementations.
///
/// Exactly one detector is active per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PrefetcherKind {
    /// Simplified Access Map Pattern Matching over 4 KiB pages.
    #[default]
    #[serde(alias = "AMPM")]
    Ampm,
    /// Instruction-pointer indexed stride prefetcher.
    #[serde(alias = "Stride")]
    IpStride,
    /// Confidence-gated streaming prefetcher.
    Stream,
}

/// How an occupancy reading is compared against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum FillRule {
    /// Fill into the L2 while occupancy is strictly below the threshold, else the LLC.
    #[default]
    NearBelow,
    /// Fill into the LLC once occupancy is strictly above the threshold, else the L2.
    FarAbove,
}

/// Fill-level selection knobs for one detector (or one AMPM direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueConfig {
    /// MSHR occupancy threshold.
    pub threshold: u32,
    /// Comparison applied against `threshold`.
    #[serde(default)]
    pub rule: FillRule,
}

impl IssueConfig {
    /// Creates an issue config.
    pub const fn new(threshold: u32, rule: FillRule) -> Self {
        Self { threshold, rule }
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use pfsim_core::config::{Config, PrefetcherKind};
///
/// let config = Config::default();
/// assert_eq!(config.prefetcher, PrefetcherKind::Ampm);
/// assert_eq!(config.ampm.page_count, 64);
/// assert_eq!(config.ampm.backward.threshold, 12);
/// ```
///
/// Deserializing from JSON; omitted fields keep their defaults:
///
/// ```
/// use pfsim_core::config::{Config, FillRule, PrefetcherKind};
///
/// let json = r#"{
///     "prefetcher": "Stream",
///     "stream": {
///         "detector_count": 32,
///         "issue": { "threshold": 6, "rule": "FarAbove" }
///     }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.prefetcher, PrefetcherKind::Stream);
/// assert_eq!(config.stream.detector_count, 32);
/// assert_eq!(config.stream.window, 16);
/// assert_eq!(config.stream.issue.rule, FillRule::FarAbove);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Active detector.
    #[serde(default)]
    pub prefetcher: PrefetcherKind,
    /// AMPM detector settings.
    #[serde(default)]
    pub ampm: AmpmConfig,
    /// IP-stride detector settings.
    #[serde(default)]
    pub stride: StrideConfig,
    /// Stream detector settings.
    #[serde(default)]
    pub stream: StreamConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input, or a validation error.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as [`Config::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Checks every detector's knobs, including the inactive ones.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ampm.validate()?;
        self.stride.validate()?;
        self.stream.validate()
    }
}

/// AMPM-lite detector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmpmConfig {
    /// Number of tracked pages
    #[serde(default = "AmpmConfig::default_page_count")]
    pub page_count: usize,

    /// Prefetches per direction per access
    #[serde(default = "AmpmConfig::default_degree")]
    pub degree: usize,

    /// Largest stride (in lines) searched
    #[serde(default = "AmpmConfig::default_max_stride")]
    pub max_stride: u8,

    /// Fill selection for forward (ascending) prefetches
    #[serde(default = "AmpmConfig::default_forward")]
    pub forward: IssueConfig,

    /// Fill selection for backward (descending) prefetches
    #[serde(default = "AmpmConfig::default_backward")]
    pub backward: IssueConfig,
}

impl AmpmConfig {
    fn default_page_count() -> usize {
        defaults::AMPM_PAGE_COUNT
    }

    fn default_degree() -> usize {
        defaults::AMPM_DEGREE
    }

    fn default_max_stride() -> u8 {
        defaults::AMPM_MAX_STRIDE
    }

    fn default_forward() -> IssueConfig {
        IssueConfig::new(defaults::AMPM_FORWARD_THRESHOLD, FillRule::NearBelow)
    }

    fn default_backward() -> IssueConfig {
        IssueConfig::new(defaults::AMPM_BACKWARD_THRESHOLD, FillRule::NearBelow)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_count == 0 {
            return Err(ConfigError::ZeroCapacity {
                table: "ampm.page_count",
            });
        }
        if self.degree == 0 {
            return Err(ConfigError::ZeroDegree { detector: "ampm" });
        }
        if self.max_stride > AMPM_STRIDE_LIMIT {
            return Err(ConfigError::StrideRangeTooLarge {
                max: self.max_stride,
                limit: AMPM_STRIDE_LIMIT,
            });
        }
        Ok(())
    }
}

impl Default for AmpmConfig {
    fn default() -> Self {
        Self {
            page_count: defaults::AMPM_PAGE_COUNT,
            degree: defaults::AMPM_DEGREE,
            max_stride: defaults::AMPM_MAX_STRIDE,
            forward: Self::default_forward(),
            backward: Self::default_backward(),
        }
    }
}

/// IP-stride detector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrideConfig {
    /// Number of tracked instruction pointers
    #[serde(default = "StrideConfig::default_tracker_count")]
    pub tracker_count: usize,

    /// Prefetches per confirmed stride
    #[serde(default = "StrideConfig::default_degree")]
    pub degree: usize,

    /// Fill selection
    #[serde(default = "StrideConfig::default_issue")]
    pub issue: IssueConfig,
}

impl StrideConfig {
    fn default_tracker_count() -> usize {
        defaults::STRIDE_TRACKER_COUNT
    }

    fn default_degree() -> usize {
        defaults::STRIDE_DEGREE
    }

    fn default_issue() -> IssueConfig {
        IssueConfig::new(defaults::STRIDE_THRESHOLD, FillRule::NearBelow)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tracker_count == 0 {
            return Err(ConfigError::ZeroCapacity {
                table: "stride.tracker_count",
            });
        }
        if self.degree == 0 {
            return Err(ConfigError::ZeroDegree { detector: "stride" });
        }
        Ok(())
    }
}

impl Default for StrideConfig {
    fn default() -> Self {
        Self {
            tracker_count: defaults::STRIDE_TRACKER_COUNT,
            degree: defaults::STRIDE_DEGREE,
            issue: Self::default_issue(),
        }
    }
}

/// Stream detector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Number of stream detectors (round-robin replaced)
    #[serde(default = "StreamConfig::default_detector_count")]
    pub detector_count: usize,

    /// Training window in lines; accesses this far or farther from the cursor are ignored
    #[serde(default = "StreamConfig::default_window")]
    pub window: u8,

    /// Prefetches per access once active
    #[serde(default = "StreamConfig::default_degree")]
    pub degree: usize,

    /// Confidence needed before prefetching
    #[serde(default = "StreamConfig::default_activation")]
    pub activation: u32,

    /// Fill selection
    #[serde(default = "StreamConfig::default_issue")]
    pub issue: IssueConfig,
}

impl StreamConfig {
    fn default_detector_count() -> usize {
        defaults::STREAM_DETECTOR_COUNT
    }

    fn default_window() -> u8 {
        defaults::STREAM_WINDOW
    }

    fn default_degree() -> usize {
        defaults::STREAM_DEGREE
    }

    fn default_activation() -> u32 {
        defaults::STREAM_ACTIVATION
    }

    fn default_issue() -> IssueConfig {
        IssueConfig::new(defaults::STREAM_THRESHOLD, FillRule::FarAbove)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.detector_count == 0 {
            return Err(ConfigError::ZeroCapacity {
                table: "stream.detector_count",
            });
        }
        if self.degree == 0 {
            return Err(ConfigError::ZeroDegree { detector: "stream" });
        }
        if self.window > STREAM_WINDOW_LIMIT {
            return Err(ConfigError::WindowTooLarge {
                window: self.window,
                limit: STREAM_WINDOW_LIMIT,
            });
        }
        Ok(())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            detector_count: defaults::STREAM_DETECTOR_COUNT,
            window: defaults::STREAM_WINDOW,
            degree: defaults::STREAM_DEGREE,
            activation: defaults::STREAM_ACTIVATION,
            issue: Self::default_issue(),
        }
    }
}
