// src/settings.rs

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use config::{builder::DefaultState, ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};

use crate::report::ReportFormat;

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_LOG_LEVEL: &str = "info";

pub(crate) const DEFAULT_KEYWORDS: [&str; 15] = [
    "wifi", "internet", "noise", "dirty", "clean", "parking", "air", "heat", "hot", "smell", "bed",
    "shower", "host", "bugs", "checkin",
];
pub(crate) const DEFAULT_PRICE_BIN_LABELS: [&str; 5] = ["Very Low", "Low", "Mid", "High", "Very High"];

#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Path to the local configuration TOML file.
    #[arg(short, value_name = "CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Path to the listings/reviews CSV. Overrides `dataset.path`.
    #[arg(long, global = true, value_name = "CSV_PATH")]
    pub input: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute every summary table and write them as a single report.
    Report {
        /// Where to write the report. Defaults to stdout.
        #[arg(long, value_name = "OUTPUT_PATH")]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
        format: ReportFormat,
    },
    /// Expose the summary tables to the chart front-end over GraphQL.
    Serve,
}

/// What to do with a row whose price is present but not a positive number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidPricePolicy {
    Reject,
    Skip,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetSettings {
    pub path: Option<PathBuf>,
    pub on_invalid_price: InvalidPricePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub sentiment_positive_threshold: f64,
    pub sentiment_negative_threshold: f64,
    pub price_bin_count: usize,
    #[serde(default = "default_price_bin_labels")]
    pub price_bin_labels: Vec<String>,
    /// Room types listed here are reported first, in this order.
    #[serde(default)]
    pub room_type_order: Vec<String>,
    #[serde(default = "default_keyword_list")]
    pub keyword_list: Vec<String>,
    pub top_keyword_count: usize,
    pub neighbourhood_min_reviews: usize,
    pub neighbourhood_summary_path: Option<PathBuf>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            sentiment_positive_threshold: 0.5,
            sentiment_negative_threshold: -0.5,
            price_bin_count: DEFAULT_PRICE_BIN_LABELS.len(),
            price_bin_labels: default_price_bin_labels(),
            room_type_order: Vec::new(),
            keyword_list: default_keyword_list(),
            top_keyword_count: 5,
            neighbourhood_min_reviews: 1,
            neighbourhood_summary_path: None,
        }
    }
}

fn default_price_bin_labels() -> Vec<String> {
    DEFAULT_PRICE_BIN_LABELS.map(String::from).to_vec()
}

fn default_keyword_list() -> Vec<String> {
    DEFAULT_KEYWORDS.map(String::from).to_vec()
}

impl AnalysisSettings {
    /// Rejects parameter combinations the aggregations cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.sentiment_positive_threshold.is_finite()
            || !self.sentiment_negative_threshold.is_finite()
        {
            bail!("sentiment thresholds must be finite numbers");
        }
        if self.sentiment_negative_threshold > self.sentiment_positive_threshold {
            bail!(
                "negative sentiment threshold ({}) is above the positive threshold ({})",
                self.sentiment_negative_threshold,
                self.sentiment_positive_threshold
            );
        }
        if self.price_bin_count == 0 {
            bail!("price_bin_count must be at least 1");
        }
        if self.price_bin_labels.len() != self.price_bin_count {
            bail!(
                "price_bin_labels has {} entries but price_bin_count is {}",
                self.price_bin_labels.len(),
                self.price_bin_count
            );
        }
        if self.keyword_list.is_empty() {
            bail!("keyword_list must not be empty");
        }
        if self.keyword_list.iter().any(|k| k.trim().is_empty()) {
            bail!("keyword_list contains a blank keyword");
        }
        if let Some(keyword) = self.keyword_list.iter().find(|k| k.trim() != k.as_str()) {
            bail!("keyword {keyword:?} has surrounding whitespace");
        }
        if self.top_keyword_count == 0 {
            bail!("top_keyword_count must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Web {
    #[serde(deserialize_with = "deserialize_socket_addr")]
    pub address: SocketAddr,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogSettings {
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    pub dataset: DatasetSettings,
    pub analysis: AnalysisSettings,
    pub web: Web,
    pub log: LogSettings,
}

impl Settings {
    /// Load settings from an optional TOML file, with sane defaults.
    ///
    /// `input` takes precedence over `dataset.path` from the file.
    pub fn load(path: Option<&Path>, input: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = AnalysisSettings::default();
        let mut builder = ConfigBuilder::<DefaultState>::default()
            .set_default("dataset.on_invalid_price", "reject")?
            .set_default(
                "analysis.sentiment_positive_threshold",
                defaults.sentiment_positive_threshold,
            )?
            .set_default(
                "analysis.sentiment_negative_threshold",
                defaults.sentiment_negative_threshold,
            )?
            .set_default("analysis.price_bin_count", 5_i64)?
            .set_default("analysis.top_keyword_count", 5_i64)?
            .set_default("analysis.neighbourhood_min_reviews", 1_i64)?
            .set_default("web.address", DEFAULT_ADDR)?
            .set_default("log.level", DEFAULT_LOG_LEVEL)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let cfg = builder
            .set_override_option(
                "dataset.path",
                input.map(|p| p.to_string_lossy().into_owned()),
            )?
            .build()?;

        cfg.try_deserialize()
    }
}

fn deserialize_socket_addr<'de, D>(deserializer: D) -> Result<SocketAddr, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_config_file() {
        let settings = Settings::load(None, None).unwrap();
        assert_eq!(settings.dataset.path, None);
        assert_eq!(settings.dataset.on_invalid_price, InvalidPricePolicy::Reject);
        assert_eq!(settings.analysis.price_bin_count, 5);
        assert_eq!(settings.analysis.price_bin_labels[0], "Very Low");
        assert_eq!(settings.analysis.keyword_list.len(), 15);
        assert_eq!(settings.analysis.keyword_list[14], "checkin");
        assert!(settings.analysis.room_type_order.is_empty());
        assert_eq!(settings.web.address, DEFAULT_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(settings.log.level, "info");
        settings.analysis.validate().unwrap();
    }

    #[test]
    fn file_values_override_defaults() {
        let file = write_config(
            r#"
            [dataset]
            path = "reviews.csv"
            on_invalid_price = "skip"

            [analysis]
            sentiment_positive_threshold = 0.3
            price_bin_count = 3
            price_bin_labels = ["Budget", "Standard", "Premium"]
            room_type_order = ["Entire home/apt", "Private room"]

            [web]
            address = "0.0.0.0:9000"
            "#,
        );
        let settings = Settings::load(Some(file.path()), None).unwrap();
        assert_eq!(settings.dataset.path, Some(PathBuf::from("reviews.csv")));
        assert_eq!(settings.dataset.on_invalid_price, InvalidPricePolicy::Skip);
        assert!((settings.analysis.sentiment_positive_threshold - 0.3).abs() < f64::EPSILON);
        assert!((settings.analysis.sentiment_negative_threshold + 0.5).abs() < f64::EPSILON);
        assert_eq!(settings.analysis.price_bin_labels.len(), 3);
        assert_eq!(settings.analysis.room_type_order[1], "Private room");
        assert_eq!(settings.web.address.port(), 9000);
        settings.analysis.validate().unwrap();
    }

    #[test]
    fn input_argument_wins_over_file() {
        let file = write_config("[dataset]\npath = \"from_file.csv\"\n");
        let settings =
            Settings::load(Some(file.path()), Some(Path::new("from_cli.csv"))).unwrap();
        assert_eq!(settings.dataset.path, Some(PathBuf::from("from_cli.csv")));
    }

    #[test]
    fn invalid_address_is_rejected() {
        let file = write_config("[web]\naddress = \"not an address\"\n");
        assert!(Settings::load(Some(file.path()), None).is_err());
    }

    #[test]
    fn inverted_thresholds_fail_validation() {
        let analysis = AnalysisSettings {
            sentiment_positive_threshold: -0.5,
            sentiment_negative_threshold: 0.5,
            ..AnalysisSettings::default()
        };
        let err = analysis.validate().unwrap_err();
        assert!(err.to_string().contains("above the positive threshold"));
    }

    #[test]
    fn label_count_must_match_bin_count() {
        let analysis = AnalysisSettings {
            price_bin_count: 4,
            ..AnalysisSettings::default()
        };
        assert!(analysis.validate().is_err());

        let analysis = AnalysisSettings {
            price_bin_count: 0,
            price_bin_labels: Vec::new(),
            ..AnalysisSettings::default()
        };
        assert!(analysis.validate().is_err());
    }

    #[test]
    fn blank_keyword_fails_validation() {
        let analysis = AnalysisSettings {
            keyword_list: vec!["wifi".to_string(), "  ".to_string()],
            ..AnalysisSettings::default()
        };
        assert!(analysis.validate().is_err());
    }

    #[test]
    fn padded_keyword_fails_validation() {
        let analysis = AnalysisSettings {
            keyword_list: vec![" wifi".to_string(), "noise".to_string()],
            ..AnalysisSettings::default()
        };
        let err = analysis.validate().unwrap_err();
        assert!(err.to_string().contains("\" wifi\""));
    }

    #[test]
    fn zero_top_keyword_count_fails_validation() {
        let analysis = AnalysisSettings {
            top_keyword_count: 0,
            ..AnalysisSettings::default()
        };
        let err = analysis.validate().unwrap_err();
        assert!(err.to_string().contains("top_keyword_count"));
    }
}
