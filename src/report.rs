use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use tracing::info;

use crate::{
    dashboard::{Dashboard, Overview},
    stats::{
        complaint::{negative_keyword_counts, top_keywords, KeywordCount},
        neighbourhood::NeighbourhoodSummary,
        price, room_type, NegativeProbability, SentimentShare,
    },
};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Toml,
}

/// Every summary table, ready to hand to the chart layer.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub(crate) struct Report {
    pub(crate) overview: Overview,
    pub(crate) price_sentiment: Vec<SentimentShare>,
    pub(crate) price_negative_probability: Vec<NegativeProbability>,
    pub(crate) room_type_sentiment: Vec<SentimentShare>,
    pub(crate) room_type_negative_probability: Vec<NegativeProbability>,
    pub(crate) complaint_keywords: Vec<KeywordCount>,
    pub(crate) top_complaints: Vec<KeywordCount>,
    pub(crate) neighbourhoods: Vec<NeighbourhoodSummary>,
}

impl Report {
    pub(crate) fn build(dashboard: &Dashboard) -> Self {
        let dataset = dashboard.dataset();
        let analysis = dashboard.analysis();
        let complaint_keywords = negative_keyword_counts(dataset, &analysis.keyword_list);
        let top_complaints = top_keywords(&complaint_keywords, analysis.top_keyword_count);

        Self {
            overview: dashboard.overview(),
            price_sentiment: price::sentiment_distribution(dataset),
            price_negative_probability: price::negative_probability(dataset),
            room_type_sentiment: room_type::sentiment_distribution(
                dataset,
                &analysis.room_type_order,
            ),
            room_type_negative_probability: room_type::negative_probability(
                dataset,
                &analysis.room_type_order,
            ),
            complaint_keywords,
            top_complaints,
            neighbourhoods: dashboard.neighbourhoods(),
        }
    }

    pub(crate) fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => {
                serde_json::to_string_pretty(self).context("failed to serialize report as JSON")
            }
            ReportFormat::Toml => {
                toml::to_string_pretty(self).context("failed to serialize report as TOML")
            }
        }
    }

    /// Writes the rendered report to `output`, or to stdout when `None`.
    pub(crate) fn write(&self, format: ReportFormat, output: Option<&Path>) -> Result<()> {
        let rendered = self.render(format)?;
        match output {
            Some(path) => {
                fs::write(path, rendered)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!("Report written to {}", path.display());
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }
}
