use anyhow::{Context, Result};
use async_graphql::{Object, SimpleObject};
use serde::Serialize;
use tracing::info;

use crate::{
    binning::PriceBinRange,
    dataset::{load_records, Dataset},
    settings::{AnalysisSettings, Settings},
    stats::neighbourhood::{load_summary, summarize, NeighbourhoodSummary},
};

/// Everything the summary tables are computed from, loaded once at startup.
#[derive(Debug)]
pub(crate) struct Dashboard {
    dataset: Dataset,
    analysis: AnalysisSettings,
    precomputed_neighbourhoods: Option<Vec<NeighbourhoodSummary>>,
}

/// How the input was cleaned and where the price bins fell.
#[derive(SimpleObject, Serialize, Debug, Clone, PartialEq)]
pub(crate) struct Overview {
    pub(crate) rows_read: usize,
    pub(crate) dropped_missing_fields: usize,
    pub(crate) skipped_invalid_price: usize,
    /// Reviews that went into every table.
    pub(crate) record_count: usize,
    pub(crate) price_bins: Vec<PriceBinRange>,
}

impl Dashboard {
    /// Validates the analysis parameters, then reads and analyses the
    /// dataset named by the settings.
    pub(crate) fn load(settings: &Settings) -> Result<Self> {
        settings.analysis.validate()?;
        let path = settings
            .dataset
            .path
            .as_deref()
            .context("no dataset given: pass --input or set dataset.path")?;

        let ingested = load_records(path, settings.dataset.on_invalid_price)
            .with_context(|| format!("failed to load {}", path.display()))?;
        info!(
            "Loaded {} reviews from {} ({} rows dropped for missing price or comments, {} skipped for invalid price)",
            ingested.records.len(),
            path.display(),
            ingested.summary.dropped_missing_fields,
            ingested.summary.skipped_invalid_price,
        );
        let dataset = Dataset::new(ingested, &settings.analysis)?;

        let precomputed_neighbourhoods = match &settings.analysis.neighbourhood_summary_path {
            Some(path) => {
                let summaries = load_summary(path)
                    .with_context(|| format!("failed to load {}", path.display()))?;
                info!(
                    "Using precomputed summary of {} neighbourhoods from {}",
                    summaries.len(),
                    path.display()
                );
                Some(summaries)
            }
            None => None,
        };

        Ok(Self::new(
            dataset,
            settings.analysis.clone(),
            precomputed_neighbourhoods,
        ))
    }

    pub(crate) fn new(
        dataset: Dataset,
        analysis: AnalysisSettings,
        precomputed_neighbourhoods: Option<Vec<NeighbourhoodSummary>>,
    ) -> Self {
        Self {
            dataset,
            analysis,
            precomputed_neighbourhoods,
        }
    }

    pub(crate) fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub(crate) fn analysis(&self) -> &AnalysisSettings {
        &self.analysis
    }

    pub(crate) fn overview(&self) -> Overview {
        let summary = self.dataset.summary();
        Overview {
            rows_read: summary.rows_read,
            dropped_missing_fields: summary.dropped_missing_fields,
            skipped_invalid_price: summary.skipped_invalid_price,
            record_count: self.dataset.reviews().len(),
            price_bins: self.dataset.price_bins().ranges(),
        }
    }

    /// The precomputed table when one was supplied, otherwise means over
    /// the loaded reviews.
    pub(crate) fn neighbourhoods(&self) -> Vec<NeighbourhoodSummary> {
        match &self.precomputed_neighbourhoods {
            Some(summaries) => summaries.clone(),
            None => summarize(&self.dataset, self.analysis.neighbourhood_min_reviews),
        }
    }
}

#[derive(Default)]
pub(crate) struct OverviewQuery {}

#[Object]
impl OverviewQuery {
    /// Ingestion counts and price-bin edges.
    #[allow(clippy::unused_async)]
    async fn overview(&self, ctx: &async_graphql::Context<'_>) -> async_graphql::Result<Overview> {
        Ok(ctx.data::<Dashboard>()?.overview())
    }
}
