use std::{collections::BTreeMap, fs::File, io::Read, path::Path};

use async_graphql::{Context, Object, Result, SimpleObject};
use serde::{Deserialize, Serialize};

use crate::{
    dashboard::Dashboard,
    dataset::{Dataset, DatasetError},
};

/// Price and sentiment level of one neighbourhood.
#[derive(SimpleObject, Serialize, Debug, Clone, PartialEq)]
pub(crate) struct NeighbourhoodSummary {
    pub(crate) neighbourhood: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) review_count: Option<usize>,
    pub(crate) mean_price: f64,
    pub(crate) mean_sentiment: f64,
    /// Both means are at or above the median across neighbourhoods.
    pub(crate) top_tier: bool,
}

#[derive(Deserialize)]
struct SummaryRow {
    neighbourhood: String,
    mean_price: f64,
    mean_sentiment: f64,
    #[serde(default)]
    review_count: Option<usize>,
}

/// Means per neighbourhood over the cleaned reviews, skipping
/// neighbourhoods with fewer than `min_reviews` reviews.
pub(crate) fn summarize(dataset: &Dataset, min_reviews: usize) -> Vec<NeighbourhoodSummary> {
    let totals = dataset.reviews().iter().fold(
        BTreeMap::<&str, (usize, f64, f64)>::new(),
        |mut acc, review| {
            let entry = acc.entry(review.neighbourhood.as_str()).or_default();
            entry.0 += 1;
            entry.1 += review.price;
            entry.2 += review.sentiment;
            acc
        },
    );

    let summaries = totals
        .into_iter()
        .filter(|(_, (count, _, _))| *count >= min_reviews.max(1))
        .map(|(name, (count, price_sum, sentiment_sum))| {
            #[allow(clippy::cast_precision_loss)]
            let n = count as f64;
            NeighbourhoodSummary {
                neighbourhood: name.to_string(),
                review_count: Some(count),
                mean_price: price_sum / n,
                mean_sentiment: sentiment_sum / n,
                top_tier: false,
            }
        })
        .collect();
    rank(summaries)
}

pub(crate) fn load_summary(path: &Path) -> Result<Vec<NeighbourhoodSummary>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_summary(file)
}

/// Reads a precomputed `neighbourhood,mean_price,mean_sentiment` table.
/// `review_count` is optional.
pub(crate) fn read_summary<R: Read>(reader: R) -> Result<Vec<NeighbourhoodSummary>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut summaries = Vec::new();
    for row in reader.deserialize() {
        let row: SummaryRow = row?;
        let line = summaries.len() as u64 + 2;
        for (field, value) in [("mean_price", row.mean_price), ("mean_sentiment", row.mean_sentiment)] {
            if !value.is_finite() {
                return Err(DatasetError::InvalidSummary { line, field, value });
            }
        }
        summaries.push(NeighbourhoodSummary {
            neighbourhood: row.neighbourhood,
            review_count: row.review_count,
            mean_price: row.mean_price,
            mean_sentiment: row.mean_sentiment,
            top_tier: false,
        });
    }
    Ok(rank(summaries))
}

/// Flags the top tier and orders by descending mean price, ties by name.
fn rank(mut summaries: Vec<NeighbourhoodSummary>) -> Vec<NeighbourhoodSummary> {
    let price_median = median(summaries.iter().map(|s| s.mean_price).collect());
    let sentiment_median = median(summaries.iter().map(|s| s.mean_sentiment).collect());
    if let (Some(price_median), Some(sentiment_median)) = (price_median, sentiment_median) {
        for summary in &mut summaries {
            summary.top_tier =
                summary.mean_price >= price_median && summary.mean_sentiment >= sentiment_median;
        }
    }
    summaries.sort_by(|a, b| {
        b.mean_price
            .total_cmp(&a.mean_price)
            .then_with(|| a.neighbourhood.cmp(&b.neighbourhood))
    });
    summaries
}

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

#[derive(Default)]
pub(crate) struct NeighbourhoodStatQuery {}

#[Object]
impl NeighbourhoodStatQuery {
    /// Mean price and sentiment per neighbourhood, priciest first.
    #[allow(clippy::unused_async)]
    async fn neighbourhoods(&self, ctx: &Context<'_>) -> Result<Vec<NeighbourhoodSummary>> {
        let dashboard = ctx.data::<Dashboard>()?;
        Ok(dashboard.neighbourhoods())
    }
}
