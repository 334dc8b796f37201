use async_graphql::{Context, Object, Result};

use super::{LabelCounts, NegativeProbability, SentimentShare};
use crate::{dashboard::Dashboard, dataset::Dataset};

/// Sentiment breakdown per price bin, cheapest bin first.
///
/// Every configured bin is present, empty ones included.
pub(crate) fn sentiment_distribution(dataset: &Dataset) -> Vec<SentimentShare> {
    counts_by_bin(dataset)
        .into_iter()
        .zip(dataset.price_bins().labels())
        .map(|(counts, label)| counts.share(label.clone()))
        .collect()
}

/// Negative-review probability per price bin, cheapest bin first.
pub(crate) fn negative_probability(dataset: &Dataset) -> Vec<NegativeProbability> {
    counts_by_bin(dataset)
        .into_iter()
        .zip(dataset.price_bins().labels())
        .map(|(counts, label)| counts.negative_probability(label.clone()))
        .collect()
}

fn counts_by_bin(dataset: &Dataset) -> Vec<LabelCounts> {
    let mut counts = vec![LabelCounts::default(); dataset.price_bins().len()];
    for review in dataset.reviews() {
        counts[review.price_bin].add(review.label);
    }
    counts
}

#[derive(Default)]
pub(crate) struct PriceStatQuery {}

#[Object]
impl PriceStatQuery {
    /// Review sentiment distribution by price category.
    #[allow(clippy::unused_async)]
    async fn price_sentiment(&self, ctx: &Context<'_>) -> Result<Vec<SentimentShare>> {
        let dashboard = ctx.data::<Dashboard>()?;
        Ok(sentiment_distribution(dashboard.dataset()))
    }

    /// Probability of a negative review by price category.
    #[allow(clippy::unused_async)]
    async fn price_negative_probability(
        &self,
        ctx: &Context<'_>,
    ) -> Result<Vec<NegativeProbability>> {
        let dashboard = ctx.data::<Dashboard>()?;
        Ok(negative_probability(dashboard.dataset()))
    }
}
