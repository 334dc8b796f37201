use std::collections::BTreeMap;

use async_graphql::{Context, Object, Result};

use super::{LabelCounts, NegativeProbability, SentimentShare};
use crate::{dashboard::Dashboard, dataset::Dataset};

/// Sentiment breakdown per room type.
///
/// Room types named in `order` come first, in that order, and are reported
/// with zeros when absent from the data. The remaining observed room types
/// follow by descending record count, ties alphabetical.
pub(crate) fn sentiment_distribution(dataset: &Dataset, order: &[String]) -> Vec<SentimentShare> {
    grouped(dataset, order)
        .into_iter()
        .map(|(room_type, counts)| counts.share(room_type))
        .collect()
}

/// Negative-review probability per room type, in the same order as
/// [`sentiment_distribution`].
pub(crate) fn negative_probability(
    dataset: &Dataset,
    order: &[String],
) -> Vec<NegativeProbability> {
    grouped(dataset, order)
        .into_iter()
        .map(|(room_type, counts)| counts.negative_probability(room_type))
        .collect()
}

fn grouped(dataset: &Dataset, order: &[String]) -> Vec<(String, LabelCounts)> {
    let mut observed = dataset
        .reviews()
        .iter()
        .fold(BTreeMap::<&str, LabelCounts>::new(), |mut acc, review| {
            acc.entry(review.room_type.as_str())
                .or_default()
                .add(review.label);
            acc
        });

    let mut groups: Vec<(String, LabelCounts)> = Vec::with_capacity(observed.len());
    for room_type in order {
        if groups.iter().any(|(name, _)| name == room_type) {
            continue;
        }
        let counts = observed.remove(room_type.as_str()).unwrap_or_default();
        groups.push((room_type.clone(), counts));
    }

    // `observed` iterates alphabetically and the sort is stable.
    let mut rest: Vec<_> = observed.into_iter().collect();
    rest.sort_by(|(_, a), (_, b)| b.total().cmp(&a.total()));
    groups.extend(
        rest.into_iter()
            .map(|(room_type, counts)| (room_type.to_string(), counts)),
    );
    groups
}

#[derive(Default)]
pub(crate) struct RoomTypeStatQuery {}

#[Object]
impl RoomTypeStatQuery {
    /// Sentiment distribution by room type.
    #[allow(clippy::unused_async)]
    async fn room_type_sentiment(&self, ctx: &Context<'_>) -> Result<Vec<SentimentShare>> {
        let dashboard = ctx.data::<Dashboard>()?;
        Ok(sentiment_distribution(
            dashboard.dataset(),
            &dashboard.analysis().room_type_order,
        ))
    }

    /// Probability of a negative review by room type.
    #[allow(clippy::unused_async)]
    async fn room_type_negative_probability(
        &self,
        ctx: &Context<'_>,
    ) -> Result<Vec<NegativeProbability>> {
        let dashboard = ctx.data::<Dashboard>()?;
        Ok(negative_probability(
            dashboard.dataset(),
            &dashboard.analysis().room_type_order,
        ))
    }
}
