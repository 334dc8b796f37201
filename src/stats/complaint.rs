use async_graphql::{Context, Object, Result, SimpleObject};
use serde::Serialize;

use crate::{dashboard::Dashboard, dataset::Dataset, sentiment::SentimentLabel};

#[derive(SimpleObject, Serialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeywordCount {
    pub(crate) keyword: String,
    /// Number of negative reviews mentioning the keyword.
    pub(crate) count: usize,
}

/// Counts, for each keyword, the comments containing it anywhere.
///
/// Matching is a case-insensitive substring test, so "heat" matches
/// "heater". One comment can count toward several keywords. The result has
/// one entry per keyword, in the order given.
pub(crate) fn count_keywords<'a, I>(comments: I, keywords: &[String]) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let needles: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let mut counts = vec![0; needles.len()];
    for comment in comments {
        let comment = comment.to_lowercase();
        for (count, needle) in counts.iter_mut().zip(&needles) {
            if comment.contains(needle.as_str()) {
                *count += 1;
            }
        }
    }
    keywords
        .iter()
        .zip(counts)
        .map(|(keyword, count)| KeywordCount {
            keyword: keyword.clone(),
            count,
        })
        .collect()
}

/// Keyword counts over the reviews labelled Negative.
pub(crate) fn negative_keyword_counts(dataset: &Dataset, keywords: &[String]) -> Vec<KeywordCount> {
    let comments = dataset
        .reviews()
        .iter()
        .filter(|review| review.label == SentimentLabel::Negative)
        .map(|review| review.comments.as_str());
    count_keywords(comments, keywords)
}

/// The `n` most mentioned keywords. Ties keep the order of `counts`.
pub(crate) fn top_keywords(counts: &[KeywordCount], n: usize) -> Vec<KeywordCount> {
    let mut ranked = counts.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

#[derive(Default)]
pub(crate) struct ComplaintStatQuery {}

#[Object]
impl ComplaintStatQuery {
    /// Mentions of every complaint keyword in negative reviews.
    #[allow(clippy::unused_async)]
    async fn complaint_keywords(&self, ctx: &Context<'_>) -> Result<Vec<KeywordCount>> {
        let dashboard = ctx.data::<Dashboard>()?;
        Ok(negative_keyword_counts(
            dashboard.dataset(),
            &dashboard.analysis().keyword_list,
        ))
    }

    /// The most frequent complaint keywords in negative reviews.
    #[allow(clippy::unused_async)]
    async fn top_complaints(&self, ctx: &Context<'_>) -> Result<Vec<KeywordCount>> {
        let dashboard = ctx.data::<Dashboard>()?;
        let analysis = dashboard.analysis();
        let counts = negative_keyword_counts(dashboard.dataset(), &analysis.keyword_list);
        Ok(top_keywords(&counts, analysis.top_keyword_count))
    }
}
