pub(crate) mod complaint;
pub(crate) mod neighbourhood;
pub(crate) mod price;
pub(crate) mod room_type;

use async_graphql::SimpleObject;
use serde::Serialize;

use crate::sentiment::SentimentLabel;

/// Percentage of a group's reviews in each sentiment class.
///
/// The three percentages sum to 100 unless the group is empty, in which
/// case `record_count` is 0 and every percentage is 0.
#[derive(SimpleObject, Serialize, Debug, Clone, PartialEq)]
pub(crate) struct SentimentShare {
    /// A price-bin label or a room type.
    pub(crate) group: String,
    pub(crate) record_count: usize,
    pub(crate) negative_pct: f64,
    pub(crate) neutral_pct: f64,
    pub(crate) positive_pct: f64,
}

/// Fraction of a group's reviews labelled Negative, in `[0, 1]`.
///
/// An empty group reports a probability of 0.
#[derive(SimpleObject, Serialize, Debug, Clone, PartialEq)]
pub(crate) struct NegativeProbability {
    pub(crate) group: String,
    pub(crate) record_count: usize,
    pub(crate) probability: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LabelCounts {
    negative: usize,
    neutral: usize,
    positive: usize,
}

impl LabelCounts {
    pub(crate) fn add(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Positive => self.positive += 1,
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.negative + self.neutral + self.positive
    }

    fn ratio(&self, count: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = count as f64 / total as f64;
        ratio
    }

    pub(crate) fn share(&self, group: String) -> SentimentShare {
        SentimentShare {
            group,
            record_count: self.total(),
            negative_pct: self.ratio(self.negative) * 100.0,
            neutral_pct: self.ratio(self.neutral) * 100.0,
            positive_pct: self.ratio(self.positive) * 100.0,
        }
    }

    pub(crate) fn negative_probability(&self, group: String) -> NegativeProbability {
        NegativeProbability {
            group,
            record_count: self.total(),
            probability: self.ratio(self.negative),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_sum_to_one_hundred() {
        let mut counts = LabelCounts::default();
        for label in [
            SentimentLabel::Negative,
            SentimentLabel::Neutral,
            SentimentLabel::Neutral,
            SentimentLabel::Positive,
            SentimentLabel::Positive,
            SentimentLabel::Positive,
        ] {
            counts.add(label);
        }
        let share = counts.share("Mid".to_string());
        assert_eq!(share.record_count, 6);
        assert!((share.negative_pct + share.neutral_pct + share.positive_pct - 100.0).abs() < 0.01);
        assert!((share.positive_pct - 50.0).abs() < 1e-9);

        let probability = counts.negative_probability("Mid".to_string());
        assert!((probability.probability - 1.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn empty_group_reports_zeros() {
        let counts = LabelCounts::default();
        let share = counts.share("Low".to_string());
        assert_eq!(share.record_count, 0);
        assert_eq!(share.negative_pct, 0.0);
        assert_eq!(share.neutral_pct, 0.0);
        assert_eq!(share.positive_pct, 0.0);
        assert_eq!(counts.negative_probability("Low".to_string()).probability, 0.0);
    }
}
