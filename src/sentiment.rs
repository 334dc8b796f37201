use crate::settings::AnalysisSettings;

/// The three review classes every aggregation is expressed in.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

/// Score cut-offs for labelling: strictly above `positive` is Positive,
/// strictly below `negative` is Negative, everything else is Neutral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Thresholds {
    pub(crate) positive: f64,
    pub(crate) negative: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            positive: 0.5,
            negative: -0.5,
        }
    }
}

impl From<&AnalysisSettings> for Thresholds {
    fn from(settings: &AnalysisSettings) -> Self {
        Self {
            positive: settings.sentiment_positive_threshold,
            negative: settings.sentiment_negative_threshold,
        }
    }
}

impl Thresholds {
    pub(crate) fn label(&self, score: f64) -> SentimentLabel {
        if score > self.positive {
            SentimentLabel::Positive
        } else if score < self.negative {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}
