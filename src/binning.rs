use async_graphql::SimpleObject;
use serde::Serialize;

/// Equal-frequency price buckets whose edges come from the data.
///
/// `edges` holds `labels.len() + 1` ascending values. Bin `i` covers
/// `(edges[i], edges[i + 1]]`, except the first bin which also includes
/// `edges[0]`. Edges may repeat when many prices tie, which leaves the
/// bins between the repeated edges empty.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PriceBins {
    labels: Vec<String>,
    edges: Vec<f64>,
}

/// Price range covered by one bin, as reported next to the tables.
#[derive(SimpleObject, Serialize, Debug, Clone, PartialEq)]
pub(crate) struct PriceBinRange {
    pub(crate) label: String,
    pub(crate) lower: f64,
    pub(crate) upper: f64,
}

impl PriceBins {
    /// Fits one bin per label over `prices`. Returns `None` if there are no
    /// prices or no labels.
    pub(crate) fn fit(prices: &[f64], labels: Vec<String>) -> Option<Self> {
        if prices.is_empty() || labels.is_empty() {
            return None;
        }
        let mut sorted = prices.to_vec();
        sorted.sort_by(f64::total_cmp);

        #[allow(clippy::cast_precision_loss)]
        let bin_count = labels.len() as f64;
        let edges = (0..=labels.len())
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let q = i as f64 / bin_count;
                quantile(&sorted, q)
            })
            .collect();
        Some(Self { labels, edges })
    }

    /// Index of the bin `price` falls into. Prices above the last edge land
    /// in the last bin.
    pub(crate) fn assign(&self, price: f64) -> usize {
        self.edges[1..]
            .iter()
            .position(|&upper| price <= upper)
            .unwrap_or(self.labels.len() - 1)
    }

    pub(crate) fn len(&self) -> usize {
        self.labels.len()
    }

    pub(crate) fn labels(&self) -> &[String] {
        &self.labels
    }

    pub(crate) fn ranges(&self) -> Vec<PriceBinRange> {
        self.labels
            .iter()
            .zip(self.edges.windows(2))
            .map(|(label, bounds)| PriceBinRange {
                label: label.clone(),
                lower: bounds[0],
                upper: bounds[1],
            })
            .collect()
    }
}

/// Linear interpolation between the two closest ranks. `sorted` must be
/// non-empty and ascending.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let pos = q * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(sorted.len() - 1);
    #[allow(clippy::cast_precision_loss)]
    let fraction = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
