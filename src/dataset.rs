use std::{
    collections::HashMap,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use csv::StringRecord;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    binning::PriceBins,
    sentiment::{SentimentLabel, Thresholds},
    settings::{AnalysisSettings, InvalidPricePolicy},
};

const PRICE: &str = "price";
const COMMENTS: &str = "comments";
const ROOM_TYPE: &str = "room_type";
const NEIGHBOURHOOD: &str = "neighbourhood";
const SENTIMENT: &str = "sentiment";

/// Inside Airbnb exports name the cleaned neighbourhood column this way.
const NEIGHBOURHOOD_ALIAS: &str = "neighbourhood_cleansed";

// Currency symbols, thousands separators and stray whitespace.
static PRICE_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Sc},\s]").expect("price pattern is valid"));

#[derive(Error, Debug)]
pub(crate) enum DatasetError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("line {line}: price {value:?} is not a positive number")]
    InvalidPrice { line: u64, value: String },
    #[error("line {line}: sentiment {value:?} is not a finite number")]
    InvalidSentiment { line: u64, value: String },
    #[error("line {line}: {field} {value:?} is not a finite number")]
    InvalidSummary {
        line: u64,
        field: &'static str,
        value: f64,
    },
    #[error("no usable records after dropping rows without price or comments")]
    Empty,
}

/// A review row that passed cleaning. Derived attributes are not set yet.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CleanRecord {
    pub(crate) price: f64,
    pub(crate) room_type: String,
    pub(crate) neighbourhood: String,
    pub(crate) comments: String,
    pub(crate) sentiment: f64,
}

/// What happened to the rows of the input file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct IngestSummary {
    /// Data rows in the file, excluding the header.
    pub(crate) rows_read: usize,
    /// Rows dropped because `price` or `comments` was empty.
    pub(crate) dropped_missing_fields: usize,
    /// Rows dropped because `price` did not parse (only with the `skip` policy).
    pub(crate) skipped_invalid_price: usize,
}

#[derive(Debug)]
pub(crate) struct Ingested {
    pub(crate) records: Vec<CleanRecord>,
    pub(crate) summary: IngestSummary,
}

/// Strips currency symbols and thousands separators, then parses.
///
/// Returns `None` unless the result is a finite number above zero.
pub(crate) fn parse_price(raw: &str) -> Option<f64> {
    let stripped = PRICE_NOISE.replace_all(raw, "");
    stripped
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0)
}

pub(crate) fn load_records(
    path: &Path,
    policy: InvalidPricePolicy,
) -> Result<Ingested, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_records(file, policy)
}

/// Reads and cleans every row. Fails on the first invalid row unless
/// `policy` allows skipping bad prices.
pub(crate) fn read_records<R: Read>(
    reader: R,
    policy: InvalidPricePolicy,
) -> Result<Ingested, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::locate(reader.headers()?)?;

    let mut records = Vec::new();
    let mut summary = IngestSummary::default();
    for row in reader.records() {
        let row = row?;
        summary.rows_read += 1;
        let line = row
            .position()
            .map_or(summary.rows_read as u64 + 1, csv::Position::line);

        let raw_price = columns.get(&row, columns.price);
        let comments = columns.get(&row, columns.comments);
        if raw_price.is_empty() || comments.is_empty() {
            summary.dropped_missing_fields += 1;
            continue;
        }

        let Some(price) = parse_price(raw_price) else {
            match policy {
                InvalidPricePolicy::Reject => {
                    return Err(DatasetError::InvalidPrice {
                        line,
                        value: raw_price.to_string(),
                    });
                }
                InvalidPricePolicy::Skip => {
                    warn!("Skipping line {line}: unparseable price {raw_price:?}");
                    summary.skipped_invalid_price += 1;
                    continue;
                }
            }
        };

        let raw_sentiment = columns.get(&row, columns.sentiment);
        let sentiment = raw_sentiment
            .parse::<f64>()
            .ok()
            .filter(|s| s.is_finite())
            .ok_or_else(|| DatasetError::InvalidSentiment {
                line,
                value: raw_sentiment.to_string(),
            })?;

        records.push(CleanRecord {
            price,
            room_type: columns.get(&row, columns.room_type).to_string(),
            neighbourhood: columns.get(&row, columns.neighbourhood).to_string(),
            comments: comments.to_string(),
            sentiment,
        });
    }

    if records.is_empty() {
        return Err(DatasetError::Empty);
    }
    debug!(
        "Read {} rows, kept {} records",
        summary.rows_read,
        records.len()
    );
    Ok(Ingested { records, summary })
}

/// Positions of the required columns in the header row.
struct Columns {
    price: usize,
    comments: usize,
    room_type: usize,
    neighbourhood: usize,
    sentiment: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, DatasetError> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_lowercase(), i))
            .collect();
        let find = |name: &'static str| {
            index
                .get(name)
                .copied()
                .ok_or(DatasetError::MissingColumn(name))
        };
        Ok(Self {
            price: find(PRICE)?,
            comments: find(COMMENTS)?,
            room_type: find(ROOM_TYPE)?,
            // Inside Airbnb exports carry both; the cleansed one is the usable one.
            neighbourhood: find(NEIGHBOURHOOD_ALIAS)
                .or_else(|_| find(NEIGHBOURHOOD))
                .map_err(|_| DatasetError::MissingColumn(NEIGHBOURHOOD))?,
            sentiment: find(SENTIMENT)?,
        })
    }

    /// Trimmed cell value; short rows read as empty.
    fn get<'r>(&self, row: &'r StringRecord, column: usize) -> &'r str {
        row.get(column).map_or("", str::trim)
    }
}

/// A cleaned review together with its derived attributes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Review {
    pub(crate) price: f64,
    pub(crate) room_type: String,
    pub(crate) neighbourhood: String,
    pub(crate) comments: String,
    pub(crate) sentiment: f64,
    pub(crate) label: SentimentLabel,
    pub(crate) price_bin: usize,
}

/// The analysed record set. Built once; every aggregation only reads it.
#[derive(Debug)]
pub(crate) struct Dataset {
    reviews: Vec<Review>,
    price_bins: PriceBins,
    summary: IngestSummary,
}

impl Dataset {
    pub(crate) fn new(
        ingested: Ingested,
        settings: &AnalysisSettings,
    ) -> Result<Self, DatasetError> {
        let Ingested { records, summary } = ingested;
        let prices: Vec<f64> = records.iter().map(|r| r.price).collect();
        let price_bins = PriceBins::fit(&prices, settings.price_bin_labels.clone())
            .ok_or(DatasetError::Empty)?;
        let thresholds = Thresholds::from(settings);

        let reviews = records
            .into_iter()
            .map(|record| Review {
                label: thresholds.label(record.sentiment),
                price_bin: price_bins.assign(record.price),
                price: record.price,
                room_type: record.room_type,
                neighbourhood: record.neighbourhood,
                comments: record.comments,
                sentiment: record.sentiment,
            })
            .collect();

        Ok(Self {
            reviews,
            price_bins,
            summary,
        })
    }

    pub(crate) fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub(crate) fn price_bins(&self) -> &PriceBins {
        &self.price_bins
    }

    pub(crate) fn summary(&self) -> &IngestSummary {
        &self.summary
    }
}

#[cfg(test)]
pub(crate) fn record(
    price: f64,
    room_type: &str,
    neighbourhood: &str,
    comments: &str,
    sentiment: f64,
) -> CleanRecord {
    CleanRecord {
        price,
        room_type: room_type.to_string(),
        neighbourhood: neighbourhood.to_string(),
        comments: comments.to_string(),
        sentiment,
    }
}

#[cfg(test)]
pub(crate) fn dataset(records: Vec<CleanRecord>) -> Dataset {
    let summary = IngestSummary {
        rows_read: records.len(),
        ..IngestSummary::default()
    };
    Dataset::new(Ingested { records, summary }, &AnalysisSettings::default()).unwrap()
}
