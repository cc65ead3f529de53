use serde::{Deserialize, Serialize};

use crate::models::PricePoint;

/// Price history for one ticker, or the marker that no data could be obtained.
///
/// Fetch failures and empty results are both represented as `Unavailable`, so
/// callers never have to tell "empty" apart from "missing".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "points", rename_all = "snake_case")]
pub enum Series {
    Present(Vec<PricePoint>),
    Unavailable,
}

impl Series {
    /// Wraps provider output, collapsing an empty result into `Unavailable`.
    pub fn from_points(points: Vec<PricePoint>) -> Self {
        if points.is_empty() {
            Series::Unavailable
        } else {
            Series::Present(points)
        }
    }

    pub fn points(&self) -> Option<&[PricePoint]> {
        match self {
            Series::Present(points) => Some(points),
            Series::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Series::Present(points) if !points.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSeries {
    pub label: String,
    pub series: Series,
}

impl LabeledSeries {
    pub fn new(label: impl Into<String>, series: Series) -> Self {
        Self { label: label.into(), series }
    }
}

/// Ordered set of series for one analysis request. Request order is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesSet {
    entries: Vec<LabeledSeries>,
}

impl SeriesSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, series: Series) {
        self.entries.push(LabeledSeries::new(label, series));
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabeledSeries> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<LabeledSeries> for SeriesSet {
    fn from_iter<I: IntoIterator<Item = LabeledSeries>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
