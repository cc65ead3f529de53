mod analytics;
mod price_point;
mod series;

pub use analytics::*;
pub use price_point::PricePoint;
pub use series::{LabeledSeries, Series, SeriesSet};
