//! Result reporting — text summaries of a finished experiment and sinks that
//! hand the per-option estimate histories to plotting tools.

pub mod sink;
pub mod summary;

pub use sink::{
    render_csv, series_from_report, write_report_json, CsvHistorySink, HistorySink,
    JsonHistorySink, MemorySink, OptionSeries,
};
pub use summary::render;
