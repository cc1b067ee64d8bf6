pub mod chart;
pub mod config;
pub mod error;
pub mod fetch;
pub mod html;
pub mod table;

pub use error::{Result, ScrapeError};
pub use table::{
    extract_columns, extract_rows, normalize, normalize_table, EmptyTablePolicy, NormalizedTable,
    RawTable,
};
