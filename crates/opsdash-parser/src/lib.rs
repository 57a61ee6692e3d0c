pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{ParserAttempt, ParserError};
pub use formats::schema::{empty_log_dataframe, LogColumn, PARSED_COLUMNS};
pub use model::{ColumnLayout, ParsedLogFile};
pub use registry::{default_parsers, parse_log_file, parse_with_parsers, LogFileParser};

#[cfg(test)]
mod tests;
