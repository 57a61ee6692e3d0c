mod common;
mod delimited;
pub mod schema;

pub use delimited::{DelimitedParser, COMMA_SEPARATED, SEMICOLON_SEPARATED, TAB_SEPARATED};

pub(crate) use common::{
    build_log_dataframe, parse_date, parse_optional_f64, parse_time_of_day, LogColumns,
};
