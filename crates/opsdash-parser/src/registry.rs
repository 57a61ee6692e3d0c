use crate::errors::{ParserAttempt, ParserError};
use crate::formats::{COMMA_SEPARATED, SEMICOLON_SEPARATED, TAB_SEPARATED};
use crate::model::{ColumnLayout, ParsedLogFile};

pub trait LogFileParser {
    fn name(&self) -> &'static str;
    fn parse(&self, content: &str, layout: &ColumnLayout) -> Result<ParsedLogFile, ParserError>;
}

/// Parsers tried for every export, in order. Each one rejects a file whose header does not
/// split on its delimiter, so the order only matters for pathological headers.
pub fn default_parsers() -> [&'static dyn LogFileParser; 3] {
    [&COMMA_SEPARATED, &SEMICOLON_SEPARATED, &TAB_SEPARATED]
}

pub fn parse_log_file(content: &str, layout: &ColumnLayout) -> Result<ParsedLogFile, ParserError> {
    parse_with_parsers(content, layout, &default_parsers())
}

/// Returns the first parser's result that is not a format mismatch. A parser that
/// recognized the header but failed on the body ends the search with its own error.
pub fn parse_with_parsers(
    content: &str,
    layout: &ColumnLayout,
    parsers: &[&dyn LogFileParser],
) -> Result<ParsedLogFile, ParserError> {
    let mut attempts = Vec::with_capacity(parsers.len());

    for parser in parsers {
        let err = match parser.parse(content, layout) {
            Ok(parsed) => return Ok(parsed),
            Err(err) => err,
        };
        match err {
            ParserError::FormatMismatch { reason, .. } => {
                attempts.push(ParserAttempt::new(parser.name(), reason));
            }
            other => return Err(other),
        }
    }

    Err(ParserError::NoMatchingParser { attempts })
}
