use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::errors::ParserError;
use crate::formats::schema::{empty_log_dataframe, PARSED_COLUMNS};
use crate::formats::{DelimitedParser, COMMA_SEPARATED, SEMICOLON_SEPARATED, TAB_SEPARATED};
use crate::model::ColumnLayout;
use crate::registry::LogFileParser;
use crate::{parse_log_file, parse_with_parsers};

fn fixture(path: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn micros(date: &str, time: &str) -> i64 {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .expect("date")
        .and_time(chrono::NaiveTime::parse_from_str(time, "%H:%M:%S").expect("time"))
        .and_utc()
        .timestamp_micros()
}

#[test]
fn parses_comma_separated_export() {
    let content = fixture("GT5_2024-01.csv");
    let parsed = parse_log_file(&content, &ColumnLayout::default()).expect("parse failed");

    assert_eq!(parsed.format, "comma_separated");
    assert_eq!(parsed.df.get_column_names(), PARSED_COLUMNS);
    assert_eq!(parsed.row_count(), 5);

    let channel = parsed.df.column("channel").unwrap().str().unwrap();
    assert_eq!(channel.get(1), Some("Compressor discharge pressure"));

    let value = parsed.df.column("value").unwrap().f64().unwrap();
    assert_eq!(value.get(0), Some(520.5));

    let unit = parsed.df.column("unit_label").unwrap().str().unwrap();
    assert_eq!(unit.get(1), Some("bar"));

    let datetime = parsed.df.column("datetime").unwrap().datetime().unwrap();
    assert_eq!(datetime.get(2), Some(micros("2024-01-01", "01:00:00")));
}

#[test]
fn parses_semicolon_export_with_decimal_comma() {
    let content = fixture("GT6_semicolon.csv");
    let parsed = parse_log_file(&content, &ColumnLayout::default()).expect("parse failed");

    assert_eq!(parsed.format, "semicolon_separated");
    assert_eq!(parsed.row_count(), 2, "blank trailing line must be skipped");

    let value = parsed.df.column("value").unwrap().f64().unwrap();
    assert_eq!(value.get(0), Some(4.5));
    assert_eq!(value.get(1), Some(5.5));

    let date = parsed.df.column("date").unwrap().str().unwrap();
    assert_eq!(date.get(0), Some("2024-03-15"));

    let datetime = parsed.df.column("datetime").unwrap().datetime().unwrap();
    assert_eq!(datetime.get(1), Some(micros("2024-03-15", "10:00:00")));
}

#[test]
fn empty_value_becomes_null() {
    let content = fixture("GT5_2024-02.csv");
    let parsed = parse_log_file(&content, &ColumnLayout::default()).expect("parse failed");

    let value = parsed.df.column("value").unwrap().f64().unwrap();
    assert_eq!(value.get(3), None);
    assert_eq!(parsed.df.column("value").unwrap().null_count(), 1);
}

#[test]
fn rejects_time_not_matching_hh_mm_ss() {
    let content = fixture("GT7_bad_time.csv");
    let err = parse_log_file(&content, &ColumnLayout::default()).expect_err("must fail");

    match err {
        ParserError::InvalidTime {
            line_index, value, ..
        } => {
            assert_eq!(line_index, 3);
            assert_eq!(value, "1:00 PM");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejects_fractional_and_short_times() {
    let layout = ColumnLayout::default();
    for bad in ["12:30", "12:30:00.5", "noon", ""] {
        let content = format!(
            "Date,Measurement time,Description of measuring point,Meas/TotCountrRdg   _,CharactstcUnit\n2024-01-01,{bad},Exhaust temperature,1.0,°C\n"
        );
        let err = COMMA_SEPARATED
            .parse(&content, &layout)
            .expect_err("time must be rejected");
        assert!(
            matches!(err, ParserError::InvalidTime { .. }),
            "'{bad}' produced {err}"
        );
    }
}

#[test]
fn missing_required_column_is_reported() {
    let content = fixture("GT7_missing_unit_column.csv");
    let err = parse_log_file(&content, &ColumnLayout::default()).expect_err("must fail");

    match err {
        ParserError::MissingColumn { column, .. } => assert_eq!(column, "CharactstcUnit"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unrecognized_file_lists_every_attempt() {
    let err = parse_log_file("just one line of prose\n", &ColumnLayout::default())
        .expect_err("must fail");

    match err {
        ParserError::NoMatchingParser { attempts } => {
            assert_eq!(attempts.len(), 3);
            assert_eq!(attempts[0].parser, "comma_separated");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn custom_layout_and_datetime_dates() {
    let layout = ColumnLayout {
        date: "Day".to_string(),
        measurement_time: "Time".to_string(),
        channel: "Point".to_string(),
        value: "Reading".to_string(),
        unit_label: "Unit".to_string(),
    };
    let content = "Unit\tReading\tPoint\tTime\tDay\n\
                   rpm\t3000\tShaft speed\t06:00:00\t2024-05-01 00:00:00\n";

    let parsed = parse_log_file(content, &layout).expect("parse failed");
    assert_eq!(parsed.format, "tab_separated");

    let datetime = parsed.df.column("datetime").unwrap().datetime().unwrap();
    assert_eq!(datetime.get(0), Some(micros("2024-05-01", "06:00:00")));
    let time = parsed.df.column("measurement_time").unwrap().str().unwrap();
    assert_eq!(time.get(0), Some("06:00:00"));
}

#[test]
fn header_only_file_yields_empty_frame_with_schema() {
    let content = "\u{feff}Date,Measurement time,Description of measuring point,Meas/TotCountrRdg   _,CharactstcUnit\n";
    let parsed = parse_log_file(content, &ColumnLayout::default()).expect("parse failed");

    assert_eq!(parsed.row_count(), 0);
    assert_eq!(parsed.df.schema(), empty_log_dataframe().unwrap().schema());
}

#[test]
fn restricted_parser_list_reports_mismatch() {
    let content = fixture("GT6_semicolon.csv");
    let parsers: [&dyn LogFileParser; 1] = [&COMMA_SEPARATED];
    let err = parse_with_parsers(&content, &ColumnLayout::default(), &parsers)
        .expect_err("comma parser cannot read a semicolon export");
    assert!(matches!(err, ParserError::NoMatchingParser { .. }));

    let custom = DelimitedParser::new("pipe_separated", b'|');
    assert_eq!(custom.delimiter(), b'|');
    assert_eq!(SEMICOLON_SEPARATED.name(), "semicolon_separated");
}

#[test]
fn body_error_stops_the_search() {
    // Comma export with a bad time: the tab parser after it must never get a turn.
    let content = fixture("GT7_bad_time.csv");
    let parsers: [&dyn LogFileParser; 2] = [&COMMA_SEPARATED, &TAB_SEPARATED];
    let err = parse_with_parsers(&content, &ColumnLayout::default(), &parsers)
        .expect_err("bad time must fail");
    assert!(
        matches!(err, ParserError::InvalidTime { parser, .. } if parser == COMMA_SEPARATED.name())
    );
}
