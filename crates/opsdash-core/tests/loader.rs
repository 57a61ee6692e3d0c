use std::fs;
use std::path::{Path, PathBuf};

use opsdash_core::loader::{channel_row_counts, distinct_channels, empty_unified_table};
use opsdash_core::{DashboardConfig, DashboardError, FsSource, Loader, MemorySource, UnitConfig};
use opsdash_parser::{parse_log_file, ColumnLayout, ParserError};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../opsdash-parser/tests/data")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

fn config_for(unit: &str, directory: &str) -> DashboardConfig {
    DashboardConfig::new(vec![UnitConfig {
        id: unit.to_string(),
        directory: PathBuf::from(directory),
    }])
}

fn gt5_source() -> MemorySource {
    MemorySource::new()
        .with_file("/logs/GT 5/GT5_2024-01.csv", fixture("GT5_2024-01.csv"))
        .with_file("/logs/GT 5/GT5_2024-02.csv", fixture("GT5_2024-02.csv"))
        .with_file("/logs/GT 5/summary.txt", "not a log")
}

#[test]
fn unified_row_count_is_sum_of_file_rows() {
    let loader = Loader::new(config_for("GT 5", "/logs/GT 5"), gt5_source());
    let loaded = loader.load_unit("GT 5").expect("load");

    let per_file: usize = ["GT5_2024-01.csv", "GT5_2024-02.csv"]
        .iter()
        .map(|name| {
            parse_log_file(&fixture(name), &ColumnLayout::default())
                .expect("parse")
                .row_count()
        })
        .sum();

    assert_eq!(loaded.table.height(), per_file);
    assert_eq!(loaded.report.total_rows(), per_file);
    assert_eq!(loaded.report.files.len(), 2);
    assert_eq!(loaded.report.files[0].hash.len(), 64);
}

#[test]
fn rows_keep_file_order_then_row_order() {
    let loader = Loader::new(config_for("GT 5", "/logs/GT 5"), gt5_source());
    let loaded = loader.load_unit("GT 5").expect("load");

    let sources = loaded.table.column("source_file").unwrap().str().unwrap();
    assert_eq!(sources.get(0), Some("/logs/GT 5/GT5_2024-01.csv"));
    assert_eq!(sources.get(4), Some("/logs/GT 5/GT5_2024-01.csv"));
    assert_eq!(sources.get(5), Some("/logs/GT 5/GT5_2024-02.csv"));

    let values = loaded.table.column("value").unwrap().f64().unwrap();
    assert_eq!(values.get(0), Some(520.5));
    assert_eq!(values.get(5), Some(530.0));
}

#[test]
fn overlapping_rows_are_not_deduplicated_on_load() {
    let loader = Loader::new(config_for("GT 5", "/logs/GT 5"), gt5_source());
    let loaded = loader.load_unit("GT 5").expect("load");

    let counts = channel_row_counts(&loaded.table).expect("counts");
    assert_eq!(
        counts,
        vec![
            ("Exhaust temperature".to_string(), 6),
            ("Compressor discharge pressure".to_string(), 2),
            ("Fuel gas flow".to_string(), 1),
        ]
    );
}

#[test]
fn channels_follow_first_seen_order() {
    let loader = Loader::new(config_for("GT 5", "/logs/GT 5"), gt5_source());
    let loaded = loader.load_unit("GT 5").expect("load");

    assert_eq!(
        loaded.channels().expect("channels"),
        vec![
            "Exhaust temperature",
            "Compressor discharge pressure",
            "Fuel gas flow"
        ]
    );
    let series = loaded.channel_series("Compressor discharge pressure").expect("filter");
    assert_eq!(series.height(), 2);
}

#[test]
fn bad_time_value_aborts_the_whole_load() {
    let source = MemorySource::new()
        .with_file("/logs/GT 7/a.csv", fixture("GT5_2024-01.csv"))
        .with_file("/logs/GT 7/b.csv", fixture("GT7_bad_time.csv"));
    let loader = Loader::new(config_for("GT 7", "/logs/GT 7"), source);

    let err = loader.load_unit("GT 7").expect_err("must fail");
    match err {
        DashboardError::Parse { path, source } => {
            assert_eq!(path, Path::new("/logs/GT 7/b.csv"));
            assert!(matches!(source, ParserError::InvalidTime { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_directory_is_not_found() {
    let loader = Loader::new(config_for("GT 5", "/logs/GT 5"), MemorySource::new());
    assert!(matches!(
        loader.load_unit("GT 5"),
        Err(DashboardError::NotFound { .. })
    ));
    assert!(matches!(
        loader.load_unit("GT 6"),
        Err(DashboardError::UnknownUnit(_))
    ));
}

#[test]
fn empty_directory_yields_empty_table_with_schema() {
    let source = MemorySource::new().with_directory("/logs/GT 5");
    let loader = Loader::new(config_for("GT 5", "/logs/GT 5"), source);

    let loaded = loader.load_unit("GT 5").expect("load");
    assert_eq!(loaded.table.height(), 0);
    assert_eq!(
        loaded.table.schema(),
        empty_unified_table().expect("empty").schema()
    );
    assert!(distinct_channels(&loaded.table).expect("channels").is_empty());
}

#[test]
fn loads_from_disk_with_case_insensitive_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let unit_dir = dir.path().join("GT 6");
    fs::create_dir(&unit_dir).unwrap();
    fs::write(unit_dir.join("march.CSV"), fixture("GT6_semicolon.csv")).unwrap();
    fs::write(unit_dir.join("ignored.xlsx"), "binary").unwrap();

    let config = DashboardConfig::new(vec![UnitConfig {
        id: "GT 6".to_string(),
        directory: unit_dir.clone(),
    }]);
    let loader = Loader::new(config, FsSource);

    let loaded = loader.load_unit("GT 6").expect("load");
    assert_eq!(loaded.table.height(), 2);
    assert_eq!(loaded.report.files[0].format, "semicolon_separated");
    assert_eq!(loaded.report.files[0].path, unit_dir.join("march.CSV"));
}
