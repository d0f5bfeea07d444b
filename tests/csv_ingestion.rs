use sheet_dashboard::ingestion::csv::{
    detect_delimiter, ingest_csv_from_path, ingest_csv_from_reader,
};
use sheet_dashboard::types::{DataType, Value};
use sheet_dashboard::IngestionError;

#[test]
fn ingest_csv_from_path_happy_path() {
    let t = ingest_csv_from_path("tests/fixtures/people.csv").unwrap();

    assert_eq!(t.columns, vec!["id", "name", "score", "active"]);
    assert_eq!(t.row_count(), 2);
    assert_eq!(
        t.rows[0],
        vec![
            Value::Int64(1),
            Value::Utf8("Ada".to_string()),
            Value::Float64(98.5),
            Value::Bool(true),
        ]
    );
    assert_eq!(t.column_type(2), DataType::Float64);
    assert_eq!(t.column_type(3), DataType::Bool);
}

#[test]
fn ingest_csv_detects_semicolons_and_strips_bom() {
    let t = ingest_csv_from_path("tests/fixtures/semicolon.csv").unwrap();

    assert_eq!(t.columns, vec!["city", "population", "area"]);
    assert_eq!(t.rows[0][0], Value::Utf8("Paris, FR".to_string()));
    assert_eq!(t.rows[0][1], Value::Int64(2_148_000));
    assert_eq!(t.column_type(2), DataType::Float64);
}

#[test]
fn ingest_csv_from_reader_with_custom_builder() {
    let input = "name\tid\nAda\t1\nGrace\t\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(b'\t')
        .from_reader(input.as_bytes());

    let t = ingest_csv_from_reader(&mut rdr).unwrap();
    assert_eq!(t.row_count(), 2);
    assert_eq!(t.rows[0], vec![Value::Utf8("Ada".to_string()), Value::Int64(1)]);
    assert_eq!(t.rows[1][1], Value::Null);
}

#[test]
fn ingest_csv_keeps_raw_rows_for_the_cleaner() {
    let t = ingest_csv_from_path("tests/fixtures/sales.csv").unwrap();

    // Trailing header comma yields an unnamed, empty column; the blank line is still a row.
    assert_eq!(t.columns, vec!["region", "quarter", "sales", "notes", "Unnamed: 4"]);
    assert_eq!(t.row_count(), 6);
    assert!(t.rows[3].iter().all(Value::is_null));
    assert_eq!(t.rows[0][3], Value::Utf8(" first ".to_string()));
    assert_eq!(t.rows[2][3], Value::Null);
}

#[test]
fn ingest_csv_errors_on_missing_file() {
    let err = ingest_csv_from_path("tests/fixtures/does_not_exist.csv").unwrap_err();
    assert!(matches!(err, IngestionError::Io(_)));
}

#[test]
fn delimiter_detection_prefers_consistent_counts() {
    // Commas appear in the free-text column only on some lines.
    let text = "a|b|c\n1|x, y|3\n4|z|6\n";
    assert_eq!(detect_delimiter(text), b'|');
}
