use label_engine::{ComposeError, FailurePolicy};
use qr_labels_lib::config::AppConfig;
use qr_labels_lib::pipeline::{self, LabelRequest, PipelineError, SourceSpec};
use row_source::RangeFilter;

const CSV: &str = "\
id,qty,site
A1,5,north
A2,12,south
,3,north
A4,7,east
";

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

fn request(json: &str) -> LabelRequest {
    serde_json::from_str(json).unwrap()
}

#[test]
fn csv_upload_to_pdf() {
    let config = AppConfig::default();
    let req = request(
        r#"{"code_field":"id","display_fields":["id","qty"],"emphasized_fields":["id"],
            "filter":{"kind":"values","column":"site","values":["north","south"]},
            "skip_invalid":true}"#,
    );
    let provider = SourceSpec::CsvUpload {
        name: "rows.csv".into(),
        data: CSV.as_bytes().to_vec(),
    }
    .provider(&config)
    .unwrap();
    let label = req.label_config(&config).unwrap();
    assert_eq!(label.policy, FailurePolicy::Skip);

    let pdf = pipeline::generate_pdf(provider.as_ref(), &req.selection, &label).unwrap();

    assert!(pdf.bytes.starts_with(b"%PDF-"));
    assert_eq!(pdf.pages, 2);
    assert_eq!(pdf.skipped.len(), 1);
    assert_eq!(pdf.skipped[0].index, 2);
    assert_eq!(count(&pdf.bytes, b"(id: A1) Tj"), 1);
    assert_eq!(count(&pdf.bytes, b"(qty: 12) Tj"), 1);
    assert_eq!(count(&pdf.bytes, b"(id: A4) Tj"), 0);
}

#[test]
fn csv_file_aborts_on_missing_code_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.csv");
    std::fs::write(&path, CSV).unwrap();

    let config = AppConfig::default();
    let req = request(r#"{"code_field":"id","display_fields":["id"]}"#);
    let provider = SourceSpec::CsvFile(path).provider(&config).unwrap();
    let label = req.label_config(&config).unwrap();
    let err = pipeline::generate_pdf(provider.as_ref(), &req.selection, &label).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Compose(ComposeError::Row { index: 2, .. })
    ));
}

#[test]
fn sqlite_table_with_numeric_range_and_limit() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("labels.db");
    {
        let conn = rusqlite::Connection::open(&db).unwrap();
        conn.execute_batch(
            "CREATE TABLE Sample_QR (id TEXT, qty INTEGER);
             INSERT INTO Sample_QR VALUES ('S1', 1), ('S2', 4), ('S3', 6), ('S4', 9);",
        )
        .unwrap();
    }

    let config = AppConfig {
        db_path: Some(db),
        ..AppConfig::default()
    };
    let provider = SourceSpec::Sqlite {
        path: None,
        table: None,
        query: None,
    }
    .provider(&config)
    .unwrap();

    let mut req = request(r#"{"code_field":"id","display_fields":["id","qty"],"limit":2}"#);
    req.selection.filter = Some(RangeFilter::Numeric {
        column: "qty".into(),
        min: Some(4.0),
        max: None,
    });

    let label = req.label_config(&config).unwrap();
    let composition = pipeline::compose(provider.as_ref(), &req.selection, &label).unwrap();
    let payloads: Vec<&str> = composition
        .pages
        .iter()
        .map(|page| page.payload.as_str())
        .collect();
    assert_eq!(payloads, vec!["S2", "S3"]);
}

#[test]
fn sqlite_query_source() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("labels.db");
    {
        let conn = rusqlite::Connection::open(&db).unwrap();
        conn.execute_batch(
            "CREATE TABLE stock (code TEXT, bin TEXT);
             INSERT INTO stock VALUES ('X1', 'B-01'), ('X2', 'B-02');",
        )
        .unwrap();
    }

    let config = AppConfig::default();
    let provider = SourceSpec::Sqlite {
        path: Some(db),
        table: None,
        query: Some("SELECT code, bin FROM stock WHERE bin = 'B-02'".into()),
    }
    .provider(&config)
    .unwrap();
    let req = request(r#"{"code_field":"code","display_fields":["code","bin"]}"#);

    let label = req.label_config(&config).unwrap();
    let pdf = pipeline::generate_pdf(provider.as_ref(), &req.selection, &label).unwrap();
    assert_eq!(pdf.pages, 1);
    assert_eq!(count(&pdf.bytes, b"(bin: B-02) Tj"), 1);
}
