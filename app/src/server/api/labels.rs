//! Label generation API.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use row_source::{ColumnKind, SourceError, Table};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::pipeline::{self, DEFAULT_OUTPUT, GeneratedPdf, LabelRequest, PipelineError, SourceSpec};
use crate::server::SharedState;

use super::{err_json, ok_json, pipeline_err};

type ApiError = (StatusCode, Json<Value>);

/// An uploaded CSV plus optional JSON options from one multipart form.
#[derive(Debug, Default)]
struct Upload {
    file_name: String,
    data: Option<Vec<u8>>,
    options: Option<String>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    let mut upload = Upload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| err_json(400, &e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                upload.file_name = field.file_name().unwrap_or("upload.csv").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| err_json(400, &e.to_string()))?;
                upload.data = Some(data.to_vec());
            }
            "options" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| err_json(400, &e.to_string()))?;
                upload.options = Some(text);
            }
            _ => {}
        }
    }
    Ok(upload)
}

/// POST /api/columns – Columns, kinds and filter choices of an uploaded CSV
pub async fn inspect_columns(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let upload = read_upload(&mut multipart).await?;
    let Some(data) = upload.data else {
        return Err(err_json(400, "No file provided"));
    };
    let name = upload.file_name;

    let described = tokio::task::spawn_blocking(move || {
        let provider = SourceSpec::CsvUpload { name, data }.provider(state.config())?;
        let table = provider.load()?;
        describe_columns(&table).map_err(PipelineError::from)
    })
    .await
    .map_err(|e| err_json(500, &e.to_string()))?
    .map_err(pipeline_err)?;

    Ok(ok_json(described))
}

/// POST /api/labels – PDF from an uploaded CSV and JSON options
pub async fn generate_from_upload(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(&mut multipart).await?;
    let Some(data) = upload.data else {
        return Err(err_json(400, "No file provided"));
    };
    let Some(options) = upload.options else {
        return Err(err_json(400, "No label options provided"));
    };
    let request: LabelRequest = serde_json::from_str(&options)
        .map_err(|e| err_json(400, &format!("Invalid label options: {e}")))?;

    let spec = SourceSpec::CsvUpload {
        name: upload.file_name,
        data,
    };
    let pdf = run_blocking(state, spec, request).await?;
    pdf_response(pdf)
}

/// Options for a label run against the configured database. Only a table
/// name is accepted here; free-form SQL stays with the CLI.
#[derive(Debug, Deserialize)]
pub struct DatabaseLabelRequest {
    #[serde(default)]
    pub table: Option<String>,
    #[serde(flatten)]
    pub options: LabelRequest,
}

impl DatabaseLabelRequest {
    fn source(&self) -> SourceSpec {
        SourceSpec::Sqlite {
            path: None,
            table: self.table.clone(),
            query: None,
        }
    }
}

/// POST /api/labels/database – PDF from a table of the configured SQLite database
pub async fn generate_from_database(
    State(state): State<SharedState>,
    Json(body): Json<DatabaseLabelRequest>,
) -> Result<Response, ApiError> {
    let spec = body.source();
    let pdf = run_blocking(state, spec, body.options).await?;
    pdf_response(pdf)
}

async fn run_blocking(
    state: SharedState,
    spec: SourceSpec,
    request: LabelRequest,
) -> Result<GeneratedPdf, ApiError> {
    tokio::task::spawn_blocking(move || {
        let config = state.config();
        let provider = spec.provider(config)?;
        let label = request.label_config(config)?;
        pipeline::generate_pdf(provider.as_ref(), &request.selection, &label)
    })
    .await
    .map_err(|e| err_json(500, &e.to_string()))?
    .map_err(pipeline_err)
}

/// Skipped rows travel in headers: `X-Skipped-Row-Indexes` holds the
/// zero-based row indexes, `X-Skipped-Detail` a JSON array with index,
/// field and reason per row.
fn pdf_response(pdf: GeneratedPdf) -> Result<Response, ApiError> {
    let indexes = pdf
        .skipped
        .iter()
        .map(|f| f.index.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let detail: Vec<Value> = pdf
        .skipped
        .iter()
        .map(|f| {
            json!({
                "index": f.index,
                "field": f.error.field(),
                "reason": f.error.to_string(),
            })
        })
        .collect();
    let detail = serde_json::to_string(&detail).map_err(|e| err_json(500, &e.to_string()))?;

    Response::builder()
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{DEFAULT_OUTPUT}\""),
        )
        .header("X-Label-Pages", pdf.pages)
        .header("X-Skipped-Rows", pdf.skipped.len())
        .header("X-Skipped-Row-Indexes", indexes)
        .header("X-Skipped-Detail", detail)
        .body(Body::from(pdf.bytes))
        .map_err(|e| err_json(500, &e.to_string()))
}

/// Column metadata for building a filter: numeric columns report their
/// range, text columns their distinct values.
pub fn describe_columns(table: &Table) -> Result<Value, SourceError> {
    let mut columns = Vec::with_capacity(table.columns().len());
    for column in table.columns() {
        let values = table.unique_values(column)?;
        let entry = match table.column_kind(column)? {
            ColumnKind::Numeric => json!({
                "name": column,
                "kind": "numeric",
                "min": values.first().and_then(|v| v.as_f64()),
                "max": values.last().and_then(|v| v.as_f64()),
            }),
            ColumnKind::Text => json!({
                "name": column,
                "kind": "text",
                "values": values,
            }),
        };
        columns.push(entry);
    }
    Ok(json!({ "rows": table.len(), "columns": columns }))
}
