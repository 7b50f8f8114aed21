//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use row_source::RangeFilter;

use crate::pipeline::{DEFAULT_OUTPUT, LabelRequest, Selection, SourceSpec};

#[derive(Parser)]
#[command(
    name = "qr-labels",
    version,
    about = "Generate printable QR code labels from a CSV file or SQLite table",
    long_about = "Generate printable QR code labels, one fixed-size page per row.\n\n\
                  Each label carries a QR code of one field and a stack of\n\
                  `field: value` lines, written to a single PDF document."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output (-q warnings, -qq errors only).
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "verbose")]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a PDF with one label page per selected row.
    Generate(GenerateArgs),

    /// Render selected labels as PNG images.
    Preview(PreviewArgs),

    /// Show columns, inferred kinds and values of a source.
    Inspect(InspectArgs),

    /// Serve the label HTTP API.
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Read rows from a CSV file with a header row.
    #[arg(long, value_name = "PATH", conflicts_with = "sqlite")]
    pub csv: Option<PathBuf>,

    /// Read rows from a SQLite database (default: LABEL_DB_PATH).
    #[arg(long, value_name = "PATH")]
    pub sqlite: Option<PathBuf>,

    /// Table to read (default: LABEL_DB_TABLE).
    #[arg(long, value_name = "NAME", conflicts_with = "csv")]
    pub table: Option<String>,

    /// Query to run instead of reading a whole table.
    #[arg(long, value_name = "SQL", conflicts_with_all = ["csv", "table"])]
    pub query: Option<String>,
}

impl SourceArgs {
    /// Without `--csv`, rows come from a database, possibly the configured one.
    pub fn spec(&self) -> SourceSpec {
        match &self.csv {
            Some(path) => SourceSpec::CsvFile(path.clone()),
            None => SourceSpec::Sqlite {
                path: self.sqlite.clone(),
                table: self.table.clone(),
                query: self.query.clone(),
            },
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Column used to select rows.
    #[arg(long, value_name = "COLUMN")]
    pub filter_column: Option<String>,

    /// Inclusive lower bound for a numeric filter column.
    #[arg(long, requires = "filter_column", conflicts_with = "values", allow_hyphen_values = true)]
    pub min: Option<f64>,

    /// Inclusive upper bound for a numeric filter column.
    #[arg(long, requires = "filter_column", conflicts_with = "values", allow_hyphen_values = true)]
    pub max: Option<f64>,

    /// Accepted values for the filter column.
    #[arg(long, value_delimiter = ',', requires = "filter_column")]
    pub values: Vec<String>,

    /// Keep at most this many rows after filtering.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}

impl SelectArgs {
    /// A column with neither bounds nor values keeps every row that has a
    /// number in it.
    pub fn selection(&self) -> Selection {
        let filter = self.filter_column.as_ref().map(|column| {
            if self.values.is_empty() {
                RangeFilter::Numeric {
                    column: column.clone(),
                    min: self.min,
                    max: self.max,
                }
            } else {
                RangeFilter::Values {
                    column: column.clone(),
                    values: self.values.clone(),
                }
            }
        });
        Selection {
            filter,
            limit: self.limit,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FieldArgs {
    /// Fields printed on each label, in order.
    #[arg(long, value_delimiter = ',', required = true)]
    pub display: Vec<String>,

    /// Display fields printed in bold.
    #[arg(long, value_delimiter = ',')]
    pub emphasize: Vec<String>,

    /// Field encoded in the QR code.
    #[arg(long, value_name = "FIELD")]
    pub code_field: String,

    /// Label width in centimetres (default: LABEL_WIDTH_CM).
    #[arg(long, value_name = "CM")]
    pub width_cm: Option<f32>,

    /// Label height in centimetres (default: LABEL_HEIGHT_CM).
    #[arg(long, value_name = "CM")]
    pub height_cm: Option<f32>,

    /// Skip rows that cannot be labelled instead of stopping.
    #[arg(long)]
    pub skip_invalid: bool,

    /// Use a larger QR version when a payload does not fit version 2.
    #[arg(long)]
    pub grow_to_fit: bool,
}

impl FieldArgs {
    pub fn request(&self, selection: Selection) -> LabelRequest {
        LabelRequest {
            code_field: self.code_field.clone(),
            display_fields: self.display.clone(),
            emphasized_fields: self.emphasize.clone(),
            width_cm: self.width_cm,
            height_cm: self.height_cm,
            skip_invalid: self.skip_invalid,
            grow_to_fit: self.grow_to_fit,
            selection,
        }
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub select: SelectArgs,

    #[command(flatten)]
    pub fields: FieldArgs,

    /// Output PDF path.
    #[arg(short, long, value_name = "PDF", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub select: SelectArgs,

    #[command(flatten)]
    pub fields: FieldArgs,

    /// TrueType/OpenType font for label text (default: LABEL_FONT).
    #[arg(long, value_name = "PATH")]
    pub font: Option<PathBuf>,

    /// Font for emphasized lines (default: LABEL_BOLD_FONT).
    #[arg(long, value_name = "PATH")]
    pub bold_font: Option<PathBuf>,

    /// Preview resolution (default: LABEL_PREVIEW_DPI).
    #[arg(long)]
    pub dpi: Option<f32>,

    /// Directory for `label-<n>.png` files.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Also list the distinct values of this column.
    #[arg(long, value_name = "COLUMN")]
    pub column: Option<String>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on (default: SERVER_PORT).
    #[arg(long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("qr-labels").chain(args.iter().copied()))
    }

    #[test]
    fn generate_with_csv_and_fields() {
        let cli = parse(&[
            "generate",
            "--csv",
            "rows.csv",
            "--display",
            "id,qty",
            "--emphasize",
            "id",
            "--code-field",
            "id",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.fields.display, vec!["id", "qty"]);
        assert_eq!(args.fields.emphasize, vec!["id"]);
        assert_eq!(args.output, PathBuf::from("QR_Labels.pdf"));
        assert!(matches!(args.source.spec(), SourceSpec::CsvFile(p) if p == PathBuf::from("rows.csv")));
    }

    #[test]
    fn generate_requires_code_field() {
        assert!(parse(&["generate", "--csv", "rows.csv", "--display", "id"]).is_err());
    }

    #[test]
    fn csv_conflicts_with_table() {
        let result = parse(&[
            "generate", "--csv", "a.csv", "--table", "t", "--display", "id", "--code-field", "id",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn numeric_selection() {
        let cli = parse(&[
            "generate",
            "--sqlite",
            "labels.db",
            "--display",
            "id",
            "--code-field",
            "id",
            "--filter-column",
            "qty",
            "--min",
            "-1",
            "--max",
            "10",
            "--limit",
            "3",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let selection = args.select.selection();
        assert_eq!(selection.limit, Some(3));
        assert_eq!(
            selection.filter,
            Some(RangeFilter::Numeric {
                column: "qty".into(),
                min: Some(-1.0),
                max: Some(10.0),
            })
        );
    }

    #[test]
    fn values_selection() {
        let cli = parse(&["inspect", "--csv", "a.csv", "--column", "site"]).unwrap();
        assert!(matches!(cli.command, Command::Inspect(ref a) if a.column.as_deref() == Some("site")));

        let select = SelectArgs {
            filter_column: Some("site".into()),
            values: vec!["north".into(), "east".into()],
            ..SelectArgs::default()
        };
        assert_eq!(
            select.selection().filter,
            Some(RangeFilter::Values {
                column: "site".into(),
                values: vec!["north".into(), "east".into()],
            })
        );
    }

    #[test]
    fn min_requires_filter_column() {
        let result = parse(&[
            "generate", "--csv", "a.csv", "--display", "id", "--code-field", "id", "--min", "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn verbosity_is_global() {
        let cli = parse(&["serve", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(parse(&["-v", "-q", "serve"]).is_err());
    }

    #[test]
    fn field_args_become_request() {
        let fields = FieldArgs {
            display: vec!["id".into()],
            emphasize: vec![],
            code_field: "id".into(),
            width_cm: Some(5.0),
            height_cm: None,
            skip_invalid: true,
            grow_to_fit: false,
        };
        let req = fields.request(Selection::default());
        assert_eq!(req.code_field, "id");
        assert_eq!(req.width_cm, Some(5.0));
        assert!(req.skip_invalid);
    }
}
