use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::Path;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::padron::config_reader::*;
use crate::padron::credentials::JsonCredentialStore;
use crate::padron::session::{Session, ThetaMode, View, ViewRequest};

pub mod config_reader;
pub mod credentials;
pub mod io_common;
pub mod io_excel;
pub mod io_theta;
pub mod io_tsv;
pub mod session;
pub mod views;

#[derive(Debug, Snafu)]
pub enum PadronError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile { source: std::io::Error, path: String },
    #[snafu(display("Error writing file {path}"))]
    WritingFile { source: std::io::Error, path: String },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error opening table {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Column {column} not found in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Line {lineno} of {path}: cannot read {column} from {content:?}"))]
    BadCell {
        path: String,
        lineno: usize,
        column: String,
        content: String,
    },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Workbook {path} has no worksheet {name}"))]
    MissingWorksheet { path: String, name: String },
    #[snafu(display("Workbook {path} is empty"))]
    EmptyExcel { path: String },
    #[snafu(display("Invalid probability table {path}"))]
    InvalidTable {
        source: voter_analytics::AnalyticsError,
        path: String,
    },
    #[snafu(display("{source}"))]
    Analytics {
        source: voter_analytics::AnalyticsError,
    },
    #[snafu(display("Missing parent directory of {path}"))]
    MissingParentDir { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PadronResult<T> = Result<T, PadronError>;

/// Reads a reference summary.
pub fn read_summary(path: &str) -> PadronResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

/// Compares a computed summary with the reference stored at `path`.
///
/// The comparison is done on the JSON values, the difference is printed on
/// the pretty forms.
pub fn check_summary(computed: &JSValue, path: &str) -> PadronResult<()> {
    let summary_ref = read_summary(path)?;
    debug!("check_summary: reference: {:?}", summary_ref);
    if summary_ref != *computed {
        let pretty_ref = serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
        let pretty_computed = serde_json::to_string_pretty(computed).context(SerializingJsonSnafu {})?;
        warn!("Found differences with the reference summary {}", path);
        print_diff(pretty_ref.as_str(), pretty_computed.as_str(), "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

fn write_output(js: &JSValue, out: &Option<String>) -> PadronResult<()> {
    let pretty = serde_json::to_string_pretty(js).context(SerializingJsonSnafu {})?;
    match out.as_deref() {
        None | Some("stdout") | Some("") => {
            println!("{}", pretty);
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, pretty).context(WritingFileSnafu { path })?;
        }
    }
    Ok(())
}

/// Builds the view request from the command line.
pub fn view_request(args: &Args) -> PadronResult<ViewRequest> {
    let view = match args.view.as_deref() {
        None => View::Introduction,
        Some(name) => match View::from_name(name) {
            Some(v) => v,
            None => whatever!("Unknown view {:?}", name),
        },
    };
    let theta_mode = match args.theta_mode.as_deref() {
        None => ThetaMode::Heatmap,
        Some(name) => match ThetaMode::from_name(name) {
            Some(m) => m,
            None => whatever!("Unknown theta mode {:?}", name),
        },
    };
    Ok(ViewRequest {
        view,
        period: args.period.clone(),
        theta_mode,
        selection: args.select.clone(),
    })
}

/// Computes the summary of one view for a configuration and a user.
pub fn run_view(
    config_path: &str,
    request: &ViewRequest,
    credentials: Option<(&str, &str)>,
) -> PadronResult<JSValue> {
    let config = read_config(config_path)?;
    info!("config: {:?}", config);
    let root = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu { path: config_path })?;

    let mut session = Session::new(&config, root);
    if let Some((user, password)) = credentials {
        let store = JsonCredentialStore::new(config.resolve(root, &config.credentials.file_path));
        // A failed login is not fatal: the view reports it.
        if let Err(e) = session.login(&store, user, password) {
            warn!("run_view: login failed for {:?}: {}", user, e);
        }
    }
    Ok(views::render(&mut session, request))
}

pub fn run(args: &Args) -> PadronResult<()> {
    let config_path = match args.config.as_deref() {
        Some(p) => p,
        None => whatever!("No configuration file provided (use --config)"),
    };
    let request = view_request(args)?;
    let credentials = match (args.user.as_deref(), args.password.as_deref()) {
        (Some(u), p) => Some((u, p.unwrap_or(""))),
        _ => None,
    };
    let js = run_view(config_path, &request, credentials)?;
    write_output(&js, &args.out)?;

    // The reference summary, if provided for comparison
    if let Some(reference) = args.reference.as_deref() {
        check_summary(&js, reference)?;
    }
    Ok(())
}
