// src/cli.rs
//! Terminal frontend. Hand-parsed: `[--store DIR] <command> <source> [flags]`.

use std::{fs, path::PathBuf};

use chrono::Local;

use crate::capture::{self, CaptureOutcome};
use crate::config::consts::DEFAULT_SCOPE;
use crate::config::options::{AppOptions, Delim};
use crate::csv::{self, CsvOptions};
use crate::error::{LedgerError, Result};
use crate::export::{self, Exported, FileSink, StdoutFallback};
use crate::ledger::Ledger;
use crate::progress::StderrProgress;
use crate::sources::{self, CaptureContext, Source};
use crate::store::FileStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Sources,
    Status { source: String, scope: String },
    Capture { source: String, html: PathBuf, scope: String },
    Export { source: String, stdout: bool },
    Import { source: String, csv: PathBuf },
    Reset { source: String, confirmed: bool },
    Help,
}

/// Parsed command line. Export flags only override what was given; the
/// rest comes from the source's own export defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    pub command: Command,
    pub options: AppOptions,
    pub delim: Option<Delim>,
    pub bom: bool,
    pub out: Option<String>,
}

fn bad(msg: impl Into<String>) -> LedgerError {
    LedgerError::InvalidArgument(msg.into())
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Params> {
    let mut options = AppOptions::default();
    let mut delim = None;
    let mut bom = false;
    let mut out = None;
    let mut scope = None;
    let mut stdout = false;
    let mut confirmed = false;
    let mut positional: Vec<String> = Vec::new();

    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        match a.as_str() {
            "--store" => {
                let v = args.next().ok_or_else(|| bad("Missing value for --store"))?;
                options.capture.store_dir = PathBuf::from(v);
            }
            "--scope" => scope = Some(args.next().ok_or_else(|| bad("Missing value for --scope"))?),
            "--once-per-day" => options.capture.once_per_day = true,
            "--no-dedupe" => options.capture.dedupe = false,
            "-d" | "--delim" => {
                let v = args.next().ok_or_else(|| bad("Missing value for --delim"))?;
                delim = Some(Delim::parse(&v).ok_or_else(|| bad(format!("Unknown delimiter: {v}")))?);
            }
            "--bom" => bom = true,
            "-o" | "--out" => out = Some(args.next().ok_or_else(|| bad("Missing output dir"))?),
            "--stdout" => stdout = true,
            "--yes" | "-y" => confirmed = true,
            "-h" | "--help" => positional = vec![s!("help")],
            flag if flag.starts_with('-') => return Err(bad(format!("Unknown arg: {flag}"))),
            _ => positional.push(a),
        }
    }

    let mut pos = positional.into_iter();
    let name = pos.next().unwrap_or_else(|| s!("help"));
    let mut source = || pos.next().ok_or_else(|| bad(format!("'{name}' needs a source id")));

    let command = match name.as_str() {
        "help" => Command::Help,
        "sources" => Command::Sources,
        "status" => Command::Status {
            source: source()?,
            scope: scope.unwrap_or_else(|| s!(DEFAULT_SCOPE)),
        },
        "capture" => {
            let source_id = source()?;
            let html = PathBuf::from(source().map_err(|_| bad("capture needs an HTML file"))?);
            Command::Capture {
                source: source_id,
                html,
                scope: scope.unwrap_or_else(|| s!(DEFAULT_SCOPE)),
            }
        }
        "export" => Command::Export { source: source()?, stdout },
        "import" => {
            let source_id = source()?;
            let csv = PathBuf::from(source().map_err(|_| bad("import needs a CSV file"))?);
            Command::Import { source: source_id, csv }
        }
        "reset" => Command::Reset { source: source()?, confirmed },
        other => return Err(bad(format!("Unknown command: {other}"))),
    };

    Ok(Params { command, options, delim, bom, out })
}

fn find_source(id: &str) -> Result<&'static dyn Source> {
    sources::by_id(id).ok_or_else(|| LedgerError::UnknownSource(s!(id)))
}

pub fn run<I: IntoIterator<Item = String>>(args: I) -> Result<()> {
    let params = parse_args(args)?;
    let store_dir = params.options.capture.store_dir.clone();
    crate::log::init(&store_dir);
    logd!("CLI: {:?}", params.command);

    let store = FileStore::new(&store_dir);

    match &params.command {
        Command::Help => eprintln!("{}", include_str!("cli_help.txt")),

        Command::Sources => {
            for s in sources::all() {
                println!("{}\t{}\t{}", s.id(), s.namespace(), s.label());
            }
        }

        Command::Status { source, scope } => {
            let src = find_source(source)?;
            let ledger = Ledger::load(store, src.namespace());
            println!("{} ({}): {} record(s)", src.label(), ledger.namespace(), ledger.len());
            println!("store: {}", store_dir.display());
            if ledger.has_scope_run_today(scope) {
                println!("scope '{scope}' already captured today");
            } else {
                println!("scope '{scope}' not captured today");
            }
        }

        Command::Capture { source, html, scope } => {
            let src = find_source(source)?;
            let doc = fs::read_to_string(html)?;
            let mut ledger = Ledger::load(store, src.namespace());
            let ctx = CaptureContext::new(scope.as_str());
            let mut progress = StderrProgress;
            let outcome = capture::capture(src, &doc, &mut ledger, &ctx, &params.options.capture, Some(&mut progress));
            println!("{}", outcome.summary());
            if let CaptureOutcome::Captured { failures, .. } | CaptureOutcome::Empty { failures } = &outcome {
                for f in failures {
                    eprintln!("  row {}: {}", f.index, f.reason);
                }
            }
        }

        Command::Export { source, stdout } => {
            let src = find_source(source)?;
            let ledger = Ledger::load(store, src.namespace());

            let mut export_opts = params.options.export.clone();
            src.export_defaults(&mut export_opts);
            if let Some(d) = params.delim { export_opts.delimiter = d; }
            if params.bom { export_opts.bom = true; }
            if let Some(out) = &params.out { export_opts.set_out_dir(out); }

            if *stdout {
                if ledger.is_empty() {
                    return Err(LedgerError::NoDataToExport { namespace: s!(ledger.namespace()) });
                }
                println!("{}", csv::serialize_ledger(src.schema(), &ledger, &CsvOptions::from(&export_opts)));
                return Ok(());
            }

            let scope = src.scope_identity(ledger.records());
            let mut sink = FileSink::new(&export_opts.out_dir);
            let result = export::export_ledger(
                src.schema(),
                &ledger,
                &export_opts,
                Local::now().date_naive(),
                scope.as_deref(),
                &mut sink,
                &mut StdoutFallback,
            )?;
            match result {
                Exported::File(path) => println!("Exported {} record(s) to {}", ledger.len(), path.display()),
                Exported::Fallback { to, reason } => eprintln!("Could not save file ({reason}); wrote to {to}"),
            }
        }

        Command::Import { source, csv: path } => {
            let src = find_source(source)?;
            let mut export_opts = params.options.export.clone();
            src.export_defaults(&mut export_opts);
            let delim = params.delim.unwrap_or(export_opts.delimiter).as_char();

            let text = fs::read_to_string(path)?;
            let records = capture::import_csv(src.schema(), &text, delim);
            let read = records.len();

            let mut ledger = Ledger::load(store, src.namespace());
            let appended = if params.options.capture.dedupe
                && records.first().is_some_and(|r| src.dedup_key(r).is_some())
            {
                ledger.append_deduped(records, |r| src.dedup_key(r).unwrap_or_default())
            } else {
                ledger.append(records);
                read
            };
            ledger.try_save()?;
            logf!("CLI: imported {} of {} row(s) into '{}'", appended, read, ledger.namespace());
            println!("Imported {appended} of {read} row(s). Total history: {} record(s)", ledger.len());
        }

        Command::Reset { source, confirmed } => {
            let src = find_source(source)?;
            if !confirmed {
                return Err(bad(format!(
                    "reset deletes all '{}' history; re-run with --yes to confirm",
                    src.namespace()
                )));
            }
            let mut ledger = Ledger::load(store, src.namespace());
            let dropped = ledger.len();
            ledger.reset();
            println!("Cleared {dropped} record(s) from '{}'", ledger.namespace());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn capture_defaults_scope_and_keeps_flags() {
        let p = parse_args(args("--store /tmp/x capture wallapop-sales page.html --once-per-day")).unwrap();
        assert_eq!(p.options.capture.store_dir, PathBuf::from("/tmp/x"));
        assert!(p.options.capture.once_per_day);
        assert_eq!(
            p.command,
            Command::Capture {
                source: s!("wallapop-sales"),
                html: PathBuf::from("page.html"),
                scope: s!(DEFAULT_SCOPE),
            }
        );
    }

    #[test]
    fn status_reads_the_given_scope() {
        let p = parse_args(args("status cardmarket-products --scope /en/Magic/Products/Singles")).unwrap();
        assert_eq!(
            p.command,
            Command::Status { source: s!("cardmarket-products"), scope: s!("/en/Magic/Products/Singles") }
        );
        let p = parse_args(args("status cardmarket-products")).unwrap();
        assert_eq!(p.command, Command::Status { source: s!("cardmarket-products"), scope: s!(DEFAULT_SCOPE) });
    }

    #[test]
    fn export_overrides_are_optional() {
        let p = parse_args(args("export cardmarket-order --delim , -o exports")).unwrap();
        assert_eq!(p.delim, Some(Delim::Comma));
        assert_eq!(p.out.as_deref(), Some("exports"));
        assert!(!p.bom);
        assert_eq!(p.command, Command::Export { source: s!("cardmarket-order"), stdout: false });
    }

    #[test]
    fn reset_requires_source_and_reads_confirmation() {
        assert!(parse_args(args("reset")).is_err());
        let p = parse_args(args("reset wallapop-sales --yes")).unwrap();
        assert_eq!(p.command, Command::Reset { source: s!("wallapop-sales"), confirmed: true });
    }

    #[test]
    fn unknown_things_are_rejected() {
        assert!(parse_args(args("frobnicate")).is_err());
        assert!(parse_args(args("export x --zip")).is_err());
        assert!(parse_args(args("export x --delim tab")).is_err());
        assert_eq!(parse_args(Vec::new()).unwrap().command, Command::Help);
    }

    #[test]
    fn unknown_source_is_an_error() {
        assert!(matches!(find_source("nope"), Err(LedgerError::UnknownSource(_))));
        assert!(find_source("Cardmarket-Products").is_ok());
    }
}
