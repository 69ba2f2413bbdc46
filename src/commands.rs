//! CLI commands for vaultbridge: scan, extract, import, export, info.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use vaultbridge::batch::Batch;
use vaultbridge::config::Config;
use vaultbridge::diagnostics;
use vaultbridge::error::Error;
use vaultbridge::pipeline::{self, Format, Passthrough};
use vaultbridge::report::ResolutionReport;
use vaultbridge::scanner;
use vaultbridge::types::{Document, Reference};

/// Exit code when a pass finished but left references unresolved.
const EXIT_WARNINGS: u8 = 1;

/// One note's references, as printed by `scan --json`.
#[derive(Serialize)]
struct NoteReferences<'a> {
    /// Asset references.
    assets: &'a [Reference],
    /// Document references.
    links: &'a [Reference],
    /// Vault path of the note.
    path: &'a str,
}

/// Write the resolved batch to `out`, or to stdout.
///
/// # Errors
///
/// Returns `Error::Json` or `Error::Io` from serialization or writing.
fn emit_batch(batch: &Batch, out: Option<&Path>) -> Result<(), Error> {
    match out {
        None => print!("{}", batch.serialize()?),
        Some(path) => {
            batch.write(path)?;
            eprintln!("Wrote {} documents to {}", batch.documents.len(), path.display());
        },
    }
    return Ok(());
}

/// Exit 0 when every reference resolved, 1 otherwise.
fn exit_code_for(report: &ResolutionReport) -> ExitCode {
    if report.is_clean() {
        return ExitCode::SUCCESS;
    }
    return ExitCode::from(EXIT_WARNINGS);
}

/// Run the store-to-vault pass over a batch file.
///
/// # Errors
///
/// Returns errors from config loading, batch reading, or output writing.
pub fn export(batch_path: &Path, out: Option<&Path>) -> Result<ExitCode, Error> {
    let config = Config::load(Path::new("."))?;
    let (mut documents, manifest) = Batch::read(batch_path)?.into_documents();

    let report = pipeline::run_export(&mut documents, &Passthrough, &config);

    emit_batch(&Batch::from_documents(&documents, manifest), out)?;
    diagnostics::print_report(&report);
    return Ok(exit_code_for(&report));
}

/// Extract and list the references in one file.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file cannot be read,
/// or errors from config loading.
pub fn extract(file: &str, format: Format, json: bool) -> Result<(), Error> {
    let file_path = PathBuf::from(file);
    let content = std::fs::read_to_string(&file_path)
        .map_err(|_err| return Error::FileNotFound { path: file_path.clone() })?;
    let config = Config::load(Path::new("."))?;

    let source_path = file.trim_start_matches("./").replace('\\', "/");
    let extracted = pipeline::extract_references(&content, format, &source_path, &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&extracted)?);
    } else {
        print_references(&extracted.links, &extracted.assets);
    }
    return Ok(());
}

/// Run the vault-to-store pass over a batch file.
///
/// # Errors
///
/// Returns errors from config loading, batch reading, or output writing.
pub fn import(batch_path: &Path, out: Option<&Path>) -> Result<ExitCode, Error> {
    let config = Config::load(Path::new("."))?;
    let (mut documents, manifest) = Batch::read(batch_path)?.into_documents();

    let report = pipeline::run_import(&mut documents, &manifest, &Passthrough, &config);

    emit_batch(&Batch::from_documents(&documents, manifest), out)?;
    diagnostics::print_report(&report);
    return Ok(exit_code_for(&report));
}

/// Output a comprehensive reference document for vaultbridge.
pub fn info(json: bool) {
    return crate::info::run(json);
}

/// Print one line per reference: kind, source text, and address.
fn print_references(links: &[Reference], assets: &[Reference]) {
    for link in links {
        println!("link   {}  -> {}", link.source_text, link.display_address());
    }
    for asset in assets {
        let embedded = if asset.is_embedded { " (embedded)" } else { "" };
        println!("asset  {}  -> {}{embedded}", asset.source_text, asset.display_address());
    }
    return;
}

/// Print the scan as markdown: one section per note that has references.
fn print_scan(documents: &[Document]) {
    let mut links = 0_usize;
    let mut assets = 0_usize;
    for document in documents {
        links = links.saturating_add(document.links.len());
        assets = assets.saturating_add(document.assets.len());
        if document.links.is_empty() && document.assets.is_empty() {
            continue;
        }
        println!("## {}\n", document.path);
        print_references(&document.links, &document.assets);
        println!();
    }
    eprintln!("{} notes, {links} links, {assets} assets", documents.len());
    return;
}

/// Walk the vault in the working directory and list every reference per note.
///
/// # Errors
///
/// Returns errors from config loading or scanning.
pub fn scan(json: bool) -> Result<(), Error> {
    let root = PathBuf::from(".");
    let config = Config::load(&root)?;
    let documents = scanner::scan(&root, &config)?;

    if json {
        let notes: Vec<NoteReferences<'_>> = documents
            .iter()
            .map(|d| return NoteReferences { assets: &d.assets, links: &d.links, path: &d.path })
            .collect();
        println!("{}", serde_json::to_string_pretty(&notes)?);
    } else {
        print_scan(&documents);
    }
    return Ok(());
}
