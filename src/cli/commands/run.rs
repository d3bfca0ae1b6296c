//! Run command - download and transcribe lectures from a catalog.

use super::{build_pipeline, existing_output_folder};
use crate::catalog::{normalize_all, select, CatalogLoader};
use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, RunArgs};
use crate::config::Settings;
use crate::pipeline::OutputLayout;
use anyhow::Result;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Run the catalog pipeline.
pub async fn run_lectures(args: &RunArgs, settings: Settings) -> Result<()> {
    let output_folder = existing_output_folder(args.output_folder.as_ref(), &settings)?;
    info!("Starting");

    let source = match args.catalog.source() {
        Ok(s) => s,
        Err(e) => {
            Output::error(&e.to_string());
            return Err(e.into());
        }
    };

    if args.vos.is_empty() {
        Output::error("No lectures to transcribe given. Name them with --vo \"<title>\".");
        anyhow::bail!("no lectures to transcribe given");
    }

    let options = args.formats.to_options();
    if let Err(e) = preflight::check(Operation::Run { pdf: options.pdf }, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'hoersaal doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let loader = CatalogLoader::new(Duration::from_secs(settings.catalog.timeout_secs))?;
    let spinner = Output::spinner(&format!("Loading catalog from {}...", source));
    let raw = loader.load(&source).await;
    spinner.finish_and_clear();
    let raw = match raw {
        Ok(raw) => raw,
        Err(e) => {
            Output::error(&format!("Could not load catalog: {}", e));
            return Err(e.into());
        }
    };

    let records = normalize_all(&raw, args.uni);
    let wanted: HashSet<String> = args.vos.iter().cloned().collect();
    let selected = select(&records, &wanted);

    for title in &args.vos {
        if !records.iter().any(|r| &r.title == title) {
            warn!("Lecture '{}' not found in catalog", title);
            Output::warning(&format!("Lecture '{}' not found in catalog", title));
        }
    }

    if selected.is_empty() {
        Output::warning("None of the requested lectures are in the catalog.");
        info!("Finished");
        return Ok(());
    }

    info!(
        "Selected lectures: {}",
        selected.iter().map(|r| r.title.as_str()).collect::<Vec<_>>().join(", ")
    );
    debug!("{} catalog records usable", records.len());

    let pipeline = build_pipeline(
        &settings,
        &args.model,
        &args.formats,
        OutputLayout::under(&output_folder),
    )?;

    Output::info(&format!("Processing {} lecture(s)", selected.len()));
    let summary = pipeline.run_batch(&selected).await?;

    Output::batch_summary(&summary);
    Output::info(&format!(
        "Output written to {}",
        pipeline.layout().transcription_dir.display()
    ));
    info!("Finished");

    Ok(())
}
