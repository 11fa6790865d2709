use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use deckbuilder::assets::ingest::{self, AssetError, BatchReport};
use deckbuilder::config::Config;
use deckbuilder::deck::{DeckStore, Mutation, Presentation};
use deckbuilder::render;

/// Ingest `files` into a fresh deck and report each one.
pub fn run(files: &[PathBuf], knowledge: bool, quiet: bool) -> Result<()> {
    let config = Config::load_or_default();
    let policy = config.upload_policy();
    let mut store = DeckStore::new(Presentation::with_initial_template(
        config.initial_template(),
    )?);

    let failures = if knowledge {
        let report = ingest::ingest_paths(files, |f| ingest::ingest_knowledge(f, &policy));
        register(&mut store, report, Mutation::AddKnowledgeAsset, |a| {
            format!("{} ({}, \"{}\")", a.original_filename, a.kind, a.title)
        })?
    } else {
        let report = ingest::ingest_paths(files, |f| ingest::ingest_image(f, &policy));
        register(&mut store, report, Mutation::AddImageAsset, |a| {
            format!("{} ({}, {} bytes)", a.name, a.mime, a.size)
        })?
    };

    if !quiet {
        println!("{}", render::library_summary(store.state()).dimmed());
    }
    if failures > 0 {
        anyhow::bail!("{failures} of {} file(s) rejected", files.len());
    }
    Ok(())
}

/// Dispatch every accepted asset and print one line per file, accepted
/// first. Returns the number of failures.
pub(crate) fn register<T>(
    store: &mut DeckStore,
    report: BatchReport<T>,
    to_mutation: impl Fn(T) -> Mutation,
    describe: impl Fn(&T) -> String,
) -> Result<usize> {
    for asset in report.accepted {
        println!("  {} {}", "ok".green(), describe(&asset));
        store.dispatch(to_mutation(asset))?;
    }
    for failure in &report.failures {
        print_failure(failure);
    }
    Ok(report.failures.len())
}

fn print_failure(failure: &AssetError) {
    println!("  {} {}", "rejected".red(), failure);
}
