//! Recalc command implementation.
//!
//! Streams stored deck records through the legality updater and writes the
//! updated records as JSON lines, one chunk at a time.

use anyhow::{bail, Context, Result};
use deck_legality_core::{BatchOptions, BatchReport, Config, DeckRecord, LegalityUpdater};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::load_catalog;

/// Command-line overrides of the `[batch]` section.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    /// `--only-illegal`
    pub only_illegal: bool,
    /// `--chunk-size`
    pub chunk_size: Option<usize>,
}

/// Runs the recalc command.
pub fn run(
    decks: &Path,
    catalog: &Path,
    overrides: Overrides,
    output: Option<&Path>,
    config: &Config,
) -> Result<()> {
    let options = batch_options(config, overrides)?;
    let catalog = load_catalog(catalog, config)?;

    let input = File::open(decks)
        .with_context(|| format!("Failed to read decks: {}", decks.display()))?;

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file: {}", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let updater = LegalityUpdater::new(&config.formats, &catalog);
    let report = process(&updater, BufReader::new(input), &options, &mut writer)
        .with_context(|| format!("Failed to recalculate decks: {}", decks.display()))?;

    eprintln!(
        "Processed {} deck(s): {} updated, {} skipped, {} failed",
        report.processed,
        report.updated,
        report.skipped,
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("  deck {}: {}", failure.deck_id, failure.error);
    }

    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

/// Feeds the records of `input` to the updater.
///
/// JSON lines are read one record at a time, so at most one chunk of
/// decks is held in memory. A JSON array is read whole. A record that
/// fails to parse stops the batch; the chunks before it are already
/// written.
fn process<R: BufRead>(
    updater: &LegalityUpdater<'_>,
    mut input: R,
    options: &BatchOptions,
    writer: &mut dyn Write,
) -> Result<BatchReport> {
    if starts_with_array(&mut input)? {
        let records: Vec<DeckRecord> = serde_json::from_reader(input)?;
        tracing::debug!("Read {} deck(s) from a JSON array", records.len());
        return updater.recalculate(records, options, |chunk| write_chunk(&mut *writer, &chunk));
    }

    let mut parse_error = None;
    let records = serde_json::Deserializer::from_reader(input)
        .into_iter::<DeckRecord>()
        .map_while(|record| match record {
            Ok(record) => Some(record),
            Err(e) => {
                parse_error = Some(e);
                None
            }
        });
    let report =
        updater.recalculate(records, options, |chunk| write_chunk(&mut *writer, &chunk))?;

    if let Some(e) = parse_error {
        return Err(anyhow::Error::new(e).context(format!(
            "Invalid deck record after {} deck(s)",
            report.processed + report.skipped
        )));
    }
    Ok(report)
}

/// Skips leading whitespace and reports whether the input is a JSON array.
fn starts_with_array(input: &mut impl BufRead) -> io::Result<bool> {
    loop {
        let buf = input.fill_buf()?;
        if buf.is_empty() {
            return Ok(false);
        }
        if let Some(start) = buf.iter().position(|b| !b.is_ascii_whitespace()) {
            let is_array = buf[start] == b'[';
            input.consume(start);
            return Ok(is_array);
        }
        let len = buf.len();
        input.consume(len);
    }
}

fn batch_options(config: &Config, overrides: Overrides) -> Result<BatchOptions> {
    let mut options = config.batch.options();
    if overrides.only_illegal {
        options.only_illegal_in = Some(config.batch.illegal_format.clone());
    }
    if let Some(size) = overrides.chunk_size {
        options.chunk_size = size;
    }
    if options.chunk_size == 0 {
        bail!("Chunk size must be at least 1");
    }
    if let Some(format) = &options.only_illegal_in {
        if config.formats.get(format).is_none() {
            bail!("--only-illegal refers to unknown format `{format}`");
        }
    }
    Ok(options)
}

fn write_chunk(writer: &mut dyn Write, chunk: &[DeckRecord]) -> Result<()> {
    for record in chunk {
        serde_json::to_writer(&mut *writer, record)?;
        writeln!(writer)?;
    }
    writer.flush()?;
    tracing::debug!("Wrote {} deck(s)", chunk.len());
    Ok(())
}
