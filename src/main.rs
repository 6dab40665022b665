use clap::{Parser, ValueEnum};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use dewiktionary_nouns::{Extraction, Loader, NounIndex, Strategy, Vocabulary};

/// Output format for the extracted forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One form per line
    Text,
    /// One {"form": ...} object per line
    Jsonl,
}

#[derive(Parser)]
#[command(name = "dewiktionary-nouns")]
#[command(about = "Extracts German nouns and their declension forms from a Wiktionary XML dump")]
struct Args {
    /// Input XML file (.xml or .xml.bz2)
    input: PathBuf,

    /// Write all noun forms, sorted, to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Where to look for the part-of-speech template
    #[arg(short, long, value_enum, default_value_t = Strategy::Sectioned)]
    strategy: Strategy,

    /// What a noun page contributes
    #[arg(short, long, value_enum, default_value_t = Extraction::Forms)]
    extraction: Extraction,

    /// Path to a vocabulary YAML file (default: the German Wiktionary vocabulary)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Check whether a word is a known noun form (repeatable)
    #[arg(long = "query", value_name = "WORD")]
    queries: Vec<String>,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Serialize)]
struct FormRecord<'a> {
    form: &'a str,
}

struct Stats {
    pages: usize,
    forms: usize,
    elapsed: Duration,
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap(),
    );
    pb
}

fn write_forms(index: &NounIndex, path: &Path, format: Format) -> io::Result<()> {
    let mut writer = BufWriter::with_capacity(256 * 1024, File::create(path)?);
    for form in index.sorted() {
        match format {
            Format::Text => writeln!(writer, "{}", form)?,
            Format::Jsonl => {
                serde_json::to_writer(&mut writer, &FormRecord { form: &form })?;
                writeln!(writer)?;
            }
        }
    }
    writer.flush()
}

fn print_stats(stats: &Stats, args: &Args) {
    println!();
    println!("============================================================");
    println!("Strategy: {:?}", args.strategy);
    println!("Extraction: {:?}", args.extraction);
    println!("Pages scanned: {}", stats.pages);
    println!("Noun forms: {}", stats.forms);
    println!("Time: {}m {}s", stats.elapsed.as_secs() / 60, stats.elapsed.as_secs() % 60);
    println!(
        "Rate: {:.0} pages/sec",
        stats.pages as f64 / stats.elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("============================================================");
}

fn run(args: &Args) -> dewiktionary_nouns::Result<()> {
    let vocabulary = match &args.schema {
        Some(path) => Vocabulary::from_yaml_file(path)?,
        None => Vocabulary::default(),
    };

    if !args.quiet {
        println!("Parsing: {}", args.input.display());
        if let Some(output) = &args.output {
            println!("Output: {}", output.display());
        }
        println!("Strategy: {:?}", args.strategy);
        println!();
    }

    let start_time = Instant::now();
    let pb = spinner(args.quiet);
    let mut pages = 0usize;

    let index = Loader::new()
        .vocabulary(vocabulary)
        .strategy(args.strategy)
        .extraction(args.extraction)
        .load_with_progress(&args.input, |_| {
            pages += 1;
            if pages % 1000 == 0 {
                let rate = pages as f64 / start_time.elapsed().as_secs_f64();
                pb.set_message(format!("Pages: {} | Rate: {:.0} pg/s", pages, rate));
                pb.tick();
            }
        })?;
    pb.finish_and_clear();

    if let Some(output) = &args.output {
        write_forms(&index, output, args.format)?;
    }

    for word in &args.queries {
        let verdict = if index.is_noun(word) { "noun" } else { "not a noun" };
        println!("{}: {}", word, verdict);
    }

    if !args.quiet {
        let stats = Stats {
            pages,
            forms: index.len(),
            elapsed: start_time.elapsed(),
        };
        print_stats(&stats, args);
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
