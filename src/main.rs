use env_logger::Env;
use jazelle_reader::{BankId, JazelleReader, ReaderOptions};
use std::env;

const DEFAULT_LOG_FILTER: &str = "warn,jazelle_reader=info";

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <path-to-jazelle-file> [--limit N] [--interval N] [--strict]", program);
    std::process::exit(1);
}

fn numeric_flag(args: &[String], flag: &str) -> Option<u64> {
    let idx = args.iter().position(|arg| arg == flag)?;
    match args.get(idx + 1).map(|value| value.parse::<u64>()) {
        Some(Ok(value)) => Some(value),
        _ => {
            eprintln!("ERROR: {} requires a non-negative integer argument.", flag);
            std::process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .format_timestamp_secs()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1].starts_with("--") {
        usage(&args[0]);
    }
    let path = &args[1];

    let mut options = if args.iter().any(|arg| arg == "--strict") {
        ReaderOptions::strict()
    } else {
        ReaderOptions::default()
    };
    if let Some(limit) = numeric_flag(&args, "--limit") {
        options = options.with_max_records(limit);
    }
    let interval = numeric_flag(&args, "--interval").unwrap_or(1000).max(1);
    // The summaries below replace the reader's own progress lines.
    options = options.with_progress_interval(None);

    println!("Reading Jazelle file: {}", path);
    println!("{}", "=".repeat(60));

    let mut reader = match JazelleReader::open(path, options) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("\nERROR: Failed to open Jazelle file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let metadata = reader.metadata();
    println!("\nFile Information:");
    println!("  Name: {}", metadata.name);
    println!("  Created: {}", metadata.created);
    println!("  Modified: {}", metadata.modified);
    println!("  Modifications: {}", metadata.modification_count);
    println!();

    let mut skipped_banks = 0usize;
    let mut failure = None;
    for result in reader.records() {
        match result {
            Ok(record) => {
                skipped_banks += record.skipped.len();
                if record.ordinal % interval == 0 {
                    let particles = record.bank(BankId::Phpsum).map_or(0, |bank| bank.len());
                    match &record.event {
                        Some(event) => println!(
                            "  Record {}: Run {}, Event {}, Time {}, PHPSUM {}",
                            record.ordinal, event.run, event.event, event.time, particles
                        ),
                        None => println!("  Record {}: no event header", record.ordinal),
                    }
                }
            }
            Err(e) => failure = Some(e),
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("Records read: {}", reader.records_read());
    println!("Records decoded: {}", reader.records_yielded());
    if skipped_banks > 0 {
        println!("Banks skipped: {}", skipped_banks);
    }

    if let Some(e) = failure {
        eprintln!("\nERROR: Decoding stopped");
        eprintln!("  {}", e);
        std::process::exit(1);
    }
}
