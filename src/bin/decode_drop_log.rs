/// Decoder for compact binary drop logs
///
/// Reads .bin files produced by CompactLogWriter and prints one line per event

use sandfall::compact_log::{describe, CompactLogReader};
use std::env;
use std::fs;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <drop_log.bin>", args[0]);
        eprintln!("Decodes a compact binary drop log to human-readable format");
        std::process::exit(1);
    }

    let filename = &args[1];
    let data = match fs::read(filename) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", filename, e);
            std::process::exit(1);
        }
    };

    println!("=== Compact Drop Log: {} ===", filename);
    println!("File size: {} bytes\n", data.len());

    let mut reader = CompactLogReader::new(&data);
    let mut event_count = 0;
    let mut failed = false;

    loop {
        match reader.read_event() {
            Ok(Some(event)) => {
                event_count += 1;
                println!("{}", describe(&event));
            }
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: stopped after {} events: {}", event_count, e);
                failed = true;
                break;
            }
        }
    }

    println!("\n=== Summary ===");
    println!("Total events: {}", event_count);
    if event_count > 0 {
        println!("Average bytes per event: {:.2}", data.len() as f64 / event_count as f64);
    }

    if failed {
        std::process::exit(1);
    }
}
