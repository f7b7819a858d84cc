//! `mmdb-scan`: inspect every database file in a directory.
//!
//! Discovers `*.mmdb` files in the given directory (non-recursive) and
//! inspects each against the probe address, printing metadata and the raw
//! lookup result per file. A file that fails to open is reported and the
//! scan continues with the next one.

use clap::Parser;
use std::path::PathBuf;

use mmdbprobe::{discover_databases, inspect};

#[derive(Parser, Debug)]
#[command(name = "mmdb-scan", about = "Inspect every MaxMind DB file in a directory")]
struct Args {
    /// Directory to scan for .mmdb files
    #[arg(default_value = "data/db")]
    directory: PathBuf,

    /// IP address to look up in each database
    #[arg(default_value = "8.8.8.8")]
    address: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let databases = match discover_databases(&args.directory) {
        Ok(databases) => databases,
        Err(err) => {
            println!("error: {}", err);
            return;
        }
    };

    let mut count = 0usize;
    for path in databases {
        count += 1;
        println!();
        println!("=== reading {} ===", path.display());
        match inspect(&path, &args.address) {
            Ok(inspection) => {
                println!("{}", inspection.metadata);
                match inspection.lookup {
                    Some(record) => println!("lookup result for {}: {}", args.address, record),
                    None => println!("lookup result for {}: no entry", args.address),
                }
            }
            // report and move on; one bad file must not abort the scan
            Err(err) => println!("error: {}", err),
        }
    }

    if count == 0 {
        println!("no .{} files in {}", mmdbprobe::DB_EXTENSION, args.directory.display());
    }
}
