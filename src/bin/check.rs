//! `mmdb-check`: inspect one database file against one IP address.
//!
//! Prints the metadata snapshot as text and the lookup result as pretty
//! JSON. `null` means the address is not covered by any entry. Errors are
//! printed and end the run; the exit code stays 0 either way.

use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;

use mmdbprobe::inspect;

#[derive(Parser, Debug)]
#[command(name = "mmdb-check", about = "Inspect a MaxMind DB file and look up one IP address")]
struct Args {
    /// Database file to inspect
    #[arg(default_value = "data/db/dbip-asn-lite.mmdb")]
    path: PathBuf,

    /// IP address to look up
    #[arg(default_value = "209.209.56.165")]
    address: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    println!("=== checking {} ===", args.path.display());
    match inspect(&args.path, &args.address) {
        Ok(inspection) => {
            println!("{}", inspection.metadata);
            println!();
            println!("lookup result for {}:", args.address);
            let record = inspection.lookup.unwrap_or(Value::Null);
            let rendered = serde_json::to_string_pretty(&record)
                .unwrap_or_else(|err| format!("<unprintable record: {}>", err));
            println!("{}", rendered);
        }
        Err(err) => println!("error: {}", err),
    }
}
