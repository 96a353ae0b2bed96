//! ipexist: CLI tool for building and querying IPv4 set files.

use clap::{Parser, Subcommand};
use ipexist::{codec, parse_address, BuildOptions, InputSource, SetSummary, DEFAULT_OUTPUT};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ipexist")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Build and query compact IPv4 set files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a set file from a list of addresses, one per line
    Build {
        /// Input file, use "-" for stdin (repeat to merge several inputs)
        #[arg(short, long, required = true)]
        input: Vec<String>,

        /// Output file
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Enable debug output, printing any failed lines
        #[arg(short, long)]
        debug: bool,
    },

    /// Check addresses against a set file
    Query {
        /// Set file
        #[arg(short, long)]
        file: PathBuf,

        /// Addresses to look up
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Describe a set file
    Info {
        /// Set file
        #[arg(short, long)]
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = match &cli.command {
        Commands::Build { debug: true, .. } => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Commands::Build {
            input,
            output,
            debug,
        } => build_file(input, output, debug),
        Commands::Query { file, addresses } => query_file(&file, &addresses),
        Commands::Info { file, json } => info_file(&file, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_file(
    input: Vec<String>,
    output: PathBuf,
    debug: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = BuildOptions {
        inputs: input.iter().map(|i| InputSource::parse(i)).collect(),
        output,
        debug,
    };

    let report = ipexist::build(&options)?;

    println!(
        "Successfully built {:?}: {} addresses in {} pages ({} bytes)",
        options.output, report.cardinality, report.page_count, report.bytes_written
    );
    println!("sha256 {}", report.digest_hex());
    Ok(())
}

fn query_file(file: &PathBuf, addresses: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let set = codec::load(file)?;

    for address in addresses {
        match parse_address(address) {
            Some(addr) if set.contains(addr) => println!("{}\tpresent", address),
            Some(_) => println!("{}\tabsent", address),
            None => println!("{}\tinvalid", address),
        }
    }
    Ok(())
}

fn info_file(file: &PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let set = codec::load(file)?;
    let summary = SetSummary::of(&set);

    if json {
        println!("{}", summary.to_json()?);
    } else {
        println!("File:        {:?}", file);
        println!("Pages:       {}", summary.pages);
        println!("Addresses:   {}", summary.cardinality);
        println!("Size:        {} bytes", summary.encoded_bytes);
        println!("SHA-256:     {}", summary.sha256);
    }
    Ok(())
}
