//! CWR CLI - read, validate and write CISAC CWR files
//!
//! # Main Commands
//!
//! ```bash
//! cwr read CW240001ABC_021.V21 -o catalog.json   # CWR to catalog JSON
//! cwr write catalog.json -c config.json          # Catalog JSON to CWR
//! cwr validate catalog.json                      # Validate every work
//! ```
//!
//! # Lookup Commands
//!
//! ```bash
//! cwr territory 2120          # Show a TIS territory and its countries
//! cwr check iswc T0345246801  # Check an identifier
//! cwr filename -c config.json # Output file name for today
//! ```
//!
//! Configuration comes from `-c config.json` or from `CWR_*` environment
//! variables (a `.env` file is read first).

use clap::{Parser, Subcommand, ValueEnum};
use cwr::identifiers::{is_valid_ean, is_valid_ipi_base, is_valid_ipi_name, is_valid_isrc, is_valid_iswc, parse_ipi_name};
use cwr::{
    assemble, read_cwr_file, validate_catalog_json, validate_registration, Catalog, CwrError, NoLookup,
    RegistrationConfig, TERRITORIES,
};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cwr")]
#[command(about = "Read and write CISAC Common Works Registration files", long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CWR file and output the catalog as JSON
    Read {
        /// Input CWR file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assemble a CWR file from a catalog JSON file
    Write {
        /// Input catalog JSON file
        input: PathBuf,

        /// Registration config JSON file (default: CWR_* environment)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (default: CWR naming convention in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate every work of a catalog JSON file
    Validate {
        /// Input catalog JSON file
        input: PathBuf,

        /// Registration config JSON file (default: CWR_* environment)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show a TIS territory and the countries it covers
    Territory {
        /// TIS numeric code (2136) or alpha code (FR, 2WL)
        code: String,
    },

    /// Check an identifier's format and check digits
    Check {
        kind: IdentifierKind,
        value: String,
    },

    /// Print the output file name for today
    Filename {
        /// Registration config JSON file (default: CWR_* environment)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum IdentifierKind {
    IpiName,
    IpiBase,
    Iswc,
    Isrc,
    Ean,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level)).init();

    let result = match cli.command {
        Commands::Read { input, output } => cmd_read(&input, output.as_deref()),
        Commands::Write { input, config, output } => cmd_write(&input, config.as_deref(), output.as_deref()),
        Commands::Validate { input, config } => cmd_validate(&input, config.as_deref()),
        Commands::Territory { code } => cmd_territory(&code),
        Commands::Check { kind, value } => cmd_check(kind, &value),
        Commands::Filename { config } => cmd_filename(config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_read(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Reading CWR: {}", input.display());

    let catalog = read_cwr_file(input, &NoLookup)?;
    if let Some(header) = &catalog.transmission.header {
        eprintln!("   Sender: {} ({})", header.sender_name, header.sender_id);
    }
    eprintln!("   Groups: {}", catalog.transmission.groups.len());
    eprintln!("   Diagnostics: {}", catalog.log().len());
    eprintln!("✅ Read {} works, {} parties", catalog.work_count(), catalog.shareholders().count());

    let json = serde_json::to_string_pretty(&catalog)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_write(input: &Path, config: Option<&Path>, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Assembling: {}", input.display());

    let catalog = load_catalog(input)?;
    let config = load_config(config)?;
    let assembly = assemble(&catalog, &config, &NoLookup)?;

    eprintln!("✅ Wrote {} of {} works", assembly.work_ids.len(), catalog.work_count());

    let default_name = PathBuf::from(config.filename(chrono::Local::now().date_naive()));
    let path = output.unwrap_or(&default_name);
    fs::write(path, &assembly.content)?;
    eprintln!("💾 Output written to: {}", path.display());

    Ok(())
}

fn cmd_validate(input: &Path, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let catalog = load_catalog(input)?;
    let config = load_config(config)?;

    let mut valid = 0;
    let mut invalid = 0;

    for (_, work) in catalog.works() {
        let (_, report) = validate_registration(work, &catalog, &config, &NoLookup);
        if report.passed {
            valid += 1;
        } else {
            invalid += 1;
            eprintln!("\n❌ Work {} '{}' invalid:", work.id(), work.title());
        }
        for entry in &report.diagnostics {
            eprintln!("{}", entry);
        }
    }

    eprintln!("\n📊 Results: {} valid, {} invalid", valid, invalid);

    if invalid > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_territory(code: &str) -> Result<(), Box<dyn std::error::Error>> {
    let node = match code.trim().parse::<u16>() {
        Ok(tis_n) => TERRITORIES.find(tis_n),
        Err(_) => TERRITORIES.find_alpha(code),
    }
    .ok_or_else(|| format!("Unknown TIS code '{}'", code))?;

    println!("{} {} {}", node.tis_n, node.tis_a, node.name);
    let countries = TERRITORIES.expand_codes(node.tis_n);
    println!("{} countries: {}", countries.len(), countries.join(" "));
    Ok(())
}

fn cmd_check(kind: IdentifierKind, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let valid = match kind {
        IdentifierKind::IpiName => parse_ipi_name(value).is_some_and(is_valid_ipi_name),
        IdentifierKind::IpiBase => is_valid_ipi_base(value),
        IdentifierKind::Iswc => is_valid_iswc(value),
        IdentifierKind::Isrc => is_valid_isrc(value),
        IdentifierKind::Ean => is_valid_ean(value),
    };

    if valid {
        println!("✅ {} is valid", value);
        Ok(())
    } else {
        Err(format!("{} is not valid", value).into())
    }
}

fn cmd_filename(config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    println!("{}", config.filename(chrono::Local::now().date_naive()));
    Ok(())
}

fn load_catalog(path: &Path) -> Result<Catalog, CwrError> {
    let content = fs::read_to_string(path).map_err(cwr::ReadError::from)?;
    let value: Value = serde_json::from_str(&content)?;
    validate_catalog_json(&value).map_err(|errors| CwrError::Schema { errors })?;
    Ok(serde_json::from_value(value)?)
}

fn load_config(path: Option<&Path>) -> Result<RegistrationConfig, CwrError> {
    let config = match path {
        Some(p) => RegistrationConfig::from_file(p)?,
        None => RegistrationConfig::from_env()?,
    };
    Ok(config)
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
