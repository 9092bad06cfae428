//! Avro Converter CLI
//!
//! Encodes JSON records into Avro Object Container documents and decodes them
//! back, using the same converter a host pipeline would load.

use clap::{Parser, Subcommand};
use log::{error, info};
use registryless_avro::registryless::config::SCHEMA_PATH_CONFIG;
use registryless_avro::registryless::serialization::json;
use registryless_avro::{AvroConverter, Converter, ConverterError, ConverterSettings};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "avro-converter")]
#[command(about = "Registryless Avro converter - encode and decode single-record Avro containers")]
#[command(version = "0.1.0")]
struct Cli {
    /// Converter settings file (key=value properties)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an Avro container and print the record as JSON
    Decode {
        /// Avro container file
        file: PathBuf,

        /// Reader schema (.avsc); overrides schema.path from --config
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Topic name used in diagnostics
        #[arg(long, default_value = "cli")]
        topic: String,

        /// Use the schema embedded in the container when no reader schema is given
        #[arg(long)]
        permissive: bool,
    },
    /// Encode a JSON record into an Avro container
    Encode {
        /// JSON file holding one record
        input: PathBuf,

        /// Writer schema (.avsc); overrides schema.path from --config
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Output container file
        #[arg(long)]
        out: PathBuf,

        /// Topic name used in diagnostics
        #[arg(long, default_value = "cli")]
        topic: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Decode {
            file,
            schema,
            topic,
            permissive,
        } => decode(cli.config.as_ref(), file, schema.as_ref(), topic, *permissive),
        Commands::Encode {
            input,
            schema,
            out,
            topic,
        } => encode(cli.config.as_ref(), input, schema.as_ref(), out, topic),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}

fn load_settings(
    config: Option<&PathBuf>,
    schema: Option<&PathBuf>,
) -> Result<ConverterSettings, Box<dyn std::error::Error>> {
    let mut settings = match config {
        Some(path) => ConverterSettings::from_properties(&fs::read_to_string(path)?),
        None => ConverterSettings::new(),
    };
    if let Some(schema) = schema {
        settings.insert(SCHEMA_PATH_CONFIG, schema.display().to_string());
    }
    Ok(settings)
}

fn decode(
    config: Option<&PathBuf>,
    file: &PathBuf,
    schema: Option<&PathBuf>,
    topic: &str,
    permissive: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(config, schema)?;
    let converter = if permissive {
        AvroConverter::permissive()
    } else {
        AvroConverter::new()
    };
    converter.configure(&settings, false)?;

    let bytes = fs::read(file)?;
    let decoded = converter.to_connect_data(topic, &bytes)?;
    info!("Decoded {} record from {}", decoded.schema, file.display());

    println!("{}", serde_json::to_string_pretty(&json::to_json(&decoded.value))?);
    Ok(())
}

fn encode(
    config: Option<&PathBuf>,
    input: &PathBuf,
    schema: Option<&PathBuf>,
    out: &PathBuf,
    topic: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(config, schema)?;
    let converter = AvroConverter::new();
    converter.configure(&settings, false)?;

    let structured = converter
        .config()
        .and_then(|config| config.structured_schema.as_ref())
        .ok_or(ConverterError::NotConfigured)?;
    let record: serde_json::Value = serde_json::from_str(&fs::read_to_string(input)?)?;
    let value = json::from_json(structured, &record)?;

    let bytes = converter.from_connect_data(topic, Some(structured), &value)?;
    fs::write(out, &bytes)?;
    println!("✅ Wrote {} bytes to {}", bytes.len(), out.display());
    Ok(())
}
