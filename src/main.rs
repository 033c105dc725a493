//! Command-line interface for xsdecl

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "cli")]
use xsdecl::validators::{Particle, TypeDef, TypeRef};
#[cfg(feature = "cli")]
use xsdecl::{soap, validate};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsdecl")]
#[command(author, version, about = "SOAP envelope inspection and validation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the elements and types of the SOAP envelope schema
    Inspect {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Decode a SOAP document and check it against the envelope schema
    Validate {
        /// Path to the XML file to validate
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Decode a SOAP document and print it as JSON
    Decode {
        /// Path to the XML file to decode
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ElementSummary {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    occurs: String,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct SchemaSummary {
    namespace: xsdecl::Namespace,
    elements: Vec<ElementSummary>,
    types: Vec<String>,
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xsdecl=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect { json } => cmd_inspect(json),
        Commands::Validate { file } => cmd_validate(file),
        Commands::Decode { file, pretty } => cmd_decode(file, pretty),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn cmd_inspect(json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let schema = soap::schema();

    let summary = SchemaSummary {
        namespace: schema.namespace().clone(),
        elements: schema
            .elements()
            .map(|element| ElementSummary {
                name: element.name().to_string(),
                type_name: describe_type(element.decl().type_ref()),
                occurs: element.decl().occurs().to_string(),
            })
            .collect(),
        types: schema
            .types()
            .map(|(name, def)| match def {
                TypeDef::Complex(_) => format!("{} (complex)", name),
                TypeDef::Simple(_) => format!("{} (simple)", name),
            })
            .collect(),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Schema: {}", schema);
    println!("\n=== Global Elements ===");
    for element in &summary.elements {
        println!("  {} : {}", element.name, element.type_name);
    }
    if !summary.types.is_empty() {
        println!("\n=== Global Types ===");
        for name in &summary.types {
            println!("  {}", name);
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn describe_type(type_ref: &TypeRef) -> String {
    match type_ref {
        TypeRef::Complex(ct) if ct.name().is_none() => {
            let children: Vec<_> = ct
                .particles()
                .iter()
                .map(|p| format!("{}[{}]", p.key(), p.occurs()))
                .collect();
            format!("sequence({})", children.join(", "))
        }
        other => other.to_string(),
    }
}

#[cfg(feature = "cli")]
fn cmd_validate(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let xml_content = fs::read_to_string(&file)?;
    let instance = soap::parse(&xml_content)?;

    if validate(soap::schema(), &instance) {
        println!("✓ Document is valid");
        Ok(())
    } else {
        println!("✗ Document is invalid");
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn cmd_decode(file: PathBuf, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let xml_content = fs::read_to_string(&file)?;
    let instance = soap::parse(&xml_content)?;

    let json = instance.to_json();
    let output = if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    println!("{}", output);
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
