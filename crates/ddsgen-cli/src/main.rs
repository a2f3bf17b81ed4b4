//! ddsgen - IDL to publish/subscribe code generator
//!
//! Commands:
//! - `ddsgen generate` - Generate type, topic and example sources from IDL files
//! - `ddsgen platforms` - List the platforms accepted by `--example`

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use ddsgen_cli::{ConfigFile, Generator, GeneratorConfig, GeneratorSection, logging};
use ddsgen_core::Language;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "ddsgen")]
#[command(author, version, about = "IDL to publish/subscribe code generator", long_about = None)]
struct Cli {
    /// More log output (repeat for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate sources and build files from IDL files
    Generate {
        /// IDL files, processed in the given order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (must exist)
        #[arg(short = 'd', long = "output")]
        output_dir: Option<PathBuf>,

        /// Directory for preprocessor output and compiled classes
        #[arg(short = 't', long = "temp")]
        temp_dir: Option<PathBuf>,

        /// Overwrite existing files
        #[arg(long)]
        replace: bool,

        /// Preprocessor program
        #[arg(long = "ppPath")]
        preprocessor: Option<PathBuf>,

        /// Parse the IDL files without running the preprocessor
        #[arg(long = "ppDisable")]
        disable_preprocessor: bool,

        /// Include search path (repeatable)
        #[arg(short = 'I', long = "include")]
        include_paths: Vec<PathBuf>,

        /// Target language (c++, java)
        #[arg(short, long, value_parser = parse_language)]
        language: Option<Language>,

        /// Java package for the managed binding (e.g., com.acme.types)
        #[arg(long)]
        package: Option<String>,

        /// Platform for example files and build files (see `ddsgen platforms`)
        #[arg(long)]
        example: Option<String>,

        /// Also generate TypeObject files
        #[arg(long)]
        typeobject: bool,

        /// Mark generated topic types for symbol export
        #[arg(long)]
        export_symbols: bool,

        /// Alternate serialization mode (CORBA CDR, no encapsulation)
        #[arg(long)]
        fusion: bool,

        /// Java compiler
        #[arg(long)]
        javac: Option<PathBuf>,

        /// Java native header generator
        #[arg(long)]
        javah: Option<PathBuf>,

        /// Path to ddsgen.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write a JSON description of the generated solution
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List the platforms accepted by `--example`
    Platforms {
        /// Path to ddsgen.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn parse_language(s: &str) -> Result<Language, String> {
    Language::parse(s).ok_or_else(|| format!("unknown language '{s}' (expected c++ or java)"))
}

/// Flags left unset on the command line fall through to the file
fn flag(set: bool) -> Option<bool> {
    set.then_some(true)
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ConfigFile> {
    match path {
        Some(path) => ConfigFile::from_file(path),
        None => Ok(ConfigFile::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Generate {
            inputs,
            output_dir,
            temp_dir,
            replace,
            preprocessor,
            disable_preprocessor,
            include_paths,
            language,
            package,
            example,
            typeobject,
            export_symbols,
            fusion,
            javac,
            javah,
            config,
            report,
        } => {
            let file = load_config(config.as_ref())?;
            let overrides = GeneratorSection {
                output_dir,
                temp_dir,
                replace: flag(replace),
                preprocessor,
                disable_preprocessor: flag(disable_preprocessor),
                include_paths,
                language,
                package,
                example,
                typeobject: flag(typeobject),
                export_symbols: flag(export_symbols),
                fusion: flag(fusion),
                javac,
                javah,
            };

            let config =
                GeneratorConfig::resolve(inputs, overrides, file, |k| std::env::var(k).ok())?
                    .with_report(report);
            config.validate()?;

            let summary = Generator::new(&config)
                .context("Failed to set up the generator")?
                .run()
                .context("Generation aborted")?;

            if !summary.is_success() {
                bail!(
                    "{} of {} input file(s) failed",
                    summary.failures.len(),
                    summary.units.len()
                );
            }

            info!(units = summary.units.len(), "Generation finished");
        }
        Commands::Platforms { config } => {
            let file = load_config(config.as_ref())?;
            let config = GeneratorConfig::resolve(
                Vec::new(),
                GeneratorSection::default(),
                file,
                |k| std::env::var(k).ok(),
            )?;
            for id in config.platforms.ids() {
                println!("{id}");
            }
        }
    }

    Ok(())
}
