use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use smc_fuzz_gen::GenerateOptions;

#[derive(Parser)]
#[command(name = "smc-fuzz-gen")]
#[command(about = "Generates SMC fuzzer headers from an SMC call list")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write arg_struct_def.h and field_specification.h
    Generate {
        #[arg(short, long, help = "SMC list file")]
        smclist: PathBuf,

        #[arg(short, long, default_value = "include", help = "Directory for the headers")]
        out_dir: PathBuf,

        #[arg(long, default_value = "arg_struct_def.h", help = "Definition header name")]
        definitions: String,

        #[arg(long, default_value = "field_specification.h", help = "Field specification header name")]
        field_spec: String,
    },
    /// Print per-field value coverage from a fuzzer run log
    Coverage {
        #[arg(short = 's', long, help = "SMC definition file")]
        smcdefinition: PathBuf,

        #[arg(short, long, help = "Data from the UART output of the model")]
        datafile: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            smclist,
            out_dir,
            definitions,
            field_spec,
        } => {
            let options = GenerateOptions {
                out_dir,
                definitions_name: definitions,
                field_spec_name: field_spec,
            };
            let files = smc_fuzz_gen::generate(&smclist, &options)
                .with_context(|| format!("Failed to generate headers from {}", smclist.display()))?;
            println!(
                "Generated {} and {} from {}",
                files.definitions.display(),
                files.field_spec.display(),
                smclist.display()
            );
        }
        Commands::Coverage {
            smcdefinition,
            datafile,
        } => {
            let spec = smc_fuzz_gen::parse_file(&smcdefinition)
                .with_context(|| format!("Failed to read {}", smcdefinition.display()))?;
            let log = fs::read_to_string(&datafile)
                .with_context(|| format!("Failed to read {}", datafile.display()))?;

            let report = smc_fuzz_gen::coverage::collect(&spec, &log);
            tracing::info!(
                "{} fuzzer calls matched, {} unmatched",
                report.matched,
                report.unmatched
            );
            print!("{report}");
        }
    }

    Ok(())
}
