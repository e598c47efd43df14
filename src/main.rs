use clap::{Parser, Subcommand};
use polygenic::bed::tsv_to_bed;
use polygenic::config::DEFAULT_P_THRESHOLD;
use polygenic::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "polygenic", version, about = "Polygenic risk score for a single genome")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a genome BED file against GWAS summary statistics
    Score {
        #[arg(long, default_value = "data/data.tsv", help = "Tab delimited GWAS summary statistics")]
        gwas: PathBuf,

        #[arg(long, default_value = "data/human1_hg38.bed", help = "Genome BED file in the GWAS assembly")]
        genome: PathBuf,

        #[arg(long, default_value_t = DEFAULT_P_THRESHOLD)]
        p_threshold: f64,

        #[arg(long, default_value_t = false, help = "Accept any single character effect allele")]
        any_allele: bool,
    },
    /// Convert a 23andMe export into BED rows for one chromosome
    ToBed {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,

        #[arg(long, default_value = "10")]
        chromosome: String,
    },
}

fn run(cli: Cli) -> PrsResult<()> {
    match cli.command {
        Command::Score {
            gwas,
            genome,
            p_threshold,
            any_allele,
        } => {
            let policy = if any_allele {
                AllelePolicy::AnyChar
            } else {
                AllelePolicy::Nucleotide
            };
            let config = ScoreConfigBuilder::new()
                .p_threshold(p_threshold)
                .allele_policy(policy)
                .build()?;

            let genome = LazyTable::genome(genome);
            let gwas = LazyTable::gwas(gwas);
            let report = calculate_prs(genome.get()?, gwas.get()?, &config)?;
            info!(
                matched = report.matched,
                excluded = report.excluded,
                "scoring finished"
            );
            println!("{}", report);
        }
        Command::ToBed {
            input,
            output,
            chromosome,
        } => {
            let writer = BufWriter::new(File::create(&output)?);
            let written = tsv_to_bed(Box::new(File::open(&input)?), writer, &chromosome)?;
            println!("Wrote {} rows to {}", written, output.display());
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("polygenic=info")),
        )
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
