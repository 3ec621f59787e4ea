use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

mod core;
mod formatters;
mod graph;
mod parsers;

use crate::core::{Language, ProjectAnalyzer};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "stratum",
    version = "0.1.0",
    author = "stratum developers",
    about = "Multi-language dependency levelization for architecture analysis"
)]
struct Cli {
    /// Input directory to analyze
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Output file path
    #[arg(short, long, value_name = "FILE", default_value = "stratum-report.txt")]
    output: PathBuf,

    /// Comma-separated list of languages to analyze
    #[arg(
        short,
        long,
        value_name = "LANGS",
        value_delimiter = ',',
        default_value = "cpp,csharp,java,go"
    )]
    languages: Vec<String>,

    /// Output format: text, json
    #[arg(short, long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        input,
        output,
        languages,
        format,
    } = cli;

    let start_time = Instant::now();

    let mut selected = Vec::new();
    for name in &languages {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        match Language::from_name(name) {
            Some(language) => {
                if !selected.contains(&language) {
                    selected.push(language);
                }
            }
            None => bail!("unsupported language `{name}`"),
        }
    }
    if selected.is_empty() {
        bail!("no languages selected");
    }

    println!("stratum - Dependency Levelization");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());
    println!("Format: {}", format.as_str());
    println!(
        "Languages: {:?}",
        selected.iter().map(|l| l.as_str()).collect::<Vec<_>>()
    );

    let analysis_start = Instant::now();

    let analyzer = ProjectAnalyzer::new();
    let result = analyzer.analyze(&input, &selected)?;

    let analysis_time = analysis_start.elapsed();
    println!("Analysis completed in {:.2}s", analysis_time.as_secs_f64());

    let mut generated_output = output.clone();

    match format {
        OutputFormat::Text => {
            use crate::formatters::TextFormatter;
            TextFormatter::new().format_to_file(&result, &output)?;
        }
        OutputFormat::Json => {
            use crate::formatters::JsonFormatter;
            generated_output = output.with_extension("json");
            JsonFormatter::new().format_to_file(&result, &generated_output)?;
        }
    }

    let total_time = start_time.elapsed();
    println!(
        "Analysis complete. Generated {}",
        generated_output.display()
    );
    println!("Total execution time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}
