// Licensed under the Apache-2.0 license

mod writer;

use clap::Parser;
use log::{error, info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use svd2cpp_generator::{
    generate_cpp_headers_from_file, FilterConfig, GeneratorConfig, Generation, ReservedWords,
};

#[derive(Parser, Debug)]
#[command(
    name = "svd2cpp",
    author,
    version,
    about = "Generate C++ register headers from a CMSIS-SVD file",
    after_help = "Example:\n  svd2cpp stm32f4.svd -o include/regs -x DBGMCU"
)]
struct Cli {
    /// Path to the SVD file
    #[arg(value_name = "SVD_FILE")]
    svd_file: PathBuf,

    /// Directory the headers are written to
    #[arg(
        short,
        long,
        value_name = "DIR",
        default_value = "generated",
        env = "SVD2CPP_OUTPUT"
    )]
    output: PathBuf,

    /// Print every peripheral and register, and debug progress
    #[arg(short, long)]
    verbose: bool,

    /// Skip a peripheral by name (case-insensitive, repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "NAME")]
    exclude: Vec<String>,

    /// Treat an extra identifier as reserved (repeatable)
    #[arg(long = "reserved", value_name = "WORD")]
    reserved: Vec<String>,
}

impl Cli {
    fn config(&self) -> GeneratorConfig {
        let filter = self
            .exclude
            .iter()
            .fold(FilterConfig::new(), |filter, name| filter.exclude_name(name));
        let reserved = self
            .reserved
            .iter()
            .fold(ReservedWords::cpp(), |words, word| words.with_word(word));
        GeneratorConfig::default()
            .with_filter(filter)
            .with_reserved_words(reserved)
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(err) = SimpleLogger::new()
        .without_timestamps()
        .with_level(level)
        .init()
    {
        eprintln!("Failed to initialize logging: {err}");
    }

    if let Err(err) = run(&cli) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    info!("Parsing SVD file: {}", cli.svd_file.display());
    let generation = generate_cpp_headers_from_file(&cli.svd_file, &cli.config())?;

    for diagnostic in &generation.diagnostics {
        warn!("{diagnostic}");
    }
    print_summary(&generation, cli.verbose);
    if generation.headers.is_empty() {
        return Ok(());
    }

    let output = std::path::absolute(&cli.output).unwrap_or_else(|_| cli.output.clone());
    info!("Generating C++ files in: {}", output.display());
    let report = writer::write_headers(&output, &generation.headers)?;
    for path in &report.written {
        println!("Generated: {}", path.display());
    }
    if report.failed.is_empty() {
        info!("Generation complete!");
    } else {
        warn!(
            "Generation finished, {} header(s) could not be written",
            report.failed.len()
        );
    }
    Ok(())
}

fn print_summary(generation: &Generation, verbose: bool) {
    println!("Found {} peripheral(s)", generation.peripherals.len());
    if !verbose {
        return;
    }
    for peripheral in &generation.peripherals {
        println!(
            "  - {}: {} register(s) at 0x{:08X}",
            peripheral.name,
            peripheral.registers.len(),
            peripheral.base_address
        );
        for register in &peripheral.registers {
            println!(
                "    - {}: {} bit field(s)",
                register.name,
                register.bit_fields.len()
            );
        }
    }
}
