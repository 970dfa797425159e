//! DBC Code Generator CLI Application
//!
//! This is the command-line interface for the DBC to C code generator.
//! It uses the dbc-codegen library and adds:
//! - Command line and TOML project configuration
//! - Output routing (stdout or a header file)
//! - JSON dumps of the parsed network model for tooling

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use dbc_codegen::{CodegenOptions, Endianness, Generator};

mod config;

/// DBC Code Generator - Generate C message handling code from a DBC file
#[derive(Parser, Debug)]
#[command(name = "dbc-codegen-cli")]
#[command(about = "Generate C encode/decode/MIA code from a Vector DBC file", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the DBC file to generate code from
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Node whose view of the network is generated
    #[arg(short, long, value_name = "NODE")]
    self_node: Option<String>,

    /// Generate code for every message regardless of the self node's role
    #[arg(short = 'a', long)]
    all: bool,

    /// Emit byte-relative bit packing for big-endian targets
    #[arg(short, long)]
    big_endian: bool,

    /// Output file for the generated code (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Dump the parsed network model as JSON instead of generating C code
    #[arg(long)]
    dump_model: bool,

    /// Path to a project configuration file (codegen.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("DBC Code Generator CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using codegen library v{}", dbc_codegen::VERSION);

    // Check if flag mode or config file mode
    if let Some(input) = &args.input {
        // Flag mode - everything comes from the command line
        generate_from_flags(input, &args)?;
    } else if let Some(config_path) = &args.config {
        // Config file mode - a codegen.toml describes the project
        generate_from_config(config_path, &args)?;
    } else {
        // No arguments - show help
        println!("DBC Code Generator - No input specified");
        println!("\nQuick Start:");
        println!("  dbc-codegen-cli --input network.dbc --self-node MOTOR");
        println!("  dbc-codegen-cli --input network.dbc --self-node MOTOR --output generated_can.h");
        println!("\nFor project configuration files:");
        println!("  dbc-codegen-cli --config codegen.toml");
        println!("\nUse --help for more options");
    }

    Ok(())
}

/// Flag mode - build the generator options from command line arguments
fn generate_from_flags(input: &Path, args: &Args) -> Result<()> {
    let self_node = args
        .self_node
        .as_deref()
        .context("--self-node is required when generating from a DBC file")?;

    let endianness = if args.big_endian {
        Endianness::Big
    } else {
        Endianness::Little
    };
    let options = CodegenOptions::new(self_node)
        .with_generate_all(args.all)
        .with_endianness(endianness);

    run_generation(input, options, args.dump_model, args.output.as_deref())
}

/// Config file mode - the TOML file supplies the input, node and output
fn generate_from_config(config_path: &Path, args: &Args) -> Result<()> {
    log::info!("Loading configuration from: {:?}", config_path);
    let config = config::load_config(config_path)?;
    log::debug!("Configuration loaded successfully");

    let options = CodegenOptions::new(&config.self_node)
        .with_generate_all(config.generate_all)
        .with_endianness(config.endianness);

    run_generation(
        &config.input,
        options,
        args.dump_model,
        config.output.as_deref(),
    )
}

/// Parse the DBC file and write the requested output
fn run_generation(
    input: &Path,
    options: CodegenOptions,
    dump_model: bool,
    output: Option<&Path>,
) -> Result<()> {
    let dbc = dbc_codegen::parse_dbc_file(input)
        .with_context(|| format!("Failed to parse DBC file: {:?}", input))?;

    let stats = dbc.stats();
    log::info!(
        "Parsed {:?}: {} nodes, {} messages, {} signals",
        input,
        stats.num_nodes,
        stats.num_messages,
        stats.num_signals
    );

    let text = if dump_model {
        let mut json = serde_json::to_string_pretty(&dbc)
            .context("Failed to serialize the network model")?;
        json.push('\n');
        json
    } else {
        Generator::new(dbc, options).generate()
    };

    match output {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("Failed to write output file: {:?}", path))?;
            log::info!("Wrote {} bytes to {:?}", text.len(), path);
        }
        None => {
            // Generated code goes to stdout; diagnostics stay on stderr
            print!("{}", text);
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
