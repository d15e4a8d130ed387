use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use tensorgrid::grid::{self, GridConfig, DEFAULT_CONFIG_FILE};
use tensorgrid::utils::parsing::parse_usize_list;
use tensorgrid::AnyTensor;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tgrid")]
#[command(version = "0.1")]
#[command(about = "tgrid: inspect n-dimensional tensors as 2D grids", long_about = None)]
struct Cli {
    /// Display config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a tensor (JSON file) as a 2D grid
    Show {
        /// Path to the tensor file (.json)
        file: PathBuf,
        /// Fold an odd outer dimension into columns instead of rows
        #[arg(long)]
        fold_cols: bool,
    },
    /// Print kind, shape, layout, range and metadata
    Info {
        /// Path to the tensor file (.json)
        file: PathBuf,
    },
    /// Print the sub-tensor at the given outer indexes, e.g. --at "[1, 0]"
    View {
        file: PathBuf,
        #[arg(long)]
        at: String,
    },
    /// Set the value at a 2D grid cell and write the file back
    Set {
        file: PathBuf,
        row: usize,
        col: usize,
        value: f64,
        /// Fold an odd outer dimension into columns instead of rows
        #[arg(long)]
        fold_cols: bool,
    },
    /// Write a default configuration file
    Init,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Init => handle_init(&cli.config),
        Commands::Show { file, fold_cols } => {
            let mut cfg = load_config(&cli.config, cli.no_color)?;
            if fold_cols {
                cfg.fold_into_rows = false;
            }
            let tsr = read_tensor(&file)?;
            println!("{}", grid::render(&tsr, &cfg));
            Ok(())
        }
        Commands::Info { file } => {
            let cfg = load_config(&cli.config, cli.no_color)?;
            let tsr = read_tensor(&file)?;
            print_info(&tsr, &cfg);
            Ok(())
        }
        Commands::View { file, at } => {
            let cfg = load_config(&cli.config, cli.no_color)?;
            let outer = parse_usize_list(&at)?;
            let tsr = read_tensor(&file)?;
            let sub = tsr.sub_tensor(&outer)?;
            println!("{}", grid::render(&sub, &cfg));
            Ok(())
        }
        Commands::Set {
            file,
            row,
            col,
            value,
            fold_cols,
        } => {
            let mut tsr = read_tensor(&file)?;
            grid::set_value_at(&mut tsr, !fold_cols, row, col, value)?;
            fs::write(&file, serde_json::to_string_pretty(&tsr)?)?;
            println!(
                "Set ({}, {}) = {} in {}",
                row,
                col,
                value,
                file.display().to_string().green()
            );
            Ok(())
        }
    }
}

fn read_tensor(path: &Path) -> Result<AnyTensor, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let tsr: AnyTensor = serde_json::from_str(&text)?;
    debug!(path = %path.display(), kind = %tsr.kind(), "loaded tensor");
    Ok(tsr)
}

fn load_config(path: &Path, no_color: bool) -> Result<GridConfig, Box<dyn std::error::Error>> {
    let mut cfg = GridConfig::load(path)?;
    if no_color {
        cfg.color = false;
    }
    Ok(cfg)
}

fn print_info(tsr: &AnyTensor, cfg: &GridConfig) {
    let shape = tsr.shape();
    let layout = match shape.layout() {
        Some(l) => format!("{:?}", l),
        None => "custom".to_string(),
    };
    let g = grid::shape_2d(shape, cfg.fold_into_rows);

    println!("{:<10} {}", "kind:".bold(), tsr.kind());
    println!("{:<10} {}", "shape:".bold(), shape);
    println!("{:<10} {:?}", "strides:".bold(), shape.strides());
    println!("{:<10} {}", "layout:".bold(), layout);
    println!("{:<10} {}", "values:".bold(), tsr.len());
    println!(
        "{:<10} {} x {} (groups: {} x {})",
        "grid:".bold(),
        g.rows,
        g.cols,
        g.extra_row_groups,
        g.extra_col_groups
    );

    let r = tsr.range();
    match (r.min_index, r.max_index) {
        (Some(lo), Some(hi)) => println!(
            "{:<10} min {} at {}, max {} at {}",
            "range:".bold(),
            r.min,
            lo,
            r.max,
            hi
        ),
        _ => println!("{:<10} {}", "range:".bold(), "n/a".yellow()),
    }

    if !tsr.metadata().is_empty() {
        println!("{}", "metadata:".bold());
        for (k, v) in tsr.metadata() {
            println!("  {} = {}", k.cyan(), v);
        }
    }
}

fn handle_init(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !config_path.exists() {
        fs::write(config_path, GridConfig::default().to_toml()?)?;
        println!(
            "Created default configuration: {}",
            config_path.display().to_string().green()
        );
    } else {
        println!(
            "Configuration file already exists: {}",
            config_path.display().to_string().yellow()
        );
    }
    Ok(())
}
