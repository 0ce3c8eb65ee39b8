//! # Ficha CLI
//!
//! Usage:
//!   ficha render --in request.json --out sheet.png
//!   ficha example > request.json

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ficha", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a worksheet request to PNG.
    Render(RenderArgs),
    /// Print an example request.
    Example,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Log layout diagnostics (drop cap, fallbacks) as well.
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Example => {
            print!("{}", example_request_json());
            Ok(())
        }
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let request = ficha::read_request(&args.in_path)?;
    let sheet = ficha::render(&request)
        .with_context(|| format!("render '{}'", args.in_path.display()))?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    ficha::write_png(&args.out, &sheet)?;

    if sheet.report.truncated {
        eprintln!(
            "warning: text truncated, {} of {} lines drawn",
            sheet.report.lines_drawn, sheet.report.total_lines
        );
    }
    eprintln!(
        "wrote {} ({}x{}, {} bytes)",
        args.out.display(),
        sheet.width,
        sheet.height,
        sheet.png.len()
    );
    Ok(())
}

fn example_request_json() -> &'static str {
    r##"{
  "header": "./header.png",
  "kind": "story",
  "text": "**Once** upon a time, a little fox lived at the edge of a *very* old forest.\n\nEvery morning she counted the stones by the river. One, two, three...",
  "config": {
    "style": "playful",
    "imageMode": "contain",
    "dropCap": { "enabled": true, "boxLines": 3 },
    "typography": {
      "fontSize": 48,
      "lineHeight": 70,
      "paragraphGap": 35,
      "emphasis": "distinct"
    }
  }
}
"##
}
