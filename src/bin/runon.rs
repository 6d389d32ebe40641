use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use runon::{Color, CompositeOpts, Destination, Pen, Rect};

#[derive(Parser, Debug)]
#[command(name = "runon", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a pen tree to PNG, SVG or PDF (picked by the output extension).
    Render(RenderArgs),
    /// Print a summary of a pen tree.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input pen JSON.
    input: PathBuf,

    /// Output path (.png, .svg or .pdf).
    #[arg(long)]
    out: PathBuf,

    /// Render rect width in pen units; defaults to the pen's frame or bounds.
    #[arg(long)]
    width: Option<f64>,

    /// Render rect height in pen units; defaults to the pen's frame or bounds.
    #[arg(long)]
    height: Option<f64>,

    /// Pixels per pen unit.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Named style layer.
    #[arg(long)]
    style: Option<String>,

    /// Background colour as hex, e.g. `#202020`.
    #[arg(long)]
    background: Option<String>,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input pen JSON.
    input: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
    #[cfg(feature = "gpu")]
    Gpu,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn read_pen_json(path: &Path) -> anyhow::Result<Pen> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("open pen '{}'", path.display()))?;
    Ok(Pen::from_json(&text).with_context(|| format!("parse pen '{}'", path.display()))?)
}

fn render_rect(pen: &Pen, width: Option<f64>, height: Option<f64>) -> anyhow::Result<Rect> {
    let base = match pen.frame() {
        Some(frame) => frame,
        None => pen.ambit().context("pen has no frame and no geometry")?,
    };
    Ok(Rect::new(
        base.x0,
        base.y0,
        base.x0 + width.unwrap_or(base.width()),
        base.y0 + height.unwrap_or(base.height()),
    ))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let pen = read_pen_json(&args.input)?;
    let rect = render_rect(&pen, args.width, args.height)?;
    let clear = args
        .background
        .as_deref()
        .map(|s| serde_json::from_value::<Color>(serde_json::Value::String(s.to_owned())))
        .transpose()
        .context("parse --background")?;
    let opts = CompositeOpts {
        scale: args.scale,
        style: args.style,
        clear,
    };

    match args.backend {
        BackendChoice::Cpu => runon::composite(&pen, rect, Destination::File(&args.out), &opts)?,
        #[cfg(feature = "gpu")]
        BackendChoice::Gpu => {
            let mut context = runon::GpuContext::new()?;
            runon::composite(
                &pen,
                rect,
                Destination::Gpu {
                    context: &mut context,
                    save_to: Some(&args.out),
                },
                &opts,
            )?;
        }
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let pen = read_pen_json(&args.input)?;
    let mut groups = 0usize;
    count_groups(&pen, &mut groups);
    println!("leaves: {}", pen.leaves().count());
    println!("groups: {groups}");
    match pen.ambit() {
        Ok(r) => println!("ambit: {} {} {} {}", r.x0, r.y0, r.width(), r.height()),
        Err(_) => println!("ambit: none"),
    }
    if let Some(frame) = pen.frame() {
        println!(
            "frame: {} {} {} {}",
            frame.x0,
            frame.y0,
            frame.width(),
            frame.height()
        );
    }
    if let Some(tag) = pen.tag() {
        println!("tag: {tag}");
    }
    Ok(())
}

fn count_groups(pen: &Pen, groups: &mut usize) {
    if pen.is_group() {
        *groups += 1;
        for child in pen.children() {
            count_groups(child, groups);
        }
    }
}
