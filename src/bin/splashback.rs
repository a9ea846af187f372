use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "splashback", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the motif, paint the plates, and write a PNG.
    Render(RenderArgs),
    /// Print the computed plate geometry as JSON.
    Layout(SceneArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Plate list JSON (array of `{ id, width_cm, height_cm }`).
    #[arg(long)]
    plates: PathBuf,

    /// Surface width in pixels.
    #[arg(long)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long)]
    height: u32,

    /// Render configuration JSON. Defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Motif locator: http(s) URL, file path, `file://` URL, or `data:` URL.
    #[arg(long)]
    motif: Option<String>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn read_config(path: Option<&Path>) -> anyhow::Result<splashback::RenderConfig> {
    match path {
        Some(p) => splashback::RenderConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(splashback::RenderConfig::default()),
    }
}

fn read_plates(path: &Path) -> anyhow::Result<splashback::PlateSet> {
    splashback::PlateSet::from_path(path)
        .with_context(|| format!("load plates '{}'", path.display()))
}

fn cmd_layout(args: SceneArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let plates = read_plates(&args.plates)?;
    let size = splashback::SurfaceSize::new(args.width, args.height).checked()?;

    let layout = splashback::compute_layout(plates.as_slice(), size, &config.layout);
    let json = serde_json::to_string_pretty(&layout).context("serialize layout")?;
    println!("{json}");
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = read_config(args.scene.config.as_deref())?;
    let plates = read_plates(&args.scene.plates)?;
    let size = splashback::SurfaceSize::new(args.scene.width, args.scene.height);

    let user = args
        .motif
        .as_deref()
        .map(splashback::MotifLocator::parse)
        .transpose()
        .context("parse --motif")?;

    let fetcher = Arc::new(splashback::StdFetcher::new(config.motif.origin.clone()));
    let resolver = splashback::MotifResolver::new(
        fetcher,
        splashback::ResolverOpts::from_params(&config.motif)?,
    );
    let resolved = resolver.resolve(user.as_ref());
    eprintln!("motif tier: {}", resolved.tier);
    if let Some(note) = resolved.advisory() {
        eprintln!("{note}");
    }

    let mut session = splashback::PlateSession::new(config, plates.snapshot(), size)?;
    session.set_motif(resolved);
    let png = session.try_export_png().context("export png")?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
