use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "framecard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a framed screenshot as a PNG.
    Render(RenderArgs),
    /// Write every built-in background as a PNG swatch.
    Backgrounds(BackgroundsArgs),
    /// Print the default style as JSON.
    Style,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Source screenshot. Without it only the background is drawn.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long, default_value = framecard::DEFAULT_EXPORT_NAME)]
    out: PathBuf,

    /// Style JSON; individual flags below override its fields.
    #[arg(long)]
    style: Option<PathBuf>,

    #[arg(long)]
    radius: Option<f64>,

    #[arg(long)]
    margin: Option<f64>,

    #[arg(long)]
    padding: Option<f64>,

    #[arg(long)]
    shadow: Option<f64>,

    /// One of 1:1, 4:3, 3:2, 16:9.
    #[arg(long)]
    aspect: Option<framecard::AspectPreset>,

    /// Background index (0-5).
    #[arg(long)]
    background: Option<usize>,

    /// Output width in pixels; height follows the aspect ratio.
    #[arg(long)]
    host_width: Option<u32>,
}

#[derive(Parser, Debug)]
struct BackgroundsArgs {
    /// Directory receiving one PNG per background.
    #[arg(long)]
    out_dir: PathBuf,

    /// Swatch side in pixels.
    #[arg(long, default_value_t = 256)]
    size: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Backgrounds(args) => cmd_backgrounds(args),
        Command::Style => cmd_style(),
    }
}

fn read_style_json(path: &Path) -> anyhow::Result<framecard::StyleParameters> {
    let f = File::open(path).with_context(|| format!("open style '{}'", path.display()))?;
    let style: framecard::StyleParameters =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse style JSON")?;
    Ok(style)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut style = match &args.style {
        Some(path) => read_style_json(path)?,
        None => framecard::StyleParameters::default(),
    };
    style.validate()?;

    let mut settings = framecard::PreviewSettings::from_env();
    if let Some(w) = args.host_width {
        settings.host_width = w;
    }

    let mut session = framecard::PreviewSession::new(
        settings,
        framecard::BackgroundCatalog::builtin(),
        style,
    )?;

    // Control edits go through the store exactly as slider drags would.
    let now = std::time::Instant::now();
    let store = session.store_mut();
    if let Some(v) = args.radius {
        store.set_corner_radius(v, now)?;
    }
    if let Some(v) = args.margin {
        store.set_margin(v, now)?;
    }
    if let Some(v) = args.padding {
        store.set_padding(v, now)?;
    }
    if let Some(v) = args.shadow {
        store.set_shadow_radius(v, now)?;
    }
    if let Some(preset) = args.aspect {
        store.set_aspect_preset(preset)?;
    }
    if let Some(i) = args.background {
        store.set_background_index(i)?;
    }
    if let Some(path) = &args.image {
        store.set_source_image(framecard::SourceImage::from_path(path)?);
    }

    let png = session.export_png()?;
    framecard::write_encoded(&args.out, &png)?;

    let surface = session
        .surface()
        .context("export finished without a surface")?;
    eprintln!(
        "wrote {} ({}x{})",
        args.out.display(),
        surface.width,
        surface.height
    );
    Ok(())
}

fn cmd_backgrounds(args: BackgroundsArgs) -> anyhow::Result<()> {
    let settings = framecard::PreviewSettings {
        host_width: args.size,
        ..framecard::PreviewSettings::from_env()
    };
    let catalog = framecard::BackgroundCatalog::builtin();
    let ids: Vec<String> = catalog.iter().map(|bg| bg.id.clone()).collect();
    let mut compositor = framecard::Compositor::new(settings, catalog);

    for (index, id) in ids.iter().enumerate() {
        let inputs = framecard::RenderInputs {
            revision: index as u64 + 1,
            params: framecard::StyleParameters {
                background_index: index,
                ..framecard::StyleParameters::default()
            },
            source: None,
        };
        compositor.render_pass(&inputs)?;
        let surface = compositor
            .surface()
            .context("background pass produced no surface")?;
        let path = args.out_dir.join(format!("{id}.png"));
        framecard::write_png(&path, surface)?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_style() -> anyhow::Result<()> {
    println!("{}", framecard::StyleParameters::default().to_json_pretty()?);
    Ok(())
}
