use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use floortile::floor::decode_image;
use floortile::segmentation::{SegmentationMap, parse_records};
use floortile::service::{FloorService, FsImageSource, LocalStore, Locator, RecordedSegmenter};
use floortile::{FloorConfig, FloorPipeline, ProcessOutcome};

#[derive(Parser)]
#[command(name = "floortile")]
#[command(about = "Replace the floor in a photo with a tiled texture")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full request: fetch, segment, retile and store the result
    Process(ProcessArgs),
    /// Retile local files and write the final image directly
    Render(RenderArgs),
}

#[derive(Args)]
struct PipelineArgs {
    /// Segmentation label treated as the floor
    #[arg(long, env = "FLOORTILE_LABEL", default_value = floortile::config::DEFAULT_FLOOR_LABEL)]
    label: String,

    /// Side length the tile sample is normalized to
    #[arg(long, env = "FLOORTILE_TILE_SIZE", default_value_t = floortile::config::DEFAULT_TILE_SIZE)]
    tile_size: u32,

    /// Weight of the original photo in the final blend
    #[arg(long, env = "FLOORTILE_ALPHA", default_value_t = floortile::config::DEFAULT_BLEND_ALPHA)]
    alpha: f32,

    /// Mask values above this count as floor
    #[arg(long, env = "FLOORTILE_MASK_THRESHOLD", default_value_t = floortile::config::DEFAULT_MASK_THRESHOLD)]
    mask_threshold: u8,

    /// Save each stage's image to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Saved segmentation model response (JSON)
    #[arg(long, value_name = "JSON")]
    segmentation: PathBuf,
}

impl PipelineArgs {
    fn build(&self) -> anyhow::Result<FloorPipeline> {
        let config = FloorConfig::new()
            .with_floor_label(self.label.clone())
            .with_tile_size(self.tile_size)
            .with_blend_alpha(self.alpha)
            .with_mask_threshold(self.mask_threshold);
        let mut pipeline = FloorPipeline::new(config)?;
        if let Some(dir) = &self.debug_out {
            pipeline = pipeline.with_debug(dir.clone())?;
        }
        Ok(pipeline)
    }
}

#[derive(Args)]
struct ProcessArgs {
    /// Photo locator (http/https/file URL or local path)
    #[arg(long)]
    photo: String,

    /// Tile sample locator (http/https/file URL or local path)
    #[arg(long)]
    tile: String,

    /// Directory receiving stored results
    #[arg(long, value_name = "DIR", env = "FLOORTILE_OUT_DIR", default_value = "results")]
    out_dir: PathBuf,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args)]
struct RenderArgs {
    /// Path to the photo
    #[arg(long)]
    photo: PathBuf,

    /// Path to the tile sample
    #[arg(long)]
    tile: PathBuf,

    /// Where to write the final image
    #[arg(long, short)]
    output: PathBuf,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

/// Bare paths become absolute `file://` locators; anything with a scheme is
/// passed through for the service to validate.
fn to_locator(raw: &str) -> String {
    if raw.contains("://") {
        return raw.to_string();
    }
    match Locator::from_path(Path::new(raw)) {
        Ok(locator) => locator.to_string(),
        Err(_) => raw.to_string(),
    }
}

async fn process_outcome(args: &ProcessArgs) -> anyhow::Result<ProcessOutcome> {
    let photo = to_locator(&args.photo);
    let tile = to_locator(&args.tile);

    // Locators are checked before the debug directory is created
    if let Err(e) = Locator::parse(&photo).and_then(|_| Locator::parse(&tile)) {
        warn!(kind = e.kind(), error = %e, "request failed");
        return Ok(ProcessOutcome::from(Err(e)));
    }

    let pipeline = args.pipeline.build()?;
    let service = FloorService::new(
        FsImageSource,
        RecordedSegmenter::new(&args.pipeline.segmentation),
        LocalStore::new(&args.out_dir),
        pipeline,
    );
    Ok(service.respond(&photo, &tile).await)
}

async fn process(args: ProcessArgs) -> anyhow::Result<bool> {
    let outcome = process_outcome(&args).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(matches!(outcome, ProcessOutcome::Success { .. }))
}

fn render(args: RenderArgs) -> anyhow::Result<()> {
    let pipeline = args.pipeline.build()?;

    let photo = std::fs::read(&args.photo)?;
    let photo = decode_image(&photo, "photo")?.to_rgb8();
    let tile = std::fs::read(&args.tile)?;
    let tile = decode_image(&tile, "tile")?.to_rgb8();

    let response = std::fs::read(&args.pipeline.segmentation)?;
    let segments = SegmentationMap::from_records(&parse_records(&response)?)?;

    let final_image = pipeline.run(&photo, &tile, &segments)?;
    final_image
        .save(&args.output)
        .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", args.output.display(), e))?;

    println!(
        "Wrote {}x{} image to {}",
        final_image.width(),
        final_image.height(),
        args.output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Process(args) => {
            if !process(args).await? {
                std::process::exit(1);
            }
        }
        Commands::Render(args) => render(args)?,
    }

    Ok(())
}
