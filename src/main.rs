use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use media_variants::{Asset, AssetController, PipelineConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct Args {
    #[clap(short, long, env = "MEDIA_VARIANTS_CONFIG")]
    /// The file path to the YAML pipeline config.
    pub config: PathBuf,

    #[clap(long, default_value = "info", env = "MEDIA_VARIANTS_LOG")]
    /// The default log filter, overridden by `RUST_LOG`.
    pub log_level: Level,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Renders the variants of an image and uploads them with the original.
    Upload {
        /// The image to upload.
        file: PathBuf,

        #[clap(long)]
        /// The asset hash, generated from the file name when omitted.
        hash: Option<String>,
    },

    /// Deletes every object recorded in an asset document.
    Delete {
        /// A JSON asset document as printed by `upload`.
        asset: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.to_string().to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = PipelineConfig::load(&args.config).await?;
    let controller = AssetController::connect(&config)?;

    match args.command {
        Command::Upload { file, hash } => {
            let mut asset = read_asset(&file, hash).await?;
            controller.upload(&mut asset).await;
            println!("{}", serde_json::to_string_pretty(&asset)?);
        },
        Command::Delete { asset } => {
            let raw = tokio::fs::read(&asset).await?;
            let asset: Asset = serde_json::from_slice(&raw)?;

            let mut failed = 0;
            for outcome in controller.delete(&asset).await {
                match outcome.result {
                    Ok(()) => println!("deleted  {}", outcome.key),
                    Err(e) => {
                        failed += 1;
                        println!("failed   {} ({})", outcome.key, e);
                    },
                }
            }

            if failed > 0 {
                tracing::warn!("{} object(s) could not be deleted", failed);
            }
        },
    }

    Ok(())
}

async fn read_asset(path: &Path, hash: Option<String>) -> Result<Asset> {
    let buffer = tokio::fs::read(path).await?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("Unable to derive a name from {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| format!(".{}", s))
        .unwrap_or_default();

    let hash = hash.unwrap_or_else(|| format!("{}_{}", stem, Uuid::new_v4().to_simple()));
    let mime = guess_mime(&ext);

    Ok(Asset::new(hash, ext, mime.to_string(), buffer))
}

fn guess_mime(ext: &str) -> mime::Mime {
    match ext.to_lowercase().as_str() {
        ".png" => mime::IMAGE_PNG,
        ".jpg" | ".jpeg" => mime::IMAGE_JPEG,
        ".gif" => mime::IMAGE_GIF,
        ".bmp" => mime::IMAGE_BMP,
        ".webp" => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
