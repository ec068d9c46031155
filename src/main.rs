use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sticker_import::{
    config::{Config, UploadBackend},
    models::{PackType, Pricing},
    services::{
        source::{load_manifest, parse_tags, DirectoryPack},
        BatchRunner, PackImporter, ThumbnailDeriver,
    },
    storage::{
        http::HttpUploader, memory::MemoryDocumentStore, minio::MinioClient,
        postgres::PgDocumentStore, AssetUploader, DocumentStore,
    },
};

/// Import sticker packs into the object store and document database
#[derive(Parser, Debug)]
#[command(name = "sticker-import")]
#[command(version)]
struct Args {
    /// Owner identifier attached to uploads and documents
    #[arg(long, global = true, default_value = "admin", env = "STICKER_OWNER_ID")]
    owner_id: String,

    /// Keep documents in memory and print them instead of writing to PostgreSQL
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload one pack from a directory of sticker images
    Pack(PackArgs),
    /// Import every pack listed in a JSON manifest
    Bulk {
        /// Path to the manifest; relative paths inside it resolve next to it
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct PackArgs {
    /// Name of the sticker pack
    #[arg(long)]
    pack_name: String,

    /// Pack description
    #[arg(long)]
    description: String,

    /// Pack type
    #[arg(long = "type", value_enum, default_value_t = PackType::Official)]
    pack_type: PackType,

    /// Directory containing sticker images
    #[arg(long)]
    stickers_dir: PathBuf,

    /// Path to the pack icon (512x512 recommended)
    #[arg(long)]
    icon: PathBuf,

    /// Comma-separated tags, e.g. "cute,animal,funny"
    #[arg(long)]
    tags: Option<String>,

    /// Make this a paid pack at the configured default price
    #[arg(long)]
    paid: bool,
}

impl PackArgs {
    fn into_directory_pack(self, paid_pack_price: i64) -> DirectoryPack {
        DirectoryPack {
            name: self.pack_name,
            description: self.description,
            pack_type: self.pack_type,
            stickers_dir: self.stickers_dir,
            icon: self.icon,
            tags: self.tags.as_deref().map(parse_tags).unwrap_or_default(),
            pricing: if self.paid {
                Pricing::paid(paid_pack_price)
            } else {
                Pricing::free()
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sticker_import=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = Config::load();

    // Local inputs are checked before any connection is opened.
    let single_pack = matches!(args.command, Command::Pack(_));
    let specs = match args.command {
        Command::Pack(pack) => pack
            .into_directory_pack(config.import.paid_pack_price)
            .into_spec()
            .map(|spec| vec![spec]),
        Command::Bulk { config: manifest } => {
            load_manifest(&manifest, config.import.paid_pack_price)
        }
    };
    let specs = match specs {
        Ok(specs) => specs,
        Err(e) => {
            tracing::error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let uploader = build_uploader(&config).await?;
    let memory = args.dry_run.then(|| Arc::new(MemoryDocumentStore::new()));
    let store: Arc<dyn DocumentStore> = match &memory {
        Some(memory) => memory.clone(),
        None => Arc::new(PgDocumentStore::connect(&config).await?),
    };

    let importer = PackImporter::new(
        uploader,
        store,
        ThumbnailDeriver::new(&config.import),
        args.owner_id,
    );
    let summary = BatchRunner::new(importer).run(&specs).await;
    println!("{}", summary);

    if let Some(memory) = memory {
        println!("{}", serde_json::to_string_pretty(&memory.snapshot())?);
    }

    if single_pack && summary.succeeded() != 1 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn build_uploader(config: &Config) -> anyhow::Result<Arc<dyn AssetUploader>> {
    let uploader: Arc<dyn AssetUploader> = match config.upload.backend {
        UploadBackend::Http => {
            tracing::info!("Uploading to {}", config.upload.url);
            Arc::new(HttpUploader::new(&config.upload)?)
        }
        UploadBackend::Minio => {
            let minio = MinioClient::new(&config.minio, config.upload.timeout);
            minio.ensure_bucket().await?;
            tracing::info!("Connected to MinIO");
            Arc::new(minio)
        }
    };

    Ok(uploader)
}
