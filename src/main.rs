use callejero::config::{Cli, Commands, ServeArgs};
use callejero::directory::import::import_sql_dump;
use callejero::directory::reports::section_summary;
use callejero::directory::store::{MemoryStore, RecordStore};
use callejero::resolver::engine::AddressResolver;
use callejero::resolver::enricher::CoordinateEnricher;
use callejero::resolver::geocoder::NominatimGeocoder;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let command = cli.selected();

    let store: Arc<dyn RecordStore> = match cli.snapshot_for(&command)? {
        Some(path) => Arc::new(MemoryStore::open(path)?),
        None => {
            tracing::warn!("No --data snapshot given, directory changes will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    match command {
        Commands::Serve => serve(&cli.serve, store).await,
        Commands::Import { file } => import(&file, store.as_ref()),
        Commands::Sections => report_sections(store.as_ref()),
    }
}

async fn serve(args: &ServeArgs, store: Arc<dyn RecordStore>) -> anyhow::Result<()> {
    let normalizer = args.normalizer();
    tracing::info!("Street types (in precedence order): {:?}", normalizer.tokens());

    let geocoder = Arc::new(NominatimGeocoder::new(
        &args.geocoder_url,
        &args.user_agent(),
        args.geocoder_timeout(),
    )?);
    tracing::info!("Geocoding via {} for '{}'", args.geocoder_url, args.region);

    let enricher = CoordinateEnricher::new(geocoder, args.region.clone());
    let resolver = Arc::new(AddressResolver::new(store.clone(), normalizer, enricher));

    let app = callejero::router(store.clone(), resolver);

    tracing::info!(
        "HTTP server listening on {} ({} directory entries)",
        args.bind,
        store.count()?
    );
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn import(file: &Path, store: &dyn RecordStore) -> anyhow::Result<()> {
    tracing::info!("Reading SQL dump {}", file.display());
    let sql = std::fs::read_to_string(file)?;
    import_sql_dump(&sql, store)?;
    Ok(())
}

fn report_sections(store: &dyn RecordStore) -> anyhow::Result<()> {
    let rows = store.all()?;
    let sections = section_summary(&rows);

    for section in &sections {
        tracing::info!("Section {}: {} entries", section.seccion, section.count.calles);
    }
    tracing::info!("Total sections: {}", sections.len());
    tracing::info!("Total entries: {}", rows.len());
    Ok(())
}
