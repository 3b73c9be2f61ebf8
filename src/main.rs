//! Ingredient Scanner CLI: serve the catalog API, scan a label, look up an ingredient.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ingredient_scanner::api::{self, AppState};
use ingredient_scanner::catalog::Catalog;
use ingredient_scanner::config::AppConfig;
use ingredient_scanner::ocr;
use ingredient_scanner::parser::LabelParser;
use ingredient_scanner::preview::PreviewStore;
use ingredient_scanner::scan_image::ScanImage;
use ingredient_scanner::scorer::SafetyBand;
use ingredient_scanner::session::{ScanPhase, ScanSnapshot, Scanner};

#[derive(Parser)]
#[command(name = "ingredient-scanner", version, about = "Scan product labels for ingredients of concern")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the read-only ingredient API
    Serve {
        /// Listen address (overrides BIND_ADDR)
        #[arg(long)]
        bind: Option<std::net::SocketAddr>,
    },
    /// OCR a label photo and score its ingredients
    Scan {
        /// Image file of the ingredient label
        image: PathBuf,
        /// Print the session snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show catalog details for an ingredient name
    Lookup {
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ingredient_scanner=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let catalog = Arc::new(Catalog::builtin());
    info!("Loaded catalog with {} ingredients", catalog.len());

    match cli.command {
        Command::Serve { bind } => serve(catalog, bind.unwrap_or(config.bind_addr)).await,
        Command::Scan { image, json } => scan(&config, catalog, image, json).await,
        Command::Lookup { name } => lookup(&catalog, &name),
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn serve(catalog: Arc<Catalog>, bind: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = api::router(AppState { catalog });

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Server listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn scan(
    config: &AppConfig,
    catalog: Arc<Catalog>,
    path: PathBuf,
    json: bool,
) -> anyhow::Result<()> {
    let engine = ocr::build_engine(config);
    info!("Using OCR engine: {}", engine.name());

    let image = ScanImage::from_path(&path).await?;
    let mut scanner = Scanner::new(engine, catalog, PreviewStore::new(), &config.ocr_language);
    scanner.set_image(Some(image));

    let phase = scanner.start_processing().await?;
    let snapshot = scanner.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&snapshot);
    }

    if phase != ScanPhase::Results {
        let message = snapshot.error.unwrap_or_else(|| "Scan did not finish".to_string());
        anyhow::bail!(message);
    }
    Ok(())
}

fn lookup(catalog: &Catalog, name: &str) -> anyhow::Result<()> {
    let cleaned = LabelParser::new().clean_ingredient_name(name);
    let ingredient = catalog
        .find(&cleaned)
        .with_context(|| format!("No catalog entry matches '{}'", name))?;

    println!("{} ({})", ingredient.name, ingredient.risk_level.label());
    if let Some(category) = &ingredient.category {
        println!("Category: {}", category);
    }
    if !ingredient.alternative_names.is_empty() {
        println!("Also known as: {}", ingredient.alternative_names.join(", "));
    }
    println!();
    println!("{}", ingredient.description);
    if !ingredient.health_concerns.is_empty() {
        println!();
        println!("Health concerns:");
        for concern in &ingredient.health_concerns {
            println!("  - {}: {}", concern.name, concern.description);
        }
    }
    Ok(())
}

// ============================================================================
// Helper functions
// ============================================================================

fn print_summary(snapshot: &ScanSnapshot) {
    println!("Detected text:");
    println!("{}", snapshot.ocr_text.as_deref().unwrap_or("No text detected"));
    println!();

    let (Some(score), Some(counts)) = (snapshot.safety_score, snapshot.ingredient_counts) else {
        if let Some(error) = &snapshot.error {
            println!("Scan failed: {}", error);
        }
        return;
    };

    let band = match SafetyBand::for_score(score) {
        SafetyBand::Good => "good",
        SafetyBand::Fair => "fair",
        SafetyBand::Poor => "poor",
    };
    println!("Product safety score: {:.1}/10 ({})", score, band);

    let harmful = counts.harmful();
    match harmful {
        0 => println!("No harmful ingredients found"),
        1 => println!("1 potentially harmful ingredient found"),
        n => println!("{} potentially harmful ingredients found", n),
    }
    println!(
        "High concern: {}  Moderate concern: {}  Low/No concern: {}",
        counts.high,
        counts.moderate,
        counts.low_or_safe()
    );
    println!();

    for result in &snapshot.analysis_results {
        match &result.matched_ingredient {
            Some(found) => println!(
                "  [{:<8}] {} -> {} ({:.0}%)",
                found.risk_level.as_str(),
                result.ingredient,
                found.name,
                result.confidence * 100.0
            ),
            None => println!("  [{:<8}] {} (not in catalog)", "unknown", result.ingredient),
        }
    }
}
