/// Export stored submissions as CSV, same format as GET /admin/export.
///
/// Usage: export-csv [--month NAME] [--output PATH]
///   --month NAME   : Only this month (optional, all if not specified)
///   --output PATH  : Write to a file instead of stdout

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;

use meal_portal_api::{
    db::{self, MenuStore, PgStore},
    models::month::Month,
    services::export::{export_filename, submissions_csv},
};

#[derive(Parser)]
#[command(name = "export-csv", about = "Export meal portal submissions as CSV")]
struct Args {
    /// Month to export, case-insensitive (e.g. "june")
    #[arg(long)]
    month: Option<Month>,

    /// Output file; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays a clean CSV stream.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable not set")?;
    let pool = db::create_pool(&database_url).await?;
    let store = PgStore::new(pool);

    let submissions = store.list_submissions(args.month).await?;
    let csv = submissions_csv(&submissions)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, csv)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(
                "Wrote {} submission(s) to {} (suggested name {})",
                submissions.len(),
                path.display(),
                export_filename(args.month, Utc::now().date_naive())
            );
        }
        None => {
            print!("{csv}");
            tracing::info!("Exported {} submission(s)", submissions.len());
        }
    }

    Ok(())
}
