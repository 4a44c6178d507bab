use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use railscan::api::{self, AppState};
use railscan::core::db::InspectionDb;
use railscan::detection::{Detector, DetectorConfig};
use railscan::models::CriticalityLevel;

#[derive(Parser)]
#[command(name = "railscan")]
#[command(about = "Detect and score surface anomalies on railway track images")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the inspection REST API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on
        #[arg(long, default_value_t = 5000)]
        port: u16,

        /// SQLite database file
        #[arg(long, value_name = "FILE", default_value = "database/inspections.db")]
        db: PathBuf,

        /// Directory for uploaded and annotated images
        #[arg(long, value_name = "DIR", default_value = "uploads")]
        upload_dir: PathBuf,
    },

    /// Analyze a single image and print the report
    Analyze {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Minimum contour area (px²) reported as an anomaly
        #[arg(long, default_value_t = 100.0)]
        min_area: f64,

        /// Low hysteresis threshold for edge detection
        #[arg(long, default_value_t = 50.0)]
        low_threshold: f32,

        /// High hysteresis threshold for edge detection
        #[arg(long, default_value_t = 150.0)]
        high_threshold: f32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    match args.command {
        Command::Serve {
            host,
            port,
            db,
            upload_dir,
        } => serve(host, port, db, upload_dir).await,
        Command::Analyze {
            image_path,
            min_area,
            low_threshold,
            high_threshold,
        } => analyze(&image_path, min_area, low_threshold, high_threshold),
    }
}

async fn serve(host: IpAddr, port: u16, db_file: PathBuf, upload_dir: PathBuf) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    std::fs::create_dir_all(&upload_dir)?;
    let db = InspectionDb::new(&db_file).await?;
    tracing::info!("database: {}", db_file.display());
    tracing::info!("upload folder: {}", upload_dir.display());

    let state = AppState {
        db,
        detector: Detector::new(),
        upload_dir,
    };
    api::serve(state, SocketAddr::new(host, port)).await
}

fn analyze(
    image_path: &PathBuf,
    min_area: f64,
    low_threshold: f32,
    high_threshold: f32,
) -> anyhow::Result<()> {
    let detector = Detector::with_config(DetectorConfig {
        low_threshold,
        high_threshold,
        min_contour_area: min_area,
        ..DetectorConfig::default()
    });

    let report = detector.process_image(image_path)?;

    println!("=== Railway Surface Analysis ===");
    println!(
        "Image: {} ({}x{})",
        image_path.display(),
        report.image_dimensions.0,
        report.image_dimensions.1
    );
    println!("Anomalies detected: {}", report.anomalies_count);
    println!(
        "Criticality: {:.2} ({})",
        report.criticality_score,
        CriticalityLevel::from_score(report.criticality_score)
    );
    println!("Processing time: {:.3}s", report.processing_time);
    println!("Notes: {}", report.notes);
    println!("Annotated image: {}", report.annotated_image_path.display());

    Ok(())
}
