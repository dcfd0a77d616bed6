use anyhow::Context;
use api_bridge::bridge::ApiBridge;
use clap::Parser;
use generator::template::{encode_png, sample_image};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::ServiceConfig;
use workflow::runner::PredictRunner;

mod api_bridge;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Synthetic prediction endpoint for the dental screening client"
)]
struct Args {
    /// Run a single prediction pass and emit a baseline summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a service config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Image for the offline pass; a synthetic scan when omitted
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long, default_value_t = 5000)]
    port: u16,
    #[arg(long, default_value_t = 0.25)]
    confidence: f32,
    #[arg(long, default_value_t = 6)]
    max_detections: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value = "tools/data/annotated")]
    output_dir: PathBuf,
    /// Keep the prediction endpoint alive for incoming requests
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let service_config = if let Some(path) = args.config {
        ServiceConfig::load(path)?
    } else {
        ServiceConfig::from_args(
            args.confidence,
            args.max_detections,
            args.seed,
            args.output_dir.clone(),
        )
    };

    let runner = Arc::new(PredictRunner::new(service_config));
    let bridge = ApiBridge::new(runner.clone(), args.port);

    if args.offline {
        let (file_name, bytes) = match &args.image {
            Some(path) => {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload.png".to_string());
                let bytes = fs::read(path)
                    .with_context(|| format!("reading offline image {}", path.display()))?;
                (name, bytes)
            }
            None => (
                "synthetic_scan.png".to_string(),
                encode_png(&sample_image(320, 200))?,
            ),
        };

        let response = runner.execute(&file_name, &bytes, None)?;

        println!(
            "Offline run -> detections {}, inference {} ms, annotated {:?}",
            response.num_detections, response.inference_time_ms, response.saved_image_path
        );
        bridge.publish_status("Offline prediction results ready.");

        let report = format!(
            "image={} detections={} inference_ms={} saved={:?}\n",
            file_name, response.num_detections, response.inference_time_ms,
            response.saved_image_path
        );
        let report_path = PathBuf::from("tools/data/offline_predictions.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(report.as_bytes())?;
    }
    if args.serve {
        bridge.publish_status(&format!(
            "Prediction endpoint on port {} (Ctrl+C to stop)...",
            args.port
        ));
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
        bridge.publish_status(&format!(
            "Stopped after {} predictions.",
            bridge.snapshot().predictions_served
        ));
    }

    Ok(())
}
