use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use stock_image_generator::app::{GenerationState, Generator};
use stock_image_generator::download;
use stock_image_generator::models::{Config, DrawingStyle, GenerationRequest};
use stock_image_generator::view;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "stock-image-generator")]
#[command(about = "Generate a stock image with planning notes and keywords")]
struct CliArgs {
    /// What the image should show.
    #[arg(value_name = "SUBJECT", required_unless_present = "list_styles")]
    subject: Option<String>,

    /// Drawing style (see --list-styles).
    #[arg(long, value_parser = parse_style_arg, default_value = "photorealistic")]
    style: DrawingStyle,

    /// Ask for a transparent background instead of a detailed one.
    #[arg(long)]
    no_background: bool,

    /// Directory the PNG and its metadata are written to.
    #[arg(long, value_name = "DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Only render the result, do not save files.
    #[arg(long)]
    no_download: bool,

    /// Print the style catalog and exit.
    #[arg(long)]
    list_styles: bool,
}

fn parse_style_arg(input: &str) -> std::result::Result<DrawingStyle, String> {
    input.parse::<DrawingStyle>().map_err(|e| {
        format!(
            "{}. Run with --list-styles to see the available styles",
            e
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_image_generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    if args.list_styles {
        print!("{}", view::render_styles());
        return Ok(());
    }

    info!("Starting stock-image-generator");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let request = GenerationRequest::new(
        args.subject.unwrap_or_default(),
        args.style,
        !args.no_background,
    );

    let generator = Generator::from_config(&config);
    let mut updates = generator.subscribe();
    let form = request.clone();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            println!("{}", view::render(&snapshot, &form));
        }
    });

    let final_state = generator.generate(&request).await;
    // Closing the channel ends the renderer loop.
    drop(generator);
    renderer.await?;

    match final_state {
        GenerationState::Success(content) => {
            if !args.no_download {
                download::save_png(&content, &request.subject, &args.output_dir)?;
                download::save_metadata(&content, &request, &args.output_dir)?;
            }
            info!("Generation completed successfully");
            Ok(())
        }
        other => {
            error!(
                "Generation failed: {}",
                other.error().unwrap_or("no result produced")
            );
            std::process::exit(1);
        }
    }
}
