// thumbpick/src/main.rs
use anyhow::{anyhow, Context};
use clap::Parser;
use log::LevelFilter;
use std::path::Path;
use thumbpick::{Cli, Commands, ImageId, RequestCtx, Size, ThumbnailConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Rank {
            config,
            original,
            target,
        } => {
            rank(&config, &original, &target)?;
        }
        Commands::Get {
            config,
            input,
            output,
            original,
            target,
            timeout,
        } => {
            get(&config, &input, &output, original.as_deref(), &target, &timeout)?;
        }
    }

    Ok(())
}

fn parse_size(s: &str) -> anyhow::Result<Size> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| anyhow!("expected WIDTHxHEIGHT, got {:?}", s))?;
    Ok(Size::new(w.trim().parse()?, h.trim().parse()?))
}

fn rank(config: &Path, original: &str, target: &str) -> anyhow::Result<()> {
    let sources = ThumbnailConfig::load(config)
        .with_context(|| format!("loading {}", config.display()))?
        .build_sources()?;
    let original = parse_size(original)?;
    let target = parse_size(target)?;

    let mut costs = sources.estimate_cost(original, target);
    costs.sort();

    println!(
        "{:<32} {:>12} {:>12} {:>14} {:>14} {:>14}",
        "source", "est. area", "est. dur", "size cost", "dur cost", "total"
    );
    for cost in costs.iter() {
        println!(
            "{:<32} {:>12} {:>12} {:>14.1} {:>14.1} {:>14.1}",
            cost.source.name(),
            cost.estimated_area,
            format!("{:?}", cost.estimated_duration),
            cost.size_cost,
            cost.duration_cost,
            cost.cost,
        );
    }
    Ok(())
}

fn get(
    config: &Path,
    input: &Path,
    output: &Path,
    original: Option<&str>,
    target: &str,
    timeout: &str,
) -> anyhow::Result<()> {
    let sources = ThumbnailConfig::load(config)
        .with_context(|| format!("loading {}", config.display()))?
        .build_sources()?;
    if sources.is_empty() {
        return Err(anyhow!("no sources configured"));
    }

    let original = match original {
        Some(s) => parse_size(s)?,
        None => probe_size(input).unwrap_or_default(),
    };
    let target = parse_size(target)?;
    let timeout = humantime::parse_duration(timeout)?;

    let mut costs = sources.estimate_cost(original, target);
    costs.sort();

    let ctx = RequestCtx::new().with_timeout(timeout);
    let id = ImageId(1);

    // Fall back down the ranking if the cheapest source fails.
    let mut last_err = None;
    for cost in costs.iter() {
        let source = &cost.source;
        if !source.exists(&ctx, id, input) {
            continue;
        }
        log::info!("trying {} (cost {:.1})", source.name(), cost.cost);
        match source.get(&ctx, id, input, original) {
            Ok(thumb) => {
                thumb
                    .image
                    .save(output)
                    .with_context(|| format!("saving {}", output.display()))?;
                log::info!(
                    "wrote {} ({}x{}, orientation {:?})",
                    output.display(),
                    thumb.image.width(),
                    thumb.image.height(),
                    thumb.orientation
                );
                sources.close()?;
                return Ok(());
            }
            Err(err) => {
                log::warn!("{} failed: {}", source.name(), err);
                last_err = Some(err);
            }
        }
    }

    sources.close()?;
    Err(match last_err {
        Some(err) => anyhow!(err),
        None => anyhow!("no source available for {}", input.display()),
    })
}

fn probe_size(path: &Path) -> Option<Size> {
    let (width, height) = image::image_dimensions(path).ok()?;
    Some(Size::new(width, height))
}
