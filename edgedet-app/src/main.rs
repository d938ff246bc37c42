use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use edgedet::render::{self, RenderPolicy};
use edgedet::{
    Canny, DetectorConfig, DetectorKind, EdgeGrid, Grid, Norm, Padding, Smoothing, Thresholds,
};
use image::{DynamicImage, RgbImage};
use log::{info, warn, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use rayon::prelude::*;

#[derive(FromArgs, Debug)]
/// Detect edges in an image and write the rendered edge map.
struct Args {
    /// input image
    #[argh(positional)]
    input: PathBuf,

    /// output file, or output directory with --all
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// canny, sobel, laplacian, prewitt, roberts-cross or gaussian
    #[argh(option, short = 'd', default = "DetectorKind::Canny")]
    detector: DetectorKind,

    /// run every detector, one output per detector
    #[argh(switch)]
    all: bool,

    /// JSON file holding a detector configuration; flags override it
    #[argh(option)]
    config: Option<PathBuf>,

    /// low hysteresis threshold (canny), requires --high
    #[argh(option)]
    low: Option<i32>,

    /// high hysteresis threshold (canny), requires --low
    #[argh(option)]
    high: Option<i32>,

    /// drop linked edges with fewer pixels (canny)
    #[argh(option)]
    min_edge_size: Option<usize>,

    /// use |Gx| + |Gy| instead of the euclidean magnitude (canny)
    #[argh(switch)]
    l1: bool,

    /// generated gaussian kernel size, odd
    #[argh(option)]
    kernel_size: Option<usize>,

    /// generated gaussian sigma
    #[argh(option)]
    sigma: Option<f64>,

    /// border handling: zeros, same, symmetric or circular
    #[argh(option)]
    padding: Option<Padding>,

    /// black-on-white, white-on-black, weak-strong or original
    #[argh(option, default = "RenderPolicy::BlackOnWhite")]
    render: RenderPolicy,

    /// debug logging
    #[argh(switch, short = 'v')]
    verbose: bool,
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S%.3f)} {h({l:<5})} {t} - {m}{n}",
        )))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn load_config(args: &Args) -> Result<DetectorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => DetectorConfig::default(),
    };

    match (args.low, args.high) {
        (Some(low), Some(high)) => config.thresholds = Thresholds::explicit(low, high)?,
        (None, None) => {}
        _ => bail!("--low and --high must be given together"),
    }
    if let Some(min_edge_size) = args.min_edge_size {
        config.min_edge_size = min_edge_size;
    }
    if args.l1 {
        config.norm = Norm::L1;
    }
    if args.kernel_size.is_some() || args.sigma.is_some() {
        config.smoothing = Smoothing::Gaussian {
            size: args.kernel_size.unwrap_or(5),
            sigma: args.sigma.unwrap_or(1.4),
        };
    }
    if let Some(padding) = args.padding {
        config.padding = padding;
    }
    config.validate()?;
    Ok(config)
}

struct Detection {
    edges: EdgeGrid,
    weak: Grid<bool>,
    strong: Grid<bool>,
}

fn run(kind: DetectorKind, grid: &Grid<u8>, config: &DetectorConfig) -> Result<Detection> {
    if kind == DetectorKind::Canny {
        let canny = Canny.detect_detailed(grid, config)?;
        info!(
            "{kind}: thresholds {}/{}, {} components kept, {} dropped",
            canny.low_threshold,
            canny.high_threshold,
            canny.accepted_components,
            canny.rejected_components
        );
        return Ok(Detection {
            edges: canny.edges,
            weak: canny.weak,
            strong: canny.strong,
        });
    }
    let edges = kind.detect(grid, config)?;
    Ok(Detection {
        weak: edges.map(|_| false),
        strong: edges.clone(),
        edges,
    })
}

fn paint(
    detection: &Detection,
    policy: RenderPolicy,
    original: &RgbImage,
) -> Result<DynamicImage> {
    let image = match policy {
        RenderPolicy::BlackOnWhite => {
            DynamicImage::ImageLuma8(render::black_on_white(&detection.edges)?)
        }
        RenderPolicy::WhiteOnBlack => {
            DynamicImage::ImageLuma8(render::white_on_black(&detection.edges)?)
        }
        RenderPolicy::WeakStrong => {
            DynamicImage::ImageRgb8(render::weak_strong(&detection.weak, &detection.strong)?)
        }
        RenderPolicy::Original => {
            DynamicImage::ImageRgb8(render::over_original(&detection.edges, original)?)
        }
    };
    Ok(image)
}

fn output_path(args: &Args, kind: DetectorKind) -> PathBuf {
    let stem = args
        .input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let file_name = format!("{stem}_{}.png", kind.name());
    match (&args.output, args.all) {
        (Some(path), false) => path.clone(),
        (Some(dir), true) => dir.join(file_name),
        (None, _) => args
            .input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(file_name),
    }
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    init_logging(args.verbose)?;
    let config = load_config(&args)?;

    let original = image::open(&args.input)
        .with_context(|| format!("decoding {}", args.input.display()))?;
    let gray = original.to_luma8();
    let rgb = original.to_rgb8();
    let grid = render::intensity_grid(&gray)?;
    info!(
        "loaded {} ({}x{})",
        args.input.display(),
        grid.cols(),
        grid.rows()
    );

    if args.render == RenderPolicy::WeakStrong
        && !args.all
        && args.detector != DetectorKind::Canny
    {
        warn!(
            "{} has no weak edges; every edge renders as strong",
            args.detector
        );
    }
    if args.all {
        if let Some(dir) = &args.output {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
    }

    let kinds: Vec<DetectorKind> = if args.all {
        DetectorKind::ALL.to_vec()
    } else {
        vec![args.detector]
    };

    // independent pipelines, one per detector
    let rendered: Vec<(DetectorKind, Result<DynamicImage>)> = kinds
        .par_iter()
        .map(|&kind| {
            let image = run(kind, &grid, &config)
                .and_then(|detection| paint(&detection, args.render, &rgb));
            (kind, image)
        })
        .collect();

    for (kind, image) in rendered {
        let image = image.with_context(|| format!("running {kind}"))?;
        let path = output_path(&args, kind);
        image
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("{kind}: wrote {}", path.display());
    }
    Ok(())
}
