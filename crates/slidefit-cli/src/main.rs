use anyhow::{Result, anyhow};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

/// Fit the image matrix onto each slide, keeping image aspect ratio.
/// All images are assumed to have the same ratio as the first image.
/// Images are added row-wise.
#[derive(Parser, Debug)]
#[command(name = "slidefit", about = "Fit images into slides", version)]
struct Cli {
    /// Images to merge into the slides, in order, one matrix per slide
    #[arg(value_name = "IMG")]
    images: Vec<PathBuf>,

    /// Rows and columns to put on each slide, as ROWS,COLS [default: 1,1]
    #[arg(short, long, value_name = "ROWS,COLS")]
    matrix: Option<String>,

    /// Output PDF file [default: slidefit-output.pdf]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Template PDF whose pages receive the images
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Template pages to use, e.g. 2,5-7,9-12 (first page is 1).
    /// Ignored without --template
    #[arg(short, long)]
    pages: Option<String>,

    /// Percent of the slide height reserved at TOP,BOTTOM [default: 0,0]
    #[arg(short = 'y', long, value_name = "TOP,BOTTOM")]
    vspace: Option<String>,

    /// Percent of the slide width reserved at LEFT,RIGHT [default: 0,0]
    #[arg(short = 'x', long, value_name = "LEFT,RIGHT")]
    hspace: Option<String>,

    /// Slide size when no template is given [default: standard]
    #[arg(long, value_enum)]
    canvas: Option<CanvasArg>,

    /// Slide orientation when no template is given [default: landscape]
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Resolution for images that declare none [default: 72]
    #[arg(long)]
    dpi: Option<f32>,

    /// Load options from a JSON file; other flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the resolved options to a JSON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Show statistics only, don't generate PDF
    #[arg(long)]
    stats_only: bool,

    /// Show resolved options and pages and exit
    #[arg(short, long)]
    debug: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CanvasArg {
    Standard,
    Widescreen,
    A4,
    Letter,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrientationArg {
    Landscape,
    Portrait,
}

impl From<CanvasArg> for slidefit::CanvasPreset {
    fn from(arg: CanvasArg) -> Self {
        match arg {
            CanvasArg::Standard => Self::Standard,
            CanvasArg::Widescreen => Self::Widescreen,
            CanvasArg::A4 => Self::A4,
            CanvasArg::Letter => Self::Letter,
        }
    }
}

impl From<OrientationArg> for slidefit::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Landscape => Self::Landscape,
            OrientationArg::Portrait => Self::Portrait,
        }
    }
}

/// Parse an "A,B" option value
fn number_pair<T: FromStr>(option: &str, value: &str) -> Result<(T, T)> {
    let bad = || anyhow!("Bad argument for {} \"{}\"", option, value);
    let (a, b) = value.split_once(',').ok_or_else(bad)?;
    let a = a.trim().parse().map_err(|_| bad())?;
    let b = b.trim().parse().map_err(|_| bad())?;
    Ok((a, b))
}

impl Cli {
    /// Apply command-line flags on top of loaded or default options
    fn apply(&self, options: &mut slidefit::SlideFitOptions) -> Result<()> {
        if !self.images.is_empty() {
            options.images = self.images.clone();
        }
        if let Some(matrix) = &self.matrix {
            let (rows, cols) = number_pair("--matrix", matrix)?;
            options.grid = slidefit::GridShape { rows, cols };
        }
        if let Some(output) = &self.output {
            options.output = output.clone();
        }
        if let Some(template) = &self.template {
            options.template = Some(template.clone());
        }
        if let Some(pages) = &self.pages {
            options.pages = Some(pages.clone());
        }
        if let Some(vspace) = &self.vspace {
            let (top, bottom) = number_pair("--vspace", vspace)?;
            options.reserved.top_percent = top;
            options.reserved.bottom_percent = bottom;
        }
        if let Some(hspace) = &self.hspace {
            let (left, right) = number_pair("--hspace", hspace)?;
            options.reserved.left_percent = left;
            options.reserved.right_percent = right;
        }
        if let Some(canvas) = self.canvas {
            options.canvas = canvas.into();
        }
        if let Some(orientation) = self.orientation {
            options.orientation = orientation.into();
        }
        if let Some(dpi) = self.dpi {
            options.dpi = dpi;
        }
        Ok(())
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn print_statistics(stats: &slidefit::LayoutStatistics) {
    println!("Layout Statistics:");
    println!("  Images: {}", stats.images);
    println!("  Images per slide: {}", stats.images_per_canvas);
    println!("  Slides: {}", stats.canvases);
    println!("  Template slides used: {}", stats.reused_canvases);
    println!("  Slides added: {}", stats.new_canvases);
    println!("  Capacity: {}", stats.capacity);
    println!("  Images placed: {}", stats.images_placed);
    if stats.images_dropped > 0 {
        println!("  Images dropped: {}", stats.images_dropped);
    }
    if stats.truncated {
        println!("  Template pages missing: yes");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("slidefit: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let mut options = match &cli.config {
        Some(path) => slidefit::SlideFitOptions::load(path).await?,
        None => slidefit::SlideFitOptions::default(),
    };
    cli.apply(&mut options)?;

    if cli.debug {
        println!("{:#?}", options);
        if options.template.is_some() {
            if let Some(pages) = options.page_selection()? {
                println!("{:?}", pages.indices().collect::<Vec<_>>());
            }
        }
        return Ok(());
    }

    if let Some(path) = &cli.save_config {
        options.save(path).await?;
        println!("Saved options → {}", path.display());
    }

    if cli.stats_only {
        let plan = slidefit::plan_run(&options).await?;
        print_statistics(&plan.statistics);
        return Ok(());
    }

    let composition = slidefit::compose(&options).await?;
    if log::log_enabled!(log::Level::Info) {
        print_statistics(composition.statistics());
    }

    let warnings = composition.warnings.len();
    slidefit::save_deck(composition.document, &options.output).await?;
    if warnings == 0 {
        println!("Saved {}", options.output.display());
    } else {
        println!(
            "Saved {} ({} warning{})",
            options.output.display(),
            warnings,
            if warnings == 1 { "" } else { "s" }
        );
    }

    Ok(())
}
