use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use storyweave::{
    AssetCache, AssetCacheOpts, CancelToken, Encoder, Generator, Pipeline, Project, SceneEncoder,
    TextEncoder,
};

#[derive(Parser, Debug)]
#[command(name = "storyweave", version)]
struct Cli {
    /// Log generation progress to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a project into a storyboard.
    Build(BuildArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output file.
    #[arg(long)]
    out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Osb)]
    format: Format,

    /// Directory generated assets are written to (defaults to the project's directory).
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Shift x coordinates for the 16:9 playfield.
    #[arg(long)]
    widescreen: bool,

    /// Export target; overrides the project's.
    #[arg(long)]
    target: Option<String>,

    /// Script worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Legacy storyboard text.
    Osb,
    /// Scene graph as JSON.
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    match cli.cmd {
        Command::Build(args) => cmd_build(args),
    }
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<()> {
    let mut project = Project::from_path(&args.in_path)?;
    if args.widescreen {
        project.config.widescreen = true;
    }
    if args.target.is_some() {
        project.config.export_target = args.target.clone();
    }

    let assets_root = args.assets_root.clone().unwrap_or_else(|| {
        args.in_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    });
    let cache = if project.scripts.iter().any(|s| !s.assets.is_empty()) {
        Some(Arc::new(AssetCache::new(
            assets_root,
            AssetCacheOpts::default(),
        )?))
    } else {
        None
    };

    let pipeline = Pipeline::from_config(&project.config, cache.clone())?;
    let generator = Generator::new(project.generator_opts(args.threads));
    let scripts = project.scripts();
    let cancel = CancelToken::new();

    let text = match args.format {
        Format::Osb => {
            let out = build(&generator, &scripts, &pipeline, TextEncoder::new(), &cancel)?;
            out.render()
        }
        Format::Json => {
            let out = build(&generator, &scripts, &pipeline, SceneEncoder::new(), &cancel)?;
            out.to_json()?
        }
    };

    if let Some(cache) = cache
        && !cache.wait_settled(Duration::from_secs(60))
    {
        eprintln!("warning: asset materialization did not settle in time");
    }

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, text)
        .with_context(|| format!("write output '{}'", args.out.display()))?;
    Ok(())
}

fn build<E: Encoder>(
    generator: &Generator,
    scripts: &[Box<dyn storyweave::Script>],
    pipeline: &Pipeline,
    mut encoder: E,
    cancel: &CancelToken,
) -> anyhow::Result<E::Context> {
    let outcome = generator.generate(scripts, pipeline, &mut encoder, cancel)?;
    for fault in &outcome.faults {
        eprintln!("{fault}");
    }
    Ok(outcome.result)
}
