use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ogcard", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve cards over HTTP.
    Serve(ServeArgs),
    /// Render one card from a saved HTML page (no network, no cache).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// Regenerate every card instead of serving cached files.
    #[arg(long)]
    dev: bool,

    /// Override the configured cache directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Override the configured renderer name.
    #[arg(long)]
    renderer: Option<String>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Saved HTML page.
    #[arg(long)]
    html: PathBuf,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,

    /// Configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured renderer name.
    #[arg(long)]
    renderer: Option<String>,

    /// Also write the layout plan as JSON.
    #[arg(long)]
    plan_json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("ogcard=warn"),
        1 => EnvFilter::new("ogcard=info,tower_http=info"),
        _ => EnvFilter::new("ogcard=debug,tower_http=debug"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ogcard::CardConfig> {
    match path {
        Some(p) => Ok(ogcard::CardConfig::from_path(p)?),
        None => Ok(ogcard::CardConfig::default()),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.dev {
        config.force_regenerate = true;
    }
    if let Some(dir) = args.cache_dir {
        config.cache_dir = dir;
    }
    if let Some(name) = args.renderer {
        config.renderer = name;
    }
    config.validate()?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    rt.block_on(async move {
        let service = Arc::new(ogcard::CardService::from_config(config)?);
        let listener = tokio::net::TcpListener::bind(&args.bind)
            .await
            .with_context(|| format!("bind {}", args.bind))?;
        ogcard::server::http::serve(service, listener).await?;
        Ok::<_, anyhow::Error>(())
    })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(name) = args.renderer {
        config.renderer = name;
    }
    config.validate()?;

    let html = std::fs::read_to_string(&args.html)
        .with_context(|| format!("read html '{}'", args.html.display()))?;
    let canvas = config.canvas()?;
    let fonts = ogcard::FontBook::load(&config.fonts);
    let renderer = ogcard::RendererRegistry::with_builtins().get(&config.renderer)?;

    let page = ogcard::PreparedPage::from_html(&html, &config);
    let bytes = renderer.render(&page.meta, &page.context(&config, canvas, &fonts))?;
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("write card '{}'", args.out.display()))?;

    if let Some(plan_path) = args.plan_json {
        let plan = page
            .plan(renderer.as_ref(), &config, canvas, &fonts)
            .with_context(|| format!("renderer '{}' has no layout plan", config.renderer))?;
        let f = File::create(&plan_path)
            .with_context(|| format!("create '{}'", plan_path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(f), &plan).context("write plan JSON")?;
    }

    eprintln!(
        "wrote {} ({} bytes, {}x{})",
        args.out.display(),
        bytes.len(),
        canvas.width,
        canvas.height
    );
    Ok(())
}
