//! CLI for Glass AI - prompt-to-image generation.

use clap::{Args, Parser, Subcommand, ValueEnum};
use glass_ai::server::{ErrorResponse, GenerateRequest, GenerateResponse, ServerConfig};
use glass_ai::{GenerationRequest, ImageProvider, ImageStore, ReplicateProvider, Scheduler};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "glass")]
#[command(about = "Generate images from text prompts via a hosted diffusion model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the generation HTTP server
    Serve,

    /// Generate an image directly, without a server
    Generate(GenerateArgs),

    /// Send a prompt to a running server and display the result
    Prompt(PromptArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt describing the image
    prompt: String,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Diffusion scheduler passed through to the model
    #[arg(long, value_enum)]
    scheduler: Option<SchedulerArg>,

    /// Number of denoising steps
    #[arg(long)]
    steps: Option<u32>,

    /// Negative prompt override
    #[arg(long)]
    negative_prompt: Option<String>,
}

#[derive(Args)]
struct PromptArgs {
    /// The text prompt; read from stdin when omitted
    prompt: Option<String>,

    /// Base URL of a running glass server
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Directory to download the generated image into
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SchedulerArg {
    KEuler,
    KEulerAncestral,
    Ddim,
    DpmSolverMultistep,
    HeunDiscrete,
    KarrasDpm,
    Pndm,
}

impl From<SchedulerArg> for Scheduler {
    fn from(arg: SchedulerArg) -> Self {
        match arg {
            SchedulerArg::KEuler => Scheduler::KEuler,
            SchedulerArg::KEulerAncestral => Scheduler::KEulerAncestral,
            SchedulerArg::Ddim => Scheduler::Ddim,
            SchedulerArg::DpmSolverMultistep => Scheduler::DpmSolverMultistep,
            SchedulerArg::HeunDiscrete => Scheduler::HeunDiscrete,
            SchedulerArg::KarrasDpm => Scheduler::KarrasDpm,
            SchedulerArg::Pndm => Scheduler::Pndm,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let config = ServerConfig::load()?;
            glass_ai::server::serve(config).await?;
        }
        Commands::Generate(args) => generate(args).await?,
        Commands::Prompt(args) => prompt(args).await?,
    }

    Ok(())
}

async fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut request = GenerationRequest::new(&args.prompt);
    if let Some(scheduler) = args.scheduler {
        request = request.with_scheduler(scheduler.into());
    }
    if let Some(steps) = args.steps {
        request = request.with_num_inference_steps(steps);
    }
    if let Some(negative_prompt) = args.negative_prompt {
        request = request.with_negative_prompt(negative_prompt);
    }

    let provider = ReplicateProvider::builder().build()?;
    let result = provider.generate(&request).await?;
    let bytes = provider.download(&result.image_url).await?;
    std::fs::write(&args.output, &bytes)?;

    println!(
        "{} ({} bytes) -> {}",
        result.image_url,
        bytes.len(),
        args.output.display()
    );
    Ok(())
}

async fn prompt(args: PromptArgs) -> anyhow::Result<()> {
    let prompt = match args.prompt {
        Some(arg) => normalize_prompt(Some(arg)),
        None => {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            normalize_prompt(Some(line))
        }
    };
    let Some(prompt) = prompt else {
        // An empty prompt never reaches the server.
        anyhow::bail!("prompt is empty, nothing to generate");
    };

    let ticker = spawn_ticker();

    let client = reqwest::Client::new();
    let response = client
        .post(format!(
            "{}/api/generate",
            args.server.trim_end_matches('/')
        ))
        .json(&GenerateRequest { prompt })
        .send()
        .await;

    ticker.abort();
    eprintln!();

    let response = response?;
    if !response.status().is_success() {
        let status = response.status();
        let body: ErrorResponse = response.json().await.unwrap_or_else(|_| ErrorResponse {
            error: format!("server returned HTTP {status}"),
            details: None,
        });
        anyhow::bail!(
            "{}{}",
            body.error,
            body.details
                .map(|details| format!(": {details}"))
                .unwrap_or_default()
        );
    }

    let body: GenerateResponse = response.json().await?;
    println!("image: {}", body.image_url);
    if let Some(path) = &body.image_path {
        println!("saved by server: {path}");
    }

    if let Some(dir) = args.save {
        // The image is already displayed by URL; a failed local download is
        // logged and otherwise ignored.
        match download_to(&dir, &body.image_url).await {
            Ok(path) => println!("downloaded: {}", path.display()),
            Err(err) => tracing::warn!(error = %err, "failed to download image"),
        }
    }

    Ok(())
}

/// Trims the prompt and rejects empty input before any request is made.
fn normalize_prompt(prompt: Option<String>) -> Option<String> {
    let prompt = prompt?.trim().to_string();
    if prompt.is_empty() {
        None
    } else {
        Some(prompt)
    }
}

/// Cosmetic progress ticker on stderr while the request is in flight.
fn spawn_ticker() -> tokio::task::JoinHandle<()> {
    tokio::spawn(async {
        const BLOCKS: [char; 4] = ['░', '▒', '▓', '█'];
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.subsec_nanos())
                .unwrap_or(0);
            eprint!("{}", BLOCKS[nanos as usize % BLOCKS.len()]);
            let _ = std::io::stderr().flush();
        }
    })
}

async fn download_to(dir: &Path, url: &str) -> anyhow::Result<PathBuf> {
    let store = ImageStore::new(dir)?;
    Ok(store.save(url).await?)
}
