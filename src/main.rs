//! cardgen - AI card generation binary
//!
//! Generates themed cards with a chat model, renders them through Magic Set
//! Editor and exports Tabletop Simulator decks.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use mtg_card_gen::{
    config::{OutputLayout, RendererSettings, Settings, DEFAULT_BACK_URL, DEFAULT_RENDER_TIMEOUT},
    core::CardRecord,
    generate::{extract_object, normalize, RetryPolicy},
    render::{set_document, CardRenderer, MseRenderer},
    services::{
        openai, stable_diffusion, ImageBackend, ImageService, ImgurClient, OpenAiClient,
        ScryfallClient, StableDiffusionClient,
    },
    session::{deck_export_path, export_set_deck, generate_set, GeneratedSet, SessionOptions},
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Verbosity level for log output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(LevelFilter);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(LevelFilter::OFF)),
            "minimal" | "1" => Ok(VerbosityArg(LevelFilter::WARN)),
            "normal" | "2" => Ok(VerbosityArg(LevelFilter::INFO)),
            "verbose" | "3" => Ok(VerbosityArg(LevelFilter::DEBUG)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

#[derive(Parser)]
#[command(name = "cardgen")]
#[command(about = "Generate, render and deck up AI-made Magic: The Gathering cards", long_about = None)]
struct Cli {
    /// Verbosity level for log output (0=silent, 1=minimal, 2=normal, 3=verbose)
    #[arg(long, short = 'v', global = true, default_value = "normal")]
    verbosity: VerbosityArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate themed cards and render them
    Cards {
        #[command(flatten)]
        generate: GenerateArgs,
    },

    /// Generate and render cards, then build and export a deck around them
    Deck {
        #[command(flatten)]
        generate: GenerateArgs,

        /// Imgur client id used to publish rendered cards
        #[arg(long, env = "IMGUR_CLIENT_ID", hide_env_values = true)]
        imgur_client_id: Option<String>,

        /// Card back image shared by every card in the deck
        #[arg(long, env = "CARDGEN_BACK_URL", default_value = DEFAULT_BACK_URL)]
        back_url: String,
    },

    /// Parse a saved model reply and print the normalized card
    Parse {
        /// File holding the raw reply text
        #[arg(value_name = "REPLY_FILE")]
        file: PathBuf,

        /// Print the set document instead of JSON
        #[arg(long)]
        set_file: bool,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Theme every card should share
    #[arg(long, short = 't', default_value = "cow tribal")]
    theme: String,

    /// Number of cards to generate
    #[arg(long, short = 'n', default_value = "2", value_parser = parse_count)]
    count: usize,

    /// Image backend for card art
    #[arg(long, value_enum, default_value = "dalle")]
    backend: ImageBackend,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = openai::DEFAULT_BASE_URL)]
    openai_base_url: String,

    /// Chat model
    #[arg(long, env = "CARDGEN_MODEL", default_value = openai::DEFAULT_MODEL)]
    model: String,

    /// Token cap for each chat reply
    #[arg(long, default_value_t = openai::DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Stable Diffusion txt2img endpoint
    #[arg(long, env = "SD_URL", default_value = stable_diffusion::DEFAULT_URL)]
    sd_url: String,

    /// Stable Diffusion sampling steps
    #[arg(long, default_value_t = stable_diffusion::DEFAULT_STEPS)]
    sd_steps: u32,

    /// Give up after this many unparseable replies to one request (default: never)
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Output directory
    #[arg(long, env = "CARDGEN_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Path overwritten with every new render
    #[arg(long, default_value = "newest-card.png")]
    latest: PathBuf,

    /// Magic Set Editor directory (renderer working directory)
    #[arg(long, env = "MSE_DIR", default_value = "mse")]
    mse_dir: PathBuf,

    /// Magic Set Editor executable
    #[arg(long, env = "MSE_BIN", default_value = "mse.exe")]
    mse_bin: PathBuf,

    /// Seconds to wait for each render
    #[arg(long, default_value_t = DEFAULT_RENDER_TIMEOUT.as_secs())]
    render_timeout: u64,
}

impl GenerateArgs {
    fn settings(&self, imgur_client_id: Option<String>, back_url: String) -> anyhow::Result<Settings> {
        Ok(Settings {
            openai_api_key: self.openai_api_key.clone(),
            openai_base_url: self.openai_base_url.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            stable_diffusion_url: self.sd_url.clone(),
            stable_diffusion_steps: self.sd_steps,
            imgur_client_id,
            back_url,
            output: OutputLayout::new(&self.output_dir, &self.latest)?,
            renderer: RendererSettings {
                dir: self.mse_dir.clone(),
                program: self.mse_bin.clone(),
                timeout: Duration::from_secs(self.render_timeout),
            },
        })
    }

    fn options(&self) -> SessionOptions {
        SessionOptions {
            theme: self.theme.clone(),
            count: self.count,
            retry: match self.max_attempts {
                Some(max) => RetryPolicy::at_most(max),
                None => RetryPolicy::unbounded(),
            },
        }
    }
}

fn parse_count(s: &str) -> std::result::Result<usize, String> {
    let count = s
        .parse::<usize>()
        .map_err(|_| format!("invalid card count '{s}' (expected positive integer)"))?;
    if count == 0 {
        return Err("card count must be greater than 0".to_string());
    }
    Ok(count)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before parsing so `env = ...` arguments see it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbosity.0);

    match cli.command {
        Commands::Cards { generate } => {
            let settings = generate.settings(None, DEFAULT_BACK_URL.to_string())?;
            let set = run_generate(&settings, generate.backend, &generate.options()).await?;
            for generated in &set.cards {
                match &generated.render {
                    Some(render) => println!("{}\t{}", render.image.path.display(), generated.card.name),
                    None => println!("(not rendered)\t{}", generated.card.name),
                }
            }
        }
        Commands::Deck {
            generate,
            imgur_client_id,
            back_url,
        } => {
            let settings = generate.settings(imgur_client_id, back_url)?;
            let client_id = settings.require_imgur_client_id()?.to_string();
            let options = generate.options();

            let set = run_generate(&settings, generate.backend, &options).await?;
            if set.cards.iter().all(|c| c.render.is_none()) {
                bail!("no card could be rendered");
            }

            let client = http_client()?;
            let text = text_client(&client, &settings);
            let export = export_set_deck(
                &text,
                &ImgurClient::new(client.clone(), client_id),
                &ScryfallClient::new(client),
                set,
                options.retry,
                &settings.back_url,
                deck_export_path(&settings.output).await?,
            )
            .await?;

            for name in &export.skipped {
                eprintln!("skipped (no art): {name}");
            }
            println!("{}", export.path.display());
        }
        Commands::Parse { file, set_file } => {
            let reply = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let Some(record) = extract_object::<CardRecord>(&reply).filter(|r| !r.is_empty()) else {
                bail!("no card record found in {}", file.display());
            };
            let card = normalize(record)?;

            if set_file {
                print!("{}", set_document(&card));
            } else {
                println!("{}", serde_json::to_string_pretty(&card)?);
            }
        }
    }

    Ok(())
}

fn init_logging(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .context("building HTTP client")
}

fn openai_client(client: &reqwest::Client, settings: &Settings) -> OpenAiClient {
    OpenAiClient::new(client.clone(), settings.openai_api_key.clone())
        .with_base_url(settings.openai_base_url.clone())
}

fn text_client(client: &reqwest::Client, settings: &Settings) -> OpenAiClient {
    openai_client(client, settings)
        .with_model(settings.model.clone())
        .with_max_tokens(settings.max_tokens)
}

async fn run_generate(
    settings: &Settings,
    backend: ImageBackend,
    options: &SessionOptions,
) -> anyhow::Result<GeneratedSet> {
    let client = http_client()?;
    let images = match backend {
        ImageBackend::Dalle => ImageService::Dalle(openai_client(&client, settings)),
        ImageBackend::StableDiffusion => ImageService::StableDiffusion(
            StableDiffusionClient::new(client.clone(), settings.stable_diffusion_url.clone())
                .with_steps(settings.stable_diffusion_steps),
        ),
    };

    let renderer = CardRenderer::new(
        images,
        MseRenderer::new(settings.renderer.clone(), settings.output.clone()),
        settings.output.clone(),
    );

    let text = text_client(&client, settings);
    let set = generate_set(&text, &renderer, options)
        .await
        .context("generating cards")?;
    Ok(set)
}
