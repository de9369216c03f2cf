use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use playlist_bridge::{
    cli,
    config::{self, Settings},
    convert::ConversionRequest,
    error, logging,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Log filter, e.g. `debug` or `playlist_bridge=debug` (overrides LOG_LEVEL)
    #[clap(long, global = true)]
    log_level: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert an Apple Music playlist into a Spotify playlist
    Convert(ConvertOptions),

    /// Fetch the tracks of an Apple Music playlist into a JSON file
    Fetch(FetchOptions),

    /// Run the REST API for the web frontend
    Serve,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ConvertOptions {
    /// URL of the Apple Music playlist
    #[clap(long)]
    url: String,

    /// Name of the Spotify playlist to create or fill
    #[clap(long)]
    name: String,

    /// Description used when the playlist has to be created
    #[clap(long)]
    description: Option<String>,

    /// Create the playlist as public
    #[clap(long)]
    public: bool,

    /// Spotify access token; skips the interactive authorization
    #[clap(long)]
    access_token: Option<String>,

    /// Apple Music token; skips reading it from the playlist page
    #[clap(long)]
    apple_token: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct FetchOptions {
    /// URL of the Apple Music playlist
    #[clap(long)]
    url: String,

    /// Where to write the track list (defaults to `<SNAPSHOT_DIR>/<playlist id>.json`)
    #[clap(long)]
    output: Option<PathBuf>,

    /// Apple Music token; skips reading it from the playlist page
    #[clap(long)]
    apple_token: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    let log_level = cli.log_level.as_deref().unwrap_or(&settings.log_level);
    if let Err(e) = logging::init_tracing(log_level) {
        error!("Cannot initialise logging. Err: {}", e);
    }

    match cli.command {
        Command::Convert(opt) => {
            let request = ConversionRequest {
                source_url: opt.url,
                playlist_name: opt.name,
                description: opt
                    .description
                    .unwrap_or_else(|| settings.default_description.clone()),
                public: opt.public,
            };
            cli::convert(&settings, request, opt.access_token, opt.apple_token).await
        }
        Command::Fetch(opt) => cli::fetch(&settings, &opt.url, opt.output, opt.apple_token).await,
        Command::Serve => cli::serve(settings).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
