use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use weatherplay::{cli, config, error};

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
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth(AuthOptions),

    /// Show the current weather of a city and its playlist
    Weather(CityOptions),

    /// Play the playlist matching the weather of a city
    Play(PlayOptions),

    /// Pause playback
    Pause,

    /// Resume playback
    Resume,

    /// Skip to the next track
    Next,

    /// Go back to the previous track
    Previous,

    /// Save the playing track to your library
    Save,

    /// Turn shuffle on or off
    Shuffle(ShuffleOptions),

    /// Show the playing track
    NowPlaying,

    /// List weather codes with their theme and playlist
    Themes,

    #[clap(about = "Run the Spotify proxy relay")]
    Proxy,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Redirect URL copied from the browser, skips the local callback server
    #[clap(long)]
    redirect_url: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CityOptions {
    city: String,
}

#[derive(Parser, Debug, Clone)]
pub struct PlayOptions {
    city: String,

    /// Name of the Spotify Connect device to play on
    #[clap(long)]
    device: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Parser, Debug, Clone)]
pub struct ShuffleOptions {
    state: Toggle,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Proxy => init_tracing("info"),
        _ => init_tracing("warn"),
    }

    match cli.command {
        Command::Auth(opt) => cli::auth(opt.redirect_url).await,
        Command::Weather(opt) => cli::weather(opt.city).await,
        Command::Play(opt) => cli::play(opt.city, opt.device).await,
        Command::Pause => cli::pause().await,
        Command::Resume => cli::resume().await,
        Command::Next => cli::next().await,
        Command::Previous => cli::previous().await,
        Command::Save => cli::save().await,
        Command::Shuffle(opt) => cli::shuffle(matches!(opt.state, Toggle::On)).await,
        Command::NowPlaying => cli::now_playing().await,
        Command::Themes => cli::themes().await,
        Command::Proxy => cli::proxy().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
