use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spot2yt::{cli, config, error};

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
    Auth,

    /// Remove the stored Spotify token
    Logout,

    /// Store YouTube Music browser headers
    Setup(SetupOptions),

    /// Copy a Spotify playlist to YouTube Music
    Migrate(PlaylistOptions),

    /// Show mood and genres of a Spotify playlist
    Analyze(PlaylistOptions),

    /// Run the local web server
    Serve,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SetupOptions {
    /// JSON object of request headers
    #[clap(long, conflicts_with = "headers_file")]
    pub browser_json: Option<PathBuf>,

    /// Raw request headers copied from the browser, one `Name: value` per line
    #[clap(long)]
    pub headers_file: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistOptions {
    /// Playlist URL, spotify:playlist: URI or id
    pub playlist: String,
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

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Logout => cli::logout().await,
        Command::Setup(opt) => cli::setup(opt.browser_json, opt.headers_file).await,
        Command::Migrate(opt) => cli::migrate(opt.playlist).await,
        Command::Analyze(opt) => cli::analyze(opt.playlist).await,
        Command::Serve => cli::serve().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
