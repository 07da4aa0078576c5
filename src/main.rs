use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use takahashi::core::config::{self, CliOverrides};
use takahashi::core::document;
use takahashi::core::outline::IndentMode;
use takahashi::core::state::App;
use takahashi::{Provider, tui};

#[derive(Parser)]
#[command(name = "takahashi", about = "Turn prose into Takahashi-method slides")]
struct Args {
    /// LLM provider to use (overrides config and TAKAHASHI_PROVIDER)
    #[arg(short, long, value_enum)]
    provider: Option<Provider>,

    /// Model to transform with (overrides config and TAKAHASHI_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Outline file to open and save to
    #[arg(short, long)]
    outline: Option<PathBuf>,

    /// How indented outline lines are read
    #[arg(long, value_enum)]
    indent_mode: Option<IndentMode>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to takahashi.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("takahashi.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().map_err(std::io::Error::other)?;
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            provider: args.provider.map(Provider::as_str),
            model: args.model.as_deref(),
            indent_mode: args.indent_mode,
        },
    );

    log::info!(
        "Takahashi starting up with provider {} and model {}",
        resolved.provider,
        resolved.model_name
    );

    let mut app = App::new(&resolved, &resolved.provider);
    if let Some(path) = args.outline {
        let text = document::load_outline(&path).map_err(std::io::Error::other)?;
        app = app.with_outline(path, text);
    }

    tui::run(resolved, app)
}
