use clap::{Parser, Subcommand};
use grievance_cli::CliContext;
use grievance_cli::commands;
use grievance_cli::logging;
use grievance_cli::readline;
use std::io::Write;
use std::path::PathBuf;

/// Startup flags; both paths are loaded before the prompt appears.
#[derive(Parser)]
#[command(version, about = "Shelter grievance timeline explorer")]
struct Args {
    #[arg(long)]
    primary: Option<PathBuf>,
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Load the dataset paths from the config file
    #[arg(long)]
    defaults: bool,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let args = Args::parse();
    let ctx = CliContext::new();

    let sources = match (args.primary, args.defaults) {
        (Some(primary), _) => Some((primary, args.summary)),
        (None, true) => {
            let (primary, summary) = commands::default_sources(&ctx).await;
            Some((primary, Some(args.summary.unwrap_or(summary))))
        }
        (None, false) => None,
    };
    if let Some((primary, summary)) = sources
        && let Err(err) = commands::load(&primary, summary.as_deref(), &ctx).await
    {
        write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
    }

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "cli")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the grievance timeline and, optionally, the category summary
    Load {
        #[arg(short, long)]
        primary: PathBuf,
        #[arg(short, long)]
        summary: Option<PathBuf>,
    },
    Frames,
    Steps,
    /// Activate a narrative step
    Step { index: usize },
    /// Resize the graphic container
    Resize {
        width: f64,
        height: f64,
        /// Browser window width; defaults to the container width
        #[arg(short, long)]
        window_width: Option<f64>,
    },
    Hover { shelter: String, x: f64, y: f64 },
    Leave,
    /// Write the current frame as SVG
    Render {
        #[arg(short, long)]
        out: PathBuf,
    },
    Breakdown {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    Config,
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "grievance".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Load { primary, summary }) => {
            commands::load(primary, summary.as_deref(), ctx).await?
        }
        Some(Commands::Frames) => commands::list_frames(ctx).await?,
        Some(Commands::Steps) => commands::list_steps(ctx).await?,
        Some(Commands::Step { index }) => commands::step(*index, ctx).await?,
        Some(Commands::Resize {
            width,
            height,
            window_width,
        }) => commands::resize(*width, *height, *window_width, ctx).await?,
        Some(Commands::Hover { shelter, x, y }) => commands::hover(shelter, *x, *y, ctx).await?,
        Some(Commands::Leave) => commands::leave(ctx).await?,
        Some(Commands::Render { out }) => commands::render(out, ctx).await?,
        Some(Commands::Breakdown { out }) => commands::breakdown(out.as_deref(), ctx).await?,
        Some(Commands::Config) => commands::show_settings(ctx).await?,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
