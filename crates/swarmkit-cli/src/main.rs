use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use swarmkit_cli::demos::{self, Category, Models};
use swarmkit_cli::repl::ChatRepl;
use swarmkit_cli::ChatSession;
use swarmkit_core::{RunOptions, Settings};

#[derive(Parser)]
#[command(name = "swarmkit")]
#[command(about = "swarmkit - multi-agent chat examples over mock business domains")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available examples
    List,
    /// Start an interactive session with one example
    Run {
        /// Example id, as shown by `list`
        id: String,

        /// Run every agent on this model
        #[arg(short, long)]
        model: Option<String>,

        /// Stream replies token by token
        #[arg(long)]
        stream: bool,

        /// Verbose logging of the run loop
        #[arg(long)]
        debug: bool,

        /// Upper bound on model calls per turn
        #[arg(long)]
        max_turns: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load();

    let debug = match &cli.command {
        Command::Run { debug, .. } => *debug || settings.run.debug,
        Command::List => false,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if debug { "debug" } else { "warn" })
            }),
        )
        .with_target(false)
        .init();

    match cli.command {
        Command::List => list(),
        Command::Run {
            id,
            model,
            stream,
            max_turns,
            ..
        } => {
            let Some(demo) = demos::find(&id) else {
                bail!("Unknown example '{id}'. Run `swarmkit list` to see the examples.");
            };
            let models = Models {
                default: settings.llm.default_model.clone(),
                fast: settings.llm.fast_model.clone(),
            };
            let client = settings.build_client()?;

            let mut options = RunOptions::default()
                .with_stream(stream || settings.run.stream)
                .with_max_turns(max_turns.unwrap_or(settings.run.max_turns));
            if let Some(model) = model {
                options = options.with_model_override(model);
            }

            tracing::debug!(example = demo.id, "starting session");
            let session = ChatSession::new(demo.build(&models), client).with_options(options);
            ChatRepl::new(session)?.run().await
        }
    }
}

fn list() -> Result<()> {
    for category in [Category::General, Category::Support] {
        println!("{}:", category.to_string().to_uppercase());
        for demo in demos::catalog().iter().filter(|d| d.category == category) {
            println!("  {:<20} {}", demo.id, demo.title);
        }
        println!();
    }
    Ok(())
}
