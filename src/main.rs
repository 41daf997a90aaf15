use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use catadm::cli::commands::{completions, config, entity, shell};
use catadm::cli::{Cli, Commands};
use catadm::entities::Entity;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(global.verbose, global.quiet);

    match cli.command {
        Commands::Category(cmd) => entity::run(Entity::Category, cmd, &global).await,
        Commands::Product(cmd) => entity::run(Entity::Product, cmd, &global).await,
        Commands::Supplier(cmd) => entity::run(Entity::Supplier, cmd, &global).await,
        Commands::Customer(cmd) => entity::run(Entity::Customer, cmd, &global).await,
        Commands::Shell(args) => shell::run(args, &global).await,
        Commands::Config(cmd) => config::run(cmd, &global),
        Commands::Completions(args) => completions::run(args),
    }
}

/// Logs go to stderr; `RUST_LOG` wins over the flags
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("catadm=debug,warn")
    } else {
        EnvFilter::new("warn")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
