use anyhow::Result;
use clap::Parser;
use composer_link::commands::{self, Config, ConfigOverrides, LinkedScope};
use composer_link::runtime::RealRuntime;
use std::path::PathBuf;

/// composer-link - npm-link style local package linking for Composer projects
///
/// Register a package directory once, then link it into any project's vendor/
/// directory. The installed copy is kept aside and restored on unlink.
///
/// Examples:
///   composer-link link                  # Register the current directory
///   composer-link link ../widget        # Register another directory
///   composer-link link acme/widget      # Link a registered package here
///   composer-link unlink acme/widget    # Restore the installed package
#[derive(Parser, Debug)]
#[command(author, version = env!("COMPOSER_LINK_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global state directory (defaults to $XDG_DATA_HOME/composer/links or ~/.composer/links)
    #[arg(long = "state-dir", value_name = "PATH", global = true)]
    state_dir: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Register a package directory, or link a registered package into this project
    Link(LinkArgs),

    /// Remove a package link from this project and restore the installed version
    Unlink(UnlinkArgs),

    /// List packages linked into this project
    Linked(LinkedArgs),

    /// Print the global state directory
    StateDir,

    /// Delete all link registry data
    Purge(PurgeArgs),
}

#[derive(clap::Args, Debug)]
struct LinkArgs {
    /// Package directory to register, or vendor/package name to link
    #[arg(value_name = "PATH_OR_NAME")]
    path_or_name: Option<String>,
}

#[derive(clap::Args, Debug)]
struct UnlinkArgs {
    /// Package name in the format "vendor/package"
    #[arg(value_name = "PACKAGE")]
    package: String,
}

#[derive(clap::Args, Debug)]
struct LinkedArgs {
    /// Show globally registered packages
    #[arg(long, short = 'g', conflicts_with = "all")]
    global: bool,

    /// Show linked packages in every project
    #[arg(long, short = 'a')]
    all: bool,
}

#[derive(clap::Args, Debug)]
struct PurgeArgs {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    yes: bool,
}

impl LinkedArgs {
    fn scope(&self) -> LinkedScope {
        if self.all {
            LinkedScope::All
        } else if self.global {
            LinkedScope::Global
        } else {
            LinkedScope::Project
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    let config = Config::load(
        &runtime,
        ConfigOverrides {
            state_dir: cli.state_dir,
        },
    )?;

    match cli.command {
        Commands::Link(args) => commands::link(runtime, args.path_or_name.as_deref(), config)?,
        Commands::Unlink(args) => commands::unlink(runtime, &args.package, config)?,
        Commands::Linked(args) => commands::linked(runtime, args.scope(), config)?,
        Commands::StateDir => commands::state_dir(runtime, config)?,
        Commands::Purge(args) => commands::purge(runtime, args.yes, config)?,
    }
    Ok(())
}
