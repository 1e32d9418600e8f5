use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use restable::ResTableConfig;

use crate::commands::{command_completions, command_config, command_dump, command_get};

mod commands;

#[derive(Parser)]
#[command(version, about, arg_required_else_help(true))]
struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show packages, types and configurations of `resources.arsc` files
    Dump {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Resolve a single resource
    Get {
        #[arg(required = true)]
        path: PathBuf,

        /// Resource id (`0x7f040001`) or name (`[package:]type/entry`)
        #[arg(required = true)]
        resource: String,

        #[arg(short, long, help = "Requested configuration, e.g. `de-rDE-land`")]
        config: Option<ResTableConfig>,

        #[arg(short, long, default_value_t = 0, help = "Override the requested density")]
        density: u16,

        #[arg(long, default_value_t = false, help = "Print result as json")]
        json: bool,

        #[arg(
            long,
            default_value_t = false,
            help = "Don't follow references to other resources"
        )]
        no_resolve: bool,
    },
    /// Parse a qualifier string and print the resulting configuration
    Config {
        #[arg(required = true)]
        qualifiers: String,

        #[arg(
            long,
            default_value_t = false,
            help = "Raise sdk version to the release that introduced the qualifiers"
        )]
        compat: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(required = true)]
        shell: Shell,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.commands {
        Some(Commands::Dump { paths }) => command_dump(paths),
        Some(Commands::Get {
            path,
            resource,
            config,
            density,
            json,
            no_resolve,
        }) => command_get(path, resource, config.as_ref(), *density, *json, !*no_resolve),
        Some(Commands::Config { qualifiers, compat }) => command_config(qualifiers, *compat),
        Some(Commands::Completions { shell }) => {
            command_completions(*shell, &mut Cli::command());
            Ok(())
        }
        None => Ok(()),
    };

    if let Err(err) = result {
        eprintln!("{:#}", err);
    }
}
