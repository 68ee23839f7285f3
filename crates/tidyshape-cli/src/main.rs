//! Tidyshape CLI - reshape, join and summarize measurement tables.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Melt {
            file,
            ids,
            variable_name,
            value_name,
            drop_absent,
            output,
        } => commands::melt::run(
            config,
            file,
            ids,
            variable_name,
            value_name,
            drop_absent,
            output,
        ),

        Commands::Cast {
            file,
            ids,
            key,
            value,
            output,
        } => commands::cast::run(config, file, ids, key, value, output),

        Commands::Extract {
            file,
            column,
            pattern,
            groups,
            partitions,
            lenient,
            output,
        } => commands::extract::run(
            config, file, column, pattern, groups, partitions, lenient, output,
        ),

        Commands::Join {
            left,
            right,
            keys,
            no_match_absent,
            output,
        } => commands::join::run(config, left, right, keys, no_match_absent, output),

        Commands::Aggregate {
            file,
            by,
            aggs,
            output,
        } => commands::aggregate::run(config, file, by, aggs, output),

        Commands::Corr {
            file,
            columns,
            method,
            output,
        } => commands::corr::run(config, file, columns, method.map(|m| m.0), output),

        Commands::Rank {
            file,
            id,
            key,
            descending,
            apply,
            output,
        } => commands::rank::run(config, file, id, key, descending, apply, output),

        Commands::Describe { file, json } => commands::describe::run(config, file, json),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
