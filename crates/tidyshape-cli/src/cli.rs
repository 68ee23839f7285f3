//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tidyshape::{CorrelationMethod, OutputFormat};

/// Tidyshape: reshape, join and summarize measurement tables
#[derive(Parser)]
#[command(name = "tidyshape")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file (reader, melt, join and extraction defaults)
    #[arg(long, global = true, value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

/// Where and how a result table is written.
#[derive(Args, Clone, Debug)]
pub struct OutputArgs {
    /// Output path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: tsv, csv or json (default: from the output extension)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collapse measurement columns into variable/value rows (wide to long)
    Melt {
        /// Path to the input table (TSV/CSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Identifier columns to keep (repeat or comma-separate)
        #[arg(short, long = "id", value_delimiter = ',')]
        ids: Vec<String>,

        /// Name of the variable column
        #[arg(long)]
        variable_name: Option<String>,

        /// Name of the value column
        #[arg(long)]
        value_name: Option<String>,

        /// Skip rows whose value is absent
        #[arg(long)]
        drop_absent: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Spread key/value rows into one column per key (long to wide)
    Cast {
        /// Path to the input table
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Identifier columns (repeat or comma-separate)
        #[arg(short, long = "id", value_delimiter = ',')]
        ids: Vec<String>,

        /// Column whose values become column names
        #[arg(short, long)]
        key: String,

        /// Column whose values fill the new columns
        #[arg(long)]
        value: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Split a label column into typed key columns
    Extract {
        /// Path to the input table
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Label column to split
        #[arg(short, long)]
        column: String,

        /// Pattern with named groups, e.g. "(?P<expt>[a-z]+)_(?P<time>\d+)"
        #[arg(short, long, required_unless_present = "partitions")]
        pattern: Option<String>,

        /// Target column as NAME=TYPE, in output order (repeatable)
        #[arg(short, long = "group", required = true)]
        groups: Vec<String>,

        /// Per-format pattern as MARKER=PATTERN; rows containing MARKER use PATTERN
        #[arg(long = "partition", conflicts_with = "pattern")]
        partitions: Vec<String>,

        /// Emit absent keys for labels that do not match instead of failing
        #[arg(long)]
        lenient: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Left-join a second table onto the first
    Join {
        /// Left table; every row is kept
        #[arg(value_name = "LEFT")]
        left: PathBuf,

        /// Right table supplying extra columns
        #[arg(value_name = "RIGHT")]
        right: PathBuf,

        /// Key as COLUMN or LEFT=RIGHT (repeat for multi-column keys)
        #[arg(long = "on", required = true)]
        keys: Vec<String>,

        /// Do not match absent keys with each other
        #[arg(long)]
        no_match_absent: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Reduce groups of rows to one row each
    Aggregate {
        /// Path to the input table
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Grouping columns (repeat or comma-separate; none = whole table)
        #[arg(short, long = "by", value_delimiter = ',')]
        by: Vec<String>,

        /// Output as NAME=REDUCTION(SOURCE), e.g. "peak=arg_max(level)"
        #[arg(short, long = "agg", required = true)]
        aggs: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Pairwise-complete correlation matrix of numeric columns
    Corr {
        /// Path to the input table
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Columns to correlate (default: every numeric column)
        #[arg(short, long = "column", value_delimiter = ',')]
        columns: Vec<String>,

        /// pearson or spearman (default: from config)
        #[arg(short, long)]
        method: Option<CorrelationMethodArg>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Order entities by a key, optionally reordering another table
    Rank {
        /// Table with one row per entity
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Entity identifier column
        #[arg(long)]
        id: String,

        /// Column to sort by
        #[arg(short, long)]
        key: String,

        /// Sort largest first
        #[arg(short, long)]
        descending: bool,

        /// Reorder this table by the rank of its identifier column instead
        #[arg(long, value_name = "TABLE")]
        apply: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the schema and missingness of a table
    Describe {
        /// Path to the input table
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Correlation method choice.
#[derive(Clone, Copy, Debug)]
pub struct CorrelationMethodArg(pub CorrelationMethod);

impl std::str::FromStr for CorrelationMethodArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pearson" => Ok(Self(CorrelationMethod::Pearson)),
            "spearman" => Ok(Self(CorrelationMethod::Spearman)),
            _ => Err(format!("Unknown method: {}. Use pearson or spearman.", s)),
        }
    }
}
