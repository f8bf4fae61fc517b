mod index;
mod query;
mod watch;

use cdda_lsp_core::EngineConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cdda-lsp",
    version,
    about = "Go-to-definition and find-references for mod JSON data",
    long_about = "Indexes the JSON data files of every mod under a workspace. Objects with string \
                  \"id\" and \"type\" fields define their id; every string value is a reference. \
                  Run `lsp` to serve editors, or query the index from the command line."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Discovery options shared by commands that index a workspace.
#[derive(Args, Clone)]
pub struct DiscoveryArgs {
    /// Glob locating mod manifests, relative to the workspace root
    #[arg(long, default_value = cdda_lsp_core::config::DEFAULT_MANIFEST_GLOB)]
    pub manifest_glob: String,
    /// Paths to skip during discovery (gitignore syntax, repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,
    /// Maximum number of documents read at once
    #[arg(long, value_name = "N")]
    pub max_concurrent_reads: Option<usize>,
}

impl DiscoveryArgs {
    pub fn config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            manifest_glob: self.manifest_glob.clone(),
            max_concurrent_reads: self.max_concurrent_reads,
            ..EngineConfig::default()
        };
        if !self.exclude.is_empty() {
            config.exclude = self.exclude.clone();
        }
        config
    }
}

/// A position in a file of the workspace, one-based as editors display it.
#[derive(Args, Clone)]
pub struct PositionArgs {
    /// Workspace root containing the mods
    #[arg(value_name = "WORKSPACE")]
    pub root: PathBuf,
    /// File containing the cursor
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Line number (1-based)
    #[arg(value_name = "LINE")]
    pub line: u32,
    /// Column number (1-based, UTF-16 code units)
    #[arg(value_name = "COLUMN")]
    pub column: u32,
    #[command(flatten)]
    pub discovery: DiscoveryArgs,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the Language Server Protocol (LSP) server on stdio
    Lsp,
    /// Index a workspace and print statistics
    Index {
        /// Workspace root containing the mods
        #[arg(value_name = "WORKSPACE")]
        path: PathBuf,
        #[command(flatten)]
        discovery: DiscoveryArgs,
    },
    /// Index a workspace and keep the index current as files change
    Watch {
        /// Workspace root containing the mods
        #[arg(value_name = "WORKSPACE")]
        path: PathBuf,
        #[command(flatten)]
        discovery: DiscoveryArgs,
    },
    /// Print the definitions of the string at a position
    Definition(PositionArgs),
    /// Print every occurrence of the string at a position
    References(PositionArgs),
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (component, to_stderr) = match &cli.command {
        Commands::Lsp => ("lsp", false),
        _ => ("cli", true),
    };
    let _guard = cdda_lsp_core::logging::init_logging(component, to_stderr);

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Lsp => rt.block_on(cdda_lsp_server::run_server()),
        Commands::Index { path, discovery } => rt.block_on(index::run(path, discovery.config())),
        Commands::Watch { path, discovery } => rt.block_on(watch::run(path, discovery.config())),
        Commands::Definition(args) => rt.block_on(query::run(args, query::QueryKind::Definition)),
        Commands::References(args) => rt.block_on(query::run(args, query::QueryKind::References)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn exclude_overrides_default() {
        let cli = Cli::parse_from(["cdda-lsp", "index", "/ws", "--exclude", "tests", "--exclude", "android"]);
        let Commands::Index { discovery, .. } = cli.command else {
            panic!("expected index command");
        };
        assert_eq!(discovery.config().exclude, vec!["tests", "android"]);

        let cli = Cli::parse_from(["cdda-lsp", "index", "/ws"]);
        let Commands::Index { discovery, .. } = cli.command else {
            panic!("expected index command");
        };
        assert_eq!(discovery.config(), EngineConfig::default());
    }
}
