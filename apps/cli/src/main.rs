//! Quarry CLI - ranked full-text search from the command line
//!
//! `quarry search <kind> [TERM]` runs a search against the configured store,
//! `quarry explain` shows the statements a search would run, and
//! `quarry targets` lists the configured entity kinds.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use quarry_fulltext::{
    config::{self, Config},
    db::{self, search::QueryBuilder},
    logging, MySqlExecutor, RecordId, SearchService,
};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "quarry", version, about = "Ranked full-text search over MySQL")]
struct Cli {
    /// Configuration file (defaults to ./quarry.toml when present)
    #[arg(long, global = true, env = "QUARRY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search one entity kind and print matching records as JSON
    Search(SearchArgs),
    /// Print the statements a search would run, without touching the store
    Explain(SearchArgs),
    /// List configured entity kinds
    Targets,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Entity kind, as configured under [targets.<kind>]
    kind: String,

    /// Search text; omit to list every record
    term: Option<String>,

    /// Scope identifier (e.g. owner or tenant id)
    #[arg(long)]
    scope: Option<String>,

    /// Print a single pretty JSON array instead of JSON lines
    #[arg(long)]
    pretty: bool,
}

impl SearchArgs {
    fn scope(&self) -> Option<RecordId> {
        self.scope.as_deref().map(RecordId::parse)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let dotenv_error = config::load_dotenv();
    let config =
        Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    let _logging_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;
    if let Some(e) = dotenv_error {
        tracing::warn!(error = %e, "Failed to read .env file");
    }

    match &cli.command {
        Command::Search(args) => run_search(config, args).await,
        Command::Explain(args) => explain(&config, args),
        Command::Targets => list_targets(&config),
    }
}

async fn run_search(config: Config, args: &SearchArgs) -> anyhow::Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    let pool = db::connect_pool(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!(e.public_message()))?;
    let service = SearchService::new(MySqlExecutor::new(pool), config.target_registry());

    let result = service
        .search_kind(args.term.as_deref(), &args.kind, args.scope())
        .await
        .map_err(|e| anyhow::anyhow!(e.public_message()))?;

    tracing::info!(
        kind = %args.kind,
        ranked = result.ranked,
        records = result.len(),
        "Search finished"
    );

    let mut out = std::io::stdout().lock();
    if args.pretty {
        serde_json::to_writer_pretty(&mut out, &result.records)?;
        writeln!(out)?;
    } else {
        for record in &result.records {
            serde_json::to_writer(&mut out, record)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn explain(config: &Config, args: &SearchArgs) -> anyhow::Result<()> {
    let registry = config.target_registry();
    let target = registry.get(&args.kind)?;
    let tokens = db::search::sanitize(args.term.as_deref());
    let scope = args.scope();
    let builder = QueryBuilder::new(&target);

    let statement = if tokens.is_empty() {
        println!("tokens: (none, listing every record)");
        builder.listing(scope.as_ref())
    } else {
        println!("tokens: {}", tokens.to_boolean_query());
        builder.ranked_search(&tokens, scope.as_ref())
    };

    println!("sql:    {}", statement.sql());
    println!("binds:  {}", statement.binds().len());
    if !tokens.is_empty() {
        println!(
            "then:   refetch of matched `{}` values from `{}`, ordered by rank",
            target.id_column(),
            target.table()
        );
    }
    Ok(())
}

fn list_targets(config: &Config) -> anyhow::Result<()> {
    let registry = config.target_registry();
    if registry.is_empty() {
        anyhow::bail!("No search targets configured");
    }
    for (kind, target) in registry.iter() {
        println!(
            "{kind}\t{}\tid={}\tsearch=[{}]{}",
            target.table(),
            target.id_column(),
            target.search_columns().join(", "),
            target
                .scope_column()
                .map(|c| format!("\tscope={c}"))
                .unwrap_or_default()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_search_with_scope() {
        let cli = Cli::parse_from(["quarry", "search", "article", "rust web", "--scope", "7"]);
        let Command::Search(args) = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(args.kind, "article");
        assert_eq!(args.term.as_deref(), Some("rust web"));
        assert_eq!(args.scope(), Some(RecordId::Int(7)));
    }

    #[test]
    fn term_is_optional() {
        let cli = Cli::parse_from(["quarry", "explain", "article"]);
        let Command::Explain(args) = cli.command else {
            panic!("expected explain command");
        };
        assert!(args.term.is_none());
        assert!(args.scope().is_none());
    }
}
