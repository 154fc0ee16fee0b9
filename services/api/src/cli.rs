use crate::catalog_cli::{
    run_catalog_import, run_catalog_list, run_recommend, ImportArgs, ListArgs, RecommendArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use melcoffee::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "melcoffee",
    about = "Serve and manage the melcoffee catalog and recommendations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect or seed the stored catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Rank the stored catalog against questionnaire answers
    Recommend(RecommendArgs),
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Print every catalog item in stored order
    List(ListArgs),
    /// Append (or replace with) items read from a CSV file
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Catalog {
            command: CatalogCommand::List(args),
        } => run_catalog_list(args),
        Command::Catalog {
            command: CatalogCommand::Import(args),
        } => run_catalog_import(args),
        Command::Recommend(args) => run_recommend(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_defaults_to_serve() {
        let cli = Cli::try_parse_from(["melcoffee"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_recommend_flags() {
        let cli = Cli::try_parse_from([
            "melcoffee",
            "recommend",
            "--milk",
            "rich",
            "--iced",
            "--limit",
            "3",
            "--explain",
        ])
        .expect("parses");
        let Some(Command::Recommend(args)) = cli.command else {
            panic!("expected recommend command");
        };
        assert_eq!(args.milk.as_deref(), Some("rich"));
        assert!(args.iced);
        assert!(!args.hot);
        assert_eq!(args.limit.map(|limit| limit.get()), Some(3));
        assert!(args.explain);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let parsed = Cli::try_parse_from(["melcoffee", "recommend", "--limit", "0"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn iced_and_hot_conflict() {
        let parsed = Cli::try_parse_from(["melcoffee", "recommend", "--iced", "--hot"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn import_requires_a_csv_path() {
        assert!(Cli::try_parse_from(["melcoffee", "catalog", "import"]).is_err());
        let cli = Cli::try_parse_from(["melcoffee", "catalog", "import", "menu.csv", "--replace"])
            .expect("parses");
        let Some(Command::Catalog {
            command: CatalogCommand::Import(args),
        }) = cli.command
        else {
            panic!("expected catalog import");
        };
        assert!(args.replace);
        assert_eq!(args.csv.to_string_lossy(), "menu.csv");
    }
}
