use clap::Args;
use melcoffee::catalog::{CatalogCsvImporter, CatalogItem, CatalogService, JsonFileCatalog};
use melcoffee::config::AppConfig;
use melcoffee::error::AppError;
use melcoffee::recommend::{ItemScore, PreferenceAnswers, RecommendationEngine, ScoredResult};
use std::fmt::Write as _;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Catalog file to read (defaults to MELCOFFEE_DATA_FILE)
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV export with name, description, price, tags, popularity columns
    pub(crate) csv: PathBuf,
    /// Catalog file to write (defaults to MELCOFFEE_DATA_FILE)
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
    /// Drop the existing catalog before importing
    #[arg(long)]
    pub(crate) replace: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RecommendArgs {
    /// light, normal, or rich
    #[arg(long)]
    pub(crate) milk: Option<String>,
    /// mild, regular, or strong
    #[arg(long)]
    pub(crate) strength: Option<String>,
    /// cheap, mid, or expensive
    #[arg(long)]
    pub(crate) price: Option<String>,
    /// Prefer iced drinks
    #[arg(long, conflicts_with = "hot")]
    pub(crate) iced: bool,
    /// Prefer hot drinks
    #[arg(long)]
    pub(crate) hot: bool,
    /// Free-form mood tag, e.g. cozy
    #[arg(long)]
    pub(crate) vibe: Option<String>,
    /// Number of results (defaults to MELCOFFEE_RECOMMEND_LIMIT)
    #[arg(long, value_parser = clap::value_parser!(NonZeroUsize))]
    pub(crate) limit: Option<NonZeroUsize>,
    /// Print the rules that fired for each result
    #[arg(long)]
    pub(crate) explain: bool,
    /// Catalog file to read (defaults to MELCOFFEE_DATA_FILE)
    #[arg(long)]
    pub(crate) data_file: Option<PathBuf>,
}

impl RecommendArgs {
    /// Unrecognized values are dropped, the same way the HTTP form treats them.
    pub(crate) fn answers(&self) -> PreferenceAnswers {
        let iced = match (self.iced, self.hot) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };

        PreferenceAnswers {
            milk: self.milk.as_deref().and_then(|raw| raw.parse().ok()),
            strength: self.strength.as_deref().and_then(|raw| raw.parse().ok()),
            price: self.price.as_deref().and_then(|raw| raw.parse().ok()),
            iced,
            vibe: self.vibe.clone().filter(|vibe| !vibe.is_empty()),
        }
    }
}

pub(crate) fn run_catalog_list(args: ListArgs) -> Result<(), AppError> {
    let (service, _) = open_service(args.data_file)?;
    let items = service.list()?;
    print!("{}", render_catalog(&items));
    Ok(())
}

pub(crate) fn run_catalog_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs {
        csv,
        data_file,
        replace,
    } = args;

    let drafts = CatalogCsvImporter::from_path(&csv)?;
    let (service, path) = open_service(data_file)?;
    let created = service.import(drafts, replace)?;

    println!(
        "Imported {} item(s) from {} into {}{}",
        created.len(),
        csv.display(),
        path.display(),
        if replace { " (replaced existing catalog)" } else { "" }
    );
    Ok(())
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let answers = args.answers();
    let (service, _) = open_service(args.data_file.clone())?;
    let results = service.recommend(&answers, args.limit)?;
    let explanations = if args.explain {
        Some(
            results
                .iter()
                .map(|result| service.engine().explain(&result.item, &answers))
                .collect::<Vec<_>>(),
        )
    } else {
        None
    };

    print!(
        "{}",
        render_recommendations(&answers, &results, explanations.as_deref())
    );
    Ok(())
}

fn open_service(
    data_file: Option<PathBuf>,
) -> Result<(CatalogService<JsonFileCatalog>, PathBuf), AppError> {
    let config = AppConfig::load()?;
    let path = data_file.unwrap_or(config.catalog.data_file);
    let repository = Arc::new(JsonFileCatalog::new(path.clone()));
    let engine = RecommendationEngine::with_config(config.recommend);
    Ok((CatalogService::new(repository, engine), path))
}

pub(crate) fn render_catalog(items: &[CatalogItem]) -> String {
    let mut out = String::new();
    if items.is_empty() {
        out.push_str("Catalog is empty\n");
        return out;
    }

    let _ = writeln!(out, "Catalog ({} items)", items.len());
    for item in items {
        let _ = writeln!(
            out,
            "- [{}] {}{}",
            item.id,
            item.name().unwrap_or("(unnamed)"),
            describe_tags(item)
        );
    }
    out
}

pub(crate) fn render_recommendations(
    answers: &PreferenceAnswers,
    results: &[ScoredResult],
    explanations: Option<&[ItemScore]>,
) -> String {
    let mut out = String::new();
    match serde_json::to_string(answers) {
        Ok(json) => {
            let _ = writeln!(out, "Answers: {json}");
        }
        Err(err) => {
            let _ = writeln!(out, "Answers unavailable: {err}");
        }
    }

    if results.is_empty() {
        out.push_str("No recommendations: catalog is empty\n");
        return out;
    }

    for (rank, result) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {:.2}  [{}] {}{}",
            rank + 1,
            result.score,
            result.item.id,
            result.item.name().unwrap_or("(unnamed)"),
            describe_tags(&result.item)
        );

        let Some(explanation) = explanations.and_then(|all| all.get(rank)) else {
            continue;
        };
        for component in &explanation.components {
            let _ = writeln!(
                out,
                "     +{:.2} {:?} matched '{}'",
                component.weight, component.dimension, component.tag
            );
        }
        if explanation.popularity_boost > 0.0 {
            let _ = writeln!(out, "     +{:.2} popularity", explanation.popularity_boost);
        }
    }
    out
}

fn describe_tags(item: &CatalogItem) -> String {
    if item.tags.is_empty() {
        String::new()
    } else {
        format!(" ({})", item.tags.join(", "))
    }
}
