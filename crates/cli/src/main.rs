use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dataset::{
    Dataset, EntityId, FieldValue, InnerId, LoadOptions, RawId, Trainset, load_info_table,
};
use recommenders::{
    CollaborativeFilter, ContentFilter, Recommendation, Recommender, SvdRecommender,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// TinyRecs - small rating-based recommendation toolkit
#[derive(Parser)]
#[command(name = "tiny-recs")]
#[command(about = "Recommend unseen items from (user, item, rating) records", long_about = None)]
struct Cli {
    /// Ratings file with columns: user, item, rating[, timestamp]
    #[arg(short, long)]
    ratings: PathBuf,

    /// Field separator shared by every input file (MovieLens uses "::")
    #[arg(short, long, default_value = ",")]
    delimiter: String,

    /// Input files have no header row
    #[arg(long)]
    no_header: bool,

    /// Optional item metadata file
    #[arg(long)]
    items: Option<PathBuf>,

    /// Key column of the item metadata file
    #[arg(long, default_value = "item_id")]
    item_key: String,

    /// Optional user metadata file
    #[arg(long)]
    users: Option<PathBuf>,

    /// Key column of the user metadata file
    #[arg(long, default_value = "user_id")]
    user_key: String,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show trainset counts and statistics
    Stats,

    /// Get recommendations for a user
    Recommend {
        /// Raw user id
        #[arg(long)]
        user: String,

        /// Prediction strategy
        #[arg(long, value_enum, default_value = "svd")]
        strategy: Strategy,

        /// Number of recommendations to return
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Number of SVD components
        #[arg(long, default_value = "20")]
        components: usize,

        /// Number of top-rated items seeding the content filter
        #[arg(long, default_value = "10")]
        top_rated: usize,
    },

    /// Show user metadata and ratings
    User {
        /// Raw user id
        #[arg(long)]
        user: String,
    },

    /// Show item metadata and rating summary
    Item {
        /// Raw item id
        #[arg(long)]
        item: String,
    },

    /// Find items whose metadata matches every --column/--value pair
    Search {
        /// Item metadata column, e.g. title (repeat to narrow)
        #[arg(long, required = true)]
        column: Vec<String>,

        /// Value for the column at the same position
        #[arg(long, required = true)]
        value: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Content,
    Svd,
    Collaborative,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let options = LoadOptions::default()
        .with_delimiter(cli.delimiter.as_str())
        .with_header(!cli.no_header);

    // Load and index the ratings
    let start = Instant::now();
    let trainset = Arc::new(load_trainset(&cli, &options)?);
    tracing::info!("Trainset ready in {:?}", start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Stats => handle_stats(&trainset, cli.json)?,
        Commands::Recommend {
            user,
            strategy,
            limit,
            components,
            top_rated,
        } => {
            let mut model: Box<dyn Recommender> = match strategy {
                Strategy::Content => {
                    Box::new(ContentFilter::new(trainset.clone()).with_top_rated(top_rated))
                }
                Strategy::Svd => {
                    Box::new(SvdRecommender::new(trainset.clone()).with_components(components))
                }
                Strategy::Collaborative => Box::new(CollaborativeFilter::new(trainset.clone())),
            };
            handle_recommend(&trainset, model.as_mut(), &user, limit, cli.json)?
        }
        Commands::User { user } => handle_user(&trainset, &user, cli.json)?,
        Commands::Item { item } => handle_item(&trainset, &item, cli.json)?,
        Commands::Search { column, value } => handle_search(&trainset, &column, &value, cli.json)?,
    }

    Ok(())
}

/// Build the trainset and attach whichever metadata files were given
fn load_trainset(cli: &Cli, options: &LoadOptions) -> Result<Trainset> {
    let data = Dataset::load_from_file(&cli.ratings, options)
        .with_context(|| format!("Failed to load ratings from {}", cli.ratings.display()))?;
    let mut trainset = data.build_trainset();

    if let Some(path) = &cli.items {
        let info = load_info_table(path, &cli.item_key, options)
            .with_context(|| format!("Failed to load item info from {}", path.display()))?;
        trainset.set_item_info(info);
    }
    if let Some(path) = &cli.users {
        let info = load_info_table(path, &cli.user_key, options)
            .with_context(|| format!("Failed to load user info from {}", path.display()))?;
        trainset.set_user_info(info);
    }
    Ok(trainset)
}

/// Resolve a command-line id: integer form first, then the literal string
fn resolve_id(
    text: &str,
    to_inner: impl Fn(&RawId) -> dataset::Result<InnerId>,
) -> Result<(RawId, InnerId)> {
    let inferred = RawId::infer(text);
    if let Ok(inner) = to_inner(&inferred) {
        return Ok((inferred, inner));
    }
    let literal = RawId::Str(text.to_string());
    let inner = to_inner(&literal)?;
    Ok((literal, inner))
}

/// Item title from the item info table, if there is one
fn item_title(trainset: &Trainset, iid: InnerId) -> Option<String> {
    trainset
        .get_itemid_info(&EntityId::Inner(iid), Some(&["title"]))
        .ok()
        .and_then(|record| record.get("title").map(|v| v.to_string()))
}

/// Handle the 'stats' command
fn handle_stats(trainset: &Trainset, json: bool) -> Result<()> {
    let global_mean = trainset.global_mean().ok();

    if json {
        let stats = serde_json::json!({
            "n_users": trainset.n_users(),
            "n_items": trainset.n_items(),
            "n_ratings": trainset.n_ratings(),
            "rating_scale": trainset.rating_scale(),
            "global_mean": global_mean,
        });
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Trainset statistics:".bold().blue());
    println!("{}Users: {}", "• ".green(), trainset.n_users());
    println!("{}Items: {}", "• ".green(), trainset.n_items());
    println!("{}Ratings: {}", "• ".green(), trainset.n_ratings());
    match trainset.rating_scale() {
        Some((lo, hi)) => println!("{}Rating scale: {} - {}", "• ".cyan(), lo, hi),
        None => println!("{}Rating scale: n/a", "• ".cyan()),
    }
    match global_mean {
        Some(mean) => println!("{}Global mean: {:.3}", "• ".cyan(), mean),
        None => println!("{}Global mean: n/a", "• ".cyan()),
    }
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    trainset: &Trainset,
    model: &mut dyn Recommender,
    user: &str,
    limit: usize,
    json: bool,
) -> Result<()> {
    let (user, _) = resolve_id(user, |raw| trainset.to_inner_uid(raw))?;

    let start = Instant::now();
    model
        .fit()
        .with_context(|| format!("Failed to fit {}", model.name()))?;
    tracing::info!("Fitted {} in {:?}", model.name(), start.elapsed());

    let recommendations = model.recommend(&user, limit)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    } else {
        print_recommendations(trainset, model.name(), &user, &recommendations);
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(trainset: &Trainset, user: &str, json: bool) -> Result<()> {
    let (user, uid) = resolve_id(user, |raw| trainset.to_inner_uid(raw))?;
    let info = trainset.get_userid_info(&EntityId::Inner(uid), None).ok();
    let ratings = trainset.user_ratings(uid)?;

    if json {
        let rated: Vec<_> = ratings
            .iter()
            .map(|&(iid, r)| -> Result<serde_json::Value> {
                Ok(serde_json::json!({ "item": trainset.to_raw_iid(iid)?, "rating": r }))
            })
            .collect::<Result<_>>()?;
        let out = serde_json::json!({ "user": user, "info": info, "ratings": rated });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", format!("User {}", user).bold().blue());
    match info {
        Some(record) => {
            for (field, value) in record {
                println!("{}{}: {}", "• ".green(), field, value);
            }
        }
        None => println!("{}(no user info)", "• ".green()),
    }

    let mean = ratings.iter().map(|&(_, r)| r).sum::<f64>() / ratings.len().max(1) as f64;
    println!("{}Number of ratings: {}", "• ".cyan(), ratings.len());
    println!("{}Average rating: {:.2}", "• ".cyan(), mean);

    let mut top_rated: Vec<_> = ratings.to_vec();
    top_rated.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    println!("Top rated items:");
    for &(iid, r) in top_rated.iter().take(10) {
        let raw = trainset.to_raw_iid(iid)?;
        match item_title(trainset, iid) {
            Some(title) => println!("  - {} {} (Rating: {})", raw, title, r),
            None => println!("  - {} (Rating: {})", raw, r),
        }
    }
    Ok(())
}

/// Handle the 'item' command
fn handle_item(trainset: &Trainset, item: &str, json: bool) -> Result<()> {
    let (item, iid) = resolve_id(item, |raw| trainset.to_inner_iid(raw))?;
    let info = trainset.get_itemid_info(&EntityId::Inner(iid), None).ok();
    let ratings = trainset.item_ratings(iid)?;
    let mean = ratings.iter().map(|&(_, r)| r).sum::<f64>() / ratings.len().max(1) as f64;

    if json {
        let out = serde_json::json!({
            "item": item,
            "info": info,
            "rating_count": ratings.len(),
            "avg_rating": mean,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", format!("Item {}", item).bold().blue());
    match info {
        Some(record) => {
            for (field, value) in record {
                println!("{}{}: {}", "• ".green(), field, value);
            }
        }
        None => println!("{}(no item info)", "• ".green()),
    }
    println!("{}Number of ratings: {}", "• ".cyan(), ratings.len());
    println!("{}Average rating: {:.2}", "• ".cyan(), mean);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(trainset: &Trainset, columns: &[String], values: &[String], json: bool) -> Result<()> {
    if columns.len() != values.len() {
        bail!(
            "Got {} --column but {} --value arguments",
            columns.len(),
            values.len()
        );
    }
    let info = trainset
        .item_info()
        .context("Search needs item info (pass --items)")?;

    // Text queries are coerced to each column's type by the info table
    let values: Vec<FieldValue> = values.iter().map(|v| FieldValue::from(v.as_str())).collect();
    let criteria: Vec<(&str, &FieldValue)> = columns.iter().map(String::as_str).zip(&values).collect();
    let matches = info.find_where(&criteria)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    let query = criteria
        .iter()
        .map(|(column, value)| format!("{} = '{}'", column, value))
        .collect::<Vec<_>>()
        .join(", ");
    println!("{}", format!("Items with {}:", query).bold().blue());
    if matches.is_empty() {
        println!("  not found");
    }
    for raw in &matches {
        let rated = trainset
            .to_inner_iid(raw)
            .and_then(|iid| trainset.item_ratings(iid).map(<[_]>::len))
            .unwrap_or(0);
        println!("  - {} ({} ratings)", raw, rated);
    }
    if matches.len() > 1 {
        println!(
            "{} {} items match; add --column/--value pairs to narrow",
            "!".yellow(),
            matches.len()
        );
    }
    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(
    trainset: &Trainset,
    strategy: &str,
    user: &RawId,
    recommendations: &[Recommendation],
) {
    println!(
        "{}",
        format!("Recommendations for user {} ({}):", user, strategy).bold().blue()
    );
    if recommendations.is_empty() {
        println!("  nothing left to recommend");
    }
    for (rank, rec) in recommendations.iter().enumerate() {
        let title = item_title(trainset, rec.inner_iid).unwrap_or_default();
        println!(
            "{}. {} {} - Score: {:.3}",
            (rank + 1).to_string().green(),
            rec.item,
            title,
            rec.score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset::{InfoTable, RawRating, Table};

    #[test]
    fn test_resolve_id_falls_back_to_string() {
        let trainset = Dataset::from_ratings(vec![
            RawRating::new(7, "x", 4.0),
            RawRating::new("10000", "x", 3.0),
        ])
        .build_trainset();

        let (raw, uid) = resolve_id("7", |r| trainset.to_inner_uid(r)).unwrap();
        assert_eq!((raw, uid), (RawId::Int(7), 0));

        let (raw, uid) = resolve_id("10000", |r| trainset.to_inner_uid(r)).unwrap();
        assert_eq!((raw, uid), (RawId::from("10000"), 1));

        assert!(resolve_id("8", |r| trainset.to_inner_uid(r)).is_err());
    }

    #[test]
    fn test_search_pairs_must_line_up() {
        let mut trainset = Dataset::from_ratings(vec![RawRating::new(1, 10, 4.0)]).build_trainset();
        let movies = Table::from_columns(vec![
            ("item_id", vec![FieldValue::Int(10)]),
            ("title", vec![FieldValue::from("1984")]),
        ])
        .unwrap();
        trainset.set_item_info(InfoTable::new(&movies, "item_id").unwrap());

        let columns = vec!["title".to_string()];
        assert!(handle_search(&trainset, &columns, &["1984".to_string()], true).is_ok());
        assert!(handle_search(&trainset, &columns, &[], true).is_err());
    }
}
