use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use safari_admin::api::ListQuery;
use safari_admin::commands::{delete_entry, list_page, AppContext, FormSession};
use safari_admin::config::load_config;
use safari_admin::logger;
use safari_admin::models::{BlogDraft, Collection, Entity, ItineraryDraft};
use safari_admin::validation::{SchemaRules, Validator};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "safari-admin")]
#[command(about = "Headless client for the blog and itinerary dashboard", long_about = None)]
#[command(version)]
struct Cli {
    /// Overrides the API base URL from the config file
    #[arg(long, value_name = "URL")]
    api: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one page of a collection
    List {
        collection: Collection,

        #[arg(default_value_t = 1)]
        page: u32,

        /// Filter by name
        #[arg(long)]
        name: Option<String>,
    },

    /// Create or update an entry from a JSON draft
    ///
    /// Images given as {"file": "<path>"} are uploaded before the entry is saved.
    Submit {
        collection: Collection,

        #[arg(value_name = "DRAFT")]
        draft: PathBuf,

        /// Update the entry with this id instead of creating one
        #[arg(long, value_name = "ID")]
        update: Option<String>,
    },

    /// Delete an entry
    Delete { collection: Collection, id: String },
}

async fn submit<T: Entity>(ctx: &AppContext, full: Value, update: Option<String>) -> Result<Value>
where
    SchemaRules: Validator<T>,
{
    let mut session = match update {
        Some(id) => FormSession::<T>::open_update(ctx, &id).await?,
        None => FormSession::<T>::create(ctx),
    };
    session.load_full(full)?;

    let outcome = session.submit(&SchemaRules).await;
    Ok(outcome.into_result()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init_logging();
    let cli = Cli::parse();

    let mut config = load_config().context("Failed to load config")?;
    if let Some(api) = cli.api {
        config.api_base_url = api.trim_end_matches('/').to_string();
    }
    tracing::debug!("Using API at {}", config.api_base_url);
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::List {
            collection,
            page,
            name,
        } => {
            let query = ListQuery {
                page,
                name,
                ..ListQuery::first_page(ctx.config.page_size)
            };
            let listing = list_page(&ctx, collection, &query).await?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Commands::Submit {
            collection,
            draft,
            update,
        } => {
            let content = std::fs::read_to_string(&draft)
                .with_context(|| format!("Failed to read {}", draft.display()))?;
            let full: Value = serde_json::from_str(&content)
                .with_context(|| format!("{} is not valid JSON", draft.display()))?;

            let response = match collection {
                Collection::Blogs => submit::<BlogDraft>(&ctx, full, update).await?,
                Collection::Itineraries => submit::<ItineraryDraft>(&ctx, full, update).await?,
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Delete { collection, id } => {
            delete_entry(&ctx, collection, &id).await?;
            println!("Deleted {} {}", collection.singular(), id);
        }
    }

    Ok(())
}
