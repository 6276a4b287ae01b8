use anyhow::{bail, Context};
use clap::Parser;

mod cli;
mod config;
mod content;
mod embedding;
mod ids;
mod lock;
mod metadata;
mod search;
mod share;
mod store;
#[cfg(test)]
mod tests;

use cli::ShareAction;
use config::Config;
use content::ContentCreate;
use embedding::{clear_stale, run_backfill, BackfillConfig, EmbeddingClient};
use ids::{ContentId, TagId, UserId};
use lock::FileLock;
use store::{ContentStore, JsonStore};

pub fn parse_tags(tags: String) -> Vec<TagId> {
    tags.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(TagId::from)
        .collect()
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

/// Mutating commands hold the lock for their whole run; readers rely
/// on the store's atomic rewrites instead.
fn lock_data_dir(config: &Config) -> anyhow::Result<FileLock> {
    std::fs::create_dir_all(&config.data_dir)?;
    FileLock::try_acquire(&config.data_dir)
        .with_context(|| format!("locking {}", config.data_dir.display()))
}

fn open_store(config: &Config) -> anyhow::Result<JsonStore> {
    Ok(JsonStore::open(&config.data_dir)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = cli::Args::parse();
    let config = Config::from_env();

    match args.command {
        cli::Command::Add {
            owner,
            title,
            description,
            link,
            kind,
            tags,
        } => {
            let _lock = lock_data_dir(&config)?;
            let store = open_store(&config)?;

            let record = store.create(ContentCreate {
                title,
                link,
                description,
                kind,
                tags: tags.map(parse_tags).unwrap_or_default(),
                owner: UserId::from(owner),
            })?;

            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }

        cli::Command::List { owner } => {
            let store = open_store(&config)?;
            let records = store.list_owned(&UserId::from(owner))?;

            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(())
        }

        cli::Command::Remove { id, owner } => {
            let _lock = lock_data_dir(&config)?;
            let store = open_store(&config)?;

            let id = ContentId::from(id);
            store.delete(&id, &UserId::from(owner))?;

            println!("Removed {id}.");
            Ok(())
        }

        cli::Command::Search { query, limit } => {
            let store = open_store(&config)?;
            let client = EmbeddingClient::new(config.provider.clone())?;

            let response = runtime()?.block_on(search::search(&store, &client, &query, limit))?;

            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }

        cli::Command::Share { action } => {
            match action {
                ShareAction::Enable { owner } => {
                    let _lock = lock_data_dir(&config)?;
                    let store = open_store(&config)?;

                    let link = share::enable_share(&store, &UserId::from(owner))?;
                    println!("{}", link.hash);
                }
                ShareAction::Disable { owner } => {
                    let _lock = lock_data_dir(&config)?;
                    let store = open_store(&config)?;

                    share::disable_share(&store, &UserId::from(owner))?;
                    println!("Sharing disabled.");
                }
                ShareAction::Resolve { hash } => {
                    let store = open_store(&config)?;

                    let shared = share::resolve_share(&store, &hash)?;
                    println!("{}", serde_json::to_string_pretty(&shared)?);
                }
            }
            Ok(())
        }

        cli::Command::Backfill {} => {
            let _lock = lock_data_dir(&config)?;
            let store = open_store(&config)?;
            let client = EmbeddingClient::new(config.provider.clone())?;
            let backfill_config = BackfillConfig::new(config.dimension_hint);

            let report = runtime()?.block_on(run_backfill(&store, &client, &backfill_config))?;

            println!(
                "Done. Successfully processed {}/{}.",
                report.processed, report.total
            );
            Ok(())
        }

        cli::Command::ClearEmbeddings {} => {
            let Some(target_len) = config.clear_embed_len else {
                bail!("invalid CLEAR_EMBED_LEN: must be a positive integer");
            };

            let _lock = lock_data_dir(&config)?;
            let store = open_store(&config)?;

            let cleared = clear_stale(&store, target_len)?;

            println!("Cleared {cleared} embeddings of length {target_len}.");
            Ok(())
        }

        cli::Command::Meta { url } => {
            let meta = runtime()?.block_on(metadata::fetch_link_metadata(&url))?;

            println!("{}", serde_json::to_string_pretty(&meta)?);
            Ok(())
        }
    }
}
