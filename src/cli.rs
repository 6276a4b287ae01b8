use clap::{Parser, Subcommand};

use crate::content::ContentKind;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Save a new piece of content
    Add {
        /// Owner the record belongs to
        #[clap(short, long)]
        owner: String,

        /// Content title
        #[clap(short, long)]
        title: Option<String>,

        /// Content description
        #[clap(short, long)]
        description: Option<String>,

        /// A url the content lives at
        #[clap(short, long)]
        link: Option<String>,

        /// Content kind: youtube, twitter, document, website, image or music
        #[clap(short, long, default_value = "website")]
        kind: ContentKind,

        /// Comma separated tags
        #[clap(short = 'g', long)]
        tags: Option<String>,
    },
    /// List everything an owner has saved
    List {
        /// Owner whose records to list
        #[clap(short, long)]
        owner: String,
    },
    /// Delete one record
    Remove {
        /// Record id
        id: String,

        /// Owner the record belongs to
        #[clap(short, long)]
        owner: String,
    },
    /// Rank stored content against a query
    Search {
        /// Free text query
        query: String,

        /// How many results to return
        #[clap(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Manage the public share link
    Share {
        #[clap(subcommand)]
        action: ShareAction,
    },
    /// Compute embeddings for records that lack one
    Backfill {},
    /// Reset embeddings of a stale length so the next backfill
    /// recomputes them
    ClearEmbeddings {},
    /// Query website metadata
    Meta {
        /// A url
        url: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ShareAction {
    /// Turn sharing on and print the hash
    Enable {
        /// Owner to share
        #[clap(short, long)]
        owner: String,
    },
    /// Turn sharing off
    Disable {
        /// Owner to stop sharing
        #[clap(short, long)]
        owner: String,
    },
    /// Look up a hash and print the shared collection
    Resolve {
        /// Share hash
        hash: String,
    },
}
