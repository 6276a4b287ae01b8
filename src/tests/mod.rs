mod metadata;
mod provider;
