use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    config::ActivityConfig,
    pipeline::{categorize, search},
};

#[derive(Debug, Parser)]
pub struct ClassifyCommand {
    #[arg(
        long,
        short,
        default_value = "",
        help = "Subject identifier. An application bundle id or a domain"
    )]
    identifier: String,
    #[arg(long, short, default_value = "", help = "Display name or page title")]
    name: String,
    #[arg(long, short, help = "Full url of a visit. Also probed for a search query")]
    url: Option<String>,
    #[arg(
        long,
        help = "Json file overriding the category, weight and search-engine tables"
    )]
    rules: Option<PathBuf>,
}

/// Command to process `classify` command. Runs the rule table against one
/// subject without touching any captures.
pub fn process_classify_command(
    ClassifyCommand {
        identifier,
        name,
        url,
        rules,
    }: ClassifyCommand,
) -> Result<()> {
    let config =
        ActivityConfig::load_or_default(rules.as_deref()).context("configuration is invalid")?;

    let category = categorize::categorize(&config, &identifier, &name, url.as_deref());
    println!("category: {category}");

    if let Some(url) = url {
        if let Some(hit) = search::extract_query(&config.search_engines, &url) {
            println!("search: {:?} via {}", hit.query, hit.engine);
        }
    }
    Ok(())
}
