//! Listings commands

use super::client;
use crate::output::{format_count, format_price, print_json, truncate, OutputFormat, Status};
use anyhow::Result;
use owo_colors::OwoColorize;
use tradepost_api_client::endpoints::listings::{Listing, ListingQuery};

/// List listings matching the filters
pub async fn list(
    page: Option<u32>,
    per_page: Option<u32>,
    search: Option<String>,
    game: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let client = client()?;

    let mut query = ListingQuery::new();
    if let Some(page) = page {
        query = query.with_page(page);
    }
    if let Some(per_page) = per_page {
        query = query.with_per_page(per_page);
    }
    if let Some(search) = search {
        query = query.with_search(search);
    }
    if let Some(game) = game {
        query = query.with_game(game);
    }

    let result = client.listings().list(&query).await?;

    if format == OutputFormat::Json {
        return print_json(&result);
    }

    if result.data.is_empty() {
        Status::info("No listings found");
        return Ok(());
    }

    println!();
    println!(
        "  {:<8} {:<36} {:<18} {:>14}  {}",
        "ID".dimmed(),
        "Title".dimmed(),
        "Game".dimmed(),
        "Price".dimmed(),
        "Status".dimmed()
    );
    println!("  {}", "─".repeat(90).dimmed());

    for listing in &result.data {
        println!(
            "  {:<8} {:<36} {:<18} {:>14}  {}",
            listing.id,
            truncate(&listing.title, 36),
            truncate(listing.game.as_deref().unwrap_or("-"), 18),
            format_price(listing.price, listing.currency.as_deref()),
            status_label(listing.status.as_deref())
        );
    }

    println!();
    match result.meta {
        Some(ref meta) => println!(
            "  Page {} of {} ({})",
            meta.current_page,
            meta.last_page,
            format_count(usize::try_from(meta.total).unwrap_or(usize::MAX), "listing", "listings")
        ),
        None => println!(
            "  {}",
            format_count(result.data.len(), "listing", "listings")
        ),
    }
    if result.has_more() {
        println!("  {}", "More results available, use --page to continue".dimmed());
    }
    println!();
    Ok(())
}

/// Show one listing
pub async fn show(id: u64, format: OutputFormat) -> Result<()> {
    let client = client()?;
    let listing = client.listings().get(id).await?.data;

    if format == OutputFormat::Json {
        return print_json(&listing);
    }
    print_listing(&listing);
    Ok(())
}

/// Delete a listing
pub async fn delete(id: u64, format: OutputFormat) -> Result<()> {
    let client = client()?;
    if !client.is_authenticated() {
        Status::warning("No session token stored, the server will likely refuse this");
    }

    client.listings().delete(id).await?;

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "deleted": id }));
    }
    Status::success(&format!("Deleted listing {id}"));
    Ok(())
}

fn status_label(status: Option<&str>) -> String {
    match status {
        Some("active") => "active".green().to_string(),
        Some("reserved") => "reserved".yellow().to_string(),
        Some("sold") => "sold".dimmed().to_string(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}

fn print_listing(listing: &Listing) {
    Status::header(&listing.title);
    println!("  {:<10} {}", "ID".dimmed(), listing.id);
    if let Some(ref game) = listing.game {
        println!("  {:<10} {}", "Game".dimmed(), game);
    }
    if let Some(ref platform) = listing.platform {
        println!("  {:<10} {}", "Platform".dimmed(), platform);
    }
    println!(
        "  {:<10} {}",
        "Price".dimmed(),
        format_price(listing.price, listing.currency.as_deref()).green()
    );
    println!(
        "  {:<10} {}",
        "Status".dimmed(),
        status_label(listing.status.as_deref())
    );
    if let Some(ref seller) = listing.seller {
        let rating = seller
            .rating
            .map(|rating| format!(" ({rating:.1}★)"))
            .unwrap_or_default();
        println!("  {:<10} {}{}", "Seller".dimmed(), seller.name, rating);
    }
    if let Some(ref description) = listing.description {
        println!();
        println!("  {description}");
    }
    println!();
}
