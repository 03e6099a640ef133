use anyhow::{Context, Result};
use regex::Regex;
use tracing::{event, Level};

use crate::crest_client::CrestApi;
use crate::market_model::{ItemType, Region};

/// The immutable iteration plan: every sweep walks `regions × types`.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub regions: Vec<Region>,
    pub types: Vec<ItemType>,
}

/// Loads the full catalog. Any failure here is fatal; the scheduler has
/// nothing to iterate without it.
pub async fn load_catalog(client: &dyn CrestApi) -> Result<Catalog> {
    let regions = load_regions(client).await?;
    let types = load_market_types(client).await?;

    anyhow::ensure!(!regions.is_empty(), "Upstream returned no regions");
    anyhow::ensure!(!types.is_empty(), "Upstream returned no market types");

    Ok(Catalog { regions, types })
}

/// Single, unpaginated GET. The numeric region id is the first decimal run in
/// each item's href.
pub async fn load_regions(client: &dyn CrestApi) -> Result<Vec<Region>> {
    let page = client.get_regions().await.context("Failed to load regions")?;

    let id_pattern = Regex::new("[0-9]+").unwrap();

    let mut regions = Vec::with_capacity(page.items.len());
    for item in page.items {
        match id_pattern.find(&item.href).and_then(|m| m.as_str().parse::<i64>().ok()) {
            Some(region_id) => regions.push(Region { region_id, name: item.name }),
            None => {
                event!(Level::WARN, "Skipping region '{}': no numeric id in href '{}'", item.name, item.href);
            }
        }
    }

    event!(Level::INFO, "Loaded {} regions", regions.len());

    Ok(regions)
}

/// Walks the paginated market types listing. A page whose `next.href` equals
/// the URL it was fetched from is the terminal sentinel; a page without a
/// `next` link can only mean the same thing.
pub async fn load_market_types(client: &dyn CrestApi) -> Result<Vec<ItemType>> {
    let mut url = client.market_types_url();
    let mut types = Vec::new();
    let mut page_count = 0u32;

    loop {
        let page = client
            .get_market_types_page(&url)
            .await
            .with_context(|| format!("Failed to load market types page '{}'", url))?;
        page_count += 1;

        types.extend(page.items.into_iter().map(|item| ItemType {
            type_id: item.item_type.id,
            name: item.item_type.name,
        }));

        match page.next {
            Some(next) if next.href != url => url = next.href,
            _ => break,
        }
    }

    event!(Level::INFO, "Loaded {} market types from {} pages", types.len(), page_count);

    Ok(types)
}
