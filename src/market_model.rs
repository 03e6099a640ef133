use serde::Deserialize;

/// One region of the game universe. The upstream regions page only carries a
/// href and a display name; the numeric id is extracted from the href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub region_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemType {
    pub type_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionsPage {
    pub items: Vec<RegionsPageItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionsPageItem {
    pub href: String,
    pub name: String,
}

/// One page of the paginated market types listing. The last page signals the
/// end by repeating the URL it was fetched from in `next.href`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketTypesPage {
    pub items: Vec<MarketTypesPageItem>,
    #[serde(default)]
    pub next: Option<PageLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageLink {
    pub href: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketTypesPageItem {
    #[serde(rename = "type")]
    pub item_type: MarketTypeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketTypeRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketHistory {
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

/// One day of aggregated trade data for a (region, type) pair. The upstream
/// date is a plain `YYYY-MM-DD` string and is treated as UTC downstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub date: String,
    pub order_count: i64,
    pub volume: i64,
    pub low_price: f64,
    pub high_price: f64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketOrders {
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub buy: bool,
    pub issued: String,
    pub price: f64,
    pub volume_entered: i64,
    pub min_volume: i64,
    pub volume: i64,
    pub range: String,
    pub duration: i64,
    pub location: OrderLocation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLocation {
    pub id: i64,
}

/// The conquerable station XML document: `result > rowset > row`, ids carried
/// as `stationID` / `solarSystemID` attributes.
#[derive(Debug, Deserialize)]
pub struct ConquerableStationList {
    pub result: ConquerableStationResult,
}

#[derive(Debug, Deserialize)]
pub struct ConquerableStationResult {
    pub rowset: ConquerableStationRowset,
}

#[derive(Debug, Deserialize)]
pub struct ConquerableStationRowset {
    #[serde(rename = "row", default)]
    pub rows: Vec<ConquerableStationRow>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ConquerableStationRow {
    #[serde(rename = "@stationID")]
    pub station_id: i64,
    #[serde(rename = "@solarSystemID")]
    pub solar_system_id: i64,
}
