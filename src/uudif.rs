use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::configuration::GeneratorIdentity;
use crate::market_model::{HistoryItem, OrderItem};
use crate::station_directory::StationDirectory;

pub const UUDIF_VERSION: &str = "0.1";

pub const HISTORY_COLUMNS: [&str; 6] = ["date", "orders", "quantity", "low", "high", "average"];

pub const ORDER_COLUMNS: [&str; 11] = [
    "price",
    "volRemaining",
    "range",
    "orderID",
    "volEntered",
    "minVolume",
    "bid",
    "issueDate",
    "duration",
    "stationID",
    "solarSystemID",
];

/// The solar system id used when an order sits at a station the directory
/// does not know.
pub const UNKNOWN_SOLAR_SYSTEM_ID: i64 = 0;

/// One cell of a positional UUDIF row. Serialized untagged, so a row comes
/// out as a plain JSON tuple. Dynamic typing stops at this enum.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<String> for RowValue {
    fn from(value: String) -> Self {
        RowValue::Str(value)
    }
}

impl From<&str> for RowValue {
    fn from(value: &str) -> Self {
        RowValue::Str(value.to_string())
    }
}

impl From<i64> for RowValue {
    fn from(value: i64) -> Self {
        RowValue::Int(value)
    }
}

impl From<f64> for RowValue {
    fn from(value: f64) -> Self {
        RowValue::Float(value)
    }
}

impl From<bool> for RowValue {
    fn from(value: bool) -> Self {
        RowValue::Bool(value)
    }
}

/// A UUDIF market envelope. Fields are declared in wire order, so compact
/// serialization of a fixed envelope is byte-deterministic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketUudif {
    pub result_type: ResultType,
    pub version: String,
    pub upload_keys: Vec<UploadKey>,
    pub generator: Generator,
    pub columns: Vec<String>,
    pub current_time: DateTime<Utc>,
    pub rowsets: Vec<Rowset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    History,
    Orders,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadKey {
    pub name: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Generator {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rowset {
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "regionID")]
    pub region_id: i64,
    #[serde(rename = "typeID")]
    pub type_id: i64,
    pub rows: Vec<Vec<RowValue>>,
}

/// Distance encoding of an order's textual range. Total: anything that is
/// neither a known keyword nor a decimal integer encodes to 0.
pub fn encode_order_range(range: &str) -> i64 {
    match range {
        "station" => -1,
        "solarsystem" => 0,
        "region" => 32767,
        other => other.parse().unwrap_or(0),
    }
}

fn envelope_header(result_type: ResultType, columns: &[&str], identity: &GeneratorIdentity, now: DateTime<Utc>) -> MarketUudif {
    MarketUudif {
        result_type,
        version: UUDIF_VERSION.to_string(),
        upload_keys: vec![UploadKey {
            name: identity.name.clone(),
            key: identity.upload_key.clone(),
        }],
        generator: Generator {
            name: identity.name.clone(),
            version: identity.version.clone(),
        },
        columns: columns.iter().map(|c| c.to_string()).collect(),
        current_time: now,
        rowsets: Vec::new(),
    }
}

/// Builds a history envelope. The upstream date is a bare `YYYY-MM-DD`
/// treated as UTC; the `+00:00` suffix is appended verbatim.
pub fn history_envelope(items: &[HistoryItem], region_id: i64, type_id: i64, identity: &GeneratorIdentity, now: DateTime<Utc>) -> MarketUudif {
    let rows = items
        .iter()
        .map(|item| {
            vec![
                RowValue::from(format!("{}+00:00", item.date)),
                RowValue::from(item.order_count),
                RowValue::from(item.volume),
                RowValue::from(item.low_price),
                RowValue::from(item.high_price),
                RowValue::from(item.avg_price),
            ]
        })
        .collect();

    let mut envelope = envelope_header(ResultType::History, &HISTORY_COLUMNS, identity, now);
    envelope.rowsets = vec![Rowset {
        generated_at: now,
        region_id,
        type_id,
        rows,
    }];
    envelope
}

/// Builds an orders envelope. The buy/sell distinction is carried only by the
/// `bid` column; buy and sell share the row schema.
pub fn orders_envelope(
    items: &[OrderItem],
    region_id: i64,
    type_id: i64,
    stations: &StationDirectory,
    identity: &GeneratorIdentity,
    now: DateTime<Utc>,
) -> MarketUudif {
    let rows = items
        .iter()
        .map(|order| {
            vec![
                RowValue::from(order.price),
                RowValue::from(order.volume),
                RowValue::from(encode_order_range(&order.range)),
                RowValue::from(order.id),
                RowValue::from(order.volume_entered),
                RowValue::from(order.min_volume),
                RowValue::from(order.buy),
                RowValue::from(format!("{}+00:00", order.issued)),
                RowValue::from(order.duration),
                RowValue::from(order.location.id),
                RowValue::from(stations.lookup(order.location.id).unwrap_or(UNKNOWN_SOLAR_SYSTEM_ID)),
            ]
        })
        .collect();

    let mut envelope = envelope_header(ResultType::Orders, &ORDER_COLUMNS, identity, now);
    envelope.rowsets = vec![Rowset {
        generated_at: now,
        region_id,
        type_id,
        rows,
    }];
    envelope
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::market_model::OrderLocation;

    fn identity() -> GeneratorIdentity {
        GeneratorIdentity {
            name: "EveData.Org".to_string(),
            version: "0.025a".to_string(),
            upload_key: "TheCheeseIsBree".to_string(),
        }
    }

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 1, 2, 3, 4, 5).unwrap()
    }

    fn directory(entries: &[(i64, i64)]) -> StationDirectory {
        let mut directory = StationDirectory::default();
        let rows: Vec<_> = entries
            .iter()
            .map(|&(station_id, solar_system_id)| crate::market_model::ConquerableStationRow {
                station_id,
                solar_system_id,
            })
            .collect();
        directory.merge_conquerable_stations(&rows);
        directory
    }

    fn sample_order() -> OrderItem {
        OrderItem {
            id: 77,
            buy: true,
            issued: "2016-01-02T03:04:05".to_string(),
            price: 1.5,
            volume_entered: 100,
            min_volume: 1,
            volume: 42,
            range: "solarsystem".to_string(),
            duration: 90,
            location: OrderLocation { id: 60003760 },
        }
    }

    #[test]
    fn encodes_an_order_row() {
        let stations = directory(&[(60003760, 30000142)]);

        let envelope = orders_envelope(&[sample_order()], 10000002, 34, &stations, &identity(), fixed_clock());

        assert_eq!(envelope.result_type, ResultType::Orders);
        assert_eq!(envelope.rowsets.len(), 1);
        assert_eq!(
            envelope.rowsets[0].rows,
            vec![vec![
                RowValue::Float(1.5),
                RowValue::Int(42),
                RowValue::Int(0),
                RowValue::Int(77),
                RowValue::Int(100),
                RowValue::Int(1),
                RowValue::Bool(true),
                RowValue::Str("2016-01-02T03:04:05+00:00".to_string()),
                RowValue::Int(90),
                RowValue::Int(60003760),
                RowValue::Int(30000142),
            ]]
        );
    }

    #[test]
    fn encodes_a_history_row() {
        let item = HistoryItem {
            date: "2016-01-02".to_string(),
            order_count: 10,
            volume: 1000,
            low_price: 1.0,
            high_price: 2.0,
            avg_price: 1.5,
        };

        let envelope = history_envelope(&[item], 10000002, 34, &identity(), fixed_clock());

        assert_eq!(
            envelope.rowsets[0].rows,
            vec![vec![
                RowValue::Str("2016-01-02+00:00".to_string()),
                RowValue::Int(10),
                RowValue::Int(1000),
                RowValue::Float(1.0),
                RowValue::Float(2.0),
                RowValue::Float(1.5),
            ]]
        );
    }

    #[test]
    fn range_encoding_is_total() {
        assert_eq!(encode_order_range("station"), -1);
        assert_eq!(encode_order_range("solarsystem"), 0);
        assert_eq!(encode_order_range("region"), 32767);
        assert_eq!(encode_order_range("5"), 5);
        assert_eq!(encode_order_range("40"), 40);
        assert_eq!(encode_order_range("garbage"), 0);
        assert_eq!(encode_order_range(""), 0);
    }

    #[test]
    fn unknown_station_maps_to_solar_system_zero() {
        let stations = directory(&[]);
        let mut order = sample_order();
        order.location = OrderLocation { id: 99999999 };

        let envelope = orders_envelope(&[order], 10000002, 34, &stations, &identity(), fixed_clock());

        assert_eq!(envelope.rowsets[0].rows[0][9], RowValue::Int(99999999));
        assert_eq!(envelope.rowsets[0].rows[0][10], RowValue::Int(UNKNOWN_SOLAR_SYSTEM_ID));
    }

    #[test]
    fn row_arity_matches_columns() {
        let stations = directory(&[(60003760, 30000142)]);
        let orders = orders_envelope(&[sample_order(), sample_order()], 1, 2, &stations, &identity(), fixed_clock());
        assert_eq!(orders.columns.len(), 11);
        for row in &orders.rowsets[0].rows {
            assert_eq!(row.len(), orders.columns.len());
        }

        let item = HistoryItem {
            date: "2016-01-02".to_string(),
            order_count: 10,
            volume: 1000,
            low_price: 1.0,
            high_price: 2.0,
            avg_price: 1.5,
        };
        let history = history_envelope(&[item], 1, 2, &identity(), fixed_clock());
        assert_eq!(history.columns.len(), 6);
        for row in &history.rowsets[0].rows {
            assert_eq!(row.len(), history.columns.len());
        }
    }

    #[test]
    fn empty_items_produce_an_empty_rows_array() {
        let envelope = history_envelope(&[], 10000002, 34, &identity(), fixed_clock());

        let encoded = serde_json::to_string(&envelope).unwrap();
        assert!(encoded.contains(r#""rows":[]"#), "rows must be present and empty: {}", encoded);
    }

    #[test]
    fn history_serialization_is_deterministic_under_a_fixed_clock() {
        let item = HistoryItem {
            date: "2016-01-02".to_string(),
            order_count: 10,
            volume: 1000,
            low_price: 1.0,
            high_price: 2.0,
            avg_price: 1.5,
        };

        let envelope = history_envelope(&[item], 10000002, 34, &identity(), fixed_clock());
        let encoded = serde_json::to_string(&envelope).unwrap();

        let expected = concat!(
            r#"{"resultType":"history","version":"0.1","#,
            r#""uploadKeys":[{"name":"EveData.Org","key":"TheCheeseIsBree"}],"#,
            r#""generator":{"name":"EveData.Org","version":"0.025a"},"#,
            r#""columns":["date","orders","quantity","low","high","average"],"#,
            r#""currentTime":"2016-01-02T03:04:05Z","#,
            r#""rowsets":[{"generatedAt":"2016-01-02T03:04:05Z","regionID":10000002,"typeID":34,"#,
            r#""rows":[["2016-01-02+00:00",10,1000,1.0,2.0,1.5]]}]}"#,
        );
        assert_eq!(encoded, expected);
    }
}
