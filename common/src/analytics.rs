//! グラフ用の集計
//!
//! 集計は絞り込み前の全レコードに対して行う。

use crate::filter::PriceClass;
use crate::schema::SchemaMapping;
use crate::types::Record;
use serde::Serialize;
use std::collections::HashMap;

/// 場所が空のときの表示名
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// 上位場所の既定件数
pub const DEFAULT_TOP_LOCATIONS: usize = 10;

/// Free / Paid の件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriceCounts {
    pub free: usize,
    pub paid: usize,
}

impl PriceCounts {
    pub fn total(&self) -> usize {
        self.free + self.paid
    }

    /// 件数の多い順（同数は Free が先）
    pub fn ranked(&self) -> Vec<(PriceClass, usize)> {
        let mut counts = vec![(PriceClass::Free, self.free), (PriceClass::Paid, self.paid)];
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

/// 料金区分ごとの件数。料金列がなければ None
///
/// 欠損は Paid に数える。
pub fn price_counts(records: &[Record], mapping: &SchemaMapping) -> Option<PriceCounts> {
    let column = mapping.price.as_deref()?;

    let mut counts = PriceCounts::default();
    for record in records {
        match PriceClass::classify(record.get(column)) {
            PriceClass::Free => counts.free += 1,
            PriceClass::Paid => counts.paid += 1,
        }
    }
    Some(counts)
}

/// 場所ごとの件数（多い順、同数は初出順）を上位 `limit` 件まで
pub fn top_locations(
    records: &[Record],
    mapping: &SchemaMapping,
    limit: usize,
) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for record in records {
        let location = mapping.location(record).unwrap_or(UNKNOWN_LOCATION);
        match counts.get_mut(location) {
            Some(n) => *n += 1,
            None => {
                order.push(location.to_string());
                counts.insert(location.to_string(), 1);
            }
        }
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|loc| {
            let n = counts.get(&loc).copied().unwrap_or(0);
            (loc, n)
        })
        .collect();
    // 安定ソートなので同数は初出順のまま
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(with_price: bool) -> SchemaMapping {
        let mut columns = vec!["event_name".to_string(), "date".into(), "location".into()];
        if with_price {
            columns.push("price".into());
        }
        SchemaMapping::resolve(&columns).unwrap()
    }

    fn record(location: &str, price: &str) -> Record {
        Record::from_pairs([("location", location), ("price", price)])
    }

    #[test]
    fn test_price_counts() {
        let records = vec![
            record("Online", "Free"),
            record("Delhi", "Paid"),
            record("Online", " free "),
            record("Online", ""),
        ];
        let counts = price_counts(&records, &mapping(true)).unwrap();
        assert_eq!(counts, PriceCounts { free: 2, paid: 2 });
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_price_counts_without_price_column() {
        let records = vec![record("Online", "Free")];
        assert!(price_counts(&records, &mapping(false)).is_none());
    }

    #[test]
    fn test_ranked_price_counts() {
        let counts = PriceCounts { free: 1, paid: 3 };
        assert_eq!(counts.ranked(), vec![(PriceClass::Paid, 3), (PriceClass::Free, 1)]);
    }

    #[test]
    fn test_top_locations_order_and_unknown() {
        let records = vec![
            record("Delhi", ""),
            record("Online", ""),
            record("", ""),
            record("Online", ""),
            record("Bangalore", ""),
        ];
        let top = top_locations(&records, &mapping(false), DEFAULT_TOP_LOCATIONS);
        assert_eq!(
            top,
            vec![
                ("Online".to_string(), 2),
                ("Delhi".to_string(), 1),
                ("Unknown".to_string(), 1),
                ("Bangalore".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_top_locations_truncated() {
        let records: Vec<Record> = (0..15)
            .map(|i| record(&format!("City{}", i), ""))
            .collect();
        let top = top_locations(&records, &mapping(false), 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].0, "City0");
    }
}
