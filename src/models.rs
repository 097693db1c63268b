use serde::{Serialize, Serializer};

/// One observation of an item's market prices in a city.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub item_id: String,
    pub location: String,
    pub max_buy_price: f64,
    pub min_sell_price: f64,
}

impl PriceRecord {
    pub fn new(
        item_id: impl Into<String>,
        location: impl Into<String>,
        max_buy_price: f64,
        min_sell_price: f64,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            location: location.into(),
            max_buy_price,
            min_sell_price,
        }
    }

    /// Both prices must be strictly positive for the record to carry market data.
    pub fn has_market_data(&self) -> bool {
        self.max_buy_price > 0.0 && self.min_sell_price > 0.0
    }
}

/// Records that passed the positive-price filter, plus the number of rows the
/// store returned but that could not be read as a `PriceRecord`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CandidateRecords {
    pub records: Vec<PriceRecord>,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfitableItem {
    pub item_id: String,
    pub location: String,
    pub max_buy_price: f64,
    pub min_sell_price: f64,
    pub profit: f64,
    pub profit_percentage: f64,
}

impl ProfitableItem {
    /// Returns `None` when the record has no usable market data, including a
    /// buy price that would make the percentage infinite or NaN.
    pub fn from_record(record: PriceRecord) -> Option<Self> {
        if !record.has_market_data() {
            return None;
        }

        let profit = record.min_sell_price - record.max_buy_price;
        let profit_percentage = profit / record.max_buy_price * 100.0;

        if !profit.is_finite() || !profit_percentage.is_finite() {
            return None;
        }

        Some(Self {
            item_id: record.item_id,
            location: record.location,
            max_buy_price: record.max_buy_price,
            min_sell_price: record.min_sell_price,
            profit,
            profit_percentage,
        })
    }
}

/// Wire shape of one entry in `/api/profitable_items`, keyed by item id.
#[derive(Debug, Serialize)]
pub struct ProfitableItemEntry {
    pub city: String,
    #[serde(serialize_with = "serialize_number")]
    pub buy_price_max: f64,
    #[serde(serialize_with = "serialize_number")]
    pub sell_price_min: f64,
    #[serde(serialize_with = "serialize_number")]
    pub profit: f64,
    #[serde(serialize_with = "serialize_number")]
    pub profit_percentage: f64,
}

/// Largest magnitude below which every integer is exact in an `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Whole prices go out as JSON integers (`100`, not `100.0`), fractional ones as floats.
fn serialize_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

impl From<&ProfitableItem> for ProfitableItemEntry {
    fn from(item: &ProfitableItem) -> Self {
        Self {
            city: item.location.clone(),
            buy_price_max: item.max_buy_price,
            sell_price_min: item.min_sell_price,
            profit: item.profit,
            profit_percentage: item.profit_percentage,
        }
    }
}

/// One table of the store, every cell already rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDump {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derives_profit_and_percentage() {
        let item = ProfitableItem::from_record(PriceRecord::new("T1", "A", 100.0, 120.0)).unwrap();

        assert_eq!(item.profit, 20.0);
        assert_eq!(item.profit_percentage, 20.0);
        assert_eq!(item.location, "A");
    }

    #[test]
    fn non_positive_prices_have_no_market_data() {
        assert!(ProfitableItem::from_record(PriceRecord::new("T3", "A", 0.0, 50.0)).is_none());
        assert!(ProfitableItem::from_record(PriceRecord::new("T4", "A", 50.0, 0.0)).is_none());
        assert!(ProfitableItem::from_record(PriceRecord::new("T5", "A", -1.0, 50.0)).is_none());
    }

    #[test]
    fn nan_prices_are_excluded() {
        assert!(ProfitableItem::from_record(PriceRecord::new("T6", "A", f64::NAN, 50.0)).is_none());
        assert!(
            ProfitableItem::from_record(PriceRecord::new("T7", "A", 10.0, f64::INFINITY)).is_none()
        );
    }

    #[test]
    fn entry_uses_wire_field_names() {
        let item = ProfitableItem::from_record(PriceRecord::new("T1", "Lymhurst", 100.0, 120.0))
            .unwrap();
        let json = serde_json::to_value(ProfitableItemEntry::from(&item)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "city": "Lymhurst",
                "buy_price_max": 100,
                "sell_price_min": 120,
                "profit": 20,
                "profit_percentage": 20,
            })
        );
    }

    #[test]
    fn fractional_values_stay_floats() {
        let item = ProfitableItem::from_record(PriceRecord::new("T2", "Martlock", 64.0, 80.5))
            .unwrap();
        let json = serde_json::to_string(&ProfitableItemEntry::from(&item)).unwrap();

        assert_eq!(
            json,
            r#"{"city":"Martlock","buy_price_max":64,"sell_price_min":80.5,"profit":16.5,"profit_percentage":25.78125}"#
        );
    }
}
