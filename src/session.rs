// Session state: favorites and completed bookings for the lifetime of the controller

use crate::catalog::{Catalog, DestinationId, DestinationRecord};
use crate::error::GalleryError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub destination_name: String,
    pub confirmation_code: String,
    #[serde(with = "booking_date_format")]
    pub booking_date: NaiveDate,
}

impl BookingRecord {
    pub fn formatted_date(&self) -> String {
        self.booking_date.format(booking_date_format::FORMAT).to_string()
    }
}

// Dates are shown and serialized as month/day/year
mod booking_date_format {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%m/%d/%Y";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingHistoryEntry {
    pub destination_id: DestinationId,
    pub booking: BookingRecord,
    pub destination: DestinationRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    favorites: HashSet<DestinationId>,
    // Ordered by id so history is deterministic
    bookings: BTreeMap<DestinationId, BookingRecord>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_favorite(&self, id: DestinationId) -> bool {
        self.favorites.contains(&id)
    }

    // Returns true if the id is a favorite afterwards
    pub fn toggle_favorite(&mut self, id: DestinationId) -> bool {
        if self.favorites.remove(&id) {
            false
        } else {
            self.favorites.insert(id);
            true
        }
    }

    pub fn favorites(&self) -> &HashSet<DestinationId> {
        &self.favorites
    }

    pub fn favorite_count(&self) -> usize {
        self.favorites.len()
    }

    // Re-booking the same destination overwrites the previous record
    pub fn record_booking(
        &mut self,
        id: DestinationId,
        booking: BookingRecord,
    ) -> Option<BookingRecord> {
        self.bookings.insert(id, booking)
    }

    pub fn booking(&self, id: DestinationId) -> Option<&BookingRecord> {
        self.bookings.get(&id)
    }

    pub fn bookings(&self) -> &BTreeMap<DestinationId, BookingRecord> {
        &self.bookings
    }

    pub fn clear(&mut self) {
        self.favorites.clear();
        self.bookings.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty() && self.bookings.is_empty()
    }

    // Sum of derived prices, unknown ids are skipped
    pub fn calculate_total_cost(catalog: &Catalog, ids: &[DestinationId]) -> u64 {
        ids.iter()
            .filter_map(|id| catalog.get_by_id(*id))
            .map(|destination| destination.price_value())
            .sum()
    }

    // Bookings joined against the catalog. Bookings whose destination is gone are skipped.
    pub fn booking_history(&self, catalog: &Catalog) -> Vec<BookingHistoryEntry> {
        self.bookings
            .iter()
            .filter_map(|(id, booking)| {
                catalog.get_by_id(*id).map(|destination| BookingHistoryEntry {
                    destination_id: *id,
                    booking: booking.clone(),
                    destination: destination.clone(),
                })
            })
            .collect()
    }

    // Mean rating over favorites, 0.0 when there are none.
    // Unresolved favorites count towards the divisor but add nothing to the sum.
    pub fn average_favorite_rating(&self, catalog: &Catalog) -> f64 {
        if self.favorites.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .favorites
            .iter()
            .filter_map(|id| catalog.get_by_id(*id))
            .map(|destination| destination.rating)
            .sum();
        total / self.favorites.len() as f64
    }

    pub fn to_json(&self) -> Result<String, GalleryError> {
        Ok(serde_json::to_string(self)?)
    }
}

// Pricing helpers: tax on top of a base price, then a percentage discount
pub const DEFAULT_TAX_RATE: f64 = 0.08;

pub fn price_with_tax(base_price: f64, tax_rate: f64) -> f64 {
    base_price + base_price * tax_rate
}

pub fn apply_discount(price: f64, discount_percent: f64) -> f64 {
    price - price * (discount_percent / 100.0)
}
