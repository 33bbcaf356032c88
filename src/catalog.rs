// Destination catalog: the static, ordered list of destinations shown in the gallery

use crate::error::GalleryError;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(pub u32);

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for DestinationId {
    fn from(id: u32) -> Self {
        DestinationId(id)
    }
}

// Only Snow changes what gets rendered, the rest are tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherEffect {
    #[default]
    None,
    Snow,
    Clear,
    Tropical,
    Mountain,
    Sunny,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationRecord {
    pub id: DestinationId,
    pub title: String,
    pub country: String,
    pub description: String,
    pub price: String,
    pub image_style: String,
    pub features: Vec<String>,
    pub rating: f64,
    #[serde(default)]
    pub weather_effect: WeatherEffect,
}

impl DestinationRecord {
    // "$1,299" -> 1299
    pub fn price_value(&self) -> u64 {
        parse_price(&self.price)
    }
}

// Keeps only the digits of a display price. A price without digits derives 0.
pub fn parse_price(price: &str) -> u64 {
    price
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(digit as u64)
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    destinations: Vec<DestinationRecord>,
}

impl Catalog {
    pub fn new(destinations: Vec<DestinationRecord>) -> Result<Self, GalleryError> {
        let mut seen = HashSet::new();
        for destination in &destinations {
            if destination.id.0 == 0 {
                return Err(GalleryError::InvalidCatalog(format!(
                    "destination '{}' has id 0",
                    destination.title
                )));
            }
            if !seen.insert(destination.id) {
                return Err(GalleryError::InvalidCatalog(format!(
                    "duplicate destination id {}",
                    destination.id
                )));
            }
            if !(0.0..=5.0).contains(&destination.rating) {
                return Err(GalleryError::InvalidCatalog(format!(
                    "rating {} of destination {} is outside 0.0..=5.0",
                    destination.rating, destination.id
                )));
            }
        }
        Ok(Self { destinations })
    }

    // Parse a JSON array of destination records
    pub fn from_json(json: &str) -> Result<Self, GalleryError> {
        let destinations: Vec<DestinationRecord> = serde_json::from_str(json)?;
        Self::new(destinations)
    }

    pub fn to_json(&self) -> Result<String, GalleryError> {
        Ok(serde_json::to_string_pretty(&self.destinations)?)
    }

    pub fn get_by_id(&self, id: DestinationId) -> Option<&DestinationRecord> {
        self.destinations.iter().find(|d| d.id == id)
    }

    pub fn all(&self) -> &[DestinationRecord] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    // Inclusive on both ends
    pub fn filter_by_price_range(&self, min: u64, max: u64) -> Vec<&DestinationRecord> {
        self.destinations
            .iter()
            .filter(|d| {
                let price = d.price_value();
                price >= min && price <= max
            })
            .collect()
    }

    // Stable sort on a copy of the references, the catalog itself is untouched
    pub fn sort_by_rating(&self, ascending: bool) -> Vec<&DestinationRecord> {
        let mut sorted: Vec<&DestinationRecord> = self.destinations.iter().collect();
        sorted.sort_by(|a, b| {
            let ordering = a.rating.total_cmp(&b.rating);
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
        sorted
    }

    pub fn random_destination<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Option<&DestinationRecord> {
        if self.destinations.is_empty() {
            return None;
        }
        self.destinations.get(rng.next_index(self.destinations.len()))
    }

    // The six destinations of the travel page
    pub fn builtin() -> Self {
        Self {
            destinations: builtin_destinations(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn record(
    id: u32,
    title: &str,
    country: &str,
    description: &str,
    price: &str,
    image_style: &str,
    features: [&str; 3],
    rating: f64,
    weather_effect: WeatherEffect,
) -> DestinationRecord {
    DestinationRecord {
        id: DestinationId(id),
        title: title.to_string(),
        country: country.to_string(),
        description: description.to_string(),
        price: price.to_string(),
        image_style: image_style.to_string(),
        features: features.iter().map(|f| f.to_string()).collect(),
        rating,
        weather_effect,
    }
}

fn builtin_destinations() -> Vec<DestinationRecord> {
    vec![
        record(
            1,
            "Santorini",
            "Greece",
            "Breathtaking sunsets, white-washed buildings, and crystal-clear waters make this Greek island paradise unforgettable.",
            "$899",
            "linear-gradient(45deg, #ff9a9e 0%, #fecfef 50%, #fecfef 100%)",
            ["Sunset Views", "Beach Resort", "Historic Sites"],
            4.9,
            WeatherEffect::Sunny,
        ),
        record(
            2,
            "Swiss Alps",
            "Switzerland",
            "Majestic mountain peaks, pristine lakes, and charming alpine villages offer the perfect escape for nature lovers.",
            "$1,299",
            "linear-gradient(45deg, #a8edea 0%, #fed6e3 50%, #d299c2 100%)",
            ["Mountain Views", "Ski Resort", "Adventure Sports"],
            4.8,
            WeatherEffect::Snow,
        ),
        record(
            3,
            "Tokyo",
            "Japan",
            "A vibrant metropolis where ancient traditions blend seamlessly with cutting-edge technology and incredible cuisine.",
            "$1,099",
            "linear-gradient(45deg, #ffecd2 0%, #fcb69f 50%, #ff8a80 100%)",
            ["City Life", "Cultural Sites", "Amazing Food"],
            4.7,
            WeatherEffect::Clear,
        ),
        record(
            4,
            "Bali",
            "Indonesia",
            "Tropical paradise with lush rice terraces, ancient temples, pristine beaches, and a rich cultural heritage.",
            "$799",
            "linear-gradient(45deg, #a8ff78 0%, #78ffd6 50%, #56ccf2 100%)",
            ["Tropical Beach", "Temples", "Spa Retreats"],
            4.6,
            WeatherEffect::Tropical,
        ),
        record(
            5,
            "Machu Picchu",
            "Peru",
            "Ancient Incan citadel high in the Andes mountains, offering mystical ruins and breathtaking panoramic views.",
            "$1,199",
            "linear-gradient(45deg, #667eea 0%, #764ba2 50%, #896ba7 100%)",
            ["Historic Ruins", "Hiking Trails", "Adventure"],
            4.9,
            WeatherEffect::Mountain,
        ),
        record(
            6,
            "Maldives",
            "Maldives",
            "Luxurious overwater bungalows, pristine coral reefs, and crystal-clear turquoise waters in this tropical paradise.",
            "$1,599",
            "linear-gradient(45deg, #84fab0 0%, #8fd3f4 50%, #5aa7f2 100%)",
            ["Luxury Resort", "Water Sports", "Private Beach"],
            4.8,
            WeatherEffect::Tropical,
        ),
    ]
}
