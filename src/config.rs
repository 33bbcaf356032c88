// Gallery configuration: timing constants and capability flags

use crate::error::GalleryError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// All delays are in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub booking_delay_ms: u64,
    pub booked_display_ms: u64,
    pub favorite_display_ms: u64,
    pub notification_display_ms: u64,
    pub entrance_base_delay_ms: u64,
    pub entrance_increment_ms: u64,
    pub sweep_increment_ms: u64,
    pub sweep_display_ms: u64,
    pub demo_delay_ms: u64,
    pub demo_card_increment_ms: u64,
    pub demo_card_display_ms: u64,
    pub demo_card_count: usize,
    pub confirmation_code_length: usize,
    pub snowflake_count: usize,
    pub weather_effects: bool,
    pub reset_cancels_pending: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            booking_delay_ms: 2500,
            booked_display_ms: 3000,
            favorite_display_ms: 4000,
            notification_display_ms: 4000,
            entrance_base_delay_ms: 200,
            entrance_increment_ms: 150,
            sweep_increment_ms: 100,
            sweep_display_ms: 3000,
            demo_delay_ms: 3000,
            demo_card_increment_ms: 500,
            demo_card_display_ms: 2000,
            demo_card_count: 2,
            confirmation_code_length: 8,
            snowflake_count: 10,
            weather_effects: true,
            reset_cancels_pending: true,
        }
    }
}

impl GalleryConfig {
    // Missing fields fall back to the defaults above
    pub fn from_json(json: &str) -> Result<Self, GalleryError> {
        let config: GalleryConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GalleryError> {
        if self.confirmation_code_length == 0 {
            return Err(GalleryError::InvalidConfig(
                "confirmation_code_length must be positive".to_string(),
            ));
        }
        if self.booking_delay_ms == 0 {
            return Err(GalleryError::InvalidConfig(
                "booking_delay_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn booking_delay(&self) -> Duration {
        Duration::from_millis(self.booking_delay_ms)
    }

    pub fn booked_display(&self) -> Duration {
        Duration::from_millis(self.booked_display_ms)
    }

    pub fn favorite_display(&self) -> Duration {
        Duration::from_millis(self.favorite_display_ms)
    }

    pub fn notification_display(&self) -> Duration {
        Duration::from_millis(self.notification_display_ms)
    }

    pub fn sweep_display(&self) -> Duration {
        Duration::from_millis(self.sweep_display_ms)
    }

    pub fn demo_delay(&self) -> Duration {
        Duration::from_millis(self.demo_delay_ms)
    }

    pub fn demo_card_display(&self) -> Duration {
        Duration::from_millis(self.demo_card_display_ms)
    }
}

// Staggered delay for the index-th element: base + index * increment
pub fn calculate_stagger_delay(index: usize, base_delay_ms: u64, increment_ms: u64) -> Duration {
    Duration::from_millis(base_delay_ms + index as u64 * increment_ms)
}
