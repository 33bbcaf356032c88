// Render engine: turns catalog records into card views and mounts them

use crate::catalog::{Catalog, DestinationId, DestinationRecord, WeatherEffect};
use crate::config::{calculate_stagger_delay, GalleryConfig};
use crate::display::{CardView, DisplaySurface, SnowParticle};
use crate::random::RandomSource;
use crate::scheduler::{Scheduler, TimerEvent, TimerHandle};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const BOOK_LABEL: &str = "✈️ Book Now";
pub const FAVORITE_LABEL: &str = "❤️ Favorite";

// Entrance delay for the card at a given index
pub type StaggerFn = Arc<dyn Fn(usize) -> Duration + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedCard {
    pub id: DestinationId,
    pub entrance: TimerHandle,
}

#[derive(Clone)]
pub struct RenderEngine {
    stagger: StaggerFn,
    weather_effects: bool,
    snowflake_count: usize,
}

impl fmt::Debug for RenderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEngine")
            .field("weather_effects", &self.weather_effects)
            .field("snowflake_count", &self.snowflake_count)
            .finish_non_exhaustive()
    }
}

impl RenderEngine {
    pub fn from_config(config: &GalleryConfig) -> Self {
        let base = config.entrance_base_delay_ms;
        let increment = config.entrance_increment_ms;
        Self {
            stagger: Arc::new(move |index| calculate_stagger_delay(index, base, increment)),
            weather_effects: config.weather_effects,
            snowflake_count: config.snowflake_count,
        }
    }

    pub fn with_stagger(mut self, stagger: StaggerFn) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn with_weather_effects(mut self, enabled: bool) -> Self {
        self.weather_effects = enabled;
        self
    }

    pub fn stagger_delay(&self, index: usize) -> Duration {
        (self.stagger)(index)
    }

    pub fn build_card<R: RandomSource + ?Sized>(
        &self,
        destination: &DestinationRecord,
        rng: &mut R,
    ) -> CardView {
        let snow = if self.weather_effects && destination.weather_effect == WeatherEffect::Snow {
            self.snow_particles(rng)
        } else {
            Vec::new()
        };

        CardView {
            id: destination.id,
            title: destination.title.clone(),
            country: destination.country.clone(),
            description: destination.description.clone(),
            price_tag: destination.price.clone(),
            image_style: destination.image_style.clone(),
            features: destination.features.clone(),
            snow,
            book_label: BOOK_LABEL.to_string(),
            favorite_label: FAVORITE_LABEL.to_string(),
        }
    }

    fn snow_particles<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Vec<SnowParticle> {
        (0..self.snowflake_count)
            .map(|_| SnowParticle {
                left_percent: rng.next_unit() * 100.0,
                delay_secs: rng.next_unit() * 3.0,
                duration_secs: rng.next_unit() * 2.0 + 2.0,
            })
            .collect()
    }

    // Clears the surface, mounts one card per record in catalog order and schedules
    // each card's entrance transition.
    pub fn render_gallery<D, C, R>(
        &self,
        catalog: &Catalog,
        surface: &mut D,
        scheduler: &mut C,
        rng: &mut R,
    ) -> Vec<MountedCard>
    where
        D: DisplaySurface + ?Sized,
        C: Scheduler + ?Sized,
        R: RandomSource + ?Sized,
    {
        surface.clear_cards();

        let mounted: Vec<MountedCard> = catalog
            .all()
            .iter()
            .enumerate()
            .map(|(index, destination)| {
                surface.mount_card(self.build_card(destination, rng));
                let delay = self.stagger_delay(index);
                let entrance = scheduler.schedule(delay, TimerEvent::CardEntrance(destination.id));
                MountedCard {
                    id: destination.id,
                    entrance,
                }
            })
            .collect();

        tracing::debug!(cards = mounted.len(), "gallery rendered");
        mounted
    }
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::from_config(&GalleryConfig::default())
    }
}
