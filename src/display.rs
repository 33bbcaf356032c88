// Display surface: the commands the gallery sends to whatever draws it

use crate::catalog::{DestinationId, DestinationRecord};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BookingPhase {
    #[default]
    Idle,
    Pending,
    Booked,
}

// Transient card animations that are not tied to session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Highlight {
    Favorite,
    Booking,
    Booked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CardVisual {
    pub phase: BookingPhase,
    pub favorite: bool,
    pub entered: bool,
    pub highlight: Option<Highlight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnowParticle {
    pub left_percent: f64,
    pub delay_secs: f64,
    pub duration_secs: f64,
}

// Everything needed to draw one card. Action buttons act on `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub id: DestinationId,
    pub title: String,
    pub country: String,
    pub description: String,
    pub price_tag: String,
    pub image_style: String,
    pub features: Vec<String>,
    pub snow: Vec<SnowParticle>,
    pub book_label: String,
    pub favorite_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationKind {
    Success,
    Favorite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ModalContent {
    TravelTips,
    DestinationDetails(DestinationRecord),
}

impl ModalContent {
    pub fn heading(&self) -> String {
        match self {
            ModalContent::TravelTips => "Travel Tips".to_string(),
            ModalContent::DestinationDetails(d) => format!("🌟 {}, {}", d.title, d.country),
        }
    }

    pub fn body(&self) -> Vec<String> {
        match self {
            ModalContent::TravelTips => Vec::new(),
            ModalContent::DestinationDetails(d) => {
                let mut lines = vec![
                    format!("Price: {} per person", d.price),
                    format!("Rating: ⭐ {}/5.0", d.rating),
                    d.description.clone(),
                ];
                lines.push(d.features.join(" · "));
                lines
            }
        }
    }

    pub fn destination_id(&self) -> Option<DestinationId> {
        match self {
            ModalContent::TravelTips => None,
            ModalContent::DestinationDetails(d) => Some(d.id),
        }
    }
}

pub trait DisplaySurface {
    fn clear_cards(&mut self);

    fn mount_card(&mut self, card: CardView);

    fn update_card(&mut self, id: DestinationId, visual: &CardVisual);

    fn set_overlay(&mut self, active: bool);

    fn show_notification(&mut self, notification: &Notification);

    fn hide_notification(&mut self);

    fn show_modal(&mut self, content: &ModalContent);

    fn close_modal(&mut self);
}

// Keeps the latest state of every surface so it can be inspected
#[derive(Debug, Default, Clone, Serialize)]
pub struct MemorySurface {
    cards: Vec<CardView>,
    visuals: HashMap<DestinationId, CardVisual>,
    overlay_active: bool,
    notification: Option<Notification>,
    notification_log: Vec<Notification>,
    modal: Option<ModalContent>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[CardView] {
        &self.cards
    }

    pub fn card(&self, id: DestinationId) -> Option<&CardView> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn visual(&self, id: DestinationId) -> CardVisual {
        self.visuals.get(&id).copied().unwrap_or_default()
    }

    pub fn overlay_active(&self) -> bool {
        self.overlay_active
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn notification_log(&self) -> &[Notification] {
        &self.notification_log
    }

    pub fn modal(&self) -> Option<&ModalContent> {
        self.modal.as_ref()
    }
}

impl DisplaySurface for MemorySurface {
    fn clear_cards(&mut self) {
        self.cards.clear();
        self.visuals.clear();
    }

    fn mount_card(&mut self, card: CardView) {
        self.visuals.insert(card.id, CardVisual::default());
        self.cards.push(card);
    }

    fn update_card(&mut self, id: DestinationId, visual: &CardVisual) {
        self.visuals.insert(id, *visual);
    }

    fn set_overlay(&mut self, active: bool) {
        self.overlay_active = active;
    }

    fn show_notification(&mut self, notification: &Notification) {
        self.notification = Some(notification.clone());
        self.notification_log.push(notification.clone());
    }

    fn hide_notification(&mut self) {
        self.notification = None;
    }

    fn show_modal(&mut self, content: &ModalContent) {
        self.modal = Some(content.clone());
    }

    fn close_modal(&mut self) {
        self.modal = None;
    }
}

// Emits every display command as a tracing event. Useful for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSurface;

impl DisplaySurface for TracingSurface {
    fn clear_cards(&mut self) {
        tracing::info!(target: "gallery::display", "clear cards");
    }

    fn mount_card(&mut self, card: CardView) {
        tracing::info!(
            target: "gallery::display",
            id = %card.id,
            title = %card.title,
            price = %card.price_tag,
            snowflakes = card.snow.len(),
            "mount card"
        );
    }

    fn update_card(&mut self, id: DestinationId, visual: &CardVisual) {
        tracing::info!(target: "gallery::display", %id, ?visual, "update card");
    }

    fn set_overlay(&mut self, active: bool) {
        tracing::info!(target: "gallery::display", active, "booking overlay");
    }

    fn show_notification(&mut self, notification: &Notification) {
        tracing::info!(
            target: "gallery::display",
            kind = ?notification.kind,
            "{}",
            notification.message
        );
    }

    fn hide_notification(&mut self) {
        tracing::info!(target: "gallery::display", "hide notification");
    }

    fn show_modal(&mut self, content: &ModalContent) {
        tracing::info!(target: "gallery::display", heading = %content.heading(), "show modal");
    }

    fn close_modal(&mut self) {
        tracing::info!(target: "gallery::display", "close modal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_details_modal_content() {
        let catalog = Catalog::builtin();
        let santorini = catalog.get_by_id(DestinationId(1)).unwrap().clone();
        let modal = ModalContent::DestinationDetails(santorini);

        assert_eq!(modal.heading(), "🌟 Santorini, Greece");
        assert_eq!(modal.destination_id(), Some(DestinationId(1)));
        let body = modal.body();
        assert_eq!(body[0], "Price: $899 per person");
        assert_eq!(body[1], "Rating: ⭐ 4.9/5.0");
        assert_eq!(body[3], "Sunset Views · Beach Resort · Historic Sites");

        assert_eq!(ModalContent::TravelTips.destination_id(), None);
    }

    #[test]
    fn test_memory_surface_single_slots() {
        let mut surface = MemorySurface::new();
        let first = Notification {
            message: "first".to_string(),
            kind: NotificationKind::Success,
        };
        let second = Notification {
            message: "second".to_string(),
            kind: NotificationKind::Favorite,
        };
        surface.show_notification(&first);
        surface.show_notification(&second);
        assert_eq!(surface.notification(), Some(&second));
        assert_eq!(surface.notification_log().len(), 2);

        surface.hide_notification();
        assert!(surface.notification().is_none());

        surface.show_modal(&ModalContent::TravelTips);
        assert_eq!(surface.modal(), Some(&ModalContent::TravelTips));
        surface.close_modal();
        assert!(surface.modal().is_none());
    }
}
