// Gallery controller: owns the catalog, session state, per-card state and the display,
// and runs the booking / favorite / notification flows on top of an injected scheduler.

use crate::catalog::{Catalog, DestinationId, DestinationRecord};
use crate::config::{calculate_stagger_delay, GalleryConfig};
use crate::display::{
    BookingPhase, CardVisual, DisplaySurface, Highlight, ModalContent, Notification,
    NotificationKind,
};
use crate::error::GalleryError;
use crate::input::{CardTarget, ModalTarget, Shortcut, SweepKind, UserAction};
use crate::random::{choose_distinct, generate_confirmation_code, RandomSource};
use crate::render::{RenderEngine, StaggerFn};
use crate::scheduler::{Scheduler, TimerEvent, TimerHandle, VirtualClock};
use crate::session::{BookingHistoryEntry, BookingRecord, SessionState};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

// Source of "today" for booking dates
pub type Calendar = Box<dyn Fn() -> NaiveDate + Send>;

#[derive(Debug, Default)]
struct CardState {
    visual: CardVisual,
    entrance: Option<TimerHandle>,
    // Marker expiries and highlights
    visual_timers: Vec<TimerHandle>,
}

impl CardState {
    fn forget(&mut self, handle: TimerHandle) {
        if self.entrance == Some(handle) {
            self.entrance = None;
        }
        self.visual_timers.retain(|h| *h != handle);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GallerySnapshot {
    pub now_ms: u128,
    pub session: SessionState,
    pub cards: Vec<(DestinationId, CardVisual)>,
    pub overlay_active: bool,
    pub notification: Option<Notification>,
    pub modal: Option<ModalContent>,
}

pub struct GalleryController<D, R = StdRng, C = VirtualClock> {
    catalog: Catalog,
    config: GalleryConfig,
    session: SessionState,
    surface: D,
    rng: R,
    scheduler: C,
    renderer: RenderEngine,
    calendar: Calendar,
    // Mount order of the cards, keyed state below
    order: Vec<DestinationId>,
    cards: HashMap<DestinationId, CardState>,
    // Completion timers of in-flight bookings, mounted or not
    pending_bookings: HashMap<DestinationId, TimerHandle>,
    // Timers not owned by a card (booking demo)
    global_timers: Vec<TimerHandle>,
    overlay_active: bool,
    notification: Option<Notification>,
    modal: Option<ModalContent>,
}

impl<D, R, C> fmt::Debug for GalleryController<D, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalleryController")
            .field("destinations", &self.catalog.len())
            .field("cards", &self.order)
            .field("session", &self.session)
            .field("overlay_active", &self.overlay_active)
            .finish_non_exhaustive()
    }
}

impl<D: DisplaySurface> GalleryController<D, StdRng, VirtualClock> {
    // Built-in catalog, default timings, entropy-seeded randomness
    pub fn builtin(surface: D) -> Self {
        Self {
            catalog: Catalog::builtin(),
            renderer: RenderEngine::default(),
            config: GalleryConfig::default(),
            session: SessionState::new(),
            surface,
            rng: StdRng::from_entropy(),
            scheduler: VirtualClock::new(),
            calendar: Box::new(|| chrono::Local::now().date_naive()),
            order: Vec::new(),
            cards: HashMap::new(),
            pending_bookings: HashMap::new(),
            global_timers: Vec::new(),
            overlay_active: false,
            notification: None,
            modal: None,
        }
    }
}

impl<D, R, C> GalleryController<D, R, C>
where
    D: DisplaySurface,
    R: RandomSource,
    C: Scheduler,
{
    pub fn new(
        catalog: Catalog,
        config: GalleryConfig,
        surface: D,
        rng: R,
        scheduler: C,
    ) -> Result<Self, GalleryError> {
        config.validate()?;
        Ok(Self {
            catalog,
            renderer: RenderEngine::from_config(&config),
            config,
            session: SessionState::new(),
            surface,
            rng,
            scheduler,
            calendar: Box::new(|| chrono::Local::now().date_naive()),
            order: Vec::new(),
            cards: HashMap::new(),
            pending_bookings: HashMap::new(),
            global_timers: Vec::new(),
            overlay_active: false,
            notification: None,
            modal: None,
        })
    }

    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_stagger(mut self, stagger: StaggerFn) -> Self {
        self.renderer = self.renderer.with_stagger(stagger);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn card_ids(&self) -> &[DestinationId] {
        &self.order
    }

    pub fn card_visual(&self, id: DestinationId) -> Option<CardVisual> {
        self.cards.get(&id).map(|card| card.visual)
    }

    pub fn overlay_active(&self) -> bool {
        self.overlay_active
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn modal(&self) -> Option<&ModalContent> {
        self.modal.as_ref()
    }

    pub fn snapshot(&self) -> GallerySnapshot {
        GallerySnapshot {
            now_ms: self.scheduler.now().as_millis(),
            session: self.session.clone(),
            cards: self
                .order
                .iter()
                .filter_map(|id| self.cards.get(id).map(|card| (*id, card.visual)))
                .collect(),
            overlay_active: self.overlay_active,
            notification: self.notification.clone(),
            modal: self.modal.clone(),
        }
    }

    // Rendering

    // Remounts every card. Entrance, marker and highlight timers of the old cards are
    // cancelled, in-flight bookings carry over and their cards come back Pending.
    pub fn render_gallery(&mut self) {
        for (_, card) in self.cards.drain() {
            for handle in card.entrance.into_iter().chain(card.visual_timers) {
                self.scheduler.cancel(handle);
            }
        }

        let mounted = self.renderer.render_gallery(
            &self.catalog,
            &mut self.surface,
            &mut self.scheduler,
            &mut self.rng,
        );
        self.order = mounted.iter().map(|card| card.id).collect();
        for card in mounted {
            self.cards.insert(
                card.id,
                CardState {
                    entrance: Some(card.entrance),
                    ..CardState::default()
                },
            );
        }
        let pending: Vec<DestinationId> = self.pending_bookings.keys().copied().collect();
        for id in pending {
            self.update_visual(id, |visual| visual.phase = BookingPhase::Pending);
        }
    }

    // Booking flow: Idle -> Pending -> Booked -> Idle

    pub fn book_destination(&mut self, id: DestinationId) -> Result<(), GalleryError> {
        let title = self.lookup(id)?.title.clone();

        if self.pending_bookings.contains_key(&id) {
            tracing::debug!(%id, "booking already in flight, ignoring");
            return Ok(());
        }

        self.update_visual(id, |visual| visual.phase = BookingPhase::Pending);
        self.set_overlay(true);

        let handle = self
            .scheduler
            .schedule(self.config.booking_delay(), TimerEvent::BookingComplete(id));
        self.pending_bookings.insert(id, handle);
        tracing::debug!(%id, destination = %title, "booking started");
        Ok(())
    }

    fn complete_booking(&mut self, id: DestinationId) -> Result<(), GalleryError> {
        let title = self.lookup(id)?.title.clone();

        self.set_overlay(false);
        self.update_visual(id, |visual| visual.phase = BookingPhase::Booked);

        let confirmation_code =
            generate_confirmation_code(&mut self.rng, self.config.confirmation_code_length);
        let booking = BookingRecord {
            destination_name: title.clone(),
            confirmation_code: confirmation_code.clone(),
            booking_date: (self.calendar)(),
        };
        self.session.record_booking(id, booking);
        tracing::info!(%id, destination = %title, code = %confirmation_code, "booking confirmed");

        self.show_notification(
            format!("{} booked! Confirmation: {}", title, confirmation_code),
            NotificationKind::Success,
        );

        let handle = self.scheduler.schedule(
            self.config.booked_display(),
            TimerEvent::BookedMarkerExpired(id),
        );
        self.track(id, handle);
        Ok(())
    }

    // Favorites

    // Returns whether the destination is a favorite afterwards
    pub fn toggle_favorite(&mut self, id: DestinationId) -> Result<bool, GalleryError> {
        let title = self.lookup(id)?.title.clone();
        let is_favorite = self.session.toggle_favorite(id);

        if is_favorite {
            self.update_visual(id, |visual| visual.favorite = true);
            self.show_notification(
                format!("{} added to favorites! ❤️", title),
                NotificationKind::Favorite,
            );
            let handle = self.scheduler.schedule(
                self.config.favorite_display(),
                TimerEvent::FavoriteMarkerExpired(id),
            );
            self.track(id, handle);
        } else {
            self.update_visual(id, |visual| visual.favorite = false);
            self.show_notification(
                format!("{} removed from favorites", title),
                NotificationKind::Favorite,
            );
        }
        tracing::debug!(%id, is_favorite, "favorite toggled");
        Ok(is_favorite)
    }

    // Sweeps and demo

    // Visual sweep over every mounted card. Session state is left alone.
    pub fn animate_all(&mut self, kind: SweepKind) {
        let highlight = kind.highlight();
        let order = self.order.clone();
        for (index, id) in order.into_iter().enumerate() {
            let delay = calculate_stagger_delay(index, 0, self.config.sweep_increment_ms);
            let handle = self
                .scheduler
                .schedule(delay, TimerEvent::HighlightStart { id, highlight });
            self.track(id, handle);
        }

        match kind {
            SweepKind::Favorite => self.show_notification(
                "All destinations added to favorites! ❤️".to_string(),
                NotificationKind::Favorite,
            ),
            SweepKind::Booking => self.show_notification(
                "Booking all adventures! ✈️".to_string(),
                NotificationKind::Success,
            ),
        }
    }

    pub fn show_booking_demo(&mut self) {
        self.set_overlay(true);
        let handle = self
            .scheduler
            .schedule(self.config.demo_delay(), TimerEvent::DemoComplete);
        self.global_timers.push(handle);
    }

    fn complete_demo(&mut self) {
        self.set_overlay(false);
        self.show_notification(
            "Demo booking completed! Ready to travel! 🌍".to_string(),
            NotificationKind::Success,
        );

        let picked = choose_distinct(&mut self.rng, self.order.len(), self.config.demo_card_count);
        for (index, position) in picked.into_iter().enumerate() {
            let id = self.order[position];
            let delay = calculate_stagger_delay(index, 0, self.config.demo_card_increment_ms);
            let handle = self.scheduler.schedule(
                delay,
                TimerEvent::HighlightStart {
                    id,
                    highlight: Highlight::Booked,
                },
            );
            self.track(id, handle);
        }
    }

    // Reset

    // Clears favorites and bookings and returns every card to Idle. In-flight bookings
    // and the demo survive unless `reset_cancels_pending` is set, and whatever survives
    // still clears the overlay when it completes.
    pub fn reset_all(&mut self) {
        let cancel_pending = self.config.reset_cancels_pending;
        for card in self.cards.values_mut() {
            for handle in card.visual_timers.drain(..) {
                self.scheduler.cancel(handle);
            }
            card.visual = CardVisual {
                entered: card.visual.entered,
                ..CardVisual::default()
            };
        }
        if cancel_pending {
            for (_, handle) in self.pending_bookings.drain() {
                self.scheduler.cancel(handle);
            }
            for handle in self.global_timers.drain(..) {
                self.scheduler.cancel(handle);
            }
        }
        for id in &self.order {
            if let Some(card) = self.cards.get(id) {
                self.surface.update_card(*id, &card.visual);
            }
        }
        if cancel_pending {
            self.set_overlay(false);
        }

        self.session.clear();
        tracing::info!(cancel_pending, "gallery reset");
        self.show_notification(
            "All animations reset! Ready for new adventures! 🔄".to_string(),
            NotificationKind::Success,
        );
    }

    // Notification and modal surfaces

    // Single slot. Each message schedules its own hide and earlier hides are not
    // cancelled, so an older timer can hide a newer message.
    pub fn show_notification(&mut self, message: String, kind: NotificationKind) {
        let notification = Notification { message, kind };
        self.surface.show_notification(&notification);
        self.notification = Some(notification);
        self.scheduler.schedule(
            self.config.notification_display(),
            TimerEvent::HideNotification,
        );
    }

    pub fn show_travel_tips(&mut self) {
        self.open_modal(ModalContent::TravelTips);
    }

    pub fn show_destination_details(&mut self, id: DestinationId) -> Result<(), GalleryError> {
        let destination = self.lookup(id)?.clone();
        self.open_modal(ModalContent::DestinationDetails(destination));
        Ok(())
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.surface.close_modal();
    }

    fn open_modal(&mut self, content: ModalContent) {
        self.surface.show_modal(&content);
        self.modal = Some(content);
    }

    // Input

    pub fn click_card(&mut self, id: DestinationId, target: CardTarget) -> Result<(), GalleryError> {
        match target {
            CardTarget::Body => self.show_destination_details(id),
            CardTarget::BookButton => self.book_destination(id),
            CardTarget::FavoriteButton => self.toggle_favorite(id).map(|_| ()),
        }
    }

    pub fn click_modal(&mut self, target: ModalTarget) -> Result<(), GalleryError> {
        match target {
            ModalTarget::CloseButton | ModalTarget::Backdrop => self.close_modal(),
            ModalTarget::Content => {}
            ModalTarget::BookButton | ModalTarget::FavoriteButton => {
                let Some(id) = self.modal.as_ref().and_then(|m| m.destination_id()) else {
                    return Ok(());
                };
                let result = if target == ModalTarget::BookButton {
                    self.book_destination(id)
                } else {
                    self.toggle_favorite(id).map(|_| ())
                };
                self.close_modal();
                result?;
            }
        }
        Ok(())
    }

    pub fn press_shortcut(&mut self, shortcut: Shortcut) {
        match shortcut {
            Shortcut::CloseModal => self.close_modal(),
            Shortcut::ResetAll => self.reset_all(),
            Shortcut::FavoriteSweep => self.animate_all(SweepKind::Favorite),
            Shortcut::BookingSweep => self.animate_all(SweepKind::Booking),
            Shortcut::TravelTips => self.show_travel_tips(),
        }
    }

    // Returns the shortcut the key mapped to, None if the key was ignored
    pub fn handle_key(&mut self, key: &str) -> Option<Shortcut> {
        let shortcut = Shortcut::from_key(key)?;
        self.press_shortcut(shortcut);
        Some(shortcut)
    }

    // Entry point for user input. Failures are logged and leave state untouched.
    pub fn handle_action(&mut self, action: UserAction) {
        let result = match action {
            UserAction::Key(shortcut) => {
                self.press_shortcut(shortcut);
                Ok(())
            }
            UserAction::CardClick { id, target } => self.click_card(id, target),
            UserAction::ModalClick(target) => self.click_modal(target),
            UserAction::BookingDemo => {
                self.show_booking_demo();
                Ok(())
            }
        };
        if let Err(e) = result {
            tracing::error!(?action, "{}", e);
        }
    }

    // Time

    pub fn advance(&mut self, by: Duration) -> usize {
        let target = self.scheduler.now() + by;
        self.advance_to(target)
    }

    // Fires every timer due up to `target`, including ones scheduled while firing
    pub fn advance_to(&mut self, target: Duration) -> usize {
        let mut fired = 0;
        while let Some((handle, event)) = self.scheduler.pop_due(target) {
            self.dispatch(handle, event);
            fired += 1;
        }
        self.scheduler.settle(target);
        fired
    }

    fn dispatch(&mut self, handle: TimerHandle, event: TimerEvent) {
        tracing::trace!(?event, "timer fired");
        match event {
            TimerEvent::CardEntrance(id) => {
                self.forget(id, handle);
                self.update_visual(id, |visual| visual.entered = true);
            }
            TimerEvent::BookingComplete(id) => {
                if self.pending_bookings.get(&id) == Some(&handle) {
                    self.pending_bookings.remove(&id);
                }
                if let Err(e) = self.complete_booking(id) {
                    tracing::error!("booking could not complete: {}", e);
                }
            }
            TimerEvent::BookedMarkerExpired(id) => {
                self.forget(id, handle);
                self.update_visual(id, |visual| {
                    if visual.phase == BookingPhase::Booked {
                        visual.phase = BookingPhase::Idle;
                    }
                });
            }
            TimerEvent::FavoriteMarkerExpired(id) => {
                self.forget(id, handle);
                self.update_visual(id, |visual| visual.favorite = false);
            }
            TimerEvent::HighlightStart { id, highlight } => {
                self.forget(id, handle);
                self.update_visual(id, |visual| visual.highlight = Some(highlight));
                let duration = match highlight {
                    Highlight::Booked => self.config.demo_card_display(),
                    Highlight::Favorite | Highlight::Booking => self.config.sweep_display(),
                };
                let end = self.scheduler.schedule(duration, TimerEvent::HighlightEnd(id));
                self.track(id, end);
            }
            TimerEvent::HighlightEnd(id) => {
                self.forget(id, handle);
                self.update_visual(id, |visual| visual.highlight = None);
            }
            TimerEvent::HideNotification => {
                self.notification = None;
                self.surface.hide_notification();
            }
            TimerEvent::DemoComplete => {
                self.global_timers.retain(|h| *h != handle);
                self.complete_demo();
            }
        }
    }

    // Aggregates

    pub fn calculate_total_cost(&self, ids: &[DestinationId]) -> u64 {
        SessionState::calculate_total_cost(&self.catalog, ids)
    }

    pub fn booking_history(&self) -> Vec<BookingHistoryEntry> {
        self.session.booking_history(&self.catalog)
    }

    pub fn average_favorite_rating(&self) -> f64 {
        self.session.average_favorite_rating(&self.catalog)
    }

    // Helpers

    fn lookup(&self, id: DestinationId) -> Result<&DestinationRecord, GalleryError> {
        self.catalog.get_by_id(id).ok_or_else(|| {
            tracing::error!(%id, "destination not found");
            GalleryError::NotFound(id)
        })
    }

    fn set_overlay(&mut self, active: bool) {
        self.overlay_active = active;
        self.surface.set_overlay(active);
    }

    // Cards that were never mounted have no visual state to update
    fn update_visual<F: FnOnce(&mut CardVisual)>(&mut self, id: DestinationId, update: F) {
        if let Some(card) = self.cards.get_mut(&id) {
            update(&mut card.visual);
            self.surface.update_card(id, &card.visual);
        }
    }

    fn track(&mut self, id: DestinationId, handle: TimerHandle) {
        if let Some(card) = self.cards.get_mut(&id) {
            card.visual_timers.push(handle);
        }
    }

    fn forget(&mut self, id: DestinationId, handle: TimerHandle) {
        if let Some(card) = self.cards.get_mut(&id) {
            card.forget(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MemorySurface;
    use crate::random::SequenceRandom;
    use std::sync::Arc;

    type TestController = GalleryController<MemorySurface, SequenceRandom, VirtualClock>;

    const SANTORINI: DestinationId = DestinationId(1);
    const ALPS: DestinationId = DestinationId(2);
    const TOKYO: DestinationId = DestinationId(3);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn controller_with(config: GalleryConfig) -> TestController {
        let mut controller = GalleryController::new(
            Catalog::builtin(),
            config,
            MemorySurface::new(),
            SequenceRandom::new(vec![7, 30, 1, 18, 26, 4, 35, 12]),
            VirtualClock::new(),
        )
        .unwrap()
        .with_calendar(Box::new(|| NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()));
        controller.render_gallery();
        controller
    }

    fn controller() -> TestController {
        controller_with(GalleryConfig::default())
    }

    fn phase(controller: &TestController, id: DestinationId) -> BookingPhase {
        controller.card_visual(id).unwrap().phase
    }

    fn is_confirmation_code(code: &str) -> bool {
        code.len() == 8
            && code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    }

    #[test]
    fn test_booking_flow_timeline() {
        let mut gallery = controller();

        gallery.book_destination(SANTORINI).unwrap();
        assert_eq!(phase(&gallery, SANTORINI), BookingPhase::Pending);
        assert!(gallery.overlay_active());
        assert!(gallery.surface().overlay_active());

        // Not booked while pending
        gallery.advance(ms(2499));
        assert!(gallery.session().booking(SANTORINI).is_none());
        assert_eq!(phase(&gallery, SANTORINI), BookingPhase::Pending);

        gallery.advance(ms(1));
        let booking = gallery.session().booking(SANTORINI).unwrap().clone();
        assert_eq!(booking.destination_name, "Santorini");
        assert!(is_confirmation_code(&booking.confirmation_code));
        // Rendering the Alps snow consumed the first 30 draws
        assert_eq!(booking.confirmation_code, "9MH4BS0E");
        assert_eq!(booking.formatted_date(), "10/19/2026");
        assert_eq!(phase(&gallery, SANTORINI), BookingPhase::Booked);
        assert!(!gallery.overlay_active());
        assert_eq!(
            gallery.notification().unwrap().message,
            format!("Santorini booked! Confirmation: {}", booking.confirmation_code)
        );
        assert_eq!(
            gallery.surface().visual(SANTORINI).phase,
            BookingPhase::Booked
        );

        gallery.advance(ms(3000));
        assert_eq!(phase(&gallery, SANTORINI), BookingPhase::Idle);
        assert_eq!(gallery.session().booking(SANTORINI), Some(&booking));
    }

    #[test]
    fn test_booking_unknown_destination_fails_closed() {
        let mut gallery = controller();
        let before = gallery.snapshot();

        let err = gallery.book_destination(DestinationId(999)).unwrap_err();
        assert!(matches!(err, GalleryError::NotFound(DestinationId(999))));
        assert!(gallery.toggle_favorite(DestinationId(999)).is_err());
        assert!(gallery.show_destination_details(DestinationId(999)).is_err());

        assert_eq!(gallery.snapshot(), before);
        assert!(!gallery.overlay_active());
    }

    #[test]
    fn test_rebooking_while_pending_is_ignored() {
        let mut gallery = controller();
        gallery.book_destination(SANTORINI).unwrap();
        gallery.advance(ms(1000));
        gallery.book_destination(SANTORINI).unwrap();

        // Completion still happens at the first booking's deadline
        gallery.advance(ms(1500));
        assert!(gallery.session().booking(SANTORINI).is_some());
        assert_eq!(phase(&gallery, SANTORINI), BookingPhase::Booked);
    }

    #[test]
    fn test_concurrent_bookings_share_the_overlay() {
        let mut gallery = controller();
        gallery.book_destination(SANTORINI).unwrap();
        gallery.advance(ms(1000));
        gallery.book_destination(TOKYO).unwrap();

        // First completion hides the overlay while Tokyo is still pending
        gallery.advance(ms(1500));
        assert!(!gallery.overlay_active());
        assert_eq!(phase(&gallery, TOKYO), BookingPhase::Pending);

        gallery.advance(ms(1000));
        assert_eq!(gallery.session().bookings().len(), 2);
    }

    #[test]
    fn test_favorite_toggle() {
        let mut gallery = controller();
        let before = gallery.session().clone();

        assert!(gallery.toggle_favorite(TOKYO).unwrap());
        assert!(gallery.session().is_favorite(TOKYO));
        assert!(gallery.card_visual(TOKYO).unwrap().favorite);
        assert_eq!(
            gallery.notification().unwrap(),
            &Notification {
                message: "Tokyo added to favorites! ❤️".to_string(),
                kind: NotificationKind::Favorite,
            }
        );

        assert!(!gallery.toggle_favorite(TOKYO).unwrap());
        assert_eq!(gallery.session(), &before);
        assert!(!gallery.card_visual(TOKYO).unwrap().favorite);
        assert_eq!(
            gallery.notification().unwrap().message,
            "Tokyo removed from favorites"
        );
    }

    #[test]
    fn test_favorite_marker_decays_but_membership_persists() {
        let mut gallery = controller();
        gallery.toggle_favorite(ALPS).unwrap();

        gallery.advance(ms(3999));
        assert!(gallery.card_visual(ALPS).unwrap().favorite);
        gallery.advance(ms(1));
        assert!(!gallery.card_visual(ALPS).unwrap().favorite);
        assert!(gallery.session().is_favorite(ALPS));
    }

    #[test]
    fn test_notification_last_hide_wins() {
        let mut gallery = controller();
        gallery.show_notification("first".to_string(), NotificationKind::Success);
        gallery.advance(ms(3000));
        gallery.show_notification("second".to_string(), NotificationKind::Favorite);

        // The first message's timer hides the second one early
        gallery.advance(ms(1000));
        assert!(gallery.notification().is_none());
        assert!(gallery.surface().notification().is_none());

        // "second" still has a hide pending at 7000 ms
        gallery.show_notification("third".to_string(), NotificationKind::Success);
        gallery.advance(ms(2999));
        assert_eq!(gallery.notification().unwrap().message, "third");
        gallery.advance(ms(1));
        assert!(gallery.notification().is_none());
        assert_eq!(gallery.surface().notification_log().len(), 3);
    }

    #[test]
    fn test_modal_dismissal() {
        let mut gallery = controller();

        gallery.click_card(TOKYO, CardTarget::Body).unwrap();
        assert_eq!(gallery.modal().unwrap().heading(), "🌟 Tokyo, Japan");
        assert_eq!(gallery.handle_key("Escape"), Some(Shortcut::CloseModal));
        assert!(gallery.modal().is_none());
        assert!(gallery.surface().modal().is_none());

        gallery.handle_key("t");
        assert_eq!(gallery.modal(), Some(&ModalContent::TravelTips));
        gallery.click_modal(ModalTarget::Content).unwrap();
        assert!(gallery.modal().is_some());
        gallery.click_modal(ModalTarget::Backdrop).unwrap();
        assert!(gallery.modal().is_none());

        gallery.show_destination_details(ALPS).unwrap();
        // Content is replaced wholesale
        gallery.show_travel_tips();
        assert_eq!(gallery.modal(), Some(&ModalContent::TravelTips));
        gallery.click_modal(ModalTarget::CloseButton).unwrap();
        assert!(gallery.modal().is_none());
    }

    #[test]
    fn test_card_buttons_do_not_open_details() {
        let mut gallery = controller();
        gallery.click_card(ALPS, CardTarget::FavoriteButton).unwrap();
        gallery.click_card(ALPS, CardTarget::BookButton).unwrap();
        assert!(gallery.modal().is_none());
        assert!(gallery.session().is_favorite(ALPS));
        assert_eq!(phase(&gallery, ALPS), BookingPhase::Pending);
    }

    #[test]
    fn test_details_modal_actions_close_modal() {
        let mut gallery = controller();
        gallery.show_destination_details(SANTORINI).unwrap();
        gallery.click_modal(ModalTarget::BookButton).unwrap();
        assert!(gallery.modal().is_none());
        assert_eq!(phase(&gallery, SANTORINI), BookingPhase::Pending);

        gallery.show_destination_details(TOKYO).unwrap();
        gallery.click_modal(ModalTarget::FavoriteButton).unwrap();
        assert!(gallery.modal().is_none());
        assert!(gallery.session().is_favorite(TOKYO));

        // Tips modal has no destination to act on
        gallery.show_travel_tips();
        gallery.click_modal(ModalTarget::BookButton).unwrap();
        assert_eq!(gallery.modal(), Some(&ModalContent::TravelTips));
    }

    #[test]
    fn test_reset_clears_session_and_cards() {
        let mut gallery = controller();
        gallery.toggle_favorite(TOKYO).unwrap();
        gallery.book_destination(SANTORINI).unwrap();
        gallery.advance(ms(2500));
        gallery.book_destination(ALPS).unwrap();
        gallery.handle_key("f");
        gallery.advance(ms(100));

        assert_eq!(gallery.handle_key("r"), Some(Shortcut::ResetAll));
        assert!(gallery.session().is_empty());
        for id in gallery.card_ids().to_vec() {
            let visual = gallery.card_visual(id).unwrap();
            assert_eq!(visual.phase, BookingPhase::Idle);
            assert!(!visual.favorite);
            assert_eq!(visual.highlight, None);
            assert_eq!(gallery.surface().visual(id), visual);
        }
        assert!(!gallery.overlay_active());
        assert_eq!(
            gallery.notification().unwrap().message,
            "All animations reset! Ready for new adventures! 🔄"
        );

        // The pending Alps booking was cancelled
        gallery.advance(ms(10_000));
        assert!(gallery.session().booking(ALPS).is_none());
        assert!(gallery
            .card_ids()
            .iter()
            .all(|id| gallery.card_visual(*id).unwrap().phase == BookingPhase::Idle));
    }

    #[test]
    fn test_reset_without_pending_cancellation_lets_booking_land() {
        let mut gallery = controller_with(GalleryConfig {
            reset_cancels_pending: false,
            ..GalleryConfig::default()
        });
        gallery.book_destination(TOKYO).unwrap();
        gallery.advance(ms(1000));
        gallery.reset_all();

        assert_eq!(phase(&gallery, TOKYO), BookingPhase::Idle);
        assert!(gallery.overlay_active());

        gallery.advance(ms(1500));
        assert!(gallery.session().booking(TOKYO).is_some());
        assert_eq!(phase(&gallery, TOKYO), BookingPhase::Booked);
    }

    #[test]
    fn test_rerender_keeps_booking_cancellable_by_reset() {
        let mut gallery = controller();
        gallery.book_destination(SANTORINI).unwrap();
        gallery.advance(ms(1000));
        gallery.handle_key("f");
        // Booking, six sweep highlights and the sweep notification's hide
        assert_eq!(gallery.pending_timers(), 8);

        gallery.render_gallery();
        assert_eq!(phase(&gallery, SANTORINI), BookingPhase::Pending);
        assert_eq!(
            gallery.surface().visual(SANTORINI).phase,
            BookingPhase::Pending
        );
        gallery.advance(ms(1000));
        assert_eq!(gallery.pending_timers(), 2);
        assert!(gallery
            .card_ids()
            .iter()
            .all(|id| gallery.card_visual(*id).unwrap().highlight.is_none()));

        gallery.reset_all();
        // Only the two notification hides remain
        assert_eq!(gallery.pending_timers(), 2);
        gallery.advance(ms(5000));
        assert_eq!(gallery.pending_timers(), 0);
        assert!(gallery.session().booking(SANTORINI).is_none());
        assert_eq!(phase(&gallery, SANTORINI), BookingPhase::Idle);
        assert!(!gallery.overlay_active());
    }

    #[test]
    fn test_reset_cancels_booking_of_unmounted_card() {
        let mut gallery = GalleryController::new(
            Catalog::builtin(),
            GalleryConfig::default(),
            MemorySurface::new(),
            SequenceRandom::new(vec![0]),
            VirtualClock::new(),
        )
        .unwrap();
        gallery.book_destination(TOKYO).unwrap();
        assert_eq!(gallery.pending_timers(), 1);

        gallery.reset_all();
        assert_eq!(gallery.pending_timers(), 1);
        gallery.advance(ms(5000));
        assert!(gallery.session().booking(TOKYO).is_none());
    }

    #[test]
    fn test_reset_cancels_booking_demo() {
        let mut gallery = controller();
        gallery.advance(ms(1000));
        gallery.show_booking_demo();
        gallery.reset_all();

        assert!(!gallery.overlay_active());
        assert_eq!(gallery.pending_timers(), 1);
        gallery.advance(ms(60_000));
        assert!(!gallery.overlay_active());
        assert!(gallery.notification().is_none());
        assert!(gallery
            .card_ids()
            .iter()
            .all(|id| gallery.card_visual(*id).unwrap().highlight.is_none()));
    }

    #[test]
    fn test_demo_survives_reset_and_clears_overlay() {
        let mut gallery = controller_with(GalleryConfig {
            reset_cancels_pending: false,
            ..GalleryConfig::default()
        });
        gallery.advance(ms(1000));
        gallery.show_booking_demo();
        gallery.reset_all();

        assert!(gallery.overlay_active());
        // Demo completion and the reset notification's hide
        assert_eq!(gallery.pending_timers(), 2);
        gallery.advance(ms(3000));
        assert!(!gallery.overlay_active());
        assert_eq!(
            gallery.notification().unwrap().message,
            "Demo booking completed! Ready to travel! 🌍"
        );
    }

    #[test]
    fn test_surviving_booking_blocks_second_booking() {
        let mut gallery = controller_with(GalleryConfig {
            reset_cancels_pending: false,
            ..GalleryConfig::default()
        });
        gallery.advance(ms(1000));
        gallery.book_destination(TOKYO).unwrap();
        gallery.advance(ms(1000));
        gallery.reset_all();
        assert_eq!(phase(&gallery, TOKYO), BookingPhase::Idle);

        gallery.book_destination(TOKYO).unwrap();
        assert_eq!(gallery.pending_timers(), 2);

        gallery.advance(ms(1500));
        assert!(gallery.session().booking(TOKYO).is_some());
        assert_eq!(phase(&gallery, TOKYO), BookingPhase::Booked);
        // Only the booked marker and the notification hides are left
        assert_eq!(gallery.pending_timers(), 3);
    }

    #[test]
    fn test_sweep_is_staggered_and_visual_only() {
        let mut gallery = controller();
        gallery.animate_all(SweepKind::Favorite);
        assert_eq!(
            gallery.notification().unwrap().message,
            "All destinations added to favorites! ❤️"
        );

        gallery.advance(ms(150));
        let ids = gallery.card_ids().to_vec();
        assert_eq!(
            gallery.card_visual(ids[1]).unwrap().highlight,
            Some(Highlight::Favorite)
        );
        assert_eq!(gallery.card_visual(ids[2]).unwrap().highlight, None);

        gallery.advance(ms(500));
        assert!(ids
            .iter()
            .all(|id| gallery.card_visual(*id).unwrap().highlight == Some(Highlight::Favorite)));
        assert_eq!(gallery.session().favorite_count(), 0);

        gallery.advance(ms(3000));
        assert!(ids
            .iter()
            .all(|id| gallery.card_visual(*id).unwrap().highlight.is_none()));

        gallery.handle_key("B");
        assert_eq!(
            gallery.notification().unwrap(),
            &Notification {
                message: "Booking all adventures! ✈️".to_string(),
                kind: NotificationKind::Success,
            }
        );
        assert!(gallery.session().bookings().is_empty());
    }

    #[test]
    fn test_booking_demo() {
        let mut gallery = controller();
        gallery.handle_action(UserAction::BookingDemo);
        assert!(gallery.overlay_active());

        gallery.advance(ms(3000));
        assert!(!gallery.overlay_active());
        assert_eq!(
            gallery.notification().unwrap().message,
            "Demo booking completed! Ready to travel! 🌍"
        );

        gallery.advance(ms(500));
        let flashing: Vec<DestinationId> = gallery
            .card_ids()
            .iter()
            .copied()
            .filter(|id| gallery.card_visual(*id).unwrap().highlight == Some(Highlight::Booked))
            .collect();
        assert_eq!(flashing.len(), 2);
        assert!(gallery.session().bookings().is_empty());

        gallery.advance(ms(2000));
        assert!(gallery
            .card_ids()
            .iter()
            .all(|id| gallery.card_visual(*id).unwrap().highlight.is_none()));
    }

    #[test]
    fn test_entrance_with_injected_stagger() {
        let mut gallery = GalleryController::new(
            Catalog::builtin(),
            GalleryConfig::default(),
            MemorySurface::new(),
            SequenceRandom::new(vec![0]),
            VirtualClock::new(),
        )
        .unwrap()
        .with_stagger(Arc::new(|index| Duration::from_millis(1000 * index as u64)));
        gallery.render_gallery();

        assert!(gallery
            .card_ids()
            .iter()
            .all(|id| !gallery.card_visual(*id).unwrap().entered));
        gallery.advance(ms(1000));
        let entered: Vec<bool> = gallery
            .card_ids()
            .iter()
            .map(|id| gallery.card_visual(*id).unwrap().entered)
            .collect();
        assert_eq!(entered, vec![true, true, false, false, false, false]);
    }

    #[test]
    fn test_handle_action_swallows_not_found() {
        let mut gallery = controller();
        gallery.handle_action(UserAction::CardClick {
            id: DestinationId(42),
            target: CardTarget::BookButton,
        });
        assert!(!gallery.overlay_active());
        assert_eq!(gallery.pending_timers(), 6);
    }

    #[test]
    fn test_aggregates() {
        let mut gallery = controller();
        assert_eq!(
            gallery.calculate_total_cost(&[SANTORINI, ALPS, DestinationId(999)]),
            2198
        );
        assert_eq!(gallery.average_favorite_rating(), 0.0);

        gallery.toggle_favorite(SANTORINI).unwrap();
        gallery.toggle_favorite(TOKYO).unwrap();
        assert!((gallery.average_favorite_rating() - 4.8).abs() < 1e-9);

        gallery.book_destination(TOKYO).unwrap();
        gallery.advance(ms(2500));
        let history = gallery.booking_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].destination_id, TOKYO);
        assert_eq!(history[0].destination.country, "Japan");
    }

    #[test]
    fn test_runs_on_tracing_surface() {
        let mut gallery = GalleryController::builtin(crate::display::TracingSurface);
        gallery.render_gallery();
        gallery.book_destination(ALPS).unwrap();
        gallery.advance(ms(6000));
        assert!(gallery.session().booking(ALPS).is_some());
    }
}
