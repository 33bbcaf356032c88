// User input understood by the gallery

use crate::catalog::DestinationId;
use crate::display::Highlight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    CloseModal,
    ResetAll,
    FavoriteSweep,
    BookingSweep,
    TravelTips,
}

impl Shortcut {
    // Key names as a keyboard event reports them, case-insensitive.
    // Unknown keys map to None and are ignored.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "escape" => Some(Shortcut::CloseModal),
            "r" => Some(Shortcut::ResetAll),
            "f" => Some(Shortcut::FavoriteSweep),
            "b" => Some(Shortcut::BookingSweep),
            "t" => Some(Shortcut::TravelTips),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    Favorite,
    Booking,
}

impl SweepKind {
    pub fn highlight(self) -> Highlight {
        match self {
            SweepKind::Favorite => Highlight::Favorite,
            SweepKind::Booking => Highlight::Booking,
        }
    }
}

// Part of a card that received a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTarget {
    Body,
    BookButton,
    FavoriteButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalTarget {
    CloseButton,
    Backdrop,
    Content,
    BookButton,
    FavoriteButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Key(Shortcut),
    CardClick {
        id: DestinationId,
        target: CardTarget,
    },
    ModalClick(ModalTarget),
    BookingDemo,
}
