//! Live booking change feed.
//!
//! Mutating booking endpoints publish a [`BookingEvent`] onto a broadcast
//! channel held in Rocket managed state; the SSE endpoint in `api::booking`
//! forwards events to subscribed clients. [`BookingView`] is the reconciler
//! a consumer runs over its local list for one office and date.

use chrono::{DateTime, NaiveDate, Utc};
use rocket::tokio::sync::broadcast;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::booking::BookingWithDetails;

/// How long a changed asset stays highlighted on the map, in milliseconds.
pub const HIGHLIGHT_WINDOW_MS: i64 = 2000;

const FEED_CAPACITY: usize = 256;

/// A change to the bookings table, as published to feed subscribers.
///
/// Inserts carry the full joined record so subscribers can apply them
/// without a read of their own. Deletes carry only the id. Updates name
/// the row but not its new contents; subscribers refetch.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "op", rename_all = "snake_case")]
#[ts(export)]
pub enum BookingEvent {
    Inserted { booking: BookingWithDetails },
    Deleted { booking_id: i32, asset_id: i32, office_id: i32, #[ts(type = "string")] date: NaiveDate },
    Updated { booking_id: i32, asset_id: i32, office_id: i32, #[ts(type = "string")] date: NaiveDate },
}

impl BookingEvent {
    pub fn office_id(&self) -> i32 {
        match self {
            BookingEvent::Inserted { booking } => booking.asset.office_id,
            BookingEvent::Deleted { office_id, .. } => *office_id,
            BookingEvent::Updated { office_id, .. } => *office_id,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            BookingEvent::Inserted { booking } => booking.date,
            BookingEvent::Deleted { date, .. } => *date,
            BookingEvent::Updated { date, .. } => *date,
        }
    }

    pub fn asset_id(&self) -> i32 {
        match self {
            BookingEvent::Inserted { booking } => booking.asset_id,
            BookingEvent::Deleted { asset_id, .. } => *asset_id,
            BookingEvent::Updated { asset_id, .. } => *asset_id,
        }
    }
}

/// Broadcast hub for booking changes. Cloneable handle stored in managed
/// state; dropped receivers just lag out of the ring buffer.
#[derive(Debug, Clone)]
pub struct BookingFeed {
    tx: broadcast::Sender<BookingEvent>,
}

impl BookingFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        BookingFeed { tx }
    }

    /// Publishes an event. No subscribers is not an error.
    pub fn publish(&self, event: BookingEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.tx.subscribe()
    }
}

impl Default for BookingFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// What a subscriber should do after applying an event it cannot resolve
/// from the event payload alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedAction {
    /// Local list already reconciled, nothing further to do.
    None,
    /// An update touched this view; reload the list from the server.
    Refetch,
}

/// Client-side reconciliation of one office's bookings for one date.
///
/// Mirrors what the web map does with the feed: apply inserts and deletes
/// in place, fall back to a refetch on updates, and remember the last
/// changed asset so the map can pulse it briefly.
#[derive(Debug)]
pub struct BookingView {
    office_id: i32,
    date: NaiveDate,
    bookings: Vec<BookingWithDetails>,
    last_change: Option<(i32, DateTime<Utc>)>,
}

impl BookingView {
    pub fn new(office_id: i32, date: NaiveDate, bookings: Vec<BookingWithDetails>) -> Self {
        BookingView { office_id, date, bookings, last_change: None }
    }

    pub fn bookings(&self) -> &[BookingWithDetails] {
        &self.bookings
    }

    /// Applies one event. Events for another office or date are ignored.
    pub fn apply(&mut self, event: &BookingEvent, now: DateTime<Utc>) -> FeedAction {
        if event.office_id() != self.office_id || event.date() != self.date {
            return FeedAction::None;
        }
        self.last_change = Some((event.asset_id(), now));
        match event {
            BookingEvent::Inserted { booking } => {
                // Replays are possible after a reconnect; keep the list deduped.
                if !self.bookings.iter().any(|b| b.id == booking.id) {
                    self.bookings.push(booking.clone());
                }
                FeedAction::None
            }
            BookingEvent::Deleted { booking_id, .. } => {
                self.bookings.retain(|b| b.id != *booking_id);
                FeedAction::None
            }
            BookingEvent::Updated { .. } => FeedAction::Refetch,
        }
    }

    /// Replaces the list wholesale, as after a [`FeedAction::Refetch`].
    pub fn reset(&mut self, bookings: Vec<BookingWithDetails>) {
        self.bookings = bookings;
    }

    /// The asset to highlight, if the last change is still inside the
    /// pulse window.
    pub fn highlighted_asset(&self, now: DateTime<Utc>) -> Option<i32> {
        let (asset_id, at) = self.last_change?;
        if (now - at).num_milliseconds() < HIGHLIGHT_WINDOW_MS {
            Some(asset_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::{AssetRef, UserRef};
    use chrono::TimeZone;

    fn details(id: i32, asset_id: i32, office_id: i32, date: NaiveDate) -> BookingWithDetails {
        BookingWithDetails {
            id,
            user_id: 7,
            asset_id,
            date,
            check_in_status: "pending".to_string(),
            checked_in_at: None,
            user: UserRef {
                id: 7,
                name: "Ada Lovelace".to_string(),
                avatar: "AL".to_string(),
                team_id: None,
            },
            asset: AssetRef {
                id: asset_id,
                name: "D-01".to_string(),
                kind: "desk".to_string(),
                office_id,
                zone_label: Some("A".to_string()),
            },
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn insert_appends_matching_event() {
        let mut view = BookingView::new(1, day(2), vec![]);
        let ev = BookingEvent::Inserted { booking: details(10, 4, 1, day(2)) };
        assert_eq!(view.apply(&ev, at(0)), FeedAction::None);
        assert_eq!(view.bookings().len(), 1);

        // Replaying the same insert does not duplicate.
        assert_eq!(view.apply(&ev, at(1)), FeedAction::None);
        assert_eq!(view.bookings().len(), 1);
    }

    #[test]
    fn events_for_other_office_or_date_are_ignored() {
        let mut view = BookingView::new(1, day(2), vec![]);
        let other_office = BookingEvent::Inserted { booking: details(10, 4, 99, day(2)) };
        let other_date = BookingEvent::Inserted { booking: details(11, 4, 1, day(3)) };
        view.apply(&other_office, at(0));
        view.apply(&other_date, at(0));
        assert!(view.bookings().is_empty());
        assert_eq!(view.highlighted_asset(at(0)), None);
    }

    #[test]
    fn delete_removes_by_id() {
        let mut view = BookingView::new(1, day(2), vec![details(10, 4, 1, day(2))]);
        let ev = BookingEvent::Deleted { booking_id: 10, asset_id: 4, office_id: 1, date: day(2) };
        assert_eq!(view.apply(&ev, at(0)), FeedAction::None);
        assert!(view.bookings().is_empty());

        // Deleting an unknown id is a no-op.
        assert_eq!(view.apply(&ev, at(1)), FeedAction::None);
    }

    #[test]
    fn update_requests_refetch() {
        let mut view = BookingView::new(1, day(2), vec![details(10, 4, 1, day(2))]);
        let ev = BookingEvent::Updated { booking_id: 10, asset_id: 4, office_id: 1, date: day(2) };
        assert_eq!(view.apply(&ev, at(0)), FeedAction::Refetch);

        view.reset(vec![]);
        assert!(view.bookings().is_empty());
    }

    #[test]
    fn highlight_expires_after_window() {
        let mut view = BookingView::new(1, day(2), vec![]);
        let ev = BookingEvent::Inserted { booking: details(10, 4, 1, day(2)) };
        view.apply(&ev, at(0));
        assert_eq!(view.highlighted_asset(at(1)), Some(4));
        assert_eq!(view.highlighted_asset(at(3)), None);
    }

    #[test]
    fn feed_delivers_to_subscribers() {
        let feed = BookingFeed::new();
        let mut rx = feed.subscribe();
        feed.publish(BookingEvent::Deleted { booking_id: 1, asset_id: 2, office_id: 3, date: day(2) });
        let got = rx.try_recv().expect("event delivered");
        assert_eq!(got.asset_id(), 2);
    }
}
