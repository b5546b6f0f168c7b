//! Behavioural tests for the reservation store port.
//!
//! An in-memory adapter modelling both denormalized tables proves the port
//! contract — round-trip, two-table consistency, existence semantics, and
//! uniqueness under generation — without a running cluster. The ScyllaDB
//! adapter is held to the same contract by the live integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use rstest::{fixture, rstest};
use uuid::Uuid;

use reservation_store::domain::{
    ConfirmationGenerator, ConfirmationNumber, HotelId, RandomConfirmationGenerator, Reservation,
    ReservationStore, StoreError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
}

/// Key of `reservations_by_hotel_date`: (hotel, start date, room).
type HotelDateKey = (String, NaiveDate, i16);

#[derive(Default)]
struct Tables {
    by_confirmation: HashMap<String, Reservation>,
    by_hotel_date: HashMap<HotelDateKey, Reservation>,
}

/// In-memory stand-in keeping both projections in lockstep, the way the
/// real adapter's logged batches do.
#[derive(Default)]
struct InMemoryReservationStore {
    generator: RandomConfirmationGenerator,
    tables: Mutex<Tables>,
}

impl InMemoryReservationStore {
    fn hotel_date_key(reservation: &Reservation) -> HotelDateKey {
        (
            reservation.hotel_id().as_str().to_owned(),
            reservation.start_date(),
            reservation.room_number(),
        )
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn exists(&self, confirmation: &ConfirmationNumber) -> Result<bool, StoreError> {
        let tables = self.tables.lock().expect("tables poisoned");
        Ok(tables.by_confirmation.contains_key(confirmation.as_str()))
    }

    async fn find_by_confirmation(
        &self,
        confirmation: &ConfirmationNumber,
    ) -> Result<Option<Reservation>, StoreError> {
        let tables = self.tables.lock().expect("tables poisoned");
        Ok(tables.by_confirmation.get(confirmation.as_str()).cloned())
    }

    async fn upsert(&self, reservation: &Reservation) -> Result<ConfirmationNumber, StoreError> {
        let mut tables = self.tables.lock().expect("tables poisoned");
        let confirmation = match reservation.confirmation_number() {
            Some(confirmation) => confirmation.clone(),
            None => loop {
                let candidate = self.generator.generate();
                if !tables.by_confirmation.contains_key(candidate.as_str()) {
                    break candidate;
                }
            },
        };
        let stored = reservation.clone().with_confirmation(confirmation.clone());
        tables
            .by_hotel_date
            .insert(Self::hotel_date_key(&stored), stored.clone());
        tables
            .by_confirmation
            .insert(confirmation.as_str().to_owned(), stored);
        Ok(confirmation)
    }

    async fn delete(&self, confirmation: &ConfirmationNumber) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().expect("tables poisoned");
        let Some(existing) = tables.by_confirmation.remove(confirmation.as_str()) else {
            return Ok(false);
        };
        tables.by_hotel_date.remove(&Self::hotel_date_key(&existing));
        Ok(true)
    }

    async fn find_all(&self) -> Result<Vec<Reservation>, StoreError> {
        let tables = self.tables.lock().expect("tables poisoned");
        Ok(tables.by_confirmation.values().cloned().collect())
    }

    async fn find_by_hotel_and_date(
        &self,
        hotel_id: &HotelId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError> {
        let tables = self.tables.lock().expect("tables poisoned");
        let mut hits: Vec<Reservation> = tables
            .by_hotel_date
            .iter()
            .filter(|((hotel, start, _), _)| hotel == hotel_id.as_str() && *start == date)
            .map(|(_, reservation)| reservation.clone())
            .collect();
        hits.sort_by_key(Reservation::room_number);
        Ok(hits)
    }
}

#[fixture]
fn store() -> InMemoryReservationStore {
    InMemoryReservationStore::default()
}

#[fixture]
fn guest() -> Uuid {
    Uuid::new_v4()
}

#[fixture]
fn reservation(guest: Uuid) -> Reservation {
    Reservation::new(
        HotelId::new("12345").expect("valid hotel id"),
        date(2020, 12, 18),
        date(2020, 12, 20),
        42,
        guest,
    )
    .expect("valid reservation")
}

#[rstest]
#[tokio::test]
async fn upsert_then_find_round_trips_every_field(
    store: InMemoryReservationStore,
    reservation: Reservation,
) {
    let confirmation = store.upsert(&reservation).await.expect("upsert succeeds");

    let found = store
        .find_by_confirmation(&confirmation)
        .await
        .expect("lookup succeeds")
        .expect("reservation present");
    assert_eq!(found.hotel_id().as_str(), "12345");
    assert_eq!(found.start_date(), reservation.start_date());
    assert_eq!(found.end_date(), reservation.end_date());
    assert_eq!(found.room_number(), reservation.room_number());
    assert_eq!(found.guest_id(), reservation.guest_id());
    assert_eq!(found.confirmation_number(), Some(&confirmation));
}

#[rstest]
#[tokio::test]
async fn existence_tracks_the_reservation_lifecycle(
    store: InMemoryReservationStore,
    reservation: Reservation,
) {
    let supplied = ConfirmationNumber::new("RS2G0Z").expect("valid confirmation");
    assert!(!store.exists(&supplied).await.expect("probe succeeds"));

    let confirmation = store
        .upsert(&reservation.with_confirmation(supplied.clone()))
        .await
        .expect("upsert succeeds");
    assert_eq!(confirmation, supplied);
    assert!(store.exists(&confirmation).await.expect("probe succeeds"));

    assert!(store.delete(&confirmation).await.expect("delete succeeds"));
    assert!(!store.exists(&confirmation).await.expect("probe succeeds"));
}

#[rstest]
#[tokio::test]
async fn both_query_paths_agree_and_empty_together(
    store: InMemoryReservationStore,
    reservation: Reservation,
) {
    let hotel = HotelId::new("12345").expect("valid hotel id");
    let confirmation = store.upsert(&reservation).await.expect("upsert succeeds");

    let by_confirmation = store
        .find_by_confirmation(&confirmation)
        .await
        .expect("lookup succeeds")
        .expect("present");
    let by_hotel_date = store
        .find_by_hotel_and_date(&hotel, date(2020, 12, 18))
        .await
        .expect("search succeeds");
    assert_eq!(by_hotel_date, vec![by_confirmation]);

    assert!(store.delete(&confirmation).await.expect("delete succeeds"));
    assert!(store
        .find_by_confirmation(&confirmation)
        .await
        .expect("lookup succeeds")
        .is_none());
    assert!(store
        .find_by_hotel_and_date(&hotel, date(2020, 12, 18))
        .await
        .expect("search succeeds")
        .is_empty());
}

#[rstest]
#[tokio::test]
async fn deleting_an_unknown_reservation_reports_not_found(store: InMemoryReservationStore) {
    let unknown = ConfirmationNumber::new("NOSUCH").expect("valid confirmation");
    assert!(!store.delete(&unknown).await.expect("delete succeeds"));
}

#[rstest]
#[tokio::test]
async fn upserting_with_the_same_confirmation_updates_in_place(
    store: InMemoryReservationStore,
    guest: Uuid,
) {
    let original = Reservation::new(
        HotelId::new("12345").expect("valid hotel id"),
        date(2020, 12, 18),
        date(2020, 12, 20),
        42,
        guest,
    )
    .expect("valid reservation");
    let confirmation = store.upsert(&original).await.expect("upsert succeeds");

    let moved = Reservation::new(
        HotelId::new("9999").expect("valid hotel id"),
        date(2020, 12, 18),
        date(2020, 12, 20),
        42,
        guest,
    )
    .expect("valid reservation")
    .with_confirmation(confirmation.clone());
    store.upsert(&moved).await.expect("upsert succeeds");

    let found = store
        .find_by_confirmation(&confirmation)
        .await
        .expect("lookup succeeds")
        .expect("present");
    assert_eq!(found.hotel_id().as_str(), "9999");
    assert_eq!(store.find_all().await.expect("scan succeeds").len(), 1);
}

#[rstest]
#[tokio::test]
async fn search_returns_only_the_requested_partition(store: InMemoryReservationStore) {
    for (hotel, room) in [("12345", 42_i16), ("12345", 43), ("9999", 42)] {
        let reservation = Reservation::new(
            HotelId::new(hotel).expect("valid hotel id"),
            date(2020, 12, 18),
            date(2020, 12, 20),
            room,
            Uuid::new_v4(),
        )
        .expect("valid reservation");
        store.upsert(&reservation).await.expect("upsert succeeds");
    }

    let hits = store
        .find_by_hotel_and_date(
            &HotelId::new("12345").expect("valid hotel id"),
            date(2020, 12, 18),
        )
        .await
        .expect("search succeeds");
    assert_eq!(
        hits.iter().map(Reservation::room_number).collect::<Vec<_>>(),
        vec![42, 43]
    );

    let other_day = store
        .find_by_hotel_and_date(
            &HotelId::new("12345").expect("valid hotel id"),
            date(2020, 12, 19),
        )
        .await
        .expect("search succeeds");
    assert!(other_day.is_empty());
}

#[rstest]
#[tokio::test]
async fn generated_confirmation_numbers_stay_unique_at_scale(
    store: InMemoryReservationStore,
    guest: Uuid,
) {
    let mut seen = std::collections::HashSet::new();
    for room in 0..10_000_i32 {
        let reservation = Reservation::new(
            HotelId::new("12345").expect("valid hotel id"),
            date(2020, 12, 18),
            date(2020, 12, 20),
            (room % i32::from(i16::MAX)) as i16,
            guest,
        )
        .expect("valid reservation");
        let confirmation = store.upsert(&reservation).await.expect("upsert succeeds");
        assert!(
            seen.insert(confirmation.as_str().to_owned()),
            "confirmation {confirmation} issued twice"
        );
    }
}

/// The lifecycle the HTTP layer depends on, end to end.
#[rstest]
#[tokio::test]
async fn full_reservation_lifecycle(store: InMemoryReservationStore, guest: Uuid) {
    let hotel = HotelId::new("12345").expect("valid hotel id");
    let reservation = Reservation::new(
        hotel.clone(),
        date(2020, 12, 18),
        date(2020, 12, 20),
        42,
        guest,
    )
    .expect("valid reservation");

    let confirmation = store.upsert(&reservation).await.expect("upsert succeeds");

    let found = store
        .find_by_confirmation(&confirmation)
        .await
        .expect("lookup succeeds")
        .expect("present");
    assert_eq!(found.hotel_id().as_str(), "12345");

    let listed = store
        .find_by_hotel_and_date(&hotel, date(2020, 12, 18))
        .await
        .expect("search succeeds");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].room_number(), 42);
    assert_eq!(listed[0].guest_id(), guest);

    assert!(store.delete(&confirmation).await.expect("delete succeeds"));
    assert!(!store.exists(&confirmation).await.expect("probe succeeds"));
}
