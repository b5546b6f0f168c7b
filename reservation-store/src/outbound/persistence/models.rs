//! Row models for the denormalized reservation tables.
//!
//! Both reservation tables carry the same six columns; they differ only in
//! which of them form the primary key. Each table still gets its own row
//! struct so the per-table mapping stays explicit and the structs mirror
//! their tables' column order. Rows are internal to the adapter and never
//! cross the domain boundary.

use chrono::NaiveDate;
use scylla::{DeserializeRow, SerializeRow};
use uuid::Uuid;

use super::schema::{TABLE_RESERVATIONS_BY_CONFIRMATION, TABLE_RESERVATIONS_BY_HOTEL_DATE};
use crate::domain::ports::StoreError;
use crate::domain::reservation::{
    ConfirmationNumber, HotelId, Reservation, ReservationValidationError,
};

/// Row of `reservations_by_confirmation` (partition key: confirmation
/// number).
#[derive(Debug, Clone, PartialEq, Eq, SerializeRow, DeserializeRow)]
pub(crate) struct ReservationByConfirmationRow {
    pub confirmation_number: String,
    pub hotel_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_number: i16,
    pub guest_id: Uuid,
}

impl ReservationByConfirmationRow {
    /// Project a domain record into this table's shape.
    pub(crate) fn from_domain(
        reservation: &Reservation,
        confirmation: &ConfirmationNumber,
    ) -> Self {
        Self {
            confirmation_number: confirmation.as_str().to_owned(),
            hotel_id: reservation.hotel_id().as_str().to_owned(),
            start_date: reservation.start_date(),
            end_date: reservation.end_date(),
            room_number: reservation.room_number(),
            guest_id: reservation.guest_id(),
        }
    }

    /// Rebuild the domain record, re-checking its invariants.
    pub(crate) fn into_domain(self) -> Result<Reservation, StoreError> {
        decode(
            TABLE_RESERVATIONS_BY_CONFIRMATION,
            self.hotel_id,
            self.start_date,
            self.end_date,
            self.room_number,
            self.guest_id,
            self.confirmation_number,
        )
    }
}

/// Row of `reservations_by_hotel_date` (partition key: hotel and start
/// date; clustering key: room number).
#[derive(Debug, Clone, PartialEq, Eq, SerializeRow, DeserializeRow)]
pub(crate) struct ReservationByHotelDateRow {
    pub hotel_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_number: i16,
    pub confirmation_number: String,
    pub guest_id: Uuid,
}

impl ReservationByHotelDateRow {
    /// Project a domain record into this table's shape.
    pub(crate) fn from_domain(
        reservation: &Reservation,
        confirmation: &ConfirmationNumber,
    ) -> Self {
        Self {
            hotel_id: reservation.hotel_id().as_str().to_owned(),
            start_date: reservation.start_date(),
            end_date: reservation.end_date(),
            room_number: reservation.room_number(),
            confirmation_number: confirmation.as_str().to_owned(),
            guest_id: reservation.guest_id(),
        }
    }

    /// Rebuild the domain record, re-checking its invariants.
    pub(crate) fn into_domain(self) -> Result<Reservation, StoreError> {
        decode(
            TABLE_RESERVATIONS_BY_HOTEL_DATE,
            self.hotel_id,
            self.start_date,
            self.end_date,
            self.room_number,
            self.guest_id,
            self.confirmation_number,
        )
    }
}

/// Shared row-to-domain conversion. Rows written through this adapter
/// always satisfy the domain invariants; a row that does not was written by
/// a foreign tool and surfaces as a decoding failure naming the table.
fn decode(
    table: &'static str,
    hotel_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    room_number: i16,
    guest_id: Uuid,
    confirmation_number: String,
) -> Result<Reservation, StoreError> {
    let map = |error: ReservationValidationError| {
        StoreError::query("decode row", format!("{table}: {error}"))
    };
    let reservation = Reservation::new(
        HotelId::new(hotel_id).map_err(map)?,
        start_date,
        end_date,
        room_number,
        guest_id,
    )
    .map_err(map)?;
    Ok(reservation.with_confirmation(ConfirmationNumber::new(confirmation_number).map_err(map)?))
}
