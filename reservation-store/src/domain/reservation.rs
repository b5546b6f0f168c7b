//! Reservation data model.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors returned when constructing reservation domain types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationValidationError {
    /// Hotel id is empty after trimming whitespace.
    #[error("hotel id must not be empty")]
    EmptyHotelId,
    /// Hotel id carries leading or trailing whitespace.
    #[error("hotel id must not contain surrounding whitespace")]
    PaddedHotelId,
    /// Confirmation number is empty.
    #[error("confirmation number must not be empty")]
    EmptyConfirmationNumber,
    /// Confirmation number contains characters outside `[0-9A-Za-z-]`.
    #[error("confirmation number may only contain letters, digits, or dashes")]
    InvalidConfirmationNumber,
    /// Stay dates are out of order.
    #[error("stay cannot end before it starts ({start} to {end})")]
    EndBeforeStart {
        /// First night of the stay.
        start: NaiveDate,
        /// Last night of the stay.
        end: NaiveDate,
    },
}

/// Hotel identifier, stored as text rather than a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HotelId(String);

impl HotelId {
    /// Validate and construct a [`HotelId`].
    ///
    /// # Examples
    /// ```
    /// use reservation_store::domain::HotelId;
    ///
    /// let hotel = HotelId::new("12345").expect("valid hotel id");
    /// assert_eq!(hotel.as_str(), "12345");
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, ReservationValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(ReservationValidationError::EmptyHotelId);
        }
        if raw.trim() != raw {
            return Err(ReservationValidationError::PaddedHotelId);
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for HotelId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for HotelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HotelId> for String {
    fn from(value: HotelId) -> Self {
        value.0
    }
}

impl TryFrom<String> for HotelId {
    type Error = ReservationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Globally unique confirmation number identifying one reservation.
///
/// Generated numbers are six characters drawn from `0-9A-Z`; caller-supplied
/// numbers may be any non-empty alphanumeric-or-dash string so externally
/// issued identifiers remain admissible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConfirmationNumber(String);

impl ConfirmationNumber {
    /// Validate and construct a [`ConfirmationNumber`].
    pub fn new(value: impl Into<String>) -> Result<Self, ReservationValidationError> {
        let raw = value.into();
        if raw.is_empty() {
            return Err(ReservationValidationError::EmptyConfirmationNumber);
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ReservationValidationError::InvalidConfirmationNumber);
        }
        Ok(Self(raw))
    }

    /// Borrow the number as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for ConfirmationNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ConfirmationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ConfirmationNumber> for String {
    fn from(value: ConfirmationNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for ConfirmationNumber {
    type Error = ReservationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One hotel reservation: the normalized record each denormalized table
/// projects.
///
/// ## Invariants
/// - `start_date <= end_date`.
/// - `room_number` identifies a room within `hotel_id` for `start_date`.
/// - `confirmation_number` is absent only on records not yet persisted; the
///   store assigns one on first upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReservationDto", into = "ReservationDto")]
pub struct Reservation {
    hotel_id: HotelId,
    start_date: NaiveDate,
    end_date: NaiveDate,
    room_number: i16,
    guest_id: Uuid,
    confirmation_number: Option<ConfirmationNumber>,
}

impl Reservation {
    /// Build a reservation without a confirmation number, enforcing the date
    /// ordering invariant.
    pub fn new(
        hotel_id: HotelId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        room_number: i16,
        guest_id: Uuid,
    ) -> Result<Self, ReservationValidationError> {
        if end_date < start_date {
            return Err(ReservationValidationError::EndBeforeStart {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            hotel_id,
            start_date,
            end_date,
            room_number,
            guest_id,
            confirmation_number: None,
        })
    }

    /// Attach a confirmation number to this reservation.
    #[must_use]
    pub fn with_confirmation(mut self, confirmation_number: ConfirmationNumber) -> Self {
        self.confirmation_number = Some(confirmation_number);
        self
    }

    /// Hotel the room belongs to.
    pub fn hotel_id(&self) -> &HotelId {
        &self.hotel_id
    }

    /// First night of the stay.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last night of the stay.
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Room within the hotel for the start date.
    pub fn room_number(&self) -> i16 {
        self.room_number
    }

    /// Guest holding the reservation.
    pub fn guest_id(&self) -> Uuid {
        self.guest_id
    }

    /// Confirmation number, when one has been supplied or assigned.
    pub fn confirmation_number(&self) -> Option<&ConfirmationNumber> {
        self.confirmation_number.as_ref()
    }
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.confirmation_number {
            Some(confirmation) => write!(
                f,
                "reservation {confirmation} at hotel {} room {} ({} to {})",
                self.hotel_id, self.room_number, self.start_date, self.end_date
            ),
            None => write!(
                f,
                "unconfirmed reservation at hotel {} room {} ({} to {})",
                self.hotel_id, self.room_number, self.start_date, self.end_date
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReservationDto {
    hotel_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    room_number: i16,
    guest_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confirmation_number: Option<String>,
}

impl From<Reservation> for ReservationDto {
    fn from(value: Reservation) -> Self {
        let Reservation {
            hotel_id,
            start_date,
            end_date,
            room_number,
            guest_id,
            confirmation_number,
        } = value;
        Self {
            hotel_id: hotel_id.into(),
            start_date,
            end_date,
            room_number,
            guest_id,
            confirmation_number: confirmation_number.map(String::from),
        }
    }
}

impl TryFrom<ReservationDto> for Reservation {
    type Error = ReservationValidationError;

    fn try_from(value: ReservationDto) -> Result<Self, Self::Error> {
        let reservation = Reservation::new(
            HotelId::new(value.hotel_id)?,
            value.start_date,
            value.end_date,
            value.room_number,
            value.guest_id,
        )?;
        match value.confirmation_number {
            Some(raw) => Ok(reservation.with_confirmation(ConfirmationNumber::new(raw)?)),
            None => Ok(reservation),
        }
    }
}
