use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub service_id: String,
    pub barbershop_id: String,
    pub date: NaiveDateTime,
    pub cancelled: bool,
    /// Set iff `cancelled` is true.
    pub cancelled_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Booking {
    pub fn status(&self, now: &NaiveDateTime) -> BookingStatus {
        BookingStatus::classify(self.cancelled, &self.date, now)
    }
}

/// Derived from the cancellation flag and the scheduled time. Never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Finished,
}

impl BookingStatus {
    /// Cancellation wins over the schedule. A booking scheduled exactly at
    /// `now` is still confirmed.
    pub fn classify(cancelled: bool, scheduled: &NaiveDateTime, now: &NaiveDateTime) -> Self {
        if cancelled {
            BookingStatus::Cancelled
        } else if scheduled >= now {
            BookingStatus::Confirmed
        } else {
            BookingStatus::Finished
        }
    }
}

/// Status filter accepted by the owner booking list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Confirmed,
    Cancelled,
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub id: String,
    pub name: String,
    pub price_in_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarbershopContact {
    pub id: String,
    pub name: String,
    pub address: String,
    pub image_url: String,
    pub phones: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

/// A booking joined with the service, shop and customer it refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetails {
    pub booking: Booking,
    pub service: ServiceSummary,
    pub barbershop: BarbershopContact,
    pub customer: Customer,
}
