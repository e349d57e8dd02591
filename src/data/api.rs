//! Server-side client for the Plek REST backend.
//!
//! Constructed from [`Settings`] per request; nothing here is a global. The
//! backend is Django REST Framework, so failed requests come back as field
//! error maps which are reduced to a single human-readable message.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::data::booking::{
    BookingChange, BookingDraft, BookingSummary, Room, RoomDay,
};
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Backend { status: u16, message: String },
}

pub struct PlekApi {
    base_url: String,
    http: reqwest::Client,
}

impl PlekApi {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base_url: settings.backend_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// `GET /rooms/{id}/?date=YYYY-MM-DD`: the room with its bookings for
    /// one date.
    pub async fn room_day(&self, room_id: i64, date: NaiveDate) -> Result<RoomDay, ApiError> {
        let url = format!(
            "{}/rooms/{}/?date={}",
            self.base_url,
            room_id,
            date.format("%Y-%m-%d")
        );
        self.get_json(&url).await
    }

    pub async fn rooms(&self) -> Result<Vec<Room>, ApiError> {
        self.get_json(&format!("{}/rooms/", self.base_url)).await
    }

    pub async fn my_bookings(&self) -> Result<Vec<BookingSummary>, ApiError> {
        self.get_json(&format!("{}/bookings/", self.base_url)).await
    }

    pub async fn create_booking(&self, draft: &BookingDraft) -> Result<(), ApiError> {
        let url = format!("{}/bookings/create/", self.base_url);
        let response = self.http.post(&url).json(draft).send().await?;
        Self::check(response).await
    }

    pub async fn update_booking(
        &self,
        booking_id: i64,
        change: &BookingChange,
    ) -> Result<(), ApiError> {
        let url = format!("{}/bookings/update/{}/", self.base_url, booking_id);
        let response = self.http.put(&url).json(change).send().await?;
        Self::check(response).await
    }

    pub async fn cancel_booking(&self, booking_id: i64) -> Result<(), ApiError> {
        let url = format!("{}/bookings/cancel/{}/", self.base_url, booking_id);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        Self::check(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            Err(ApiError::Backend {
                status,
                message: error_message(status, &body),
            })
        }
    }

    async fn check(response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status().as_u16();
        if response.status().is_success() {
            Ok(())
        } else {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            Err(ApiError::Backend {
                status,
                message: error_message(status, &body),
            })
        }
    }
}

/// Reduces a DRF error response to one message: `non_field_errors` first,
/// then `detail`, then `error`, then the first field-level message.
pub fn error_message(status: u16, body: &Value) -> String {
    if status >= 500 {
        return "Server error. Please try again later.".to_string();
    }
    if status == 401 {
        return "Your session has expired. Please log in again.".to_string();
    }
    if status == 403 {
        return "You don't have permission to perform this action.".to_string();
    }

    if let Some(message) = body
        .get("non_field_errors")
        .and_then(|errors| errors.get(0))
        .and_then(Value::as_str)
    {
        return message.to_string();
    }
    if let Some(message) = body.get("detail").and_then(Value::as_str) {
        return message.to_string();
    }
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return message.to_string();
    }
    if let Some(map) = body.as_object() {
        for value in map.values() {
            if let Some(first) = value
                .as_array()
                .and_then(|messages| messages.first())
                .and_then(Value::as_str)
            {
                return first.to_string();
            }
        }
    }

    "An error occurred. Please try again.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_field_errors_win_over_field_errors() {
        let body = json!({
            "non_field_errors": ["Room is already booked for this time"],
            "start_time": ["This field is required."],
        });
        assert_eq!(
            error_message(400, &body),
            "Room is already booked for this time"
        );
    }

    #[test]
    fn detail_and_error_are_used_when_present() {
        assert_eq!(
            error_message(404, &json!({"detail": "Not found."})),
            "Not found."
        );
        assert_eq!(
            error_message(400, &json!({"error": "Backdated bookings are not allowed"})),
            "Backdated bookings are not allowed"
        );
    }

    #[test]
    fn first_field_level_message_is_surfaced() {
        let body = json!({"attendees_count": ["Exceeds the room capacity."]});
        assert_eq!(error_message(400, &body), "Exceeds the room capacity.");
    }

    #[test]
    fn status_classes_have_fixed_messages() {
        let body = json!({"detail": "ignored"});
        assert_eq!(
            error_message(500, &body),
            "Server error. Please try again later."
        );
        assert_eq!(
            error_message(401, &body),
            "Your session has expired. Please log in again."
        );
        assert_eq!(
            error_message(403, &body),
            "You don't have permission to perform this action."
        );
    }

    #[test]
    fn unrecognized_bodies_fall_back_to_a_generic_message() {
        assert_eq!(
            error_message(400, &Value::Null),
            "An error occurred. Please try again."
        );
    }
}
