pub mod booking;
pub mod confirm_booking;
pub mod modify_booking;
pub mod my_bookings;
pub mod slot_grid;

use leptos::prelude::ServerFnError;

/// Pulls the backend's message out of a failed server-function call so the
/// form can show it verbatim.
pub(crate) fn server_error_message(err: &ServerFnError) -> String {
    match err {
        ServerFnError::ServerError(message) => message.clone(),
        other => other.to_string(),
    }
}
