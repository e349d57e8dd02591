#[cfg(feature = "ssr")]
pub mod api;
pub mod booking;
pub mod form;
