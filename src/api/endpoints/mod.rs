//! API endpoint handlers, one module per actor surface.

pub mod admin;
pub mod auth;
pub mod booking;
pub mod doctor;
pub mod health;
pub mod payment;
