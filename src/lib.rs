pub mod api; // HTTP surface: router, middleware, endpoints
pub mod config;
pub mod db; // SQLite store + repository layer
pub mod lifecycle; // Appointment state machine: Book / Assign / Prescribe
pub mod mailer; // Outbound mail relay client
pub mod models;
pub mod notify; // Best-effort notification side-channel
pub mod payment; // Payment verification gate
pub mod queries; // Role-scoped read projections
