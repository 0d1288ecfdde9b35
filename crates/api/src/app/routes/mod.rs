use axum::Router;

pub mod agents;
pub mod appointments;
pub mod bookings;
pub mod clinics;
pub mod inventory;
pub mod invoices;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/agents", agents::router())
        .merge(appointments::router())
        .merge(bookings::router())
        .merge(clinics::router())
        .merge(inventory::router())
        .merge(invoices::router())
}
