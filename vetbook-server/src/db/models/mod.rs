//! Database Models

// Serde helpers
pub mod serde_helpers;

// Resource catalog
pub mod cage;
pub mod pet;
pub mod service;

// Reservations
pub mod reservation;

// Re-exports
pub use cage::{Cage, CageCreate, CageStatus, CageType, CageUpdate};
pub use pet::{Pet, PetCreate, SizeClass};
pub use reservation::{
    Booking, DocumentReview, Reservation, ReservationCreate, ReservationStatus,
    ReservationUpdate, VerifyStatus, is_cash_equivalent,
};
pub use service::{Service, ServiceCategory, ServiceCreate, ServiceUpdate};
