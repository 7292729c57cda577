//! SOAP transport
//!
//! Binds [`crate::TrainerService`] to `POST /soap`. The envelope codec lives
//! in [`envelope`]; the axum wiring in [`handler`].

pub mod envelope;
pub mod handler;

pub use envelope::{EnvelopeError, FaultCode, SoapRequest};
pub use handler::router;
