//! The simulation engine: a discrete-event kernel driving car behavior, crossroad conflict
//! resolution, and traffic light control over a `map_model::Network`, plus the event log
//! consumers replay results from.

mod calendar;
mod car;
mod constants;
mod driving;
mod intersection;
mod kernel;
mod sim;
mod spawner;

pub use calendar::{Calendar, CarEvent, CrossroadEvent};
pub use car::{Car, CarState, CrossingPhase, Plan};
pub use sim::Sim;
