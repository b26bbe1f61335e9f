//! Ticket-based admission control for topic registration.
//!
//! 1. A requester asks to register under a topic and gets a [`TicketMessage`]
//!    echoing its request id, carrying an opaque ticket and a wait time.
//! 2. It sends the same ticket back no earlier than the wait time
//!    ([`TicketScheduler`]).
//! 3. The issuer checks the ticket and admits the requester, or answers with
//!    a fresh ticket ([`TicketIssuer::redeem`]).
//!
//! Wait times are per-topic backpressure. Every ticket issued for a topic,
//! including the fresh ones handed out on rejection, pushes back every later
//! requester of that topic, whoever they are.

mod issuer;
mod message;
mod minter;
mod policy;
mod scheduler;

pub use issuer::{Admission, RejectReason, TicketIssuer};
pub use message::TicketMessage;
pub use minter::{HmacTicketMinter, Ticket, TicketContext, TicketError, TicketMinter, TICKET_SIZE};
pub use policy::{FixedWait, LinearBackoff, WaitTimePolicy};
pub use scheduler::{TicketResend, TicketScheduler};
