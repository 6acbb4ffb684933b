pub mod channel;
#[cfg(test)]
pub(crate) mod fakes;
pub mod negotiator;
pub mod planner;
pub mod protocol;

pub use channel::{ChannelEvent, ChannelState, DuplexChannel, GoalChannel};
pub use negotiator::TransportNegotiator;
pub use planner::{PlannerClient, RoutinePlanner};
pub use protocol::{ApprovalPayload, ClientMessage, ServerMessage};
