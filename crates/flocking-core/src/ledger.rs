//! Tour ledger trait - reference counting of tours being followed.
//!
//! Achievers register the tour they follow and unregister it when they
//! switch. The runtime's population implements this; agents only see the
//! trait.

use crate::tour::Tour;

pub trait TourLedger {
    /// Count one more follower of `tour`.
    fn register_tour(&mut self, tour: &Tour);

    /// Count one follower less. Unknown tours are ignored.
    fn unregister_tour(&mut self, tour: &Tour);
}
