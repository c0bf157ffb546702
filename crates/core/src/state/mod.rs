//! Run lifecycle bookkeeping.
//!
//! State transitions (uid assignment, completion, failure) and the event
//! sink through which they are published.

pub mod run;

pub use run::{
    assign_uid, carry_identity, complete_state, fail_run, finish_run, start_run, EventSink,
};
