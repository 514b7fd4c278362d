//! Published slice state containers.
//!
//! Slices publish through `tokio::sync::watch`: every change builds new
//! values (pushes replace the data array in full) and consumers clone what
//! they need out of a borrow — they are never handed a reference that a
//! later mutation changes in place.

use std::fmt;

use gangway_core::step::Step;

/// Cloneable capture of a failure, stored in slice state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliceError {
    /// Opening the realtime subscription failed.
    Subscription(String),
    /// A mutating call failed after rollback.
    Mutation(String),
}

impl fmt::Display for SliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subscription(msg) | Self::Mutation(msg) => f.write_str(msg),
        }
    }
}

/// State published by an unkeyed entity slice.
#[derive(Debug, Clone)]
pub struct SliceState<T> {
    /// Latest full data set pushed by the gateway, with any optimistic
    /// mutations applied on top. Empty before the first push and after the
    /// last consumer's teardown.
    pub data: Vec<T>,
    /// True from the first consumer's subscribe until the first push or a
    /// setup failure.
    pub loading: bool,
    pub error: Option<SliceError>,
}

impl<T> Default for SliceState<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// One instance's entry in the keyed steps slice.
#[derive(Debug, Clone, Default)]
pub struct KeyedSteps {
    pub steps: Vec<Step>,
    pub loading: bool,
    pub error: Option<SliceError>,
}
