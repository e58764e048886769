//! Cart domain: items, aggregate state, size lookup, and the reducer.

mod action;
mod model;
mod size;
mod state;

pub use action::{CartAction, reduce};
pub use model::{CartItem, ItemDetails, OrderType, round_cents, savings_between};
pub use size::{SizeEntry, SizeTable};
pub use state::{CartState, RequestStatus};
