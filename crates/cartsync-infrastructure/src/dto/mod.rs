//! Data transfer objects for persisted state.

mod cart_record;
mod lenient;

pub use cart_record::{
    ATTR_ADD_ON, ATTR_ORDER_TYPE, ATTR_PLAN_TYPE, PersistedCartRecord, PersistedLine,
};
