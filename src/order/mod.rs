//! Order domain types: status taxonomy and the live-updating cached view

mod status;
mod view;

pub use status::OrderStatus;
pub use view::OrderView;
