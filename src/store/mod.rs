//! Game-state store: move history and current position, observable.

mod board;
mod observable;

pub use board::BoardStore;
pub use observable::{Listeners, Subscription};
