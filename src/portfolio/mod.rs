pub mod position;

pub use position::{OpenPosition, PositionState, Side};
