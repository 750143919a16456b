use serde::{Deserialize, Serialize};
use std::fmt;

//direction of an open position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    //converts to profit sign (Long = +1, Short = -1)
    pub fn sign(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => f.write_str("Long"),
            Side::Short => f.write_str("Short"),
        }
    }
}

//an open position, entry data only exists while the position does
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: Side,
    pub entry_price: f64,
    pub entry_index: usize,
}

impl OpenPosition {
    //signed profit in price points at the given price
    pub fn profit_at(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.side.sign()
    }
}

//running position of a single simulation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PositionState {
    #[default]
    Flat,
    Open(OpenPosition),
}

impl PositionState {
    //returns true if there is no open position
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    //returns true if the position is long
    pub fn is_long(&self) -> bool {
        self.side() == Some(Side::Long)
    }

    //returns true if the position is short
    pub fn is_short(&self) -> bool {
        self.side() == Some(Side::Short)
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            PositionState::Flat => None,
            PositionState::Open(open) => Some(open.side),
        }
    }

    pub fn entry_price(&self) -> Option<f64> {
        match self {
            PositionState::Flat => None,
            PositionState::Open(open) => Some(open.entry_price),
        }
    }

    //opens a position, only valid from flat
    pub fn open(&mut self, side: Side, price: f64, index: usize) {
        debug_assert!(self.is_flat(), "open called on an open position");
        *self = PositionState::Open(OpenPosition {
            side,
            entry_price: price,
            entry_index: index,
        });
    }

    //closes the position and returns what was open
    pub fn close(&mut self) -> Option<OpenPosition> {
        match std::mem::take(self) {
            PositionState::Flat => None,
            PositionState::Open(open) => Some(open),
        }
    }

    //unrealized profit at the given price, none when flat
    pub fn unrealized_pnl(&self, price: f64) -> Option<f64> {
        match self {
            PositionState::Flat => None,
            PositionState::Open(open) => Some(open.profit_at(price)),
        }
    }
}
