//! Ocean freight pricing calculator and fuzzy lane matcher (C3 + C4, §4.3/§4.4).

mod calculator;
mod fuzzy;
mod matcher;

pub use calculator::*;
pub use fuzzy::*;
pub use matcher::*;
