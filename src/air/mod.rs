//! Air freight pricing calculator (component C3, §4.4).

mod calculator;

pub use calculator::*;
