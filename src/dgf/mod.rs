//! DGF spot-quote auditing (component C3, §4.4).

mod calculator;

pub use calculator::*;
