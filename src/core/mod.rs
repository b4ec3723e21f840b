//! Shared audit types, the rate-store facade, and the mode-independent
//! pieces of the engine: zone resolution, service-surcharge resolution,
//! variance classification, and mode dispatch.

pub mod builder;
pub mod dispatch;
pub mod error;
pub mod store;
pub mod surcharge;
pub mod types;
pub mod variance;
pub mod zone;

pub use builder::*;
pub use dispatch::*;
pub use error::*;
pub use store::*;
pub use surcharge::*;
pub use types::*;
pub use variance::*;
pub use zone::*;
