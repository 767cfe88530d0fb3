//! Safe SQL builder: identifiers from fixed table definitions, values as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
