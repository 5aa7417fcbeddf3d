//! Vendor API fetchers. Each returns the vendor's raw records untouched.

mod common;
mod defined;
mod reservoir;
mod transpose;

pub use common::HttpSettings;
pub use defined::DefinedClient;
pub use reservoir::ReservoirClient;
pub use transpose::TransposeClient;
