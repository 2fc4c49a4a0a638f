// Fact registry and value types
pub mod registry;
pub mod value;

pub use registry::{Facter, Snapshot};
pub use value::FactValue;
