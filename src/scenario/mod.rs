pub mod bounds;
pub mod loader;
pub mod types;

pub use self::bounds::Bounds;
pub use self::loader::load_scenario;
pub use self::types::{PersonnelClass, Scenario, Zone};
