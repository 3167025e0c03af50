// Persistence adapter and the services built on it
pub mod readings;
pub mod store;
pub mod tanks;

pub use readings::{ReadingService, TankDashboard};
pub use store::{Collection, FileStore, InMemoryStore, KeyValueStore, StoreBackend};
pub use tanks::{NewTank, TankService, TankUpdate};
