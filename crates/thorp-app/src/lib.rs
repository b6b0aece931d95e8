pub mod background;
pub mod config;
pub mod logging;
pub mod presentation;
pub mod protocol;
pub mod session;
pub mod store;
pub mod watch;

pub use background::Background;
pub use config::{ConfigError, ThorpConfig};
pub use protocol::{CountUpdate, Message, Reply, StatusReply};
pub use session::Session;
pub use store::{JsonFileStore, MemoryStore, PersistenceStore, StoreError, StoredStatus};
pub use watch::{Inbound, Watch, WatchError, WatchSummary};
