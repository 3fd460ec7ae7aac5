mod error;
mod paths;
mod schema;
mod store;

pub use error::HistoryStoreError;
pub use paths::{history_file, HISTORY_DIR, HISTORY_FILE_NAME};
pub use schema::HistoryRecord;
pub use store::FileHistoryStore;
