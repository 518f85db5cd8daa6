//! Snapshot-based undo/redo history

mod store;

pub use store::{
    DEFAULT_CAPACITY, EntrySummary, HistoryEntry, HistoryError, HistoryStatus, HistoryStore,
    HistorySummary,
};
