//! Pull-based reconciliation of EXT property records into the local store

mod reconciler;

pub use reconciler::SyncReconciler;
