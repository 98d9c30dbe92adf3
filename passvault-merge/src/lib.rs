//! Deterministic merge of two copies of a PassVault backup.
//!
//! The merge engine is a pure function: given the local and the remote
//! snapshot of one vault it returns the change-sets that bring the local
//! store in line with the reconciled state, plus the reconciled tombstone
//! set. It performs no I/O and never fails.
//!
//! Conflicts are resolved last-writer-wins on `updatedAt` with no field-level
//! merging. Deletions travel as tombstones and compete with live entities on
//! timestamp, so a restore that happened after a deletion wins and vice versa.
//! Equal timestamps always keep the local side.

mod mergeable;
mod merger;

pub use mergeable::Mergeable;
pub use merger::{CloudMerge, CloudMerger, MergeResult};
