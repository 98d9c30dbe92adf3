//! The merge routine shared by every entity kind.

use crate::mergeable::Mergeable;
use passvault_model::{DeletedItem, Login, Tag, VaultBackup};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Change-set for one entity kind, to be applied to the local store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeResult<T> {
    /// Remote entities the local side does not have.
    pub to_add: Vec<T>,
    /// Remote versions that are newer than the local ones.
    pub to_update: Vec<T>,
    /// Local entities superseded by a newer remote tombstone, already marked deleted.
    pub to_delete: Vec<T>,
}

impl<T> MergeResult<T> {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_update.len() + self.to_delete.len()
    }
}

impl<T> Default for MergeResult<T> {
    fn default() -> Self {
        Self {
            to_add: Vec::new(),
            to_update: Vec::new(),
            to_delete: Vec::new(),
        }
    }
}

/// Outcome of merging two backups of the same vault.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CloudMerge {
    pub logins: MergeResult<Login>,
    pub tags: MergeResult<Tag>,
    /// Reconciled tombstones, newest first, one per id.
    pub deleted_items: Vec<DeletedItem>,
}

impl CloudMerge {
    /// True if no entity needs to change locally.
    pub fn is_empty(&self) -> bool {
        self.logins.is_empty() && self.tags.is_empty()
    }
}

/// Three-way merge of a local and a remote vault backup.
pub struct CloudMerger;

impl CloudMerger {
    /// Merges `remote` into `local`.
    ///
    /// Both backups must be in decrypted form; encrypted lists are read as
    /// empty. Logins are reconciled before tags and both kinds share one
    /// pair of tombstone working sets, since tombstones are keyed by id only.
    pub fn merge(local: &VaultBackup, remote: &VaultBackup) -> CloudMerge {
        let mut local_tombstones = TombstoneSet::new(local.deleted_items());
        let mut remote_tombstones = TombstoneSet::new(remote.deleted_items());

        let logins = merge_entities(
            local.logins(),
            remote.logins(),
            &mut local_tombstones,
            &mut remote_tombstones,
        );
        let tags = merge_entities(
            local.tags(),
            remote.tags(),
            &mut local_tombstones,
            &mut remote_tombstones,
        );

        let added: HashSet<&str> = logins
            .to_add
            .iter()
            .map(|l| l.id.as_str())
            .chain(tags.to_add.iter().map(|t| t.id.as_str()))
            .collect();
        let deleted_items = local_tombstones.union(remote_tombstones, &added);

        debug!(
            "merged vault {}: logins +{} ~{} -{}, tags +{} ~{} -{}, {} tombstones",
            local.vault_id,
            logins.to_add.len(),
            logins.to_update.len(),
            logins.to_delete.len(),
            tags.to_add.len(),
            tags.to_update.len(),
            tags.to_delete.len(),
            deleted_items.len()
        );

        CloudMerge {
            logins,
            tags,
            deleted_items,
        }
    }
}

fn merge_entities<T: Mergeable>(
    local: &[T],
    remote: &[T],
    local_tombstones: &mut TombstoneSet,
    remote_tombstones: &mut TombstoneSet,
) -> MergeResult<T> {
    let mut result = MergeResult::default();
    let mut remote_working = RemoteWorkingSet::new(remote);

    for entity in local {
        if let Some(theirs) = remote_working.take(entity.id()) {
            if theirs.updated_at() > entity.updated_at() {
                result.to_update.push(theirs.clone());
            }
            continue;
        }

        match remote_tombstones.deleted_at(entity.id()) {
            Some(deleted_at) if deleted_at > entity.updated_at() => {
                result
                    .to_delete
                    .push(entity.with_tombstone_applied(deleted_at));
            }
            // Recreated or restored locally after the remote deletion.
            Some(_) => remote_tombstones.remove(entity.id()),
            None => {}
        }
    }

    for theirs in remote_working.remaining() {
        match local_tombstones.deleted_at(theirs.id()) {
            Some(deleted_at) if theirs.updated_at() > deleted_at => {
                local_tombstones.remove(theirs.id());
                result.to_add.push(theirs.clone());
            }
            Some(_) => {
                debug!("remote entity {} predates local deletion, dropped", theirs.id());
            }
            None => result.to_add.push(theirs.clone()),
        }
    }

    result
}

/// Remote entities not yet paired with a local one, in remote order.
///
/// Duplicate ids collapse to the newest copy so a malformed remote list can
/// never yield the same id twice.
struct RemoteWorkingSet<'a, T> {
    entities: Vec<Option<&'a T>>,
    index: HashMap<&'a str, usize>,
}

impl<'a, T: Mergeable> RemoteWorkingSet<'a, T> {
    fn new(remote: &'a [T]) -> Self {
        let mut entities: Vec<Option<&'a T>> = Vec::with_capacity(remote.len());
        let mut index: HashMap<&'a str, usize> = HashMap::with_capacity(remote.len());

        for entity in remote {
            match index.get(entity.id()) {
                Some(&slot) => {
                    if entities[slot].is_some_and(|kept| entity.updated_at() > kept.updated_at()) {
                        entities[slot] = Some(entity);
                    }
                }
                None => {
                    index.insert(entity.id(), entities.len());
                    entities.push(Some(entity));
                }
            }
        }

        Self { entities, index }
    }

    fn take(&mut self, id: &str) -> Option<&'a T> {
        let slot = *self.index.get(id)?;
        self.entities[slot].take()
    }

    fn remaining(self) -> impl Iterator<Item = &'a T> {
        self.entities.into_iter().flatten()
    }
}

/// Mutable copy of one side's tombstones, one per id (the newest).
struct TombstoneSet {
    items: HashMap<String, DeletedItem>,
}

impl TombstoneSet {
    fn new(items: &[DeletedItem]) -> Self {
        let mut by_id: HashMap<String, DeletedItem> = HashMap::with_capacity(items.len());
        for item in items {
            match by_id.get_mut(&item.id) {
                Some(kept) if item.deleted_at > kept.deleted_at => *kept = item.clone(),
                Some(_) => {}
                None => {
                    by_id.insert(item.id.clone(), item.clone());
                }
            }
        }
        Self { items: by_id }
    }

    /// Latest deletion time recorded for `id`.
    fn deleted_at(&self, id: &str) -> Option<i64> {
        self.items.get(id).map(|t| t.deleted_at)
    }

    fn remove(&mut self, id: &str) {
        self.items.remove(id);
    }

    /// Union of both sides without restored ids, one tombstone per id
    /// (the newest), ordered by `deleted_at` descending then id.
    fn union(self, other: TombstoneSet, restored: &HashSet<&str>) -> Vec<DeletedItem> {
        let mut all: Vec<DeletedItem> = self
            .items
            .into_values()
            .chain(other.items.into_values())
            .filter(|t| !restored.contains(t.id.as_str()))
            .collect();
        all.sort_by(|a, b| {
            b.deleted_at
                .cmp(&a.deleted_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut seen = HashSet::new();
        all.retain(|t| seen.insert(t.id.clone()));
        all
    }
}
