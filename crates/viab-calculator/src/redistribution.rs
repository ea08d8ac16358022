//! Percentage redistribution for bounded share sets.
//!
//! A share set reacts to one user edit at a time: the edited share moves by
//! `delta`, every other share gives back `delta` in proportion to its weight in
//! the previous snapshot, and each result is clamped to its own bounds.
//!
//! This is a single pass. Once a share hits a bound the clamped remainder is
//! not handed to anyone else, so the set no longer sums to what it summed to
//! before the edit. Callers that need to know whether a bound was hit compare
//! the pre and post values themselves.
//!
//! The previous snapshot is plain data passed in and handed back, so the same
//! function serves batch, interactive and per-project concurrent callers. Two
//! callers racing on one snapshot lose an update; serializing edits to the same
//! project is up to the owner of the project record.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use viab_types::{BoundsTable, ShareSet, ShareSource};

/// The share set as it stood after the last redistribution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareSnapshot(ShareSet);

impl ShareSnapshot {
    /// Takes a snapshot of `shares`.
    pub fn capture(shares: &ShareSet) -> Self {
        Self(shares.clone())
    }

    pub fn shares(&self) -> &ShareSet {
        &self.0
    }

    pub fn into_inner(self) -> ShareSet {
        self.0
    }
}

/// How to treat a call where more than one share differs from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPolicy {
    /// The first differing key in set order is the edit, unless the caller
    /// names it. The other differences are overwritten by the pass and
    /// reported as overridden.
    #[default]
    FirstChangeWins,
    /// More than one differing key, or an explicit edit over pending
    /// differences, is refused and nothing changes.
    RejectMultiple,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RedistributionError {
    #[error("{} shares changed in a single edit: {}", keys.len(), keys.join(", "))]
    MultipleEdits { keys: Vec<String> },

    #[error("share '{key}' is not part of this set")]
    UnknownKey { key: String },
}

/// The share that was treated as the user's edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditedShare {
    pub key: String,
    /// Percentage after clamping to the share's own bounds.
    pub percentage: f64,
    /// Movement relative to the previous snapshot.
    pub delta: f64,
}

/// Outcome of one redistribution call.
#[derive(Debug, Clone, PartialEq)]
pub struct Redistribution {
    pub shares: ShareSet,
    /// Snapshot to pass into the next call.
    pub snapshot: ShareSnapshot,
    /// `None` when nothing changed.
    pub edited: Option<EditedShare>,
    /// Other keys that differed from the snapshot and were overwritten.
    pub overridden: Vec<String>,
}

impl Redistribution {
    fn unchanged(current: &ShareSet) -> Self {
        Self {
            shares: current.clone(),
            snapshot: ShareSnapshot::capture(current),
            edited: None,
            overridden: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.edited.is_none()
    }
}

/// Keys of `current`, in set order, whose percentage differs from `previous`.
/// A key missing from `previous` counts as changed.
pub fn changed_keys(current: &ShareSet, previous: &ShareSet) -> Vec<String> {
    current
        .iter()
        .filter(|item| previous.percentage(&item.key) != Some(item.percentage))
        .map(|item| item.key.clone())
        .collect()
}

/// Reacts to a single edit in `current` relative to `previous`.
///
/// Unchanged input is a no-op. A key missing from `previous` is treated as an
/// edit from 0. When every other share was 0 in the snapshot there is no
/// proportional base and the others are left as they are.
#[instrument(skip_all, fields(share_count = current.len(), policy = ?policy))]
pub fn redistribute(
    current: &ShareSet,
    previous: &ShareSnapshot,
    bounds: &BoundsTable,
    policy: EditPolicy,
) -> Result<Redistribution, RedistributionError> {
    let previous = previous.shares();
    if current.same_percentages(previous) {
        debug!("Share set unchanged since last snapshot");
        return Ok(Redistribution::unchanged(current));
    }

    let mut changed = changed_keys(current, previous);
    if changed.is_empty() {
        // Only removals or reordering: there is no edit to absorb.
        return Ok(Redistribution::unchanged(current));
    }
    if changed.len() > 1 {
        match policy {
            EditPolicy::RejectMultiple => {
                warn!(keys = ?changed, "Refusing multi-key share edit");
                return Err(RedistributionError::MultipleEdits { keys: changed });
            }
            EditPolicy::FirstChangeWins => {
                warn!(keys = ?changed, "Multi-key share edit, first differing key wins");
            }
        }
    }
    let edited_key = changed.remove(0);
    Ok(apply_edit(current, previous, bounds, edited_key, changed))
}

/// Applies the edit of `edited_key` against `previous`, moving every other
/// share by its proportional part of the delta.
fn apply_edit(
    current: &ShareSet,
    previous: &ShareSet,
    bounds: &BoundsTable,
    edited_key: String,
    overridden: Vec<String>,
) -> Redistribution {
    let previous_value = previous.percentage(&edited_key).unwrap_or(0.0);
    let requested = current.percentage(&edited_key).unwrap_or(previous_value);
    let edited_value = bounds.bounds(&edited_key).clamp(requested);
    let delta = edited_value - previous_value;
    let total_others: f64 =
        previous.iter().filter(|item| item.key != edited_key).map(|item| item.percentage).sum();

    let mut shares = current.clone();
    for item in shares.iter_mut() {
        if item.key == edited_key {
            item.percentage = edited_value;
            item.source = ShareSource::Manual;
        } else if total_others > 0.0 {
            let proportion = previous.percentage(&item.key).unwrap_or(0.0) / total_others;
            item.percentage = bounds.bounds(&item.key).clamp(item.percentage - delta * proportion);
            item.source = ShareSource::Derived;
        }
    }

    if total_others <= 0.0 {
        debug!(key = %edited_key, "No proportional base, other shares left unchanged");
    }
    info!(key = %edited_key, delta, total_others, "Redistributed share edit");

    Redistribution {
        snapshot: ShareSnapshot::capture(&shares),
        shares,
        edited: Some(EditedShare { key: edited_key, percentage: edited_value, delta }),
        overridden,
    }
}

/// One independent editing session over a share set.
///
/// Direct-cost stages and indirect-cost items each get their own editor, so an
/// edit in one never touches the other.
#[derive(Debug, Clone)]
pub struct ShareEditor {
    shares: ShareSet,
    snapshot: ShareSnapshot,
    bounds: BoundsTable,
    policy: EditPolicy,
}

impl ShareEditor {
    /// Starts a session whose snapshot equals the given shares.
    pub fn new(shares: ShareSet, bounds: BoundsTable, policy: EditPolicy) -> Self {
        let snapshot = ShareSnapshot::capture(&shares);
        Self { shares, snapshot, bounds, policy }
    }

    /// Resumes a session from persisted shares and snapshot.
    pub fn resume(
        shares: ShareSet,
        snapshot: ShareSnapshot,
        bounds: BoundsTable,
        policy: EditPolicy,
    ) -> Self {
        Self { shares, snapshot, bounds, policy }
    }

    /// Sets `key` to `percentage` and redistributes the others.
    ///
    /// `key` is the edit even when other shares already differ from the
    /// snapshot. Those pending differences are absorbed by the pass and
    /// reported as overridden, or refused under [`EditPolicy::RejectMultiple`].
    /// On error the session is left untouched.
    pub fn edit(&mut self, key: &str, percentage: f64) -> Result<Redistribution, RedistributionError> {
        let mut proposed = self.shares.clone();
        if !proposed.set_percentage(key, percentage) {
            return Err(RedistributionError::UnknownKey { key: key.to_string() });
        }

        let previous = self.snapshot.shares();
        if proposed.same_percentages(previous) {
            debug!(key, "Share set unchanged since last snapshot");
            let outcome = Redistribution::unchanged(&proposed);
            self.shares = outcome.shares.clone();
            self.snapshot = outcome.snapshot.clone();
            return Ok(outcome);
        }

        let pending: Vec<String> =
            changed_keys(&self.shares, previous).into_iter().filter(|k| k != key).collect();
        if !pending.is_empty() {
            match self.policy {
                EditPolicy::RejectMultiple => {
                    warn!(key, pending = ?pending, "Refusing edit over pending share changes");
                    let mut keys = vec![key.to_string()];
                    keys.extend(pending);
                    return Err(RedistributionError::MultipleEdits { keys });
                }
                EditPolicy::FirstChangeWins => {
                    warn!(key, pending = ?pending, "Pending share changes absorbed by explicit edit");
                }
            }
        }

        let outcome = apply_edit(&proposed, previous, &self.bounds, key.to_string(), pending);
        self.shares = outcome.shares.clone();
        self.snapshot = outcome.snapshot.clone();
        Ok(outcome)
    }

    /// Reconciles pending differences between the shares and the snapshot.
    pub fn sync(&mut self) -> Result<Redistribution, RedistributionError> {
        let outcome = redistribute(&self.shares, &self.snapshot, &self.bounds, self.policy)?;
        self.shares = outcome.shares.clone();
        self.snapshot = outcome.snapshot.clone();
        Ok(outcome)
    }

    pub fn shares(&self) -> &ShareSet {
        &self.shares
    }

    pub fn snapshot(&self) -> &ShareSnapshot {
        &self.snapshot
    }

    pub fn into_parts(self) -> (ShareSet, ShareSnapshot) {
        (self.shares, self.snapshot)
    }
}
