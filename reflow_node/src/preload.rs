// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Preload outcome summary for the session boundary.
//!
//! Before a session is built, hosts typically fetch a batch of assets
//! (stylesheets, images) concurrently and only then run the synchronous
//! traversal. The core does not perform those fetches; it consumes a
//! [`PreloadReport`] folded from the per-asset outcomes. Partial failures are
//! recorded and tolerated; a failed fetch never aborts the session.

use alloc::vec::Vec;

/// Identifier for one preloaded asset, chosen by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetId(pub u64);

/// Why a single asset failed to preload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PreloadError {
    /// The asset could not be located.
    NotFound,
    /// The fetch started but did not complete.
    Failed,
    /// The asset arrived but could not be decoded.
    Corrupt,
}

/// A batched summary of one preload pass.
#[derive(Clone, Debug, Default)]
pub struct PreloadReport {
    /// Assets that arrived intact, in completion order.
    pub loaded: Vec<AssetId>,
    /// Assets that did not, with the reason.
    pub failed: Vec<(AssetId, PreloadError)>,
}

impl PreloadReport {
    /// Fold per-asset outcomes into a report.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = (AssetId, Result<(), PreloadError>)>,
    {
        let mut report = Self::default();
        for (id, outcome) in results {
            match outcome {
                Ok(()) => report.loaded.push(id),
                Err(e) => report.failed.push((id, e)),
            }
        }
        report
    }

    /// `true` when every asset in the batch arrived.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of assets in the batch, loaded or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.loaded.len() + self.failed.len()
    }

    /// `true` when the batch was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.failed.is_empty()
    }
}
