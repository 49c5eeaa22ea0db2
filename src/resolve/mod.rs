//! Reference aggregation and classification.
//!
//! Candidates arrive from several independent sources: the editor's own
//! reference and definition lookups, the text scanner, and prop
//! transmission analysis. [`ReferenceSet`] merges them into one entry per
//! `(file, line, column)` and splits them by file of origin.

pub mod export;
pub mod transmission;

pub use export::is_symbol_exported;
pub use transmission::analyze_props_transmission;

use crate::scan::{PatternKind, ReferenceCandidate};
use crate::text::{Location, LocationKey, Range};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where a reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "kind", rename_all = "snake_case")]
pub enum ReferenceOrigin {
    /// The editor's reference lookup.
    Editor,
    /// The editor's definition lookup.
    Definition,
    /// A prop or event bound on a usage of the component.
    Transmission(PatternKind),
    /// A text-scanner match.
    Scanner(PatternKind),
}

impl ReferenceOrigin {
    fn rank(&self) -> u8 {
        match self {
            ReferenceOrigin::Editor => 3,
            ReferenceOrigin::Definition => 2,
            ReferenceOrigin::Transmission(_) => 1,
            ReferenceOrigin::Scanner(_) => 0,
        }
    }

    /// The matched construct, for scanner and transmission origins.
    pub fn kind(&self) -> Option<PatternKind> {
        match self {
            ReferenceOrigin::Transmission(kind) | ReferenceOrigin::Scanner(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// One merged reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Where the symbol occurs.
    pub location: Location,
    /// Which source reported it.
    pub origin: ReferenceOrigin,
}

impl Reference {
    /// Create a reference.
    pub fn new(location: Location, origin: ReferenceOrigin) -> Self {
        Self { location, origin }
    }

    fn preference(&self) -> (u8, Option<PatternKind>, Range) {
        (self.origin.rank(), self.origin.kind(), self.location.range)
    }
}

/// Deduplicated references keyed by `(file, line, column)`.
///
/// When two sources report the same key the entry with the stronger origin
/// is kept, so the result does not depend on merge order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    entries: BTreeMap<LocationKey, Reference>,
}

impl ReferenceSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one reference. Returns true if its key was not present before.
    pub fn insert(&mut self, reference: Reference) -> bool {
        let key = reference.location.key();
        match self.entries.get_mut(&key) {
            Some(existing) => {
                if reference.preference() > existing.preference() {
                    *existing = reference;
                }
                false
            }
            None => {
                self.entries.insert(key, reference);
                true
            }
        }
    }

    /// Add plain locations under one origin. Returns how many keys were new.
    pub fn extend_locations<I>(&mut self, locations: I, origin: ReferenceOrigin) -> usize
    where
        I: IntoIterator<Item = Location>,
    {
        locations
            .into_iter()
            .filter(|location| self.insert(Reference::new(location.clone(), origin)))
            .count()
    }

    /// Add scanner candidates. Returns how many keys were new.
    pub fn extend_scanned<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = ReferenceCandidate>,
    {
        candidates
            .into_iter()
            .filter(|c| self.insert(Reference::new(c.location.clone(), ReferenceOrigin::Scanner(c.kind))))
            .count()
    }

    /// Add transmission candidates. Returns how many keys were new.
    pub fn extend_transmitted<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = ReferenceCandidate>,
    {
        candidates
            .into_iter()
            .filter(|c| {
                self.insert(Reference::new(
                    c.location.clone(),
                    ReferenceOrigin::Transmission(c.kind),
                ))
            })
            .count()
    }

    /// Number of distinct locations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// References in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.entries.values()
    }

    /// Owned copy of every reference, in key order.
    pub fn to_vec(&self) -> Vec<Reference> {
        self.entries.values().cloned().collect()
    }

    /// Distinct files touched by the set.
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.entries.keys().map(|k| k.file.clone()).collect();
        files.dedup();
        files
    }
}

/// References split by file of origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// References in the document the rename started from.
    pub current: Vec<Reference>,
    /// References anywhere else.
    pub other: Vec<Reference>,
}

/// Split `set` by exact path equality against `origin_file`.
pub fn partition_by_origin(set: &ReferenceSet, origin_file: &Path) -> Partition {
    let (current, other) = set
        .iter()
        .cloned()
        .partition(|r| r.location.file == origin_file);
    Partition { current, other }
}
