//
// scope.rs
//
// Monotonic set of file identities the analysis engine is allowed to see
//

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// A file path folded to its canonical lowercase form.
///
/// The host already lowercases open-file keys, so every other path that is
/// compared against the scope must be folded the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileIdentity(String);

impl FileIdentity {
    pub fn new(path: &str) -> Self {
        Self(path.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileIdentity {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<&String> for FileIdentity {
    fn from(path: &String) -> Self {
        Self::new(path)
    }
}

impl From<String> for FileIdentity {
    fn from(path: String) -> Self {
        Self::new(&path)
    }
}

thread_local! {
    static PROCESS_SCOPE: ScopeTracker = ScopeTracker::new();
}

/// Shared handle to the set of in-scope files.
///
/// Cloning the tracker clones the handle, not the set: every clone observes
/// and grows the same membership. The set only ever grows; there is no
/// removal API.
///
/// The host drives both interception points from a single thread and never
/// re-enters them, so the set lives behind a `RefCell` rather than a lock.
#[derive(Clone, Default)]
pub struct ScopeTracker {
    files: Rc<RefCell<HashSet<FileIdentity>>>,
}

impl ScopeTracker {
    /// Create an isolated, empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tracker shared by every session created on this host thread.
    ///
    /// Plugin sessions use this by default, so a host that creates several
    /// projects in one process sees a single, combined scope.
    pub fn process_wide() -> Self {
        PROCESS_SCOPE.with(Clone::clone)
    }

    /// Insert a file. Adding an already present file is a no-op.
    pub fn add(&self, identity: impl Into<FileIdentity>) {
        self.files.borrow_mut().insert(identity.into());
    }

    /// Insert every file from `identities`.
    pub fn extend<I>(&self, identities: I)
    where
        I: IntoIterator,
        I::Item: Into<FileIdentity>,
    {
        let mut files = self.files.borrow_mut();
        files.extend(identities.into_iter().map(Into::into));
    }

    /// Membership test, folded the same way as [`ScopeTracker::add`].
    pub fn contains(&self, path: &str) -> bool {
        self.contains_identity(&FileIdentity::new(path))
    }

    pub fn contains_identity(&self, identity: &FileIdentity) -> bool {
        self.files.borrow().contains(identity)
    }

    /// Current number of in-scope files.
    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }

    /// Sorted copy of the current membership, for diagnostics.
    pub fn snapshot(&self) -> Vec<FileIdentity> {
        let mut files: Vec<_> = self.files.borrow().iter().cloned().collect();
        files.sort();
        files
    }

    /// True when both handles point at the same underlying set.
    pub fn shares_state_with(&self, other: &ScopeTracker) -> bool {
        Rc::ptr_eq(&self.files, &other.files)
    }
}

impl fmt::Debug for ScopeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeTracker")
            .field("len", &self.len())
            .finish()
    }
}
