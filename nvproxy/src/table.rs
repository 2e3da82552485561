//! Capability tables.
//!
//! An [`IoctlTable`] is four independent key→handler maps, one per
//! [`IoctlClass`]. Anything absent from the table is not mediated. A
//! [`TableOverlay`] is the sparse per-release change set that
//! [`IoctlTable::apply`] folds in.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::dispatch::{
    AllocationClassHandler, ControlCmdHandler, FrontendIoctlHandler, UvmIoctlHandler,
};

/// The four key spaces a guest request can be matched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IoctlClass {
    /// `IOC_NR` of a request on the frontend device.
    Frontend,
    /// Raw request number on the UVM device.
    Uvm,
    /// `cmd` nested in `NV_ESC_RM_CONTROL`.
    ControlCommand,
    /// `hClass` nested in `NV_ESC_RM_ALLOC`.
    AllocationClass,
}

impl IoctlClass {
    pub const ALL: [IoctlClass; 4] = [
        IoctlClass::Frontend,
        IoctlClass::Uvm,
        IoctlClass::ControlCommand,
        IoctlClass::AllocationClass,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            IoctlClass::Frontend => "frontend",
            IoctlClass::Uvm => "uvm",
            IoctlClass::ControlCommand => "control_command",
            IoctlClass::AllocationClass => "allocation_class",
        }
    }
}

impl fmt::Display for IoctlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A callable bound at registration time, with the name it was registered
/// under.
#[derive(Clone, Copy)]
pub struct Handler<F> {
    name: &'static str,
    func: F,
}

impl<F: Copy> Handler<F> {
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn func(&self) -> F {
        self.func
    }
}

impl<F> fmt::Debug for Handler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.name).finish()
    }
}

/// One overlay entry: bind (add or overwrite) or delete.
#[derive(Debug, Clone, Copy)]
pub enum Entry<F> {
    Bind(Handler<F>),
    Tombstone,
}

/// Handlers for one class, keyed by the class's 32-bit key.
#[derive(Debug, Clone)]
pub struct ClassMap<F> {
    entries: HashMap<u32, Handler<F>>,
}

impl<F> Default for ClassMap<F> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<F: Copy> ClassMap<F> {
    pub fn get(&self, key: u32) -> Option<Handler<F>> {
        self.entries.get(&key).copied()
    }

    pub fn contains(&self, key: u32) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(key, handler name)` pairs in key order.
    pub fn describe(&self) -> Vec<(u32, &'static str)> {
        let mut out: Vec<_> = self.entries.iter().map(|(k, h)| (*k, h.name)).collect();
        out.sort_unstable_by_key(|(k, _)| *k);
        out
    }

    fn merge(&mut self, entries: &[(u32, Entry<F>)]) {
        for (key, entry) in entries {
            match entry {
                Entry::Bind(h) => {
                    self.entries.insert(*key, *h);
                }
                Entry::Tombstone => {
                    self.entries.remove(key);
                }
            }
        }
    }
}

/// Sparse change set for one release. `None` leaves a class untouched; a
/// present list is applied entry by entry.
#[derive(Debug, Clone, Default)]
pub struct TableOverlay {
    pub frontend: Option<Vec<(u32, Entry<FrontendIoctlHandler>)>>,
    pub uvm: Option<Vec<(u32, Entry<UvmIoctlHandler>)>>,
    pub control_cmd: Option<Vec<(u32, Entry<ControlCmdHandler>)>>,
    pub allocation_class: Option<Vec<(u32, Entry<AllocationClassHandler>)>>,
}

impl TableOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frontend(mut self, entries: &[(u32, Entry<FrontendIoctlHandler>)]) -> Self {
        self.frontend = Some(entries.to_vec());
        self
    }

    pub fn uvm(mut self, entries: &[(u32, Entry<UvmIoctlHandler>)]) -> Self {
        self.uvm = Some(entries.to_vec());
        self
    }

    pub fn control_cmd(mut self, entries: &[(u32, Entry<ControlCmdHandler>)]) -> Self {
        self.control_cmd = Some(entries.to_vec());
        self
    }

    pub fn allocation_class(mut self, entries: &[(u32, Entry<AllocationClassHandler>)]) -> Self {
        self.allocation_class = Some(entries.to_vec());
        self
    }

    /// Keys this overlay touches in `class`, in declaration order. `None`
    /// if the class is untouched.
    pub fn keys(&self, class: IoctlClass) -> Option<Vec<u32>> {
        fn keys_of<F>(entries: &Option<Vec<(u32, Entry<F>)>>) -> Option<Vec<u32>> {
            entries.as_ref().map(|e| e.iter().map(|(k, _)| *k).collect())
        }
        match class {
            IoctlClass::Frontend => keys_of(&self.frontend),
            IoctlClass::Uvm => keys_of(&self.uvm),
            IoctlClass::ControlCommand => keys_of(&self.control_cmd),
            IoctlClass::AllocationClass => keys_of(&self.allocation_class),
        }
    }

    /// First key listed twice within one class, if any.
    pub fn duplicate_key(&self) -> Option<(IoctlClass, u32)> {
        IoctlClass::ALL.into_iter().find_map(|class| {
            let mut seen = HashSet::new();
            self.keys(class)?
                .into_iter()
                .find(|k| !seen.insert(*k))
                .map(|k| (class, k))
        })
    }
}

/// The effective set of mediated entry points for one driver release.
#[derive(Debug, Clone, Default)]
pub struct IoctlTable {
    pub frontend: ClassMap<FrontendIoctlHandler>,
    pub uvm: ClassMap<UvmIoctlHandler>,
    pub control_cmd: ClassMap<ControlCmdHandler>,
    pub allocation_class: ClassMap<AllocationClassHandler>,
}

impl IoctlTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `overlay` into this table, class by class.
    pub fn apply(&mut self, overlay: &TableOverlay) {
        if let Some(e) = &overlay.frontend {
            self.frontend.merge(e);
        }
        if let Some(e) = &overlay.uvm {
            self.uvm.merge(e);
        }
        if let Some(e) = &overlay.control_cmd {
            self.control_cmd.merge(e);
        }
        if let Some(e) = &overlay.allocation_class {
            self.allocation_class.merge(e);
        }
    }

    pub fn len(&self, class: IoctlClass) -> usize {
        match class {
            IoctlClass::Frontend => self.frontend.len(),
            IoctlClass::Uvm => self.uvm.len(),
            IoctlClass::ControlCommand => self.control_cmd.len(),
            IoctlClass::AllocationClass => self.allocation_class.len(),
        }
    }

    pub fn total_len(&self) -> usize {
        IoctlClass::ALL.into_iter().map(|c| self.len(c)).sum()
    }

    pub fn contains(&self, class: IoctlClass, key: u32) -> bool {
        match class {
            IoctlClass::Frontend => self.frontend.contains(key),
            IoctlClass::Uvm => self.uvm.contains(key),
            IoctlClass::ControlCommand => self.control_cmd.contains(key),
            IoctlClass::AllocationClass => self.allocation_class.contains(key),
        }
    }

    pub fn describe(&self, class: IoctlClass) -> Vec<(u32, &'static str)> {
        match class {
            IoctlClass::Frontend => self.frontend.describe(),
            IoctlClass::Uvm => self.uvm.describe(),
            IoctlClass::ControlCommand => self.control_cmd.describe(),
            IoctlClass::AllocationClass => self.allocation_class.describe(),
        }
    }

    /// Hex SHA-256 over every class's sorted `(key, handler name)` pairs.
    /// Equal fingerprints mean the same mediated surface.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for class in IoctlClass::ALL {
            hasher.update(class.as_str().as_bytes());
            hasher.update([0u8]);
            for (key, name) in self.describe(class) {
                hasher.update(key.to_le_bytes());
                hasher.update(name.as_bytes());
                hasher.update([0u8]);
            }
        }
        hex::encode(hasher.finalize())
    }
}
