use crate::assemble::ast::Element;
use crate::jvm::FieldType;
use crate::util::Width;
use std::cmp::Ordering;

/// One use of a local variable: where it happened and with what type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Usage {
    pub source: Element,
    pub field_type: FieldType,
}

/// Everything known about one local variable slot
///
/// A slot can be used by different names over the course of a method (and with different types,
/// since every assignment starts a fresh typed scope). The record tracks the most recent name
/// and every usage in the order they were encountered.
#[derive(Clone, Debug)]
pub struct VariableRecord {
    slot: usize,
    name: String,
    usages: Vec<Usage>,
    wide: bool,

    /// Set once the data-flow refinement pass has replaced the syntactic usages
    pub(super) refined: bool,
}

impl VariableRecord {
    pub(super) fn new(slot: usize, name: String) -> VariableRecord {
        VariableRecord {
            slot,
            name,
            usages: vec![],
            wide: false,
            refined: false,
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Name most recently bound to this slot
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usages(&self) -> &[Usage] {
        &self.usages
    }

    /// Types the slot has been used as, in order
    pub fn observed_types(&self) -> impl Iterator<Item = &FieldType> + '_ {
        self.usages.iter().map(|usage| &usage.field_type)
    }

    /// Distinct elements that touched this slot, in the order they first did so
    pub fn usage_sites(&self) -> Vec<Element> {
        let mut sites: Vec<Element> = Vec::with_capacity(self.usages.len());
        for usage in &self.usages {
            if !sites.contains(&usage.source) {
                sites.push(usage.source);
            }
        }
        sites
    }

    /// Type of the most recent usage
    ///
    /// Records only get created alongside their first usage, so this always exists.
    pub fn last_used_type(&self) -> &FieldType {
        &self
            .usages
            .last()
            .expect("variable record without any usages")
            .field_type
    }

    /// Has the slot ever held a `long` or `double`?
    pub fn is_wide(&self) -> bool {
        self.wide
    }

    pub(super) fn set_name(&mut self, name: &str) {
        if self.name != name {
            self.name = name.to_owned();
        }
    }

    pub(super) fn add_usage(&mut self, source: Element, field_type: FieldType) {
        if field_type.width() > 1 {
            self.wide = true;
        }
        self.usages.push(Usage { source, field_type });
    }

    /// Drop the usage history (the slot, name, and wideness are kept)
    pub(super) fn clear_usages(&mut self) {
        self.usages.clear();
    }
}

impl PartialEq for VariableRecord {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.name == other.name
    }
}

impl Eq for VariableRecord {}

impl PartialOrd for VariableRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Records are ordered by slot, then by name
impl Ord for VariableRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.slot
            .cmp(&other.slot)
            .then_with(|| self.name.cmp(&other.name))
    }
}
