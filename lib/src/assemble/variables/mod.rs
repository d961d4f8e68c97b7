//! Resolution of named local variables into slots
//!
//! [`VariableTable`] is the entry point. The other types are the pieces it is built from:
//! [`SlotAllocator`] for slot bookkeeping, [`TypeReconciler`] for checking that usages of a
//! variable agree on its type, and [`VariableRecord`] for what ends up known about each slot.

mod reconcile;
mod record;
mod slots;
mod table;

pub use reconcile::*;
pub use record::*;
pub use slots::*;
pub use table::*;
