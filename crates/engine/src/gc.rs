/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */
//! The heap, the object model and the rest of the surrounding engine are
//! collaborators the execution core calls into, never owns. This module
//! only fixes the handle representation and the acquire/release contract
//! the interpreter honors when it mutates a register, an upvalue cell or
//! a catch scratch slot -- the allocator, the mark/sweep cycle, and the
//! object layout all live on the other side of [Heap].

use std::fmt;

/// Opaque reference to a heap-resident cell (object, string, function
/// template, environment record...). The execution core never inspects
/// the bits; it is free payload a [Heap] implementation chooses.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Handle(u64);

impl Handle {
    #[inline(always)]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:#x})", self.0)
    }
}

/// The acquire/release contract every value-carrying mutation in the
/// interpreter goes through: before a slot's old value is discarded the
/// new value is acquired, and only after the new value is installed is
/// the old value released. This is the save-old / install-new /
/// acquire-new / release-old discipline the dispatch loop follows for
/// every register write, upvalue store and environment slot store.
pub trait Heap {
    /// Called right before a handle-carrying value is overwritten, with
    /// the value about to take its place. A reference-counting or
    /// generational collector bumps the new value's refcount or write
    /// barrier here.
    fn acquire(&mut self, value: crate::vm::value::Value);

    /// Called right after a handle-carrying value has been replaced, with
    /// the value that was just discarded.
    fn release(&mut self, value: crate::vm::value::Value);

    /// Re-resolve a handle after a potentially heap-moving operation
    /// (allocation, GC pause). Stacks and frames that cache raw offsets
    /// into heap-resident storage must call this instead of assuming a
    /// handle stays valid across any call that can allocate.
    fn pin(&mut self, value: crate::vm::value::Value) -> crate::vm::value::Value {
        value
    }
}

/// A [Heap] that performs no bookkeeping; acquire/release are no-ops.
/// Used by tests and by embeddings whose object model does its own
/// reference counting outside the hooks above.
#[derive(Default)]
pub struct NullHeap;

impl Heap for NullHeap {
    fn acquire(&mut self, _value: crate::vm::value::Value) {}
    fn release(&mut self, _value: crate::vm::value::Value) {}
}
