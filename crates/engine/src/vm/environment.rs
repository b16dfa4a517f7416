/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */
//! Lexical environment records. A declarative record is a flat array of
//! [Variable] slots indexed by the compiler at emit time, chained to its
//! parent the way a closure captures its defining scope; an object
//! record defers every lookup to the object model (the `with` statement
//! and the global environment both need this).

use crate::gc::Heap;
use crate::vm::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy)]
pub struct Variable {
    pub value: Value,
    pub mutable: bool,
    pub initialized: bool,
}

impl Variable {
    fn uninitialized(mutable: bool) -> Self {
        Self { value: Value::undefined(), mutable, initialized: false }
    }
}

pub type EnvironmentRef = Rc<RefCell<Environment>>;

pub enum Environment {
    Declarative {
        parent: Option<EnvironmentRef>,
        slots: Vec<Variable>,
    },
    /// Delegates every binding to the object model's global object --
    /// used for the outermost environment and `with` blocks.
    Object { parent: Option<EnvironmentRef> },
}

impl Environment {
    pub fn new_declarative(parent: Option<EnvironmentRef>, capacity: u16) -> EnvironmentRef {
        Rc::new(RefCell::new(Environment::Declarative {
            parent,
            slots: vec![Variable::uninitialized(true); capacity as usize],
        }))
    }

    pub fn new_object(parent: Option<EnvironmentRef>) -> EnvironmentRef {
        Rc::new(RefCell::new(Environment::Object { parent }))
    }

    pub fn parent(&self) -> Option<&EnvironmentRef> {
        match self {
            Environment::Declarative { parent, .. } => parent.as_ref(),
            Environment::Object { parent } => parent.as_ref(),
        }
    }

    pub fn declare(&mut self, slot: u16, value: Value, mutable: bool, heap: &mut dyn Heap) {
        match self {
            Environment::Declarative { slots, .. } => {
                let var = &mut slots[slot as usize];
                heap.acquire(value);
                let was_initialized = var.initialized;
                let old = var.value;
                var.value = value;
                var.mutable = mutable;
                var.initialized = true;
                if was_initialized {
                    heap.release(old);
                }
            }
            Environment::Object { .. } => unreachable!("declare on an object environment"),
        }
    }

    pub fn get_local(&self, slot: u16) -> Value {
        match self {
            Environment::Declarative { slots, .. } => slots[slot as usize].value,
            Environment::Object { .. } => unreachable!("indexed read on an object environment"),
        }
    }

    /// Writes a local slot, honoring const bindings. Returns `false` (a
    /// TypeError at the call site) if the slot is declared immutable.
    pub fn set_local(&mut self, slot: u16, value: Value, heap: &mut dyn Heap) -> bool {
        match self {
            Environment::Declarative { slots, .. } => {
                let var = &mut slots[slot as usize];
                if !var.mutable {
                    return false;
                }
                heap.acquire(value);
                let old = var.value;
                var.value = value;
                heap.release(old);
                true
            }
            Environment::Object { .. } => unreachable!("indexed write on an object environment"),
        }
    }

    pub fn is_object_environment(&self) -> bool {
        matches!(self, Environment::Object { .. })
    }
}

/// Walks `depth` parent links from `start` and returns the environment
/// that owns the targeted slot. `GetVar`/`SetVar` opcodes carry this
/// depth directly so the lookup never has to search by name at run time.
pub fn resolve_depth(start: &EnvironmentRef, depth: u16) -> EnvironmentRef {
    let mut current = start.clone();
    for _ in 0..depth {
        let next = current
            .borrow()
            .parent()
            .cloned()
            .expect("environment depth exceeds chain length");
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gc::NullHeap;

    #[test]
    fn declare_then_read_round_trips() {
        let env = Environment::new_declarative(None, 2);
        let mut heap = NullHeap;
        env.borrow_mut().declare(0, Value::int32(7), true, &mut heap);
        assert_eq!(env.borrow().get_local(0).as_int32(), 7);
    }

    #[test]
    fn const_binding_rejects_write() {
        let env = Environment::new_declarative(None, 1);
        let mut heap = NullHeap;
        env.borrow_mut().declare(0, Value::int32(1), false, &mut heap);
        assert!(!env.borrow_mut().set_local(0, Value::int32(2), &mut heap));
        assert_eq!(env.borrow().get_local(0).as_int32(), 1);
    }

    #[test]
    fn resolve_depth_walks_parent_chain() {
        let grandparent = Environment::new_declarative(None, 1);
        let parent = Environment::new_declarative(Some(grandparent.clone()), 1);
        let child = Environment::new_declarative(Some(parent.clone()), 1);
        assert!(Rc::ptr_eq(&resolve_depth(&child, 1), &parent));
        assert!(Rc::ptr_eq(&resolve_depth(&child, 2), &grandparent));
    }
}
