/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */
//! Property-name interning. Bytecode never carries raw strings for
//! identifiers; the compiler resolves them to [Symbol]s ahead of time and
//! the dispatch loop only ever compares small integers.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};

pub struct SymbolTable {
    symbols: DashMap<&'static str, u32>,
    ids: DashMap<u32, &'static str>,
    next: AtomicU32,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SymbolTable {
    fn drop(&mut self) {
        for entry in self.ids.iter() {
            let key = *entry.value();
            unsafe {
                let _ = Box::from_raw(key as *const str as *mut str);
            }
        }
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            symbols: DashMap::with_capacity(64),
            ids: DashMap::with_capacity(64),
            next: AtomicU32::new(SymbolId::PUBLIC_START.0),
        }
    }

    pub fn intern(&self, name: impl AsRef<str>) -> SymbolId {
        let name = name.as_ref();
        if let Some(id) = self.symbols.get(name) {
            return SymbolId(*id.value());
        }
        let leaked: &'static str = Box::leak(name.to_string().into_boxed_str());
        let id = *self
            .symbols
            .entry(leaked)
            .or_insert_with(|| self.next.fetch_add(1, Ordering::Relaxed))
            .value();
        self.ids.insert(id, leaked);
        SymbolId(id)
    }

    pub fn description(&self, id: SymbolId) -> &'static str {
        *self.ids.get(&id.0).expect("unregistered symbol id")
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SymbolId(u32);

impl SymbolId {
    pub const PUBLIC_START: SymbolId = Self(128);
}

/// A property key: either an interned name, a private name (class private
/// fields), or a dense array index kept out of the interner entirely so
/// indexed access never touches the table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Symbol {
    Name(SymbolId),
    Private(SymbolId),
    Index(u32),
}

impl Symbol {
    pub fn is_index(self) -> bool {
        matches!(self, Self::Index(_))
    }

    pub fn as_index(self) -> Option<u32> {
        match self {
            Self::Index(i) => Some(i),
            _ => None,
        }
    }

    pub fn to_private(self) -> Self {
        match self {
            Self::Name(id) => Self::Private(id),
            other => other,
        }
    }
}

pub const DUMMY_SYMBOL: Symbol = Symbol::Name(SymbolId(0));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let table = SymbolTable::new();
        let a = table.intern("length");
        let b = table.intern("length");
        assert_eq!(a, b);
        assert_eq!(table.description(a), "length");
    }

    #[test]
    fn distinct_names_get_distinct_ids() {
        let table = SymbolTable::new();
        let a = table.intern("foo");
        let b = table.intern("bar");
        assert_ne!(a, b);
    }
}
