/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */
//! Everything that makes up the executor: the tagged value, the compiled
//! function representation, the three per-thread stacks, the dispatch
//! loop and its non-local transfer handler, the coroutine scheduler, and
//! the `Runtime` that ties a symbol table and a host together.

pub mod code_block;
pub mod coroutine;
pub mod environment;
pub mod error;
pub mod frame;
pub mod interpreter;
pub mod object_model;
pub mod runtime;
pub mod symbol_table;
pub mod value;
