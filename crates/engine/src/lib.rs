/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */
#![allow(clippy::new_without_default, clippy::too_many_arguments)]

pub mod gc;
pub mod options;
pub mod vm;

pub use vm::code_block::{CatchEntry, CatchKind, CodeBlock, CodeBlockBuilder, Constant, Op, Reg};
pub use vm::coroutine::{Resumption, Thread, ThreadId, ThreadState};
pub use vm::error::{ErrorFactory, ErrorKind};
pub use vm::interpreter::{Host, Transfer};
pub use vm::object_model::{ObjectModel, ToPrimitiveHint};
pub use vm::runtime::Runtime;
pub use vm::symbol_table::{Symbol, SymbolId, SymbolTable};
pub use vm::value::Value;
