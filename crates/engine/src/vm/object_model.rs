/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */
//! Property access, calling and coercion are supplied by the embedding's
//! object model; the interpreter only ever calls through this table. This
//! mirrors the fixed method-table dispatch the runtime uses for its own
//! object operations, except the table here is an ordinary trait object
//! rather than a `#[repr(C)]` struct of function pointers, since there is
//! exactly one implementation live per [crate::vm::runtime::Runtime] and
//! no need for per-class vtable swapping.

use crate::gc::Handle;
use crate::vm::symbol_table::Symbol;
use crate::vm::value::Value;

/// The set of operations the bytecode dispatch loop needs from the
/// surrounding engine. A real embedding implements this over its actual
/// object graph (shapes/structures, prototype chains, typed arrays,
/// proxies...); the core never assumes anything about how property
/// storage is laid out.
pub trait ObjectModel {
    fn get_by_id(&mut self, target: Value, name: Symbol) -> Result<Value, Value>;
    fn put_by_id(&mut self, target: Value, name: Symbol, value: Value) -> Result<(), Value>;
    fn delete_by_id(&mut self, target: Value, name: Symbol) -> Result<bool, Value>;

    fn get_by_val(&mut self, target: Value, key: Value) -> Result<Value, Value>;
    fn put_by_val(&mut self, target: Value, key: Value, value: Value) -> Result<(), Value>;
    fn delete_by_val(&mut self, target: Value, key: Value) -> Result<bool, Value>;

    fn has_property(&mut self, target: Value, name: Symbol) -> Result<bool, Value>;
    fn instance_of(&mut self, value: Value, ctor: Value) -> Result<bool, Value>;

    /// Resolves a free variable against the global object / global
    /// lexical environment when no activation record binds it.
    fn get_global(&mut self, name: Symbol) -> Result<Value, Value>;
    fn set_global(&mut self, name: Symbol, value: Value) -> Result<(), Value>;

    /// ToPrimitive/ToNumber/ToString/typeof on handle-carrying values; the
    /// core already handles the int32/double/bool/null/undefined cases
    /// itself and only defers to the object model for handles.
    fn to_primitive(&mut self, value: Value, hint: ToPrimitiveHint) -> Result<Value, Value>;
    fn to_number(&mut self, value: Value) -> Result<f64, Value>;
    fn to_string(&mut self, value: Value) -> Result<Handle, Value>;
    fn type_of(&mut self, value: Value) -> &'static str;
    /// Wraps a static string (used for `typeof` results) into a handle.
    fn string_from_static(&mut self, s: &'static str) -> Handle;
    /// Concatenates two already-stringified handles.
    fn concat_strings(&mut self, a: Handle, b: Handle) -> Handle;
    /// Resolves a dynamically-computed string to a property-name symbol;
    /// used only by `obj[expr]`-style accesses (`GetByVal`/`In`), never by
    /// `obj.prop`, whose name the compiler already interned.
    fn intern_string(&mut self, s: Handle) -> crate::vm::symbol_table::Symbol;
    fn is_falsy_handle(&mut self, handle: Handle) -> bool;
    fn strict_equal(&mut self, a: Value, b: Value) -> bool;
    fn abstract_equal(&mut self, a: Value, b: Value) -> Result<bool, Value>;

    /// Invokes a callable value. `callee` must already have been checked
    /// as callable by the caller (the interpreter raises `TypeError`
    /// itself when `is_callable` is false).
    fn call(&mut self, callee: Value, this: Value, args: &[Value]) -> Result<Value, Value>;
    fn construct(&mut self, callee: Value, args: &[Value]) -> Result<Value, Value>;
    fn is_callable(&mut self, value: Value) -> bool;
    fn is_constructor(&mut self, value: Value) -> bool;

    fn new_object(&mut self) -> Value;
    fn new_array(&mut self, elements: &[Value]) -> Value;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ToPrimitiveHint {
    Default,
    Number,
    String,
}
