/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */
//! The function template: the immutable, shareable artifact a compiler
//! produces and every activation of a given function shares. Holds the
//! register-indexed bytecode, the literal pool, the catch table and
//! enough bookkeeping for the interpreter to size a fresh register
//! window without walking the code first.

use crate::gc::Handle;
use crate::vm::symbol_table::Symbol;
use std::sync::atomic::{AtomicU32, Ordering};

pub type Reg = u16;

/// One bytecode instruction. Operands are register indices or small
/// immediates; anything that needs a heap handle (a literal string, a
/// nested function template) is an index into [CodeBlock::constants].
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u8)]
pub enum Op {
    /// No-op, also used to pad branch targets during assembly.
    Nop,
    LoadConst { dst: Reg, constant: u32 },
    LoadInt { dst: Reg, value: i32 },
    LoadTrue { dst: Reg },
    LoadFalse { dst: Reg },
    LoadNull { dst: Reg },
    LoadUndefined { dst: Reg },
    Move { dst: Reg, src: Reg },

    Add { dst: Reg, lhs: Reg, rhs: Reg },
    Sub { dst: Reg, lhs: Reg, rhs: Reg },
    Mul { dst: Reg, lhs: Reg, rhs: Reg },
    Div { dst: Reg, lhs: Reg, rhs: Reg },
    Rem { dst: Reg, lhs: Reg, rhs: Reg },
    Shl { dst: Reg, lhs: Reg, rhs: Reg },
    Shr { dst: Reg, lhs: Reg, rhs: Reg },
    UShr { dst: Reg, lhs: Reg, rhs: Reg },
    BitAnd { dst: Reg, lhs: Reg, rhs: Reg },
    BitOr { dst: Reg, lhs: Reg, rhs: Reg },
    BitXor { dst: Reg, lhs: Reg, rhs: Reg },
    In { dst: Reg, lhs: Reg, rhs: Reg },
    InstanceOf { dst: Reg, lhs: Reg, rhs: Reg },

    Eq { dst: Reg, lhs: Reg, rhs: Reg },
    StrictEq { dst: Reg, lhs: Reg, rhs: Reg },
    Neq { dst: Reg, lhs: Reg, rhs: Reg },
    StrictNeq { dst: Reg, lhs: Reg, rhs: Reg },
    Less { dst: Reg, lhs: Reg, rhs: Reg },
    LessEq { dst: Reg, lhs: Reg, rhs: Reg },
    Greater { dst: Reg, lhs: Reg, rhs: Reg },
    GreaterEq { dst: Reg, lhs: Reg, rhs: Reg },

    TypeOf { dst: Reg, src: Reg },
    Not { dst: Reg, src: Reg },
    Neg { dst: Reg, src: Reg },
    Pos { dst: Reg, src: Reg },
    BitNot { dst: Reg, src: Reg },
    Inc { dst: Reg, src: Reg },
    Dec { dst: Reg, src: Reg },

    /// `name` indexes a [Constant::PropertyKey], not a string literal.
    GetById { dst: Reg, base: Reg, name: u32, feedback: u32 },
    PutById { base: Reg, name: u32, value: Reg, feedback: u32 },
    DeleteById { dst: Reg, base: Reg, name: u32 },
    GetByVal { dst: Reg, base: Reg, key: Reg },
    PutByVal { base: Reg, key: Reg, value: Reg },
    DeleteByVal { dst: Reg, base: Reg, key: Reg },

    GetGlobal { dst: Reg, name: u32 },
    SetGlobal { name: u32, value: Reg },
    GetVar { dst: Reg, slot: u16, depth: u16 },
    SetVar { slot: u16, depth: u16, value: Reg },
    DeclareLet { slot: u16, value: Reg },
    DeclareConst { slot: u16, value: Reg },
    PushScope { size: u16 },
    PopScope,

    NewObject { dst: Reg },
    NewArray { dst: Reg, first: Reg, count: u16 },
    NewFunction { dst: Reg, template: u32 },
    Spread { dst: Reg, src: Reg },

    Jump { target: u32 },
    JumpIfTrue { cond: Reg, target: u32 },
    JumpIfFalse { cond: Reg, target: u32 },
    JumpIfNullish { cond: Reg, target: u32 },
    /// Unconditional non-local jump to `target` inside the *same*
    /// activation, walking any `finally` scopes between here and there.
    /// The compiler emits this (instead of a plain `Jump`) only when a
    /// `break`/`continue` label is not reachable by a direct jump because
    /// a `try/finally` sits between the two.
    Break { target: u32 },
    Continue { target: u32 },

    Call { dst: Reg, callee: Reg, this: Reg, first_arg: Reg, argc: u16 },
    Construct { dst: Reg, callee: Reg, first_arg: Reg, argc: u16 },
    Return { value: Reg },
    ReturnUndefined,

    PushCatch { handler: u32, binding: u16 },
    PopCatch,
    Throw { value: Reg },
    /// Marks the end of a compiled `finally` block: resumes whichever
    /// transfer (return/throw/break/continue) was in flight when the
    /// finally handler was entered, unless the finally body itself
    /// produced a new completion by falling through or returning.
    EndFinally,

    /// Suspends the active thread, handing `value` to whoever resumes it.
    /// Only legal inside a generator/coroutine template.
    Yield { dst: Reg, value: Reg },

    End,
}

/// Disassembles a single instruction the way the code block's own
/// `display` does, for trace logging and tests.
impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One entry in a function template's catch table: byte-code instruction
/// range `[start, end)` guarded by `handler`, with the environment depth
/// that must be restored (and the binding register, if the catch clause
/// names its exception) active when the handler fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatchKind {
    /// Intercepts only `Throw`; the bound exception lands in the slot
    /// named by `CatchEntry::binding` before control resumes at `handler`.
    Catch { binding: Reg },
    /// Intercepts every completion kind -- return, throw, break, continue
    /// -- and must re-propagate it via `Op::EndFinally` once the finally
    /// body finishes, unless the body itself completes abruptly first.
    Finally,
}

#[derive(Clone, Copy, Debug)]
pub struct CatchEntry {
    pub start: u32,
    pub end: u32,
    pub handler: u32,
    pub scope_depth: u16,
    pub kind: CatchKind,
}

#[derive(Clone)]
pub enum Constant {
    String(Handle),
    Template(std::sync::Arc<CodeBlock>),
    /// A property name resolved to a [Symbol] ahead of time by the
    /// compiler, so `GetById`/`PutById`/`DeleteById` never re-intern a
    /// string at run time.
    PropertyKey(Symbol),
}

/// Immutable, shareable compiled form of a single function body.
pub struct CodeBlock {
    pub name: Handle,
    pub code: Vec<Op>,
    pub constants: Vec<Constant>,
    pub catch_table: Vec<CatchEntry>,
    /// Number of registers the register window must reserve, including
    /// parameter slots at the bottom.
    pub num_registers: u16,
    pub param_count: u16,
    pub rest_param: bool,
    pub strict: bool,
    pub is_generator: bool,
    pub source_name: String,
    line_table: Vec<(u32, u32)>,
    interrupt_budget: AtomicU32,
    interrupt_interval: u32,
}

impl CodeBlock {
    pub fn new(
        name: Handle,
        code: Vec<Op>,
        constants: Vec<Constant>,
        catch_table: Vec<CatchEntry>,
        num_registers: u16,
        param_count: u16,
        rest_param: bool,
        strict: bool,
        is_generator: bool,
        source_name: String,
    ) -> Self {
        Self {
            name,
            code,
            constants,
            catch_table,
            num_registers,
            param_count,
            rest_param,
            strict,
            is_generator,
            source_name,
            line_table: Vec::new(),
            interrupt_budget: AtomicU32::new(0),
            interrupt_interval: 65536,
        }
    }

    pub fn set_interrupt_interval(&mut self, interval: u32) {
        self.interrupt_interval = interval.max(1);
    }

    pub fn set_line_table(&mut self, table: Vec<(u32, u32)>) {
        self.line_table = table;
    }

    pub fn line_for(&self, pc: u32) -> u32 {
        match self.line_table.binary_search_by_key(&pc, |(p, _)| *p) {
            Ok(i) => self.line_table[i].1,
            Err(0) => 0,
            Err(i) => self.line_table[i - 1].1,
        }
    }

    /// Finds the innermost catch entry covering `pc`, walking the table
    /// back-to-front the way nested try ranges are laid out (innermost
    /// entries appended last).
    pub fn catch_for(&self, pc: u32) -> Option<&CatchEntry> {
        self.catch_table
            .iter()
            .rev()
            .find(|e| pc >= e.start && pc < e.end)
    }

    pub fn constant(&self, index: u32) -> &Constant {
        &self.constants[index as usize]
    }

    pub fn load_literal(&self, index: u32) -> Handle {
        match self.constant(index) {
            Constant::String(h) => *h,
            _ => panic!("constant {} is not a string literal", index),
        }
    }

    pub fn nested_template(&self, index: u32) -> std::sync::Arc<CodeBlock> {
        match self.constant(index) {
            Constant::Template(t) => t.clone(),
            _ => panic!("constant {} is not a function template", index),
        }
    }

    pub fn property_key(&self, index: u32) -> Symbol {
        match self.constant(index) {
            Constant::PropertyKey(s) => *s,
            _ => panic!("constant {} is not a property key", index),
        }
    }

    pub fn take_interrupt_tick(&self) -> bool {
        self.interrupt_budget.fetch_add(1, Ordering::Relaxed) % self.interrupt_interval == 0
    }

    pub fn display(&self) -> String {
        let mut out = String::new();
        for (pc, op) in self.code.iter().enumerate() {
            out.push_str(&format!("{:>4}: {}\n", pc, op));
        }
        out
    }
}

/// Wraps the bytecode-building side used by a compiler (absent from this
/// crate): exposed so tests can hand-assemble small programs without
/// poking at `CodeBlock`'s fields directly.
pub struct CodeBlockBuilder {
    name: Handle,
    code: Vec<Op>,
    constants: Vec<Constant>,
    catch_table: Vec<CatchEntry>,
    num_registers: u16,
    param_count: u16,
    strict: bool,
    is_generator: bool,
    source_name: String,
    interrupt_interval: u32,
}

impl CodeBlockBuilder {
    pub fn new(name: Handle, source_name: impl Into<String>) -> Self {
        Self {
            name,
            code: Vec::new(),
            constants: Vec::new(),
            catch_table: Vec::new(),
            num_registers: 0,
            param_count: 0,
            strict: false,
            is_generator: false,
            source_name: source_name.into(),
            interrupt_interval: 65536,
        }
    }

    pub fn set_interrupt_interval(&mut self, interval: u32) {
        self.interrupt_interval = interval.max(1);
    }

    pub fn emit(&mut self, op: Op) -> u32 {
        self.code.push(op);
        (self.code.len() - 1) as u32
    }

    pub fn patch_jump_target(&mut self, at: u32, target: u32) {
        let op = match &self.code[at as usize] {
            Op::Jump { .. } => Op::Jump { target },
            Op::JumpIfTrue { cond, .. } => Op::JumpIfTrue { cond: *cond, target },
            Op::JumpIfFalse { cond, .. } => Op::JumpIfFalse { cond: *cond, target },
            Op::JumpIfNullish { cond, .. } => Op::JumpIfNullish { cond: *cond, target },
            other => panic!("not a jump: {:?}", other),
        };
        self.code[at as usize] = op;
    }

    pub fn push_string_constant(&mut self, handle: Handle) -> u32 {
        self.constants.push(Constant::String(handle));
        (self.constants.len() - 1) as u32
    }

    pub fn push_property_key(&mut self, symbol: Symbol) -> u32 {
        self.constants.push(Constant::PropertyKey(symbol));
        (self.constants.len() - 1) as u32
    }

    pub fn push_template_constant(&mut self, template: std::sync::Arc<CodeBlock>) -> u32 {
        self.constants.push(Constant::Template(template));
        (self.constants.len() - 1) as u32
    }

    pub fn push_catch(&mut self, entry: CatchEntry) {
        self.catch_table.push(entry);
    }

    pub fn reserve_registers(&mut self, count: u16) {
        self.num_registers = self.num_registers.max(count);
    }

    pub fn set_params(&mut self, count: u16) {
        self.param_count = count;
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn set_generator(&mut self, is_generator: bool) {
        self.is_generator = is_generator;
    }

    pub fn current_pc(&self) -> u32 {
        self.code.len() as u32
    }

    pub fn build(self) -> CodeBlock {
        let mut block = CodeBlock::new(
            self.name,
            self.code,
            self.constants,
            self.catch_table,
            self.num_registers,
            self.param_count,
            false,
            self.strict,
            self.is_generator,
            self.source_name,
        );
        block.set_interrupt_interval(self.interrupt_interval);
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_handle() -> Handle {
        Handle::from_raw(1)
    }

    #[test]
    fn catch_table_picks_innermost_range() {
        let mut builder = CodeBlockBuilder::new(test_handle(), "<test>");
        builder.push_catch(CatchEntry {
            start: 0,
            end: 10,
            handler: 100,
            scope_depth: 0,
            kind: CatchKind::Finally,
        });
        builder.push_catch(CatchEntry {
            start: 2,
            end: 6,
            handler: 200,
            scope_depth: 1,
            kind: CatchKind::Catch { binding: 0 },
        });
        for _ in 0..10 {
            builder.emit(Op::Nop);
        }
        let block = builder.build();
        assert_eq!(block.catch_for(3).unwrap().handler, 200);
        assert_eq!(block.catch_for(7).unwrap().handler, 100);
        assert!(block.catch_for(20).is_none());
    }

    #[test]
    fn jump_patching_rewrites_target_only() {
        let mut builder = CodeBlockBuilder::new(test_handle(), "<test>");
        let at = builder.emit(Op::JumpIfFalse { cond: 3, target: 0 });
        builder.patch_jump_target(at, 42);
        let block = builder.build();
        assert_eq!(block.code[0], Op::JumpIfFalse { cond: 3, target: 42 });
    }
}
