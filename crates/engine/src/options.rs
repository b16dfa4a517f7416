/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */
//! Knobs that shape the executor rather than the program it runs:
//! initial stack capacities, the interrupt-hook tick interval, and
//! bytecode tracing. None of this touches the object model, GC, or
//! compiler, which are configured by whatever embeds this crate.

use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
pub struct Options {
    #[structopt(
        long = "dump-bytecode",
        short = "d",
        help = "Print each function template's disassembly before it runs"
    )]
    pub dump_bytecode: bool,

    #[structopt(
        long = "interrupt-ticks",
        default_value = "65536",
        help = "Instructions executed between Host::poll_interrupt calls"
    )]
    pub interrupt_ticks: u32,

    #[structopt(
        long = "initial-value-stack",
        default_value = "256",
        help = "Initial capacity (in registers) reserved per thread's value stack"
    )]
    pub initial_value_stack_capacity: usize,

    #[structopt(
        long = "initial-call-stack",
        default_value = "32",
        help = "Initial capacity (in activations) reserved per thread's call stack"
    )]
    pub initial_call_stack_capacity: usize,

    #[structopt(
        long = "initial-catch-stack",
        default_value = "16",
        help = "Initial capacity (in catch scopes) reserved per thread's catch stack"
    )]
    pub initial_catch_stack_capacity: usize,

    #[structopt(long = "strict", help = "Run top-level code as if under \"use strict\"")]
    pub strict: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dump_bytecode: false,
            interrupt_ticks: 65536,
            initial_value_stack_capacity: 256,
            initial_call_stack_capacity: 32,
            initial_catch_stack_capacity: 16,
            strict: false,
        }
    }
}

impl Options {
    pub fn with_dump_bytecode(mut self, enable: bool) -> Self {
        self.dump_bytecode = enable;
        self
    }

    pub fn with_interrupt_ticks(mut self, ticks: u32) -> Self {
        self.interrupt_ticks = ticks;
        self
    }

    pub fn with_strict(mut self, enable: bool) -> Self {
        self.strict = enable;
        self
    }
}
