//////////////////////////////////////////////////////////////////
/// runtime.rs
///
/// Forth Runtime Engine
///
/// This module defines the ForthRuntime struct, which contains the whole state of one Forth session:
/// the kernel (stacks and variable memory), the dictionary, the input buffer and cursor, and compile state.
/// It also provides methods for initializing the runtime (cold_start) and the per-line entry point.
///
/// Sessions share nothing. Two runtimes never see each other's words.
///

use crate::error::{Interrupt, Result};
use crate::internals::dictionary::{Dictionary, NativeFn, Timing, WordId};
use crate::kernel::Kernel;
use std::io::{self, Write};
use tracing::debug;

pub const CORE_LIBRARY: &str = include_str!("forth/corelib.fs");

pub struct ForthRuntime {
    pub kernel: Kernel,               // stacks and variable memory
    pub dict: Dictionary,             // every word ever defined, head is the newest visible one
    pub input: Vec<char>,             // the current line
    pub cursor: usize,                // next unread position in input
    pub compiling: Option<String>,    // name of the word under construction, if compiling
    pub docstring: Option<String>,    // pending docstring for the word under construction
    pub number_word: WordId,          // the deferred-number word used by the resolver
    pub out: Box<dyn Write>,          // text sink for . emit words .s see
}

impl ForthRuntime {
    pub fn new() -> ForthRuntime {
        ForthRuntime::with_output(Box::new(io::stdout()))
    }

    /// A runtime writing its output somewhere other than stdout
    ///
    pub fn with_output(out: Box<dyn Write>) -> ForthRuntime {
        let mut dict = Dictionary::new();
        let number_word = ForthRuntime::cold_start(&mut dict);
        ForthRuntime {
            kernel: Kernel::new(),
            dict,
            input: Vec::new(),
            cursor: 0,
            compiling: None,
            docstring: None,
            number_word,
            out,
        }
    }

    /// cold_start installs the builtin functions, returning the number word the resolver falls back on.
    ///     The core library is separate, see load_core.
    fn cold_start(dict: &mut Dictionary) -> WordId {
        let number_word = ForthRuntime::compile_builtins(dict);
        debug!(words = dict.iter().count(), "builtins installed");
        number_word
    }

    /// load_core runs the bundled standard library through the outer interpreter, a line at a time
    ///
    pub fn load_core(&mut self) -> Result<()> {
        self.load_source(CORE_LIBRARY)
    }

    /// Process each line of some source text, stopping at the first error
    pub fn load_source(&mut self, source: &str) -> Result<()> {
        for line in source.lines() {
            self.process_line(line)?;
        }
        Ok(())
    }

    /// get_compile_mode determines whether or not compile mode is active
    ///
    pub fn get_compile_mode(&self) -> bool {
        self.compiling.is_some()
    }

    /// process_line is the per-line boundary.
    ///     Any ForthError clears the data stack and drops a half-built definition before it is
    ///     passed on. Bye goes straight through.
    ///
    pub fn process_line(&mut self, line: &str) -> Result<()> {
        self.input = line.chars().collect();
        self.cursor = 0;
        match self.f_quit() {
            Err(Interrupt::Error(e)) => {
                debug!(error = %e, "line aborted");
                self.f_clear();
                self.compiling = None;
                self.docstring = None;
                self.kernel.staging.clear();
                Err(Interrupt::Error(e))
            }
            other => other,
        }
    }

    /// f_clear resets the calculation stack to empty
    ///
    pub fn f_clear(&mut self) {
        self.kernel.stack.clear();
    }

    /// Write text to the output sink
    pub fn write_out(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    /// flush ( -- ) Push any buffered output to the sink.
    pub fn f_flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    fn add_builtin(dict: &mut Dictionary, name: &str, code: NativeFn, doc: &str) -> WordId {
        dict.define_native(name, doc, Timing::Normal, code)
    }

    fn add_immediate(dict: &mut Dictionary, name: &str, code: NativeFn, doc: &str) -> WordId {
        dict.define_native(name, doc, Timing::Immediate, code)
    }

    fn add_compile_only(dict: &mut Dictionary, name: &str, code: NativeFn, doc: &str) -> WordId {
        dict.define_native(name, doc, Timing::CompileOnly, code)
    }

    /// Set up all the words that are implemented in Rust
    ///     Each one gets a standard dictionary entry. Order matters only for `words` listings
    ///     and for how far back forget can reach.
    fn compile_builtins(dict: &mut Dictionary) -> WordId {
        Self::add_builtin(dict, "word", ForthRuntime::f_word, "( -- tok ) Get next token to stack.");
        Self::add_builtin(dict, "drop", ForthRuntime::f_drop, "( n -- ) Drop top item.");
        Self::add_builtin(dict, "rot", ForthRuntime::f_rot, "( n1 n2 n3 -- n2 n3 n1 ) Left-rotate top 3 items.");
        Self::add_builtin(dict, "dup", ForthRuntime::f_dup, "( n -- n n ) Duplicate top item.");
        Self::add_builtin(dict, ".", ForthRuntime::f_dot, "( n -- ) Pop and output top item.");
        Self::add_builtin(dict, "tell", ForthRuntime::f_dot, "( n -- ) Pop and output top item.");
        let number_word = Self::add_builtin(
            dict,
            "number",
            ForthRuntime::f_number,
            "( w -- n ) Parse word as number.",
        );
        Self::add_builtin(dict, "+", ForthRuntime::f_plus, "( n1 n2 -- sum ) Add n1 + n2.");
        Self::add_builtin(dict, "*", ForthRuntime::f_times, "( n1 n2 -- prod ) Multiply n1 * n2.");
        Self::add_builtin(
            dict,
            "/mod",
            ForthRuntime::f_divmod,
            "( n1 n2 -- rem quot ) Int divide into remainder and quotient.",
        );
        Self::add_builtin(dict, "negate", ForthRuntime::f_negate, "( n1 -- -n1 ) Negate top number.");
        Self::add_builtin(dict, "and", ForthRuntime::f_and, "( n1 n2 -- n3 ) n1 AND n2 -> n3.");
        Self::add_builtin(dict, "or", ForthRuntime::f_or, "( n1 n2 -- n3 ) n1 OR n2 -> n3.");
        Self::add_builtin(dict, "invert", ForthRuntime::f_invert, "( n1 -- n2 ) Invert n1 (~n1) to n2.");
        Self::add_builtin(dict, "xor", ForthRuntime::f_xor, "( n1 n2 -- n3 ) n1 XOR n2 -> n3.");
        Self::add_builtin(dict, "bsl", ForthRuntime::f_bsl, "( n1 -- n2 ) Bitshift n1 << 1 -> n2.");
        Self::add_builtin(dict, "bsr", ForthRuntime::f_bsr, "( n1 -- n2 ) Bitshift n1 >> 1 -> n2.");
        Self::add_builtin(dict, "=", ForthRuntime::f_equal, "( j k -- b ) If j == k push true else false.");
        Self::add_builtin(dict, "<", ForthRuntime::f_less, "( j k -- b ) If j < k push true else false.");
        Self::add_builtin(dict, ">", ForthRuntime::f_greater, "( j k -- b ) If j > k push true else false.");
        Self::add_builtin(dict, "0=", ForthRuntime::f_0equal, "( j -- b ) If j == 0 push true else false.");
        Self::add_builtin(dict, "swap", ForthRuntime::f_swap, "( n1 n2 -- n2 n1 ) Swap top two items.");
        Self::add_builtin(dict, "quit", ForthRuntime::f_quit, "( -- ) Clear the return stack and interpret the rest of the input.");
        Self::add_builtin(dict, "words", ForthRuntime::f_words, "( -- ) Show all defined words.");
        Self::add_builtin(dict, "words+", ForthRuntime::f_words_plus, "( -- ) Show all defined words and help.");
        Self::add_builtin(dict, "bye", ForthRuntime::f_bye, "( -- ) Quit program.");
        Self::add_immediate(dict, "s\"", ForthRuntime::f_s_quote, "( -- s ) String literal up to the next \".");
        Self::add_builtin(dict, ".s", ForthRuntime::f_dot_s, "( -- ) Show dump of stack.");
        Self::add_immediate(dict, "\\", ForthRuntime::f_line_comment, "( -- ) Ignore until end of line.");
        Self::add_immediate(dict, "(", ForthRuntime::f_paren_comment, "( -- ) Ignore as comment until ')'.");
        Self::add_builtin(dict, "clearstack", ForthRuntime::f_clear_stack, "( -- EMPTY ) Clear stack.");
        Self::add_builtin(dict, "depth", ForthRuntime::f_stack_depth, "( -- n ) Put depth of stack on top.");
        Self::add_builtin(dict, "abort", ForthRuntime::f_abort, "( -- EMPTY ) Clear stack and abort.");
        Self::add_builtin(dict, "help@", ForthRuntime::f_help_at, "( w -- str ) Put help for w on top.");
        Self::add_builtin(dict, "constant", ForthRuntime::f_constant, "( n -- ) Def const: `42 constant wtf-life`.");
        Self::add_builtin(dict, "char", ForthRuntime::f_char, "( -- n ) Push next word as literal char.");
        Self::add_builtin(dict, "emit", ForthRuntime::f_emit, "( n -- ) Print character from code.");
        Self::add_builtin(dict, "flush", ForthRuntime::f_flush, "( -- ) Force pending output out.");
        Self::add_builtin(dict, "hide", ForthRuntime::f_hide, "( -- ) Hide next word.");
        Self::add_builtin(dict, "hidden?", ForthRuntime::f_hidden_q, "( -- flag ) Is next word hidden?");
        Self::add_builtin(dict, "unhide", ForthRuntime::f_unhide, "( -- ) Unhide next word.");
        Self::add_builtin(dict, "forget", ForthRuntime::f_forget, "( -- ) Forget word and all subsequent words.");
        Self::add_builtin(dict, "see", ForthRuntime::f_see, "( -- ) Print definition of next word.");
        Self::add_builtin(dict, "find", ForthRuntime::f_find, "( s -- w ) Finds word by string name.");
        Self::add_builtin(dict, "execute", ForthRuntime::f_execute, "( w -- ) Execute word.");
        Self::add_immediate(dict, ":", ForthRuntime::f_colon, "( -- ) Define new word.");
        Self::add_compile_only(dict, ";", ForthRuntime::f_semicolon, "( -- ) End new word definition.");
        Self::add_compile_only(
            dict,
            "[[",
            ForthRuntime::f_docstring,
            "( -- ) Start docstring, like: `: 2drop [[ n1 n2 -- ) ]] drop drop ;`",
        );
        Self::add_builtin(dict, "dsp@", ForthRuntime::f_dsp_at, "( -- n ) Get location of stack pointer.");
        Self::add_builtin(dict, "@", ForthRuntime::f_get, "( addr -- v ) Get value at address (variables only!).");
        Self::add_builtin(dict, "!", ForthRuntime::f_store, "( v addr -- ) Set value at address.");
        Self::add_builtin(dict, "variable", ForthRuntime::f_variable, "( -- ) Create variable from next word.");
        Self::add_builtin(dict, "'", ForthRuntime::f_tick, "( -- w ) Push a reference to the next word.");
        Self::add_builtin(dict, ">r", ForthRuntime::f_to_r, "( n -- ) Move top item to the return stack.");
        Self::add_builtin(dict, "r>", ForthRuntime::f_r_from, "( -- n ) Move top of return stack to the stack.");
        Self::add_builtin(dict, "r@", ForthRuntime::f_r_get, "( -- n ) Copy top of return stack to the stack.");
        number_word
    }
}
