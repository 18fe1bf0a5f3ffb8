/// Inner Interpreter
///
/// Runs a word: a builtin is called directly, a colon definition is walked entry by entry.
///
///    A body entry that is a word reference is executed through this same function; anything else is
///    pushed. The body is the program: there is no separate bytecode.
///    Recursion depth is bounded only by the native call stack.
///
use crate::error::Result;
use crate::internals::dictionary::{WordId, WordKind};
use crate::kernel::Cell;
use crate::runtime::ForthRuntime;
use tracing::trace;

impl ForthRuntime {
    /// execute runs a word against this runtime
    ///
    pub fn execute(&mut self, id: WordId) -> Result<()> {
        let word = self.dict.get(id);
        trace!(name = %word.name, "execute");
        match &word.kind {
            WordKind::Native(code) => {
                let code = *code;
                code(self)
            }
            WordKind::Composite(body) => {
                let body = body.clone();
                for entry in body.iter() {
                    match entry {
                        Cell::Word(callee) => self.execute(*callee)?,
                        literal => self.kernel.push(literal.clone()),
                    }
                }
                Ok(())
            }
        }
    }

    /// EXECUTE ( w -- ) interpret a word whose reference is on the stack
    ///
    pub fn f_execute(&mut self) -> Result<()> {
        let id = self.kernel.pop_word("execute")?;
        self.execute(id)
    }
}
