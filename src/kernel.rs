//////////////////////////////////////////////////////////////
/// Forth Interpreter Kernel
///
/// This module contains the core data structures the interpreter works on: the Cell value type,
/// the Stack contract shared by the data, staging, and return stacks, and the variable memory.
///
/// The intention is that this module handles lower level functions directly related to the data structures,
/// and knows nothing about words, tokens, or compile mode.
///
use crate::error::{ForthError, Result};
use crate::internals::dictionary::WordId;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::fmt;

// GENERAL constants
pub const TRUE: i64 = -1; // forth convention for true and false
pub const FALSE: i64 = 0;

/// The runtime value type. Cells are immutable once pushed.
///
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(BigInt),
    Text(String),
    Word(WordId),
}

impl Cell {
    pub fn int<T: Into<BigInt>>(n: T) -> Cell {
        Cell::Int(n.into())
    }

    pub fn flag(b: bool) -> Cell {
        Cell::int(if b { TRUE } else { FALSE })
    }
}

/// Word references need the dictionary to print a name, so they display as an id here.
///
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
            Cell::Word(id) => write!(f, "<word {}>", id.index()),
        }
    }
}

/// LIFO container of Cells. Top is the highest index.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    cells: Vec<Cell>,
}

impl Stack {
    pub fn new() -> Stack {
        Stack { cells: Vec::new() }
    }

    #[inline(always)]
    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    #[inline(always)]
    pub fn pop(&mut self) -> std::result::Result<Cell, ForthError> {
        self.cells.pop().ok_or(ForthError::StackUnderflow)
    }

    #[inline(always)]
    pub fn peek(&self) -> std::result::Result<&Cell, ForthError> {
        self.cells.last().ok_or(ForthError::StackUnderflow)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// Ordered copy of the contents, bottom first. Used to snapshot the staging stack.
    pub fn to_vec(&self) -> Vec<Cell> {
        self.cells.clone()
    }
}

/// The primary data structure for the Forth engine
///
///     Three stacks and a flat, growable variable memory addressed by index.
///     The data stack and staging stack live for the whole session; the return stack is
///     cleared at the start of every quit cycle.
///
#[derive(Debug, Default)]
pub struct Kernel {
    pub stack: Stack,         // the calculation stack
    pub staging: Stack,       // body of the definition under construction
    pub ret: Stack,           // return stack, for >r r> r@
    memory: Vec<Option<Cell>>, // variable slots
}

impl Kernel {
    pub fn new() -> Kernel {
        Kernel::default()
    }

    /// Safe stack accessors
    #[inline(always)]
    pub fn push(&mut self, cell: Cell) {
        self.stack.push(cell);
    }

    #[inline(always)]
    pub fn pop(&mut self) -> Result<Cell> {
        Ok(self.stack.pop()?)
    }

    #[inline(always)]
    pub fn top(&self) -> Result<&Cell> {
        Ok(self.stack.peek()?)
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// pop_int pops the top cell, failing if it's not an integer
    ///
    pub fn pop_int(&mut self, word: &str) -> Result<BigInt> {
        match self.pop()? {
            Cell::Int(n) => Ok(n),
            _ => Err(ForthError::TypeMismatch { word: word.to_string(), expected: "integer" }.into()),
        }
    }

    pub fn pop_text(&mut self, word: &str) -> Result<String> {
        match self.pop()? {
            Cell::Text(s) => Ok(s),
            _ => Err(ForthError::TypeMismatch { word: word.to_string(), expected: "text" }.into()),
        }
    }

    pub fn pop_word(&mut self, word: &str) -> Result<WordId> {
        match self.pop()? {
            Cell::Word(id) => Ok(id),
            _ => Err(ForthError::TypeMismatch { word: word.to_string(), expected: "word" }.into()),
        }
    }

    /// Pops j then k, pushes f(k, j). Nothing is pushed if either pop fails.
    pub fn pop2_push1<F>(&mut self, word: &str, f: F) -> Result<()>
    where
        F: Fn(BigInt, BigInt) -> BigInt,
    {
        let j = self.pop_int(word)?;
        let k = self.pop_int(word)?;
        self.push(Cell::Int(f(k, j)));
        Ok(())
    }

    pub fn pop1_push1<F>(&mut self, word: &str, f: F) -> Result<()>
    where
        F: Fn(BigInt) -> BigInt,
    {
        let x = self.pop_int(word)?;
        self.push(Cell::Int(f(x)));
        Ok(())
    }

    /// allot adds one uninitialised variable slot, returning its address
    ///
    pub fn allot(&mut self) -> usize {
        self.memory.push(None);
        self.memory.len() - 1
    }

    fn address(&self, addr: &BigInt) -> Result<usize> {
        match addr.to_usize() {
            Some(a) if a < self.memory.len() => Ok(a),
            _ => Err(ForthError::AddressOutOfRange(addr.clone()).into()),
        }
    }

    /// get returns the value of a variable slot
    ///
    pub fn get(&self, addr: &BigInt) -> Result<Cell> {
        let a = self.address(addr)?;
        match &self.memory[a] {
            Some(cell) => Ok(cell.clone()),
            None => Err(ForthError::UninitializedVariable(a).into()),
        }
    }

    /// set stores a new value to an existing slot. Memory never grows here.
    ///
    pub fn set(&mut self, addr: &BigInt, val: Cell) -> Result<()> {
        let a = self.address(addr)?;
        self.memory[a] = Some(val);
        Ok(())
    }
}

//////////////////////////////////////////////
/// TESTS
///
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Interrupt;
    use proptest::prelude::*;

    #[test]
    fn test_pop_empty_underflows() {
        let mut s = Stack::new();
        assert_eq!(s.pop(), Err(ForthError::StackUnderflow));
        assert_eq!(s.peek(), Err(ForthError::StackUnderflow));
    }

    #[test]
    fn test_peek_is_not_destructive() {
        let mut s = Stack::new();
        s.push(Cell::int(7));
        assert_eq!(s.peek(), Ok(&Cell::int(7)));
        assert_eq!(s.len(), 1);
        s.clear();
        assert!(s.is_empty());
    }

    #[test]
    fn test_pop2_push1_order() {
        let mut k = Kernel::new();
        k.push(Cell::int(10));
        k.push(Cell::int(3));
        k.pop2_push1("-", |a, b| a - b).unwrap();
        assert_eq!(k.pop().unwrap(), Cell::int(7));
    }

    #[test]
    fn test_pop_int_rejects_text() {
        let mut k = Kernel::new();
        k.push(Cell::Text("hi".to_string()));
        let err = k.pop_int("+").unwrap_err();
        assert_eq!(
            err,
            Interrupt::Error(ForthError::TypeMismatch { word: "+".to_string(), expected: "integer" })
        );
    }

    #[test]
    fn test_memory_bounds() {
        let mut k = Kernel::new();
        let addr = k.allot();
        assert_eq!(addr, 0);
        let a = BigInt::from(addr);
        assert_eq!(
            k.get(&a).unwrap_err(),
            Interrupt::Error(ForthError::UninitializedVariable(0))
        );
        k.set(&a, Cell::int(42)).unwrap();
        assert_eq!(k.get(&a).unwrap(), Cell::int(42));
        let out = BigInt::from(1);
        assert_eq!(
            k.set(&out, Cell::int(1)).unwrap_err(),
            Interrupt::Error(ForthError::AddressOutOfRange(out.clone()))
        );
        assert_eq!(k.allot(), 1);
        let negative = BigInt::from(-1);
        assert!(k.get(&negative).is_err());
    }

    proptest! {
        #[test]
        fn prop_lifo(values in proptest::collection::vec(any::<i64>(), 0..64)) {
            let mut s = Stack::new();
            for v in &values {
                s.push(Cell::int(*v));
            }
            for v in values.iter().rev() {
                prop_assert_eq!(s.pop().unwrap(), Cell::int(*v));
            }
            prop_assert_eq!(s.pop(), Err(ForthError::StackUnderflow));
        }
    }
}
