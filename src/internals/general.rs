// General-purpose builtin words

use crate::error::{ForthError, Interrupt, Result};
use crate::kernel::Cell;
use crate::runtime::ForthRuntime;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

/// Floored division, remainder takes the sign of the divisor
///
pub fn u_divmod(n: &BigInt, d: &BigInt) -> Option<(BigInt, BigInt)> {
    if d.is_zero() {
        return None;
    }
    let mut quot = n / d;
    let mut rem = n % d;
    if (rem.is_negative() && d.is_positive()) || (rem.is_positive() && d.is_negative()) {
        rem += d;
        quot -= 1;
    }
    Some((rem, quot))
}

impl ForthRuntime {
    /// Basic Forth operations on the stack.
    ///
    pub fn f_plus(&mut self) -> Result<()> {
        self.kernel.pop2_push1("+", |a, b| a + b)
    }

    pub fn f_times(&mut self) -> Result<()> {
        self.kernel.pop2_push1("*", |a, b| a * b)
    }

    /// /mod ( n1 n2 -- rem quot )
    pub fn f_divmod(&mut self) -> Result<()> {
        let divisor = self.kernel.pop_int("/mod")?;
        let dividend = self.kernel.pop_int("/mod")?;
        let (rem, quot) = u_divmod(&dividend, &divisor).ok_or(ForthError::DivisionByZero)?;
        self.kernel.push(Cell::Int(rem));
        self.kernel.push(Cell::Int(quot));
        Ok(())
    }

    pub fn f_negate(&mut self) -> Result<()> {
        self.kernel.pop1_push1("negate", |a| -a)
    }

    pub fn f_and(&mut self) -> Result<()> {
        self.kernel.pop2_push1("and", |a, b| a & b)
    }

    pub fn f_or(&mut self) -> Result<()> {
        self.kernel.pop2_push1("or", |a, b| a | b)
    }

    pub fn f_xor(&mut self) -> Result<()> {
        self.kernel.pop2_push1("xor", |a, b| a ^ b)
    }

    pub fn f_invert(&mut self) -> Result<()> {
        self.kernel.pop1_push1("invert", |a| -a - 1)
    }

    pub fn f_bsl(&mut self) -> Result<()> {
        self.kernel.pop1_push1("bsl", |a| a << 1usize)
    }

    pub fn f_bsr(&mut self) -> Result<()> {
        self.kernel.pop1_push1("bsr", |a| a >> 1usize)
    }

    /// = compares any two cells
    pub fn f_equal(&mut self) -> Result<()> {
        let a = self.kernel.pop()?;
        let b = self.kernel.pop()?;
        self.kernel.push(Cell::flag(a == b));
        Ok(())
    }

    pub fn f_less(&mut self) -> Result<()> {
        let k = self.kernel.pop_int("<")?;
        let j = self.kernel.pop_int("<")?;
        self.kernel.push(Cell::flag(j < k));
        Ok(())
    }

    pub fn f_greater(&mut self) -> Result<()> {
        let k = self.kernel.pop_int(">")?;
        let j = self.kernel.pop_int(">")?;
        self.kernel.push(Cell::flag(j > k));
        Ok(())
    }

    pub fn f_0equal(&mut self) -> Result<()> {
        let j = self.kernel.pop_int("0=")?;
        self.kernel.push(Cell::flag(j.is_zero()));
        Ok(())
    }

    pub fn f_dup(&mut self) -> Result<()> {
        let top = self.kernel.top()?.clone();
        self.kernel.push(top);
        Ok(())
    }

    pub fn f_drop(&mut self) -> Result<()> {
        self.kernel.pop()?;
        Ok(())
    }

    pub fn f_swap(&mut self) -> Result<()> {
        let a = self.kernel.pop()?;
        let b = self.kernel.pop()?;
        self.kernel.push(a);
        self.kernel.push(b);
        Ok(())
    }

    pub fn f_rot(&mut self) -> Result<()> {
        let first = self.kernel.pop()?;
        let second = self.kernel.pop()?;
        let third = self.kernel.pop()?;
        self.kernel.push(second);
        self.kernel.push(first);
        self.kernel.push(third);
        Ok(())
    }

    /// @ (get) ( a -- v ) loads the value of a variable onto the stack
    pub fn f_get(&mut self) -> Result<()> {
        let addr = self.kernel.pop_int("@")?;
        let val = self.kernel.get(&addr)?;
        self.kernel.push(val);
        Ok(())
    }

    /// ! (store) ( v a -- ) stores v in the variable at a
    ///
    pub fn f_store(&mut self) -> Result<()> {
        let addr = self.kernel.pop_int("!")?;
        let value = self.kernel.pop()?;
        self.kernel.set(&addr, value)
    }

    /// >r ( n -- ) Pops the stack, placing the value on the return stack
    ///
    pub fn f_to_r(&mut self) -> Result<()> {
        let val = self.kernel.pop()?;
        self.kernel.ret.push(val);
        Ok(())
    }

    /// r> ( -- n ) Pops the return stack, pushing the value to the calculation stack
    ///
    pub fn f_r_from(&mut self) -> Result<()> {
        let val = self.kernel.ret.pop()?;
        self.kernel.push(val);
        Ok(())
    }

    /// r@ ( -- n ) Copies the top of the return stack to the calculation stack
    ///
    pub fn f_r_get(&mut self) -> Result<()> {
        let val = self.kernel.ret.peek()?.clone();
        self.kernel.push(val);
        Ok(())
    }

    pub fn f_clear_stack(&mut self) -> Result<()> {
        self.f_clear();
        Ok(())
    }

    pub fn f_abort(&mut self) -> Result<()> {
        Err(ForthError::Aborted.into())
    }

    /// bye ( -- ) ends the session. Not an error.
    pub fn f_bye(&mut self) -> Result<()> {
        Err(Interrupt::Bye)
    }
}
