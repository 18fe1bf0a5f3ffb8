// Compiler and Interpreter
//
// The outer interpreter: pull a token, resolve it to a word or a pending number, then run it or
// stage it depending on compile mode. Also the words that parse input directly.

use crate::error::{ForthError, Result};
use crate::internals::dictionary::{Timing, WordId};
use crate::kernel::Cell;
use crate::runtime::ForthRuntime;
use num_bigint::BigInt;
use tracing::{debug, trace};

/// What a token turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Word(WordId),
    /// Not a word; the text is parsed by the number word when it runs
    Number(String),
}

impl ForthRuntime {
    /// quit is the main loop in Forth, interpreting tokens until the input buffer is used up
    ///
    pub fn f_quit(&mut self) -> Result<()> {
        self.kernel.ret.clear();
        while self.cursor < self.input.len() {
            self.interpret()?;
        }
        Ok(())
    }

    /// interpret handles one token. Running off the end of the input is a clean stop.
    ///
    pub fn interpret(&mut self) -> Result<()> {
        let token = match self.next_token() {
            Ok(token) => token,
            Err(_) => return Ok(()),
        };
        trace!(%token, compiling = self.get_compile_mode(), "token");
        match self.resolve(&token) {
            Resolved::Word(id) => {
                if self.get_compile_mode() {
                    self.f_d_compile(id)
                } else {
                    self.f_d_interpret(id)
                }
            }
            Resolved::Number(text) => {
                if self.get_compile_mode() {
                    self.kernel.staging.push(Cell::Text(text));
                    self.kernel.staging.push(Cell::Word(self.number_word));
                    Ok(())
                } else {
                    self.kernel.push(Cell::Text(text));
                    self.execute(self.number_word)
                }
            }
        }
    }

    /// $COMPILE stages a word, unless it has to run now
    ///
    pub fn f_d_compile(&mut self, id: WordId) -> Result<()> {
        match self.dict.get(id).timing {
            Timing::Normal => {
                self.kernel.staging.push(Cell::Word(id));
                Ok(())
            }
            Timing::Immediate | Timing::CompileOnly => self.execute(id),
        }
    }

    /// $INTERPRET executes a word, unless it only makes sense inside a definition
    ///
    pub fn f_d_interpret(&mut self, id: WordId) -> Result<()> {
        let word = self.dict.get(id);
        if word.timing == Timing::CompileOnly {
            return Err(ForthError::CompileOnly(word.name.clone()).into());
        }
        self.execute(id)
    }

    /// resolve looks a token up among the visible words, falling back to a pending number
    ///
    pub fn resolve(&self, token: &str) -> Resolved {
        match self.dict.lookup(token, false) {
            Some(id) => Resolved::Word(id),
            None => Resolved::Number(token.to_string()),
        }
    }

    /// next_token skips whitespace and returns the text up to the next whitespace,
    ///     leaving the cursor past the delimiter.
    ///
    pub fn next_token(&mut self) -> std::result::Result<String, ForthError> {
        let end = self.input.len();
        while self.cursor < end && self.input[self.cursor].is_whitespace() {
            self.cursor += 1;
        }
        if self.cursor >= end {
            return Err(ForthError::ParseError("Couldn't find next token.".to_string()));
        }
        let start = self.cursor;
        while self.cursor < end && !self.input[self.cursor].is_whitespace() {
            self.cursor += 1;
        }
        let token: String = self.input[start..self.cursor].iter().collect();
        if self.cursor < end {
            self.cursor += 1;
        }
        Ok(token)
    }

    /// Look up the next token as a word name, failing if there isn't one
    pub fn find_next(&mut self, include_hidden: bool) -> Result<WordId> {
        let name = self.next_token()?;
        self.dict
            .lookup(&name, include_hidden)
            .ok_or_else(|| ForthError::NameNotFound(name).into())
    }

    /// word ( -- tok ) Get next token to stack.
    ///
    pub fn f_word(&mut self) -> Result<()> {
        let token = self.next_token()?;
        self.kernel.push(Cell::Text(token));
        Ok(())
    }

    /// number ( w -- n ) parses text as a base-10 signed integer.
    ///     This is where an unknown token finally fails.
    ///
    pub fn f_number(&mut self) -> Result<()> {
        match self.kernel.pop()? {
            Cell::Text(text) => match text.parse::<BigInt>() {
                Ok(n) => {
                    self.kernel.push(Cell::Int(n));
                    Ok(())
                }
                Err(_) => Err(ForthError::NameNotFound(text).into()),
            },
            n @ Cell::Int(_) => {
                self.kernel.push(n);
                Ok(())
            }
            Cell::Word(_) => Err(ForthError::TypeMismatch {
                word: "number".to_string(),
                expected: "text",
            }
            .into()),
        }
    }

    /// find ( s -- w ) finds a visible word by name
    ///
    pub fn f_find(&mut self) -> Result<()> {
        let name = self.kernel.pop_text("find")?;
        match self.dict.lookup(&name, false) {
            Some(id) => {
                self.kernel.push(Cell::Word(id));
                Ok(())
            }
            None => Err(ForthError::NameNotFound(name).into()),
        }
    }

    /// ' <name> ( -- w ) pushes a reference to the next word
    ///
    pub fn f_tick(&mut self) -> Result<()> {
        let id = self.find_next(false)?;
        self.kernel.push(Cell::Word(id));
        Ok(())
    }

    /// : <name> ( -- ) starts compiling a new definition
    ///     Runs even while compiling, so a nested colon is caught instead of staged.
    ///
    pub fn f_colon(&mut self) -> Result<()> {
        if let Some(current) = &self.compiling {
            return Err(ForthError::NestedDefinition(current.clone()).into());
        }
        let name = self
            .next_token()
            .map_err(|_| ForthError::ParseError("Missing name after :".to_string()))?;
        self.kernel.staging.clear();
        self.docstring = None;
        self.compiling = Some(name);
        Ok(())
    }

    /// ; ( -- ) finishes the definition: the staged entries, in order, become its body
    ///
    pub fn f_semicolon(&mut self) -> Result<()> {
        let name = self
            .compiling
            .take()
            .ok_or_else(|| ForthError::CompileOnly(";".to_string()))?;
        let body = self.kernel.staging.to_vec();
        self.kernel.staging.clear();
        let doc = self.docstring.take().unwrap_or_default();
        self.dict.define_composite(&name, &doc, body);
        Ok(())
    }

    /// [[ ... ]] captures raw text as the docstring of the word being defined
    ///
    pub fn f_docstring(&mut self) -> Result<()> {
        let name = match &self.compiling {
            Some(name) => name.clone(),
            None => return Err(ForthError::CompileOnly("[[".to_string()).into()),
        };
        if self.docstring.is_some() {
            return Err(ForthError::Invalid(format!("{}: docstring already given", name)).into());
        }
        let start = self.cursor;
        loop {
            let token = self
                .next_token()
                .map_err(|_| ForthError::ParseError("Docstring never closed with ]]".to_string()))?;
            if token == "]]" {
                break;
            }
        }
        let raw: String = self.input[start..self.cursor].iter().collect();
        let doc = raw.trim().trim_end_matches("]]").trim().to_string();
        self.docstring = Some(doc);
        Ok(())
    }

    /// ( ( -- ) ignores tokens up to and including ")"
    ///
    pub fn f_paren_comment(&mut self) -> Result<()> {
        loop {
            let token = self
                .next_token()
                .map_err(|_| ForthError::ParseError("Comment never closed with )".to_string()))?;
            if token == ")" {
                return Ok(());
            }
        }
    }

    /// \ ( -- ) ignores the rest of the line
    ///
    pub fn f_line_comment(&mut self) -> Result<()> {
        self.cursor = self.input.len();
        Ok(())
    }

    /// s" ( -- s ) reads raw text up to the next double quote.
    ///     While compiling the text is staged as a literal instead of pushed.
    ///
    pub fn f_s_quote(&mut self) -> Result<()> {
        let start = self.cursor;
        let end = match self.input[start.min(self.input.len())..].iter().position(|c| *c == '"') {
            Some(offset) => start + offset,
            None => return Err(ForthError::ParseError("String never closed with \"".to_string()).into()),
        };
        let text: String = self.input[start..end].iter().collect();
        self.cursor = end + 1;
        if self.get_compile_mode() {
            self.kernel.staging.push(Cell::Text(text));
        } else {
            self.kernel.push(Cell::Text(text));
        }
        Ok(())
    }

    /// char <c> ( -- n ) pushes the code of a single-character token
    ///
    pub fn f_char(&mut self) -> Result<()> {
        let token = self.next_token()?;
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                self.kernel.push(Cell::int(c as u32));
                Ok(())
            }
            _ => Err(ForthError::Invalid(format!("Not a single character: {}", token)).into()),
        }
    }

    /// constant <name> ( n -- ) defines a word that pushes n
    ///
    pub fn f_constant(&mut self) -> Result<()> {
        let name = self.next_token()?;
        let value = self.kernel.pop()?;
        self.dict.define_composite(&name, "", vec![value]);
        Ok(())
    }

    /// variable <name> ( -- ) allots a slot and defines a word that pushes its address
    ///
    pub fn f_variable(&mut self) -> Result<()> {
        let name = self.next_token()?;
        let addr = self.kernel.allot();
        debug!(%name, addr, "variable");
        self.dict.define_composite(&name, "", vec![Cell::int(addr)]);
        Ok(())
    }

    /// help@ <name> ( -- str ) pushes the docstring of the next word
    ///
    pub fn f_help_at(&mut self) -> Result<()> {
        let id = self.find_next(false)?;
        let doc = self.dict.get(id).doc.clone();
        self.kernel.push(Cell::Text(doc));
        Ok(())
    }

    /// hide <name> ( -- ) hides a word from lookup and listings
    ///
    pub fn f_hide(&mut self) -> Result<()> {
        let id = self.find_next(false)?;
        self.dict.get_mut(id).hidden = true;
        Ok(())
    }

    /// hidden? <name> ( -- flag ) true if the word, found even when hidden, is hidden
    ///
    pub fn f_hidden_q(&mut self) -> Result<()> {
        let id = self.find_next(true)?;
        let hidden = self.dict.get(id).hidden;
        self.kernel.push(Cell::flag(hidden));
        Ok(())
    }

    /// unhide <name> ( -- ) makes a hidden word visible again
    ///
    pub fn f_unhide(&mut self) -> Result<()> {
        let id = self.find_next(true)?;
        self.dict.get_mut(id).hidden = false;
        Ok(())
    }

    /// forget <name> ( -- ) drops the word and everything defined after it from the name space
    ///
    pub fn f_forget(&mut self) -> Result<()> {
        let id = self.find_next(false)?;
        self.dict.forget(id);
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
    use crate::runtime::tests::{error_of, forth, ints, stack};

    #[test]
    fn test_next_token() {
        let (mut f, _) = forth();
        f.input = "  dup   swap\t".chars().collect();
        f.cursor = 0;
        assert_eq!(f.next_token().unwrap(), "dup");
        assert_eq!(f.next_token().unwrap(), "swap");
        assert!(matches!(f.next_token(), Err(ForthError::ParseError(_))));
    }

    #[test]
    fn test_resolve() {
        let (f, _) = forth();
        assert_eq!(f.resolve("dup"), Resolved::Word(f.dict.lookup("dup", false).unwrap()));
        assert_eq!(f.resolve("42"), Resolved::Number("42".to_string()));
        assert_eq!(f.resolve("frob"), Resolved::Number("frob".to_string()));
    }

    #[test]
    fn test_blank_line() {
        let (mut f, _) = forth();
        f.process_line("   ").unwrap();
        f.process_line("").unwrap();
        assert!(stack(&f).is_empty());
    }

    #[test]
    fn test_double() {
        let (mut f, _) = forth();
        f.process_line(": double dup + ;").unwrap();
        f.process_line("5 double").unwrap();
        assert_eq!(stack(&f), ints(&[10]));
        f.process_line("clearstack 21 double").unwrap();
        assert_eq!(stack(&f), ints(&[42]));
    }

    #[test]
    fn test_staged_body_does_not_run() {
        let (mut f, _) = forth();
        f.process_line(": inc 1 + ;").unwrap();
        assert!(stack(&f).is_empty());
        f.process_line("41 inc").unwrap();
        assert_eq!(stack(&f), ints(&[42]));
    }

    #[test]
    fn test_definition_spans_lines() {
        let (mut f, _) = forth();
        f.process_line(": triple").unwrap();
        assert!(f.get_compile_mode());
        f.process_line("dup dup + +").unwrap();
        f.process_line(";").unwrap();
        assert!(!f.get_compile_mode());
        f.process_line("3 triple").unwrap();
        assert_eq!(stack(&f), ints(&[9]));
    }

    #[test]
    fn test_numbers_parse_when_run() {
        let (mut f, _) = forth();
        // compiles fine; the bad literal only fails when the word runs
        f.process_line(": later 1 bogus ;").unwrap();
        let e = error_of(f.process_line("later"));
        assert_eq!(e, ForthError::NameNotFound("bogus".to_string()));
        assert!(stack(&f).is_empty());
    }

    #[test]
    fn test_unknown_token_leaves_stack() {
        let (mut f, _) = forth();
        f.process_line("1 2").unwrap();
        f.input = "nosuch".chars().collect();
        f.cursor = 0;
        let e = error_of(f.interpret());
        assert_eq!(e, ForthError::NameNotFound("nosuch".to_string()));
        assert_eq!(stack(&f), ints(&[1, 2]));
    }

    #[test]
    fn test_big_numbers() {
        let (mut f, _) = forth();
        f.process_line("99999999999999999999 1 +").unwrap();
        let expected: BigInt = "100000000000000000000".parse().unwrap();
        assert_eq!(stack(&f), vec![Cell::Int(expected)]);
        f.process_line("clearstack -5 3").unwrap();
        assert_eq!(stack(&f), ints(&[-5, 3]));
    }

    #[test]
    fn test_shadowing() {
        let (mut f, _) = forth();
        f.process_line(": x 1 ;").unwrap();
        f.process_line(": uses-x x ;").unwrap();
        f.process_line(": x 2 ;").unwrap();
        f.process_line("x uses-x").unwrap();
        // the old x is still what uses-x calls
        assert_eq!(stack(&f), ints(&[2, 1]));
    }

    #[test]
    fn test_forget() {
        let (mut f, _) = forth();
        f.process_line(": a 1 ;").unwrap();
        f.process_line(": b a 1 + ;").unwrap();
        f.process_line(": c 3 ;").unwrap();
        f.process_line(": d 4 ;").unwrap();
        f.process_line("forget c").unwrap();
        assert!(f.dict.lookup("c", false).is_none());
        assert!(f.dict.lookup("d", false).is_none());
        f.process_line("a b").unwrap();
        assert_eq!(stack(&f), ints(&[1, 2]));
        assert_eq!(error_of(f.process_line("d")), ForthError::NameNotFound("d".to_string()));
    }

    #[test]
    fn test_forgotten_word_lives_on_in_bodies() {
        let (mut f, _) = forth();
        f.process_line(": five 5 ;").unwrap();
        f.process_line("' five").unwrap();
        f.process_line("forget five").unwrap();
        f.process_line("execute").unwrap();
        assert_eq!(stack(&f), ints(&[5]));
    }

    #[test]
    fn test_hide_unhide() {
        let (mut f, out) = forth();
        f.process_line(": foo 1 ;").unwrap();
        f.process_line("hide foo").unwrap();
        f.process_line("words").unwrap();
        assert!(!out.text().split_whitespace().any(|w| w == "foo"));
        f.process_line("hidden? foo").unwrap();
        assert_eq!(stack(&f), ints(&[-1]));
        assert_eq!(error_of(f.process_line("foo")), ForthError::NameNotFound("foo".to_string()));
        f.process_line("unhide foo hidden? foo foo").unwrap();
        assert_eq!(stack(&f), ints(&[0, 1]));
    }

    #[test]
    fn test_nested_definition_rejected() {
        let (mut f, _) = forth();
        let e = error_of(f.process_line(": outer : inner ;"));
        assert_eq!(e, ForthError::NestedDefinition("outer".to_string()));
        assert!(!f.get_compile_mode());
        assert!(f.dict.lookup("outer", false).is_none());
    }

    #[test]
    fn test_compile_only_words() {
        let (mut f, _) = forth();
        assert_eq!(error_of(f.process_line(";")), ForthError::CompileOnly(";".to_string()));
        assert_eq!(error_of(f.process_line("[[ hi ]]")), ForthError::CompileOnly("[[".to_string()));
        // through execute the check is in the word itself
        assert_eq!(error_of(f.process_line("' ; execute")), ForthError::CompileOnly(";".to_string()));
    }

    #[test]
    fn test_docstring() {
        let (mut f, _) = forth();
        f.process_line(": 2drop2 [[ ( n1 n2 -- ) Drop two. ]] drop drop ;").unwrap();
        let id = f.dict.lookup("2drop2", false).unwrap();
        assert_eq!(f.dict.get(id).doc, "( n1 n2 -- ) Drop two.");
        f.process_line("help@ 2drop2").unwrap();
        assert_eq!(stack(&f), vec![Cell::Text("( n1 n2 -- ) Drop two.".to_string())]);
        let e = error_of(f.process_line(": twice [[ a ]] [[ b ]] ;"));
        assert_eq!(e, ForthError::Invalid("twice: docstring already given".to_string()));
        let e = error_of(f.process_line(": open [[ never closed"));
        assert!(matches!(e, ForthError::ParseError(_)));
    }

    #[test]
    fn test_comments() {
        let (mut f, _) = forth();
        f.process_line("1 ( two three ) 4 \\ 5 6").unwrap();
        assert_eq!(stack(&f), ints(&[1, 4]));
        f.process_line(": c1 ( n -- n ) 1 + ;").unwrap();
        f.process_line("c1").unwrap();
        assert_eq!(stack(&f), ints(&[1, 5]));
        assert!(matches!(error_of(f.process_line("( oops")), ForthError::ParseError(_)));
    }

    #[test]
    fn test_string_literals() {
        let (mut f, _) = forth();
        f.process_line("s\" hello world\"").unwrap();
        assert_eq!(stack(&f), vec![Cell::Text("hello world".to_string())]);
        f.process_line("clearstack : greet s\" hi there\" ;").unwrap();
        assert!(stack(&f).is_empty());
        f.process_line("greet greet").unwrap();
        assert_eq!(stack(&f).len(), 2);
        assert!(matches!(error_of(f.process_line("s\" unterminated")), ForthError::ParseError(_)));
    }

    #[test]
    fn test_constant_and_variable() {
        let (mut f, _) = forth();
        f.process_line("42 constant answer answer").unwrap();
        assert_eq!(stack(&f), ints(&[42]));
        f.process_line("clearstack variable v 7 v ! v @ 3 v +! v @").unwrap();
        assert_eq!(stack(&f), ints(&[7, 10]));
        let e = error_of(f.process_line("variable w w @"));
        assert_eq!(e, ForthError::UninitializedVariable(1));
        let e = error_of(f.process_line("5 99 !"));
        assert_eq!(e, ForthError::AddressOutOfRange(BigInt::from(99)));
    }

    #[test]
    fn test_char_and_word() {
        let (mut f, _) = forth();
        f.process_line("char A word hello").unwrap();
        assert_eq!(stack(&f), vec![Cell::int(65), Cell::Text("hello".to_string())]);
        assert!(matches!(error_of(f.process_line("char AB")), ForthError::Invalid(_)));
    }

    #[test]
    fn test_find_and_execute() {
        let (mut f, _) = forth();
        f.process_line("3 s\" dup\" find execute").unwrap();
        assert_eq!(stack(&f), ints(&[3, 3]));
        let e = error_of(f.process_line("4 execute"));
        assert!(matches!(e, ForthError::TypeMismatch { .. }));
    }

    #[test]
    fn test_colon_needs_name() {
        let (mut f, _) = forth();
        assert!(matches!(error_of(f.process_line(":")), ForthError::ParseError(_)));
        assert!(!f.get_compile_mode());
    }

    #[test]
    fn test_quit_word_continues_line() {
        let (mut f, _) = forth();
        f.process_line("1 quit 2").unwrap();
        assert_eq!(stack(&f), ints(&[1, 2]));
        assert_eq!(f.process_line("quit bye"), Err(Interrupt::Bye));
    }
}
