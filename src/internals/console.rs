/// Output words
///
///     Everything here writes to the runtime's output sink. No colour or markup: that belongs
///     to whoever is displaying the sink.
///
use crate::error::{ForthError, Result};
use crate::kernel::Cell;
use crate::runtime::ForthRuntime;
use num_traits::ToPrimitive;

/// Width of the stack-effect column in `words+`
pub const EFFECT_WIDTH: usize = 25;
/// Width of the name column in `words+`
pub const NAME_WIDTH: usize = 20;

/// format_doc lines up the stack effect, if present, in a column of the given width
///
///     "( n -- n ) Foo foo" at width 12 gives "( n -- n )   Foo foo"
///
pub fn format_doc(doc: &str, width: usize) -> String {
    let doc = doc.trim();
    let (effect, text) = match (doc.strip_prefix('('), doc.find(')')) {
        (Some(_), Some(close)) if close > 1 => (&doc[..=close], doc[close + 1..].trim()),
        _ => ("", doc),
    };
    format!("{:width$} {}", effect, text, width = width)
}

impl ForthRuntime {
    /// format_cell renders a cell the way `.` prints it
    ///
    pub fn format_cell(&self, cell: &Cell) -> String {
        match cell {
            Cell::Word(id) => self.dict.get(*id).name.clone(),
            other => other.to_string(),
        }
    }

    /// . ( n -- ) Pop and print the top item, followed by a space
    ///
    pub fn f_dot(&mut self) -> Result<()> {
        let cell = self.kernel.pop()?;
        let text = format!("{} ", self.format_cell(&cell));
        self.write_out(&text)
    }

    /// emit ( n -- ) print the character with code n
    ///
    pub fn f_emit(&mut self) -> Result<()> {
        let code = self.kernel.pop_int("emit")?;
        match code.to_u32().and_then(char::from_u32) {
            Some(c) => {
                let mut buf = [0u8; 4];
                self.write_out(c.encode_utf8(&mut buf))
            }
            None => Err(ForthError::Invalid(format!("emit: {} is not a character", code)).into()),
        }
    }

    /// words ( -- ) list visible words, newest first
    ///
    pub fn f_words(&mut self) -> Result<()> {
        let names: Vec<&str> = self
            .dict
            .iter()
            .filter(|(_, w)| !w.hidden)
            .map(|(_, w)| w.name.as_str())
            .collect();
        let text = format!("{}\n", names.join(" "));
        self.write_out(&text)
    }

    /// words+ ( -- ) list visible words with their help
    ///
    pub fn f_words_plus(&mut self) -> Result<()> {
        let mut text = String::new();
        for (_, w) in self.dict.iter().filter(|(_, w)| !w.hidden) {
            text.push_str(&format!(
                "{:width$}{}\n",
                w.name,
                format_doc(&w.doc, EFFECT_WIDTH),
                width = NAME_WIDTH
            ));
        }
        self.write_out(&text)
    }
}
