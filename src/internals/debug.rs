// Debugging and introspection words

use crate::error::Result;
use crate::internals::dictionary::{Timing, WordKind};
use crate::kernel::Cell;
use crate::runtime::ForthRuntime;

impl ForthRuntime {
    /// repr_cell shows a cell with its type visible: text is quoted, words are bracketed
    ///
    pub fn repr_cell(&self, cell: &Cell) -> String {
        match cell {
            Cell::Int(n) => n.to_string(),
            Cell::Text(s) => format!("{:?}", s),
            Cell::Word(id) => format!("<{}>", self.dict.get(*id).name),
        }
    }

    /// .s ( -- ) prints the stack, bottom first, without changing it
    ///
    pub fn f_dot_s(&mut self) -> Result<()> {
        let items: Vec<String> = self.kernel.stack.iter().map(|c| self.repr_cell(c)).collect();
        let mut text = format!("<{}>", items.len());
        for item in &items {
            text.push(' ');
            text.push_str(item);
        }
        text.push_str(" <- Top\n");
        self.write_out(&text)
    }

    pub fn f_stack_depth(&mut self) -> Result<()> {
        let depth = self.kernel.stack_len();
        self.kernel.push(Cell::int(depth));
        Ok(())
    }

    /// dsp@ ( -- n ) index of the current top item, -1 when empty
    pub fn f_dsp_at(&mut self) -> Result<()> {
        let top = self.kernel.stack_len() as i64 - 1;
        self.kernel.push(Cell::int(top));
        Ok(())
    }

    /// Renders a body as source text. A text literal followed by the number word came from an
    /// unresolved token and is shown bare; any other text literal came from s".
    fn format_body(&self, body: &[Cell]) -> String {
        let mut parts = Vec::new();
        let mut entries = body.iter().peekable();
        while let Some(entry) = entries.next() {
            match entry {
                Cell::Text(t) if entries.peek() == Some(&&Cell::Word(self.number_word)) => {
                    entries.next();
                    parts.push(t.clone());
                }
                Cell::Text(t) => parts.push(format!("s\" {}\"", t)),
                Cell::Int(n) => parts.push(n.to_string()),
                Cell::Word(id) => parts.push(self.dict.get(*id).name.clone()),
            }
        }
        parts.join(" ")
    }

    /// see <name> ( -- ) prints the definition of the next word
    ///
    pub fn f_see(&mut self) -> Result<()> {
        let id = self.find_next(true)?;
        let word = self.dict.get(id);
        let mut text = match &word.kind {
            WordKind::Native(_) => format!("{} is a native word\n", word.name),
            WordKind::Composite(body) => {
                let mut def = format!(": {} ", word.name);
                if !word.doc.is_empty() {
                    def.push_str(&format!("[[ {} ]] ", word.doc));
                }
                let body = self.format_body(body);
                if !body.is_empty() {
                    def.push_str(&body);
                    def.push(' ');
                }
                def.push_str(";\n");
                def
            }
        };
        let mut flags = Vec::new();
        if word.hidden {
            flags.push("(hidden)");
        }
        match word.timing {
            Timing::Immediate => flags.push("(immediate)"),
            Timing::CompileOnly => flags.push("(compile-only)"),
            Timing::Normal => {}
        }
        if !flags.is_empty() {
            text.push_str(&flags.join(" "));
            text.push('\n');
        }
        self.write_out(&text)
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::tests::{forth, ints, stack};

    #[test]
    fn test_dot_s() {
        let (mut f, out) = forth();
        f.process_line(".s").unwrap();
        f.process_line("1 s\" two\" ' dup .s").unwrap();
        assert_eq!(out.text(), "<0> <- Top\n<3> 1 \"two\" <dup> <- Top\n");
        assert_eq!(stack(&f).len(), 3);
    }

    #[test]
    fn test_depth_and_dsp() {
        let (mut f, _) = forth();
        f.process_line("dsp@ drop 7 8 depth dsp@").unwrap();
        assert_eq!(stack(&f), ints(&[7, 8, 2, 2]));
        f.process_line("clearstack dsp@").unwrap();
        assert_eq!(stack(&f), ints(&[-1]));
    }

    #[test]
    fn test_see_composite() {
        let (mut f, out) = forth();
        f.process_line(": greet [[ ( -- ) Say hi. ]] s\" hi\" tell 42 . ;").unwrap();
        f.process_line("see greet").unwrap();
        assert_eq!(out.text(), ": greet [[ ( -- ) Say hi. ]] s\" hi\" tell 42 . ;\n");
    }

    #[test]
    fn test_see_native_and_flags() {
        let (mut f, out) = forth();
        f.process_line("see dup see ;").unwrap();
        f.process_line(": secret ; hide secret see secret").unwrap();
        assert_eq!(
            out.text(),
            "dup is a native word\n; is a native word\n(compile-only)\n: secret ;\n(hidden)\n"
        );
    }
}
