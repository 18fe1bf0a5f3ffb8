// Line editor for interactive sessions: raw-mode key handling with one line of recall.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io::{self, stdout, Write};

pub const PROMPT: &str = "> ";

/// What a key press does to the line being edited
#[derive(Debug, PartialEq)]
pub enum Edit {
    Continue,
    Submit(String),
    Quit,
}

/// Raw mode lasts as long as this guard
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<RawMode> {
        enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

#[derive(Debug, Default)]
pub struct ForthLineEditor {
    buffer: Vec<char>,
    cursor: usize,
    previous_line: Option<String>,
}

impl ForthLineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// handle_key applies one key press to the buffer, echoing to `term`
    ///
    pub fn handle_key(&mut self, key: KeyEvent, term: &mut impl Write) -> io::Result<Edit> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => {
                write!(term, "\r\n")?;
                return Ok(Edit::Quit);
            }
            KeyCode::Char('a') if ctrl => {
                while self.cursor > 0 {
                    self.cursor -= 1;
                    write!(term, "\x1b[D")?;
                }
            }
            KeyCode::Char('e') if ctrl => {
                while self.cursor < self.buffer.len() {
                    self.cursor += 1;
                    write!(term, "\x1b[C")?;
                }
            }
            KeyCode::Char('k') if ctrl => {
                write!(term, "\x1b[K")?;
                self.buffer.truncate(self.cursor);
            }
            KeyCode::Char(c) if !ctrl => {
                self.buffer.insert(self.cursor, c);
                self.cursor += 1;
                let tail: String = self.buffer[self.cursor - 1..].iter().collect();
                write!(term, "{}", tail)?;
                for _ in self.cursor..self.buffer.len() {
                    write!(term, "\x1b[D")?;
                }
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.buffer.remove(self.cursor);
                self.redraw(term)?;
            }
            KeyCode::Left if self.cursor > 0 => {
                self.cursor -= 1;
                write!(term, "\x1b[D")?;
            }
            KeyCode::Right if self.cursor < self.buffer.len() => {
                self.cursor += 1;
                write!(term, "\x1b[C")?;
            }
            KeyCode::Up => {
                if let Some(prev) = &self.previous_line {
                    self.buffer = prev.chars().collect();
                    self.cursor = self.buffer.len();
                    self.redraw(term)?;
                }
            }
            KeyCode::Enter => {
                let line: String = self.buffer.drain(..).collect();
                self.cursor = 0;
                self.previous_line = Some(line.clone());
                write!(term, "\r\n")?;
                return Ok(Edit::Submit(line));
            }
            KeyCode::Esc => {
                write!(term, "\r\n")?;
                return Ok(Edit::Quit);
            }
            _ => {}
        }
        Ok(Edit::Continue)
    }

    fn redraw(&self, term: &mut impl Write) -> io::Result<()> {
        let line: String = self.buffer.iter().collect();
        write!(term, "\r\x1b[K{}{}", PROMPT, line)?;
        for _ in self.cursor..self.buffer.len() {
            write!(term, "\x1b[D")?;
        }
        Ok(())
    }

    /// get_line prompts and edits until Enter (Some) or a quit key (None)
    ///
    pub fn get_line(&mut self) -> io::Result<Option<String>> {
        self.buffer.clear();
        self.cursor = 0;
        let _raw = RawMode::enable()?;
        let mut out = stdout();
        write!(out, "{}", PROMPT)?;
        out.flush()?;
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                let edit = self.handle_key(key, &mut out)?;
                out.flush()?;
                match edit {
                    Edit::Continue => {}
                    Edit::Submit(line) => return Ok(Some(line)),
                    Edit::Quit => return Ok(None),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(ed: &mut ForthLineEditor, s: &str, term: &mut Vec<u8>) {
        for c in s.chars() {
            assert_eq!(ed.handle_key(key(KeyCode::Char(c)), term).unwrap(), Edit::Continue);
        }
    }

    #[test]
    fn test_submit() {
        let mut ed = ForthLineEditor::new();
        let mut term = Vec::new();
        type_str(&mut ed, "1 2 +", &mut term);
        assert_eq!(ed.handle_key(key(KeyCode::Enter), &mut term).unwrap(), Edit::Submit("1 2 +".into()));
    }

    #[test]
    fn test_edit_in_middle() {
        let mut ed = ForthLineEditor::new();
        let mut term = Vec::new();
        type_str(&mut ed, "13", &mut term);
        ed.handle_key(key(KeyCode::Left), &mut term).unwrap();
        type_str(&mut ed, "2", &mut term);
        ed.handle_key(key(KeyCode::Backspace), &mut term).unwrap();
        ed.handle_key(key(KeyCode::Backspace), &mut term).unwrap();
        assert_eq!(ed.handle_key(key(KeyCode::Enter), &mut term).unwrap(), Edit::Submit("3".into()));
    }

    #[test]
    fn test_recall_previous_line() {
        let mut ed = ForthLineEditor::new();
        let mut term = Vec::new();
        type_str(&mut ed, "words", &mut term);
        ed.handle_key(key(KeyCode::Enter), &mut term).unwrap();
        ed.handle_key(key(KeyCode::Up), &mut term).unwrap();
        type_str(&mut ed, "+", &mut term);
        assert_eq!(ed.handle_key(key(KeyCode::Enter), &mut term).unwrap(), Edit::Submit("words+".into()));
    }

    #[test]
    fn test_quit_keys() {
        let mut ed = ForthLineEditor::new();
        let mut term = Vec::new();
        assert_eq!(ed.handle_key(ctrl('d'), &mut term).unwrap(), Edit::Quit);
        assert_eq!(ed.handle_key(ctrl('c'), &mut term).unwrap(), Edit::Quit);
        assert_eq!(ed.handle_key(key(KeyCode::Esc), &mut term).unwrap(), Edit::Quit);
    }

    #[test]
    fn test_kill_to_end() {
        let mut ed = ForthLineEditor::new();
        let mut term = Vec::new();
        type_str(&mut ed, "1 2 drop", &mut term);
        ed.handle_key(ctrl('a'), &mut term).unwrap();
        ed.handle_key(key(KeyCode::Right), &mut term).unwrap();
        ed.handle_key(ctrl('k'), &mut term).unwrap();
        assert_eq!(ed.handle_key(key(KeyCode::Enter), &mut term).unwrap(), Edit::Submit("1".into()));
    }
}
