/// The dictionary
///
///     Words are kept in an arena and linked newest-first through their `next` handle.
///     The head is the most recent definition; lookup walks back from it, so a later definition
///     shadows an earlier one with the same name. Nothing is ever removed from the arena:
///     forget only rewinds the head, and a forgotten word stays callable from any body that
///     captured its id.
///
use crate::error::Result;
use crate::kernel::Cell;
use crate::runtime::ForthRuntime;
use std::rc::Rc;
use tracing::debug;

/// Handle to a word in the arena. Identity, not name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WordId(usize);

impl WordId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The signature every builtin shares
pub type NativeFn = fn(&mut ForthRuntime) -> Result<()>;

/// When a word runs relative to compile mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// Staged while compiling, executed while interpreting.
    Normal,
    /// Executed as soon as it's found, in either mode.
    Immediate,
    /// Executed while compiling, an error while interpreting.
    CompileOnly,
}

#[derive(Debug, Clone)]
pub enum WordKind {
    Native(NativeFn),
    /// Body entries: a Cell::Word is a call, anything else is a literal to push.
    Composite(Rc<[Cell]>),
}

#[derive(Debug, Clone)]
pub struct Word {
    pub name: String,
    pub next: Option<WordId>,
    pub doc: String,
    pub hidden: bool,
    pub timing: Timing,
    pub kind: WordKind,
}

#[derive(Debug, Default)]
pub struct Dictionary {
    words: Vec<Word>,
    head: Option<WordId>,
}

impl Dictionary {
    pub fn new() -> Dictionary {
        Dictionary::default()
    }

    fn link(&mut self, name: &str, doc: &str, timing: Timing, kind: WordKind) -> WordId {
        let id = WordId(self.words.len());
        self.words.push(Word {
            name: name.to_string(),
            next: self.head,
            doc: doc.to_string(),
            hidden: false,
            timing,
            kind,
        });
        self.head = Some(id);
        id
    }

    /// define_native prepends a builtin; it becomes the new head
    ///
    pub fn define_native(&mut self, name: &str, doc: &str, timing: Timing, code: NativeFn) -> WordId {
        self.link(name, doc, timing, WordKind::Native(code))
    }

    /// define_composite prepends a colon definition. The body is captured as is; word references
    /// in it were resolved when it was compiled and are never looked up again.
    ///
    pub fn define_composite(&mut self, name: &str, doc: &str, body: Vec<Cell>) -> WordId {
        debug!(name, entries = body.len(), "defining word");
        self.link(name, doc, Timing::Normal, WordKind::Composite(body.into()))
    }

    /// lookup walks from the head to the oldest word and returns the first name match.
    ///     Hidden words only match when include_hidden is set.
    ///
    pub fn lookup(&self, name: &str, include_hidden: bool) -> Option<WordId> {
        self.iter()
            .find(|(_, w)| w.name == name && (include_hidden || !w.hidden))
            .map(|(id, _)| id)
    }

    /// forget rewinds the head to the word defined before `id`
    ///
    pub fn forget(&mut self, id: WordId) {
        debug!(name = %self.words[id.0].name, "forgetting");
        self.head = self.words[id.0].next;
    }

    pub fn get(&self, id: WordId) -> &Word {
        &self.words[id.0]
    }

    pub fn get_mut(&mut self, id: WordId) -> &mut Word {
        &mut self.words[id.0]
    }

    pub fn head(&self) -> Option<WordId> {
        self.head
    }

    /// Reachable words, newest first, hidden ones included.
    pub fn iter(&self) -> DictIter<'_> {
        DictIter { dict: self, cur: self.head() }
    }
}

pub struct DictIter<'a> {
    dict: &'a Dictionary,
    cur: Option<WordId>,
}

impl<'a> Iterator for DictIter<'a> {
    type Item = (WordId, &'a Word);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        let word = self.dict.get(id);
        self.cur = word.next;
        Some((id, word))
    }
}
