#![forbid(unsafe_code)]

//! Shelf: an editable, searchable list of books.
//!
//! This is the second front-end of the bookstore. Where the storefront sells
//! from a fixed catalog, the shelf lets the user create, edit, delete and
//! search free-form book records. The whole list is persisted under
//! [`SHELF_KEY`] after every change, with the same failure policy as the
//! cart: unreadable data loads as an empty shelf, failed writes are logged.

use crate::price::{Price, PriceError};
use bookcart_runtime::state_persistence::{SlotStats, StateSlot, StorageBackend};
use bookcart_runtime::{Cmd, Event, Frame, Model};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Storage key holding the persisted shelf.
pub const SHELF_KEY: &str = "books";

/// A stored book.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Opaque identifier (creation time in milliseconds, as text).
    pub id: String,
    /// Title, trimmed and non-empty.
    pub title: String,
    /// Author, trimmed and non-empty.
    pub author: String,
    /// Optional price.
    #[serde(default)]
    pub price: Option<Price>,
}

impl BookRecord {
    /// Price for display; missing and zero prices show as `-`.
    #[must_use]
    pub fn price_label(&self) -> String {
        match self.price {
            Some(p) if !p.is_zero() => p.to_string(),
            _ => "-".to_string(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.author.to_lowercase().contains(needle)
    }
}

/// Why a draft was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Title is empty after trimming.
    MissingTitle,
    /// Author is empty after trimming.
    MissingAuthor,
    /// Price text is not a non-negative number.
    InvalidPrice(PriceError),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTitle => f.write_str("Title is required"),
            Self::MissingAuthor => f.write_str("Author is required"),
            Self::InvalidPrice(e) => write!(f, "Invalid price: {e}"),
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPrice(e) => Some(e),
            Self::MissingTitle | Self::MissingAuthor => None,
        }
    }
}

/// Validated form input for a book.
#[derive(Debug, Clone, PartialEq)]
pub struct BookDraft {
    /// Trimmed title.
    pub title: String,
    /// Trimmed author.
    pub author: String,
    /// Parsed price; `None` when left blank.
    pub price: Option<Price>,
}

impl BookDraft {
    /// Validate raw form fields.
    pub fn parse(title: &str, author: &str, price: &str) -> Result<Self, ValidationError> {
        let title = title.trim();
        let author = author.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if author.is_empty() {
            return Err(ValidationError::MissingAuthor);
        }
        let price = match price.trim() {
            "" => None,
            text => Some(Price::parse(text).map_err(ValidationError::InvalidPrice)?),
        };
        Ok(Self {
            title: title.to_string(),
            author: author.to_string(),
            price,
        })
    }
}

type Clock = Box<dyn FnMut() -> u64 + Send>;

fn wall_clock_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// The persisted list of books, newest first.
pub struct Shelf {
    records: Vec<BookRecord>,
    slot: StateSlot<Vec<BookRecord>>,
    clock: Clock,
}

impl Shelf {
    /// Restore the shelf from `backend`.
    pub fn open(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_clock(backend, Box::new(wall_clock_millis))
    }

    /// Restore the shelf, taking new ids from `clock` (milliseconds).
    pub fn with_clock(backend: Arc<dyn StorageBackend>, clock: Clock) -> Self {
        let mut slot = StateSlot::new(backend, SHELF_KEY);
        let records = slot.load().unwrap_or_default();
        Self {
            records,
            slot,
            clock,
        }
    }

    /// All records, newest first.
    #[must_use]
    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the shelf is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BookRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Store `draft`, returning the id it was saved under.
    ///
    /// With `editing` naming an existing record, that record is replaced in
    /// place. Otherwise a record is added at the front, under `editing` if
    /// given or a fresh id if not.
    pub fn save(&mut self, draft: BookDraft, editing: Option<&str>) -> String {
        let id = match editing {
            Some(id) => id.to_string(),
            None => self.fresh_id(),
        };
        let record = BookRecord {
            id: id.clone(),
            title: draft.title,
            author: draft.author,
            price: draft.price,
        };
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(existing) => *existing = record,
            None => self.records.insert(0, record),
        }
        self.slot.persist(&self.records);
        id
    }

    /// Remove a record; returns whether it existed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.slot.persist(&self.records);
        self.records.len() != before
    }

    /// Remove every record.
    pub fn clear_all(&mut self) {
        self.records.clear();
        self.slot.persist(&self.records);
    }

    /// Records whose title or author contains `query`, ignoring case.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&BookRecord> {
        let needle = query.to_lowercase();
        self.records.iter().filter(|r| r.matches(&needle)).collect()
    }

    /// `"N of M books shown"` for `query`.
    #[must_use]
    pub fn summary(&self, query: &str) -> String {
        format!("{} of {} books shown", self.search(query).len(), self.len())
    }

    /// Persistence counters for this session.
    #[must_use]
    pub fn persist_stats(&self) -> SlotStats {
        self.slot.stats()
    }

    fn fresh_id(&mut self) -> String {
        let mut millis = (self.clock)();
        loop {
            let id = millis.to_string();
            if self.get(&id).is_none() {
                return id;
            }
            millis = millis.wrapping_add(1);
        }
    }
}

impl fmt::Debug for Shelf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shelf")
            .field("records", &self.records.len())
            .field("slot", &self.slot)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shelf front-end
// ─────────────────────────────────────────────────────────────────────────────

const SHELF_HELP: &str = "\
commands:
  add TITLE | AUTHOR | PRICE    add a book (or update the one being edited)
  edit ID                       load a book for editing
  cancel                        stop editing
  delete ID                     delete a book (asks first)
  clear                         delete every book (asks first)
  search TEXT                   filter by title or author; `search` alone resets
  help                          show this text
  quit                          leave";

/// Raw form fields as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormFields {
    /// Title field.
    pub title: String,
    /// Author field.
    pub author: String,
    /// Price field.
    pub price: String,
}

impl FormFields {
    fn split(text: &str) -> Self {
        let mut parts = text.splitn(3, '|').map(str::trim);
        Self {
            title: parts.next().unwrap_or_default().to_string(),
            author: parts.next().unwrap_or_default().to_string(),
            price: parts.next().unwrap_or_default().to_string(),
        }
    }
}

/// Messages understood by [`ShelfApp`].
#[derive(Debug, Clone, PartialEq)]
pub enum ShelfMsg {
    /// Submit the form.
    Submit(FormFields),
    /// Start editing a record.
    Edit(String),
    /// Stop editing and drop any pending confirmation.
    Cancel,
    /// Ask to delete a record.
    Delete(String),
    /// Ask to delete everything.
    ClearAll,
    /// Answer a pending confirmation.
    Confirm(bool),
    /// Set the search query.
    Search(String),
    /// Print the command list.
    Help,
    /// Leave.
    Quit,
    /// Nothing to do.
    Noop,
    /// Input that matched no command.
    Unknown(String),
}

impl ShelfMsg {
    /// Parse one line of user input.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        match (command.to_ascii_lowercase().as_str(), rest) {
            ("", _) => Self::Noop,
            ("add" | "new" | "save", rest) if !rest.is_empty() => Self::Submit(FormFields::split(rest)),
            ("edit", id) if !id.is_empty() => Self::Edit(id.to_string()),
            ("delete" | "del", id) if !id.is_empty() => Self::Delete(id.to_string()),
            ("cancel", _) => Self::Cancel,
            ("clear", _) => Self::ClearAll,
            ("yes" | "y", _) => Self::Confirm(true),
            ("no" | "n", _) => Self::Confirm(false),
            ("search" | "find", query) => Self::Search(query.to_string()),
            ("help" | "?", _) => Self::Help,
            ("quit" | "q" | "exit", _) => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

impl From<Event> for ShelfMsg {
    fn from(event: Event) -> Self {
        match event {
            Event::Input(line) => Self::parse(&line),
            Event::Tick => Self::Noop,
        }
    }
}

/// A destructive action waiting for a yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingConfirm {
    /// Delete one record.
    Delete(String),
    /// Delete every record.
    ClearAll,
}

/// The shelf front-end: form, table, search and confirmations.
#[derive(Debug)]
pub struct ShelfApp {
    shelf: Shelf,
    editing: Option<String>,
    query: String,
    pending: Option<PendingConfirm>,
}

impl ShelfApp {
    /// Wrap a shelf.
    #[must_use]
    pub fn new(shelf: Shelf) -> Self {
        Self {
            shelf,
            editing: None,
            query: String::new(),
            pending: None,
        }
    }

    /// The underlying shelf.
    #[must_use]
    pub fn shelf(&self) -> &Shelf {
        &self.shelf
    }

    /// Id of the record being edited.
    #[must_use]
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Current search query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Confirmation waiting for an answer.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingConfirm> {
        self.pending.as_ref()
    }

    fn submit(&mut self, fields: &FormFields) -> Cmd<ShelfMsg> {
        let draft = match BookDraft::parse(&fields.title, &fields.author, &fields.price) {
            Ok(draft) => draft,
            Err(e) => return Cmd::notify(e.to_string()),
        };
        let editing = self.editing.take();
        let id = self.shelf.save(draft, editing.as_deref());
        tracing::debug!(%id, updated = editing.is_some(), "saved book");
        Cmd::none()
    }

    fn confirm(&mut self, yes: bool) -> Cmd<ShelfMsg> {
        let Some(pending) = self.pending.take() else {
            return Cmd::notify("Nothing to confirm.");
        };
        if !yes {
            return Cmd::none();
        }
        match pending {
            PendingConfirm::Delete(id) => {
                self.shelf.delete(&id);
                if self.editing.as_deref() == Some(id.as_str()) {
                    self.editing = None;
                }
            }
            PendingConfirm::ClearAll => {
                self.shelf.clear_all();
                self.editing = None;
            }
        }
        Cmd::none()
    }
}

impl Model for ShelfApp {
    type Message = ShelfMsg;

    fn update(&mut self, msg: ShelfMsg) -> Cmd<ShelfMsg> {
        if !matches!(msg, ShelfMsg::Confirm(_) | ShelfMsg::Noop) {
            self.pending = None;
        }
        match msg {
            ShelfMsg::Submit(fields) => self.submit(&fields),
            ShelfMsg::Edit(id) => {
                if self.shelf.get(&id).is_none() {
                    return Cmd::notify(format!("No book with id {id}."));
                }
                self.editing = Some(id);
                Cmd::none()
            }
            ShelfMsg::Cancel => {
                self.editing = None;
                Cmd::none()
            }
            ShelfMsg::Delete(id) => {
                if self.shelf.get(&id).is_none() {
                    return Cmd::notify(format!("No book with id {id}."));
                }
                self.pending = Some(PendingConfirm::Delete(id));
                Cmd::notify("Delete this book? (yes/no)")
            }
            ShelfMsg::ClearAll => {
                self.pending = Some(PendingConfirm::ClearAll);
                Cmd::notify("Clear all books? (yes/no)")
            }
            ShelfMsg::Confirm(yes) => self.confirm(yes),
            ShelfMsg::Search(query) => {
                self.query = query;
                Cmd::none()
            }
            ShelfMsg::Help => Cmd::log(SHELF_HELP),
            ShelfMsg::Quit => Cmd::quit(),
            ShelfMsg::Noop => Cmd::none(),
            ShelfMsg::Unknown(text) => {
                Cmd::notify(format!("Unknown command {text:?}; type `help` for a list."))
            }
        }
    }

    fn view(&self, frame: &mut Frame) {
        frame.line("Bookstore CRUD");
        if let Some(record) = self.editing.as_deref().and_then(|id| self.shelf.get(id)) {
            frame.line(format!(
                "editing {}: {} | {} | {}  (add ... to update, cancel to stop)",
                record.id,
                record.title,
                record.author,
                record.price.map(|p| p.to_string()).unwrap_or_default()
            ));
        }
        if !self.query.is_empty() {
            frame.line(format!("search: {}", self.query));
        }
        frame.blank();

        let shown = self.shelf.search(&self.query);
        if self.shelf.is_empty() {
            frame.line("No books yet. Add one with `add TITLE | AUTHOR | PRICE`.");
        } else {
            frame.line(format!("{:<16} {:<32} {:<24} {}", "Id", "Title", "Author", "Price"));
            for record in &shown {
                frame.line(format!(
                    "{:<16} {:<32} {:<24} {}",
                    record.id,
                    record.title,
                    record.author,
                    record.price_label()
                ));
            }
        }
        frame.blank();
        frame.line(self.shelf.summary(&self.query));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookcart_runtime::ProgramSimulator;
    use bookcart_runtime::state_persistence::MemoryStorage;

    fn counting_clock(start: u64) -> Clock {
        let mut next = start;
        Box::new(move || {
            let now = next;
            next += 1;
            now
        })
    }

    fn fixed_clock(at: u64) -> Clock {
        Box::new(move || at)
    }

    fn draft(title: &str, author: &str) -> BookDraft {
        BookDraft::parse(title, author, "").unwrap()
    }

    #[test]
    fn draft_requires_title_and_author() {
        assert_eq!(
            BookDraft::parse("  ", "Orwell", ""),
            Err(ValidationError::MissingTitle)
        );
        assert_eq!(
            BookDraft::parse("1984", "", "1"),
            Err(ValidationError::MissingAuthor)
        );
        assert!(matches!(
            BookDraft::parse("1984", "Orwell", "cheap"),
            Err(ValidationError::InvalidPrice(_))
        ));
        let ok = BookDraft::parse(" 1984 ", " Orwell ", " 9.5 ").unwrap();
        assert_eq!(ok.title, "1984");
        assert_eq!(ok.author, "Orwell");
        assert_eq!(ok.price, Some(Price::from_cents(950)));
    }

    #[test]
    fn new_records_go_first_and_persist() {
        let backend = Arc::new(MemoryStorage::new());
        let mut shelf = Shelf::with_clock(backend.clone(), counting_clock(100));
        shelf.save(draft("A", "x"), None);
        shelf.save(draft("B", "y"), None);

        let titles: Vec<&str> = shelf.records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);

        let reopened = Shelf::open(backend);
        assert_eq!(reopened.records(), shelf.records());
    }

    #[test]
    fn colliding_ids_are_bumped() {
        let mut shelf = Shelf::with_clock(Arc::new(MemoryStorage::new()), fixed_clock(7));
        let a = shelf.save(draft("A", "x"), None);
        let b = shelf.save(draft("B", "y"), None);
        assert_eq!(a, "7");
        assert_eq!(b, "8");
    }

    #[test]
    fn editing_replaces_in_place() {
        let mut shelf = Shelf::with_clock(Arc::new(MemoryStorage::new()), counting_clock(1));
        let a = shelf.save(draft("A", "x"), None);
        shelf.save(draft("B", "y"), None);
        shelf.save(draft("A2", "x2"), Some(&a));

        assert_eq!(shelf.len(), 2);
        assert_eq!(shelf.records()[1].title, "A2");
        assert_eq!(shelf.records()[1].id, a);
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_author() {
        let mut shelf = Shelf::with_clock(Arc::new(MemoryStorage::new()), counting_clock(1));
        shelf.save(draft("Animal Farm", "George Orwell"), None);
        shelf.save(draft("Dune", "Frank Herbert"), None);

        assert_eq!(shelf.search("ORWELL").len(), 1);
        assert_eq!(shelf.search("an").len(), 2);
        assert_eq!(shelf.search("").len(), 2);
        assert_eq!(shelf.summary("dune"), "1 of 2 books shown");
    }

    #[test]
    fn corrupt_shelf_loads_empty() {
        let backend = Arc::new(MemoryStorage::with_entries([(SHELF_KEY, "{malformed")]));
        let shelf = Shelf::open(backend);
        assert!(shelf.is_empty());
    }

    #[test]
    fn price_label_hides_missing_and_zero() {
        let mut record = BookRecord {
            id: "1".into(),
            title: "t".into(),
            author: "a".into(),
            price: None,
        };
        assert_eq!(record.price_label(), "-");
        record.price = Some(Price::ZERO);
        assert_eq!(record.price_label(), "-");
        record.price = Some(Price::from_cents(1250));
        assert_eq!(record.price_label(), "$12.50");
    }

    #[test]
    fn parse_shelf_commands() {
        assert_eq!(
            ShelfMsg::parse("add Dune | Frank Herbert | 9.99"),
            ShelfMsg::Submit(FormFields {
                title: "Dune".into(),
                author: "Frank Herbert".into(),
                price: "9.99".into(),
            })
        );
        assert_eq!(
            ShelfMsg::parse("add Dune"),
            ShelfMsg::Submit(FormFields {
                title: "Dune".into(),
                ..FormFields::default()
            })
        );
        assert_eq!(ShelfMsg::parse("search"), ShelfMsg::Search(String::new()));
        assert_eq!(ShelfMsg::parse("delete 12"), ShelfMsg::Delete("12".into()));
        assert_eq!(ShelfMsg::parse("y"), ShelfMsg::Confirm(true));
        assert_eq!(ShelfMsg::parse("add"), ShelfMsg::Unknown("add".into()));
    }

    #[test]
    fn app_validation_errors_become_notices() {
        let shelf = Shelf::with_clock(Arc::new(MemoryStorage::new()), counting_clock(1));
        let mut sim = ProgramSimulator::new(ShelfApp::new(shelf));
        sim.input_lines(&["add Dune"]);
        assert_eq!(sim.notices(), &["Author is required".to_string()]);
        assert!(sim.model().shelf().is_empty());
    }

    #[test]
    fn app_delete_needs_confirmation() {
        let shelf = Shelf::with_clock(Arc::new(MemoryStorage::new()), counting_clock(1));
        let mut sim = ProgramSimulator::new(ShelfApp::new(shelf));
        sim.input_lines(&["add Dune | Herbert", "delete 1", "no"]);
        assert_eq!(sim.model().shelf().len(), 1);

        sim.input_lines(&["delete 1", "search x", "yes"]);
        assert_eq!(sim.model().shelf().len(), 1, "other commands drop the request");

        sim.input_lines(&["delete 1", "yes"]);
        assert!(sim.model().shelf().is_empty());
    }

    #[test]
    fn app_edit_then_submit_updates() {
        let shelf = Shelf::with_clock(Arc::new(MemoryStorage::new()), counting_clock(1));
        let mut sim = ProgramSimulator::new(ShelfApp::new(shelf));
        sim.input_lines(&["add Dune | Herbert | 9", "edit 1", "add Dune Messiah | Herbert | 10"]);

        let shelf = sim.model().shelf();
        assert_eq!(shelf.len(), 1);
        assert_eq!(shelf.records()[0].title, "Dune Messiah");
        assert_eq!(sim.model().editing(), None);
    }

    #[test]
    fn app_clear_all_and_view_summary() {
        let shelf = Shelf::with_clock(Arc::new(MemoryStorage::new()), counting_clock(1));
        let mut sim = ProgramSimulator::new(ShelfApp::new(shelf));
        sim.input_lines(&["add A | x", "add B | y", "search a"]);
        assert!(sim.capture_frame().contains("1 of 2 books shown"));

        sim.input_lines(&["clear", "yes"]);
        let frame = sim.capture_frame();
        assert!(frame.contains("No books yet"));
        assert!(frame.contains("0 of 0 books shown"));
    }
}
