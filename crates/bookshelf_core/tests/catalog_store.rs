use bookshelf_core::{
    seed_books, Book, CatalogGateway, CatalogRepoError, CatalogRepoResult, CatalogService,
    CatalogServiceError, Confirm, Draft, IdGenerator, InMemorySlotRepository, LoadSource,
    SequentialIdGenerator, SlotCatalogGateway, SlotRepository, CATALOG_SLOT_KEY,
};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

/// Gateway fake that records every save and can be told to fail writes.
#[derive(Default)]
struct RecordingGateway {
    stored: Option<Vec<Book>>,
    fail_load: bool,
    fail_saves: Rc<Cell<bool>>,
    saves: Vec<Vec<Book>>,
}

impl CatalogGateway for RecordingGateway {
    fn load(&self) -> CatalogRepoResult<Vec<Book>> {
        if self.fail_load {
            return Err(CatalogRepoError::InvalidData("forced".to_string()));
        }
        self.stored
            .clone()
            .ok_or_else(|| CatalogRepoError::SlotMissing("test".to_string()))
    }

    fn save(&mut self, books: &[Book]) -> CatalogRepoResult<()> {
        if self.fail_saves.get() {
            return Err(CatalogRepoError::InvalidData("disk full".to_string()));
        }
        self.saves.push(books.to_vec());
        Ok(())
    }
}

struct Answer {
    accept: bool,
    prompts: RefCell<Vec<String>>,
}

impl Answer {
    fn new(accept: bool) -> Self {
        Self {
            accept,
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl Confirm for Answer {
    fn confirm(&self, message: &str) -> bool {
        self.prompts.borrow_mut().push(message.to_string());
        self.accept
    }
}

struct RepeatingIds;

impl IdGenerator for RepeatingIds {
    fn next_id(&mut self) -> String {
        "seed-1".to_string()
    }
}

fn seeded_store() -> CatalogService<RecordingGateway, SequentialIdGenerator> {
    CatalogService::load(RecordingGateway::default(), SequentialIdGenerator::new("b"))
}

#[test]
fn load_missing_slot_falls_back_to_seed_without_writing() {
    let store = seeded_store();
    assert_eq!(store.list(), seed_books().as_slice());
    assert_eq!(store.load_source(), LoadSource::Seed);
    assert!(store.gateway().saves.is_empty());
}

#[test]
fn load_failure_and_empty_catalog_both_use_seed() {
    let failing = RecordingGateway {
        fail_load: true,
        ..RecordingGateway::default()
    };
    let store = CatalogService::load(failing, SequentialIdGenerator::new("b"));
    assert_eq!(store.list().len(), 3);

    let empty = RecordingGateway {
        stored: Some(Vec::new()),
        ..RecordingGateway::default()
    };
    let store = CatalogService::load(empty, SequentialIdGenerator::new("b"));
    assert_eq!(store.list(), seed_books().as_slice());
}

#[test]
fn load_uses_stored_catalog_when_present() {
    let stored = vec![Book::new("x1", "Dune", "Frank Herbert", Some(1965)).unwrap()];
    let gateway = RecordingGateway {
        stored: Some(stored.clone()),
        ..RecordingGateway::default()
    };
    let store = CatalogService::load(gateway, SequentialIdGenerator::new("b"));
    assert_eq!(store.list(), stored.as_slice());
    assert_eq!(store.load_source(), LoadSource::Stored);
}

#[test]
fn add_prepends_trimmed_book_and_saves_once() {
    let mut store = seeded_store();
    let draft = Draft::new("  Dune ")
        .with_author(" Frank Herbert ")
        .with_year(1965);

    let book = store.add(&draft).unwrap();

    assert_eq!(book.id(), "b1");
    assert_eq!(book.title(), "Dune");
    assert_eq!(book.author(), "Frank Herbert");
    assert_eq!(book.year(), Some(1965));
    assert_eq!(store.list().len(), 4);
    assert_eq!(store.list()[0], book);
    assert_eq!(store.gateway().saves.len(), 1);
    assert_eq!(store.gateway().saves[0], store.list());
}

#[test]
fn add_assigns_distinct_ids() {
    let mut store = seeded_store();
    for title in ["One", "Two", "Three"] {
        store.add(&Draft::new(title)).unwrap();
    }
    let ids = store.list().iter().map(Book::id).collect::<HashSet<_>>();
    assert_eq!(ids.len(), store.list().len());
}

#[test]
fn add_with_blank_title_is_rejected_without_mutation() {
    let mut store = seeded_store();
    for title in ["", "   ", "\t\n"] {
        let err = store.add(&Draft::new(title).with_author("Someone")).unwrap_err();
        match err {
            CatalogServiceError::Validation(err) => {
                assert_eq!(err.field, "title");
                assert_eq!(err.message, "Title is required");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(store.list(), seed_books().as_slice());
    assert!(store.gateway().saves.is_empty());
}

#[test]
fn add_with_non_numeric_year_is_rejected() {
    let mut store = seeded_store();
    let err = store.add(&Draft::new("Dune").with_year("soon")).unwrap_err();
    assert!(matches!(err, CatalogServiceError::Validation(ref e) if e.field == "year"));
    assert_eq!(store.list().len(), 3);
}

#[test]
fn add_with_blank_year_stores_absent_year() {
    let mut store = seeded_store();
    let book = store.add(&Draft::new("Dune").with_year("  ")).unwrap();
    assert_eq!(book.year(), None);
}

#[test]
fn add_gives_up_when_ids_keep_colliding() {
    let mut store = CatalogService::load(RecordingGateway::default(), RepeatingIds);
    let err = store.add(&Draft::new("Dune")).unwrap_err();
    assert!(matches!(err, CatalogServiceError::IdCollision { .. }));
    assert_eq!(store.list().len(), 3);
    assert!(store.gateway().saves.is_empty());
}

#[test]
fn remove_unknown_id_is_noop_without_write() {
    let mut store = seeded_store();
    let before = store.list().to_vec();

    assert!(!store.remove("missing"));

    assert_eq!(store.list(), before.as_slice());
    assert!(store.gateway().saves.is_empty());
}

#[test]
fn remove_existing_id_saves_new_snapshot() {
    let mut store = seeded_store();
    assert!(store.remove("seed-2"));
    assert_eq!(store.list().len(), 2);
    assert!(store.find("seed-2").is_none());
    assert_eq!(store.gateway().saves, vec![store.list().to_vec()]);
}

#[test]
fn clear_on_empty_catalog_does_not_write() {
    let mut store = seeded_store();
    assert!(store.clear());
    assert!(!store.clear());
    assert!(store.list().is_empty());
    assert_eq!(store.gateway().saves.len(), 1);
}

#[test]
fn declined_confirmation_changes_nothing() {
    let mut store = seeded_store();
    let no = Answer::new(false);

    assert!(!store.remove_confirmed("seed-1", &no));
    assert!(!store.clear_confirmed(&no));

    assert_eq!(store.list(), seed_books().as_slice());
    assert!(store.gateway().saves.is_empty());
    assert_eq!(no.prompts.borrow().len(), 2);
}

#[test]
fn accepted_confirmation_performs_operation() {
    let mut store = seeded_store();
    let yes = Answer::new(true);

    assert!(store.remove_confirmed("seed-1", &yes));
    assert!(store.clear_confirmed(&yes));

    assert!(store.list().is_empty());
    assert_eq!(store.gateway().saves.len(), 2);
    assert!(yes.prompts.borrow()[0].contains("The Pragmatic Programmer"));
}

#[test]
fn confirmation_is_skipped_for_unknown_id_and_empty_catalog() {
    let mut store = seeded_store();
    store.clear();
    let asked = Cell::new(0);
    let counting = |_: &str| {
        asked.set(asked.get() + 1);
        true
    };

    assert!(!store.remove_confirmed("seed-1", &counting));
    assert!(!store.clear_confirmed(&counting));
    assert_eq!(asked.get(), 0);
}

#[test]
fn failed_save_keeps_in_memory_state_and_reports_error() {
    let gateway = RecordingGateway {
        fail_saves: Rc::new(Cell::new(true)),
        ..RecordingGateway::default()
    };
    let mut store = CatalogService::load(gateway, SequentialIdGenerator::new("b"));

    let book = store.add(&Draft::new("Dune")).unwrap();

    assert_eq!(store.list()[0], book);
    assert_eq!(store.list().len(), 4);
    let message = store.last_save_error().expect("save error should be recorded");
    assert!(message.contains("disk full"));
}

#[test]
fn successful_save_clears_previous_error() {
    let fail_saves = Rc::new(Cell::new(true));
    let gateway = RecordingGateway {
        fail_saves: Rc::clone(&fail_saves),
        ..RecordingGateway::default()
    };
    let mut store = CatalogService::load(gateway, SequentialIdGenerator::new("b"));
    store.add(&Draft::new("Dune")).unwrap();
    assert!(store.last_save_error().is_some());

    fail_saves.set(false);
    store.add(&Draft::new("Emma")).unwrap();
    assert!(store.last_save_error().is_none());
    assert_eq!(store.gateway().saves.len(), 1);
    assert_eq!(store.gateway().saves[0].len(), 5);
}

#[test]
fn seed_add_remove_clear_scenario() {
    let slots = InMemorySlotRepository::new();
    let mut store = CatalogService::load(
        SlotCatalogGateway::new(slots),
        SequentialIdGenerator::new("b"),
    );
    let original = store.list().to_vec();
    assert_eq!(original.len(), 3);

    let dune = store
        .add(
            &Draft::new("Dune")
                .with_author("Frank Herbert")
                .with_year(1965),
        )
        .unwrap();
    assert_eq!(store.list().len(), 4);
    assert_eq!(store.list()[0].title(), "Dune");

    assert!(store.remove(dune.id()));
    assert_eq!(store.list(), original.as_slice());

    let writes_before_clear = store.gateway().slots().write_count();
    assert!(store.clear());
    assert!(store.list().is_empty());
    assert_eq!(
        store.gateway().slots().write_count(),
        writes_before_clear + 1
    );
    assert_eq!(
        store
            .gateway()
            .slots()
            .get_slot(CATALOG_SLOT_KEY)
            .unwrap()
            .as_deref(),
        Some("[]")
    );
}
