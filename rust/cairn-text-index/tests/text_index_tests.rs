use cairn_content::{Content, ContentTable};
use cairn_store::{ReadView, Store, StoreOptions};
use cairn_text_index::{TextIndex, TrivialTokenizer};

#[derive(Clone, Default, bincode::Encode, bincode::Decode)]
struct Comment {
    server_id: Option<String>,
    message: String,
}

impl Content for Comment {
    const PREFIX: &'static str = "cmt";

    fn server_id(&self) -> Option<&str> {
        self.server_id.as_deref()
    }
}

fn comment_table(store: &Store) -> ContentTable<Comment> {
    ContentTable::new(store).with_indexer(Box::new(TextIndex::new(|c: &Comment| &c.message)))
}

fn save_comment(store: &Store, table: &ContentTable<Comment>, message: &str) -> u64 {
    let mut txn = store.new_transaction();
    let handle = table.new_content(&mut txn);
    let mut lock = handle.lock();
    lock.update(|c| c.message = message.to_string());
    table.save_and_unlock(lock, &mut txn).unwrap();
    txn.commit();
    handle.local_id()
}

#[test]
fn test_search_finds_saved_comments() {
    let store = Store::open(StoreOptions { cache_size: 64 }).unwrap();
    let table = comment_table(&store);
    let index = TextIndex::<Comment>::new(|c| &c.message);

    let id1 = save_comment(&store, &table, "The quick brown fox");
    let id2 = save_comment(&store, &table, "a quick note");

    let mut hits = index.search(&store, "quick");
    hits.sort();
    assert_eq!(hits, vec![id1, id2]);
    assert_eq!(index.search(&store, "fox"), vec![id1]);
    assert_eq!(index.search(&store, "missing"), Vec::<u64>::new());

    // Matching is case-insensitive in both directions.
    assert_eq!(index.search(&store, "THE"), vec![id1]);
}

#[test]
fn test_edit_diffs_the_term_set() {
    let store = Store::open(StoreOptions { cache_size: 64 }).unwrap();
    let table = comment_table(&store);
    let index = TextIndex::<Comment>::new(|c| &c.message);

    let id = save_comment(&store, &table, "abc def");
    assert_eq!(index.search(&store, "abc"), vec![id]);
    assert_eq!(index.search(&store, "def"), vec![id]);

    let handle = table.load(id).unwrap();
    let mut txn = store.new_transaction();
    let mut lock = handle.lock();
    lock.update(|c| c.message = "jkl def".to_string());
    table.save_and_unlock(lock, &mut txn).unwrap();
    txn.commit();

    assert_eq!(index.search(&store, "abc"), Vec::<u64>::new());
    assert_eq!(index.search(&store, "def"), vec![id]);
    assert_eq!(index.search(&store, "jkl"), vec![id]);
}

#[test]
fn test_delete_removes_every_term_entry() {
    let store = Store::open(StoreOptions { cache_size: 64 }).unwrap();
    let table = comment_table(&store);
    let index = TextIndex::<Comment>::new(|c| &c.message);

    let id = save_comment(&store, &table, "soon to vanish");
    let handle = table.load(id).unwrap();

    let mut txn = store.new_transaction();
    let lock = handle.lock();
    table.delete_and_unlock(lock, &mut txn).unwrap();
    txn.commit();

    for term in ["soon", "to", "vanish"] {
        assert_eq!(index.search(&store, term), Vec::<u64>::new());
    }
}

#[test]
fn test_index_mutations_commit_with_the_record() {
    let store = Store::open(StoreOptions { cache_size: 64 }).unwrap();
    let table = comment_table(&store);
    let index = TextIndex::<Comment>::new(|c| &c.message);

    let mut txn = store.new_transaction();
    let handle = table.new_content(&mut txn);
    let mut lock = handle.lock();
    lock.update(|c| c.message = "pending words".to_string());
    table.save_and_unlock(lock, &mut txn).unwrap();

    // The open transaction sees its own index entries; the store does not.
    assert_eq!(index.search(&txn, "pending"), vec![handle.local_id()]);
    assert_eq!(index.search(&store, "pending"), Vec::<u64>::new());

    txn.abandon();
    assert_eq!(index.search(&store, "pending"), Vec::<u64>::new());
}

#[test]
fn test_exact_match_indexing_with_trivial_tokenizer() {
    let store = Store::open(StoreOptions { cache_size: 64 }).unwrap();
    let table = ContentTable::<Comment>::new(&store).with_indexer(Box::new(
        TextIndex::with_tokenizer(|c: &Comment| &c.message, TrivialTokenizer::new()),
    ));
    let index = TextIndex::with_tokenizer(|c: &Comment| &c.message, TrivialTokenizer::new());

    let id = save_comment(&store, &table, "Build 42-Final");

    // The whole field is one term; only the full (case-folded) value matches.
    assert_eq!(index.search(&store, "build 42-final"), vec![id]);
    assert_eq!(index.search(&store, "Build 42-Final"), vec![id]);
    assert_eq!(index.search(&store, "build"), Vec::<u64>::new());

    // A word index over the same store sees none of these entries, since the
    // trivial tokenizer wrote full-value terms only.
    let words = TextIndex::<Comment>::new(|c| &c.message);
    assert_eq!(words.search(&store, "build 42-final"), Vec::<u64>::new());
}

#[test]
fn test_shared_terms_across_records() {
    let store = Store::open(StoreOptions { cache_size: 64 }).unwrap();
    let table = comment_table(&store);
    let index = TextIndex::<Comment>::new(|c| &c.message);

    let id1 = save_comment(&store, &table, "shared term alpha");
    let id2 = save_comment(&store, &table, "shared term beta");

    let mut hits = index.search(&store, "shared");
    hits.sort();
    assert_eq!(hits, vec![id1, id2]);

    // Deleting one record leaves the other's entries intact.
    let handle = table.load(id1).unwrap();
    let mut txn = store.new_transaction();
    table.delete_and_unlock(handle.lock(), &mut txn).unwrap();
    txn.commit();

    assert_eq!(index.search(&store, "shared"), vec![id2]);
    assert_eq!(index.search(&store, "alpha"), Vec::<u64>::new());
}
