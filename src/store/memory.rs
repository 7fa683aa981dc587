use super::{BookFilter, BookStore, DeleteOutcome, StoreError, StoreResult, UpdateOutcome};
use crate::model::{Book, BookDocument};
use async_trait::async_trait;
use std::sync::RwLock;

/// An in-memory store using a `RwLock` around a `Vec`.
///
/// Documents keep insertion order and, like an unindexed collection,
/// duplicates are accepted unless built with [`MemoryBookStore::with_unique_isbn`].
#[derive(Default)]
pub struct MemoryBookStore {
    documents: RwLock<Vec<BookDocument>>,
    unique_isbn: bool,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unique_isbn() -> Self {
        Self {
            unique_isbn: true,
            ..Self::default()
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::backend("poisoned lock")
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find(&self, filter: &BookFilter) -> StoreResult<Vec<Book>> {
        let docs = self.documents.read().map_err(poisoned)?;
        Ok(docs
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .map(Book::from)
            .collect())
    }

    async fn insert_one(&self, book: Book) -> StoreResult<()> {
        let mut docs = self.documents.write().map_err(poisoned)?;
        if self.unique_isbn && docs.iter().any(|doc| doc.isbn == book.isbn) {
            return Err(StoreError::Duplicate(book.isbn));
        }
        docs.push(BookDocument::from(book));
        Ok(())
    }

    async fn find_one(&self, filter: &BookFilter) -> StoreResult<Option<Book>> {
        let docs = self.documents.read().map_err(poisoned)?;
        Ok(docs
            .iter()
            .find(|doc| filter.matches(doc))
            .cloned()
            .map(Book::from))
    }

    async fn update_one(&self, filter: &BookFilter, book: Book) -> StoreResult<UpdateOutcome> {
        let fields = BookDocument::from(book);
        let mut docs = self.documents.write().map_err(poisoned)?;

        let Some(position) = docs.iter().position(|doc| filter.matches(doc)) else {
            return Ok(UpdateOutcome::default());
        };

        if self.unique_isbn
            && !fields.isbn.is_empty()
            && docs
                .iter()
                .enumerate()
                .any(|(i, doc)| i != position && doc.isbn == fields.isbn)
        {
            return Err(StoreError::Duplicate(fields.isbn));
        }

        let target = &mut docs[position];
        let before = target.clone();
        target.apply(&fields);

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(*target != before),
        })
    }

    async fn delete_one(&self, filter: &BookFilter) -> StoreResult<DeleteOutcome> {
        let mut docs = self.documents.write().map_err(poisoned)?;
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(position) => {
                docs.remove(position);
                Ok(DeleteOutcome { deleted: 1 })
            }
            None => Ok(DeleteOutcome::default()),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        let _guard = self.documents.read().map_err(poisoned)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(isbn: &str) -> Book {
        Book::new(isbn)
            .with_title("Go")
            .with_authors(["A"])
            .with_price("10")
    }

    #[tokio::test]
    async fn accepts_duplicate_isbn_by_default() {
        let store = MemoryBookStore::new();
        store.insert_one(sample("1")).await.unwrap();
        store.insert_one(sample("1")).await.unwrap();

        assert_eq!(store.len(), 2);
        let found = store.find(&BookFilter::isbn("1")).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn unique_mode_rejects_duplicate_isbn() {
        let store = MemoryBookStore::with_unique_isbn();
        store.insert_one(sample("1")).await.unwrap();

        let err = store.insert_one(sample("1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(isbn) if isbn == "1"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_reports_miss_without_inserting() {
        let store = MemoryBookStore::new();
        let outcome = store
            .update_one(&BookFilter::isbn("missing"), sample("missing"))
            .await
            .unwrap();

        assert_eq!(outcome.matched, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn update_touches_only_first_match() {
        let store = MemoryBookStore::new();
        store.insert_one(sample("1")).await.unwrap();
        store.insert_one(sample("1")).await.unwrap();

        let outcome = store
            .update_one(&BookFilter::isbn("1"), Book::default().with_title("Changed"))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });

        let titles: Vec<String> = store
            .find(&BookFilter::All)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Changed".to_string(), "Go".to_string()]);
    }

    #[tokio::test]
    async fn identical_update_matches_without_modifying() {
        let store = MemoryBookStore::new();
        store.insert_one(sample("1")).await.unwrap();

        let outcome = store
            .update_one(&BookFilter::isbn("1"), sample("1"))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 0 });
    }

    #[tokio::test]
    async fn ping_reports_poisoned_lock() {
        let store = std::sync::Arc::new(MemoryBookStore::new());
        assert!(store.ping().await.is_ok());

        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.documents.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.ping().await, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn delete_removes_at_most_one() {
        let store = MemoryBookStore::new();
        store.insert_one(sample("1")).await.unwrap();
        store.insert_one(sample("1")).await.unwrap();

        let outcome = store.delete_one(&BookFilter::isbn("1")).await.unwrap();
        assert_eq!(outcome.deleted, 1);
        assert_eq!(store.len(), 1);

        let outcome = store.delete_one(&BookFilter::isbn("2")).await.unwrap();
        assert_eq!(outcome.deleted, 0);
    }
}
