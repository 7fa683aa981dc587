use super::{BookFilter, BookStore, DeleteOutcome, StoreError, StoreResult, UpdateOutcome};
use crate::model::{Book, BookDocument};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

/// Book collection backed by MongoDB.
///
/// The client is connected once and shared by every request; the driver
/// manages its own connection pool.
pub struct MongoBookStore {
    client: Client,
    collection: Collection<BookDocument>,
}

impl MongoBookStore {
    pub async fn connect(
        uri: &str,
        database: &str,
        collection: &str,
        unique_isbn: bool,
    ) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        let collection = client.database(database).collection::<BookDocument>(collection);
        let store = Self { client, collection };

        if unique_isbn {
            store.ensure_unique_isbn().await?;
        }

        tracing::info!(database, collection = store.collection.name(), "Connected to MongoDB");
        Ok(store)
    }

    async fn ensure_unique_isbn(&self) -> StoreResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "isbn": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

fn filter_document(filter: &BookFilter) -> Document {
    match filter {
        BookFilter::All => doc! {},
        BookFilter::Isbn(isbn) => doc! { "isbn": isbn.as_str() },
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn write_error(err: mongodb::error::Error, isbn: &str) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::Duplicate(isbn.to_string())
    } else {
        StoreError::Mongo(err)
    }
}

#[async_trait]
impl BookStore for MongoBookStore {
    async fn find(&self, filter: &BookFilter) -> StoreResult<Vec<Book>> {
        let cursor = self.collection.find(filter_document(filter)).await?;
        let docs: Vec<BookDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Book::from).collect())
    }

    async fn insert_one(&self, book: Book) -> StoreResult<()> {
        let doc = BookDocument::from(book);
        self.collection
            .insert_one(&doc)
            .await
            .map_err(|err| write_error(err, &doc.isbn))?;
        Ok(())
    }

    async fn find_one(&self, filter: &BookFilter) -> StoreResult<Option<Book>> {
        let doc = self.collection.find_one(filter_document(filter)).await?;
        Ok(doc.map(Book::from))
    }

    async fn update_one(&self, filter: &BookFilter, book: Book) -> StoreResult<UpdateOutcome> {
        let fields = BookDocument::from(book);
        let filter = filter_document(filter);

        // The server rejects an empty `$set`; nothing to write, only report the match.
        if fields.is_empty() {
            let found = self.collection.find_one(filter).await?;
            return Ok(UpdateOutcome {
                matched: u64::from(found.is_some()),
                modified: 0,
            });
        }

        let set = mongodb::bson::to_document(&fields)
            .map_err(|err| StoreError::Codec(err.to_string()))?;
        let result = self
            .collection
            .update_one(filter, doc! { "$set": set })
            .await
            .map_err(|err| write_error(err, &fields.isbn))?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_one(&self, filter: &BookFilter) -> StoreResult<DeleteOutcome> {
        let result = self.collection.delete_one(filter_document(filter)).await?;
        Ok(DeleteOutcome {
            deleted: result.deleted_count,
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
    }

    fn name(&self) -> &'static str {
        "mongo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_translate_to_query_documents() {
        assert_eq!(filter_document(&BookFilter::All), doc! {});
        assert_eq!(
            filter_document(&BookFilter::isbn("123")),
            doc! { "isbn": "123" }
        );
    }

    #[test]
    fn set_document_skips_empty_fields() {
        let fields = BookDocument::from(Book::new("123").with_price("12"));
        let set = mongodb::bson::to_document(&fields).unwrap();
        assert_eq!(set, doc! { "isbn": "123", "price": "12" });
    }
}
