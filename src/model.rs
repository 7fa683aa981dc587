//! Book entity in its two shapes.
//!
//! [`Book`] is the wire shape: every key is always present in responses, and
//! request bodies may omit keys or send `null`. [`BookDocument`] is the stored
//! shape: empty fields are left out of the persisted document, so a `$set`
//! built from it only touches the fields the caller actually supplied.

use serde::{Deserialize, Deserializer, Serialize};

/// A book as exchanged over HTTP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Addressing key. Not enforced unique unless the store is configured so.
    #[serde(default, deserialize_with = "null_as_default")]
    pub isbn: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,

    /// Kept as a string; no numeric validation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: String,
}

impl Book {
    pub fn new(isbn: impl Into<String>) -> Self {
        Self {
            isbn: isbn.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = price.into();
        self
    }
}

/// A book as persisted in the document store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDocument {
    #[serde(
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub isbn: String,

    #[serde(
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub title: String,

    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub authors: Vec<String>,

    #[serde(
        default,
        skip_serializing_if = "String::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub price: String,
}

impl BookDocument {
    /// True when no field would be written to the store.
    pub fn is_empty(&self) -> bool {
        self.isbn.is_empty()
            && self.title.is_empty()
            && self.authors.is_empty()
            && self.price.is_empty()
    }

    /// Overwrite every non-empty field of `fields` onto `self`.
    ///
    /// Mirrors a `$set` of the serialized `fields`: empty values are absent
    /// from the stored shape and therefore leave the target untouched.
    pub fn apply(&mut self, fields: &BookDocument) {
        if !fields.isbn.is_empty() {
            self.isbn.clone_from(&fields.isbn);
        }
        if !fields.title.is_empty() {
            self.title.clone_from(&fields.title);
        }
        if !fields.authors.is_empty() {
            self.authors.clone_from(&fields.authors);
        }
        if !fields.price.is_empty() {
            self.price.clone_from(&fields.price);
        }
    }
}

impl From<Book> for BookDocument {
    fn from(book: Book) -> Self {
        Self {
            isbn: book.isbn,
            title: book.title,
            authors: book.authors,
            price: book.price,
        }
    }
}

impl From<BookDocument> for Book {
    fn from(doc: BookDocument) -> Self {
        Self {
            isbn: doc.isbn,
            title: doc.title,
            authors: doc.authors,
            price: doc.price,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape_always_carries_every_key() {
        let value = serde_json::to_value(Book::new("123")).unwrap();
        assert_eq!(
            value,
            json!({"isbn": "123", "title": "", "authors": [], "price": ""})
        );
    }

    #[test]
    fn stored_shape_omits_empty_fields() {
        let doc = BookDocument::from(Book::new("123").with_title("Go"));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value, json!({"isbn": "123", "title": "Go"}));
    }

    #[test]
    fn missing_and_null_fields_decode_to_empty() {
        let book: Book =
            serde_json::from_value(json!({"isbn": "9", "authors": null, "extra": 1})).unwrap();
        assert_eq!(book, Book::new("9"));
    }

    #[test]
    fn apply_sets_only_non_empty_fields() {
        let mut stored = BookDocument::from(
            Book::new("1")
                .with_title("Old")
                .with_authors(["A"])
                .with_price("10"),
        );
        let fields = BookDocument::from(Book::default().with_title("New").with_price("12"));

        stored.apply(&fields);

        assert_eq!(stored.isbn, "1");
        assert_eq!(stored.title, "New");
        assert_eq!(stored.authors, vec!["A".to_string()]);
        assert_eq!(stored.price, "12");
    }

    #[test]
    fn empty_document_is_detected() {
        assert!(BookDocument::default().is_empty());
        assert!(!BookDocument::from(Book::default().with_price("1")).is_empty());
    }
}
