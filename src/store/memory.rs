use tokio::sync::RwLock;

use super::{BookStore, DeleteAll, StoreResult};
use crate::model::{BookId, BookRecord, BookSummary};

/// Keeps every record in a vector guarded by an async lock. Insertion order is list order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    books: RwLock<Vec<BookRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }
}

#[async_trait::async_trait]
impl BookStore for MemoryStore {
    async fn insert(&self, title: &str) -> StoreResult<BookRecord> {
        let book = BookRecord::new(BookId::generate(), title);
        self.books.write().await.push(book.clone());
        Ok(book)
    }

    async fn find_all(&self) -> StoreResult<Vec<BookSummary>> {
        let books = self.books.read().await;
        Ok(books.iter().map(BookRecord::summary).collect())
    }

    async fn find_by_id(&self, id: &BookId) -> StoreResult<Option<BookRecord>> {
        let books = self.books.read().await;
        Ok(books.iter().find(|b| &b.id == id).cloned())
    }

    async fn save(&self, book: &BookRecord) -> StoreResult<Option<BookRecord>> {
        let mut books = self.books.write().await;
        match books.iter_mut().find(|b| b.id == book.id) {
            Some(existing) => {
                *existing = book.clone();
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: &BookId) -> StoreResult<Option<BookRecord>> {
        let mut books = self.books.write().await;
        let removed = books
            .iter()
            .position(|b| &b.id == id)
            .map(|index| books.remove(index));
        Ok(removed)
    }

    async fn delete_all(&self) -> StoreResult<DeleteAll> {
        let mut books = self.books.write().await;
        let deleted = books.len() as u64;
        books.clear();
        Ok(DeleteAll {
            acknowledged: true,
            deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_then_find() {
        let store = MemoryStore::new();
        let book = store.insert("Solaris").await.unwrap();

        assert_eq!(book.comment_count, 0);
        assert!(book.comments.is_empty());
        assert_eq!(store.find_by_id(&book.id).await.unwrap(), Some(book));
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        let store = MemoryStore::new();
        store.insert("one").await.unwrap();
        store.insert("two").await.unwrap();
        store.insert("three").await.unwrap();

        let titles: Vec<_> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_save_is_last_write_wins() {
        let store = MemoryStore::new();
        let book = store.insert("Solaris").await.unwrap();

        let mut first = book.clone();
        first.push_comment("from first");
        let mut second = book.clone();
        second.push_comment("from second");

        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        let stored = store.find_by_id(&book.id).await.unwrap().unwrap();
        assert_eq!(stored.comments, vec!["from second"]);
        assert_eq!(stored.comment_count, 1);
    }

    #[tokio::test]
    async fn test_save_of_removed_book_returns_none() {
        let store = MemoryStore::new();
        let book = store.insert("Solaris").await.unwrap();
        store.delete_by_id(&book.id).await.unwrap();

        assert_eq!(store.save(&book).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_by_id_removes_once() {
        let store = MemoryStore::new();
        let book = store.insert("Solaris").await.unwrap();

        assert_eq!(store.delete_by_id(&book.id).await.unwrap(), Some(book.clone()));
        assert_eq!(store.delete_by_id(&book.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_all_is_acknowledged_when_empty() {
        let store = MemoryStore::new();
        let result = store.delete_all().await.unwrap();
        assert!(result.acknowledged);
        assert_eq!(result.deleted, 0);

        store.insert("a").await.unwrap();
        store.insert("b").await.unwrap();
        assert_eq!(store.delete_all().await.unwrap().deleted, 2);
        assert_eq!(store.len().await, 0);
    }
}
