//! Typed repository over a `DocumentStore`
//!
//! Every write is a load-modify-save of one collection, so writes to the
//! same collection are serialized through a lock shared by all repositories
//! handed out by the same `Storage`. Rules that span two collections take a
//! named relation lock first, then the collection locks.

use crate::core::traits::{Document, DocumentStore};
use crate::utils::error::{AppError, AppResult};
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

/// Entry point to persistence: owns the store and the per-collection write locks
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn DocumentStore>,
    locks: Arc<StdMutex<HashMap<&'static str, Arc<Mutex<()>>>>>,
}

impl Storage {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            locks: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    pub async fn ensure_ready(&self) -> AppResult<()> {
        self.store.ensure_ready().await
    }

    fn lock_for(&self, key: &'static str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(key).or_default().clone()
    }

    /// Repository for one document type; all repositories of the same type share a write lock
    pub fn repo<T: Document>(&self) -> Repository<T> {
        Repository {
            store: self.store.clone(),
            write_lock: self.lock_for(T::COLLECTION),
            _marker: PhantomData,
        }
    }

    /// Lock for a rule spanning collections. Acquire it before any repository
    /// write and never while a collection write is in progress.
    pub fn relation_lock(&self, relation: &'static str) -> Arc<Mutex<()>> {
        self.lock_for(relation)
    }
}

pub struct Repository<T: Document> {
    store: Arc<dyn DocumentStore>,
    write_lock: Arc<Mutex<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            write_lock: self.write_lock.clone(),
            _marker: PhantomData,
        }
    }
}

/// Decode documents, remembering their position in the raw collection.
/// Undecodable documents are skipped here but left untouched on save.
fn decode_indexed<T: Document>(raw: &[Value]) -> Vec<(usize, T)> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value.clone()) {
            Ok(doc) => Some((index, doc)),
            Err(e) => {
                tracing::warn!(collection = T::COLLECTION, index, error = %e, "skipping malformed document");
                None
            }
        })
        .collect()
}

impl<T: Document> Repository<T> {
    pub async fn list(&self) -> AppResult<Vec<T>> {
        let raw = self.store.load(T::COLLECTION).await?;
        Ok(decode_indexed::<T>(&raw).into_iter().map(|(_, doc)| doc).collect())
    }

    /// Documents visible to anonymous readers
    pub async fn list_listed(&self) -> AppResult<Vec<T>> {
        Ok(self.list().await?.into_iter().filter(|d| d.is_listed()).collect())
    }

    pub async fn count(&self) -> AppResult<usize> {
        Ok(self.list().await?.len())
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<T>> {
        Ok(self.list().await?.into_iter().find(|d| d.id() == id))
    }

    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<T>> {
        Ok(self.list().await?.into_iter().find(|d| d.slug() == slug))
    }

    /// Find by ID first, then by slug
    pub async fn find_by_id_or_slug(&self, key: &str) -> AppResult<Option<T>> {
        let docs = self.list().await?;
        if let Some(pos) = docs.iter().position(|d| d.id() == key) {
            return Ok(docs.into_iter().nth(pos));
        }
        Ok(docs.into_iter().find(|d| d.slug() == key))
    }

    pub async fn slug_exists(&self, slug: &str) -> AppResult<bool> {
        Ok(self.find_by_slug(slug).await?.is_some())
    }

    /// Insert a new document, rejecting duplicate IDs and slugs
    pub async fn insert(&self, doc: T) -> AppResult<T> {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.store.load(T::COLLECTION).await?;
        let existing = decode_indexed::<T>(&raw);

        if existing.iter().any(|(_, d)| d.id() == doc.id()) {
            return Err(AppError::Conflict(format!("{} with id '{}' already exists", T::LABEL, doc.id())));
        }
        if existing.iter().any(|(_, d)| d.slug() == doc.slug()) {
            return Err(AppError::Conflict(format!("{} slug '{}' is already in use", T::LABEL, doc.slug())));
        }

        raw.push(serde_json::to_value(&doc)?);
        self.store.save(T::COLLECTION, &raw).await?;
        Ok(doc)
    }

    /// Apply `change` to the document with `id` and persist it, all under the write lock
    pub async fn update<F>(&self, id: &str, change: F) -> AppResult<T>
    where
        F: FnOnce(&mut T) -> AppResult<()>,
    {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.store.load(T::COLLECTION).await?;
        let existing = decode_indexed::<T>(&raw);

        let (index, mut doc) = existing
            .iter()
            .find(|(_, d)| d.id() == id)
            .cloned()
            .ok_or_else(|| AppError::not_found(T::LABEL, id))?;

        change(&mut doc)?;

        if doc.id() != id {
            return Err(AppError::Validation("Document id cannot be changed".to_string()));
        }
        if existing.iter().any(|(i, d)| *i != index && d.slug() == doc.slug()) {
            return Err(AppError::Conflict(format!("{} slug '{}' is already in use", T::LABEL, doc.slug())));
        }

        raw[index] = serde_json::to_value(&doc)?;
        self.store.save(T::COLLECTION, &raw).await?;
        Ok(doc)
    }

    /// Replace the stored document that has the same ID
    pub async fn replace(&self, doc: T) -> AppResult<T> {
        let id = doc.id().to_string();
        self.update(&id, move |current| {
            *current = doc;
            Ok(())
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> AppResult<T> {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.store.load(T::COLLECTION).await?;
        let (index, doc) = decode_indexed::<T>(&raw)
            .into_iter()
            .find(|(_, d)| d.id() == id)
            .ok_or_else(|| AppError::not_found(T::LABEL, id))?;

        raw.remove(index);
        self.store.save(T::COLLECTION, &raw).await?;
        Ok(doc)
    }

    /// Insert or overwrite by ID; returns (inserted, replaced) counts
    pub async fn upsert_many(&self, docs: Vec<T>) -> AppResult<(usize, usize)> {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.store.load(T::COLLECTION).await?;
        let mut inserted = 0;
        let mut replaced = 0;

        for doc in docs {
            let existing = decode_indexed::<T>(&raw);
            if existing.iter().any(|(_, d)| d.slug() == doc.slug() && d.id() != doc.id()) {
                return Err(AppError::Conflict(format!("{} slug '{}' is already in use", T::LABEL, doc.slug())));
            }
            let value = serde_json::to_value(&doc)?;
            match existing.iter().find(|(_, d)| d.id() == doc.id()) {
                Some((index, _)) => {
                    raw[*index] = value;
                    replaced += 1;
                }
                None => {
                    raw.push(value);
                    inserted += 1;
                }
            }
        }

        self.store.save(T::COLLECTION, &raw).await?;
        Ok((inserted, replaced))
    }
}
