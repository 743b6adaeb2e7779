use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A stored document, addressable by id.
pub trait Document: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> &str;
}

impl Document for crate::model::Bootcamp {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for crate::model::Course {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for crate::model::Review {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for crate::model::User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// One id-keyed collection of documents.
#[derive(Debug, Default)]
pub struct Collection<T: Document> {
    docs: DashMap<String, T>,
}

impl<T: Document> Collection<T> {
    pub fn get(&self, id: &str) -> Option<T> {
        self.docs.get(id).map(|doc| doc.value().clone())
    }

    pub fn insert(&self, doc: T) {
        self.docs.insert(doc.id().to_string(), doc);
    }

    pub fn remove(&self, id: &str) -> Option<T> {
        self.docs.remove(id).map(|(_, doc)| doc)
    }

    pub fn find<F: Fn(&T) -> bool>(&self, pred: F) -> Vec<T> {
        self.docs
            .iter()
            .filter(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn all(&self) -> Vec<T> {
        self.docs.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn clear(&self) {
        self.docs.clear();
    }

    pub fn load(&self, docs: Vec<T>) {
        self.docs.clear();
        for doc in docs {
            self.insert(doc);
        }
    }
}
