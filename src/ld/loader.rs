// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::collections::HashMap;

use serde_json::Value;

use crate::errors::Error;

/// A document returned by a [`DocumentLoader`].
#[derive(Clone, PartialEq, Debug)]
pub struct RemoteDocument {
    pub document_url: String,
    pub document: Value,
}

/// Resolves contexts, key documents and controller documents by URL.
///
/// Implementations must return [`Error::ContextNotFound`] for unknown URLs.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, url: &str) -> Result<RemoteDocument, Error>;
}

/// In-memory [`DocumentLoader`] over an injected `url -> document` map.
#[derive(Clone, Default, Debug)]
pub struct StaticDocumentLoader {
    documents: HashMap<String, Value>,
}

impl StaticDocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, document: Value) -> Self {
        self.insert(url, document);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, document: Value) {
        self.documents.insert(url.into(), document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl<U: Into<String>> FromIterator<(U, Value)> for StaticDocumentLoader {
    fn from_iter<T: IntoIterator<Item = (U, Value)>>(iter: T) -> Self {
        Self {
            documents: iter.into_iter().map(|(u, d)| (u.into(), d)).collect(),
        }
    }
}

impl DocumentLoader for StaticDocumentLoader {
    fn load(&self, url: &str) -> Result<RemoteDocument, Error> {
        match self.documents.get(url) {
            Some(document) => Ok(RemoteDocument {
                document_url: url.to_owned(),
                document: document.clone(),
            }),
            None => {
                log::debug!("no document registered for {}", url);
                Err(Error::ContextNotFound(url.to_owned()))
            }
        }
    }
}
