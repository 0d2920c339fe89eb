use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of an asynchronous operation as observed by a caller polling a desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Response<T> {
    Loading,
    Success(T),
    Error(String),
}

impl<T> Response<T> {
    /// Collapse a fallible result, keeping only the error's message.
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Error(err.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// One [`Response`] per operation kind. Keys that were never started have no entry.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct OperationTracker<K: Ord> {
    states: BTreeMap<K, Response<()>>,
}

impl<K: Ord> Default for OperationTracker<K> {
    fn default() -> Self {
        Self {
            states: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> OperationTracker<K> {
    pub fn begin(&mut self, key: K) {
        self.states.insert(key, Response::Loading);
    }

    pub fn finish<E: fmt::Display>(&mut self, key: K, result: Result<(), E>) -> Response<()> {
        let response = Response::from_result(result);
        self.states.insert(key, response.clone());
        response
    }

    pub fn get(&self, key: K) -> Option<&Response<()>> {
        self.states.get(&key)
    }
}
