//! Execution context handed to ante steps and message handlers.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
};

use serde::{Deserialize, Serialize};
use tessel_store::{StateAccess, StoreKey, StoreResult};

/// Header of the block being executed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub chain_id: String,
    pub height: u64,

    /// Block time, seconds since the unix epoch.
    pub time: u64,
}

impl BlockHeader {
    /// Header used while processing genesis.
    pub fn genesis(chain_id: impl Into<String>, time: u64) -> Self {
        Self {
            chain_id: chain_id.into(),
            height: 0,
            time,
        }
    }
}

/// Structured event emitted during execution.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<(String, String)>,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Context for one transaction (or one genesis/oracle step).
///
/// Owns nothing durable: state goes through the borrowed cache view, values
/// injected by ante steps and events live as long as the context.
pub struct Context<'a> {
    state: &'a mut dyn StateAccess,
    header: &'a BlockHeader,
    values: HashMap<TypeId, Box<dyn Any>>,
    events: Vec<Event>,
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("header", &self.header)
            .field("values", &self.values.len())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl<'a> Context<'a> {
    pub fn new(state: &'a mut dyn StateAccess, header: &'a BlockHeader) -> Self {
        Self {
            state,
            header,
            values: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn header(&self) -> &BlockHeader {
        self.header
    }

    pub fn chain_id(&self) -> &str {
        &self.header.chain_id
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }

    pub fn is_genesis(&self) -> bool {
        self.header.height == 0
    }

    pub fn get(&self, store: &StoreKey, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.state.get(store, key)
    }

    pub fn has(&self, store: &StoreKey, key: &[u8]) -> StoreResult<bool> {
        self.state.has(store, key)
    }

    pub fn set(&mut self, store: &StoreKey, key: &[u8], value: Vec<u8>) -> StoreResult<()> {
        self.state.set(store, key, value)
    }

    pub fn delete(&mut self, store: &StoreKey, key: &[u8]) -> StoreResult<()> {
        self.state.delete(store, key)
    }

    /// Stores a typed value for later steps and handlers, replacing any
    /// previous value of the same type.
    pub fn insert_value<T: Any>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn value<T: Any>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    pub fn emit_event(&mut self, event: Event) {
        self.emit_events(std::iter::once(event));
    }

    pub fn emit_events(&mut self, iter: impl IntoIterator<Item = Event>) {
        self.events.extend(iter);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Takes the events emitted so far.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
