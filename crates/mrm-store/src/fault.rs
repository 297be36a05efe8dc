//! Fault injection for exercising partial-failure windows.
//!
//! [`FaultyKvStore`] wraps any [`KvStore`] and fails a chosen operation once
//! its trigger condition is met, the way a crash or outage would interrupt a
//! multi-write workflow between two writes.

use std::sync::Mutex;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::KvStore;

/// Store operation a [`Fault`] applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultOp {
    Get,
    Put,
    Delete,
}

impl std::fmt::Display for FaultOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Put => write!(f, "put"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Describes when an injected failure fires.
///
/// A fault matches calls of one operation, optionally restricted to one key.
/// The first `skip` matching calls succeed; every matching call after that
/// fails until the fault is disarmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    pub op: FaultOp,
    pub key: Option<String>,
    pub skip: usize,
}

impl Fault {
    /// Fail every call of `op`.
    pub fn on(op: FaultOp) -> Self {
        Self {
            op,
            key: None,
            skip: 0,
        }
    }

    /// Only match calls for `key`.
    pub fn for_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Let the first `n` matching calls through.
    pub fn after(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    fn matches(&self, op: FaultOp, key: &str) -> bool {
        self.op == op && self.key.as_deref().map_or(true, |k| k == key)
    }
}

#[derive(Debug, Default)]
struct FaultState {
    fault: Option<Fault>,
    seen: usize,
    tripped: usize,
}

/// A [`KvStore`] wrapper that fails on demand.
pub struct FaultyKvStore<S> {
    inner: S,
    state: Mutex<FaultState>,
}

impl<S: KvStore> FaultyKvStore<S> {
    /// Wrap `inner` with no fault armed.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            state: Mutex::new(FaultState::default()),
        }
    }

    /// Arm `fault`, replacing any previous one and resetting counters.
    pub fn arm(&self, fault: Fault) {
        let mut state = self.state.lock().expect("lock poisoned");
        *state = FaultState {
            fault: Some(fault),
            ..FaultState::default()
        };
    }

    /// Remove the armed fault. Subsequent calls pass through.
    pub fn disarm(&self) {
        self.state.lock().expect("lock poisoned").fault = None;
    }

    /// How many calls have failed since the fault was armed.
    pub fn tripped(&self) -> usize {
        self.state.lock().expect("lock poisoned").tripped
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check(&self, op: FaultOp, key: &str) -> StoreResult<()> {
        let mut state = self.state.lock().expect("lock poisoned");
        let Some(fault) = state.fault.as_ref() else {
            return Ok(());
        };
        if !fault.matches(op, key) {
            return Ok(());
        }
        let skip = fault.skip;
        state.seen += 1;
        if state.seen <= skip {
            return Ok(());
        }
        state.tripped += 1;
        debug!(%op, key, "injecting store failure");
        Err(StoreError::Injected {
            op: op.to_string(),
            key: key.to_string(),
        })
    }
}

impl<S: KvStore> KvStore for FaultyKvStore<S> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.check(FaultOp::Get, key)?;
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.check(FaultOp::Put, key)?;
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.check(FaultOp::Delete, key)?;
        self.inner.delete(key)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        self.inner.keys()
    }
}

impl<S> std::fmt::Debug for FaultyKvStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().expect("lock poisoned");
        f.debug_struct("FaultyKvStore")
            .field("fault", &state.fault)
            .field("tripped", &state.tripped)
            .finish()
    }
}
