//! Bounded execution ledger with acceptance id indices.
//!
//! Executions are kept in arrival order and additionally indexed by the buy
//! and sell child order acceptance ids. Eviction is FIFO; an evicted
//! execution is removed from its index lists individually so other retained
//! executions under the same id stay reachable.

use crate::MAX_LIMIT_LEN;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Execution record as published by the exchange.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Execution {
    /// Exchange execution id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Taker side, `BUY` or `SELL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    /// Execution price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Execution size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Decimal>,
    /// Execution time (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_date: Option<String>,
    /// Acceptance id of the buy-side child order.
    #[serde(
        rename = "buy_child_order_acceptance_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub buy_acceptance_id: Option<String>,
    /// Acceptance id of the sell-side child order.
    #[serde(
        rename = "sell_child_order_acceptance_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sell_acceptance_id: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Execution {
    /// Returns the buy acceptance id if present and non-empty.
    #[must_use]
    pub fn buy_id(&self) -> Option<&str> {
        non_empty(self.buy_acceptance_id.as_deref())
    }

    /// Returns the sell acceptance id if present and non-empty.
    #[must_use]
    pub fn sell_id(&self) -> Option<&str> {
        non_empty(self.sell_acceptance_id.as_deref())
    }

    /// Parses the execution time.
    #[must_use]
    pub fn exec_time(&self) -> Option<DateTime<Utc>> {
        self.exec_date
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}

fn non_empty(id: Option<&str>) -> Option<&str> {
    id.filter(|id| !id.is_empty())
}

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    execution: Arc<Execution>,
}

type Index = HashMap<String, VecDeque<Entry>>;

/// FIFO execution store with buy/sell acceptance id indices.
#[derive(Debug)]
pub struct ExecutionLedger {
    entries: VecDeque<Entry>,
    buy_index: Index,
    sell_index: Index,
    capacity: usize,
    next_seq: u64,
}

impl ExecutionLedger {
    /// Creates a ledger holding at most [`MAX_LIMIT_LEN`] executions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_LIMIT_LEN)
    }

    /// Creates a ledger holding at most `capacity` executions.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            buy_index: HashMap::new(),
            sell_index: HashMap::new(),
            capacity,
            next_seq: 0,
        }
    }

    /// Appends a batch in order and indexes each execution by its ids.
    ///
    /// Does not evict; call [`Self::evict_to_capacity`] afterwards.
    /// Returns the number of executions appended.
    pub fn append_batch(&mut self, executions: impl IntoIterator<Item = Execution>) -> usize {
        let mut appended = 0;
        for execution in executions {
            let entry = Entry {
                seq: self.next_seq,
                execution: Arc::new(execution),
            };
            self.next_seq += 1;

            if let Some(id) = entry.execution.buy_id() {
                self.buy_index
                    .entry(id.to_string())
                    .or_default()
                    .push_back(entry.clone());
            }
            if let Some(id) = entry.execution.sell_id() {
                self.sell_index
                    .entry(id.to_string())
                    .or_default()
                    .push_back(entry.clone());
            }
            self.entries.push_back(entry);
            appended += 1;
        }
        appended
    }

    /// Drops the oldest executions until the ledger fits its capacity.
    ///
    /// Returns the number of executions evicted.
    pub fn evict_to_capacity(&mut self) -> usize {
        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.entries.pop_front() else {
                break;
            };
            unindex(&mut self.buy_index, oldest.execution.buy_id(), oldest.seq);
            unindex(&mut self.sell_index, oldest.execution.sell_id(), oldest.seq);
            evicted += 1;
        }
        evicted
    }

    /// Looks up executions by acceptance id.
    ///
    /// `None` or an empty id returns every retained execution. Otherwise the
    /// buy-side list wins over the sell-side list; unknown ids yield an
    /// empty vector.
    #[must_use]
    pub fn executions_for(&self, acceptance_id: Option<&str>) -> Vec<Arc<Execution>> {
        let Some(id) = non_empty(acceptance_id) else {
            return collect(&self.entries);
        };
        self.buy_index
            .get(id)
            .or_else(|| self.sell_index.get(id))
            .map(collect)
            .unwrap_or_default()
    }

    /// Returns the most recent execution.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<Execution>> {
        self.entries.back().map(|e| Arc::clone(&e.execution))
    }

    /// Returns the capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of retained executions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no execution is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every execution and both indices.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.buy_index.clear();
        self.sell_index.clear();
    }
}

impl Default for ExecutionLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn collect(entries: &VecDeque<Entry>) -> Vec<Arc<Execution>> {
    entries.iter().map(|e| Arc::clone(&e.execution)).collect()
}

/// Removes the entry `seq` from the list under `id`, dropping the list once empty.
fn unindex(index: &mut Index, id: Option<&str>, seq: u64) {
    let Some(id) = id else {
        return;
    };
    let Some(list) = index.get_mut(id) else {
        return;
    };

    // Lists are in append order, so the globally oldest entry is normally first.
    if list.front().is_some_and(|e| e.seq == seq) {
        list.pop_front();
    } else if let Some(pos) = list.iter().position(|e| e.seq == seq) {
        list.remove(pos);
    }

    if list.is_empty() {
        index.remove(id);
    }
}
