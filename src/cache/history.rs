//! Call History Module
//!
//! Reads back what the instrumentation hooks recorded and prints it.

use std::io::Write;

use serde::Serialize;

use crate::cache::{inputs_key, outputs_key, Instrumented};
use crate::error::Result;
use crate::store::KeyValueStore;

// == Call Record ==
/// One logged call: the argument tuple text and the output text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub inputs: String,
    pub output: String,
}

// == Bound Operation ==
/// An instrumented operation together with the store its records live in.
///
/// Only a [`Cache`](crate::cache::Cache) hands these out, so anything
/// reaching [`replay`] is bound to a cache wrapper.
#[derive(Clone, Copy)]
pub struct BoundOperation<'a> {
    operation: &'a Instrumented,
    store: &'a dyn KeyValueStore,
}

impl<'a> BoundOperation<'a> {
    pub(crate) fn new(operation: &'a Instrumented, store: &'a dyn KeyValueStore) -> Self {
        Self { operation, store }
    }

    /// Qualified operation name.
    pub fn name(&self) -> &str {
        self.operation.name()
    }

    /// Whether calls to this operation are logged.
    pub fn records_history(&self) -> bool {
        self.operation.records_history()
    }

    /// Value of the persistent call counter, 0 if never called.
    pub async fn call_count(&self) -> Result<i64> {
        match self.store.get(self.name()).await? {
            Some(bytes) => crate::cache::decode_int(bytes),
            None => Ok(0),
        }
    }

    /// Raw input log, in call order.
    pub async fn inputs(&self) -> Result<Vec<String>> {
        self.read_log(&inputs_key(self.name())).await
    }

    /// Logged calls paired in order; an input without output is dropped.
    pub async fn history(&self) -> Result<Vec<CallRecord>> {
        let (inputs, outputs) = self.logs().await?;
        Ok(pair_calls(inputs, outputs))
    }

    /// Reads the input and output logs once each.
    async fn logs(&self) -> Result<(Vec<String>, Vec<String>)> {
        let inputs = self.inputs().await?;
        let outputs = self.read_log(&outputs_key(self.name())).await?;
        Ok((inputs, outputs))
    }

    async fn read_log(&self, key: &str) -> Result<Vec<String>> {
        let items = self.store.lrange(key, 0, -1).await?;
        Ok(items
            .into_iter()
            .map(|item| String::from_utf8_lossy(&item).into_owned())
            .collect())
    }
}

impl std::fmt::Debug for BoundOperation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundOperation")
            .field("operation", self.operation)
            .finish_non_exhaustive()
    }
}

fn pair_calls(inputs: Vec<String>, outputs: Vec<String>) -> Vec<CallRecord> {
    inputs
        .into_iter()
        .zip(outputs)
        .map(|(inputs, output)| CallRecord { inputs, output })
        .collect()
}

// == Replay ==
/// Prints the call history of `op` to `out`.
///
/// Writes `"<name> was called <n> times:"` followed by one
/// `"<name>(*<inputs>) -> <output>"` line per logged call. Operations that
/// keep no history produce no output.
///
/// The header count and the listed calls come from the same read of the
/// logs, so they agree even while other clients keep storing.
///
/// # Arguments
/// * `op` - Handle obtained from [`Cache::store_operation`](crate::cache::Cache::store_operation)
/// * `out` - Destination for the report, usually stdout
///
/// # Returns
/// - `Ok(())` once every line is written
/// - `Err` if the store cannot be read or `out` fails
pub async fn replay<W: Write>(op: &BoundOperation<'_>, out: &mut W) -> Result<()> {
    if !op.records_history() {
        return Ok(());
    }

    let (inputs, outputs) = op.logs().await?;
    let calls = inputs.len();
    let history = pair_calls(inputs, outputs);

    writeln!(out, "{} was called {} times:", op.name(), calls)?;
    for record in &history {
        writeln!(out, "{}(*{}) -> {}", op.name(), record.inputs, record.output)?;
    }
    Ok(())
}
