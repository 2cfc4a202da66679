//! Call Instrumentation Module
//!
//! Before/after hooks composed around an operation: a persistent call
//! counter and an append-only input/output history, both kept in the
//! key-value store under the operation's qualified name.

use std::fmt::Display;
use std::future::Future;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::store::KeyValueStore;

/// Store key of the input log for `name`.
pub fn inputs_key(name: &str) -> String {
    format!("{}:inputs", name)
}

/// Store key of the output log for `name`.
pub fn outputs_key(name: &str) -> String {
    format!("{}:outputs", name)
}

// == Call Hook ==
/// Side effects run around every invocation of an instrumented operation.
#[async_trait]
pub trait CallHook: Send + Sync {
    /// Runs before the operation with the text form of its arguments.
    async fn before(&self, store: &dyn KeyValueStore, name: &str, args: &str) -> Result<()>;

    /// Runs after the operation succeeds with the text form of its output.
    async fn after(&self, store: &dyn KeyValueStore, name: &str, output: &str) -> Result<()>;

    /// Whether this hook keeps an input/output log.
    fn records_history(&self) -> bool {
        false
    }
}

// == Count Calls ==
/// Increments the counter stored under the operation name.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountCalls;

#[async_trait]
impl CallHook for CountCalls {
    async fn before(&self, store: &dyn KeyValueStore, name: &str, _args: &str) -> Result<()> {
        store.incr(name).await?;
        Ok(())
    }

    async fn after(&self, _store: &dyn KeyValueStore, _name: &str, _output: &str) -> Result<()> {
        Ok(())
    }
}

// == Call History ==
/// Appends arguments and outputs to the `<name>:inputs` / `<name>:outputs` lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallHistory;

#[async_trait]
impl CallHook for CallHistory {
    async fn before(&self, store: &dyn KeyValueStore, name: &str, args: &str) -> Result<()> {
        store.rpush(&inputs_key(name), args.as_bytes()).await?;
        Ok(())
    }

    async fn after(&self, store: &dyn KeyValueStore, name: &str, output: &str) -> Result<()> {
        store.rpush(&outputs_key(name), output.as_bytes()).await?;
        Ok(())
    }

    fn records_history(&self) -> bool {
        true
    }
}

// == Instrumented Operation ==
/// A named operation with its hooks, applied outermost first.
pub struct Instrumented {
    name: String,
    hooks: Vec<Box<dyn CallHook>>,
}

impl Instrumented {
    /// Creates an operation with no hooks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hooks: Vec::new(),
        }
    }

    /// Adds a hook inside the ones already attached.
    pub fn with_hook(mut self, hook: impl CallHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Qualified operation name, also the counter key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether any hook keeps an input/output log.
    pub fn records_history(&self) -> bool {
        self.hooks.iter().any(|hook| hook.records_history())
    }

    /// Runs `op` between the hooks' before and after steps.
    ///
    /// A failing operation skips every `after` step, leaving its input
    /// logged without a matching output.
    pub async fn invoke<T, F, Fut>(&self, store: &dyn KeyValueStore, args: &str, op: F) -> Result<T>
    where
        T: Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        for hook in &self.hooks {
            hook.before(store, &self.name, args).await?;
        }

        let output = op().await?;
        let rendered = output.to_string();
        debug!("{}(*{}) -> {}", self.name, args, rendered);

        for hook in self.hooks.iter().rev() {
            hook.after(store, &self.name, &rendered).await?;
        }
        Ok(output)
    }
}

impl std::fmt::Debug for Instrumented {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrumented")
            .field("name", &self.name)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}
