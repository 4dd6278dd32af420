// Function registry: the explicit replacement for looking a callable up by
// name in a global namespace. Names are resolved once before a run; an
// unknown name is a harness error rather than a per-case failure.

use crate::capture::Capture;
use crate::error::HarnessError;
use crate::finite;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Case-level failure to bind a case's input to a function's parameters
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("{function}() missing required argument '{name}'")]
    Missing { function: String, name: String },

    #[error("{function}() got an unexpected keyword argument '{name}'")]
    Unexpected { function: String, name: String },

    #[error("{function}() argument '{name}' has the wrong type: {source}")]
    WrongType {
        function: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Named arguments of one invocation
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    function: &'a str,
    values: &'a Map<String, Value>,
}

impl<'a> Args<'a> {
    /// Deserialize a named argument into `T`
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArgumentError> {
        let value = self.raw(name).ok_or_else(|| ArgumentError::Missing {
            function: self.function.to_string(),
            name: name.to_string(),
        })?;

        serde_json::from_value(value.clone()).map_err(|source| ArgumentError::WrongType {
            function: self.function.to_string(),
            name: name.to_string(),
            source,
        })
    }

    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        self.values.get(name)
    }
}

type Invoke = dyn Fn(&Args<'_>, &mut Capture) -> anyhow::Result<Value> + Send + Sync;

/// A callable with its declared parameter names
pub struct RegisteredFunction {
    name: String,
    params: Vec<String>,
    invoke: Box<Invoke>,
}

impl RegisteredFunction {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Check `input` against the declared parameters
    ///
    /// Unexpected names are reported before missing ones, each in a stable
    /// order, so the same bad case always yields the same message.
    pub fn bind<'a>(&'a self, input: &'a Map<String, Value>) -> Result<Args<'a>, ArgumentError> {
        if let Some(name) = input.keys().find(|k| !self.params.contains(*k)) {
            return Err(ArgumentError::Unexpected {
                function: self.name.clone(),
                name: name.clone(),
            });
        }
        if let Some(name) = self.params.iter().find(|p| !input.contains_key(p.as_str())) {
            return Err(ArgumentError::Missing {
                function: self.name.clone(),
                name: name.clone(),
            });
        }

        Ok(Args {
            function: &self.name,
            values: input,
        })
    }

    pub fn call(&self, args: &Args<'_>, capture: &mut Capture) -> anyhow::Result<Value> {
        (self.invoke)(args, capture)
    }
}

impl fmt::Debug for RegisteredFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredFunction")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Functions an execution unit exposes, keyed by name
#[derive(Debug, Default)]
pub struct Registry {
    functions: BTreeMap<String, RegisteredFunction>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name` with the given parameter names
    ///
    /// The return value is converted to a JSON value after every call; a
    /// value serde cannot represent, or one holding a NaN or infinite float,
    /// becomes a case-level error. Registering
    /// a name twice replaces the earlier function.
    pub fn register<F, R>(&mut self, name: &str, params: &[&str], f: F) -> &mut Self
    where
        F: Fn(&Args<'_>, &mut Capture) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Serialize,
    {
        let invoke = move |args: &Args<'_>, capture: &mut Capture| -> anyhow::Result<Value> {
            let returned = f(args, capture)?;
            finite::ensure_finite(&returned)?;
            serde_json::to_value(returned).context("return value is not representable as a JSON value")
        };

        let function = RegisteredFunction {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            invoke: Box::new(invoke),
        };

        if self.functions.insert(name.to_string(), function).is_some() {
            warn!(function = name, "Function registered twice; keeping the latest");
        }
        self
    }

    pub fn resolve(&self, name: &str) -> Result<&RegisteredFunction, HarnessError> {
        self.functions
            .get(name)
            .ok_or_else(|| HarnessError::UnknownFunction(name.to_string()))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
