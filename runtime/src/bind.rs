//! Programmatic restoration of a token from its `{vkey: raw}` form.

use crate::error::MachineError;
use crate::machine::TokenStateMachine;
use serde_json::Value;
use std::collections::HashSet;
use tessera_core::TokenValue;
use tracing::Instrument;

impl TokenStateMachine {
    /// Rebuild the session from `values`, e.g. to restore a saved token.
    ///
    /// Starting from the root, each state is hydrated and bound to the value
    /// stored under its vkey, then the machine advances with the same
    /// first-match rule as [`transition`](Self::transition) except that
    /// bind-only branches are reachable. Binding stops at a terminal state or
    /// at the first state whose vkey has no value.
    ///
    /// Null entries, and empty arrays for multivalue states, count as absent.
    /// Values that do not box, bound values that fail validation or match no
    /// child, and keys never reached are errors; the machine is then reset
    /// unless `reset_on_bind_failure` is off.
    pub async fn bind_values(&mut self, values: &TokenValue) -> Result<(), MachineError> {
        let span = tracing::info_span!("BindValues", machine = %self.id, keys = values.len());
        let result = self.bind_inner(values).instrument(span).await;
        match &result {
            Ok(()) => tracing::info!(machine = %self.id, terminal = self.is_terminal(), "Values bound"),
            Err(error) => {
                tracing::debug!(machine = %self.id, %error, "Binding failed");
                if self.config.reset_on_bind_failure {
                    self.reset();
                }
            }
        }
        result
    }

    async fn bind_inner(&mut self, values: &TokenValue) -> Result<(), MachineError> {
        self.reset();
        let mut pending: HashSet<&str> = values
            .iter()
            .filter(|(_, raw)| !raw.is_null())
            .map(|(vkey, _)| vkey.as_str())
            .collect();

        loop {
            let vkey = self.current_state().vkey().map(str::to_owned);
            let multivalue = self.current_state().is_multivalue();
            let raw = vkey
                .as_deref()
                .and_then(|vkey| values.get(vkey))
                .filter(|raw| !is_absent(raw, multivalue));

            match (vkey, raw) {
                // A partial token ends at its first missing value.
                (Some(vkey), None) => {
                    pending.remove(vkey.as_str());
                    self.initialize_current(None).await?;
                    break;
                }
                (Some(vkey), Some(raw)) => {
                    self.bind_current(&vkey, raw).await?;
                    pending.remove(vkey.as_str());
                }
                (None, _) => self.initialize_current(None).await?,
            }

            if self.is_terminal() {
                break;
            }
            self.advance(true)?;
        }

        if pending.is_empty() {
            Ok(())
        } else {
            let mut keys: Vec<String> = pending.into_iter().map(str::to_owned).collect();
            keys.sort();
            Err(MachineError::UnmatchedValues { keys })
        }
    }

    async fn bind_current(&mut self, vkey: &str, raw: &Value) -> Result<(), MachineError> {
        let unboxable = || MachineError::Unboxable {
            vkey: vkey.to_string(),
            value: raw.clone(),
        };
        if self.current_state().is_multivalue() {
            self.initialize_current(None).await?;
            let entries = match raw {
                Value::Array(entries) => entries.as_slice(),
                single => std::slice::from_ref(single),
            };
            for entry in entries {
                if self.current_state_mut().set_unboxed_value(entry.clone()).is_none() {
                    return Err(unboxable());
                }
                self.archive()?;
            }
        } else {
            self.initialize_current(Some(raw)).await?;
            if self.current_state().value().is_none() {
                return Err(unboxable());
            }
        }
        Ok(())
    }
}

fn is_absent(raw: &Value, multivalue: bool) -> bool {
    match raw {
        Value::Null => true,
        Value::Array(entries) => multivalue && entries.is_empty(),
        _ => false,
    }
}
