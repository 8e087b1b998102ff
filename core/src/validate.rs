use crate::value::ValueLike;
use std::fmt;
use std::sync::Arc;

type ValidateFn = dyn Fn(Option<&ValueLike>, &[ValueLike]) -> anyhow::Result<bool> + Send + Sync;

/// Validation over a step's committed value and its archive.
///
/// An `Err` from the underlying function is a defect in the grammar
/// definition, not bad user input; the runtime node logs and propagates it.
#[derive(Clone)]
pub struct Validator(Arc<ValidateFn>);

impl Validator {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(Option<&ValueLike>, &[ValueLike]) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(move |value, archive| Ok(check(value, archive))))
    }

    pub fn try_new<F>(check: F) -> Self
    where
        F: Fn(Option<&ValueLike>, &[ValueLike]) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    pub fn always() -> Self {
        Self::new(|_, _| true)
    }

    /// Accepts a present value or a non-empty archive.
    pub fn required() -> Self {
        Self::new(|value, archive| value.is_some() || !archive.is_empty())
    }

    pub fn validate(&self, value: Option<&ValueLike>, archive: &[ValueLike]) -> anyhow::Result<bool> {
        (self.0)(value, archive)
    }

    /// Both validators must accept.
    pub fn and(self, other: Validator) -> Self {
        Self::try_new(move |value, archive| {
            Ok(self.validate(value, archive)? && other.validate(value, archive)?)
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").finish()
    }
}
