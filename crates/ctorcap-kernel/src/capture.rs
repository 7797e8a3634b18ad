//! The capture base embedded in every reconstructible type.
//!
//! An [`ArgCapture`] records how its owner was constructed. It is created
//! either from the raw call the base constructor received, or empty and
//! then normalised once from the owner's locals via
//! [`initialize_from_locals`](ArgCapture::initialize_from_locals).

use crate::error::{BindError, SerializableError};
use crate::signature::ParameterSignature;
use crate::value::{Args, Kwargs, Locals, Value, type_label};
use tracing::{debug, trace};

/// The positional and keyword arguments an instance was constructed with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedCall {
    pub positional: Args,
    pub keyword: Kwargs,
}

impl CapturedCall {
    pub fn new(positional: Args, keyword: Kwargs) -> Self {
        Self {
            positional,
            keyword,
        }
    }
}

/// Per-instance record of the constructor call.
///
/// `Default` gives the uninitialised state an instance has when it was
/// allocated without running its constructor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgCapture {
    call: Option<CapturedCall>,
}

impl ArgCapture {
    /// Capture the raw call as received, without normalisation.
    pub fn new(args: Args, kwargs: Kwargs) -> Self {
        Self {
            call: Some(CapturedCall::new(args, kwargs)),
        }
    }

    /// An empty capture, to be filled by `initialize_from_locals`.
    pub fn uninitialized() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.call.is_some()
    }

    pub fn call(&self) -> Option<&CapturedCall> {
        self.call.as_ref()
    }

    /// Normalise the owner's locals into a canonical call and record it.
    ///
    /// The first capture wins: calling this on an initialised capture does
    /// nothing. `locals` must hold a value for every declared parameter,
    /// including an array for the positional splat and an object for the
    /// keyword splat when the signature declares them.
    pub fn initialize_from_locals(
        &mut self,
        signature: &ParameterSignature,
        locals: &Locals,
    ) -> Result<(), SerializableError> {
        if self.is_initialized() {
            trace!("capture already initialized; ignoring repeated initialization");
            return Ok(());
        }

        let shape = signature.shape()?;

        let mut args = Args::new();
        for p in &shape.positional {
            args.push(locals.raw(&p.name)?.clone());
        }
        if let Some(slot) = &shape.var_positional {
            match locals.raw(&slot.name)? {
                Value::Array(items) => args.extend(items.iter().cloned()),
                other => {
                    return Err(SerializableError::InvalidLocal {
                        name: slot.name.clone(),
                        reason: format!("expected an array, got {}", type_label(other)),
                    });
                }
            }
        }

        let mut kwargs = Kwargs::new();
        for p in &shape.keyword_only {
            kwargs.insert(p.name.clone(), locals.raw(&p.name)?.clone());
        }
        if let Some(slot) = &shape.var_keyword {
            match locals.raw(&slot.name)? {
                Value::Object(extra) => {
                    for (key, value) in extra {
                        if kwargs.contains_key(key) {
                            return Err(BindError::MultipleValues {
                                name: key.clone(),
                            }
                            .into());
                        }
                        kwargs.insert(key.clone(), value.clone());
                    }
                }
                other => {
                    return Err(SerializableError::InvalidLocal {
                        name: slot.name.clone(),
                        reason: format!("expected an object, got {}", type_label(other)),
                    });
                }
            }
        }

        let (positional, keyword) = signature.bind(args, kwargs)?.into_call();
        debug!(
            positional = positional.len(),
            keyword = keyword.len(),
            "captured constructor call"
        );
        self.call = Some(CapturedCall::new(positional, keyword));
        Ok(())
    }
}
