//! The reconstruction contract.
//!
//! A type opts in by embedding an [`ArgCapture`], declaring its constructor
//! shape, and routing construction through [`Serializable::construct`].
//! Everything else (state extraction, in-place restoration, cloning with
//! overrides) is provided on top of those three items.
//!
//! A typical constructor binds its call, reads its effective values from
//! the resulting locals, and records them:
//!
//! ```
//! use ctorcap_kernel::{
//!     ArgCapture, Args, Kwargs, ParameterSignature, Serializable, SerializableError, Value,
//! };
//!
//! struct Point {
//!     capture: ArgCapture,
//!     x: i64,
//!     y: i64,
//! }
//!
//! impl Serializable for Point {
//!     fn signature() -> ParameterSignature {
//!         ParameterSignature::builder()
//!             .positional("x")
//!             .positional_default("y", 0)
//!             .build()
//!     }
//!
//!     fn construct(args: Args, kwargs: Kwargs) -> Result<Self, SerializableError> {
//!         let signature = Self::signature();
//!         let mut bound = signature.bind(args, kwargs)?;
//!         bound.apply_defaults();
//!         let locals = bound.into_locals();
//!
//!         let mut point = Point {
//!             capture: ArgCapture::uninitialized(),
//!             x: locals.get("x")?,
//!             y: locals.get("y")?,
//!         };
//!         point.capture.initialize_from_locals(&signature, &locals)?;
//!         Ok(point)
//!     }
//!
//!     fn arg_capture(&self) -> &ArgCapture {
//!         &self.capture
//!     }
//! }
//!
//! let p = Point::construct(vec![3.into()], Kwargs::new()).unwrap();
//! let overrides = Kwargs::from([("y".to_string(), Value::from(4))]);
//! let q = ctorcap_kernel::clone_with(&p, overrides).unwrap();
//! assert_eq!((q.x, q.y), (3, 4));
//! ```

use crate::bind::BoundArguments;
use crate::capture::{ArgCapture, CapturedCall};
use crate::error::SerializableError;
use crate::signature::ParameterSignature;
use crate::state::ReconstructionState;
use crate::value::{Args, Kwargs};
use tracing::debug;

/// A type that can rebuild itself from the arguments it was constructed with.
pub trait Serializable: Sized {
    /// The declared constructor shape.
    fn signature() -> ParameterSignature;

    /// The constructor. Implementations must leave the returned instance's
    /// capture initialised, either with [`ArgCapture::new`] or with
    /// [`ArgCapture::initialize_from_locals`].
    fn construct(args: Args, kwargs: Kwargs) -> Result<Self, SerializableError>;

    /// The embedded capture.
    fn arg_capture(&self) -> &ArgCapture;

    /// Snapshot the captured call.
    fn get_state(&self) -> Result<ReconstructionState, SerializableError> {
        let call = captured_call::<Self>(self, "get state from")?;
        Ok(ReconstructionState::from(call.clone()))
    }

    /// Replace this instance with one constructed from `state`.
    ///
    /// The receiver must already be initialised. The replacement is built
    /// first, so on error the receiver is left untouched.
    fn set_state(&mut self, state: ReconstructionState) -> Result<(), SerializableError> {
        captured_call::<Self>(self, "set state of")?;
        let rebuilt = Self::construct(state.args, state.kwargs)?;
        debug!(
            type_name = std::any::type_name::<Self>(),
            "restored state in place"
        );
        *self = rebuilt;
        Ok(())
    }

    /// Construct a fresh instance from `state`.
    fn from_state(state: ReconstructionState) -> Result<Self, SerializableError> {
        Self::construct(state.args, state.kwargs)
    }

    /// The captured call bound against the signature, with every omitted
    /// parameter filled from its declared default.
    fn canonical_call(&self) -> Result<BoundArguments, SerializableError> {
        let state = self.get_state()?;
        let mut bound = Self::signature().bind(state.args, state.kwargs)?;
        bound.apply_defaults();
        Ok(bound)
    }
}

fn captured_call<'a, T: Serializable>(
    instance: &'a T,
    operation: &'static str,
) -> Result<&'a CapturedCall, SerializableError> {
    instance
        .arg_capture()
        .call()
        .ok_or(SerializableError::Uninitialized {
            operation,
            type_name: std::any::type_name::<T>(),
        })
}

/// Build a new instance from `instance`'s captured call.
///
/// The call is bound against the signature, `overrides` are merged into it,
/// and only then are declared defaults applied, so an override always wins
/// and an omitted parameter takes the type's own default. See
/// [`BoundArguments::merge_overrides`] for which names an override may use.
pub fn clone_with<T: Serializable>(instance: &T, overrides: Kwargs) -> Result<T, SerializableError> {
    let state = captured_call(instance, "clone")
        .map(|call| ReconstructionState::from(call.clone()))?;

    let mut bound = T::signature().bind(state.args, state.kwargs)?;
    let override_count = overrides.len();
    bound.merge_overrides(overrides)?;
    bound.apply_defaults();

    let (args, kwargs) = bound.into_call();
    debug!(
        type_name = std::any::type_name::<T>(),
        overrides = override_count,
        "cloning from captured call"
    );
    T::construct(args, kwargs)
}

/// [`clone_with`] without overrides.
pub fn reconstruct<T: Serializable>(instance: &T) -> Result<T, SerializableError> {
    clone_with(instance, Kwargs::new())
}
