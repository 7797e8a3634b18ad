//! # ctorcap kernel
//!
//! Constructor-argument capture: an instance records the call it was built
//! with, normalises that call against its declared parameter signature, and
//! can replay it to restore, pickle or clone itself without per-type
//! save/restore logic.
//!
//! ## Architecture
//!
//! ```text
//! ParameterSignature    ← Declared shape: fixed positionals, *splat, keyword-only, **splat
//!     │
//! BoundArguments        ← A raw call bound against the shape (defaults, overrides)
//!     │
//! ArgCapture            ← Per-instance CapturedCall, set once
//!     │
//! ReconstructionState   ← {args, kwargs} snapshot for pipelines
//!     │
//! Serializable          ← get_state / set_state / from_state, clone_with
//! ```
//!
//! Signatures are hand-authored (builder or TOML table); nothing is
//! discovered by reflection.

pub mod bind;
pub mod capture;
pub mod error;
pub mod pickle;
pub mod serializable;
pub mod signature;
pub mod state;
pub mod toy;
pub mod value;

pub use bind::BoundArguments;
pub use capture::{ArgCapture, CapturedCall};
pub use error::{BindError, SerializableError};
pub use serializable::{Serializable, clone_with, reconstruct};
pub use signature::{ParamKind, Parameter, ParameterSignature, SignatureBuilder, SignatureShape};
pub use state::{ReconstructionState, StateDigest};
pub use value::{Args, Kwargs, Locals, Value};
