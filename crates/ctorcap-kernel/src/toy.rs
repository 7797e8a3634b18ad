//! Toy constructors for conformance vectors.
//!
//! Each type here is a small but complete [`Serializable`] implementation
//! covering one shape of the capture model. The fixture runner addresses
//! them by name through [`get_toy`].
//!
//! ## Types
//!
//! - **Splat** `(a, *rest, b=1, **kw)`: every slot kind at once.
//! - **Point** `(x, y=0, *, label="origin")`: defaults on both sides of the
//!   keyword-only boundary; rejects an empty label.
//! - **Gate** `(mode, /, level=1)`: positional-only first parameter.
//! - **RawCapture** `(name, *values, **options)`: stores the raw call via the
//!   base constructor instead of normalising it.
//! - **DoubleSplat** `(*xs, *ys)`: a shape the capture model refuses.
//! - **Unwired** `(x)`: forgets to initialise its capture.

use crate::capture::ArgCapture;
use crate::error::SerializableError;
use crate::pickle;
use crate::serializable::{Serializable, clone_with};
use crate::signature::ParameterSignature;
use crate::state::ReconstructionState;
use crate::value::{Args, Kwargs, Locals, Value};
use std::marker::PhantomData;

// ─── Splat ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Splat {
    capture: ArgCapture,
    pub a: Value,
    pub rest: Vec<Value>,
    pub b: i64,
    pub kw: Kwargs,
}

impl Serializable for Splat {
    fn signature() -> ParameterSignature {
        ParameterSignature::builder()
            .positional("a")
            .var_positional("rest")
            .keyword_only_default("b", 1)
            .var_keyword("kw")
            .build()
    }

    fn construct(args: Args, kwargs: Kwargs) -> Result<Self, SerializableError> {
        let signature = Self::signature();
        let mut bound = signature.bind(args, kwargs)?;
        bound.apply_defaults();
        let locals = bound.into_locals();

        let mut splat = Splat {
            capture: ArgCapture::uninitialized(),
            a: locals.raw("a")?.clone(),
            rest: locals.get("rest")?,
            b: locals.get("b")?,
            kw: locals.get("kw")?,
        };
        splat.capture.initialize_from_locals(&signature, &locals)?;
        Ok(splat)
    }

    fn arg_capture(&self) -> &ArgCapture {
        &self.capture
    }
}

// ─── Point ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    capture: ArgCapture,
    pub x: i64,
    pub y: i64,
    pub label: String,
}

impl Serializable for Point {
    fn signature() -> ParameterSignature {
        ParameterSignature::builder()
            .positional("x")
            .positional_default("y", 0)
            .keyword_only_default("label", "origin")
            .build()
    }

    fn construct(args: Args, kwargs: Kwargs) -> Result<Self, SerializableError> {
        let signature = Self::signature();
        let mut bound = signature.bind(args, kwargs)?;
        bound.apply_defaults();
        let locals = bound.into_locals();

        let label: String = locals.get("label")?;
        if label.is_empty() {
            return Err(SerializableError::invalid_argument("label", "must not be empty"));
        }

        let mut point = Point {
            capture: ArgCapture::uninitialized(),
            x: locals.get("x")?,
            y: locals.get("y")?,
            label,
        };
        point.capture.initialize_from_locals(&signature, &locals)?;
        Ok(point)
    }

    fn arg_capture(&self) -> &ArgCapture {
        &self.capture
    }
}

// ─── Gate ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    capture: ArgCapture,
    pub mode: String,
    pub level: u8,
}

impl Serializable for Gate {
    fn signature() -> ParameterSignature {
        ParameterSignature::builder()
            .positional_only("mode")
            .positional_default("level", 1)
            .build()
    }

    fn construct(args: Args, kwargs: Kwargs) -> Result<Self, SerializableError> {
        let signature = Self::signature();
        let mut bound = signature.bind(args, kwargs)?;
        bound.apply_defaults();
        let locals = bound.into_locals();

        let mut gate = Gate {
            capture: ArgCapture::uninitialized(),
            mode: locals.get("mode")?,
            level: locals.get("level")?,
        };
        gate.capture.initialize_from_locals(&signature, &locals)?;
        Ok(gate)
    }

    fn arg_capture(&self) -> &ArgCapture {
        &self.capture
    }
}

// ─── RawCapture ─────────────────────────────────────────────────────────────

/// Records its call exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCapture {
    capture: ArgCapture,
    pub name: String,
    pub values: Vec<Value>,
    pub options: Kwargs,
}

impl Serializable for RawCapture {
    fn signature() -> ParameterSignature {
        ParameterSignature::builder()
            .positional("name")
            .var_positional("values")
            .var_keyword("options")
            .build()
    }

    fn construct(args: Args, kwargs: Kwargs) -> Result<Self, SerializableError> {
        let capture = ArgCapture::new(args.clone(), kwargs.clone());

        let mut bound = Self::signature().bind(args, kwargs)?;
        bound.apply_defaults();
        let locals = bound.into_locals();

        Ok(RawCapture {
            capture,
            name: locals.get("name")?,
            values: locals.get("values")?,
            options: locals.get("options")?,
        })
    }

    fn arg_capture(&self) -> &ArgCapture {
        &self.capture
    }
}

// ─── DoubleSplat ────────────────────────────────────────────────────────────

/// Declares two positional splats; construction always fails.
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleSplat {
    capture: ArgCapture,
}

impl Serializable for DoubleSplat {
    fn signature() -> ParameterSignature {
        ParameterSignature::builder()
            .var_positional("xs")
            .var_positional("ys")
            .build()
    }

    fn construct(args: Args, _kwargs: Kwargs) -> Result<Self, SerializableError> {
        let locals = Locals::new()
            .with("xs", Value::Array(args))
            .with("ys", Value::Array(Vec::new()));
        let mut double = DoubleSplat {
            capture: ArgCapture::uninitialized(),
        };
        double
            .capture
            .initialize_from_locals(&Self::signature(), &locals)?;
        Ok(double)
    }

    fn arg_capture(&self) -> &ArgCapture {
        &self.capture
    }
}

// ─── Unwired ────────────────────────────────────────────────────────────────

/// Builds its fields but never records its call.
#[derive(Debug, Clone, PartialEq)]
pub struct Unwired {
    capture: ArgCapture,
    pub x: i64,
}

impl Serializable for Unwired {
    fn signature() -> ParameterSignature {
        ParameterSignature::builder().positional("x").build()
    }

    fn construct(args: Args, kwargs: Kwargs) -> Result<Self, SerializableError> {
        let locals = Self::signature().bind(args, kwargs)?.into_locals();
        Ok(Unwired {
            capture: ArgCapture::uninitialized(),
            x: locals.get("x")?,
        })
    }

    fn arg_capture(&self) -> &ArgCapture {
        &self.capture
    }
}

// ─── Registry ───────────────────────────────────────────────────────────────

/// Type-erased handle on a toy type, for driving it by name.
pub trait ToyClass {
    fn name(&self) -> &str;

    /// Construct, then extract state.
    fn state(&self, args: Args, kwargs: Kwargs) -> Result<ReconstructionState, SerializableError>;

    /// Construct, clone with `overrides`, then extract the clone's state.
    fn clone_state(
        &self,
        args: Args,
        kwargs: Kwargs,
        overrides: Kwargs,
    ) -> Result<ReconstructionState, SerializableError>;

    /// Construct, pickle, unpickle, then extract the copy's state.
    fn pickle_state(&self, args: Args, kwargs: Kwargs) -> Result<ReconstructionState, SerializableError>;
}

struct Toy<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Toy<T> {
    fn boxed(name: &'static str) -> Box<dyn ToyClass>
    where
        T: Serializable + 'static,
    {
        Box::new(Toy::<T> {
            name,
            _marker: PhantomData,
        })
    }
}

impl<T: Serializable> ToyClass for Toy<T> {
    fn name(&self) -> &str {
        self.name
    }

    fn state(&self, args: Args, kwargs: Kwargs) -> Result<ReconstructionState, SerializableError> {
        T::construct(args, kwargs)?.get_state()
    }

    fn clone_state(
        &self,
        args: Args,
        kwargs: Kwargs,
        overrides: Kwargs,
    ) -> Result<ReconstructionState, SerializableError> {
        let original = T::construct(args, kwargs)?;
        clone_with(&original, overrides)?.get_state()
    }

    fn pickle_state(&self, args: Args, kwargs: Kwargs) -> Result<ReconstructionState, SerializableError> {
        let original = T::construct(args, kwargs)?;
        let payload = pickle::dumps(&original)?;
        pickle::loads::<T>(&payload)?.get_state()
    }
}

/// Get a toy type by name (matching the fixture "toy" field).
pub fn get_toy(name: &str) -> Option<Box<dyn ToyClass>> {
    match name {
        "splat" => Some(Toy::<Splat>::boxed("splat")),
        "point" => Some(Toy::<Point>::boxed("point")),
        "gate" => Some(Toy::<Gate>::boxed("gate")),
        "raw_capture" => Some(Toy::<RawCapture>::boxed("raw_capture")),
        "double_splat" => Some(Toy::<DoubleSplat>::boxed("double_splat")),
        "unwired" => Some(Toy::<Unwired>::boxed("unwired")),
        _ => None,
    }
}

/// Operation a fixture exercises.
#[derive(Debug, Clone, PartialEq)]
pub enum ToyOp {
    State,
    Clone { overrides: Kwargs },
    Pickle,
}

/// One conformance case in the fixture format.
#[derive(Debug, Clone, PartialEq)]
pub struct ToyCase {
    pub toy: String,
    pub args: Args,
    pub kwargs: Kwargs,
    pub op: ToyOp,
}

impl ToyCase {
    /// Parse a case from fixture JSON:
    /// `{"toy", "op": "state"|"clone"|"pickle", "args"?, "kwargs"?, "overrides"?}`.
    pub fn from_fixture(case: &Value) -> Option<Self> {
        let toy = case.get("toy")?.as_str()?.to_string();
        let args = match case.get("args") {
            Some(v) => serde_json::from_value(v.clone()).ok()?,
            None => Args::new(),
        };
        let kwargs = match case.get("kwargs") {
            Some(v) => serde_json::from_value(v.clone()).ok()?,
            None => Kwargs::new(),
        };
        let op = match case.get("op")?.as_str()? {
            "state" => ToyOp::State,
            "pickle" => ToyOp::Pickle,
            "clone" => {
                let overrides = match case.get("overrides") {
                    Some(v) => serde_json::from_value(v.clone()).ok()?,
                    None => Kwargs::new(),
                };
                ToyOp::Clone { overrides }
            }
            _ => return None,
        };
        Some(ToyCase {
            toy,
            args,
            kwargs,
            op,
        })
    }
}

/// Run a case and render the outcome as `{"state": ..}` or `{"error": kind}`.
///
/// Returns None if the case names an unknown toy.
pub fn run_toy_case(case: &ToyCase) -> Option<Value> {
    let toy = get_toy(&case.toy)?;
    let args = case.args.clone();
    let kwargs = case.kwargs.clone();
    let outcome = match &case.op {
        ToyOp::State => toy.state(args, kwargs),
        ToyOp::Clone { overrides } => toy.clone_state(args, kwargs, overrides.clone()),
        ToyOp::Pickle => toy.pickle_state(args, kwargs),
    };
    let rendered = match outcome {
        Ok(state) => serde_json::json!({ "state": state }),
        Err(err) => serde_json::json!({ "error": err.kind() }),
    };
    Some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registry_knows_every_toy() {
        for name in [
            "splat",
            "point",
            "gate",
            "raw_capture",
            "double_splat",
            "unwired",
        ] {
            let toy = get_toy(name).unwrap_or_else(|| panic!("missing toy {name}"));
            assert_eq!(toy.name(), name);
        }
        assert!(get_toy("nope").is_none());
    }

    #[test]
    fn point_rejects_empty_label() {
        let kwargs = Kwargs::from([("label".to_string(), json!(""))]);
        let err = Point::construct(vec![json!(1)], kwargs).unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn fixture_parse_defaults_missing_fields() {
        let case = ToyCase::from_fixture(&json!({"toy": "point", "op": "clone"})).unwrap();
        assert!(case.args.is_empty());
        assert_eq!(
            case.op,
            ToyOp::Clone {
                overrides: Kwargs::new()
            }
        );
        assert!(ToyCase::from_fixture(&json!({"toy": "point", "op": "melt"})).is_none());
    }

    #[test]
    fn unknown_toy_yields_none() {
        let case = ToyCase::from_fixture(&json!({"toy": "nope", "op": "state"})).unwrap();
        assert!(run_toy_case(&case).is_none());
    }
}
