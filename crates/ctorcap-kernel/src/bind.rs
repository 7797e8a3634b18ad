//! Binding a raw call against a declared signature.
//!
//! Binding assigns every positional and keyword value to a declared
//! parameter, validating that the call is legal, and yields the canonical
//! positional/keyword split used for capture and replay.

use crate::error::{BindError, SerializableError};
use crate::signature::{ParamKind, ParameterSignature, SignatureShape};
use crate::value::{Args, Kwargs, Locals, Value};
use serde_json::Map;
use std::collections::BTreeMap;

/// A call whose values have been assigned to declared parameters.
///
/// Variadic slots are held as a JSON array (positional splat) and a JSON
/// object (keyword splat). A slot is absent until something binds to it or
/// [`apply_defaults`](Self::apply_defaults) fills it.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArguments {
    shape: SignatureShape,
    arguments: BTreeMap<String, Value>,
}

impl ParameterSignature {
    /// Bind `args`/`kwargs` against this signature.
    pub fn bind(&self, args: Args, mut kwargs: Kwargs) -> Result<BoundArguments, SerializableError> {
        let shape = self.shape()?;
        let mut arguments = BTreeMap::new();

        let given = args.len();
        let mut values = args.into_iter();
        let mut filled = 0;
        for p in &shape.positional {
            let Some(value) = values.next() else { break };
            if p.kind == ParamKind::PositionalOrKeyword && kwargs.contains_key(&p.name) {
                return Err(BindError::MultipleValues {
                    name: p.name.clone(),
                }
                .into());
            }
            arguments.insert(p.name.clone(), value);
            filled += 1;
        }

        let surplus: Vec<Value> = values.collect();
        if !surplus.is_empty() {
            match &shape.var_positional {
                Some(slot) => {
                    arguments.insert(slot.name.clone(), Value::Array(surplus));
                }
                None => {
                    return Err(BindError::TooManyPositional {
                        expected: shape.positional.len(),
                        given,
                    }
                    .into());
                }
            }
        }

        for p in &shape.positional[filled..] {
            if p.kind == ParamKind::PositionalOnly {
                // Left in kwargs for the keyword splat when there is one.
                if kwargs.contains_key(&p.name) && shape.var_keyword.is_none() {
                    return Err(BindError::PositionalOnlyAsKeyword {
                        name: p.name.clone(),
                    }
                    .into());
                }
            } else if let Some(value) = kwargs.remove(&p.name) {
                arguments.insert(p.name.clone(), value);
                continue;
            }
            if p.default.is_none() {
                return Err(BindError::MissingArgument {
                    name: p.name.clone(),
                }
                .into());
            }
        }

        for p in &shape.keyword_only {
            match kwargs.remove(&p.name) {
                Some(value) => {
                    arguments.insert(p.name.clone(), value);
                }
                None if p.default.is_none() => {
                    return Err(BindError::MissingArgument {
                        name: p.name.clone(),
                    }
                    .into());
                }
                None => {}
            }
        }

        if !kwargs.is_empty() {
            match &shape.var_keyword {
                Some(slot) => {
                    let rest: Map<String, Value> = kwargs.into_iter().collect();
                    arguments.insert(slot.name.clone(), Value::Object(rest));
                }
                None => {
                    let name = kwargs.into_keys().next().unwrap_or_default();
                    return Err(BindError::UnexpectedKeyword { name }.into());
                }
            }
        }

        Ok(BoundArguments { shape, arguments })
    }
}

impl BoundArguments {
    pub fn shape(&self) -> &SignatureShape {
        &self.shape
    }

    pub fn arguments(&self) -> &BTreeMap<String, Value> {
        &self.arguments
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// Positional part of the canonical call.
    ///
    /// Fixed positionals in declared order up to the first unbound one,
    /// followed by the positional splat when every fixed positional is bound.
    pub fn args(&self) -> Args {
        let mut out = Args::new();
        for p in &self.shape.positional {
            match self.arguments.get(&p.name) {
                Some(value) => out.push(value.clone()),
                None => return out,
            }
        }
        if let Some(slot) = &self.shape.var_positional {
            if let Some(Value::Array(items)) = self.arguments.get(&slot.name) {
                out.extend(items.iter().cloned());
            }
        }
        out
    }

    /// Keyword part of the canonical call: everything [`args`](Self::args)
    /// did not emit.
    pub fn kwargs(&self) -> Kwargs {
        let mut out = Kwargs::new();
        let mut started = false;
        for p in &self.shape.positional {
            match self.arguments.get(&p.name) {
                Some(value) if started => {
                    out.insert(p.name.clone(), value.clone());
                }
                Some(_) => {}
                None => started = true,
            }
        }
        for p in &self.shape.keyword_only {
            if let Some(value) = self.arguments.get(&p.name) {
                out.insert(p.name.clone(), value.clone());
            }
        }
        if let Some(slot) = &self.shape.var_keyword {
            if let Some(Value::Object(extra)) = self.arguments.get(&slot.name) {
                out.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        out
    }

    /// Fill every unbound parameter: its declared default, an empty array
    /// for the positional splat, an empty object for the keyword splat.
    pub fn apply_defaults(&mut self) {
        for p in self.shape.ordered() {
            if self.arguments.contains_key(&p.name) {
                continue;
            }
            let fill = match p.kind {
                ParamKind::VarPositional => Some(Value::Array(Vec::new())),
                ParamKind::VarKeyword => Some(Value::Object(Map::new())),
                _ => p.default.clone(),
            };
            if let Some(value) = fill {
                self.arguments.insert(p.name.clone(), value);
            }
        }
    }

    /// Merge keyword overrides into the bound call.
    ///
    /// Named positional-or-keyword and keyword-only parameters are replaced.
    /// Positional-only names are rejected. Any other name lands in the
    /// keyword splat, or is rejected when the signature has none.
    pub fn merge_overrides(&mut self, overrides: Kwargs) -> Result<(), BindError> {
        for (name, value) in overrides {
            match self.shape.find(&name).map(|p| p.kind) {
                Some(ParamKind::PositionalOrKeyword | ParamKind::KeywordOnly) => {
                    self.arguments.insert(name, value);
                }
                Some(ParamKind::PositionalOnly) => {
                    return Err(BindError::PositionalOnlyAsKeyword { name });
                }
                _ => {
                    let Some(slot) = &self.shape.var_keyword else {
                        return Err(BindError::UnexpectedKeyword { name });
                    };
                    let extra = self
                        .arguments
                        .entry(slot.name.clone())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(map) = extra {
                        map.insert(name, value);
                    }
                }
            }
        }
        Ok(())
    }

    /// Every bound value keyed by parameter name.
    pub fn into_locals(self) -> Locals {
        Locals::from(self.arguments)
    }

    /// The canonical `(args, kwargs)` pair.
    pub fn into_call(self) -> (Args, Kwargs) {
        (self.args(), self.kwargs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kwargs(value: Value) -> Kwargs {
        serde_json::from_value(value).unwrap()
    }

    fn splat() -> ParameterSignature {
        ParameterSignature::builder()
            .positional("a")
            .var_positional("rest")
            .keyword_only_default("b", 1)
            .var_keyword("kw")
            .build()
    }

    fn point() -> ParameterSignature {
        ParameterSignature::builder()
            .positional("x")
            .positional_default("y", 0)
            .keyword_only_default("label", "origin")
            .build()
    }

    #[test]
    fn splat_call_is_split_canonically() {
        let bound = splat()
            .bind(
                vec![json!(1), json!(2), json!(3)],
                kwargs(json!({"b": 5, "c": 9})),
            )
            .unwrap();
        assert_eq!(bound.get("rest"), Some(&json!([2, 3])));
        assert_eq!(bound.get("kw"), Some(&json!({"c": 9})));
        assert_eq!(bound.args(), vec![json!(1), json!(2), json!(3)]);
        assert_eq!(bound.kwargs(), kwargs(json!({"b": 5, "c": 9})));
    }

    #[test]
    fn positional_named_by_keyword_is_emitted_positionally() {
        let bound = point()
            .bind(vec![], kwargs(json!({"x": 3, "y": 4})))
            .unwrap();
        assert_eq!(bound.args(), vec![json!(3), json!(4)]);
        assert!(bound.kwargs().is_empty());
    }

    #[test]
    fn gap_in_positionals_moves_the_rest_to_keywords() {
        let sig = ParameterSignature::builder()
            .positional("x")
            .positional_default("y", 0)
            .positional_default("z", 0)
            .build();
        let bound = sig.bind(vec![json!(1)], kwargs(json!({"z": 2}))).unwrap();
        assert_eq!(bound.args(), vec![json!(1)]);
        assert_eq!(bound.kwargs(), kwargs(json!({"z": 2})));
    }

    #[test]
    fn apply_defaults_fills_declared_and_variadic_slots() {
        let mut bound = splat().bind(vec![json!(1)], Kwargs::new()).unwrap();
        assert_eq!(bound.get("b"), None);
        bound.apply_defaults();
        assert_eq!(bound.get("b"), Some(&json!(1)));
        assert_eq!(bound.get("rest"), Some(&json!([])));
        assert_eq!(bound.get("kw"), Some(&json!({})));
        assert_eq!(bound.args(), vec![json!(1)]);
        assert_eq!(bound.kwargs(), kwargs(json!({"b": 1})));
    }

    #[test]
    fn missing_required_argument() {
        let err = point().bind(vec![], Kwargs::new()).unwrap_err();
        assert!(matches!(
            err,
            SerializableError::Bind(BindError::MissingArgument { ref name }) if name == "x"
        ));
    }

    #[test]
    fn missing_required_keyword_only() {
        let sig = ParameterSignature::builder().keyword_only("mode").build();
        let err = sig.bind(vec![], Kwargs::new()).unwrap_err();
        assert_eq!(err.kind(), "missing_argument");
    }

    #[test]
    fn too_many_positionals_without_a_splat() {
        let err = point()
            .bind(vec![json!(1), json!(2), json!(3)], Kwargs::new())
            .unwrap_err();
        assert!(matches!(
            err,
            SerializableError::Bind(BindError::TooManyPositional {
                expected: 2,
                given: 3
            })
        ));
    }

    #[test]
    fn positional_and_keyword_for_the_same_parameter() {
        let err = point()
            .bind(vec![json!(1)], kwargs(json!({"x": 2})))
            .unwrap_err();
        assert_eq!(err.kind(), "multiple_values");
    }

    #[test]
    fn unexpected_keyword_without_a_splat() {
        let err = point()
            .bind(vec![json!(1)], kwargs(json!({"colour": "red"})))
            .unwrap_err();
        assert!(matches!(
            err,
            SerializableError::Bind(BindError::UnexpectedKeyword { ref name }) if name == "colour"
        ));
    }

    #[test]
    fn positional_only_by_keyword() {
        let sig = ParameterSignature::builder()
            .positional_only("mode")
            .positional_default("level", 1)
            .build();
        let err = sig
            .bind(vec![], kwargs(json!({"mode": "fast"})))
            .unwrap_err();
        assert_eq!(err.kind(), "positional_only_as_keyword");
    }

    #[test]
    fn positional_only_name_goes_to_keyword_splat() {
        let sig = ParameterSignature::builder()
            .positional_only("mode")
            .var_keyword("extra")
            .build();
        let bound = sig
            .bind(vec![json!("slow")], kwargs(json!({"mode": "fast"})))
            .unwrap();
        assert_eq!(bound.args(), vec![json!("slow")]);
        assert_eq!(bound.kwargs(), kwargs(json!({"mode": "fast"})));
    }

    #[test]
    fn overrides_replace_named_parameters() {
        let mut bound = point()
            .bind(vec![json!(1), json!(2)], Kwargs::new())
            .unwrap();
        bound
            .merge_overrides(kwargs(json!({"y": 7, "label": "p"})))
            .unwrap();
        bound.apply_defaults();
        assert_eq!(bound.args(), vec![json!(1), json!(7)]);
        assert_eq!(bound.kwargs(), kwargs(json!({"label": "p"})));
    }

    #[test]
    fn unknown_overrides_go_to_keyword_splat() {
        let mut bound = splat()
            .bind(vec![json!(1)], kwargs(json!({"c": 9})))
            .unwrap();
        bound
            .merge_overrides(kwargs(json!({"c": 10, "rest": "named"})))
            .unwrap();
        assert_eq!(bound.get("kw"), Some(&json!({"c": 10, "rest": "named"})));
        assert_eq!(bound.get("rest"), None);
    }

    #[test]
    fn unknown_override_without_splat_is_rejected() {
        let mut bound = point().bind(vec![json!(1)], Kwargs::new()).unwrap();
        let err = bound
            .merge_overrides(kwargs(json!({"z": 1})))
            .unwrap_err();
        assert_eq!(err, BindError::UnexpectedKeyword { name: "z".into() });
    }

    #[test]
    fn bind_rejects_unsupported_shapes() {
        let sig = ParameterSignature::builder()
            .var_positional("xs")
            .var_positional("ys")
            .build();
        let err = sig.bind(vec![], Kwargs::new()).unwrap_err();
        assert_eq!(err.kind(), "not_supported");
    }
}
