//! Declared constructor shapes.
//!
//! A [`ParameterSignature`] is hand-authored per type, either with the
//! builder or as a TOML table, and describes the four slots a call is
//! bound against:
//!
//! ```text
//! (a, b=1, *rest, c, d=2, **kw)
//!  ───────  ─────  ───────  ────
//!  fixed    var    keyword  var
//!  posit.   pos    only     keyword
//! ```
//!
//! Parameter order within each slot is significant; the relative order of
//! the slots themselves is not.

use crate::error::SerializableError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a parameter accepts its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Fixed positional, cannot be named by keyword.
    PositionalOnly,

    /// Fixed positional, may also be named by keyword.
    #[default]
    PositionalOrKeyword,

    /// Collects surplus positional values.
    VarPositional,

    /// Must be named by keyword.
    KeywordOnly,

    /// Collects surplus keyword values.
    VarKeyword,
}

impl ParamKind {
    pub fn is_fixed_positional(&self) -> bool {
        matches!(
            self,
            ParamKind::PositionalOnly | ParamKind::PositionalOrKeyword
        )
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, ParamKind::VarPositional | ParamKind::VarKeyword)
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(default)]
    pub kind: ParamKind,

    /// Declared default. Absent means the parameter is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.kind.is_variadic()
    }
}

/// The declared parameter list of a constructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSignature {
    #[serde(default)]
    params: Vec<Parameter>,
}

impl ParameterSignature {
    pub fn new(params: Vec<Parameter>) -> Self {
        Self { params }
    }

    pub fn builder() -> SignatureBuilder {
        SignatureBuilder::default()
    }

    /// Parse a declarative `[[params]]` table.
    pub fn from_toml_str(table: &str) -> Result<Self, SerializableError> {
        Ok(toml::from_str(table)?)
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    fn of_kind(&self, kind: ParamKind) -> Vec<&Parameter> {
        self.params.iter().filter(|p| p.kind == kind).collect()
    }

    /// Resolve the declared list into its four slots.
    ///
    /// Fails with `NotSupported` for more than one splat of either kind, and
    /// with `InvalidSignature` for duplicate names or defaulted splats.
    pub fn shape(&self) -> Result<SignatureShape, SerializableError> {
        let mut seen = BTreeSet::new();
        for p in &self.params {
            if !seen.insert(p.name.as_str()) {
                return Err(SerializableError::InvalidSignature(format!(
                    "duplicate parameter `{}`",
                    p.name
                )));
            }
            if p.kind.is_variadic() && p.default.is_some() {
                return Err(SerializableError::InvalidSignature(format!(
                    "variadic parameter `{}` cannot declare a default",
                    p.name
                )));
            }
        }

        let var_positional = self.of_kind(ParamKind::VarPositional);
        if var_positional.len() > 1 {
            return Err(SerializableError::NotSupported(format!(
                "can't yet handle more than one variable args, got: {}",
                join_names(&var_positional)
            )));
        }
        let var_keyword = self.of_kind(ParamKind::VarKeyword);
        if var_keyword.len() > 1 {
            return Err(SerializableError::NotSupported(format!(
                "can't yet handle more than one variable kwargs, got: {}",
                join_names(&var_keyword)
            )));
        }

        Ok(SignatureShape {
            positional: self
                .params
                .iter()
                .filter(|p| p.kind.is_fixed_positional())
                .cloned()
                .collect(),
            var_positional: var_positional.first().map(|p| (*p).clone()),
            keyword_only: self
                .of_kind(ParamKind::KeywordOnly)
                .into_iter()
                .cloned()
                .collect(),
            var_keyword: var_keyword.first().map(|p| (*p).clone()),
        })
    }
}

fn join_names(params: &[&Parameter]) -> String {
    params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated, slot-wise view of a signature.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureShape {
    pub positional: Vec<Parameter>,
    pub var_positional: Option<Parameter>,
    pub keyword_only: Vec<Parameter>,
    pub var_keyword: Option<Parameter>,
}

impl SignatureShape {
    /// Every parameter in canonical slot order.
    pub fn ordered(&self) -> Vec<&Parameter> {
        let mut out: Vec<&Parameter> = self.positional.iter().collect();
        out.extend(self.var_positional.as_ref());
        out.extend(self.keyword_only.iter());
        out.extend(self.var_keyword.as_ref());
        out
    }

    /// The declared parameter called `name`, in any slot.
    pub fn find(&self, name: &str) -> Option<&Parameter> {
        self.ordered().into_iter().find(|p| p.name == name)
    }
}

/// Incremental signature builder. Parameters are appended in call order.
#[derive(Debug, Default)]
pub struct SignatureBuilder {
    params: Vec<Parameter>,
}

impl SignatureBuilder {
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn positional_only(self, name: &str) -> Self {
        self.param(Parameter::new(name, ParamKind::PositionalOnly))
    }

    pub fn positional_only_default(self, name: &str, default: impl Into<Value>) -> Self {
        self.param(Parameter::new(name, ParamKind::PositionalOnly).with_default(default))
    }

    pub fn positional(self, name: &str) -> Self {
        self.param(Parameter::new(name, ParamKind::PositionalOrKeyword))
    }

    pub fn positional_default(self, name: &str, default: impl Into<Value>) -> Self {
        self.param(Parameter::new(name, ParamKind::PositionalOrKeyword).with_default(default))
    }

    pub fn var_positional(self, name: &str) -> Self {
        self.param(Parameter::new(name, ParamKind::VarPositional))
    }

    pub fn keyword_only(self, name: &str) -> Self {
        self.param(Parameter::new(name, ParamKind::KeywordOnly))
    }

    pub fn keyword_only_default(self, name: &str, default: impl Into<Value>) -> Self {
        self.param(Parameter::new(name, ParamKind::KeywordOnly).with_default(default))
    }

    pub fn var_keyword(self, name: &str) -> Self {
        self.param(Parameter::new(name, ParamKind::VarKeyword))
    }

    pub fn build(self) -> ParameterSignature {
        ParameterSignature::new(self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn splat() -> ParameterSignature {
        ParameterSignature::builder()
            .positional("a")
            .var_positional("rest")
            .keyword_only_default("b", 1)
            .var_keyword("kw")
            .build()
    }

    #[test]
    fn shape_splits_slots() {
        let sig = splat();
        let shape = sig.shape().unwrap();
        assert_eq!(shape.positional.len(), 1);
        assert_eq!(shape.positional[0].name, "a");
        assert_eq!(shape.var_positional.as_ref().map(|p| p.name.as_str()), Some("rest"));
        assert_eq!(shape.keyword_only[0].name, "b");
        assert_eq!(shape.var_keyword.as_ref().map(|p| p.name.as_str()), Some("kw"));
        let names: Vec<_> = shape.ordered().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, ["a", "rest", "b", "kw"]);
    }

    #[test]
    fn two_var_positional_slots_are_not_supported() {
        let sig = ParameterSignature::builder()
            .var_positional("xs")
            .var_positional("ys")
            .build();
        let err = sig.shape().unwrap_err();
        assert_eq!(err.kind(), "not_supported");
        assert!(err.to_string().contains("xs, ys"));
    }

    #[test]
    fn two_var_keyword_slots_are_not_supported() {
        let sig = ParameterSignature::builder()
            .var_keyword("a")
            .var_keyword("b")
            .build();
        assert_eq!(sig.shape().unwrap_err().kind(), "not_supported");
    }

    #[test]
    fn duplicate_names_are_invalid() {
        let sig = ParameterSignature::builder()
            .positional("a")
            .keyword_only("a")
            .build();
        assert_eq!(sig.shape().unwrap_err().kind(), "invalid_signature");
    }

    #[test]
    fn defaulted_splat_is_invalid() {
        let sig = ParameterSignature::new(vec![
            Parameter::new("rest", ParamKind::VarPositional).with_default(json!([])),
        ]);
        assert_eq!(sig.shape().unwrap_err().kind(), "invalid_signature");
    }

    #[test]
    fn toml_table_matches_builder() {
        let table = r#"
            [[params]]
            name = "a"

            [[params]]
            name = "rest"
            kind = "var_positional"

            [[params]]
            name = "b"
            kind = "keyword_only"
            default = 1

            [[params]]
            name = "kw"
            kind = "var_keyword"
        "#;
        let parsed = ParameterSignature::from_toml_str(table).unwrap();
        assert_eq!(parsed, splat());
    }

    #[test]
    fn unknown_kind_in_table_is_rejected() {
        let table = r#"
            [[params]]
            name = "a"
            kind = "sometimes"
        "#;
        let err = ParameterSignature::from_toml_str(table).unwrap_err();
        assert_eq!(err.kind(), "toml");
    }

    #[test]
    fn required_flags() {
        let sig = splat();
        assert!(sig.get("a").unwrap().is_required());
        assert!(!sig.get("b").unwrap().is_required());
        assert!(!sig.get("rest").unwrap().is_required());
    }
}
