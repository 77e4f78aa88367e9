//! Field paths and value extraction.

use crate::error::{CoreError, CoreResult};
use logdex_codec::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step into message content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathStep {
    /// Member of a map. On arrays a numeric key selects the element.
    Key(String),
    /// Element of an array.
    Index(usize),
}

impl PathStep {
    fn apply<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        match (self, value) {
            (PathStep::Key(key), Value::Map(_)) => value.get(key),
            (PathStep::Key(key), Value::Array(_)) => value.get_index(key.parse().ok()?),
            (PathStep::Index(i), Value::Array(_)) => value.get_index(*i),
            (PathStep::Index(i), Value::Map(_)) => value.get(&i.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for PathStep {
    fn from(key: &str) -> Self {
        PathStep::Key(key.to_string())
    }
}

impl From<String> for PathStep {
    fn from(key: String) -> Self {
        PathStep::Key(key)
    }
}

impl From<usize> for PathStep {
    fn from(index: usize) -> Self {
        PathStep::Index(index)
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => f.write_str(key),
            PathStep::Index(i) => write!(f, "{i}"),
        }
    }
}

/// What an index extracts from each message.
///
/// The loose host form (`["author"]` versus `[["tags", 0], ["tags", 1]]`)
/// is classified once, when the definition is deserialized or built,
/// rather than on every extraction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSpec {
    /// A single field path; yields at most one value.
    Field(Vec<PathStep>),
    /// Independent sub-paths evaluated against the same message; their
    /// results are concatenated in declaration order.
    Alternatives(Vec<PathSpec>),
}

impl PathSpec {
    /// Builds a single field path.
    pub fn field<S, I>(steps: I) -> Self
    where
        S: Into<PathStep>,
        I: IntoIterator<Item = S>,
    {
        PathSpec::Field(steps.into_iter().map(Into::into).collect())
    }

    /// Builds a set of alternative sub-paths.
    pub fn alternatives(specs: impl IntoIterator<Item = PathSpec>) -> Self {
        PathSpec::Alternatives(specs.into_iter().collect())
    }

    /// Classifies the loose host form.
    ///
    /// A text value is a one-step path, an array of text or non-negative
    /// integers is a field path, and an array of arrays is a set of
    /// alternatives.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDefinition`] for empty specs, mixed
    /// arrays or elements that are not path steps.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        let spec = match value {
            Value::Text(key) => PathSpec::Field(vec![PathStep::Key(key.clone())]),
            Value::Array(items) if items.iter().all(|v| matches!(v, Value::Array(_))) => {
                PathSpec::Alternatives(
                    items
                        .iter()
                        .map(PathSpec::from_value)
                        .collect::<CoreResult<_>>()?,
                )
            }
            Value::Array(items) => PathSpec::Field(
                items
                    .iter()
                    .map(step_from_value)
                    .collect::<CoreResult<_>>()?,
            ),
            other => {
                return Err(CoreError::invalid_definition(format!(
                    "path spec must be text or an array, got {}",
                    other.type_name()
                )))
            }
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Extracts every value this spec matches in `content`.
    ///
    /// A field path whose steps do not all resolve, or that resolves to a
    /// falsy value (see [`Value::is_truthy`]), contributes nothing. Pure:
    /// the result depends only on the matched fields.
    pub fn extract(&self, content: &Value) -> Vec<Value> {
        let mut out = Vec::new();
        self.extract_into(content, &mut out);
        out
    }

    fn extract_into(&self, content: &Value, out: &mut Vec<Value>) {
        match self {
            PathSpec::Field(steps) => {
                if let Some(value) = lookup(content, steps).filter(|v| v.is_truthy()) {
                    out.push(value.clone());
                }
            }
            PathSpec::Alternatives(specs) => {
                for spec in specs {
                    spec.extract_into(content, out);
                }
            }
        }
    }

    /// Returns the steps if this is a single field path.
    pub fn as_field(&self) -> Option<&[PathStep]> {
        match self {
            PathSpec::Field(steps) => Some(steps),
            PathSpec::Alternatives(_) => None,
        }
    }

    /// Checks that the spec can extract anything at all.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDefinition`] for an empty field path or
    /// an empty set of alternatives, at any depth.
    pub fn validate(&self) -> CoreResult<()> {
        match self {
            PathSpec::Field(steps) if steps.is_empty() => {
                Err(CoreError::invalid_definition("path spec is empty"))
            }
            PathSpec::Field(_) => Ok(()),
            PathSpec::Alternatives(specs) if specs.is_empty() => Err(
                CoreError::invalid_definition("path spec has no alternatives"),
            ),
            PathSpec::Alternatives(specs) => specs.iter().try_for_each(PathSpec::validate),
        }
    }
}

/// Walks `steps` into `content`.
///
/// Unlike [`PathSpec::extract`] this keeps falsy values.
pub fn lookup<'a>(content: &'a Value, steps: &[PathStep]) -> Option<&'a Value> {
    steps.iter().try_fold(content, |value, step| step.apply(value))
}

fn step_from_value(value: &Value) -> CoreResult<PathStep> {
    match value {
        Value::Text(key) => Ok(PathStep::Key(key.clone())),
        Value::Integer(i) => usize::try_from(*i)
            .map(PathStep::Index)
            .map_err(|_| CoreError::invalid_definition(format!("negative path index {i}"))),
        other => Err(CoreError::invalid_definition(format!(
            "{} is not a path step",
            other.type_name()
        ))),
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSpec::Field(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "{step}")?;
                }
                Ok(())
            }
            PathSpec::Alternatives(specs) => {
                f.write_str("(")?;
                for (i, spec) in specs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{spec}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn post() -> Value {
        Value::object([
            ("author", Value::from("alice")),
            (
                "meta",
                Value::object([("lang", Value::from("en")), ("draft", Value::Bool(false))]),
            ),
            ("tags", Value::Array(vec![Value::from("x"), Value::from("y")])),
            ("score", Value::Integer(0)),
        ])
    }

    #[test]
    fn field_path_extracts_value() {
        assert_eq!(PathSpec::field(["author"]).extract(&post()), vec![Value::from("alice")]);
        assert_eq!(
            PathSpec::field(["meta", "lang"]).extract(&post()),
            vec![Value::from("en")]
        );
    }

    #[test]
    fn missing_step_yields_nothing() {
        assert!(PathSpec::field(["meta", "missing", "deeper"]).extract(&post()).is_empty());
        assert!(PathSpec::field(["author", "first"]).extract(&post()).is_empty());
    }

    #[test]
    fn falsy_values_are_dropped() {
        assert!(PathSpec::field(["meta", "draft"]).extract(&post()).is_empty());
        assert!(PathSpec::field(["score"]).extract(&post()).is_empty());
    }

    #[test]
    fn alternatives_concatenate_in_order() {
        let spec = PathSpec::alternatives([
            PathSpec::Field(vec![PathStep::from("tags"), PathStep::from(1)]),
            PathSpec::Field(vec![PathStep::from("tags"), PathStep::from(0)]),
            PathSpec::Field(vec![PathStep::from("tags"), PathStep::from(5)]),
        ]);
        assert_eq!(spec.extract(&post()), vec![Value::from("y"), Value::from("x")]);
    }

    #[test]
    fn nested_alternatives_flatten() {
        let spec = PathSpec::alternatives([
            PathSpec::field(["author"]),
            PathSpec::alternatives([PathSpec::field(["meta", "lang"]), PathSpec::field(["score"])]),
        ]);
        assert_eq!(spec.extract(&post()), vec![Value::from("alice"), Value::from("en")]);
    }

    #[test]
    fn numeric_key_selects_array_element() {
        assert_eq!(
            PathSpec::field(["tags", "1"]).extract(&post()),
            vec![Value::from("y")]
        );
    }

    #[test]
    fn lookup_keeps_falsy_values() {
        let steps = [PathStep::from("meta"), PathStep::from("draft")];
        assert_eq!(lookup(&post(), &steps), Some(&Value::Bool(false)));
        assert_eq!(lookup(&post(), &[]), Some(&post()));
    }

    #[test]
    fn whole_array_is_one_value() {
        assert_eq!(
            PathSpec::field(["tags"]).extract(&post()),
            vec![Value::Array(vec![Value::from("x"), Value::from("y")])]
        );
    }

    #[test]
    fn validation() {
        assert!(PathSpec::field(["a"]).validate().is_ok());
        assert!(PathSpec::Field(vec![]).validate().is_err());
        assert!(PathSpec::Alternatives(vec![]).validate().is_err());
        assert!(PathSpec::alternatives([PathSpec::field(["a"]), PathSpec::Field(vec![])])
            .validate()
            .is_err());
    }

    #[test]
    fn loose_json_form_is_classified() {
        let field: PathSpec = serde_json::from_str(r#"["author"]"#).unwrap();
        assert_eq!(field, PathSpec::field(["author"]));

        let alts: PathSpec = serde_json::from_str(r#"[["tags", 0], ["tags", 1]]"#).unwrap();
        assert_eq!(
            alts,
            PathSpec::alternatives([
                PathSpec::Field(vec![PathStep::from("tags"), PathStep::from(0)]),
                PathSpec::Field(vec![PathStep::from("tags"), PathStep::from(1)]),
            ])
        );

        assert_eq!(serde_json::to_string(&alts).unwrap(), r#"[["tags",0],["tags",1]]"#);
    }

    #[test]
    fn from_value_classifies() {
        let field = Value::Array(vec![Value::from("tags"), Value::Integer(0)]);
        assert_eq!(
            PathSpec::from_value(&field).unwrap(),
            PathSpec::Field(vec![PathStep::from("tags"), PathStep::from(0)])
        );

        let alts = Value::Array(vec![
            Value::Array(vec![Value::from("a")]),
            Value::Array(vec![Value::from("b")]),
        ]);
        assert_eq!(
            PathSpec::from_value(&alts).unwrap(),
            PathSpec::alternatives([PathSpec::field(["a"]), PathSpec::field(["b"])])
        );

        assert_eq!(
            PathSpec::from_value(&Value::from("author")).unwrap(),
            PathSpec::field(["author"])
        );
    }

    #[test]
    fn from_value_rejects_garbage() {
        for bad in [
            Value::Array(vec![]),
            Value::Null,
            Value::Array(vec![Value::from("a"), Value::Array(vec![])]),
            Value::Array(vec![Value::Integer(-1)]),
            Value::Array(vec![Value::Bool(true)]),
            Value::Array(vec![Value::Array(vec![])]),
        ] {
            assert!(
                matches!(
                    PathSpec::from_value(&bad),
                    Err(CoreError::InvalidDefinition { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn display() {
        let spec = PathSpec::alternatives([
            PathSpec::Field(vec![PathStep::from("tags"), PathStep::from(0)]),
            PathSpec::field(["author"]),
        ]);
        assert_eq!(spec.to_string(), "(tags.0 | author)");
    }

    proptest! {
        #[test]
        fn unrelated_fields_do_not_change_extraction(
            noise_key in "[a-z]{1,6}",
            noise in any::<i64>(),
        ) {
            prop_assume!(noise_key != "author");
            let spec = PathSpec::field(["author"]);
            let base = spec.extract(&post());

            let mut pairs = post().as_map().unwrap().to_vec();
            pairs.retain(|(k, _)| k.as_text() != Some(noise_key.as_str()));
            pairs.push((Value::Text(noise_key), Value::Integer(noise)));
            prop_assert_eq!(spec.extract(&Value::Map(pairs)), base);
        }
    }
}
