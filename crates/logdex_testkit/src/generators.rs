//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random key values, message content
//! and index names that satisfy the view's input invariants.

use logdex_codec::Value;
use logdex_core::{LogId, Message};
use proptest::prelude::*;

/// Strategy for key-encodable scalars.
///
/// Floats are finite, so every generated value has a well-defined order.
pub fn scalar_key_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e12f64..1.0e12).prop_map(Value::Float),
        "[a-z0-9 ]{0,12}".prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(Value::Bytes),
    ]
}

/// Strategy for key-encodable values, including nested arrays.
pub fn key_value_strategy() -> impl Strategy<Value = Value> {
    scalar_key_strategy().prop_recursive(3, 16, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Value::Array)
    })
}

/// Strategy for key tuples of one to three elements.
pub fn key_tuple_strategy() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(key_value_strategy(), 1..4)
}

/// Strategy for message content.
///
/// Produces maps over a small fixed field vocabulary so that generated
/// index paths hit something reasonably often.
pub fn content_strategy() -> impl Strategy<Value = Value> {
    let field = prop_oneof![
        Just("author"),
        Just("tags"),
        Just("likes"),
        Just("title"),
    ];
    prop::collection::vec((field, key_value_strategy()), 0..4).prop_map(|pairs| {
        let mut fields: Vec<(&str, Value)> = Vec::new();
        for (name, value) in pairs {
            if !fields.iter().any(|(existing, _)| *existing == name) {
                fields.push((name, value));
            }
        }
        Value::object(fields)
    })
}

/// Strategy for valid index names.
pub fn index_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,15}").expect("Invalid regex")
}

/// Strategy for log identifiers drawn from a small pool.
pub fn log_id_strategy() -> impl Strategy<Value = LogId> {
    (0u8..4).prop_map(|n| LogId::new(format!("L{n}")))
}

/// Strategy for standalone messages.
pub fn message_strategy() -> impl Strategy<Value = Message> {
    (log_id_strategy(), 0u64..1000, content_strategy())
        .prop_map(|(log, sequence, content)| Message::new(log, sequence, content))
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
