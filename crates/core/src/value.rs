//! Cell values of a result table.
//!
//! A `Value` is one binding in a result row: either an identifier resolved
//! through the index vocabulary, a literal, or unbound.

use alloc::string::{String, ToString};
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// Identifier of an entity in the index vocabulary.
pub type TermId = u64;

/// A single binding in a result row.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Unbound variable (e.g. the missing side of an optional join).
    #[default]
    Unbound,
    /// Vocabulary identifier, resolved by the index.
    Term(TermId),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// Plain text literal.
    Text(String),
}

impl Value {
    /// Returns true if the value is unbound.
    pub fn is_unbound(&self) -> bool {
        matches!(self, Value::Unbound)
    }

    /// Returns the vocabulary id if this is a term.
    pub fn as_term(&self) -> Option<TermId> {
        match self {
            Value::Term(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer literal.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float if this is a float literal.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the text if this is a text literal.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn type_order(&self) -> u8 {
        match self {
            Value::Unbound => 0,
            Value::Term(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Text(_) => 4,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unbound, Value::Unbound) => true,
            (Value::Term(a), Value::Term(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // NaN equals NaN so that rows stay usable as hash keys
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits() || a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Unbound => {}
            Value::Term(id) => id.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => {
                // +0.0 and -0.0 compare equal, so they must hash equal too
                let f = if *f == 0.0 { 0.0 } else { *f };
                f.to_bits().hash(state)
            }
            Value::Text(s) => s.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Term(a), Value::Term(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            // Equal magnitudes still order by type so that Ord agrees with Eq
            (Value::Int(a), Value::Float(b)) => cmp_int_float(*a, *b).then(Ordering::Less),
            (Value::Float(a), Value::Int(b)) => {
                cmp_int_float(*b, *a).reverse().then(Ordering::Greater)
            }
            (Value::Float(a), Value::Float(b)) => cmp_f64(*a, *b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.type_order().cmp(&other.type_order()),
        }
    }
}

/// NaN sorts after every other number; distinct NaN payloads order by bits.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    match a.partial_cmp(&b) {
        Some(ord) => ord,
        None => match (a.is_nan(), b.is_nan()) {
            (true, true) => a.to_bits().cmp(&b.to_bits()),
            (true, false) => Ordering::Greater,
            _ => Ordering::Less,
        },
    }
}

/// Exact comparison of an integer with a float, without rounding the
/// integer to 53 bits.
fn cmp_int_float(a: i64, b: f64) -> Ordering {
    // 2^63, the first float above i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if b.is_nan() || b >= LIMIT {
        return Ordering::Less;
    }
    if b < -LIMIT {
        return Ordering::Greater;
    }
    // In range, so the cast truncates exactly and `whole` is representable.
    let whole = b as i64;
    a.cmp(&whole).then_with(|| {
        (whole as f64)
            .partial_cmp(&b)
            .unwrap_or(Ordering::Equal)
    })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unbound => write!(f, "UNDEF"),
            Value::Term(id) => write!(f, "#{}", id),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Unbound,
        }
    }
}
