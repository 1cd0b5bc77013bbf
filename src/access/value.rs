use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Data types a record value can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Boolean,
    Integer,
    Float,
    Varchar,
    List,
}

impl DataType {
    /// Whether values of this type take part in numeric comparisons and aggregates
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }
}

/// Values held by records, literals and aggregate results
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Only produced for `IN` lists and membership conditions
    List(Vec<Value>),
}

impl Value {
    /// Get the data type of this value
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Integer(_) => Some(DataType::Integer),
            Value::Float(_) => Some(DataType::Float),
            Value::String(_) => Some(DataType::Varchar),
            Value::List(_) => Some(DataType::List),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        self.data_type().is_some_and(|t| t.is_numeric())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Truthiness used when a predicate result is coerced to a boolean.
    /// Null, false, zero, the empty string and the empty list are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    /// Order two non-NULL values of compatible types.
    ///
    /// Integers and floats compare numerically with each other, strings
    /// compare by code point and booleans with booleans. Anything else
    /// (NULL, lists, NaN, mixed types) is unorderable and yields `None`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Float(b)) => compare_int_float(*a, *b),
            (Value::Float(a), Value::Integer(b)) => {
                compare_int_float(*b, *a).map(Ordering::reverse)
            }
            _ => None,
        }
    }

    /// Membership test against a list value; non-list operands never contain anything
    pub fn is_contained_in(&self, list: &Value) -> bool {
        match list {
            Value::List(items) => items.iter().any(|item| item == self),
            _ => false,
        }
    }

    /// Case-insensitive substring test; both sides must be strings
    pub fn contains_text(&self, needle: &Value) -> bool {
        match (self, needle) {
            (Value::String(haystack), Value::String(needle)) => {
                haystack.to_lowercase().contains(&needle.to_lowercase())
            }
            _ => false,
        }
    }

    /// Hashable form used to bucket group keys, consistent with `PartialEq`
    pub(crate) fn group_key(&self) -> GroupKeyPart {
        match self {
            Value::Null => GroupKeyPart::Null,
            Value::Boolean(b) => GroupKeyPart::Boolean(*b),
            Value::Integer(i) => GroupKeyPart::Integer(*i),
            Value::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    GroupKeyPart::Integer(*f as i64)
                } else {
                    GroupKeyPart::Float(f.to_bits())
                }
            }
            Value::String(s) => GroupKeyPart::String(s.clone()),
            Value::List(items) => GroupKeyPart::List(items.iter().map(Value::group_key).collect()),
        }
    }
}

/// Exact ordering of an integer against a float, without rounding the
/// integer through `f64`. NaN is unordered.
fn compare_int_float(i: i64, f: f64) -> Option<Ordering> {
    // 2^63, the first float above every i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return None;
    }
    if f >= LIMIT {
        return Some(Ordering::Less);
    }
    if f < -LIMIT {
        return Some(Ordering::Greater);
    }
    match i.cmp(&(f.trunc() as i64)) {
        Ordering::Equal => 0.0f64.partial_cmp(&f.fract()),
        other => Some(other),
    }
}

/// Equality follows the usual dynamic-typing rules: integers and floats
/// compare by exact numeric value, every other pairing needs identical types.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                compare_int_float(*a, *b) == Some(Ordering::Equal)
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum GroupKeyPart {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(u64),
    String(String),
    List(Vec<GroupKeyPart>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type() {
        assert_eq!(Value::Null.data_type(), None);
        assert_eq!(Value::from(1).data_type(), Some(DataType::Integer));
        assert_eq!(Value::from(1.5).data_type(), Some(DataType::Float));
        assert_eq!(Value::from("a").data_type(), Some(DataType::Varchar));
        assert!(DataType::Float.is_numeric());
        assert!(!DataType::Varchar.is_numeric());
    }

    #[test]
    fn test_numeric_equality_across_types() {
        assert_eq!(Value::Integer(1), Value::Float(1.0));
        assert_ne!(Value::Integer(1), Value::String("1".to_string()));
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::Integer(0), Value::Float(-0.0));
        assert_ne!(Value::Integer(2), Value::Float(2.5));
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        // 2^53 + 1 has no exact f64 form and would round onto 2^53
        let big = Value::Integer(9_007_199_254_740_993);
        let near = Value::Float(9_007_199_254_740_992.0);
        assert_ne!(big, near);
        assert_ne!(near, big);
        assert_eq!(big.compare(&near), Some(Ordering::Greater));
        assert_eq!(near.compare(&big), Some(Ordering::Less));
        assert_eq!(Value::Integer(9_007_199_254_740_992), near);

        assert_eq!(Value::Integer(i64::MAX).compare(&Value::Float(9.3e18)), Some(Ordering::Less));
        assert_eq!(Value::Integer(i64::MIN), Value::Float(i64::MIN as f64));
        assert_ne!(Value::Integer(i64::MAX), Value::Float(i64::MAX as f64));
    }

    #[test]
    fn test_compare() {
        assert_eq!(Value::from(1).compare(&Value::from(2)), Some(Ordering::Less));
        assert_eq!(Value::from(2.5).compare(&Value::from(2)), Some(Ordering::Greater));
        assert_eq!(Value::from("b").compare(&Value::from("a")), Some(Ordering::Greater));
        assert_eq!(Value::from("1").compare(&Value::from(1)), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
        assert_eq!(Value::from(f64::NAN).compare(&Value::from(1)), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::from(true).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
    }

    #[test]
    fn test_membership_and_contains() {
        let list = Value::from(vec![1, 2, 3]);
        assert!(Value::from(2).is_contained_in(&list));
        assert!(Value::from(2.0).is_contained_in(&list));
        assert!(!Value::from(4).is_contained_in(&list));
        assert!(!Value::from(2).is_contained_in(&Value::from(2)));

        assert!(Value::from("Hello World").contains_text(&Value::from("WORLD")));
        assert!(!Value::from(12).contains_text(&Value::from("1")));
    }

    #[test]
    fn test_group_key_matches_equality() {
        assert_eq!(Value::from(3).group_key(), Value::from(3.0).group_key());
        assert_ne!(Value::from(3).group_key(), Value::from("3").group_key());

        let values = [
            Value::Integer(9_007_199_254_740_993),
            Value::Integer(9_007_199_254_740_992),
            Value::Float(9_007_199_254_740_992.0),
            Value::Float(-0.0),
            Value::Integer(0),
            Value::Float(0.5),
        ];
        for a in &values {
            for b in &values {
                assert_eq!(a == b, a.group_key() == b.group_key(), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::from(2.0).to_string(), "2.0");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "(a, b)");
    }

    #[test]
    fn test_serialize_untagged() -> anyhow::Result<()> {
        let json = serde_json::to_string(&Value::from(vec![
            Value::Null,
            Value::from(1),
            Value::from("x"),
        ]))?;
        assert_eq!(json, r#"[null,1,"x"]"#);
        Ok(())
    }
}
