use super::{Record, Relation, Scalar};
use serde_json::Value;

/// Any value a backend can hand back, or a task can declare as its expected answer.
///
/// The variants are the four shapes the normalizer knows how to turn into a
/// [`Relation`], checked in this order.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Already tabular, passes through normalization unchanged.
    Table(Relation),
    /// A sequence of row records; columns come from the first record.
    Records(Vec<Record>),
    /// A sequence of bare values; becomes a single-column relation.
    Sequence(Vec<Scalar>),
    /// Anything else; becomes a one-row, one-column relation.
    Scalar(Scalar),
}

impl Output {
    /// Classifies an arbitrary JSON value.
    ///
    /// An array whose first element is an object is a record sequence; any
    /// other array is a scalar sequence. A lone object is a single record.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                if matches!(items.first(), Some(v @ Value::Object(_)) if Scalar::non_finite(v).is_none()) {
                    Output::Records(items.into_iter().map(record_from_json).collect())
                } else {
                    Output::Sequence(items.into_iter().map(Scalar::from_json).collect())
                }
            }
            obj @ Value::Object(_) if Scalar::non_finite(&obj).is_none() => {
                Output::Records(vec![record_from_json(obj)])
            }
            other => Output::Scalar(Scalar::from_json(other)),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Output::Table(_) => "table",
            Output::Records(_) => "records",
            Output::Sequence(_) => "sequence",
            Output::Scalar(_) => "scalar",
        }
    }
}

fn record_from_json(value: Value) -> Record {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| (k, Scalar::from_json(v)))
            .collect(),
        // a stray non-object inside a record list is kept under the positional column
        other => std::iter::once(("0".to_string(), Scalar::from_json(other))).collect(),
    }
}

impl From<Relation> for Output {
    fn from(rel: Relation) -> Self {
        Output::Table(rel)
    }
}

impl From<Scalar> for Output {
    fn from(s: Scalar) -> Self {
        Output::Scalar(s)
    }
}

impl From<Vec<Scalar>> for Output {
    fn from(seq: Vec<Scalar>) -> Self {
        Output::Sequence(seq)
    }
}

impl From<Vec<Record>> for Output {
    fn from(records: Vec<Record>) -> Self {
        Output::Records(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_json() {
        assert_eq!(Output::from_json(json!(6)), Output::Scalar(Scalar::Int(6)));
    }

    #[test]
    fn test_sequence_json() {
        assert_eq!(
            Output::from_json(json!([3, 2, 1])),
            Output::Sequence(vec![Scalar::Int(3), Scalar::Int(2), Scalar::Int(1)])
        );
        assert_eq!(Output::from_json(json!([])), Output::Sequence(vec![]));
    }

    #[test]
    fn test_records_keep_key_order() {
        let out = Output::from_json(json!([{"z": 1, "a": "x"}]));
        match out {
            Output::Records(records) => {
                let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["z", "a"]);
            }
            other => panic!("expected records, got {}", other.shape()),
        }
    }

    #[test]
    fn test_non_finite_floats_are_not_records() {
        assert_eq!(
            Output::from_json(json!({"$float": "inf"})),
            Output::Scalar(Scalar::Float(f64::INFINITY))
        );
        assert_eq!(
            Output::from_json(json!([{"$float": "-inf"}, 1.5])),
            Output::Sequence(vec![Scalar::Float(f64::NEG_INFINITY), Scalar::Float(1.5)])
        );
    }

    #[test]
    fn test_lone_object_is_single_record() {
        assert_eq!(Output::from_json(json!({"a": 1})).shape(), "records");
    }
}
