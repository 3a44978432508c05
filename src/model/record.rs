// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::errors::RecordError;

/// A named feature vector plus the version of the code that produced it.
///
/// `names[i]` labels `values[i]`; the constructor and the deserializer both
/// reject records where the two lengths differ. JSON has no literal for NaN
/// or the infinities, so those values are stored as the strings `"NaN"`,
/// `"inf"` and `"-inf"`.
///
/// ```
/// use plane_features::model::ResultRecord;
///
/// let record = ResultRecord::new(vec!["mean".into()], vec![3.5], "0").unwrap();
/// assert_eq!(record.get("mean"), Some(3.5));
/// assert!(ResultRecord::new(vec!["a".into()], vec![], "0").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct ResultRecord {
    names: Vec<String>,
    #[serde(serialize_with = "feature_values::serialize")]
    values: Vec<f64>,
    version: String,
}

#[derive(Deserialize)]
struct RawRecord {
    names: Vec<String>,
    #[serde(deserialize_with = "feature_values::deserialize")]
    values: Vec<f64>,
    version: String,
}

impl TryFrom<RawRecord> for ResultRecord {
    type Error = RecordError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        ResultRecord::new(raw.names, raw.values, raw.version)
    }
}

/// Feature values as JSON numbers, with non-finite values spelled out.
mod feature_values {
    use serde::de::{self, Deserializer};
    use serde::ser::{SerializeSeq, Serializer};
    use serde::Deserialize;

    const NAN: &str = "NaN";
    const INFINITY: &str = "inf";
    const NEG_INFINITY: &str = "-inf";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Number(f64),
        Named(String),
    }

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            if value.is_nan() {
                seq.serialize_element(NAN)?;
            } else if *value == f64::INFINITY {
                seq.serialize_element(INFINITY)?;
            } else if *value == f64::NEG_INFINITY {
                seq.serialize_element(NEG_INFINITY)?;
            } else {
                seq.serialize_element(value)?;
            }
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<Value>::deserialize(deserializer)?
            .into_iter()
            .map(|value| match value {
                Value::Number(number) => Ok(number),
                Value::Named(name) => match name.as_str() {
                    NAN => Ok(f64::NAN),
                    INFINITY => Ok(f64::INFINITY),
                    NEG_INFINITY => Ok(f64::NEG_INFINITY),
                    other => Err(de::Error::custom(format_args!(
                        "invalid feature value '{}', expected a number, \"{}\", \"{}\" or \"{}\"",
                        other, NAN, INFINITY, NEG_INFINITY
                    ))),
                },
            })
            .collect()
    }
}

impl ResultRecord {
    pub fn new(
        names: Vec<String>,
        values: Vec<f64>,
        version: impl Into<String>,
    ) -> Result<Self, RecordError> {
        if names.len() != values.len() {
            return Err(RecordError::LengthMismatch {
                names: names.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            names,
            values,
            version: version.into(),
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the first feature called `name`.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_preserves_record() {
        let record =
            ResultRecord::new(vec!["a".into(), "b".into()], vec![1.0, 2.0], "v1").unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let back: ResultRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.iter().collect::<Vec<_>>(), vec![("a", 1.0), ("b", 2.0)]);
    }

    #[test]
    fn deserializing_mismatched_lengths_fails() {
        let json = r#"{"names":["a","b"],"values":[1.0],"version":"0"}"#;
        let err = serde_json::from_str::<ResultRecord>(json).unwrap_err();
        assert!(err.to_string().contains("2 names but 1 values"));
    }

    #[test]
    fn non_finite_values_survive_json() {
        let record = ResultRecord::new(
            vec!["nan".into(), "inf".into(), "neg".into(), "mean".into()],
            vec![f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1.5],
            "v1",
        )
        .unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""values":["NaN","inf","-inf",1.5]"#), "{}", json);

        let back: ResultRecord = serde_json::from_str(&json).unwrap();
        assert!(back.values()[0].is_nan());
        assert_eq!(back.values()[1..], [f64::INFINITY, f64::NEG_INFINITY, 1.5]);
        assert_eq!(back.names(), record.names());
    }

    #[test]
    fn integer_values_are_accepted() {
        let json = r#"{"names":["count"],"values":[3],"version":"0"}"#;
        let record: ResultRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.get("count"), Some(3.0));
    }

    #[test]
    fn unknown_value_names_are_rejected() {
        let json = r#"{"names":["a"],"values":["huge"],"version":"0"}"#;
        let err = serde_json::from_str::<ResultRecord>(json).unwrap_err();
        assert!(err.to_string().contains("invalid feature value 'huge'"));
    }
}
