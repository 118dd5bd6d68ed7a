//! Filter and projection expressions
//!
//! `--filter` expressions select records, `--format` expressions reshape
//! them. Both share one small expression language:
//!
//! ```text
//! state="running" && name=~"^my.*"
//! nested.property.subproperty > 10
//! [id, 'name']
//! {"newKey": oldKey}
//! name + "," + type
//! ```
//!
//! Expressions are compiled once, before any request is sent, and evaluated
//! against every record.

mod eval;
mod lexer;
mod parser;

use crate::error::{Error, Result};
use parser::Expr;
use serde_json::Value;

/// A compiled `--filter` expression
#[derive(Debug, Clone)]
pub struct Filter {
    source: String,
    expr: Expr,
}

impl Filter {
    pub fn compile(source: &str) -> Result<Self> {
        let expr = parser::parse(source).map_err(|reason| Error::expression(source, reason))?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// Whether `record` satisfies the expression; evaluation errors reject it
    pub fn matches(&self, record: &Value) -> bool {
        match eval::evaluate(&self.expr, record) {
            Ok(Value::Bool(keep)) => keep,
            Ok(_) => false,
            Err(reason) => {
                tracing::debug!("Filter {:?} rejected a record: {}", self.source, reason);
                false
            }
        }
    }
}

/// Several filters combined with AND
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    /// Compile every expression; the first invalid one fails the whole set
    pub fn compile<S: AsRef<str>>(sources: &[S]) -> Result<Self> {
        let filters = sources
            .iter()
            .map(|s| Filter::compile(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { filters })
    }

    pub fn matches(&self, record: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    /// Keep the records matching every filter
    pub fn apply(&self, records: Vec<Value>) -> Vec<Value> {
        if self.filters.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// A compiled `--format` expression (also used for table columns)
#[derive(Debug, Clone)]
pub struct Projection {
    source: String,
    expr: Expr,
}

impl Projection {
    pub fn compile(source: &str) -> Result<Self> {
        let expr = parser::parse(source).map_err(|reason| Error::expression(source, reason))?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn apply(&self, record: &Value) -> Result<Value> {
        eval::evaluate(&self.expr, record).map_err(|reason| Error::expression(&self.source, reason))
    }

    pub fn apply_each(&self, records: &[Value]) -> Result<Vec<Value>> {
        records.iter().map(|r| self.apply(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Value> {
        vec![
            json!({"id": "1", "status": "ACTIVE", "region": "GRA11"}),
            json!({"id": "2", "status": "ACTIVE", "region": "BHS5"}),
            json!({"id": "3", "status": "ERROR", "region": "GRA9"}),
            json!({"id": "4", "status": "ACTIVE", "region": "GRA7"}),
            json!({"id": "5", "region": "GRA11"}),
        ]
    }

    fn ids(records: &[Value]) -> Vec<&str> {
        records.iter().filter_map(|r| r["id"].as_str()).collect()
    }

    #[test]
    fn test_status_and_region_filter() {
        let set = FilterSet::compile(&[r#"status="ACTIVE" && region=~"^GRA""#]).unwrap();
        assert_eq!(ids(&set.apply(records())), vec!["1", "4"]);
    }

    #[test]
    fn test_filters_are_and_combined() {
        let set = FilterSet::compile(&[r#"status=="ACTIVE""#, r#"region!="GRA11""#]).unwrap();
        assert_eq!(ids(&set.apply(records())), vec!["2", "4"]);
    }

    #[test]
    fn test_unsatisfiable_filter_is_empty_not_error() {
        let set = FilterSet::compile(&[r#"status="DELETED""#]).unwrap();
        assert!(set.apply(records()).is_empty());
    }

    #[test]
    fn test_malformed_filter_fails_compilation() {
        let err = FilterSet::compile(&[r#"status="ACTIVE""#, "region =="]).unwrap_err();
        assert!(matches!(err, Error::Expression { ref expression, .. } if expression == "region =="));
        assert!(FilterSet::compile(&[r#"name=~"(""#]).is_err());
    }

    #[test]
    fn test_numeric_path_segments() {
        let tagged = vec![
            json!({"id": "1", "tags": ["prod", "eu"], "nodes": [{"flavor": "b3-8"}]}),
            json!({"id": "2", "tags": ["dev"], "nodes": [{"flavor": "c3-4"}]}),
        ];
        let set = FilterSet::compile(&[r#"tags.0 == "prod""#]).unwrap();
        assert_eq!(ids(&set.apply(tagged.clone())), vec!["1"]);

        let set = FilterSet::compile(&[r#"nodes.0.flavor =~ "^c3""#]).unwrap();
        assert_eq!(ids(&set.apply(tagged.clone())), vec!["2"]);

        let projection = Projection::compile("[tags.1, tags[0]]").unwrap();
        assert_eq!(projection.apply(&tagged[0]).unwrap(), json!(["eu", "prod"]));
    }

    #[test]
    fn test_non_boolean_result_rejects() {
        let set = FilterSet::compile(&["region"]).unwrap();
        assert!(set.apply(records()).is_empty());
    }

    #[test]
    fn test_projection_errors_are_reported() {
        let projection = Projection::compile("[id, region]").unwrap();
        assert_eq!(
            projection.apply_each(&records()[..2]).unwrap(),
            vec![json!(["1", "GRA11"]), json!(["2", "BHS5"])]
        );

        let broken = Projection::compile("region * 2").unwrap();
        assert!(broken.apply(&records()[0]).is_err());
    }
}
