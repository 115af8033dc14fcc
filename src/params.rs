//! Typed builders for the parameters SmartData endpoints document.
//!
//! Each type converts into the JSON object the endpoint expects, leaving out
//! options that were not set. Raw [`Value`] parameters are accepted wherever
//! these are, and are forwarded unchanged.

use serde::Serialize;
use serde_json::Value;

/// Page selection for list endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Rank (0-based) of the first result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    /// Number of results to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl Pagination {
    pub fn new(from: u64, size: u64) -> Self {
        Self {
            from: Some(from),
            size: Some(size),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Filter, sort and paging options for stream data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuery {
    /// Filter query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    /// Path of the field used to sort results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    /// Path of the field used to sort results lexicographically.
    #[serde(rename = "sortAField", skip_serializing_if = "Option::is_none")]
    pub sort_a_field: Option<String>,
    /// Path of the field used to sort results numerically.
    #[serde(rename = "sortNField", skip_serializing_if = "Option::is_none")]
    pub sort_n_field: Option<String>,
    /// Security token for external API authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl DataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    #[must_use]
    pub fn page(mut self, from: u64, size: u64) -> Self {
        self.from = Some(from);
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_field = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    #[must_use]
    pub fn sort_lexicographically_by(mut self, field: impl Into<String>) -> Self {
        self.sort_a_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn sort_numerically_by(mut self, field: impl Into<String>) -> Self {
        self.sort_n_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Distinct-values lookup for one stream field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValuesQuery {
    pub field: String,
    /// Only consider elements matching this query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl ValuesQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: None,
        }
    }

    #[must_use]
    pub fn matching(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// Proposed rename of a field path within a source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingProposal {
    /// Original field path.
    pub real_path: String,
    /// New name for the field.
    pub mapped_to: String,
}

macro_rules! into_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(params: $ty) -> Self {
                    // Only strings, integers and unit variants: cannot fail.
                    serde_json::to_value(params).unwrap_or_default()
                }
            }
        )+
    };
}

into_value!(Pagination, DataQuery, ValuesQuery, MappingProposal);

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{DataQuery, MappingProposal, Pagination, SortOrder, ValuesQuery};

    #[test]
    fn pagination_omits_unset_bounds() {
        assert_eq!(Value::from(Pagination::new(0, 2)), json!({"from": 0, "size": 2}));
        let only_size = Pagination {
            size: Some(5),
            ..Pagination::default()
        };
        assert_eq!(Value::from(only_size), json!({"size": 5}));
    }

    #[test]
    fn data_query_uses_wire_names() {
        let query = DataQuery::new()
            .query("temperature > 20")
            .page(10, 5)
            .sort_by("timestamp", SortOrder::Desc)
            .sort_numerically_by("value")
            .token("t0k");
        assert_eq!(
            Value::from(query),
            json!({
                "query": "temperature > 20",
                "from": 10,
                "size": 5,
                "sortOrder": "desc",
                "sortField": "timestamp",
                "sortNField": "value",
                "token": "t0k",
            })
        );
        assert_eq!(Value::from(DataQuery::new()), json!({}));
    }

    #[test]
    fn data_query_serializes_lexicographic_sort_and_ascending_order() {
        let query = DataQuery::new()
            .sort_by("name", SortOrder::Asc)
            .sort_lexicographically_by("label");
        assert_eq!(
            serde_json::to_value(&query).expect("serializes"),
            json!({"sortOrder": "asc", "sortField": "name", "sortAField": "label"})
        );
        assert_eq!(Value::from(query.clone()), serde_json::to_value(query).expect("serializes"));
    }

    #[test]
    fn values_query_and_mapping_proposal_shapes() {
        assert_eq!(
            Value::from(ValuesQuery::new("city").matching("country:fr")),
            json!({"field": "city", "query": "country:fr"})
        );
        let proposal = MappingProposal {
            real_path: "a.b".to_owned(),
            mapped_to: "label".to_owned(),
        };
        assert_eq!(
            Value::from(proposal),
            json!({"realPath": "a.b", "mappedTo": "label"})
        );
    }
}
