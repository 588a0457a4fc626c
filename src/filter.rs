//! Row filters and table queries
//!
//! A [`Query`] selects columns of a stored table and filters its rows on the
//! server. Each [`RowFilter`] compares one column against a typed scalar.
//!
//! ## Wire Encoding
//! ```text
//! {"key":..,"columns":[..],"filterlogic":"AND","filter":[
//!     {"col":..,"filter_type":"gte","data_type":"IN","value":5}
//! ],"cachetime":0}
//! ```
//! Dates travel as integer days since 1970-01-01 and datetimes as
//! nanoseconds since the epoch (a float).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};

use crate::error::{CupidError, Result};

// =============================================================================
// Operators and Types
// =============================================================================

/// Comparison operator of a row filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Gte,
    Gt,
    Lte,
    Lt,
    Eq,
    Ne,
}

impl FromStr for FilterOp {
    type Err = CupidError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gte" => Ok(FilterOp::Gte),
            "gt" => Ok(FilterOp::Gt),
            "lte" => Ok(FilterOp::Lte),
            "lt" => Ok(FilterOp::Lt),
            "eq" => Ok(FilterOp::Eq),
            "ne" => Ok(FilterOp::Ne),
            other => Err(CupidError::InvalidFilter(format!(
                "unsupported operator {:?}",
                other
            ))),
        }
    }
}

/// Declared semantic type of a filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Int,
    Float,
    Date,
    DateTime,
}

impl FilterType {
    /// Two-letter type tag sent as `data_type`
    pub fn wire_tag(self) -> &'static str {
        match self {
            FilterType::Int => "IN",
            FilterType::Float => "FL",
            FilterType::Date => "DA",
            FilterType::DateTime => "DT",
        }
    }

    /// Parse a textual value according to this type
    ///
    /// Dates use `YYYY-MM-DD`, datetimes RFC 3339.
    pub fn parse_value(self, text: &str) -> Result<FilterValue> {
        let bad = |e: &dyn fmt::Display| {
            CupidError::InvalidFilter(format!("cannot parse {:?} as {}: {}", text, self, e))
        };
        match self {
            FilterType::Int => text.parse().map(FilterValue::Int).map_err(|e| bad(&e)),
            FilterType::Float => text.parse().map(FilterValue::Float).map_err(|e| bad(&e)),
            FilterType::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(FilterValue::Date)
                .map_err(|e| bad(&e)),
            FilterType::DateTime => DateTime::parse_from_rfc3339(text)
                .map(|dt| FilterValue::DateTime(dt.with_timezone(&Utc)))
                .map_err(|e| bad(&e)),
        }
    }
}

impl FromStr for FilterType {
    type Err = CupidError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int" => Ok(FilterType::Int),
            "float" => Ok(FilterType::Float),
            "date" => Ok(FilterType::Date),
            "datetime" => Ok(FilterType::DateTime),
            other => Err(CupidError::InvalidFilter(format!(
                "unsupported data type {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterType::Int => "int",
            FilterType::Float => "float",
            FilterType::Date => "date",
            FilterType::DateTime => "datetime",
        })
    }
}

/// Scalar compared against a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl FilterValue {
    pub fn filter_type(&self) -> FilterType {
        match self {
            FilterValue::Int(_) => FilterType::Int,
            FilterValue::Float(_) => FilterType::Float,
            FilterValue::Date(_) => FilterType::Date,
            FilterValue::DateTime(_) => FilterType::DateTime,
        }
    }

    /// Value as it appears in the query text
    pub fn to_wire(&self) -> WireScalar {
        match self {
            FilterValue::Int(v) => WireScalar::Int(*v),
            FilterValue::Float(v) => WireScalar::Float(*v),
            FilterValue::Date(d) => WireScalar::Int(days_since_epoch(*d)),
            FilterValue::DateTime(dt) => WireScalar::Float(nanos_since_epoch(dt)),
        }
    }
}

/// Coerced filter scalar
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireScalar {
    Int(i64),
    Float(f64),
}

fn days_since_epoch(date: NaiveDate) -> i64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    date.signed_duration_since(epoch).num_days()
}

fn nanos_since_epoch(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp() as f64 * 1e9 + f64::from(dt.timestamp_subsec_nanos())
}

// =============================================================================
// RowFilter
// =============================================================================

/// One server-side filter term
#[derive(Debug, Clone, PartialEq)]
pub struct RowFilter {
    column: String,
    op: FilterOp,
    value: FilterValue,
}

impl RowFilter {
    /// Build a filter whose type follows from the value
    pub fn new(column: impl Into<String>, op: FilterOp, value: FilterValue) -> Self {
        Self {
            column: column.into(),
            op,
            value,
        }
    }

    /// Build a filter, checking the value against a declared type
    pub fn typed(
        column: impl Into<String>,
        op: FilterOp,
        value: FilterValue,
        declared: FilterType,
    ) -> Result<Self> {
        if value.filter_type() != declared {
            return Err(CupidError::InvalidFilter(format!(
                "declared type {} does not match {} value",
                declared,
                value.filter_type()
            )));
        }
        Ok(Self::new(column, op, value))
    }

    /// Build a filter from operator and type names
    pub fn parse(
        column: impl Into<String>,
        op: &str,
        value: FilterValue,
        data_type: &str,
    ) -> Result<Self> {
        Self::typed(column, op.parse()?, value, data_type.parse()?)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn op(&self) -> FilterOp {
        self.op
    }

    pub fn value(&self) -> FilterValue {
        self.value
    }

    pub fn data_type(&self) -> FilterType {
        self.value.filter_type()
    }
}

#[derive(Serialize)]
struct WireFilter<'a> {
    col: &'a str,
    filter_type: FilterOp,
    data_type: &'static str,
    value: WireScalar,
}

impl Serialize for RowFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        WireFilter {
            col: &self.column,
            filter_type: self.op,
            data_type: self.data_type().wire_tag(),
            value: self.value.to_wire(),
        }
        .serialize(serializer)
    }
}

// =============================================================================
// Query
// =============================================================================

/// How multiple filters combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum FilterLogic {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

/// A table read: projection, filters and result caching
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    key: String,
    /// Requested columns; empty selects all
    columns: Vec<String>,
    #[serde(rename = "filterlogic")]
    logic: FilterLogic,
    #[serde(rename = "filter")]
    filters: Vec<RowFilter>,
    /// Server-side result cache lifetime in milliseconds
    #[serde(rename = "cachetime")]
    cache_ms: u64,
}

impl Query {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            columns: Vec::new(),
            logic: FilterLogic::And,
            filters: Vec::new(),
            cache_ms: 0,
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, filter: RowFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = RowFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn logic(mut self, logic: FilterLogic) -> Self {
        self.logic = logic;
        self
    }

    /// Cache the filtered result on the server for `ttl`
    pub fn cache_for(mut self, ttl: Duration) -> Self {
        self.cache_ms = ttl.as_millis() as u64;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn filter_list(&self) -> &[RowFilter] {
        &self.filters
    }

    /// Compact JSON text sent as the `GA` payload
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
