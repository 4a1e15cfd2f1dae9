//! The criteria model: a validated, ordered set of filter conditions.
//!
//! Criteria are built from one of a closed set of input shapes ([`Filter`]):
//!
//! - [`Filter::All`] or an empty map: no restriction
//! - [`Filter::Map`]: a JSON object mapping field names to scalars (equality)
//!   or to operator descriptors such as `{"greater-than": 18}`, plus the
//!   `$and` / `$or` group keys
//! - [`Filter::Identity`]: a stored record used as criteria, matching on its
//!   identity only
//!
//! # Examples
//!
//! ```
//! use dblite_query::{build_criteria, translate, Filter};
//! use serde_json::json;
//!
//! let filter = Filter::try_from(json!({"name": "alice", "age": {"greater-or-equal": 21}}))?;
//! let criteria = build_criteria(filter)?;
//! let translation = translate(&criteria)?;
//!
//! assert_eq!(translation.fragment(), "name = ? AND age >= ?");
//! # Ok::<(), dblite_query::Error>(())
//! ```

use serde_json::Map;

use crate::error::{Error, Result};
use crate::field::Field;
use crate::value::Value;

/// Group key combining branches with AND.
pub const AND_KEY: &str = "$and";

/// Group key combining branches with OR.
pub const OR_KEY: &str = "$or";

/// A comparison applied to one field, carrying its operand.
///
/// One variant per supported SQL form. The operand shape is fixed by the
/// variant: scalar comparisons hold a single [`Value`], membership tests a
/// non-empty list, and the null test only a flag.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// `field = ?`
    Eq(Value),
    /// `field <> ?`
    Ne(Value),
    /// `field > ?`
    Gt(Value),
    /// `field >= ?`
    Gte(Value),
    /// `field < ?`
    Lt(Value),
    /// `field <= ?`
    Lte(Value),
    /// `field IN (?, ...)`
    In(Vec<Value>),
    /// `field NOT IN (?, ...)`
    NotIn(Vec<Value>),
    /// `field IS NULL` when `true`, `field IS NOT NULL` when `false`.
    Null(bool),
}

impl Operator {
    /// The descriptor key that selects this operator.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Eq(_) => "equals",
            Self::Ne(_) => "not-equals",
            Self::Gt(_) => "greater-than",
            Self::Gte(_) => "greater-or-equal",
            Self::Lt(_) => "less-than",
            Self::Lte(_) => "less-or-equal",
            Self::In(_) => "in-set",
            Self::NotIn(_) => "not-in-set",
            Self::Null(_) => "is-null",
        }
    }

    /// Build an operator from a descriptor key and its JSON operand.
    ///
    /// Each operator also answers to a short `$` alias (`$eq`, `$ne`, `$gt`,
    /// `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$null`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCriteria`] for unknown keys and for operands
    /// whose shape does not match the operator.
    pub fn from_descriptor(key: &str, operand: &serde_json::Value) -> Result<Self> {
        let operator = match key {
            "equals" | "$eq" => Self::Eq(scalar_operand(key, operand)?),
            "not-equals" | "$ne" => Self::Ne(scalar_operand(key, operand)?),
            "greater-than" | "$gt" => Self::Gt(scalar_operand(key, operand)?),
            "greater-or-equal" | "$gte" => Self::Gte(scalar_operand(key, operand)?),
            "less-than" | "$lt" => Self::Lt(scalar_operand(key, operand)?),
            "less-or-equal" | "$lte" => Self::Lte(scalar_operand(key, operand)?),
            "in-set" | "$in" => Self::In(sequence_operand(key, operand)?),
            "not-in-set" | "$nin" => Self::NotIn(sequence_operand(key, operand)?),
            "is-null" | "$null" => match operand {
                serde_json::Value::Bool(flag) => Self::Null(*flag),
                other => {
                    return Err(Error::invalid(format!(
                        "operator '{key}' expects a boolean, got {other}"
                    )));
                }
            },
            unknown => {
                return Err(Error::invalid(format!("unknown operator '{unknown}'")));
            }
        };
        operator.normalize()
    }

    /// Rewrite null comparisons into null tests and check operand shapes.
    ///
    /// `= NULL` and `<> NULL` never match in SQL, so `Eq(Null)` becomes
    /// `Null(true)` and `Ne(Null)` becomes `Null(false)`. Ordering
    /// comparisons and membership sets reject `Null` operands.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCriteria`] for empty membership sets and
    /// null operands that have no SQL meaning.
    pub fn normalize(self) -> Result<Self> {
        match self {
            Self::Eq(Value::Null) => Ok(Self::Null(true)),
            Self::Ne(Value::Null) => Ok(Self::Null(false)),
            Self::Gt(Value::Null)
            | Self::Gte(Value::Null)
            | Self::Lt(Value::Null)
            | Self::Lte(Value::Null) => Err(Error::invalid(format!(
                "operator '{}' cannot compare against null",
                self.key()
            ))),
            Self::In(ref values) | Self::NotIn(ref values) => {
                if values.is_empty() {
                    return Err(Error::invalid(format!(
                        "operator '{}' requires a non-empty set",
                        self.key()
                    )));
                }
                if values.iter().any(Value::is_null) {
                    return Err(Error::invalid(format!(
                        "operator '{}' does not accept null members, use 'is-null'",
                        self.key()
                    )));
                }
                Ok(self)
            }
            other => Ok(other),
        }
    }
}

fn scalar_operand(key: &str, operand: &serde_json::Value) -> Result<Value> {
    Value::from_json(operand).ok_or_else(|| {
        Error::invalid(format!(
            "operator '{key}' expects a scalar operand, got {operand}"
        ))
    })
}

fn sequence_operand(key: &str, operand: &serde_json::Value) -> Result<Vec<Value>> {
    let serde_json::Value::Array(items) = operand else {
        return Err(Error::invalid(format!(
            "operator '{key}' expects an array operand, got {operand}"
        )));
    };
    items
        .iter()
        .map(|item| {
            Value::from_json(item).ok_or_else(|| {
                Error::invalid(format!(
                    "operator '{key}' expects scalar members, got {item}"
                ))
            })
        })
        .collect()
}

/// How the branches of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Junction {
    /// Every branch must match.
    And,
    /// At least one branch must match.
    Or,
}

impl Junction {
    /// Parse a group key (`$and` / `$or`).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            AND_KEY => Some(Self::And),
            OR_KEY => Some(Self::Or),
            _ => None,
        }
    }

    /// SQL keyword joining the branches.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// One filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// A comparison on a single field.
    Condition {
        /// The column being tested.
        field: Field,
        /// The comparison and its operand.
        operator: Operator,
    },
    /// Branches combined with AND or OR.
    Group {
        /// How the branches combine.
        junction: Junction,
        /// The branches, each itself a conjunction of criteria.
        branches: Vec<Criteria>,
    },
}

impl Criterion {
    /// A comparison on `field`.
    #[must_use]
    pub fn new(field: Field, operator: Operator) -> Self {
        Self::Condition { field, operator }
    }

    /// Check the criterion and return it with its operator normalized.
    fn validated(self) -> Result<Self> {
        match self {
            Self::Condition { field, operator } => {
                if let Field::Column(name) = &field {
                    crate::field::validate_identifier(name)?;
                }
                Ok(Self::Condition {
                    field,
                    operator: operator.normalize()?,
                })
            }
            Self::Group { junction, branches } => {
                if branches.is_empty() {
                    return Err(Error::invalid(format!(
                        "group '{}' requires at least one branch",
                        junction.keyword()
                    )));
                }
                if branches.iter().any(Criteria::is_empty) {
                    return Err(Error::invalid(format!(
                        "group '{}' contains an empty branch",
                        junction.keyword()
                    )));
                }
                Ok(Self::Group { junction, branches })
            }
        }
    }
}

/// A validated filter: criteria combined with logical AND.
///
/// Never mutated after construction. An empty `Criteria` places no
/// restriction on the records it is applied to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    criteria: Vec<Criterion>,
}

impl Criteria {
    /// Criteria that match every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Validate and wrap a list of criteria.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCriteria`] if any criterion is malformed.
    pub fn new(criteria: Vec<Criterion>) -> Result<Self> {
        let criteria = criteria
            .into_iter()
            .map(Criterion::validated)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { criteria })
    }

    /// Start building criteria programmatically.
    #[must_use]
    pub fn builder() -> CriteriaBuilder {
        CriteriaBuilder::default()
    }

    /// Returns `true` if these criteria place no restriction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Number of top-level criteria.
    #[must_use]
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Iterate over the criteria in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Criterion> {
        self.criteria.iter()
    }
}

impl<'a> IntoIterator for &'a Criteria {
    type Item = &'a Criterion;
    type IntoIter = std::slice::Iter<'a, Criterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Caller-supplied filter input.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// No restriction.
    All,
    /// Field names mapped to scalars or operator descriptors.
    Map(Map<String, serde_json::Value>),
    /// Match a single stored record by its identity.
    Identity(i64),
}

impl From<Map<String, serde_json::Value>> for Filter {
    fn from(map: Map<String, serde_json::Value>) -> Self {
        Self::Map(map)
    }
}

impl From<Option<Map<String, serde_json::Value>>> for Filter {
    fn from(map: Option<Map<String, serde_json::Value>>) -> Self {
        map.map_or(Self::All, Self::Map)
    }
}

impl TryFrom<serde_json::Value> for Filter {
    type Error = Error;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Null => Ok(Self::All),
            serde_json::Value::Object(map) => Ok(Self::Map(map)),
            other => Err(Error::invalid(format!(
                "filter must be an object or null, got {other}"
            ))),
        }
    }
}

/// Normalize caller input into validated [`Criteria`].
///
/// # Errors
///
/// Returns [`Error::InvalidCriteria`] when a field name is not
/// identifier-safe, an operator key is unknown, a descriptor does not hold
/// exactly one operator, or an operand does not fit its operator.
pub fn build_criteria(input: Filter) -> Result<Criteria> {
    let criteria = match input {
        Filter::All => Vec::new(),
        Filter::Map(map) => criteria_from_map(&map)?,
        Filter::Identity(id) => vec![Criterion::new(
            Field::Identity,
            Operator::Eq(Value::Integer(id)),
        )],
    };
    tracing::trace!(count = criteria.len(), "Built criteria");
    Ok(Criteria { criteria })
}

fn criteria_from_map(map: &Map<String, serde_json::Value>) -> Result<Vec<Criterion>> {
    map.iter()
        .map(|(key, value)| criterion_from_entry(key, value))
        .collect()
}

fn criterion_from_entry(key: &str, value: &serde_json::Value) -> Result<Criterion> {
    if let Some(junction) = Junction::from_key(key) {
        return group_from_json(junction, value);
    }

    let field = Field::parse(key)?;
    let operator = match value {
        serde_json::Value::Object(descriptor) => operator_from_descriptor(key, descriptor)?,
        serde_json::Value::Array(_) => {
            return Err(Error::invalid(format!(
                "field '{key}' cannot be compared to an array, use 'in-set'"
            )));
        }
        scalar => Operator::Eq(scalar_operand("equals", scalar)?).normalize()?,
    };
    Ok(Criterion::new(field, operator))
}

fn operator_from_descriptor(
    field: &str,
    descriptor: &Map<String, serde_json::Value>,
) -> Result<Operator> {
    let mut entries = descriptor.iter();
    match (entries.next(), entries.next()) {
        (Some((key, operand)), None) => Operator::from_descriptor(key, operand),
        (None, _) => Err(Error::invalid(format!(
            "field '{field}' has an empty operator descriptor"
        ))),
        (Some(_), Some(_)) => Err(Error::invalid(format!(
            "field '{field}' has more than one operator in its descriptor"
        ))),
    }
}

fn group_from_json(junction: Junction, value: &serde_json::Value) -> Result<Criterion> {
    let serde_json::Value::Array(items) = value else {
        return Err(Error::invalid(format!(
            "group '{}' expects an array of objects, got {value}",
            junction.keyword()
        )));
    };

    let branches = items
        .iter()
        .map(|item| match item {
            serde_json::Value::Object(map) => {
                criteria_from_map(map).map(|criteria| Criteria { criteria })
            }
            other => Err(Error::invalid(format!(
                "group '{}' expects object branches, got {other}",
                junction.keyword()
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    Criterion::Group { junction, branches }.validated()
}

/// Fluent construction of [`Criteria`] from Rust values.
///
/// The first invalid condition is remembered and reported by
/// [`build`](Self::build).
///
/// ```
/// use dblite_query::{translate, Criteria};
///
/// let criteria = Criteria::builder()
///     .eq("name", "alice")
///     .gte("age", 21)
///     .build()?;
/// assert_eq!(translate(&criteria)?.fragment(), "name = ? AND age >= ?");
/// # Ok::<(), dblite_query::Error>(())
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct CriteriaBuilder {
    criteria: Vec<Criterion>,
    error: Option<Error>,
}

impl CriteriaBuilder {
    /// Add a condition with an explicit operator.
    pub fn condition(mut self, field: &str, operator: Operator) -> Self {
        if self.error.is_some() {
            return self;
        }
        match Field::parse(field).and_then(|field| Criterion::new(field, operator).validated()) {
            Ok(criterion) => self.criteria.push(criterion),
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// `field = value`
    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.condition(field, Operator::Eq(value.into()))
    }

    /// `field <> value`
    pub fn ne(self, field: &str, value: impl Into<Value>) -> Self {
        self.condition(field, Operator::Ne(value.into()))
    }

    /// `field > value`
    pub fn gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.condition(field, Operator::Gt(value.into()))
    }

    /// `field >= value`
    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.condition(field, Operator::Gte(value.into()))
    }

    /// `field < value`
    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.condition(field, Operator::Lt(value.into()))
    }

    /// `field <= value`
    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.condition(field, Operator::Lte(value.into()))
    }

    /// `field IN (values...)`
    pub fn is_in<V: Into<Value>>(self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.condition(field, Operator::In(values.into_iter().map(Into::into).collect()))
    }

    /// `field NOT IN (values...)`
    pub fn not_in<V: Into<Value>>(self, field: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.condition(
            field,
            Operator::NotIn(values.into_iter().map(Into::into).collect()),
        )
    }

    /// `field IS NULL`
    pub fn is_null(self, field: &str) -> Self {
        self.condition(field, Operator::Null(true))
    }

    /// `field IS NOT NULL`
    pub fn is_not_null(self, field: &str) -> Self {
        self.condition(field, Operator::Null(false))
    }

    /// Match when any of `branches` matches.
    pub fn any(self, branches: impl IntoIterator<Item = Criteria>) -> Self {
        self.group(Junction::Or, branches)
    }

    /// Match when all of `branches` match.
    pub fn all(self, branches: impl IntoIterator<Item = Criteria>) -> Self {
        self.group(Junction::And, branches)
    }

    fn group(mut self, junction: Junction, branches: impl IntoIterator<Item = Criteria>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let group = Criterion::Group {
            junction,
            branches: branches.into_iter().collect(),
        };
        match group.validated() {
            Ok(group) => self.criteria.push(group),
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Finish building.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::InvalidCriteria`] recorded while building.
    pub fn build(self) -> Result<Criteria> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(Criteria {
                criteria: self.criteria,
            }),
        }
    }
}
