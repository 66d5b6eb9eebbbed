//! Sort directives for listing records.
//!
//! Directives use the `property[,property...][,asc|desc]` form accepted by
//! the `sort` query parameter, e.g. `id,desc` or `status_evaluacion`.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::entity::Evaluacion;
use crate::error::DbError;

/// Sortable record property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortProperty {
    Id,
    StatusEvaluacion,
}

impl FromStr for SortProperty {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortProperty::Id),
            "status_evaluacion" => Ok(SortProperty::StatusEvaluacion),
            other => Err(DbError::InvalidSort(format!("unknown property '{}'", other))),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }
}

/// A single sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub property: SortProperty,
    pub direction: Direction,
}

/// Ordered list of sort keys. An empty sort orders by id ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    /// Unsorted (falls back to id ascending).
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Sort by a single property.
    pub fn by(property: SortProperty, direction: Direction) -> Self {
        Self {
            orders: vec![Order {
                property,
                direction,
            }],
        }
    }

    /// Builds a sort from a sequence of raw `sort` parameter values.
    ///
    /// Blank values (`sort=` or only commas) are skipped.
    pub fn from_params<'a, I>(params: I) -> Result<Self, DbError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sort = Sort::default();
        for param in params {
            if param.split(',').all(|p| p.trim().is_empty()) {
                continue;
            }
            let parsed: Sort = param.parse()?;
            sort.orders.extend(parsed.orders);
        }
        Ok(sort)
    }

    /// Returns the sort keys in priority order.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Compares two records according to this sort.
    pub fn compare(&self, a: &Evaluacion, b: &Evaluacion) -> Ordering {
        for order in &self.orders {
            let ord = match order.property {
                SortProperty::Id => a.id.cmp(&b.id),
                SortProperty::StatusEvaluacion => a.status_evaluacion.cmp(&b.status_evaluacion),
            };
            let ord = match order.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.id.cmp(&b.id)
    }
}

impl FromStr for Sort {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let direction = match parts.last().and_then(|p| Direction::parse(p)) {
            Some(direction) => {
                parts.pop();
                direction
            }
            None => Direction::Asc,
        };

        if parts.is_empty() {
            return Err(DbError::InvalidSort(format!("no property in '{}'", s)));
        }

        let orders = parts
            .into_iter()
            .map(|p| {
                Ok(Order {
                    property: p.parse()?,
                    direction,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(Sort { orders })
    }
}
