//! Data Metric Function catalog.
//!
//! A static, ordered mapping from metric names to SQL fragment templates.
//! Templates either contain a single `{column}` substitution point or are
//! column-independent.

#[cfg(test)]
mod tests;

use crate::sql::quote_ident;
use crate::{DqError, Result};

const COLUMN_PLACEHOLDER: &str = "{column}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmfFunction {
    pub name: &'static str,
    pub template: &'static str,
}

/// The catalog, in display order.
pub const DMF_FUNCTIONS: &[DmfFunction] = &[
    // Row level metrics
    DmfFunction {
        name: "ROW_COUNT",
        template: "COUNT(*)",
    },
    // Column level metrics
    DmfFunction {
        name: "NULL_COUNT",
        template: "COUNT_IF({column} IS NULL)",
    },
    DmfFunction {
        name: "NOT_NULL_COUNT",
        template: "COUNT_IF({column} IS NOT NULL)",
    },
    DmfFunction {
        name: "UNIQUE_COUNT",
        template: "COUNT(DISTINCT {column})",
    },
    DmfFunction {
        name: "DUPLICATE_COUNT",
        template: "COUNT({column}) - COUNT(DISTINCT {column})",
    },
    // Numeric metrics
    DmfFunction {
        name: "AVERAGE",
        template: "AVG({column})",
    },
    DmfFunction {
        name: "SUM",
        template: "SUM({column})",
    },
    DmfFunction {
        name: "MIN",
        template: "MIN({column})",
    },
    DmfFunction {
        name: "MAX",
        template: "MAX({column})",
    },
    DmfFunction {
        name: "STDDEV",
        template: "STDDEV({column})",
    },
    // Text metrics
    DmfFunction {
        name: "MIN_LENGTH",
        template: "MIN(LENGTH({column}))",
    },
    DmfFunction {
        name: "MAX_LENGTH",
        template: "MAX(LENGTH({column}))",
    },
    DmfFunction {
        name: "AVG_LENGTH",
        template: "AVG(LENGTH({column}))",
    },
];

/// Look up a metric by name.
#[inline]
pub fn find(name: &str) -> Option<&'static DmfFunction> {
    DMF_FUNCTIONS.iter().find(|f| f.name == name)
}

impl DmfFunction {
    /// Whether the template needs a column substituted before execution.
    #[inline]
    pub fn requires_column(&self) -> bool {
        self.template.contains(COLUMN_PLACEHOLDER)
    }

    /// Render the SQL fragment, substituting the quoted column identifier
    /// at every placeholder.
    #[inline]
    pub fn render(&self, column: Option<&str>) -> Result<String> {
        if !self.requires_column() {
            return Ok(self.template.to_string());
        }

        let column = column.ok_or_else(|| {
            DqError::Dmf(format!("function {} requires a column", self.name))
        })?;

        Ok(self
            .template
            .replace(COLUMN_PLACEHOLDER, &quote_ident(column)))
    }
}
