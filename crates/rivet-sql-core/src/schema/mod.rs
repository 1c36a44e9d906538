//! The schema model: tables, columns, constraints and named queries.

mod model;
mod validate;

pub use model::{
    ClauseKind, Column, ColumnType, EntityBinding, ForeignKey, ForeignKeyClause, NamedQuery,
    Placeholder, QueryFragment, ReferenceAction, Schema, Table,
};
pub use validate::validate;
