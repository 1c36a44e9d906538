//! Whole-schema checks that run after parsing completes.

use std::collections::HashSet;

use tracing::debug;

use super::{ForeignKeyClause, Schema, Table};
use crate::lexer::Span;
use crate::parser::{Diagnostic, DiagnosticKind};

/// Checks the invariants that only hold (or fail) across the whole
/// model: name uniqueness, the `WITHOUT ROWID` primary-key rule and
/// foreign-key resolution.
///
/// Problems come back as diagnostics; the model itself is untouched.
#[must_use]
pub fn validate(schema: &Schema) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let mut seen_tables: HashSet<String> = HashSet::new();
    for table in &schema.tables {
        if !seen_tables.insert(table.name.to_ascii_lowercase()) {
            diagnostics.push(Diagnostic::critical(
                DiagnosticKind::DuplicateTable,
                table.span,
                format!("table `{}` is declared more than once", table.name),
            ));
        }
        check_table(table, &mut diagnostics);
        for fk in &table.foreign_keys {
            check_local_columns(table, &fk.columns, fk.span, &mut diagnostics);
            check_target(schema, table, &fk.target, fk.columns.len(), fk.span, &mut diagnostics);
        }
        for column in &table.columns {
            if let Some(references) = &column.references {
                check_target(schema, table, references, 1, column.span, &mut diagnostics);
            }
        }
    }

    for binding in &schema.entity_bindings {
        if schema.table(&binding.table).is_none() {
            diagnostics.push(Diagnostic::critical(
                DiagnosticKind::UnresolvedReference,
                Span::default(),
                format!("mapping refers to unknown table `{}`", binding.table),
            ));
        }
    }

    debug!(
        tables = schema.tables.len(),
        queries = schema.queries.len(),
        problems = diagnostics.len(),
        "schema checked"
    );
    diagnostics
}

fn check_table(table: &Table, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen_columns: HashSet<String> = HashSet::new();
    for column in &table.columns {
        if !seen_columns.insert(column.name.to_ascii_lowercase()) {
            diagnostics.push(Diagnostic::critical(
                DiagnosticKind::DuplicateColumn,
                column.span,
                format!(
                    "column `{}` is declared more than once in `{}`",
                    column.name, table.name
                ),
            ));
        }
    }

    if table.without_rowid && !table.has_primary_key() {
        diagnostics.push(Diagnostic::critical(
            DiagnosticKind::MissingPrimaryKey,
            table.span,
            format!(
                "`{}` is WITHOUT ROWID but declares no primary key",
                table.name
            ),
        ));
    }

    for name in table
        .primary_key
        .iter()
        .chain(table.unique_constraints.iter().flatten())
    {
        if table.column(name).is_none() {
            diagnostics.push(Diagnostic::critical(
                DiagnosticKind::UnresolvedReference,
                table.span,
                format!("constraint on `{}` names unknown column `{name}`", table.name),
            ));
        }
    }
}

fn check_local_columns(
    table: &Table,
    columns: &[String],
    span: Span,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for name in columns {
        if table.column(name).is_none() {
            diagnostics.push(Diagnostic::critical(
                DiagnosticKind::UnresolvedReference,
                span,
                format!(
                    "foreign key on `{}` names unknown column `{name}`",
                    table.name
                ),
            ));
        }
    }
}

fn check_target(
    schema: &Schema,
    table: &Table,
    target: &ForeignKeyClause,
    local_arity: usize,
    span: Span,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(referenced) = schema.table(&target.table) else {
        diagnostics.push(Diagnostic::critical(
            DiagnosticKind::UnresolvedReference,
            span,
            format!(
                "foreign key on `{}` references unknown table `{}`",
                table.name, target.table
            ),
        ));
        return;
    };

    // An empty column list means the target's primary key.
    if target.columns.is_empty() {
        return;
    }

    if target.columns.len() != local_arity {
        diagnostics.push(Diagnostic::critical(
            DiagnosticKind::UnresolvedReference,
            span,
            format!(
                "foreign key on `{}` maps {local_arity} column(s) to {} in `{}`",
                table.name,
                target.columns.len(),
                target.table
            ),
        ));
    }

    for name in &target.columns {
        if referenced.column(name).is_none() {
            diagnostics.push(Diagnostic::critical(
                DiagnosticKind::UnresolvedReference,
                span,
                format!(
                    "foreign key on `{}` references unknown column `{}`.`{name}`",
                    table.name, target.table
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ColumnType, ForeignKey};

    fn column(name: &str) -> Column {
        Column {
            name: String::from(name),
            ty: ColumnType::from_raw("INTEGER"),
            nullable: true,
            default: None,
            primary_key: false,
            autoincrement: false,
            unique: false,
            references: None,
            span: Span::default(),
        }
    }

    fn table(name: &str, columns: Vec<Column>) -> Table {
        Table {
            name: String::from(name),
            columns,
            primary_key: vec![],
            unique_constraints: vec![],
            without_rowid: false,
            foreign_keys: vec![],
            mapped_class_name: None,
            span: Span::default(),
        }
    }

    fn schema(tables: Vec<Table>) -> Schema {
        Schema {
            tables,
            queries: vec![],
            entity_bindings: vec![],
        }
    }

    #[test]
    fn test_clean_schema_has_no_diagnostics() {
        let schema = schema(vec![table("a", vec![column("x")])]);
        assert!(validate(&schema).is_empty());
    }

    #[test]
    fn test_duplicate_table_is_case_insensitive() {
        let schema = schema(vec![table("users", vec![]), table("USERS", vec![])]);
        let diagnostics = validate(&schema);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::DuplicateTable);
        assert!(diagnostics[0].is_fatal());
    }

    #[test]
    fn test_duplicate_column() {
        let schema = schema(vec![table("t", vec![column("a"), column("A")])]);
        let diagnostics = validate(&schema);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::DuplicateColumn);
    }

    #[test]
    fn test_without_rowid_needs_primary_key() {
        let mut bad = table("t", vec![column("a")]);
        bad.without_rowid = true;
        let diagnostics = validate(&schema(vec![bad]));
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingPrimaryKey);

        let mut good = table("t", vec![column("a")]);
        good.without_rowid = true;
        good.columns[0].primary_key = true;
        assert!(validate(&schema(vec![good])).is_empty());
    }

    #[test]
    fn test_foreign_key_resolution() {
        let mut source = table("child", vec![column("a"), column("b")]);
        source.foreign_keys.push(ForeignKey {
            columns: vec![String::from("a"), String::from("b")],
            target: ForeignKeyClause {
                table: String::from("parent"),
                columns: vec![String::from("a"), String::from("b")],
                on_delete: None,
                on_update: None,
            },
            span: Span::default(),
        });
        let parent = table("parent", vec![column("a"), column("b")]);

        assert!(validate(&schema(vec![parent, source.clone()])).is_empty());

        // Unknown target table.
        let diagnostics = validate(&schema(vec![source.clone()]));
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnresolvedReference);

        // Arity mismatch.
        source.foreign_keys[0].target.columns.pop();
        let parent = table("parent", vec![column("a"), column("b")]);
        let diagnostics = validate(&schema(vec![parent, source]));
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnresolvedReference);
    }
}
