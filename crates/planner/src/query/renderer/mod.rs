//! Defines the core rendering trait and context for converting AST to SQL.

use crate::query::{ast::common::TableRef, dialect::Dialect};

pub mod create_index;
pub mod create_table;
pub mod delete;
pub mod drop_table;
pub mod expr;
pub mod insert;
pub mod probe;
pub mod rename;
pub mod select;
pub mod truncate;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// A context that holds the state during the rendering process.
///
/// Values are always inlined as literals through the dialect, so the
/// renderer only accumulates SQL text.
pub struct Renderer<'a> {
    pub sql: String,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            dialect,
        }
    }

    /// Consumes the renderer and returns the final SQL string.
    pub fn finish(self) -> String {
        self.sql
    }

    pub fn push_identifier(&mut self, ident: &str) {
        let quoted = self.dialect.quote_identifier(ident);
        self.sql.push_str(&quoted);
    }

    /// Pushes a comma separated list of quoted identifiers.
    pub fn push_identifiers(&mut self, idents: &[String]) {
        let quoted: Vec<String> = idents
            .iter()
            .map(|c| self.dialect.quote_identifier(c))
            .collect();
        self.sql.push_str(&quoted.join(", "));
    }

    pub fn render_table_ref(&mut self, table: &TableRef) {
        self.sql.push_str(&self.qualified_name(table));
    }

    /// `[schema].[name]`, or `[name]` when the schema is unset.
    pub fn qualified_name(&self, table: &TableRef) -> String {
        match &table.schema {
            Some(schema) => format!(
                "{}.{}",
                self.dialect.quote_identifier(schema),
                self.dialect.quote_identifier(&table.name)
            ),
            None => self.dialect.quote_identifier(&table.name),
        }
    }
}
