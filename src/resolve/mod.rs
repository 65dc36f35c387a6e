//! Type validation and constant resolution.
//!
//! The resolver is a single left-to-right pass over every const block in
//! every input file. Each block gets its own auto-increment state; the
//! value of each matched entry is decided by a closed match over the
//! classified expression shapes.

mod literals;

use crate::Options;
use crate::ast::{BinaryOp, ConstBlock, ConstEntry, Decl, File, Underlying, ValueExpr};
use crate::error::{AnalyzeError, ErrorKind};
use std::collections::HashMap;

/// The reserved auto-increment placeholder.
const IOTA: &str = "iota";

/// Primitive integer kinds a target type may alias.
pub const ALLOWED_INTEGER_TYPES: &[&str] = &[
    "byte", "int", "int8", "int16", "int32", "int64", "rune", "uint", "uint8", "uint16", "uint32",
    "uint64",
];

/// Check that `type_name`, wherever it is declared, aliases a primitive
/// integer kind. A type declared nowhere passes; absence surfaces
/// downstream as an empty resolution.
pub fn validate_type(files: &[File], type_name: &str) -> Result<(), AnalyzeError> {
    for file in files {
        for decl in &file.decls {
            let Decl::Type(ty) = decl else { continue };
            if ty.name != type_name {
                continue;
            }
            match &ty.underlying {
                Underlying::Named(ident) if ALLOWED_INTEGER_TYPES.contains(&ident.as_str()) => {}
                Underlying::Named(ident) => {
                    return Err(AnalyzeError::new(
                        ErrorKind::NotIntegerAlias,
                        format!(
                            "expected an integer type for the definition of {}; got {}",
                            type_name, ident
                        ),
                    )
                    .with_span(ty.span)
                    .with_file(&file.name));
                }
                Underlying::Other(kind) => {
                    return Err(AnalyzeError::new(
                        ErrorKind::NotIntegerAlias,
                        format!(
                            "expected an identifier for the definition of {}; got {}",
                            type_name, kind
                        ),
                    )
                    .with_span(ty.span)
                    .with_file(&file.name));
                }
            }
        }
    }
    Ok(())
}

/// Resolution output: enumerator names in first-declaration order plus
/// the value and display-text maps. The two maps are always populated
/// together; a name present in one is present in the other.
#[derive(Debug, Default)]
pub struct ResolvedTable {
    pub order: Vec<String>,
    pub values: HashMap<String, i64>,
    pub displays: HashMap<String, String>,
}

impl ResolvedTable {
    /// Record an enumerator. A repeated name overwrites its value and
    /// display text but keeps its original ordering position.
    pub fn insert(&mut self, name: &str, value: i64, display: impl Into<String>) {
        if !self.values.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.values.insert(name.to_string(), value);
        self.displays.insert(name.to_string(), display.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() || self.displays.is_empty()
    }
}

/// Block-scoped auto-increment state, re-created at each const block.
#[derive(Debug, Default)]
struct AutoIncrement {
    counter: i64,
    active: bool,
}

impl AutoIncrement {
    /// Use the current counter value and advance past it.
    fn take(&mut self) -> i64 {
        let value = self.counter;
        self.counter += 1;
        value
    }
}

/// Walks const blocks and produces the [`ResolvedTable`] for the target
/// type.
pub struct Resolver<'a> {
    options: &'a Options,
}

impl<'a> Resolver<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    pub fn resolve(&self, files: &[File]) -> Result<ResolvedTable, AnalyzeError> {
        let mut table = ResolvedTable::default();
        for file in files {
            for decl in &file.decls {
                let Decl::Const(block) = decl else { continue };
                self.resolve_block(file, block, &mut table)?;
            }
        }
        if table.is_empty() {
            return Err(AnalyzeError::new(
                ErrorKind::InsufficientConstants,
                format!(
                    "did not find enough constant values for type {}",
                    self.options.type_name
                ),
            ));
        }
        Ok(table)
    }

    fn resolve_block(
        &self,
        file: &File,
        block: &ConstBlock,
        table: &mut ResolvedTable,
    ) -> Result<(), AnalyzeError> {
        let mut state = AutoIncrement::default();
        // Untyped entries inherit the type of the previous entry; an
        // explicit different type ends the inheritance.
        let mut inherits = false;
        for entry in &block.entries {
            match entry.type_name.as_deref() {
                Some(ty) if ty == self.options.type_name => inherits = true,
                Some(_) => {
                    inherits = false;
                    continue;
                }
                None if !inherits => continue,
                None => {}
            }

            if entry.names.len() != 1 {
                return Err(self.entry_error(
                    ErrorKind::MultiNameConstant,
                    format!(
                        "expected one name for a constant of type {}; found {}",
                        self.options.type_name,
                        entry.names.join(", ")
                    ),
                    entry,
                    file,
                ));
            }
            let name = &entry.names[0];

            let value = match entry.values.as_slice() {
                [] => {
                    if state.active {
                        state.take()
                    } else {
                        0
                    }
                }
                [expr] => self.eval(expr, name, entry, file, &mut state, table)?,
                values => {
                    return Err(self.entry_error(
                        ErrorKind::UnsupportedExpression,
                        format!(
                            "expected one value for constant {}; found {}",
                            name,
                            values.len()
                        ),
                        entry,
                        file,
                    ));
                }
            };

            // Discard entries advance the counter but are never emitted.
            if entry.is_discard() {
                continue;
            }
            table.insert(name, value, self.display_name(name, entry));
        }
        Ok(())
    }

    /// Decide an entry's value. Every expression shape is matched here;
    /// shapes with no rule are rejected rather than falling through.
    fn eval(
        &self,
        expr: &ValueExpr,
        name: &str,
        entry: &ConstEntry,
        file: &File,
        state: &mut AutoIncrement,
        table: &ResolvedTable,
    ) -> Result<i64, AnalyzeError> {
        match expr {
            ValueExpr::Int(text) => {
                state.active = false;
                literals::parse_int(text).ok_or_else(|| {
                    self.entry_error(
                        ErrorKind::UnsupportedExpression,
                        format!("invalid integer literal {} for constant {}", text, name),
                        entry,
                        file,
                    )
                })
            }
            ValueExpr::Rune(text) => {
                state.active = false;
                literals::parse_rune(text).ok_or_else(|| {
                    self.entry_error(
                        ErrorKind::UnsupportedExpression,
                        format!("invalid rune literal {} for constant {}", text, name),
                        entry,
                        file,
                    )
                })
            }
            ValueExpr::Ident(ident) if ident == IOTA => {
                state.active = true;
                Ok(state.take())
            }
            ValueExpr::Ident(ident) => match table.values.get(ident) {
                Some(value) => {
                    state.active = false;
                    Ok(*value)
                }
                None => Err(self.entry_error(
                    ErrorKind::UnresolvedReference,
                    format!("could not find the value of {}", ident),
                    entry,
                    file,
                )),
            },
            ValueExpr::Binary { left, op, right } => {
                if !matches!(left.as_ref(), ValueExpr::Ident(ident) if ident == IOTA) {
                    return Err(self.entry_error(
                        ErrorKind::UnsupportedExpression,
                        format!(
                            "expected {} on the left of the value expression for constant {}",
                            IOTA, name
                        ),
                        entry,
                        file,
                    ));
                }
                let offset = match right.as_ref() {
                    ValueExpr::Int(text) => literals::parse_int(text).ok_or_else(|| {
                        self.entry_error(
                            ErrorKind::UnsupportedExpression,
                            format!("invalid integer literal {} for constant {}", text, name),
                            entry,
                            file,
                        )
                    })?,
                    ValueExpr::Ident(ident) => match table.values.get(ident) {
                        Some(value) => *value,
                        None => {
                            return Err(self.entry_error(
                                ErrorKind::UnresolvedReference,
                                format!("could not find the value of {}", ident),
                                entry,
                                file,
                            ));
                        }
                    },
                    _ => {
                        return Err(self.entry_error(
                            ErrorKind::UnsupportedExpression,
                            format!(
                                "expected an integer literal or a known constant on the right of the value expression for constant {}",
                                name
                            ),
                            entry,
                            file,
                        ));
                    }
                };
                // The offset shifts the counter baseline for the rest of
                // the block, not just for this entry.
                match op {
                    BinaryOp::Add => state.counter += offset,
                    BinaryOp::Sub => state.counter -= offset,
                }
                state.active = true;
                Ok(state.take())
            }
            ValueExpr::Other(kind) => Err(self.entry_error(
                ErrorKind::UnsupportedExpression,
                format!("cannot evaluate {} for constant {}", kind, name),
                entry,
                file,
            )),
        }
    }

    /// The printed text for an enumerator: the name, replaced by the
    /// trailing comment when requested, then prefix-trimmed. Never fails;
    /// an empty result is passed through.
    fn display_name(&self, name: &str, entry: &ConstEntry) -> String {
        let mut display = name.to_string();
        if self.options.line_comment {
            if let Some(comment) = &entry.comment {
                display = comment.clone();
            }
        }
        if !self.options.trim_prefix.is_empty() {
            if let Some(trimmed) = display.strip_prefix(&self.options.trim_prefix) {
                display = trimmed.to_string();
            }
        }
        display
    }

    fn entry_error(
        &self,
        kind: ErrorKind,
        message: String,
        entry: &ConstEntry,
        file: &File,
    ) -> AnalyzeError {
        AnalyzeError::new(kind, message)
            .with_span(entry.span)
            .with_file(&file.name)
    }
}
