//! AST provider: walks the tree-sitter concrete syntax tree of a Go file
//! into the declaration model in [`crate::ast`].

use crate::ast::{self, Position, Span};
use crate::error::{AnalyzeError, ErrorKind};
use tree_sitter::{Node, Parser};

/// Parses Go sources into declaration lists.
pub struct SourceParser {
    parser: Parser,
}

impl SourceParser {
    pub fn new() -> Self {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .expect("Go grammar is compatible with the linked tree-sitter");
        Self { parser }
    }

    /// Parse one source file. `name` is only used for diagnostics.
    pub fn parse_file(&mut self, name: &str, source: &str) -> Result<ast::File, AnalyzeError> {
        let tree = self.parser.parse(source, None).ok_or_else(|| {
            AnalyzeError::new(ErrorKind::SyntaxError, format!("failed to parse {}", name))
                .with_file(name)
        })?;
        let root = tree.root_node();
        if root.has_error() {
            let node = first_error(root).unwrap_or(root);
            return Err(AnalyzeError::new(
                ErrorKind::SyntaxError,
                format!("invalid Go syntax in {}", name),
            )
            .with_span(span_of(node))
            .with_file(name));
        }

        let mut package = String::new();
        let mut decls = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    if let Some(ident) = child.named_child(0) {
                        package = text(ident, source).to_string();
                    }
                }
                "type_declaration" => collect_type_specs(child, source, &mut decls),
                "const_declaration" => {
                    decls.push(ast::Decl::Const(parse_const_block(child, source)));
                }
                // A trailing comment on a single-spec const lands as a
                // sibling of the declaration rather than inside it.
                "comment" => attach_dangling_comment(child, source, &mut decls),
                _ => {}
            }
        }

        if package.is_empty() {
            return Err(AnalyzeError::new(
                ErrorKind::SyntaxError,
                format!("missing package clause in {}", name),
            )
            .with_file(name));
        }

        Ok(ast::File {
            name: name.to_string(),
            package,
            decls,
        })
    }
}

impl Default for SourceParser {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_type_specs(node: Node, source: &str, decls: &mut Vec<ast::Decl>) {
    let mut cursor = node.walk();
    for spec in node.named_children(&mut cursor) {
        if spec.kind() != "type_spec" && spec.kind() != "type_alias" {
            continue;
        }
        let Some(name) = spec.child_by_field_name("name") else {
            continue;
        };
        let underlying = match spec.child_by_field_name("type") {
            Some(ty) if ty.kind() == "type_identifier" => {
                ast::Underlying::Named(text(ty, source).to_string())
            }
            Some(ty) => ast::Underlying::Other(ty.kind().to_string()),
            None => ast::Underlying::Other("missing type".to_string()),
        };
        decls.push(ast::Decl::Type(ast::TypeDecl {
            name: text(name, source).to_string(),
            underlying,
            span: span_of(spec),
        }));
    }
}

fn parse_const_block(node: Node, source: &str) -> ast::ConstBlock {
    let mut entries: Vec<ast::ConstEntry> = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "const_spec" => entries.push(parse_const_spec(child, source)),
            "comment" => {
                // Attach a same-line trailing comment to the entry it follows.
                if let Some(entry) = entries.last_mut() {
                    if entry.comment.is_none() && entry.span.end.line == child.start_position().row
                    {
                        entry.comment = Some(comment_text(text(child, source)));
                    }
                }
            }
            _ => {}
        }
    }
    ast::ConstBlock {
        entries,
        span: span_of(node),
    }
}

fn parse_const_spec(node: Node, source: &str) -> ast::ConstEntry {
    let mut cursor = node.walk();
    let names = node
        .children_by_field_name("name", &mut cursor)
        // The field iterator also yields the anonymous `,` separators
        // between names; keep only the identifier nodes.
        .filter(|n| n.kind() == "identifier")
        .map(|n| text(n, source).to_string())
        .collect();
    let type_name = node
        .child_by_field_name("type")
        .map(|ty| text(ty, source).to_string());

    let mut values = Vec::new();
    if let Some(list) = node.child_by_field_name("value") {
        let mut list_cursor = list.walk();
        for expr in list.named_children(&mut list_cursor) {
            if expr.kind() == "comment" {
                continue;
            }
            values.push(classify_expr(expr, source));
        }
    }

    ast::ConstEntry {
        names,
        type_name,
        values,
        comment: None,
        span: span_of(node),
    }
}

/// Sort a value expression into the closed set of shapes the resolver
/// evaluates. Anything else is carried as `Other` with its node kind.
fn classify_expr(node: Node, source: &str) -> ast::ValueExpr {
    match node.kind() {
        "int_literal" => ast::ValueExpr::Int(text(node, source).to_string()),
        "rune_literal" => ast::ValueExpr::Rune(text(node, source).to_string()),
        // The Go grammar gives `iota` its own node kind; treat it as the
        // identifier the resolver expects.
        "identifier" | "iota" => ast::ValueExpr::Ident(text(node, source).to_string()),
        "binary_expression" => {
            let (Some(left), Some(op), Some(right)) = (
                node.child_by_field_name("left"),
                node.child_by_field_name("operator"),
                node.child_by_field_name("right"),
            ) else {
                return ast::ValueExpr::Other("binary_expression".to_string());
            };
            let op = match text(op, source) {
                "+" => ast::BinaryOp::Add,
                "-" => ast::BinaryOp::Sub,
                other => return ast::ValueExpr::Other(format!("binary '{}' expression", other)),
            };
            ast::ValueExpr::Binary {
                left: Box::new(classify_expr(left, source)),
                op,
                right: Box::new(classify_expr(right, source)),
            }
        }
        kind => ast::ValueExpr::Other(kind.to_string()),
    }
}

fn attach_dangling_comment(node: Node, source: &str, decls: &mut [ast::Decl]) {
    let Some(ast::Decl::Const(block)) = decls.last_mut() else {
        return;
    };
    let Some(entry) = block.entries.last_mut() else {
        return;
    };
    if entry.comment.is_none() && entry.span.end.line == node.start_position().row {
        entry.comment = Some(comment_text(text(node, source)));
    }
}

/// Strip comment markers and surrounding whitespace.
fn comment_text(raw: &str) -> String {
    let body = if let Some(line) = raw.strip_prefix("//") {
        line
    } else {
        raw.strip_prefix("/*")
            .and_then(|s| s.strip_suffix("*/"))
            .unwrap_or(raw)
    };
    body.trim().to_string()
}

fn text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn span_of(node: Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span {
        start: Position {
            line: start.row,
            col: start.column,
        },
        end: Position {
            line: end.row,
            col: end.column,
        },
    }
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(err) = first_error(child) {
                return Some(err);
            }
        }
    }
    Some(node)
}
