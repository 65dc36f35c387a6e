//! Go text emission from a resolved table.
//!
//! Generation is a pure function of the table and options: output order
//! always follows the table's declaration order, never map iteration
//! order, so identical inputs produce identical text.

use super::Output;
use crate::Options;
use crate::error::{AnalyzeError, ErrorKind};
use crate::resolve::ResolvedTable;
use std::collections::HashSet;

/// Emits the generated Go source for a resolved table.
pub struct GoGenerator<'a> {
    options: &'a Options,
}

impl<'a> GoGenerator<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    pub fn generate(&self, package: &str, table: &ResolvedTable) -> Result<String, AnalyzeError> {
        let receiver = self.receiver_var(table)?;

        let mut out = Output::new();
        out.line("// Code generated by \"stringer\"; DO NOT EDIT.");
        out.blank();
        out.line(&format!("package {}", package));
        out.blank();
        out.line("import \"strconv\"");
        out.blank();

        self.emit_guard(&mut out, table);
        out.blank();
        self.emit_string_method(&mut out, table, receiver);

        if let Some(map_name) = &self.options.string_to_value_map_name {
            out.blank();
            self.emit_value_map(&mut out, table, map_name);
        }
        if let Some(slice_name) = &self.options.enum_values_slice_name {
            out.blank();
            self.emit_values_slice(&mut out, table, slice_name);
        }

        Ok(out.finish())
    }

    /// Pick a receiver variable that cannot shadow a constant.
    fn receiver_var(&self, table: &ResolvedTable) -> Result<&'static str, AnalyzeError> {
        if !table.values.contains_key("i") {
            return Ok("i");
        }
        if !table.values.contains_key("_i") {
            return Ok("_i");
        }
        Err(AnalyzeError::new(
            ErrorKind::ReceiverCollision,
            "cannot choose a receiver variable; both i and _i are constant names",
        ))
    }

    /// One index assertion per enumerator: renumbering the source enum
    /// without regenerating breaks the next compile instead of printing
    /// stale text.
    fn emit_guard(&self, out: &mut Output, table: &ResolvedTable) {
        out.line("func _() {");
        out.line(
            "\t// An \"invalid array index\" compiler error signifies that the constant values have changed.",
        );
        out.line("\t// Re-run the stringer command to generate them again.");
        out.line("\tvar x [1]struct{}");
        for name in &table.order {
            let value = table.values[name];
            // gofmt wants the operands spaced apart when the right one is negative.
            let minus = if value < 0 { " - " } else { "-" };
            out.line(&format!("\t_ = x[{}{}{}]", name, minus, value));
        }
        out.line("}");
    }

    fn emit_string_method(&self, out: &mut Output, table: &ResolvedTable, receiver: &str) {
        let type_name = &self.options.type_name;
        out.line(&format!(
            "func ({} {}) String() string {{",
            receiver, type_name
        ));
        out.line(&format!("\tswitch {} {{", receiver));
        // One case per distinct value; the first name declared for a
        // value claims its branch.
        let mut seen = HashSet::new();
        for name in &table.order {
            if !seen.insert(table.values[name]) {
                continue;
            }
            out.line(&format!("\tcase {}:", name));
            out.line(&format!("\t\treturn \"{}\"", table.displays[name]));
        }
        out.line("\tdefault:");
        out.line(&format!(
            "\t\treturn \"{}(\" + strconv.FormatInt(int64({}), 10) + \")\"",
            type_name, receiver
        ));
        out.line("\t}");
        out.line("}");
    }

    /// Display text -> value, one entry per name, value column aligned.
    fn emit_value_map(&self, out: &mut Output, table: &ResolvedTable, map_name: &str) {
        out.line(&format!(
            "var {} = map[string]{}{{",
            map_name, self.options.type_name
        ));
        let max_len = table
            .order
            .iter()
            .map(|name| table.displays[name].len())
            .max()
            .unwrap_or(0);
        for name in &table.order {
            let display = &table.displays[name];
            let padding = " ".repeat(1 + max_len - display.len());
            out.line(&format!(
                "\t\"{}\":{}{},",
                display, padding, table.values[name]
            ));
        }
        out.line("}");
    }

    /// Distinct values sorted by display text, first-declared name
    /// representing each value.
    fn emit_values_slice(&self, out: &mut Output, table: &ResolvedTable, slice_name: &str) {
        out.line(&format!(
            "var {} = []{}{{",
            slice_name, self.options.type_name
        ));

        let mut seen = HashSet::new();
        let mut survivors: Vec<&str> = Vec::new();
        for name in &table.order {
            if seen.insert(table.values[name]) {
                survivors.push(name);
            }
        }
        // Stable sort: names sharing a display text keep declaration order.
        survivors.sort_by(|a, b| table.displays[*a].cmp(&table.displays[*b]));

        let mut seen = HashSet::new();
        for name in survivors {
            if !seen.insert(table.values[name]) {
                continue;
            }
            out.line(&format!("\t{},", name));
        }
        out.line("}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, i64)]) -> ResolvedTable {
        let mut table = ResolvedTable::default();
        for (name, value) in entries {
            table.insert(name, *value, name.to_string());
        }
        table
    }

    fn generate(options: &Options, table: &ResolvedTable) -> String {
        GoGenerator::new(options).generate("paint", table).unwrap()
    }

    #[test]
    fn test_header_and_guard() {
        let code = generate(&Options::new("Pill"), &table(&[("Placebo", 0), ("Aspirin", 1)]));
        assert!(code.starts_with("// Code generated by \"stringer\"; DO NOT EDIT.\n"));
        assert!(code.contains("package paint\n"));
        assert!(code.contains("import \"strconv\"\n"));
        assert!(code.contains("\t_ = x[Placebo-0]\n"));
        assert!(code.contains("\t_ = x[Aspirin-1]\n"));
    }

    #[test]
    fn test_negative_guard_spelling() {
        let code = generate(&Options::new("Pill"), &table(&[("Below", -1)]));
        assert!(code.contains("\t_ = x[Below - -1]\n"));
    }

    #[test]
    fn test_shared_value_folds_into_first_case() {
        let code = generate(
            &Options::new("Pill"),
            &table(&[("A", 0), ("B", 1), ("Alias", 1)]),
        );
        assert!(code.contains("\tcase B:\n\t\treturn \"B\"\n"));
        assert!(!code.contains("case Alias:"));
    }

    #[test]
    fn test_default_branch_uses_receiver() {
        let code = generate(&Options::new("Pill"), &table(&[("A", 0)]));
        assert!(code.contains("func (i Pill) String() string {"));
        assert!(code.contains("return \"Pill(\" + strconv.FormatInt(int64(i), 10) + \")\""));
    }

    #[test]
    fn test_receiver_fallback() {
        let code = generate(&Options::new("Pill"), &table(&[("i", 0), ("j", 1)]));
        assert!(code.contains("func (_i Pill) String() string {"));
        assert!(code.contains("switch _i {"));
        assert!(code.contains("int64(_i)"));
    }

    #[test]
    fn test_receiver_collision() {
        let err = GoGenerator::new(&Options::new("Pill"))
            .generate("paint", &table(&[("i", 0), ("_i", 1)]))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ReceiverCollision);
    }

    #[test]
    fn test_value_map_alignment() {
        let mut options = Options::new("Pill");
        options.string_to_value_map_name = Some("PillMap".to_string());
        let code = generate(&options, &table(&[("Go", 0), ("Stop", 1)]));
        assert!(code.contains("var PillMap = map[string]Pill{\n"));
        assert!(code.contains("\t\"Go\":   0,\n"));
        assert!(code.contains("\t\"Stop\": 1,\n"));
    }

    #[test]
    fn test_map_keeps_every_name() {
        let mut options = Options::new("Pill");
        options.string_to_value_map_name = Some("PillMap".to_string());
        let code = generate(&options, &table(&[("A", 1), ("Alias", 1)]));
        assert!(code.contains("\t\"A\":     1,\n"));
        assert!(code.contains("\t\"Alias\": 1,\n"));
    }

    #[test]
    fn test_values_slice_sorted_and_deduplicated() {
        let mut options = Options::new("Pill");
        options.enum_values_slice_name = Some("PillValues".to_string());
        let code = generate(
            &options,
            &table(&[("Zebra", 0), ("Alpha", 1), ("Copy", 0)]),
        );
        let slice_start = code.find("var PillValues").unwrap();
        let slice = &code[slice_start..];
        assert!(slice.contains("\tAlpha,\n\tZebra,\n"));
        assert!(!slice.contains("Copy"));
    }

    #[test]
    fn test_deterministic_output() {
        let options = Options::new("Pill");
        let table = table(&[("A", 0), ("B", 1), ("C", 2)]);
        let first = generate(&options, &table);
        let second = generate(&options, &table);
        assert_eq!(first, second);
    }
}
