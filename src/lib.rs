//! stringer — generates `String()` methods for integer-backed Go enum types.
//!
//! Given Go sources declaring `type Pill int` and a const block of `Pill`
//! values, the pipeline parses the sources (tree-sitter), validates the
//! type, resolves every enumerator's value and display text, and emits a
//! deterministic `<type>_string.go` companion file.

pub mod ast;
pub mod error;
pub mod generate;
pub mod parser;
pub mod resolve;

pub use error::{AnalyzeError, CompileError, ErrorKind};

use generate::GoGenerator;
use parser::SourceParser;
use resolve::Resolver;
use serde::Serialize;

/// Configuration for generation.
#[derive(Debug, Clone)]
pub struct Options {
    /// The type to generate a String() method for.
    pub type_name: String,
    /// Use trailing line comment text as the printed text when present.
    pub line_comment: bool,
    /// Prefix to trim from printed names (empty for none).
    pub trim_prefix: String,
    /// If set, also generate a printed-name -> value map of this name.
    pub string_to_value_map_name: Option<String>,
    /// If set, also generate a slice of all distinct values of this name.
    pub enum_values_slice_name: Option<String>,
}

impl Options {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            line_comment: false,
            trim_prefix: String::new(),
            string_to_value_map_name: None,
            enum_values_slice_name: None,
        }
    }
}

/// One input source, already read from disk (or stdin).
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// One resolved enumerator.
#[derive(Debug, Clone, Serialize)]
pub struct Enumerator {
    pub name: String,
    pub value: i64,
    pub display: String,
}

/// Generation result.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    /// The generated Go source text.
    pub code: String,
    /// Package the sources (and the artifact) belong to.
    pub package: String,
    /// Resolved enumerators in declaration order.
    pub enumerators: Vec<Enumerator>,
}

/// The analysis-and-emission pipeline: parse, validate, resolve, emit.
///
/// Holds the configured parser so repeated compiles reuse it.
pub struct Pipeline {
    parser: SourceParser,
}

impl Pipeline {
    pub fn standard() -> Self {
        Self {
            parser: SourceParser::new(),
        }
    }

    pub fn compile(
        &mut self,
        sources: &[SourceFile],
        options: &Options,
    ) -> Result<GenerateResult, CompileError> {
        if options.type_name.is_empty() {
            return Err(CompileError::Config("must provide a type name".to_string()));
        }
        if sources.is_empty() {
            return Err(CompileError::Config(
                "must provide at least one input file".to_string(),
            ));
        }

        let mut files = Vec::with_capacity(sources.len());
        for source in sources {
            files.push(self.parser.parse_file(&source.name, &source.text)?);
        }

        // All inputs must agree on the package the artifact goes into.
        let package = files[0].package.clone();
        for file in &files[1..] {
            if file.package != package {
                return Err(CompileError::Config(format!(
                    "all input files must have the same package name; got {} w/ 'package {}', but {} w/ 'package {}'",
                    files[0].name, package, file.name, file.package
                )));
            }
        }

        resolve::validate_type(&files, &options.type_name)?;
        let table = Resolver::new(options).resolve(&files)?;
        let code = GoGenerator::new(options).generate(&package, &table)?;

        let enumerators = table
            .order
            .iter()
            .map(|name| Enumerator {
                name: name.clone(),
                value: table.values[name],
                display: table.displays[name].clone(),
            })
            .collect();

        Ok(GenerateResult {
            code,
            package,
            enumerators,
        })
    }
}

/// Convenience entry point: compile a single in-memory source.
pub fn generate_source(source: &str, options: &Options) -> Result<GenerateResult, CompileError> {
    Pipeline::standard().compile(&[SourceFile::new("<stdin>", source)], options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iota_block_counts_from_zero() {
        let result = generate_source(
            "package paint\n\ntype Color int\n\nconst (\n\tRed Color = iota\n\tGreen\n\tBlue\n)\n",
            &Options::new("Color"),
        )
        .unwrap();
        let values: Vec<_> = result.enumerators.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![0, 1, 2]);
        assert!(result.code.contains("case Green:\n\t\treturn \"Green\""));
        assert!(
            result
                .code
                .contains("return \"Color(\" + strconv.FormatInt(int64(i), 10) + \")\"")
        );
    }

    #[test]
    fn test_trim_prefix_scenario() {
        let mut options = Options::new("Key");
        options.trim_prefix = "K_".to_string();
        let result = generate_source(
            "package p\n\ntype Key int\n\nconst (\n\tK_A Key = iota + 1\n\tK_B\n)\n",
            &options,
        )
        .unwrap();
        assert_eq!(result.enumerators[0].value, 1);
        assert_eq!(result.enumerators[1].value, 2);
        assert_eq!(result.enumerators[0].display, "A");
        assert_eq!(result.enumerators[1].display, "B");
    }

    #[test]
    fn test_shared_value_first_name_wins() {
        let result = generate_source(
            "package p\n\ntype T int\n\nconst (\n\tFirst T = 1\n\tSecond T = First\n)\n",
            &Options::new("T"),
        )
        .unwrap();
        assert!(result.code.contains("case First:"));
        assert!(!result.code.contains("case Second:"));
    }

    #[test]
    fn test_line_comment_display() {
        let mut options = Options::new("T");
        options.line_comment = true;
        let result = generate_source(
            "package p\n\ntype T int\n\nconst (\n\tUp T = iota // north\n\tDown\n)\n",
            &options,
        )
        .unwrap();
        assert_eq!(result.enumerators[0].display, "north");
        assert_eq!(result.enumerators[1].display, "Down");
        assert!(result.code.contains("return \"north\""));
    }

    #[test]
    fn test_package_mismatch_is_config_error() {
        let mut pipeline = Pipeline::standard();
        let err = pipeline
            .compile(
                &[
                    SourceFile::new("a.go", "package one\n\ntype T int\nconst A T = 1\n"),
                    SourceFile::new("b.go", "package two\n\nconst B T = 2\n"),
                ],
                &Options::new("T"),
            )
            .unwrap_err();
        assert!(matches!(err, CompileError::Config(_)));
        assert!(err.to_string().contains("same package name"));
    }

    #[test]
    fn test_missing_type_name_is_config_error() {
        let err = generate_source("package p\n", &Options::new("")).unwrap_err();
        assert!(matches!(err, CompileError::Config(_)));
    }

    #[test]
    fn test_no_inputs_is_config_error() {
        let err = Pipeline::standard()
            .compile(&[], &Options::new("T"))
            .unwrap_err();
        assert!(matches!(err, CompileError::Config(_)));
    }

    #[test]
    fn test_not_an_integer_alias() {
        let err = generate_source(
            "package p\n\ntype T string\n\nconst A T = \"a\"\n",
            &Options::new("T"),
        )
        .unwrap_err();
        let CompileError::Analyze(err) = err else {
            panic!("expected analysis error");
        };
        assert_eq!(err.kind, ErrorKind::NotIntegerAlias);
    }

    #[test]
    fn test_nothing_to_generate() {
        let err = generate_source("package p\n\ntype T int\n", &Options::new("T")).unwrap_err();
        let CompileError::Analyze(err) = err else {
            panic!("expected analysis error");
        };
        assert_eq!(err.kind, ErrorKind::InsufficientConstants);
    }

    #[test]
    fn test_result_serializes() {
        let result = generate_source(
            "package p\n\ntype T int\n\nconst A T = 1\n",
            &Options::new("T"),
        )
        .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["package"], "p");
        assert_eq!(json["enumerators"][0]["name"], "A");
        assert_eq!(json["enumerators"][0]["value"], 1);
    }

    #[test]
    fn test_identical_inputs_identical_output() {
        let source = "package p\n\ntype T int\n\nconst (\n\tA T = iota\n\tB\n)\n";
        let options = Options::new("T");
        let first = generate_source(source, &options).unwrap();
        let second = generate_source(source, &options).unwrap();
        assert_eq!(first.code, second.code);
    }
}
