use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use stringer::{CompileError, Options, Pipeline, SourceFile};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "stringer")]
#[command(about = "Generate String() methods for integer-backed Go enum types")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a <type>_string.go companion file
    Generate {
        /// The type to generate the String() method for
        #[arg(long = "type")]
        type_name: String,

        /// Use trailing line comment text as the printed text when present
        #[arg(long)]
        line_comment: bool,

        /// Trim the given prefix from printed names
        #[arg(long, default_value = "")]
        trim_prefix: String,

        /// Also create a map of printed name -> value with the given name
        #[arg(long)]
        string_to_value_map: Option<String>,

        /// Also create a slice of all distinct values with the given name
        #[arg(long)]
        enum_values_slice: Option<String>,

        /// Output file; defaults to <srcdir>/<type>_string.go
        #[arg(long)]
        output: Option<PathBuf>,

        /// Read one source from stdin and write generated code to stdout
        #[arg(long)]
        stdin: bool,

        /// With --stdin, print the result as JSON with resolved enumerators
        #[arg(long)]
        json: bool,

        /// Input .go files, or a single directory to scan
        #[arg(required_unless_present = "stdin")]
        inputs: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            type_name,
            line_comment,
            trim_prefix,
            string_to_value_map,
            enum_values_slice,
            output,
            stdin,
            json,
            inputs,
        } => {
            let options = Options {
                type_name,
                line_comment,
                trim_prefix,
                string_to_value_map_name: string_to_value_map,
                enum_values_slice_name: enum_values_slice,
            };
            if stdin {
                generate_stdin(&options, json);
            } else {
                generate_files(&inputs, &options, output);
            }
        }
    }
}

fn generate_stdin(options: &Options, json_output: bool) {
    let mut source = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut source) {
        fail(&format!("failed to read stdin: {}", err));
    }

    let sources = [SourceFile::new("<stdin>", source)];
    let mut pipeline = Pipeline::standard();
    match pipeline.compile(&sources, options) {
        Ok(result) => {
            if json_output {
                println!("{}", serde_json::to_string(&result).unwrap());
            } else {
                print!("{}", result.code);
            }
        }
        Err(err) => report_error(&err, &sources),
    }
}

fn generate_files(inputs: &[PathBuf], options: &Options, output: Option<PathBuf>) {
    let start = Instant::now();

    let files = collect_inputs(inputs);
    let src_dir = shared_source_dir(&files);

    let mut sources = Vec::with_capacity(files.len());
    for path in &files {
        match fs::read_to_string(path) {
            Ok(text) => sources.push(SourceFile::new(path.display().to_string(), text)),
            Err(err) => fail(&format!("failed to read {}: {}", path.display(), err)),
        }
    }

    let mut pipeline = Pipeline::standard();
    let result = match pipeline.compile(&sources, options) {
        Ok(result) => result,
        Err(err) => report_error(&err, &sources),
    };

    let output = output.unwrap_or_else(|| {
        src_dir.join(format!("{}_string.go", options.type_name.to_lowercase()))
    });
    if let Err(err) = fs::write(&output, &result.code) {
        fail(&format!("failed to write {}: {}", output.display(), err));
    }

    print_generated(&output.display().to_string());
    print_summary(files.len(), start.elapsed());
}

/// Expand a single directory argument into its .go files; test files and
/// previously generated artifacts are skipped.
fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    if inputs.len() == 1 && inputs[0].is_dir() {
        let mut files: Vec<PathBuf> = WalkDir::new(&inputs[0])
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_candidate_source(p))
            .collect();
        files.sort();
        if files.is_empty() {
            fail(&format!("no .go files found in {}", inputs[0].display()));
        }
        return files;
    }

    for path in inputs {
        if !path.is_file() {
            fail(&format!("{} does not exist", path.display()));
        }
    }
    inputs.to_vec()
}

fn is_candidate_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go") && !name.ends_with("_string.go")
}

/// All inputs must live in one directory; it anchors the default output.
fn shared_source_dir(files: &[PathBuf]) -> PathBuf {
    let mut found: Option<(PathBuf, &PathBuf)> = None;
    for file in files {
        let dir = file.parent().unwrap_or(Path::new(".")).to_path_buf();
        match &found {
            None => found = Some((dir, file)),
            Some((src_dir, which)) => {
                if *src_dir != dir {
                    fail(&format!(
                        "all input files must be in the same source directory; got {} in {}, but {} in {}",
                        which.display(),
                        src_dir.display(),
                        file.display(),
                        dir.display()
                    ));
                }
            }
        }
    }
    match found {
        Some((dir, _)) => dir,
        None => fail("must provide at least one input file"),
    }
}

/// Print a rendered diagnostic (with source context when the error points
/// at a declaration) and exit non-zero.
fn report_error(err: &CompileError, sources: &[SourceFile]) -> ! {
    let rendered = match err {
        CompileError::Analyze(analyze) => {
            let source = analyze
                .file
                .as_deref()
                .and_then(|file| sources.iter().find(|s| s.name == file))
                .map(|s| s.text.as_str())
                .unwrap_or("");
            analyze.render(source)
        }
        other => other.render(""),
    };
    eprint!("{}", rendered);
    std::process::exit(1);
}

fn fail(message: &str) -> ! {
    eprintln!("error: {}", message);
    std::process::exit(1);
}

fn print_generated(path: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_summary(count: usize, elapsed: std::time::Duration) {
    let is_tty = io::stderr().is_terminal();
    let time_str = format_duration(elapsed);
    let files_word = if count == 1 { "file" } else { "files" };

    if is_tty {
        eprintln!(
            "\n\x1b[1m✨ Scanned {} {} in {}\x1b[0m",
            count, files_word, time_str
        );
    } else {
        eprintln!("\n✨ Scanned {} {} in {}", count, files_word, time_str);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
