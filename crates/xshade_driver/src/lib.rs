//! The compilation pipeline: preprocess, parse, analyze, optimize, emit.

mod ast_printer;
mod error;
mod optimizer;

pub use error::*;

pub use xshade_analysis::ShaderContext;
pub use xshade_common::{
    CollectingLog, FileIncludeHandler, IncludeHandler, InputShaderVersion, Log,
    MemoryIncludeHandler, OutputShaderVersion, Report, ReportHandler, Severity, ShaderTarget,
    Statistics,
};

use std::io;
use std::time::Instant;
use xshade_analysis::decorate_program;
use xshade_common::SourceCode;
use xshade_glsl::generate_glsl;
use xshade_parser::Parser;
use xshade_preprocessor::Preprocessor;

/// Attaches source-line snippets to reports before forwarding them.
struct SnippetLog<'a> {
    inner: &'a mut dyn Log,
    source: SourceCode,
}

impl<'a> Log for SnippetLog<'a> {
    fn submit(&mut self, mut report: Report) {
        if report.snippet.is_none() {
            if let Some(area) = report.area {
                report.snippet = self.source.annotate(area);
            }
        }
        self.inner.submit(report);
    }
}

/// Everything the compiler consumes.
pub struct ShaderInput<'a> {
    /// Readable byte stream of HLSL source (UTF-8).
    pub source_code: &'a mut dyn io::Read,
    /// Informational only; used in diagnostics.
    pub filename: &'a str,
    /// Name of the shader's main function.
    pub entry_point: &'a str,
    pub shader_target: ShaderTarget,
    pub shader_version: InputShaderVersion,
    /// Resolver for `#include`; a filesystem handler is used when absent.
    pub include_handler: Option<&'a mut dyn IncludeHandler>,
    /// Macros predefined before preprocessing starts.
    pub defines: Vec<(String, String)>,
}

/// Everything the compiler produces.
pub struct ShaderOutput<'a> {
    /// Writable byte stream for the GLSL output.
    pub source_code: &'a mut dyn io::Write,
    pub shader_version: OutputShaderVersion,
    pub options: Options,
    pub statistics: Option<&'a mut Statistics>,
}

/// Recognized compilation flags.
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// Emit the preprocessed HLSL and stop.
    pub preprocess_only: bool,
    /// Dump the decorated AST to the log.
    pub show_ast: bool,
    /// Run the optimizer pass.
    pub optimize: bool,
    /// Discard the output; only diagnostics are produced.
    pub validate_only: bool,
    /// Emit per-phase timing info.
    pub show_times: bool,
    /// Emit intrinsic wrappers instead of inlining them.
    pub prefer_wrappers: bool,
}

impl Options {
    pub fn with_optimize(mut self) -> Self {
        self.optimize = true;
        self
    }

    pub fn with_validate_only(mut self) -> Self {
        self.validate_only = true;
        self
    }
}

/// Compiles one HLSL translation unit to GLSL.
///
/// All diagnostics flow through `log`; the core never writes to stdout
/// or stderr. Returns true iff no report above warning severity was
/// emitted.
pub fn compile_shader(input: ShaderInput, output: ShaderOutput, log: &mut dyn Log) -> bool {
    let mut time_points = [Instant::now(); 6];

    let mut source = String::new();
    if let Err(err) = input.source_code.read_to_string(&mut source) {
        let mut reports = ReportHandler::new(log);
        reports.fatal(format!("failed to read input stream: {}", err), None);
        return false;
    }

    // Dropped lines stay blank during preprocessing, so the original
    // text annotates diagnostics from every later phase.
    let mut snippet_log = SnippetLog {
        inner: log,
        source: SourceCode::new(input.filename, &source),
    };
    let mut reports = ReportHandler::new(&mut snippet_log);

    let mut statistics = output.statistics;
    let options = output.options;

    // Pre-process.
    time_points[0] = Instant::now();

    let mut default_include_handler = FileIncludeHandler::new();
    let include_handler: &mut dyn IncludeHandler = match input.include_handler {
        Some(handler) => handler,
        None => &mut default_include_handler,
    };
    let mut preprocessor = Preprocessor::with_include_handler(include_handler);
    for (name, value) in &input.defines {
        preprocessor.predefine(name, value);
    }

    let processed = match preprocessor.process(&source, input.filename, &mut reports) {
        Ok(processed) => processed,
        Err(_) => {
            reports.error("preprocessing input code failed", None);
            return false;
        }
    };

    if let Some(statistics) = statistics.as_deref_mut() {
        statistics.macros = preprocessor.defined_macro_idents();
    }

    if options.preprocess_only {
        if !options.validate_only {
            if let Err(err) = output.source_code.write_all(processed.as_bytes()) {
                reports.fatal(format!("failed to write output stream: {}", err), None);
                return false;
            }
        }
        return !reports.has_errors();
    }

    // Parse.
    time_points[1] = Instant::now();

    let mut program = {
        let parser = Parser::new(&processed, input.filename, &mut reports);
        let program = parser.and_then(|mut parser| parser.parse_program());
        match program {
            Ok(program) if !reports.has_errors() => program,
            _ => {
                reports.error("parsing input code failed", None);
                return false;
            }
        }
    };

    // Context analysis.
    time_points[2] = Instant::now();

    let ctx = ShaderContext {
        entry_point: input.entry_point,
        target: input.shader_target,
        input_version: input.shader_version,
        prefer_wrappers: options.prefer_wrappers,
    };
    let errors_before = reports.error_count();
    decorate_program(&mut program, &ctx, statistics.as_deref_mut(), &mut reports);

    if options.show_ast {
        ast_printer::print_ast(&program, &mut reports);
    }

    if reports.error_count() > errors_before {
        reports.error("analyzing input code failed", None);
        return false;
    }

    // Optimize.
    time_points[3] = Instant::now();

    if options.optimize {
        optimizer::optimize(&mut program);
    }

    // Generate GLSL.
    time_points[4] = Instant::now();

    let glsl = generate_glsl(&program, input.shader_target, output.shader_version);
    if !options.validate_only {
        if let Err(err) = output.source_code.write_all(glsl.as_bytes()) {
            reports.fatal(format!("failed to write output stream: {}", err), None);
            return false;
        }
    }

    time_points[5] = Instant::now();

    if let Some(statistics) = statistics.as_deref_mut() {
        statistics.sort_bindings();
    }

    if options.show_times {
        let phase = |reports: &mut ReportHandler, name: &str, from: usize, to: usize| {
            let duration = time_points[to].duration_since(time_points[from]);
            reports.info(format!("timing {}: {} ms", name, duration.as_millis()));
        };
        phase(&mut reports, "pre-processing", 0, 1);
        phase(&mut reports, "parsing", 1, 2);
        phase(&mut reports, "context analysis", 2, 3);
        phase(&mut reports, "optimization", 3, 4);
        phase(&mut reports, "code generation", 4, 5);
    }

    !reports.has_errors()
}
