//! Command-line shell for the xshade cross-compiler.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use xshade_driver::{
    compile_shader, InputShaderVersion, Log, Options, OutputShaderVersion, Report, ShaderInput,
    ShaderOutput, ShaderTarget, Statistics,
};

#[derive(Parser)]
#[command(name = "xshade")]
#[command(author, version, about = "HLSL to GLSL cross-compiler", long_about = None)]
struct Cli {
    /// The HLSL input file.
    input: PathBuf,

    /// The GLSL output file (defaults to the input with a .glsl suffix).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Entry-point function name.
    #[arg(short = 'E', long, default_value = "main")]
    entry: String,

    /// Target pipeline stage.
    #[arg(short = 'T', long, value_enum, default_value_t = TargetArg::Vertex)]
    target: TargetArg,

    /// Input HLSL version.
    #[arg(long, value_enum, default_value_t = HlslVersionArg::Hlsl5)]
    hlsl: HlslVersionArg,

    /// Output GLSL version.
    #[arg(long, value_enum, default_value_t = GlslVersionArg::Glsl330)]
    glsl: GlslVersionArg,

    /// Predefine a macro (NAME or NAME=VALUE); repeatable.
    #[arg(short = 'D', long = "define")]
    defines: Vec<String>,

    /// Additional include search paths; repeatable.
    #[arg(short = 'I', long = "include-path")]
    include_paths: Vec<PathBuf>,

    /// Emit the preprocessed HLSL and stop.
    #[arg(short = 'P', long)]
    preprocess_only: bool,

    /// Dump the decorated AST to stderr.
    #[arg(long)]
    show_ast: bool,

    /// Run the optimizer pass.
    #[arg(short = 'O', long)]
    optimize: bool,

    /// Check the input without writing output.
    #[arg(long)]
    validate: bool,

    /// Print per-phase timing info.
    #[arg(long)]
    show_times: bool,

    /// Emit intrinsic wrappers instead of inlining them.
    #[arg(long)]
    prefer_wrappers: bool,

    /// Print resource bindings and macros after compilation.
    #[arg(long)]
    stats: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetArg {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEval,
    Compute,
}

impl From<TargetArg> for ShaderTarget {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Vertex => ShaderTarget::Vertex,
            TargetArg::Fragment => ShaderTarget::Fragment,
            TargetArg::Geometry => ShaderTarget::Geometry,
            TargetArg::TessControl => ShaderTarget::TessControl,
            TargetArg::TessEval => ShaderTarget::TessEval,
            TargetArg::Compute => ShaderTarget::Compute,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum HlslVersionArg {
    Hlsl3,
    Hlsl4,
    Hlsl5,
}

impl From<HlslVersionArg> for InputShaderVersion {
    fn from(value: HlslVersionArg) -> Self {
        match value {
            HlslVersionArg::Hlsl3 => InputShaderVersion::Hlsl3,
            HlslVersionArg::Hlsl4 => InputShaderVersion::Hlsl4,
            HlslVersionArg::Hlsl5 => InputShaderVersion::Hlsl5,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum GlslVersionArg {
    Glsl130,
    Glsl140,
    Glsl150,
    Glsl330,
    Glsl400,
    Glsl410,
    Glsl420,
    Glsl430,
    Glsl440,
    Glsl450,
    Glsl,
}

impl From<GlslVersionArg> for OutputShaderVersion {
    fn from(value: GlslVersionArg) -> Self {
        match value {
            GlslVersionArg::Glsl130 => OutputShaderVersion::Glsl130,
            GlslVersionArg::Glsl140 => OutputShaderVersion::Glsl140,
            GlslVersionArg::Glsl150 => OutputShaderVersion::Glsl150,
            GlslVersionArg::Glsl330 => OutputShaderVersion::Glsl330,
            GlslVersionArg::Glsl400 => OutputShaderVersion::Glsl400,
            GlslVersionArg::Glsl410 => OutputShaderVersion::Glsl410,
            GlslVersionArg::Glsl420 => OutputShaderVersion::Glsl420,
            GlslVersionArg::Glsl430 => OutputShaderVersion::Glsl430,
            GlslVersionArg::Glsl440 => OutputShaderVersion::Glsl440,
            GlslVersionArg::Glsl450 => OutputShaderVersion::Glsl450,
            GlslVersionArg::Glsl => OutputShaderVersion::Glsl,
        }
    }
}

/// Prints reports to stderr as they arrive.
struct StderrLog;

impl Log for StderrLog {
    fn submit(&mut self, report: Report) {
        eprintln!("{}", report);
        if let Some((line, marker)) = report.snippet {
            eprintln!("  {}", line);
            eprintln!("  {}", marker);
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();

    if !cli.input.exists() {
        bail!("file not found: {}", cli.input.display());
    }

    let defines: Vec<(String, String)> = cli
        .defines
        .iter()
        .map(|entry| match entry.split_once('=') {
            Some((name, value)) => (name.to_string(), value.to_string()),
            None => (entry.clone(), "1".to_string()),
        })
        .collect();

    let mut source = File::open(&cli.input)
        .with_context(|| format!("failed to open {}", cli.input.display()))?;

    let output_path = cli.output.clone().unwrap_or_else(|| {
        let mut path = cli.input.clone();
        path.set_extension(if cli.preprocess_only { "pp.hlsl" } else { "glsl" });
        path
    });

    let mut include_handler =
        xshade_driver::FileIncludeHandler::with_search_paths(cli.include_paths.clone());

    let options = Options {
        preprocess_only: cli.preprocess_only,
        show_ast: cli.show_ast,
        optimize: cli.optimize,
        validate_only: cli.validate,
        show_times: cli.show_times,
        prefer_wrappers: cli.prefer_wrappers,
    };

    let mut statistics = Statistics::new();
    let mut log = StderrLog;

    let mut output_buffer: Vec<u8> = Vec::new();
    let filename = cli.input.display().to_string();

    let ok = compile_shader(
        ShaderInput {
            source_code: &mut source,
            filename: &filename,
            entry_point: &cli.entry,
            shader_target: cli.target.into(),
            shader_version: cli.hlsl.into(),
            include_handler: Some(&mut include_handler),
            defines,
        },
        ShaderOutput {
            source_code: &mut output_buffer,
            shader_version: cli.glsl.into(),
            options,
            statistics: Some(&mut statistics),
        },
        &mut log,
    );

    if ok && !cli.validate {
        let mut file = File::create(&output_path)
            .with_context(|| format!("failed to create {}", output_path.display()))?;
        file.write_all(&output_buffer)?;
    }

    if cli.stats {
        print_statistics(&statistics);
    }

    Ok(ok)
}

fn print_statistics(statistics: &Statistics) {
    if !statistics.macros.is_empty() {
        eprintln!("macros: {}", statistics.macros.join(", "));
    }
    for binding in &statistics.textures {
        eprintln!("texture: {} -> slot {}", binding.name, binding.slot);
    }
    for binding in &statistics.constant_buffers {
        eprintln!("cbuffer: {} -> slot {}", binding.name, binding.slot);
    }
    for binding in &statistics.fragment_targets {
        eprintln!("fragment target: {} -> slot {}", binding.name, binding.slot);
    }
    for (name, state) in &statistics.sampler_states {
        eprintln!("sampler state: {} ({:?})", name, state.filter);
    }
}
