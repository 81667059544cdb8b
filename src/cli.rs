//! CLI: compile AST JSON → (generated validators module, rewritten ASTs)
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indexmap::IndexMap;

use martian::ast::Program;
use martian::ir::TypeDefinition;
use martian::{CompileOptions, ModuleBuffer, Scoping, ValidatorSink};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate runtime validators from TypeScript declarations and rewrite `$marshal` call sites
#[derive(Parser, Debug)]
#[command(name = "martian", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate the validators module and rewrite call sites
    Compile(CompileOut),
    /// print the analyzed type definitions (assertion IR) as JSON
    Inspect(InspectOut),
    /// validate a JSON document against one declared type
    Check(CheckIn),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more SWC AST JSON files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// JSON file with compile options
    #[arg(long)]
    config: Option<PathBuf>,

    /// binding scope model (overrides the config file)
    #[arg(long, value_enum)]
    scoping: Option<Scoping>,
}

#[derive(clap::Parser, Debug)]
struct CompileOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// generated module (.ts); stdout if omitted
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// directory for the rewritten ASTs, one pretty-printed JSON file per input
    #[arg(long)]
    rewritten_out: Option<PathBuf>,

    /// also write the predicate library the generated module imports
    #[arg(long)]
    runtime_out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct InspectOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckIn {
    #[command(flatten)]
    input_settings: InputSettings,

    /// name of the declared type to validate against
    #[arg(long = "type")]
    type_name: String,

    /// JSON document to validate
    #[arg(long)]
    data: PathBuf,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn options(&self) -> Result<CompileOptions> {
        let mut options = match self.config.as_ref() {
            Some(path) => CompileOptions::from_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => CompileOptions::default(),
        };
        if let Some(scoping) = self.scoping {
            options.scoping = scoping;
        }
        Ok(options)
    }

    fn load_programs(&self) -> Result<Vec<(PathBuf, Program)>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut programs = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let bytes = std::fs::read(&source_path)
                .with_context(|| format!("failed to read {}", source_path.display()))?;
            let program = martian::path_de::program_from_slice(&bytes)
                .with_context(|| format!("failed to load AST from {}", source_path.display()))?;
            programs.push((source_path, program));
        }
        Ok(programs)
    }

    fn definitions(&self) -> Result<IndexMap<String, Vec<TypeDefinition>>> {
        let mut out = IndexMap::new();
        for (path, program) in self.load_programs()? {
            let defs = martian::analyze_program(&program)
                .with_context(|| format!("failed to analyze {}", path.display()))?;
            out.insert(path.display().to_string(), defs);
        }
        Ok(out)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Compile(target) => target.run(),
            Command::Inspect(target) => target.run(),
            Command::Check(target) => target.run(),
        }
    }
}

impl CompileOut {
    fn run(&self) -> Result<()> {
        let options = self.input_settings.options()?;
        options.validate()?;
        let programs = self.input_settings.load_programs()?;

        let mut module = ModuleBuffer::new();
        module.write_preamble(&martian::sink::preamble(&options))?;
        let mut rewritten = Vec::with_capacity(programs.len());
        for (path, program) in programs {
            let compiled = martian::compile_program(program, &options, &mut module)
                .with_context(|| format!("failed to compile {}", path.display()))?;
            rewritten.push((path, compiled.program));
        }

        // every input compiled; only now touch the filesystem
        write_or_print(self.out.as_deref(), module.as_str())?;
        if let Some(dir) = self.rewritten_out.as_ref() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            for (path, program) in &rewritten {
                let file_name = path
                    .file_name()
                    .ok_or_else(|| anyhow!("input path has no file name: {}", path.display()))?;
                let target = dir.join(file_name);
                let src = serde_json::to_string_pretty(program)?;
                std::fs::write(&target, src)
                    .with_context(|| format!("failed to write {}", target.display()))?;
            }
        }
        if let Some(path) = self.runtime_out.as_deref() {
            write_file(path, martian::sink::PREDICATES_SOURCE)?;
        }
        Ok(())
    }
}

impl InspectOut {
    fn run(&self) -> Result<()> {
        let defs = self.input_settings.definitions()?;
        let src = serde_json::to_string_pretty(&defs)?;
        write_or_print(self.out.as_deref(), &src)
    }
}

impl CheckIn {
    fn run(&self) -> Result<()> {
        let defs = self.input_settings.definitions()?;
        let Some(def) = defs.values().flatten().find(|d| d.name == self.type_name) else {
            bail!("no declaration named `{}` in the inputs", self.type_name);
        };
        let bytes = std::fs::read(&self.data)
            .with_context(|| format!("failed to read {}", self.data.display()))?;
        let value: serde_json::Value = martian::path_de::from_slice_with_path(&bytes)
            .with_context(|| format!("failed to parse {}", self.data.display()))?;
        martian::validate::validate(def, value)
            .with_context(|| format!("{} does not match `{}`", self.data.display(), def.name))?;
        println!("{} {} matches `{}`", "ok:".green().bold(), self.data.display(), def.name);
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_or_print(out: Option<&Path>, src: &str) -> Result<()> {
    match out {
        Some(path) => write_file(path, src),
        None => {
            println!("{src}");
            Ok(())
        }
    }
}

fn write_file(path: &Path, src: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, src).with_context(|| format!("failed to write {}", path.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
