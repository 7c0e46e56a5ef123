use std::ffi::OsStr;
use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use hack_vm_translator::{translate, Options, RenderError as _, Target, Unit};

/// Extension of the VM source files
const VM_EXTENSION: &str = "vm";
/// Extension of the generated assembly files
const ASM_EXTENSION: &str = "asm";

/// Translator from the stack-based VM language to Hack assembly
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Increase the logging verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a `.vm` file, or every `.vm` file in a directory, to a single `.asm` file
    Translate {
        /// Path to a `.vm` file or a directory containing `.vm` files
        path: PathBuf,
        /// Output file. Defaults to the input path with the `.asm` extension
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// JSON description of the target machine. Defaults to the standard Hack platform
        #[arg(long, value_name = "FILE")]
        target: Option<PathBuf>,
        /// Prepend the startup code, which initializes the stack and calls the entry function
        #[arg(long)]
        bootstrap: bool,
        /// Precede the code of each command with a comment containing the command
        #[arg(long)]
        annotate: bool,
        /// Colorize the error messages
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },
    /// Print the JSON schema of the target machine description
    Schema,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(self) -> bool {
        match self {
            Self::Auto => std::io::stderr().is_terminal(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Reasons for the translation to fail
enum Failure {
    /// Couldn't read or write a file
    Io(String),
    /// The program has an error, already reported
    Translation,
}

impl Failure {
    const fn exit_code(&self) -> u8 {
        match self {
            Self::Translation => 1,
            Self::Io(_) => 2,
        }
    }
}

/// Source file of a translation unit
struct SourceFile {
    path: PathBuf,
    name: String,
    src: String,
}

fn io_error<'a>(path: &'a Path, action: &str) -> impl FnOnce(std::io::Error) -> Failure + 'a {
    let action = action.to_owned();
    move |e| Failure::Io(format!("Can't {action} `{}`: {e}", path.display()))
}

/// Gets the `.vm` files to translate, sorted by name when the input is a directory
fn discover(path: &Path) -> Result<Vec<PathBuf>, Failure> {
    if !path.is_dir() {
        return Ok(vec![path.to_owned()]);
    }
    let mut files = std::fs::read_dir(path)
        .map_err(io_error(path, "read directory"))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_error(path, "read directory"))?;
    files.retain(|file| file.is_file() && file.extension() == Some(OsStr::new(VM_EXTENSION)));
    files.sort();
    if files.is_empty() {
        return Err(Failure::Io(format!(
            "Directory `{}` doesn't contain any `.{VM_EXTENSION}` file",
            path.display()
        )));
    }
    Ok(files)
}

/// Gets the default output path for an input path: `<file>.asm` next to a file, or `<dir>.asm`
/// next to a directory
fn output_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        let mut output = path.as_os_str().to_owned();
        output.push(".");
        output.push(ASM_EXTENSION);
        PathBuf::from(output)
    } else {
        path.with_extension(ASM_EXTENSION)
    }
}

fn read_sources(files: Vec<PathBuf>) -> Result<Vec<SourceFile>, Failure> {
    files
        .into_iter()
        .map(|path| {
            let src = std::fs::read_to_string(&path).map_err(io_error(&path, "read"))?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            log::debug!("Loaded unit `{name}` from `{}`", path.display());
            Ok(SourceFile { path, name, src })
        })
        .collect()
}

fn run_translate(
    path: &Path,
    output: Option<PathBuf>,
    target: Option<&Path>,
    options: Options,
    color: bool,
) -> Result<(), Failure> {
    let target_src = target
        .map(|file| std::fs::read_to_string(file).map_err(io_error(file, "read")))
        .transpose()?;
    let target = match (&target_src, target) {
        (Some(json), Some(file)) => Target::from_json(json).map_err(|e| {
            Failure::Io(format!("Invalid target description `{}`: {e}", file.display()))
        })?,
        _ => Target::default(),
    };
    log::info!("Translating for target `{}`", target.name);

    let files = read_sources(discover(path)?)?;
    let units: Vec<_> = files
        .iter()
        .map(|file| Unit {
            name: &file.name,
            src: &file.src,
        })
        .collect();

    let asm = match translate(&target, &units, options) {
        Ok(asm) => asm,
        Err(error) => {
            // Errors in the startup code don't belong to any file
            match files.iter().find(|file| file.name == error.unit) {
                Some(file) => {
                    let filename = file.path.display().to_string();
                    eprintln!("{}", error.render(&filename, &file.src, color));
                }
                None => eprintln!("{error}"),
            }
            return Err(Failure::Translation);
        }
    };

    let output = output.unwrap_or_else(|| output_path(path));
    std::fs::write(&output, asm).map_err(io_error(&output, "write"))?;
    log::info!("Wrote `{}`", output.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let result = match cli.command {
        Command::Schema => {
            println!("{}", Target::schema());
            Ok(())
        }
        Command::Translate {
            path,
            output,
            target,
            bootstrap,
            annotate,
            color,
        } => run_translate(
            &path,
            output,
            target.as_deref(),
            Options {
                bootstrap,
                annotate,
            },
            color.enabled(),
        ),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            if let Failure::Io(msg) = &failure {
                eprintln!("error: {msg}");
            }
            ExitCode::from(failure.exit_code())
        }
    }
}
