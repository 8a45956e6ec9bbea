//! `slang` is the command line front door for the SL tools. It does no
//! work itself: assembling is handed to `slap` and running is handed to
//! the `slim` executor.
extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;

use clap::{Arg, ArgMatches, App};

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    let status = match run(&args) {
        Ok(()) => 0,
        Err(err) => {
            error!("fatal: {}", err);
            1
        }
    };

    log::logger().flush();
    std::process::exit(status);
}

fn run(args: &ArgMatches) -> Result<(), String> {
    let file = Path::new(args.value_of("FILE").unwrap_or_default());
    let assemble_requested = args.is_present("assemble");
    let run_requested = args.is_present("run");

    if !assemble_requested && !run_requested {
        return Err("nothing to do, pass -a to assemble and/or -r to run".to_owned());
    }

    let image = if assemble_requested {
        info!("assembling...");
        let slap = args.value_of("slap").map(PathBuf::from).unwrap_or_else(locate_slap);
        assemble(file, &slap)?
    } else {
        file.to_path_buf()
    };

    if run_requested {
        info!("running...");
        // SLIM_EXECUTOR is folded into this value by clap.
        let slim = args.value_of("slim").unwrap_or("slim");
        execute(&image, Path::new(slim))?;
    }

    Ok(())
}

/// Assembles a `.slap` file and returns the path of the image `slap` wrote.
fn assemble(file: &Path, slap: &Path) -> Result<PathBuf, String> {
    let source = check_file(file, "slap")?;
    spawn(slap, &source)?;
    Ok(source.with_extension("slim"))
}

fn execute(file: &Path, slim: &Path) -> Result<(), String> {
    let image = check_file(file, "slim")?;
    spawn(slim, &image)
}

/// Makes sure `file` exists and has the expected extension, returning
/// its absolute path.
fn check_file(file: &Path, extension: &str) -> Result<PathBuf, String> {
    if !file.exists() {
        return Err(format!("file `{}` does not exist", file.display()));
    }
    if file.extension() != Some(OsStr::new(extension)) {
        return Err(format!("file `{}` must be a .{} file", file.display(), extension));
    }
    file.canonicalize()
        .map_err(|err| format!("unable to resolve `{}`: {}", file.display(), err))
}

fn spawn(program: &Path, file: &Path) -> Result<(), String> {
    debug!("running {} {}", program.display(), file.display());
    let status = Command::new(program)
        .arg(file)
        .status()
        .map_err(|err| format!("unable to start `{}`: {}", program.display(), err))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("`{}` failed with {}", program.display(), status))
    }
}

/// Prefers the `slap` built next to this executable, falling back to
/// whatever `slap` is on the PATH.
fn locate_slap() -> PathBuf {
    let name = format!("slap{}", env::consts::EXE_SUFFIX);
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(name))
}

fn process_arguments() -> ArgMatches<'static> {
    App::new("slang")
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("SL command line interface")
        .after_help("Dispatches to the SL assembler (slap) and executor (slim).")
        .arg(Arg::with_name("FILE")
            .help("The file to be assembled or run")
            .required(true)
            .index(1))
        .arg(Arg::with_name("assemble")
            .short("a")
            .takes_value(false)
            .help("Assembles the specified .slap file"))
        .arg(Arg::with_name("run")
            .short("r")
            .takes_value(false)
            .help("Runs the specified .slim file (or the image just assembled with -a)"))
        .arg(Arg::with_name("slap")
            .long("slap")
            .takes_value(true)
            .help("Path to the slap assembler"))
        .arg(Arg::with_name("slim")
            .long("slim")
            .takes_value(true)
            .env("SLIM_EXECUTOR")
            .help("Path to the slim executor"))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .get_matches()
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(match verbosity {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .chain(std::io::stdout())
        .apply().ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch(name: &str) -> PathBuf {
        env::temp_dir().join(format!("slang-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_check_file() {
        let path = scratch("prog.slap");
        fs::write(&path, "section main\n HALT\n").unwrap();

        let resolved = check_file(&path, "slap").unwrap();
        assert!(resolved.is_absolute());
        assert!(check_file(&path, "slim").is_err());
        assert!(check_file(&scratch("absent.slap"), "slap").is_err());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_assemble_without_assembler() {
        let path = scratch("named.slap");
        fs::write(&path, "section main\n HALT\n").unwrap();

        let image = assemble(&path, &env::current_exe().unwrap().with_file_name("does-not-exist"));
        assert!(image.unwrap_err().contains("unable to start"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_spawn_missing_program() {
        let err = spawn(Path::new("/nonexistent/slim"), Path::new("x.slim")).unwrap_err();
        assert!(err.contains("unable to start"));
    }
}
