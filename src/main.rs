extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;

pub mod assembler;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use assembler::{opcode, Assembly};

fn main() {
    let args = process_arguments();
    if let Err(err) = initialize_logging(args.occurrences_of("verbose"), args.value_of("log")) {
        eprintln!("fatal: unable to set up logging: {}", err);
        std::process::exit(1);
    }

    debug!("Arguments:\n\tVerbosity: {}\n\tCheck Only: {}\n\tOutfile: {}\n\tInfile: {}",
        verbosity_filter(args.occurrences_of("verbose")),
        args.is_present("check"),
        args.value_of("output").unwrap_or("None"),
        args.value_of("INPUT").unwrap_or("None")
    );

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
    // INPUT is required, clap refuses to get this far without it.
    let ipath = Path::new(args.value_of("INPUT").unwrap_or_default());

    let ifile = File::open(&ipath)
        .map_err(|err| format!("unable to open input file `{}`: {}", ipath.display(), err))?;

    info!("parsing file {}", ipath.display());
    let assembly = assembler::assemble_source(ifile).map_err(|err| err.to_string())?;

    for section in assembly.symbols.section_symbols.iter() {
        info!("section `{}` at 0x{:08X}", section.name, section.byte_address);
    }

    if args.is_present("dump") {
        println!("{}", listing(&assembly));
    }

    if args.is_present("check") {
        info!("check only, no output written");
        return Ok(());
    }

    let opath = output_path(ipath, args.value_of("output"));
    info!("writing output file {}", opath.display());
    write_image(&opath, &assembly.bytes)
        .map_err(|err| format!("unable to write output file `{}`: {}", opath.display(), err))
}

/// The explicit output path, or the input path with a `.slim` extension.
fn output_path(input: &Path, output: Option<&str>) -> PathBuf {
    match output {
        Some(filename) => PathBuf::from(filename),
        None => input.with_extension("slim"),
    }
}

/// Writes the whole image to a sibling temporary file, then renames it
/// over `path` so readers never see a partial image.
fn write_image(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let written = File::create(&tmp).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });

    match written.and_then(|()| fs::rename(&tmp, path)) {
        Ok(()) => Ok(()),
        Err(err) => {
            fs::remove_file(&tmp).ok();
            Err(err)
        }
    }
}

fn listing(assembly: &Assembly) -> String {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for (addr, record) in assembly.records() {
        let raw: String = record.iter().map(|b| format!("{:02X}", b)).collect();
        grid.add(Cell::from(format!("0x{:08X}:", addr)));
        grid.add(Cell::from(opcode::mnemonic_of(record[0]).unwrap_or("???").to_string()));
        grid.add(Cell::from("=>".to_string()));
        grid.add(Cell::from(raw));
    }

    grid.fit_into_columns(4).to_string()
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::with_name("INPUT")
            .help("Sets the input .slap file to use")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("output")
            .short("o")
            .takes_value(true)
            .help("write output to an outfile (defaults to INPUT with a .slim extension)"))
        .arg(Arg::with_name("check")
            .short("c")
            .long("check")
            .takes_value(false)
            .help("assemble without writing any output"))
        .arg(Arg::with_name("dump")
            .short("d")
            .long("dump")
            .alias("show")
            .takes_value(false)
            .help("prints a listing of the assembled records to STDOUT"))
        .arg(Arg::with_name("log")
            .short("l")
            .long("log")
            .takes_value(true)
            .help("also append log lines to this file"))
        .get_matches()
}

fn verbosity_filter(verbosity: u64) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

fn initialize_logging(verbosity: u64, log_file: Option<&str>) -> Result<(), fern::InitError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(verbosity_filter(verbosity))
        .chain(std::io::stdout());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("slap-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_output_path() {
        assert_eq!(output_path(Path::new("prog/hello.slap"), None), PathBuf::from("prog/hello.slim"));
        assert_eq!(output_path(Path::new("hello"), None), PathBuf::from("hello.slim"));
        assert_eq!(output_path(Path::new("hello.slap"), Some("out.bin")), PathBuf::from("out.bin"));
    }

    #[test]
    fn test_write_image() {
        let path = scratch("image.slim");
        write_image(&path, &[0x01, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![0x01, 0, 0, 0, 0, 0, 0, 0, 0]);

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        assert!(!PathBuf::from(tmp).exists());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_image_failure_leaves_nothing() {
        let path = scratch("missing-dir").join("image.slim");
        assert!(write_image(&path, &[0u8; 9]).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_listing() {
        let assembly = assembler::assemble_source(
            "native std.putch 0x1\nsection main\n CALL std.putch\n HALT".as_bytes(),
        )
        .unwrap();
        let text = listing(&assembly);
        assert!(text.contains("0x00000000:"));
        assert!(text.contains("0x00000009:"));
        assert!(text.contains("CALLN"));
        assert!(text.contains("HALT"));
        assert!(text.contains("620000000000000001"));
    }

    #[test]
    fn test_verbosity_filter() {
        assert_eq!(verbosity_filter(0), log::LevelFilter::Error);
        assert_eq!(verbosity_filter(2), log::LevelFilter::Info);
        assert_eq!(verbosity_filter(9), log::LevelFilter::Debug);
    }
}
