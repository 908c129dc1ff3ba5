//! This is the command line tool that loads an input file and either
//! compresses or decompresses it.

extern crate clap;
extern crate env_logger;
extern crate log;

use clap::{Arg, ArgAction, Command};
use squeeze::lzss::{DEFAULT_LOOKAHEAD_BITS, DEFAULT_WINDOW_BITS};
use squeeze::{Config, Error};

use std::{fs, time::Instant};
use std::{fs::File, io::Write};

/// The extension given to compressed files.
const FILE_EXTENSION: &str = ".sqz";

fn save_file(data: &[u8], path: &str) {
    let mut f = File::create(path).expect("Can't create file");
    f.write_all(data).expect("Unable to write data");
    log::info!("Wrote {}.", &path);
}

/// A scoped utility struct for measuring and reporting time.
struct Timer {
    start: std::time::Instant,
}

impl Timer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let now = Instant::now();
        if let Some(duration) = now.checked_duration_since(self.start) {
            log::info!(
                "Operation completed in {:03} seconds",
                duration.as_secs_f32()
            );
        }
    }
}

fn handle_buffers(
    is_compress: bool,
    config: Config,
    input: &[u8],
) -> Result<Vec<u8>, Error> {
    if is_compress {
        log::info!(
            "Compressing with window {} and lookahead {}",
            config.window_bits(),
            config.lookahead_bits()
        );
        return squeeze::encode(input, config);
    }

    log::info!(
        "Decompressing with window {} and lookahead {}",
        config.window_bits(),
        config.lookahead_bits()
    );
    squeeze::decode(input, config)
}

fn main() {
    let matches = Command::new("squeeze")
        .version("0.1.0")
        .arg(
            Arg::new("checked")
                .long("check")
                .help("Enables checked-mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("decompress")
                .short('d')
                .long("decompress")
                .help("Try to decompress the input")
                .action(ArgAction::SetTrue)
                .conflicts_with("compress"),
        )
        .arg(
            Arg::new("compress")
                .short('c')
                .long("compress")
                .help("Compress the input")
                .conflicts_with("decompress")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Path of the output file")
                .num_args(1),
        )
        .arg(
            Arg::new("window")
                .short('w')
                .long("window")
                .value_name("BITS")
                .help("Window size exponent")
                .value_parser(clap::value_parser!(u8))
                .num_args(1),
        )
        .arg(
            Arg::new("lookahead")
                .short('l')
                .long("lookahead")
                .value_name("BITS")
                .help("Lookahead size exponent")
                .value_parser(clap::value_parser!(u8))
                .num_args(1),
        )
        .arg(
            Arg::new("INPUT")
                .help("Sets the input file to use")
                .required(true)
                .index(1),
        )
        .get_matches();

    env_logger::builder().format_timestamp(None).init();

    let mut cli_compress = matches.get_flag("compress");
    let cli_decompress = matches.get_flag("decompress");
    let cli_checked_mode = matches.get_flag("checked");
    let mut cli_output_path = matches.get_one::<String>("output").cloned();
    let window = matches
        .get_one::<u8>("window")
        .copied()
        .unwrap_or(DEFAULT_WINDOW_BITS);
    let lookahead = matches
        .get_one::<u8>("lookahead")
        .copied()
        .unwrap_or(DEFAULT_LOOKAHEAD_BITS);

    // The stream has no header, so decompression needs the same values
    // the file was compressed with.
    let config = match Config::new(window, lookahead) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    };

    let input_path = matches.get_one::<String>("INPUT").unwrap();
    let input = fs::read(input_path).expect("Can't open the input file");

    // The user did not specify if this is compress or decompress. Try to
    // figure out using the extension.
    let ends_with_ext = input_path.ends_with(FILE_EXTENSION);
    if !cli_compress && !cli_decompress && !ends_with_ext {
        cli_compress = true;
    }

    // Come up with a file name.
    if cli_output_path.is_none() {
        if input_path.ends_with(FILE_EXTENSION) {
            // remove the extension.
            let end = input_path.len() - FILE_EXTENSION.len();
            cli_output_path = Some(String::from(&input_path[0..end]));
        } else {
            // Add the extension.
            cli_output_path = Some(input_path.clone() + FILE_EXTENSION);
        }
    }

    let out = &cli_output_path.unwrap();
    let timer = Timer::new();

    if cli_compress {
        let dest = match handle_buffers(true, config, &input) {
            Ok(dest) => dest,
            Err(err) => {
                log::error!("Compression failed: {}", err);
                std::process::exit(1);
            }
        };
        log::info!("Compressed from {} to {} bytes.", input.len(), dest.len());
        log::info!(
            "Compression ratio is {:.4}x.",
            input.len() as f64 / dest.len() as f64
        );
        save_file(&dest, out);

        if cli_checked_mode {
            match handle_buffers(false, config, &dest) {
                Ok(decoded) if decoded == input => log::info!("Correct!"),
                Ok(_) => {
                    log::error!("Incorrect!");
                    std::process::exit(1);
                }
                Err(err) => {
                    log::error!("Could not decompress the file: {}", err);
                    std::process::exit(1);
                }
            }
        }
        return;
    }

    match handle_buffers(false, config, &input) {
        Ok(dest) => {
            log::info!(
                "Decompressed from {} to {} bytes.",
                input.len(),
                dest.len()
            );
            save_file(&dest, out);
        }
        Err(err) => {
            log::error!("Decompression failed: {}", err);
            std::process::exit(1);
        }
    }

    drop(timer);
}
