//! Convert images to and from the Quite Ok Image format.
//!
//! ```sh
//! qoi encode photo.png photo.qoi
//! qoi -vv decode photo.qoi photo.png
//! ```

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{info, Level};
use qoif::{decode_image, encode_image, DecoderOptions, QoiDecoder};

#[rustfmt::skip]
fn create_cmd_args() -> Command {
    let paths = [
        Arg::new("source")
            .help("File to read the image from")
            .value_parser(value_parser!(PathBuf))
            .required(true),
        Arg::new("destination")
            .help("File to write the converted image to")
            .value_parser(value_parser!(PathBuf))
            .required(true),
    ];

    Command::new("qoi")
        .about("Convert images to and from the Quite Ok Image format")
        .subcommand_required(true)
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .global(true)
            .action(ArgAction::Count)
            .help("Log debug information, repeat to trace every chunk"))
        .subcommand(Command::new("encode")
            .about("Encode any image format `image` understands as QOI")
            .args(paths.clone()))
        .subcommand(Command::new("decode")
            .about("Decode a QOI image, the output format follows the destination extension")
            .arg(Arg::new("strict")
                .long("strict")
                .action(ArgAction::SetTrue)
                .help("Fail on streams whose chunks disagree with the header"))
            .args(paths))
}

fn setup_logger(options: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let log_level = match options.get_count("verbose") {
        0 => Level::Warn,
        1 => Level::Debug,
        _ => Level::Trace,
    };
    simple_logger::init_with_level(log_level)?;
    info!("Log level :{}", log_level);
    Ok(())
}

fn paths(args: &ArgMatches) -> (&PathBuf, &PathBuf) {
    // both are required, clap rejects the command line before we get here
    let source = args.get_one::<PathBuf>("source").unwrap();
    let destination = args.get_one::<PathBuf>("destination").unwrap();
    (source, destination)
}

fn main() -> Result<(), Box<dyn Error>> {
    let options = create_cmd_args().get_matches();
    setup_logger(&options)?;

    match options.subcommand() {
        Some(("encode", args)) => {
            let (source, destination) = paths(args);
            let image = image::open(source)?;
            info!("Loaded {} ({}x{})", source.display(), image.width(), image.height());

            let stream = encode_image(&image)?;
            fs::write(destination, &stream)?;
            info!("Wrote {} bytes to {}", stream.len(), destination.display());
        }
        Some(("decode", args)) => {
            let (source, destination) = paths(args);
            let data = fs::read(source)?;

            let image = if args.get_flag("strict") {
                let options = DecoderOptions::default().set_strict_mode(true);
                let decoder = QoiDecoder::with_options(data.as_slice(), options)?;
                image::DynamicImage::from_decoder(decoder)?.into_rgba8()
            } else {
                decode_image(&data)?
            };
            info!("Decoded {} ({}x{})", source.display(), image.width(), image.height());

            image.save(destination)?;
            info!("Wrote {}", destination.display());
        }
        _ => unreachable!("subcommand_required"),
    }

    Ok(())
}
