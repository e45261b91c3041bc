/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::ffi::OsString;

use clap::{value_parser, Arg, ArgAction, Command};

pub fn create_cmd_args() -> Command {
    Command::new("etca")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress and decompress images in the .etca tile-tree format")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .args(add_logging_options())
        .subcommand(
            Command::new("compress")
                .about("Compress a PPM image to .etca format")
                .arg(
                    Arg::new("in")
                        .short('i')
                        .long("input")
                        .help("Input image file (binary PPM)")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(OsString))
                        .required(true)
                )
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("output")
                        .help("Output .etca file, derived from the input name if omitted")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(OsString))
                )
                .arg(
                    Arg::new("lossless")
                        .long("lossless")
                        .help("Use the aggressive lossless preset (default: lossy)")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("quality")
                        .long("quality")
                        .help("Subdivision threshold in [0, 255]; lower keeps more detail")
                        .value_parser(value_parser!(f64))
                        .default_value("10.0")
                )
                .arg(
                    Arg::new("max-depth")
                        .long("max-depth")
                        .help("Cap on the tile tree depth")
                        .value_parser(value_parser!(u8))
                )
                .arg(
                    Arg::new("prefer-speed")
                        .long("prefer-speed")
                        .help("Skip the slower entropy coders")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("author")
                        .long("author")
                        .help("Author name stored in the file metadata")
                        .action(ArgAction::Set)
                )
        )
        .subcommand(
            Command::new("decompress")
                .about("Decompress a .etca file to a PPM image")
                .arg(
                    Arg::new("in")
                        .short('i')
                        .long("input")
                        .help("Input .etca file")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(OsString))
                        .required(true)
                )
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("output")
                        .help("Output image file (binary PPM)")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(OsString))
                        .required(true)
                )
                .arg(
                    Arg::new("smooth")
                        .long("smooth")
                        .help("Run the 3x3 smoothing pass over the reconstruction")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("info")
                .about("Display header and metadata of a .etca file")
                .arg(
                    Arg::new("in")
                        .short('i')
                        .long("input")
                        .help("Input .etca file")
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(OsString))
                        .required(true)
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print machine readable JSON")
                        .action(ArgAction::SetTrue)
                )
        )
}

fn add_logging_options() -> [Arg; 4] {
    [
        Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .global(true)
            .help_heading("Logging")
            .help("Display debug information and higher"),
        Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .global(true)
            .help_heading("Logging")
            .help("Display very verbose information"),
        Arg::new("warn")
            .long("warn")
            .action(ArgAction::SetTrue)
            .global(true)
            .help_heading("Logging")
            .help("Display warnings and errors"),
        Arg::new("info")
            .long("info")
            .action(ArgAction::SetTrue)
            .global(true)
            .help_heading("Logging")
            .help("Display informational messages")
    ]
}
