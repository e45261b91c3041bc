/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! The `etca` command line tool
//!
//! Three subcommands: `compress` turns a binary PPM into a `.etca` file,
//! `decompress` goes the other way, and `info` prints a file's header and
//! metadata without decoding pixels.

use std::process::exit;

use clap::ArgMatches;
use log::{error, info, Level};

mod cmd_args;
mod commands;

fn main() {
    let cmd = cmd_args::create_cmd_args();
    let options = cmd.get_matches();

    setup_logger(&options);

    let result = match options.subcommand() {
        Some(("compress", args)) => commands::compress(args),
        Some(("decompress", args)) => commands::decompress(args),
        Some(("info", args)) => commands::file_info(args),
        _ => unreachable!("clap enforces a subcommand")
    };

    if let Err(reason) = result {
        error!("Could not complete the command, reason: {reason}");
        exit(-1);
    }
}

/// Set up logging options
fn setup_logger(options: &ArgMatches) {
    let log_level = if options.get_flag("debug") {
        Level::Debug
    } else if options.get_flag("trace") {
        Level::Trace
    } else if options.get_flag("info") {
        Level::Info
    } else if options.get_flag("warn") {
        Level::Warn
    } else {
        Level::Warn
    };

    simple_logger::init_with_level(log_level).unwrap();

    info!("Initialized logger");
    info!("Log level :{}", log_level);
}
