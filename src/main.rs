use std::fs;
use std::path::PathBuf;
use std::process::{self, Command};

use clap::Arg;

fn main() {
    env_logger::init();

    let matches = clap::Command::new("minipy")
        .version("0.1.0")
        .about("A source-to-source compiler from MiniPy to C")
        .arg(
            Arg::new("file")
                .index(1)
                .required(true)
                .value_name("FILE")
                .help("path to the input .minipy file"),
        )
        .get_matches();

    let path = PathBuf::from(matches.get_one::<String>("file").unwrap());

    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Error: could not read input file {}: {}", path.display(), error);
            process::exit(1);
        }
    };

    let c_source = match minipy::compile(&source) {
        Ok(c_source) => c_source,
        Err(error) => {
            eprintln!("Error: {}", error);
            process::exit(1);
        }
    };

    if let Err(error) = fs::write("output.c", &c_source) {
        eprintln!("Error: could not write output.c: {}", error);
        process::exit(1);
    }
    log::debug!("wrote {} bytes to output.c", c_source.len());

    let status = match Command::new("cc").args(["output.c", "-o", "output.exe"]).status() {
        Ok(status) => status,
        Err(error) => {
            eprintln!("Error: could not run the C compiler: {}", error);
            process::exit(1);
        }
    };
    if !status.success() {
        eprintln!("Error: C compilation failed");
        process::exit(1);
    }

    println!("Compilation successful.\nExecutable: output.exe");
}
