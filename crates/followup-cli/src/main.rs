use std::process;

mod cli;
mod logging;
mod server;

fn main() {
    match cli::run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{e:#}"); // pretty anyhow chain
            process::exit(1);
        }
    }
}
