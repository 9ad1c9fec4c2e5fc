//! CLI entry point.
//!
//! Print a prompt, read a line, dispatch it. `clap` is dropped here
//! since this shell takes no argv; `env_logger` is wired so `RUST_LOG`
//! controls the `log` calls made throughout the core.

use std::io::{self, BufRead, Write};

use mfs::dispatcher::Dispatcher;

const PROMPT: &str = "mfs> ";

fn main() {
    env_logger::init();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut dispatcher = Dispatcher::new();

    loop {
        print!("{}", PROMPT);
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF: treat as exit.
            Ok(_) => {}
            Err(_) => break,
        }

        match dispatcher.dispatch(&line, &mut stdout) {
            Ok(true) => continue,
            Ok(false) => break,
            Err(_) => break,
        }
    }
}
