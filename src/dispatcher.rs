//! Command Dispatcher — the REPL state machine: tokenizes input, routes
//! verbs, and turns results into user-facing text.
//!
//! Built around a `match cmd { ... }` loop, but restructured so
//! `dispatch` writes to a passed-in `Write` instead of printing inline,
//! which makes verb routing unit-testable without stdin/stdout.

use log::{debug, info as log_info};

use crate::bpb::Geometry;
use crate::device::ImageFile;
use crate::dir::DirectoryCache;
use crate::error::MfsError;
use crate::file;
use crate::original_names::OriginalNames;

/// Up to 5 whitespace-delimited tokens are recognized per line; surplus
/// tokens are discarded.
const MAX_TOKENS: usize = 5;

struct OpenSession {
    image: ImageFile,
    geometry: Geometry,
    cache: DirectoryCache,
    original_names: OriginalNames,
}

enum State {
    Closed,
    Open(OpenSession),
}

pub struct Dispatcher {
    state: State,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            state: State::Closed,
        }
    }

    /// Returns `true` if the dispatcher should keep reading input (i.e.
    /// the command was not `quit`/`exit`).
    pub fn dispatch(&mut self, line: &str, out: &mut impl std::io::Write) -> std::io::Result<bool> {
        let tokens: Vec<&str> = line.split_whitespace().take(MAX_TOKENS).collect();
        let Some(&cmd) = tokens.first() else {
            return Ok(true);
        };
        let args = &tokens[1..];

        if cmd == "quit" || cmd == "exit" {
            return Ok(false);
        }

        let result = match cmd {
            "open" => self.run_open_checked(args),
            "close" => self.run_close(args),
            "info" => self.run_info(args, out),
            "stat" => self.run_stat(args, out),
            "ls" => self.run_ls(args, out),
            "cd" => self.run_cd(args),
            "get" => self.run_get(args),
            "read" => self.run_read(args, out),
            "del" => self.run_del(args),
            "undel" => self.run_undel(args),
            _ => Err(MfsError::UnknownCommand),
        };
        Self::report(result, out)?;
        Ok(true)
    }

    fn report(result: Result<(), MfsError>, out: &mut impl std::io::Write) -> std::io::Result<()> {
        if let Err(e) = result {
            writeln!(out, "{}", e)?;
        }
        Ok(())
    }

    fn open_session(&self) -> Result<&OpenSession, MfsError> {
        match &self.state {
            State::Open(s) => Ok(s),
            State::Closed => Err(MfsError::MustOpenFirst),
        }
    }

    fn open_session_mut(&mut self) -> Result<&mut OpenSession, MfsError> {
        match &mut self.state {
            State::Open(s) => Ok(s),
            State::Closed => Err(MfsError::MustOpenFirst),
        }
    }

    // Wraps `run_open` so its own precondition errors don't get routed
    // through `open_session`, which doesn't apply to `open` itself.
    fn run_open_checked(&mut self, args: &[&str]) -> Result<(), MfsError> {
        if matches!(self.state, State::Open(_)) {
            return Err(MfsError::AlreadyOpen);
        }
        if args.is_empty() {
            return Err(MfsError::FilenameNotGiven);
        }
        let path = args[0];
        let image = ImageFile::open(path)?;
        let geometry = Geometry::read(&image)?;
        let cache = DirectoryCache::load(&image, &geometry, 0)?;
        let original_names = OriginalNames::capture(cache.entries());
        log_info!("opened {} ({} bytes/sector)", path, geometry.bytes_per_sector);
        self.state = State::Open(OpenSession {
            image,
            geometry,
            cache,
            original_names,
        });
        Ok(())
    }

    fn run_close(&mut self, _args: &[&str]) -> Result<(), MfsError> {
        match self.state {
            State::Open(_) => {
                self.state = State::Closed;
                debug!("closed image");
                Ok(())
            }
            State::Closed => Err(MfsError::NotOpen),
        }
    }

    fn run_info(&self, _args: &[&str], out: &mut impl std::io::Write) -> Result<(), MfsError> {
        let session = self.open_session()?;
        writeln!(out, "{}", session.geometry.info())?;
        Ok(())
    }

    fn run_stat(&self, args: &[&str], out: &mut impl std::io::Write) -> Result<(), MfsError> {
        let session = self.open_session()?;
        if args.is_empty() {
            return Err(MfsError::FilenameNotGiven);
        }
        let entry = session.cache.stat(args[0])?;
        writeln!(out, "Name: {}", String::from_utf8_lossy(&entry.name))?;
        writeln!(out, "Attribute: {:#04x}", entry.attr)?;
        writeln!(out, "FirstClusterHigh: {}", entry.first_cluster_high)?;
        writeln!(out, "FirstClusterLow: {}", entry.first_cluster_low)?;
        writeln!(out, "FileSize: {}", entry.file_size)?;
        Ok(())
    }

    fn run_ls(&self, _args: &[&str], out: &mut impl std::io::Write) -> Result<(), MfsError> {
        let session = self.open_session()?;
        for name in session.cache.ls() {
            writeln!(out, "{} ", String::from_utf8_lossy(&name))?;
        }
        Ok(())
    }

    fn run_cd(&mut self, args: &[&str]) -> Result<(), MfsError> {
        let session = self.open_session_mut()?;
        if args.is_empty() {
            return Err(MfsError::FilenameNotGiven);
        }
        let cluster = session.cache.resolve_cd_target(args[0])?;
        session.cache = DirectoryCache::load(&session.image, &session.geometry, cluster)?;
        Ok(())
    }

    fn run_get(&self, args: &[&str]) -> Result<(), MfsError> {
        let session = self.open_session()?;
        if args.is_empty() {
            return Err(MfsError::FilenameNotGiven);
        }
        file::get(&session.cache, &session.image, &session.geometry, args[0])
    }

    fn run_read(&self, args: &[&str], out: &mut impl std::io::Write) -> Result<(), MfsError> {
        let session = self.open_session()?;
        if args.is_empty() {
            return Err(MfsError::FilenameNotGiven);
        }
        if args.len() < 3 {
            return Err(MfsError::NotEnoughArguments(args.len()));
        }
        let offset: u64 = args[1].parse().unwrap_or(0);
        let length: u64 = args[2].parse().unwrap_or(0);
        file::read(
            &session.cache,
            &session.image,
            &session.geometry,
            args[0],
            offset,
            length,
            out,
        )
    }

    fn run_del(&mut self, args: &[&str]) -> Result<(), MfsError> {
        let session = self.open_session_mut()?;
        if args.is_empty() {
            return Err(MfsError::FilenameNotGiven);
        }
        session.cache.del(args[0])?;
        session.cache.flush_to_root(&session.image, &session.geometry)
    }

    fn run_undel(&mut self, args: &[&str]) -> Result<(), MfsError> {
        let session = self.open_session_mut()?;
        if args.is_empty() {
            return Err(MfsError::FilenameNotGiven);
        }
        session.cache.undel(args[0], &session.original_names)?;
        session.cache.flush_to_root(&session.image, &session.geometry)
    }
}
