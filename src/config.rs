//! Build configuration types.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "output.ipe";

/// Where addresses are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input
    Stdin,
    /// A file on disk
    Path(PathBuf),
}

impl InputSource {
    /// Parse a command-line argument. `-` means standard input.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::Path(PathBuf::from(arg))
        }
    }

    /// Open the source for reading.
    pub fn open(&self) -> Result<Box<dyn Read + Send>> {
        match self {
            InputSource::Stdin => Ok(Box::new(io::stdin())),
            InputSource::Path(path) => {
                let file = File::open(path)?;
                Ok(Box::new(file))
            }
        }
    }

    fn path(&self) -> Option<&Path> {
        match self {
            InputSource::Stdin => None,
            InputSource::Path(path) => Some(path),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => f.write_str("<stdin>"),
            InputSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Options for building a set file from text input.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Input sources, ingested concurrently when there is more than one
    pub inputs: Vec<InputSource>,
    /// Output set file
    pub output: PathBuf,
    /// Log every rejected line at debug level
    pub debug: bool,
}

impl BuildOptions {
    /// Create options for a single input.
    pub fn new(input: InputSource, output: impl Into<PathBuf>) -> Self {
        Self {
            inputs: vec![input],
            output: output.into(),
            debug: false,
        }
    }

    /// Enable or disable reporting of rejected lines.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Check the options before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(Error::Config(
                "missing input file, specify something for -i".to_string(),
            ));
        }
        if self.output.as_os_str().is_empty() {
            return Err(Error::Config(
                "missing output file, specify something for -o".to_string(),
            ));
        }

        let stdin_count = self
            .inputs
            .iter()
            .filter(|i| **i == InputSource::Stdin)
            .count();
        if stdin_count > 1 {
            return Err(Error::Config(
                "standard input can only be read once".to_string(),
            ));
        }

        for input in &self.inputs {
            if let Some(path) = input.path() {
                if path.as_os_str().is_empty() {
                    return Err(Error::Config(
                        "missing input file, specify something for -i".to_string(),
                    ));
                }
                if same_file(path, &self.output) {
                    return Err(Error::Config(
                        "input and output files cannot be the same".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Compare paths, resolving them when both exist.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
