//! Errors that keep a check from producing a result
//!
//! None of these are check outcomes: a missing mount or a slow DNS answer is
//! a normal `Status`. A `CheckError` means we could not tell, and is always
//! reported as UNKNOWN.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use derive_more::From;
use hickory_resolver::error::ResolveError;

/// Every fallible operation in this crate returns this
#[derive(Debug, From)]
pub enum CheckError {
    /// Invalid flags or flag combinations that the argument parser can't see
    #[from(ignore)]
    Config(String),
    /// A file or directory that couldn't be read
    #[from(ignore)]
    Path { path: PathBuf, err: io::Error },
    /// Errors originating in IO without a more specific place
    Io(io::Error),
    /// Transport errors or non-success responses when fetching over http
    Http(reqwest::Error),
    /// The fetched document wasn't what we expected
    Json(serde_json::Error),
    /// A filter pattern that doesn't compile
    Regex(regex::Error),
    /// The resolver couldn't be set up or the query couldn't be made
    Dns(ResolveError),
}

pub type Result<T> = ::std::result::Result<T, CheckError>;

impl CheckError {
    pub fn config<S: Into<String>>(msg: S) -> CheckError {
        CheckError::Config(msg.into())
    }

    pub fn path<P: Into<PathBuf>>(path: P, err: io::Error) -> CheckError {
        CheckError::Path {
            path: path.into(),
            err,
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::CheckError::*;
        match *self {
            Config(ref msg) => write!(f, "{}", msg),
            Path { ref path, ref err } => write!(f, "unable to read {}: {}", path.display(), err),
            Io(ref e) => write!(f, "{}", e),
            Http(ref e) => write!(f, "http error: {}", e),
            Json(ref e) => write!(f, "unable to parse json: {}", e),
            Regex(ref e) => write!(f, "invalid regex: {}", e),
            Dns(ref e) => write!(f, "dns error: {}", e),
        }
    }
}

impl Error for CheckError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        use self::CheckError::*;
        match *self {
            Config(_) => None,
            Path { ref err, .. } => Some(err),
            Io(ref e) => Some(e),
            Http(ref e) => Some(e),
            Json(ref e) => Some(e),
            Regex(ref e) => Some(e),
            Dns(ref e) => Some(e),
        }
    }
}

#[cfg(test)]
mod unit {
    use super::CheckError;
    use std::io;

    #[test]
    fn path_errors_name_the_path() {
        let e = CheckError::path(
            "/no/such/dir",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(e.to_string(), "unable to read /no/such/dir: not found");
    }

    #[test]
    fn regex_errors_convert() {
        let e: CheckError = regex::Regex::new("[oops").unwrap_err().into();
        assert!(e.to_string().starts_with("invalid regex: "));
    }
}
