use std::{fs, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand};
use url::Url;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the raw ContextObject of every COinS marker, one per line
    Raw {
        #[command(flatten)]
        input: Input,
    },
    /// Print an OpenURL for every COinS marker, one per line
    Openurl {
        /// Base URL of the OpenURL resolver
        #[arg(long, value_name = "URL")]
        base: String,
        #[command(flatten)]
        input: Input,
    },
    /// Print the decoded key/value fields of every COinS marker as JSON
    Fields {
        #[command(flatten)]
        input: Input,
    },
    /// Print the referent metadata of every COinS marker as JSON
    Metadata {
        #[command(flatten)]
        input: Input,
    },
}

impl Command {
    pub fn input(&self) -> &Input {
        match self {
            Command::Raw { input }
            | Command::Openurl { input, .. }
            | Command::Fields { input }
            | Command::Metadata { input } => input,
        }
    }
}

#[derive(Args, Debug)]
pub struct Input {
    #[arg(value_name = "SRC", required = true)]
    pub from: Vec<Source>,
    /// Parse sources as XML instead of HTML
    #[arg(long)]
    pub xml: bool,
    /// Drop ContextObject pairs that lack '=' instead of failing the source
    #[arg(long)]
    pub skip_malformed: bool,
}

#[derive(Clone, Debug)]
/// Where a page comes from, which can either be
///
/// - an HTTP(S) URL, fetched over the network, or
/// - a local file.
pub enum Source {
    Url(Url),
    File(PathBuf),
}

impl FromStr for Source {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Is this a web page?
        if let Ok(url) = Url::parse(s)
            && matches!(url.scheme(), "http" | "https")
        {
            return Ok(Source::Url(url));
        }
        // No? Must be a file then. Existence is checked when it is read, so that one missing
        // file does not abort the others.
        Ok(Source::File(
            fs::canonicalize(s).unwrap_or_else(|_| PathBuf::from(s)),
        ))
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{url}"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}
