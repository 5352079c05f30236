use std::{
    fs,
    io::{self, Write},
    time::Duration,
};

use anyhow::Context;
use clap::Parser;
use coins::{Codec, Collector, DocumentKind, MalformedPolicy};
use owo_colors::{OwoColorize, Stream};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::cli::{Cli, Command, Source};

mod cli;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Cli::parse();
    let input = args.command.input();
    let kind = DocumentKind::from_xml_flag(input.xml);
    let codec = Codec::new(if input.skip_malformed {
        MalformedPolicy::Skip
    } else {
        MalformedPolicy::Strict
    });

    let mut stdout = io::stdout().lock();
    let (mut ok, mut failed) = (0usize, 0usize);
    for src in &input.from {
        match extract(&args.command, src, kind, codec, &mut stdout) {
            Ok(()) => ok += 1,
            Err(e) => {
                failed += 1;
                eprintln!(
                    "{} {src}: {e:#}",
                    "error:".if_supports_color(Stream::Stderr, |t| t.red())
                );
            }
        }
    }
    stdout.flush()?;

    eprintln!(
        "{} {}",
        format!("✓ {ok}").if_supports_color(Stream::Stderr, |t| t.green()),
        format!("✗ {failed}").if_supports_color(Stream::Stderr, |t| t.red()),
    );
    Ok(())
}

/// Load one source and write the view selected by `command` to `out`.
///
/// Nothing is written unless the whole source decodes, so a failing source leaves no partial
/// output behind.
#[tracing::instrument(skip_all, fields(src = %src, ?kind))]
fn extract(
    command: &Command,
    src: &Source,
    kind: DocumentKind,
    codec: Codec,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let body = match src {
        Source::Url(url) => fetch(url)?,
        Source::File(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
    };

    let mut collector = Collector::with_codec(codec);
    collector.load_str(&body, kind)?;
    tracing::info!(markers = collector.len(), "scanned source");

    let rendered = match command {
        Command::Raw { .. } => lines(collector.raw_context_objects()),
        Command::Openurl { base, .. } => lines(&collector.open_urls(base)),
        Command::Fields { .. } => {
            serde_json::to_string_pretty(&collector.decoded_fields()?)? + "\n"
        }
        Command::Metadata { .. } => {
            serde_json::to_string_pretty(&collector.metadata_records()?)? + "\n"
        }
    };
    out.write_all(rendered.as_bytes())?;
    Ok(())
}

fn lines(items: &[String]) -> String {
    items.iter().map(|s| format!("{s}\n")).collect()
}

fn fetch(url: &Url) -> anyhow::Result<String> {
    let cfg = ureq::Agent::config_builder()
        .timeout_connect(Some(Duration::from_secs(5)))
        .timeout_global(Some(Duration::from_secs(15)))
        .build();
    let agent = ureq::Agent::new_with_config(cfg);
    let body = agent
        .get(url.as_str())
        .header(
            "User-Agent",
            "Mozilla/5.0 (compatible; coins/0.1; +https://example.org)",
        )
        .call()
        .with_context(|| format!("failed request for URL {url}"))?
        .into_body()
        .read_to_string()
        .context("read body")?;
    Ok(body)
}
