use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgEnum, Parser, Subcommand};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use huffman_codec::artifact::{self, Artifact};
use huffman_codec::wire::{self, WireFormat};
use huffman_codec::{decode_with_table, decode_with_tree, Codebook, TextSymbol};

#[derive(Debug, Error)]
enum Error {
    /// stdin is an interactive terminal
    #[error("refusing to read from a terminal; pipe input in or pass a file")]
    NoStdin,

    /// relaying io::Error with the file it happened on
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    /// text mode input is not valid UTF-8
    #[error("{}: not valid UTF-8; use --bytes for binary input", path.display())]
    NotUtf8 { path: PathBuf },

    /// failure inside the codec itself
    #[error("{}: {source}", path.display())]
    Codec {
        path: PathBuf,
        source: huffman_codec::Error,
    },
}

/// represent all acceptable arguments
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// log filter, e.g. `info` or `huffman_codec=trace`
    #[clap(long, default_value = "warn", global = true)]
    log: String,

    #[clap(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// encodes a file into a bitstream plus a codebook
    Encode {
        /// file to encode, `-` for stdin
        #[clap(parse(from_os_str))]
        input: PathBuf,

        /// encoded output [default: <INPUT>.encoded]
        #[clap(short, long, parse(from_os_str))]
        output: Option<PathBuf>,

        /// codebook output [default: <INPUT>.codes]
        #[clap(short, long, parse(from_os_str))]
        codebook: Option<PathBuf>,

        #[clap(long, arg_enum, default_value = "text")]
        format: Format,

        #[clap(long, arg_enum, default_value = "table")]
        artifact: ArtifactForm,

        /// treat the input as raw bytes instead of UTF-8 text
        #[clap(long)]
        bytes: bool,
    },

    /// decodes a bitstream with its codebook
    Decode {
        /// encoded file, `-` for stdin
        #[clap(parse(from_os_str))]
        input: PathBuf,

        /// codebook written by `encode`
        #[clap(short, long, parse(from_os_str))]
        codebook: PathBuf,

        /// decoded output [default: stdout]
        #[clap(short, long, parse(from_os_str))]
        output: Option<PathBuf>,

        /// the codebook was written with --bytes
        #[clap(long)]
        bytes: bool,
    },
}

#[derive(ArgEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// one '0' or '1' per bit
    Text,
    /// eight bits per byte behind a length header
    Packed,
}

#[derive(ArgEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ArtifactForm {
    /// `symbol:code` lines
    Table,
    /// the whole merge tree with frequencies
    Tree,
}

impl From<Format> for WireFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => WireFormat::Text,
            Format::Packed => WireFormat::Packed,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .with_writer(io::stderr)
        .init();

    match run(args.mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(?err, "aborted");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(mode: Mode) -> Result<(), Error> {
    match mode {
        Mode::Encode {
            input,
            output,
            codebook,
            format,
            artifact,
            bytes,
        } => {
            let output = output.unwrap_or_else(|| with_suffix(&input, "encoded"));
            let codebook_path = codebook.unwrap_or_else(|| with_suffix(&input, "codes"));
            let data = read_input(&input)?;
            let (payload, book) = if bytes {
                encode_symbols(data, format, artifact, &input)?
            } else {
                let text = String::from_utf8(data).map_err(|_| Error::NotUtf8 {
                    path: input.clone(),
                })?;
                encode_symbols(text.chars().collect(), format, artifact, &input)?
            };

            // both transforms succeeded; only now touch the filesystem
            write_file(&codebook_path, book.as_bytes())?;
            if let Err(err) = write_file(&output, &payload) {
                // a codebook with no payload beside it is of no use
                let _ = fs::remove_file(&codebook_path);
                return Err(err);
            }
            info!(
                output = %output.display(),
                codebook = %codebook_path.display(),
                "encoded"
            );
            Ok(())
        }
        Mode::Decode {
            input,
            codebook,
            output,
            bytes,
        } => {
            let book = read_input(&codebook)?;
            let book = String::from_utf8(book).map_err(|_| Error::NotUtf8 {
                path: codebook.clone(),
            })?;
            let payload = read_input(&input)?;

            let decoded = if bytes {
                decode_symbols::<u8>(&payload, &book, &input, &codebook)?
            } else {
                decode_symbols::<char>(&payload, &book, &input, &codebook)?
                    .into_iter()
                    .collect::<String>()
                    .into_bytes()
            };

            match output {
                Some(path) => write_file(&path, &decoded),
                None => {
                    let stdout = io::stdout();
                    let mut stdout = io::BufWriter::new(stdout.lock());
                    stdout
                        .write_all(&decoded)
                        .and_then(|()| stdout.flush())
                        .map_err(|source| Error::Io {
                            path: PathBuf::from("-"),
                            source,
                        })
                }
            }
        }
    }
}

/// encode and render both outputs without writing anything
fn encode_symbols<S: TextSymbol>(
    symbols: Vec<S>,
    format: Format,
    form: ArtifactForm,
    input: &Path,
) -> Result<(Vec<u8>, String), Error> {
    let codebook = Codebook::from_symbols(symbols.iter().cloned());
    let bits = codebook.encode(symbols).map_err(|source| Error::Codec {
        path: input.to_path_buf(),
        source,
    })?;
    debug!(bits = bits.len(), distinct = codebook.table().len(), "encoded input");

    let payload = wire::write_payload(&bits, format.into());
    let book = match form {
        ArtifactForm::Table => artifact::write_table(codebook.table()),
        ArtifactForm::Tree => artifact::write_tree(codebook.tree()),
    };
    Ok((payload, book))
}

fn decode_symbols<S: TextSymbol>(
    payload: &[u8],
    book: &str,
    input: &Path,
    codebook: &Path,
) -> Result<Vec<S>, Error> {
    let loaded = artifact::read_artifact::<S>(book).map_err(|source| Error::Codec {
        path: codebook.to_path_buf(),
        source,
    })?;
    let in_input = |source| Error::Codec {
        path: input.to_path_buf(),
        source,
    };
    let bits = wire::read_payload(payload).map_err(in_input)?;
    debug!(bits = bits.len(), format = ?WireFormat::sniff(payload), "read payload");

    let decoded = match loaded {
        Artifact::Table(table) => decode_with_table(&bits, &table),
        Artifact::Tree(tree) => decode_with_tree(&bits, tree.as_ref()),
    };
    decoded.map_err(in_input)
}

fn read_input(path: &Path) -> Result<Vec<u8>, Error> {
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    if path == Path::new("-") {
        // abort when there is no input from stdin
        if atty::is(atty::Stream::Stdin) {
            return Err(Error::NoStdin);
        }
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data).map_err(io_error)?;
        Ok(data)
    } else {
        fs::read(path).map_err(io_error)
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), Error> {
    fs::write(path, contents).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `<path>.<suffix>`, or `stdin.<suffix>` when reading stdin
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    if path == Path::new("-") {
        return PathBuf::from(format!("stdin.{}", suffix));
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
