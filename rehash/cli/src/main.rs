//! CLI for hashing, checking and migrating password hashes.
//!
//! ## Usage
//!
//! ```bash
//! # Hash a password with the default family (Argon2id)
//! rh hash "mysecret"
//! echo "mysecret" | rh hash --algorithm bcrypt -
//!
//! # Check a password against a stored token (exit 0 = match, 1 = no match)
//! rh check '$2b$10$...' "mysecret"
//!
//! # Verify and move a token to another family
//! rh update '$pbkdf2$SHA1$...' "mysecret" --to scrypt
//!
//! # Which family produced a token
//! rh identify '$s0$e0801$...'
//!
//! # Generate shell completions
//! source <(COMPLETE=bash rh)
//! ```

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use color_eyre::eyre::{Result, WrapErr, bail};
use tracing::debug;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use rehash::{AlgorithmKind, HashingConfig, HashingFunction, Password, identify_family};

/// Hash, check and migrate self-describing password hashes
#[derive(Parser)]
#[command(name = "rh", version, about, long_about = None)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// TOML file with default parameters and pepper
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Increase log verbosity on stderr (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hash a plaintext and print the token
    Hash {
        /// Plaintext to hash ("-" reads stdin)
        plaintext: String,

        /// Hashing function family
        #[arg(short, long, value_enum, default_value_t = Family::Argon2)]
        algorithm: Family,

        /// Salt as literal text (random when omitted)
        #[arg(long)]
        salt: Option<String>,

        #[command(flatten)]
        pepper: PepperArg,
    },

    /// Check a plaintext against a token; exit 0 on match, 1 otherwise
    Check {
        /// Stored token
        token: String,

        /// Plaintext to check ("-" reads stdin)
        plaintext: String,

        #[command(flatten)]
        pepper: PepperArg,
    },

    /// Verify a token and, on success, print a new token
    Update {
        /// Stored token
        token: String,

        /// Plaintext to verify ("-" reads stdin)
        plaintext: String,

        /// Family of the new token
        #[arg(long, value_enum)]
        to: Family,

        #[command(flatten)]
        pepper: PepperArg,

        /// Pepper for the new token (defaults to the configured pepper)
        #[arg(long)]
        new_pepper: Option<String>,

        /// Salt for the new token as literal text (random when omitted)
        #[arg(long)]
        new_salt: Option<String>,
    },

    /// Print the family that produced a token
    Identify {
        /// Token to inspect
        token: String,

        /// Decode the token and print its parameters too
        #[arg(long)]
        params: bool,
    },
}

#[derive(Args)]
struct PepperArg {
    /// Pepper prefixed to the plaintext (defaults to the configured pepper)
    #[arg(long)]
    pepper: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Family {
    Pbkdf2,
    CompressedPbkdf2,
    Bcrypt,
    Scrypt,
    MessageDigest,
    Argon2,
}

impl From<Family> for AlgorithmKind {
    fn from(family: Family) -> Self {
        match family {
            Family::Pbkdf2 => AlgorithmKind::Pbkdf2,
            Family::CompressedPbkdf2 => AlgorithmKind::CompressedPbkdf2,
            Family::Bcrypt => AlgorithmKind::Bcrypt,
            Family::Scrypt => AlgorithmKind::Scrypt,
            Family::MessageDigest => AlgorithmKind::MessageDigest,
            Family::Argon2 => AlgorithmKind::Argon2,
        }
    }
}

const AFTER_HELP: &str = "\
EXIT STATUS:
  check   0 when the plaintext matches, 1 when it does not, 2 on error
  update  0 with the new token, 1 when the plaintext does not verify, 2 on error

SHELL COMPLETIONS:
  Enable tab completions by adding one line to your shell config:

  Bash (~/.bashrc):
    source <(COMPLETE=bash rh)

  Zsh (~/.zshrc):
    source <(COMPLETE=zsh rh)

  Fish (~/.config/fish/config.fish):
    COMPLETE=fish rh | source

EXAMPLES:
  rh hash \"secret\"                          # Argon2id token
  rh hash --algorithm bcrypt \"secret\"       # BCrypt token
  echo \"secret\" | rh hash -                  # Plaintext from stdin
  rh check \"$TOKEN\" \"secret\"                 # true / false
  rh update \"$TOKEN\" \"secret\" --to scrypt    # Migrate to SCrypt
  rh --config rehash.toml hash \"secret\"     # Custom defaults and pepper
";

/// Initializes tracing to stderr based on the `-v` count.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(verbose: u8) {
    if verbose == 0 {
        return;
    }

    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            1 => "warn,rh=info,rehash=info".to_string(),
            2 => "info,rh=debug,rehash=debug".to_string(),
            _ => "debug,rh=trace,rehash=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> ExitCode {
    // Check for shell completion generation before parsing args
    if let Ok(shell_name) = std::env::var("COMPLETE") {
        return generate_completions(&shell_name);
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    color_eyre::install()?;
    let config = match &cli.config {
        Some(path) => HashingConfig::from_file(path)
            .wrap_err_with(|| format!("loading {}", path.display()))?,
        None => HashingConfig::default(),
    };
    let password = Password::new(&config)?;

    match cli.command {
        Command::Hash {
            plaintext,
            algorithm,
            salt,
            pepper,
        } => {
            let plaintext = read_plaintext(&plaintext)?;
            let mut request = password.hash(&plaintext);
            if let Some(pepper) = pepper.resolve(&config) {
                request = request.add_pepper_str(pepper);
            }
            if let Some(salt) = salt {
                request = request.add_salt(salt.into_bytes());
            }
            let hash = request.with_kind(algorithm.into())?;
            println!("{hash}");
            Ok(ExitCode::SUCCESS)
        }

        Command::Check {
            token,
            plaintext,
            pepper,
        } => {
            let plaintext = read_plaintext(&plaintext)?;
            let mut request = password.check(&token, &plaintext);
            if let Some(pepper) = pepper.resolve(&config) {
                request = request.add_pepper_str(pepper);
            }
            let matched = request.with_detected()?;
            println!("{matched}");
            Ok(if matched {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }

        Command::Update {
            token,
            plaintext,
            to,
            pepper,
            new_pepper,
            new_salt,
        } => {
            let plaintext = read_plaintext(&plaintext)?;
            let mut request = password.check(&token, &plaintext);
            if let Some(pepper) = pepper.resolve(&config) {
                request = request.add_pepper_str(pepper);
            }
            let mut request = request.and_update();
            if let Some(pepper) = new_pepper.or_else(|| config.pepper.clone()) {
                request = request.add_new_pepper_str(pepper);
            }
            if let Some(salt) = new_salt {
                request = request.add_new_salt(salt.into_bytes());
            }

            let update = request.with_kind(to.into())?;
            match update.hash() {
                Some(hash) => {
                    println!("{hash}");
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("unverified");
                    Ok(ExitCode::from(1))
                }
            }
        }

        Command::Identify { token, params } => {
            let kind = identify_family(&token)?;
            if params {
                let function = HashingFunction::from_hash(&token)?;
                println!("{function}");
            } else {
                println!("{kind}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

impl PepperArg {
    fn resolve(self, config: &HashingConfig) -> Option<String> {
        self.pepper.or_else(|| config.pepper.clone())
    }
}

/// Returns the plaintext argument, or the first line of stdin for "-".
fn read_plaintext(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .wrap_err("failed to read plaintext from stdin")?;
    let plaintext = line.trim_end_matches(['\r', '\n']).to_string();
    if plaintext.is_empty() {
        bail!("empty plaintext on stdin");
    }
    debug!(len = plaintext.len(), "read plaintext from stdin");
    Ok(plaintext)
}

/// Generate shell completions.
fn generate_completions(shell_name: &str) -> ExitCode {
    let shell = match shell_name.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "powershell" => Shell::PowerShell,
        "elvish" => Shell::Elvish,
        _ => {
            eprintln!(
                "Unknown shell: {shell_name}. Supported: bash, zsh, fish, powershell, elvish"
            );
            return ExitCode::from(2);
        }
    };

    clap_complete::generate(shell, &mut Cli::command(), "rh", &mut io::stdout());
    ExitCode::SUCCESS
}
