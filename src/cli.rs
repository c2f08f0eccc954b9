//! Command-line interface definitions for The Watchman.
//!
//! Paths default to the working directory layout the job has always used
//! (`config.yml`, `cache/`, `pdfs/`, `edition.txt`). Mail settings come from
//! the environment, optionally via a `.env` file.

use clap::Parser;

/// Collect new articles from RSS feeds into a newspaper PDF and mail it.
///
/// # Examples
///
/// ```sh
/// # Normal scheduled run
/// watchman
///
/// # Build the PDF without mailing it, starting from an empty cache
/// watchman --skip-delivery --clear-cache
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Feed rule sets (YAML)
    #[arg(short, long, default_value = "config.yml")]
    pub config: String,

    /// Directory holding one cached snapshot per feed
    #[arg(long, default_value = "cache")]
    pub cache_dir: String,

    /// Directory the edition PDF is written to
    #[arg(short, long, default_value = "pdfs")]
    pub output_dir: String,

    /// File holding the edition counter
    #[arg(long, default_value = "edition.txt")]
    pub edition_file: String,

    /// Empty the feed cache before fetching, so every feed counts as new
    #[arg(long)]
    pub clear_cache: bool,

    /// Write the PDF but do not send it
    #[arg(long)]
    pub skip_delivery: bool,

    /// Sending mail account
    #[arg(long, env = "GMAIL", hide_env_values = true)]
    pub mail_account: Option<String>,

    /// Password for the sending account
    #[arg(long, env = "GMAIL_PASSWORD", hide_env_values = true)]
    pub mail_password: Option<String>,

    /// Recipient address (e.g. a Kindle inbox)
    #[arg(long, env = "KINDLE")]
    pub recipient: Option<String>,

    /// SMTP server, reached over implicit TLS
    #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    /// SMTP port
    #[arg(long, env = "SMTP_PORT", default_value_t = 465)]
    pub smtp_port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["watchman"]);

        assert_eq!(cli.config, "config.yml");
        assert_eq!(cli.cache_dir, "cache");
        assert_eq!(cli.output_dir, "pdfs");
        assert_eq!(cli.edition_file, "edition.txt");
        assert!(!cli.clear_cache);
        assert!(!cli.skip_delivery);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "watchman",
            "-c",
            "/etc/watchman.yml",
            "-o",
            "/tmp/pdfs",
            "--skip-delivery",
        ]);

        assert_eq!(cli.config, "/etc/watchman.yml");
        assert_eq!(cli.output_dir, "/tmp/pdfs");
        assert!(cli.skip_delivery);
    }

    #[test]
    fn test_cli_mail_flags() {
        let cli = Cli::parse_from([
            "watchman",
            "--mail-account",
            "paper@example.com",
            "--recipient",
            "reader@kindle.example",
            "--smtp-port",
            "587",
        ]);

        assert_eq!(cli.mail_account.as_deref(), Some("paper@example.com"));
        assert_eq!(cli.recipient.as_deref(), Some("reader@kindle.example"));
        assert_eq!(cli.smtp_port, 587);
    }
}
