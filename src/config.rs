/// Runtime configuration, parsed from the command line.
///
/// Invocation: `flexserve <address> <port> <doc_root> <threads>`. The TLS
/// certificate directory is optional and comes from the `CERT_DIR`
/// environment variable; without it the server runs plaintext-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub doc_root: String,
    pub threads: usize,
    pub cert_dir: Option<String>,
}

pub const USAGE: &str = "Usage: flexserve <address> <port> <doc_root> <threads>\n\
Example:\n    flexserve 0.0.0.0 8080 . 1";

impl Config {
    /// Parses argv. Any argument-count or format problem yields the usage
    /// string so the caller can print it and exit with a failure code.
    pub fn from_args(args: impl Iterator<Item = String>) -> Result<Self, String> {
        let args: Vec<String> = args.skip(1).collect();
        if args.len() != 4 {
            return Err(USAGE.to_string());
        }

        let address = &args[0];
        let port: u16 = args[1]
            .parse()
            .map_err(|_| format!("invalid port '{}'\n{}", args[1], USAGE))?;
        let doc_root = args[2].clone();
        // Clamp to at least one worker thread.
        let threads = args[3].parse::<usize>().unwrap_or(1).max(1);

        Ok(Self {
            listen_addr: format!("{address}:{port}"),
            doc_root,
            threads,
            cert_dir: std::env::var("CERT_DIR").ok(),
        })
    }
}
