use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Pipe-delimited input, one `access_date|resource_type|url` per line
    #[arg(value_name = "FILE", default_value = "data.psv")]
    pub input: PathBuf,

    /// Where the URL -> citation mapping is written
    #[arg(long, value_name = "FILE", default_value = "success.json")]
    pub success: PathBuf,

    /// Where the URL -> failure reason mapping is written
    #[arg(long, value_name = "FILE", default_value = "failure.json")]
    pub failure: PathBuf,

    /// Chrome/Chromium binary to drive; auto-detected when omitted
    #[arg(long, value_name = "PATH")]
    pub browser: Option<PathBuf>,

    /// Video metadata API key; read from YOUTUBE_API_KEY when omitted
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,
}
