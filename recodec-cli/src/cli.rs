// recodec-cli/src/cli.rs
//
// Defines the command-line argument structure using clap.

use clap::Parser;
use recodec_core::config::{DEFAULT_CRF, DEFAULT_TARGET_EXTENSION, DEFAULT_VIDEO_CODEC, MAX_CRF};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    name = "recodec",
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Recodec: re-encode videos stored in legacy codecs",
    long_about = "Walks a source tree, probes every video with ffprobe and re-encodes the ones \
                  not already in HEVC/AV1 with ffmpeg into a mirrored tree under the working directory."
)]
pub struct Cli {
    /// Root directory scanned recursively for video files
    #[arg(short = 's', long = "src", required = true, value_name = "DIR")]
    pub src: PathBuf,

    /// Output root for encoded files and logs (default: ./output-<timestamp>)
    #[arg(short = 'w', long = "work-dir", visible_alias = "workDir", value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Comma-separated list of recognised video extensions
    #[arg(long, value_name = "LIST", default_value = "mp4,avi,mov,mkv,wmv")]
    pub extensions: String,

    /// Comma-separated codec identifiers that are already modern and left alone
    #[arg(long, value_name = "LIST", value_delimiter = ',', default_value = "hevc,av1,h265")]
    pub modern_codecs: Vec<String>,

    /// Container extension of the encoded files
    #[arg(long, value_name = "EXT", default_value = DEFAULT_TARGET_EXTENSION)]
    pub target_ext: String,

    /// ffmpeg video encoder
    #[arg(long, value_name = "NAME", default_value = DEFAULT_VIDEO_CODEC)]
    pub video_codec: String,

    /// Constant rate factor passed to the encoder
    #[arg(long, value_name = "CRF", default_value_t = DEFAULT_CRF,
          value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_CRF)))]
    pub crf: u8,

    /// Encoder speed preset, in the encoder's own naming (default: encoder default)
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Transcode a file once per legacy video stream instead of once per file
    #[arg(long)]
    pub once_per_stream: bool,

    /// Record failed transcodes and keep going instead of stopping the run
    #[arg(long)]
    pub continue_on_error: bool,

    /// Also write every pipeline event as a JSON line on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// List the files that would be transcoded without running ffmpeg
    #[arg(long)]
    pub dry_run: bool,
}
