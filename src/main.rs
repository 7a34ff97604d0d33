use clap::{Parser, Subcommand};
use mediaprep::batch::{self, BatchConfig};
use mediaprep::config::{self, MediaConfig};
use mediaprep::geometry::Dimensions;
use mediaprep::imaging::{self, RustBackend, ThumbnailConfig};
use mediaprep::video::{self, CommandRunner, GifOptions, HlsOptions, VideoThumbnailOptions};
use mediaprep::{mime, output};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mediaprep")]
#[command(about = "Thumbnails, GIF previews and HLS renditions for images and videos")]
#[command(long_about = "\
Thumbnails, GIF previews and HLS renditions for images and videos

Images are processed in-process. Videos need the ffmpeg and ffprobe
binaries (on PATH, or configured under [tools]).

Settings are read from ./mediaprep.toml when present, or from --config.
Command-line flags override the file.

Auto-rotation:
  Images  EXIF Orientation tag (all eight states, flips included)
  Videos  stream rotate tag or display-matrix side data (±90, ±180)

Run 'mediaprep gen-config' to generate a documented mediaprep.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./mediaprep.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug details, including every ffmpeg command
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by every command that produces a resized output.
#[derive(clap::Args, Clone)]
struct SizeArgs {
    /// Exact output size, e.g. 320x240
    #[arg(long)]
    size: Option<Dimensions>,

    /// Undo orientation metadata before sizing
    #[arg(long)]
    auto_rotate: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create an exactly-sized image thumbnail
    Thumbnail {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        size: SizeArgs,
    },
    /// Print the rotation (0/90/180/270) implied by each image's EXIF orientation
    Orientation {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Extract a single JPEG frame from a video
    VideoThumbnail {
        input: PathBuf,
        output: PathBuf,
        /// Seek position in seconds
        #[arg(long)]
        time: Option<f64>,
        #[command(flatten)]
        size: SizeArgs,
    },
    /// Create a two-pass palette GIF preview of a clip
    Gif {
        input: PathBuf,
        output: PathBuf,
        /// Clip start in seconds
        #[arg(long)]
        start: Option<f64>,
        /// Clip length in seconds
        #[arg(long)]
        duration: Option<f64>,
        #[arg(long)]
        fps: Option<u32>,
        #[command(flatten)]
        size: SizeArgs,
    },
    /// Package a video as an HLS playlist with MPEG-TS segments
    Hls {
        input: PathBuf,
        output_dir: PathBuf,
        /// Base name for the playlist and segments (defaults to the input stem)
        #[arg(long)]
        name: Option<String>,
        /// Segment length in seconds
        #[arg(long)]
        segment_time: Option<u32>,
        /// Downscale bound: 8k, 4k, 1080p, 720p, 540p, 480p, 360p, 240p, 144p
        #[arg(long)]
        resolution: Option<String>,
        /// Undo stream rotation metadata
        #[arg(long)]
        auto_rotate: bool,
    },
    /// Print the MIME type guessed from each path's extension
    Mime {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Generate thumbnails for every image and video under a directory
    Batch {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        size: SizeArgs,
    },
    /// Print a stock mediaprep.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if matches!(cli.command, Command::GenConfig) {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    let config = config::load_config(cli.config.as_deref(), &cwd)?;
    let runner = CommandRunner::new(&config.tools.ffmpeg, &config.tools.ffprobe);
    let backend = RustBackend::new();

    match cli.command {
        Command::Thumbnail {
            input,
            output: out,
            size,
        } => {
            let thumb_config = thumbnail_config(&config, &size);
            let params = imaging::create_image_thumbnail(&backend, &input, &out, &thumb_config)?;
            output::print_image_thumbnail(&params);
        }
        Command::Orientation { paths } => {
            for path in &paths {
                let rotation = imaging::get_image_orientation(&backend, path)?;
                println!("{}", output::format_orientation(path, rotation));
            }
        }
        Command::VideoThumbnail {
            input,
            output: out,
            time,
            size,
        } => {
            let options = VideoThumbnailOptions {
                time: time.unwrap_or(config.thumbnails.video_time),
                size: size.size,
                auto_rotate: auto_rotate(&config, &size),
            };
            let cmd = video::create_video_thumbnail(&runner, &input, &out, &options)?;
            output::print_video_result("Video thumbnail", &out, &[cmd]);
        }
        Command::Gif {
            input,
            output: out,
            start,
            duration,
            fps,
            size,
        } => {
            let options = GifOptions {
                start: start.unwrap_or(config.gif.start),
                duration: duration.unwrap_or(config.gif.duration),
                fps: fps.unwrap_or(config.gif.fps),
                size: size
                    .size
                    .or(config.gif.size.map(|[w, h]| Dimensions::new(w, h))),
                auto_rotate: auto_rotate(&config, &size),
            };
            let cmds = video::create_gif_preview(&runner, &input, &out, &options)?;
            output::print_video_result("GIF preview", &out, &cmds);
        }
        Command::Hls {
            input,
            output_dir,
            name,
            segment_time,
            resolution,
            auto_rotate,
        } => {
            let base_name = name.unwrap_or_else(|| default_base_name(&input));
            let options = HlsOptions {
                segment_time: segment_time.unwrap_or(config.hls.segment_time),
                resolution: resolution.or(config.hls.resolution.clone()),
                auto_rotate: auto_rotate || config.thumbnails.auto_rotate,
            };
            let result = video::convert_to_hls(&runner, &input, &output_dir, &base_name, &options)?;
            output::print_hls_output(&result);
        }
        Command::Mime { paths } => {
            for path in &paths {
                let mime = mime::get_media_mimetype(path);
                println!("{}", output::format_mimetype(path, mime.as_deref()));
            }
        }
        Command::Batch {
            input,
            output: out,
            size,
        } => {
            init_thread_pool(&config.processing);
            let batch_config = BatchConfig {
                thumbnail: thumbnail_config(&config, &size),
                ..BatchConfig::from(&config)
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let summary =
                batch::thumbnail_dir(&backend, &runner, &input, &out, &batch_config, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let summary = summary?;
            println!("{}", output::format_batch_summary(&summary));
            if !summary.is_success() {
                return Err(format!("{} file(s) failed", summary.failed).into());
            }
        }
        // Printed before the config is loaded, so a broken file can be regenerated.
        Command::GenConfig => {}
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_logger(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn auto_rotate(config: &MediaConfig, args: &SizeArgs) -> bool {
    args.auto_rotate || config.thumbnails.auto_rotate
}

fn thumbnail_config(config: &MediaConfig, args: &SizeArgs) -> ThumbnailConfig {
    ThumbnailConfig {
        size: args.size.unwrap_or_else(|| config.thumbnails.dimensions()),
        auto_rotate: auto_rotate(config, args),
    }
}

fn default_base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "stream".to_string())
}
