mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

use vidnorm::export;
use vn_av::{resolve_orientation, FfprobeProber, MediaProber, StreamKind, ToolRegistry};
use vn_core::config::Config;
use vn_pipeline::{EventSender, PipelineEvent, VideoPipeline};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults based on --verbose.
    // Logs go to stderr so `--json` output stays machine-readable.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vidnorm=debug,vn_pipeline=debug,vn_av=debug,vn_core=debug".to_string()
        } else {
            "vidnorm=info,vn_pipeline=info,vn_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Process {
            input,
            out_dir,
            json,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(process_file(
                &input,
                out_dir.as_deref(),
                cli.config.as_deref(),
                json,
            ))
        }
        Commands::Probe { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&file, cli.config.as_deref(), json))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("vidnorm {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// An explicit `--config` must load; only its absence falls back to
/// defaults.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = match config_path {
        Some(p) => {
            Config::load(p).with_context(|| format!("failed to load config {}", p.display()))?
        }
        None => Config::default(),
    };
    for warning in config.validate() {
        tracing::warn!("config: {warning}");
    }
    Ok(config)
}

async fn process_file(
    input: &Path,
    out_dir: Option<&Path>,
    config_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    if !input.is_file() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }

    let config = load_config(config_path)?;
    let pipeline = VideoPipeline::from_config(&config)?.with_events(EventSender::new(|event| {
        if let PipelineEvent::Stage(stage) = event {
            tracing::debug!("stage: {stage}");
        }
    }));

    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;
    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let artifact = pipeline.process(bytes, &filename).await?;

    let out_dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| std::path::PathBuf::from(".")),
    };
    let assets = export::write_artifact(&artifact, &out_dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&assets)?);
    } else {
        println!("Video: {} ({} bytes)", assets.video.display(), assets.video_bytes);
        match assets.thumbnail {
            Some(ref thumb) => println!("Thumbnail: {}", thumb.display()),
            None => println!("Thumbnail: none (extraction failed, see log)"),
        }
    }

    Ok(())
}

async fn probe_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = load_config(config_path)?;
    let tools = ToolRegistry::discover(&config.tools);
    let prober =
        FfprobeProber::from_registry(&tools)?.with_timeout(config.pipeline.probe_timeout());

    let metadata = prober.probe(file).await?;
    let orientation = resolve_orientation(&metadata);

    if json {
        let out = serde_json::json!({
            "metadata": metadata,
            "orientation": orientation,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("File: {}", file.display());
    println!(
        "Container: {}",
        metadata.format_name.as_deref().unwrap_or("unknown")
    );
    if let Some(duration) = metadata.duration {
        let secs = duration.as_secs();
        let mins = secs / 60;
        let hours = mins / 60;
        println!("Duration: {:02}:{:02}:{:02}", hours, mins % 60, secs % 60);
    }
    println!("Orientation: {orientation}");
    if !metadata.has_audio() {
        println!("Audio: none (output will be silent)");
    }

    println!("\nStreams: {}", metadata.streams.len());
    for stream in &metadata.streams {
        print!(
            "  [{}] {:?} {}",
            stream.index,
            stream.kind,
            stream.codec_name.as_deref().unwrap_or("?")
        );
        if stream.kind == StreamKind::Video {
            if let (Some(w), Some(h)) = (stream.width, stream.height) {
                print!(" {w}x{h}");
            }
            if let Some(rot) = stream.tag_rotation.or(stream.side_data_rotation) {
                print!(" rotation={rot}");
            }
            if stream.attached_pic {
                print!(" [cover art]");
            }
        }
        println!();
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = load_config(config_path)?;
    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg (which ships ffprobe) to process videos.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = Config::load(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    match config.tools.encoder_path {
        Some(ref p) => println!("  Encoder: {}", p.display()),
        None => println!("  Encoder: ffmpeg (from PATH)"),
    }
    println!("  Scratch dir: {}", config.pipeline.scratch_dir().display());
    println!("  Thumbnail width: {}", config.pipeline.thumbnail_width);
    println!(
        "  Timeouts: probe {}s, transcode {}s, thumbnail {}s",
        config.pipeline.probe_timeout_secs,
        config.pipeline.transcode_timeout_secs,
        config.pipeline.thumbnail_timeout_secs
    );

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {w}");
        }
    }

    Ok(())
}
