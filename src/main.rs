use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use blocky_world::{App, SceneConfig};

#[derive(Parser, Debug)]
#[command(name = "blocky-world", about = "软光栅化的方块世界场景")]
struct Args {
    /// JSON 场景配置
    #[arg(long)]
    config: Option<PathBuf>,

    /// 不开窗口，直接把帧写成 PNG
    #[arg(long)]
    headless: bool,

    #[arg(long, default_value_t = 60)]
    frames: usize,

    #[arg(long, default_value = "output")]
    out: PathBuf,

    /// 覆盖配置里的超采样倍数
    #[arg(long)]
    ssaa: Option<usize>,

    /// 以法线可视化启动
    #[arg(long)]
    normals: bool,

    #[arg(long)]
    no_lights: bool,

    /// 只输出警告和错误
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &args.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(ssaa) = args.ssaa {
        config.ssaa = ssaa;
    }

    let mut app = App::new(config).context("failed to set up scene")?;
    app.toggles.normals = args.normals;
    app.toggles.lights = !args.no_lights;

    if args.headless {
        app.run_headless(args.frames, &args.out)
            .with_context(|| format!("failed to render into {}", args.out.display()))?;
    } else {
        app.run_window().context("window loop failed")?;
    }
    Ok(())
}
