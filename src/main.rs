use anyhow::{Context, Result};
use audio_uplink::{
    create_router, AppState, AudioAssembler, ByteSink, Config, FsByteSink, GeminiPipeline,
    HistoryStore, JobDispatcher, JsonlHistory, LatestResult, SessionRegistry,
};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "audio-uplink", about = "Chunked audio upload and transcription server")]
struct Args {
    /// Config file basename (without extension)
    #[arg(long, default_value = "config/audio-uplink")]
    config: String,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(port) = args.port {
        cfg.service.http.port = port;
    }

    let api_key = std::env::var("GEMINI_API_KEY")
        .context("GEMINI_API_KEY environment variable must be set")?;

    info!("{} starting", cfg.service.name);
    info!(
        "Audio format: {}Hz, {} channel(s), {}-bit",
        cfg.audio.sample_rate,
        cfg.audio.channels,
        cfg.audio.sample_width_bytes * 8
    );

    let sink: Arc<dyn ByteSink> = Arc::new(FsByteSink::new(&cfg.audio.raw_dir)?);
    let assembler = Arc::new(AudioAssembler::new(&cfg.audio)?);
    let registry = Arc::new(SessionRegistry::new(Arc::clone(&sink)));
    let latest = Arc::new(LatestResult::new());

    let gemini = Arc::new(GeminiPipeline::new(&cfg.pipeline, api_key)?);
    info!(
        "Pipeline models: stt={}, text={}, target language={}",
        cfg.pipeline.stt_model, cfg.pipeline.text_model, cfg.pipeline.target_language
    );

    let history: Option<Arc<dyn HistoryStore>> = if cfg.history.enabled {
        info!("Recording history: {}", cfg.history.path);
        Some(Arc::new(JsonlHistory::new(&cfg.history.path)))
    } else {
        None
    };

    let dispatcher = Arc::new(JobDispatcher::new(
        Arc::clone(&registry),
        Arc::clone(&sink),
        Arc::clone(&assembler),
        gemini.clone(),
        gemini,
        history,
        Arc::clone(&latest),
        &cfg.dispatcher,
        cfg.pipeline.target_language.clone(),
    ));

    let state = AppState {
        service_name: cfg.service.name.clone(),
        registry,
        dispatcher,
        latest,
    };
    let app = create_router(state, &cfg.audio.wav_dir);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
