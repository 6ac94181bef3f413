//! Yatra voicebot CLI.
//!
//! # Usage
//!
//! ```bash
//! yatra [--config yatra.toml]              # type utterances on stdin
//! yatra --audio call.wav                   # answer the speech in a WAV file
//! yatra --call +91XXXXXXXXXX               # place the intro call
//! ```
//!
//! Credentials come from the environment (or `.env`): `OPENAI_API_KEY`,
//! optionally `ELEVENLABS_API_KEY` and the `TWILIO_*` variables.

#![expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "console front end"
)]

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use yatra_agent::{
    AgentSession, AppError, IntroCall, KeywordIndex, Reply, Secrets, TwilioClient,
    TwilioCredentials, VoicePipeline, VoicebotConfig, build_session,
};
use yatra_core::{TracingSetup, load_dotenv};
use yatra_model_providers::OpenAiProvider;
use yatra_models::ModelRegistry;
use yatra_speech::{ElevenLabsTts, TextToSpeech, WebRtcVad, WhisperStt};

#[derive(Debug, Parser)]
#[command(name = "yatra", version, about = "Travel-consultant voicebot")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Answer the speech in this 16-bit WAV file instead of reading stdin.
    #[arg(long, conflicts_with = "call")]
    audio: Option<PathBuf>,

    /// Place the intro call to this number (defaults to the configured one).
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    call: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();
    let cli = Cli::parse();

    let config = match VoicebotConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::from(2);
        }
    };
    TracingSetup::from_config(&config.logging).init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "yatra stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: VoicebotConfig) -> Result<(), AppError> {
    if let Some(to) = cli.call {
        return place_intro_call(&config, &to).await;
    }

    let secrets = Secrets::from_env()?;
    let session = Arc::new(open_session(&config, &secrets)?);

    let greeting = session.say(&config.agent.greeting).await?;
    let result = match cli.audio {
        Some(path) => answer_recording(&config, &secrets, &session, greeting, &path).await,
        None => console(&session, greeting).await,
    };
    session.close();
    result
}

fn open_session(config: &VoicebotConfig, secrets: &Secrets) -> Result<AgentSession, AppError> {
    let mut openai = OpenAiProvider::new(secrets.openai_api_key.expose());
    if let Some(base_url) = &config.speech.openai_base_url {
        openai = openai.with_base_url(base_url);
    }
    let mut models = ModelRegistry::new();
    models.register_llm_provider("openai", Arc::new(openai));

    let knowledge = Arc::new(KeywordIndex::from_dir(
        &config.knowledge.dir,
        config.knowledge.top_k,
    )?);

    let tts = secrets.elevenlabs_api_key.as_ref().map(|key| {
        let mut tts = ElevenLabsTts::new(key.expose(), &config.speech.voice_id)
            .with_model(&config.speech.tts_model);
        if let Some(base_url) = &config.speech.elevenlabs_base_url {
            tts = tts.with_base_url(base_url);
        }
        Arc::new(tts) as Arc<dyn TextToSpeech>
    });
    if tts.is_none() {
        tracing::warn!("ELEVENLABS_API_KEY not set, replies will be text only");
    }

    build_session(config, &models, knowledge, tts)
}

async fn console(session: &AgentSession, greeting: Reply) -> Result<(), AppError> {
    println!("yatra> {}", greeting.text);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit" | "bye") {
            break;
        }
        let reply = session.handle_utterance(line).await?;
        println!("yatra> {}", reply.text);
    }
    Ok(())
}

async fn answer_recording(
    config: &VoicebotConfig,
    secrets: &Secrets,
    session: &Arc<AgentSession>,
    greeting: Reply,
    path: &Path,
) -> Result<(), AppError> {
    let (samples, sample_rate) = yatra_speech::wav::read_wav(path)?;

    let mut stt = WhisperStt::new(secrets.openai_api_key.expose())
        .with_model(&config.speech.stt_model)
        .with_language(&config.speech.language);
    if let Some(base_url) = &config.speech.openai_base_url {
        stt = stt.with_base_url(base_url);
    }
    let pipeline = VoicePipeline::new(
        Arc::new(WebRtcVad::new(config.vad.clone())),
        Arc::new(stt),
        Arc::clone(session),
    )
    .with_stt_timeout(config.timeouts.stt());

    let replies = pipeline.process(&samples, sample_rate).await?;
    for (index, reply) in std::iter::once(greeting).chain(replies).enumerate() {
        println!("yatra> {}", reply.text);
        if let Some(audio) = reply.audio {
            let out = path.with_extension(format!("reply-{index}.mp3"));
            tokio::fs::write(&out, audio).await?;
            tracing::info!(path = %out.display(), "reply audio written");
        }
    }
    Ok(())
}

async fn place_intro_call(config: &VoicebotConfig, to: &str) -> Result<(), AppError> {
    let to = config.telephony.recipient(to)?;
    let credentials = TwilioCredentials::from_env()?;
    let mut client = TwilioClient::new(credentials);
    if let Some(base_url) = &config.telephony.api_base_url {
        client = client.with_base_url(base_url);
    }

    let script = IntroCall::new(&config.telephony.customer_name, &config.telephony.destination);
    tracing::debug!(twiml = %script.to_twiml(), "intro call markup");
    let sid = client.place_call(to, &config.telephony.intro_url).await?;
    println!("Intro call placed: {sid}");
    Ok(())
}
