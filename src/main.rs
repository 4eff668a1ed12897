mod backend;
mod classify;
mod openai;
mod pipeline;
mod server;

use clap::Parser;

#[derive(clap::Parser)]
struct Opts {
    /// TOML config file. Without one the service runs with defaults.
    config: Option<std::path::PathBuf>,
}

fn listen_default() -> String {
    "0.0.0.0:5002".to_owned()
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct Config {
    #[serde(default = "listen_default")]
    listen: String,
    generator: Option<toml::Table>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: listen_default(),
            generator: None,
        }
    }
}

/// Builds the generator from the `[generator]` table, or from a Google API key in the environment.
fn new_generator(
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Option<std::sync::Arc<dyn backend::Backend>>, anyhow::Error> {
    if let Some(table) = config.generator.as_ref() {
        let mut table = table.clone();
        let typ = match table.remove("type") {
            Some(toml::Value::String(typ)) => typ,
            _ => return Err(anyhow::format_err!("generator.type must be a string")),
        };
        return Ok(Some(backend::new_backend_from_config(typ, toml::Value::Table(table))?.into()));
    }

    let api_key = match ["GOOGLE_API_KEY", "NEXT_PUBLIC_GOOGLE_API_KEY"]
        .into_iter()
        .filter_map(|name| env(name))
        .find(|key| !key.is_empty())
    {
        Some(api_key) => api_key,
        None => return Ok(None),
    };
    let generator: std::sync::Arc<dyn backend::Backend> =
        std::sync::Arc::new(backend::gemini::Backend::new(&backend::gemini::Config::new(api_key))?);
    Ok(Some(generator))
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::builder()
        .filter_module("civicaid", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let opts = Opts::parse();

    let config = match opts.config {
        Some(path) => toml::from_str::<Config>(std::str::from_utf8(&std::fs::read(path)?)?)?,
        None => Config::default(),
    };

    let generator = new_generator(&config, |name| std::env::var(name).ok())?;
    match generator.as_ref() {
        Some(generator) => log::info!("generator: {}", generator.name()),
        None => log::info!("no generator configured, running in demo mode"),
    }

    let app = server::router(std::sync::Arc::new(pipeline::Pipeline::new(generator)));
    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    log::info!("listening on {}", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("error waiting for ctrl-c: {:?}", e);
            }
        })
        .await?;

    Ok(())
}
