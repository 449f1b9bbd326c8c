//! Drover CLI application.
//!
//! Loads the settings and step list, wires the chat client and page surface
//! for the selected mode, runs the step loop and persists the outcome: the
//! run log gains one record, the steps file is rewritten with fingerprints
//! filled in, and a fatal run maps to a non-zero exit.

mod args;
mod driver;

use std::sync::Arc;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use drover_core::{
    ChatClient, CodeCache, MockChatClient, OpenAiClient, PageSurface, ReduceRule, RuleSet,
    RunPolicy, RunRecorder, ScriptedSurface, Settings, StepRunnerBuilder, StepsFile,
};
use driver::DriverBridge;
use log::info;

/// Markup served by the scripted surface in `--mock` mode.
const MOCK_PAGE: &str = concat!(
    "<body><form id=\"login\">",
    "<input id=\"username\" type=\"text\">",
    "<input id=\"password\" type=\"password\">",
    "<button id=\"btnLogin\">Login</button>",
    "</form></body>"
);

/// Environment variable carrying the API key for the model endpoint.
const API_KEY_VAR: &str = "DROVER_API_KEY";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let policy = if args.nocache {
        RunPolicy::new(args.strength).without_cache()
    } else {
        RunPolicy::new(args.strength)
    };
    policy.validate().context("Invalid option combination")?;

    let settings_path = args.settings_path();
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;

    let rules = if args.strip.is_empty() {
        RuleSet::new(ReduceRule::all(), args.keep.clone())
    } else {
        RuleSet::new(args.strip.clone(), args.keep.clone())
    };

    // Relative paths in a pack's settings stay inside the pack directory.
    let base_dir = args.base_dir();
    let steps_path = base_dir.join(&settings.execution.steps_file);
    let mut steps = StepsFile::load(&steps_path)
        .with_context(|| format!("Failed to load steps from {}", steps_path.display()))?
        .into_steps(policy.max_attempts());
    if steps.is_empty() {
        anyhow::bail!("The steps file contains no steps");
    }

    let output_dir = base_dir.join(&settings.execution.output_dir);
    let cache = CodeCache::new(&output_dir).context("Failed to open the code cache")?;
    let recorder = RunRecorder::new(output_dir.join("run-log.json"));

    let client: Arc<dyn ChatClient> = if args.mock {
        match &settings.hc_code {
            Some(code) => Arc::new(MockChatClient::with_code(code.clone())),
            None => Arc::new(MockChatClient::new()),
        }
    } else {
        let api_key = std::env::var(API_KEY_VAR)
            .with_context(|| format!("{API_KEY_VAR} is not set"))?;
        Arc::new(OpenAiClient::new(
            &settings.ai_agent.endpoint,
            api_key,
            &settings.ai_agent.model,
        ))
    };

    // The driver bridge must outlive the run so it can be shut down cleanly.
    let mut bridge = None;
    let surface: Arc<dyn PageSurface> = if args.mock {
        Arc::new(ScriptedSurface::new(
            settings.execution.entrypoint_url.clone(),
            MOCK_PAGE,
        ))
    } else {
        let cmd = settings.execution.driver_cmd.as_deref().with_context(|| {
            "execution.driver_cmd must be set unless running with --mock"
        })?;
        let launched = Arc::new(
            DriverBridge::launch(
                cmd,
                &settings.execution.entrypoint_url,
                settings.execution.headless,
            )
            .await
            .context("Failed to launch the browser driver")?,
        );
        bridge = Some(Arc::clone(&launched));
        launched
    };

    let runner = StepRunnerBuilder::new()
        .with_surface(surface)
        .with_client(client)
        .with_cache(cache)
        .with_policy(policy)
        .with_rules(rules)
        .with_cost_rates(settings.ai_agent.cost_rates())
        .build()
        .context("Failed to configure the run")?;

    info!(
        "starting run: {} steps, strength {}, cache {}",
        steps.len(),
        policy.strength.as_str(),
        if policy.cache_enabled { "on" } else { "off" }
    );

    let record = runner.run(&mut steps).await?;

    // The runner holds the surface; release it so the bridge can be
    // reclaimed and shut down.
    drop(runner);
    if let Some(bridge) = bridge.and_then(Arc::into_inner) {
        bridge.shutdown().await;
    }

    for result in &record.results {
        println!("{result}");
    }

    println!("\n# Steps");
    for step in &steps {
        println!("- {}: {}", step.sub_prompt, step.state().with_icon());
    }

    println!("\n{}", record.usage);

    recorder
        .append(&record)
        .context("Failed to append the run log")?;
    StepsFile::from_steps(&steps)
        .save(&steps_path)
        .with_context(|| format!("Failed to rewrite {}", steps_path.display()))?;

    if record.is_fatal() {
        let reason = record
            .results
            .iter()
            .rev()
            .find(|result| result.critical)
            .and_then(|result| result.error.clone())
            .unwrap_or_else(|| "run aborted".to_string());
        anyhow::bail!("Run aborted: {reason}");
    }

    Ok(())
}
