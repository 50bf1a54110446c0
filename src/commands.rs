use std::io::Write as _;

use anyhow::Context as _;
use serde::Serialize;

use crate::cli::{ConnectionArgs, IndexArgs, OpenArgs, OutputFormat, ResolveArgs, StepArgs};
use crate::config::JourneyConfig;
use crate::formats::JourneyContent;
use crate::journey::JourneyService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Environment first, then command-line overrides.
pub fn load_config(args: &ConnectionArgs) -> anyhow::Result<JourneyConfig> {
    let mut config = JourneyConfig::from_env().context("load config from environment")?;
    if let Some(host) = &args.docs_host {
        config.set_docs_host(host).context("--docs-host")?;
    }
    if let Some(prefix) = &args.journey_prefix {
        config.journey_path_prefix = prefix.clone();
    }
    if let Some(secs) = args.timeout_secs {
        config.set_timeout_secs(secs).context("--timeout-secs")?;
    }
    Ok(config)
}

pub async fn open(connection: &ConnectionArgs, args: OpenArgs) -> anyhow::Result<()> {
    let config = load_config(connection)?;
    let service = JourneyService::from_config(&config)?;
    let content = service.open(&args.url, args.title.as_deref()).await?;
    print_content(&content, args.format)
}

pub async fn step(
    connection: &ConnectionArgs,
    args: StepArgs,
    direction: Direction,
) -> anyhow::Result<()> {
    let config = load_config(connection)?;
    let service = JourneyService::from_config(&config)?;
    let current = service.open(&args.url, None).await?;

    let target = match direction {
        Direction::Next => service.next_url(&current),
        Direction::Previous => service.previous_url(&current),
    };
    let Some(target) = target else {
        anyhow::bail!(
            "no {} milestone from {} (milestone {} of {})",
            match direction {
                Direction::Next => "next",
                Direction::Previous => "previous",
            },
            args.url,
            current.current_ordinal,
            current.total_milestones
        );
    };

    let content = service.open(target, None).await?;
    print_content(&content, args.format)
}

pub async fn index(connection: &ConnectionArgs, args: IndexArgs) -> anyhow::Result<()> {
    let config = load_config(connection)?;
    let service = JourneyService::from_config(&config)?;
    let milestones = service.load_index(&args.base_url).await?;
    print_json(&milestones)
}

#[derive(Debug, Serialize)]
struct ResolveReport<'a> {
    base_url: String,
    primary: &'a str,
    variants: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    fragment: Option<&'a str>,
}

pub fn resolve(connection: &ConnectionArgs, args: ResolveArgs) -> anyhow::Result<()> {
    let config = load_config(connection)?;
    let resolver = crate::resolve::UrlResolver::new(&config);
    let resolved = resolver.resolve(&args.url);
    print_json(&ResolveReport {
        base_url: resolver.base_url_of(&args.url),
        primary: &resolved.primary,
        variants: &resolved.variants,
        fragment: resolved.fragment.as_deref(),
    })
}

fn print_content(content: &JourneyContent, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(content),
        OutputFormat::Html => {
            tracing::info!(title = %content.title, ordinal = content.current_ordinal, "rendering page");
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", content.body.to_html()).context("write stdout")?;
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").context("write stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = load_config(&ConnectionArgs {
            docs_host: Some("http://127.0.0.1:8080".to_owned()),
            journey_prefix: Some("/learn/".to_owned()),
            timeout_secs: Some(3),
        })
        .unwrap();
        assert_eq!(config.docs_host.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(config.journey_path_prefix, "/learn/");
        assert_eq!(config.request_timeout.as_secs(), 3);
    }

    #[test]
    fn rejects_zero_timeout_flag() {
        let err = load_config(&ConnectionArgs {
            docs_host: None,
            journey_prefix: None,
            timeout_secs: Some(0),
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("--timeout-secs"));
    }
}
