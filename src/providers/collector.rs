use std::io::{self, Write};

use tracing::{debug, warn};

use crate::cli::Config;
use crate::error::{FacterError, Result};
use crate::facts::Facter;
use crate::providers;

/// A named fact-gathering function writing into the registry.
#[derive(Clone, Copy)]
pub struct Provider {
    pub name: &'static str,
    pub collect: fn(&mut Facter, &Config) -> Result<()>,
}

impl Provider {
    pub fn new(name: &'static str, collect: fn(&mut Facter, &Config) -> Result<()>) -> Self {
        Provider { name, collect }
    }
}

#[derive(Debug)]
pub struct ProviderOutcome {
    pub provider: &'static str,
    pub error: Option<FacterError>,
}

/// What happened to every provider during one run, in invocation order.
#[derive(Debug, Default)]
pub struct CollectionReport {
    pub outcomes: Vec<ProviderOutcome>,
}

impl CollectionReport {
    pub fn failed(&self) -> Vec<&'static str> {
        self.outcomes
            .iter()
            .filter(|o| o.error.is_some())
            .map(|o| o.provider)
            .collect()
    }

    #[cfg(test)]
    pub fn succeeded(&self) -> Vec<&'static str> {
        self.outcomes
            .iter()
            .filter(|o| o.error.is_none())
            .map(|o| o.provider)
            .collect()
    }
}

/// Fixed provider order; the listener provider only when enabled.
pub fn default_providers(config: &Config) -> Vec<Provider> {
    let mut list = vec![
        Provider::new("host", providers::collect_host_facts),
        Provider::new("cpu", providers::collect_cpu_facts),
        Provider::new("disk", providers::collect_disk_facts),
        Provider::new("memory", providers::collect_memory_facts),
        Provider::new("network", providers::collect_network_facts),
    ];
    if config.listeners {
        list.push(Provider::new("listeners", providers::collect_listener_facts));
    }
    list
}

/// Run every provider in order. Failures are recorded and collection goes
/// on; only a fatal environment error stops the run.
pub fn run_providers(
    facter: &mut Facter,
    config: &Config,
    providers: &[Provider],
) -> Result<CollectionReport> {
    let mut report = CollectionReport::default();

    for provider in providers {
        let before = facter.len();
        match (provider.collect)(facter, config) {
            Ok(()) => {
                debug!(provider = provider.name, facts = facter.len() - before, "Provider finished");
                report.outcomes.push(ProviderOutcome {
                    provider: provider.name,
                    error: None,
                });
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(provider = provider.name, error = %e, "Provider failed, continuing");
                report.outcomes.push(ProviderOutcome {
                    provider: provider.name,
                    error: Some(e),
                });
            }
        }
    }

    Ok(report)
}

/// Collect every enabled provider and print the snapshot once to stdout.
pub fn collect_and_print(config: &Config) -> Result<CollectionReport> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    collect_and_print_to(config, &default_providers(config), &mut handle)
}

/// Nothing reaches `out` when a provider hits a fatal error.
pub fn collect_and_print_to<W: Write>(
    config: &Config,
    providers: &[Provider],
    out: &mut W,
) -> Result<CollectionReport> {
    let mut facter = Facter::new(config);
    let report = run_providers(&mut facter, config, providers)?;
    facter.print_to(out)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::FactValue;
    use crate::formatter::OutputFormat;

    fn inserts_then_fails(facter: &mut Facter, _config: &Config) -> Result<()> {
        facter.add("a", 1);
        facter.add("b", "two");
        Err(FacterError::Provider("lost the rest".to_string()))
    }

    fn overwrites_a(facter: &mut Facter, _config: &Config) -> Result<()> {
        facter.add("a", 10);
        Ok(())
    }

    fn fatal(_facter: &mut Facter, _config: &Config) -> Result<()> {
        Err(FacterError::FatalEnvironment("no user".to_string()))
    }

    fn never_reached(facter: &mut Facter, _config: &Config) -> Result<()> {
        facter.add("unreachable", true);
        Ok(())
    }

    fn fake_listeners(facter: &mut Facter, _config: &Config) -> Result<()> {
        facter.add("listeners", "");
        Ok(())
    }

    #[test]
    fn test_partial_failure_keeps_inserted_facts() {
        let config = Config::default();
        let mut facter = Facter::new(&config);
        let providers = [Provider::new("flaky", inserts_then_fails)];

        let report = run_providers(&mut facter, &config, &providers).unwrap();

        assert_eq!(report.failed(), vec!["flaky"]);
        assert_eq!(facter.get("a"), Some(&FactValue::Integer(1)));
        assert_eq!(facter.get("b"), Some(&FactValue::from("two")));
        assert!(facter.get("c").is_none());
        assert!(facter.print_to(&mut Vec::new()).is_ok());
    }

    #[test]
    fn test_failure_does_not_stop_later_providers() {
        let config = Config::default();
        let mut facter = Facter::new(&config);
        let providers = [
            Provider::new("flaky", inserts_then_fails),
            Provider::new("second", overwrites_a),
        ];

        let report = run_providers(&mut facter, &config, &providers).unwrap();

        assert_eq!(report.failed(), vec!["flaky"]);
        assert_eq!(report.succeeded(), vec!["second"]);
        assert_eq!(facter.get("a"), Some(&FactValue::Integer(10)));
    }

    #[test]
    fn test_fatal_error_aborts() {
        let config = Config::default();
        let mut facter = Facter::new(&config);
        let providers = [
            Provider::new("host", fatal),
            Provider::new("after", never_reached),
        ];

        let err = run_providers(&mut facter, &config, &providers).unwrap_err();

        assert!(err.is_fatal());
        assert!(facter.get("unreachable").is_none());
    }

    #[test]
    fn test_fatal_error_prints_nothing() {
        let config = Config::default();
        let providers = [
            Provider::new("flaky", inserts_then_fails),
            Provider::new("host", fatal),
        ];
        let mut out = Vec::new();

        let err = collect_and_print_to(&config, &providers, &mut out).unwrap_err();

        assert!(out.is_empty());
        assert_eq!(crate::output::exit_code(&err), 2);
    }

    #[test]
    fn test_partial_run_still_prints() {
        let config = Config {
            format: OutputFormat::KeyValue,
            ..Config::default()
        };
        let providers = [
            Provider::new("flaky", inserts_then_fails),
            Provider::new("second", overwrites_a),
        ];
        let mut out = Vec::new();

        let report = collect_and_print_to(&config, &providers, &mut out).unwrap();

        assert_eq!(report.failed(), vec!["flaky"]);
        assert_eq!(String::from_utf8(out).unwrap(), "a:10\nb:two\n");
    }

    #[test]
    fn test_default_provider_order() {
        let names: Vec<&str> = default_providers(&Config::default())
            .iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["host", "cpu", "disk", "memory", "network"]);
    }

    #[test]
    fn test_listener_provider_gated_by_flag() {
        let config = Config {
            listeners: true,
            ..Config::default()
        };
        let names: Vec<&str> = default_providers(&config).iter().map(|p| p.name).collect();
        assert_eq!(names.last(), Some(&"listeners"));
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_listeners_key_only_when_enabled() {
        let run = |listeners: bool| {
            let config = Config {
                listeners,
                format: OutputFormat::Json,
                ..Config::default()
            };
            let mut facter = Facter::new(&config);
            let mut providers = vec![Provider::new("second", overwrites_a)];
            if config.listeners {
                providers.push(Provider::new("listeners", fake_listeners));
            }
            run_providers(&mut facter, &config, &providers).unwrap();
            facter.snapshot().contains_key("listeners")
        };

        assert!(!run(false));
        assert!(run(true));
    }

    #[test]
    fn test_json_selection_renders_valid_json() {
        let config = Config {
            format: OutputFormat::Json,
            ..Config::default()
        };
        let mut facter = Facter::new(&config);
        run_providers(&mut facter, &config, &[Provider::new("flaky", inserts_then_fails)]).unwrap();

        let mut out = Vec::new();
        facter.print_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with('{'));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["a"], 1);
    }
}
