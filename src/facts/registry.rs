use std::io::Write;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cli::Config;
use crate::error::{FacterError, Result};
use crate::facts::FactValue;
use crate::formatter::Formatter;

/// Ordered view of every fact collected during one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    facts: IndexMap<String, FactValue>,
}

impl Snapshot {
    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&FactValue> {
        self.facts.get(key)
    }

    #[cfg(test)]
    pub fn contains_key(&self, key: &str) -> bool {
        self.facts.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Facts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FactValue)> {
        self.facts.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
impl FromIterator<(String, FactValue)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, FactValue)>>(iter: I) -> Self {
        Snapshot {
            facts: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Collecting,
    Printed,
}

/// The fact registry. Providers write into it with [`Facter::add`]; the
/// driver prints it once at the end of the run.
pub struct Facter {
    snapshot: Snapshot,
    formatter: Box<dyn Formatter>,
    state: State,
}

impl Facter {
    pub fn new(config: &Config) -> Self {
        Self::with_formatter(config.format.formatter())
    }

    pub fn with_formatter(formatter: Box<dyn Formatter>) -> Self {
        Facter {
            snapshot: Snapshot::default(),
            formatter,
            state: State::Collecting,
        }
    }

    /// Insert or overwrite a fact. An overwritten key keeps its original
    /// position. Ignored once the facts have been printed.
    pub fn add<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FactValue>,
    {
        let key = key.into();
        if self.state == State::Printed {
            warn!(fact = %key, "Ignoring fact added after printing");
            return;
        }
        let value = value.into();
        if let Some(previous) = self.snapshot.facts.insert(key.clone(), value) {
            debug!(fact = %key, previous = %previous, "Overwriting fact");
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&FactValue> {
        self.snapshot.get(key)
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Render the current snapshot without printing it.
    pub fn render(&self) -> Result<String> {
        self.formatter.render(&self.snapshot)
    }

    /// Render fully before writing so a formatting error never leaves
    /// partial output behind.
    pub fn print_to<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if self.state == State::Printed {
            return Err(FacterError::AlreadyPrinted);
        }
        let rendered = self.render()?;
        self.state = State::Printed;
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
