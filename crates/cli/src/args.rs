//! `--flag value` parsing for subcommands.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use pipeline::Seed;

/// Flags that take no value.
const SWITCHES: &[&str] = &["json", "case-sensitive", "whole-word", "disabled"];

#[derive(Debug, Default)]
pub struct Flags {
    values: HashMap<String, Vec<String>>,
    switches: Vec<String>,
}

impl Flags {
    pub fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut flags = Flags::default();
        let mut it = args.into_iter();
        while let Some(arg) = it.next() {
            let Some(name) = arg.strip_prefix("--") else {
                bail!("unexpected argument '{arg}'");
            };
            if SWITCHES.contains(&name) {
                flags.switches.push(name.to_string());
                continue;
            }
            let value = it.next().ok_or_else(|| anyhow!("--{name} needs a value"))?;
            flags.values.entry(name.to_string()).or_default().push(value);
        }
        Ok(flags)
    }

    pub fn switch(&self, name: &str) -> bool {
        self.switches.iter().any(|s| s == name)
    }

    /// Last value given for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.last()).map(String::as_str)
    }

    /// Every value given for a repeatable flag, in order.
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.values
            .get(name)
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn require(&self, name: &str) -> anyhow::Result<&str> {
        self.get(name).ok_or_else(|| anyhow!("missing --{name}"))
    }

    pub fn parsed<T>(&self, name: &str) -> anyhow::Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.get(name)
            .map(|v| v.parse::<T>().with_context(|| format!("invalid --{name} '{v}'")))
            .transpose()
    }

    pub fn seed(&self) -> anyhow::Result<Seed> {
        Ok(Seed::new(self.parsed::<u64>("seed")?.unwrap_or(0)))
    }

    /// `-1` (or no flag) asks for an entropy-seeded generator.
    pub fn optional_seed(&self) -> anyhow::Result<Option<Seed>> {
        match self.parsed::<i64>("seed")? {
            None | Some(-1) => Ok(None),
            Some(v) => u64::try_from(v)
                .map(|v| Some(Seed::new(v)))
                .map_err(|_| anyhow!("invalid --seed '{v}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(args: &[&str]) -> anyhow::Result<Flags> {
        Flags::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn collects_values_and_switches() {
        let f = flags(&["--prompt", "a", "--json", "--prompt", "b", "--mode", "random"]).unwrap();
        assert_eq!(f.all("prompt"), vec!["a", "b"]);
        assert_eq!(f.get("prompt"), Some("b"));
        assert_eq!(f.require("mode").unwrap(), "random");
        assert!(f.switch("json"));
        assert!(!f.switch("whole-word"));
        assert!(f.require("file").is_err());
    }

    #[test]
    fn rejects_bare_words_and_missing_values() {
        assert!(flags(&["file.txt"]).is_err());
        assert!(flags(&["--file"]).is_err());
    }

    #[test]
    fn seeds() {
        assert_eq!(flags(&[]).unwrap().seed().unwrap(), Seed::new(0));
        assert_eq!(flags(&["--seed", "7"]).unwrap().seed().unwrap(), Seed::new(7));
        assert!(flags(&["--seed", "x"]).unwrap().seed().is_err());

        assert_eq!(flags(&["--seed", "-1"]).unwrap().optional_seed().unwrap(), None);
        assert_eq!(flags(&[]).unwrap().optional_seed().unwrap(), None);
        assert_eq!(
            flags(&["--seed", "42"]).unwrap().optional_seed().unwrap(),
            Some(Seed::new(42))
        );
        assert!(flags(&["--seed", "-5"]).unwrap().optional_seed().is_err());
    }
}
