//! Config loading: the TOML file, `-o path=value` overrides, then
//! deserialization into [`Config`].

use std::{fs, path::Path};

use tessel_config::Config;
use toml::value::Table;

use crate::{args::Args, errors::*};

pub(crate) fn load_config(args: &Args) -> Result<Config, InitError> {
    let mut config_toml = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => toml::Value::Table(Table::new()),
    };

    let overrides = args
        .get_all_overrides()?
        .iter()
        .map(|o| parse_override(o))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let table = config_toml
        .as_table_mut()
        .ok_or_else(|| ConfigError::TraverseNonTableAt {
            key: "<root>".to_owned(),
            path: String::new(),
        })?;
    for (path, val) in overrides {
        apply_override(&path, val, table)?;
    }

    Ok(config_toml.try_into::<Config>()?)
}

fn load_config_from_path(path: &Path) -> Result<toml::Value, InitError> {
    let config_str = fs::read_to_string(path)?;
    Ok(toml::from_str(&config_str)?)
}

/// Splits `a.b.c=value` into its key path and value.  The value is read as a
/// TOML literal when it is one and as a bare string otherwise.
pub(crate) fn parse_override(s: &str) -> Result<(String, toml::Value), ConfigError> {
    let (path, raw) = s
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(s.to_owned()))?;
    let path = path.trim();
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(ConfigError::InvalidOverride(s.to_owned()));
    }

    let raw = raw.trim();
    let value = toml::from_str::<Table>(&format!("v = {raw}"))
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| toml::Value::String(raw.to_owned()));
    Ok((path.to_owned(), value))
}

/// Sets the value at a dotted path, creating missing intermediate tables.
pub(crate) fn apply_override(
    path: &str,
    value: toml::Value,
    table: &mut Table,
) -> Result<(), ConfigError> {
    match path.split_once('.') {
        None => {
            table.insert(path.to_owned(), value);
            Ok(())
        }
        Some((key, rest)) => {
            let entry = table
                .entry(key.to_owned())
                .or_insert_with(|| toml::Value::Table(Table::new()));
            let inner = entry
                .as_table_mut()
                .ok_or_else(|| ConfigError::TraverseNonTableAt {
                    key: key.to_owned(),
                    path: path.to_owned(),
                })?;
            apply_override(rest, value, inner)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        let (path, val) = parse_override("ante.tx_sig_limit=3").unwrap();
        assert_eq!(path, "ante.tx_sig_limit");
        assert_eq!(val, toml::Value::Integer(3));

        let (_, val) = parse_override("app.chain_id=dev-9").unwrap();
        assert_eq!(val, toml::Value::String("dev-9".to_owned()));

        let (_, val) = parse_override(r#"store.datadir="/a b""#).unwrap();
        assert_eq!(val, toml::Value::String("/a b".to_owned()));

        assert!(parse_override("no-equals").is_err());
        assert!(parse_override("a..b=1").is_err());
    }

    #[test]
    fn test_apply_override() {
        let mut root: Table = toml::from_str("[app]\nchain_id = \"x\"\n").unwrap();
        apply_override("app.chain_id", toml::Value::String("y".into()), &mut root).unwrap();
        apply_override("logging.json_format", toml::Value::Boolean(true), &mut root).unwrap();

        let cfg = toml::Value::Table(root.clone()).try_into::<Config>().unwrap();
        assert_eq!(cfg.app.chain_id, "y");
        assert_eq!(cfg.logging.json_format, Some(true));

        assert!(matches!(
            apply_override("app.chain_id.deeper", toml::Value::Integer(1), &mut root),
            Err(ConfigError::TraverseNonTableAt { .. })
        ));
    }
}
