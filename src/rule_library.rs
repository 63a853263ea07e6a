//! Rule library loader (§6 collaborator) and "GA dimension" set loader.
//!
//! `spec.md` leaves the on-disk rule format unspecified; this repo loads
//! YAML, one rule per file, the way `ob-templates::TemplateDefinition`
//! loads its workflow templates.

use std::collections::HashSet;
use std::path::Path;

use dashboard_types::Rule;

use crate::error::DashboardError;

/// Yields the rule library's rules (§6). Implementations other than
/// `YamlRuleLibrary` (e.g. a database-backed one) only need to satisfy
/// this trait; the orchestrator doesn't care how rules got loaded.
pub trait RuleLibrary {
    fn rules(&self) -> Result<Vec<Rule>, DashboardError>;
}

/// Loads every `*.yaml`/`*.yml` file in a directory as one `Rule` each.
pub struct YamlRuleLibrary {
    dir: std::path::PathBuf,
}

impl YamlRuleLibrary {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl RuleLibrary for YamlRuleLibrary {
    fn rules(&self) -> Result<Vec<Rule>, DashboardError> {
        let mut rules = Vec::new();
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| DashboardError::RuleLibrary(format!("{}: {e}", self.dir.display())))?;

        for entry in entries {
            let entry = entry.map_err(|e| DashboardError::RuleLibrary(e.to_string()))?;
            let path = entry.path();
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
                .unwrap_or(false);
            if !is_yaml {
                continue;
            }

            let contents = std::fs::read_to_string(&path)
                .map_err(|e| DashboardError::RuleLibrary(format!("{}: {e}", path.display())))?;
            let rule: Rule = serde_yaml::from_str(&contents)
                .map_err(|e| DashboardError::RuleLibrary(format!("{}: {e}", path.display())))?;
            rules.push(rule);
        }

        Ok(rules)
    }
}

/// An in-memory rule library for tests and the CLI's demo mode.
pub struct StaticRuleLibrary(pub Vec<Rule>);

impl RuleLibrary for StaticRuleLibrary {
    fn rules(&self) -> Result<Vec<Rule>, DashboardError> {
        Ok(self.0.clone())
    }
}

/// Loads the "GA dimension" literal set (§6) from a flat YAML list of
/// field-spec strings.
pub fn load_ga_dimensions(path: impl AsRef<Path>) -> Result<HashSet<String>, DashboardError> {
    let contents = std::fs::read_to_string(path.as_ref())
        .map_err(|e| DashboardError::RuleLibrary(format!("{}: {e}", path.as_ref().display())))?;
    serde_yaml::from_str(&contents)
        .map_err(|e| DashboardError::RuleLibrary(format!("{}: {e}", path.as_ref().display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_one_rule_per_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generic.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
table_type: Generic
max_score: 100
dimensions:
  - - D1
    - field_type: Number
      score: 100
cards: []
"#
        )
        .unwrap();

        let library = YamlRuleLibrary::new(dir.path());
        let rules = library.rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].table_type, "Generic");
    }
}
