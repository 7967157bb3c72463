use std::str::FromStr;

use crate::error::ConfigError;
use crate::model::date_range::DateRange;

const CLOSED_ITEMS: &str = "Select [System.Id] From WorkItems Where [System.WorkItemType] IN ('Task', 'Bug') AND [State] <> 'Removed' AND [Microsoft.VSTS.Common.ClosedDate] >= '%START%' AND [Microsoft.VSTS.Common.ClosedDate] <= '%END%' AND [System.TeamProject] = '%TEAM%'";

const RESOLVED_ITEMS: &str = "Select [System.Id] From WorkItems Where [System.WorkItemType] IN ('Task', 'Bug') AND [State] <> 'Removed' AND [Microsoft.VSTS.Common.ResolvedDate] >= '%START%' AND [Microsoft.VSTS.Common.ResolvedDate] <= '%END%' AND [System.TeamProject] = '%TEAM%'";

const CLOSED_OR_RESOLVED_ITEMS: &str = "Select [System.Id] From WorkItems Where [System.WorkItemType] IN ('Task', 'Bug') AND [State] <> 'Removed' AND (([Microsoft.VSTS.Common.ClosedDate] >= '%START%' AND [Microsoft.VSTS.Common.ClosedDate] <= '%END%') OR ([Microsoft.VSTS.Common.ResolvedDate] >= '%START%' AND [Microsoft.VSTS.Common.ResolvedDate] <= '%END%')) AND [System.TeamProject] = '%TEAM%'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// A closed-date query followed by a resolved-date query.
    #[default]
    Split,
    /// One query matching either date.
    Combined,
}

impl QueryMode {
    pub fn templates(self) -> &'static [&'static str] {
        match self {
            QueryMode::Split => &[CLOSED_ITEMS, RESOLVED_ITEMS],
            QueryMode::Combined => &[CLOSED_OR_RESOLVED_ITEMS],
        }
    }
}

impl FromStr for QueryMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "split" => Ok(QueryMode::Split),
            "combined" => Ok(QueryMode::Combined),
            other => Err(ConfigError::InvalidQueryMode(other.to_string())),
        }
    }
}

/// Fill every placeholder of a WIQL template.
pub fn render(template: &str, range: &DateRange, project: &str) -> String {
    // WIQL string literals escape a quote by doubling it.
    let project = project.replace('\'', "''");
    template
        .replace("%START%", &range.start_text())
        .replace("%END%", &range.end_text())
        .replace("%TEAM%", &project)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> DateRange {
        DateRange::parse("01/01/2020", "01/31/2020").unwrap()
    }

    #[test]
    fn renders_closed_query() {
        let query = render(CLOSED_ITEMS, &range(), "Payments");
        assert!(query.contains("[Microsoft.VSTS.Common.ClosedDate] >= '01/01/2020'"));
        assert!(query.contains("[Microsoft.VSTS.Common.ClosedDate] <= '01/31/2020'"));
        assert!(query.contains("[System.TeamProject] = 'Payments'"));
        assert!(!query.contains('%'));
    }

    #[test]
    fn combined_query_replaces_every_occurrence() {
        let query = render(CLOSED_OR_RESOLVED_ITEMS, &range(), "Payments");
        assert_eq!(query.matches("01/01/2020").count(), 2);
        assert_eq!(query.matches("01/31/2020").count(), 2);
        assert!(!query.contains("%START%"));
    }

    #[test]
    fn project_quotes_are_escaped() {
        let query = render(RESOLVED_ITEMS, &range(), "Bob's Team");
        assert!(query.contains("[System.TeamProject] = 'Bob''s Team'"));
    }

    #[test]
    fn mode_templates() {
        assert_eq!(QueryMode::Split.templates().len(), 2);
        assert_eq!(QueryMode::Combined.templates().len(), 1);
        assert_eq!("Combined".parse::<QueryMode>().unwrap(), QueryMode::Combined);
        assert!("weekly".parse::<QueryMode>().is_err());
    }
}
