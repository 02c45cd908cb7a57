//! robots.txt parsing and matching (RFC 9309).

/// Allow/Disallow rules that apply to one user agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRules {
    allow: Vec<String>,
    disallow: Vec<String>,
}

#[derive(Default)]
struct Group {
    agents: Vec<String>,
    allow: Vec<String>,
    disallow: Vec<String>,
}

impl RobotsRules {
    /// No restrictions.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parse a robots.txt body, keeping the groups for `product` or, when
    /// none name it, the `*` groups.
    pub fn parse(text: &str, product: &str) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        let mut in_agent_lines = false;

        for line in text.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !in_agent_lines {
                        groups.push(Group::default());
                        in_agent_lines = true;
                    }
                    if let Some(group) = groups.last_mut() {
                        group.agents.push(value.to_ascii_lowercase());
                    }
                }
                "allow" | "disallow" => {
                    in_agent_lines = false;
                    let Some(group) = groups.last_mut() else {
                        continue;
                    };
                    if value.is_empty() {
                        continue;
                    }
                    if key == "allow" {
                        group.allow.push(value.to_string());
                    } else {
                        group.disallow.push(value.to_string());
                    }
                }
                _ => in_agent_lines = false,
            }
        }

        let product = product.to_ascii_lowercase();
        let named: Vec<&Group> = groups
            .iter()
            .filter(|g| g.agents.iter().any(|a| *a == product))
            .collect();
        let selected = if named.is_empty() {
            groups
                .iter()
                .filter(|g| g.agents.iter().any(|a| a == "*"))
                .collect()
        } else {
            named
        };

        let mut rules = Self::default();
        for group in selected {
            rules.allow.extend(group.allow.iter().cloned());
            rules.disallow.extend(group.disallow.iter().cloned());
        }
        rules
    }

    /// Longest matching rule wins; Allow wins a tie.
    pub fn is_allowed(&self, path: &str) -> bool {
        let longest = |patterns: &[String]| {
            patterns
                .iter()
                .filter(|p| pattern_matches(p, path))
                .map(|p| p.len())
                .max()
        };

        match (longest(&self.allow), longest(&self.disallow)) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(allow), Some(disallow)) => allow >= disallow,
        }
    }
}

/// Prefix match with `*` wildcards and a `$` end anchor.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let (pattern, anchored) = match pattern.strip_suffix('$') {
        Some(p) => (p, true),
        None => (pattern, false),
    };
    let parts: Vec<&str> = pattern.split('*').collect();

    let first = parts[0];
    if !path.starts_with(first) {
        return false;
    }
    let mut pos = first.len();

    for (i, part) in parts.iter().enumerate().skip(1) {
        if anchored && i == parts.len() - 1 {
            return path.len() - pos >= part.len() && path.ends_with(part);
        }
        match path[pos..].find(part) {
            Some(idx) => pos += idx + part.len(),
            None => return false,
        }
    }

    !anchored || pos == path.len()
}
