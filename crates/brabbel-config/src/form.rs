use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use anyhow::Context as _;
use brabbel::{Context, Expr, Lookup, Phase, Rule, Severity, Value};
use serde::Deserialize;

use crate::logging::LoggingConfig;
use crate::report::ValidationReport;

// ---------------------------------------------------------------------------
// Raw TOML structure (intermediate representation)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FormConfigRaw {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    field: Vec<FieldRaw>,
    #[serde(default)]
    group: Vec<GroupRaw>,
}

#[derive(Debug, Deserialize)]
struct GroupRaw {
    name: String,
    when: String,
    /// Enclosing group; its conditional must hold too.
    within: Option<String>,
    #[serde(default)]
    fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FieldRaw {
    name: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    desired: bool,
    /// Visibility conditional.
    when: Option<String>,
    /// Literal default, or an expression when the string starts with `%`.
    default: Option<Value>,
    #[serde(default)]
    rule: Vec<RuleRaw>,
}

#[derive(Debug, Deserialize)]
struct RuleRaw {
    expr: String,
    msg: Option<String>,
    #[serde(default)]
    mode: Phase,
    #[serde(default)]
    triggers: Severity,
}

// ---------------------------------------------------------------------------
// FormConfig (compiled)
// ---------------------------------------------------------------------------

/// A loaded rules file: logging settings plus the compiled form rules.
#[derive(Debug)]
pub struct FormConfig {
    pub logging: LoggingConfig,
    pub form: FormRules,
}

impl FormConfig {
    /// Read and compile a rules file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        content
            .parse()
            .with_context(|| format!("invalid rules file {}", path.display()))
    }

    /// Compile a rules document, passing the messages of implicit
    /// required/desired rules through `translate`.
    pub fn parse_with(toml_str: &str, translate: &dyn Fn(&str) -> String) -> anyhow::Result<Self> {
        let raw: FormConfigRaw = toml::from_str(toml_str)?;

        let mut inherited = resolve_groups(raw.group)?;
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(raw.field.len());
        for field in raw.field {
            if !seen.insert(field.name.clone()) {
                anyhow::bail!("duplicate field '{}'", field.name);
            }
            let conditions = inherited.remove(&field.name).unwrap_or_default();
            fields.push(FieldRules::compile(field, conditions, translate)?);
        }
        if let Some(name) = inherited.keys().next() {
            anyhow::bail!("group lists unknown field '{name}'");
        }

        let form = FormRules { fields };
        tracing::debug!(
            domain = "conf",
            fields = form.fields.len(),
            rules = form.rule_count(),
            "rules file compiled"
        );
        Ok(Self {
            logging: raw.logging,
            form,
        })
    }
}

impl FromStr for FormConfig {
    type Err = anyhow::Error;

    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        Self::parse_with(toml_str, &|msg: &str| msg.to_string())
    }
}

// ---------------------------------------------------------------------------
// Conditional groups
// ---------------------------------------------------------------------------

/// Compile the groups and return, per member field, the conditionals it
/// inherits: outermost group first.
fn resolve_groups(groups: Vec<GroupRaw>) -> anyhow::Result<HashMap<String, Vec<Rule>>> {
    let mut index = HashMap::with_capacity(groups.len());
    let mut compiled = Vec::with_capacity(groups.len());
    for group in &groups {
        if index.insert(group.name.as_str(), compiled.len()).is_some() {
            anyhow::bail!("duplicate group '{}'", group.name);
        }
        compiled.push(
            Rule::new(&group.when)
                .with_context(|| format!("group '{}': conditional {:?}", group.name, group.when))?,
        );
    }

    let mut inherited = HashMap::new();
    for group in &groups {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(group);
        while let Some(g) = current {
            if !visited.insert(g.name.as_str()) {
                anyhow::bail!("group '{}' is nested within itself", group.name);
            }
            chain.push(compiled[index[g.name.as_str()]].clone());
            current = match &g.within {
                Some(parent) => {
                    let &i = index.get(parent.as_str()).ok_or_else(|| {
                        anyhow::anyhow!("group '{}': unknown parent group '{parent}'", g.name)
                    })?;
                    Some(&groups[i])
                }
                None => None,
            };
        }
        chain.reverse();

        for field in &group.fields {
            if inherited.insert(field.clone(), chain.clone()).is_some() {
                anyhow::bail!("field '{field}' is listed in more than one group");
            }
        }
    }
    Ok(inherited)
}

// ---------------------------------------------------------------------------
// FieldRules
// ---------------------------------------------------------------------------

/// Value a field starts with when nothing was submitted for it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDefault {
    Literal(Value),
    /// `%expr`, evaluated against the submitted values.
    Computed { source: String, expr: Expr },
}

impl FieldDefault {
    fn compile(value: Value) -> Result<Self, brabbel::ParseError> {
        match value.as_str().and_then(|s| s.strip_prefix('%')) {
            Some(source) => Ok(Self::Computed {
                source: source.to_string(),
                expr: brabbel::parse(source)?,
            }),
            None => Ok(Self::Literal(value)),
        }
    }

    /// The default for `ctx`; `None` when the expression cannot be evaluated.
    pub fn resolve(&self, field: &str, ctx: &dyn Lookup) -> Option<Value> {
        match self {
            Self::Literal(value) => Some(value.clone()),
            Self::Computed { source, expr } => match brabbel::evaluate_value(expr, ctx) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(
                        domain = "conf",
                        field,
                        expr = %source,
                        error = %e,
                        "default value skipped"
                    );
                    None
                }
            },
        }
    }
}

/// The rules attached to one field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub name: String,
    /// Visibility conditionals, all of which must hold: enclosing groups
    /// outermost first, then the field's own. Empty means always visible.
    pub conditions: Vec<Rule>,
    pub default: Option<FieldDefault>,
    /// Implicit required/desired rules first, then the explicit ones in
    /// document order.
    pub rules: Vec<Rule>,
}

impl FieldRules {
    fn compile(
        raw: FieldRaw,
        mut conditions: Vec<Rule>,
        translate: &dyn Fn(&str) -> String,
    ) -> anyhow::Result<Self> {
        let name = raw.name;
        let mut rules = Vec::with_capacity(raw.rule.len() + 2);
        if raw.required {
            rules.push(
                Rule::required(&name, translate)
                    .with_context(|| format!("field '{name}': invalid field name"))?,
            );
        }
        if raw.desired {
            rules.push(
                Rule::desired(&name, translate)
                    .with_context(|| format!("field '{name}': invalid field name"))?,
            );
        }
        for r in raw.rule {
            let mut rule = Rule::new(&r.expr)
                .with_context(|| format!("field '{name}': rule {:?}", r.expr))?
                .with_phase(r.mode)
                .with_severity(r.triggers);
            if let Some(msg) = r.msg {
                rule = rule.with_message(msg);
            }
            rules.push(rule);
        }
        if let Some(expr) = raw.when {
            conditions.push(
                Rule::new(&expr)
                    .with_context(|| format!("field '{name}': conditional {expr:?}"))?,
            );
        }
        let default = raw
            .default
            .map(FieldDefault::compile)
            .transpose()
            .with_context(|| format!("field '{name}': default value"))?;
        Ok(Self {
            name,
            conditions,
            default,
            rules,
        })
    }

    /// Whether the field is shown for `ctx`. A conditional that cannot be
    /// evaluated hides the field.
    pub fn is_visible(&self, ctx: &dyn Lookup) -> bool {
        self.conditions.iter().all(|rule| rule.evaluate(ctx))
    }
}

// ---------------------------------------------------------------------------
// FormRules
// ---------------------------------------------------------------------------

/// All field rules of a form, in document order.
#[derive(Debug, Clone, Default)]
pub struct FormRules {
    pub fields: Vec<FieldRules>,
}

impl FormRules {
    pub fn field(&self, name: &str) -> Option<&FieldRules> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn rule_count(&self) -> usize {
        self.fields.iter().map(|f| f.rules.len()).sum()
    }

    /// Names of the fields visible for `ctx`.
    pub fn visible_fields(&self, ctx: &dyn Lookup) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_visible(ctx))
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Default values of all fields that have one, resolved against the
    /// submitted values in `ctx`.
    pub fn default_values(&self, ctx: &dyn Lookup) -> Context {
        self.fields
            .iter()
            .filter_map(|f| {
                let value = f.default.as_ref()?.resolve(&f.name, ctx)?;
                Some((f.name.as_str(), value))
            })
            .collect()
    }

    /// Run every `phase` rule of every visible field against `ctx`.
    pub fn validate(&self, phase: Phase, ctx: &dyn Lookup) -> ValidationReport {
        let mut report = ValidationReport::new();
        for field in self.fields.iter().filter(|f| f.is_visible(ctx)) {
            for rule in field.rules.iter().filter(|r| r.phase() == phase) {
                if !rule.evaluate(ctx) {
                    report.add(&field.name, rule.severity(), rule.message());
                }
            }
        }
        tracing::debug!(
            domain = "conf",
            %phase,
            errors = report.error_count(),
            warnings = report.warning_count(),
            "form validated"
        );
        report
    }
}
