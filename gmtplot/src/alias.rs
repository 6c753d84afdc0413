use gmtplot_common::{OptionValue, ValueKind};
use indexmap::IndexMap;

use crate::error::GmtPlotError;

/// Separator used when a sequence value is joined into one flag argument.
pub const SEQUENCE_SEPARATOR: &str = "/";

/// How an option's value is written after its flag code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// `true` writes the bare flag, `false` omits it
    Flag,
    /// Text appended to the flag
    Text,
    /// Number or text appended to the flag
    Scalar,
    FlagOrText,
    FlagOrScalar,
    /// Scalar, or a sequence joined with `/`
    Joined,
}

impl OptionKind {
    pub fn accepts(&self, kind: ValueKind) -> bool {
        use ValueKind::*;
        match self {
            OptionKind::Flag => kind == Bool,
            OptionKind::Text => kind == Text,
            OptionKind::Scalar => matches!(kind, Int | Float | Text),
            OptionKind::FlagOrText => matches!(kind, Bool | Text),
            OptionKind::FlagOrScalar => matches!(kind, Bool | Int | Float | Text),
            OptionKind::Joined => matches!(kind, Int | Float | Text | Sequence),
        }
    }

    pub fn expected(&self) -> &'static str {
        match self {
            OptionKind::Flag => "a boolean",
            OptionKind::Text => "a string",
            OptionKind::Scalar => "a number or string",
            OptionKind::FlagOrText => "a boolean or string",
            OptionKind::FlagOrScalar => "a boolean, number or string",
            OptionKind::Joined => "a number, string or sequence",
        }
    }
}

/// One entry of a module's alias table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionAlias {
    pub name: &'static str,
    pub flag: char,
    pub kind: OptionKind,
    /// A sequence value writes the flag once per element
    pub repeatable: bool,
    pub help: &'static str,
}

impl OptionAlias {
    pub const fn new(name: &'static str, flag: char, kind: OptionKind, help: &'static str) -> Self {
        Self {
            name,
            flag,
            kind,
            repeatable: false,
            help,
        }
    }

    pub const fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// Append the flag tokens for `value` to `out`.
    pub fn encode(&self, value: &OptionValue, out: &mut Vec<String>) -> Result<(), GmtPlotError> {
        match value {
            OptionValue::Sequence(items) if self.repeatable && self.kind != OptionKind::Joined => {
                if items.is_empty() {
                    return Err(self.invalid(value));
                }
                for item in items {
                    self.encode_one(&OptionValue::from(item.clone()), out)?;
                }
                Ok(())
            }
            _ => self.encode_one(value, out),
        }
    }

    fn encode_one(&self, value: &OptionValue, out: &mut Vec<String>) -> Result<(), GmtPlotError> {
        if !self.kind.accepts(value.kind()) {
            return Err(self.invalid(value));
        }
        let arg = match value {
            OptionValue::Bool(true) => Some(String::new()),
            OptionValue::Bool(false) => None,
            OptionValue::Sequence(items) if items.is_empty() => return Err(self.invalid(value)),
            other => other.join(SEQUENCE_SEPARATOR),
        };
        if let Some(arg) = arg {
            out.push(format!("-{}{arg}", self.flag));
        }
        Ok(())
    }

    fn invalid(&self, value: &OptionValue) -> GmtPlotError {
        let expected = if self.repeatable {
            format!("{} (or a sequence of them)", self.kind.expected())
        } else if matches!(value, OptionValue::Sequence(items) if items.is_empty()) {
            format!("{} with at least one element", self.kind.expected())
        } else {
            self.kind.expected().to_string()
        };
        GmtPlotError::InvalidOptionValue {
            name: self.name.to_string(),
            expected,
            found: value.kind(),
        }
    }
}

/// The alias table of one engine module.
#[derive(Debug, Clone)]
pub struct ModuleSpec {
    pub name: &'static str,
    aliases: IndexMap<&'static str, OptionAlias>,
}

impl ModuleSpec {
    pub fn new(name: &'static str, aliases: impl IntoIterator<Item = OptionAlias>) -> Self {
        Self {
            name,
            aliases: aliases.into_iter().map(|a| (a.name, a)).collect(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&OptionAlias> {
        self.aliases.get(name)
    }

    /// Aliases in table order.
    pub fn aliases(&self) -> impl Iterator<Item = &OptionAlias> {
        self.aliases.values()
    }

    /// Render the alias table as documentation text.
    pub fn aliases_doc(&self) -> String {
        let width = self.aliases().map(|a| a.name.len()).max().unwrap_or(0);
        let mut doc = format!("Aliases for {}:\n", self.name);
        for alias in self.aliases() {
            doc.push_str(&format!(
                "  -{} = {:<width$}  {}\n",
                alias.flag, alias.name, alias.help
            ));
        }
        doc
    }
}
