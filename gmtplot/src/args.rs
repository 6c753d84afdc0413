use gmtplot_common::OptionValue;
use indexmap::IndexMap;

use crate::alias::ModuleSpec;
use crate::error::GmtPlotError;

/// Option name to value, in the order the caller supplied them.
pub type Options = IndexMap<String, OptionValue>;

/// Translate `options` into the module's flag syntax.
///
/// Every name is resolved and every value checked before anything is written,
/// so an unsupported option fails without side effects. Flags keep the
/// insertion order of `options`.
pub fn build_arg_string(module: &ModuleSpec, options: &Options) -> Result<String, GmtPlotError> {
    let mut tokens = Vec::with_capacity(options.len());
    for (name, value) in options {
        let alias = module
            .lookup(name)
            .ok_or_else(|| GmtPlotError::UnsupportedOption {
                name: name.clone(),
                module: module.name.to_string(),
            })?;
        alias.encode(value, &mut tokens)?;
    }
    Ok(tokens.join(" "))
}
