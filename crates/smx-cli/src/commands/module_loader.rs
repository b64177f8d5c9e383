//! Loading the plugin named on the command line.

use std::ops::Range;
use std::path::Path;

use smx_bytecode::analysis::function_ranges;
use smx_bytecode::format::{LoadOptions, Module};

pub fn load_module(path: &Path, max_image_size: Option<usize>) -> Result<Module, String> {
    let mut options = LoadOptions::new();
    if let Some(limit) = max_image_size {
        options = options.max_image_size(limit);
    }
    let bytes =
        std::fs::read(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    Module::from_bytes_with(bytes, options).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Address range of the function called `name`.
pub fn function_range(module: &Module, name: &str) -> Result<Range<u64>, String> {
    let function = module
        .function_named(name)
        .ok_or_else(|| format!("no function named `{name}`"))?;
    function_ranges(module)
        .into_iter()
        .find(|r| r.start == function.address)
        .ok_or_else(|| format!("function `{name}` is outside the code segment"))
}
