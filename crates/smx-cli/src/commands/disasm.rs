use std::path::PathBuf;

use smx_bytecode::format::dump_code;
use smx_core::Colors;

use super::fail;
use super::module_loader::{function_range, load_module};

pub struct DisasmArgs {
    pub path: PathBuf,
    pub function: Option<String>,
    pub max_image_size: Option<usize>,
    pub color: bool,
}

pub fn run(args: DisasmArgs) {
    match render(&args) {
        Ok(out) => print!("{}", out),
        Err(msg) => fail(&msg),
    }
}

pub fn render(args: &DisasmArgs) -> Result<String, String> {
    let module = load_module(&args.path, args.max_image_size)?;
    let range = args
        .function
        .as_deref()
        .map(|name| function_range(&module, name))
        .transpose()?;
    if module.code_segment().is_none() {
        return Err("module has no code".to_string());
    }
    Ok(dump_code(&module, Colors::new(args.color), range))
}
