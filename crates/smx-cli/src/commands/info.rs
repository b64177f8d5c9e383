use std::path::PathBuf;

use smx_bytecode::format::dump_tables;
use smx_core::Colors;

use super::fail;
use super::module_loader::load_module;

pub struct InfoArgs {
    pub path: PathBuf,
    pub json: bool,
    pub max_image_size: Option<usize>,
    pub color: bool,
}

pub fn run(args: InfoArgs) {
    match render(&args) {
        Ok(out) => print!("{}", out),
        Err(msg) => fail(&msg),
    }
}

pub fn render(args: &InfoArgs) -> Result<String, String> {
    let module = load_module(&args.path, args.max_image_size)?;
    if args.json {
        let mut out = serde_json::to_string_pretty(&module.summary()).map_err(|e| e.to_string())?;
        out.push('\n');
        return Ok(out);
    }
    Ok(dump_tables(&module, Colors::new(args.color)))
}
