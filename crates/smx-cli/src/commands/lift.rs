use std::fmt::Write as _;
use std::ops::Range;
use std::path::PathBuf;

use smx_bytecode::analysis::function_ranges;
use smx_bytecode::format::Module;
use smx_core::Colors;
use smx_lift::lift_function;

use super::fail;
use super::module_loader::{function_range, load_module};

pub struct LiftArgs {
    pub path: PathBuf,
    pub function: Option<String>,
    pub max_image_size: Option<usize>,
    pub color: bool,
}

pub fn run(args: LiftArgs) {
    match render(&args) {
        Ok(out) => print!("{}", out),
        Err(msg) => fail(&msg),
    }
}

/// IL listing of the selected function, or of every function.
///
/// A single requested function that fails to lift is an error; when
/// listing everything, failures are reported inline.
pub fn render(args: &LiftArgs) -> Result<String, String> {
    let module = load_module(&args.path, args.max_image_size)?;
    let colors = Colors::new(args.color);

    if let Some(name) = &args.function {
        let range = function_range(&module, name)?;
        let il = lift_function(&module, range).map_err(|e| format!("{name}: {e}"))?;
        let mut out = String::new();
        writeln!(out, "{}{}:{}", colors.label, name, colors.reset).unwrap();
        write!(out, "{il}").unwrap();
        return Ok(out);
    }

    let mut out = String::new();
    for (i, range) in function_ranges(&module).into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        lift_one(&module, range, colors, &mut out);
    }
    Ok(out)
}

fn lift_one(module: &Module, range: Range<u64>, colors: Colors, out: &mut String) {
    let name = module
        .functions()
        .get(&range.start)
        .map_or("?", |f| f.name.as_str());
    writeln!(out, "{}{}:{}", colors.label, name, colors.reset).unwrap();
    match lift_function(module, range) {
        Ok(il) => write!(out, "{il}").unwrap(),
        Err(e) => {
            log::warn!("{name}: {e}");
            writeln!(out, "  {}<error: {e}>{}", colors.dim, colors.reset).unwrap();
        }
    }
}
