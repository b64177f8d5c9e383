//! Human-readable module dump.

use std::fmt::Write as _;
use std::ops::Range;

use smx_core::Colors;

use super::module::{FunctionSource, Module};
use super::typesig::TypeDesc;
use crate::analysis::resolve_switch;
use crate::constants::CELL_SIZE;
use crate::isa::{Instruction, Opcode, TokenText, tokens};

/// Generate a listing of every table and the full code segment.
pub fn dump(module: &Module, colors: Colors) -> String {
    let mut out = dump_tables(module, colors);
    out.push_str(&dump_code(module, colors, None));
    out
}

/// Header, sections, segments and symbol tables, without code.
pub fn dump_tables(module: &Module, colors: Colors) -> String {
    let mut out = String::new();
    let ctx = DumpContext { module, colors };

    ctx.dump_header(&mut out);
    ctx.dump_sections(&mut out);
    ctx.dump_segments(&mut out);
    ctx.dump_natives(&mut out);
    ctx.dump_functions(&mut out);
    ctx.dump_pubvars(&mut out);
    ctx.dump_globals(&mut out);

    out
}

/// Code listing of `range`, or of the whole code segment.
pub fn dump_code(module: &Module, colors: Colors, range: Option<Range<u64>>) -> String {
    let mut out = String::new();
    let ctx = DumpContext { module, colors };
    ctx.dump_code(&mut out, range);
    out
}

struct DumpContext<'a> {
    module: &'a Module,
    colors: Colors,
}

impl DumpContext<'_> {
    fn section_title(&self, out: &mut String, title: &str) {
        let c = &self.colors;
        writeln!(out, "{}[{title}]{}", c.label, c.reset).unwrap();
    }

    /// Type text with named references resolved where possible.
    fn type_name(&self, ty: &TypeDesc) -> String {
        match ty {
            TypeDesc::Named { kind, index } => match self.module.named_type_name(*kind, *index) {
                Some(name) => name.to_string(),
                None => ty.to_string(),
            },
            _ => ty.to_string(),
        }
    }

    fn dump_header(&self, out: &mut String) {
        let h = self.module.header();
        self.section_title(out, "header");
        writeln!(out, "version = {:#06x}", h.version).unwrap();
        let compression = if h.is_compressed() { "zlib" } else { "none" };
        writeln!(out, "compression = {compression}").unwrap();
        writeln!(out, "disk_size = {}", h.disk_size).unwrap();
        writeln!(out, "image_size = {}", h.image_size).unwrap();
        if let Some(entry) = self.module.entry_point() {
            writeln!(out, "entry = {entry:#x}").unwrap();
        }
        out.push('\n');
    }

    fn dump_sections(&self, out: &mut String) {
        let sections = self.module.sections();
        if sections.is_empty() {
            return;
        }
        self.section_title(out, "sections");
        let width = sections.iter().map(|s| s.name.len()).max().unwrap_or(0);
        for s in sections {
            writeln!(
                out,
                "{:<width$}  offset={:#x} size={}",
                s.name, s.offset, s.size
            )
            .unwrap();
        }
        out.push('\n');
    }

    fn dump_segments(&self, out: &mut String) {
        let segments = self.module.segments();
        if segments.is_empty() {
            return;
        }
        let c = &self.colors;
        self.section_title(out, "segments");
        for seg in segments {
            let kind = match seg.kind {
                super::module::SegmentKind::Code => "code",
                super::module::SegmentKind::Data => "data",
            };
            writeln!(
                out,
                "{kind} {}{:#x}..{:#x}{} file={:#x}+{}",
                c.address,
                seg.base,
                seg.end(),
                c.reset,
                seg.file_offset,
                seg.file_size
            )
            .unwrap();
        }
        out.push('\n');
    }

    fn dump_natives(&self, out: &mut String) {
        let mut natives = self.module.natives().peekable();
        if natives.peek().is_none() {
            return;
        }
        let c = &self.colors;
        self.section_title(out, "natives");
        for (i, native) in natives.enumerate() {
            write!(out, "N{i} {}", native.name).unwrap();
            if let Some(sig) = &native.signature {
                write!(out, "  {}; {sig}{}", c.dim, c.reset).unwrap();
            }
            out.push('\n');
        }
        out.push('\n');
    }

    fn dump_functions(&self, out: &mut String) {
        let functions = self.module.functions();
        if functions.is_empty() {
            return;
        }
        let c = &self.colors;
        self.section_title(out, "functions");
        for f in functions.values() {
            let source = match f.source {
                FunctionSource::Entry => "entry",
                FunctionSource::Public => "public",
                FunctionSource::Rtti => "rtti",
            };
            write!(out, "{}{:#x}{} {} ({source})", c.address, f.address, c.reset, f.name).unwrap();
            if let Some(sig) = &f.signature {
                write!(out, "  {}; {sig}{}", c.dim, c.reset).unwrap();
            }
            out.push('\n');
        }
        out.push('\n');
    }

    fn dump_pubvars(&self, out: &mut String) {
        let pubvars = self.module.pubvars();
        if pubvars.is_empty() {
            return;
        }
        let c = &self.colors;
        self.section_title(out, "pubvars");
        for v in pubvars {
            writeln!(out, "{}{:#x}{} {}", c.address, v.address, c.reset, v.name).unwrap();
        }
        out.push('\n');
    }

    fn dump_globals(&self, out: &mut String) {
        let globals = &self.module.debug().globals;
        if globals.is_empty() {
            return;
        }
        let c = &self.colors;
        self.section_title(out, "globals");
        for g in globals {
            let address = self.module.global_address(g);
            write!(out, "{}{address:#x}{} {}", c.address, c.reset, g.name).unwrap();
            if let Some(ty) = &g.ty {
                write!(out, ": {}", self.type_name(ty)).unwrap();
            }
            out.push('\n');
        }
        out.push('\n');
    }

    fn dump_code(&self, out: &mut String, range: Option<Range<u64>>) {
        let Some(seg) = self.module.code_segment() else {
            return;
        };
        let range = range.unwrap_or(seg.base..seg.end());
        let Some(code) = self.module.code_bytes_at(range.start) else {
            return;
        };
        let c = &self.colors;
        let functions = self.module.functions();
        self.section_title(out, "code");

        // decode against the rest of the segment so the last instruction
        // may extend past `range.end`
        let mut offset = 0;
        while offset < code.len() && range.start + (offset as u64) < range.end {
            let address = range.start + offset as u64;
            if let Some(f) = functions.get(&address) {
                if offset > 0 {
                    out.push('\n');
                }
                writeln!(out, "{}{}:{}", c.label, f.name, c.reset).unwrap();
            }
            match Instruction::decode(&code[offset..], address) {
                Ok(insn) => {
                    let toks = tokens(&insn, self.module.code_base(), self.module.data_base());
                    write!(
                        out,
                        "  {}{address:08x}{}  {}",
                        c.address,
                        c.reset,
                        TokenText(&toks)
                    )
                    .unwrap();
                    if insn.opcode == Opcode::Switch {
                        self.switch_targets(out, &insn);
                    }
                    out.push('\n');
                    offset += insn.len();
                }
                Err(e) => {
                    log::warn!("{address:#x}: {e}");
                    writeln!(
                        out,
                        "  {}{address:08x}{}  {}<invalid: {e}>{}",
                        c.address, c.reset, c.dim, c.reset
                    )
                    .unwrap();
                    offset += CELL_SIZE;
                }
            }
        }
    }

    /// `; default 0x.., cases 0x.., ..` after a `switch`.
    fn switch_targets(&self, out: &mut String, insn: &Instruction<'_>) {
        let Some(targets) = resolve_switch(self.module, insn) else {
            return;
        };
        let Some((default, cases)) = targets.split_first() else {
            return;
        };
        let c = &self.colors;
        write!(out, "  {}; default {default:#x}", c.dim).unwrap();
        if !cases.is_empty() {
            let list: Vec<_> = cases.iter().map(|t| format!("{t:#x}")).collect();
            write!(out, ", cases {}", list.join(" ")).unwrap();
        }
        out.push_str(c.reset);
    }
}
