//! IL emission sinks.

use std::collections::BTreeMap;
use std::fmt;

use crate::il::{Label, Stmt};

/// Receives lifted IL.
///
/// The lifter asks for labels of branch targets through
/// [`IlEmitter::label_for_address`]; targets without a label are emitted
/// as computed jumps.
pub trait IlEmitter {
    fn emit(&mut self, stmt: Stmt);

    /// Allocate a label that is not yet placed.
    fn new_label(&mut self) -> Label;

    /// Place `label` before the next emitted statement.
    fn mark_label(&mut self, label: Label);

    /// Label placed at the start of the instruction at `address`, if any.
    fn label_for_address(&self, address: u64) -> Option<Label>;
}

/// Sink that drops everything.
pub struct NoopEmitter;

impl IlEmitter for NoopEmitter {
    #[inline(always)]
    fn emit(&mut self, _stmt: Stmt) {}

    #[inline(always)]
    fn new_label(&mut self) -> Label {
        Label(0)
    }

    #[inline(always)]
    fn mark_label(&mut self, _label: Label) {}

    #[inline(always)]
    fn label_for_address(&self, _address: u64) -> Option<Label> {
        None
    }
}

/// Recording sink: a flat statement list with placed labels.
#[derive(Clone, Debug, Default)]
pub struct IlFunction {
    stmts: Vec<Stmt>,
    /// Statement index per label; `None` until marked.
    positions: Vec<Option<usize>>,
    addresses: BTreeMap<u64, Label>,
}

impl IlFunction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the label for an instruction start. The caller marks it
    /// when lifting reaches that address.
    pub fn add_address_label(&mut self, address: u64) -> Label {
        if let Some(&label) = self.addresses.get(&address) {
            return label;
        }
        let label = self.new_label();
        self.addresses.insert(address, label);
        label
    }

    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Statement index of a placed label.
    pub fn position(&self, label: Label) -> Option<usize> {
        self.positions.get(label.0 as usize).copied().flatten()
    }

    pub fn address_label(&self, address: u64) -> Option<Label> {
        self.addresses.get(&address).copied()
    }

    fn labels_at(&self, index: usize) -> impl Iterator<Item = Label> + '_ {
        self.positions
            .iter()
            .enumerate()
            .filter(move |(_, p)| **p == Some(index))
            .map(|(i, _)| Label(i as u32))
    }
}

impl IlEmitter for IlFunction {
    fn emit(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }

    fn new_label(&mut self) -> Label {
        let label = Label(self.positions.len() as u32);
        self.positions.push(None);
        label
    }

    fn mark_label(&mut self, label: Label) {
        if let Some(slot) = self.positions.get_mut(label.0 as usize) {
            *slot = Some(self.stmts.len());
        }
    }

    fn label_for_address(&self, address: u64) -> Option<Label> {
        self.address_label(address)
    }
}

impl fmt::Display for IlFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let by_label: BTreeMap<Label, u64> = self.addresses.iter().map(|(a, l)| (*l, *a)).collect();
        for index in 0..=self.stmts.len() {
            for label in self.labels_at(index) {
                match by_label.get(&label) {
                    Some(address) => writeln!(f, "{label} @ {address:#x}:")?,
                    None => writeln!(f, "{label}:")?,
                }
            }
            if let Some(stmt) = self.stmts.get(index) {
                writeln!(f, "  {index:>3}  {stmt}")?;
            }
        }
        Ok(())
    }
}
