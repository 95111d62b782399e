//! The instruction emission boundary: opcodes, symbolic constant pool references
//! and an in-memory sink that records what a stack manipulation emits.

mod stack_calc;
mod types;

use std::io::Cursor;

use binrw::{BinRead, BinWrite};
use tracing::warn;

use crate::error::{Error, Result};
use crate::stack::StackEffect;

pub use self::stack_calc::measure;
pub use self::types::*;

/// A constant pool entry referenced by an emitted instruction, kept symbolic so
/// the orchestrator can lay out the real pool however it likes.
#[derive(Clone, Debug, PartialEq)]
pub enum PoolEntry {
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Class(String),
    FieldRef {
        owner: String,
        name: String,
        descriptor: String,
    },
    MethodRef {
        owner: String,
        name: String,
        descriptor: String,
        interface: bool,
    },
}

impl PoolEntry {
    /// Long and double entries take two pool indices.
    fn width(&self) -> u16 {
        match self {
            PoolEntry::Long(_) | PoolEntry::Double(_) => 2,
            _ => 1,
        }
    }
}

/// Receives one instruction at a time, in the order a manipulation dictates.
pub trait CodeSink {
    fn emit(&mut self, instruction: Instruction);

    /// Returns the pool index for `entry`, adding it if it is not present yet.
    fn constant(&mut self, entry: PoolEntry) -> u16;
}

/// Index allocator for symbolic pool entries. Index 0 is never handed out.
///
/// `next_index` doubles as the class file's `constant_pool_count`, so it must
/// stay within a u16. An entry that does not fit is answered with index 0 and
/// marks the pool exhausted; [`CodeBuffer::encode`] refuses such a pool.
#[derive(Clone, Debug)]
pub struct ConstantPool {
    entries: Vec<(u16, PoolEntry)>,
    next_index: u16,
    exhausted: bool,
}

impl Default for ConstantPool {
    fn default() -> Self {
        ConstantPool {
            entries: Vec::new(),
            next_index: 1,
            exhausted: false,
        }
    }
}

impl ConstantPool {
    pub fn intern(&mut self, entry: PoolEntry) -> u16 {
        if let Some((index, _)) = self.entries.iter().find(|(_, e)| *e == entry) {
            return *index;
        }
        let index = self.next_index;
        match index.checked_add(entry.width()) {
            Some(next) => {
                self.next_index = next;
                self.entries.push((index, entry));
                index
            }
            None => {
                warn!("constant pool full, dropping {:?}", entry);
                self.exhausted = true;
                0
            }
        }
    }

    /// True once an entry could not be given an index.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn get(&self, index: u16) -> Option<&PoolEntry> {
        self.entries
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Straight-line code collected from applied manipulations.
#[derive(Clone, Debug, Default)]
pub struct CodeBuffer {
    pub instructions: Vec<Instruction>,
    pub pool: ConstantPool,
}

impl CodeBuffer {
    pub fn new() -> Self {
        CodeBuffer::default()
    }

    /// Replays the recorded instructions and measures their stack effect.
    pub fn measured_effect(&self) -> StackEffect {
        measure(&self.instructions, &self.pool)
    }

    /// Writes the code array.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.pool.is_exhausted() {
            return Err(Error::Encoding(format!(
                "constant pool exceeds {} entries",
                u16::MAX
            )));
        }
        let mut out = Cursor::new(Vec::new());
        for instruction in &self.instructions {
            instruction
                .write(&mut out)
                .map_err(|e| Error::Encoding(e.to_string()))?;
        }
        Ok(out.into_inner())
    }
}

impl CodeSink for CodeBuffer {
    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn constant(&mut self, entry: PoolEntry) -> u16 {
        self.pool.intern(entry)
    }
}

/// Reads a code array back into instructions.
pub fn decode(code: &[u8]) -> Result<Vec<Instruction>> {
    let mut cursor = Cursor::new(code);
    let mut instructions = Vec::new();
    while (cursor.position() as usize) < code.len() {
        let instruction =
            Instruction::read(&mut cursor).map_err(|e| Error::Encoding(e.to_string()))?;
        instructions.push(instruction);
    }
    Ok(instructions)
}
