use crate::block::Block;
use crate::script::render_asm;
use crate::transform::{BlockTag, Transform};
use std::io::Write;
use std::sync::Mutex;

/// Records of at most 4096 bytes are written with a single `write_all`, so
/// concurrent workers interleave whole records on a pipe, never fragments.
const RECORD_LIMIT: usize = 4096;

/// Emits the raw 80 header bytes of every block
pub struct DumpHeaders<W> {
    out: Mutex<W>,
}

impl<W: Write> DumpHeaders<W> {
    /// Creates the transform writing to `out`
    pub fn new(out: W) -> Self {
        DumpHeaders { out: Mutex::new(out) }
    }
}

impl<W: Write + Send> Transform for DumpHeaders<W> {
    fn consume(&self, block: &Block<'_>, _tag: &BlockTag) {
        self.out
            .lock()
            .unwrap()
            .write_all(block.header())
            .expect("header write failed");
    }
}

/// Emits `u16 length | script` for every input and output script, dropping
/// (not truncating) scripts that would not fit an atomic record
pub struct DumpScripts<W> {
    out: Mutex<W>,
}

impl<W: Write> DumpScripts<W> {
    /// Creates the transform writing to `out`
    pub fn new(out: W) -> Self {
        DumpScripts { out: Mutex::new(out) }
    }

    fn write_script(&self, script: &[u8]) {
        let max_script_len = RECORD_LIMIT - 2;
        if script.len() > max_script_len {
            return;
        }

        let mut buffer = [0u8; RECORD_LIMIT];
        buffer[..2].copy_from_slice(&(script.len() as u16).to_le_bytes());
        buffer[2..2 + script.len()].copy_from_slice(script);
        self.out
            .lock()
            .unwrap()
            .write_all(&buffer[..2 + script.len()])
            .expect("script write failed");
    }
}

impl<W: Write + Send> Transform for DumpScripts<W> {
    fn consume(&self, block: &Block<'_>, _tag: &BlockTag) {
        for tx in block.transactions() {
            for input in &tx.inputs {
                self.write_script(input.script);
            }
            for output in &tx.outputs {
                self.write_script(output.script);
            }
        }
    }
}

/// Emits one disassembly line per input script, dropping oversized lines
pub struct DumpAsm<W> {
    out: Mutex<W>,
}

impl<W: Write> DumpAsm<W> {
    /// Creates the transform writing to `out`
    pub fn new(out: W) -> Self {
        DumpAsm { out: Mutex::new(out) }
    }
}

impl<W: Write + Send> Transform for DumpAsm<W> {
    fn consume(&self, block: &Block<'_>, _tag: &BlockTag) {
        for tx in block.transactions() {
            for input in &tx.inputs {
                let mut line = render_asm(input.script);
                line.push('\n');
                if line.len() > RECORD_LIMIT {
                    continue;
                }
                self.out
                    .lock()
                    .unwrap()
                    .write_all(line.as_bytes())
                    .expect("asm write failed");
            }
        }
    }
}
