//! Human-readable dumps of simulation state.
//!
//! Formatting only: everything here works from read-only snapshots of the
//! frame bytes, the swap bytes and the page table, and mutates nothing.

use std::fmt::Write as _;

use crate::constants::{PAGE_SIZE, SWAP_SLOTS};
use crate::error::SimResult;
use crate::sim::Simulation;

/// Render the physical frame array, one byte cell per line.
pub fn dump_memory(sim: &Simulation) -> String {
    let mut out = String::from("Physical memory\n");
    for &byte in sim.memory().data() {
        let _ = writeln!(out, "[{}]", byte as char);
    }
    out
}

/// Render the swap area, one slot per row of byte cells.
pub fn dump_swap(sim: &Simulation) -> SimResult<String> {
    let mut out = String::from("Swap area\n");
    let mut buf = [0u8; PAGE_SIZE];
    for slot in 0..SWAP_SLOTS {
        sim.read_swap_slot(slot, &mut buf)?;
        for &byte in &buf {
            let _ = write!(out, "[{}]\t", byte as char);
        }
        out.push('\n');
    }
    Ok(out)
}

/// Render the page table, one page per row.
pub fn dump_page_table(sim: &Simulation) -> String {
    let (text, data, bss) = sim.segment_sizes();
    let mut out = format!("Page table (text={text} data={data} bss/heap/stack={bss})\n");
    out.push_str("page\tvalid\tdirty\tperm\tlocation\n");
    for (page, entry) in sim.page_table().iter() {
        let _ = writeln!(
            out,
            "{page}\t{}\t{}\t{}\t{}",
            entry.is_valid() as u8,
            entry.is_dirty() as u8,
            if entry.is_read_only() { "ro" } else { "rw" },
            entry.location,
        );
    }
    out
}
