pub const PAGE_SIZE: usize = 8;
pub const NUM_PAGES: usize = 25;

pub const MEMORY_SIZE: usize = 40;
pub const NUM_FRAMES: usize = MEMORY_SIZE / PAGE_SIZE;

pub const SWAP_SIZE: usize = 200;
pub const SWAP_SLOTS: usize = SWAP_SIZE / PAGE_SIZE;

/// Filler for fresh physical memory, cleared frames, first-touch
/// bss/heap/stack pages, and the swap prefill. ASCII `'0'`, not byte zero,
/// so untouched regions stay readable in dumps.
pub const FILL_BYTE: u8 = b'0';
