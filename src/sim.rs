use std::path::Path;

use log::{debug, trace};

use crate::backing::{ProgramImage, SwapArea};
use crate::constants::{FILL_BYTE, NUM_FRAMES, NUM_PAGES, PAGE_SIZE, SWAP_SLOTS};
use crate::error::{SimError, SimResult};
use crate::memory::PhysicalMemory;
use crate::page_table::{PageFlags, PageLocation, PageTable};

/// A single-address-space demand paging simulation.
///
/// Owns the page table, the physical frame array, both backing-store handles
/// and the two rotation cursors. The cursors are instance fields, so
/// independent simulations never interfere with one another. Single-caller,
/// fully synchronous: every operation runs to completion before returning.
pub struct Simulation {
    page_table: PageTable,
    memory: PhysicalMemory,
    image: ProgramImage,
    swap: SwapArea,
    text_size: usize,
    data_size: usize,
    bss_heap_stack_size: usize,
    /// Next frame the eviction scan examines.
    next_victim: usize,
    /// Next swap slot a dirty page is written to. Advances only on
    /// write-back and wraps modulo the slot count; slots are never freed.
    next_swap_slot: usize,
}

impl Simulation {
    /// Create a simulation over an existing program image and a fresh swap
    /// area at `swap_path` (created or truncated, then prefilled).
    ///
    /// Fails with [`SimError::ResourceInit`] if either backing store cannot
    /// be set up; a partially opened handle is released on the way out.
    pub fn new<P, Q>(
        image_path: P,
        swap_path: Q,
        text_size: usize,
        data_size: usize,
        bss_heap_stack_size: usize,
    ) -> SimResult<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let image = ProgramImage::open(image_path)?;
        let swap = SwapArea::create(swap_path)?;
        debug!(
            "simulation up: text={text_size} data={data_size} bss/heap/stack={bss_heap_stack_size}"
        );

        Ok(Simulation {
            page_table: PageTable::new(text_size),
            memory: PhysicalMemory::new(),
            image,
            swap,
            text_size,
            data_size,
            bss_heap_stack_size,
            next_victim: 0,
            next_swap_slot: 0,
        })
    }

    // -- load / store -------------------------------------------------------

    /// Read the byte at a virtual address, faulting the page in if needed.
    pub fn load(&mut self, address: usize) -> SimResult<u8> {
        let (page, offset) = translate(address)?;
        let frame = self.resident_frame_or_fault(page)?;
        let value = self.memory.read(PhysicalMemory::frame_to_address(frame) + offset);
        trace!("load {address}: page {page} frame {frame} offset {offset} -> {:?}", value as char);
        Ok(value)
    }

    /// Write a byte at a virtual address, faulting the page in if needed.
    ///
    /// The permission check precedes fault handling, so a store denied on a
    /// text page leaves every piece of state untouched.
    pub fn store(&mut self, address: usize, value: u8) -> SimResult<()> {
        let (page, offset) = translate(address)?;
        if self.page_table.entry(page).is_read_only() {
            return Err(SimError::PermissionDenied(page));
        }
        let frame = self.resident_frame_or_fault(page)?;
        self.memory.write(PhysicalMemory::frame_to_address(frame) + offset, value);
        self.page_table.entry_mut(page).flags.insert(PageFlags::DIRTY);
        trace!("store {address}: page {page} frame {frame} offset {offset} <- {:?}", value as char);
        Ok(())
    }

    // -- fault handling -----------------------------------------------------

    fn resident_frame_or_fault(&mut self, page: usize) -> SimResult<usize> {
        if let Some(frame) = self.page_table.entry(page).frame() {
            return Ok(frame);
        }
        self.handle_fault(page)
    }

    /// Bring `page` into a frame and mark it resident.
    ///
    /// Population priority is independent of the page's swap history: text
    /// and data pages always reload from the program image, a swapped-out
    /// page reloads from its slot, and a first-touch bss/heap/stack page is
    /// filled with the filler byte.
    fn handle_fault(&mut self, page: usize) -> SimResult<usize> {
        let frame = match self.find_free_frame() {
            Some(frame) => frame,
            None => self
                .evict_one()?
                .ok_or(SimError::PageFault(page))?,
        };

        if page * PAGE_SIZE < self.text_size + self.data_size {
            self.image.read_page(page, self.memory.frame_mut(frame))?;
            debug!("fault: page {page} <- program image, frame {frame}");
        } else if let PageLocation::Swap(slot) = self.page_table.entry(page).location {
            self.swap.read_slot(slot, self.memory.frame_mut(frame))?;
            self.page_table.entry_mut(page).location = PageLocation::Unmapped;
            debug!("fault: page {page} <- swap slot {slot}, frame {frame}");
        } else {
            self.memory.fill_frame(frame, FILL_BYTE);
            debug!("fault: page {page} first touch, frame {frame}");
        }

        let entry = self.page_table.entry_mut(page);
        entry.flags.insert(PageFlags::VALID);
        entry.location = PageLocation::Frame(frame);
        Ok(frame)
    }

    // -- frame allocation / eviction ----------------------------------------

    /// First frame no valid page maps to, or `None` when memory is full.
    fn find_free_frame(&self) -> Option<usize> {
        (0..NUM_FRAMES).find(|&frame| self.resident_page_in(frame).is_none())
    }

    /// The page currently resident in `frame`, if any. Occupancy is derived
    /// by this scan; no reverse index is maintained.
    fn resident_page_in(&self, frame: usize) -> Option<usize> {
        self.page_table
            .iter()
            .find(|(_, entry)| entry.frame() == Some(frame))
            .map(|(page, _)| page)
    }

    /// Free one frame by evicting the page resident in it.
    ///
    /// Scans frames in rotating order from `next_victim`, wrapping, for at
    /// most one full revolution. A dirty victim is written to the slot under
    /// `next_swap_slot`; a clean one simply drops its mapping (an older swap
    /// copy, if any, is abandoned). The victim's dirty bit is left as is, so
    /// a once-dirty page writes back again on its next eviction.
    ///
    /// Returns `Ok(None)` when no occupied frame was found within the scan.
    fn evict_one(&mut self) -> SimResult<Option<usize>> {
        for _ in 0..NUM_FRAMES {
            let frame = self.next_victim;
            let Some(page) = self.resident_page_in(frame) else {
                self.next_victim = (self.next_victim + 1) % NUM_FRAMES;
                continue;
            };

            if self.page_table.entry(page).is_dirty() {
                let slot = self.next_swap_slot;
                self.swap.write_slot(slot, self.memory.frame(frame))?;
                self.page_table.entry_mut(page).location = PageLocation::Swap(slot);
                self.next_swap_slot = (slot + 1) % SWAP_SLOTS;
                debug!("evict: page {page} from frame {frame} -> swap slot {slot}");
            } else {
                self.page_table.entry_mut(page).location = PageLocation::Unmapped;
                debug!("evict: page {page} from frame {frame}, clean, dropped");
            }

            self.memory.fill_frame(frame, FILL_BYTE);
            self.page_table.entry_mut(page).flags.remove(PageFlags::VALID);
            self.next_victim = (frame + 1) % NUM_FRAMES;
            return Ok(Some(frame));
        }
        Ok(None)
    }

    // -- read-only introspection --------------------------------------------

    /// The physical frame array.
    pub fn memory(&self) -> &PhysicalMemory {
        &self.memory
    }

    /// The page table.
    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    /// Read a swap slot's current content without touching any state.
    pub fn read_swap_slot(&self, slot: usize, buf: &mut [u8]) -> SimResult<()> {
        self.swap.read_slot(slot, buf)?;
        Ok(())
    }

    /// The three segment sizes supplied at creation:
    /// `(text, data, bss + heap + stack)`.
    pub fn segment_sizes(&self) -> (usize, usize, usize) {
        (self.text_size, self.data_size, self.bss_heap_stack_size)
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        // Both backing handles close with their fields; the cursors die here.
        debug!("simulation torn down");
    }
}

/// Split an address into `(page, offset)`, rejecting addresses past the end
/// of the virtual range.
fn translate(address: usize) -> SimResult<(usize, usize)> {
    let page = address / PAGE_SIZE;
    if page >= NUM_PAGES {
        return Err(SimError::InvalidAddress(address));
    }
    Ok((page, address % PAGE_SIZE))
}
