// zeno-core - Request-scoped bump allocation
// Copyright (c) 2025 the Zeno Authors. MIT licensed.

//! A bump allocator for scope and buffer churn.
//!
//! An [`Arena`] carves byte buffers and [`Scope`]s out of growable
//! regions and releases everything at once via [`Arena::reset`]. The
//! intended lifecycle is request-scoped: allocate freely while a chunk
//! runs, reset between requests. Resetting never returns memory to the
//! OS, so steady-state request handling stops allocating entirely.
//!
//! Callers hold non-owning [`BufHandle`]s; a handle used after `reset`
//! reads recycled bytes. An arena belongs to one VM or request-scoped
//! caller at a time.

use crate::scope::Scope;

/// Allocation alignment. Every handle starts at a multiple of this.
const ALIGN: usize = 8;

/// A non-owning handle to bytes allocated from an [`Arena`].
///
/// Valid until the arena is reset. Handles only make sense with the
/// arena that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufHandle {
    region: usize,
    offset: usize,
    len: usize,
}

impl BufHandle {
    /// Byte offset within the backing region. Always 8-byte aligned.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the allocation in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the allocation is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A linear bump allocator backed by one or more growable byte regions.
#[derive(Debug)]
pub struct Arena {
    regions: Vec<Box<[u8]>>,
    /// Index of the region currently being bumped.
    active: usize,
    /// Next free offset in the active region.
    offset: usize,
    /// Bytes consumed since the last reset, including alignment padding
    /// and abandoned region tails.
    used: usize,
    /// Scopes issued since the last reset. The arena keeps them alive
    /// so reset invalidates them all at once.
    scopes: Vec<Scope>,
}

impl Arena {
    /// Create an arena with one region of `initial` bytes.
    pub fn new(initial: usize) -> Self {
        Arena {
            regions: vec![vec![0u8; initial].into_boxed_slice()],
            active: 0,
            offset: 0,
            used: 0,
            scopes: Vec::new(),
        }
    }

    /// Allocate `n` writable bytes at an 8-byte-aligned offset.
    ///
    /// When the active region cannot fit the aligned request, a fresh
    /// region of `max(2 x current, n)` is brought in. Old regions stay
    /// live, so previously issued handles are never invalidated by
    /// growth.
    pub fn alloc(&mut self, n: usize) -> BufHandle {
        let mut aligned = align_up(self.offset);
        if aligned + n > self.regions[self.active].len() {
            // The rest of this region is lost until reset.
            self.used += self.regions[self.active].len() - self.offset;
            self.grow(n);
            aligned = 0;
        } else {
            self.used += aligned - self.offset;
        }

        let handle = BufHandle {
            region: self.active,
            offset: aligned,
            len: n,
        };
        self.offset = aligned + n;
        self.used += n;
        handle
    }

    /// Allocate a zeroed, length-`n` mutable byte buffer.
    ///
    /// Same allocation policy as [`Arena::alloc`]; access the view via
    /// [`Arena::buffer`] / [`Arena::buffer_mut`].
    pub fn alloc_buffer(&mut self, n: usize) -> BufHandle {
        let handle = self.alloc(n);
        self.regions[handle.region][handle.offset..handle.offset + handle.len].fill(0);
        handle
    }

    /// Allocate a scope owned by this arena, chained to `parent`.
    ///
    /// The returned handle is invalidated (dropped by the arena) on
    /// reset; callers must not hold scopes across a reset.
    pub fn alloc_scope(&mut self, parent: Option<&Scope>) -> Scope {
        let scope = Scope::new(parent);
        self.scopes.push(scope.clone());
        scope
    }

    /// Read access to an allocated buffer.
    #[must_use]
    pub fn buffer(&self, handle: &BufHandle) -> &[u8] {
        &self.regions[handle.region][handle.offset..handle.offset + handle.len]
    }

    /// Write access to an allocated buffer.
    pub fn buffer_mut(&mut self, handle: &BufHandle) -> &mut [u8] {
        &mut self.regions[handle.region][handle.offset..handle.offset + handle.len]
    }

    /// Rewind to offset zero and drop all issued scopes.
    ///
    /// Underlying regions are retained, so subsequent allocations are
    /// free until the high-water mark is reached again. All previously
    /// issued handles are invalid after this call.
    pub fn reset(&mut self) {
        self.active = 0;
        self.offset = 0;
        self.used = 0;
        self.scopes.clear();
    }

    /// Reports `(used bytes, total capacity)`.
    #[must_use]
    pub fn stats(&self) -> (usize, usize) {
        let capacity = self.regions.iter().map(|r| r.len()).sum();
        (self.used, capacity)
    }

    fn grow(&mut self, n: usize) {
        // A reset arena may already own a region big enough from an
        // earlier high-water mark.
        let next = self.active + 1;
        if next < self.regions.len() && self.regions[next].len() >= n {
            self.active = next;
        } else {
            let size = usize::max(self.regions[self.active].len() * 2, n);
            self.regions.push(vec![0u8; size].into_boxed_slice());
            self.active = self.regions.len() - 1;
        }
        self.offset = 0;
    }
}

fn align_up(offset: usize) -> usize {
    (offset + ALIGN - 1) & !(ALIGN - 1)
}
